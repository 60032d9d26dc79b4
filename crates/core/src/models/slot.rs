use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// A half-open `[start, end)` interval whose end is strictly after its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> BookingResult<Self> {
        if end <= start {
            return Err(BookingError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A publishable, bookable window of an owner's time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn window(&self) -> BookingResult<TimeWindow> {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

/// Insert payload handed to a `SlotStore`; ids and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSlot {
    pub owner_id: Uuid,
    pub window: TimeWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSlotRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSlotResponse {
    pub message: String,
    pub availability: Slot,
}

//! # Appointment Scheduler
//!
//! Drives the booking and cancellation lifecycle and keeps appointments and
//! slots consistent with each other:
//!
//! - **Booking** claims the slot through the [`AvailabilityLedger`] first and
//!   only then records the appointment. If recording fails, the claim is
//!   compensated by releasing the slot again.
//! - **Cancellation** is a conditional `scheduled -> cancelled` update
//!   followed by a best-effort release of the slot. The outcome reports
//!   whether the release happened so callers can reconcile.
//! - **Listing** joins appointments with both parties' public profiles at
//!   read time.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::ledger::AvailabilityLedger;
use crate::models::{
    appointment::{
        Appointment, AppointmentFilter, AppointmentStatus, AppointmentView, CancelOutcome,
        NewAppointment, SlotRelease,
    },
    identity::{AuthenticatedIdentity, PublicProfile, Role},
};
use crate::store::{AppointmentStore, IdentityDirectory};

#[derive(Clone)]
pub struct AppointmentScheduler {
    ledger: AvailabilityLedger,
    appointments: Arc<dyn AppointmentStore>,
    directory: Arc<dyn IdentityDirectory>,
}

impl AppointmentScheduler {
    pub fn new(
        ledger: AvailabilityLedger,
        appointments: Arc<dyn AppointmentStore>,
        directory: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            ledger,
            appointments,
            directory,
        }
    }

    pub fn ledger(&self) -> &AvailabilityLedger {
        &self.ledger
    }

    /// Books `slot_id` for the calling consumer.
    ///
    /// # Errors
    ///
    /// * `BookingError::Forbidden` - the caller is not a consumer
    /// * `BookingError::SlotUnavailable` - the slot is missing or already booked
    /// * `BookingError::Store` - the appointment could not be recorded; the
    ///   slot has been released again
    pub async fn book(
        &self,
        identity: &AuthenticatedIdentity,
        slot_id: Uuid,
    ) -> BookingResult<Appointment> {
        identity.require_role(Role::Consumer)?;

        let slot = self.ledger.claim(slot_id).await?;

        let created = async {
            let window = slot.window()?;
            let appointment = self
                .appointments
                .insert_appointment(NewAppointment::for_claimed_slot(&slot, identity.id, window))
                .await?;
            Ok::<_, BookingError>(appointment)
        }
        .await;

        match created {
            Ok(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    %slot_id,
                    consumer_id = %identity.id,
                    "Booked appointment"
                );
                Ok(appointment)
            }
            Err(err) => {
                warn!(%slot_id, error = %err, "Recording appointment failed, releasing claimed slot");
                if let Err(release_err) = self.ledger.release_slot(slot.owner_id, slot.id).await {
                    error!(
                        %slot_id,
                        error = %release_err,
                        "Compensating release failed; slot stays booked without an appointment"
                    );
                }
                Err(err)
            }
        }
    }

    /// Cancels one of the calling owner's appointments and reopens its slot.
    ///
    /// An appointment that belongs to another owner is reported as
    /// `NotFound`, exactly like one that does not exist. The slot release
    /// never fails the cancellation; its result is carried in
    /// [`CancelOutcome::slot_release`].
    pub async fn cancel(
        &self,
        identity: &AuthenticatedIdentity,
        appointment_id: Uuid,
    ) -> BookingResult<CancelOutcome> {
        identity.require_role(Role::Owner)?;
        let next = AppointmentStatus::Cancelled;

        let current = self.find_owned(appointment_id, identity.id).await?;
        if !current.status.can_transition_to(next) {
            return Err(rejected_transition(appointment_id, current.status, next));
        }

        let cancelled = match self
            .appointments
            .transition_appointment(appointment_id, identity.id, current.status, next)
            .await?
        {
            Some(appointment) => appointment,
            None => {
                // Lost a race with another status change; report what won.
                let latest = self.find_owned(appointment_id, identity.id).await?;
                return Err(rejected_transition(appointment_id, latest.status, next));
            }
        };
        info!(%appointment_id, owner_id = %identity.id, "Cancelled appointment");

        let released = match cancelled.slot_id {
            Some(slot_id) => self.ledger.release_slot(identity.id, slot_id).await,
            None => {
                self.ledger
                    .release(identity.id, cancelled.start_time, cancelled.end_time)
                    .await
            }
        };

        let slot_release = match released {
            Ok(slot) => SlotRelease::Released(slot),
            Err(BookingError::SlotNotFound) => {
                warn!(%appointment_id, "No slot found to release for cancelled appointment");
                SlotRelease::NotFound
            }
            Err(err) => {
                warn!(%appointment_id, error = %err, "Releasing slot for cancelled appointment failed");
                SlotRelease::Failed(err.to_string())
            }
        };

        Ok(CancelOutcome {
            appointment: cancelled,
            slot_release,
        })
    }

    /// Appointments where the caller is the consumer (for consumers) or the
    /// owner (for owners), earliest first, with both parties' profiles.
    pub async fn list_for_identity(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> BookingResult<Vec<AppointmentView>> {
        let filter = match identity.role {
            Role::Owner => AppointmentFilter::Owner(identity.id),
            Role::Consumer => AppointmentFilter::Consumer(identity.id),
        };
        let appointments = self.appointments.find_appointments(filter).await?;

        let mut party_ids: Vec<Uuid> = appointments
            .iter()
            .flat_map(|appointment| [appointment.owner_id, appointment.consumer_id])
            .collect();
        party_ids.sort();
        party_ids.dedup();

        let profiles: HashMap<Uuid, PublicProfile> = if party_ids.is_empty() {
            HashMap::new()
        } else {
            self.directory
                .find_profiles(&party_ids)
                .await?
                .into_iter()
                .map(|profile| (profile.id, PublicProfile::from(profile)))
                .collect()
        };

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentView {
                owner: profiles.get(&appointment.owner_id).cloned(),
                consumer: profiles.get(&appointment.consumer_id).cloned(),
                appointment,
            })
            .collect())
    }

    async fn find_owned(&self, appointment_id: Uuid, owner_id: Uuid) -> BookingResult<Appointment> {
        self.appointments
            .find_appointment_for_owner(appointment_id, owner_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Appointment {} not found", appointment_id)))
    }
}

fn rejected_transition(
    appointment_id: Uuid,
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> BookingError {
    if from == AppointmentStatus::Cancelled && to == AppointmentStatus::Cancelled {
        BookingError::AlreadyCancelled(appointment_id)
    } else {
        BookingError::InvalidTransition { from, to }
    }
}

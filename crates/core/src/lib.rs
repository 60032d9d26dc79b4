//! # OfficeHours Core
//!
//! Domain types and the slot-reservation state machine shared by every
//! OfficeHours crate.
//!
//! - [`ledger::AvailabilityLedger`] publishes slots and owns the atomic
//!   claim/release primitive.
//! - [`scheduler::AppointmentScheduler`] books and cancels appointments on
//!   top of the ledger.
//! - [`store`] defines the persistence ports both components are written
//!   against, with an in-memory implementation.

pub mod errors;
pub mod ledger;
pub mod models;
pub mod scheduler;
pub mod store;

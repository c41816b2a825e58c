//! # CliniSlot Core
//!
//! Domain types and pure logic for the clinic slot maintenance service:
//! the clinic roster, the weekly opening calendar, the slot and
//! appointment models, and the shared error taxonomy.
//!
//! Nothing in this crate performs I/O; persistence lives in
//! `clinislot-db` and orchestration in `clinislot-engine`.

/// Weekly opening calendar for every clinic
pub mod calendar;
/// Shared error taxonomy
pub mod errors;
/// Domain models: clinics, slots, appointments
pub mod models;

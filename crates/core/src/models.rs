pub mod appointment;
pub mod clinic;
pub mod slot;

pub use appointment::Appointment;
pub use clinic::{Clinic, ClinicDescriptor};
pub use slot::{NewSlot, Slot};

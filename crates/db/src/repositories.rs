pub mod appointment;
pub mod slot;
pub mod staff;

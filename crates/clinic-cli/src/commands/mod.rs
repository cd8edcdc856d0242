pub mod appointment;
pub mod consultation;
pub mod patient;

pub mod availability;
pub mod notifications;
pub mod reservations;
pub mod validation;

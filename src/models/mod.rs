pub mod catalog;
pub mod hall;
pub mod performance;
pub mod play;
pub mod reservation;
pub mod ticket;
pub mod user;

pub use catalog::{Actor, Genre};
pub use hall::Hall;
pub use performance::Performance;
pub use play::Play;
pub use reservation::{Reservation, ReservationWithTickets};
pub use ticket::Ticket;
pub use user::User;

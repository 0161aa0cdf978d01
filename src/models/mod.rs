pub mod movie;
pub mod order;
pub mod schedule;
pub mod seat;
pub mod user;

pub use movie::{Cast, Genre, Movie, MovieUpdate};
pub use order::{NewOrder, Order};
pub use schedule::Schedule;
pub use seat::Seat;
pub use user::{Profile, Role, User};

pub mod flight;
pub mod trainer;

pub use flight::{fly_formation, FlightReport};
pub use trainer::Trainer;

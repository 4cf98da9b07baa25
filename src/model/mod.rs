pub use aviary_core::controller::ControllerLogic;
pub mod config {
    pub use aviary_core::config::*;
}
pub mod controller {
    pub use aviary_core::controller::*;
}
pub mod drone {
    pub use aviary_core::drone::*;
}
pub mod evolution {
    pub use aviary_core::evolution::*;
}
pub mod formation {
    pub use aviary_core::formation::*;
}
pub mod metrics {
    pub use aviary_core::metrics::*;
}
pub mod physics {
    pub use aviary_core::physics::*;
}
pub mod thruster {
    pub use aviary_core::thruster::*;
}
pub mod persistence {
    pub use aviary_io::persistence::*;
}
pub mod history {
    pub use aviary_data::{DeathCause, GenerationSummary, LiveEvent};
    pub use aviary_io::history::*;
}
pub mod geometry {
    pub use aviary_data::{Arena, BodyHandle, BodyState, Vec2};
}

//! Core data structures for the Aviary drone trainer.
//!
//! Everything in this crate is plain, serializable state. Behaviour lives in
//! `aviary_core`, which implements its logic traits on these types.

pub mod data;

pub use data::body::{Arena, BodyHandle, BodyState, Vec2};
pub use data::controller::{
    Controller, ControllerInputs, ControllerOutputs, ControllerWeights, LayerWeights,
    CONTROLLER_INPUTS, CONTROLLER_OUTPUTS, CONTROLLER_TOPOLOGY,
};
pub use data::history::{DeathCause, GenerationSummary, LiveEvent};

pub mod crossover;
pub mod forward;
pub mod mutation;
pub mod topology;

pub use aviary_data::{
    Controller, ControllerInputs, ControllerOutputs, ControllerWeights, LayerWeights,
    CONTROLLER_INPUTS, CONTROLLER_OUTPUTS, CONTROLLER_TOPOLOGY,
};
use rand::Rng;
use thiserror::Error;

pub use topology::create_controller_random_with_rng;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// Weights do not match the controller's layer layout.
    #[error("Topology mismatch: expected {expected:?}, found {found:?}")]
    TopologyMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// A weight buffer is inconsistent with the layer it claims to describe.
    #[error("Malformed layer {layer}: expected {expected} parameters, found {found}")]
    MalformedLayer {
        layer: usize,
        expected: usize,
        found: usize,
    },
}

/// Trait defining the core logic for drone controllers.
pub trait ControllerLogic: Sized {
    fn new_random() -> Self;
    fn new_random_with_rng<R: Rng>(rng: &mut R) -> Self;

    /// Runs the network on one sensor vector. Never fails on finite input.
    #[must_use]
    fn predict(&self, inputs: &ControllerInputs) -> ControllerOutputs;

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        strategy: crate::config::CrossoverStrategy,
        rng: &mut R,
    ) -> Self;
    fn crossover(&self, other: &Self) -> Self;

    fn mutate_with_config<R: Rng>(&mut self, config: &crate::config::ControllerConfig, rng: &mut R);

    /// Replaces every weight. On error the controller is left untouched.
    fn set_weights(&mut self, weights: ControllerWeights) -> Result<(), ControllerError>;
    fn from_weights(weights: ControllerWeights) -> Result<Self, ControllerError>;
    #[must_use]
    fn weights(&self) -> ControllerWeights;

    fn topology(&self) -> Vec<usize>;
    fn parameter_count(&self) -> usize;

    /// Releases the controller's buffers.
    fn dispose(self);
}

impl ControllerLogic for Controller {
    fn new_random() -> Self {
        let mut rng = rand::thread_rng();
        Self::new_random_with_rng(&mut rng)
    }

    fn new_random_with_rng<R: Rng>(rng: &mut R) -> Self {
        topology::create_controller_random_with_rng(rng)
    }

    fn predict(&self, inputs: &ControllerInputs) -> ControllerOutputs {
        forward::predict(self, inputs)
    }

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        strategy: crate::config::CrossoverStrategy,
        rng: &mut R,
    ) -> Self {
        crossover::controller_crossover_with_rng(self, other, strategy, rng)
    }

    fn crossover(&self, other: &Self) -> Self {
        let mut rng = rand::thread_rng();
        self.crossover_with_rng(other, crate::config::CrossoverStrategy::default(), &mut rng)
    }

    fn mutate_with_config<R: Rng>(
        &mut self,
        config: &crate::config::ControllerConfig,
        rng: &mut R,
    ) {
        mutation::mutate_with_config(self, config, rng)
    }

    fn set_weights(&mut self, weights: ControllerWeights) -> Result<(), ControllerError> {
        topology::validate_weights(&weights, &self.topology())?;
        self.layers = weights.layers;
        Ok(())
    }

    fn from_weights(weights: ControllerWeights) -> Result<Self, ControllerError> {
        topology::validate_weights(&weights, &CONTROLLER_TOPOLOGY)?;
        Ok(Self {
            layers: weights.layers,
        })
    }

    fn weights(&self) -> ControllerWeights {
        ControllerWeights {
            topology: self.topology(),
            layers: self.layers.clone(),
        }
    }

    fn topology(&self) -> Vec<usize> {
        topology::topology_of(&self.layers)
    }

    fn parameter_count(&self) -> usize {
        self.layers.iter().map(LayerWeights::parameter_count).sum()
    }

    fn dispose(self) {
        drop(self);
    }
}

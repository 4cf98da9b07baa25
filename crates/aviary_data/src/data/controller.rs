use super::body::{Arena, BodyState, Vec2};
use serde::{Deserialize, Serialize};

/// Layer widths of the drone controller, input layer first.
pub const CONTROLLER_TOPOLOGY: [usize; 4] = [CONTROLLER_INPUTS, 10, 10, CONTROLLER_OUTPUTS];
pub const CONTROLLER_INPUTS: usize = 6;
pub const CONTROLLER_OUTPUTS: usize = 4;

/// Weights of one dense layer.
///
/// `kernel` is row-major with one row per output unit, so the weight from
/// input `i` to output `o` lives at `kernel[o * input_size + i]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub input_size: usize,
    pub output_size: usize,
    pub kernel: Vec<f32>,
    pub bias: Vec<f32>,
}

impl LayerWeights {
    /// Returns true when the buffers agree with the declared layer shape.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.kernel.len() == self.input_size * self.output_size
            && self.bias.len() == self.output_size
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.kernel.len() + self.bias.len()
    }
}

/// Feed-forward network that flies one drone.
///
/// The topology is fixed (see [`CONTROLLER_TOPOLOGY`]); only the weights
/// evolve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub layers: Vec<LayerWeights>,
}

/// Serializable snapshot of a controller's parameters.
///
/// `topology` repeats the layer widths so a snapshot can be checked before
/// any weight is copied into a live controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerWeights {
    pub topology: Vec<usize>,
    pub layers: Vec<LayerWeights>,
}

/// Normalized sensor vector fed to a controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerInputs(pub [f32; CONTROLLER_INPUTS]);

impl ControllerInputs {
    /// Builds the sensor vector from a body's kinematics and the vector from
    /// the body to its current target.
    ///
    /// Scaling: velocity / 100, angular velocity / 2, target vector divided by
    /// the arena size per axis, and the sine of the body angle.
    #[must_use]
    pub fn from_state(state: &BodyState, target_vector: Vec2, arena: &Arena) -> Self {
        let raw = [
            state.velocity.x / 100.0,
            state.velocity.y / 100.0,
            state.angular_velocity / 2.0,
            target_vector.x / arena.width,
            target_vector.y / arena.height,
            state.angle.sin(),
        ];
        Self(raw.map(|v| if v.is_finite() { v } else { 0.0 }))
    }
}

/// Named controller outputs, each in `[-1, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerOutputs {
    pub left_power: f32,
    pub right_power: f32,
    pub left_angle: f32,
    pub right_angle: f32,
}

impl ControllerOutputs {
    /// Output neuron order is `[left_power, right_power, left_angle, right_angle]`.
    #[must_use]
    pub fn from_array(values: [f32; CONTROLLER_OUTPUTS]) -> Self {
        Self {
            left_power: values[0],
            right_power: values[1],
            left_angle: values[2],
            right_angle: values[3],
        }
    }

    #[must_use]
    pub fn to_array(self) -> [f32; CONTROLLER_OUTPUTS] {
        [
            self.left_power,
            self.right_power,
            self.left_angle,
            self.right_angle,
        ]
    }
}

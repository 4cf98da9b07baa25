use super::*;

/// Dense tanh forward pass over the fixed topology.
pub fn predict(controller: &Controller, inputs: &ControllerInputs) -> ControllerOutputs {
    let sanitized = inputs.0.map(|v| if v.is_finite() { v } else { 0.0 });
    let mut activations: Vec<f32> = sanitized.to_vec();
    let mut next = Vec::new();

    for layer in &controller.layers {
        dense_tanh(layer, &activations, &mut next);
        std::mem::swap(&mut activations, &mut next);
    }

    let mut out = [0.0; CONTROLLER_OUTPUTS];
    for (slot, value) in out.iter_mut().zip(activations.iter()) {
        *slot = *value;
    }
    ControllerOutputs::from_array(out)
}

fn dense_tanh(layer: &LayerWeights, input: &[f32], output: &mut Vec<f32>) {
    output.clear();
    output.extend(
        layer
            .kernel
            .chunks_exact(layer.input_size.max(1))
            .zip(&layer.bias)
            .map(|(row, bias)| {
                let sum: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                (sum + bias).tanh()
            }),
    );
}

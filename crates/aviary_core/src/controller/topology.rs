use super::*;
use rand::Rng;

/// Builds a fresh controller: Glorot-uniform kernels, zero biases.
pub fn create_controller_random_with_rng<R: Rng>(rng: &mut R) -> Controller {
    let layers = CONTROLLER_TOPOLOGY
        .windows(2)
        .map(|pair| random_layer(pair[0], pair[1], rng))
        .collect();
    Controller { layers }
}

fn random_layer<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> LayerWeights {
    let limit = (6.0 / (input_size + output_size) as f32).sqrt();
    let kernel = (0..input_size * output_size)
        .map(|_| rng.gen_range(-limit..limit))
        .collect();
    LayerWeights {
        input_size,
        output_size,
        kernel,
        bias: vec![0.0; output_size],
    }
}

/// Layer widths described by a stack of dense layers, input layer first.
pub fn topology_of(layers: &[LayerWeights]) -> Vec<usize> {
    let mut widths = Vec::with_capacity(layers.len() + 1);
    if let Some(first) = layers.first() {
        widths.push(first.input_size);
    }
    widths.extend(layers.iter().map(|l| l.output_size));
    widths
}

/// Checks a weight snapshot against an expected topology.
///
/// The declared topology, the layer chain and every buffer length must all
/// agree before a snapshot may replace live weights.
pub fn validate_weights(
    weights: &ControllerWeights,
    expected: &[usize],
) -> Result<(), ControllerError> {
    let found = topology_of(&weights.layers);
    if found != expected || weights.topology != expected {
        return Err(ControllerError::TopologyMismatch {
            expected: expected.to_vec(),
            found: if found == expected {
                weights.topology.clone()
            } else {
                found
            },
        });
    }

    for (i, layer) in weights.layers.iter().enumerate() {
        if !layer.is_well_formed() {
            return Err(ControllerError::MalformedLayer {
                layer: i,
                expected: layer.input_size * layer.output_size + layer.output_size,
                found: layer.parameter_count(),
            });
        }
    }
    Ok(())
}

use super::*;
use crate::config::CrossoverStrategy;
use rand::Rng;

pub fn controller_crossover_with_rng<R: Rng>(
    controller: &Controller,
    other: &Controller,
    strategy: CrossoverStrategy,
    rng: &mut R,
) -> Controller {
    match strategy {
        CrossoverStrategy::WholeNetwork => {
            if rng.gen_bool(0.5) {
                controller.clone()
            } else {
                other.clone()
            }
        }
        CrossoverStrategy::Uniform => uniform_crossover(controller, other, rng),
    }
}

fn uniform_crossover<R: Rng>(
    controller: &Controller,
    other: &Controller,
    rng: &mut R,
) -> Controller {
    // Parents of different shape cannot be mixed scalar by scalar.
    if controller.topology() != other.topology() {
        return controller.clone();
    }

    let layers = controller
        .layers
        .iter()
        .zip(&other.layers)
        .map(|(a, b)| LayerWeights {
            input_size: a.input_size,
            output_size: a.output_size,
            kernel: pick_each(&a.kernel, &b.kernel, rng),
            bias: pick_each(&a.bias, &b.bias, rng),
        })
        .collect();
    Controller { layers }
}

fn pick_each<R: Rng>(a: &[f32], b: &[f32], rng: &mut R) -> Vec<f32> {
    a.iter()
        .zip(b)
        .map(|(x, y)| if rng.gen_bool(0.5) { *x } else { *y })
        .collect()
}

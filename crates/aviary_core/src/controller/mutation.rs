use super::*;
use crate::config::ControllerConfig;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Adds `N(0, mutation_std)` noise to each weight and bias with probability
/// `mutation_rate`.
pub fn mutate_with_config<R: Rng>(
    controller: &mut Controller,
    config: &ControllerConfig,
    rng: &mut R,
) {
    let rate = f64::from(config.mutation_rate.clamp(0.0, 1.0));
    let Ok(noise) = Normal::new(0.0f32, config.mutation_std) else {
        tracing::warn!(std = config.mutation_std, "Invalid mutation std, skipping mutation");
        return;
    };

    for layer in &mut controller.layers {
        for w in layer.kernel.iter_mut().chain(layer.bias.iter_mut()) {
            if rng.gen_bool(rate) {
                *w += noise.sample(rng);
            }
        }
    }
}

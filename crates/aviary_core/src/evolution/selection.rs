use crate::drone::Drone;

/// Roulette-wheel walk over normalized fitness.
///
/// Subtracts each fitness from `r` until it drops to zero or below. When
/// float drift leaves `r` positive after the last entry, the last index is
/// returned. `fitness` must not be empty.
#[must_use]
pub fn select_index(fitness: &[f64], r: f64) -> usize {
    let mut remaining = r;
    for (i, f) in fitness.iter().enumerate() {
        remaining -= f;
        if remaining <= 0.0 {
            return i;
        }
    }
    fitness.len().saturating_sub(1)
}

/// Assigns `fitness = score / Σ score` and returns the raw sum.
///
/// A non-positive or non-finite sum falls back to uniform `1 / N` fitness.
pub fn normalize_fitness(population: &mut [Drone]) -> f64 {
    let sum: f64 = population.iter().map(|d| d.score).sum();
    if sum > 0.0 && sum.is_finite() {
        for drone in population.iter_mut() {
            drone.fitness = drone.score / sum;
        }
    } else {
        tracing::warn!(
            fitness_sum = sum,
            population = population.len(),
            "Degenerate generation, using uniform fitness"
        );
        let uniform = 1.0 / population.len().max(1) as f64;
        for drone in population.iter_mut() {
            drone.fitness = uniform;
        }
    }
    sum
}

/// Stable descending sort by fitness.
pub fn sort_by_fitness(population: &mut [Drone]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_picks_bucket() {
        let fitness = [0.4, 0.3, 0.2, 0.1];
        assert_eq!(select_index(&fitness, 0.0), 0);
        assert_eq!(select_index(&fitness, 0.39), 0);
        assert_eq!(select_index(&fitness, 0.4), 0);
        assert_eq!(select_index(&fitness, 0.41), 1);
        assert_eq!(select_index(&fitness, 0.95), 3);
    }

    #[test]
    fn test_walk_clamps_on_overrun() {
        // Sums to slightly less than one.
        let fitness = [0.333_333, 0.333_333, 0.333_333];
        assert_eq!(select_index(&fitness, 0.999_999_9), 2);
        assert_eq!(select_index(&fitness, 5.0), 2);
    }

    #[test]
    fn test_zero_fitness_entries_are_skipped() {
        let fitness = [0.0, 0.0, 1.0];
        assert_eq!(select_index(&fitness, 0.5), 2);
    }
}

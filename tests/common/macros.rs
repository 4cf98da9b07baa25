/// Asserts that every drone in the population is down.
#[macro_export]
macro_rules! assert_all_down {
    ($engine:expr) => {
        assert!(
            $engine.population.iter().all(|d| !d.alive && d.body.is_none()),
            "Expected every drone to be down with no body"
        );
    };
}

/// Asserts that the world holds the four walls plus `$drones` bodies.
#[macro_export]
macro_rules! assert_bodies {
    ($world:expr, $drones:expr) => {
        assert_eq!(
            $world.body_count(),
            4 + $drones,
            "Body count mismatch, leaked or missing drone bodies"
        );
    };
}

/// Asserts two floats are within `$eps` of each other.
#[macro_export]
macro_rules! assert_close {
    ($a:expr, $b:expr, $eps:expr) => {
        let (a, b) = ($a as f64, $b as f64);
        assert!((a - b).abs() <= $eps, "{} is not within {} of {}", a, $eps, b);
    };
}

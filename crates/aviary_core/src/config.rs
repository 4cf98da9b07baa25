//! Configuration management for training parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section has defaults, so a partial file only
//! needs the values it changes.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [arena]
//! width = 1200.0
//! height = 800.0
//!
//! [drone]
//! max_duration = 1000
//! speed_weight = 0.035
//!
//! [evolution]
//! population_size = 100
//! elite_fraction = 0.1
//! seed = 42
//! ```

use aviary_data::{Arena, Vec2};
use serde::{Deserialize, Serialize};

/// Arena geometry and integrator settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Downward acceleration in arena units per second squared.
    pub gravity: f32,
    /// Physics steps per simulated second. One step is one tick.
    pub ticks_per_second: f32,
    /// Thickness of the static walls placed just outside the arena.
    pub wall_thickness: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            gravity: 1000.0,
            ticks_per_second: 60.0,
            wall_thickness: 20.0,
        }
    }
}

impl ArenaConfig {
    #[must_use]
    pub fn arena(&self) -> Arena {
        Arena {
            width: self.width,
            height: self.height,
        }
    }

    #[must_use]
    pub fn dt(&self) -> f32 {
        1.0 / self.ticks_per_second
    }
}

/// Drone body, thrusters and the waypoint course.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DroneConfig {
    /// Edge length of the square hull.
    pub size: f32,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Force of one thruster at full power.
    pub thruster_force: f32,
    /// Mount points of the left and right thruster in body space.
    pub thruster_offsets: [[f32; 2]; 2],
    pub thruster_size: [f32; 2],
    /// Ticks allowed per waypoint before the drone times out.
    pub max_duration: u32,
    pub arrival_radius: f32,
    /// Consecutive ticks inside the arrival radius needed to clear a waypoint.
    pub dwell_ticks: u32,
    /// Bonus per tick left on the waypoint clock when a waypoint is cleared.
    pub speed_weight: f64,
    /// Flat bonus for clearing a waypoint.
    pub arrival_bonus: f64,
    /// Multiplier mapping angle outputs in `[-1, 1]` to radians.
    pub angle_scale: f32,
    /// Spawn point is horizontally centered, this far above the floor.
    pub spawn_height: f32,
    pub spawn_angle: f32,
    /// Waypoints as fractions of the arena size.
    pub waypoints: Vec<[f32; 2]>,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            size: 20.0,
            mass: 1.0,
            linear_damping: 0.6,
            angular_damping: 0.6,
            thruster_force: 1600.0,
            thruster_offsets: [[-10.0, 10.0], [10.0, 10.0]],
            thruster_size: [5.0, 10.0],
            max_duration: 1000,
            arrival_radius: 20.0,
            dwell_ticks: 100,
            speed_weight: 0.035,
            arrival_bonus: 60.0,
            angle_scale: std::f32::consts::FRAC_PI_2,
            spawn_height: 400.0,
            spawn_angle: 0.0,
            waypoints: vec![
                [0.5, 0.5],
                [0.3, 0.7],
                [0.4, 0.6],
                [0.6, 0.3],
                [0.2, 0.8],
                [0.5, 0.5],
            ],
        }
    }
}

impl DroneConfig {
    /// Resolves the fractional waypoint course against an arena.
    #[must_use]
    pub fn waypoints_for(&self, arena: &Arena) -> Vec<Vec2> {
        self.waypoints
            .iter()
            .map(|[fx, fy]| arena.from_fraction(*fx, *fy))
            .collect()
    }

    /// Spawn point, clamped so the hull starts fully inside the arena.
    #[must_use]
    pub fn spawn_point(&self, arena: &Arena) -> Vec2 {
        let margin = self.size;
        let x = (arena.width / 2.0).round();
        let y = (arena.height - self.spawn_height)
            .round()
            .clamp(margin, (arena.height - margin).max(margin));
        Vec2::new(x, y)
    }
}

/// How two parent controllers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CrossoverStrategy {
    /// A fair coin picks one parent and the child inherits all of its weights.
    #[default]
    WholeNetwork,
    /// Every scalar is drawn from either parent independently.
    Uniform,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ControllerConfig {
    /// Per-weight probability of receiving Gaussian noise.
    pub mutation_rate: f32,
    /// Standard deviation of the mutation noise.
    pub mutation_std: f32,
    pub crossover: CrossoverStrategy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mutation_rate: 0.2,
            mutation_std: 0.25,
            crossover: CrossoverStrategy::WholeNetwork,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Share of the population carried over unchanged. At least one elite is kept.
    pub elite_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_fraction: 0.1,
            seed: None,
        }
    }
}

/// Headless frame loop settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrainerConfig {
    /// Simulation ticks per frame.
    pub speed: u32,
    pub history_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            speed: 1,
            history_dir: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub arena: ArenaConfig,
    pub drone: DroneConfig,
    pub controller: ControllerConfig,
    pub evolution: EvolutionConfig,
    pub trainer: TrainerConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Arena validation
        anyhow::ensure!(self.arena.width > 0.0, "Arena width must be positive");
        anyhow::ensure!(self.arena.height > 0.0, "Arena height must be positive");
        anyhow::ensure!(
            self.arena.ticks_per_second > 0.0,
            "Ticks per second must be positive"
        );
        anyhow::ensure!(
            self.arena.wall_thickness > 0.0,
            "Wall thickness must be positive"
        );

        // Drone validation
        anyhow::ensure!(self.drone.size > 0.0, "Drone size must be positive");
        anyhow::ensure!(self.drone.mass > 0.0, "Drone mass must be positive");
        anyhow::ensure!(
            self.drone.thruster_force >= 0.0,
            "Thruster force must be non-negative"
        );
        anyhow::ensure!(self.drone.max_duration > 0, "Max duration must be positive");
        anyhow::ensure!(self.drone.dwell_ticks > 0, "Dwell ticks must be positive");
        anyhow::ensure!(
            self.drone.arrival_radius >= 0.0,
            "Arrival radius must be non-negative"
        );
        anyhow::ensure!(
            !self.drone.waypoints.is_empty(),
            "At least one waypoint is required"
        );
        anyhow::ensure!(
            self.drone
                .waypoints
                .iter()
                .flatten()
                .all(|f| (0.0..=1.0).contains(f)),
            "Waypoints must be fractions in [0.0, 1.0]"
        );

        // Controller validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.controller.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.controller.mutation_std >= 0.0 && self.controller.mutation_std.is_finite(),
            "Mutation std must be finite and non-negative"
        );

        // Evolution validation
        anyhow::ensure!(
            self.evolution.population_size > 0,
            "Population size must be positive"
        );
        anyhow::ensure!(
            self.evolution.population_size <= 10000,
            "Population size too large (max 10000)"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.elite_fraction),
            "Elite fraction must be in [0.0, 1.0]"
        );

        anyhow::ensure!(self.trainer.speed > 0, "Trainer speed must be positive");

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Hash of every parameter that influences training outcomes.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.arena).as_bytes());
        hasher.update(format!("{:?}", self.drone).as_bytes());
        hasher.update(format!("{:?}", self.controller).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_arena_width() {
        let config = AppConfig {
            arena: ArenaConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mutation_rate() {
        let config = AppConfig {
            controller: ControllerConfig {
                mutation_rate: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_population_rejected() {
        let config = AppConfig {
            evolution: EvolutionConfig {
                population_size: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_waypoint_fraction_out_of_range() {
        let mut config = AppConfig::default();
        config.drone.waypoints.push([1.5, 0.5]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [evolution]
            population_size = 12
            seed = 7
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.evolution.population_size, 12);
        assert_eq!(config.evolution.seed, Some(7));
        assert_eq!(config.drone.max_duration, 1000);
        assert_eq!(config.controller.crossover, CrossoverStrategy::WholeNetwork);
    }

    #[test]
    fn test_default_course_resolves_to_arena_units() {
        let config = AppConfig::default();
        let arena = config.arena.arena();
        let waypoints = config.drone.waypoints_for(&arena);
        assert_eq!(waypoints.len(), 6);
        assert_eq!(waypoints[0], Vec2::new(600.0, 400.0));
        assert_eq!(waypoints[1], Vec2::new(360.0, 560.0));
    }

    #[test]
    fn test_spawn_point_clamped_in_small_arena() {
        let mut config = AppConfig::default();
        config.arena.height = 300.0;
        let spawn = config.drone.spawn_point(&config.arena.arena());
        assert!(spawn.y >= config.drone.size);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
    }
}

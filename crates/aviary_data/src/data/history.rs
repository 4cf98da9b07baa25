use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a drone left the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Touched one of the arena boundaries.
    Collision,
    /// Spent `max_duration` ticks on a single waypoint.
    Timeout,
    /// Dwelled on the final waypoint.
    Completed,
}

impl DeathCause {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Collision => "collision",
            Self::Timeout => "timeout",
            Self::Completed => "completed",
        }
    }
}

/// Serializable digest of one finished generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub id: u32,
    pub population: usize,
    /// Sum of raw scores divided by the population size.
    pub mean_fitness: f64,
    pub fitness_sum: f64,
    pub best_score: f64,
    pub best_waypoints: usize,
    pub collisions: usize,
    pub timeouts: usize,
    pub completions: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "event")]
pub enum LiveEvent {
    GenerationCompleted {
        summary: GenerationSummary,
        highscore: f64,
        timestamp: String,
    },
    Reseeded {
        population: usize,
        timestamp: String,
    },
    FormationArrived {
        drone: Uuid,
        tick: u64,
        timestamp: String,
    },
}

//! Serialization utilities with error handling.

use crate::error::{IoError, Result};
use serde::{Deserialize, Serialize};

/// Serializes data to compact JSON.
pub fn to_json<T>(data: &T) -> Result<String>
where
    T: Serialize,
{
    serde_json::to_string(data)
        .map_err(|e| IoError::serialization(format!("JSON serialization failed: {}", e)))
}

/// Deserializes data from a JSON string. Blank input is a validation error.
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty JSON string"));
    }

    serde_json::from_str(json)
        .map_err(|e| IoError::serialization(format!("JSON deserialization failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aviary_data::GenerationSummary;

    #[test]
    fn test_summary_json_roundtrip() {
        let summary = GenerationSummary {
            id: 3,
            population: 100,
            mean_fitness: 1.5,
            fitness_sum: 150.0,
            best_score: 12.0,
            best_waypoints: 2,
            collisions: 40,
            timeouts: 59,
            completions: 1,
        };
        let json = to_json(&summary).unwrap();
        let restored: GenerationSummary = from_json(&json).unwrap();
        assert_eq!(summary, restored);
    }

    #[test]
    fn test_empty_json_fails() {
        let result: Result<GenerationSummary> = from_json("  ");
        assert!(matches!(result, Err(IoError::Validation(_))));
    }

    #[test]
    fn test_invalid_json_fails() {
        let result: Result<GenerationSummary> = from_json("{ invalid json");
        assert!(matches!(result, Err(IoError::Serialization(_))));
    }
}

//! Routing configuration.

use serde::{Deserialize, Serialize};

/// Search preference: minimize arrival time, or bias against walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Fastest,
    LeastWalking,
}

/// Tuning knobs for the multimodal planner.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Walking speed in meters per second.
    pub walk_speed_mps: f64,

    /// Maximum number of candidate stops per endpoint.
    pub max_candidate_stops: usize,

    /// Radius around each endpoint searched for candidate stops (meters).
    pub candidate_radius_m: f64,

    /// Radius of the street graph fetched around the request midpoint
    /// (meters).
    pub street_graph_radius_m: f64,

    /// Extra seconds charged per walked meter under
    /// [`Preference::LeastWalking`]. Biases the scan toward solutions with
    /// less total walking without changing earliest-arrival semantics.
    pub least_walking_penalty_s_per_m: f64,
}

impl RoutingConfig {
    /// Walk penalty in seconds per meter for a preference.
    pub fn penalty_s_per_m(&self, preference: Preference) -> f64 {
        match preference {
            Preference::Fastest => 0.0,
            Preference::LeastWalking => self.least_walking_penalty_s_per_m,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walk_speed_mps: 1.4,
            max_candidate_stops: 12,
            candidate_radius_m: 1_500.0,
            street_graph_radius_m: 8_000.0,
            least_walking_penalty_s_per_m: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RoutingConfig::default();

        assert_eq!(config.walk_speed_mps, 1.4);
        assert_eq!(config.max_candidate_stops, 12);
        assert_eq!(config.candidate_radius_m, 1_500.0);
        assert_eq!(config.street_graph_radius_m, 8_000.0);
        assert_eq!(config.least_walking_penalty_s_per_m, 2.0);
    }

    #[test]
    fn penalty_by_preference() {
        let config = RoutingConfig::default();

        assert_eq!(config.penalty_s_per_m(Preference::Fastest), 0.0);
        assert_eq!(config.penalty_s_per_m(Preference::LeastWalking), 2.0);
    }

    #[test]
    fn preference_serde_names() {
        assert_eq!(
            serde_json::to_string(&Preference::LeastWalking).unwrap(),
            "\"least_walking\""
        );
        let p: Preference = serde_json::from_str("\"fastest\"").unwrap();
        assert_eq!(p, Preference::Fastest);
    }
}

//! Weekly driving scenarios.

use serde::{Deserialize, Serialize};

/// The dominant driving style of a generated week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Short trips at low speed.
    City,
    /// Long trips at cruising speed.
    Highway,
    /// A blend of city and highway driving.
    Mixed,
    /// Mixed driving with hard throttle application.
    Aggressive,
    /// Mixed driving in the wrong gear: over-revving and lugging.
    Inefficient,
    /// Engine running with the vehicle stationary.
    Idle,
}

impl Scenario {
    /// Every scenario, in the order used for random selection.
    pub const ALL: [Scenario; 6] = [
        Scenario::City,
        Scenario::Highway,
        Scenario::Mixed,
        Scenario::Aggressive,
        Scenario::Inefficient,
        Scenario::Idle,
    ];

    /// Range target speeds are drawn from, km/h.
    #[must_use]
    pub fn target_speed_range(self) -> (f64, f64) {
        match self {
            Self::City => (10.0, 50.0),
            Self::Highway => (80.0, 120.0),
            Self::Mixed | Self::Aggressive | Self::Inefficient => (15.0, 100.0),
            Self::Idle => (0.0, 0.0),
        }
    }

    /// Probability that a parked vehicle starts its engine at the next sample.
    #[must_use]
    pub fn start_probability(self) -> f64 {
        match self {
            Self::City | Self::Idle => 0.30,
            Self::Highway => 0.20,
            Self::Mixed | Self::Aggressive | Self::Inefficient => 0.25,
        }
    }

    /// Probability that a running engine is switched off at the next sample.
    #[must_use]
    pub fn stop_probability(self) -> f64 {
        match self {
            Self::City => 0.45,
            Self::Highway => 0.35,
            Self::Mixed | Self::Aggressive | Self::Inefficient => 0.40,
            Self::Idle => 0.50,
        }
    }

    /// How much acceleration adds to the throttle position.
    #[must_use]
    pub fn throttle_gain(self) -> f64 {
        match self {
            Self::Aggressive => 2.0,
            _ => 0.5,
        }
    }

    /// Whether the engine runs without the vehicle moving.
    #[must_use]
    pub fn is_stationary(self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::City => write!(f, "city"),
            Self::Highway => write!(f, "highway"),
            Self::Mixed => write!(f, "mixed"),
            Self::Aggressive => write!(f, "aggressive"),
            Self::Inefficient => write!(f, "inefficient"),
            Self::Idle => write!(f, "idle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_display() {
        assert_eq!(Scenario::City.to_string(), "city");
        assert_eq!(Scenario::Inefficient.to_string(), "inefficient");
    }

    #[test]
    fn test_scenario_serde_snake_case() {
        let json = serde_json::to_string(&Scenario::Highway).unwrap();
        assert_eq!(json, "\"highway\"");
        let parsed: Scenario = serde_json::from_str("\"aggressive\"").unwrap();
        assert_eq!(parsed, Scenario::Aggressive);
    }

    #[test]
    fn test_probabilities_are_valid() {
        for scenario in Scenario::ALL {
            assert!((0.0..=1.0).contains(&scenario.start_probability()));
            assert!((0.0..=1.0).contains(&scenario.stop_probability()));
        }
    }

    #[test]
    fn test_target_speed_ranges_within_vehicle_limits() {
        for scenario in Scenario::ALL {
            let (low, high) = scenario.target_speed_range();
            assert!(low <= high);
            assert!(high <= 180.0);
        }
    }

    #[test]
    fn test_only_idle_is_stationary() {
        let stationary: Vec<_> = Scenario::ALL
            .into_iter()
            .filter(|s| s.is_stationary())
            .collect();
        assert_eq!(stationary, vec![Scenario::Idle]);
    }
}

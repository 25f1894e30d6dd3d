//! Priority presets and their weight triples.
//!
//! A preset names a fixed `(quality, cost, latency)` weighting that sums to
//! 1.0. The table is part of the routing contract and is not configurable
//! at runtime; callers pick a preset per request.

use serde::{Deserialize, Serialize};

/// User-selectable routing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Balanced,
    Quality,
    Cost,
    Latency,
}

impl Preset {
    /// Parse a preset name case-insensitively.
    pub fn from_name(name: &str) -> Option<Preset> {
        match name.trim().to_lowercase().as_str() {
            "balanced" => Some(Preset::Balanced),
            "quality" => Some(Preset::Quality),
            "cost" => Some(Preset::Cost),
            "latency" => Some(Preset::Latency),
            _ => None,
        }
    }

    /// The fixed weight triple for this preset.
    pub fn weights(&self) -> PriorityWeights {
        match self {
            Preset::Balanced => PriorityWeights {
                quality: 0.45,
                cost: 0.30,
                latency: 0.25,
            },
            Preset::Quality => PriorityWeights {
                quality: 0.65,
                cost: 0.15,
                latency: 0.20,
            },
            Preset::Cost => PriorityWeights {
                quality: 0.30,
                cost: 0.50,
                latency: 0.20,
            },
            Preset::Latency => PriorityWeights {
                quality: 0.30,
                cost: 0.20,
                latency: 0.50,
            },
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Balanced => write!(f, "balanced"),
            Preset::Quality => write!(f, "quality"),
            Preset::Cost => write!(f, "cost"),
            Preset::Latency => write!(f, "latency"),
        }
    }
}

/// Non-negative weights over the three scoring criteria, summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub quality: f64,
    pub cost: f64,
    pub latency: f64,
}

impl PriorityWeights {
    /// Name of the dominant criterion, or `None` when the top weight is
    /// shared (balanced performance).
    pub fn dominant(&self) -> Option<&'static str> {
        let max = self.quality.max(self.cost).max(self.latency);
        let mut winners = Vec::with_capacity(3);
        if (self.quality - max).abs() < f64::EPSILON {
            winners.push("quality");
        }
        if (self.cost - max).abs() < f64::EPSILON {
            winners.push("cost");
        }
        if (self.latency - max).abs() < f64::EPSILON {
            winners.push("latency");
        }
        match winners.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_sum_to_one() {
        for preset in [
            Preset::Balanced,
            Preset::Quality,
            Preset::Cost,
            Preset::Latency,
        ] {
            let w = preset.weights();
            assert!(
                (w.quality + w.cost + w.latency - 1.0).abs() < 1e-9,
                "{preset} weights must sum to 1.0"
            );
            assert!(w.quality >= 0.0 && w.cost >= 0.0 && w.latency >= 0.0);
        }
    }

    #[test]
    fn test_balanced_weight_table() {
        let w = Preset::Balanced.weights();
        assert!((w.quality - 0.45).abs() < f64::EPSILON);
        assert!((w.cost - 0.30).abs() < f64::EPSILON);
        assert!((w.latency - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_name_accepts_any_case() {
        assert_eq!(Preset::from_name("QUALITY"), Some(Preset::Quality));
        assert_eq!(Preset::from_name(" cost "), Some(Preset::Cost));
        assert_eq!(Preset::from_name("turbo"), None);
    }

    #[test]
    fn test_default_preset_is_balanced() {
        assert_eq!(Preset::default(), Preset::Balanced);
    }

    #[test]
    fn test_dominant_criterion() {
        assert_eq!(Preset::Quality.weights().dominant(), Some("quality"));
        assert_eq!(Preset::Cost.weights().dominant(), Some("cost"));
        assert_eq!(Preset::Latency.weights().dominant(), Some("latency"));
        assert_eq!(Preset::Balanced.weights().dominant(), Some("quality"));
    }

    #[test]
    fn test_dominant_none_on_tie() {
        let w = PriorityWeights {
            quality: 0.4,
            cost: 0.4,
            latency: 0.2,
        };
        assert_eq!(w.dominant(), None);
    }

    #[test]
    fn test_serde_round_trip_lowercase() {
        let json = serde_json::to_string(&Preset::Latency).unwrap();
        assert_eq!(json, "\"latency\"");
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Preset::Latency);
    }
}

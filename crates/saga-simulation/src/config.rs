use serde::{Deserialize, Serialize};

/// Constants of the encounter-chance formula.
///
/// `clamp(floor, base + danger_weight * danger / 10
///   + min(distance_step * distance, distance_cap)
///   + terrain_weight * sum(terrain modifiers), ceiling)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncounterTuning {
    /// Chance before any modifiers.
    pub base: f64,
    /// Weight of the average danger, scaled to 0..=1.
    pub danger_weight: f64,
    /// Added per tile of distance.
    pub distance_step: f64,
    /// Cap on the distance term.
    pub distance_cap: f64,
    /// Weight of each terrain modifier.
    pub terrain_weight: f64,
    /// Lowest chance for a real journey.
    pub floor: f64,
    /// Highest chance.
    pub ceiling: f64,
}

impl Default for EncounterTuning {
    fn default() -> Self {
        Self {
            base: 0.15,
            danger_weight: 0.4,
            distance_step: 0.05,
            distance_cap: 0.3,
            terrain_weight: 0.02,
            floor: 0.05,
            ceiling: 0.9,
        }
    }
}

impl EncounterTuning {
    /// Set the base chance before danger, distance and terrain.
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    /// Set the lower and upper clamp.
    pub fn with_bounds(mut self, floor: f64, ceiling: f64) -> Self {
        self.floor = floor;
        self.ceiling = ceiling;
        self
    }

    /// Set how much each unit of distance adds, and the cap on that term.
    pub fn with_distance(mut self, step: f64, cap: f64) -> Self {
        self.distance_step = step;
        self.distance_cap = cap;
        self
    }
}

/// Constants of the location clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClockTuning {
    /// Chance after one elapsed action, minus `per_action`.
    pub base: f64,
    /// Added per elapsed action.
    pub per_action: f64,
    /// Highest chance.
    pub cap: f64,
    /// From this many elapsed actions on, simulation always runs.
    pub settle_after: u64,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            base: 0.1,
            per_action: 0.04,
            cap: 0.9,
            settle_after: 20,
        }
    }
}

impl ClockTuning {
    /// Set the elapsed count after which simulation always runs.
    pub fn with_settle_after(mut self, actions: u64) -> Self {
        self.settle_after = actions;
        self
    }
}

/// All simulation tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Travel encounter constants.
    pub encounter: EncounterTuning,
    /// Location clock constants.
    pub clock: ClockTuning,
}

impl SimConfig {
    /// Replace the encounter tuning.
    pub fn with_encounter(mut self, encounter: EncounterTuning) -> Self {
        self.encounter = encounter;
        self
    }

    /// Replace the clock tuning.
    pub fn with_clock(mut self, clock: ClockTuning) -> Self {
        self.clock = clock;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert!((config.encounter.base - 0.15).abs() < f64::EPSILON);
        assert!((config.encounter.ceiling - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.clock.settle_after, 20);
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_encounter(EncounterTuning::default().with_base(0.3).with_bounds(0.0, 1.0))
            .with_clock(ClockTuning::default().with_settle_after(5));
        assert!((config.encounter.base - 0.3).abs() < f64::EPSILON);
        assert!(config.encounter.floor.abs() < f64::EPSILON);
        assert_eq!(config.clock.settle_after, 5);
    }

    #[test]
    fn partial_tuning_deserializes() {
        let t: EncounterTuning = serde_json::from_str(r#"{"base":0.2}"#).unwrap();
        assert!((t.base - 0.2).abs() < f64::EPSILON);
        assert!((t.terrain_weight - 0.02).abs() < f64::EPSILON);
    }
}

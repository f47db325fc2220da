use serde::{Deserialize, Serialize};

use crate::id::FactionId;

/// Reputation bounds with any faction.
pub const REPUTATION_RANGE: (i32, i32) = (-100, 100);

/// A group the player can stand well or badly with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    /// Faction id.
    pub id: FactionId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_reputation")]
    reputation: i32,
}

fn clamp_reputation(value: i64) -> i32 {
    value.clamp(i64::from(REPUTATION_RANGE.0), i64::from(REPUTATION_RANGE.1)) as i32
}

fn deserialize_reputation<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_reputation)
}

impl Faction {
    /// Create a faction with neutral standing.
    pub fn new(id: impl Into<FactionId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            reputation: 0,
        }
    }

    /// The player's standing, within [`REPUTATION_RANGE`].
    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    /// Shift standing by a delta, clamping. Returns the new value.
    pub fn adjust_reputation(&mut self, delta: i64) -> i32 {
        self.reputation = clamp_reputation(i64::from(self.reputation).saturating_add(delta));
        self.reputation
    }
}

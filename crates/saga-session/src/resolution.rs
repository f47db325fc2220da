use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A player action as resolved by the narrator collaborator.
///
/// Only `state_changes` and `initiates_combat` affect the world. The raw
/// change values are parsed one at a time so a single bad entry does not
/// spoil the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionResolution {
    /// Prose for the player.
    pub narrative: String,
    /// Raw `{"type", "data"}` changes.
    pub state_changes: Vec<Value>,
    /// Options offered for the next turn.
    pub suggested_actions: Vec<String>,
    /// NPC id or name to fight once the changes are applied.
    pub initiates_combat: Option<String>,
}

impl ActionResolution {
    /// A resolution carrying only raw changes.
    pub fn with_changes(changes: Vec<Value>) -> Self {
        Self {
            state_changes: changes,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_partial_payload() {
        let r: ActionResolution = serde_json::from_value(json!({
            "narrative": "You step into the inn.",
            "stateChanges": [{"type": "gold_change", "data": {"amount": -2}}],
            "initiatesCombat": null
        }))
        .unwrap();
        assert_eq!(r.state_changes.len(), 1);
        assert!(r.suggested_actions.is_empty());
        assert!(r.initiates_combat.is_none());
    }
}

use serde::{Deserialize, Serialize};

use crate::id::{FactionId, LocationId, NpcId};
use crate::item::WorldItem;

/// Attitude bounds: -100 (sworn enemy) to 100 (devoted friend).
pub const ATTITUDE_RANGE: (i32, i32) = (-100, 100);

/// Clamp an attitude value into [`ATTITUDE_RANGE`].
pub fn clamp_attitude(value: i64) -> i32 {
    value.clamp(i64::from(ATTITUDE_RANGE.0), i64::from(ATTITUDE_RANGE.1)) as i32
}

/// Combat stats shared by every NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    /// Current health.
    pub health: i32,
    /// Health cap.
    pub max_health: i32,
    /// Attack strength.
    pub strength: i32,
    /// Defense.
    pub defense: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            health: 30,
            max_health: 30,
            strength: 6,
            defense: 3,
        }
    }
}

/// Who spoke a line of dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The player character.
    Player,
    /// The NPC.
    Npc,
}

/// One line in an NPC's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationEntry {
    /// Action counter when the line was spoken.
    pub action_number: u64,
    /// Who said it.
    pub speaker: Speaker,
    /// What was said.
    pub text: String,
}

/// A non-player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// Unique identifier.
    pub id: NpcId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Occupation or narrative role.
    #[serde(default)]
    pub role: String,
    /// Behavioral profile for the narrator. Opaque to the engine.
    #[serde(default)]
    pub soul_instruction: String,
    #[serde(default, deserialize_with = "deserialize_attitude")]
    attitude: i32,
    /// Dead NPCs keep their record but take no further part.
    #[serde(default = "default_true")]
    pub is_alive: bool,
    /// Travels with the player.
    #[serde(default)]
    pub is_companion: bool,
    /// Will fight on sight.
    #[serde(default)]
    pub is_hostile: bool,
    /// Where the NPC is. Mirrored by the location's presence list.
    pub current_location_id: LocationId,
    /// Carried items; dropped where the NPC falls in combat.
    #[serde(default)]
    pub inventory: Vec<WorldItem>,
    /// Combat stats.
    #[serde(default)]
    pub stats: Stats,
    /// Experience awarded for defeating this NPC.
    #[serde(default)]
    pub experience_reward: u32,
    /// Gold awarded for defeating this NPC.
    #[serde(default)]
    pub gold_reward: u32,
    /// Faction membership.
    #[serde(default)]
    pub faction_id: Option<FactionId>,
    /// Append-only dialogue log.
    #[serde(default)]
    pub conversation_history: Vec<ConversationEntry>,
}

fn default_true() -> bool {
    true
}

fn deserialize_attitude<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_attitude)
}

impl Npc {
    /// Create a living, neutral NPC at a location with default stats.
    pub fn new(id: impl Into<NpcId>, name: impl Into<String>, location: LocationId) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            role: String::new(),
            soul_instruction: String::new(),
            attitude: 0,
            is_alive: true,
            is_companion: false,
            is_hostile: false,
            current_location_id: location,
            inventory: Vec::new(),
            stats: Stats::default(),
            experience_reward: 0,
            gold_reward: 0,
            faction_id: None,
            conversation_history: Vec::new(),
        }
    }

    /// Set the starting attitude (clamped).
    pub fn with_attitude(mut self, attitude: i32) -> Self {
        self.set_attitude(i64::from(attitude));
        self
    }

    /// Replace the combat stats.
    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    /// Mark as hostile with the given rewards.
    pub fn hostile(mut self, experience_reward: u32, gold_reward: u32) -> Self {
        self.is_hostile = true;
        self.experience_reward = experience_reward;
        self.gold_reward = gold_reward;
        self
    }

    /// Attitude toward the player, always within [`ATTITUDE_RANGE`].
    pub fn attitude(&self) -> i32 {
        self.attitude
    }

    /// Set attitude absolutely, clamping.
    pub fn set_attitude(&mut self, value: i64) {
        self.attitude = clamp_attitude(value);
    }

    /// Shift attitude by a delta, clamping. Returns the new value.
    pub fn adjust_attitude(&mut self, delta: i64) -> i32 {
        self.set_attitude(i64::from(self.attitude).saturating_add(delta));
        self.attitude
    }

    /// Mark dead: zero health, no longer a companion.
    pub fn kill(&mut self) {
        self.is_alive = false;
        self.is_companion = false;
        self.stats.health = 0;
    }

    /// Append a line of dialogue.
    pub fn remember(&mut self, action_number: u64, speaker: Speaker, text: impl Into<String>) {
        self.conversation_history.push(ConversationEntry {
            action_number,
            speaker,
            text: text.into(),
        });
    }
}

/// Partial NPC description as produced by a collaborator.
///
/// Any subset of fields may be present; [`NpcDraft::build`] always
/// returns a complete NPC that satisfies the model invariants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NpcDraft {
    /// Id; generated when absent.
    pub id: Option<NpcId>,
    /// Display name.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Role in the world, e.g. "blacksmith".
    pub role: Option<String>,
    /// Personality notes for the narrator.
    pub soul_instruction: Option<String>,
    /// Starting attitude towards the player.
    pub attitude: Option<i64>,
    /// Whether the NPC starts hostile.
    pub is_hostile: Option<bool>,
    /// Location id or name. Unknown places fall back to the player's location.
    #[serde(alias = "locationId")]
    pub current_location_id: Option<LocationId>,
    /// Items carried.
    pub inventory: Vec<crate::item::ItemDraft>,
    /// Current health.
    pub health: Option<i32>,
    /// Health cap.
    pub max_health: Option<i32>,
    /// Attack strength.
    pub strength: Option<i32>,
    /// Defense.
    pub defense: Option<i32>,
    /// Experience for defeating the NPC.
    pub experience_reward: Option<u32>,
    /// Gold for defeating the NPC.
    pub gold_reward: Option<u32>,
    /// Faction membership.
    pub faction_id: Option<FactionId>,
}

impl NpcDraft {
    /// Start a draft with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Build a complete NPC placed at `location`.
    ///
    /// The caller decides the location because the draft's own
    /// `current_location_id` may name a place that does not exist.
    pub fn build(self, location: LocationId) -> Npc {
        let defaults = Stats::default();
        let max_health = self.max_health.or(self.health).unwrap_or(defaults.max_health).max(1);
        let health = self.health.unwrap_or(max_health).clamp(1, max_health);
        let hostile = self.is_hostile.unwrap_or(false);
        let mut npc = Npc::new(
            self.id.unwrap_or_else(NpcId::generate),
            self.name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Stranger".to_string()),
            location,
        );
        npc.description = self.description.unwrap_or_default();
        npc.role = self.role.unwrap_or_default();
        npc.soul_instruction = self.soul_instruction.unwrap_or_default();
        npc.set_attitude(self.attitude.unwrap_or(if hostile { -50 } else { 0 }));
        npc.is_hostile = hostile;
        npc.inventory = self.inventory.into_iter().map(|d| d.build()).collect();
        npc.stats = Stats {
            health,
            max_health,
            strength: self.strength.unwrap_or(defaults.strength).max(0),
            defense: self.defense.unwrap_or(defaults.defense).max(0),
        };
        npc.experience_reward = self
            .experience_reward
            .unwrap_or(if hostile { (max_health / 2).max(5) as u32 } else { 0 });
        npc.gold_reward = self.gold_reward.unwrap_or(0);
        npc.faction_id = self.faction_id;
        npc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> LocationId {
        LocationId::from("loc_here")
    }

    #[test]
    fn attitude_clamps_both_ways() {
        let mut npc = Npc::new("npc_a", "Ada", here());
        assert_eq!(npc.adjust_attitude(500), 100);
        assert_eq!(npc.adjust_attitude(-1000), -100);
        npc.set_attitude(i64::MAX);
        assert_eq!(npc.attitude(), 100);
    }

    #[test]
    fn kill_clears_companion_and_health() {
        let mut npc = Npc::new("npc_a", "Ada", here());
        npc.is_companion = true;
        npc.kill();
        assert!(!npc.is_alive);
        assert!(!npc.is_companion);
        assert_eq!(npc.stats.health, 0);
    }

    #[test]
    fn empty_draft_builds_valid_npc() {
        let npc = NpcDraft::default().build(here());
        assert!(npc.id.as_str().starts_with("npc_"));
        assert_eq!(npc.name, "Stranger");
        assert!(npc.is_alive);
        assert!(!npc.is_companion);
        assert_eq!(npc.current_location_id, here());
        assert_eq!(npc.stats, Stats::default());
    }

    #[test]
    fn draft_health_never_exceeds_max() {
        let npc = NpcDraft {
            health: Some(80),
            max_health: Some(20),
            ..NpcDraft::named("Brute")
        }
        .build(here());
        assert_eq!(npc.stats.health, 20);
        assert_eq!(npc.stats.max_health, 20);
    }

    #[test]
    fn hostile_draft_gets_rewards_and_bad_attitude() {
        let npc = NpcDraft {
            is_hostile: Some(true),
            max_health: Some(40),
            ..NpcDraft::named("Bandit")
        }
        .build(here());
        assert!(npc.is_hostile);
        assert_eq!(npc.attitude(), -50);
        assert_eq!(npc.experience_reward, 20);
    }

    #[test]
    fn draft_attitude_is_clamped() {
        let npc = NpcDraft {
            attitude: Some(-900),
            ..NpcDraft::named("Grump")
        }
        .build(here());
        assert_eq!(npc.attitude(), -100);
    }

    #[test]
    fn stored_attitude_is_clamped_on_load() {
        let json = r#"{"id":"npc_x","name":"X","attitude":250,"currentLocationId":"loc_here"}"#;
        let npc: Npc = serde_json::from_str(json).unwrap();
        assert_eq!(npc.attitude(), 100);
        assert!(npc.is_alive);
    }
}

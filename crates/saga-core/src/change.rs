//! Typed state change instructions.
//!
//! On the wire a change is `{"type": "<kind>", "data": {...}}`. Parsing is
//! done one change at a time so a single bad entry never poisons the rest
//! of a batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chronicle::WorldEventType;
use crate::error::ChangeError;
use crate::id::{FactionId, ItemId, LocationId, NpcId, QuestId};
use crate::item::ItemDraft;
use crate::location::{LocationDraft, Structure};
use crate::npc::{NpcDraft, Speaker};
use crate::player::KnowledgeKind;
use crate::quest::{QuestDraft, QuestStatus};

/// One atomic mutation of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StateChange {
    /// Move the player to a location given by id or name.
    MovePlayer(MovePlayer),
    /// Put an item into an inventory or at a location.
    AddItem(AddItem),
    /// Take an item out of an inventory or location.
    RemoveItem(RemoveItem),
    /// Add or subtract gold.
    GoldChange(GoldChange),
    /// Hurt the player.
    PlayerDamage(HealthChange),
    /// Heal the player.
    PlayerHeal(HealthChange),
    /// Teach the player something.
    AddKnowledge(KnowledgeChange),
    /// Move an NPC.
    MoveNpc(MoveNpc),
    /// Change how an NPC feels about the player.
    UpdateNpcAttitude(UpdateNpcAttitude),
    /// Kill an NPC.
    NpcDeath(NpcDeath),
    /// An NPC joins the player.
    AddCompanion(NpcRef),
    /// An NPC leaves the player.
    RemoveCompanion(NpcRef),
    /// Bring a new NPC into the world.
    CreateNpc(CreateNpc),
    /// Bring a new location into the world.
    CreateLocation(CreateLocation),
    /// Alter an existing location.
    UpdateLocation(UpdateLocation),
    /// Give the player a quest.
    AddQuest(AddQuest),
    /// Advance or close a quest.
    UpdateQuest(UpdateQuest),
    /// Shift standing with a faction.
    FactionReputation(FactionReputation),
    /// Write to the event log.
    AddEvent(AddEvent),
    /// Append a line to an NPC's conversation history.
    AddConversation(AddConversation),
    /// Award experience.
    ExperienceGain(ExperienceGain),
}

/// Every kind name [`StateChange`] understands.
pub const KNOWN_KINDS: &[&str] = &[
    "move_player",
    "add_item",
    "remove_item",
    "gold_change",
    "player_damage",
    "player_heal",
    "add_knowledge",
    "move_npc",
    "update_npc_attitude",
    "npc_death",
    "add_companion",
    "remove_companion",
    "create_npc",
    "create_location",
    "update_location",
    "add_quest",
    "update_quest",
    "faction_reputation",
    "add_event",
    "add_conversation",
    "experience_gain",
];

/// `move_player` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlayer {
    /// Location id or name.
    pub location_id: String,
}

/// `add_item` payload. Without a target the item goes to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    /// The item to create.
    pub item: ItemDraft,
    /// Location id or name to drop the item at.
    #[serde(default)]
    pub to_location: Option<String>,
    /// NPC to hand the item to.
    #[serde(default)]
    pub to_npc: Option<NpcId>,
}

/// `remove_item` payload. Without a source the player's inventory is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItem {
    /// Item to remove.
    pub item_id: ItemId,
    /// Location id or name to take the item from.
    #[serde(default)]
    pub from_location: Option<String>,
    /// NPC to take the item from.
    #[serde(default)]
    pub from_npc: Option<NpcId>,
}

/// `gold_change` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldChange {
    /// Signed delta.
    pub amount: i64,
}

/// `player_damage` and `player_heal` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChange {
    /// Must not be negative.
    pub amount: i64,
}

/// Knowledge payload: either a fact for one of the sets or a skill level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KnowledgeChange {
    /// A skill level.
    Skill(SkillEntry),
    /// A fact.
    Fact(FactEntry),
}

/// A skill and the level reached in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    /// Skill name.
    pub skill: String,
    /// Level reached.
    #[serde(default = "first_level")]
    pub level: u32,
}

fn first_level() -> u32 {
    1
}

/// A fact for one of the knowledge sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactEntry {
    /// Which set the fact belongs to.
    pub knowledge_type: KnowledgeKind,
    /// The fact itself.
    pub value: String,
}

/// `move_npc` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNpc {
    /// NPC to move.
    pub npc_id: NpcId,
    /// Location id or name.
    pub location_id: String,
}

/// Relative `change` or absolute `attitude`. When both are given the
/// absolute value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNpcAttitude {
    /// NPC whose attitude changes.
    pub npc_id: NpcId,
    /// Relative change.
    #[serde(default)]
    pub change: Option<i64>,
    /// Absolute attitude.
    #[serde(default)]
    pub attitude: Option<i64>,
}

/// `npc_death` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcDeath {
    /// NPC that died.
    pub npc_id: NpcId,
    /// How it happened, for the chronicle.
    #[serde(default)]
    pub death_description: Option<String>,
}

/// Payload naming a single NPC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcRef {
    /// The NPC.
    pub npc_id: NpcId,
}

/// `create_npc` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNpc {
    /// The NPC to build.
    pub npc: NpcDraft,
}

/// `create_location` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLocation {
    /// The location to build.
    pub location: LocationDraft,
}

/// `update_location` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocation {
    /// Location id or name.
    pub location_id: String,
    /// New danger level.
    #[serde(default)]
    pub danger_level: Option<i32>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// Structure to add.
    #[serde(default)]
    pub add_structure: Option<Structure>,
}

/// `add_quest` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddQuest {
    /// The quest to build.
    pub quest: QuestDraft,
}

/// `update_quest` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuest {
    /// Quest to update.
    pub quest_id: QuestId,
    /// New status.
    #[serde(default)]
    pub status: Option<QuestStatus>,
    /// Objective to mark done. Must be one of the quest's objectives.
    #[serde(default)]
    pub completed_objective: Option<String>,
}

/// `faction_reputation` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionReputation {
    /// Faction to adjust.
    pub faction_id: FactionId,
    /// Signed delta.
    pub change: i64,
}

/// `add_event` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEvent {
    /// What happened.
    pub description: String,
    /// Event category.
    #[serde(default)]
    pub event_type: WorldEventType,
    /// NPCs involved.
    #[serde(default)]
    pub involved_npc_ids: Vec<NpcId>,
    /// Whether it counts towards a hero's deeds.
    #[serde(default)]
    pub is_significant: bool,
}

/// `add_conversation` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConversation {
    /// NPC taking part.
    pub npc_id: NpcId,
    /// Who said the line.
    pub speaker: Speaker,
    /// The line.
    pub text: String,
}

/// `experience_gain` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceGain {
    /// Must not be negative.
    pub amount: i64,
}

/// The result of parsing a raw batch: the changes that parsed, and why
/// the others did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBatch {
    /// Changes that parsed.
    pub changes: Vec<StateChange>,
    /// Entries that were skipped.
    pub warnings: Vec<ChangeError>,
}

impl StateChange {
    /// The wire name of this change's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MovePlayer(_) => "move_player",
            Self::AddItem(_) => "add_item",
            Self::RemoveItem(_) => "remove_item",
            Self::GoldChange(_) => "gold_change",
            Self::PlayerDamage(_) => "player_damage",
            Self::PlayerHeal(_) => "player_heal",
            Self::AddKnowledge(_) => "add_knowledge",
            Self::MoveNpc(_) => "move_npc",
            Self::UpdateNpcAttitude(_) => "update_npc_attitude",
            Self::NpcDeath(_) => "npc_death",
            Self::AddCompanion(_) => "add_companion",
            Self::RemoveCompanion(_) => "remove_companion",
            Self::CreateNpc(_) => "create_npc",
            Self::CreateLocation(_) => "create_location",
            Self::UpdateLocation(_) => "update_location",
            Self::AddQuest(_) => "add_quest",
            Self::UpdateQuest(_) => "update_quest",
            Self::FactionReputation(_) => "faction_reputation",
            Self::AddEvent(_) => "add_event",
            Self::AddConversation(_) => "add_conversation",
            Self::ExperienceGain(_) => "experience_gain",
        }
    }

    /// Parse one raw change.
    ///
    /// An unrecognised `type` is reported as [`ChangeError::UnknownKind`];
    /// a known type whose `data` does not fit is [`ChangeError::Malformed`].
    pub fn parse(raw: &Value) -> Result<Self, ChangeError> {
        let kind = match raw.get("type") {
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => {
                return Err(ChangeError::Malformed {
                    kind: other.to_string(),
                    reason: "type is not a string".to_string(),
                });
            }
            None => {
                return Err(ChangeError::Malformed {
                    kind: "<missing>".to_string(),
                    reason: "no type field".to_string(),
                });
            }
        };
        if !KNOWN_KINDS.contains(&kind) {
            return Err(ChangeError::UnknownKind(kind.to_string()));
        }
        serde_json::from_value(raw.clone()).map_err(|e| ChangeError::Malformed {
            kind: kind.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parse a batch, keeping every change that parses.
    pub fn parse_batch<'a>(raw: impl IntoIterator<Item = &'a Value>) -> ParsedBatch {
        let mut batch = ParsedBatch::default();
        for value in raw {
            match Self::parse(value) {
                Ok(change) => batch.changes.push(change),
                Err(e) => batch.warnings.push(e),
            }
        }
        batch
    }

    // -----------------------------------------------------------------------
    // Shorthand constructors
    // -----------------------------------------------------------------------

    /// `move_player` to a location id or name.
    pub fn move_player(location: impl Into<String>) -> Self {
        Self::MovePlayer(MovePlayer {
            location_id: location.into(),
        })
    }

    /// `move_npc` to a location id or name.
    pub fn move_npc(npc: impl Into<NpcId>, location: impl Into<String>) -> Self {
        Self::MoveNpc(MoveNpc {
            npc_id: npc.into(),
            location_id: location.into(),
        })
    }

    /// `add_item` into the player's inventory.
    pub fn give_player(item: ItemDraft) -> Self {
        Self::AddItem(AddItem {
            item,
            to_location: None,
            to_npc: None,
        })
    }

    /// `add_item` at a location.
    pub fn drop_at(item: ItemDraft, location: &LocationId) -> Self {
        Self::AddItem(AddItem {
            item,
            to_location: Some(location.to_string()),
            to_npc: None,
        })
    }

    /// `player_damage`.
    pub fn damage(amount: i64) -> Self {
        Self::PlayerDamage(HealthChange { amount })
    }

    /// `player_heal`.
    pub fn heal(amount: i64) -> Self {
        Self::PlayerHeal(HealthChange { amount })
    }

    /// `gold_change`.
    pub fn gold(amount: i64) -> Self {
        Self::GoldChange(GoldChange { amount })
    }

    /// `create_npc`.
    pub fn create_npc(npc: NpcDraft) -> Self {
        Self::CreateNpc(CreateNpc { npc })
    }

    /// `npc_death`.
    pub fn npc_death(npc: impl Into<NpcId>, description: Option<String>) -> Self {
        Self::NpcDeath(NpcDeath {
            npc_id: npc.into(),
            death_description: description,
        })
    }

    /// `update_npc_attitude` by a relative amount.
    pub fn attitude_change(npc: impl Into<NpcId>, change: i64) -> Self {
        Self::UpdateNpcAttitude(UpdateNpcAttitude {
            npc_id: npc.into(),
            change: Some(change),
            attitude: None,
        })
    }

    /// `add_event`.
    pub fn event(event_type: WorldEventType, description: impl Into<String>) -> Self {
        Self::AddEvent(AddEvent {
            description: description.into(),
            event_type,
            involved_npc_ids: Vec::new(),
            is_significant: false,
        })
    }

    /// The NPC this change would relocate, if any.
    ///
    /// Companions must never be moved by off-screen simulation, so the
    /// location clock filters on this.
    pub fn relocated_npc(&self) -> Option<&NpcId> {
        match self {
            Self::MoveNpc(m) => Some(&m.npc_id),
            Self::AddCompanion(r) => Some(&r.npc_id),
            Self::NpcDeath(d) => Some(&d.npc_id),
            _ => None,
        }
    }
}

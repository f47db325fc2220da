//! The world's memory: an append-only event log and the roll of fallen
//! heroes. Both are read by the narrator collaborator as context and are
//! never edited after the fact.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{LocationId, NpcId};

/// Category of a world event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldEventType {
    /// A fight.
    Combat,
    /// A journey.
    Travel,
    /// A conversation.
    Dialogue,
    /// Something found.
    Discovery,
    /// A death.
    Death,
    /// Quest progress.
    Quest,
    /// Buying or selling.
    Trade,
    /// The world changing on its own.
    WorldChange,
    /// Anything else.
    #[default]
    Other,
}

impl fmt::Display for WorldEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Combat => "combat",
            Self::Travel => "travel",
            Self::Dialogue => "dialogue",
            Self::Discovery => "discovery",
            Self::Death => "death",
            Self::Quest => "quest",
            Self::Trade => "trade",
            Self::WorldChange => "world_change",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// One entry in the world's audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldEvent {
    /// Action counter when the event happened.
    pub action_number: u64,
    /// What happened.
    pub description: String,
    /// Event category.
    #[serde(default, rename = "type", alias = "eventType")]
    pub event_type: WorldEventType,
    /// NPCs involved.
    #[serde(default)]
    pub involved_npc_ids: Vec<NpcId>,
    /// Where it happened.
    #[serde(default)]
    pub location_id: Option<LocationId>,
    /// Significant events are kept as notable deeds when a hero falls.
    #[serde(default)]
    pub is_significant: bool,
}

impl WorldEvent {
    /// Create an insignificant event with no NPCs involved.
    pub fn new(
        action_number: u64,
        event_type: WorldEventType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_number,
            description: description.into(),
            event_type,
            involved_npc_ids: Vec::new(),
            location_id: None,
            is_significant: false,
        }
    }

    /// Set the location the event happened at.
    pub fn at(mut self, location: LocationId) -> Self {
        self.location_id = Some(location);
        self
    }

    /// Add an involved NPC.
    pub fn involving(mut self, npc: NpcId) -> Self {
        if !self.involved_npc_ids.contains(&npc) {
            self.involved_npc_ids.push(npc);
        }
        self
    }

    /// Mark as significant.
    pub fn significant(mut self) -> Self {
        self.is_significant = true;
        self
    }
}

/// A snapshot of a player character taken at the moment of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeceasedHero {
    /// Hero's name.
    pub name: String,
    /// Level reached.
    pub level: u32,
    /// Experience towards the next level.
    pub experience: u32,
    /// Gold carried at death.
    pub gold: u32,
    /// How the hero died.
    pub cause_of_death: String,
    /// Where the hero fell.
    pub location_id: LocationId,
    /// Name of that place at the time.
    #[serde(default)]
    pub location_name: String,
    /// Action counter at death.
    pub died_at_action: u64,
    /// Wall-clock time of death.
    pub died_at: DateTime<Utc>,
    /// Descriptions of the significant events of the hero's life.
    #[serde(default)]
    pub notable_deeds: Vec<String>,
}

use std::fmt;

use saga_core::{ItemDraft, LocationId, NpcDraft, NpcId, StateChange};
use serde::{Deserialize, Serialize};

/// What kind of thing happened on the road.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    /// An enemy attacks. Always stops the journey.
    Combat,
    /// Something is found.
    Discovery,
    /// Someone is met.
    NpcMeeting,
    /// Weather, terrain or other hazards.
    Environmental,
    /// Nothing of note.
    #[default]
    None,
}

impl fmt::Display for EncounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Combat => "combat",
            Self::Discovery => "discovery",
            Self::NpcMeeting => "npc_meeting",
            Self::Environmental => "environmental",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// An encounter as classified by the narrator collaborator.
///
/// The engine only trusts the payloads, never the prose: they are turned
/// into ordinary state changes by [`EncounterResolution::into_changes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EncounterResolution {
    /// Encounter category.
    #[serde(rename = "type", alias = "kind")]
    pub kind: EncounterKind,
    /// Prose for the player.
    pub description: String,
    /// Whether the journey stops short. Ignored for combat, which always stops it.
    pub blocks_arrival: bool,
    /// NPC that shows up.
    pub spawned_npc: Option<NpcDraft>,
    /// Item found on the way.
    pub found_item: Option<ItemDraft>,
    /// Damage taken on the way.
    pub damage: Option<i64>,
}

impl EncounterResolution {
    /// An encounter of `kind` with no payload.
    pub fn new(kind: EncounterKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            ..Self::default()
        }
    }

    /// Whether the player stays at the departure point.
    pub fn blocks(&self) -> bool {
        self.kind == EncounterKind::Combat || self.blocks_arrival
    }

    /// Turn the payload into state changes that take effect at `at`.
    ///
    /// A combat encounter always spawns a hostile NPC, falling back to a
    /// generic ambusher when no description was supplied. Returns the id
    /// of any spawned NPC alongside the changes.
    pub fn into_changes(&self, at: &LocationId) -> (Vec<StateChange>, Option<NpcId>) {
        let mut changes = Vec::new();
        let mut spawned = None;

        let npc = match (self.kind, &self.spawned_npc) {
            (EncounterKind::Combat, Some(draft)) => Some(NpcDraft {
                is_hostile: Some(true),
                ..draft.clone()
            }),
            (EncounterKind::Combat, None) => Some(NpcDraft {
                is_hostile: Some(true),
                description: Some(self.description.clone()),
                ..NpcDraft::named("Ambusher")
            }),
            (_, Some(draft)) => Some(draft.clone()),
            (_, None) => None,
        };
        if let Some(mut draft) = npc {
            let id = draft.id.clone().unwrap_or_else(NpcId::generate);
            draft.id = Some(id.clone());
            draft.current_location_id = Some(at.clone());
            changes.push(StateChange::create_npc(draft));
            spawned = Some(id);
        }

        if let Some(item) = &self.found_item {
            changes.push(StateChange::give_player(item.clone()));
        }
        if let Some(damage) = self.damage.filter(|d| *d > 0) {
            changes.push(StateChange::damage(damage));
        }
        (changes, spawned)
    }
}

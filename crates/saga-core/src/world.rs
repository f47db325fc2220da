use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chronicle::{DeceasedHero, WorldEvent, WorldEventType};
use crate::error::{CoreError, CoreResult};
use crate::faction::Faction;
use crate::id::{FactionId, LocationId, NpcId, QuestId};
use crate::location::Location;
use crate::npc::Npc;
use crate::player::Player;
use crate::quest::Quest;

/// An active fight between the player and one enemy NPC.
///
/// Exists only while combat is running; `None` on the world otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatState {
    /// The NPC being fought.
    pub enemy_npc_id: NpcId,
    /// Whether the player acts next.
    pub player_turn: bool,
    /// Exchanges so far, starting at 1.
    pub turn_count: u32,
    /// Companions present when the fight began.
    #[serde(default)]
    pub companions_in_combat: Vec<NpcId>,
    /// The player braced last turn; the next enemy hit is halved.
    #[serde(default)]
    pub player_defending: bool,
}

impl CombatState {
    /// A fresh fight on the player's turn.
    pub fn new(enemy: NpcId, companions: Vec<NpcId>) -> Self {
        Self {
            enemy_npc_id: enemy,
            player_turn: true,
            turn_count: 1,
            companions_in_combat: companions,
            player_defending: false,
        }
    }
}

/// The root aggregate of all persistent game data.
///
/// Exactly one is live per session. It is cloned, transformed and then
/// swapped in whole, so a half-applied turn is never observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    /// Logical clock. Bumped once per committed turn.
    #[serde(default)]
    pub action_counter: u64,
    /// Display name of the world.
    #[serde(default)]
    pub world_name: String,
    /// The current hero.
    pub player: Player,
    /// Every location, by id.
    #[serde(default)]
    pub locations: BTreeMap<LocationId, Location>,
    /// Every NPC, living or dead, by id.
    #[serde(default)]
    pub npcs: BTreeMap<NpcId, Npc>,
    /// Factions, by id.
    #[serde(default)]
    pub factions: BTreeMap<FactionId, Faction>,
    /// Quests, by id.
    #[serde(default)]
    pub quests: BTreeMap<QuestId, Quest>,
    /// Chronicle of events, oldest first.
    #[serde(default)]
    pub event_history: Vec<WorldEvent>,
    /// Heroes who fell before the current one.
    #[serde(default)]
    pub deceased_heroes: Vec<DeceasedHero>,
    /// The fight under way, if any.
    #[serde(default)]
    pub combat_state: Option<CombatState>,
    /// Where new heroes begin.
    pub starting_location_id: LocationId,
}

impl WorldState {
    /// An empty world holding only the player.
    pub fn new(world_name: impl Into<String>, player: Player) -> Self {
        let starting_location_id = player.current_location_id.clone();
        Self {
            action_counter: 0,
            world_name: world_name.into(),
            player,
            locations: BTreeMap::new(),
            npcs: BTreeMap::new(),
            factions: BTreeMap::new(),
            quests: BTreeMap::new(),
            event_history: Vec::new(),
            deceased_heroes: Vec::new(),
            combat_state: None,
            starting_location_id,
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Find a location by id, falling back to a case-insensitive name match.
    pub fn resolve_location(&self, key: &str) -> Option<&Location> {
        self.locations.get(&LocationId::from(key)).or_else(|| {
            self.locations
                .values()
                .find(|l| l.name.eq_ignore_ascii_case(key))
        })
    }

    /// Like [`resolve_location`](Self::resolve_location) but returns an error.
    pub fn require_location(&self, key: &str) -> CoreResult<&Location> {
        self.resolve_location(key)
            .ok_or_else(|| CoreError::LocationNotFound(key.to_string()))
    }

    /// Get an NPC by id.
    pub fn npc(&self, id: &NpcId) -> CoreResult<&Npc> {
        self.npcs
            .get(id)
            .ok_or_else(|| CoreError::NpcNotFound(id.clone()))
    }

    /// Find an NPC by id or case-insensitive name.
    pub fn resolve_npc(&self, key: &str) -> Option<&Npc> {
        self.npcs
            .get(&NpcId::from(key))
            .or_else(|| self.npcs.values().find(|n| n.name.eq_ignore_ascii_case(key)))
    }

    /// The location the player is standing in.
    pub fn current_location(&self) -> CoreResult<&Location> {
        let id = &self.player.current_location_id;
        self.locations
            .get(id)
            .ok_or_else(|| CoreError::PlayerLocationMissing(id.clone()))
    }

    /// NPCs whose current location is `location`, in id order.
    pub fn npcs_at<'a>(&'a self, location: &'a LocationId) -> impl Iterator<Item = &'a Npc> + 'a {
        self.npcs
            .values()
            .filter(move |n| &n.current_location_id == location)
    }

    /// Whether a fight is running.
    pub fn in_combat(&self) -> bool {
        self.combat_state.is_some()
    }

    // -----------------------------------------------------------------------
    // Mutation helpers
    // -----------------------------------------------------------------------

    /// Insert or replace a location.
    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id.clone(), location);
    }

    /// Insert an NPC and register its presence at its location.
    pub fn add_npc(&mut self, npc: Npc) {
        if let Some(old) = self.npcs.get(&npc.id) {
            let old_location = old.current_location_id.clone();
            if let Some(loc) = self.locations.get_mut(&old_location) {
                loc.remove_presence(&npc.id);
            }
        }
        if let Some(loc) = self.locations.get_mut(&npc.current_location_id) {
            loc.add_presence(&npc.id);
        }
        self.npcs.insert(npc.id.clone(), npc);
    }

    /// Insert or replace a faction.
    pub fn add_faction(&mut self, faction: Faction) {
        self.factions.insert(faction.id.clone(), faction);
    }

    /// Insert or replace a quest.
    pub fn add_quest(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    /// Move an NPC, updating both presence lists. Returns false if the NPC
    /// or destination does not exist; nothing changes in that case.
    pub fn relocate_npc(&mut self, npc_id: &NpcId, to: &LocationId) -> bool {
        if !self.locations.contains_key(to) {
            return false;
        }
        let Some(npc) = self.npcs.get_mut(npc_id) else {
            return false;
        };
        let from = std::mem::replace(&mut npc.current_location_id, to.clone());
        if let Some(loc) = self.locations.get_mut(&from) {
            loc.remove_presence(npc_id);
        }
        if let Some(loc) = self.locations.get_mut(to) {
            loc.add_presence(npc_id);
        }
        true
    }

    /// Append to the event log.
    pub fn record_event(&mut self, event: WorldEvent) {
        self.event_history.push(event);
    }

    /// An event stamped with the current action and the player's location.
    pub fn event_here(&self, event_type: WorldEventType, description: impl Into<String>) -> WorldEvent {
        WorldEvent::new(self.action_counter, event_type, description)
            .at(self.player.current_location_id.clone())
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Every place where a presence list disagrees with NPC locations.
    pub fn presence_violations(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (loc_id, loc) in &self.locations {
            for npc_id in &loc.present_npc_ids {
                match self.npcs.get(npc_id) {
                    None => problems.push(format!("{loc_id} lists unknown npc {npc_id}")),
                    Some(npc) if &npc.current_location_id != loc_id => problems.push(format!(
                        "{loc_id} lists {npc_id}, who is at {}",
                        npc.current_location_id
                    )),
                    Some(_) => {}
                }
            }
            let mut seen = std::collections::BTreeSet::new();
            for npc_id in &loc.present_npc_ids {
                if !seen.insert(npc_id) {
                    problems.push(format!("{loc_id} lists {npc_id} twice"));
                }
            }
        }
        for npc in self.npcs.values() {
            if let Some(loc) = self.locations.get(&npc.current_location_id) {
                if !loc.is_present(&npc.id) {
                    problems.push(format!("{} is missing from {}", npc.id, loc.id));
                }
            }
        }
        problems
    }

    /// Re-derive every presence list from NPC locations, keeping the
    /// existing order where it is already correct. Returns the number of
    /// entries added or removed.
    pub fn rebuild_presence(&mut self) -> usize {
        let mut repairs = 0;
        for (loc_id, loc) in self.locations.iter_mut() {
            let before = loc.present_npc_ids.len();
            let npcs = &self.npcs;
            let mut seen = std::collections::BTreeSet::new();
            loc.present_npc_ids.retain(|id| {
                npcs.get(id).is_some_and(|n| &n.current_location_id == loc_id)
                    && seen.insert(id.clone())
            });
            repairs += before - loc.present_npc_ids.len();
            for npc in npcs.values() {
                if &npc.current_location_id == loc_id && !loc.is_present(&npc.id) {
                    loc.present_npc_ids.push(npc.id.clone());
                    repairs += 1;
                }
            }
        }
        repairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{Coordinates, Terrain};

    fn world() -> WorldState {
        let mut w = WorldState::new("Test", Player::new("Wren", LocationId::from("loc_a")));
        w.add_location(Location::new("loc_a", "Ashford", Coordinates::new(0, 0), Terrain::Village, 0));
        w.add_location(Location::new("loc_b", "Briar Wood", Coordinates::new(2, 0), Terrain::Forest, 4));
        w.add_npc(Npc::new("npc_mira", "Mira", LocationId::from("loc_a")));
        w
    }

    #[test]
    fn resolve_by_id_or_name() {
        let w = world();
        assert_eq!(w.resolve_location("loc_b").unwrap().name, "Briar Wood");
        assert_eq!(w.resolve_location("briar wood").unwrap().id.as_str(), "loc_b");
        assert!(w.resolve_location("Nowhere").is_none());
        assert!(w.require_location("Nowhere").is_err());
    }

    #[test]
    fn add_npc_registers_presence() {
        let w = world();
        assert!(w.locations[&LocationId::from("loc_a")].is_present(&NpcId::from("npc_mira")));
        assert!(w.presence_violations().is_empty());
        assert_eq!(w.npcs_at(&LocationId::from("loc_a")).count(), 1);
    }

    #[test]
    fn relocate_updates_both_sides() {
        let mut w = world();
        assert!(w.relocate_npc(&NpcId::from("npc_mira"), &LocationId::from("loc_b")));
        assert!(!w.locations[&LocationId::from("loc_a")].is_present(&NpcId::from("npc_mira")));
        assert!(w.locations[&LocationId::from("loc_b")].is_present(&NpcId::from("npc_mira")));
        assert!(w.presence_violations().is_empty());
    }

    #[test]
    fn relocate_to_unknown_place_changes_nothing() {
        let mut w = world();
        let before = w.clone();
        assert!(!w.relocate_npc(&NpcId::from("npc_mira"), &LocationId::from("loc_zz")));
        assert_eq!(w, before);
    }

    #[test]
    fn rebuild_repairs_broken_presence() {
        let mut w = world();
        w.locations
            .get_mut(&LocationId::from("loc_a"))
            .unwrap()
            .present_npc_ids
            .clear();
        w.locations
            .get_mut(&LocationId::from("loc_b"))
            .unwrap()
            .present_npc_ids
            .push(NpcId::from("npc_ghost"));
        assert_eq!(w.presence_violations().len(), 2);
        assert_eq!(w.rebuild_presence(), 2);
        assert!(w.presence_violations().is_empty());
    }

    #[test]
    fn event_here_is_stamped() {
        let mut w = world();
        w.action_counter = 7;
        let e = w.event_here(WorldEventType::Trade, "Bought rope");
        assert_eq!(e.action_number, 7);
        assert_eq!(e.location_id, Some(LocationId::from("loc_a")));
    }
}

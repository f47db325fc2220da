//! Applies [`StateChange`]s to a [`WorldState`].
//!
//! Changes apply strictly in order. Each one is validated against the
//! state as it stands after the previous change, and only then mutates
//! anything, so a rejected change leaves no trace. Rejections become
//! warnings; the rest of the batch still runs.

use tracing::{debug, warn};

use crate::change::{
    AddConversation, AddEvent, AddItem, AddQuest, CreateLocation, CreateNpc, ExperienceGain,
    FactionReputation, KnowledgeChange, MoveNpc, MovePlayer, NpcDeath, NpcRef, RemoveItem,
    StateChange, UpdateLocation, UpdateNpcAttitude, UpdateQuest,
};
use crate::chronicle::{WorldEvent, WorldEventType};
use crate::error::ChangeError;
use crate::id::{LocationId, NpcId};
use crate::item::WorldItem;
use crate::player::KnowledgeKind;
use crate::world::WorldState;

type Step = Result<(), ChangeError>;

/// The outcome of reducing a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// The new state.
    pub state: WorldState,
    /// How many changes took effect.
    pub applied: usize,
    /// One entry per skipped change, in batch order.
    pub warnings: Vec<ChangeError>,
}

/// Apply a batch to a copy of `state`. The input is not touched.
pub fn apply(state: &WorldState, changes: &[StateChange]) -> Reduction {
    let mut next = state.clone();
    let warnings = apply_in_place(&mut next, changes);
    Reduction {
        state: next,
        applied: changes.len() - warnings.len(),
        warnings,
    }
}

/// Apply a batch directly to `state`, returning a warning per skipped change.
pub fn apply_in_place(state: &mut WorldState, changes: &[StateChange]) -> Vec<ChangeError> {
    let mut warnings = Vec::new();
    for change in changes {
        match apply_change(state, change) {
            Ok(()) => debug!(kind = change.kind(), "applied state change"),
            Err(e) => {
                warn!(kind = change.kind(), error = %e, "skipped state change");
                warnings.push(e);
            }
        }
    }
    warnings
}

/// Apply a single change. On error the state is unchanged.
pub fn apply_change(state: &mut WorldState, change: &StateChange) -> Step {
    match change {
        StateChange::MovePlayer(c) => move_player(state, c),
        StateChange::AddItem(c) => add_item(state, c),
        StateChange::RemoveItem(c) => remove_item(state, c),
        StateChange::GoldChange(c) => {
            state.player.change_gold(c.amount);
            Ok(())
        }
        StateChange::PlayerDamage(c) => {
            let amount = non_negative("player_damage", c.amount)?;
            state.player.take_damage(amount);
            Ok(())
        }
        StateChange::PlayerHeal(c) => {
            let amount = non_negative("player_heal", c.amount)?;
            state.player.heal(amount);
            Ok(())
        }
        StateChange::AddKnowledge(c) => {
            add_knowledge(state, c);
            Ok(())
        }
        StateChange::MoveNpc(c) => move_npc(state, c),
        StateChange::UpdateNpcAttitude(c) => update_npc_attitude(state, c),
        StateChange::NpcDeath(c) => npc_death(state, c),
        StateChange::AddCompanion(c) => add_companion(state, c),
        StateChange::RemoveCompanion(c) => remove_companion(state, c),
        StateChange::CreateNpc(c) => create_npc(state, c),
        StateChange::CreateLocation(c) => create_location(state, c),
        StateChange::UpdateLocation(c) => update_location(state, c),
        StateChange::AddQuest(c) => add_quest(state, c),
        StateChange::UpdateQuest(c) => update_quest(state, c),
        StateChange::FactionReputation(c) => faction_reputation(state, c),
        StateChange::AddEvent(c) => {
            add_event(state, c);
            Ok(())
        }
        StateChange::AddConversation(c) => add_conversation(state, c),
        StateChange::ExperienceGain(c) => experience_gain(state, c),
    }
}

fn non_negative(kind: &'static str, amount: i64) -> Result<i32, ChangeError> {
    if amount < 0 {
        return Err(ChangeError::rejected(kind, format!("negative amount {amount}")));
    }
    Ok(amount.min(i64::from(i32::MAX)) as i32)
}

fn location_key(state: &WorldState, kind: &'static str, key: &str) -> Result<LocationId, ChangeError> {
    state
        .resolve_location(key)
        .map(|l| l.id.clone())
        .ok_or_else(|| ChangeError::missing(kind, "location", key))
}

fn require_npc(state: &WorldState, kind: &'static str, id: &NpcId) -> Step {
    if state.npcs.contains_key(id) {
        Ok(())
    } else {
        Err(ChangeError::missing(kind, "npc", id))
    }
}

fn move_player(state: &mut WorldState, c: &MovePlayer) -> Step {
    const KIND: &str = "move_player";
    let to = location_key(state, KIND, &c.location_id)?;
    if state.in_combat() {
        return Err(ChangeError::rejected(KIND, "player is in combat"));
    }

    state.player.current_location_id = to.clone();
    state
        .player
        .knowledge
        .learn(KnowledgeKind::Location, to.as_str());
    if let Some(loc) = state.locations.get_mut(&to) {
        loc.last_visited_at_action = state.action_counter;
    }
    for companion in state.player.companion_ids.clone() {
        state.relocate_npc(&companion, &to);
    }
    Ok(())
}

/// Where an item goes to or comes from.
enum Container {
    Player,
    Location(LocationId),
    Npc(NpcId),
}

fn container(
    state: &WorldState,
    kind: &'static str,
    location: Option<&str>,
    npc: Option<&NpcId>,
) -> Result<Container, ChangeError> {
    match (location, npc) {
        (Some(_), Some(_)) => Err(ChangeError::rejected(
            kind,
            "both a location and an npc were given",
        )),
        (Some(key), None) => location_key(state, kind, key).map(Container::Location),
        (None, Some(id)) => {
            require_npc(state, kind, id)?;
            Ok(Container::Npc(id.clone()))
        }
        (None, None) => Ok(Container::Player),
    }
}

fn inventory_mut<'a>(state: &'a mut WorldState, target: &Container) -> Option<&'a mut Vec<WorldItem>> {
    match target {
        Container::Player => Some(&mut state.player.inventory),
        Container::Location(id) => state.locations.get_mut(id).map(|l| &mut l.items),
        Container::Npc(id) => state.npcs.get_mut(id).map(|n| &mut n.inventory),
    }
}

fn add_item(state: &mut WorldState, c: &AddItem) -> Step {
    const KIND: &str = "add_item";
    let target = container(state, KIND, c.to_location.as_deref(), c.to_npc.as_ref())?;
    let item = c.item.clone().build();
    let items = inventory_mut(state, &target).ok_or_else(|| ChangeError::rejected(KIND, "no container"))?;
    if items.iter().any(|i| i.id == item.id) {
        return Err(ChangeError::rejected(
            KIND,
            format!("item {} is already there", item.id),
        ));
    }
    items.push(item);
    Ok(())
}

fn remove_item(state: &mut WorldState, c: &RemoveItem) -> Step {
    const KIND: &str = "remove_item";
    let source = container(state, KIND, c.from_location.as_deref(), c.from_npc.as_ref())?;
    if let Some(items) = inventory_mut(state, &source) {
        items.retain(|i| i.id != c.item_id);
    }
    Ok(())
}

fn add_knowledge(state: &mut WorldState, c: &KnowledgeChange) {
    let knowledge = &mut state.player.knowledge;
    let learned = match c {
        KnowledgeChange::Fact(f) => knowledge.learn(f.knowledge_type, f.value.clone()),
        KnowledgeChange::Skill(s) => knowledge.learn_skill(s.skill.clone(), s.level),
    };
    if !learned {
        debug!("knowledge already held");
    }
}

fn move_npc(state: &mut WorldState, c: &MoveNpc) -> Step {
    const KIND: &str = "move_npc";
    let npc = state
        .npcs
        .get(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    if !npc.is_alive {
        return Err(ChangeError::rejected(KIND, format!("{} is dead", c.npc_id)));
    }
    if npc.is_companion {
        return Err(ChangeError::rejected(
            KIND,
            format!("{} travels with the player", c.npc_id),
        ));
    }
    if state
        .combat_state
        .as_ref()
        .is_some_and(|cs| cs.enemy_npc_id == c.npc_id)
    {
        return Err(ChangeError::rejected(KIND, format!("{} is in combat", c.npc_id)));
    }
    let to = location_key(state, KIND, &c.location_id)?;
    state.relocate_npc(&c.npc_id, &to);
    Ok(())
}

fn update_npc_attitude(state: &mut WorldState, c: &UpdateNpcAttitude) -> Step {
    const KIND: &str = "update_npc_attitude";
    let npc = state
        .npcs
        .get_mut(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    match (c.attitude, c.change) {
        (Some(absolute), _) => npc.set_attitude(absolute),
        (None, Some(delta)) => {
            npc.adjust_attitude(delta);
        }
        (None, None) => {
            return Err(ChangeError::Malformed {
                kind: KIND.to_string(),
                reason: "neither change nor attitude given".to_string(),
            });
        }
    }
    Ok(())
}

fn npc_death(state: &mut WorldState, c: &NpcDeath) -> Step {
    const KIND: &str = "npc_death";
    let npc = state
        .npcs
        .get_mut(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    if !npc.is_alive {
        debug!(npc = %c.npc_id, "npc already dead");
        return Ok(());
    }
    npc.kill();
    let name = npc.name.clone();
    let location = npc.current_location_id.clone();

    state.player.companion_ids.retain(|id| id != &c.npc_id);
    let was_enemy = state
        .combat_state
        .as_ref()
        .is_some_and(|cs| cs.enemy_npc_id == c.npc_id);
    if was_enemy {
        state.combat_state = None;
    } else if let Some(combat) = state.combat_state.as_mut() {
        combat.companions_in_combat.retain(|id| id != &c.npc_id);
    }

    let description = c
        .death_description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| format!("{name} died"));
    let event = WorldEvent::new(state.action_counter, WorldEventType::Death, description)
        .at(location)
        .involving(c.npc_id.clone())
        .significant();
    state.record_event(event);
    Ok(())
}

fn add_companion(state: &mut WorldState, c: &NpcRef) -> Step {
    const KIND: &str = "add_companion";
    let npc = state
        .npcs
        .get(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    if !npc.is_alive {
        return Err(ChangeError::rejected(KIND, format!("{} is dead", c.npc_id)));
    }
    if npc.is_companion && state.player.has_companion(&c.npc_id) {
        return Ok(());
    }
    if state
        .combat_state
        .as_ref()
        .is_some_and(|cs| cs.enemy_npc_id == c.npc_id)
    {
        return Err(ChangeError::rejected(KIND, format!("{} is the enemy", c.npc_id)));
    }

    let here = state.player.current_location_id.clone();
    state.relocate_npc(&c.npc_id, &here);
    if let Some(npc) = state.npcs.get_mut(&c.npc_id) {
        npc.is_companion = true;
        npc.is_hostile = false;
    }
    if !state.player.has_companion(&c.npc_id) {
        state.player.companion_ids.push(c.npc_id.clone());
    }
    Ok(())
}

fn remove_companion(state: &mut WorldState, c: &NpcRef) -> Step {
    const KIND: &str = "remove_companion";
    let npc = state
        .npcs
        .get_mut(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    npc.is_companion = false;
    state.player.companion_ids.retain(|id| id != &c.npc_id);
    if let Some(combat) = state.combat_state.as_mut() {
        combat.companions_in_combat.retain(|id| id != &c.npc_id);
    }
    Ok(())
}

fn create_npc(state: &mut WorldState, c: &CreateNpc) -> Step {
    const KIND: &str = "create_npc";
    if let Some(id) = &c.npc.id {
        if state.npcs.contains_key(id) {
            return Err(ChangeError::rejected(KIND, format!("{id} already exists")));
        }
    }
    let location = c
        .npc
        .current_location_id
        .as_ref()
        .and_then(|key| state.resolve_location(key.as_str()))
        .map(|l| l.id.clone())
        .unwrap_or_else(|| state.player.current_location_id.clone());
    let npc = c.npc.clone().build(location);
    debug!(npc = %npc.id, location = %npc.current_location_id, "created npc");
    state.add_npc(npc);
    Ok(())
}

fn create_location(state: &mut WorldState, c: &CreateLocation) -> Step {
    const KIND: &str = "create_location";
    if let Some(id) = &c.location.id {
        if state.locations.contains_key(id) {
            return Err(ChangeError::rejected(KIND, format!("{id} already exists")));
        }
    }
    let origin = state
        .current_location()
        .map(|l| l.coordinates)
        .unwrap_or_default();
    let reveal = c.location.reveal;
    let location = c.location.clone().build(origin);
    if reveal {
        state
            .player
            .knowledge
            .learn(KnowledgeKind::Location, location.id.as_str());
    }
    state.add_location(location);
    Ok(())
}

fn update_location(state: &mut WorldState, c: &UpdateLocation) -> Step {
    const KIND: &str = "update_location";
    let id = location_key(state, KIND, &c.location_id)?;
    let Some(loc) = state.locations.get_mut(&id) else {
        return Err(ChangeError::missing(KIND, "location", &c.location_id));
    };
    if let Some(danger) = c.danger_level {
        loc.set_danger_level(danger);
    }
    if let Some(description) = &c.description {
        loc.description = description.clone();
    }
    if let Some(structure) = &c.add_structure {
        if !loc.structures.iter().any(|s| s.name == structure.name) {
            loc.structures.push(structure.clone());
        }
    }
    Ok(())
}

fn add_quest(state: &mut WorldState, c: &AddQuest) -> Step {
    const KIND: &str = "add_quest";
    if let Some(id) = &c.quest.id {
        if state.quests.contains_key(id) {
            return Err(ChangeError::rejected(KIND, format!("{id} already exists")));
        }
    }
    let quest = c.quest.clone().build();
    let event = state.event_here(WorldEventType::Quest, format!("Took on \"{}\"", quest.title));
    state.add_quest(quest);
    state.record_event(event);
    Ok(())
}

fn update_quest(state: &mut WorldState, c: &UpdateQuest) -> Step {
    const KIND: &str = "update_quest";
    let quest = state
        .quests
        .get_mut(&c.quest_id)
        .ok_or_else(|| ChangeError::missing(KIND, "quest", &c.quest_id))?;
    if let Some(objective) = &c.completed_objective {
        if !quest.objectives.contains(objective) {
            return Err(ChangeError::rejected(
                KIND,
                format!("\"{objective}\" is not an objective of {}", c.quest_id),
            ));
        }
        quest.complete_objective(objective);
    }
    if let Some(status) = c.status {
        quest.status = status;
    }
    Ok(())
}

fn faction_reputation(state: &mut WorldState, c: &FactionReputation) -> Step {
    const KIND: &str = "faction_reputation";
    let faction = state
        .factions
        .get_mut(&c.faction_id)
        .ok_or_else(|| ChangeError::missing(KIND, "faction", &c.faction_id))?;
    faction.adjust_reputation(c.change);
    Ok(())
}

fn add_event(state: &mut WorldState, c: &AddEvent) {
    let mut event = state.event_here(c.event_type, c.description.clone());
    for npc in &c.involved_npc_ids {
        event = event.involving(npc.clone());
    }
    event.is_significant = c.is_significant;
    state.record_event(event);
}

fn add_conversation(state: &mut WorldState, c: &AddConversation) -> Step {
    const KIND: &str = "add_conversation";
    let action = state.action_counter;
    let npc = state
        .npcs
        .get_mut(&c.npc_id)
        .ok_or_else(|| ChangeError::missing(KIND, "npc", &c.npc_id))?;
    npc.remember(action, c.speaker, c.text.clone());
    Ok(())
}

fn experience_gain(state: &mut WorldState, c: &ExperienceGain) -> Step {
    const KIND: &str = "experience_gain";
    if c.amount < 0 {
        return Err(ChangeError::rejected(KIND, format!("negative amount {}", c.amount)));
    }
    let amount = c.amount.min(i64::from(u32::MAX)) as u32;
    if let Some(up) = state.player.gain_experience(amount) {
        debug!(from = up.from_level, to = up.to_level, "player leveled up");
    }
    Ok(())
}

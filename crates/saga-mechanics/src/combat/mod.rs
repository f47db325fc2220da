//! Turn-based combat between the player and a single NPC.
//!
//! `NotInCombat -> InCombat(player turn) -> InCombat(enemy acts) ->
//! {Victory | Defeat | Fled} -> NotInCombat`. The fight lives in
//! [`WorldState::combat_state`]; this module only creates, advances and
//! clears it.

/// Resolving player actions.
pub mod action;

pub use action::{CombatAction, CombatEvent, CombatOutcome, resolve_action};

use saga_core::{CombatState, NpcId, WorldEventType, WorldState};
use tracing::info;

use crate::error::{MechError, MechResult};

/// Chance that a flee attempt succeeds.
pub const FLEE_CHANCE: f64 = 0.5;

/// Spread of the uniform damage variance, in either direction.
pub const DAMAGE_VARIANCE: f64 = 3.0;

/// Damage dealt by one hit.
///
/// `max(1, floor(strength - defense / 2 + variance))`: every hit lands
/// for at least one point.
pub fn damage(strength: i32, defense: i32, variance: f64) -> i32 {
    let raw = f64::from(strength) - 0.5 * f64::from(defense) + variance;
    (raw.floor() as i32).max(1)
}

/// Check that a fight with `enemy` may start and build its state.
///
/// The target must exist, be alive, stand where the player stands and not
/// be a companion; no other fight may be running. Companions standing
/// with the player join in.
pub fn initiate(state: &WorldState, enemy: &NpcId) -> MechResult<CombatState> {
    if let Some(active) = &state.combat_state {
        return Err(MechError::CombatAlreadyActive(active.enemy_npc_id.clone()));
    }
    let npc = state
        .npcs
        .get(enemy)
        .ok_or_else(|| MechError::NpcNotFound(enemy.clone()))?;
    if !npc.is_alive {
        return Err(MechError::NpcNotAlive(enemy.clone()));
    }
    let here = &state.player.current_location_id;
    if &npc.current_location_id != here {
        return Err(MechError::NpcNotPresent(enemy.clone()));
    }
    if npc.is_companion {
        return Err(MechError::NpcIsCompanion(enemy.clone()));
    }

    let companions = state
        .player
        .companion_ids
        .iter()
        .filter(|id| {
            state
                .npcs
                .get(id)
                .is_some_and(|c| c.is_alive && &c.current_location_id == here)
        })
        .cloned()
        .collect();
    Ok(CombatState::new(enemy.clone(), companions))
}

/// Start a fight: [`initiate`], then store the state, mark the enemy
/// hostile and log the event.
pub fn begin(state: &mut WorldState, enemy: &NpcId) -> MechResult<()> {
    let combat = initiate(state, enemy)?;
    let name = match state.npcs.get_mut(enemy) {
        Some(npc) => {
            npc.is_hostile = true;
            npc.name.clone()
        }
        None => return Err(MechError::NpcNotFound(enemy.clone())),
    };
    let event = state
        .event_here(WorldEventType::Combat, format!("A fight broke out with {name}"))
        .involving(enemy.clone());
    state.record_event(event);
    state.combat_state = Some(combat);
    info!(enemy = %enemy, "combat started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_core::{Coordinates, Location, LocationId, Npc, Player, Terrain};

    fn world() -> WorldState {
        let here = LocationId::from("loc_road");
        let mut w = WorldState::new("Test", Player::new("Wren", here.clone()));
        w.add_location(Location::new("loc_road", "Old Road", Coordinates::new(0, 0), Terrain::Road, 2));
        w.add_location(Location::new("loc_far", "Far Hill", Coordinates::new(5, 0), Terrain::Plains, 2));
        w.add_npc(Npc::new("npc_bandit", "Bandit", here.clone()).hostile(20, 5));
        w.add_npc(Npc::new("npc_sela", "Sela", here.clone()));
        w.add_npc(Npc::new("npc_far", "Hermit", LocationId::from("loc_far")));
        w
    }

    #[test]
    fn damage_formula() {
        assert_eq!(damage(10, 4, 0.0), 8);
        assert_eq!(damage(10, 4, -3.0), 5);
        assert_eq!(damage(10, 5, 0.9), 8);
        assert_eq!(damage(10, 5, -0.1), 7);
        assert_eq!(damage(2, 20, 3.0), 1);
    }

    #[test]
    fn initiate_builds_fresh_state() {
        let mut w = world();
        w.player.companion_ids.push(NpcId::from("npc_sela"));
        w.npcs.get_mut(&NpcId::from("npc_sela")).unwrap().is_companion = true;
        let cs = initiate(&w, &NpcId::from("npc_bandit")).unwrap();
        assert_eq!(cs.enemy_npc_id, NpcId::from("npc_bandit"));
        assert!(cs.player_turn);
        assert_eq!(cs.turn_count, 1);
        assert_eq!(cs.companions_in_combat, vec![NpcId::from("npc_sela")]);
    }

    #[test]
    fn initiate_checks_preconditions() {
        let mut w = world();
        assert!(matches!(
            initiate(&w, &NpcId::from("npc_nobody")),
            Err(MechError::NpcNotFound(_))
        ));
        assert!(matches!(
            initiate(&w, &NpcId::from("npc_far")),
            Err(MechError::NpcNotPresent(_))
        ));
        w.npcs.get_mut(&NpcId::from("npc_sela")).unwrap().kill();
        assert!(matches!(
            initiate(&w, &NpcId::from("npc_sela")),
            Err(MechError::NpcNotAlive(_))
        ));
        begin(&mut w, &NpcId::from("npc_bandit")).unwrap();
        assert!(matches!(
            initiate(&w, &NpcId::from("npc_bandit")),
            Err(MechError::CombatAlreadyActive(_))
        ));
    }

    #[test]
    fn begin_records_event() {
        let mut w = world();
        begin(&mut w, &NpcId::from("npc_sela")).unwrap();
        assert!(w.in_combat());
        assert!(w.npcs[&NpcId::from("npc_sela")].is_hostile);
        assert_eq!(w.event_history.last().unwrap().event_type, WorldEventType::Combat);
    }
}

use saga_core::{
    ChangeError, Location, LocationId, RandomSource, Reduction, StateChange, WorldState, apply,
};
use tracing::warn;

use crate::config::ClockTuning;
use crate::error::{SimError, SimResult};

/// Decides when a location has been left alone long enough for the world
/// to have moved on without the player.
///
/// Time is measured in actions: the world's action counter against the
/// location's `last_visited_at_action`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationClock {
    tuning: ClockTuning,
}

impl LocationClock {
    /// Create a clock with the given tuning.
    pub fn new(tuning: ClockTuning) -> Self {
        Self { tuning }
    }

    /// Actions since the player was last at `location`.
    pub fn elapsed(&self, location: &Location, action_counter: u64) -> u64 {
        action_counter.saturating_sub(location.last_visited_at_action)
    }

    /// Probability that off-screen changes are due after `elapsed` actions.
    pub fn change_chance(&self, elapsed: u64) -> f64 {
        let t = &self.tuning;
        (t.base + t.per_action * elapsed as f64).min(t.cap)
    }

    /// Whether off-screen changes should be generated for `location` now.
    ///
    /// Nothing is due if no time has passed. Below the settle threshold a
    /// single draw against [`change_chance`](Self::change_chance) decides
    /// and a failed draw suppresses simulation. At or past the threshold
    /// simulation always runs and nothing is drawn.
    pub fn should_simulate(
        &self,
        location: &Location,
        action_counter: u64,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let elapsed = self.elapsed(location, action_counter);
        if elapsed == 0 {
            return false;
        }
        if elapsed >= self.tuning.settle_after {
            return true;
        }
        rng.chance(self.change_chance(elapsed))
    }
}

/// Apply generated off-screen changes for `location`.
///
/// Changes that would move or kill a companion, or move the player, are
/// dropped before reduction and reported as warnings. Everything else goes
/// through the reducer as usual.
pub fn apply_offscreen_changes(
    state: &WorldState,
    location: &LocationId,
    changes: &[StateChange],
) -> SimResult<Reduction> {
    if !state.locations.contains_key(location) {
        return Err(SimError::UnknownLocation(location.to_string()));
    }

    let mut kept = Vec::with_capacity(changes.len());
    let mut refused = Vec::new();
    for change in changes {
        if matches!(change, StateChange::MovePlayer(_)) {
            refused.push(ChangeError::Rejected {
                kind: change.kind(),
                reason: "off-screen changes cannot move the player".to_string(),
            });
            continue;
        }
        let touches_companion = change.relocated_npc().is_some_and(|id| {
            state.player.has_companion(id) || state.npcs.get(id).is_some_and(|n| n.is_companion)
        });
        if touches_companion {
            warn!(kind = change.kind(), %location, "refused off-screen change to a companion");
            refused.push(ChangeError::Rejected {
                kind: change.kind(),
                reason: "companions are not moved off-screen".to_string(),
            });
            continue;
        }
        kept.push(change.clone());
    }

    let mut reduction = apply(state, &kept);
    refused.append(&mut reduction.warnings);
    reduction.warnings = refused;
    Ok(reduction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use saga_core::{Coordinates, Npc, NpcId, Player, ScriptedRandom, Terrain, change::NpcRef};

    fn location(last_visit: u64) -> Location {
        let mut loc = Location::new("loc_mill", "Mill", Coordinates::new(0, 0), Terrain::Plains, 1);
        loc.last_visited_at_action = last_visit;
        loc
    }

    #[test]
    fn elapsed_saturates() {
        let clock = LocationClock::default();
        assert_eq!(clock.elapsed(&location(10), 15), 5);
        assert_eq!(clock.elapsed(&location(10), 3), 0);
    }

    #[test]
    fn chance_grows_then_caps() {
        let clock = LocationClock::default();
        assert!((clock.change_chance(1) - 0.14).abs() < 1e-9);
        assert!((clock.change_chance(10) - 0.5).abs() < 1e-9);
        assert!((clock.change_chance(100) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn no_time_no_simulation() {
        let clock = LocationClock::default();
        let mut rng = ScriptedRandom::constant(0.0);
        assert!(!clock.should_simulate(&location(7), 7, &mut rng));
        assert!(!clock.should_simulate(&location(9), 7, &mut rng));
    }

    #[test]
    fn recent_visits_need_a_draw() {
        let clock = LocationClock::default();
        // elapsed 5: chance 0.3
        let mut rng = ScriptedRandom::new([0.29, 0.31]);
        assert!(clock.should_simulate(&location(0), 5, &mut rng));
        assert!(!clock.should_simulate(&location(0), 5, &mut rng));
    }

    #[test]
    fn long_absence_always_simulates() {
        let clock = LocationClock::default();
        let mut rng = ScriptedRandom::constant(0.99);
        assert!(clock.should_simulate(&location(0), 20, &mut rng));
        assert_eq!(rng.remaining(), 0);
    }

    fn world() -> WorldState {
        let mut w = WorldState::new("Test", Player::new("Wren", LocationId::from("loc_mill")));
        w.add_location(location(0));
        w.add_location(Location::new("loc_bog", "Bog", Coordinates::new(3, 0), Terrain::Swamp, 5));
        w.add_npc(Npc::new("npc_friend", "Friend", LocationId::from("loc_mill")));
        w.add_npc(Npc::new("npc_miller", "Miller", LocationId::from("loc_mill")));
        saga_core::apply_in_place(
            &mut w,
            &[StateChange::AddCompanion(NpcRef {
                npc_id: NpcId::from("npc_friend"),
            })],
        );
        w
    }

    #[test]
    fn companions_are_never_moved() {
        let w = world();
        let changes = [
            StateChange::move_npc("npc_friend", "loc_bog"),
            StateChange::npc_death("npc_friend", None),
            StateChange::move_npc("npc_miller", "loc_bog"),
            StateChange::move_player("loc_bog"),
        ];
        let r = apply_offscreen_changes(&w, &LocationId::from("loc_mill"), &changes).unwrap();
        let friend = &r.state.npcs[&NpcId::from("npc_friend")];
        assert_eq!(friend.current_location_id, LocationId::from("loc_mill"));
        assert!(friend.is_alive);
        assert_eq!(
            r.state.npcs[&NpcId::from("npc_miller")].current_location_id,
            LocationId::from("loc_bog")
        );
        assert_eq!(r.state.player.current_location_id, LocationId::from("loc_mill"));
        assert_eq!(r.applied, 1);
        assert_eq!(r.warnings.len(), 3);
    }

    #[test]
    fn unknown_location_is_an_error() {
        let w = world();
        assert!(apply_offscreen_changes(&w, &LocationId::from("loc_none"), &[]).is_err());
    }
}

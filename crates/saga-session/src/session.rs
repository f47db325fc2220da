//! The single-writer game session.
//!
//! `GameSession` owns the live world and the session RNG behind one mutex.
//! Every mutating operation works on a clone: transform, bump the action
//! counter, save, and only then commit. A failed precondition or a failed
//! save leaves the committed world exactly as it was.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use saga_core::change::AddConversation;
use saga_core::{
    DeceasedHero, LocationId, NpcId, Speaker, StateChange, WorldEventType, WorldState,
    apply_in_place,
};
use saga_mechanics::{CombatAction, CombatOutcome};
use saga_simulation::{
    EncounterContext, EncounterKind, EncounterResolution, LocationClock, MapProjection, RoutePlan,
    SimError, TravelOutcome, plan_route, project, resolve_travel, roll_encounter,
    validate_destination,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::resolution::ActionResolution;
use crate::seed::{new_hero, seed_world};
use crate::store::WorldStore;

/// What a resolved action did to the world.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnReport {
    /// The action number this turn committed as.
    pub action_number: u64,
    /// Prose for the player.
    pub narrative: String,
    /// Options offered for the next turn.
    pub suggested_actions: Vec<String>,
    /// Changes that took effect.
    pub applied: usize,
    /// Changes that were skipped, and why combat did not start if it was asked for.
    pub warnings: Vec<String>,
    /// Enemy of a fight the turn started.
    pub combat_started: Option<NpcId>,
}

/// The result of rolling for a travel encounter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRoll {
    /// The planned route.
    pub plan: RoutePlan,
    /// Whether the draw came up as an encounter.
    pub encounter_triggered: bool,
    /// Inputs for the encounter classifier, present only when triggered.
    pub context: Option<EncounterContext>,
}

/// The result of completing a journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelReport {
    /// Where the journey ended.
    pub outcome: TravelOutcome,
    /// Enemy of a fight the journey started.
    pub combat_started: Option<NpcId>,
    /// The destination has been left alone long enough to need off-screen changes.
    pub needs_offscreen_refresh: bool,
    /// Skipped changes and failed combat starts.
    pub warnings: Vec<String>,
}

/// The result of applying off-screen changes to a location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffscreenReport {
    /// The location that changed.
    pub location_id: LocationId,
    /// Changes applied.
    pub applied: usize,
    /// Changes skipped.
    pub warnings: Vec<String>,
}

struct Live {
    state: WorldState,
    rng: StdRng,
}

/// The only writer of a persisted world.
pub struct GameSession<S: WorldStore> {
    store: S,
    config: SessionConfig,
    clock: LocationClock,
    live: Mutex<Live>,
}

impl<S: WorldStore> GameSession<S> {
    /// Load the world from `store`, or seed and save a new one on first run.
    pub fn open(store: S, config: SessionConfig) -> SessionResult<Self> {
        let state = match store.load()? {
            Some(state) => {
                info!(world = %state.world_name, action = state.action_counter, "resumed world");
                state
            }
            None => {
                let state = seed_world(&config);
                store.save(&state)?;
                info!(world = %state.world_name, "seeded new world");
                state
            }
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            store,
            clock: LocationClock::new(config.sim.clock),
            config,
            live: Mutex::new(Live { state, rng }),
        })
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// A copy of the committed world.
    pub fn snapshot(&self) -> WorldState {
        self.lock().state.clone()
    }

    /// The player's fog-of-war map.
    pub fn map(&self) -> MapProjection {
        project(&self.lock().state)
    }

    /// Plan a journey from the player's location without taking it.
    pub fn plan_travel(&self, destination: &str) -> SessionResult<RoutePlan> {
        let live = self.lock();
        Ok(self.plan_from_player(&live.state, destination)?)
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Apply a resolved player action.
    ///
    /// Raw changes are parsed and reduced in order; bad ones become
    /// warnings. Afterwards a fight starts if one was asked for and its
    /// target can fight; otherwise the refusal is a warning too.
    pub fn apply_resolution(&self, resolution: ActionResolution) -> SessionResult<TurnReport> {
        self.transact("apply_resolution", |state, _| {
            let batch = StateChange::parse_batch(&resolution.state_changes);
            let skipped = apply_in_place(state, &batch.changes);
            let applied = batch.changes.len() - skipped.len();
            let mut warnings: Vec<String> = batch
                .warnings
                .iter()
                .chain(&skipped)
                .map(ToString::to_string)
                .collect();

            let mut combat_started = None;
            if let Some(target) = resolution.initiates_combat.as_deref() {
                match start_fight(state, target) {
                    Ok(id) => combat_started = Some(id),
                    Err(e) => {
                        warn!(npc = target, error = %e, "requested combat did not start");
                        warnings.push(e.to_string());
                    }
                }
            }

            Ok(TurnReport {
                action_number: state.action_counter + 1,
                narrative: resolution.narrative,
                suggested_actions: resolution.suggested_actions,
                applied,
                warnings,
                combat_started,
            })
        })
    }

    /// Start a fight with an NPC given by id or name.
    pub fn start_combat(&self, npc: &str) -> SessionResult<NpcId> {
        self.transact("start_combat", |state, _| start_fight(state, npc))
    }

    /// Resolve one combat action.
    pub fn combat_action(&self, action: CombatAction) -> SessionResult<CombatOutcome> {
        self.transact("combat_action", |state, rng| {
            Ok(saga_mechanics::resolve_action(state, action, rng)?)
        })
    }

    // -----------------------------------------------------------------------
    // Travel
    // -----------------------------------------------------------------------

    /// Plan a journey and roll for an encounter.
    ///
    /// The world is not touched; only the session RNG advances.
    pub fn roll_travel(&self, destination: &str) -> SessionResult<TravelRoll> {
        let mut live = self.lock();
        let plan = self.plan_from_player(&live.state, destination)?;
        let encounter_triggered = roll_encounter(&plan, &mut live.rng);
        let context = encounter_triggered.then(|| EncounterContext::for_route(&live.state, &plan));
        debug!(to = %plan.to, chance = plan.encounter_chance, encounter_triggered, "rolled travel");
        Ok(TravelRoll {
            plan,
            encounter_triggered,
            context,
        })
    }

    /// Take a journey, with the encounter the classifier came up with if
    /// one was rolled.
    ///
    /// A combat encounter starts a fight with whatever it spawned. On
    /// arrival the destination's clock decides whether off-screen changes
    /// are due.
    pub fn complete_travel(
        &self,
        destination: &str,
        encounter: Option<EncounterResolution>,
    ) -> SessionResult<TravelReport> {
        let clock = self.clock;
        self.transact("complete_travel", |state, rng| {
            let plan = self.plan_from_player(state, destination)?;
            let before = state.locations.get(&plan.to).cloned();
            let action_counter = state.action_counter;

            let outcome = resolve_travel(state, &plan, encounter.as_ref())?;
            let mut warnings: Vec<String> = outcome.warnings.iter().map(ToString::to_string).collect();

            let mut combat_started = None;
            if outcome.encounter == Some(EncounterKind::Combat) {
                if let Some(enemy) = &outcome.spawned_npc_id {
                    match saga_mechanics::begin(state, enemy) {
                        Ok(()) => combat_started = Some(enemy.clone()),
                        Err(e) => {
                            warn!(%enemy, error = %e, "ambush did not start a fight");
                            warnings.push(e.to_string());
                        }
                    }
                }
            }

            let needs_offscreen_refresh = outcome.arrived
                && !plan.is_stationary()
                && before.is_some_and(|loc| clock.should_simulate(&loc, action_counter, &mut *rng));

            Ok(TravelReport {
                outcome,
                combat_started,
                needs_offscreen_refresh,
                warnings,
            })
        })
    }

    /// Apply generated off-screen changes to a location given by id or name.
    ///
    /// Changes that would move a companion or the player are refused.
    pub fn apply_offscreen_changes(
        &self,
        location: &str,
        changes: &[Value],
    ) -> SessionResult<OffscreenReport> {
        self.transact("apply_offscreen_changes", |state, _| {
            let location_id = state
                .resolve_location(location)
                .map(|l| l.id.clone())
                .ok_or_else(|| SimError::UnknownLocation(location.to_string()))?;
            let batch = StateChange::parse_batch(changes);
            let reduction = saga_simulation::apply_offscreen_changes(state, &location_id, &batch.changes)?;
            *state = reduction.state;
            let warnings = batch
                .warnings
                .iter()
                .chain(&reduction.warnings)
                .map(ToString::to_string)
                .collect();
            Ok(OffscreenReport {
                location_id,
                applied: reduction.applied,
                warnings,
            })
        })
    }

    // -----------------------------------------------------------------------
    // Dialogue and death
    // -----------------------------------------------------------------------

    /// Record an exchange with an NPC standing with the player.
    ///
    /// Both lines go into the NPC's conversation history, the NPC becomes
    /// known, and its attitude shifts by `attitude_change` if given.
    /// Returns the NPC's attitude afterwards.
    pub fn record_dialogue(
        &self,
        npc: &str,
        player_line: &str,
        npc_line: &str,
        attitude_change: Option<i64>,
    ) -> SessionResult<i32> {
        self.transact("record_dialogue", |state, _| {
            let target = state
                .resolve_npc(npc)
                .ok_or_else(|| SessionError::UnknownNpc(npc.to_string()))?;
            let id = target.id.clone();
            if !target.is_alive {
                return Err(SessionError::NpcNotAlive(id));
            }
            if target.current_location_id != state.player.current_location_id {
                return Err(SessionError::NpcNotPresent(id));
            }

            let line = |speaker, text: &str| {
                StateChange::AddConversation(AddConversation {
                    npc_id: id.clone(),
                    speaker,
                    text: text.to_string(),
                })
            };
            let mut changes = vec![line(Speaker::Player, player_line), line(Speaker::Npc, npc_line)];
            if let Some(delta) = attitude_change.filter(|d| *d != 0) {
                changes.push(StateChange::attitude_change(id.clone(), delta));
            }
            apply_in_place(state, &changes);
            state.player.knowledge.npcs.insert(id.clone());

            Ok(state.npcs.get(&id).map_or(0, |n| n.attitude()))
        })
    }

    /// Lay a fallen hero to rest and start a new one at the starting location.
    ///
    /// Only allowed once the player is down. Companions are released where
    /// they stand and any fight ends. The world itself carries on.
    pub fn record_fallen_hero(&self, cause: &str) -> SessionResult<DeceasedHero> {
        self.transact("record_fallen_hero", |state, _| {
            if !state.player.is_down() {
                return Err(SessionError::HeroStillAlive);
            }
            let location_id = state.player.current_location_id.clone();
            let location_name = state
                .locations
                .get(&location_id)
                .map_or_else(|| location_id.to_string(), |l| l.name.clone());
            let since = state.deceased_heroes.last().map(|h| h.died_at_action);
            let notable_deeds = state
                .event_history
                .iter()
                .filter(|e| e.is_significant && since.is_none_or(|s| e.action_number > s))
                .map(|e| e.description.clone())
                .collect();

            let player = &state.player;
            let hero = DeceasedHero {
                name: player.name.clone(),
                level: player.level,
                experience: player.experience,
                gold: player.gold,
                cause_of_death: cause.to_string(),
                location_id,
                location_name,
                died_at_action: state.action_counter,
                died_at: Utc::now(),
                notable_deeds,
            };

            let event = state
                .event_here(
                    WorldEventType::Death,
                    format!("{} fell at {}: {cause}", hero.name, hero.location_name),
                )
                .significant();
            state.record_event(event);
            state.deceased_heroes.push(hero.clone());

            for id in std::mem::take(&mut state.player.companion_ids) {
                if let Some(npc) = state.npcs.get_mut(&id) {
                    npc.is_companion = false;
                }
            }
            state.combat_state = None;
            let start = state.starting_location_id.clone();
            state.player = new_hero(&self.config.player_name, &start);
            info!(hero = %hero.name, level = hero.level, "hero fell; a new one begins");
            Ok(hero)
        })
    }

    /// Replace the world with a fresh seed, keeping the fallen heroes.
    pub fn reset(&self) -> SessionResult<()> {
        let mut live = self.lock();
        let mut fresh = seed_world(&self.config);
        fresh.deceased_heroes = live.state.deceased_heroes.clone();
        self.store.save(&fresh)?;
        live.state = fresh;
        info!(world = %live.state.world_name, "world reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Live> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn plan_from_player(&self, state: &WorldState, destination: &str) -> Result<RoutePlan, SimError> {
        let to = validate_destination(state, destination)?.id.clone();
        plan_route(
            state,
            state.player.current_location_id.as_str(),
            to.as_str(),
            &self.config.sim.encounter,
        )
    }

    fn transact<T>(
        &self,
        operation: &'static str,
        transform: impl FnOnce(&mut WorldState, &mut StdRng) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let mut live = self.lock();
        let mut state = live.state.clone();
        let mut rng = live.rng.clone();

        let value = transform(&mut state, &mut rng).inspect_err(|e| {
            debug!(operation, error = %e, "operation refused");
        })?;
        state.action_counter += 1;
        if let Err(e) = self.store.save(&state) {
            warn!(operation, error = %e, "save failed; world not committed");
            return Err(e.into());
        }

        debug!(operation, action = state.action_counter, "committed");
        live.state = state;
        live.rng = rng;
        Ok(value)
    }
}

fn start_fight(state: &mut WorldState, target: &str) -> SessionResult<NpcId> {
    let id = state
        .resolve_npc(target)
        .map(|n| n.id.clone())
        .ok_or_else(|| SessionError::UnknownNpc(target.to_string()))?;
    saga_mechanics::begin(state, &id)?;
    Ok(id)
}

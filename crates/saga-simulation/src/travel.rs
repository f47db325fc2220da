//! Route planning and travel.
//!
//! A route's risk comes from the danger of its endpoints and of any known
//! places near the straight line between them, the distance, and the
//! terrain crossed. One uniform draw against that risk decides whether
//! something happens on the way; what happens is up to the narrator.

use saga_core::{
    ChangeError, Location, LocationId, RandomSource, StateChange, Terrain, WorldEventType,
    WorldState, apply_in_place,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EncounterTuning;
use crate::encounter::{EncounterKind, EncounterResolution};
use crate::error::{SimError, SimResult};

/// The risk profile of a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    /// Departure.
    pub from: LocationId,
    /// Destination.
    pub to: LocationId,
    /// Manhattan distance.
    pub distance: u32,
    /// Mean danger level of the places along the route.
    pub average_danger: f64,
    /// Distinct terrains along the route, nearest first.
    pub terrains_crossed: Vec<Terrain>,
    /// Probability in `[0, 1]` that something happens on the way.
    pub encounter_chance: f64,
}

impl RoutePlan {
    /// Whether the journey goes nowhere.
    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}

/// Encounter probability for a route.
pub fn encounter_chance(
    tuning: &EncounterTuning,
    average_danger: f64,
    distance: u32,
    terrains: &[Terrain],
) -> f64 {
    let danger = tuning.danger_weight * (average_danger / 10.0);
    let distance = (tuning.distance_step * f64::from(distance)).min(tuning.distance_cap);
    let terrain: i32 = terrains.iter().map(|t| t.danger_modifier()).sum();
    let raw = tuning.base + danger + distance + f64::from(terrain) * tuning.terrain_weight;
    raw.clamp(tuning.floor, tuning.ceiling)
}

/// Plan a route between two locations, given by id or name.
///
/// Places counted along the way are the two endpoints plus every location
/// the player knows whose coordinates fall inside the endpoints' bounding
/// box grown by one tile on each side.
pub fn plan_route(
    state: &WorldState,
    from: &str,
    to: &str,
    tuning: &EncounterTuning,
) -> SimResult<RoutePlan> {
    let origin = state
        .resolve_location(from)
        .ok_or_else(|| SimError::UnknownLocation(from.to_string()))?;
    let destination = state
        .resolve_location(to)
        .ok_or_else(|| SimError::UnknownLocation(to.to_string()))?;

    if origin.id == destination.id {
        return Ok(RoutePlan {
            from: origin.id.clone(),
            to: destination.id.clone(),
            distance: 0,
            average_danger: f64::from(origin.danger_level()),
            terrains_crossed: Vec::new(),
            encounter_chance: 0.0,
        });
    }

    let route = route_locations(state, origin, destination);
    let average_danger =
        route.iter().map(|l| f64::from(l.danger_level())).sum::<f64>() / route.len() as f64;

    let mut by_distance: Vec<(u32, Terrain)> = route
        .iter()
        .map(|l| (origin.coordinates.manhattan(l.coordinates), l.terrain))
        .collect();
    by_distance.sort();
    let mut terrains_crossed = Vec::new();
    for (_, terrain) in by_distance {
        if !terrains_crossed.contains(&terrain) {
            terrains_crossed.push(terrain);
        }
    }

    let distance = origin.coordinates.manhattan(destination.coordinates);
    let encounter_chance = encounter_chance(tuning, average_danger, distance, &terrains_crossed);
    debug!(
        from = %origin.id,
        to = %destination.id,
        distance,
        average_danger,
        encounter_chance,
        "planned route"
    );
    Ok(RoutePlan {
        from: origin.id.clone(),
        to: destination.id.clone(),
        distance,
        average_danger,
        terrains_crossed,
        encounter_chance,
    })
}

fn route_locations<'a>(
    state: &'a WorldState,
    origin: &'a Location,
    destination: &'a Location,
) -> Vec<&'a Location> {
    let (a, b) = (origin.coordinates, destination.coordinates);
    let (min_x, max_x) = (a.x.min(b.x).saturating_sub(1), a.x.max(b.x).saturating_add(1));
    let (min_y, max_y) = (a.y.min(b.y).saturating_sub(1), a.y.max(b.y).saturating_add(1));
    let knowledge = &state.player.knowledge;

    let mut route = vec![origin, destination];
    for loc in state.locations.values() {
        if loc.id == origin.id || loc.id == destination.id {
            continue;
        }
        let c = loc.coordinates;
        let inside = (min_x..=max_x).contains(&c.x) && (min_y..=max_y).contains(&c.y);
        if inside && knowledge.knows_location(&loc.id, &loc.name) {
            route.push(loc);
        }
    }
    route
}

/// Check a destination before travel: it must exist, be known to the
/// player, and no fight may be running.
pub fn validate_destination<'a>(state: &'a WorldState, destination: &str) -> SimResult<&'a Location> {
    if state.in_combat() {
        return Err(SimError::InCombat);
    }
    let unknown = || SimError::UnknownDestination(destination.to_string());
    let loc = state.resolve_location(destination).ok_or_else(unknown)?;
    if loc.id != state.player.current_location_id
        && !state.player.knowledge.knows_location(&loc.id, &loc.name)
    {
        return Err(unknown());
    }
    Ok(loc)
}

/// Decide whether an encounter happens: one draw, encounter if below the
/// route's chance. A zero-risk route draws nothing.
pub fn roll_encounter(plan: &RoutePlan, rng: &mut dyn RandomSource) -> bool {
    if plan.encounter_chance <= 0.0 {
        return false;
    }
    rng.chance(plan.encounter_chance)
}

/// Risk inputs handed to the encounter classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterContext {
    /// Departure name.
    pub from_name: String,
    /// Destination name.
    pub to_name: String,
    /// Manhattan distance.
    pub distance: u32,
    /// Mean danger along the route.
    pub average_danger: f64,
    /// Terrains on the way, nearest first.
    pub terrains_crossed: Vec<Terrain>,
    /// Chance that was rolled against.
    pub encounter_chance: f64,
    /// Player level.
    pub player_level: u32,
    /// Player health.
    pub player_health: i32,
}

impl EncounterContext {
    /// Gather the context for a planned route.
    pub fn for_route(state: &WorldState, plan: &RoutePlan) -> Self {
        let name = |id: &LocationId| {
            state
                .locations
                .get(id)
                .map_or_else(|| id.to_string(), |l| l.name.clone())
        };
        Self {
            from_name: name(&plan.from),
            to_name: name(&plan.to),
            distance: plan.distance,
            average_danger: plan.average_danger,
            terrains_crossed: plan.terrains_crossed.clone(),
            encounter_chance: plan.encounter_chance,
            player_level: state.player.level,
            player_health: state.player.health,
        }
    }
}

/// What became of a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelOutcome {
    /// Whether the player reached the destination.
    pub arrived: bool,
    /// Where the player ended up.
    pub final_location_id: LocationId,
    /// What happened on the way.
    pub encounter: Option<EncounterKind>,
    /// NPC brought into the world by the encounter.
    pub spawned_npc_id: Option<saga_core::NpcId>,
    /// Skipped encounter changes.
    #[serde(skip)]
    pub warnings: Vec<ChangeError>,
}

/// Carry out a planned journey, with or without an encounter.
///
/// A combat encounter (or any encounter flagged as blocking) leaves the
/// player at the departure point, and anything it spawns appears there.
/// Otherwise the player arrives and encounter effects land at the
/// destination. A stationary route changes nothing.
pub fn resolve_travel(
    state: &mut WorldState,
    plan: &RoutePlan,
    encounter: Option<&EncounterResolution>,
) -> SimResult<TravelOutcome> {
    if state.in_combat() {
        return Err(SimError::InCombat);
    }
    if state.player.current_location_id != plan.from {
        return Err(SimError::StaleRoute {
            route_start: plan.from.clone(),
            player_at: state.player.current_location_id.clone(),
        });
    }
    if !state.locations.contains_key(&plan.to) {
        return Err(SimError::UnknownLocation(plan.to.to_string()));
    }
    let encounter = encounter.filter(|e| e.kind != EncounterKind::None || e.blocks_arrival);

    if plan.is_stationary() {
        return Ok(TravelOutcome {
            arrived: true,
            final_location_id: plan.to.clone(),
            encounter: None,
            spawned_npc_id: None,
            warnings: Vec::new(),
        });
    }

    let blocked = encounter.is_some_and(EncounterResolution::blocks);
    let final_location = if blocked { &plan.from } else { &plan.to };

    let mut changes = Vec::new();
    if !blocked {
        changes.push(StateChange::move_player(plan.to.as_str()));
    }
    let spawned = match encounter {
        Some(e) => {
            let (effects, spawned) = e.into_changes(final_location);
            changes.extend(effects);
            spawned
        }
        None => None,
    };
    let warnings = apply_in_place(state, &changes);

    let arrived = state.player.current_location_id == plan.to;
    let to_name = state
        .locations
        .get(&plan.to)
        .map_or_else(|| plan.to.to_string(), |l| l.name.clone());
    let description = match encounter {
        Some(e) if blocked => format!("The road to {to_name} was cut short: {}", e.description),
        Some(e) => format!("Travelled to {to_name}. {}", e.description),
        None => format!("Travelled to {to_name}"),
    };
    let mut event = state.event_here(WorldEventType::Travel, description);
    if let Some(id) = &spawned {
        event = event.involving(id.clone());
    }
    state.record_event(event);
    info!(to = %plan.to, arrived, blocked, "travel resolved");

    Ok(TravelOutcome {
        arrived,
        final_location_id: state.player.current_location_id.clone(),
        encounter: encounter.map(|e| e.kind),
        spawned_npc_id: spawned,
        warnings,
    })
}

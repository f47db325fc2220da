//! World simulation for Saga.
//!
//! Everything here is a pure function of a [`saga_core::WorldState`] plus
//! an injected [`saga_core::RandomSource`]: route risk and encounter
//! triggering, the per-location clock that decides when off-screen
//! changes are due, and the knowledge-gated map projection.

/// Location simulation clock.
pub mod clock;
/// Tuning constants for travel and the location clock.
pub mod config;
/// Encounter classification payloads and how they become state changes.
pub mod encounter;
/// Error types for the simulation crate.
pub mod error;
/// Fog-of-war map projection.
pub mod map;
/// Route planning and travel resolution.
pub mod travel;

/// Re-exports of [`clock::LocationClock`] and [`clock::apply_offscreen_changes`].
pub use clock::{LocationClock, apply_offscreen_changes};
/// Re-exports of the tuning types.
pub use config::{ClockTuning, EncounterTuning, SimConfig};
/// Re-exports of the encounter types.
pub use encounter::{EncounterKind, EncounterResolution};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the map types.
pub use map::{MapLocation, MapProjection, Tile, project};
/// Re-exports of the travel types.
pub use travel::{
    EncounterContext, RoutePlan, TravelOutcome, plan_route, resolve_travel, roll_encounter,
    validate_destination,
};

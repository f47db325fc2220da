//! Persistence and session management for Saga.
//!
//! A [`GameSession`] owns the one live [`saga_core::WorldState`] and is its
//! only writer. Every mutating call clones the state, transforms the clone
//! with the core, mechanics and simulation crates, saves it through a
//! [`WorldStore`], and only then commits it.

/// Session configuration.
pub mod config;
/// Error types for stores and sessions.
pub mod error;
/// Collaborator payloads for resolved player actions.
pub mod resolution;
/// The starting world.
pub mod seed;
/// The single-writer game session.
pub mod session;
/// Persistence backends.
pub mod store;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult, StoreError, StoreResult};
pub use resolution::ActionResolution;
pub use seed::seed_world;
pub use session::{GameSession, OffscreenReport, TravelReport, TravelRoll, TurnReport};
pub use store::{JsonFileStore, MemoryStore, WorldStore};

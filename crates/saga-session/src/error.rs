//! Error types for persistence and the game session.

use std::path::PathBuf;

use saga_core::{CoreError, NpcId};
use saga_mechanics::MechError;
use saga_simulation::SimError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while loading or saving a world.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the save file or creating the temporary file failed.
    #[error("i/o error at {path}: {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The world could not be encoded or the saved document is invalid.
    #[error("world document: {0}")]
    Serde(#[from] serde_json::Error),

    /// The temporary file could not replace the save file.
    #[error("could not replace {path}: {source}")]
    Persist {
        /// The save file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a [`GameSession`](crate::GameSession).
///
/// Whatever the variant, the committed world is unchanged.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A world lookup failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A combat precondition failed.
    #[error(transparent)]
    Mechanics(#[from] MechError),

    /// A travel precondition failed.
    #[error(transparent)]
    Simulation(#[from] SimError),

    /// No NPC matches the given id or name.
    #[error("no such npc: {0}")]
    UnknownNpc(String),

    /// The NPC is dead.
    #[error("{0} is not alive")]
    NpcNotAlive(NpcId),

    /// The NPC is not where the player is.
    #[error("{0} is not here")]
    NpcNotPresent(NpcId),

    /// A fallen hero was recorded while the player still stands.
    #[error("the hero is still alive")]
    HeroStillAlive,
}

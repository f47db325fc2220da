use crate::id::{LocationId, NpcId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by world lookups.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No location with this id (or name) exists.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The requested NPC id does not exist in the world.
    #[error("npc not found: {0}")]
    NpcNotFound(NpcId),

    /// The player's recorded location does not exist.
    #[error("player location missing: {0}")]
    PlayerLocationMissing(LocationId),
}

/// Why a single state change was skipped.
///
/// These never abort a batch; the reducer records them as warnings and
/// moves on to the next change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    /// The change's `type` is not one the reducer understands.
    #[error("unknown change kind: {0}")]
    UnknownKind(String),

    /// The change's `data` did not match the payload for its kind.
    #[error("malformed {kind} change: {reason}")]
    Malformed {
        /// The change kind that failed to parse.
        kind: String,
        /// What was wrong with the payload.
        reason: String,
    },

    /// The change refers to an entity that does not exist.
    #[error("{kind} refers to missing {entity}: {id}")]
    MissingReferent {
        /// The change kind.
        kind: &'static str,
        /// The kind of entity that was missing.
        entity: &'static str,
        /// The unresolved identifier.
        id: String,
    },

    /// The change is well-formed but not allowed in the current state.
    #[error("{kind} rejected: {reason}")]
    Rejected {
        /// The change kind.
        kind: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ChangeError {
    pub(crate) fn missing(kind: &'static str, entity: &'static str, id: impl ToString) -> Self {
        Self::MissingReferent {
            kind,
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn rejected(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            kind,
            reason: reason.into(),
        }
    }
}

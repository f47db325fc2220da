//! Error types for the mechanics engine.

use saga_core::NpcId;

/// Errors that can occur during mechanics operations.
///
/// All of these are precondition failures: when one is returned the world
/// has not been touched.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A combat action was submitted with no fight running.
    #[error("not in combat")]
    NotInCombat,

    /// A fight was started while another is running.
    #[error("already fighting {0}")]
    CombatAlreadyActive(NpcId),

    /// The target NPC does not exist.
    #[error("npc not found: {0}")]
    NpcNotFound(NpcId),

    /// The target NPC is dead.
    #[error("{0} is not alive")]
    NpcNotAlive(NpcId),

    /// The target NPC is somewhere else.
    #[error("{0} is not here")]
    NpcNotPresent(NpcId),

    /// The target NPC travels with the player.
    #[error("{0} is a companion")]
    NpcIsCompanion(NpcId),

    /// The recorded enemy no longer exists or is already dead.
    #[error("enemy {0} is missing from the world")]
    EnemyMissing(NpcId),

    /// An action name could not be parsed.
    #[error("unknown combat action: {0}")]
    UnknownAction(String),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;

//! Game mechanics for Saga.
//!
//! Currently this is the turn-based combat resolver: a small state machine
//! over [`saga_core::CombatState`] that advances one player action at a
//! time and reports structured, narration-free outcomes.

/// Starting and resolving fights.
pub mod combat;
/// Error types.
pub mod error;

pub use combat::{CombatAction, CombatEvent, CombatOutcome, begin, damage, initiate, resolve_action};
pub use error::{MechError, MechResult};

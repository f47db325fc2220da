//! Core types for Saga: the persistent world model and the reducer that
//! mutates it.
//!
//! Everything the narrator collaborator may change about the world flows
//! through a [`StateChange`]. The [`reducer`] applies an ordered batch of
//! them to a [`WorldState`], skipping (and reporting) anything malformed
//! instead of aborting the batch.

/// State change instructions and their typed payloads.
pub mod change;
/// World event log entries and fallen-hero records.
pub mod chronicle;
/// Error types used throughout the crate.
pub mod error;
/// Factions and their standing with the player.
pub mod faction;
/// String identifiers for every entity kind.
pub mod id;
/// Items, their types and stat effects.
pub mod item;
/// Locations, terrain and grid coordinates.
pub mod location;
/// Non-player characters.
pub mod npc;
/// The player character, knowledge and progression.
pub mod player;
/// Quests and objectives.
pub mod quest;
/// Injectable randomness.
pub mod random;
/// Applies state changes to a world.
pub mod reducer;
/// The root world aggregate.
pub mod world;

/// Re-export change types.
pub use change::{ParsedBatch, StateChange};
/// Re-export chronicle types.
pub use chronicle::{DeceasedHero, WorldEvent, WorldEventType};
/// Re-export error types.
pub use error::{ChangeError, CoreError, CoreResult};
/// Re-export faction types.
pub use faction::Faction;
/// Re-export identifier types.
pub use id::{FactionId, ItemId, LocationId, NpcId, QuestId};
/// Re-export item types.
pub use item::{ItemDraft, ItemType, Stat, StatEffect, WorldItem};
/// Re-export location types.
pub use location::{Coordinates, Location, LocationDraft, Structure, Terrain};
/// Re-export NPC types.
pub use npc::{ConversationEntry, Npc, NpcDraft, Speaker, Stats};
/// Re-export player types.
pub use player::{Knowledge, KnowledgeKind, LevelUp, Player};
/// Re-export quest types.
pub use quest::{Quest, QuestDraft, QuestStatus};
/// Re-export randomness types.
pub use random::{RandomSource, ScriptedRandom};
/// Re-export reducer entry points.
pub use reducer::{Reduction, apply, apply_in_place};
/// Re-export world types.
pub use world::{CombatState, WorldState};

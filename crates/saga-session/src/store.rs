//! Persistence backends.
//!
//! A world is stored as one JSON document. Both backends repair the NPC
//! presence index when loading a document that has drifted out of sync.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use saga_core::WorldState;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Somewhere a world can be loaded from and saved to.
pub trait WorldStore {
    /// Load the saved world, or `None` if nothing has been saved yet.
    fn load(&self) -> StoreResult<Option<WorldState>>;

    /// Replace the saved world.
    fn save(&self, state: &WorldState) -> StoreResult<()>;
}

fn decode(document: &str) -> StoreResult<WorldState> {
    let mut state: WorldState = serde_json::from_str(document)?;
    let problems = state.presence_violations();
    if !problems.is_empty() {
        for problem in &problems {
            warn!(%problem, "inconsistent presence index in saved world");
        }
        let repairs = state.rebuild_presence();
        warn!(repairs, "rebuilt presence index");
    }
    Ok(state)
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A pretty-printed JSON file on disk.
///
/// Saves go to a temporary file in the same directory which then replaces
/// the target, so a crash mid-save leaves the previous world intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// A store backed by `path`. Nothing is read until [`WorldStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The save file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl WorldStore for JsonFileStore {
    fn load(&self) -> StoreResult<Option<WorldState>> {
        let document = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        debug!(path = %self.path.display(), bytes = document.len(), "loading world");
        decode(&document).map(Some)
    }

    fn save(&self, state: &WorldState) -> StoreResult<()> {
        let dir = self.directory();
        let io_err = |source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
        serde_json::to_writer_pretty(&mut file, state)?;
        file.write_all(b"\n").map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        debug!(path = %self.path.display(), action = state.action_counter, "saved world");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Keeps the serialized document in memory.
///
/// Going through JSON keeps the round trip honest: what loads is exactly
/// what a file store would have produced.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Option<String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `state`.
    pub fn with_state(state: &WorldState) -> StoreResult<Self> {
        let store = Self::new();
        store.save(state)?;
        Ok(store)
    }

    /// The saved document, if any.
    pub fn document(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WorldStore for MemoryStore {
    fn load(&self) -> StoreResult<Option<WorldState>> {
        self.slot().as_deref().map(decode).transpose()
    }

    fn save(&self, state: &WorldState) -> StoreResult<()> {
        let document = serde_json::to_string(state)?;
        *self.slot() = Some(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::seed::seed_world;
    use chrono::{TimeZone, Utc};
    use saga_core::{
        DeceasedHero, ItemDraft, ItemType, LocationId, NpcId, StateChange, WorldEventType, WorldState,
        apply_in_place,
    };
    use serde_json::json;

    /// A world with one of everything: a fight under way, chronicle entries,
    /// dialogue, a companion, loot on the ground and a fallen hero.
    fn lived_in_world() -> WorldState {
        let mut world = seed_world(&SessionConfig::default());
        let start = world.starting_location_id.clone();
        let raw = [
            json!({"type": "add_conversation", "data": {"npcId": "npc_innkeeper", "speaker": "player", "text": "A room, please."}}),
            json!({"type": "add_conversation", "data": {"npcId": "npc_innkeeper", "speaker": "npc", "text": "Top of the stairs."}}),
            json!({"type": "add_companion", "data": {"npcId": "npc_innkeeper"}}),
            json!({"type": "add_knowledge", "data": {"skill": "haggling", "level": 2}}),
        ];
        let batch = StateChange::parse_batch(&raw);
        assert!(batch.warnings.is_empty(), "{:?}", batch.warnings);
        let mut changes = batch.changes;
        changes.push(StateChange::event(WorldEventType::Discovery, "Found a loose floorboard"));
        changes.push(StateChange::drop_at(
            ItemDraft {
                item_type: Some(ItemType::Treasure),
                ..ItemDraft::named("Tarnished ring")
            },
            &start,
        ));
        let warnings = apply_in_place(&mut world, &changes);
        assert!(warnings.is_empty(), "{warnings:?}");

        saga_mechanics::begin(&mut world, &NpcId::from("npc_smith")).unwrap();
        world.deceased_heroes.push(DeceasedHero {
            name: "Old Aldo".to_string(),
            level: 3,
            experience: 40,
            gold: 12,
            cause_of_death: "Fell through the ice".to_string(),
            location_id: start.clone(),
            location_name: "Millbrook".to_string(),
            died_at_action: 4,
            died_at: Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
            notable_deeds: vec!["Drove off the wolves".to_string()],
        });
        world.action_counter = 6;

        assert!(world.combat_state.is_some());
        assert!(!world.event_history.is_empty());
        assert!(!world.locations[&start].items.is_empty());
        assert_eq!(world.npcs[&NpcId::from("npc_innkeeper")].conversation_history.len(), 2);
        world
    }

    #[test]
    fn missing_file_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("world.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("world.json"));
        let world = seed_world(&SessionConfig::default());
        store.save(&world).unwrap();
        assert_eq!(store.load().unwrap(), Some(world));
    }

    #[test]
    fn file_round_trip_of_a_lived_in_world() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("world.json"));
        let world = lived_in_world();
        store.save(&world).unwrap();
        assert_eq!(store.load().unwrap(), Some(world));
    }

    #[test]
    fn memory_round_trip_of_a_lived_in_world() {
        let world = lived_in_world();
        let store = MemoryStore::with_state(&world).unwrap();
        assert_eq!(store.load().unwrap(), Some(world.clone()));
        store.save(&store.load().unwrap().unwrap()).unwrap();
        assert_eq!(store.load().unwrap(), Some(world));
    }

    #[test]
    fn save_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("world.json"));
        let mut world = seed_world(&SessionConfig::default());
        store.save(&world).unwrap();
        world.action_counter = 9;
        store.save(&world).unwrap();
        assert_eq!(store.load().unwrap().unwrap().action_counter, 9);
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        fs::write(&path, "{ not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
    }

    #[test]
    fn memory_round_trip() {
        let world = seed_world(&SessionConfig::default());
        let store = MemoryStore::with_state(&world).unwrap();
        assert_eq!(store.load().unwrap(), Some(world));
        assert!(MemoryStore::new().load().unwrap().is_none());
    }

    #[test]
    fn load_repairs_presence() {
        let mut world = seed_world(&SessionConfig::default());
        let npc = NpcId::from("npc_innkeeper");
        let start = LocationId::from("loc_millbrook");
        world
            .locations
            .get_mut(&start)
            .unwrap()
            .present_npc_ids
            .retain(|id| id != &npc);
        assert!(!world.presence_violations().is_empty());

        let store = MemoryStore::with_state(&world).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.presence_violations().is_empty());
        assert!(loaded.locations[&start].is_present(&npc));
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{FactionId, LocationId, NpcId};
use crate::item::WorldItem;

/// Highest danger level a location can carry.
pub const MAX_DANGER: u8 = 10;

/// Terrain of a location, which biases travel risk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Settled and patrolled.
    Village,
    /// A maintained road.
    Road,
    /// Open country.
    #[default]
    Plains,
    /// Woodland.
    Forest,
    /// Lakes, rivers and coast.
    Water,
    /// Marsh and bog.
    Swamp,
    /// Highlands and passes.
    Mountain,
    /// Arid waste.
    Desert,
    /// Natural caverns.
    Cave,
    /// Built and inhabited depths.
    Dungeon,
}

impl Terrain {
    /// All terrain kinds, from safest to most dangerous.
    pub const ALL: [Terrain; 10] = [
        Self::Village,
        Self::Road,
        Self::Plains,
        Self::Forest,
        Self::Water,
        Self::Swamp,
        Self::Mountain,
        Self::Desert,
        Self::Cave,
        Self::Dungeon,
    ];

    /// Fixed travel-risk bias of this terrain.
    pub fn danger_modifier(self) -> i32 {
        match self {
            Self::Village => -2,
            Self::Road => -1,
            Self::Plains => 0,
            Self::Forest | Self::Water => 1,
            Self::Swamp | Self::Mountain | Self::Desert => 2,
            Self::Cave => 3,
            Self::Dungeon => 4,
        }
    }

    /// Single-character glyph used by the ASCII map.
    pub fn glyph(self) -> char {
        match self {
            Self::Village => 'V',
            Self::Road => '=',
            Self::Plains => '.',
            Self::Forest => 'T',
            Self::Water => '~',
            Self::Swamp => '%',
            Self::Mountain => '^',
            Self::Desert => ':',
            Self::Cave => 'C',
            Self::Dungeon => 'D',
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Village => "village",
            Self::Road => "road",
            Self::Plains => "plains",
            Self::Forest => "forest",
            Self::Water => "water",
            Self::Swamp => "swamp",
            Self::Mountain => "mountain",
            Self::Desert => "desert",
            Self::Cave => "cave",
            Self::Dungeon => "dungeon",
        };
        f.write_str(s)
    }
}

/// Integer grid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinates {
    /// Column; grows eastward.
    pub x: i32,
    /// Row; grows southward.
    pub y: i32,
}

impl Coordinates {
    /// Create coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two points.
    pub fn manhattan(self, other: Coordinates) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// A building or landmark at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    /// Display name.
    pub name: String,
    /// Kind of structure, e.g. "inn".
    #[serde(default)]
    pub kind: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// A place in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Unique identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Grid position.
    #[serde(default)]
    pub coordinates: Coordinates,
    /// Terrain.
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default, deserialize_with = "deserialize_danger")]
    danger_level: u8,
    /// NPCs currently here. Mirrors each NPC's `current_location_id`.
    #[serde(default)]
    pub present_npc_ids: Vec<NpcId>,
    /// Items lying here.
    #[serde(default)]
    pub items: Vec<WorldItem>,
    /// Buildings and landmarks.
    #[serde(default)]
    pub structures: Vec<Structure>,
    /// Action counter value at the player's last visit.
    #[serde(default)]
    pub last_visited_at_action: u64,
    /// Controlling faction, if any.
    #[serde(default)]
    pub faction_id: Option<FactionId>,
}

impl Location {
    /// Create a location with no occupants.
    pub fn new(
        id: impl Into<LocationId>,
        name: impl Into<String>,
        coordinates: Coordinates,
        terrain: Terrain,
        danger_level: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            coordinates,
            terrain,
            danger_level: clamp_danger(danger_level),
            present_npc_ids: Vec::new(),
            items: Vec::new(),
            structures: Vec::new(),
            last_visited_at_action: 0,
            faction_id: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Danger level, always within `0..=10`.
    pub fn danger_level(&self) -> u8 {
        self.danger_level
    }

    /// Set the danger level, clamping into `0..=10`.
    pub fn set_danger_level(&mut self, level: i32) {
        self.danger_level = clamp_danger(level);
    }

    /// Whether the given NPC is listed as present.
    pub fn is_present(&self, npc: &NpcId) -> bool {
        self.present_npc_ids.contains(npc)
    }

    pub(crate) fn add_presence(&mut self, npc: &NpcId) {
        if !self.is_present(npc) {
            self.present_npc_ids.push(npc.clone());
        }
    }

    pub(crate) fn remove_presence(&mut self, npc: &NpcId) {
        self.present_npc_ids.retain(|id| id != npc);
    }
}

fn clamp_danger(level: i32) -> u8 {
    level.clamp(0, i32::from(MAX_DANGER)) as u8
}

fn deserialize_danger<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(MAX_DANGER)) as u8)
}

/// Partial location description as produced by a collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationDraft {
    /// Id; generated when absent.
    pub id: Option<LocationId>,
    /// Display name.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Grid column.
    pub x: Option<i32>,
    /// Grid row.
    pub y: Option<i32>,
    /// Terrain.
    pub terrain: Option<Terrain>,
    /// Danger level; clamped on build.
    pub danger_level: Option<i32>,
    /// Buildings and landmarks.
    pub structures: Vec<Structure>,
    /// Controlling faction.
    pub faction_id: Option<FactionId>,
    /// Add the new location to the player's known locations.
    pub reveal: bool,
}

impl LocationDraft {
    /// Build a complete location. Missing coordinates fall back to `origin`.
    pub fn build(self, origin: Coordinates) -> Location {
        let coordinates = Coordinates::new(
            self.x.unwrap_or(origin.x),
            self.y.unwrap_or(origin.y),
        );
        let mut location = Location::new(
            self.id.unwrap_or_else(LocationId::generate),
            self.name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Nameless place".to_string()),
            coordinates,
            self.terrain.unwrap_or_default(),
            self.danger_level.unwrap_or(0),
        );
        location.description = self.description.unwrap_or_default();
        location.structures = self.structures;
        location.faction_id = self.faction_id;
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_is_clamped() {
        let mut loc = Location::new("loc_a", "A", Coordinates::default(), Terrain::Cave, 42);
        assert_eq!(loc.danger_level(), 10);
        loc.set_danger_level(-3);
        assert_eq!(loc.danger_level(), 0);
        loc.set_danger_level(7);
        assert_eq!(loc.danger_level(), 7);
    }

    #[test]
    fn stored_danger_is_clamped_on_load() {
        let json = r#"{"id":"loc_x","name":"X","dangerLevel":99}"#;
        let loc: Location = serde_json::from_str(json).unwrap();
        assert_eq!(loc.danger_level(), 10);
        let json = r#"{"id":"loc_x","name":"X","dangerLevel":-5}"#;
        let loc: Location = serde_json::from_str(json).unwrap();
        assert_eq!(loc.danger_level(), 0);
    }

    #[test]
    fn manhattan_distance() {
        let a = Coordinates::new(-2, 3);
        let b = Coordinates::new(1, -1);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(b.manhattan(a), 7);
        assert_eq!(a.manhattan(a), 0);
        let corner = Coordinates::new(i32::MIN, i32::MIN);
        let far = Coordinates::new(i32::MAX, i32::MAX);
        assert_eq!(corner.manhattan(far), u32::MAX);
    }

    #[test]
    fn terrain_modifiers() {
        assert_eq!(Terrain::Village.danger_modifier(), -2);
        assert_eq!(Terrain::Road.danger_modifier(), -1);
        assert_eq!(Terrain::Plains.danger_modifier(), 0);
        assert_eq!(Terrain::Water.danger_modifier(), 1);
        assert_eq!(Terrain::Desert.danger_modifier(), 2);
        assert_eq!(Terrain::Dungeon.danger_modifier(), 4);
    }

    #[test]
    fn presence_is_a_set() {
        let mut loc = Location::new("loc_a", "A", Coordinates::default(), Terrain::Village, 0);
        let npc = NpcId::from("npc_a");
        loc.add_presence(&npc);
        loc.add_presence(&npc);
        assert_eq!(loc.present_npc_ids.len(), 1);
        loc.remove_presence(&npc);
        assert!(loc.present_npc_ids.is_empty());
    }

    #[test]
    fn draft_defaults_to_origin() {
        let loc = LocationDraft {
            name: Some("Ford".into()),
            danger_level: Some(11),
            ..LocationDraft::default()
        }
        .build(Coordinates::new(4, -2));
        assert_eq!(loc.coordinates, Coordinates::new(4, -2));
        assert_eq!(loc.danger_level(), 10);
        assert_eq!(loc.terrain, Terrain::Plains);
    }
}

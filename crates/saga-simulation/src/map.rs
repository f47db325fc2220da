//! Fog-of-war map projection.
//!
//! The player only ever sees what they know about: known locations plus
//! the one they stand in, and a one-tile ring of explored ground around
//! each. The projection is for rendering only.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use saga_core::{LocationId, Terrain, WorldState};
use serde::{Deserialize, Serialize};

/// Tiles drawn in each direction from the player by [`MapProjection::render_ascii`].
pub const VIEW_RADIUS: i32 = 30;

/// A grid square. Serialized as `"x,y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Tile {
    /// Create a tile.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Tile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"x,y\", got \"{s}\""))?;
        let x = x.trim().parse().map_err(|_| format!("bad x in \"{s}\""))?;
        let y = y.trim().parse().map_err(|_| format!("bad y in \"{s}\""))?;
        Ok(Self { x, y })
    }
}

impl Serialize for Tile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A location as drawn on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLocation {
    /// Location id.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Terrain.
    pub terrain: Terrain,
    /// Whether the player stands here.
    pub is_current: bool,
}

/// Everything the player's map may show.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapProjection {
    /// Places on the map.
    pub locations: Vec<MapLocation>,
    /// Ground the player has seen.
    pub explored_tiles: BTreeSet<Tile>,
}

/// Project the known world.
pub fn project(state: &WorldState) -> MapProjection {
    let current = &state.player.current_location_id;
    let knowledge = &state.player.knowledge;
    let mut projection = MapProjection::default();

    for loc in state.locations.values() {
        let is_current = &loc.id == current;
        if !is_current && !knowledge.knows_location(&loc.id, &loc.name) {
            continue;
        }
        let c = loc.coordinates;
        for dx in -1..=1 {
            for dy in -1..=1 {
                projection
                    .explored_tiles
                    .insert(Tile::new(c.x.saturating_add(dx), c.y.saturating_add(dy)));
            }
        }
        projection.locations.push(MapLocation {
            id: loc.id.clone(),
            name: loc.name.clone(),
            x: c.x,
            y: c.y,
            terrain: loc.terrain,
            is_current,
        });
    }
    projection
}

impl MapProjection {
    /// Whether a location is on the map.
    pub fn shows(&self, id: &LocationId) -> bool {
        self.locations.iter().any(|l| &l.id == id)
    }

    /// Draw the map as text: `@` for the player, the terrain glyph for
    /// other known places, `-` for explored ground, blank for the unknown.
    /// The grid is cut off [`VIEW_RADIUS`] tiles from the player; the
    /// legend after it lists every known place.
    pub fn render_ascii(&self) -> String {
        let (Some(first), Some(_)) = (self.explored_tiles.first(), self.explored_tiles.last()) else {
            return String::from("(nothing explored)\n");
        };
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for t in &self.explored_tiles {
            min_x = min_x.min(t.x);
            max_x = max_x.max(t.x);
            min_y = min_y.min(t.y);
            max_y = max_y.max(t.y);
        }
        if let Some(here) = self.locations.iter().find(|l| l.is_current) {
            min_x = min_x.max(here.x.saturating_sub(VIEW_RADIUS));
            max_x = max_x.min(here.x.saturating_add(VIEW_RADIUS));
            min_y = min_y.max(here.y.saturating_sub(VIEW_RADIUS));
            max_y = max_y.min(here.y.saturating_add(VIEW_RADIUS));
        }

        let mut out = String::new();
        for y in min_y..=max_y {
            let mut row = String::new();
            for x in min_x..=max_x {
                let here = self.locations.iter().find(|l| l.x == x && l.y == y);
                let glyph = match here {
                    Some(l) if l.is_current => '@',
                    Some(l) => l.terrain.glyph(),
                    None if self.explored_tiles.contains(&Tile::new(x, y)) => '-',
                    None => ' ',
                };
                row.push(glyph);
            }
            out.push_str(row.trim_end());
            out.push('\n');
        }
        out.push('\n');
        for l in &self.locations {
            let marker = if l.is_current { '@' } else { l.terrain.glyph() };
            out.push_str(&format!("{marker} {} ({},{}) {}\n", l.name, l.x, l.y, l.terrain));
        }
        out
    }
}

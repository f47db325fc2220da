//! The player character.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::{ItemId, LocationId, NpcId};
use crate::item::{ItemType, Stat, WorldItem};

/// Experience needed per level: reaching `level * 50` advances a level.
pub const XP_PER_LEVEL: u32 = 50;

/// Which knowledge set an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeKind {
    /// A location id or name.
    #[serde(alias = "locations")]
    Location,
    /// An NPC id.
    #[serde(alias = "npcs")]
    Npc,
    /// A fact about the world.
    Lore,
    /// A crafting recipe.
    #[serde(alias = "recipes")]
    Recipe,
}

/// What the player knows. Gates the map and travel.
///
/// Every collection is a set: adding an entry twice changes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Knowledge {
    /// Known location ids or names.
    pub locations: BTreeSet<String>,
    /// Known NPCs.
    pub npcs: BTreeSet<NpcId>,
    /// Known lore.
    pub lore: BTreeSet<String>,
    /// Known recipes.
    pub recipes: BTreeSet<String>,
    /// Skill name to level.
    pub skills: BTreeMap<String, u32>,
}

impl Knowledge {
    /// Add an entry to the named set. Returns false if it was already known.
    pub fn learn(&mut self, kind: KnowledgeKind, value: impl Into<String>) -> bool {
        let value = value.into();
        match kind {
            KnowledgeKind::Location => self.locations.insert(value),
            KnowledgeKind::Npc => self.npcs.insert(NpcId(value)),
            KnowledgeKind::Lore => self.lore.insert(value),
            KnowledgeKind::Recipe => self.recipes.insert(value),
        }
    }

    /// Record a skill level. Keeps the higher of the old and new level.
    pub fn learn_skill(&mut self, skill: impl Into<String>, level: u32) -> bool {
        let entry = self.skills.entry(skill.into()).or_insert(0);
        if level > *entry {
            *entry = level;
            true
        } else {
            false
        }
    }

    /// Whether a location id or name is known. Names match case-insensitively.
    pub fn knows_location(&self, id: &LocationId, name: &str) -> bool {
        self.locations
            .iter()
            .any(|known| known == id.as_str() || known.eq_ignore_ascii_case(name))
    }
}

/// Result of a level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUp {
    /// Level before the experience was applied.
    pub from_level: u32,
    /// Level after.
    pub to_level: u32,
}

/// The single player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Character name.
    pub name: String,
    /// Current health, within `0..=max_health`.
    pub health: i32,
    /// Health cap.
    pub max_health: i32,
    /// Base strength.
    pub strength: i32,
    /// Base defense.
    pub defense: i32,
    /// Character level, starting at 1.
    pub level: u32,
    /// Experience towards the next level.
    #[serde(default)]
    pub experience: u32,
    /// Gold carried.
    #[serde(default)]
    pub gold: u32,
    /// Where the player stands.
    pub current_location_id: LocationId,
    /// Inventory. Item ids are unique.
    #[serde(default)]
    pub inventory: Vec<WorldItem>,
    /// Living companions travelling with the player.
    #[serde(default)]
    pub companion_ids: Vec<NpcId>,
    /// What the player has learned.
    #[serde(default)]
    pub knowledge: Knowledge,
}

impl Player {
    /// A fresh level-1 hero standing at `location`, which they know.
    pub fn new(name: impl Into<String>, location: LocationId) -> Self {
        let mut knowledge = Knowledge::default();
        knowledge.learn(KnowledgeKind::Location, location.as_str());
        Self {
            name: name.into(),
            health: 100,
            max_health: 100,
            strength: 10,
            defense: 5,
            level: 1,
            experience: 0,
            gold: 25,
            current_location_id: location,
            inventory: Vec::new(),
            companion_ids: Vec::new(),
            knowledge,
        }
    }

    /// Whether the player is at zero health.
    pub fn is_down(&self) -> bool {
        self.health <= 0
    }

    /// Reduce health, never below zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_sub(amount.max(0)).clamp(0, self.max_health);
        before - self.health
    }

    /// Restore health, never above max. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount.max(0)).clamp(0, self.max_health);
        self.health - before
    }

    /// Apply a signed gold delta, never dropping below zero.
    pub fn change_gold(&mut self, amount: i64) -> u32 {
        self.gold = i64::from(self.gold).saturating_add(amount).clamp(0, i64::from(u32::MAX)) as u32;
        self.gold
    }

    /// Strength plus the best weapon bonus carried.
    pub fn attack_power(&self) -> i32 {
        self.strength.saturating_add(self.best_bonus(ItemType::Weapon, Stat::Strength))
    }

    /// Defense plus the best armor bonus carried.
    pub fn armor(&self) -> i32 {
        self.defense.saturating_add(self.best_bonus(ItemType::Armor, Stat::Defense))
    }

    fn best_bonus(&self, item_type: ItemType, stat: Stat) -> i32 {
        self.inventory
            .iter()
            .filter(|i| i.item_type == item_type)
            .map(|i| i.bonus_to(stat))
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// Whether an item with this id is carried.
    pub fn has_item(&self, id: &ItemId) -> bool {
        self.inventory.iter().any(|i| &i.id == id)
    }

    /// Whether the NPC is a companion.
    pub fn has_companion(&self, id: &NpcId) -> bool {
        self.companion_ids.contains(id)
    }

    /// Add experience and apply every level-up it earns.
    ///
    /// Each level costs `level * 50` experience; the remainder carries
    /// over. A level-up raises max health by 10, strength by 2, defense
    /// by 1, and restores full health.
    pub fn gain_experience(&mut self, amount: u32) -> Option<LevelUp> {
        let from_level = self.level;
        self.experience = self.experience.saturating_add(amount);
        loop {
            let threshold = self.level.saturating_mul(XP_PER_LEVEL);
            if self.experience < threshold {
                break;
            }
            self.experience -= threshold;
            self.level = self.level.saturating_add(1);
            self.max_health = self.max_health.saturating_add(10);
            self.strength = self.strength.saturating_add(2);
            self.defense = self.defense.saturating_add(1);
        }
        if self.level > from_level {
            self.health = self.max_health;
            Some(LevelUp {
                from_level,
                to_level: self.level,
            })
        } else {
            None
        }
    }
}

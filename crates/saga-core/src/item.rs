use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// Broad category of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Adds to attack power through a strength effect.
    Weapon,
    /// Adds to armor through a defense effect.
    Armor,
    /// Consumed in combat to restore health.
    Potion,
    /// Edible.
    Food,
    /// Opens something.
    Key,
    /// Valuable, otherwise inert.
    Treasure,
    /// Crafting input.
    Material,
    /// A utility object.
    Tool,
    /// Tied to a quest.
    Quest,
    /// Anything else.
    #[default]
    Misc,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Potion => "potion",
            Self::Food => "food",
            Self::Key => "key",
            Self::Treasure => "treasure",
            Self::Material => "material",
            Self::Tool => "tool",
            Self::Quest => "quest",
            Self::Misc => "misc",
        };
        f.write_str(s)
    }
}

/// A character stat an item can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    /// Current health.
    Health,
    /// Health ceiling.
    MaxHealth,
    /// Attack strength.
    Strength,
    /// Damage mitigation.
    Defense,
}

/// A single signed modifier to one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEffect {
    /// The stat affected.
    pub stat: Stat,
    /// Signed amount.
    pub value: i32,
}

/// An item in an inventory or lying at a location.
///
/// Items are value objects: exactly one container owns a given item until
/// a state change moves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Category.
    #[serde(default)]
    pub item_type: ItemType,
    /// Optional stat effect.
    #[serde(default)]
    pub effect: Option<StatEffect>,
    /// Worth in gold.
    #[serde(default)]
    pub value: u32,
}

impl WorldItem {
    /// Create an item with a generated id and no effect.
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            description: String::new(),
            item_type,
            effect: None,
            value: 0,
        }
    }

    /// Attach a stat effect.
    pub fn with_effect(mut self, stat: Stat, value: i32) -> Self {
        self.effect = Some(StatEffect { stat, value });
        self
    }

    /// Set the gold value.
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// The signed bonus this item grants to `stat`, or 0.
    pub fn bonus_to(&self, stat: Stat) -> i32 {
        match self.effect {
            Some(effect) if effect.stat == stat => effect.value,
            _ => 0,
        }
    }

    /// Health restored when consumed, never negative.
    pub fn healing(&self) -> i32 {
        self.bonus_to(Stat::Health).max(0)
    }
}

/// Partial item description as produced by a collaborator.
///
/// Every field is optional; [`ItemDraft::build`] fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemDraft {
    /// Id; generated when absent.
    pub id: Option<ItemId>,
    /// Display name.
    pub name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Item category.
    pub item_type: Option<ItemType>,
    /// Stat bonus.
    pub effect: Option<StatEffect>,
    /// Trade value; clamped to zero or more.
    pub value: Option<i64>,
}

impl ItemDraft {
    /// Start a draft with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Build a complete item. Negative values clamp to zero.
    pub fn build(self) -> WorldItem {
        WorldItem {
            id: self.id.unwrap_or_else(ItemId::generate),
            name: self
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unremarkable trinket".to_string()),
            description: self.description.unwrap_or_default(),
            item_type: self.item_type.unwrap_or_default(),
            effect: self.effect,
            value: self.value.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32,
        }
    }
}

impl From<WorldItem> for ItemDraft {
    fn from(item: WorldItem) -> Self {
        Self {
            id: Some(item.id),
            name: Some(item.name),
            description: Some(item.description),
            item_type: Some(item.item_type),
            effect: item.effect,
            value: Some(i64::from(item.value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_fills_defaults() {
        let item = ItemDraft::default().build();
        assert!(item.id.as_str().starts_with("item_"));
        assert_eq!(item.item_type, ItemType::Misc);
        assert_eq!(item.value, 0);
        assert!(!item.name.is_empty());
    }

    #[test]
    fn draft_clamps_negative_value() {
        let draft = ItemDraft {
            value: Some(-40),
            ..ItemDraft::named("Cursed coin")
        };
        assert_eq!(draft.build().value, 0);
    }

    #[test]
    fn healing_ignores_other_stats() {
        let potion = WorldItem::new("Tonic", ItemType::Potion).with_effect(Stat::Health, 25);
        let sword = WorldItem::new("Sword", ItemType::Weapon).with_effect(Stat::Strength, 4);
        assert_eq!(potion.healing(), 25);
        assert_eq!(sword.healing(), 0);
        assert_eq!(sword.bonus_to(Stat::Strength), 4);
    }

    #[test]
    fn item_type_parses_snake_case() {
        let t: ItemType = serde_json::from_str("\"potion\"").unwrap();
        assert_eq!(t, ItemType::Potion);
    }

    #[test]
    fn effect_stat_uses_camel_case() {
        let e: StatEffect = serde_json::from_str(r#"{"stat":"maxHealth","value":5}"#).unwrap();
        assert_eq!(e.stat, Stat::MaxHealth);
    }
}

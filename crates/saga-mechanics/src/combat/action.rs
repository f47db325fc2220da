//! Player combat actions and their resolution.

use std::fmt;
use std::str::FromStr;

use saga_core::{ItemType, NpcId, RandomSource, WorldEventType, WorldState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DAMAGE_VARIANCE, FLEE_CHANCE, damage};
use crate::error::{MechError, MechResult};

/// What the player does on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatAction {
    /// Strike the enemy.
    Attack,
    /// Brace; the next enemy hit is halved.
    Defend,
    /// Try to escape.
    Flee,
    /// Drink the first potion carried.
    #[serde(alias = "usePotion", alias = "potion")]
    UsePotion,
}

impl fmt::Display for CombatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "Attack"),
            Self::Defend => write!(f, "Defend"),
            Self::Flee => write!(f, "Flee"),
            Self::UsePotion => write!(f, "Use potion"),
        }
    }
}

impl FromStr for CombatAction {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "attack" | "a" => Ok(Self::Attack),
            "defend" | "d" => Ok(Self::Defend),
            "flee" | "f" | "run" => Ok(Self::Flee),
            "use_potion" | "usepotion" | "potion" | "p" => Ok(Self::UsePotion),
            _ => Err(MechError::UnknownAction(s.to_string())),
        }
    }
}

/// One mechanical thing that happened during an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CombatEvent {
    /// The player hit the enemy.
    PlayerHit {
        /// Damage dealt.
        damage: i32,
        /// Enemy health left.
        enemy_health: i32,
    },
    /// The player braced for the next blow.
    Braced,
    /// The player tried to run and was caught.
    FleeFailed,
    /// The player got away.
    Fled,
    /// The player reached for a potion and found none.
    NoPotion,
    /// The player drank a potion.
    DrankPotion {
        /// Potion name.
        item: String,
        /// Health restored.
        healed: i32,
    },
    /// The enemy hit the player.
    EnemyHit {
        /// Damage taken.
        damage: i32,
        /// The blow was halved by bracing.
        halved: bool,
        /// Player health left.
        player_health: i32,
    },
    /// The enemy fell.
    Victory {
        /// Enemy name.
        enemy: String,
    },
    /// The enemy's belongings dropped to the ground.
    LootDropped {
        /// Item names.
        items: Vec<String>,
    },
    /// The player went up a level.
    LevelUp {
        /// The new level.
        level: u32,
    },
    /// The player fell.
    Defeat,
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerHit {
                damage,
                enemy_health,
            } => write!(f, "You hit for {damage} damage (enemy at {enemy_health} HP)"),
            Self::Braced => write!(f, "You brace for the next blow"),
            Self::FleeFailed => write!(f, "You fail to get away"),
            Self::Fled => write!(f, "You escape"),
            Self::NoPotion => write!(f, "You have no potion"),
            Self::DrankPotion { item, healed } => write!(f, "You drink {item} and recover {healed} HP"),
            Self::EnemyHit {
                damage,
                halved,
                player_health,
            } => {
                if *halved {
                    write!(f, "The enemy hits your guard for {damage} damage (you are at {player_health} HP)")
                } else {
                    write!(f, "The enemy hits you for {damage} damage (you are at {player_health} HP)")
                }
            }
            Self::Victory { enemy } => write!(f, "{enemy} is defeated"),
            Self::LootDropped { items } => write!(f, "Dropped: {}", items.join(", ")),
            Self::LevelUp { level } => write!(f, "You reach level {level}"),
            Self::Defeat => write!(f, "You fall"),
        }
    }
}

/// Structured result of one combat action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatOutcome {
    /// What happened, in order.
    pub events: Vec<CombatEvent>,
    /// Whether the fight is over.
    pub combat_ended: bool,
    /// The enemy was defeated.
    pub player_victory: bool,
    /// The player was defeated.
    pub player_defeated: bool,
    /// The player got away.
    pub fled: bool,
    /// Experience awarded.
    pub experience_gained: u32,
    /// Gold awarded.
    pub gold_gained: u32,
    /// The player gained a level.
    pub leveled_up: bool,
    /// Level after the level-up.
    pub new_level: Option<u32>,
}

impl CombatOutcome {
    /// Mechanical messages, one per event.
    pub fn messages(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

/// Resolve one player action against the current fight.
///
/// Draws from `rng` in a fixed order: the player's damage variance (for
/// an attack) or the flee roll, then the enemy's damage variance if the
/// enemy gets to act. A missing potion ends the call without a turn
/// passing. With no fight running nothing is touched.
pub fn resolve_action(
    state: &mut WorldState,
    action: CombatAction,
    rng: &mut dyn RandomSource,
) -> MechResult<CombatOutcome> {
    let mut combat = state.combat_state.clone().ok_or(MechError::NotInCombat)?;
    let enemy_id = combat.enemy_npc_id.clone();
    match state.npcs.get(&enemy_id) {
        Some(npc) if npc.is_alive => {}
        _ => return Err(MechError::EnemyMissing(enemy_id)),
    }

    let mut outcome = CombatOutcome::default();
    debug!(%action, turn = combat.turn_count, "resolving combat action");

    match action {
        CombatAction::Attack => {
            let variance = rng.uniform(-DAMAGE_VARIANCE, DAMAGE_VARIANCE);
            let power = state.player.attack_power();
            let Some(enemy) = state.npcs.get_mut(&enemy_id) else {
                return Err(MechError::EnemyMissing(enemy_id));
            };
            let dealt = damage(power, enemy.stats.defense, variance);
            enemy.stats.health = (enemy.stats.health - dealt).max(0);
            outcome.events.push(CombatEvent::PlayerHit {
                damage: dealt,
                enemy_health: enemy.stats.health,
            });
            if enemy.stats.health == 0 {
                victory(state, &enemy_id, &mut outcome);
                return Ok(outcome);
            }
        }
        CombatAction::Defend => {
            combat.player_defending = true;
            outcome.events.push(CombatEvent::Braced);
        }
        CombatAction::Flee => {
            if rng.chance(FLEE_CHANCE) {
                flee(state, &enemy_id, &mut outcome);
                return Ok(outcome);
            }
            outcome.events.push(CombatEvent::FleeFailed);
        }
        CombatAction::UsePotion => {
            let player = &mut state.player;
            let Some(index) = player
                .inventory
                .iter()
                .position(|i| i.item_type == ItemType::Potion)
            else {
                outcome.events.push(CombatEvent::NoPotion);
                return Ok(outcome);
            };
            let potion = player.inventory.remove(index);
            let healed = player.heal(potion.healing());
            outcome.events.push(CombatEvent::DrankPotion {
                item: potion.name,
                healed,
            });
        }
    }

    combat.player_turn = false;
    enemy_turn(state, &enemy_id, &mut combat, rng, &mut outcome);
    if outcome.player_defeated {
        return Ok(outcome);
    }
    combat.player_turn = true;
    combat.turn_count += 1;
    state.combat_state = Some(combat);
    Ok(outcome)
}

fn enemy_turn(
    state: &mut WorldState,
    enemy_id: &NpcId,
    combat: &mut saga_core::CombatState,
    rng: &mut dyn RandomSource,
    outcome: &mut CombatOutcome,
) {
    let variance = rng.uniform(-DAMAGE_VARIANCE, DAMAGE_VARIANCE);
    let strength = state.npcs.get(enemy_id).map_or(0, |n| n.stats.strength);
    let mut dealt = damage(strength, state.player.armor(), variance);
    let halved = std::mem::take(&mut combat.player_defending);
    if halved {
        dealt = (dealt / 2).max(1);
    }
    state.player.take_damage(dealt);
    outcome.events.push(CombatEvent::EnemyHit {
        damage: dealt,
        halved,
        player_health: state.player.health,
    });

    if state.player.health <= 0 {
        state.player.health = 0;
        state.combat_state = None;
        outcome.combat_ended = true;
        outcome.player_defeated = true;
        outcome.events.push(CombatEvent::Defeat);
        let name = state
            .npcs
            .get(enemy_id)
            .map_or_else(|| enemy_id.to_string(), |n| n.name.clone());
        let event = state
            .event_here(
                WorldEventType::Combat,
                format!("{} was struck down by {name}", state.player.name),
            )
            .involving(enemy_id.clone())
            .significant();
        state.record_event(event);
        info!(enemy = %enemy_id, "player defeated");
    }
}

fn victory(state: &mut WorldState, enemy_id: &NpcId, outcome: &mut CombatOutcome) {
    let here = state.player.current_location_id.clone();
    let (name, xp, gold, loot) = match state.npcs.get_mut(enemy_id) {
        Some(enemy) => {
            enemy.kill();
            (
                enemy.name.clone(),
                enemy.experience_reward,
                enemy.gold_reward,
                std::mem::take(&mut enemy.inventory),
            )
        }
        None => return,
    };
    state.combat_state = None;
    state.player.companion_ids.retain(|id| id != enemy_id);

    outcome.combat_ended = true;
    outcome.player_victory = true;
    outcome.experience_gained = xp;
    outcome.gold_gained = gold;
    outcome.events.push(CombatEvent::Victory { enemy: name.clone() });

    state.player.change_gold(i64::from(gold));
    if let Some(up) = state.player.gain_experience(xp) {
        outcome.leveled_up = true;
        outcome.new_level = Some(up.to_level);
        outcome.events.push(CombatEvent::LevelUp { level: up.to_level });
    }

    if !loot.is_empty() {
        let names = loot.iter().map(|i| i.name.clone()).collect();
        if let Some(loc) = state.locations.get_mut(&here) {
            for item in loot {
                if !loc.items.iter().any(|i| i.id == item.id) {
                    loc.items.push(item);
                }
            }
        }
        outcome.events.push(CombatEvent::LootDropped { items: names });
    }

    let event = state
        .event_here(WorldEventType::Combat, format!("Defeated {name} in combat"))
        .involving(enemy_id.clone())
        .significant();
    state.record_event(event);
    info!(enemy = %enemy_id, xp, gold, "combat won");
}

fn flee(state: &mut WorldState, enemy_id: &NpcId, outcome: &mut CombatOutcome) {
    state.combat_state = None;
    outcome.combat_ended = true;
    outcome.fled = true;
    outcome.events.push(CombatEvent::Fled);
    let name = state
        .npcs
        .get(enemy_id)
        .map_or_else(|| enemy_id.to_string(), |n| n.name.clone());
    let event = state
        .event_here(WorldEventType::Combat, format!("Fled from {name}"))
        .involving(enemy_id.clone());
    state.record_event(event);
    info!(enemy = %enemy_id, "player fled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::begin;
    use saga_core::{
        Coordinates, Location, LocationId, Npc, Player, ScriptedRandom, Stat, Stats, Terrain,
        WorldItem,
    };

    /// Draw that maps to zero variance.
    const EVEN: f64 = 0.5;

    fn world(enemy_stats: Stats) -> WorldState {
        let here = LocationId::from("loc_road");
        let mut w = WorldState::new("Test", Player::new("Wren", here.clone()));
        w.add_location(Location::new("loc_road", "Old Road", Coordinates::new(0, 0), Terrain::Road, 2));
        let mut bandit = Npc::new("npc_bandit", "Bandit", here)
            .with_stats(enemy_stats)
            .hostile(20, 7);
        bandit
            .inventory
            .push(WorldItem::new("Rusty knife", ItemType::Weapon).with_effect(Stat::Strength, 1));
        w.add_npc(bandit);
        begin(&mut w, &enemy()).unwrap();
        w
    }

    fn enemy() -> NpcId {
        NpcId::from("npc_bandit")
    }

    fn stats(health: i32, strength: i32, defense: i32) -> Stats {
        Stats {
            health,
            max_health: health,
            strength,
            defense,
        }
    }

    #[test]
    fn action_without_combat_is_rejected() {
        let mut w = world(stats(30, 6, 0));
        w.combat_state = None;
        let before = w.clone();
        let mut rng = ScriptedRandom::constant(EVEN);
        assert!(matches!(
            resolve_action(&mut w, CombatAction::Attack, &mut rng),
            Err(MechError::NotInCombat)
        ));
        assert_eq!(w, before);
    }

    #[test]
    fn attack_damage_follows_injected_variance() {
        let mut w = world(stats(100, 6, 4));
        // r = -3: floor(10 - 2 - 3) = 5
        let mut rng = ScriptedRandom::new([0.0, EVEN]);
        let out = resolve_action(&mut w, CombatAction::Attack, &mut rng).unwrap();
        assert_eq!(
            out.events[0],
            CombatEvent::PlayerHit {
                damage: 5,
                enemy_health: 95
            }
        );
        // enemy: floor(6 - 2.5 + 0) = 3
        assert_eq!(w.player.health, 97);
        let cs = w.combat_state.as_ref().unwrap();
        assert_eq!(cs.turn_count, 2);
        assert!(cs.player_turn);
    }

    #[test]
    fn killing_blow_ends_combat_in_victory() {
        let mut w = world(stats(5, 6, 0));
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::Attack, &mut rng).unwrap();
        assert!(out.combat_ended);
        assert!(out.player_victory);
        assert!(w.combat_state.is_none());
        let bandit = &w.npcs[&enemy()];
        assert!(!bandit.is_alive);
        assert_eq!(bandit.stats.health, 0);
        assert_eq!(out.experience_gained, 20);
        assert_eq!(out.gold_gained, 7);
        assert_eq!(w.player.gold, 32);
        assert_eq!(w.player.health, 100);
        assert_eq!(w.locations[&LocationId::from("loc_road")].items.len(), 1);
        assert!(bandit.inventory.is_empty());
        assert!(w.event_history.last().unwrap().is_significant);
    }

    #[test]
    fn victory_at_level_boundary_levels_up() {
        let mut w = world(stats(5, 6, 0));
        w.npcs.get_mut(&enemy()).unwrap().experience_reward = 1;
        w.player.experience = 49;
        w.player.health = 40;
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::Attack, &mut rng).unwrap();
        assert!(out.leveled_up);
        assert_eq!(out.new_level, Some(2));
        assert_eq!(w.player.level, 2);
        assert_eq!(w.player.experience, 0);
        assert_eq!(w.player.max_health, 110);
        assert_eq!(w.player.health, 110);
        assert_eq!(w.player.strength, 12);
        assert_eq!(w.player.defense, 6);
    }

    #[test]
    fn defend_halves_the_next_hit() {
        let mut w = world(stats(100, 20, 0));
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::Defend, &mut rng).unwrap();
        // floor(20 - 2.5) = 17, halved to 8
        assert_eq!(
            out.events[1],
            CombatEvent::EnemyHit {
                damage: 8,
                halved: true,
                player_health: 92
            }
        );
        assert!(!w.combat_state.as_ref().unwrap().player_defending);

        let out = resolve_action(&mut w, CombatAction::Attack, &mut rng).unwrap();
        assert!(matches!(out.events[1], CombatEvent::EnemyHit { damage: 17, halved: false, .. }));
    }

    #[test]
    fn successful_flee_ends_combat_without_rewards() {
        let mut w = world(stats(30, 6, 0));
        let mut rng = ScriptedRandom::new([0.2]);
        let out = resolve_action(&mut w, CombatAction::Flee, &mut rng).unwrap();
        assert!(out.fled && out.combat_ended);
        assert!(!out.player_victory);
        assert_eq!(out.experience_gained, 0);
        assert!(w.combat_state.is_none());
        assert!(w.npcs[&enemy()].is_alive);
    }

    #[test]
    fn failed_flee_lets_enemy_act() {
        let mut w = world(stats(30, 6, 0));
        let mut rng = ScriptedRandom::new([0.7, EVEN]);
        let out = resolve_action(&mut w, CombatAction::Flee, &mut rng).unwrap();
        assert!(!out.combat_ended);
        assert_eq!(out.events[0], CombatEvent::FleeFailed);
        assert!(matches!(out.events[1], CombatEvent::EnemyHit { .. }));
        assert!(w.player.health < 100);
    }

    #[test]
    fn missing_potion_costs_no_turn() {
        let mut w = world(stats(30, 6, 0));
        let before = w.clone();
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::UsePotion, &mut rng).unwrap();
        assert_eq!(out.events, vec![CombatEvent::NoPotion]);
        assert_eq!(w, before);
    }

    #[test]
    fn potion_heals_up_to_max() {
        let mut w = world(stats(30, 6, 0));
        w.player.health = 90;
        w.player
            .inventory
            .push(WorldItem::new("Red tonic", ItemType::Potion).with_effect(Stat::Health, 50));
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::UsePotion, &mut rng).unwrap();
        assert_eq!(
            out.events[0],
            CombatEvent::DrankPotion {
                item: "Red tonic".into(),
                healed: 10
            }
        );
        assert!(w.player.inventory.is_empty());
    }

    #[test]
    fn enormous_potion_still_caps_at_max() {
        let mut w = world(stats(30, 6, 0));
        w.player.health = 40;
        w.player
            .inventory
            .push(WorldItem::new("Elixir", ItemType::Potion).with_effect(Stat::Health, i32::MAX));
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::UsePotion, &mut rng).unwrap();
        assert_eq!(
            out.events[0],
            CombatEvent::DrankPotion {
                item: "Elixir".into(),
                healed: 60
            }
        );
        // The bandit answers for 3 after the drink.
        assert_eq!(w.player.health, w.player.max_health - 3);
        assert!(!out.player_defeated);
    }

    #[test]
    fn events_serialize_with_camel_case_fields() {
        let hit = CombatEvent::EnemyHit {
            damage: 4,
            halved: true,
            player_health: 96,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "enemy_hit", "damage": 4, "halved": true, "playerHealth": 96})
        );
        let back: CombatEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, hit);
        let player_hit = serde_json::to_value(CombatEvent::PlayerHit {
            damage: 7,
            enemy_health: 13,
        })
        .unwrap();
        assert_eq!(player_hit["enemyHealth"], 13);
    }

    #[test]
    fn lethal_enemy_hit_is_defeat() {
        let mut w = world(stats(100, 200, 0));
        let mut rng = ScriptedRandom::constant(EVEN);
        let out = resolve_action(&mut w, CombatAction::Attack, &mut rng).unwrap();
        assert!(out.player_defeated && out.combat_ended);
        assert_eq!(w.player.health, 0);
        assert!(w.combat_state.is_none());
        assert!(w.npcs[&enemy()].is_alive);
    }

    #[test]
    fn action_names_parse() {
        assert_eq!("attack".parse::<CombatAction>().unwrap(), CombatAction::Attack);
        assert_eq!("Use-Potion".parse::<CombatAction>().unwrap(), CombatAction::UsePotion);
        assert_eq!("potion".parse::<CombatAction>().unwrap(), CombatAction::UsePotion);
        assert!("dance".parse::<CombatAction>().is_err());
    }

    #[test]
    fn events_render_messages() {
        let out = CombatOutcome {
            events: vec![CombatEvent::Braced, CombatEvent::LevelUp { level: 3 }],
            ..CombatOutcome::default()
        };
        assert_eq!(out.messages(), vec!["You brace for the next blow", "You reach level 3"]);
    }
}

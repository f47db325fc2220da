//! The starting world.
//!
//! A small valley around the village of Millbrook. The hero knows only the
//! village; everything else has to be heard about or stumbled upon.

use saga_core::{
    Coordinates, Faction, FactionId, ItemId, ItemType, Location, LocationId, Npc, Player, Quest,
    Stat, Stats, Structure, Terrain, WorldItem, WorldState,
};

/// Where every hero begins.
pub const STARTING_LOCATION: &str = "loc_millbrook";

/// Build a fresh world for `config`.
pub fn seed_world(config: &crate::SessionConfig) -> WorldState {
    let start = LocationId::from(STARTING_LOCATION);
    let mut world = WorldState::new(config.world_name.clone(), new_hero(&config.player_name, &start));

    let watch = FactionId::from("faction_millbrook_watch");
    let mut faction = Faction::new(watch.clone(), "Millbrook Watch");
    faction.description = "Farmers with spears who keep the valley roads".to_string();
    world.add_faction(faction);

    let mut millbrook = Location::new(start.clone(), "Millbrook", Coordinates::new(0, 0), Terrain::Village, 1)
        .with_description("A cluster of thatched houses around a mill pond.");
    millbrook.faction_id = Some(watch.clone());
    millbrook.structures.push(Structure {
        name: "The Drowsy Otter".to_string(),
        kind: "inn".to_string(),
        description: "Low beams, a wide hearth, watered ale.".to_string(),
    });
    world.add_location(millbrook);

    world.add_location(
        Location::new("loc_east_road", "East Road", Coordinates::new(2, 0), Terrain::Road, 2)
            .with_description("A rutted cart track running east along the river."),
    );
    world.add_location(
        Location::new("loc_whisperwood", "Whisperwood", Coordinates::new(4, 1), Terrain::Forest, 4)
            .with_description("Old oaks, older paths, and wolves."),
    );
    world.add_location(
        Location::new("loc_saltmere", "Saltmere", Coordinates::new(-3, 2), Terrain::Village, 2)
            .with_description("A fishing hamlet on a brackish lake."),
    );
    world.add_location(
        Location::new("loc_greyfang_caves", "Greyfang Caves", Coordinates::new(6, 4), Terrain::Cave, 7)
            .with_description("A bandit hideout cut into the hillside."),
    );

    let mut innkeeper = Npc::new("npc_innkeeper", "Marta Hale", start.clone()).with_attitude(20);
    innkeeper.role = "innkeeper".to_string();
    innkeeper.faction_id = Some(watch.clone());
    innkeeper.soul_instruction = "Warm but shrewd. Trades gossip for coin.".to_string();
    world.add_npc(innkeeper);

    let mut smith = Npc::new("npc_smith", "Bram Ironside", start.clone()).with_attitude(5);
    smith.role = "blacksmith".to_string();
    smith.faction_id = Some(watch);
    world.add_npc(smith);

    let mut wolf = Npc::new("npc_grey_wolf", "Grey Wolf", LocationId::from("loc_whisperwood"))
        .with_stats(Stats {
            health: 25,
            max_health: 25,
            strength: 7,
            defense: 2,
        })
        .hostile(20, 0);
    wolf.description = "Lean and scarred, leader of the pack that raids the farms.".to_string();
    world.add_npc(wolf);

    let mut bandit = Npc::new("npc_bandit_chief", "Corvin the Red", LocationId::from("loc_greyfang_caves"))
        .with_stats(Stats {
            health: 60,
            max_health: 60,
            strength: 12,
            defense: 6,
        })
        .with_attitude(-60)
        .hostile(60, 40);
    bandit.role = "bandit chief".to_string();
    bandit.inventory.push(WorldItem {
        id: ItemId::new("item_red_blade"),
        ..WorldItem::new("Red Blade", ItemType::Weapon)
            .with_effect(Stat::Strength, 4)
            .with_value(50)
    });
    world.add_npc(bandit);

    let mut quest = Quest::new("quest_wolves", "Wolves at the Edge")
        .with_objective("Find the wolves' den")
        .with_objective("Deal with the pack leader");
    quest.description = "Something is taking sheep from the eastern farms.".to_string();
    quest.giver_npc_id = Some("npc_innkeeper".into());
    quest.reward_gold = 30;
    quest.reward_experience = 25;
    world.add_quest(quest);

    world
}

/// A level 1 hero at `start` with a blade and a potion.
pub fn new_hero(name: &str, start: &LocationId) -> Player {
    let mut hero = Player::new(name, start.clone());
    hero.inventory.push(WorldItem {
        id: ItemId::new("item_worn_sword"),
        ..WorldItem::new("Worn Sword", ItemType::Weapon).with_effect(Stat::Strength, 2)
    });
    hero.inventory.push(WorldItem {
        id: ItemId::new("item_healing_draught"),
        ..WorldItem::new("Healing Draught", ItemType::Potion)
            .with_effect(Stat::Health, 30)
            .with_value(10)
    });
    hero
}

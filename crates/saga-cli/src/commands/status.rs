use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use saga_core::QuestStatus;

use super::Context;

pub fn run(ctx: &Context) -> Result<(), String> {
    let session = ctx.open()?;
    let world = session.snapshot();
    let player = &world.player;
    let here = world.current_location().map_err(|e| e.to_string())?;

    println!(
        "  {} [{}]  action {}",
        player.name.bold(),
        format!("level {}", player.level).dimmed(),
        world.action_counter
    );
    println!(
        "  Health {}/{}   Attack {}   Armor {}   Gold {}   XP {}",
        player.health,
        player.max_health,
        player.attack_power(),
        player.armor(),
        player.gold,
        player.experience
    );
    println!();
    println!("  {} ({}, danger {})", here.name.bold(), here.terrain, here.danger_level());
    if !here.description.is_empty() {
        println!("  {}", here.description);
    }

    let present: Vec<_> = world
        .npcs_at(&here.id)
        .filter(|n| n.is_alive)
        .collect();
    if !present.is_empty() {
        println!();
        println!("  {}", "Here".bold().underline());
        for npc in present {
            let tag = if npc.is_companion {
                "companion".green()
            } else if npc.is_hostile {
                "hostile".red()
            } else {
                format!("attitude {}", npc.attitude()).normal()
            };
            println!("  - {} ({})", npc.name, tag);
        }
    }

    if let Some(combat) = &world.combat_state {
        let enemy = world
            .npcs
            .get(&combat.enemy_npc_id)
            .map_or_else(|| combat.enemy_npc_id.to_string(), |n| {
                format!("{} ({}/{})", n.name, n.stats.health, n.stats.max_health)
            });
        println!();
        println!("  {} {} (turn {})", "IN COMBAT".red().bold(), enemy, combat.turn_count);
    }

    if !player.inventory.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Item", "Type", "Effect", "Value"]);
        for item in &player.inventory {
            let effect = item
                .effect
                .as_ref()
                .map_or_else(|| "-".to_string(), |e| format!("{:?} {:+}", e.stat, e.value));
            table.add_row(vec![
                item.name.clone(),
                format!("{:?}", item.item_type).to_lowercase(),
                effect,
                item.value.to_string(),
            ]);
        }
        println!();
        println!("{table}");
    }

    let active: Vec<_> = world
        .quests
        .values()
        .filter(|q| q.status == QuestStatus::Active)
        .collect();
    if !active.is_empty() {
        println!();
        println!("  {}", "Quests".bold().underline());
        for quest in active {
            println!(
                "  - {} ({}/{} objectives)",
                quest.title,
                quest.completed_objectives().len(),
                quest.objectives.len()
            );
        }
    }

    Ok(())
}

use colored::Colorize;
use saga_mechanics::CombatAction;

use super::Context;

pub fn fight(ctx: &Context, npc: &str) -> Result<(), String> {
    let session = ctx.open()?;
    let enemy = session.start_combat(npc).map_err(|e| e.to_string())?;
    let world = session.snapshot();
    let name = world.npcs.get(&enemy).map_or(enemy.as_str(), |n| n.name.as_str());
    println!("  {} {name}", "Combat started with".red().bold());
    Ok(())
}

pub fn act(ctx: &Context, action: &str) -> Result<(), String> {
    let action: CombatAction = action.parse().map_err(|e: saga_mechanics::MechError| e.to_string())?;
    let session = ctx.open()?;
    let outcome = session.combat_action(action).map_err(|e| e.to_string())?;

    for message in outcome.messages() {
        println!("  {message}");
    }
    if outcome.player_victory {
        println!("  {}", "Victory!".green().bold());
    } else if outcome.player_defeated {
        println!("  {}", "You have fallen.".red().bold());
        println!("  Use `saga retire --cause <text>` to lay the hero to rest.");
    } else if outcome.fled {
        println!("  {}", "You got away.".yellow());
    }
    if let Some(level) = outcome.new_level {
        println!("  {} {level}", "Level up!".green().bold());
    }
    Ok(())
}

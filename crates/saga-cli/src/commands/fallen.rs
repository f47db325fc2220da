use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::Context;

pub fn list(ctx: &Context) -> Result<(), String> {
    let session = ctx.open()?;
    let world = session.snapshot();
    if world.deceased_heroes.is_empty() {
        println!("  No heroes have fallen.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Level", "Gold", "Fell at", "Cause", "Action"]);
    for hero in &world.deceased_heroes {
        table.add_row(vec![
            hero.name.clone(),
            hero.level.to_string(),
            hero.gold.to_string(),
            hero.location_name.clone(),
            hero.cause_of_death.clone(),
            hero.died_at_action.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} fallen", world.deceased_heroes.len());
    Ok(())
}

pub fn retire(ctx: &Context, cause: &str) -> Result<(), String> {
    let session = ctx.open()?;
    let hero = session.record_fallen_hero(cause).map_err(|e| e.to_string())?;
    println!("  {} {} fell at {}.", "RIP".red().bold(), hero.name, hero.location_name);
    for deed in &hero.notable_deeds {
        println!("  - {deed}");
    }
    println!("  A new hero sets out.");
    Ok(())
}

pub fn reset(ctx: &Context) -> Result<(), String> {
    let session = ctx.open()?;
    session.reset().map_err(|e| e.to_string())?;
    println!("  The world begins again.");
    Ok(())
}

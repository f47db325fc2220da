use std::fs;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use saga_simulation::{EncounterResolution, RoutePlan};

use super::{Context, print_warnings};

fn plan_table(plan: &RoutePlan) -> Table {
    let terrains: Vec<String> = plan.terrains_crossed.iter().map(ToString::to_string).collect();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["From", "To", "Distance", "Danger", "Terrain", "Encounter"]);
    table.add_row(vec![
        plan.from.to_string(),
        plan.to.to_string(),
        plan.distance.to_string(),
        format!("{:.1}", plan.average_danger),
        if terrains.is_empty() {
            "-".to_string()
        } else {
            terrains.join(", ")
        },
        format!("{:.0}%", plan.encounter_chance * 100.0),
    ]);
    table
}

pub fn route(ctx: &Context, destination: &str) -> Result<(), String> {
    let session = ctx.open()?;
    let plan = session.plan_travel(destination).map_err(|e| e.to_string())?;
    println!("{}", plan_table(&plan));
    Ok(())
}

/// Without an encounter file the journey is rolled first. A triggered
/// encounter stops here and prints what the classifier needs; run again
/// with `--encounter` once it has been classified.
pub fn travel(ctx: &Context, destination: &str, encounter: Option<&Path>) -> Result<(), String> {
    let encounter = match encounter {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let parsed: EncounterResolution =
                serde_json::from_str(&text).map_err(|e| format!("invalid encounter: {e}"))?;
            Some(parsed)
        }
        None => None,
    };

    let session = ctx.open()?;
    if encounter.is_none() {
        let roll = session.roll_travel(destination).map_err(|e| e.to_string())?;
        if let Some(context) = roll.context.filter(|_| roll.encounter_triggered) {
            println!("  {}", "Something happens on the road.".yellow().bold());
            let payload = serde_json::to_string_pretty(&context).map_err(|e| e.to_string())?;
            println!("{payload}");
            println!("  Classify it and run again with --encounter <file>.");
            return Ok(());
        }
    }

    let report = session
        .complete_travel(destination, encounter)
        .map_err(|e| e.to_string())?;
    let world = session.snapshot();
    let at = world
        .locations
        .get(&report.outcome.final_location_id)
        .map_or_else(|| report.outcome.final_location_id.to_string(), |l| l.name.clone());

    if report.outcome.arrived {
        println!("  Arrived at {}.", at.bold());
    } else {
        println!("  {} You are still at {}.", "Journey cut short.".yellow().bold(), at);
    }
    if let Some(kind) = report.outcome.encounter {
        println!("  Encounter: {kind}");
    }
    print_warnings(&report.warnings);
    if let Some(enemy) = &report.combat_started {
        let name = world.npcs.get(enemy).map_or(enemy.as_str(), |n| n.name.as_str());
        println!("  {} {name}", "Combat started with".red().bold());
    }
    if report.needs_offscreen_refresh {
        println!("  {} changed while you were away.", at);
    }
    Ok(())
}

use colored::Colorize;
use saga_session::ActionResolution;
use serde_json::Value;

use super::{Context, print_warnings, read_input};

/// Accept either a full resolution or a bare list of changes.
fn parse_resolution(text: &str) -> Result<ActionResolution, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
    match value {
        Value::Array(changes) => Ok(ActionResolution::with_changes(changes)),
        other => serde_json::from_value(other).map_err(|e| format!("invalid resolution: {e}")),
    }
}

pub fn run(ctx: &Context, input: &str) -> Result<(), String> {
    let resolution = parse_resolution(&read_input(input)?)?;
    let session = ctx.open()?;
    let report = session.apply_resolution(resolution).map_err(|e| e.to_string())?;

    if !report.narrative.is_empty() {
        println!("{}", report.narrative);
        println!();
    }
    println!(
        "  Action {}: {} change{} applied",
        report.action_number,
        report.applied,
        if report.applied == 1 { "" } else { "s" }
    );
    print_warnings(&report.warnings);
    if let Some(enemy) = &report.combat_started {
        println!("  {} {enemy}", "Combat started with".red().bold());
    }
    for suggestion in &report.suggested_actions {
        println!("  > {suggestion}");
    }
    Ok(())
}

pub fn offscreen(ctx: &Context, location: &str, input: &str) -> Result<(), String> {
    let text = read_input(input)?;
    let changes: Vec<Value> =
        serde_json::from_str(&text).map_err(|e| format!("expected a JSON list of changes: {e}"))?;
    let session = ctx.open()?;
    let report = session
        .apply_offscreen_changes(location, &changes)
        .map_err(|e| e.to_string())?;
    println!(
        "  {}: {} off-screen change{} applied",
        report.location_id,
        report.applied,
        if report.applied == 1 { "" } else { "s" }
    );
    print_warnings(&report.warnings);
    Ok(())
}

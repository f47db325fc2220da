use saga_session::{JsonFileStore, WorldStore, seed_world};

use super::Context;

pub fn run(ctx: &Context, force: bool) -> Result<(), String> {
    if ctx.save.exists() && !force {
        return Err(format!(
            "'{}' already exists (use --force to start over)",
            ctx.save.display()
        ));
    }

    let config = ctx.config();
    let world = seed_world(&config);
    JsonFileStore::new(&ctx.save)
        .save(&world)
        .map_err(|e| e.to_string())?;

    let start = world
        .current_location()
        .map(|l| l.name.clone())
        .unwrap_or_default();
    println!("Created world '{}' in {}", world.world_name, ctx.save.display());
    println!("  {} stands in {}.", world.player.name, start);
    println!();
    println!("Get started:");
    println!("  saga status           # Where am I?");
    println!("  saga apply turn.json  # Apply a resolved action");
    println!("  saga map              # What do I know of the world?");

    Ok(())
}

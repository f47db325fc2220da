use super::Context;

pub fn run(
    ctx: &Context,
    npc: &str,
    player_line: &str,
    npc_line: &str,
    attitude: Option<i64>,
) -> Result<(), String> {
    let session = ctx.open()?;
    let now = session
        .record_dialogue(npc, player_line, npc_line, attitude)
        .map_err(|e| e.to_string())?;
    println!("  Recorded. Attitude is now {now}.");
    Ok(())
}

use super::Context;

pub fn run(ctx: &Context, json: bool) -> Result<(), String> {
    let session = ctx.open()?;
    let map = session.map();
    if json {
        let payload = serde_json::to_string_pretty(&map).map_err(|e| e.to_string())?;
        println!("{payload}");
    } else {
        print!("{}", map.render_ascii());
    }
    Ok(())
}

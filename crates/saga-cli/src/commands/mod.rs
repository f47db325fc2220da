pub mod apply;
pub mod combat;
pub mod fallen;
pub mod init;
pub mod map;
pub mod status;
pub mod talk;
pub mod travel;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use colored::Colorize;
use saga_session::{GameSession, JsonFileStore, SessionConfig};

/// What every command needs to reach the world.
pub struct Context {
    pub save: PathBuf,
    pub seed: Option<u64>,
}

impl Context {
    pub fn new(save: PathBuf, seed: Option<u64>) -> Self {
        Self { save, seed }
    }

    pub fn config(&self) -> SessionConfig {
        let config = SessionConfig::default();
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    /// Open the save, seeding a new world if there is none yet.
    pub fn open(&self) -> Result<GameSession<JsonFileStore>, String> {
        GameSession::open(JsonFileStore::new(&self.save), self.config()).map_err(|e| e.to_string())
    }
}

/// Read a whole file, or stdin for `-`.
fn read_input(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read stdin: {e}"))?;
        return Ok(buf);
    }
    fs::read_to_string(input).map_err(|e| format!("cannot read {input}: {e}"))
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("  {} {warning}", "skipped".yellow());
    }
}

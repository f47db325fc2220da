//! Command-line front end for Saga.
//!
//! Each invocation opens the save file, performs one operation through a
//! `GameSession`, and exits. Narration is someone else's job: commands take
//! and print the structured payloads the narrator collaborator exchanges.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::Context;

#[derive(Parser)]
#[command(
    name = "saga",
    about = "Saga: the world-state engine of a narrated role-playing game",
    version,
    propagate_version = true
)]
struct Cli {
    /// World save file
    #[arg(long, global = true, default_value = "saga_world.json")]
    save: PathBuf,

    /// RNG seed for reproducible combat and travel rolls
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new world save
    Init {
        /// Overwrite an existing save
        #[arg(long)]
        force: bool,
    },

    /// Show the hero, their surroundings and quests
    Status,

    /// Apply a resolved action (JSON object or bare change list)
    Apply {
        /// File to read, or - for stdin
        input: String,
    },

    /// Start a fight with an NPC
    Fight {
        /// NPC id or name
        npc: String,
    },

    /// Take a combat action: attack, defend, flee or potion
    Combat {
        /// The action
        action: String,
    },

    /// Show the risk of travelling somewhere
    Route {
        /// Destination id or name
        destination: String,
    },

    /// Travel somewhere
    Travel {
        /// Destination id or name
        destination: String,

        /// Encounter classification to apply (JSON file)
        #[arg(short, long)]
        encounter: Option<PathBuf>,
    },

    /// Apply off-screen changes to a location
    Offscreen {
        /// Location id or name
        location: String,

        /// File with a JSON list of changes, or - for stdin
        input: String,
    },

    /// Show the map of known places
    Map {
        /// Print the map payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a conversation with an NPC
    Talk {
        /// NPC id or name
        npc: String,

        /// What the hero said
        player_line: String,

        /// What the NPC answered
        npc_line: String,

        /// Attitude change
        #[arg(long, allow_hyphen_values = true)]
        attitude: Option<i64>,
    },

    /// List fallen heroes
    Fallen,

    /// Lay a fallen hero to rest and begin anew
    Retire {
        /// How the hero died
        #[arg(long)]
        cause: String,
    },

    /// Replace the world with a fresh one, keeping the fallen
    Reset,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.save, cli.seed);
    let result = match cli.command {
        Commands::Init { force } => commands::init::run(&ctx, force),
        Commands::Status => commands::status::run(&ctx),
        Commands::Apply { input } => commands::apply::run(&ctx, &input),
        Commands::Fight { npc } => commands::combat::fight(&ctx, &npc),
        Commands::Combat { action } => commands::combat::act(&ctx, &action),
        Commands::Route { destination } => commands::travel::route(&ctx, &destination),
        Commands::Travel {
            destination,
            encounter,
        } => commands::travel::travel(&ctx, &destination, encounter.as_deref()),
        Commands::Offscreen { location, input } => {
            commands::apply::offscreen(&ctx, &location, &input)
        }
        Commands::Map { json } => commands::map::run(&ctx, json),
        Commands::Talk {
            npc,
            player_line,
            npc_line,
            attitude,
        } => commands::talk::run(&ctx, &npc, &player_line, &npc_line, attitude),
        Commands::Fallen => commands::fallen::list(&ctx),
        Commands::Retire { cause } => commands::fallen::retire(&ctx, &cause),
        Commands::Reset => commands::fallen::reset(&ctx),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

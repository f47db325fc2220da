//! Configuration for a game session.

use saga_simulation::SimConfig;

/// Configuration for a [`GameSession`](crate::GameSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed. `None` seeds from the operating system.
    pub seed: Option<u64>,
    /// Name given to a freshly seeded world.
    pub world_name: String,
    /// Name of the hero in a fresh world and of every hero after a death.
    pub player_name: String,
    /// Travel and clock tuning.
    pub sim: SimConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            world_name: "The Hollow Vale".to_string(),
            player_name: "Wanderer".to_string(),
            sim: SimConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Seed the session RNG for reproducible rolls.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the world name used when seeding.
    pub fn with_world_name(mut self, name: impl Into<String>) -> Self {
        self.world_name = name.into();
        self
    }

    /// Set the hero name.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Set the simulation tuning.
    pub fn with_sim(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }
}

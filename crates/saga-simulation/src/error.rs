use saga_core::LocationId;

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised by travel and the location clock.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No location with this id or name exists.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// The destination does not exist or the player has never heard of it.
    #[error("unknown destination: {0}")]
    UnknownDestination(String),

    /// Travel was requested mid-fight.
    #[error("cannot travel during combat")]
    InCombat,

    /// The route starts somewhere other than where the player stands.
    #[error("route starts at {route_start} but the player is at {player_at}")]
    StaleRoute {
        /// Departure of the planned route.
        route_start: LocationId,
        /// The player's actual location.
        player_at: LocationId,
    },
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (owned by the session)
//! - Time only through the `now_ms` passed into each tick
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or file dependencies

pub mod achievements;
pub mod autopilot;
pub mod challenge;
pub mod grid;
pub mod movement;
pub mod powerup;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use achievements::{AchievementId, AchievementStatus};
pub use challenge::{ActivationFactors, ChallengeStatus};
pub use grid::{Direction, Grid, Position};
pub use movement::{Collision, advance, check_collision};
pub use snapshot::Snapshot;
pub use state::{
    ActiveChallenge, ChallengeSettings, Food, GameEvent, GamePhase, GameState, Mission,
    MissionKind, MobileFood, PowerUp, PowerUpKind, Snake,
};
pub use tick::{TickInput, TickOutcome, handle_collision, start_game, tick};

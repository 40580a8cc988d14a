//! Snake Arcade - a grid snake game with power-ups, achievements and challenges
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, power-ups, missions)
//! - `game`: Session driver wiring the simulation to its collaborators
//! - `platform`: Clock and frame pacing abstraction
//! - `persistence`: JSON save/load with atomic writes
//! - `config`: Difficulty tiers and data-driven game balance
//! - `highscores`: Top-10 leaderboard
//! - `audio`: Sound event hook

pub mod audio;
pub mod config;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;

pub use audio::{SoundBoard, SoundEvent, SoundSink};
pub use config::{Difficulty, GameConfig};
pub use game::{Command, Game, Response};
pub use highscores::{HighScoreEntry, HighScores, ScoreStore};
pub use persistence::PersistenceError;
pub use platform::{Clock, FrameLimiter, ManualClock, SystemClock};

/// Game configuration constants
pub mod consts {
    /// Board dimensions (pixels)
    pub const SCREEN_WIDTH: i32 = 800;
    pub const SCREEN_HEIGHT: i32 = 600;
    /// Size of one grid cell (pixels)
    pub const BLOCK_SIZE: i32 = 20;

    /// Snake speed, in ticks per second
    pub const INITIAL_SPEED: f32 = 5.0;
    pub const MAX_SPEED: f32 = 15.0;
    /// Speed gained per apple eaten
    pub const SPEED_INCREMENT: f32 = 0.5;
    pub const INITIAL_LIVES: u32 = 3;

    /// Segments in a freshly spawned snake
    pub const INITIAL_SNAKE_LENGTH: usize = 3;

    /// Ticks between periodic power-up spawn rolls
    pub const POWER_UP_SPAWN_INTERVAL: u32 = 50;
    /// Chance of a spawn on each periodic roll
    pub const POWER_UP_PERIODIC_CHANCE: f64 = 0.2;

    /// Chance a newly generated apple is mobile
    pub const MOBILE_FOOD_CHANCE: f64 = 0.3;
    /// Mobile food step (pixels per update)
    pub const MOBILE_FOOD_SPEED: i32 = 2;
    /// Mobile food picks a new direction every N updates
    pub const MOBILE_FOOD_TURN_INTERVAL: u32 = 30;

    /// Random placement attempts before falling back to a full board scan
    pub const MAX_SPAWN_ATTEMPTS: u32 = 256;

    /// Bonus for reaching a challenge target score
    pub const CHALLENGE_BONUS: u64 = 50;
}

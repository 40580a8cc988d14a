//! Game configuration and difficulty tiers
//!
//! Loaded from `game_config.json` next to the binary. Every section has serde
//! defaults, so a user file only needs the keys it wants to override.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, PersistenceError};

/// Default config file name
pub const CONFIG_FILE: &str = "game_config.json";

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "EASY" => Some(Difficulty::Easy),
            "MEDIUM" | "MED" => Some(Difficulty::Medium),
            "HARD" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Parse a tag, falling back to Medium for anything unknown
    pub fn from_tag(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown difficulty {:?}, using MEDIUM", s);
            Difficulty::Medium
        })
    }

    /// Next tier, wrapping (for a "cycle difficulty" menu key)
    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Per-difficulty parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DifficultyParams {
    pub initial_speed: f32,
    pub lives: u32,
    pub power_up_chance: f64,
    pub apple_score: u64,
}

impl DifficultyParams {
    pub fn defaults_for(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                initial_speed: 3.0,
                lives: 5,
                power_up_chance: 0.4,
                apple_score: 1,
            },
            Difficulty::Medium => Self {
                initial_speed: 5.0,
                lives: 3,
                power_up_chance: 0.3,
                apple_score: 2,
            },
            Difficulty::Hard => Self {
                initial_speed: 7.0,
                lives: 1,
                power_up_chance: 0.2,
                apple_score: 3,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
    pub block_size: i32,
    pub title: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            block_size: BLOCK_SIZE,
            title: "Snake Arcade".to_string(),
        }
    }
}

/// Session-wide gameplay values. `initial_speed`, `initial_lives` and
/// `power_up_spawn_chance` fill in any difficulty tier key a config file
/// leaves out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameplayConfig {
    pub initial_speed: f32,
    pub max_speed: f32,
    pub initial_lives: u32,
    pub speed_increment: f32,
    pub power_up_spawn_chance: f64,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            initial_lives: INITIAL_LIVES,
            speed_increment: SPEED_INCREMENT,
            power_up_spawn_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyLevels {
    #[serde(rename = "EASY")]
    pub easy: DifficultyParams,
    #[serde(rename = "MEDIUM")]
    pub medium: DifficultyParams,
    #[serde(rename = "HARD")]
    pub hard: DifficultyParams,
}

impl Default for DifficultyLevels {
    fn default() -> Self {
        Self {
            easy: DifficultyParams::defaults_for(Difficulty::Easy),
            medium: DifficultyParams::defaults_for(Difficulty::Medium),
            hard: DifficultyParams::defaults_for(Difficulty::Hard),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedBoostConfig {
    /// Milliseconds the pickup stays on the board
    pub duration: u64,
    pub speed_increase: f32,
}

impl Default for SpeedBoostConfig {
    fn default() -> Self {
        Self {
            duration: 5000,
            speed_increase: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvincibilityConfig {
    pub duration: u64,
}

impl Default for InvincibilityConfig {
    fn default() -> Self {
        Self { duration: 3000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraPointsConfig {
    pub points: u64,
}

impl Default for ExtraPointsConfig {
    fn default() -> Self {
        Self { points: 5 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub speed_boost: SpeedBoostConfig,
    pub invincibility: InvincibilityConfig,
    pub extra_points: ExtraPointsConfig,
}

/// Full game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub gameplay: GameplayConfig,
    pub difficulty_levels: DifficultyLevels,
    pub power_ups: PowerUpConfig,
}

/// Tier keys as written in a config file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TierFile {
    initial_speed: Option<f32>,
    lives: Option<u32>,
    power_up_chance: Option<f64>,
    apple_score: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LevelsFile {
    #[serde(rename = "EASY")]
    easy: TierFile,
    #[serde(rename = "MEDIUM")]
    medium: TierFile,
    #[serde(rename = "HARD")]
    hard: TierFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GameplayFile {
    initial_speed: Option<f32>,
    max_speed: Option<f32>,
    initial_lives: Option<u32>,
    speed_increment: Option<f32>,
    power_up_spawn_chance: Option<f64>,
}

/// On-disk shape: every key optional, resolved against the defaults on load
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    screen: ScreenConfig,
    gameplay: GameplayFile,
    difficulty_levels: LevelsFile,
    power_ups: PowerUpConfig,
}

impl TierFile {
    /// Tier key, else the gameplay-wide value, else the tier default
    fn resolve(&self, difficulty: Difficulty, gameplay: &GameplayFile) -> DifficultyParams {
        let defaults = DifficultyParams::defaults_for(difficulty);
        DifficultyParams {
            initial_speed: self
                .initial_speed
                .or(gameplay.initial_speed)
                .unwrap_or(defaults.initial_speed),
            lives: self
                .lives
                .or(gameplay.initial_lives)
                .unwrap_or(defaults.lives),
            power_up_chance: self
                .power_up_chance
                .or(gameplay.power_up_spawn_chance)
                .unwrap_or(defaults.power_up_chance),
            apple_score: self.apple_score.unwrap_or(defaults.apple_score),
        }
    }
}

impl From<ConfigFile> for GameConfig {
    fn from(file: ConfigFile) -> Self {
        let base = GameplayConfig::default();
        let g = &file.gameplay;
        let gameplay = GameplayConfig {
            initial_speed: g.initial_speed.unwrap_or(base.initial_speed),
            max_speed: g.max_speed.unwrap_or(base.max_speed),
            initial_lives: g.initial_lives.unwrap_or(base.initial_lives),
            speed_increment: g.speed_increment.unwrap_or(base.speed_increment),
            power_up_spawn_chance: g.power_up_spawn_chance.unwrap_or(base.power_up_spawn_chance),
        };
        let levels = &file.difficulty_levels;
        let difficulty_levels = DifficultyLevels {
            easy: levels.easy.resolve(Difficulty::Easy, g),
            medium: levels.medium.resolve(Difficulty::Medium, g),
            hard: levels.hard.resolve(Difficulty::Hard, g),
        };
        Self {
            screen: file.screen,
            gameplay,
            difficulty_levels,
            power_ups: file.power_ups,
        }
    }
}

/// Power-up numbers resolved for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUpTuning {
    pub speed_boost_duration_ms: u64,
    pub speed_increase: f32,
    pub invincibility_ms: u64,
    pub extra_points: u64,
}

/// Everything the simulation needs to know about balance, resolved once per session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub difficulty: Difficulty,
    pub initial_speed: f32,
    pub max_speed: f32,
    pub speed_increment: f32,
    pub lives: u32,
    pub power_up_chance: f64,
    pub apple_score: u64,
    pub power_ups: PowerUpTuning,
}

impl Default for Rules {
    fn default() -> Self {
        GameConfig::default().rules(Difficulty::Medium)
    }
}

impl GameConfig {
    /// Parameters for a difficulty tier
    pub fn difficulty(&self, difficulty: Difficulty) -> &DifficultyParams {
        match difficulty {
            Difficulty::Easy => &self.difficulty_levels.easy,
            Difficulty::Medium => &self.difficulty_levels.medium,
            Difficulty::Hard => &self.difficulty_levels.hard,
        }
    }

    /// Resolve the rule set for one session
    pub fn rules(&self, difficulty: Difficulty) -> Rules {
        let params = self.difficulty(difficulty);
        let max_speed = self.gameplay.max_speed.max(params.initial_speed);
        Rules {
            difficulty,
            initial_speed: params.initial_speed,
            max_speed,
            speed_increment: self.gameplay.speed_increment,
            lives: params.lives.max(1),
            power_up_chance: params.power_up_chance.clamp(0.0, 1.0),
            apple_score: params.apple_score,
            power_ups: PowerUpTuning {
                speed_boost_duration_ms: self.power_ups.speed_boost.duration,
                speed_increase: self.power_ups.speed_boost.speed_increase,
                invincibility_ms: self.power_ups.invincibility.duration,
                extra_points: self.power_ups.extra_points.points,
            },
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Option<Self>, PersistenceError> {
        persistence::read_json(path)
    }

    /// Load configuration, falling back to defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(config)) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Ok(None) => {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Error loading config: {}. Using default configuration.", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        persistence::write_json(path, self)?;
        log::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

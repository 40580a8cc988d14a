//! Achievement definitions and evaluation

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};

/// Length needed for Snake Charmer
pub const LONG_SNAKE_LENGTH: usize = 20;

/// Power-ups needed for Power-Up Collector
pub const POWER_UP_COLLECTOR_COUNT: u32 = 10;

/// Unique identifier for each achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AchievementId {
    SnakeCharmer,
    SpeedDemon,
    PowerUpCollector,
    SurvivalExpert,
}

impl AchievementId {
    /// All achievements in evaluation order.
    pub const ALL: [AchievementId; 4] = [
        AchievementId::SnakeCharmer,
        AchievementId::SpeedDemon,
        AchievementId::PowerUpCollector,
        AchievementId::SurvivalExpert,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AchievementId::SnakeCharmer => "Snake Charmer",
            AchievementId::SpeedDemon => "Speed Demon",
            AchievementId::PowerUpCollector => "Power-Up Collector",
            AchievementId::SurvivalExpert => "Survival Expert",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementId::SnakeCharmer => "Reach length 20",
            AchievementId::SpeedDemon => "Reach maximum speed",
            AchievementId::PowerUpCollector => "Collect 10 power-ups",
            AchievementId::SurvivalExpert => "Play without losing a life",
        }
    }

    /// Points added to the score on unlock
    pub fn reward(&self) -> u64 {
        match self {
            AchievementId::SnakeCharmer => 50,
            AchievementId::SpeedDemon => 30,
            AchievementId::PowerUpCollector => 40,
            AchievementId::SurvivalExpert => 25,
        }
    }

    /// Whether the unlock condition holds for the current session
    pub fn is_met(&self, state: &GameState) -> bool {
        match self {
            AchievementId::SnakeCharmer => state.snake.len() >= LONG_SNAKE_LENGTH,
            AchievementId::SpeedDemon => state.current_speed >= state.rules.max_speed,
            AchievementId::PowerUpCollector => {
                state.progress.power_ups_collected >= POWER_UP_COLLECTOR_COUNT
            }
            AchievementId::SurvivalExpert => state.lives == state.rules.lives,
        }
    }
}

/// Fold the current snake length and speed into the running maxima
pub fn record_progress(state: &mut GameState) {
    let progress = &mut state.progress;
    progress.longest_snake = progress.longest_snake.max(state.snake.len());
    progress.max_speed_reached = progress.max_speed_reached.max(state.current_speed);
}

/// Unlock every achievement whose condition now holds.
///
/// Already-unlocked achievements are skipped, so calling this again without
/// a state change unlocks nothing and awards nothing.
pub fn check(state: &mut GameState) -> Vec<AchievementId> {
    let newly: Vec<AchievementId> = AchievementId::ALL
        .into_iter()
        .filter(|id| !state.progress.is_unlocked(*id) && id.is_met(state))
        .collect();

    for &id in &newly {
        state.progress.unlocked.insert(id);
        state.score += id.reward();
        state.events.push(GameEvent::AchievementUnlocked(id));
        log::info!("Achievement unlocked: {} (+{})", id.name(), id.reward());
    }
    newly
}

/// Display row for the achievements screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub reward: u64,
    pub unlocked: bool,
}

/// Every achievement with its unlock state, in display order
pub fn statuses(state: &GameState) -> Vec<AchievementStatus> {
    AchievementId::ALL
        .into_iter()
        .map(|id| AchievementStatus {
            id,
            name: id.name(),
            description: id.description(),
            reward: id.reward(),
            unlocked: state.progress.is_unlocked(id),
        })
        .collect()
}

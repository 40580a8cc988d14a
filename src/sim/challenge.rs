//! Challenge mode: activation, difficulty scaling, missions and time limit

use rand::Rng;
use rand::seq::IndexedRandom;

use super::grid::Position;
use super::state::{
    ActiveChallenge, ChallengeSettings, GameEvent, GameState, Mission, MissionKind,
};
use crate::consts::CHALLENGE_BONUS;

const BASE_PROBABILITY: f64 = 0.2;
const MIN_PROBABILITY: f64 = 0.1;
const MAX_PROBABILITY: f64 = 0.75;

/// Player history consulted once per game start
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationFactors {
    /// Scores of the last few stored games (may be empty)
    pub recent_scores: Vec<u64>,
    pub sessions_without_challenge: u32,
    /// Local hour, 0-23
    pub hour_of_day: u32,
    pub achievements_unlocked: usize,
}

pub fn is_peak_hour(hour: u32) -> bool {
    (14..=16).contains(&hour) || (20..=23).contains(&hour)
}

/// Chance that the next game runs in challenge mode, in `[0.1, 0.75]`
pub fn activation_probability(factors: &ActivationFactors) -> f64 {
    let mut p = BASE_PROBABILITY;

    if !factors.recent_scores.is_empty() {
        let total: u64 = factors.recent_scores.iter().sum();
        let mean = total as f64 / factors.recent_scores.len() as f64;
        if mean > 50.0 {
            p += 0.1;
        }
    }

    p += (0.05 * f64::from(factors.sessions_without_challenge)).min(0.15);

    if is_peak_hour(factors.hour_of_day) {
        p += 0.05;
    }

    if factors.achievements_unlocked > 2 {
        p += 0.1;
    }

    p.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// Up to 1.5x harder depending on how far `speed` is above the initial speed
pub fn difficulty_multiplier(speed: f32, initial: f32, max: f32) -> f32 {
    if speed > initial && max > initial {
        1.0 + 0.5 * (speed - initial) / (max - initial)
    } else {
        1.0
    }
}

impl ChallengeSettings {
    /// Unscaled settings for a new round
    pub fn roll<R: Rng>(rng: &mut R) -> Self {
        Self {
            time_limit: rng.random_range(30..=120),
            target_score: rng.random_range(50..=200),
            obstacles: true,
            obstacle_count: 0,
            obstacle_speed: 1.0,
            moving_walls: rng.random_bool(0.5),
            special_apple: rng.random_bool(0.5),
        }
    }

    /// Apply a difficulty multiplier
    pub fn scaled(&self, multiplier: f32) -> Self {
        let mut out = self.clone();
        out.time_limit = (self.time_limit as f32 / multiplier) as u32;
        out.target_score = (self.target_score as f32 * multiplier) as u64;
        if self.obstacles {
            out.obstacle_count = (3.0 * multiplier) as usize;
            out.obstacle_speed = 1.0 + (multiplier - 1.0) * 0.5;
        }
        if multiplier > 1.5 {
            out.moving_walls = true;
            out.special_apple = true;
        }
        out
    }
}

impl Mission {
    /// Draw a mission, never of kind `exclude`
    pub fn random<R: Rng>(rng: &mut R, max_speed: f32, exclude: Option<MissionKind>) -> Self {
        let kinds: Vec<MissionKind> = MissionKind::ALL
            .into_iter()
            .filter(|k| Some(*k) != exclude)
            .collect();
        let kind = kinds.choose(rng).copied().unwrap_or(MissionKind::EatApples);
        Self::new(kind, max_speed)
    }

    pub fn new(kind: MissionKind, max_speed: f32) -> Self {
        let (goal, reward) = match kind {
            MissionKind::EatApples => (5, 10),
            MissionKind::ReachSpeed => (max_speed.ceil() as u32, 15),
            MissionKind::CollectPowerUps => (3, 20),
        };
        Self {
            kind,
            goal,
            progress: 0,
            reward,
        }
    }
}

/// Place `count` obstacles on free cells. Stops early on a full board.
pub fn generate_obstacles(state: &mut GameState, count: usize) -> Vec<Position> {
    let mut placed: Vec<Position> = Vec::with_capacity(count);
    for _ in 0..count {
        let GameState {
            grid,
            rng,
            snake,
            food,
            ..
        } = &mut *state;
        let cell = grid.find_free_cell(rng, |c| {
            snake.contains(c) || food.position() == c || placed.contains(&c)
        });
        match cell {
            Some(cell) => placed.push(cell),
            None => break,
        }
    }
    placed
}

/// Decide whether this game runs a challenge and set it up if so.
///
/// `speed` is the speed carried into the new game, used for the difficulty
/// multiplier. Returns true when a challenge started.
pub fn begin_round(
    state: &mut GameState,
    factors: &ActivationFactors,
    speed: f32,
    now_ms: u64,
) -> bool {
    state.challenge.active = None;
    state.obstacles.clear();

    let probability = activation_probability(factors);
    let multiplier = difficulty_multiplier(speed, state.rules.initial_speed, state.rules.max_speed);

    if !state.rng.random_bool(probability) {
        state.challenge.sessions_without_challenge += 1;
        log::info!(
            "Not starting challenge mode (p={:.2}). Games since last challenge: {}",
            probability,
            state.challenge.sessions_without_challenge
        );
        return false;
    }

    state.challenge.sessions_without_challenge = 0;
    let settings = ChallengeSettings::roll(&mut state.rng).scaled(multiplier);
    log::info!(
        "Starting challenge mode with difficulty multiplier {:.2}: {}s, target {}",
        multiplier,
        settings.time_limit,
        settings.target_score
    );

    if settings.obstacles {
        state.obstacles = generate_obstacles(state, settings.obstacle_count);
    }
    if settings.special_apple {
        state.regenerate_food();
    }

    let max_speed = state.rules.max_speed;
    let mission = Mission::random(&mut state.rng, max_speed, None);
    log::info!("Mission: {}", mission.kind.description());

    state.challenge.active = Some(ActiveChallenge {
        settings,
        multiplier,
        started_at_ms: now_ms,
        mission: Some(mission),
    });
    state.events.push(GameEvent::ChallengeStarted);
    true
}

/// Result of the per-tick challenge check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeStatus {
    Inactive,
    Running,
    TargetReached,
    TimedOut,
}

/// Per-tick time limit and target check. The time limit wins if both hold.
pub fn update(state: &mut GameState, now_ms: u64) -> ChallengeStatus {
    let Some(active) = &state.challenge.active else {
        return ChallengeStatus::Inactive;
    };

    let limit_ms = u64::from(active.settings.time_limit) * 1000;
    if active.elapsed_ms(now_ms) > limit_ms {
        log::info!("Challenge time limit exceeded");
        state.events.push(GameEvent::ChallengeTimedOut);
        return ChallengeStatus::TimedOut;
    }

    if state.score >= active.settings.target_score {
        state.score += CHALLENGE_BONUS;
        state.challenge.active = None;
        state.obstacles.clear();
        state.events.push(GameEvent::ChallengeCompleted);
        log::info!("Challenge target reached (+{})", CHALLENGE_BONUS);
        return ChallengeStatus::TargetReached;
    }

    ChallengeStatus::Running
}

/// Grant the reward of a finished mission and draw the next one
fn complete_mission(state: &mut GameState) {
    let max_speed = state.rules.max_speed;
    let Some(active) = state.challenge.active.as_mut() else {
        return;
    };
    let Some(done) = active.mission.take() else {
        return;
    };

    state.score += done.reward;
    state.events.push(GameEvent::MissionCompleted(done.kind));
    log::info!("Mission completed: {} (+{})", done.kind.description(), done.reward);

    active.mission = Some(Mission::random(&mut state.rng, max_speed, Some(done.kind)));
}

fn advance_mission(state: &mut GameState, kind: MissionKind, amount: u32) {
    let Some(mission) = state
        .challenge
        .active
        .as_mut()
        .and_then(|c| c.mission.as_mut())
    else {
        return;
    };
    if mission.kind != kind {
        return;
    }
    mission.progress += amount;
    if mission.is_complete() {
        complete_mission(state);
    }
}

pub fn on_apple_eaten(state: &mut GameState) {
    advance_mission(state, MissionKind::EatApples, 1);
}

pub fn on_power_up_collected(state: &mut GameState) {
    advance_mission(state, MissionKind::CollectPowerUps, 1);
}

/// A wall hit that cost a life breaks the "without hitting walls" streak
pub fn on_wall_hit(state: &mut GameState) {
    if let Some(mission) = state
        .challenge
        .active
        .as_mut()
        .and_then(|c| c.mission.as_mut())
    {
        if mission.kind == MissionKind::EatApples && mission.progress > 0 {
            log::debug!("Wall hit, apple mission progress reset");
            mission.progress = 0;
        }
    }
}

/// Complete a speed mission once the current speed reaches its goal
pub fn check_speed_mission(state: &mut GameState) {
    let speed = state.current_speed;
    let Some(mission) = state
        .challenge
        .active
        .as_mut()
        .and_then(|c| c.mission.as_mut())
    else {
        return;
    };
    if mission.kind == MissionKind::ReachSpeed && speed >= mission.goal as f32 {
        mission.progress = mission.goal;
        complete_mission(state);
    }
}

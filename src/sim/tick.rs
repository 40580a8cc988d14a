//! Per-tick simulation step
//!
//! Advances the session by one move in a fixed order: movement and
//! collisions, power-ups, achievements, challenge checks, then mobile food.

use super::achievements;
use super::autopilot;
use super::challenge::{self, ActivationFactors, ChallengeStatus};
use super::grid::Direction;
use super::movement::{self, Collision};
use super::powerup;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Requested heading (reversals are dropped)
    pub turn: Option<Direction>,
    /// Pause (Playing only)
    pub pause: bool,
    /// Resume (Paused only)
    pub resume: bool,
    /// Idle/demo mode - the autopilot steers
    pub idle_mode: bool,
}

/// What the caller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing advanced (not playing, or paused)
    Frozen,
    /// A normal step; draw the new frame
    Render,
    /// A life was lost and the snake respawned; nothing to draw this tick
    LifeLost,
    /// The round just ended
    GameOver,
}

/// Put the session back to the beginning of a round.
/// Challenge counters and achievement progress carry over.
pub fn reset_round(state: &mut GameState) {
    state.respawn_snake();
    state.score = 0;
    state.lives = state.rules.lives;
    state.current_speed = state.rules.initial_speed;
    state.power_ups.clear();
    state.obstacles.clear();
    state.invincible_since = None;
    state.power_up_spawn_timer = 0;
    state.time_ticks = 0;
    state.challenge.active = None;
    state.regenerate_food();
}

/// Start (or restart) a game: reset the round, roll for challenge mode,
/// and begin playing
pub fn start_game(state: &mut GameState, factors: &ActivationFactors, now_ms: u64) {
    state.high_score = state.high_score.max(state.score);
    let carried_speed = state.current_speed;

    reset_round(state);
    challenge::begin_round(state, factors, carried_speed, now_ms);

    state.phase = GamePhase::Playing;
    log::info!(
        "Game started on {} ({} lives)",
        state.rules.difficulty.as_str(),
        state.lives
    );
}

/// End the round
pub fn enter_game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.high_score = state.high_score.max(state.score);
    state.events.push(GameEvent::GameOver);
    log::info!("Game over. Final score: {}", state.score);
}

/// Take a life after a collision. Returns false if that was the last one.
pub fn handle_collision(state: &mut GameState) -> bool {
    state.lives = state.lives.saturating_sub(1);
    state.current_speed = state.rules.initial_speed;

    if state.lives == 0 {
        enter_game_over(state);
        return false;
    }

    state.respawn_snake();
    state.regenerate_food();
    state.power_ups.clear();
    state.power_up_spawn_timer = 0;
    state.events.push(GameEvent::LifeLost {
        lives_left: state.lives,
    });
    log::info!("Life lost, {} remaining", state.lives);
    true
}

fn eat_food(state: &mut GameState, now_ms: u64) {
    let points = state.rules.apple_score;
    state.score += points;
    state.current_speed =
        (state.current_speed + state.rules.speed_increment).min(state.rules.max_speed);
    state.progress.apples_eaten += 1;
    state.events.push(GameEvent::AteFood { points });

    state.regenerate_food();
    challenge::on_apple_eaten(state);
    challenge::check_speed_mission(state);
    powerup::roll_after_food(state, now_ms);
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) -> TickOutcome {
    match state.phase {
        GamePhase::Playing if input.pause => {
            state.phase = GamePhase::Paused;
            return TickOutcome::Frozen;
        }
        GamePhase::Paused if input.resume => {
            state.phase = GamePhase::Playing;
        }
        _ => {}
    }

    if state.phase != GamePhase::Playing {
        return TickOutcome::Frozen;
    }

    if let Some(dir) = input.turn {
        state.steer(dir);
    }
    if input.idle_mode {
        if let Some(dir) = autopilot::suggest_direction(state) {
            state.steer(dir);
        }
    }

    state.time_ticks += 1;
    powerup::update_invincibility(state, now_ms);

    // Movement & collision
    state.direction = state.queued_direction;
    let ate = movement::advance(
        &mut state.snake,
        state.direction,
        &state.food,
        state.grid.block,
    );

    let collision = movement::check_collision(&state.snake, &state.grid, &state.obstacles);
    if collision.is_hit() {
        let ignored = state.is_invincible();
        state.events.push(GameEvent::Collision {
            kind: collision,
            ignored,
        });
        if !ignored {
            log::warn!("Collision detected: {:?}", collision);
            if collision == Collision::Wall {
                challenge::on_wall_hit(state);
            }
            return if handle_collision(state) {
                TickOutcome::LifeLost
            } else {
                TickOutcome::GameOver
            };
        }
    }

    if ate {
        eat_food(state, now_ms);
    }

    // Power-ups
    for _ in powerup::collect(state, now_ms) {
        challenge::on_power_up_collected(state);
    }
    challenge::check_speed_mission(state);
    powerup::expire(state, now_ms);
    powerup::tick_spawn_timer(state, now_ms);

    // Achievements
    achievements::record_progress(state);
    achievements::check(state);

    // Challenge mode
    if challenge::update(state, now_ms) == ChallengeStatus::TimedOut {
        enter_game_over(state);
        return TickOutcome::GameOver;
    }

    let GameState { food, grid, rng, .. } = &mut *state;
    food.update(grid, rng);

    state.normalize_order();
    TickOutcome::Render
}

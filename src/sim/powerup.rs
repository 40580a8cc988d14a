//! Power-up lifecycle: spawn, collect, apply, expire

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{GameEvent, GameState, PowerUp, PowerUpKind};
use crate::consts::{POWER_UP_PERIODIC_CHANCE, POWER_UP_SPAWN_INTERVAL};

/// Place a random power-up on a free cell. Returns false if the board is full.
pub fn spawn(state: &mut GameState, now_ms: u64) -> bool {
    let GameState {
        grid,
        rng,
        snake,
        food,
        power_ups,
        obstacles,
        ..
    } = &mut *state;
    let cell = grid.find_free_cell(rng, |c| {
        snake.contains(c)
            || food.position() == c
            || obstacles.contains(&c)
            || power_ups.iter().any(|p| p.pos == c)
    });
    let Some(pos) = cell else {
        log::warn!("No room for a power-up");
        return false;
    };

    let Some(&kind) = PowerUpKind::ALL.choose(&mut state.rng) else {
        return false;
    };
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        pos,
        kind,
        created_at_ms: now_ms,
        duration_ms: kind.duration_ms(&state.rules.power_ups),
    });
    state.events.push(GameEvent::PowerUpSpawned(kind));
    log::debug!("Spawned {} at ({}, {})", kind.name(), pos.x, pos.y);
    true
}

/// Roll the difficulty's power-up chance after an apple is eaten
pub fn roll_after_food(state: &mut GameState, now_ms: u64) {
    let chance = state.rules.power_up_chance;
    if state.rng.random_bool(chance) {
        spawn(state, now_ms);
    }
}

/// Periodic spawn: every `POWER_UP_SPAWN_INTERVAL` ticks, a fixed chance
pub fn tick_spawn_timer(state: &mut GameState, now_ms: u64) {
    state.power_up_spawn_timer += 1;
    if state.power_up_spawn_timer >= POWER_UP_SPAWN_INTERVAL {
        state.power_up_spawn_timer = 0;
        if state.rng.random_bool(POWER_UP_PERIODIC_CHANCE) {
            spawn(state, now_ms);
        }
    }
}

/// Apply a power-up's effect to the session
pub fn apply_effect(state: &mut GameState, kind: PowerUpKind, now_ms: u64) {
    let tuning = state.rules.power_ups;
    match kind {
        PowerUpKind::SpeedBoost => {
            state.current_speed =
                (state.current_speed + tuning.speed_increase).min(state.rules.max_speed);
        }
        PowerUpKind::Invincibility => {
            // Re-arms the timer if already invincible
            state.invincible_since = Some(now_ms);
        }
        PowerUpKind::ExtraPoints => {
            state.score += tuning.extra_points;
        }
        PowerUpKind::LengthIncrease => {
            state.snake.grow_tail();
        }
    }
}

/// Collect every power-up under the head. Returns the kinds collected.
pub fn collect(state: &mut GameState, now_ms: u64) -> Vec<PowerUpKind> {
    let head = state.snake.head();
    let (taken, kept): (Vec<PowerUp>, Vec<PowerUp>) =
        state.power_ups.drain(..).partition(|p| p.pos == head);
    state.power_ups = kept;

    let mut kinds = Vec::with_capacity(taken.len());
    for power_up in taken {
        apply_effect(state, power_up.kind, now_ms);
        state.progress.power_ups_collected += 1;
        state.events.push(GameEvent::PowerUpCollected(power_up.kind));
        log::info!("Collected {}", power_up.kind.name());
        kinds.push(power_up.kind);
    }
    kinds
}

/// Drop timed power-ups past their lifetime
pub fn expire(state: &mut GameState, now_ms: u64) {
    state.power_ups.retain(|p| !p.is_expired(now_ms));
}

/// End invincibility once the session timer runs out
pub fn update_invincibility(state: &mut GameState, now_ms: u64) {
    if let Some(since) = state.invincible_since {
        if now_ms.saturating_sub(since) > state.rules.power_ups.invincibility_ms {
            state.invincible_since = None;
            log::debug!("Invincibility expired");
        }
    }
}

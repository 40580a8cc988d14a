//! Game state and core simulation types
//!
//! Everything a session mutates lives in `GameState`; the other sim modules
//! are free functions over it.

use std::collections::{BTreeSet, VecDeque};

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::AchievementId;
use super::grid::{Direction, Grid, Position};
use super::movement::Collision;
use crate::audio::SoundEvent;
use crate::config::{PowerUpTuning, Rules};
use crate::consts::*;

/// Top-level game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle, waiting for the start input
    Start,
    /// Simulation advancing
    Playing,
    /// Simulation frozen
    Paused,
    /// Round ended; accepts restart and navigation only
    GameOver,
}

/// The snake. Head is the last segment, tail the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    segments: VecDeque<Position>,
}

impl Snake {
    /// Default layout: `INITIAL_SNAKE_LENGTH` segments ending at `head`, extending left
    pub fn new(head: Position, block: i32) -> Self {
        let segments = (0..INITIAL_SNAKE_LENGTH as i32)
            .rev()
            .map(|i| head - IVec2::new(i * block, 0))
            .collect();
        Self { segments }
    }

    /// Build from segments ordered tail to head. None if empty.
    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Option<Self> {
        let segments: VecDeque<Position> = segments.into_iter().collect();
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    pub fn head(&self) -> Position {
        self.segments[self.segments.len() - 1]
    }

    pub fn tail(&self) -> Position {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Never true; a snake always has a head
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments from tail to head
    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.segments.iter().copied()
    }

    /// Every segment except the head
    pub fn body(&self) -> impl Iterator<Item = Position> + '_ {
        self.segments.iter().take(self.segments.len() - 1).copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.segments.contains(&pos)
    }

    pub(crate) fn push_head(&mut self, pos: Position) {
        self.segments.push_back(pos);
    }

    pub(crate) fn pop_tail(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop_front();
        }
    }

    /// Add one segment behind the tail, continuing the tail's line of travel
    pub fn grow_tail(&mut self) {
        let tail = self.tail();
        let step = match self.segments.get(1) {
            Some(&second) => tail - second,
            None => IVec2::ZERO,
        };
        self.segments.push_front(tail + step);
    }
}

/// Food that wanders around the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileFood {
    pub pos: Position,
    pub direction: Direction,
    /// Pixels per update
    pub speed: i32,
    pub move_counter: u32,
}

impl MobileFood {
    pub fn new<R: Rng>(pos: Position, rng: &mut R) -> Self {
        Self {
            pos,
            direction: Direction::random(rng),
            speed: MOBILE_FOOD_SPEED,
            move_counter: 0,
        }
    }

    /// One step of wandering, clamped so the food stays fully on the board
    pub fn update<R: Rng>(&mut self, grid: &Grid, rng: &mut R) {
        if self.move_counter % MOBILE_FOOD_TURN_INTERVAL == 0 {
            self.direction = Direction::random(rng);
        }

        let next = self.pos + self.direction.delta() * self.speed;
        self.pos = IVec2::new(
            next.x.clamp(0, grid.width - grid.block),
            next.y.clamp(0, grid.height - grid.block),
        );

        self.move_counter += 1;
    }
}

/// The apple currently on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Food {
    Static(Position),
    Mobile(MobileFood),
}

impl Food {
    pub fn position(&self) -> Position {
        match self {
            Food::Static(pos) => *pos,
            Food::Mobile(food) => food.pos,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Food::Mobile(_))
    }

    /// Static food needs an exact hit; mobile food only needs the head's
    /// block to overlap it
    pub fn is_eaten_by(&self, head: Position, block: i32) -> bool {
        match self {
            Food::Static(pos) => head == *pos,
            Food::Mobile(food) => {
                (head.x - food.pos.x).abs() < block && (head.y - food.pos.y).abs() < block
            }
        }
    }

    /// Advance mobile food; static food stays put
    pub fn update<R: Rng>(&mut self, grid: &Grid, rng: &mut R) {
        if let Food::Mobile(food) = self {
            food.update(grid, rng);
        }
    }

    /// Place a new apple on a free cell. Some apples come out mobile.
    pub fn spawn<R, F>(grid: &Grid, rng: &mut R, occupied: F) -> Option<Self>
    where
        R: Rng,
        F: Fn(Position) -> bool,
    {
        let pos = grid.find_free_cell(rng, occupied)?;
        if rng.random_bool(MOBILE_FOOD_CHANCE) {
            Some(Food::Mobile(MobileFood::new(pos, rng)))
        } else {
            Some(Food::Static(pos))
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SpeedBoost,
    Invincibility,
    ExtraPoints,
    LengthIncrease,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::Invincibility,
        PowerUpKind::ExtraPoints,
        PowerUpKind::LengthIncrease,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "speed_boost",
            PowerUpKind::Invincibility => "invincibility",
            PowerUpKind::ExtraPoints => "extra_points",
            PowerUpKind::LengthIncrease => "length_increase",
        }
    }

    /// Lifetime on the board in ms (0 = instantaneous, never expires)
    pub fn duration_ms(&self, tuning: &PowerUpTuning) -> u64 {
        match self {
            PowerUpKind::SpeedBoost => tuning.speed_boost_duration_ms,
            PowerUpKind::Invincibility => tuning.invincibility_ms,
            PowerUpKind::ExtraPoints | PowerUpKind::LengthIncrease => 0,
        }
    }
}

/// A power-up on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Position,
    pub kind: PowerUpKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl PowerUp {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.duration_ms > 0 && now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

/// Mission types (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    EatApples,
    ReachSpeed,
    CollectPowerUps,
}

impl MissionKind {
    pub const ALL: [MissionKind; 3] = [
        MissionKind::EatApples,
        MissionKind::ReachSpeed,
        MissionKind::CollectPowerUps,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            MissionKind::EatApples => "Eat 5 apples without hitting walls",
            MissionKind::ReachSpeed => "Reach max speed",
            MissionKind::CollectPowerUps => "Collect 3 power-ups",
        }
    }
}

/// The single active mission during a challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub kind: MissionKind,
    pub goal: u32,
    pub progress: u32,
    pub reward: u64,
}

impl Mission {
    pub fn is_complete(&self) -> bool {
        self.progress >= self.goal
    }
}

/// Parameters of one challenge round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSettings {
    /// Seconds allowed
    pub time_limit: u32,
    pub target_score: u64,
    pub obstacles: bool,
    pub obstacle_count: usize,
    pub obstacle_speed: f32,
    pub moving_walls: bool,
    pub special_apple: bool,
}

/// A running challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveChallenge {
    pub settings: ChallengeSettings,
    pub multiplier: f32,
    pub started_at_ms: u64,
    pub mission: Option<Mission>,
}

impl ActiveChallenge {
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    /// Whole seconds left before the time limit (0 once exceeded)
    pub fn seconds_left(&self, now_ms: u64) -> u32 {
        let limit_ms = u64::from(self.settings.time_limit) * 1000;
        (limit_ms.saturating_sub(self.elapsed_ms(now_ms)) / 1000) as u32
    }
}

/// Challenge bookkeeping that outlives a single round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeMode {
    /// Consecutive game starts that did not activate a challenge
    pub sessions_without_challenge: u32,
    pub active: Option<ActiveChallenge>,
}

impl ChallengeMode {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.active.as_ref().and_then(|c| c.mission.as_ref())
    }
}

/// Achievement unlocks plus the counters their conditions read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub unlocked: BTreeSet<AchievementId>,
    pub apples_eaten: u32,
    pub power_ups_collected: u32,
    pub longest_snake: usize,
    pub max_speed_reached: f32,
}

impl AchievementProgress {
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    AteFood { points: u64 },
    PowerUpSpawned(PowerUpKind),
    PowerUpCollected(PowerUpKind),
    /// A collision was detected. `ignored` is set while invincible.
    Collision { kind: Collision, ignored: bool },
    LifeLost { lives_left: u32 },
    GameOver,
    AchievementUnlocked(AchievementId),
    ChallengeStarted,
    ChallengeCompleted,
    ChallengeTimedOut,
    MissionCompleted(MissionKind),
}

impl GameEvent {
    /// Sound to play for this event, if any
    pub fn sound(&self) -> Option<SoundEvent> {
        match self {
            GameEvent::AteFood { .. } => Some(SoundEvent::Eat),
            GameEvent::PowerUpCollected(_) => Some(SoundEvent::PowerUp),
            GameEvent::GameOver => Some(SoundEvent::GameOver),
            GameEvent::AchievementUnlocked(_) => Some(SoundEvent::Achievement),
            _ => None,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Session RNG; every random decision draws from here
    pub rng: Pcg32,
    pub grid: Grid,
    pub rules: Rules,
    pub phase: GamePhase,
    pub snake: Snake,
    /// Direction of the last executed move
    pub direction: Direction,
    /// Direction the next move will take
    pub queued_direction: Direction,
    pub food: Food,
    /// Active power-ups (sorted by id)
    pub power_ups: Vec<PowerUp>,
    /// Challenge obstacles (empty outside challenge mode)
    pub obstacles: Vec<Position>,
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    /// Ticks per second
    pub current_speed: f32,
    /// When invincibility was last granted (None = not invincible)
    pub invincible_since: Option<u64>,
    /// Ticks since the last periodic power-up roll
    pub power_up_spawn_timer: u32,
    pub progress: AchievementProgress,
    pub challenge: ChallengeMode,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session in the Start phase
    pub fn new(grid: Grid, rules: Rules, seed: u64) -> Self {
        let center = grid.center();
        let snake = Snake::new(center, grid.block);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid,
            rules,
            phase: GamePhase::Start,
            snake,
            direction: Direction::Right,
            queued_direction: Direction::Right,
            food: Food::Static(center),
            power_ups: Vec::new(),
            obstacles: Vec::new(),
            score: 0,
            high_score: 0,
            lives: rules.lives,
            current_speed: rules.initial_speed,
            invincible_since: None,
            power_up_spawn_timer: 0,
            progress: AchievementProgress {
                max_speed_reached: rules.initial_speed,
                ..Default::default()
            },
            challenge: ChallengeMode::default(),
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        };
        state.regenerate_food();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_since.is_some()
    }

    /// Queue a turn. Reversing onto the last executed direction is ignored.
    pub fn steer(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.queued_direction = direction;
        }
    }

    /// Put the default snake back at the center, heading right
    pub fn respawn_snake(&mut self) {
        self.snake = Snake::new(self.grid.center(), self.grid.block);
        self.direction = Direction::Right;
        self.queued_direction = Direction::Right;
    }

    /// Replace the apple with a new one on a free cell.
    /// On a saturated board the current apple stays.
    pub fn regenerate_food(&mut self) {
        let Self {
            grid,
            rng,
            snake,
            power_ups,
            obstacles,
            ..
        } = &mut *self;
        let spawned = Food::spawn(grid, rng, |cell| {
            snake.contains(cell)
                || obstacles.contains(&cell)
                || power_ups.iter().any(|p| p.pos == cell)
        });
        match spawned {
            Some(food) => self.food = food,
            None => log::warn!("No room for a new apple"),
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.power_ups.sort_by_key(|p| p.id);
    }
}

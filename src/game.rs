//! Session driver
//!
//! Owns the simulation state and its collaborators (clock, sound, score
//! store). Input commands are buffered until the next frame, the way a
//! windowed front end would collect key events between ticks.

use crate::audio::SoundSink;
use crate::config::{Difficulty, GameConfig};
use crate::highscores::{HighScoreEntry, HighScores, ScoreStore};
use crate::platform::Clock;
use crate::sim::achievements::{self, AchievementStatus};
use crate::sim::challenge::ActivationFactors;
use crate::sim::grid::{Direction, Grid};
use crate::sim::snapshot::Snapshot;
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{self, TickInput, TickOutcome};

/// Stored games consulted for the challenge activation roll
const RECENT_SCORE_COUNT: usize = 3;

/// Default leaderboard name
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Player-facing inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start from the title screen, or restart after game over
    Start,
    Turn(Direction),
    Pause,
    Resume,
    ToggleMute,
    ShowHighScores,
    ShowAchievements,
    /// Switch difficulty tier (title and game-over screens only)
    CycleDifficulty,
    Quit,
}

/// What the presentation layer should show in reply to a command
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    None,
    HighScores(Vec<HighScoreEntry>),
    Achievements(Vec<AchievementStatus>),
    Quit,
}

pub struct Game {
    state: GameState,
    config: GameConfig,
    clock: Box<dyn Clock>,
    sound: Box<dyn SoundSink>,
    scores: Box<dyn ScoreStore>,
    /// Input collected since the last frame
    input: TickInput,
    /// Events from the most recent frame or command
    last_events: Vec<GameEvent>,
    player_name: String,
    /// Set once the current round's score is stored (or there is none)
    score_recorded: bool,
    /// Clock sample of the latest frame or start, shared with snapshots
    last_tick_ms: u64,
}

impl Game {
    pub fn new(
        config: GameConfig,
        difficulty: Difficulty,
        seed: u64,
        clock: Box<dyn Clock>,
        sound: Box<dyn SoundSink>,
        scores: Box<dyn ScoreStore>,
    ) -> Self {
        let grid = Grid::from_config(&config.screen);
        let rules = config.rules(difficulty);
        let mut state = GameState::new(grid, rules, seed);
        state.high_score = scores.high_scores().first().map_or(0, |e| e.score);
        let last_tick_ms = clock.now_ms();

        log::info!(
            "New session: {} board {}x{}, seed {}",
            difficulty.as_str(),
            grid.width,
            grid.height,
            seed
        );

        Self {
            state,
            config,
            clock,
            sound,
            scores,
            input: TickInput::default(),
            last_events: Vec::new(),
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            score_recorded: true,
            last_tick_ms,
        }
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.rules.difficulty
    }

    /// Target frame rate: one tick per move at the current speed
    pub fn tick_rate(&self) -> f32 {
        self.state.current_speed
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    pub fn is_muted(&self) -> bool {
        self.sound.is_muted()
    }

    /// Events from the most recent frame or command
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.last_tick_ms)
    }

    /// Apply a player command
    pub fn handle(&mut self, command: Command) -> Response {
        match command {
            Command::Start => {
                if matches!(self.state.phase, GamePhase::Start | GamePhase::GameOver) {
                    self.start();
                }
            }
            Command::Turn(dir) => self.input.turn = Some(dir),
            Command::Pause => self.input.pause = true,
            Command::Resume => self.input.resume = true,
            Command::ToggleMute => self.sound.toggle_mute(),
            Command::ShowHighScores => return Response::HighScores(self.scores.high_scores()),
            Command::ShowAchievements => {
                return Response::Achievements(achievements::statuses(&self.state));
            }
            Command::CycleDifficulty => self.cycle_difficulty(),
            Command::Quit => {
                log::info!("Quit requested");
                return Response::Quit;
            }
        }
        Response::None
    }

    /// Run one tick with the buffered input
    pub fn frame(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        self.last_tick_ms = now;
        let input = TickInput {
            idle_mode: self.input.idle_mode,
            ..std::mem::take(&mut self.input)
        };
        self.input.idle_mode = input.idle_mode;

        let outcome = tick::tick(&mut self.state, &input, now);
        self.dispatch_events();

        if outcome == TickOutcome::GameOver {
            self.record_score();
        }
        outcome
    }

    fn start(&mut self) {
        // Restart path: make sure the finished round is stored
        self.record_score();

        let factors = self.activation_factors();
        let now = self.clock.now_ms();
        self.last_tick_ms = now;
        tick::start_game(&mut self.state, &factors, now);
        self.score_recorded = false;
        self.dispatch_events();
    }

    fn activation_factors(&self) -> ActivationFactors {
        let history = HighScores {
            entries: self.scores.high_scores(),
        };
        ActivationFactors {
            recent_scores: history.recent_scores(RECENT_SCORE_COUNT),
            sessions_without_challenge: self.state.challenge.sessions_without_challenge,
            hour_of_day: self.clock.hour_of_day(),
            achievements_unlocked: self.state.progress.unlocked.len(),
        }
    }

    fn cycle_difficulty(&mut self) {
        if !matches!(self.state.phase, GamePhase::Start | GamePhase::GameOver) {
            return;
        }
        let next = self.state.rules.difficulty.next();
        let rules = self.config.rules(next);
        self.state.rules = rules;
        self.state.lives = rules.lives;
        self.state.current_speed = rules.initial_speed;
        log::info!("Difficulty set to {}", next.as_str());
    }

    fn record_score(&mut self) {
        if self.score_recorded {
            return;
        }
        let timestamp = self.clock.timestamp_ms();
        self.scores
            .save_score(&self.player_name, self.state.score, timestamp);
        self.score_recorded = true;
    }

    fn dispatch_events(&mut self) {
        self.last_events = self.state.drain_events();
        for event in &self.last_events {
            if let Some(sound) = event.sound() {
                self.sound.play(sound);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::{SoundBoard, SoundEvent};
    use crate::platform::ManualClock;
    use crate::sim::state::{ActiveChallenge, ChallengeSettings, Food};
    use glam::IVec2;

    struct Harness {
        game: Game,
        clock: ManualClock,
        sound: Rc<RefCell<SoundBoard>>,
        scores: Rc<RefCell<HighScores>>,
    }

    fn harness(difficulty: Difficulty) -> Harness {
        let clock = ManualClock::new(0);
        clock.set_hour(9);
        let sound = Rc::new(RefCell::new(SoundBoard::with_samples(SoundEvent::ALL)));
        let scores = Rc::new(RefCell::new(HighScores::new()));
        let game = Game::new(
            GameConfig::default(),
            difficulty,
            3,
            Box::new(clock.clone()),
            Box::new(sound.clone()),
            Box::new(scores.clone()),
        );
        Harness {
            game,
            clock,
            sound,
            scores,
        }
    }

    #[test]
    fn test_frames_do_nothing_before_start() {
        let mut h = harness(Difficulty::Medium);
        assert_eq!(h.game.frame(), TickOutcome::Frozen);
        assert_eq!(h.game.phase(), GamePhase::Start);
    }

    #[test]
    fn test_turn_applies_on_next_frame_only() {
        let mut h = harness(Difficulty::Medium);
        h.game.handle(Command::Start);
        h.game.state_mut().food = Food::Static(IVec2::new(0, 580));
        h.game.state_mut().obstacles.clear();

        h.game.handle(Command::Turn(Direction::Up));
        h.clock.advance(200);
        h.game.frame();
        assert_eq!(h.game.state().direction, Direction::Up);

        // Buffered input is consumed; the snake keeps going up
        h.clock.advance(200);
        h.game.frame();
        assert_eq!(h.game.state().snake.head(), IVec2::new(400, 260));
    }

    #[test]
    fn test_eating_plays_sound() {
        let mut h = harness(Difficulty::Medium);
        h.game.handle(Command::Start);
        h.game.state_mut().obstacles.clear();
        h.game.state_mut().food = Food::Static(IVec2::new(420, 300));
        h.game.frame();
        assert!(h.sound.borrow().history().contains(&SoundEvent::Eat));
    }

    #[test]
    fn test_mute_works_in_any_phase() {
        let mut h = harness(Difficulty::Medium);
        h.game.handle(Command::ToggleMute);
        assert!(h.game.is_muted());
        h.game.handle(Command::Start);
        h.game.handle(Command::ToggleMute);
        assert!(!h.game.is_muted());
    }

    #[test]
    fn test_game_over_persists_once() {
        let mut h = harness(Difficulty::Hard);
        h.game.handle(Command::Start);
        h.game.state_mut().score = 33;
        h.game.handle(Command::Turn(Direction::Up));
        h.game.state_mut().obstacles.clear();

        let mut outcome = TickOutcome::Render;
        for _ in 0..100 {
            h.clock.advance(100);
            outcome = h.game.frame();
            if outcome == TickOutcome::GameOver {
                break;
            }
        }
        assert_eq!(outcome, TickOutcome::GameOver);
        assert!(h.sound.borrow().history().contains(&SoundEvent::GameOver));

        let stored = h.scores.borrow().entries.clone();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].score >= 33);
        assert_eq!(stored[0].name, DEFAULT_PLAYER_NAME);

        // Restart must not store the same round again
        h.game.handle(Command::Start);
        assert_eq!(h.scores.borrow().entries.len(), 1);
        assert_eq!(h.game.phase(), GamePhase::Playing);
        assert_eq!(h.game.state().score, 0);
    }

    #[test]
    fn test_snapshot_uses_frame_clock_sample() {
        let mut h = harness(Difficulty::Medium);
        h.game.handle(Command::Start);
        let state = h.game.state_mut();
        state.obstacles.clear();
        state.food = Food::Static(IVec2::new(0, 580));
        state.challenge.active = Some(ActiveChallenge {
            settings: ChallengeSettings {
                time_limit: 45,
                target_score: 120,
                obstacles: false,
                obstacle_count: 0,
                obstacle_speed: 1.0,
                moving_walls: false,
                special_apple: false,
            },
            multiplier: 1.0,
            started_at_ms: 0,
            mission: None,
        });

        h.clock.advance(1_000);
        assert_eq!(h.game.frame(), TickOutcome::Render);

        // Clock moves on between frames; the countdown stays on the frame's sample
        h.clock.advance(20_000);
        let challenge = h.game.snapshot().challenge.unwrap();
        assert_eq!(challenge.seconds_left, 44);
    }

    #[test]
    fn test_cycle_difficulty_only_between_games() {
        let mut h = harness(Difficulty::Medium);
        h.game.handle(Command::CycleDifficulty);
        assert_eq!(h.game.difficulty(), Difficulty::Hard);
        assert_eq!(h.game.state().lives, 1);

        h.game.handle(Command::Start);
        h.game.handle(Command::CycleDifficulty);
        assert_eq!(h.game.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_navigation_responses() {
        let mut h = harness(Difficulty::Medium);
        h.scores.borrow_mut().add_score("Ada", 12, 0);
        match h.game.handle(Command::ShowHighScores) {
            Response::HighScores(entries) => assert_eq!(entries[0].name, "Ada"),
            other => panic!("unexpected {:?}", other),
        }
        match h.game.handle(Command::ShowAchievements) {
            Response::Achievements(rows) => assert_eq!(rows.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(h.game.handle(Command::Quit), Response::Quit);
    }
}

//! Snake Arcade entry point
//!
//! Headless runner: loads the config, plays one autopilot round paced by the
//! snake's speed, and stores the final score.
//!
//! Usage: `snake-arcade [SEED] [--fast] [--difficulty=EASY|MEDIUM|HARD] [--frames=N]`

use std::path::Path;

use snake_arcade::config::CONFIG_FILE;
use snake_arcade::highscores::{HIGHSCORE_FILE, JsonScoreStore};
use snake_arcade::sim::tick::TickOutcome;
use snake_arcade::{
    Command, Difficulty, FrameLimiter, Game, GameConfig, Response, SoundBoard, SystemClock,
};

/// Frame cap so a lucky autopilot run still ends
const DEFAULT_MAX_FRAMES: u64 = 5_000;

struct Args {
    seed: Option<u64>,
    fast: bool,
    difficulty: Difficulty,
    max_frames: u64,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: None,
        fast: false,
        difficulty: Difficulty::default(),
        max_frames: DEFAULT_MAX_FRAMES,
    };

    for arg in std::env::args().skip(1) {
        if arg == "--fast" {
            args.fast = true;
        } else if let Some(tag) = arg.strip_prefix("--difficulty=") {
            args.difficulty = Difficulty::from_tag(tag);
        } else if let Some(n) = arg.strip_prefix("--frames=") {
            match n.parse() {
                Ok(n) => args.max_frames = n,
                Err(_) => log::warn!("Ignoring bad frame count {:?}", n),
            }
        } else {
            match arg.parse() {
                Ok(seed) => args.seed = Some(seed),
                Err(_) => log::warn!("Ignoring unknown argument {:?}", arg),
            }
        }
    }
    args
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);

    let config = GameConfig::load_or_default(Path::new(CONFIG_FILE));
    log::info!("{} starting...", config.screen.title);
    let mut game = Game::new(
        config,
        args.difficulty,
        seed,
        Box::new(SystemClock::new()),
        Box::new(SoundBoard::new()),
        Box::new(JsonScoreStore::new(HIGHSCORE_FILE)),
    );

    game.set_idle_mode(true);
    game.handle(Command::Start);

    let mut limiter = FrameLimiter::new();
    let mut frames = 0;
    loop {
        if !args.fast {
            limiter.wait(game.tick_rate());
        }

        let outcome = game.frame();
        for event in game.last_events() {
            log::debug!("{:?}", event);
        }
        frames += 1;

        match outcome {
            TickOutcome::GameOver => break,
            _ if frames >= args.max_frames => {
                log::info!("Frame limit reached, ending round");
                game.handle(Command::Quit);
                break;
            }
            _ => {}
        }
    }

    let snapshot = game.snapshot();
    log::info!(
        "Round over after {} frames: score {}, length {}, lives {}",
        frames,
        snapshot.score,
        snapshot.segments.len(),
        snapshot.lives
    );

    if let Response::Achievements(rows) = game.handle(Command::ShowAchievements) {
        for row in rows.iter().filter(|r| r.unlocked) {
            log::info!("Unlocked: {} - {}", row.name, row.description);
        }
    }
    if let Response::HighScores(entries) = game.handle(Command::ShowHighScores) {
        for (rank, entry) in entries.iter().enumerate() {
            log::info!("{:>2}. {:<12} {}", rank + 1, entry.name, entry.score);
        }
    }
}

//! Render-ready view of a session
//!
//! Everything a presentation layer needs to draw one frame, detached from
//! the mutable state.

use serde::Serialize;

use super::grid::Position;
use super::state::{GamePhase, GameState, MissionKind, PowerUpKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodView {
    pub pos: Position,
    pub mobile: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub pos: Position,
    pub kind: PowerUpKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionView {
    pub kind: MissionKind,
    pub description: &'static str,
    pub progress: u32,
    pub goal: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeView {
    pub seconds_left: u32,
    pub target_score: u64,
    pub mission: Option<MissionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    /// Tail to head
    pub segments: Vec<Position>,
    pub food: FoodView,
    pub power_ups: Vec<PowerUpView>,
    pub obstacles: Vec<Position>,
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    pub speed: f32,
    pub invincible: bool,
    pub challenge: Option<ChallengeView>,
}

impl Snapshot {
    pub fn capture(state: &GameState, now_ms: u64) -> Self {
        let challenge = state.challenge.active.as_ref().map(|c| ChallengeView {
            seconds_left: c.seconds_left(now_ms),
            target_score: c.settings.target_score,
            mission: c.mission.as_ref().map(|m| MissionView {
                kind: m.kind,
                description: m.kind.description(),
                progress: m.progress,
                goal: m.goal,
            }),
        });

        Self {
            phase: state.phase,
            segments: state.snake.segments().collect(),
            food: FoodView {
                pos: state.food.position(),
                mobile: state.food.is_mobile(),
            },
            power_ups: state
                .power_ups
                .iter()
                .map(|p| PowerUpView {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
            obstacles: state.obstacles.clone(),
            score: state.score,
            high_score: state.high_score.max(state.score),
            lives: state.lives,
            speed: state.current_speed,
            invincible: state.is_invincible(),
            challenge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::sim::grid::Grid;
    use crate::sim::state::{ActiveChallenge, ChallengeSettings, Mission};

    #[test]
    fn test_capture_basic_fields() {
        let mut state = GameState::new(Grid::default(), Rules::default(), 8);
        state.score = 12;
        state.high_score = 7;
        let snap = Snapshot::capture(&state, 0);
        assert_eq!(snap.segments.len(), 3);
        assert_eq!(snap.segments[2], state.snake.head());
        assert_eq!(snap.high_score, 12);
        assert_eq!(snap.lives, 3);
        assert!(snap.challenge.is_none());
    }

    #[test]
    fn test_challenge_countdown() {
        let mut state = GameState::new(Grid::default(), Rules::default(), 8);
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
            started_at_ms: 10_000,
            mission: Some(Mission::new(MissionKind::CollectPowerUps, 15.0)),
        });

        let view = Snapshot::capture(&state, 25_500).challenge.unwrap();
        assert_eq!(view.seconds_left, 29);
        assert_eq!(view.target_score, 120);
        assert_eq!(view.mission.unwrap().goal, 3);

        let json = serde_json::to_string(&Snapshot::capture(&state, 0)).unwrap();
        assert!(json.contains("\"target_score\":120"));
    }
}

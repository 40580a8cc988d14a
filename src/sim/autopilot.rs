//! Idle/demo mode steering
//!
//! Greedy: head for the nearest pickup among the apple and power-ups, never
//! taking a move that collides on the very next tick.

use super::grid::{Direction, Position};
use super::state::GameState;

fn manhattan(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// True if the head could occupy `cell` next tick without a collision.
/// The tail is treated as free since it moves away on a non-eating tick.
fn is_safe(state: &GameState, cell: Position) -> bool {
    if !state.grid.contains(cell) || state.obstacles.contains(&cell) {
        return false;
    }
    !state.snake.segments().skip(1).any(|seg| seg == cell)
}

/// Count of safe cells reachable in one step from `cell`
fn exits(state: &GameState, cell: Position) -> usize {
    Direction::ALL
        .iter()
        .filter(|d| is_safe(state, cell + d.delta() * state.grid.block))
        .count()
}

/// Pick the next direction for the demo player, or None to keep going
pub fn suggest_direction(state: &GameState) -> Option<Direction> {
    let head = state.snake.head();
    let block = state.grid.block;

    let food = state.food.position();
    let target = state
        .power_ups
        .iter()
        .map(|p| p.pos)
        .filter(|&pos| manhattan(head, pos) < manhattan(head, food))
        .min_by_key(|&pos| manhattan(head, pos))
        .unwrap_or(food);

    // Current heading first so ties keep the snake going straight
    let current = state.direction;
    let candidates = [current]
        .into_iter()
        .chain(Direction::ALL.into_iter().filter(|d| *d != current))
        .filter(|d| *d != current.opposite());

    candidates
        .filter_map(|dir| {
            let next = head + dir.delta() * block;
            is_safe(state, next).then(|| (dir, manhattan(next, target), exits(state, next)))
        })
        // Prefer dead ends last, then distance
        .min_by_key(|&(_, dist, exits)| (exits == 0, dist))
        .map(|(dir, _, _)| dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::sim::grid::Grid;
    use crate::sim::state::{Food, Snake};
    use glam::IVec2;

    fn state() -> GameState {
        GameState::new(Grid::default(), Rules::default(), 2)
    }

    #[test]
    fn test_heads_toward_food() {
        let mut state = state();
        state.food = Food::Static(IVec2::new(400, 100));
        assert_eq!(suggest_direction(&state), Some(Direction::Up));

        state.food = Food::Static(IVec2::new(600, 300));
        assert_eq!(suggest_direction(&state), Some(Direction::Right));
    }

    #[test]
    fn test_never_reverses() {
        let mut state = state();
        // Food straight behind: must turn, not reverse
        state.food = Food::Static(IVec2::new(100, 300));
        let dir = suggest_direction(&state).unwrap();
        assert_ne!(dir, Direction::Left);
    }

    #[test]
    fn test_avoids_wall() {
        let mut state = state();
        state.snake = Snake::from_segments([
            IVec2::new(740, 0),
            IVec2::new(760, 0),
            IVec2::new(780, 0),
        ])
        .unwrap();
        state.food = Food::Static(IVec2::new(780, 580));
        assert_eq!(suggest_direction(&state), Some(Direction::Down));
    }

    #[test]
    fn test_boxed_in_returns_none() {
        let mut state = state();
        state.snake = Snake::from_segments([
            IVec2::new(740, 0),
            IVec2::new(760, 0),
            IVec2::new(780, 0),
        ])
        .unwrap();
        state.obstacles.push(IVec2::new(780, 20));
        assert_eq!(suggest_direction(&state), None);
    }
}

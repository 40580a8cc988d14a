//! Snake movement and collision detection

use serde::{Deserialize, Serialize};

use super::grid::{Direction, Grid, Position};
use super::state::{Food, Snake};

/// What the head ran into after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collision {
    None,
    Wall,
    SelfHit,
    Obstacle,
}

impl Collision {
    pub fn is_hit(&self) -> bool {
        !matches!(self, Collision::None)
    }
}

/// Move the snake one block. The new head is always appended; the tail is
/// dropped unless the new head eats the food. Returns true if food was eaten.
pub fn advance(snake: &mut Snake, direction: Direction, food: &Food, block: i32) -> bool {
    let new_head = snake.head() + direction.delta() * block;
    snake.push_head(new_head);

    let ate = food.is_eaten_by(new_head, block);
    if !ate {
        snake.pop_tail();
    }
    ate
}

/// Check the head against walls, then the body, then obstacles
pub fn check_collision(snake: &Snake, grid: &Grid, obstacles: &[Position]) -> Collision {
    let head = snake.head();

    if !grid.contains(head) {
        return Collision::Wall;
    }

    if snake.body().any(|seg| seg == head) {
        return Collision::SelfHit;
    }

    if !obstacles.is_empty() && obstacles.contains(&head) {
        return Collision::Obstacle;
    }

    Collision::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use proptest::prelude::*;

    fn snake_at(points: &[(i32, i32)]) -> Snake {
        Snake::from_segments(points.iter().map(|&(x, y)| IVec2::new(x, y))).unwrap()
    }

    #[test]
    fn test_advance_without_food_keeps_length() {
        let mut snake = Snake::new(IVec2::new(400, 300), 20);
        let food = Food::Static(IVec2::new(0, 0));
        assert!(!advance(&mut snake, Direction::Right, &food, 20));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), IVec2::new(420, 300));
        assert_eq!(snake.tail(), IVec2::new(380, 300));
    }

    #[test]
    fn test_advance_onto_food_grows() {
        let mut snake = Snake::new(IVec2::new(400, 300), 20);
        let food = Food::Static(IVec2::new(420, 300));
        assert!(advance(&mut snake, Direction::Right, &food, 20));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), IVec2::new(360, 300));
    }

    #[test]
    fn test_wall_at_right_edge() {
        let grid = Grid::default();
        let snake = snake_at(&[(760, 300), (780, 300), (800, 300)]);
        assert_eq!(check_collision(&snake, &grid, &[]), Collision::Wall);

        let snake = snake_at(&[(40, 0), (20, 0), (0, 0)]);
        assert_eq!(check_collision(&snake, &grid, &[]), Collision::None);
    }

    #[test]
    fn test_self_hit_on_loop() {
        let mut snake = snake_at(&[(100, 100), (120, 100), (140, 100), (160, 100), (180, 100)]);
        let food = Food::Static(IVec2::new(0, 0));
        let grid = Grid::default();
        advance(&mut snake, Direction::Down, &food, 20);
        advance(&mut snake, Direction::Left, &food, 20);
        assert_eq!(check_collision(&snake, &grid, &[]), Collision::None);

        advance(&mut snake, Direction::Up, &food, 20);
        assert_eq!(snake.head(), IVec2::new(160, 100));
        assert_eq!(check_collision(&snake, &grid, &[]), Collision::SelfHit);
    }

    #[test]
    fn test_obstacle_after_self() {
        let grid = Grid::default();
        let snake = snake_at(&[(100, 100), (120, 100), (140, 100)]);
        let obstacles = [IVec2::new(140, 100)];
        assert_eq!(check_collision(&snake, &grid, &obstacles), Collision::Obstacle);
        assert_eq!(check_collision(&snake, &grid, &[]), Collision::None);

        // Wall wins over an obstacle placed off-board
        let off = snake_at(&[(-20, 100)]);
        assert_eq!(
            check_collision(&off, &grid, &[IVec2::new(-20, 100)]),
            Collision::Wall
        );
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_length_changes_only_when_eating(
            dirs in prop::collection::vec(direction(), 1..40),
        ) {
            let mut snake = Snake::new(IVec2::new(400, 300), 20);
            // Food far off-board is never reached
            let food = Food::Static(IVec2::new(-1000, -1000));
            for dir in dirs {
                let before = snake.len();
                let ate = advance(&mut snake, dir, &food, 20);
                prop_assert!(!ate);
                prop_assert_eq!(snake.len(), before);
            }
        }

        #[test]
        fn prop_eating_adds_one(dir in direction()) {
            let mut snake = Snake::new(IVec2::new(400, 300), 20);
            let target = snake.head() + dir.delta() * 20;
            let ate = advance(&mut snake, dir, &Food::Static(target), 20);
            prop_assert!(ate);
            prop_assert_eq!(snake.len(), 4);
        }

        #[test]
        fn prop_turning_back_into_body_is_self_hit(len in 5usize..12) {
            // Straight snake heading right; Down, Left, Up lands on the body.
            // A length-4 snake would follow its own tail out of the way.
            let segments: Vec<IVec2> = (0..len as i32)
                .map(|i| IVec2::new(200 + i * 20, 300))
                .collect();
            let mut snake = Snake::from_segments(segments).unwrap();
            let food = Food::Static(IVec2::new(-1000, -1000));
            let grid = Grid::default();

            advance(&mut snake, Direction::Down, &food, 20);
            advance(&mut snake, Direction::Left, &food, 20);
            prop_assert_eq!(check_collision(&snake, &grid, &[]), Collision::None);
            advance(&mut snake, Direction::Up, &food, 20);
            prop_assert_eq!(check_collision(&snake, &grid, &[]), Collision::SelfHit);
        }
    }
}

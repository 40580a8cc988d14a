//! Board geometry: positions, directions and free-cell sampling
//!
//! Positions are pixel coordinates. Everything except mobile food sits on a
//! multiple of the block size.

use glam::IVec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::config::ScreenConfig;
use crate::consts::MAX_SPAWN_ATTEMPTS;

/// A point on the board (pixels)
pub type Position = IVec2;

/// Movement direction (screen coordinates: y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step for this direction
    pub fn delta(&self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Board bounds and cell size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    pub block: i32,
}

impl Default for Grid {
    fn default() -> Self {
        Self::from_config(&ScreenConfig::default())
    }
}

impl Grid {
    pub fn new(width: i32, height: i32, block: i32) -> Self {
        let block = block.max(1);
        Self {
            width: width.max(block),
            height: height.max(block),
            block,
        }
    }

    pub fn from_config(screen: &ScreenConfig) -> Self {
        Self::new(screen.width, screen.height, screen.block_size)
    }

    pub fn columns(&self) -> i32 {
        self.width / self.block
    }

    pub fn rows(&self) -> i32 {
        self.height / self.block
    }

    /// True if `pos` lies in `[0, width) × [0, height)`
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Block-aligned board center
    pub fn center(&self) -> Position {
        IVec2::new(
            (self.columns() / 2) * self.block,
            (self.rows() / 2) * self.block,
        )
    }

    /// Uniformly random block-aligned cell
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Position {
        IVec2::new(
            rng.random_range(0..self.columns()) * self.block,
            rng.random_range(0..self.rows()) * self.block,
        )
    }

    /// Every block-aligned cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows()).flat_map(move |row| {
            (0..self.columns()).map(move |col| IVec2::new(col * self.block, row * self.block))
        })
    }

    /// Pick a random cell for which `occupied` is false.
    ///
    /// Rejection-samples up to `MAX_SPAWN_ATTEMPTS` times, then falls back to
    /// scanning the whole board. Returns None only when every cell is taken.
    pub fn find_free_cell<R, F>(&self, rng: &mut R, occupied: F) -> Option<Position>
    where
        R: Rng,
        F: Fn(Position) -> bool,
    {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let cell = self.random_cell(rng);
            if !occupied(cell) {
                return Some(cell);
            }
        }

        let free: Vec<Position> = self.cells().filter(|&cell| !occupied(cell)).collect();
        if free.is_empty() {
            log::warn!("No free cell left on the board");
        } else {
            log::debug!("Spawn fell back to board scan ({} free cells)", free.len());
        }
        free.choose(rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.delta() + dir.opposite().delta(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_default_grid_center() {
        let grid = Grid::default();
        assert_eq!(grid.columns(), 40);
        assert_eq!(grid.rows(), 30);
        assert_eq!(grid.center(), IVec2::new(400, 300));
    }

    #[test]
    fn test_contains_edges() {
        let grid = Grid::new(100, 60, 20);
        assert!(grid.contains(IVec2::new(0, 0)));
        assert!(grid.contains(IVec2::new(80, 40)));
        assert!(!grid.contains(IVec2::new(100, 0)));
        assert!(!grid.contains(IVec2::new(0, 60)));
        assert!(!grid.contains(IVec2::new(-20, 0)));
    }

    #[test]
    fn test_random_cells_are_aligned() {
        let grid = Grid::new(100, 60, 20);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let cell = grid.random_cell(&mut rng);
            assert!(grid.contains(cell));
            assert_eq!(cell.x % 20, 0);
            assert_eq!(cell.y % 20, 0);
        }
    }

    #[test]
    fn test_free_cell_on_nearly_full_board() {
        // 5x3 board with one gap: sampling will usually miss, the scan must find it
        let grid = Grid::new(100, 60, 20);
        let gap = IVec2::new(60, 40);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(grid.find_free_cell(&mut rng, |cell| cell != gap), Some(gap));
    }

    #[test]
    fn test_free_cell_on_full_board() {
        let grid = Grid::new(40, 40, 20);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(grid.find_free_cell(&mut rng, |_| true), None);
    }
}

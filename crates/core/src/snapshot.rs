use crate::board::Board;
use crate::types::{ColorIndex, Phase};

/// Stable 64-bit FNV-1a over the board colors.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, and
/// the hash is used to compare seeded runs.
fn fnv1a64(bytes: impl Iterator<Item = u8>) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

/// Color layout of a board, row-major, `None` for empty cells
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardSnapshot {
    pub cols: usize,
    pub rows: usize,
    pub colors: Vec<Option<ColorIndex>>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        Self {
            cols: board.cols(),
            rows: board.rows(),
            colors: board.cells().iter().map(|c| c.color()).collect(),
        }
    }

    pub fn color(&self, x: usize, y: usize) -> Option<ColorIndex> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.colors[y * self.cols + x]
    }

    /// Colors of column `x`, bottom to top
    pub fn column(&self, x: usize) -> Vec<Option<ColorIndex>> {
        (0..self.rows).map(|y| self.color(x, y)).collect()
    }

    pub fn board_hash(&self) -> u64 {
        // Empty cells hash as 0xFF so they never collide with a palette slot.
        fnv1a64(self.colors.iter().map(|c| c.unwrap_or(u8::MAX)))
    }
}

/// Board plus score state, as an observer would render it
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    pub score: u32,
    pub moves_left: u32,
    pub multiplier: f32,
    pub game_over: bool,
    pub phase: Phase,
}

impl GameSnapshot {
    pub fn playable(&self) -> bool {
        !self.game_over && self.phase == Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pos;

    #[test]
    fn test_snapshot_mirrors_board() {
        let board = Board::from_columns(3, &[vec![0, 1], vec![2]]).unwrap();
        let snap = board.snapshot();

        assert_eq!(snap.color(0, 1), Some(1));
        assert_eq!(snap.color(1, 1), None);
        assert_eq!(snap.color(5, 0), None);
        assert_eq!(snap.column(0), vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_board_hash_tracks_changes() {
        let mut board = Board::from_columns(3, &[vec![0, 1], vec![2, 2]]).unwrap();
        let before = board.snapshot().board_hash();
        assert_eq!(before, board.snapshot().board_hash());

        board.set_color(Pos::new(0, 0), 2).unwrap();
        assert_ne!(before, board.snapshot().board_hash());
    }

    #[test]
    fn test_empty_cells_hash_differently_from_colors() {
        let mut board = Board::from_columns(2, &[vec![0, 0]]).unwrap();
        let full = board.snapshot().board_hash();
        board.clear(Pos::new(0, 1)).unwrap();
        assert_ne!(full, board.snapshot().board_hash());
    }
}

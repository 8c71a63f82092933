//! Connected same-color groups.
//!
//! Flood fill is breadth-first over [`Board::neighbors4`], so for a given
//! board and seed the returned cell order is always the same.

use std::collections::VecDeque;

use crate::board::Board;
use crate::types::{ColorIndex, Pos, MIN_GROUP_SIZE};

/// A maximal set of same-color cells connected by 4-adjacency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub color: ColorIndex,
    /// Cells in BFS order, seed first
    pub cells: Vec<Pos>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether tapping this group is a legal move
    pub fn is_blastable(&self) -> bool {
        self.cells.len() >= MIN_GROUP_SIZE
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Flood fill from `seed`.
///
/// Returns an empty list for an empty or out-of-range seed, and just the seed
/// when it has no same-color neighbor.
pub fn find_group(board: &Board, seed: Pos) -> Vec<Pos> {
    let mut visited = vec![false; board.cols() * board.rows()];
    flood(board, seed, &mut visited)
}

/// Flood fill from `seed`, as a [`Group`]
pub fn group_at(board: &Board, seed: Pos) -> Option<Group> {
    let color = board.color_at(seed)?;
    Some(Group {
        color,
        cells: find_group(board, seed),
    })
}

/// Every group on the board, seeded in column-major scan order
pub fn find_all_groups(board: &Board) -> Vec<Group> {
    let mut visited = vec![false; board.cols() * board.rows()];
    let mut groups = Vec::new();

    for pos in board.positions() {
        if visited[slot(board, pos)] {
            continue;
        }
        let Some(color) = board.color_at(pos) else {
            continue;
        };
        let cells = flood(board, pos, &mut visited);
        groups.push(Group { color, cells });
    }

    groups
}

/// Whether any group of at least two cells exists
pub fn has_legal_move(board: &Board) -> bool {
    find_all_groups(board).iter().any(Group::is_blastable)
}

#[inline]
fn slot(board: &Board, pos: Pos) -> usize {
    pos.y * board.cols() + pos.x
}

fn flood(board: &Board, seed: Pos, visited: &mut [bool]) -> Vec<Pos> {
    let Some(color) = board.color_at(seed) else {
        return Vec::new();
    };

    let mut result = Vec::new();
    let mut queue = VecDeque::new();
    visited[slot(board, seed)] = true;
    queue.push_back(seed);

    while let Some(current) = queue.pop_front() {
        result.push(current);
        for next in board.neighbors4(current) {
            let idx = slot(board, next);
            if !visited[idx] && board.color_at(next) == Some(color) {
                visited[idx] = true;
                queue.push_back(next);
            }
        }
    }

    result
}

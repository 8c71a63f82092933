//! Board mutations of the blast pipeline.
//!
//! Each function performs one phase atomically and returns the events it
//! produced, in emission order. Sequencing the phases and waiting for view
//! acknowledgements between them is the engine's job.

use crate::board::Board;
use crate::error::GameError;
use crate::groups::Group;
use crate::rng::GameRng;
use crate::types::{Cell, ColorIndex, Pos, ViewEvent};

/// Outcome of clearing a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlastResult {
    pub cleared: usize,
    pub events: Vec<ViewEvent>,
}

/// Outcome of applying gravity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseResult {
    /// Cells whose row changed
    pub moved: usize,
    pub events: Vec<ViewEvent>,
}

/// Outcome of refilling empty cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefillResult {
    pub spawned: usize,
    pub events: Vec<ViewEvent>,
}

/// Clear every cell of `group`.
///
/// Emits `BlastStarted` followed by one `CellCleared` per cell in group order.
/// Nothing is mutated when the group is too small or stale.
pub fn blast(board: &mut Board, group: &Group) -> Result<BlastResult, GameError> {
    if !group.is_blastable() {
        return Err(GameError::NotEnoughMatches { size: group.len() });
    }
    for &pos in &group.cells {
        match board.get(pos) {
            None => {
                return Err(GameError::OutOfBounds {
                    x: pos.x as i32,
                    y: pos.y as i32,
                })
            }
            Some(cell) if cell.color() != Some(group.color) => {
                return Err(GameError::InvariantViolation(format!(
                    "cell {} no longer matches the tapped group",
                    pos
                )))
            }
            Some(_) => {}
        }
    }

    let group_size = group.len();
    let mut events = Vec::with_capacity(group_size + 1);
    events.push(ViewEvent::BlastStarted {
        group_size,
        color: group.color,
    });
    for &pos in &group.cells {
        let view = board.clear(pos)?;
        events.push(ViewEvent::CellCleared {
            pos,
            color: group.color,
            group_size,
            view,
        });
    }

    Ok(BlastResult {
        cleared: group_size,
        events,
    })
}

/// Pack every column toward y = 0, keeping the relative order of its cells.
///
/// Columns are processed 0..cols; a `CellMoved` is emitted for every cell whose
/// row changed. View handles travel with their cells.
pub fn collapse(board: &mut Board) -> Result<CollapseResult, GameError> {
    let rows = board.rows();
    let mut events = Vec::new();

    for x in 0..board.cols() {
        let living: Vec<(usize, Cell)> = (0..rows)
            .filter_map(|y| {
                let pos = Pos::new(x, y);
                board
                    .get(pos)
                    .filter(|cell| !cell.is_empty())
                    .map(|cell| (y, *cell))
            })
            .collect();

        if living.len() > rows {
            return Err(GameError::InvariantViolation(format!(
                "column {} holds {} living cells but only {} rows",
                x,
                living.len(),
                rows
            )));
        }

        for y in 0..rows {
            let pos = Pos::new(x, y);
            match living.get(y) {
                Some(&(from_y, cell)) => {
                    board.set(pos, cell)?;
                    if from_y != y {
                        events.push(ViewEvent::CellMoved {
                            x,
                            from_y,
                            to_y: y,
                        });
                    }
                }
                None => board.set(pos, Cell::EMPTY)?,
            }
        }
    }

    board.check_packed()?;
    Ok(CollapseResult {
        moved: events.len(),
        events,
    })
}

/// Give every empty cell a uniformly random color, column-major.
pub fn refill(board: &mut Board, rng: &mut dyn GameRng) -> Result<RefillResult, GameError> {
    let palette = u32::from(board.palette_size());
    let empty: Vec<Pos> = board
        .positions()
        .filter(|&pos| board.color_at(pos).is_none())
        .collect();

    let mut events = Vec::with_capacity(empty.len());
    for pos in empty {
        let color = rng.next_int(palette) as ColorIndex;
        board.set(pos, Cell::filled(color))?;
        events.push(ViewEvent::CellSpawned { pos, color });
    }

    board.check_settled()?;
    Ok(RefillResult {
        spawned: events.len(),
        events,
    })
}

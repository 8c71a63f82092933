//! Deadlock detection and recovery.
//!
//! A settled board is deadlocked when no group of two or more cells exists.
//! Recovery reshuffles the colors already on the board (the multiset of colors
//! never changes) until a legal move appears. Shuffling is bounded; once the
//! cap is hit, a legal pair is forced directly so the pipeline always makes
//! progress.

use tracing::{debug, warn};

use crate::board::Board;
use crate::error::GameError;
use crate::groups::has_legal_move;
use crate::rng::{shuffle, GameRng};
use crate::types::{ColorIndex, Pos, ViewEvent};

/// Board has no legal move left
pub fn is_deadlocked(board: &Board) -> bool {
    !has_legal_move(board)
}

/// What [`resolve`] had to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A legal move already existed; the board is untouched
    NotDeadlocked,
    /// Shuffling produced a legal move
    Shuffled { attempts: u32, events: Vec<ViewEvent> },
    /// The shuffle cap was hit and a pair was forced
    Forced {
        attempts: u32,
        preserved_colors: bool,
        events: Vec<ViewEvent>,
    },
    /// Fewer than two occupied cells; no move can exist
    Unresolvable,
}

impl Resolution {
    /// Events to forward to the view, in order
    pub fn events(&self) -> &[ViewEvent] {
        match self {
            Resolution::Shuffled { events, .. } | Resolution::Forced { events, .. } => events,
            Resolution::NotDeadlocked | Resolution::Unresolvable => &[],
        }
    }

    pub fn into_events(self) -> Vec<ViewEvent> {
        match self {
            Resolution::Shuffled { events, .. } | Resolution::Forced { events, .. } => events,
            Resolution::NotDeadlocked | Resolution::Unresolvable => Vec::new(),
        }
    }

    /// Whether the board now has a legal move
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolvable)
    }
}

/// Shuffle the colors of all occupied cells once.
///
/// Colors are collected and reassigned in column-major order; view handles
/// stay where they are. Returns a single `CellsReshuffled` event.
pub fn shuffle_once(board: &mut Board, rng: &mut dyn GameRng) -> Result<ViewEvent, GameError> {
    let occupied: Vec<Pos> = board
        .positions()
        .filter(|&pos| board.color_at(pos).is_some())
        .collect();
    let mut colors: Vec<ColorIndex> = occupied
        .iter()
        .filter_map(|&pos| board.color_at(pos))
        .collect();

    shuffle(rng, &mut colors);

    let mut cells = Vec::with_capacity(occupied.len());
    for (pos, color) in occupied.into_iter().zip(colors) {
        board.set_color(pos, color)?;
        cells.push((pos, color));
    }
    Ok(ViewEvent::CellsReshuffled { cells })
}

/// Shuffle until a legal move exists, at most `max_attempts` times, then force one.
pub fn resolve(
    board: &mut Board,
    rng: &mut dyn GameRng,
    max_attempts: u32,
) -> Result<Resolution, GameError> {
    if !is_deadlocked(board) {
        return Ok(Resolution::NotDeadlocked);
    }
    let occupied = board.positions().filter(|&p| board.color_at(p).is_some()).count();
    if occupied < 2 {
        return Ok(Resolution::Unresolvable);
    }

    let mut events = Vec::new();
    for attempt in 1..=max_attempts {
        events.push(shuffle_once(board, rng)?);
        if !is_deadlocked(board) {
            debug!(attempts = attempt, "deadlock resolved by shuffle");
            return Ok(Resolution::Shuffled {
                attempts: attempt,
                events,
            });
        }
    }

    warn!(max_attempts, "shuffle cap reached; forcing a legal pair");
    let (preserved_colors, event) = force_pair(board)?;
    events.push(event);
    Ok(Resolution::Forced {
        attempts: max_attempts,
        preserved_colors,
        events,
    })
}

/// Make two adjacent occupied cells share a color.
///
/// Prefers moving an existing duplicate color next to its twin (a swap keeps
/// the color multiset); falls back to recoloring a neighbor.
fn force_pair(board: &mut Board) -> Result<(bool, ViewEvent), GameError> {
    let occupied: Vec<(Pos, ColorIndex)> = board
        .positions()
        .filter_map(|pos| board.color_at(pos).map(|c| (pos, c)))
        .collect();

    for &(anchor, color) in &occupied {
        let Some(twin) = occupied
            .iter()
            .find(|&&(pos, c)| c == color && pos != anchor)
            .map(|&(pos, _)| pos)
        else {
            continue;
        };
        let Some(neighbor) = board
            .neighbors4(anchor)
            .into_iter()
            .find(|&n| board.color_at(n).is_some())
        else {
            continue;
        };
        let neighbor_color = board.color_at(neighbor).unwrap_or(color);
        board.set_color(twin, neighbor_color)?;
        board.set_color(neighbor, color)?;
        let cells = if twin == neighbor {
            vec![(neighbor, color)]
        } else {
            vec![(twin, neighbor_color), (neighbor, color)]
        };
        return Ok((true, ViewEvent::CellsReshuffled { cells }));
    }

    for &(anchor, color) in &occupied {
        if let Some(neighbor) = board
            .neighbors4(anchor)
            .into_iter()
            .find(|&n| board.color_at(n).is_some())
        {
            board.set_color(neighbor, color)?;
            return Ok((
                false,
                ViewEvent::CellsReshuffled {
                    cells: vec![(neighbor, color)],
                },
            ));
        }
    }

    Err(GameError::InvariantViolation(
        "no two occupied cells are adjacent".to_string(),
    ))
}

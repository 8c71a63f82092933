//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, async orchestration, view collaborators).
//!
//! # Coordinates
//!
//! Cells are addressed by `(x, y)`:
//!
//! - **x**: column, `0..cols`, left to right
//! - **y**: row, `0..rows`, **bottom to top** (y = 0 is the bottom row)
//!
//! Gravity moves cells toward smaller `y`.
//!
//! # Rule Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_GROUP_SIZE` | 2 | Smallest group a tap may blast |
//! | `POINTS_PER_BLOCK` | 10 | Base points per blasted cell |
//! | `MULTIPLIER_TENTHS` | 1.0 .. 5.0 | Combo tier table, in tenths |
//! | `DEFAULT_COMBO_TIMEOUT_SECS` | 2.0 | Window for chaining a combo |
//! | `TIER_A_MIN_EXCLUSIVE` | 4 | Groups larger than this use tier A |
//! | `TIER_B_MIN` | 8 | Groups at least this large use tier B |
//! | `TIER_C_MIN` | 10 | Groups at least this large use tier C |
//!
//! # Examples
//!
//! ```
//! use blast_grid_types::{Cell, Pos, Tier};
//!
//! let cell = Cell::filled(3);
//! assert_eq!(cell.color(), Some(3));
//! assert_eq!(Cell::EMPTY.color_index(), -1);
//!
//! assert_eq!(Pos::new(2, 0).to_string(), "(2, 0)");
//! assert_eq!(Tier::from_group_size(9), Tier::B);
//! ```

use std::fmt;

/// Palette slot of a cell (0..K-1)
pub type ColorIndex = u8;

/// Smallest palette a level may use
pub const MIN_PALETTE_SIZE: u8 = 2;

/// Largest palette a level may use
pub const MAX_PALETTE_SIZE: u8 = 7;

/// Minimum group size for a legal tap
pub const MIN_GROUP_SIZE: usize = 2;

/// Base points awarded per blasted cell
pub const POINTS_PER_BLOCK: u32 = 10;

/// Combo multiplier tiers in tenths: 1.0, 1.1, 1.2, 1.5, 2.0, 3.0, 5.0
pub const MULTIPLIER_TENTHS: [u32; 7] = [10, 11, 12, 15, 20, 30, 50];

/// Default time window (seconds) in which a tap extends the combo
pub const DEFAULT_COMBO_TIMEOUT_SECS: f64 = 2.0;

/// Default score size-bonus breakpoints `(min_count, bonus_tenths)`, ascending.
///
/// Counts below the first breakpoint get a 1.0 bonus.
pub const DEFAULT_SIZE_BONUS: [(usize, u32); 3] = [(4, 15), (6, 20), (8, 30)];

/// Size-bonus breakpoints used by earlier level assets.
pub const LEGACY_SIZE_BONUS: [(usize, u32); 3] = [(5, 15), (8, 20), (10, 30)];

/// Groups strictly larger than this use [`Tier::A`]
pub const TIER_A_MIN_EXCLUSIVE: usize = 4;

/// Groups at least this large use [`Tier::B`]
pub const TIER_B_MIN: usize = 8;

/// Groups at least this large use [`Tier::C`]
pub const TIER_C_MIN: usize = 10;

/// Moves-left count at which the UI shows its low-moves warning
pub const LOW_MOVES_THRESHOLD: u32 = 5;

/// Key under which the high score is persisted
pub const HIGH_SCORE_KEY: &str = "HighScore";

/// Default board rows
pub const DEFAULT_ROWS: usize = 8;

/// Default board columns
pub const DEFAULT_COLS: usize = 8;

/// Default palette size
pub const DEFAULT_PALETTE_SIZE: u8 = 5;

/// Default move budget per game
pub const DEFAULT_MAX_MOVES: u32 = 30;

/// Default upper bound on waiting for a collaborator ack (2x the 300ms move tween)
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 600;

/// Default cap on deadlock shuffles before forcing a legal pair
pub const DEFAULT_MAX_SHUFFLE_ATTEMPTS: u32 = 100;

/// Default delay before a finished game restarts
pub const DEFAULT_RESTART_DELAY_MS: u64 = 3000;

/// Default interval between combo decay ticks
pub const DEFAULT_DECAY_TICK_MS: u64 = 50;

/// Board position. `y = 0` is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Opaque reference to the renderer's entity for a cell.
///
/// Owned by the view layer; the board only stores and hands it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// One board slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    color: Option<ColorIndex>,
    view: Option<ViewHandle>,
}

impl Cell {
    /// An empty slot with no view attached
    pub const EMPTY: Cell = Cell {
        color: None,
        view: None,
    };

    /// A colored cell without a view handle
    pub const fn filled(color: ColorIndex) -> Self {
        Self {
            color: Some(color),
            view: None,
        }
    }

    pub fn color(&self) -> Option<ColorIndex> {
        self.color
    }

    /// Palette slot, or -1 when empty
    pub fn color_index(&self) -> i32 {
        self.color.map_or(-1, i32::from)
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none()
    }

    pub fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    pub fn set_color(&mut self, color: ColorIndex) {
        self.color = Some(color);
    }

    pub fn attach_view(&mut self, handle: ViewHandle) {
        self.view = Some(handle);
    }

    /// Empty the cell and hand back its view handle
    pub fn take(&mut self) -> Option<ViewHandle> {
        self.color = None;
        self.view.take()
    }
}

/// Visual tier of a group, chosen from its size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tier {
    #[default]
    Default,
    A,
    B,
    C,
}

impl Tier {
    /// Map a group size to its tier
    ///
    /// ```
    /// use blast_grid_types::Tier;
    ///
    /// assert_eq!(Tier::from_group_size(4), Tier::Default);
    /// assert_eq!(Tier::from_group_size(5), Tier::A);
    /// assert_eq!(Tier::from_group_size(8), Tier::B);
    /// assert_eq!(Tier::from_group_size(10), Tier::C);
    /// ```
    pub const fn from_group_size(size: usize) -> Self {
        if size >= TIER_C_MIN {
            Tier::C
        } else if size >= TIER_B_MIN {
            Tier::B
        } else if size > TIER_A_MIN_EXCLUSIVE {
            Tier::A
        } else {
            Tier::Default
        }
    }
}

/// Pipeline phase. Observers see them strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Phase {
    Legality,
    Blast,
    Collapse,
    Refill,
    Classify,
    Deadlock,
    #[default]
    Idle,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Legality => "legality",
            Phase::Blast => "blast",
            Phase::Collapse => "collapse",
            Phase::Refill => "refill",
            Phase::Classify => "classify",
            Phase::Deadlock => "deadlock",
            Phase::Idle => "idle",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events delivered to the view collaborator.
///
/// Phase events may be acknowledged; the pipeline waits for those acks
/// before mutating the board again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Emitted once before the per-cell clears of a blast
    BlastStarted { group_size: usize, color: ColorIndex },
    /// A cell was blasted; `view` is released back to the view layer
    CellCleared {
        pos: Pos,
        color: ColorIndex,
        group_size: usize,
        view: Option<ViewHandle>,
    },
    /// Gravity moved the cell at `(x, from_y)` down to `(x, to_y)`
    CellMoved { x: usize, from_y: usize, to_y: usize },
    /// A new cell appeared at `pos`
    CellSpawned { pos: Pos, color: ColorIndex },
    /// The board was reshuffled; new color of every non-empty cell
    CellsReshuffled { cells: Vec<(Pos, ColorIndex)> },
    /// A group and the tier its cells should display
    GroupClassified {
        cells: Vec<Pos>,
        tier: Tier,
        color: ColorIndex,
    },
    /// The pipeline finished and the board is settled
    PipelineIdle,
}

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    BlastOccurred { count: usize },
    DropOccurred { count: usize },
}

/// HUD updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    ScoreChanged(u32),
    MovesChanged(u32),
    MultiplierChanged(f32),
    GameOver { new_record: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_table_is_ascending() {
        assert!(MULTIPLIER_TENTHS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(MULTIPLIER_TENTHS[0], 10);
        assert_eq!(*MULTIPLIER_TENTHS.last().unwrap(), 50);
    }

    #[test]
    fn test_size_bonus_tables_are_ascending() {
        for table in [DEFAULT_SIZE_BONUS, LEGACY_SIZE_BONUS] {
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 < w[1].1));
        }
    }

    #[test]
    fn test_cell_take_releases_view() {
        let mut cell = Cell::filled(2);
        cell.attach_view(ViewHandle(7));

        assert_eq!(cell.take(), Some(ViewHandle(7)));
        assert!(cell.is_empty());
        assert_eq!(cell.view(), None);
        assert_eq!(cell.color_index(), -1);
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(Tier::from_group_size(0), Tier::Default);
        assert_eq!(Tier::from_group_size(2), Tier::Default);
        assert_eq!(Tier::from_group_size(4), Tier::Default);
        assert_eq!(Tier::from_group_size(5), Tier::A);
        assert_eq!(Tier::from_group_size(7), Tier::A);
        assert_eq!(Tier::from_group_size(8), Tier::B);
        assert_eq!(Tier::from_group_size(9), Tier::B);
        assert_eq!(Tier::from_group_size(10), Tier::C);
        assert_eq!(Tier::from_group_size(64), Tier::C);
    }

    #[test]
    fn test_phases_are_ordered() {
        assert!(Phase::Legality < Phase::Blast);
        assert!(Phase::Blast < Phase::Collapse);
        assert!(Phase::Collapse < Phase::Refill);
        assert!(Phase::Refill < Phase::Classify);
        assert!(Phase::Classify < Phase::Deadlock);
        assert!(Phase::Deadlock < Phase::Idle);
    }
}

//! Board module - manages the game grid
//!
//! The board is a `cols x rows` grid where each cell is either empty or holds a
//! palette color. Uses a flat vector for cache locality.
//! Coordinates: (x, y) where x ranges 0..cols (left to right) and y ranges
//! 0..rows (bottom to top). Gravity pulls toward y = 0.
//!
//! The board only stores cells and answers geometry questions; blasting,
//! gravity and refill live in [`crate::phases`].

use arrayvec::ArrayVec;

use crate::config::LevelConfig;
use crate::error::GameError;
use crate::rng::GameRng;
use crate::snapshot::BoardSnapshot;
use crate::types::{Cell, ColorIndex, Pos, ViewHandle};

/// The game board - flat row-major storage (`y * cols + x`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cols: usize,
    rows: usize,
    palette_size: u8,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board with every cell empty
    pub fn new(cols: usize, rows: usize, palette_size: u8) -> Self {
        Self {
            cols,
            rows,
            palette_size,
            cells: vec![Cell::EMPTY; cols * rows],
        }
    }

    /// Create a board sized for `config` and fill it with random colors
    pub fn generate(config: &LevelConfig, rng: &mut dyn GameRng) -> Self {
        let mut board = Self::new(config.cols, config.rows, config.palette_size);
        board.init(rng);
        board
    }

    /// Fill every cell with a uniformly random color, dropping any view handles
    pub fn init(&mut self, rng: &mut dyn GameRng) {
        for x in 0..self.cols {
            for y in 0..self.rows {
                let color = rng.next_int(u32::from(self.palette_size)) as ColorIndex;
                self.cells[y * self.cols + x] = Cell::filled(color);
            }
        }
    }

    /// Build a board from columns of colors listed bottom to top.
    ///
    /// The row count is the longest column; shorter columns are empty above.
    pub fn from_columns(palette_size: u8, columns: &[Vec<ColorIndex>]) -> Result<Self, GameError> {
        let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut board = Self::new(columns.len(), rows, palette_size);
        for (x, column) in columns.iter().enumerate() {
            for (y, &color) in column.iter().enumerate() {
                board.set_color(Pos::new(x, y), color)?;
            }
        }
        Ok(board)
    }

    /// Calculate flat index from a position
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x >= self.cols || pos.y >= self.rows {
            return None;
        }
        Some(pos.y * self.cols + pos.x)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn palette_size(&self) -> u8 {
        self.palette_size
    }

    /// Check whether signed coordinates fall on the board
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.pos(x, y).is_some()
    }

    /// Convert signed coordinates to a position on this board
    pub fn pos(&self, x: i32, y: i32) -> Option<Pos> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.cols && y < self.rows).then_some(Pos::new(x, y))
    }

    /// Get the cell at signed coordinates, `None` when out of range
    pub fn at(&self, x: i32, y: i32) -> Option<&Cell> {
        self.pos(x, y).and_then(|pos| self.get(pos))
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    pub fn color_at(&self, pos: Pos) -> Option<ColorIndex> {
        self.get(pos).and_then(Cell::color)
    }

    /// Replace the cell at `pos`
    pub fn set(&mut self, pos: Pos, cell: Cell) -> Result<(), GameError> {
        if let Some(color) = cell.color() {
            self.check_color(color)?;
        }
        let idx = self.checked_index(pos)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Recolor the cell at `pos`, keeping its view handle
    pub fn set_color(&mut self, pos: Pos, color: ColorIndex) -> Result<(), GameError> {
        self.check_color(color)?;
        let idx = self.checked_index(pos)?;
        self.cells[idx].set_color(color);
        Ok(())
    }

    /// Record the view entity the renderer created for `pos`
    pub fn attach_view(&mut self, pos: Pos, handle: ViewHandle) -> Result<(), GameError> {
        let idx = self.checked_index(pos)?;
        self.cells[idx].attach_view(handle);
        Ok(())
    }

    /// Mark the cell empty and release its view handle
    pub fn clear(&mut self, pos: Pos) -> Result<Option<ViewHandle>, GameError> {
        let idx = self.checked_index(pos)?;
        Ok(self.cells[idx].take())
    }

    /// In-bounds 4-connected neighbors in N, S, E, W order
    pub fn neighbors4(&self, pos: Pos) -> ArrayVec<Pos, 4> {
        let mut out = ArrayVec::new();
        if pos.y + 1 < self.rows {
            out.push(Pos::new(pos.x, pos.y + 1));
        }
        if pos.y > 0 {
            out.push(Pos::new(pos.x, pos.y - 1));
        }
        if pos.x + 1 < self.cols {
            out.push(Pos::new(pos.x + 1, pos.y));
        }
        if pos.x > 0 {
            out.push(Pos::new(pos.x - 1, pos.y));
        }
        out
    }

    /// All positions in column-major order (x outer, y inner, bottom up)
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cols).flat_map(move |x| (0..self.rows).map(move |y| Pos::new(x, y)))
    }

    /// Number of non-empty cells per color
    pub fn color_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette_size as usize];
        for color in self.cells.iter().filter_map(Cell::color) {
            if let Some(slot) = counts.get_mut(color as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// Number of non-empty cells in column `x`
    pub fn column_height(&self, x: usize) -> usize {
        (0..self.rows)
            .filter(|&y| self.color_at(Pos::new(x, y)).is_some())
            .count()
    }

    /// Whether column `x` holds its cells in a contiguous run from y = 0
    pub fn is_column_packed(&self, x: usize) -> bool {
        let mut seen_empty = false;
        for y in 0..self.rows {
            match self.color_at(Pos::new(x, y)) {
                Some(_) if seen_empty => return false,
                Some(_) => {}
                None => seen_empty = true,
            }
        }
        true
    }

    /// Check whether no cell is empty
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Check whether no cell is occupied
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Every column bottom-packed and every color inside the palette
    pub fn check_packed(&self) -> Result<(), GameError> {
        for x in 0..self.cols {
            if !self.is_column_packed(x) {
                return Err(GameError::InvariantViolation(format!(
                    "column {} has a gap below a living cell",
                    x
                )));
            }
        }
        for cell in &self.cells {
            if let Some(color) = cell.color() {
                self.check_color(color)?;
            }
        }
        Ok(())
    }

    /// Packed and full: the shape the board must have whenever input is open
    pub fn check_settled(&self) -> Result<(), GameError> {
        self.check_packed()?;
        if !self.is_full() {
            return Err(GameError::InvariantViolation(
                "board has empty cells at rest".to_string(),
            ));
        }
        Ok(())
    }

    /// Get a reference to the internal cells (row-major)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(self)
    }

    fn checked_index(&self, pos: Pos) -> Result<usize, GameError> {
        self.index(pos).ok_or(GameError::OutOfBounds {
            x: i32::try_from(pos.x).unwrap_or(i32::MAX),
            y: i32::try_from(pos.y).unwrap_or(i32::MAX),
        })
    }

    fn check_color(&self, color: ColorIndex) -> Result<(), GameError> {
        if color >= self.palette_size {
            return Err(GameError::InvariantViolation(format!(
                "color {} outside palette of {}",
                color, self.palette_size
            )));
        }
        Ok(())
    }
}

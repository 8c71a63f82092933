//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the board model and every rule of the puzzle. It has
//! **no dependencies** on rendering, audio, timers or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical boards and refills
//! - **Testable**: Every rule is a plain function over a [`Board`]
//! - **Portable**: Runs headless, in tests, or behind any async orchestrator
//!
//! # Module Structure
//!
//! - [`board`]: Rectangular grid of colored cells with gravity invariants
//! - [`groups`]: Breadth-first flood fill of same-color groups
//! - [`classify`]: Group size to visual tier mapping
//! - [`phases`]: Blast, collapse and refill mutations
//! - [`deadlock`]: Deadlock detection, bounded shuffling and forced pairs
//! - [`scoring`]: Move budget, combo multiplier and points
//! - [`config`]: Level and scoring parameters with validation
//! - [`rng`]: Seedable LCG shared by board generation, refill and shuffles
//! - [`snapshot`]: Read-only board and game views with a stable hash
//!
//! # Game Rules
//!
//! - **Tap**: Tapping a cell whose group holds two or more cells blasts the group
//! - **Gravity**: Surviving cells fall straight down; nothing moves sideways
//! - **Refill**: Every empty cell gets a uniformly random color
//! - **Deadlock**: A board without a legal move is reshuffled until one exists
//! - **Combo**: Taps less than two seconds apart climb the multiplier table
//!
//! # Example
//!
//! ```
//! use blast_grid_core::{blast, collapse, group_at, refill, Board, SimpleRng};
//! use blast_grid_core::types::Pos;
//!
//! // Colors are listed bottom to top, one vector per column
//! let mut board = Board::from_columns(3, &[vec![0, 0, 1], vec![2, 1, 1]]).unwrap();
//! let mut rng = SimpleRng::new(7);
//!
//! let group = group_at(&board, Pos::new(0, 0)).unwrap();
//! assert_eq!(group.len(), 2);
//!
//! blast(&mut board, &group).unwrap();
//! collapse(&mut board).unwrap();
//! assert_eq!(board.color_at(Pos::new(0, 0)), Some(1));
//!
//! refill(&mut board, &mut rng).unwrap();
//! assert!(board.is_full());
//! ```

pub mod board;
pub mod classify;
pub mod config;
pub mod deadlock;
pub mod error;
pub mod groups;
pub mod phases;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use blast_grid_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use classify::{classify, classify_groups};
pub use config::{ConfigError, LevelConfig, ScoreRules};
pub use deadlock::{is_deadlocked, resolve, shuffle_once, Resolution};
pub use error::{GameError, SaveError};
pub use groups::{find_all_groups, find_group, group_at, has_legal_move, Group};
pub use phases::{blast, collapse, refill, BlastResult, CollapseResult, RefillResult};
pub use rng::{shuffle, GameRng, SimpleRng};
pub use scoring::{calculate_points, HighScoreStore, ScoreEngine};
pub use snapshot::{BoardSnapshot, GameSnapshot};

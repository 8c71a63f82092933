//! Blast grid (workspace facade crate).
//!
//! Re-exports the `blast_grid::{core,engine,types}` public API while the
//! implementation lives in dedicated crates under `crates/`.

pub use blast_grid_core as core;
pub use blast_grid_engine as engine;
pub use blast_grid_types as types;

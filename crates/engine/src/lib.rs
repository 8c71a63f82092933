//! Engine module - async orchestration around the pure core
//!
//! The core crate decides *what* happens to the board; this crate decides
//! *when*. It sequences the blast pipeline phase by phase, waits for the view
//! layer to acknowledge each phase, forwards audio and HUD events, persists
//! the high score, and runs the input loop.
//!
//! # Module Structure
//!
//! - [`sink`]: Collaborator traits for view, audio and HUD, plus acks
//! - [`clock`]: Monotonic and manual clocks for combo timing
//! - [`store`]: Integer key/value persistence (memory and JSON file)
//! - [`pipeline`]: The phased blast pipeline with ack deadlines and teardown
//! - [`controller`]: Tap handling, move accounting and game lifecycle
//! - [`runtime`]: Input loop with decay ticks and auto-restart
//! - [`settings`]: TOML settings for every tunable
//!
//! # Example
//!
//! ```
//! use blast_grid_engine::{Collaborators, GameController, GameSettings, TapOutcome};
//!
//! # tokio_test::block_on(async {
//! let settings = GameSettings::default();
//! let mut controller = GameController::new(&settings, Collaborators::headless(42)).unwrap();
//! controller.start_game();
//!
//! // Off-board taps are dropped without consuming a move
//! let outcome = controller.tap(-1, 0).await;
//! assert!(matches!(outcome, TapOutcome::Dropped(_)));
//! assert_eq!(controller.moves_left(), settings.level.max_moves);
//! # });
//! ```

pub mod clock;
pub mod controller;
pub mod pipeline;
pub mod runtime;
pub mod settings;
pub mod sink;
pub mod store;

pub use blast_grid_core as core;
pub use blast_grid_types as types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{Collaborators, GameController, TapOutcome, TapReport};
pub use pipeline::{BlastPipeline, PipelineConfig, PipelineOutcome, PipelineReport, TeardownHandle};
pub use runtime::{run, InputEvent, RunSummary, RuntimeConfig};
pub use settings::GameSettings;
pub use sink::{Ack, AckHandle, AckMode, AudioSink, EventLog, NullSink, UiSink, ViewSink};
pub use store::{JsonFileStore, KvStore, MemoryStore, StoreError};

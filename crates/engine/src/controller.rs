//! Game controller - turns taps into moves and owns the game lifecycle.
//!
//! The controller never panics and never hands an error back from [`tap`]:
//! an illegal tap comes back as [`TapOutcome::Dropped`], a broken board ends
//! the game, and a teardown leaves the controller waiting for
//! [`start_game`].
//!
//! [`tap`]: GameController::tap
//! [`start_game`]: GameController::start_game

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::core::{
    classify_groups, find_all_groups, group_at, resolve, Board, ConfigError, GameError,
    GameRng, GameSnapshot, LevelConfig, Resolution, ScoreEngine, SimpleRng,
};
use crate::pipeline::{BlastPipeline, PipelineOutcome, PipelineReport, TeardownHandle};
use crate::settings::GameSettings;
use crate::sink::{AudioSink, NullSink, UiSink, ViewSink};
use crate::store::{HighScores, KvStore, MemoryStore};
use crate::types::{Phase, Pos, ViewEvent, ViewHandle, HIGH_SCORE_KEY};

/// Everything the game talks to
pub struct Collaborators {
    pub view: Box<dyn ViewSink>,
    pub audio: Box<dyn AudioSink>,
    pub ui: Box<dyn UiSink>,
    pub clock: Box<dyn Clock>,
    pub store: Box<dyn KvStore>,
    pub rng: Box<dyn GameRng>,
}

impl Collaborators {
    /// Null sinks, a system clock, an in-memory store and a seeded RNG
    pub fn headless(seed: u32) -> Self {
        Self {
            view: Box::new(NullSink),
            audio: Box::new(NullSink),
            ui: Box::new(NullSink),
            clock: Box::new(SystemClock::new()),
            store: Box::new(MemoryStore::new()),
            rng: Box::new(SimpleRng::new(seed)),
        }
    }

    pub fn with_view(mut self, view: impl ViewSink + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_ui(mut self, ui: impl UiSink + 'static) -> Self {
        self.ui = Box::new(ui);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_store(mut self, store: impl KvStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn with_rng(mut self, rng: impl GameRng + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }
}

/// Result of a tap that blasted a group
#[derive(Debug, Clone, PartialEq)]
pub struct TapReport {
    pub pos: Pos,
    pub group_size: usize,
    /// Points this tap earned
    pub points: u32,
    /// Multiplier the points were scored at
    pub multiplier: f32,
    pub score: u32,
    pub moves_left: u32,
    pub game_over: bool,
    pub new_record: bool,
    pub pipeline: PipelineReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    Blasted(TapReport),
    /// Ignored; nothing changed
    Dropped(GameError),
    /// Teardown stopped the pipeline; call `start_game` to play again
    Cancelled,
    /// The board broke and the game ended
    Aborted(GameError),
}

impl TapOutcome {
    pub fn is_blasted(&self) -> bool {
        matches!(self, TapOutcome::Blasted(_))
    }
}

pub struct GameController {
    level: LevelConfig,
    board: Board,
    scoring: ScoreEngine,
    pipeline: BlastPipeline,
    io: Collaborators,
    input_active: bool,
    busy: bool,
    started: bool,
}

impl GameController {
    pub fn new(settings: &GameSettings, io: Collaborators) -> Result<Self, ConfigError> {
        settings.validate()?;
        let level = settings.level;
        Ok(Self {
            level,
            board: Board::new(level.cols, level.rows, level.palette_size),
            scoring: ScoreEngine::new(level.max_moves, settings.scoring.clone()),
            pipeline: BlastPipeline::new(settings.pipeline, TeardownHandle::new()),
            io,
            input_active: true,
            busy: false,
            started: false,
        })
    }

    /// Deal a fresh board and reset the score.
    ///
    /// The new board is announced with one `CellSpawned` per cell, then
    /// classified. A deadlocked deal is reshuffled before input unlocks.
    pub fn start_game(&mut self) {
        let board = Board::generate(&self.level, &mut *self.io.rng);
        self.deal(board);
    }

    /// Start a game on a prepared board instead of a random deal.
    ///
    /// The board must match the level's dimensions and palette and be full.
    pub fn start_game_with_board(&mut self, board: Board) -> Result<(), GameError> {
        if board.cols() != self.level.cols
            || board.rows() != self.level.rows
            || board.palette_size() != self.level.palette_size
        {
            return Err(GameError::InvariantViolation(format!(
                "board is {}x{} with {} colors, level expects {}x{} with {}",
                board.cols(),
                board.rows(),
                board.palette_size(),
                self.level.cols,
                self.level.rows,
                self.level.palette_size
            )));
        }
        board.check_settled()?;
        self.deal(board);
        Ok(())
    }

    fn deal(&mut self, board: Board) {
        if self.pipeline.teardown_handle().is_torn_down() {
            self.pipeline.set_teardown(TeardownHandle::new());
        }
        self.pipeline.reset();

        self.board = board;
        let spawns: Vec<ViewEvent> = self
            .board
            .positions()
            .filter_map(|pos| {
                self.board
                    .color_at(pos)
                    .map(|color| ViewEvent::CellSpawned { pos, color })
            })
            .collect();
        self.submit(spawns);
        self.submit(classify_groups(&find_all_groups(&self.board)));

        match resolve(
            &mut self.board,
            &mut *self.io.rng,
            self.pipeline.config().max_shuffle_attempts,
        ) {
            Ok(Resolution::NotDeadlocked) => {}
            Ok(Resolution::Unresolvable) => {
                warn!("dealt board cannot hold a legal move");
            }
            Ok(resolution) => {
                debug!(?resolution, "dealt board was deadlocked");
                self.submit(resolution.into_events());
                self.submit(classify_groups(&find_all_groups(&self.board)));
            }
            Err(err) => error!(error = %err, "failed to resolve dealt board"),
        }

        self.scoring.start_game(self.io.clock.now());
        self.flush_ui();

        self.busy = false;
        self.started = true;
        info!(
            cols = self.level.cols,
            rows = self.level.rows,
            palette = self.level.palette_size,
            moves = self.level.max_moves,
            "game started"
        );
    }

    /// Handle a tap at board coordinates `(x, y)`.
    pub async fn tap(&mut self, x: i32, y: i32) -> TapOutcome {
        if self.is_input_locked() {
            debug!(x, y, "tap dropped: input locked");
            return TapOutcome::Dropped(GameError::InputLocked);
        }
        let Some(pos) = self.board.pos(x, y) else {
            debug!(x, y, "tap dropped: out of bounds");
            return TapOutcome::Dropped(GameError::OutOfBounds { x, y });
        };
        let Some(group) = group_at(&self.board, pos) else {
            debug!(%pos, "tap dropped: empty cell");
            return TapOutcome::Dropped(GameError::EmptyCell);
        };
        if !group.is_blastable() {
            debug!(%pos, size = group.len(), "tap dropped: group too small");
            return TapOutcome::Dropped(GameError::NotEnoughMatches { size: group.len() });
        }
        if !self.scoring.try_use_move(self.io.clock.now()) {
            debug!(%pos, "tap dropped: no moves left");
            return TapOutcome::Dropped(GameError::NoMovesLeft);
        }

        let group_size = group.len();
        let multiplier = self.scoring.current_multiplier();
        let points = self.scoring.add_score(group_size);
        self.flush_ui();

        self.busy = true;
        let outcome = self
            .pipeline
            .run(&mut self.board, group, &mut self.io)
            .await;
        self.busy = false;

        match outcome {
            PipelineOutcome::Idle(pipeline) => {
                let mut store = HighScores(&mut *self.io.store);
                let ended = self.scoring.check_game_end(&mut store);
                self.flush_ui();
                TapOutcome::Blasted(TapReport {
                    pos,
                    group_size,
                    points,
                    multiplier,
                    score: self.scoring.score(),
                    moves_left: self.scoring.moves_left(),
                    game_over: ended.is_some(),
                    new_record: ended.unwrap_or(false),
                    pipeline,
                })
            }
            PipelineOutcome::Rejected(err) => TapOutcome::Dropped(err),
            PipelineOutcome::Cancelled => {
                self.started = false;
                info!("game torn down mid-pipeline");
                TapOutcome::Cancelled
            }
            PipelineOutcome::Aborted(err) => {
                self.scoring.abort_game();
                self.flush_ui();
                TapOutcome::Aborted(err)
            }
        }
    }

    /// Gate input, e.g. while a menu covers the board
    pub fn set_input_active(&mut self, active: bool) {
        self.input_active = active;
    }

    /// Advance combo decay to the current clock time
    pub fn tick(&mut self) {
        self.scoring.tick_decay(self.io.clock.now());
        self.flush_ui();
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.pipeline.teardown_handle()
    }

    /// Record the view entity rendering the cell at `pos`
    pub fn attach_view(&mut self, pos: Pos, handle: ViewHandle) -> Result<(), GameError> {
        self.board.attach_view(pos, handle)
    }

    pub fn score(&self) -> u32 {
        self.scoring.score()
    }

    pub fn moves_left(&self) -> u32 {
        self.scoring.moves_left()
    }

    pub fn current_multiplier(&self) -> f32 {
        self.scoring.current_multiplier()
    }

    pub fn is_game_over(&self) -> bool {
        self.scoring.is_game_over()
    }

    pub fn is_low_on_moves(&self) -> bool {
        self.scoring.is_low_on_moves()
    }

    pub fn high_score(&self) -> i64 {
        self.io.store.get_int(HIGH_SCORE_KEY, 0)
    }

    pub fn is_input_locked(&self) -> bool {
        !self.started
            || !self.input_active
            || self.busy
            || self.scoring.is_game_over()
            || self.pipeline.teardown_handle().is_torn_down()
    }

    pub fn phase(&self) -> Phase {
        self.pipeline.phase()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn level(&self) -> &LevelConfig {
        &self.level
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.snapshot(),
            score: self.scoring.score(),
            moves_left: self.scoring.moves_left(),
            multiplier: self.scoring.current_multiplier(),
            game_over: self.scoring.is_game_over(),
            phase: self.pipeline.phase(),
        }
    }

    /// Submit without waiting; nothing is mutated until the next tap anyway
    fn submit(&mut self, events: Vec<ViewEvent>) {
        for event in events {
            let _ = self.io.view.submit(event);
        }
    }

    fn flush_ui(&mut self) {
        for event in self.scoring.take_events() {
            self.io.ui.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::sink::EventLog;
    use crate::types::UiEvent;

    fn controller(level: LevelConfig, seed: u32) -> (GameController, EventLog, ManualClock) {
        let settings = GameSettings {
            level,
            ..GameSettings::default()
        };
        let log = EventLog::new();
        let clock = ManualClock::new(10.0);
        let io = Collaborators::headless(seed)
            .with_view(log.clone())
            .with_ui(log.clone())
            .with_clock(clock.clone());
        (GameController::new(&settings, io).unwrap(), log, clock)
    }

    /// First position whose group is blastable
    fn legal_tap(board: &Board) -> Pos {
        board
            .positions()
            .find(|&pos| group_at(board, pos).is_some_and(|g| g.is_blastable()))
            .unwrap()
    }

    fn singleton_tap(board: &Board) -> Option<Pos> {
        board
            .positions()
            .find(|&pos| group_at(board, pos).is_some_and(|g| !g.is_blastable()))
    }

    #[tokio::test]
    async fn test_taps_before_start_are_dropped() {
        let (mut game, _log, _clock) = controller(LevelConfig::default(), 1);
        assert!(game.is_input_locked());
        assert_eq!(game.tap(0, 0).await, TapOutcome::Dropped(GameError::InputLocked));
    }

    #[tokio::test]
    async fn test_start_game_announces_board() {
        let (mut game, log, _clock) = controller(LevelConfig::new(4, 3, 3, 5), 9);
        game.start_game();

        let spawns = log
            .view_events()
            .iter()
            .filter(|e| matches!(e, ViewEvent::CellSpawned { .. }))
            .count();
        assert_eq!(spawns, 12);
        assert!(game.board().is_full());
        assert!(!crate::core::is_deadlocked(game.board()));
        assert!(!game.is_input_locked());
        assert_eq!(
            log.ui_events(),
            vec![
                UiEvent::ScoreChanged(0),
                UiEvent::MovesChanged(5),
                UiEvent::MultiplierChanged(1.0),
            ]
        );
    }

    #[tokio::test]
    async fn test_legal_tap_scores_and_spends_a_move() {
        let (mut game, _log, _clock) = controller(LevelConfig::new(6, 6, 3, 10), 21);
        game.start_game();
        let pos = legal_tap(game.board());
        let size = group_at(game.board(), pos).unwrap().len();

        let outcome = game.tap(pos.x as i32, pos.y as i32).await;

        let report = match outcome {
            TapOutcome::Blasted(report) => report,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert_eq!(report.group_size, size);
        assert_eq!(report.moves_left, 9);
        assert!(report.points >= size as u32 * 10);
        assert_eq!(game.score(), report.points);
        assert!(game.board().is_full());
        assert_eq!(game.phase(), Phase::Idle);
        assert!(!game.is_input_locked());
    }

    #[tokio::test]
    async fn test_illegal_taps_keep_state() {
        let (mut game, log, _clock) = controller(LevelConfig::new(6, 6, 4, 10), 3);
        game.start_game();
        log.clear();
        let before = game.snapshot();

        assert_eq!(
            game.tap(6, 0).await,
            TapOutcome::Dropped(GameError::OutOfBounds { x: 6, y: 0 })
        );
        assert_eq!(
            game.tap(0, -1).await,
            TapOutcome::Dropped(GameError::OutOfBounds { x: 0, y: -1 })
        );
        if let Some(pos) = singleton_tap(game.board()) {
            assert_eq!(
                game.tap(pos.x as i32, pos.y as i32).await,
                TapOutcome::Dropped(GameError::NotEnoughMatches { size: 1 })
            );
        }

        assert_eq!(game.snapshot(), before);
        assert!(log.view_events().is_empty());
        assert!(log.ui_events().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_input_drops_taps() {
        let (mut game, _log, _clock) = controller(LevelConfig::default(), 4);
        game.start_game();
        game.set_input_active(false);
        let pos = legal_tap(game.board());

        assert_eq!(
            game.tap(pos.x as i32, pos.y as i32).await,
            TapOutcome::Dropped(GameError::InputLocked)
        );
        assert_eq!(game.moves_left(), 30);

        game.set_input_active(true);
        assert!(game.tap(pos.x as i32, pos.y as i32).await.is_blasted());
    }

    #[tokio::test]
    async fn test_last_move_ends_game_and_records_high_score() {
        let (mut game, log, _clock) = controller(LevelConfig::new(5, 5, 2, 1), 8);
        game.start_game();
        let pos = legal_tap(game.board());

        let report = match game.tap(pos.x as i32, pos.y as i32).await {
            TapOutcome::Blasted(report) => report,
            other => panic!("unexpected outcome {:?}", other),
        };

        assert!(report.game_over);
        assert!(report.new_record);
        assert!(game.is_game_over());
        assert!(game.is_input_locked());
        assert_eq!(game.high_score(), i64::from(report.score));
        assert_eq!(
            log.ui_events().last(),
            Some(&UiEvent::GameOver { new_record: true })
        );

        let pos = legal_tap(game.board());
        assert_eq!(
            game.tap(pos.x as i32, pos.y as i32).await,
            TapOutcome::Dropped(GameError::InputLocked)
        );
    }

    #[tokio::test]
    async fn test_tick_decays_multiplier() {
        let (mut game, _log, clock) = controller(LevelConfig::new(6, 6, 2, 10), 12);
        game.start_game();
        let pos = legal_tap(game.board());
        game.tap(pos.x as i32, pos.y as i32).await;
        assert_eq!(game.current_multiplier(), 1.1);

        clock.advance(1.0);
        game.tick();
        assert_eq!(game.current_multiplier(), 1.1);

        clock.advance(1.5);
        game.tick();
        assert_eq!(game.current_multiplier(), 1.0);
    }

    #[tokio::test]
    async fn test_restart_after_teardown() {
        let (mut game, _log, _clock) = controller(LevelConfig::default(), 6);
        game.start_game();
        let old = game.teardown_handle();
        old.teardown();
        assert!(game.is_input_locked());

        game.start_game();
        assert!(!game.is_input_locked());
        assert!(!game.teardown_handle().is_torn_down());
    }

    #[tokio::test]
    async fn test_attach_view_validates_position() {
        let (mut game, _log, _clock) = controller(LevelConfig::new(3, 3, 3, 5), 2);
        game.start_game();
        assert!(game.attach_view(Pos::new(1, 1), ViewHandle(4)).is_ok());
        assert_eq!(
            game.board().get(Pos::new(1, 1)).unwrap().view(),
            Some(ViewHandle(4))
        );
        assert!(game.attach_view(Pos::new(3, 0), ViewHandle(5)).is_err());
    }
}

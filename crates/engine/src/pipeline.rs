//! Blast pipeline - sequences one tap's board mutations.
//!
//! A legal tap runs through the phases in a fixed order:
//!
//! | Phase | Board change | View events | Audio |
//! |-------|--------------|-------------|-------|
//! | Legality | none | none | none |
//! | Blast | group cleared | `BlastStarted`, `CellCleared` | `BlastOccurred` |
//! | Collapse | columns packed | `CellMoved` | `DropOccurred` |
//! | Refill | gaps filled | `CellSpawned` | none |
//! | Classify | none | `GroupClassified` | none |
//! | Deadlock | reshuffle if stuck | `CellsReshuffled`, `GroupClassified` | none |
//!
//! After submitting a phase's events the pipeline waits for their acks, all
//! sharing one deadline. A missed deadline is logged and the pipeline moves
//! on. Board mutations never interleave with those waits. Teardown is
//! observed between phases and while waiting.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::{timeout_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::controller::Collaborators;
use crate::core::{
    blast, classify_groups, collapse, find_all_groups, is_deadlocked, refill, resolve, Board,
    GameError, Group, Resolution,
};
use crate::sink::Ack;
use crate::types::{
    AudioEvent, Phase, ViewEvent, DEFAULT_ACK_TIMEOUT_MS, DEFAULT_MAX_SHUFFLE_ATTEMPTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on waiting for one phase's acks
    pub ack_timeout_ms: u64,
    /// Shuffles tried before a legal pair is forced
    pub max_shuffle_attempts: u32,
}

impl PipelineConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            max_shuffle_attempts: DEFAULT_MAX_SHUFFLE_ATTEMPTS,
        }
    }
}

/// Cancels running pipelines when the scene goes away. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle {
    token: CancellationToken,
}

impl TeardownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`teardown`](Self::teardown) has been called
    pub async fn torn_down(&self) {
        self.token.cancelled().await;
    }
}

/// What one successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub cleared: usize,
    pub moved: usize,
    pub spawned: usize,
    /// Groups on the settled board
    pub groups: usize,
    /// Deadlock shuffles performed
    pub shuffles: u32,
    /// A legal pair had to be forced
    pub forced: bool,
    /// Phases whose acks missed the deadline
    pub timed_out: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The board is settled and has a legal move
    Idle(PipelineReport),
    /// The group failed the legality check; nothing changed
    Rejected(GameError),
    /// Teardown interrupted the run
    Cancelled,
    /// A board invariant broke; the game cannot continue
    Aborted(GameError),
}

/// Why a run stopped early
enum Halt {
    Cancelled,
    Aborted(GameError),
}

impl From<GameError> for Halt {
    fn from(err: GameError) -> Self {
        Halt::Aborted(err)
    }
}

#[derive(Debug)]
pub struct BlastPipeline {
    config: PipelineConfig,
    phase: Phase,
    teardown: TeardownHandle,
}

impl BlastPipeline {
    pub fn new(config: PipelineConfig, teardown: TeardownHandle) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            teardown,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    /// Swap in a fresh handle after a teardown
    pub fn set_teardown(&mut self, teardown: TeardownHandle) {
        self.teardown = teardown;
    }

    /// Forget a run whose future was dropped before it finished
    pub(crate) fn reset(&mut self) {
        if self.phase != Phase::Idle {
            debug!(phase = %self.phase, "resetting abandoned pipeline run");
        }
        self.phase = Phase::Idle;
    }

    /// Run every phase for `group` and leave the board settled.
    pub async fn run(
        &mut self,
        board: &mut Board,
        group: Group,
        io: &mut Collaborators,
    ) -> PipelineOutcome {
        self.enter(Phase::Legality);
        if !group.is_blastable() {
            self.phase = Phase::Idle;
            return PipelineOutcome::Rejected(GameError::NotEnoughMatches { size: group.len() });
        }

        let outcome = match self.run_phases(board, &group, io).await {
            Ok(report) => {
                io.view.submit(ViewEvent::PipelineIdle);
                PipelineOutcome::Idle(report)
            }
            Err(Halt::Cancelled) => {
                debug!(phase = %self.phase, "pipeline cancelled");
                PipelineOutcome::Cancelled
            }
            Err(Halt::Aborted(err)) => {
                error!(phase = %self.phase, error = %err, "pipeline aborted");
                PipelineOutcome::Aborted(err)
            }
        };
        self.phase = Phase::Idle;
        outcome
    }

    async fn run_phases(
        &mut self,
        board: &mut Board,
        group: &Group,
        io: &mut Collaborators,
    ) -> Result<PipelineReport, Halt> {
        let mut report = PipelineReport::default();

        self.enter_checked(Phase::Blast)?;
        let blasted = match blast(board, group) {
            Ok(result) => result,
            Err(err) if err.is_fatal() => return Err(Halt::Aborted(err)),
            Err(err) => return Err(Halt::Aborted(GameError::InvariantViolation(err.to_string()))),
        };
        report.cleared = blasted.cleared;
        let acks = submit_all(io, blasted.events);
        io.audio.play(AudioEvent::BlastOccurred {
            count: blasted.cleared,
        });
        self.await_acks(acks, &mut report).await?;

        self.enter_checked(Phase::Collapse)?;
        let collapsed = collapse(board)?;
        report.moved = collapsed.moved;
        let acks = submit_all(io, collapsed.events);
        if collapsed.moved > 0 {
            io.audio.play(AudioEvent::DropOccurred {
                count: collapsed.moved,
            });
        }
        self.await_acks(acks, &mut report).await?;

        self.enter_checked(Phase::Refill)?;
        let refilled = refill(board, &mut *io.rng)?;
        report.spawned = refilled.spawned;
        let acks = submit_all(io, refilled.events);
        self.await_acks(acks, &mut report).await?;

        self.enter_checked(Phase::Classify)?;
        let groups = find_all_groups(board);
        report.groups = groups.len();
        let acks = submit_all(io, classify_groups(&groups));
        self.await_acks(acks, &mut report).await?;

        self.enter_checked(Phase::Deadlock)?;
        if is_deadlocked(board) {
            let resolution = resolve(board, &mut *io.rng, self.config.max_shuffle_attempts)?;
            match &resolution {
                Resolution::Shuffled { attempts, .. } => report.shuffles = *attempts,
                Resolution::Forced { attempts, .. } => {
                    report.shuffles = *attempts;
                    report.forced = true;
                }
                Resolution::NotDeadlocked => {}
                Resolution::Unresolvable => {
                    return Err(Halt::Aborted(GameError::InvariantViolation(
                        "board cannot hold a legal move".to_string(),
                    )))
                }
            }
            if is_deadlocked(board) {
                return Err(Halt::Aborted(GameError::InvariantViolation(
                    "board still deadlocked after recovery".to_string(),
                )));
            }

            let mut events = resolution.into_events();
            let groups = find_all_groups(board);
            report.groups = groups.len();
            events.extend(classify_groups(&groups));
            let acks = submit_all(io, events);
            self.await_acks(acks, &mut report).await?;
        }

        Ok(report)
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "pipeline phase");
        self.phase = phase;
    }

    fn enter_checked(&mut self, phase: Phase) -> Result<(), Halt> {
        if self.teardown.is_torn_down() {
            return Err(Halt::Cancelled);
        }
        self.enter(phase);
        Ok(())
    }

    /// Wait for `acks` under one shared deadline, or until teardown
    async fn await_acks(&self, acks: Vec<Ack>, report: &mut PipelineReport) -> Result<(), Halt> {
        if acks.iter().all(Ack::is_done) {
            return Ok(());
        }

        let deadline = Instant::now() + self.config.ack_timeout();
        let mut missed = 0usize;
        for ack in acks {
            tokio::select! {
                biased;
                _ = self.teardown.torn_down() => return Err(Halt::Cancelled),
                waited = timeout_at(deadline, ack.wait()) => {
                    if waited.is_err() {
                        missed += 1;
                    }
                }
            }
        }

        if missed > 0 {
            let err = GameError::CollaboratorTimeout { phase: self.phase };
            warn!(phase = %self.phase, missed, "{}", err);
            report.timed_out.push(self.phase);
        }
        Ok(())
    }
}

fn submit_all(io: &mut Collaborators, events: Vec<ViewEvent>) -> Vec<Ack> {
    events.into_iter().map(|event| io.view.submit(event)).collect()
}

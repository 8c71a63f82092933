//! Input loop.
//!
//! Owns the cadence of a session: taps arrive over a channel, combo decay
//! ticks on an interval, and a finished game restarts after a short delay.
//! A tap holds the controller for its whole pipeline run; taps that queue up
//! meanwhile are discarded, so the player never acts on a board they have
//! not seen settle.

use std::future;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::{GameController, TapOutcome};
use crate::types::{DEFAULT_DECAY_TICK_MS, DEFAULT_RESTART_DELAY_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Tap { x: i32, y: i32 },
    /// Gate input on or off, e.g. while a menu is open
    SetActive(bool),
    /// Abandon the current game and deal a new one
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub decay_tick_ms: u64,
    pub restart_delay_ms: u64,
    pub auto_restart: bool,
}

impl RuntimeConfig {
    pub fn decay_tick(&self) -> Duration {
        Duration::from_millis(self.decay_tick_ms.max(1))
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            decay_tick_ms: DEFAULT_DECAY_TICK_MS,
            restart_delay_ms: DEFAULT_RESTART_DELAY_MS,
            auto_restart: true,
        }
    }
}

/// Counters for one [`run`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub games_started: u32,
    pub taps_blasted: u32,
    /// Taps rejected by the controller
    pub taps_dropped: u32,
    /// Taps discarded because they queued behind a pipeline run
    pub taps_discarded: u32,
}

/// Drive `controller` until teardown or until the input channel closes.
pub async fn run(
    controller: &mut GameController,
    mut input: mpsc::Receiver<InputEvent>,
    config: &RuntimeConfig,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let teardown = controller.teardown_handle();

    controller.start_game();
    summary.games_started += 1;

    let mut decay = time::interval(config.decay_tick());
    decay.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut restart_at: Option<Instant> = None;

    loop {
        let restart = async move {
            match restart_at {
                Some(at) => time::sleep_until(at).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = teardown.torn_down() => {
                info!("teardown; leaving input loop");
                break;
            }
            _ = restart => {
                restart_at = None;
                controller.start_game();
                summary.games_started += 1;
            }
            event = input.recv() => {
                let Some(event) = event else {
                    debug!("input channel closed");
                    break;
                };
                match event {
                    InputEvent::Tap { x, y } => {
                        let outcome = controller.tap(x, y).await;
                        match outcome {
                            TapOutcome::Blasted(_) => summary.taps_blasted += 1,
                            TapOutcome::Dropped(_) => summary.taps_dropped += 1,
                            TapOutcome::Cancelled => break,
                            TapOutcome::Aborted(_) => {}
                        }
                        if outcome.is_blasted() {
                            discard_queued_taps(
                                controller,
                                &mut input,
                                &mut restart_at,
                                &mut summary,
                            );
                        }
                    }
                    InputEvent::SetActive(active) => controller.set_input_active(active),
                    InputEvent::Restart => {
                        restart_at = None;
                        controller.start_game();
                        summary.games_started += 1;
                    }
                }

                if controller.is_game_over() && config.auto_restart && restart_at.is_none() {
                    restart_at = Some(Instant::now() + config.restart_delay());
                }
            }
            _ = decay.tick() => controller.tick(),
        }
    }

    summary
}

/// Drop taps that arrived during a pipeline run; other events still apply.
fn discard_queued_taps(
    controller: &mut GameController,
    input: &mut mpsc::Receiver<InputEvent>,
    restart_at: &mut Option<Instant>,
    summary: &mut RunSummary,
) {
    while let Ok(event) = input.try_recv() {
        match event {
            InputEvent::Tap { x, y } => {
                debug!(x, y, "discarding tap queued during pipeline run");
                summary.taps_discarded += 1;
            }
            InputEvent::SetActive(active) => controller.set_input_active(active),
            InputEvent::Restart => {
                *restart_at = None;
                controller.start_game();
                summary.games_started += 1;
            }
        }
    }
}

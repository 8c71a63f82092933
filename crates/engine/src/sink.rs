//! Collaborator traits for the view, audio and HUD layers.
//!
//! The view is the only collaborator the pipeline waits on: every submitted
//! [`ViewEvent`] returns an [`Ack`] that resolves once the view is done with
//! it (a tween finished, a sprite was recycled). Audio and HUD events are
//! fire-and-forget.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::types::{AudioEvent, UiEvent, ViewEvent};

/// Completion signal for one view event
#[derive(Debug)]
pub struct Ack(Option<oneshot::Receiver<()>>);

impl Ack {
    /// An ack that is already complete
    pub fn done() -> Self {
        Ack(None)
    }

    /// An outstanding ack and the handle that completes it
    pub fn pending() -> (AckHandle, Ack) {
        let (tx, rx) = oneshot::channel();
        (AckHandle(tx), Ack(Some(rx)))
    }

    pub fn is_done(&self) -> bool {
        self.0.is_none()
    }

    /// Resolve once acknowledged. A dropped [`AckHandle`] counts as acknowledged.
    pub async fn wait(self) {
        if let Some(rx) = self.0 {
            let _ = rx.await;
        }
    }
}

/// Held by the view layer until it is done with an event
#[derive(Debug)]
pub struct AckHandle(oneshot::Sender<()>);

impl AckHandle {
    pub fn complete(self) {
        let _ = self.0.send(());
    }
}

pub trait ViewSink: Send {
    fn submit(&mut self, event: ViewEvent) -> Ack;
}

pub trait AudioSink: Send {
    fn play(&mut self, event: AudioEvent);
}

pub trait UiSink: Send {
    fn notify(&mut self, event: UiEvent);
}

/// Discards everything and acks immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ViewSink for NullSink {
    fn submit(&mut self, _event: ViewEvent) -> Ack {
        Ack::done()
    }
}

impl AudioSink for NullSink {
    fn play(&mut self, _event: AudioEvent) {}
}

impl UiSink for NullSink {
    fn notify(&mut self, _event: UiEvent) {}
}

/// How an [`EventLog`] acknowledges view events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckMode {
    /// Ack every event on submission
    #[default]
    Immediate,
    /// Hold acks until [`EventLog::release_acks`]
    Manual,
    /// Hold acks forever, so every wait runs into its deadline
    Never,
    /// Drop the ack handle on submission
    Dropped,
}

#[derive(Debug, Default)]
struct LogInner {
    mode: AckMode,
    view: Vec<ViewEvent>,
    audio: Vec<AudioEvent>,
    ui: Vec<UiEvent>,
    held: Vec<AckHandle>,
}

/// Recording collaborator. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<LogInner>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ack_mode(mode: AckMode) -> Self {
        let log = Self::default();
        log.set_ack_mode(mode);
        log
    }

    pub fn set_ack_mode(&self, mode: AckMode) {
        self.lock().mode = mode;
    }

    pub fn view_events(&self) -> Vec<ViewEvent> {
        self.lock().view.clone()
    }

    pub fn audio_events(&self) -> Vec<AudioEvent> {
        self.lock().audio.clone()
    }

    pub fn ui_events(&self) -> Vec<UiEvent> {
        self.lock().ui.clone()
    }

    /// Acks currently held back
    pub fn pending_acks(&self) -> usize {
        self.lock().held.len()
    }

    /// Complete every held ack; returns how many were released
    pub fn release_acks(&self) -> usize {
        let held = std::mem::take(&mut self.lock().held);
        let count = held.len();
        for handle in held {
            handle.complete();
        }
        count
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.view.clear();
        inner.audio.clear();
        inner.ui.clear();
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewSink for EventLog {
    fn submit(&mut self, event: ViewEvent) -> Ack {
        let mut inner = self.lock();
        inner.view.push(event);
        match inner.mode {
            AckMode::Immediate => Ack::done(),
            AckMode::Manual | AckMode::Never => {
                let (handle, ack) = Ack::pending();
                inner.held.push(handle);
                ack
            }
            AckMode::Dropped => Ack::pending().1,
        }
    }
}

impl AudioSink for EventLog {
    fn play(&mut self, event: AudioEvent) {
        self.lock().audio.push(event);
    }
}

impl UiSink for EventLog {
    fn notify(&mut self, event: UiEvent) {
        self.lock().ui.push(event);
    }
}

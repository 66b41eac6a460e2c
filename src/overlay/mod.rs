//! Status overlay
//!
//! The skipper only ever talks to the overlay through [`StatusNotifier`].
//! The real overlay runs its own single-threaded loop fed by a message
//! queue, so neither the action loop nor the controller can block on it.

pub mod console;

pub use console::{Color, ConsoleOverlay, OverlayView};

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::control::RunState;

/// Fire-and-forget overlay notifications
pub trait StatusNotifier: Send + Sync {
    fn on_state_changed(&self, state: RunState);
    fn on_help_requested(&self);
}

/// Messages consumed by the overlay loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMessage {
    State(RunState),
    Help,
    Shutdown,
}

const QUEUE_CAPACITY: usize = 32;
const SHUTDOWN_SEND_TIMEOUT: Duration = Duration::from_millis(200);

/// Sending half of the overlay queue
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    sender: Sender<OverlayMessage>,
}

impl OverlayHandle {
    /// Create a handle and the receiver an overlay loop consumes
    pub fn channel() -> (Self, Receiver<OverlayMessage>) {
        let (sender, receiver) = bounded(QUEUE_CAPACITY);
        (Self { sender }, receiver)
    }

    fn post(&self, message: OverlayMessage) {
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                log::debug!("Overlay queue full, dropping {:?}", message);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Ask the overlay loop to close
    pub fn shutdown(&self) {
        let _ = self
            .sender
            .send_timeout(OverlayMessage::Shutdown, SHUTDOWN_SEND_TIMEOUT);
    }
}

impl StatusNotifier for OverlayHandle {
    fn on_state_changed(&self, state: RunState) {
        self.post(OverlayMessage::State(state));
    }

    fn on_help_requested(&self) {
        self.post(OverlayMessage::Help);
    }
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl StatusNotifier for NullNotifier {
    fn on_state_changed(&self, _state: RunState) {}
    fn on_help_requested(&self) {}
}

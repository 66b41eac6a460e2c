//! Terminal rendition of the status overlay
//!
//! Shows the status label in its state color, pops up the keybindings on
//! request and fades the label once nothing has changed for a while.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use super::{OverlayHandle, OverlayMessage};
use crate::config::settings::TimingSettings;
use crate::control::{HotkeyBindings, RunState};

/// What the overlay currently displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub label: &'static str,
    pub color: Color,
    pub help_visible: bool,
    pub faded: bool,
}

/// Status label color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Yellow,
    Red,
}

impl Color {
    fn ansi(self) -> &'static str {
        match self {
            Color::Green => "\x1b[92m",
            Color::Yellow => "\x1b[93m",
            Color::Red => "\x1b[91m",
        }
    }
}

impl OverlayView {
    fn for_state(state: RunState) -> Self {
        let color = match state {
            RunState::Running => Color::Green,
            RunState::Paused => Color::Yellow,
            RunState::Exiting => Color::Red,
        };
        Self {
            label: state.label(),
            color,
            help_visible: false,
            faded: false,
        }
    }
}

/// Overlay loop writing to a terminal
pub struct ConsoleOverlay<W: Write> {
    receiver: Receiver<OverlayMessage>,
    out: W,
    bindings: HotkeyBindings,
    view: OverlayView,
    help_display: Duration,
    fade_after: Duration,
    help_until: Option<Instant>,
    fade_at: Option<Instant>,
}

impl<W: Write> ConsoleOverlay<W> {
    pub fn new(
        receiver: Receiver<OverlayMessage>,
        out: W,
        bindings: HotkeyBindings,
        timings: &TimingSettings,
    ) -> Self {
        let fade_after = Duration::from_millis(timings.overlay_fade_ms);
        Self {
            receiver,
            out,
            bindings,
            view: OverlayView::for_state(RunState::Paused),
            help_display: Duration::from_millis(timings.help_display_ms),
            fade_after,
            help_until: None,
            fade_at: Some(Instant::now() + fade_after),
        }
    }

    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.help_until, self.fade_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Handle one message. Returns false once the overlay should close.
    pub fn apply(&mut self, message: OverlayMessage) -> bool {
        match message {
            OverlayMessage::State(state) => {
                self.view = OverlayView::for_state(state);
                self.fade_at = Some(Instant::now() + self.fade_after);
                self.render_status();
                true
            }
            OverlayMessage::Help => {
                let now = Instant::now();
                self.view.help_visible = true;
                self.view.faded = false;
                self.help_until = Some(now + self.help_display);
                self.fade_at = Some(now + self.fade_after);
                self.render_help();
                true
            }
            OverlayMessage::Shutdown => false,
        }
    }

    /// Expire help and fade timers that are due at `now`
    pub fn tick(&mut self, now: Instant) {
        if self.help_until.is_some_and(|until| until <= now) {
            self.help_until = None;
            self.view.help_visible = false;
            log::debug!("Help overlay hidden");
        }
        if self.fade_at.is_some_and(|at| at <= now) {
            self.fade_at = None;
            self.view.faded = true;
            log::debug!("Status overlay faded");
        }
    }

    /// Run until shutdown or until every sender is gone
    pub fn run(mut self) {
        self.render_status();
        loop {
            let received = match self.next_deadline() {
                Some(deadline) => self.receiver.recv_deadline(deadline),
                None => self
                    .receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(message) => {
                    if !self.apply(message) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => self.tick(Instant::now()),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("Overlay closed");
    }

    fn render_status(&mut self) {
        let line = format!(
            "{}[Crabe Skipper] {}\x1b[0m",
            self.view.color.ansi(),
            self.view.label
        );
        self.write_lines(&[line]);
    }

    fn render_help(&mut self) {
        let lines = [
            "-------------".to_string(),
            format!("{} to start", self.bindings.start),
            format!("{} to pause", self.bindings.pause),
            format!("{} to quit", self.bindings.exit),
            format!("{} for help", self.bindings.help),
            "-------------".to_string(),
        ];
        self.write_lines(&lines);
    }

    fn write_lines(&mut self, lines: &[String]) {
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(self.out, "{line}"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            log::debug!("Overlay write failed: {}", e);
        }
    }
}

impl ConsoleOverlay<io::Stdout> {
    /// Start the overlay on its own thread
    pub fn spawn(
        bindings: HotkeyBindings,
        timings: &TimingSettings,
    ) -> io::Result<(OverlayHandle, thread::JoinHandle<()>)> {
        let (handle, receiver) = OverlayHandle::channel();
        let overlay = ConsoleOverlay::new(receiver, io::stdout(), bindings, timings);
        let join = thread::Builder::new()
            .name("overlay".into())
            .spawn(move || overlay.run())?;
        Ok((handle, join))
    }
}

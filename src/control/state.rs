//! Run state and the hotkey-driven state machine
//!
//! The state lives in a single atomic cell shared between the control
//! thread (writer) and the action loop (reader).

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use super::hotkey::HotkeyAction;
use crate::desktop::WindowManager;
use crate::overlay::StatusNotifier;

/// Current automation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Clicking through dialogue
    Running,
    /// Idle, waiting for the start key
    #[default]
    Paused,
    /// Shutting down; terminal
    Exiting,
}

impl RunState {
    /// Overlay label for this state
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Running => "ACTIVE",
            RunState::Paused => "PAUSED",
            RunState::Exiting => "CLOSING...",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Exiting)
    }

    fn to_u8(self) -> u8 {
        match self {
            RunState::Running => 0,
            RunState::Paused => 1,
            RunState::Exiting => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => RunState::Running,
            1 => RunState::Paused,
            _ => RunState::Exiting,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Atomic cell holding the run state
#[derive(Debug)]
pub struct SharedRunState(AtomicU8);

impl SharedRunState {
    pub fn new(state: RunState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    pub fn get(&self) -> RunState {
        RunState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Store a new state unless already exiting. Returns the previous state.
    pub fn transition(&self, to: RunState) -> RunState {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            if RunState::from_u8(current).is_terminal() {
                return RunState::Exiting;
            }
            match self.0.compare_exchange_weak(
                current,
                to.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return RunState::from_u8(previous),
                Err(actual) => current = actual,
            }
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.get().is_terminal()
    }
}

impl Default for SharedRunState {
    fn default() -> Self {
        Self::new(RunState::default())
    }
}

/// Everything the action loop and the controller share
#[derive(Clone)]
pub struct SkipperContext {
    pub state: Arc<SharedRunState>,
    pub notifier: Arc<dyn StatusNotifier>,
}

impl SkipperContext {
    pub fn new(notifier: Arc<dyn StatusNotifier>) -> Self {
        Self {
            state: Arc::new(SharedRunState::default()),
            notifier,
        }
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    /// Move to Exiting outside of the hotkey path and tell the overlay.
    /// Returns false if the state was already Exiting.
    pub fn request_exit(&self) -> bool {
        if self.state.transition(RunState::Exiting).is_terminal() {
            return false;
        }
        self.notifier.on_state_changed(RunState::Exiting);
        true
    }
}

/// Result of applying one hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State moved
    Changed { from: RunState, to: RunState },
    /// State already matched; overlay refreshed anyway
    Unchanged(RunState),
    /// Help overlay requested
    HelpShown,
    /// Already exiting, hotkey dropped
    Ignored,
}

/// Applies hotkey actions to the shared state
pub struct Controller<W: WindowManager> {
    context: SkipperContext,
    windows: W,
    target_window: String,
}

impl<W: WindowManager> Controller<W> {
    pub fn new(context: SkipperContext, windows: W, target_window: impl Into<String>) -> Self {
        Self {
            context,
            windows,
            target_window: target_window.into(),
        }
    }

    /// Apply one hotkey action
    ///
    /// Help is honored in every state, including while exiting; every other
    /// action is ignored once the state is terminal.
    pub fn handle(&mut self, action: HotkeyAction) -> Transition {
        let target = match action {
            HotkeyAction::Start => RunState::Running,
            HotkeyAction::Pause => RunState::Paused,
            HotkeyAction::Exit => RunState::Exiting,
            HotkeyAction::Help => {
                log::info!("Displaying help");
                self.context.notifier.on_help_requested();
                return Transition::HelpShown;
            }
        };

        if self.context.state().is_terminal() {
            log::debug!("Ignoring {:?} while exiting", action);
            return Transition::Ignored;
        }

        let from = self.context.state.transition(target);
        if from.is_terminal() {
            return Transition::Ignored;
        }
        self.context.notifier.on_state_changed(target);

        match target {
            RunState::Running => {
                log::info!("ACTIVE");
                self.raise_target_window();
            }
            RunState::Paused => log::info!("PAUSED"),
            RunState::Exiting => log::info!("Closing the program"),
        }

        if from == target {
            Transition::Unchanged(target)
        } else {
            Transition::Changed { from, to: target }
        }
    }

    fn raise_target_window(&mut self) {
        if let Err(e) = self.windows.bring_to_foreground(&self.target_window) {
            log::warn!(
                "Error bringing '{}' to the foreground: {}",
                self.target_window,
                e
            );
        }
    }

    pub fn state(&self) -> RunState {
        self.context.state()
    }

    pub fn context(&self) -> &SkipperContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::ActivationError;
    use crate::overlay::testing::RecordingNotifier;
    use crate::vision::SampleError;

    #[derive(Default)]
    struct FakeWindows {
        raised: Vec<String>,
        fail: bool,
    }

    impl WindowManager for FakeWindows {
        fn active_window_title(&mut self) -> Result<String, SampleError> {
            Ok(String::new())
        }

        fn bring_to_foreground(&mut self, title: &str) -> Result<(), ActivationError> {
            self.raised.push(title.to_string());
            if self.fail {
                Err(ActivationError::NotFound(title.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn controller(fail: bool) -> (Controller<FakeWindows>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let context = SkipperContext::new(notifier.clone());
        let windows = FakeWindows {
            fail,
            ..Default::default()
        };
        (Controller::new(context, windows, "Genshin Impact"), notifier)
    }

    #[test]
    fn test_initial_state_is_paused() {
        let (controller, _) = controller(false);
        assert_eq!(controller.state(), RunState::Paused);
    }

    #[test]
    fn test_start_raises_target_window() {
        let (mut controller, notifier) = controller(false);

        let transition = controller.handle(HotkeyAction::Start);
        assert_eq!(
            transition,
            Transition::Changed {
                from: RunState::Paused,
                to: RunState::Running
            }
        );
        assert_eq!(controller.windows.raised, vec!["Genshin Impact"]);
        assert_eq!(notifier.states(), vec![RunState::Running]);
    }

    #[test]
    fn test_activation_failure_is_not_fatal() {
        let (mut controller, _) = controller(true);
        controller.handle(HotkeyAction::Start);
        assert_eq!(controller.state(), RunState::Running);
    }

    #[test]
    fn test_exit_from_any_state() {
        for setup in [None, Some(HotkeyAction::Start), Some(HotkeyAction::Pause)] {
            let (mut controller, _) = controller(false);
            if let Some(action) = setup {
                controller.handle(action);
            }
            controller.handle(HotkeyAction::Exit);
            assert_eq!(controller.state(), RunState::Exiting);
        }
    }

    #[test]
    fn test_exiting_is_terminal() {
        let (mut controller, notifier) = controller(false);
        controller.handle(HotkeyAction::Exit);

        for action in [HotkeyAction::Start, HotkeyAction::Pause, HotkeyAction::Exit] {
            assert_eq!(controller.handle(action), Transition::Ignored);
            assert_eq!(controller.state(), RunState::Exiting);
        }
        assert_eq!(notifier.states(), vec![RunState::Exiting]);
    }

    #[test]
    fn test_request_exit_stops_controller() {
        let (mut controller, notifier) = controller(false);
        controller.handle(HotkeyAction::Start);

        assert!(controller.context().request_exit());
        assert!(controller.context().state.is_exiting());
        assert!(!controller.context().request_exit());

        assert_eq!(controller.handle(HotkeyAction::Start), Transition::Ignored);
        assert_eq!(notifier.states(), vec![RunState::Running, RunState::Exiting]);
    }

    #[test]
    fn test_help_still_shown_while_exiting() {
        let (mut controller, notifier) = controller(false);
        controller.handle(HotkeyAction::Exit);

        assert_eq!(controller.handle(HotkeyAction::Help), Transition::HelpShown);
        assert_eq!(controller.state(), RunState::Exiting);
        assert_eq!(notifier.help_requests(), 1);
        assert_eq!(notifier.states(), vec![RunState::Exiting]);
    }

    #[test]
    fn test_help_keeps_state() {
        let (mut controller, notifier) = controller(false);
        assert_eq!(controller.handle(HotkeyAction::Help), Transition::HelpShown);
        assert_eq!(controller.state(), RunState::Paused);
        assert_eq!(notifier.help_requests(), 1);
        assert!(notifier.states().is_empty());
    }

    #[test]
    fn test_repeated_pause_is_unchanged() {
        let (mut controller, notifier) = controller(false);
        assert_eq!(
            controller.handle(HotkeyAction::Pause),
            Transition::Unchanged(RunState::Paused)
        );
        assert_eq!(notifier.states(), vec![RunState::Paused]);
    }

    #[test]
    fn test_shared_state_refuses_to_leave_exiting() {
        let state = SharedRunState::default();
        assert_eq!(state.transition(RunState::Running), RunState::Paused);
        assert_eq!(state.transition(RunState::Exiting), RunState::Running);
        assert_eq!(state.transition(RunState::Paused), RunState::Exiting);
        assert!(state.is_exiting());
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(RunState::Running.label(), "ACTIVE");
        assert_eq!(RunState::Paused.to_string(), "PAUSED");
        assert_eq!(RunState::Exiting.label(), "CLOSING...");
    }
}

//! The action loop
//!
//! While running and the game has focus, every tick captures the screen,
//! samples the dialogue signals and clicks when dialogue can be advanced.
//! The cursor is moved to a random spot of the dialogue hit-box on an
//! irregular schedule between clicks.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::ThreadRng;
use rand::Rng;

use crate::config::TimingSettings;
use crate::control::{RunState, SkipperContext};
use crate::desktop::{Pointer, WindowManager};
use crate::stealth::{Humanizer, RepositionTimer};
use crate::vision::{PixelSource, SampleError, ScreenGeometry, SignalSampler, Signals};

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused; nothing sampled
    Paused,
    /// Exiting; the loop should stop
    Exiting,
    /// Another window has focus
    Unfocused,
    /// Screen read, nothing to advance
    Idle,
    /// Clicked, optionally after moving the cursor
    Clicked { repositioned: Option<(i32, i32)> },
    /// Screen or window query failed; retried next tick
    SampleFailed,
    /// The OS rejected the click
    ActuationFailed,
}

/// Counters reported when the loop stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub clicks: u64,
    pub repositions: u64,
    pub sample_failures: u64,
    pub actuation_failures: u64,
}

/// Collaborators and settings the loop is built from
pub struct LoopConfig {
    pub geometry: ScreenGeometry,
    pub target_window: String,
    pub timings: TimingSettings,
}

/// The automation heartbeat
pub struct ActionLoop<S, P, W, R = ThreadRng>
where
    S: PixelSource,
    P: Pointer,
    W: WindowManager,
    R: Rng,
{
    context: SkipperContext,
    sampler: SignalSampler,
    source: S,
    pointer: P,
    windows: W,
    humanizer: Humanizer<R>,
    timer: RepositionTimer,
    target_window: String,
    timings: TimingSettings,
    failure_streak: u32,
    stats: LoopStats,
}

impl<S, P, W, R> ActionLoop<S, P, W, R>
where
    S: PixelSource,
    P: Pointer,
    W: WindowManager,
    R: Rng,
{
    pub fn new(
        context: SkipperContext,
        config: LoopConfig,
        source: S,
        pointer: P,
        windows: W,
        mut humanizer: Humanizer<R>,
    ) -> Self {
        // due immediately so the first click lands inside the hit-box
        let timer = RepositionTimer::new(humanizer.reposition_interval());
        Self {
            context,
            sampler: SignalSampler::new(config.geometry),
            source,
            pointer,
            windows,
            humanizer,
            timer,
            target_window: config.target_window,
            timings: config.timings,
            failure_streak: 0,
            stats: LoopStats::default(),
        }
    }

    /// Replace the reposition timer
    pub fn with_timer(mut self, timer: RepositionTimer) -> Self {
        self.timer = timer;
        self
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn timer(&self) -> &RepositionTimer {
        &self.timer
    }

    pub fn pointer(&self) -> &P {
        &self.pointer
    }

    /// Run one iteration without sleeping
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        match self.context.state() {
            RunState::Paused => return TickOutcome::Paused,
            RunState::Exiting => return TickOutcome::Exiting,
            RunState::Running => {}
        }

        match self.windows.active_window_title() {
            Ok(title) if title == self.target_window => {}
            Ok(_) => return TickOutcome::Unfocused,
            Err(e) => return self.sample_failed(e),
        }

        let signals = match self.sample() {
            Ok(signals) => signals,
            Err(e) => return self.sample_failed(e),
        };
        self.failure_streak = 0;

        if !signals.should_click() {
            return TickOutcome::Idle;
        }

        // a pause may have landed while the screen was being read
        match self.context.state() {
            RunState::Running => {}
            RunState::Paused => return TickOutcome::Paused,
            RunState::Exiting => return TickOutcome::Exiting,
        }

        let repositioned = self.reposition(Instant::now());
        match self.pointer.click() {
            Ok(()) => {
                self.stats.clicks += 1;
                TickOutcome::Clicked { repositioned }
            }
            Err(e) => {
                self.stats.actuation_failures += 1;
                log::warn!("{}", e);
                TickOutcome::ActuationFailed
            }
        }
    }

    fn sample(&mut self) -> Result<Signals, SampleError> {
        let frame = self.source.capture()?;
        self.sampler.sample(&frame)
    }

    fn sample_failed(&mut self, error: SampleError) -> TickOutcome {
        self.stats.sample_failures += 1;
        if self.failure_streak == 0 {
            log::warn!("Skipping tick: {}", error);
        } else {
            log::debug!("Skipping tick ({} in a row): {}", self.failure_streak + 1, error);
        }
        self.failure_streak += 1;
        TickOutcome::SampleFailed
    }

    /// Move the cursor if a reposition is due.
    ///
    /// With repositioning disabled the cursor is parked at the hit-box
    /// center once and left there.
    fn reposition(&mut self, now: Instant) -> Option<(i32, i32)> {
        if !self.timer.is_due(now) {
            return None;
        }

        let hit_box = self.sampler.geometry().bottom_dialogue;
        let (x, y) = if self.humanizer.config().reposition_enabled {
            let point = self.humanizer.random_point(&hit_box);
            self.timer.reset(now, self.humanizer.reposition_interval());
            point
        } else {
            self.timer.reset(now, Duration::MAX);
            (
                hit_box.min_x + (hit_box.max_x - hit_box.min_x) / 2,
                hit_box.min_y + (hit_box.max_y - hit_box.min_y) / 2,
            )
        };

        match self.pointer.move_to(x, y) {
            Ok(()) => {
                self.stats.repositions += 1;
                log::debug!(
                    "Cursor moved to ({}, {}), next move in {:.1}s",
                    x,
                    y,
                    self.timer.interval().as_secs_f64()
                );
                Some((x, y))
            }
            Err(e) => {
                self.stats.actuation_failures += 1;
                log::warn!("{}", e);
                None
            }
        }
    }

    /// How long to sleep after an outcome
    fn backoff(&self, outcome: TickOutcome) -> Option<Duration> {
        let millis = match outcome {
            TickOutcome::Paused => self.timings.paused_poll_ms,
            TickOutcome::Unfocused => self.timings.unfocused_poll_ms,
            TickOutcome::SampleFailed => self.timings.error_backoff_ms,
            _ => return None,
        };
        Some(Duration::from_millis(millis))
    }

    /// Tick until the state becomes Exiting
    pub fn run(&mut self) -> LoopStats {
        log::debug!("Action loop started");
        loop {
            let outcome = self.tick();
            if outcome == TickOutcome::Exiting {
                break;
            }
            if let Some(delay) = self.backoff(outcome) {
                thread::sleep(delay);
            }
        }
        log::info!(
            "Action loop stopped after {} clicks ({} cursor moves)",
            self.stats.clicks,
            self.stats.repositions
        );
        self.stats
    }
}

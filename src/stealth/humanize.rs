//! Human behavior simulation for anti-detection
//!
//! Spreads cursor repositions over irregular intervals and random points so
//! the click stream does not look periodic.

use std::time::{Duration, Instant};

use rand::rngs::ThreadRng;
use rand::Rng;

use super::StealthConfig;
use crate::vision::HitBox;

/// Humanizer for generating irregular timing and positions
pub struct Humanizer<R: Rng = ThreadRng> {
    rng: R,
    config: StealthConfig,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new(StealthConfig::default())
    }
}

impl Humanizer {
    /// Create a new humanizer backed by the thread RNG
    pub fn new(config: StealthConfig) -> Self {
        Self::with_rng(rand::thread_rng(), config)
    }
}

impl<R: Rng> Humanizer<R> {
    /// Create a humanizer with an explicit RNG (seeded in tests)
    pub fn with_rng(rng: R, config: StealthConfig) -> Self {
        Self { rng, config }
    }

    /// Base interval in seconds.
    ///
    /// Usually drawn from the short range, with a one-in-`long_pause_odds`
    /// chance of the longer range instead.
    pub fn base_interval(&mut self) -> f64 {
        let [lo, hi] = if self.rng.gen_range(1..=self.config.long_pause_odds)
            == self.config.long_pause_odds
        {
            self.config.long_interval
        } else {
            self.config.base_interval
        };
        self.rng.gen_range(lo..hi)
    }

    /// Time until the next cursor reposition
    pub fn reposition_interval(&mut self) -> Duration {
        Duration::from_secs_f64(self.base_interval() * self.config.interval_scale)
    }

    /// Uniformly random point inside the hit-box, bounds included
    pub fn random_point(&mut self, hit_box: &HitBox) -> (i32, i32) {
        let x = self.rng.gen_range(hit_box.min_x..=hit_box.max_x);
        let y = self.rng.gen_range(hit_box.min_y..=hit_box.max_y);
        (x, y)
    }

    pub fn config(&self) -> &StealthConfig {
        &self.config
    }
}

/// Tracks when the cursor was last repositioned and when the next move is due
#[derive(Debug, Clone, Copy)]
pub struct RepositionTimer {
    last: Option<Instant>,
    interval: Duration,
}

impl RepositionTimer {
    /// A timer that is due immediately
    pub fn new(interval: Duration) -> Self {
        Self {
            last: None,
            interval,
        }
    }

    /// A timer that last fired at `at`
    pub fn fired_at(at: Instant, interval: Duration) -> Self {
        Self {
            last: Some(at),
            interval,
        }
    }

    /// More than the current interval has passed since the last reposition
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        }
    }

    /// Record a reposition and arm the next interval
    pub fn reset(&mut self, now: Instant, next_interval: Duration) {
        self.last = Some(now);
        self.interval = next_interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_fired(&self) -> Option<Instant> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(seed: u64) -> Humanizer<StdRng> {
        Humanizer::with_rng(StdRng::seed_from_u64(seed), StealthConfig::default())
    }

    #[test]
    fn test_interval_distribution() {
        let mut humanizer = seeded(7);
        let draws = 6000;
        let mut long = 0;

        for _ in 0..draws {
            let secs = humanizer.reposition_interval().as_secs_f64();
            assert!(secs > 0.0);
            assert!((0.12 * 40.0..0.2 * 40.0).contains(&secs));
            if secs >= 0.18 * 40.0 {
                long += 1;
            }
        }

        // 1/6 of draws come from the long range, 5/6 of the short range end
        // at 0.18 so every draw past it is a long one
        let expected = draws / 6;
        let tolerance = 150;
        assert!(
            (expected - tolerance..=expected + tolerance).contains(&long),
            "long draws: {long}"
        );
    }

    #[test]
    fn test_thread_rng_intervals_bounded() {
        let mut humanizer = Humanizer::default();
        for _ in 0..100 {
            let interval = humanizer.reposition_interval();
            assert!(interval >= Duration::from_secs_f64(4.8));
            assert!(interval < Duration::from_secs(8));
        }
    }

    #[test]
    fn test_random_point_inside_hit_box() {
        let mut humanizer = seeded(1);
        let hit_box = HitBox {
            min_x: 1300,
            max_x: 1700,
            min_y: 790,
            max_y: 800,
        };

        let mut seen_x = std::collections::HashSet::new();
        for _ in 0..500 {
            let (x, y) = humanizer.random_point(&hit_box);
            assert!(hit_box.contains(x, y));
            seen_x.insert(x);
        }
        assert!(seen_x.len() > 100);
    }

    #[test]
    fn test_degenerate_hit_box() {
        let mut humanizer = seeded(2);
        let hit_box = HitBox {
            min_x: 5,
            max_x: 5,
            min_y: 9,
            max_y: 9,
        };
        assert_eq!(humanizer.random_point(&hit_box), (5, 9));
    }

    #[test]
    fn test_new_timer_is_due() {
        let timer = RepositionTimer::new(Duration::from_secs(5));
        assert!(timer.is_due(Instant::now()));
        assert!(timer.last_fired().is_none());
    }

    #[test]
    fn test_timer_waits_for_interval() {
        let start = Instant::now();
        let mut timer = RepositionTimer::fired_at(start, Duration::from_secs(5));

        assert!(!timer.is_due(start));
        assert!(!timer.is_due(start + Duration::from_secs(5)));
        assert!(timer.is_due(start + Duration::from_millis(5001)));

        let later = start + Duration::from_secs(6);
        timer.reset(later, Duration::from_secs(7));
        assert_eq!(timer.interval(), Duration::from_secs(7));
        assert!(!timer.is_due(later + Duration::from_secs(6)));
    }

    #[test]
    fn test_stealth_config_defaults() {
        let config = StealthConfig::default();
        assert!(config.is_valid());
        assert!((config.min_period_secs() - 4.8).abs() < 1e-9);
        assert!((config.max_period_secs() - 8.0).abs() < 1e-9);
        assert!(!StealthConfig::disabled().reposition_enabled);
    }
}

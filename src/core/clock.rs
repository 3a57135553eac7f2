use std::time::Instant;

/// Elapsed-time source read once per animation frame.
///
/// The driver derives every time-based transform from total elapsed time,
/// never from per-frame deltas, so the trait exposes elapsed only. Tests
/// substitute a scripted implementation.
pub trait TimeSource {
    /// Seconds since the source started.
    fn elapsed(&self) -> f32;
}

/// Minimal monotonic clock - starts at construction
#[derive(Debug)]
pub struct Clock {
    started: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Restart the clock at the current time
    pub fn reset(&mut self) {
        self.started = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

/// Scripted time source for tests: reports exactly the instants pushed
/// into it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::cell::Cell<f32>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_to(&self, t: f32) {
        self.now.set(t);
    }
}

impl TimeSource for ManualClock {
    fn elapsed(&self) -> f32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn clock_elapsed_grows() {
        let clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        let first = clock.elapsed();

        thread::sleep(Duration::from_millis(10));
        let second = clock.elapsed();

        assert!(first >= 0.009);
        assert!(second > first);
    }

    #[test]
    fn clock_resets() {
        let mut clock = Clock::new();

        thread::sleep(Duration::from_millis(10));
        clock.reset();

        // Should be very small since we just reset
        assert!(clock.elapsed() < 0.005);
    }

    #[test]
    fn manual_clock_reports_scripted_time() {
        let clock = ManualClock::new();
        assert_eq!(clock.elapsed(), 0.0);

        clock.advance_to(1.5);
        assert_eq!(clock.elapsed(), 1.5);

        clock.advance_to(1.5);
        assert_eq!(clock.elapsed(), 1.5);
    }
}

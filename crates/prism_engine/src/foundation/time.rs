//! Time management utilities

use std::time::Instant;

/// Pausable frame clock.
///
/// A scene owns several of these (game, environment, camera) so that parts of
/// the world can be frozen independently: pausing the game clock stops physics
/// while the camera clock keeps advancing.
pub struct FrameClock {
    last_tick: Instant,
    current_time: f64,
    delta_time: f32,
    frame_count: u64,
    stopped: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new running clock at t = 0
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            current_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            stopped: false,
        }
    }

    /// Advance the clock; call exactly once per frame.
    ///
    /// Returns the new delta time in seconds. A stopped clock reports a zero
    /// delta and does not accumulate time.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        if self.stopped {
            self.delta_time = 0.0;
        } else {
            self.delta_time = now.duration_since(self.last_tick).as_secs_f32();
            self.current_time += f64::from(self.delta_time);
            self.frame_count += 1;
        }
        self.last_tick = now;
        self.delta_time
    }

    /// Freeze the clock; subsequent ticks report zero delta
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Resume a stopped clock
    pub fn start(&mut self) {
        self.stopped = false;
        self.last_tick = Instant::now();
    }

    /// Flip between stopped and running
    pub fn toggle(&mut self) {
        if self.stopped {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Whether the clock is currently frozen
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Accumulated running time in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Time advanced by the most recent tick, in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Number of ticks taken while running
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_tick_accumulates_time() {
        let mut clock = FrameClock::new();
        sleep(Duration::from_millis(5));
        let dt = clock.tick();
        assert!(dt > 0.0);
        assert!(clock.current_time() > 0.0);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_stopped_clock_reports_zero_delta() {
        let mut clock = FrameClock::new();
        clock.stop();
        sleep(Duration::from_millis(5));
        assert_eq!(clock.tick(), 0.0);
        assert_eq!(clock.current_time(), 0.0);
        assert_eq!(clock.frame_count(), 0);
    }

    #[test]
    fn test_resume_does_not_count_paused_time() {
        let mut clock = FrameClock::new();
        clock.stop();
        sleep(Duration::from_millis(20));
        clock.start();
        let dt = clock.tick();
        // The 20ms spent paused must not leak into the first running delta.
        assert!(dt < 0.015, "paused time leaked into delta: {dt}");
    }
}

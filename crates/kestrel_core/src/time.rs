//! Fixed-step simulation time
//!
//! Frames arrive with variable delta times; simulation advances in fixed
//! ticks. `FixedTimestep` turns the former into a count of the latter.

use std::time::Duration;

/// Default simulation tick rate (60 Hz = 16.666ms per tick)
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Default cap on fixed steps run for a single frame
pub const DEFAULT_MAX_SUBSTEPS: u32 = 10;

/// Accumulates frame time and releases it in fixed-size steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    max_substeps: u32,
    accumulator: Duration,
    dropped: Duration,
}

impl FixedTimestep {
    /// Zero arguments are clamped to one.
    pub fn new(tick_rate_hz: u32, max_substeps: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / tick_rate_hz.max(1),
            max_substeps: max_substeps.max(1),
            accumulator: Duration::ZERO,
            dropped: Duration::ZERO,
        }
    }

    /// Length of one fixed step.
    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    pub fn max_substeps(&self) -> u32 {
        self.max_substeps
    }

    /// Add a frame's delta time and return how many fixed steps to run.
    ///
    /// At most `max_substeps` are returned; time that would need more is
    /// discarded so a long stall does not snowball into later frames.
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.accumulator += frame_time;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            let remainder =
                Duration::from_nanos((self.accumulator.as_nanos() % self.step.as_nanos()) as u64);
            let excess = self.accumulator - remainder;
            self.dropped += excess;
            self.accumulator = remainder;
            tracing::warn!(
                dropped_ms = excess.as_secs_f64() * 1000.0,
                "frame exceeded {} substeps, dropping simulation time",
                self.max_substeps
            );
        }
        steps
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    /// Total time discarded by the substep cap.
    pub fn dropped(&self) -> Duration {
        self.dropped
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ, DEFAULT_MAX_SUBSTEPS)
    }
}

/// Simulation time tracker
#[derive(Debug, Clone)]
pub struct SimulationTime {
    tick_count: u64,
    tick_duration: Duration,
    accumulated_time: Duration,
}

impl SimulationTime {
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_count: 0,
            tick_duration,
            accumulated_time: Duration::ZERO,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance_tick(&mut self) {
        self.tick_count += 1;
        self.accumulated_time += self.tick_duration;
    }

    pub fn total_time(&self) -> Duration {
        self.accumulated_time
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::new(Duration::from_secs(1) / DEFAULT_TICK_RATE_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_frames() {
        let mut timestep = FixedTimestep::new(10, 5);
        assert_eq!(timestep.step(), Duration::from_millis(100));

        assert_eq!(timestep.advance(Duration::from_millis(60)), 0);
        assert_eq!(timestep.advance(Duration::from_millis(60)), 1);
        assert!((timestep.alpha() - 0.2).abs() < 1e-4);
        assert_eq!(timestep.advance(Duration::from_millis(290)), 3);
        assert_eq!(timestep.dropped(), Duration::ZERO);
    }

    #[test]
    fn caps_substeps_and_drops_excess() {
        let mut timestep = FixedTimestep::new(10, 2);
        assert_eq!(timestep.advance(Duration::from_millis(550)), 2);
        assert_eq!(timestep.dropped(), Duration::from_millis(300));
        // Only the sub-step remainder carries over.
        assert!((timestep.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(timestep.advance(Duration::from_millis(50)), 1);
    }

    #[test]
    fn zero_arguments_are_clamped() {
        let timestep = FixedTimestep::new(0, 0);
        assert_eq!(timestep.step(), Duration::from_secs(1));
        assert_eq!(timestep.max_substeps(), 1);
    }

    #[test]
    fn simulation_time_counts_ticks() {
        let mut time = SimulationTime::new(Duration::from_millis(20));
        for _ in 0..5 {
            time.advance_tick();
        }
        assert_eq!(time.tick_count(), 5);
        assert_eq!(time.total_time(), Duration::from_millis(100));
    }
}

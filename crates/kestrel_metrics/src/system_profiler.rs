//! Per-system timing with a rolling window of samples per name

use crate::ring_buffer::RingBuffer;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct SystemProfiler {
    window: usize,
    timings: HashMap<String, RingBuffer<Duration>>,
}

impl SystemProfiler {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            timings: HashMap::new(),
        }
    }

    pub fn time_system<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.record(name, start.elapsed());
        result
    }

    pub fn record(&mut self, name: &str, elapsed: Duration) {
        if let Some(samples) = self.timings.get_mut(name) {
            samples.push(elapsed);
            return;
        }
        let mut samples = RingBuffer::new(self.window);
        samples.push(elapsed);
        self.timings.insert(name.to_string(), samples);
    }

    /// Average over the window; zero for an unknown name.
    pub fn get_timing(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .map(|samples| samples.average())
            .unwrap_or(Duration::ZERO)
    }

    pub fn last_timing(&self, name: &str) -> Duration {
        self.timings
            .get(name)
            .and_then(|samples| samples.latest().copied())
            .unwrap_or(Duration::ZERO)
    }

    pub fn sample_count(&self, name: &str) -> usize {
        self.timings.get(name).map_or(0, RingBuffer::len)
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }

    /// Rolling averages, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Duration)> {
        self.timings
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.average()))
    }
}

impl Default for SystemProfiler {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_per_system() {
        let mut profiler = SystemProfiler::new(2);
        profiler.record("physics", Duration::from_millis(2));
        profiler.record("physics", Duration::from_millis(4));
        profiler.record("physics", Duration::from_millis(6));
        profiler.record("render", Duration::from_millis(1));

        assert_eq!(profiler.get_timing("physics"), Duration::from_millis(5));
        assert_eq!(profiler.last_timing("physics"), Duration::from_millis(6));
        assert_eq!(profiler.sample_count("physics"), 2);
        assert_eq!(profiler.get_timing("render"), Duration::from_millis(1));
        assert_eq!(profiler.get_timing("audio"), Duration::ZERO);
        assert_eq!(profiler.iter().count(), 2);
    }

    #[test]
    fn test_time_system_returns_result() {
        let mut profiler = SystemProfiler::default();
        let value = profiler.time_system("work", || 41 + 1);
        assert_eq!(value, 42);
        assert_eq!(profiler.sample_count("work"), 1);

        profiler.reset();
        assert_eq!(profiler.sample_count("work"), 0);
    }
}

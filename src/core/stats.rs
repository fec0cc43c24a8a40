//! Timing statistics for predictors.

use std::sync::Mutex;
use std::time::Duration;

/// Accumulated counters and phase timings for one predictor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceStats {
    /// Successful `predict` calls.
    pub calls: usize,
    /// Forward passes executed by successful calls.
    pub batches: usize,
    /// Samples processed by successful calls.
    pub samples: usize,
    /// Time spent validating and building input views, in milliseconds.
    pub preprocess_ms: f64,
    /// Time spent inside the model's forward pass, in milliseconds.
    pub forward_ms: f64,
    /// Time spent copying outputs, in milliseconds.
    pub postprocess_ms: f64,
    /// Wall time of successful calls, in milliseconds.
    pub total_ms: f64,
}

impl InferenceStats {
    /// Average wall time per call, or zero before the first call.
    pub fn average_call_ms(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.total_ms / self.calls as f64
        }
    }
}

/// Phase timings collected during a single call.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CallTimings {
    pub preprocess: Duration,
    pub forward: Duration,
    pub postprocess: Duration,
}

/// Thread-safe holder for [`InferenceStats`].
#[derive(Debug, Default)]
pub(crate) struct StatsManager {
    stats: Mutex<InferenceStats>,
}

impl StatsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a copy of the current statistics.
    pub fn get_stats(&self) -> InferenceStats {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Records one successful call.
    pub fn record(&self, batches: usize, samples: usize, timings: CallTimings, total: Duration) {
        let mut stats = self
            .stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        stats.calls += 1;
        stats.batches += batches;
        stats.samples += samples;
        stats.preprocess_ms += millis(timings.preprocess);
        stats.forward_ms += millis(timings.forward);
        stats.postprocess_ms += millis(timings.postprocess);
        stats.total_ms += millis(total);
    }

    /// Resets the statistics.
    pub fn reset_stats(&self) {
        let mut stats = self
            .stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stats = InferenceStats::default();
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let manager = StatsManager::new();
        let timings = CallTimings {
            preprocess: Duration::from_millis(1),
            forward: Duration::from_millis(10),
            postprocess: Duration::from_millis(2),
        };

        manager.record(2, 20, timings, Duration::from_millis(20));
        manager.record(1, 20, timings, Duration::from_millis(40));

        let stats = manager.get_stats();
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.samples, 40);
        assert!((stats.forward_ms - 20.0).abs() < 1e-9);
        assert!((stats.average_call_ms() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let manager = StatsManager::new();
        manager.record(1, 1, CallTimings::default(), Duration::from_millis(5));
        manager.reset_stats();
        assert_eq!(manager.get_stats(), InferenceStats::default());
        assert_eq!(manager.get_stats().average_call_ms(), 0.0);
    }
}

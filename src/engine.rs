use std::time::Instant;

use tracing::debug;

/// Aggregate trial statistics, in seconds (mean) and seconds² (variance),
/// matching the timing engine contract the runner consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchStats {
    pub mean: f64,
    pub variance: f64,
}

/// Repeated-trial timing engine. The harness only drives it one closure at
/// a time; it blocks until every trial for that closure has executed.
pub trait BenchEngine {
    fn bench(&self, name: &str, trial: &mut dyn FnMut()) -> BenchStats;
}

/// Fixed-count trial engine computing the sample mean and variance of
/// wall-clock trial durations. Deliberately does no warm-up detection or
/// confidence-interval work.
pub struct TrialEngine {
    trials: u32,
}

impl TrialEngine {
    pub fn new(trials: u32) -> Self {
        Self {
            trials: trials.max(1),
        }
    }
}

impl Default for TrialEngine {
    fn default() -> Self {
        Self::new(20)
    }
}

impl BenchEngine for TrialEngine {
    fn bench(&self, name: &str, trial: &mut dyn FnMut()) -> BenchStats {
        let mut samples = Vec::with_capacity(self.trials as usize);
        for _ in 0..self.trials {
            let start = Instant::now();
            trial();
            samples.push(start.elapsed().as_secs_f64());
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = if samples.len() > 1 {
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        debug!(
            benchmark = name,
            trials = samples.len(),
            mean_s = mean,
            "trials complete"
        );
        BenchStats { mean, variance }
    }
}

/// Engine stub returning canned statistics, for orchestration tests.
#[cfg(test)]
pub(crate) struct FixedStatsEngine {
    pub stats: BenchStats,
    pub invocations: std::cell::Cell<u32>,
}

#[cfg(test)]
impl FixedStatsEngine {
    pub fn new(mean: f64, variance: f64) -> Self {
        Self {
            stats: BenchStats { mean, variance },
            invocations: std::cell::Cell::new(0),
        }
    }
}

#[cfg(test)]
impl BenchEngine for FixedStatsEngine {
    fn bench(&self, _name: &str, trial: &mut dyn FnMut()) -> BenchStats {
        trial();
        self.invocations.set(self.invocations.get() + 1);
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_every_trial() {
        let engine = TrialEngine::new(7);
        let mut count = 0u32;
        let stats = engine.bench("counter", &mut || count += 1);
        assert_eq!(count, 7);
        assert!(stats.mean >= 0.0);
        assert!(stats.variance >= 0.0);
    }

    #[test]
    fn single_trial_has_zero_variance() {
        let engine = TrialEngine::new(1);
        let stats = engine.bench("single", &mut || {});
        assert_eq!(stats.variance, 0.0);
    }

    #[test]
    fn zero_trial_request_is_clamped() {
        let engine = TrialEngine::new(0);
        let mut count = 0u32;
        engine.bench("clamped", &mut || count += 1);
        assert_eq!(count, 1);
    }
}

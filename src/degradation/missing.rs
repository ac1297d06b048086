//! Missing-sample simulation
//! Location: src/degradation/missing.rs

use crate::signal::Sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a dropped sample is replaced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Dropout is drawn but the incoming sample is still delivered.
    /// Recordings made with this policy are unaffected by the missing rate.
    #[default]
    Passthrough,
    /// A dropped sample is replaced by the last delivered one
    HoldLast,
}

/// Dropout stage. Holds the last delivered sample for [`MissingPolicy::HoldLast`].
#[derive(Debug, Clone, Default)]
pub struct MissingStage {
    policy: MissingPolicy,
    last: Option<Sample>,
    dropped: u64,
}

impl MissingStage {
    pub fn new(policy: MissingPolicy) -> Self {
        Self {
            policy,
            last: None,
            dropped: 0,
        }
    }

    /// Apply dropout with probability `rate`.
    ///
    /// Non-positive rate is the identity and draws nothing from `rng`.
    pub fn apply<R: Rng + ?Sized>(&mut self, sample: Sample, rate: f64, rng: &mut R) -> Sample {
        if rate <= 0.0 {
            return sample;
        }

        let u: f64 = rng.gen();
        let delivered = if u < rate {
            self.dropped += 1;
            match self.policy {
                MissingPolicy::Passthrough => sample,
                MissingPolicy::HoldLast => self.last.unwrap_or(sample),
            }
        } else {
            sample
        };

        if self.policy == MissingPolicy::HoldLast {
            self.last = Some(delivered);
        }
        delivered
    }

    pub fn policy(&self) -> MissingPolicy {
        self.policy
    }

    /// Number of draws that fell under the missing rate
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.dropped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_passthrough_never_alters_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut stage = MissingStage::new(MissingPolicy::Passthrough);

        for i in 0..200 {
            let sample = Sample::new(i as f64, 40.0, 0.5);
            assert_eq!(stage.apply(sample, 1.0, &mut rng), sample);
        }
        assert_eq!(stage.dropped(), 200);
    }

    #[test]
    fn test_zero_rate_consumes_no_entropy() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let mut stage = MissingStage::default();

        stage.apply(Sample::default(), 0.0, &mut a);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }

    #[test]
    fn test_hold_last_repeats_previous_output() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut stage = MissingStage::new(MissingPolicy::HoldLast);

        let first = Sample::new(1.0, 1.0, 1.0);
        // No history yet, so the first dropped sample passes through
        assert_eq!(stage.apply(first, 1.0, &mut rng), first);
        assert_eq!(stage.apply(Sample::new(2.0, 2.0, 2.0), 1.0, &mut rng), first);
        assert_eq!(stage.apply(Sample::new(3.0, 3.0, 3.0), 1.0, &mut rng), first);
    }

    #[test]
    fn test_hold_last_reset() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut stage = MissingStage::new(MissingPolicy::HoldLast);
        stage.apply(Sample::new(1.0, 1.0, 1.0), 1.0, &mut rng);
        stage.reset();

        let next = Sample::new(5.0, 5.0, 5.0);
        assert_eq!(stage.apply(next, 1.0, &mut rng), next);
        assert_eq!(stage.dropped(), 1);
    }
}

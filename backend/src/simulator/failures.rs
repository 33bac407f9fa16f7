//! Pre-generated failure timestamps
//!
//! Each node gets its own strictly ascending list of failure instants, built
//! from cumulative draws until the horizon is passed. The simulator consumes
//! them in order; running past the last one is a run error.

use crate::distribution::FailureDistribution;
use crate::models::NodeId;
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;

/// Consecutive non-positive draws tolerated before giving up
const MAX_REJECTED_DRAWS: usize = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub struct FailureSchedule {
    timestamps: Vec<f64>,
    cursor: usize,
}

impl FailureSchedule {
    /// Draw failures for `node` until one lands at or beyond `horizon`
    ///
    /// Non-positive intervals (possible with Normal or wide Uniform moments) are
    /// redrawn so the list stays strictly ascending.
    pub fn generate(
        node: NodeId,
        distribution: &FailureDistribution,
        horizon: f64,
        rng: &mut RngManager,
    ) -> Result<Self, SimulationError> {
        let mut timestamps = Vec::new();
        let mut now = 0.0;
        let mut rejected = 0;

        while now < horizon {
            let interval = distribution.draw(rng);
            if !(interval > 0.0 && interval.is_finite()) {
                rejected += 1;
                if rejected >= MAX_REJECTED_DRAWS {
                    return Err(SimulationError::DegenerateFailureDraws {
                        node,
                        draws: rejected,
                    });
                }
                continue;
            }

            rejected = 0;
            now += interval;
            timestamps.push(now);
        }

        Ok(Self::from_timestamps(timestamps))
    }

    /// Schedule from explicit timestamps (must be ascending)
    pub fn from_timestamps(timestamps: Vec<f64>) -> Self {
        Self {
            timestamps,
            cursor: 0,
        }
    }

    /// Next unconsumed failure
    pub fn peek(&self) -> Option<f64> {
        self.timestamps.get(self.cursor).copied()
    }

    pub fn consume(&mut self) -> Option<f64> {
        let next = self.peek()?;
        self.cursor += 1;
        Some(next)
    }

    pub fn remaining(&self) -> usize {
        self.timestamps.len() - self.cursor
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DistributionKind;

    #[test]
    fn test_generated_schedule_passes_horizon() {
        let dist =
            FailureDistribution::configure(DistributionKind::Exponential, 100.0, 100.0).unwrap();
        let mut rng = RngManager::new(3);
        let schedule = FailureSchedule::generate(0, &dist, 10_000.0, &mut rng).unwrap();

        let ts = schedule.timestamps();
        assert!(ts.windows(2).all(|w| w[1] > w[0]), "must be strictly ascending");
        assert!(*ts.last().unwrap() >= 10_000.0);
        assert!(ts[..ts.len() - 1].iter().all(|t| *t < 10_000.0));
    }

    #[test]
    fn test_negative_normal_draws_skipped() {
        let dist = FailureDistribution::configure(DistributionKind::Normal, 1.0, 5.0).unwrap();
        let mut rng = RngManager::new(8);
        let schedule = FailureSchedule::generate(0, &dist, 500.0, &mut rng).unwrap();

        assert!(schedule.timestamps().windows(2).all(|w| w[1] > w[0]));
        assert!(schedule.timestamps()[0] > 0.0);
    }

    #[test]
    fn test_consume_advances_cursor() {
        let mut schedule = FailureSchedule::from_timestamps(vec![1.0, 2.0]);
        assert_eq!(schedule.consume(), Some(1.0));
        assert_eq!(schedule.peek(), Some(2.0));
        assert_eq!(schedule.remaining(), 1);
        assert_eq!(schedule.consume(), Some(2.0));
        assert_eq!(schedule.consume(), None);
    }
}

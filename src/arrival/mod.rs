//! Request arrival pacing
//!
//! The scheduler decides when each request becomes eligible for dispatch:
//! - **Burst**: all requests are released back-to-back with zero delay
//! - **PerSecond(λ)**: a Poisson arrival process; the gap before each
//!   subsequent release is drawn fresh from Exp(λ) (mean 1/λ seconds)

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use std::time::Duration;
use tokio::time::sleep;

/// Configured arrival rate for the benchmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrivalRate {
    /// Release every request immediately
    Burst,
    /// Poisson arrivals at λ requests per second
    PerSecond(f64),
}

impl ArrivalRate {
    /// Build from a requests-per-second value. Infinity means burst mode,
    /// matching `--request-rate inf` on the command line.
    pub fn from_rps(rps: f64) -> Result<Self> {
        if rps.is_infinite() && rps.is_sign_positive() {
            Ok(Self::Burst)
        } else if rps.is_finite() && rps > 0.0 {
            Ok(Self::PerSecond(rps))
        } else {
            Err(Error::Config(format!(
                "request rate must be positive or inf, got {rps}"
            )))
        }
    }
}

/// Paced release of requests according to an [`ArrivalRate`].
///
/// The scheduler is the only component that voluntarily idles: its sleep
/// between releases runs on the tokio timer, so already-dispatched request
/// tasks keep making progress while it waits. The driver calls [`pace`] after
/// launching each request, which also means no delay is applied before the
/// first one.
///
/// [`pace`]: ArrivalScheduler::pace
#[derive(Debug)]
pub struct ArrivalScheduler {
    interval: Option<Exp<f64>>,
    rng: StdRng,
}

impl ArrivalScheduler {
    pub fn new(rate: ArrivalRate, seed: u64) -> Result<Self> {
        let interval = match rate {
            ArrivalRate::Burst => None,
            ArrivalRate::PerSecond(rps) => Some(Exp::new(rps).map_err(|e| {
                Error::Config(format!("invalid request rate {rps}: {e}"))
            })?),
        };
        Ok(Self {
            interval,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Sample the gap before the next release. Zero in burst mode.
    pub fn next_delay(&mut self) -> Duration {
        match &self.interval {
            None => Duration::ZERO,
            Some(exp) => Duration::from_secs_f64(exp.sample(&mut self.rng)),
        }
    }

    /// Idle until the next request may be released.
    pub async fn pace(&mut self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_rps() {
        assert_eq!(ArrivalRate::from_rps(f64::INFINITY).unwrap(), ArrivalRate::Burst);
        assert_eq!(
            ArrivalRate::from_rps(2.5).unwrap(),
            ArrivalRate::PerSecond(2.5)
        );
        assert!(ArrivalRate::from_rps(0.0).is_err());
        assert!(ArrivalRate::from_rps(-1.0).is_err());
        assert!(ArrivalRate::from_rps(f64::NAN).is_err());
        assert!(ArrivalRate::from_rps(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_burst_gaps_are_zero() {
        let mut scheduler = ArrivalScheduler::new(ArrivalRate::Burst, 0).unwrap();
        for _ in 0..100 {
            assert_eq!(scheduler.next_delay(), Duration::ZERO);
        }
    }

    #[test]
    fn test_poisson_gap_mean_matches_rate() {
        let lambda = 100.0;
        let mut scheduler =
            ArrivalScheduler::new(ArrivalRate::PerSecond(lambda), 42).unwrap();

        let n = 5000;
        let total: f64 = (0..n)
            .map(|_| scheduler.next_delay().as_secs_f64())
            .sum();
        let mean = total / n as f64;

        // Empirical mean should sit near 1/λ; 10% is generous for 5000 draws.
        let expected = 1.0 / lambda;
        assert!(
            (mean - expected).abs() < expected * 0.1,
            "mean gap {mean} too far from {expected}"
        );
    }

    #[test]
    fn test_gaps_are_resampled_per_request() {
        let mut scheduler =
            ArrivalScheduler::new(ArrivalRate::PerSecond(10.0), 7).unwrap();
        let a = scheduler.next_delay();
        let b = scheduler.next_delay();
        let c = scheduler.next_delay();
        assert!(a != b || b != c, "independent draws should vary");
    }

    #[test]
    fn test_seeded_schedules_are_reproducible() {
        let sample = |seed| {
            let mut s = ArrivalScheduler::new(ArrivalRate::PerSecond(5.0), seed).unwrap();
            (0..10).map(|_| s.next_delay()).collect::<Vec<_>>()
        };
        assert_eq!(sample(3), sample(3));
        assert_ne!(sample(3), sample(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_pace_does_not_advance_time() {
        let mut scheduler = ArrivalScheduler::new(ArrivalRate::Burst, 0).unwrap();
        let before = tokio::time::Instant::now();
        for _ in 0..10 {
            scheduler.pace().await;
        }
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}

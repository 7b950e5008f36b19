//! Linear clock conversion between the tracer clock and system time
//!
//! A trace session records timestamps on the tracer's monotonic clock while
//! the architecture side speaks system time. The mapping between the two is
//! close enough to linear over a session that a degree-1 least-squares fit of
//! paired samples is sufficient: `convert(t) = a * t + b`.

use thiserror::Error;

/// Errors for clock conversion construction
#[derive(Error, Debug)]
pub enum ClockError {
    #[error("need at least two samples to fit a clock conversion, got {0}")]
    TooFewSamples(usize),

    #[error("sample series lengths differ: {from} vs {to}")]
    LengthMismatch { from: usize, to: usize },

    #[error("source samples are all identical, cannot fit a slope")]
    ConstantSeries,
}

pub type Result<T> = std::result::Result<T, ClockError>;

/// Fitted linear mapping from one clock to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockConverter {
    a: f64,
    b: f64,
}

impl ClockConverter {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Fit from paired timestamp samples by least squares
    pub fn from_series(times_from: &[f64], times_to: &[f64]) -> Result<Self> {
        if times_from.len() < 2 {
            return Err(ClockError::TooFewSamples(times_from.len()));
        }
        if times_from.len() != times_to.len() {
            return Err(ClockError::LengthMismatch {
                from: times_from.len(),
                to: times_to.len(),
            });
        }

        let n = times_from.len() as f64;
        let mean_from = times_from.iter().sum::<f64>() / n;
        let mean_to = times_to.iter().sum::<f64>() / n;
        let covariance: f64 = times_from
            .iter()
            .zip(times_to)
            .map(|(&x, &y)| (x - mean_from) * (y - mean_to))
            .sum();
        let variance: f64 = times_from.iter().map(|&x| (x - mean_from).powi(2)).sum();
        if variance == 0.0 {
            return Err(ClockError::ConstantSeries);
        }

        let a = covariance / variance;
        let b = mean_to - a * mean_from;
        Ok(Self { a, b })
    }

    pub fn convert(&self, time: f64) -> f64 {
        self.a * time + self.b
    }
}

//! Sine curve sample generation.
//!
//! One period of the curve is laid over one simulated day: sample `i` sits at
//! fraction `t_i` of `[0, period]` and is stamped `t_i * MS_PER_DAY` after start.

use std::f64::consts::PI;

use crate::error::HandlerError;
use crate::model::{DataPoint, SampleSeries, SAMPLES_PER_DAY};

pub const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Evenly spaced positions over `[0, period]`, both ends included.
fn sample_position(i: usize, period: f64) -> f64 {
    let last = SAMPLES_PER_DAY - 1;
    if i == last {
        period
    } else {
        i as f64 * (period / last as f64)
    }
}

pub struct SineGenerator {
    amplitude: f64,
    period: f64,
}

impl SineGenerator {
    pub fn new(amplitude: f64, period: f64) -> Self {
        Self { amplitude, period }
    }

    /// Value at position `t` on the curve.
    pub fn value_at(&self, t: f64) -> f64 {
        (2.0 * PI * t).sin() * self.amplitude
    }

    /// Build the full day of samples starting at `start_ms`.
    pub fn generate(&self, start_ms: i64) -> Result<SampleSeries, HandlerError> {
        if !self.amplitude.is_finite() {
            return Err(HandlerError::ComputationFailed(format!(
                "amplitude must be finite, got {}",
                self.amplitude
            )));
        }
        if !self.period.is_finite() {
            return Err(HandlerError::ComputationFailed(format!(
                "period must be finite, got {}",
                self.period
            )));
        }

        let mut points = Vec::with_capacity(SAMPLES_PER_DAY);
        for i in 0..SAMPLES_PER_DAY {
            let t = sample_position(i, self.period);
            let offset = (t * MS_PER_DAY).round();
            if offset.abs() >= i64::MAX as f64 {
                return Err(HandlerError::ComputationFailed(format!(
                    "timestamp offset {} out of range",
                    offset
                )));
            }
            let timestamp = start_ms.checked_add(offset as i64).ok_or_else(|| {
                HandlerError::ComputationFailed(format!(
                    "timestamp overflow at sample {} (start {} + {})",
                    i, start_ms, offset
                ))
            })?;

            points.push(DataPoint {
                timestamp,
                value: self.value_at(t),
            });
        }

        Ok(SampleSeries { start_ms, points })
    }
}

/// Convenience wrapper around [`SineGenerator::generate`].
pub fn generate_series(amplitude: f64, period: f64, start_ms: i64) -> Result<SampleSeries, HandlerError> {
    SineGenerator::new(amplitude, period).generate(start_ms)
}

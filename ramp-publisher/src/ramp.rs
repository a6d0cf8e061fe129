use std::time::Duration;

use crate::error::{PublishError, PublishResult};

/// Parameters of one thrust ramp.
#[derive(Debug, Clone, PartialEq)]
pub struct RampConfig {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// Pause after each ramp message.
    pub interval: Duration,
    /// Send a zero-thrust message before the ramp to release the thrust lock.
    pub unlock: bool,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            stop: 30.0,
            step: 2.0,
            interval: Duration::from_secs(1),
            unlock: false,
        }
    }
}

impl RampConfig {
    pub fn validate(&self) -> PublishResult<()> {
        if !self.start.is_finite() {
            return Err(PublishError::InvalidRamp(format!(
                "start must be finite, got {}",
                self.start
            )));
        }
        if !self.stop.is_finite() {
            return Err(PublishError::InvalidRamp(format!(
                "stop must be finite, got {}",
                self.stop
            )));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(PublishError::InvalidRamp(format!(
                "step must be a positive number, got {}",
                self.step
            )));
        }
        Ok(())
    }

    /// Thrust values of the ramp, in send order.
    pub fn plan(&self) -> PublishResult<RampPlan> {
        self.validate()?;
        Ok(RampPlan {
            start: self.start,
            step: self.step,
            bound: self.stop + self.step * STOP_TOLERANCE,
            index: 0,
        })
    }
}

/// Fraction of a step a value may exceed `stop` by and still count as reaching it.
const STOP_TOLERANCE: f64 = 1e-9;

/// Converts an interval given in seconds, rejecting negative and non-finite values.
pub fn interval_from_secs(secs: f64) -> PublishResult<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(PublishError::InvalidRamp(format!(
            "interval must be a non-negative number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        PublishError::InvalidRamp(format!("interval of {} seconds: {}", secs, e))
    })
}

/// Iterator over `start + i * step` while the value does not pass `stop`.
///
/// Each value is computed from the step counter, so no rounding error builds up
/// across iterations. A value within a billionth of a step above `stop` still
/// counts as `stop`, so fractional steps that divide the range reach it.
#[derive(Debug, Clone)]
pub struct RampPlan {
    start: f64,
    step: f64,
    bound: f64,
    index: u64,
}

impl Iterator for RampPlan {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let thrust = self.start + self.index as f64 * self.step;
        if thrust <= self.bound {
            self.index += 1;
            Some(thrust)
        } else {
            None
        }
    }
}

//! Single-variable Kalman smoothing.
//!
//! Constant model: state transition, observation and control are identity /
//! identity / zero, so the predicted estimate is always the previous one.

/// A scalar Kalman filter owning its own estimate and covariance.
#[derive(Debug, Clone)]
pub struct ScalarFilter {
    process_noise: f64,
    measurement_noise: f64,
    estimate: Option<f64>,
    covariance: f64,
}

impl ScalarFilter {
    /// Create an unseeded filter with fixed noise constants.
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            process_noise,
            measurement_noise,
            estimate: None,
            covariance: 0.0,
        }
    }

    /// Feed one measurement and return the new estimate.
    ///
    /// The first finite measurement seeds the state. Non-finite
    /// measurements are rejected and the prior estimate is returned
    /// unchanged (0.0 if the filter was never seeded).
    pub fn filter(&mut self, measurement: f64) -> f64 {
        if !measurement.is_finite() {
            tracing::trace!(measurement, "Rejected non-finite measurement");
            return self.estimate.unwrap_or(0.0);
        }

        let Some(previous) = self.estimate else {
            self.estimate = Some(measurement);
            self.covariance = self.measurement_noise;
            return measurement;
        };

        let predicted_cov = self.covariance + self.process_noise;
        let gain = predicted_cov / (predicted_cov + self.measurement_noise);
        let estimate = previous + gain * (measurement - previous);

        self.estimate = Some(estimate);
        self.covariance = (1.0 - gain) * predicted_cov;
        estimate
    }

    /// Current estimate, `None` before the first finite measurement.
    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }

    /// Current error covariance.
    pub fn covariance(&self) -> f64 {
        self.covariance
    }

    /// Forget all history; the next measurement seeds the filter again.
    pub fn reset(&mut self) {
        self.estimate = None;
        self.covariance = 0.0;
    }
}

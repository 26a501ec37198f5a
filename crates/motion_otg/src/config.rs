//! Generator configuration.

use jerk_profile::Synchronization;

use crate::{Error, Result};

/// Residual speed under which a finished trajectory counts as at rest
pub const DEFAULT_RESIDUAL_VELOCITY_THRESHOLD: f64 = 1e-3;

/// Tuning shared by the joint and Cartesian generators.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OtgConfig {
    /// Speed below which a finished trajectory sets the goal-reached flag.
    /// Above it the goal is re-issued at zero velocity.
    pub residual_velocity_threshold: f64,

    /// Axis coordination requested from the solver
    pub synchronization: Synchronization,
}

impl Default for OtgConfig {
    fn default() -> Self {
        Self {
            residual_velocity_threshold: DEFAULT_RESIDUAL_VELOCITY_THRESHOLD,
            synchronization: Synchronization::Phase,
        }
    }
}

impl OtgConfig {
    /// Set the residual velocity threshold
    pub fn with_residual_velocity_threshold(mut self, threshold: f64) -> Self {
        self.residual_velocity_threshold = threshold;
        self
    }

    /// Set the synchronization mode
    pub fn with_synchronization(mut self, synchronization: Synchronization) -> Self {
        self.synchronization = synchronization;
        self
    }

    /// Check the configuration before a generator uses it
    pub fn validate(&self) -> Result<()> {
        let threshold = self.residual_velocity_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "residual velocity threshold must be finite and positive, got {threshold}"
                ),
            });
        }
        Ok(())
    }
}

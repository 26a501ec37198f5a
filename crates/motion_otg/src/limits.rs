//! Argument checks shared by the generators.
//!
//! Every check runs before the generator touches its state, so a rejected
//! argument never leaves a partially applied vector behind.

use crate::{Error, Result};

/// Fail unless `actual` matches the generator's dimension
pub(crate) fn check_dimension(quantity: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidDimension {
            quantity,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Fail unless every component is strictly positive.
///
/// NaN is rejected, infinity is accepted.
pub(crate) fn check_positive(quantity: &'static str, values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !(*v > 0.0)) {
        Some(index) => Err(Error::NonPositiveLimit {
            quantity,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Fail unless the cycle time can drive a control loop
pub(crate) fn check_cycle_time(cycle_time: f64) -> Result<()> {
    if !(cycle_time.is_finite() && cycle_time > 0.0) {
        return Err(Error::InvalidConfiguration {
            message: format!("cycle time must be finite and positive, got {cycle_time}"),
        });
    }
    Ok(())
}

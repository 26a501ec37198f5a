//! # Jerk Profile
//!
//! Jerk-limited motion profiles for multi-axis systems, sampled once per
//! control cycle.
//!
//! ## Features
//!
//! - Time-optimal single-axis profiles bounded in velocity, acceleration and
//!   jerk (jerk limiting can be disabled with an infinite bound)
//! - Phase, time or no synchronization across axes
//! - A [`ProfileSolver`] trait so trajectory generators can run on any solver
//!
//! ## Example
//!
//! ```rust
//! use jerk_profile::{JerkLimitedSolver, ProfileInput, ProfileOutput, ProfileSolver, Progress};
//!
//! let mut solver = JerkLimitedSolver::new(2, 0.001).unwrap();
//! let mut input = ProfileInput::new(2);
//! input.max_velocity.fill(1.0);
//! input.max_acceleration.fill(2.0);
//! input.max_jerk.fill(10.0);
//! input.target_position[0] = 0.5;
//!
//! let mut output = ProfileOutput::new(2);
//! let progress = solver.update(&input, &mut output).unwrap();
//! assert_eq!(progress, Progress::Working);
//! ```

pub mod axis;
pub mod input;
pub mod solver;
pub mod trajectory;

pub use axis::{AxisLimits, AxisProfile, AxisState};
pub use input::{ProfileInput, ProfileOutput, Synchronization};
pub use solver::{JerkLimitedSolver, ProfileSolver, Progress};
pub use trajectory::Trajectory;

/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for profile computations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The solver cannot advance by this cycle time
    #[error("Cycle time must be finite and positive, got {0}")]
    InvalidCycleTime(f64),

    /// A vector does not match the solver's number of axes
    #[error("Expected {expected} values for {field}, got {actual}")]
    DimensionMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// NaN or infinite value where a finite one is required
    #[error("Non-finite value in {field} at index {index}")]
    NonFinite { field: &'static str, index: usize },

    /// Kinematic limit that is zero or negative
    #[error("Limit {field} must be positive, got {value} at index {index}")]
    InvalidLimit {
        field: &'static str,
        index: usize,
        value: f64,
    },

    /// Target velocity the velocity limit does not allow
    #[error("Target velocity {velocity} at index {index} exceeds the velocity limit {limit}")]
    TargetVelocityOutOfReach {
        index: usize,
        velocity: f64,
        limit: f64,
    },
}

//! # Motion OTG
//!
//! Online trajectory generators for robot control loops. Given the current
//! kinematic state and a goal, a generator produces one smooth,
//! jerk-limited sample per control cycle.
//!
//! ## Features
//!
//! - [`JointOtg`] for any number of joint coordinates
//! - [`CartesianOtg`] for a rigid body pose, with orientation handled
//!   through a moving [`TangentFrame`]
//! - Goal change detection and a goal-reached flag
//! - Generic over the [`ProfileSolver`] doing the actual profile computation
//!
//! ## Example
//!
//! ```rust
//! use motion_otg::{JointOtg, Progress};
//! use nalgebra::DVector;
//!
//! let mut otg = JointOtg::new(DVector::from_vec(vec![0.0, 0.2]), 0.001).unwrap();
//! otg.set_max_velocity_uniform(1.0).unwrap();
//! otg.set_max_acceleration_uniform(1.0).unwrap();
//! otg.set_max_jerk_uniform(5.0).unwrap();
//! otg.set_goal_position(&DVector::from_vec(vec![0.3, 0.0])).unwrap();
//!
//! // one update per control cycle
//! let progress = otg.update().unwrap();
//! assert_eq!(progress, Progress::Working);
//! let reference = otg.next_position();
//! # assert_eq!(reference.len(), 2);
//! ```

pub mod cartesian;
pub mod config;
pub mod goal;
pub mod joint;
mod limits;
pub mod tangent;

pub use cartesian::CartesianOtg;
pub use config::OtgConfig;
pub use joint::JointOtg;
pub use tangent::TangentFrame;

pub use jerk_profile::{JerkLimitedSolver, ProfileSolver, Progress, Synchronization};
pub use nalgebra::{DVector, Rotation3, Vector3};

/// Common result type for this library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for trajectory generation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Invalid generator configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Vector with the wrong number of components
    #[error("Expected {expected} values for {quantity}, got {actual}")]
    InvalidDimension {
        quantity: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Kinematic limit that is zero, negative or NaN
    #[error("{quantity} must be positive, got {value} at index {index}")]
    NonPositiveLimit {
        quantity: &'static str,
        index: usize,
        value: f64,
    },

    /// The profile solver could not compute the next sample
    #[error("Profile solver failed: {0}")]
    Solver(#[from] jerk_profile::Error),
}

impl Error {
    /// Whether the error comes from an argument rejected before any state
    /// changed
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Error::Solver(_))
    }
}

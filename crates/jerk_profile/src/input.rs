//! Per-cycle input and output of a profile solver.

use nalgebra::DVector;

use crate::{Error, Result};

/// How the axes of a multi-dimensional motion are coordinated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Synchronization {
    /// All axes move along one straight line and finish together. Falls back
    /// to [`Synchronization::Time`] when the current and target motion are not
    /// collinear.
    #[default]
    Phase,
    /// All axes finish at the same time.
    Time,
    /// Every axis runs its own time-optimal profile.
    None,
}

/// Current state, limits and target handed to a solver every cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileInput {
    pub current_position: DVector<f64>,
    pub current_velocity: DVector<f64>,
    pub current_acceleration: DVector<f64>,
    pub max_velocity: DVector<f64>,
    pub max_acceleration: DVector<f64>,
    pub max_jerk: DVector<f64>,
    pub target_position: DVector<f64>,
    pub target_velocity: DVector<f64>,
    pub synchronization: Synchronization,
}

impl ProfileInput {
    /// Zero state, zero target and unset (zero) limits
    pub fn new(dof: usize) -> Self {
        Self {
            current_position: DVector::zeros(dof),
            current_velocity: DVector::zeros(dof),
            current_acceleration: DVector::zeros(dof),
            max_velocity: DVector::zeros(dof),
            max_acceleration: DVector::zeros(dof),
            max_jerk: DVector::zeros(dof),
            target_position: DVector::zeros(dof),
            target_velocity: DVector::zeros(dof),
            synchronization: Synchronization::default(),
        }
    }

    /// Number of axes
    pub fn dof(&self) -> usize {
        self.current_position.len()
    }

    fn fields(&self) -> [(&'static str, &DVector<f64>); 8] {
        [
            ("current_position", &self.current_position),
            ("current_velocity", &self.current_velocity),
            ("current_acceleration", &self.current_acceleration),
            ("max_velocity", &self.max_velocity),
            ("max_acceleration", &self.max_acceleration),
            ("max_jerk", &self.max_jerk),
            ("target_position", &self.target_position),
            ("target_velocity", &self.target_velocity),
        ]
    }

    /// Check that the input describes a motion a solver of `dof` axes can plan
    pub fn validate(&self, dof: usize) -> Result<()> {
        for (field, values) in self.fields() {
            if values.len() != dof {
                return Err(Error::DimensionMismatch {
                    field,
                    expected: dof,
                    actual: values.len(),
                });
            }
            // an infinite jerk bound disables jerk limiting
            let allows_infinity = field == "max_jerk";
            if let Some(index) = values
                .iter()
                .position(|v| v.is_nan() || (v.is_infinite() && !allows_infinity))
            {
                return Err(Error::NonFinite { field, index });
            }
        }

        for (field, values) in [
            ("max_velocity", &self.max_velocity),
            ("max_acceleration", &self.max_acceleration),
            ("max_jerk", &self.max_jerk),
        ] {
            if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v <= 0.0) {
                return Err(Error::InvalidLimit {
                    field,
                    index,
                    value,
                });
            }
        }

        for (index, (&velocity, &limit)) in self
            .target_velocity
            .iter()
            .zip(self.max_velocity.iter())
            .enumerate()
        {
            if velocity.abs() > limit {
                return Err(Error::TargetVelocityOutOfReach {
                    index,
                    velocity,
                    limit,
                });
            }
        }

        Ok(())
    }
}

/// New state computed by a solver.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileOutput {
    pub new_position: DVector<f64>,
    pub new_velocity: DVector<f64>,
    pub new_acceleration: DVector<f64>,
    /// Time since the current trajectory was planned
    pub time: f64,
    /// Duration of the current trajectory
    pub duration: f64,
    /// Whether this cycle planned a new trajectory
    pub new_calculation: bool,
}

impl ProfileOutput {
    pub fn new(dof: usize) -> Self {
        Self {
            new_position: DVector::zeros(dof),
            new_velocity: DVector::zeros(dof),
            new_acceleration: DVector::zeros(dof),
            time: 0.0,
            duration: 0.0,
            new_calculation: false,
        }
    }

    /// Make the new state the current state of `input`
    pub fn pass_to_input(&self, input: &mut ProfileInput) {
        input.current_position.copy_from(&self.new_position);
        input.current_velocity.copy_from(&self.new_velocity);
        input.current_acceleration.copy_from(&self.new_acceleration);
    }
}

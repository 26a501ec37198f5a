//! Solvers producing one trajectory sample per control cycle.

use tracing::debug;

use crate::input::{ProfileInput, ProfileOutput};
use crate::trajectory::Trajectory;
use crate::{Error, Result};

/// Outcome of one successful solver cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Progress {
    /// The trajectory is still running.
    Working,
    /// The target state has been reached.
    Finished,
}

/// A jerk-limited trajectory solver advanced once per control cycle.
///
/// Implementations own whatever per-trajectory state they need, so every
/// generator owns its own solver.
pub trait ProfileSolver {
    /// Number of axes the solver was built for
    fn dof(&self) -> usize;

    /// Seconds advanced by every call to [`ProfileSolver::update`]
    fn cycle_time(&self) -> f64;

    /// Compute the state one cycle ahead of `input` and write it to `output`.
    ///
    /// On error `output` is left untouched.
    fn update(&mut self, input: &ProfileInput, output: &mut ProfileOutput) -> Result<Progress>;

    /// Forget any trajectory computed so far
    fn reset(&mut self) {}
}

#[derive(Clone, Debug)]
struct Planned {
    trajectory: Trajectory,
    /// Input that continues the trajectory on the next cycle
    expected: ProfileInput,
    time: f64,
}

/// Time-optimal jerk-limited solver with trajectory caching.
///
/// A trajectory is planned whenever the input differs from the one the
/// previous cycle handed back through [`ProfileOutput::pass_to_input`];
/// otherwise the cached trajectory advances by one cycle.
///
/// # Example
/// ```rust
/// use jerk_profile::{JerkLimitedSolver, ProfileInput, ProfileOutput, ProfileSolver, Progress};
/// use nalgebra::DVector;
///
/// let mut solver = JerkLimitedSolver::new(1, 0.001).unwrap();
/// let mut input = ProfileInput::new(1);
/// input.max_velocity.fill(1.0);
/// input.max_acceleration.fill(1.0);
/// input.max_jerk.fill(1.0);
/// input.target_position = DVector::from_element(1, 1.0);
///
/// let mut output = ProfileOutput::new(1);
/// while solver.update(&input, &mut output).unwrap() == Progress::Working {
///     output.pass_to_input(&mut input);
/// }
/// assert_eq!(output.new_position[0], 1.0);
/// ```
#[derive(Clone, Debug)]
pub struct JerkLimitedSolver {
    dof: usize,
    cycle_time: f64,
    planned: Option<Planned>,
}

impl JerkLimitedSolver {
    /// Create a solver for `dof` axes advancing `cycle_time` seconds per update
    pub fn new(dof: usize, cycle_time: f64) -> Result<Self> {
        if !(cycle_time.is_finite() && cycle_time > 0.0) {
            return Err(Error::InvalidCycleTime(cycle_time));
        }
        Ok(Self {
            dof,
            cycle_time,
            planned: None,
        })
    }

    /// The trajectory currently being followed, if any
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.planned.as_ref().map(|planned| &planned.trajectory)
    }
}

impl ProfileSolver for JerkLimitedSolver {
    fn dof(&self) -> usize {
        self.dof
    }

    fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    fn update(&mut self, input: &ProfileInput, output: &mut ProfileOutput) -> Result<Progress> {
        input.validate(self.dof)?;
        if output.new_position.len() != self.dof
            || output.new_velocity.len() != self.dof
            || output.new_acceleration.len() != self.dof
        {
            return Err(Error::DimensionMismatch {
                field: "output",
                expected: self.dof,
                actual: output.new_position.len(),
            });
        }

        let (mut planned, new_calculation) = match self.planned.take() {
            Some(mut planned) if planned.expected == *input => {
                planned.time += self.cycle_time;
                (planned, false)
            }
            _ => {
                let trajectory = Trajectory::plan(input);
                debug!(
                    dof = self.dof,
                    duration = trajectory.duration(),
                    phase_synchronized = trajectory.is_phase_synchronized(),
                    "Planned trajectory"
                );
                let planned = Planned {
                    trajectory,
                    expected: input.clone(),
                    time: self.cycle_time,
                };
                (planned, true)
            }
        };

        planned.trajectory.state_at(
            planned.time,
            &mut output.new_position,
            &mut output.new_velocity,
            &mut output.new_acceleration,
        );
        output.time = planned.time;
        output.duration = planned.trajectory.duration();
        output.new_calculation = new_calculation;

        planned.expected.clone_from(input);
        output.pass_to_input(&mut planned.expected);

        let progress = if planned.time >= planned.trajectory.duration() {
            Progress::Finished
        } else {
            Progress::Working
        };
        self.planned = Some(planned);

        Ok(progress)
    }

    fn reset(&mut self) {
        self.planned = None;
    }
}

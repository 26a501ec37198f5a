use jerk_profile::{JerkLimitedSolver, ProfileInput, ProfileOutput, ProfileSolver, Progress};
use nalgebra::DVector;
use tracing::{debug, error, warn};

use crate::config::OtgConfig;
use crate::goal::{self, Settle};
use crate::limits::{check_cycle_time, check_dimension, check_positive};
use crate::Result;

/// Online trajectory generator for a vector of joint coordinates
///
/// Produces one jerk-limited sample per control cycle toward the current
/// goal, with all joints phase-synchronized so they arrive together.
#[derive(Clone, Debug)]
pub struct JointOtg<S = JerkLimitedSolver> {
    /// Number of joints
    dof: usize,

    /// Solver owned by this generator, sized to `dof`
    solver: S,

    /// State, limits and goal handed to the solver every cycle
    input: ProfileInput,

    /// Latest sample
    output: ProfileOutput,

    config: OtgConfig,

    goal_reached: bool,
}

impl JointOtg {
    /// Create a generator at rest at `initial_position`
    ///
    /// # Arguments
    /// * `initial_position` - Joint positions; their count fixes the dimension
    /// * `cycle_time` - Duration of one control cycle in seconds
    ///
    /// # Example
    /// ```rust
    /// use motion_otg::JointOtg;
    /// use nalgebra::DVector;
    ///
    /// let mut otg = JointOtg::new(DVector::zeros(2), 0.001).unwrap();
    /// otg.set_max_velocity_uniform(1.0).unwrap();
    /// otg.set_max_acceleration_uniform(2.0).unwrap();
    /// otg.set_max_jerk_uniform(10.0).unwrap();
    /// otg.set_goal_position(&DVector::from_vec(vec![0.5, -0.5])).unwrap();
    ///
    /// while !otg.is_goal_reached() {
    ///     otg.update().unwrap();
    /// }
    /// assert_eq!(otg.next_position()[0], 0.5);
    /// ```
    pub fn new(initial_position: DVector<f64>, cycle_time: f64) -> Result<Self> {
        Self::with_config(initial_position, cycle_time, OtgConfig::default())
    }

    /// Create a generator with a custom configuration
    pub fn with_config(
        initial_position: DVector<f64>,
        cycle_time: f64,
        config: OtgConfig,
    ) -> Result<Self> {
        check_cycle_time(cycle_time)?;
        let solver = JerkLimitedSolver::new(initial_position.len(), cycle_time)?;
        Self::with_solver(initial_position, solver, config)
    }
}

impl<S: ProfileSolver> JointOtg<S> {
    /// Create a generator driving its own `solver`
    ///
    /// The solver must be sized to the number of joints.
    pub fn with_solver(initial_position: DVector<f64>, solver: S, config: OtgConfig) -> Result<Self> {
        config.validate()?;
        let dof = initial_position.len();
        check_dimension("profile solver", dof, solver.dof())?;

        let mut input = ProfileInput::new(dof);
        input.synchronization = config.synchronization;

        let mut otg = Self {
            dof,
            solver,
            input,
            output: ProfileOutput::new(dof),
            config,
            goal_reached: false,
        };
        otg.reinitialize(&initial_position)?;
        Ok(otg)
    }

    /// Restart at rest at `position`, dropping the current goal
    pub fn reinitialize(&mut self, position: &DVector<f64>) -> Result<()> {
        check_dimension("initial position", self.dof, position.len())?;

        self.output.new_position.copy_from(position);
        self.output.new_velocity.fill(0.0);
        self.output.new_acceleration.fill(0.0);
        self.output.pass_to_input(&mut self.input);

        self.input.target_position.copy_from(position);
        self.input.target_velocity.fill(0.0);
        self.goal_reached = false;
        self.solver.reset();

        debug!(dof = self.dof, "Reinitialized joint trajectory generator");
        Ok(())
    }

    /// Set the maximum velocity of every joint
    pub fn set_max_velocity(&mut self, max_velocity: &DVector<f64>) -> Result<()> {
        check_dimension("max velocity", self.dof, max_velocity.len())?;
        check_positive("max velocity", max_velocity.as_slice())?;
        self.input.max_velocity.copy_from(max_velocity);
        Ok(())
    }

    /// Set the same maximum velocity for all joints
    pub fn set_max_velocity_uniform(&mut self, max_velocity: f64) -> Result<()> {
        self.set_max_velocity(&DVector::from_element(self.dof, max_velocity))
    }

    /// Set the maximum acceleration of every joint
    pub fn set_max_acceleration(&mut self, max_acceleration: &DVector<f64>) -> Result<()> {
        check_dimension("max acceleration", self.dof, max_acceleration.len())?;
        check_positive("max acceleration", max_acceleration.as_slice())?;
        self.input.max_acceleration.copy_from(max_acceleration);
        Ok(())
    }

    /// Set the same maximum acceleration for all joints
    pub fn set_max_acceleration_uniform(&mut self, max_acceleration: f64) -> Result<()> {
        self.set_max_acceleration(&DVector::from_element(self.dof, max_acceleration))
    }

    /// Set the maximum jerk of every joint, enabling jerk limits
    pub fn set_max_jerk(&mut self, max_jerk: &DVector<f64>) -> Result<()> {
        check_dimension("max jerk", self.dof, max_jerk.len())?;
        check_positive("max jerk", max_jerk.as_slice())?;
        self.input.max_jerk.copy_from(max_jerk);
        Ok(())
    }

    /// Set the same maximum jerk for all joints
    pub fn set_max_jerk_uniform(&mut self, max_jerk: f64) -> Result<()> {
        self.set_max_jerk(&DVector::from_element(self.dof, max_jerk))
    }

    /// Remove the jerk bound.
    ///
    /// Without a jerk bound the trajectory has to start from zero
    /// acceleration, so the current acceleration is reset.
    pub fn disable_jerk_limits(&mut self) {
        self.input.max_jerk.fill(f64::INFINITY);
        self.input.current_acceleration.fill(0.0);
        self.output.new_acceleration.fill(0.0);
    }

    /// Set the goal position and the velocity to have when reaching it
    ///
    /// A goal equal to the current one is ignored and keeps the
    /// goal-reached flag as it is.
    pub fn set_goal_position_and_velocity(
        &mut self,
        goal_position: &DVector<f64>,
        goal_velocity: &DVector<f64>,
    ) -> Result<()> {
        check_dimension("goal position", self.dof, goal_position.len())?;
        check_dimension("goal velocity", self.dof, goal_velocity.len())?;

        if goal::same_goal(self.input.target_position.as_slice(), goal_position.as_slice())
            && goal::same_goal(self.input.target_velocity.as_slice(), goal_velocity.as_slice())
        {
            return Ok(());
        }

        self.goal_reached = false;
        self.input.target_position.copy_from(goal_position);
        self.input.target_velocity.copy_from(goal_velocity);
        debug!(
            goal_position = ?goal_position.as_slice(),
            goal_velocity = ?goal_velocity.as_slice(),
            "New joint goal"
        );
        Ok(())
    }

    /// Set the goal position, to be reached at rest
    pub fn set_goal_position(&mut self, goal_position: &DVector<f64>) -> Result<()> {
        self.set_goal_position_and_velocity(goal_position, &DVector::zeros(self.dof))
    }

    /// Compute the next sample. Call exactly once per control cycle.
    ///
    /// # Errors
    /// Returns [`crate::Error::Solver`] if the solver rejects the current state,
    /// limits or goal; the previous sample is kept.
    pub fn update(&mut self) -> Result<Progress> {
        let progress = self
            .solver
            .update(&self.input, &mut self.output)
            .inspect_err(|source| error!(%source, "Joint trajectory update failed"))?;
        self.output.pass_to_input(&mut self.input);

        let speed = self.output.new_velocity.norm();
        match goal::settle(progress, speed, self.config.residual_velocity_threshold) {
            Settle::Reached => {
                if !self.goal_reached {
                    debug!("Joint goal reached");
                }
                self.goal_reached = true;
            }
            Settle::Residual => {
                warn!(speed, "Joint trajectory finished while moving, stopping at the goal");
                self.input.target_velocity.fill(0.0);
            }
            Settle::Moving => {}
        }

        Ok(progress)
    }

    /// Whether the goal has been reached at rest
    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// Position of the latest sample
    pub fn next_position(&self) -> &DVector<f64> {
        &self.output.new_position
    }

    /// Velocity of the latest sample
    pub fn next_velocity(&self) -> &DVector<f64> {
        &self.output.new_velocity
    }

    /// Acceleration of the latest sample
    pub fn next_acceleration(&self) -> &DVector<f64> {
        &self.output.new_acceleration
    }

    /// Number of joints
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Seconds between two updates
    pub fn cycle_time(&self) -> f64 {
        self.solver.cycle_time()
    }

    pub fn max_velocity(&self) -> &DVector<f64> {
        &self.input.max_velocity
    }

    pub fn max_acceleration(&self) -> &DVector<f64> {
        &self.input.max_acceleration
    }

    pub fn max_jerk(&self) -> &DVector<f64> {
        &self.input.max_jerk
    }

    pub fn goal_position(&self) -> &DVector<f64> {
        &self.input.target_position
    }

    pub fn goal_velocity(&self) -> &DVector<f64> {
        &self.input.target_velocity
    }

    pub fn config(&self) -> &OtgConfig {
        &self.config
    }
}

impl<S: ProfileSolver> std::fmt::Display for JointOtg<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "JointOtg (dof: {}, cycle: {} s, goal reached: {})",
            self.dof,
            self.cycle_time(),
            self.goal_reached
        )
    }
}

use jerk_profile::{JerkLimitedSolver, ProfileInput, ProfileOutput, ProfileSolver, Progress};
use nalgebra::{DVector, Rotation3, UnitQuaternion, Vector3};
use tracing::{debug, error, warn};

use crate::config::OtgConfig;
use crate::goal::{self, Settle};
use crate::limits::{check_cycle_time, check_dimension, check_positive};
use crate::tangent::TangentFrame;
use crate::Result;

/// Solver dimension of a pose: 3 linear then 3 angular coordinates
const POSE_DOF: usize = 6;
const LINEAR: usize = 0;
const ANGULAR: usize = 3;

fn part(v: &DVector<f64>, start: usize) -> Vector3<f64> {
    v.fixed_rows::<3>(start).clone_owned()
}

fn set_part(v: &mut DVector<f64>, start: usize, value: &Vector3<f64>) {
    v.fixed_rows_mut::<3>(start).copy_from(value);
}

/// Online trajectory generator for a rigid body pose
///
/// Position and orientation are solved as one 6-dimensional state so linear
/// and angular motion start and finish together. The angular half of that
/// state is a rotation vector relative to a [`TangentFrame`]. The frame is
/// moved onto the current orientation whenever a new goal starts a new plan,
/// so the offsets the solver sees never exceed the rotation to the goal. It
/// stays put while a plan runs, which lets the solver keep its cached
/// trajectory from one cycle to the next.
#[derive(Clone, Debug)]
pub struct CartesianOtg<S = JerkLimitedSolver> {
    solver: S,

    /// Linear half in the base frame, angular half in `frame`
    input: ProfileInput,
    output: ProfileOutput,

    /// Origin of the angular coordinates
    frame: TangentFrame,
    /// Move `frame` onto the current orientation before the next plan
    reanchor: bool,

    goal_orientation: UnitQuaternion<f64>,
    /// Base frame
    goal_angular_velocity: Vector3<f64>,

    /// Base frame
    angular_velocity: Vector3<f64>,
    /// Base frame
    angular_acceleration: Vector3<f64>,

    config: OtgConfig,
    goal_reached: bool,
}

impl CartesianOtg {
    /// Create a generator at rest at the given pose
    ///
    /// # Example
    /// ```rust
    /// use motion_otg::CartesianOtg;
    /// use nalgebra::{Rotation3, Vector3};
    ///
    /// let mut otg = CartesianOtg::new(Vector3::zeros(), Rotation3::identity(), 0.001).unwrap();
    /// otg.set_max_linear_velocity_uniform(0.5).unwrap();
    /// otg.set_max_linear_acceleration_uniform(1.0).unwrap();
    /// otg.set_max_angular_velocity_uniform(1.0).unwrap();
    /// otg.set_max_angular_acceleration_uniform(2.0).unwrap();
    /// otg.set_max_jerk_uniform(10.0, 10.0).unwrap();
    ///
    /// otg.set_goal_position(&Vector3::new(0.1, 0.0, 0.0)).unwrap();
    /// otg.set_goal_orientation(&Rotation3::from_euler_angles(0.0, 0.0, 0.5)).unwrap();
    /// while !otg.is_goal_reached() {
    ///     otg.update().unwrap();
    /// }
    /// ```
    pub fn new(
        initial_position: Vector3<f64>,
        initial_orientation: Rotation3<f64>,
        cycle_time: f64,
    ) -> Result<Self> {
        Self::with_config(
            initial_position,
            initial_orientation,
            cycle_time,
            OtgConfig::default(),
        )
    }

    /// Create a generator with a custom configuration
    pub fn with_config(
        initial_position: Vector3<f64>,
        initial_orientation: Rotation3<f64>,
        cycle_time: f64,
        config: OtgConfig,
    ) -> Result<Self> {
        check_cycle_time(cycle_time)?;
        let solver = JerkLimitedSolver::new(POSE_DOF, cycle_time)?;
        Self::with_solver(initial_position, initial_orientation, solver, config)
    }
}

impl<S: ProfileSolver> CartesianOtg<S> {
    /// Create a generator driving its own 6-dimensional `solver`
    pub fn with_solver(
        initial_position: Vector3<f64>,
        initial_orientation: Rotation3<f64>,
        solver: S,
        config: OtgConfig,
    ) -> Result<Self> {
        config.validate()?;
        check_dimension("profile solver", POSE_DOF, solver.dof())?;

        let mut input = ProfileInput::new(POSE_DOF);
        input.synchronization = config.synchronization;

        let mut otg = Self {
            solver,
            input,
            output: ProfileOutput::new(POSE_DOF),
            frame: TangentFrame::default(),
            reanchor: false,
            goal_orientation: UnitQuaternion::identity(),
            goal_angular_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
            config,
            goal_reached: false,
        };
        otg.reinitialize(&initial_position, &initial_orientation);
        Ok(otg)
    }

    /// Restart at rest at the given pose, dropping the current goal
    pub fn reinitialize(&mut self, position: &Vector3<f64>, orientation: &Rotation3<f64>) {
        self.frame = TangentFrame::from_rotation(orientation);
        self.reanchor = false;

        self.output.new_position.fill(0.0);
        set_part(&mut self.output.new_position, LINEAR, position);
        self.output.new_velocity.fill(0.0);
        self.output.new_acceleration.fill(0.0);
        self.output.pass_to_input(&mut self.input);
        self.angular_velocity = Vector3::zeros();
        self.angular_acceleration = Vector3::zeros();

        self.input.target_position.copy_from(&self.input.current_position);
        self.input.target_velocity.fill(0.0);
        self.goal_orientation = *self.frame.reference();
        self.goal_angular_velocity = Vector3::zeros();

        self.goal_reached = false;
        self.solver.reset();
        debug!("Reinitialized Cartesian trajectory generator");
    }

    fn set_limit(
        limit: &mut DVector<f64>,
        start: usize,
        quantity: &'static str,
        value: &Vector3<f64>,
    ) -> Result<()> {
        check_positive(quantity, value.as_slice())?;
        set_part(limit, start, value);
        Ok(())
    }

    pub fn set_max_linear_velocity(&mut self, max_velocity: &Vector3<f64>) -> Result<()> {
        Self::set_limit(&mut self.input.max_velocity, LINEAR, "max linear velocity", max_velocity)
    }

    pub fn set_max_linear_velocity_uniform(&mut self, max_velocity: f64) -> Result<()> {
        self.set_max_linear_velocity(&Vector3::repeat(max_velocity))
    }

    pub fn set_max_linear_acceleration(&mut self, max_acceleration: &Vector3<f64>) -> Result<()> {
        Self::set_limit(
            &mut self.input.max_acceleration,
            LINEAR,
            "max linear acceleration",
            max_acceleration,
        )
    }

    pub fn set_max_linear_acceleration_uniform(&mut self, max_acceleration: f64) -> Result<()> {
        self.set_max_linear_acceleration(&Vector3::repeat(max_acceleration))
    }

    pub fn set_max_angular_velocity(&mut self, max_velocity: &Vector3<f64>) -> Result<()> {
        Self::set_limit(&mut self.input.max_velocity, ANGULAR, "max angular velocity", max_velocity)
    }

    pub fn set_max_angular_velocity_uniform(&mut self, max_velocity: f64) -> Result<()> {
        self.set_max_angular_velocity(&Vector3::repeat(max_velocity))
    }

    pub fn set_max_angular_acceleration(&mut self, max_acceleration: &Vector3<f64>) -> Result<()> {
        Self::set_limit(
            &mut self.input.max_acceleration,
            ANGULAR,
            "max angular acceleration",
            max_acceleration,
        )
    }

    pub fn set_max_angular_acceleration_uniform(&mut self, max_acceleration: f64) -> Result<()> {
        self.set_max_angular_acceleration(&Vector3::repeat(max_acceleration))
    }

    /// Set the linear and angular jerk bounds, enabling jerk limits
    ///
    /// Both are checked before either is applied.
    pub fn set_max_jerk(&mut self, linear: &Vector3<f64>, angular: &Vector3<f64>) -> Result<()> {
        check_positive("max linear jerk", linear.as_slice())?;
        check_positive("max angular jerk", angular.as_slice())?;
        set_part(&mut self.input.max_jerk, LINEAR, linear);
        set_part(&mut self.input.max_jerk, ANGULAR, angular);
        Ok(())
    }

    pub fn set_max_jerk_uniform(&mut self, linear: f64, angular: f64) -> Result<()> {
        self.set_max_jerk(&Vector3::repeat(linear), &Vector3::repeat(angular))
    }

    /// Remove the jerk bound and reset the current acceleration
    pub fn disable_jerk_limits(&mut self) {
        self.input.max_jerk.fill(f64::INFINITY);
        self.input.current_acceleration.fill(0.0);
        self.output.new_acceleration.fill(0.0);
        self.angular_acceleration = Vector3::zeros();
    }

    /// Set the goal position and the linear velocity to have when reaching it
    ///
    /// A goal equal to the current one is ignored.
    pub fn set_goal_position_and_linear_velocity(
        &mut self,
        goal_position: &Vector3<f64>,
        goal_linear_velocity: &Vector3<f64>,
    ) -> Result<()> {
        let same_position = goal::same_goal(
            self.goal_position().as_slice(),
            goal_position.as_slice(),
        );
        let same_velocity = goal::same_goal(
            self.goal_linear_velocity().as_slice(),
            goal_linear_velocity.as_slice(),
        );
        if same_position && same_velocity {
            return Ok(());
        }

        self.goal_reached = false;
        self.reanchor = true;
        set_part(&mut self.input.target_position, LINEAR, goal_position);
        set_part(&mut self.input.target_velocity, LINEAR, goal_linear_velocity);
        debug!(
            goal_position = ?goal_position.as_slice(),
            goal_linear_velocity = ?goal_linear_velocity.as_slice(),
            "New Cartesian position goal"
        );
        Ok(())
    }

    /// Set the goal position, to be reached at rest
    pub fn set_goal_position(&mut self, goal_position: &Vector3<f64>) -> Result<()> {
        self.set_goal_position_and_linear_velocity(goal_position, &Vector3::zeros())
    }

    /// Set the goal orientation and the base frame angular velocity to have
    /// when reaching it
    ///
    /// A goal equal to the current one is ignored.
    pub fn set_goal_orientation_and_angular_velocity(
        &mut self,
        goal_orientation: &Rotation3<f64>,
        goal_angular_velocity: &Vector3<f64>,
    ) -> Result<()> {
        // compare matrices, quaternions carry a sign ambiguity
        let current = self.goal_orientation.to_rotation_matrix();
        let same_orientation = goal::same_goal(
            current.matrix().as_slice(),
            goal_orientation.matrix().as_slice(),
        );
        let same_velocity = goal::same_goal(
            self.goal_angular_velocity.as_slice(),
            goal_angular_velocity.as_slice(),
        );
        if same_orientation && same_velocity {
            return Ok(());
        }

        self.goal_reached = false;
        self.reanchor = true;
        self.goal_orientation = UnitQuaternion::from_rotation_matrix(goal_orientation);
        self.goal_angular_velocity = *goal_angular_velocity;
        debug!(
            goal_orientation = ?self.goal_orientation.euler_angles(),
            goal_angular_velocity = ?goal_angular_velocity.as_slice(),
            "New Cartesian orientation goal"
        );
        Ok(())
    }

    /// Set the goal orientation, to be reached at rest
    pub fn set_goal_orientation(&mut self, goal_orientation: &Rotation3<f64>) -> Result<()> {
        self.set_goal_orientation_and_angular_velocity(goal_orientation, &Vector3::zeros())
    }

    /// Compute the next sample. Call exactly once per control cycle.
    ///
    /// # Errors
    /// Returns [`crate::Error::Solver`] if the solver rejects the current state,
    /// limits or goal; the previous sample is kept.
    pub fn update(&mut self) -> Result<Progress> {
        if self.reanchor {
            self.anchor_on_current_orientation();
            self.reanchor = false;
        }

        // constant between goal changes
        let offset = self.frame.offset_to(&self.goal_orientation);
        let goal_velocity = self.frame.to_local(&self.goal_angular_velocity);
        set_part(&mut self.input.target_position, ANGULAR, &offset);
        set_part(&mut self.input.target_velocity, ANGULAR, &goal_velocity);

        let progress = self
            .solver
            .update(&self.input, &mut self.output)
            .inspect_err(|source| error!(%source, "Cartesian trajectory update failed"))?;
        self.output.pass_to_input(&mut self.input);

        self.angular_velocity = self.frame.to_base(&part(&self.output.new_velocity, ANGULAR));
        self.angular_acceleration = self
            .frame
            .to_base(&part(&self.output.new_acceleration, ANGULAR));

        // same norm in the local and the base frame
        let speed = self.output.new_velocity.norm();
        match goal::settle(progress, speed, self.config.residual_velocity_threshold) {
            Settle::Reached => {
                if !self.goal_reached {
                    debug!("Cartesian goal reached");
                }
                self.goal_reached = true;
            }
            Settle::Residual => {
                warn!(speed, "Cartesian trajectory finished while moving, stopping at the goal");
                set_part(&mut self.input.target_velocity, LINEAR, &Vector3::zeros());
                self.goal_angular_velocity = Vector3::zeros();
                self.reanchor = true;
            }
            Settle::Moving => {}
        }

        Ok(progress)
    }

    /// Move the tangent frame onto the orientation of the latest sample and
    /// express the angular state in it.
    ///
    /// Sample and solver input are rewritten together, so the pose they
    /// describe does not change.
    fn anchor_on_current_orientation(&mut self) {
        let offset = part(&self.output.new_position, ANGULAR);
        self.frame.advance(&offset);

        let velocity = self.frame.to_local(&self.angular_velocity);
        let acceleration = self.frame.to_local(&self.angular_acceleration);
        set_part(&mut self.output.new_position, ANGULAR, &Vector3::zeros());
        set_part(&mut self.output.new_velocity, ANGULAR, &velocity);
        set_part(&mut self.output.new_acceleration, ANGULAR, &acceleration);
        self.output.pass_to_input(&mut self.input);
    }

    pub fn is_goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// Position of the latest sample
    pub fn next_position(&self) -> Vector3<f64> {
        part(&self.output.new_position, LINEAR)
    }

    pub fn next_linear_velocity(&self) -> Vector3<f64> {
        part(&self.output.new_velocity, LINEAR)
    }

    pub fn next_linear_acceleration(&self) -> Vector3<f64> {
        part(&self.output.new_acceleration, LINEAR)
    }

    /// Orientation of the latest sample
    pub fn next_orientation(&self) -> Rotation3<f64> {
        self.orientation().to_rotation_matrix()
    }

    fn orientation(&self) -> UnitQuaternion<f64> {
        self.frame
            .orientation_at(&part(&self.output.new_position, ANGULAR))
    }

    /// Angular velocity of the latest sample in the base frame
    pub fn next_angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Angular acceleration of the latest sample in the base frame
    pub fn next_angular_acceleration(&self) -> Vector3<f64> {
        self.angular_acceleration
    }

    pub fn cycle_time(&self) -> f64 {
        self.solver.cycle_time()
    }

    pub fn max_linear_velocity(&self) -> Vector3<f64> {
        part(&self.input.max_velocity, LINEAR)
    }

    pub fn max_linear_acceleration(&self) -> Vector3<f64> {
        part(&self.input.max_acceleration, LINEAR)
    }

    pub fn max_angular_velocity(&self) -> Vector3<f64> {
        part(&self.input.max_velocity, ANGULAR)
    }

    pub fn max_angular_acceleration(&self) -> Vector3<f64> {
        part(&self.input.max_acceleration, ANGULAR)
    }

    /// Linear and angular jerk bounds
    pub fn max_jerk(&self) -> (Vector3<f64>, Vector3<f64>) {
        (
            part(&self.input.max_jerk, LINEAR),
            part(&self.input.max_jerk, ANGULAR),
        )
    }

    pub fn goal_position(&self) -> Vector3<f64> {
        part(&self.input.target_position, LINEAR)
    }

    pub fn goal_linear_velocity(&self) -> Vector3<f64> {
        part(&self.input.target_velocity, LINEAR)
    }

    pub fn goal_orientation(&self) -> Rotation3<f64> {
        self.goal_orientation.to_rotation_matrix()
    }

    /// Goal angular velocity in the base frame
    pub fn goal_angular_velocity(&self) -> Vector3<f64> {
        self.goal_angular_velocity
    }

    pub fn config(&self) -> &OtgConfig {
        &self.config
    }
}

impl<S: ProfileSolver> std::fmt::Display for CartesianOtg<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.next_position();
        let (roll, pitch, yaw) = self.orientation().euler_angles();
        write!(
            f,
            "CartesianOtg (position: [{:.4}, {:.4}, {:.4}], rpy: [{:.4}, {:.4}, {:.4}], goal reached: {})",
            p.x, p.y, p.z, roll, pitch, yaw, self.goal_reached
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn limited() -> CartesianOtg {
        let mut otg = CartesianOtg::new(Vector3::zeros(), Rotation3::identity(), 0.001).unwrap();
        otg.set_max_linear_velocity_uniform(1.0).unwrap();
        otg.set_max_linear_acceleration_uniform(2.0).unwrap();
        otg.set_max_angular_velocity_uniform(1.0).unwrap();
        otg.set_max_angular_acceleration_uniform(2.0).unwrap();
        otg.set_max_jerk_uniform(20.0, 20.0).unwrap();
        otg
    }

    fn run_to_goal(otg: &mut CartesianOtg) -> usize {
        let mut cycles = 0;
        while !otg.is_goal_reached() {
            otg.update().unwrap();
            cycles += 1;
            assert!(cycles < 100_000);
        }
        cycles
    }

    #[test]
    fn test_cartesian_otg_creation() {
        let orientation = Rotation3::from_euler_angles(0.1, 0.2, 0.3);
        let otg = CartesianOtg::new(Vector3::new(1.0, 2.0, 3.0), orientation, 0.002).unwrap();

        assert_eq!(otg.cycle_time(), 0.002);
        assert_eq!(otg.next_position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(otg.goal_position(), Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(otg.next_orientation(), orientation, epsilon = 1e-12);
        assert_relative_eq!(otg.goal_orientation(), orientation, epsilon = 1e-12);
        assert_eq!(otg.next_angular_velocity(), Vector3::zeros());
        assert!(!otg.is_goal_reached());
    }

    #[test]
    fn test_solver_must_be_six_dimensional() {
        let solver = JerkLimitedSolver::new(3, 0.001).unwrap();
        let result = CartesianOtg::with_solver(
            Vector3::zeros(),
            Rotation3::identity(),
            solver,
            OtgConfig::default(),
        );
        assert!(matches!(
            result,
            Err(Error::InvalidDimension {
                expected: 6,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_limits_are_split_linear_angular() {
        let mut otg = limited();
        otg.set_max_angular_velocity(&Vector3::new(0.5, 0.6, 0.7)).unwrap();

        assert_eq!(otg.max_linear_velocity(), Vector3::repeat(1.0));
        assert_eq!(otg.max_angular_velocity(), Vector3::new(0.5, 0.6, 0.7));
        assert_eq!(otg.max_jerk(), (Vector3::repeat(20.0), Vector3::repeat(20.0)));
    }

    #[test]
    fn test_rejected_jerk_applies_neither_half() {
        let mut otg = limited();
        let result = otg.set_max_jerk(&Vector3::repeat(5.0), &Vector3::new(1.0, 0.0, 1.0));

        assert!(matches!(
            result,
            Err(Error::NonPositiveLimit {
                quantity: "max angular jerk",
                index: 1,
                ..
            })
        ));
        assert_eq!(otg.max_jerk().0, Vector3::repeat(20.0));
    }

    #[test]
    fn test_linear_move_keeps_orientation() {
        let orientation = Rotation3::from_euler_angles(0.4, -0.1, 1.2);
        let mut otg = limited();
        otg.reinitialize(&Vector3::zeros(), &orientation);
        otg.set_goal_position(&Vector3::new(0.2, -0.1, 0.05)).unwrap();

        run_to_goal(&mut otg);
        assert_relative_eq!(otg.next_position(), Vector3::new(0.2, -0.1, 0.05), epsilon = 1e-9);
        assert_relative_eq!(otg.next_orientation(), orientation, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_in_rotated_frame() {
        let start = Rotation3::from_euler_angles(0.0, 0.0, FRAC_PI_2);
        let goal = start * Rotation3::from_euler_angles(0.5, 0.0, 0.0);
        let mut otg = limited();
        otg.reinitialize(&Vector3::zeros(), &start);
        otg.set_goal_orientation(&goal).unwrap();

        for _ in 0..300 {
            otg.update().unwrap();
        }
        // local x of the start frame is base y
        let w = otg.next_angular_velocity();
        assert!(w.y > 0.0);
        assert_relative_eq!(w.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(w.z, 0.0, epsilon = 1e-9);

        run_to_goal(&mut otg);
        assert_relative_eq!(otg.next_orientation(), goal, epsilon = 1e-9);
    }

    #[test]
    fn test_same_orientation_goal_is_a_no_op() {
        let mut otg = limited();
        let goal = Rotation3::from_euler_angles(0.0, 0.3, 0.0);
        otg.set_goal_orientation(&goal).unwrap();
        run_to_goal(&mut otg);

        otg.set_goal_orientation(&goal).unwrap();
        assert!(otg.is_goal_reached());
        otg.set_goal_position(&Vector3::zeros()).unwrap();
        assert!(otg.is_goal_reached());

        otg.set_goal_orientation(&Rotation3::from_euler_angles(0.0, 0.31, 0.0))
            .unwrap();
        assert!(!otg.is_goal_reached());
    }

    #[test]
    fn test_disable_jerk_limits_resets_acceleration() {
        let mut otg = limited();
        otg.set_goal_orientation(&Rotation3::from_euler_angles(1.0, 0.0, 0.0))
            .unwrap();
        for _ in 0..50 {
            otg.update().unwrap();
        }
        assert!(otg.next_angular_acceleration().norm() > 0.0);

        otg.disable_jerk_limits();
        assert_eq!(otg.next_angular_acceleration(), Vector3::zeros());
        assert_eq!(otg.next_linear_acceleration(), Vector3::zeros());
        assert!(otg.max_jerk().1.x.is_infinite());
    }

    /// Counts the trajectories the wrapped solver computes
    #[derive(Debug)]
    struct CountingSolver {
        inner: JerkLimitedSolver,
        plans: usize,
    }

    impl ProfileSolver for CountingSolver {
        fn dof(&self) -> usize {
            self.inner.dof()
        }

        fn cycle_time(&self) -> f64 {
            self.inner.cycle_time()
        }

        fn update(
            &mut self,
            input: &ProfileInput,
            output: &mut ProfileOutput,
        ) -> jerk_profile::Result<Progress> {
            let progress = self.inner.update(input, output)?;
            if output.new_calculation {
                self.plans += 1;
            }
            Ok(progress)
        }
    }

    #[test]
    fn test_one_plan_per_goal() {
        let solver = CountingSolver {
            inner: JerkLimitedSolver::new(POSE_DOF, 0.001).unwrap(),
            plans: 0,
        };
        let mut otg = CartesianOtg::with_solver(
            Vector3::zeros(),
            Rotation3::identity(),
            solver,
            OtgConfig::default(),
        )
        .unwrap();
        otg.set_max_linear_velocity_uniform(1.0).unwrap();
        otg.set_max_linear_acceleration_uniform(2.0).unwrap();
        otg.set_max_angular_velocity_uniform(1.0).unwrap();
        otg.set_max_angular_acceleration_uniform(2.0).unwrap();
        otg.set_max_jerk_uniform(20.0, 20.0).unwrap();

        otg.set_goal_orientation(&Rotation3::from_axis_angle(&Vector3::z_axis(), 1.5))
            .unwrap();
        for _ in 0..300 {
            otg.update().unwrap();
        }
        assert_eq!(otg.solver.plans, 1);
        assert!(otg.next_angular_acceleration().z > 1.0);

        // sideways goal while still speeding up about z
        let goal = Rotation3::from_axis_angle(&Vector3::y_axis(), -0.5);
        otg.set_goal_position(&Vector3::new(0.1, 0.0, 0.0)).unwrap();
        otg.set_goal_orientation(&goal).unwrap();
        let mut cycles = 0;
        while !otg.is_goal_reached() {
            otg.update().unwrap();
            let velocity = part(&otg.output.new_velocity, ANGULAR);
            let acceleration = part(&otg.output.new_acceleration, ANGULAR);
            assert!(velocity.amax() <= 1.0 + 1e-9, "angular velocity {velocity}");
            assert!(acceleration.amax() <= 2.0 + 1e-9, "angular acceleration {acceleration}");
            cycles += 1;
            assert!(cycles < 20_000);
        }
        assert_eq!(otg.solver.plans, 2);
        assert_relative_eq!(otg.next_orientation(), goal, epsilon = 1e-9);

        for _ in 0..100 {
            otg.update().unwrap();
        }
        assert_eq!(otg.solver.plans, 2);
    }

    #[test]
    fn test_update_before_limits_is_a_solver_error() {
        let mut otg = CartesianOtg::new(Vector3::zeros(), Rotation3::identity(), 0.001).unwrap();
        otg.set_goal_position(&Vector3::x()).unwrap();

        assert!(matches!(otg.update(), Err(Error::Solver(_))));
        assert_eq!(otg.next_position(), Vector3::zeros());
    }

    #[test]
    fn test_display() {
        let otg = limited();
        let display_str = format!("{}", otg);
        assert!(display_str.contains("goal reached: false"));
    }
}

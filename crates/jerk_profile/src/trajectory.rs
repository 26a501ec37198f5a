//! Multi-axis trajectories and their synchronization.

use nalgebra::DVector;

use crate::axis::{AxisLimits, AxisProfile, AxisState};
use crate::input::{ProfileInput, Synchronization};

/// Components below this do not define a direction.
const DIRECTION_TOLERANCE: f64 = 1e-12;

/// Relative deviation from the motion line still accepted as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Smallest velocity bound scale tried when stretching an axis.
const MIN_STRETCH: f64 = 1e-3;

const STRETCH_STEPS: usize = 48;

#[derive(Clone, Debug, PartialEq)]
enum Layout {
    /// All axes follow one scalar profile along a straight line.
    Line {
        origin: DVector<f64>,
        direction: DVector<f64>,
        profile: AxisProfile,
    },
    /// One profile per axis.
    Axes(Vec<AxisProfile>),
}

/// A planned motion of every axis of a [`ProfileInput`].
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    layout: Layout,
    target_position: DVector<f64>,
    target_velocity: DVector<f64>,
    duration: f64,
}

impl Trajectory {
    /// Plan a trajectory for an already validated input
    pub fn plan(input: &ProfileInput) -> Self {
        let layout = match input.synchronization {
            Synchronization::Phase => {
                plan_line(input).unwrap_or_else(|| Layout::Axes(plan_axes(input, true)))
            }
            Synchronization::Time => Layout::Axes(plan_axes(input, true)),
            Synchronization::None => Layout::Axes(plan_axes(input, false)),
        };

        let duration = match &layout {
            Layout::Line { profile, .. } => profile.duration(),
            Layout::Axes(profiles) => profiles
                .iter()
                .map(AxisProfile::duration)
                .fold(0.0, f64::max),
        };

        Self {
            layout,
            target_position: input.target_position.clone(),
            target_velocity: input.target_velocity.clone(),
            duration,
        }
    }

    /// Time in seconds until every axis reached its target
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether the axes move together along one straight line
    pub fn is_phase_synchronized(&self) -> bool {
        matches!(self.layout, Layout::Line { .. })
    }

    /// Write the state at `time` into the given vectors.
    ///
    /// At and after the duration the sample is the exact target state.
    pub fn state_at(
        &self,
        time: f64,
        position: &mut DVector<f64>,
        velocity: &mut DVector<f64>,
        acceleration: &mut DVector<f64>,
    ) {
        match &self.layout {
            Layout::Line { .. } if time >= self.duration => {
                position.copy_from(&self.target_position);
                velocity.copy_from(&self.target_velocity);
                acceleration.fill(0.0);
            }
            Layout::Line {
                origin,
                direction,
                profile,
            } => {
                let state = profile.state_at(time);
                position.copy_from(&(origin + direction * state.position));
                velocity.copy_from(&(direction * state.velocity));
                acceleration.copy_from(&(direction * state.acceleration));
            }
            Layout::Axes(profiles) => {
                let time = time.min(self.duration);
                for (i, profile) in profiles.iter().enumerate() {
                    let state = profile.state_at(time);
                    position[i] = state.position;
                    velocity[i] = state.velocity;
                    acceleration[i] = state.acceleration;
                }
            }
        }
    }
}

fn axis_start(input: &ProfileInput, i: usize) -> AxisState {
    AxisState::new(
        input.current_position[i],
        input.current_velocity[i],
        input.current_acceleration[i],
    )
}

fn axis_limits(input: &ProfileInput, i: usize) -> AxisLimits {
    AxisLimits::new(
        input.max_velocity[i],
        input.max_acceleration[i],
        input.max_jerk[i],
    )
}

/// Scalar profile along the line through the current and target positions.
///
/// Only possible when the current velocity, current acceleration and target
/// velocity all point along that line.
fn plan_line(input: &ProfileInput) -> Option<Layout> {
    let displacement = &input.target_position - &input.current_position;
    let candidates = [
        &displacement,
        &input.target_velocity,
        &input.current_velocity,
        &input.current_acceleration,
    ];

    let direction = candidates
        .iter()
        .find(|v| v.norm() > DIRECTION_TOLERANCE)?
        .normalize();

    if !candidates.iter().all(|v| is_along(v, &direction)) {
        return None;
    }

    // tightest bound any axis imposes on the scalar motion
    let mut limits = AxisLimits::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    for (i, weight) in direction.iter().map(|w| w.abs()).enumerate() {
        if weight > DIRECTION_TOLERANCE {
            let axis = axis_limits(input, i).scaled(1.0 / weight);
            limits.max_velocity = limits.max_velocity.min(axis.max_velocity);
            limits.max_acceleration = limits.max_acceleration.min(axis.max_acceleration);
            limits.max_jerk = limits.max_jerk.min(axis.max_jerk);
        }
    }

    let start = AxisState::new(
        0.0,
        input.current_velocity.dot(&direction),
        input.current_acceleration.dot(&direction),
    );
    let profile = AxisProfile::plan(
        start,
        displacement.dot(&direction),
        input.target_velocity.dot(&direction),
        &limits,
    );

    Some(Layout::Line {
        origin: input.current_position.clone(),
        direction,
        profile,
    })
}

fn is_along(v: &DVector<f64>, direction: &DVector<f64>) -> bool {
    let off_line = v - direction * v.dot(direction);
    off_line.norm() <= COLLINEAR_TOLERANCE * v.norm() + DIRECTION_TOLERANCE
}

fn plan_axes(input: &ProfileInput, synchronize: bool) -> Vec<AxisProfile> {
    let mut profiles: Vec<AxisProfile> = (0..input.dof())
        .map(|i| {
            AxisProfile::plan(
                axis_start(input, i),
                input.target_position[i],
                input.target_velocity[i],
                &axis_limits(input, i),
            )
        })
        .collect();

    if synchronize {
        let horizon = profiles
            .iter()
            .map(AxisProfile::duration)
            .fold(0.0, f64::max);

        for (i, profile) in profiles.iter_mut().enumerate() {
            if profile.duration() < horizon {
                *profile = stretch(input, i, horizon);
            }
        }
    }

    profiles
}

/// Slow one axis down by lowering its velocity bound until it takes
/// `horizon` seconds.
///
/// Acceleration and jerk keep their real bounds: a softer jerk would take
/// longer to cancel the current acceleration and carry the velocity past its
/// limit. Axes that cannot be slowed enough keep their slowest profile and
/// wait at the target.
fn stretch(input: &ProfileInput, i: usize, horizon: f64) -> AxisProfile {
    let start = axis_start(input, i);
    let limits = axis_limits(input, i);
    let target_position = input.target_position[i];
    let target_velocity = input.target_velocity[i];

    // the velocity bound may not drop below the target velocity
    let floor = (target_velocity.abs() / limits.max_velocity).clamp(MIN_STRETCH, 1.0);
    let plan = |scale: f64| {
        let slowed = AxisLimits {
            max_velocity: limits.max_velocity * scale,
            ..limits
        };
        AxisProfile::plan(start, target_position, target_velocity, &slowed)
    };

    let mut slowest = plan(floor);
    if slowest.duration() <= horizon {
        return slowest;
    }

    // duration(lo) > horizon >= duration(hi)
    let (mut lo, mut hi) = (floor, 1.0);
    for _ in 0..STRETCH_STEPS {
        let mid = 0.5 * (lo + hi);
        let candidate = plan(mid);
        if candidate.duration() > horizon {
            lo = mid;
            slowest = candidate;
        } else {
            hi = mid;
        }
    }
    slowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(dof: usize) -> ProfileInput {
        let mut input = ProfileInput::new(dof);
        input.max_velocity.fill(1.0);
        input.max_acceleration.fill(1.0);
        input.max_jerk.fill(1.0);
        input
    }

    fn sample(trajectory: &Trajectory, time: f64) -> (DVector<f64>, DVector<f64>, DVector<f64>) {
        let n = trajectory.target_position.len();
        let (mut p, mut v, mut a) = (DVector::zeros(n), DVector::zeros(n), DVector::zeros(n));
        trajectory.state_at(time, &mut p, &mut v, &mut a);
        (p, v, a)
    }

    #[test]
    fn test_phase_sync_moves_on_a_line() {
        let mut input = input(3);
        input.target_position = DVector::from_vec(vec![1.0, 2.0, -0.5]);
        let trajectory = Trajectory::plan(&input);

        assert!(trajectory.is_phase_synchronized());
        for k in 1..10 {
            let (p, _, _) = sample(&trajectory, trajectory.duration() * k as f64 / 10.0);
            // every axis has covered the same fraction of its displacement
            let fraction = p[1] / 2.0;
            assert_relative_eq!(p[0], fraction, epsilon = 1e-12);
            assert_relative_eq!(p[2], -0.5 * fraction, epsilon = 1e-12);
        }
        let (p, v, a) = sample(&trajectory, trajectory.duration());
        assert_eq!(p, input.target_position);
        assert_eq!(v, DVector::zeros(3));
        assert_eq!(a, DVector::zeros(3));
    }

    #[test]
    fn test_phase_sync_uses_tightest_axis() {
        let mut input = input(2);
        input.max_velocity[1] = 0.1;
        input.target_position = DVector::from_vec(vec![10.0, 10.0]);
        let trajectory = Trajectory::plan(&input);

        let (_, v, _) = sample(&trajectory, trajectory.duration() / 2.0);
        assert_relative_eq!(v[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(v[0], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_phase_falls_back_to_time_sync() {
        let mut input = input(2);
        input.current_velocity = DVector::from_vec(vec![0.0, 0.5]);
        input.target_position = DVector::from_vec(vec![1.0, 0.0]);
        let trajectory = Trajectory::plan(&input);

        assert!(!trajectory.is_phase_synchronized());
        let (p, v, _) = sample(&trajectory, trajectory.duration());
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-9);
        assert_eq!(v, DVector::zeros(2));
    }

    #[test]
    fn test_time_sync_stretches_short_axes() {
        let mut input = input(2);
        input.synchronization = Synchronization::Time;
        input.target_position = DVector::from_vec(vec![4.0, 0.5]);
        let trajectory = Trajectory::plan(&input);

        let Layout::Axes(profiles) = &trajectory.layout else {
            panic!("expected one profile per axis");
        };
        assert_relative_eq!(
            profiles[0].duration(),
            profiles[1].duration(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_stretch_from_moving_state_keeps_limits() {
        let mut input = input(2);
        input.synchronization = Synchronization::Time;
        input.current_velocity = DVector::from_vec(vec![0.0, 0.5]);
        input.current_acceleration = DVector::from_vec(vec![0.0, 0.9]);
        input.target_position = DVector::from_vec(vec![10.0, 3.0]);
        let trajectory = Trajectory::plan(&input);

        let steps = (trajectory.duration() / 0.001).ceil() as usize;
        for k in 0..=steps {
            let (_, v, a) = sample(&trajectory, k as f64 * 0.001);
            assert!(v.amax() <= 1.0 + 1e-9, "velocity {v} over the limit");
            assert!(a.amax() <= 1.0 + 1e-9, "acceleration {a} over the limit");
        }

        let Layout::Axes(profiles) = &trajectory.layout else {
            panic!("expected one profile per axis");
        };
        assert_relative_eq!(
            profiles[0].duration(),
            profiles[1].duration(),
            epsilon = 1e-6
        );
        let (p, _, _) = sample(&trajectory, trajectory.duration());
        assert_relative_eq!(p[1], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unsynchronized_axes_finish_independently() {
        let mut input = input(2);
        input.synchronization = Synchronization::None;
        input.target_position = DVector::from_vec(vec![4.0, 0.5]);
        let trajectory = Trajectory::plan(&input);

        let Layout::Axes(profiles) = &trajectory.layout else {
            panic!("expected one profile per axis");
        };
        assert!(profiles[1].duration() < profiles[0].duration());

        // the short axis waits at its target
        let (p, _, _) = sample(&trajectory, profiles[1].duration() + 0.1);
        assert_relative_eq!(p[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_at_rest_on_target() {
        let mut input = input(2);
        input.current_position = DVector::from_vec(vec![0.3, -0.2]);
        input.target_position = input.current_position.clone();
        let trajectory = Trajectory::plan(&input);

        assert_eq!(trajectory.duration(), 0.0);
        let (p, _, _) = sample(&trajectory, 0.001);
        assert_eq!(p, input.target_position);
    }
}

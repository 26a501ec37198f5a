//! Single-axis jerk-limited profiles.
//!
//! A profile is a sequence of constant-jerk segments taking one axis from its
//! current state to a target position and velocity with zero acceleration.
//! Every profile has the same shape: change velocity to a peak, optionally
//! cruise at that peak, then change velocity to the target. Each velocity
//! change is the classic three-segment ramp (jerk up, hold at the
//! acceleration limit if needed, jerk down).

/// Bisection steps used to land a profile on its target position.
const BISECTION_STEPS: usize = 64;

/// Differences below this are treated as "already there".
const AT_TARGET_TOLERANCE: f64 = 1e-12;

/// Position, velocity and acceleration of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisState {
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

impl AxisState {
    /// Create a state from its three components
    pub fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Integrate the state forward under constant jerk
    pub fn advance(&self, jerk: f64, duration: f64) -> Self {
        let t = duration;
        Self {
            position: self.position
                + t * (self.velocity + t * (self.acceleration / 2.0 + t * jerk / 6.0)),
            velocity: self.velocity + t * (self.acceleration + t * jerk / 2.0),
            acceleration: self.acceleration + t * jerk,
        }
    }
}

/// Kinematic bounds of one axis.
///
/// `max_jerk` may be infinite, in which case acceleration switches
/// instantaneously.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisLimits {
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_jerk: f64,
}

impl AxisLimits {
    pub fn new(max_velocity: f64, max_acceleration: f64, max_jerk: f64) -> Self {
        Self {
            max_velocity,
            max_acceleration,
            max_jerk,
        }
    }

    /// Scale all three bounds by the same factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            max_velocity: self.max_velocity * factor,
            max_acceleration: self.max_acceleration * factor,
            max_jerk: self.max_jerk * factor,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    start: AxisState,
    jerk: f64,
    duration: f64,
}

/// A planned single-axis motion.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisProfile {
    segments: Vec<Segment>,
    target_position: f64,
    target_velocity: f64,
    duration: f64,
}

impl AxisProfile {
    /// Plan a profile from `start` to the target position and velocity.
    ///
    /// The peak velocity is `±max_velocity` with a cruise phase when the
    /// distance allows it; otherwise it is searched by bisection so that the
    /// profile covers exactly the distance to the target.
    pub fn plan(
        start: AxisState,
        target_position: f64,
        target_velocity: f64,
        limits: &AxisLimits,
    ) -> Self {
        let distance = target_position - start.position;
        if distance.abs() <= AT_TARGET_TOLERANCE
            && (target_velocity - start.velocity).abs() <= AT_TARGET_TOLERANCE
            && start.acceleration.abs() <= AT_TARGET_TOLERANCE
        {
            return Builder::new(start).finish(target_position, target_velocity);
        }

        let max_velocity = limits.max_velocity;

        let fastest = Builder::through(start, max_velocity, target_velocity, limits);
        let covered = fastest.travel();
        if covered <= distance {
            return Builder::cruising(
                start,
                max_velocity,
                distance - covered,
                target_velocity,
                limits,
            )
            .finish(target_position, target_velocity);
        }

        let slowest = Builder::through(start, -max_velocity, target_velocity, limits);
        let covered = slowest.travel();
        if covered >= distance {
            return Builder::cruising(
                start,
                -max_velocity,
                distance - covered,
                target_velocity,
                limits,
            )
            .finish(target_position, target_velocity);
        }

        // travel(lo) < distance < travel(hi)
        let (mut lo, mut hi) = (-max_velocity, max_velocity);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if Builder::through(start, mid, target_velocity, limits).travel() < distance {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        Builder::through(start, 0.5 * (lo + hi), target_velocity, limits)
            .finish(target_position, target_velocity)
    }

    /// Total duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Peak absolute velocity reached over the profile
    pub fn peak_velocity(&self) -> f64 {
        self.segments
            .iter()
            .flat_map(|segment| {
                let end = segment.start.advance(segment.jerk, segment.duration);
                [segment.start.velocity.abs(), end.velocity.abs()]
            })
            .fold(self.target_velocity.abs(), f64::max)
    }

    /// Sample the profile at `time` seconds after its start.
    ///
    /// Past the end the axis keeps moving at its target velocity.
    pub fn state_at(&self, time: f64) -> AxisState {
        if time < self.duration {
            let mut elapsed = 0.0;
            for segment in &self.segments {
                if time < elapsed + segment.duration {
                    return segment.start.advance(segment.jerk, time - elapsed);
                }
                elapsed += segment.duration;
            }
        }

        AxisState::new(
            self.target_position + self.target_velocity * (time - self.duration).max(0.0),
            self.target_velocity,
            0.0,
        )
    }
}

/// Accumulates segments while integrating the axis state.
struct Builder {
    start: AxisState,
    state: AxisState,
    segments: Vec<Segment>,
    elapsed: f64,
}

impl Builder {
    fn new(start: AxisState) -> Self {
        Self {
            start,
            state: start,
            segments: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Velocity change to `peak` immediately followed by one to `target_velocity`
    fn through(start: AxisState, peak: f64, target_velocity: f64, limits: &AxisLimits) -> Self {
        let mut builder = Self::new(start);
        builder.change_velocity(peak, limits);
        builder.change_velocity(target_velocity, limits);
        builder
    }

    /// Same as `through` with a cruise covering `extra` distance at `peak`
    fn cruising(
        start: AxisState,
        peak: f64,
        extra: f64,
        target_velocity: f64,
        limits: &AxisLimits,
    ) -> Self {
        let mut builder = Self::new(start);
        builder.change_velocity(peak, limits);
        builder.push(0.0, extra / peak);
        builder.change_velocity(target_velocity, limits);
        builder
    }

    fn travel(&self) -> f64 {
        self.state.position - self.start.position
    }

    fn push(&mut self, jerk: f64, duration: f64) {
        if duration > 0.0 {
            self.segments.push(Segment {
                start: self.state,
                jerk,
                duration,
            });
            self.state = self.state.advance(jerk, duration);
            self.elapsed += duration;
        }
    }

    fn ramp_to(&mut self, acceleration: f64, max_jerk: f64) {
        let delta = acceleration - self.state.acceleration;
        if max_jerk.is_finite() {
            self.push(max_jerk.copysign(delta), delta.abs() / max_jerk);
        }
        self.state.acceleration = acceleration;
    }

    /// Bring the velocity to `target` and the acceleration to zero in minimum time
    fn change_velocity(&mut self, target: f64, limits: &AxisLimits) {
        let AxisLimits {
            max_acceleration,
            max_jerk,
            ..
        } = *limits;
        let AxisState {
            velocity,
            acceleration,
            ..
        } = self.state;

        // velocity reached by ramping the current acceleration straight to zero
        let coasting = velocity + acceleration * acceleration.abs() / (2.0 * max_jerk);
        let direction = if target >= coasting { 1.0 } else { -1.0 };

        // mirrored so that the velocity has to increase
        let gain = direction * (target - velocity);
        let initial = direction * acceleration;

        let gain_at_limit = ramp_gain(initial, max_acceleration, max_jerk)
            + max_acceleration * max_acceleration / (2.0 * max_jerk);

        let (peak, hold) = if gain_at_limit <= gain {
            (
                max_acceleration,
                (gain - gain_at_limit) / max_acceleration,
            )
        } else {
            let peak = ((2.0 * max_jerk * gain + initial * initial) / 2.0)
                .max(0.0)
                .sqrt();
            (peak.max(initial.max(0.0)), 0.0)
        };

        self.ramp_to(direction * peak, max_jerk);
        self.push(0.0, hold);
        self.ramp_to(0.0, max_jerk);
        self.state.velocity = target;
    }

    fn finish(self, target_position: f64, target_velocity: f64) -> AxisProfile {
        AxisProfile {
            segments: self.segments,
            target_position,
            target_velocity,
            duration: self.elapsed,
        }
    }
}

/// Velocity gained while ramping the acceleration between two values
fn ramp_gain(from: f64, to: f64, max_jerk: f64) -> f64 {
    (from + to) / 2.0 * (to - from).abs() / max_jerk
}

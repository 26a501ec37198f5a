//! Goal change detection and the goal-reached state machine.

use approx::relative_eq;
use jerk_profile::Progress;

/// Absolute and relative tolerance under which two goals are the same
pub const GOAL_TOLERANCE: f64 = 1e-12;

/// Whether two goal vectors are equal within [`GOAL_TOLERANCE`]
pub(crate) fn same_goal(current: &[f64], candidate: &[f64]) -> bool {
    current.len() == candidate.len()
        && current.iter().zip(candidate).all(|(a, b)| {
            relative_eq!(
                *a,
                *b,
                epsilon = GOAL_TOLERANCE,
                max_relative = GOAL_TOLERANCE
            )
        })
}

/// What a generator does with the result of one solver cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Settle {
    /// Finished and at rest: the goal is reached.
    Reached,
    /// Finished while still moving: the goal has to be re-issued at rest.
    Residual,
    /// Still on the way.
    Moving,
}

pub(crate) fn settle(progress: Progress, residual_speed: f64, threshold: f64) -> Settle {
    match progress {
        Progress::Finished if residual_speed < threshold => Settle::Reached,
        Progress::Finished => Settle::Residual,
        Progress::Working => Settle::Moving,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_goal() {
        assert!(same_goal(&[1.0, 2.0], &[1.0, 2.0]));
        assert!(same_goal(&[1.0, 0.0], &[1.0 + 1e-14, 1e-14]));
        assert!(!same_goal(&[1.0, 2.0], &[1.0, 2.001]));
        assert!(!same_goal(&[1.0, 2.0], &[1.0]));
    }

    #[test]
    fn test_settle() {
        assert_eq!(settle(Progress::Finished, 0.0, 1e-3), Settle::Reached);
        assert_eq!(settle(Progress::Finished, 5e-4, 1e-3), Settle::Reached);
        assert_eq!(settle(Progress::Finished, 0.2, 1e-3), Settle::Residual);
        assert_eq!(settle(Progress::Working, 0.0, 1e-3), Settle::Moving);
    }
}

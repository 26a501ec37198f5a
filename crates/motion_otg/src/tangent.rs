//! Local linearization of orientations.
//!
//! Orientations are not a vector space, so the solver only ever sees small
//! rotation vectors measured from a reference orientation that follows the
//! motion. Offsets are composed on the right, i.e. they are expressed in the
//! reference frame.

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

/// A reference orientation and the tangent space attached to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangentFrame {
    reference: UnitQuaternion<f64>,
}

impl TangentFrame {
    /// Create a tangent frame anchored at `reference`
    pub fn new(reference: UnitQuaternion<f64>) -> Self {
        Self { reference }
    }

    /// Create a tangent frame anchored at a rotation matrix
    pub fn from_rotation(reference: &Rotation3<f64>) -> Self {
        Self::new(UnitQuaternion::from_rotation_matrix(reference))
    }

    /// The reference orientation in the base frame
    pub fn reference(&self) -> &UnitQuaternion<f64> {
        &self.reference
    }

    /// Rotation vector of the minimal rotation from the reference to `goal`,
    /// in the reference frame
    pub fn offset_to(&self, goal: &UnitQuaternion<f64>) -> Vector3<f64> {
        (self.reference.inverse() * goal).scaled_axis()
    }

    /// Orientation reached by applying `offset` to the reference
    pub fn orientation_at(&self, offset: &Vector3<f64>) -> UnitQuaternion<f64> {
        self.reference * UnitQuaternion::from_scaled_axis(*offset)
    }

    /// Re-anchor the frame at the orientation reached by `offset`
    pub fn advance(&mut self, offset: &Vector3<f64>) {
        self.reference = self.orientation_at(offset);
        self.reference.renormalize();
    }

    /// Express a tangent vector of this frame in the base frame
    pub fn to_base(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.reference * local
    }

    /// Express a base frame vector in this frame
    pub fn to_local(&self, base: &Vector3<f64>) -> Vector3<f64> {
        self.reference.inverse_transform_vector(base)
    }
}

impl Default for TangentFrame {
    fn default() -> Self {
        Self::new(UnitQuaternion::identity())
    }
}

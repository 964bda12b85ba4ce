// Similarity transforms for scene editing.
//
// Scene primitives (spheres, discs) must stay the same kind of shape after
// a transform, so edits are restricted to uniform scale + rotation +
// translation rather than arbitrary matrices.

use crate::{Quat, Vec3};

/// A uniform-scale, rotate, translate transform: `p' = R * (s * p) + t`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Similarity {
    pub scale: f32,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Similarity {
    pub const IDENTITY: Similarity = Similarity {
        scale: 1.0,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Rotation of `angle` radians around `axis` through the world origin.
    /// A zero-length axis yields the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let rotation = match axis.try_normalize() {
            Some(axis) => Quat::from_axis_angle(axis, angle),
            None => Quat::IDENTITY,
        };
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    /// True when the transform maps space onto itself without collapsing it.
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite()
            && self.scale != 0.0
            && self.translation.is_finite()
            && self.rotation.is_finite()
    }

    #[inline]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation * (self.scale * p) + self.translation
    }

    /// Transform a direction (scale and rotation, no translation).
    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation * (self.scale * v)
    }

    /// Transform a unit normal. A negative scale mirrors through the origin,
    /// which flips outward normals.
    #[inline]
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        self.rotation * (n * self.scale.signum())
    }

    /// Transform a length such as a radius.
    #[inline]
    pub fn transform_length(&self, length: f32) -> f32 {
        length * self.scale.abs()
    }
}

impl Default for Similarity {
    fn default() -> Self {
        Self::IDENTITY
    }
}

use crate::Vec3;

/// A ray in 3D space with an origin and a direction.
///
/// The direction is not required to be unit length. Intersection routines
/// work in the ray parameter `t`, where a point on the ray is
/// `origin + t * direction`; the Euclidean distance to that point is
/// `t * direction.length()`, see [`Ray::distance_at`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// Euclidean distance from the origin to the point at parameter t.
    #[inline]
    pub fn distance_at(&self, t: f32) -> f32 {
        t * self.direction.length()
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_distance_scales_with_direction_length() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(ray.at(1.5), Vec3::new(0.0, 0.0, -3.0));
        assert!((ray.distance_at(1.5) - 3.0).abs() < 1e-6);
    }
}

//! Lumen math - vector types, rays, intervals and bounds shared by the
//! scene description and the renderer.

// Re-export glam for convenience
pub use glam::*;

mod bounds;
mod interval;
mod ray;
mod transform;

pub use bounds::Bounds;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Similarity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_reexported_types_compose() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let bounds = Bounds::from_points(Vec3::new(1.0, -1.0, -1.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(bounds.hit(&ray, Interval::new(0.0, f32::INFINITY)));
    }
}

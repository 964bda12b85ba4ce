//! Hittable trait and Hit record for ray-object intersection.

use lumen_core::{Material, Primitive};
use lumen_math::{Bounds, Interval, Ray, Vec2, Vec3};

/// Minimum ray parameter accepted by the renderer, so secondary rays do not
/// re-hit the surface they leave from.
pub const SELF_INTERSECTION_EPSILON: f32 = 1e-3;

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    /// Ray parameter of the intersection.
    pub t: f32,
    /// Euclidean distance from the ray origin (`t * |direction|`).
    pub distance: f32,
    pub point: Vec3,
    /// Shading normal, always facing against the ray.
    pub normal: Vec3,
    /// Whether the ray hit the outside of the surface.
    pub front_face: bool,
    pub material: &'a Material,
    /// Texture coordinates from the material's projection. Only filled in
    /// for the nearest hit of a scene query.
    pub uv: Option<Vec2>,
}

impl<'a> Hit<'a> {
    /// Build a hit at parameter `t`, orienting `outward_normal` against the
    /// ray.
    pub fn new(ray: &Ray, t: f32, outward_normal: Vec3, material: &'a Material) -> Self {
        let front_face = ray.direction().dot(outward_normal) < 0.0;
        Self {
            t,
            distance: ray.distance_at(t),
            point: ray.at(t),
            normal: if front_face {
                outward_normal
            } else {
                -outward_normal
            },
            front_face,
            material,
            uv: None,
        }
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Nearest intersection with parameter strictly inside `ray_t`.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>>;

    /// Get the axis-aligned bounding box of this object.
    fn bounds(&self) -> Bounds;
}

impl Hittable for Primitive {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t),
            Primitive::Disc(d) => d.hit(ray, ray_t),
            Primitive::Facets(f) => f.hit(ray, ray_t),
        }
    }

    fn bounds(&self) -> Bounds {
        Primitive::bounds(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_faces_against_ray() {
        let material = Material::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));

        let front = Hit::new(&ray, 2.0, Vec3::Z, &material);
        assert!(front.front_face);
        assert_eq!(front.normal, Vec3::Z);
        assert_eq!(front.point, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(front.distance, 4.0);

        let back = Hit::new(&ray, 2.0, Vec3::NEG_Z, &material);
        assert!(!back.front_face);
        assert_eq!(back.normal, Vec3::Z);
    }
}

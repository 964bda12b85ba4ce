//! Ray-sphere intersection.

use lumen_core::Sphere;
use lumen_math::{Bounds, Interval, Ray};

use crate::hittable::{Hit, Hittable};

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let oc = self.center() - ray.origin();
        let a = ray.direction().length_squared();
        if a == 0.0 {
            return None;
        }
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius() * self.radius();

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center()) / self.radius();
        Some(Hit::new(ray, root, outward_normal, self.material()))
    }

    fn bounds(&self) -> Bounds {
        Sphere::bounds(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::SELF_INTERSECTION_EPSILON;
    use lumen_core::Material;
    use lumen_math::Vec3;

    fn sphere(radius: f32) -> Sphere {
        Sphere::new(Vec3::ZERO, radius, Material::builder().build().unwrap()).unwrap()
    }

    fn range() -> Interval {
        Interval::new(SELF_INTERSECTION_EPSILON, f32::INFINITY)
    }

    #[test]
    fn test_hit_distance_is_d_minus_r() {
        for (d, r) in [(5.0, 1.0), (10.0, 2.5), (3.0, 0.5)] {
            let s = sphere(r);
            let ray = Ray::new(Vec3::new(0.0, 0.0, d), Vec3::NEG_Z);
            let hit = s.hit(&ray, range()).unwrap();
            assert!((hit.distance - (d - r)).abs() < 1e-5);
            assert!((hit.t - (d - r)).abs() < 1e-5);
            assert!(hit.front_face);
            assert!((hit.normal - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_offset_ray_misses() {
        let s = sphere(1.0);
        let ray = Ray::new(Vec3::new(1.5, 0.0, 5.0), Vec3::NEG_Z);
        assert!(s.hit(&ray, range()).is_none());
    }

    #[test]
    fn test_non_unit_direction_reports_t_and_distance() {
        let s = sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -2.0));
        let hit = s.hit(&ray, range()).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_inside_hit_is_back_face() {
        let s = sphere(2.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = s.hit(&ray, range()).unwrap();
        assert!(!hit.front_face);
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_range_excludes_hits() {
        let s = sphere(1.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(s.hit(&ray, Interval::new(0.0, 3.0)).is_none());
        // Far root is used when the near one is out of range.
        let far = s.hit(&ray, Interval::new(4.5, 10.0)).unwrap();
        assert!((far.t - 6.0).abs() < 1e-5);
    }
}

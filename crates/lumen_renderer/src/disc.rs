//! Ray-disc intersection.

use lumen_core::Disc;
use lumen_math::{Bounds, Interval, Ray};

use crate::hittable::{Hit, Hittable};

/// Rays with `|n . d|` below this are treated as parallel to a plane.
pub(crate) const PARALLEL_EPSILON: f32 = 1e-8;

impl Hittable for Disc {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let denom = self.normal().dot(ray.direction());
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = self.normal().dot(self.center() - ray.origin()) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        if (p - self.center()).length_squared() > self.radius() * self.radius() {
            return None;
        }

        Some(Hit::new(ray, t, self.normal(), self.material()))
    }

    fn bounds(&self) -> Bounds {
        Disc::bounds(self)
    }
}

use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used to prune intersection search.
///
/// Defined by three intervals (one per axis). The union of two boxes is the
/// componentwise hull of their intervals; [`Bounds::EMPTY`] is the identity
/// of that union.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create bounds from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self {
            x: Interval::new(lo.x, hi.x),
            y: Interval::new(lo.y, hi.y),
            z: Interval::new(lo.z, hi.z),
        }
    }

    /// Tightest bounds around a set of points. Empty input yields [`Bounds::EMPTY`].
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        points
            .into_iter()
            .fold(Bounds::EMPTY, |acc, p| acc.include_point(*p))
    }

    /// Bounds of a cube of half-size `radius` centered on `center`.
    pub fn around(center: Vec3, radius: f32) -> Self {
        let r = Vec3::splat(radius.abs());
        Self::from_points(center - r, center + r)
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Componentwise union of two boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            x: self.x.hull(&other.x),
            y: self.y.hull(&other.y),
            z: self.z.hull(&other.z),
        }
    }

    pub fn include_point(&self, p: Vec3) -> Bounds {
        Bounds {
            x: self.x.include(p.x),
            y: self.y.include(p.y),
            z: self.z.include(p.z),
        }
    }

    /// True when `other` lies entirely inside these bounds.
    pub fn contains(&self, other: &Bounds) -> bool {
        if other.is_empty() {
            return true;
        }
        self.x.contains_interval(&other.x)
            && self.y.contains_interval(&other.y)
            && self.z.contains_interval(&other.z)
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Grow every axis by `padding` on both sides.
    ///
    /// Primitive bounds are padded so flat geometry (discs, facets) still
    /// has a slab of non-zero thickness.
    pub fn pad(&self, padding: f32) -> Bounds {
        Bounds {
            x: self.x.pad(padding),
            y: self.y.pad(padding),
            z: self.z.pad(padding),
        }
    }

    /// Slab test: does the ray cross the box for some `t` in `ray_t`?
    ///
    /// Axis-parallel rays (zero direction component) are handled explicitly
    /// so no `0 * inf` NaN enters the comparison.
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        if self.is_empty() {
            return false;
        }

        for axis in 0..3 {
            let slab = self.axis(axis);
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];

            if dir == 0.0 {
                if origin < slab.min || origin > slab.max {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (slab.min - origin) * inv;
            let mut t1 = (slab.max - origin) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return false;
            }
        }

        true
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_orders_corners() {
        let b = Bounds::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));
        assert_eq!(b.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(b.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_union_and_contains() {
        let a = Bounds::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let b = Bounds::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let u = a.union(&b);

        assert_eq!(u.min(), Vec3::ZERO);
        assert_eq!(u.max(), Vec3::splat(10.0));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.contains(&u));
        assert_eq!(Bounds::EMPTY.union(&a), a);
        assert!(a.contains(&Bounds::EMPTY));
    }

    #[test]
    fn test_enclosing_points() {
        let points = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 2.0)];
        let b = Bounds::enclosing(&points);
        assert_eq!(b, Bounds::from_points(points[0], points[1]));
        assert!(Bounds::enclosing(&[]).is_empty());
    }

    #[test]
    fn test_slab_hit() {
        let b = Bounds::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let range = Interval::new(0.0, 100.0);

        let toward = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&toward, range));

        let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!b.hit(&away, range));

        let beside = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&beside, range));

        // Range ends before the box is reached.
        assert!(!b.hit(&toward, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_slab_hit_flat_box_and_axis_parallel_rays() {
        // Zero thickness in z, ray travelling along z exactly on the plane.
        let flat = Bounds::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let through = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(flat.hit(&through, Interval::new(0.0, f32::INFINITY)));

        // Ray parallel to the x slab, starting on its boundary.
        let grazing = Ray::new(Vec3::new(1.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(flat.hit(&grazing, Interval::new(0.0, f32::INFINITY)));
    }

    #[test]
    fn test_pad() {
        let b = Bounds::from_points(Vec3::ZERO, Vec3::new(10.0, 2.0, 4.0));
        let padded = b.pad(0.5);
        assert!(padded.contains(&b));
        assert_eq!(padded.min(), Vec3::splat(-0.5));
        assert!(Bounds::EMPTY.pad(1.0).is_empty());
    }

    #[test]
    fn test_contains_point_is_inclusive() {
        let b = Bounds::from_points(Vec3::new(-1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert!(b.contains_point(b.min()));
        assert!(b.contains_point(b.max()));
        assert!(!b.contains_point(Vec3::new(4.1, 5.0, 6.0)));
    }
}

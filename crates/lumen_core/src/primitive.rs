//! Geometric primitives placed in the scene graph.

use std::sync::Arc;

use lumen_math::{Bounds, Interval, Similarity, Vec3};

use crate::error::{check_positive, SceneError, SceneResult};
use crate::facet::FacetStructure;
use crate::material::Material;

/// Padding added to every primitive's bounds so flat shapes keep a
/// non-zero slab thickness.
pub const BOUNDS_PADDING: f32 = 1e-4;

fn check_point(name: &'static str, p: Vec3) -> SceneResult<Vec3> {
    if p.is_finite() {
        Ok(p)
    } else {
        Err(SceneError::InvalidParameter {
            name,
            value: f32::NAN,
            expected: "a finite point",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> SceneResult<Self> {
        Ok(Self {
            center: check_point("sphere center", center)?,
            radius: check_positive("sphere radius", radius)?,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(self.center, self.radius).pad(BOUNDS_PADDING)
    }

    pub fn transform(&mut self, transform: &Similarity) {
        self.center = transform.transform_point(self.center);
        self.radius = transform.transform_length(self.radius);
    }
}

/// A flat circular disc.
#[derive(Debug, Clone)]
pub struct Disc {
    center: Vec3,
    normal: Vec3,
    radius: f32,
    material: Arc<Material>,
}

impl Disc {
    pub fn new(center: Vec3, normal: Vec3, radius: f32, material: Arc<Material>) -> SceneResult<Self> {
        let normal = normal
            .try_normalize()
            .ok_or(SceneError::InvalidParameter {
                name: "disc normal",
                value: normal.length(),
                expected: "a non-zero vector",
            })?;
        Ok(Self {
            center: check_point("disc center", center)?,
            normal,
            radius: check_positive("disc radius", radius)?,
            material,
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Unit normal.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Exact bounds of the disc: along each axis the rim reaches
    /// `radius * sqrt(1 - n_axis^2)` from the center.
    pub fn bounds(&self) -> Bounds {
        let extent = |n: f32| self.radius * (1.0 - n * n).max(0.0).sqrt();
        let c = self.center;
        let n = self.normal;
        Bounds::new(
            Interval::new(c.x - extent(n.x), c.x + extent(n.x)),
            Interval::new(c.y - extent(n.y), c.y + extent(n.y)),
            Interval::new(c.z - extent(n.z), c.z + extent(n.z)),
        )
        .pad(BOUNDS_PADDING)
    }

    pub fn transform(&mut self, transform: &Similarity) {
        self.center = transform.transform_point(self.center);
        self.normal = transform.transform_normal(self.normal).normalize_or(self.normal);
        self.radius = transform.transform_length(self.radius);
    }
}

/// Anything that can be attached to a scene node.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Disc(Disc),
    Facets(FacetStructure),
}

impl Primitive {
    pub fn bounds(&self) -> Bounds {
        match self {
            Primitive::Sphere(s) => s.bounds(),
            Primitive::Disc(d) => d.bounds(),
            Primitive::Facets(f) => f.bounds(),
        }
    }

    pub fn transform(&mut self, transform: &Similarity) {
        match self {
            Primitive::Sphere(s) => s.transform(transform),
            Primitive::Disc(d) => d.transform(transform),
            Primitive::Facets(f) => f.transform(transform),
        }
    }

    /// Materials referenced by this primitive.
    pub fn materials(&self) -> Vec<&Arc<Material>> {
        match self {
            Primitive::Sphere(s) => vec![&s.material],
            Primitive::Disc(d) => vec![&d.material],
            Primitive::Facets(f) => f.materials(),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<Disc> for Primitive {
    fn from(disc: Disc) -> Self {
        Primitive::Disc(disc)
    }
}

impl From<FacetStructure> for Primitive {
    fn from(facets: FacetStructure) -> Self {
        Primitive::Facets(facets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> Arc<Material> {
        Material::builder().build().unwrap()
    }

    #[test]
    fn test_sphere_validation() {
        assert!(Sphere::new(Vec3::ZERO, 1.0, material()).is_ok());
        assert!(Sphere::new(Vec3::ZERO, 0.0, material()).is_err());
        assert!(Sphere::new(Vec3::ZERO, -1.0, material()).is_err());
        assert!(Sphere::new(Vec3::splat(f32::NAN), 1.0, material()).is_err());
    }

    #[test]
    fn test_sphere_bounds_and_transform() {
        let mut s = Sphere::new(Vec3::new(1.0, 2.0, 3.0), 0.5, material()).unwrap();
        assert!(s.bounds().contains(&Bounds::around(Vec3::new(1.0, 2.0, 3.0), 0.5)));

        s.transform(&Similarity::from_scale(-2.0));
        assert_eq!(s.center(), Vec3::new(-2.0, -4.0, -6.0));
        assert_eq!(s.radius(), 1.0);
    }

    #[test]
    fn test_disc_bounds_are_flat_but_padded() {
        let d = Disc::new(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), 2.0, material()).unwrap();
        assert_eq!(d.normal(), Vec3::Y);
        let b = d.bounds();
        assert!(b.y.max > b.y.min && b.y.max - b.y.min < 1e-3);
        assert!((b.x.max - 2.0).abs() < 1e-3);
        assert!((b.z.min + 2.0).abs() < 1e-3);

        assert!(Disc::new(Vec3::ZERO, Vec3::ZERO, 1.0, material()).is_err());
    }

    #[test]
    fn test_tilted_disc_rim_is_inside_bounds() {
        let normal = Vec3::new(1.0, 2.0, -0.5).normalize();
        let d = Disc::new(Vec3::new(3.0, -1.0, 2.0), normal, 1.5, material()).unwrap();
        let b = d.bounds();
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);
        for i in 0..64 {
            let a = i as f32 / 64.0 * std::f32::consts::TAU;
            let rim = d.center() + 1.5 * (a.cos() * u + a.sin() * v);
            assert!(b.contains_point(rim));
        }
    }

    #[test]
    fn test_disc_rotation_turns_normal() {
        let mut d = Disc::new(Vec3::X, Vec3::Y, 1.0, material()).unwrap();
        d.transform(&Similarity::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2));
        assert!((d.normal() - Vec3::NEG_X).length() < 1e-5);
        assert!((d.center() - Vec3::Y).length() < 1e-5);
    }
}

//! Ray intersection for facets and facet structures.

use lumen_core::{Facet, FacetStructure};
use lumen_math::{Bounds, Interval, Ray, Vec3};

use crate::disc::PARALLEL_EPSILON;
use crate::hittable::{Hit, Hittable};

/// Slack on barycentric coordinates so rays through shared edges do not
/// slip between adjacent triangles.
const BARYCENTRIC_EPSILON: f32 = 1e-6;

/// Barycentric coordinates of `p` in triangle `(a, b, c)`, if inside.
fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<(f32, f32, f32)> {
    let e0 = b - a;
    let e1 = c - a;
    let e2 = p - a;
    let d00 = e0.dot(e0);
    let d01 = e0.dot(e1);
    let d11 = e1.dot(e1);
    let d20 = e2.dot(e0);
    let d21 = e2.dot(e1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < f32::EPSILON * d00 * d11 || denom == 0.0 {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    (u >= -BARYCENTRIC_EPSILON && v >= -BARYCENTRIC_EPSILON && w >= -BARYCENTRIC_EPSILON)
        .then_some((u, v, w))
}

impl Hittable for Facet {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let n = self.normal();
        let denom = n.dot(ray.direction());
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let vertices = self.vertices();
        let t = n.dot(vertices[0] - ray.origin()) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }
        let p = ray.at(t);

        // Fan triangulation from vertex 0.
        let (i, (u, v, w)) = (1..vertices.len() - 1).find_map(|i| {
            barycentric(p, vertices[0], vertices[i], vertices[i + 1]).map(|b| (i, b))
        })?;

        let mut hit = Hit::new(ray, t, n, self.material());
        if let Some(normals) = self.vertex_normals() {
            let smooth = (u * normals[0] + v * normals[i] + w * normals[i + 1]).normalize_or(n);
            hit.normal = if hit.front_face { smooth } else { -smooth };
        }
        Some(hit)
    }

    fn bounds(&self) -> Bounds {
        Facet::bounds(self)
    }
}

impl Hittable for FacetStructure {
    /// Walks the group tree with an explicit stack, skipping any group whose
    /// bounds the ray misses within the current nearest distance.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let groups = self.groups();
        let mut closest: Option<Hit<'a>> = None;
        let mut stack = vec![0usize];

        while let Some(index) = stack.pop() {
            let Some(group) = groups.get(index) else {
                continue;
            };
            let max = closest.as_ref().map_or(ray_t.max, |h| h.t);
            if !group.bounds().hit(ray, Interval::new(ray_t.min, max)) {
                continue;
            }

            for facet in group.facets() {
                let max = closest.as_ref().map_or(ray_t.max, |h| h.t);
                if let Some(hit) = facet.hit(ray, Interval::new(ray_t.min, max)) {
                    closest = Some(hit);
                }
            }
            stack.extend_from_slice(group.children());
        }

        closest
    }

    fn bounds(&self) -> Bounds {
        FacetStructure::bounds(self)
    }
}

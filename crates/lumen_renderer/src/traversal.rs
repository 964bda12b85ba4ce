//! Nearest-hit queries against a finalised scene.
//!
//! The scene graph is walked with an explicit stack. A node whose cached
//! bounds the ray misses (within the nearest distance found so far) is
//! skipped together with its whole subtree.

use lumen_core::Scene;
use lumen_math::{Bounds, Interval, Ray};

use crate::hittable::{Hit, Hittable};

/// Find the nearest intersection along `ray` within `ray_t`.
///
/// Texture coordinates are projected for the returned hit only.
pub fn intersect_scene<'a>(scene: &'a Scene, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
    let mut closest: Option<Hit<'a>> = None;
    let mut stack = vec![scene.root()];

    while let Some(id) = stack.pop() {
        let max = closest.as_ref().map_or(ray_t.max, |h| h.t);
        if !scene.node_bounds(id).hit(ray, Interval::new(ray_t.min, max)) {
            continue;
        }

        let node = scene.node(id);
        for primitive in node.primitives() {
            let max = closest.as_ref().map_or(ray_t.max, |h| h.t);
            if let Some(hit) = primitive.hit(ray, Interval::new(ray_t.min, max)) {
                closest = Some(hit);
            }
        }
        stack.extend_from_slice(node.children());
    }

    closest.map(|mut hit| {
        hit.uv = hit
            .material
            .projection()
            .and_then(|projection| projection.project(hit.point));
        hit
    })
}

impl Hittable for Scene {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        intersect_scene(self, ray, ray_t)
    }

    fn bounds(&self) -> Bounds {
        Scene::bounds(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::SELF_INTERSECTION_EPSILON;
    use lumen_core::{ImageProjection, Material, ProjectionKind, SceneGraph, Sphere};
    use lumen_math::Vec3;

    fn range() -> Interval {
        Interval::new(SELF_INTERSECTION_EPSILON, f32::INFINITY)
    }

    fn sphere_at(z: f32, color: Vec3) -> Sphere {
        let material = Material::builder().with_color(color).build().unwrap();
        Sphere::new(Vec3::new(0.0, 0.0, z), 1.0, material).unwrap()
    }

    #[test]
    fn test_nearest_hit_across_nodes() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let near = g.add_node();
        let far = g.add_node();
        g.attach_child(root, far).unwrap();
        g.attach_child(root, near).unwrap();
        g.attach_primitive(far, sphere_at(-10.0, Vec3::X)).unwrap();
        g.attach_primitive(near, sphere_at(-3.0, Vec3::Y)).unwrap();
        let scene = Scene::new(g, root).unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = intersect_scene(&scene, &ray, range()).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert_eq!(hit.material.color(), Vec3::Y);

        let miss = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(intersect_scene(&scene, &miss, range()).is_none());
    }

    #[test]
    fn test_empty_scene_misses() {
        let mut g = SceneGraph::new();
        let root = g.add_node();
        let scene = Scene::new(g, root).unwrap();
        assert!(scene.hit(&Ray::new(Vec3::ZERO, Vec3::X), range()).is_none());
    }

    #[test]
    fn test_uv_is_projected_for_nearest_hit() {
        let projection = ImageProjection::new(
            ProjectionKind::Parallel,
            "grid.png",
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        );
        let material = Material::builder().with_projection(projection).build().unwrap();

        let mut g = SceneGraph::new();
        let root = g.add_node();
        g.attach_primitive(root, Sphere::new(Vec3::ZERO, 1.0, material).unwrap())
            .unwrap();
        let scene = Scene::new(g, root).unwrap();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = intersect_scene(&scene, &ray, range()).unwrap();
        let uv = hit.uv.unwrap();
        assert!((uv.x - 0.5).abs() < 1e-5);
        assert!((uv.y - 0.5).abs() < 1e-5);
    }
}

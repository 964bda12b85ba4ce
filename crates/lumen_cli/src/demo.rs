//! Built-in demo scene.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use lumen_core::{
    kelvin_to_rgb, Disc, FacetStructure, Material, Scene, SceneGraph, SceneResult, Sphere,
};
use lumen_math::Vec3;
use lumen_renderer::{Camera, RenderMode};

/// Colour temperature of the area light.
const LIGHT_KELVIN: f32 = 3200.0;

/// Latitude/longitude sphere of unit radius as a facet structure. Every
/// facet winds counter-clockwise seen from outside.
fn uv_sphere(segments: usize, rings: usize, material: Arc<Material>) -> SceneResult<FacetStructure> {
    let mut vertices = vec![Vec3::Y];
    for r in 1..rings {
        let theta = PI * r as f32 / rings as f32;
        for s in 0..segments {
            let phi = TAU * s as f32 / segments as f32;
            vertices.push(Vec3::new(
                theta.sin() * phi.cos(),
                theta.cos(),
                theta.sin() * phi.sin(),
            ));
        }
    }
    let south = vertices.len();
    vertices.push(Vec3::NEG_Y);

    let ring = |r: usize, s: usize| 1 + (r - 1) * segments + s % segments;
    let mut polygons = Vec::new();
    for s in 0..segments {
        polygons.push(vec![0, ring(1, s + 1), ring(1, s)]);
        for r in 1..rings - 1 {
            polygons.push(vec![ring(r, s), ring(r, s + 1), ring(r + 1, s + 1), ring(r + 1, s)]);
        }
        polygons.push(vec![ring(rings - 1, s), ring(rings - 1, s + 1), south]);
    }

    let mut structure = FacetStructure::from_polygons(&vertices, &polygons, material)?;
    structure.compute_smooth_normals();
    Ok(structure)
}

/// The demo scene: environment sphere, warm area light, floor disc and a
/// row of diffuse, glossy, glass and smooth-faceted objects.
pub fn demo_scene() -> SceneResult<Scene> {
    let mut graph = SceneGraph::new();
    let root = graph.add_node();

    let sky = Material::builder()
        .with_color(Vec3::ZERO)
        .with_emission(Vec3::new(0.35, 0.45, 0.6))
        .with_ray_terminator(true)
        .build()?;
    graph.attach_primitive(root, Sphere::new(Vec3::ZERO, 50.0, sky)?)?;

    let light = Material::builder()
        .with_color(Vec3::ZERO)
        .with_emission(kelvin_to_rgb(LIGHT_KELVIN) * 8.0)
        .with_ray_terminator(true)
        .build()?;
    graph.attach_primitive(root, Disc::new(Vec3::new(0.0, 4.0, 0.5), Vec3::NEG_Y, 1.5, light)?)?;

    let floor = Material::builder().with_color(Vec3::splat(0.6)).build()?;
    graph.attach_primitive(root, Disc::new(Vec3::ZERO, Vec3::Y, 12.0, floor)?)?;

    let objects = graph.add_node();
    graph.attach_child(root, objects)?;

    let clay = Material::builder()
        .with_color(Vec3::new(0.7, 0.2, 0.15))
        .build()?;
    let chrome = Material::builder()
        .with_color(Vec3::splat(0.9))
        .with_glossiness(0.85)
        .with_roughness(0.05)
        .build()?;
    let glass = Material::builder()
        .with_color(Vec3::ONE)
        .with_transparency(1.0)
        .with_refraction_index(1.5)
        .build()?;
    graph.attach_primitive(objects, Sphere::new(Vec3::new(-1.6, 0.6, 0.0), 0.6, clay)?)?;
    graph.attach_primitive(objects, Sphere::new(Vec3::new(0.0, 0.6, -0.8), 0.6, chrome)?)?;
    graph.attach_primitive(objects, Sphere::new(Vec3::new(1.6, 0.6, 0.0), 0.6, glass)?)?;

    // Built at the origin and placed through the graph.
    let jade = Material::builder()
        .with_color(Vec3::new(0.25, 0.6, 0.35))
        .with_glossiness(0.2)
        .with_roughness(0.3)
        .build()?;
    let gem = graph.add_node();
    graph.attach_child(objects, gem)?;
    graph.attach_primitive(gem, uv_sphere(16, 8, jade)?)?;
    graph.rotate(gem, Vec3::Y, PI / 16.0)?;
    graph.scale(gem, 0.45)?;
    graph.translate(gem, Vec3::new(0.0, 0.45, 1.2))?;

    Scene::new(graph, root)
}

/// Camera framing the demo scene.
pub fn demo_camera(samples: u32, render_mode: RenderMode) -> SceneResult<Camera> {
    Camera::builder()
        .with_resolution(640, 360)
        .with_position(Vec3::new(0.0, 1.6, 6.0), Vec3::new(0.0, 0.6, 0.0), Vec3::Y)
        .with_view_plane_distance(880.0)
        .with_lens(0.03, None)
        .with_quality(samples, 6)
        .with_render_mode(render_mode)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Primitive;

    #[test]
    fn test_uv_sphere_faces_outward() {
        let material = Material::builder().build().unwrap();
        let sphere = uv_sphere(12, 6, material).unwrap();
        assert_eq!(sphere.facet_count(), 12 * 6);
        for facet in sphere.facets() {
            let centroid =
                facet.vertices().iter().copied().sum::<Vec3>() / facet.vertices().len() as f32;
            assert!(facet.normal().dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_demo_scene_builds() {
        let scene = demo_scene().unwrap();
        let kinds = scene.primitives().fold([0; 3], |mut acc, p| {
            match p {
                Primitive::Sphere(_) => acc[0] += 1,
                Primitive::Disc(_) => acc[1] += 1,
                Primitive::Facets(_) => acc[2] += 1,
            }
            acc
        });
        assert_eq!(kinds, [4, 2, 1]);
        assert!(scene.bounds().contains_point(Vec3::new(0.0, 0.45, 1.2)));

        let camera = demo_camera(4, RenderMode::Pathtracing).unwrap();
        assert_eq!(camera.output_size(), (640, 360));
    }
}

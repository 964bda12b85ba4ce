//! Surface shading: lobe selection and scattered ray generation.
//!
//! Each bounce picks one of three lobes with probability equal to its
//! blend weight in the material (specular `g`, refraction `(1-g)t`,
//! diffuse `(1-g)(1-t)`), so the path weight for any lobe is the surface
//! colour.

use lumen_core::{Color, Material, TextureSet};
use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::hittable::Hit;
use crate::sampling::{cosine_direction, gen_f32, random_unit_vector};

/// Outgoing ray and the factor it carries back along the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    pub ray: Ray,
    pub weight: Color,
}

/// Texel under the hit, if the material projects an image that is loaded.
fn texel(hit: &Hit<'_>, material: &Material, textures: &TextureSet) -> Option<Color> {
    let projection = material.projection()?;
    let uv = hit.uv?;
    let texture = textures.get(&projection.path, projection.gamma)?;
    Some(texture.sample(uv.x, uv.y))
}

/// Base colour at the hit. A projected texel replaces the static colour.
pub fn surface_color(hit: &Hit<'_>, material: &Material, textures: &TextureSet) -> Color {
    texel(hit, material, textures).unwrap_or(material.color())
}

/// Light emitted at the hit. A projected texel tints the emission.
pub fn emitted_radiance(hit: &Hit<'_>, material: &Material, textures: &TextureSet) -> Color {
    if !material.is_emissive() {
        return Color::ZERO;
    }
    match texel(hit, material, textures) {
        Some(texel) => texel * material.emission(),
        None => material.emission(),
    }
}

/// Direct shading used by raycasting mode: emission plus the surface colour
/// lit from the eye.
pub fn headlight(hit: &Hit<'_>, ray: &Ray, material: &Material, textures: &TextureSet) -> Color {
    let cos = ray
        .direction()
        .try_normalize()
        .map_or(1.0, |d| hit.normal.dot(d).abs());
    emitted_radiance(hit, material, textures) + surface_color(hit, material, textures) * cos
}

/// Pick a lobe and scatter. Ray terminators never scatter.
pub fn shade(
    hit: &Hit<'_>,
    ray: &Ray,
    material: &Material,
    textures: &TextureSet,
    rng: &mut dyn RngCore,
) -> Option<Scatter> {
    if material.is_ray_terminator() {
        return None;
    }

    let glossiness = material.glossiness();
    let transparency = material.transparency();
    let r = gen_f32(rng);
    let direction = if r < glossiness {
        specular(hit, ray, material.roughness(), rng)
    } else if r < glossiness + (1.0 - glossiness) * transparency {
        refraction(hit, ray, material.refraction_index(), rng)
    } else {
        cosine_direction(hit.normal, rng)
    };

    let direction = if direction.length_squared() > 1e-12 && direction.is_finite() {
        direction
    } else {
        hit.normal
    };

    Some(Scatter {
        ray: Ray::new(hit.point, direction),
        weight: surface_color(hit, material, textures),
    })
}

fn specular(hit: &Hit<'_>, ray: &Ray, roughness: f32, rng: &mut dyn RngCore) -> Vec3 {
    let mirror = reflect(ray.direction().normalize_or_zero(), hit.normal);
    if roughness <= 0.0 {
        return mirror;
    }
    let fuzzed = mirror + roughness * random_unit_vector(rng);
    if fuzzed.dot(hit.normal) > 0.0 {
        fuzzed
    } else {
        mirror
    }
}

fn refraction(hit: &Hit<'_>, ray: &Ray, ior: f32, rng: &mut dyn RngCore) -> Vec3 {
    let ratio = if hit.front_face { 1.0 / ior } else { ior };

    let unit_direction = ray.direction().normalize_or_zero();
    let cos_theta = (-unit_direction).dot(hit.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    let cannot_refract = ratio * sin_theta > 1.0;
    if cannot_refract || reflectance(cos_theta, ratio) > gen_f32(rng) {
        reflect(unit_direction, hit.normal)
    } else {
        refract(unit_direction, hit.normal, ratio)
    }
}

/// Schlick's approximation for reflectance.
fn reflectance(cosine: f32, ior: f32) -> f32 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{ImageProjection, ProjectionKind, Texture};
    use lumen_math::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn hit_on_floor(material: &Material) -> (Hit<'_>, Ray) {
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        (Hit::new(&ray, 1.0, Vec3::Y, material), ray)
    }

    fn build(builder: lumen_core::MaterialBuilder) -> Arc<Material> {
        builder.build().unwrap()
    }

    #[test]
    fn test_terminator_does_not_scatter() {
        let m = build(Material::builder().with_ray_terminator(true).with_emission(Vec3::ONE));
        let (hit, ray) = hit_on_floor(&m);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).is_none());
        assert_eq!(emitted_radiance(&hit, &m, &TextureSet::empty()), Vec3::ONE);
    }

    #[test]
    fn test_diffuse_scatters_above_surface_with_color_weight() {
        let color = Vec3::new(0.2, 0.4, 0.6);
        let m = build(Material::builder().with_color(color));
        let (hit, ray) = hit_on_floor(&m);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let s = shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).unwrap();
            assert!(s.ray.direction().dot(Vec3::Y) >= 0.0);
            assert_eq!(s.weight, color);
            assert_eq!(s.ray.origin(), hit.point);
        }
    }

    #[test]
    fn test_perfect_mirror() {
        let m = build(Material::builder().with_glossiness(1.0).with_roughness(0.0));
        let (hit, ray) = hit_on_floor(&m);
        let mut rng = StdRng::seed_from_u64(3);
        let s = shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((s.ray.direction().normalize() - expected).length() < 1e-5);
    }

    #[test]
    fn test_rough_mirror_stays_above_surface() {
        let m = build(Material::builder().with_glossiness(1.0).with_roughness(1.0));
        let (hit, ray) = hit_on_floor(&m);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let s = shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).unwrap();
            assert!(s.ray.direction().dot(Vec3::Y) > 0.0);
        }
    }

    #[test]
    fn test_glass_at_normal_incidence_mostly_transmits() {
        let m = build(
            Material::builder()
                .with_transparency(1.0)
                .with_refraction_index(1.5),
        );
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        let hit = Hit::new(&ray, 1.0, Vec3::Y, &m);
        let mut rng = StdRng::seed_from_u64(5);
        let transmitted = (0..1000)
            .filter(|_| {
                let s = shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).unwrap();
                s.ray.direction().y < 0.0
            })
            .count();
        // Schlick gives 4% reflectance head-on.
        assert!(transmitted > 900, "transmitted {transmitted}");
    }

    #[test]
    fn test_total_internal_reflection() {
        let m = build(
            Material::builder()
                .with_transparency(1.0)
                .with_refraction_index(1.5),
        );
        // Leaving the glass at a grazing angle.
        let ray = Ray::new(Vec3::new(-1.0, -0.2, 0.0), Vec3::new(1.0, 0.2, 0.0));
        let hit = Hit::new(&ray, 1.0, Vec3::Y, &m);
        assert!(!hit.front_face);
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            let s = shade(&hit, &ray, &m, &TextureSet::empty(), &mut rng).unwrap();
            assert!(s.ray.direction().y < 0.0);
        }
    }

    #[test]
    fn test_texel_replaces_color_and_tints_emission() {
        let projection = ImageProjection::new(
            ProjectionKind::Parallel,
            "red.png",
            Vec3::ZERO,
            Vec3::X,
            Vec3::Z,
        );
        let m = build(
            Material::builder()
                .with_color(Vec3::ONE)
                .with_emission(Vec3::splat(2.0))
                .with_projection(projection.clone()),
        );
        let mut textures = TextureSet::empty();
        textures.insert(
            "red.png",
            projection.gamma,
            Texture::solid_color(Vec3::new(1.0, 0.0, 0.0)),
        );

        let (mut hit, _) = hit_on_floor(&m);
        // Without a projected uv the static values are used.
        assert_eq!(surface_color(&hit, &m, &textures), Vec3::ONE);

        hit.uv = Some(Vec2::new(0.5, 0.5));
        assert_eq!(surface_color(&hit, &m, &textures), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(
            emitted_radiance(&hit, &m, &textures),
            Vec3::new(2.0, 0.0, 0.0)
        );

        // A texture that was never loaded falls back as well.
        assert_eq!(surface_color(&hit, &m, &TextureSet::empty()), Vec3::ONE);
    }

    #[test]
    fn test_headlight_uses_incidence_angle() {
        let m = build(Material::builder().with_color(Vec3::ONE));
        let (hit, ray) = hit_on_floor(&m);
        let c = headlight(&hit, &ray, &m, &TextureSet::empty());
        let expected = std::f32::consts::FRAC_1_SQRT_2;
        assert!((c.x - expected).abs() < 1e-5);
    }
}

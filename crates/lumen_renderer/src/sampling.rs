//! Random sampling helpers and per-pixel random streams.

use lumen_math::{Vec2, Vec3};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed unit vector.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling for uniform distribution on sphere
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Uniform point in the unit disk.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    loop {
        let p = Vec2::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Cosine-weighted direction about `normal`. Degenerate draws fall back to
/// the normal itself.
pub fn cosine_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let direction = normal + random_unit_vector(rng);
    if direction.length_squared() < 1e-8 || !direction.is_finite() {
        normal
    } else {
        direction
    }
}

/// Sub-pixel offset in `[-0.5, 0.5)^2` for sample `sample_index` of
/// `samples`.
///
/// Samples are spread over a `k x k` grid (`k = ceil(sqrt(samples))`) and
/// jittered uniformly within their cell.
pub fn stratified_jitter(sample_index: u32, samples: u32, rng: &mut dyn RngCore) -> Vec2 {
    let k = (samples.max(1) as f32).sqrt().ceil() as u32;
    let cell = sample_index % (k * k);
    let (cx, cy) = (cell % k, cell / k);
    Vec2::new(
        (cx as f32 + gen_f32(rng)) / k as f32 - 0.5,
        (cy as f32 + gen_f32(rng)) / k as f32 - 0.5,
    )
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Random stream for one pixel, independent of which thread renders it.
pub fn pixel_rng(seed: u64, pixel_index: u64) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(splitmix64(seed ^ splitmix64(pixel_index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_unit_vectors() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!((random_unit_vector(&mut rng).length() - 1.0).abs() < 1e-5);
            assert!(random_in_unit_disk(&mut rng).length() < 1.0);
        }
    }

    #[test]
    fn test_cosine_direction_stays_above_surface() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..1000 {
            assert!(cosine_direction(n, &mut rng).dot(n) >= 0.0);
        }
    }

    #[test]
    fn test_stratified_jitter_covers_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = 9;
        let mut seen = [false; 9];
        for i in 0..samples {
            let j = stratified_jitter(i, samples, &mut rng);
            assert!(j.x >= -0.5 && j.x < 0.5 && j.y >= -0.5 && j.y < 0.5);
            let cx = ((j.x + 0.5) * 3.0) as usize;
            let cy = ((j.y + 0.5) * 3.0) as usize;
            assert_eq!(cy * 3 + cx, i as usize);
            seen[cy * 3 + cx] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_pixel_streams_are_reproducible_and_distinct() {
        let a: u64 = pixel_rng(42, 7).next_u64();
        let b: u64 = pixel_rng(42, 7).next_u64();
        let c: u64 = pixel_rng(42, 8).next_u64();
        let d: u64 = pixel_rng(43, 7).next_u64();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }
}

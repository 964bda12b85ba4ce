//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative bounce loop with configurable depth
//! - Headlight raycasting preview mode
//! - Per-pixel random streams, so output does not depend on thread count

use lumen_core::{Color, ImageBuffer, Scene, Texture, TextureSet};
use lumen_math::{Interval, Ray};
use rand::RngCore;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::camera::{Camera, RenderMode};
use crate::hittable::SELF_INTERSECTION_EPSILON;
use crate::monitor::Monitor;
use crate::sampling::pixel_rng;
use crate::shading::{emitted_radiance, headlight, shade};
use crate::traversal::intersect_scene;

/// How a path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Hit a ray-terminator material; only its emission counts.
    TerminatorHit,
    /// Left the scene.
    Miss,
    /// Reached a surface with no bounces left.
    DepthExhausted,
}

/// Radiance carried by one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    pub termination: Termination,
}

/// Linear sample sum for one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelSample {
    pub sum: Color,
    pub samples: u32,
}

impl PixelSample {
    /// Mean of the samples.
    pub fn value(&self) -> Color {
        if self.samples == 0 {
            Color::ZERO
        } else {
            self.sum / self.samples as f32
        }
    }
}

/// Everything a worker needs to render pixels. Shared read-only across
/// threads.
pub struct RenderContext<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    textures: &'a TextureSet,
    mask: Option<&'a Texture>,
    seed: u64,
}

impl<'a> RenderContext<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, textures: &'a TextureSet, seed: u64) -> Self {
        let mask = camera
            .aperture_mask()
            .and_then(|mask| textures.get(&mask.path, mask.gamma));
        Self {
            scene,
            camera,
            textures,
            mask,
            seed,
        }
    }

    pub fn camera(&self) -> &Camera {
        self.camera
    }

    /// Accepted parameter range for `ray`. The self-intersection offset is
    /// a world distance, so it shrinks as the direction grows.
    fn ray_range(ray: &Ray) -> Interval {
        Interval::new(
            SELF_INTERSECTION_EPSILON / ray.direction.length(),
            f32::INFINITY,
        )
    }

    /// Follow one path with at most `depth` bounces.
    pub fn trace_path(&self, ray: Ray, depth: u32, rng: &mut dyn RngCore) -> PathSample {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = ray;
        let mut depth = depth;

        loop {
            let Some(hit) = intersect_scene(self.scene, &ray, Self::ray_range(&ray)) else {
                return PathSample {
                    radiance,
                    termination: Termination::Miss,
                };
            };
            let material = hit.material;
            radiance += throughput * emitted_radiance(&hit, material, self.textures);

            if material.is_ray_terminator() {
                return PathSample {
                    radiance,
                    termination: Termination::TerminatorHit,
                };
            }
            if depth == 0 {
                return PathSample {
                    radiance,
                    termination: Termination::DepthExhausted,
                };
            }

            let Some(scatter) = shade(&hit, &ray, material, self.textures, rng) else {
                return PathSample {
                    radiance,
                    termination: Termination::TerminatorHit,
                };
            };
            throughput *= scatter.weight;
            ray = scatter.ray;
            depth -= 1;
        }
    }

    /// Non-recursive preview shading of the first hit.
    pub fn raycast(&self, ray: &Ray) -> Color {
        intersect_scene(self.scene, ray, Self::ray_range(ray))
            .map_or(Color::ZERO, |hit| headlight(&hit, ray, hit.material, self.textures))
    }

    /// Render every sample of one output pixel.
    pub fn render_pixel(&self, x: u32, y: u32) -> PixelSample {
        let (width, _) = self.camera.output_size();
        let mut rng = pixel_rng(self.seed, y as u64 * width as u64 + x as u64);
        let samples = self.camera.samples();

        let mut sum = Color::ZERO;
        for sample_index in 0..samples {
            let ray = self
                .camera
                .primary_ray(x, y, sample_index, self.mask, &mut rng);
            let radiance = match self.camera.render_mode() {
                RenderMode::Raycasting => self.raycast(&ray),
                RenderMode::Pathtracing => {
                    self.trace_path(ray, self.camera.recursion_depth(), &mut rng)
                        .radiance
                }
            };
            if radiance.is_finite() {
                sum += radiance;
            } else {
                log::trace!("Discarding non-finite sample {sample_index} at ({x}, {y})");
            }
        }

        PixelSample { sum, samples }
    }
}

/// Render the whole image in parallel buckets on the current rayon pool.
///
/// Each finished bucket is mirrored to `monitor` when one is given.
pub fn render_image(
    ctx: &RenderContext<'_>,
    bucket_size: u32,
    monitor: Option<&Monitor>,
) -> ImageBuffer {
    let (width, height) = ctx.camera.output_size();
    let buckets = generate_buckets(width, height, bucket_size);
    log::info!(
        "Rendering {}x{} in {} buckets ({} samples/pixel, {} threads)",
        width,
        height,
        buckets.len(),
        ctx.camera.samples(),
        rayon::current_num_threads()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let result = render_bucket(bucket, ctx);
            if let Some(monitor) = monitor {
                monitor.send_bucket(&result);
            }
            result
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_region(result.bucket.x, result.bucket.y, result.bucket.width, &result.colors());
    }
    image
}

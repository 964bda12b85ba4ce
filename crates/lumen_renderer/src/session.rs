//! Render session: texture preloading, thread pool setup and output.

use std::time::Instant;

use lumen_core::{ImageBuffer, Scene, TextureCache, TextureSet};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::monitor::Monitor;
use crate::renderer::{render_image, RenderContext};

/// Owns the configuration and the texture cache for a series of renders.
pub struct RenderSession {
    config: RenderConfig,
    cache: TextureCache,
}

impl RenderSession {
    /// Session decoding textures with the `image` crate.
    pub fn new(config: RenderConfig) -> Self {
        Self::with_cache(config, TextureCache::new())
    }

    /// Session over a caller-supplied cache. The configured texture
    /// directory, if any, overrides the cache's base directory.
    pub fn with_cache(config: RenderConfig, cache: TextureCache) -> Self {
        let cache = match &config.texture_dir {
            Some(dir) => cache.with_base_dir(dir),
            None => cache,
        };
        Self { config, cache }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    /// Decode every texture the scene and camera refer to, then return
    /// the read-only set used while rendering. Any load failure aborts.
    pub fn prepare(&self, scene: &Scene, camera: &Camera) -> RenderResult<TextureSet> {
        for primitive in scene.primitives() {
            for material in primitive.materials() {
                if let Some(projection) = material.projection() {
                    self.cache.load(&projection.path, projection.gamma)?;
                }
            }
        }
        if let Some(mask) = camera.aperture_mask() {
            self.cache.load(&mask.path, mask.gamma)?;
        }

        log::debug!(
            "Prepared {} textures ({:.1} KB)",
            self.cache.len(),
            self.cache.total_size_bytes() as f32 / 1024.0
        );
        Ok(self.cache.snapshot())
    }

    /// Render `scene` through `camera` and write the configured outputs.
    pub fn render(&self, scene: &Scene, camera: &Camera) -> RenderResult<ImageBuffer> {
        let textures = self.prepare(scene, camera)?;
        let ctx = RenderContext::new(scene, camera, &textures, self.config.seed);
        let (width, height) = camera.output_size();

        let monitor = match &self.config.monitor {
            Some(config) => Some(Monitor::connect(
                config,
                width,
                height,
                self.config.output_gamma,
            )?),
            None => None,
        };

        let start = Instant::now();
        let render = || render_image(&ctx, self.config.bucket_size, monitor.as_ref());
        let image = match self.config.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(render),
            None => render(),
        };
        log::info!("Render finished in {:.2?}", start.elapsed());

        self.write_outputs(&image)?;
        Ok(image)
    }

    /// Write PNG and raw files for whichever paths are configured.
    pub fn write_outputs(&self, image: &ImageBuffer) -> RenderResult<()> {
        if let Some(path) = &self.config.png_path {
            image.save_png(path, self.config.output_gamma)?;
        }
        if let Some(path) = &self.config.raw_path {
            image.save_raw(path)?;
            log::info!("Wrote raw image {}", path.display());
        }
        Ok(())
    }
}

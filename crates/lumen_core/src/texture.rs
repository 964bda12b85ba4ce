//! Texture loading and caching.
//!
//! Images are decoded once into linear-light float pixels. The
//! [`TextureCache`] is shared by every worker during scene preparation and
//! guarantees a single decode per (path, gamma) key even when many threads
//! ask for the same texture at once. Rendering reads from an immutable
//! [`TextureSet`] snapshot taken after preloading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::color::{gamma_decode, Color};

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to read texture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode texture {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {} has no pixels", .0.display())]
    Empty(PathBuf),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded texture in linear light.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,

    /// RGBA per pixel, row-major from the top-left corner.
    pub pixels: Vec<[f32; 4]>,

    /// Source path, for log messages.
    pub path: String,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Color) -> Self {
        Self::new(1, 1, vec![[color.x, color.y, color.z, 1.0]], "<solid>")
    }

    /// Bilinear sample at `(u, v)`.
    ///
    /// `(0, 0)` is the top-left corner of the image and `(1, 1)` the
    /// bottom-right. Coordinates outside [0, 1] are clamped; wrapping is the
    /// projection's job.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::ZERO;
        }

        let x = u.clamp(0.0, 1.0) * (self.width - 1) as f32;
        let y = v.clamp(0.0, 1.0) * (self.height - 1) as f32;

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let top = self.texel(x0, y0).lerp(self.texel(x1, y0), fx);
        let bottom = self.texel(x0, y1).lerp(self.texel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    fn texel(&self, x: u32, y: u32) -> Color {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .unwrap_or(Color::ZERO)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Turns an image file into a linear-light [`Texture`].
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, path: &Path, gamma: f32) -> TextureResult<Texture>;
}

/// Decoder backed by the `image` crate (PNG and JPEG).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path, gamma: f32) -> TextureResult<Texture> {
        let img = image::open(path).map_err(|source| match source {
            image::ImageError::IoError(source) => TextureError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => TextureError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path.to_path_buf()));
        }

        let channel = |c: u8| gamma_decode(c as f32 / 255.0, gamma);
        let pixels = rgba
            .pixels()
            .map(|p| [channel(p[0]), channel(p[1]), channel(p[2]), p[3] as f32 / 255.0])
            .collect();

        Ok(Texture::new(
            width,
            height,
            pixels,
            path.to_string_lossy().to_string(),
        ))
    }
}

/// Cache key: the resolved path and the decode gamma.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    pub path: PathBuf,
    gamma_bits: u32,
}

impl TextureKey {
    pub fn new(path: impl Into<PathBuf>, gamma: f32) -> Self {
        Self {
            path: path.into(),
            gamma_bits: gamma.to_bits(),
        }
    }

    pub fn gamma(&self) -> f32 {
        f32::from_bits(self.gamma_bits)
    }
}

fn resolve_path(base_dir: Option<&Path>, path: &Path) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

#[derive(Default)]
struct Slot {
    texture: OnceLock<Arc<Texture>>,
    init: Mutex<()>,
}

/// Thread-safe texture cache.
///
/// Each key owns a slot that is filled at most once. The first thread to
/// touch a slot decodes while holding the slot's init lock; concurrent
/// callers for the same key wait on that lock and then share the result.
/// Failed decodes leave the slot empty, so a later call may retry.
pub struct TextureCache {
    decoder: Box<dyn ImageDecoder>,
    base_dir: Option<PathBuf>,
    slots: RwLock<HashMap<TextureKey, Arc<Slot>>>,
}

impl TextureCache {
    /// Create a cache that decodes with the `image` crate.
    pub fn new() -> Self {
        Self::with_decoder(ImageCrateDecoder)
    }

    pub fn with_decoder(decoder: impl ImageDecoder + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            base_dir: None,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve relative texture paths against `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn key(&self, path: &Path, gamma: f32) -> TextureKey {
        TextureKey::new(resolve_path(self.base_dir.as_deref(), path), gamma)
    }

    fn slot(&self, key: &TextureKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(key) {
            return slot.clone();
        }
        self.slots.write().entry(key.clone()).or_default().clone()
    }

    /// Load a texture, decoding it on first use.
    pub fn load(&self, path: &Path, gamma: f32) -> TextureResult<Arc<Texture>> {
        let key = self.key(path, gamma);
        let slot = self.slot(&key);

        if let Some(texture) = slot.texture.get() {
            return Ok(texture.clone());
        }

        let _guard = slot.init.lock();
        if let Some(texture) = slot.texture.get() {
            return Ok(texture.clone());
        }

        let texture = Arc::new(self.decoder.decode(&key.path, gamma)?);
        log::debug!(
            "Loaded texture: {} ({}x{}, gamma {}, {:.1} KB)",
            key.path.display(),
            texture.width,
            texture.height,
            gamma,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(slot.texture.get_or_init(|| texture).clone())
    }

    /// Get a cached texture without loading.
    pub fn get(&self, path: &Path, gamma: f32) -> Option<Arc<Texture>> {
        let key = self.key(path, gamma);
        self.slots
            .read()
            .get(&key)
            .and_then(|slot| slot.texture.get().cloned())
    }

    /// Number of decoded textures.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.texture.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get total memory usage of cached textures.
    pub fn total_size_bytes(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter_map(|slot| slot.texture.get())
            .map(|t| t.size_bytes())
            .sum()
    }

    /// Immutable view of every texture decoded so far.
    pub fn snapshot(&self) -> TextureSet {
        let textures = self
            .slots
            .read()
            .iter()
            .filter_map(|(key, slot)| slot.texture.get().map(|t| (key.clone(), t.clone())))
            .collect();
        TextureSet {
            base_dir: self.base_dir.clone(),
            textures,
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only textures available during rendering.
#[derive(Clone, Default)]
pub struct TextureSet {
    base_dir: Option<PathBuf>,
    textures: HashMap<TextureKey, Arc<Texture>>,
}

impl TextureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path, gamma: f32) -> Option<&Texture> {
        let key = TextureKey::new(resolve_path(self.base_dir.as_deref(), path), gamma);
        self.textures.get(&key).map(|t| t.as_ref())
    }

    /// Add a texture directly, bypassing decoding.
    pub fn insert(&mut self, path: impl Into<PathBuf>, gamma: f32, texture: Texture) {
        let path = resolve_path(self.base_dir.as_deref(), &path.into());
        self.textures
            .insert(TextureKey::new(path, gamma), Arc::new(texture));
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    struct CountingDecoder {
        calls: Arc<AtomicUsize>,
    }

    impl ImageDecoder for CountingDecoder {
        fn decode(&self, path: &Path, gamma: f32) -> TextureResult<Texture> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            let v = gamma_decode(0.5, gamma);
            Ok(Texture::new(
                2,
                1,
                vec![[v, v, v, 1.0], [1.0, 1.0, 1.0, 1.0]],
                path.to_string_lossy().to_string(),
            ))
        }
    }

    struct FailingDecoder;

    impl ImageDecoder for FailingDecoder {
        fn decode(&self, path: &Path, _gamma: f32) -> TextureResult<Texture> {
            Err(TextureError::Empty(path.to_path_buf()))
        }
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = Texture::solid_color(Color::new(1.0, 0.5, 0.0));
        let sample = tex.sample(0.3, 0.9);
        assert!((sample - Color::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_bilinear_sample() {
        // 2x2: black, white / white, black
        let tex = Texture::new(
            2,
            2,
            vec![
                [0.0, 0.0, 0.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            "checker",
        );
        assert_eq!(tex.sample(0.0, 0.0), Color::ZERO);
        assert_eq!(tex.sample(1.0, 0.0), Color::ONE);
        assert_eq!(tex.sample(0.0, 1.0), Color::ONE);
        assert!((tex.sample(0.5, 0.5) - Color::splat(0.5)).length() < 1e-6);
        assert!((tex.sample(0.5, 0.0) - Color::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn test_single_decode_under_concurrent_first_touch() {
        let _ = env_logger::builder().is_test(true).try_init();
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = TextureCache::with_decoder(CountingDecoder {
            calls: calls.clone(),
        });
        let barrier = Barrier::new(8);

        let loaded: Vec<Arc<Texture>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.load(Path::new("wood.png"), 2.2).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(loaded.iter().all(|t| Arc::ptr_eq(t, &loaded[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_gamma_is_part_of_the_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = TextureCache::with_decoder(CountingDecoder {
            calls: calls.clone(),
        });

        let linear = cache.load(Path::new("a.png"), 1.0).unwrap();
        let decoded = cache.load(Path::new("a.png"), 2.2).unwrap();
        let again = cache.load(Path::new("a.png"), 2.2).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!Arc::ptr_eq(&linear, &decoded));
        assert!(Arc::ptr_eq(&decoded, &again));
        assert!((linear.pixels[0][0] - 0.5).abs() < 1e-6);
        assert!(decoded.pixels[0][0] < 0.5);
    }

    #[test]
    fn test_failed_decode_is_not_cached() {
        let cache = TextureCache::with_decoder(FailingDecoder);
        assert!(matches!(
            cache.load(Path::new("missing.png"), 2.2),
            Err(TextureError::Empty(_))
        ));
        assert!(cache.is_empty());
        assert!(cache.get(Path::new("missing.png"), 2.2).is_none());
    }

    #[test]
    fn test_snapshot_resolves_against_base_dir() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = TextureCache::with_decoder(CountingDecoder { calls })
            .with_base_dir("/textures");
        cache.load(Path::new("marble.png"), 2.2).unwrap();

        assert_eq!(
            cache.key(Path::new("marble.png"), 2.2).path,
            PathBuf::from("/textures/marble.png")
        );

        let set = cache.snapshot();
        assert_eq!(set.len(), 1);
        assert!(set.get(Path::new("marble.png"), 2.2).is_some());
        assert!(set.get(Path::new("/textures/marble.png"), 2.2).is_some());
        assert!(set.get(Path::new("marble.png"), 1.0).is_none());
    }

    #[test]
    fn test_image_crate_decoder_reports_missing_file() {
        let path = std::env::temp_dir().join("lumen_no_such_texture.png");
        let err = ImageCrateDecoder.decode(&path, 2.2).unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }

    #[test]
    fn test_image_crate_decoder_applies_gamma() {
        let path = std::env::temp_dir().join(format!("lumen_decode_{}.png", std::process::id()));
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([128, 255, 0, 255]));
        img.save(&path).unwrap();

        let tex = ImageCrateDecoder.decode(&path, 2.2).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((tex.width, tex.height), (2, 2));
        let expected = gamma_decode(128.0 / 255.0, 2.2);
        assert!((tex.pixels[0][0] - expected).abs() < 1e-6);
        assert_eq!(tex.pixels[0][1], 1.0);
        assert_eq!(tex.pixels[0][2], 0.0);
    }
}

//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use lumen_core::Color;

use crate::renderer::{PixelSample, RenderContext};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets near the middle of the frame come first, so a live monitor
/// fills in the subject before the edges.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, buckets.len()));
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;
    let distance = |b: &Bucket| {
        let x = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let y = b.y as f32 + b.height as f32 / 2.0 - center_y;
        x * x + y * y
    };

    // Stable sort keeps row-major order between equidistant buckets.
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket. Pixels come back in row-major order within the
/// bucket.
pub fn render_bucket(bucket: &Bucket, ctx: &RenderContext<'_>) -> BucketResult {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(ctx.render_pixel(bucket.x + local_x, bucket.y + local_y));
        }
    }

    BucketResult::new(*bucket, pixels)
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    /// Per-pixel sample sums in row-major order
    pub pixels: Vec<PixelSample>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<PixelSample>) -> Self {
        Self { bucket, pixels }
    }

    /// Final linear colours (sample means).
    pub fn colors(&self) -> Vec<Color> {
        self.pixels.iter().map(PixelSample::value).collect()
    }

    /// Image coordinates and sample of every pixel.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &PixelSample)> + '_ {
        let b = self.bucket;
        self.pixels.iter().enumerate().map(move |(i, p)| {
            let i = i as u32;
            (b.x + i % b.width, b.y + i / b.width, p)
        })
    }
}

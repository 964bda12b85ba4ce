//! Linear-light image buffers and their on-disk formats.
//!
//! Two outputs are supported: 8-bit PNG, gamma-encoded for display, and a
//! lossless raw format that keeps the linear floats so an image can be
//! regraded later without re-rendering.
//!
//! Raw layout (all big-endian): four `i32` header fields (`1`, `0`, width,
//! height) followed by `width * height` RGB triples of `f32`, row-major from
//! the top-left pixel.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::color::{color_to_rgba, Color};

pub const RAW_VERSION_MAJOR: i32 = 1;
pub const RAW_VERSION_MINOR: i32 = 0;

#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Png(#[from] image::ImageError),

    #[error("unsupported raw version {major}.{minor}")]
    UnsupportedVersion { major: i32, minor: i32 },

    #[error("invalid raw dimensions {width}x{height}")]
    BadDimensions { width: i32, height: i32 },

    #[error("raw body truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("pixel count {found} does not match {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, found: usize },
}

pub type ImageIoResult<T> = Result<T, ImageIoError>;

/// A width x height grid of linear colours, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> ImageIoResult<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(ImageIoError::DimensionMismatch {
                width,
                height,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel. Writes outside the image are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Copy a `width`-wide block of row-major pixels to `(x0, y0)`.
    pub fn write_region(&mut self, x0: u32, y0: u32, width: u32, pixels: &[Color]) {
        if width == 0 {
            return;
        }
        for (row, chunk) in pixels.chunks(width as usize).enumerate() {
            for (col, color) in chunk.iter().enumerate() {
                self.set(x0 + col as u32, y0 + row as u32, *color);
            }
        }
    }

    /// Multiply every pixel by `exposure`.
    pub fn exposed(&self, exposure: f32) -> ImageBuffer {
        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|c| *c * exposure).collect(),
        }
    }

    /// Gamma-encode and quantise to 8-bit RGBA.
    pub fn to_rgba8(&self, gamma: f32) -> image::RgbaImage {
        let bytes = self
            .pixels
            .iter()
            .flat_map(|c| color_to_rgba(*c, gamma))
            .collect();
        image::RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    pub fn save_png(&self, path: &Path, gamma: f32) -> ImageIoResult<()> {
        self.to_rgba8(gamma).save(path)?;
        log::info!("Wrote {}x{} PNG to {}", self.width, self.height, path.display());
        Ok(())
    }

    pub fn write_raw<W: Write>(&self, mut writer: W) -> ImageIoResult<()> {
        for field in [
            RAW_VERSION_MAJOR,
            RAW_VERSION_MINOR,
            self.width as i32,
            self.height as i32,
        ] {
            writer.write_all(&field.to_be_bytes())?;
        }
        for c in &self.pixels {
            for channel in c.to_array() {
                writer.write_all(&channel.to_be_bytes())?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_raw<R: Read>(mut reader: R) -> ImageIoResult<Self> {
        let mut header = [0u8; 16];
        reader.read_exact(&mut header)?;
        let field = |i: usize| {
            i32::from_be_bytes([header[i * 4], header[i * 4 + 1], header[i * 4 + 2], header[i * 4 + 3]])
        };
        let (major, minor, width, height) = (field(0), field(1), field(2), field(3));

        if major != RAW_VERSION_MAJOR {
            return Err(ImageIoError::UnsupportedVersion { major, minor });
        }
        if width <= 0 || height <= 0 {
            return Err(ImageIoError::BadDimensions { width, height });
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(12))
            .ok_or(ImageIoError::BadDimensions { width, height })?;
        // The body grows with the bytes actually read, never with the
        // header's claim.
        let mut body = Vec::new();
        reader.take(expected as u64).read_to_end(&mut body)?;
        if body.len() != expected {
            return Err(ImageIoError::Truncated {
                expected,
                found: body.len(),
            });
        }

        let pixels = body
            .chunks_exact(12)
            .map(|px| {
                let channel = |k: usize| {
                    f32::from_be_bytes([px[k], px[k + 1], px[k + 2], px[k + 3]])
                };
                Color::new(channel(0), channel(4), channel(8))
            })
            .collect();

        Self::from_pixels(width as u32, height as u32, pixels)
    }

    pub fn save_raw(&self, path: &Path) -> ImageIoResult<()> {
        self.write_raw(BufWriter::new(File::create(path)?))?;
        log::info!("Wrote {}x{} raw image to {}", self.width, self.height, path.display());
        Ok(())
    }

    pub fn load_raw(path: &Path) -> ImageIoResult<Self> {
        Self::read_raw(BufReader::new(File::open(path)?))
    }
}

/// Re-encode a raw file as PNG with a new gamma and exposure.
pub fn regrade(raw: &Path, png: &Path, gamma: f32, exposure: f32) -> ImageIoResult<()> {
    let image = ImageBuffer::load_raw(raw)?;
    image.exposed(exposure).save_png(png, gamma)
}

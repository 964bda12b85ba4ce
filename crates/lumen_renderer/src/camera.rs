//! Camera for ray generation.
//!
//! The view plane sits `view_plane_distance` in front of the camera and is
//! measured in base-canvas pixels, so the field of view follows from the
//! canvas size and that distance. Magnification only changes how many
//! output pixels cover the same view plane.

use std::path::PathBuf;

use lumen_core::color::{luminance, DEFAULT_GAMMA};
use lumen_core::error::SceneError;
use lumen_core::{SceneResult, Texture};
use lumen_math::{Ray, Vec2, Vec3};
use rand::RngCore;

use crate::sampling::{gen_f32, random_in_unit_disk, stratified_jitter};

/// Attempts at drawing an aperture point accepted by the mask before
/// falling back to the lens centre.
const APERTURE_MASK_ATTEMPTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One unjittered sample per pixel with direct surface shading.
    Raycasting,
    /// Monte Carlo path tracing with `samples` paths per pixel.
    #[default]
    Pathtracing,
}

/// Image whose luminance shapes the lens aperture (bokeh).
#[derive(Debug, Clone, PartialEq)]
pub struct ApertureMask {
    pub path: PathBuf,
    pub gamma: f32,
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    focus_point: Vec3,
    view_up: Vec3,
    view_plane_distance: f32,
    aperture_radius: f32,
    aperture_mask: Option<ApertureMask>,
    focus_distance: f32,
    samples: u32,
    recursion_depth: u32,
    antialias: bool,
    magnification: f32,
    render_mode: RenderMode,
    width: u32,
    height: u32,

    // Orthonormal basis derived from origin, focus point and view up
    heading: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn builder() -> CameraBuilder {
        CameraBuilder::new()
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit viewing direction.
    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    pub fn focus_distance(&self) -> f32 {
        self.focus_distance
    }

    pub fn aperture_radius(&self) -> f32 {
        self.aperture_radius
    }

    pub fn aperture_mask(&self) -> Option<&ApertureMask> {
        self.aperture_mask.as_ref()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Paths traced per pixel. Raycasting always uses one.
    pub fn samples(&self) -> u32 {
        match self.render_mode {
            RenderMode::Raycasting => 1,
            RenderMode::Pathtracing => self.samples,
        }
    }

    pub fn recursion_depth(&self) -> u32 {
        self.recursion_depth
    }

    pub fn magnification(&self) -> f32 {
        self.magnification
    }

    /// Output resolution: the base canvas scaled by the magnification.
    pub fn output_size(&self) -> (u32, u32) {
        let scale = |n: u32| ((n as f32 * self.magnification).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }

    /// Generate the primary ray for sample `sample_index` of output pixel
    /// `(pixel_x, pixel_y)`.
    pub fn primary_ray(
        &self,
        pixel_x: u32,
        pixel_y: u32,
        sample_index: u32,
        mask: Option<&Texture>,
        rng: &mut dyn RngCore,
    ) -> Ray {
        let pathtracing = self.render_mode == RenderMode::Pathtracing;
        let jitter = if pathtracing && self.antialias {
            stratified_jitter(sample_index, self.samples, rng)
        } else {
            Vec2::ZERO
        };

        let m = self.magnification;
        let x = (pixel_x as f32 + 0.5 + jitter.x) / m - self.width as f32 / 2.0;
        let y = self.height as f32 / 2.0 - (pixel_y as f32 + 0.5 + jitter.y) / m;
        let direction = self.heading * self.view_plane_distance + self.right * x + self.up * y;

        if !pathtracing || self.aperture_radius <= 0.0 {
            return Ray::new(self.origin, direction);
        }

        // Thin lens: re-aim from a point on the aperture at the spot where
        // the pinhole ray crosses the focal plane.
        let focal_point =
            self.origin + direction * (self.focus_distance / self.view_plane_distance);
        let lens = self.sample_aperture(mask, rng);
        let origin = self.origin + self.aperture_radius * (lens.x * self.right + lens.y * self.up);
        Ray::new(origin, focal_point - origin)
    }

    /// Point on the unit disk, accepted against the mask's luminance when
    /// one is given.
    fn sample_aperture(&self, mask: Option<&Texture>, rng: &mut dyn RngCore) -> Vec2 {
        let Some(mask) = mask else {
            return random_in_unit_disk(rng);
        };
        for _ in 0..APERTURE_MASK_ATTEMPTS {
            let p = random_in_unit_disk(rng);
            let weight = luminance(mask.sample((p.x + 1.0) * 0.5, (1.0 - p.y) * 0.5));
            if gen_f32(rng) < weight.clamp(0.0, 1.0) {
                return p;
            }
        }
        Vec2::ZERO
    }
}

/// Builder for [`Camera`]. Parameters are checked in [`CameraBuilder::build`].
#[derive(Debug, Clone)]
pub struct CameraBuilder {
    origin: Vec3,
    focus_point: Vec3,
    view_up: Vec3,
    view_plane_distance: f32,
    aperture_radius: f32,
    aperture_mask: Option<ApertureMask>,
    focus_distance: Option<f32>,
    samples: u32,
    recursion_depth: u32,
    antialias: bool,
    magnification: f32,
    render_mode: RenderMode,
    width: u32,
    height: u32,
}

impl CameraBuilder {
    pub fn new() -> Self {
        Self {
            origin: Vec3::ZERO,
            focus_point: Vec3::NEG_Z,
            view_up: Vec3::Y,
            view_plane_distance: 400.0,
            aperture_radius: 0.0,
            aperture_mask: None,
            focus_distance: None,
            samples: 16,
            recursion_depth: 6,
            antialias: true,
            magnification: 1.0,
            render_mode: RenderMode::Pathtracing,
            width: 400,
            height: 300,
        }
    }

    /// Set base canvas resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set camera position. The heading points from `origin` to `focus_point`.
    pub fn with_position(mut self, origin: Vec3, focus_point: Vec3, view_up: Vec3) -> Self {
        self.origin = origin;
        self.focus_point = focus_point;
        self.view_up = view_up;
        self
    }

    /// Distance to the view plane, in base-canvas pixels.
    pub fn with_view_plane_distance(mut self, distance: f32) -> Self {
        self.view_plane_distance = distance;
        self
    }

    /// Set lens settings. Without an explicit focus distance the camera
    /// focuses on `focus_point`.
    pub fn with_lens(mut self, aperture_radius: f32, focus_distance: Option<f32>) -> Self {
        self.aperture_radius = aperture_radius;
        self.focus_distance = focus_distance;
        self
    }

    pub fn with_aperture_mask(mut self, path: impl Into<PathBuf>, gamma: Option<f32>) -> Self {
        self.aperture_mask = Some(ApertureMask {
            path: path.into(),
            gamma: gamma.unwrap_or(DEFAULT_GAMMA),
        });
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples: u32, recursion_depth: u32) -> Self {
        self.samples = samples;
        self.recursion_depth = recursion_depth;
        self
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn with_magnification(mut self, magnification: f32) -> Self {
        self.magnification = magnification;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn build(self) -> SceneResult<Camera> {
        let invalid = |name: &'static str, value: f32, expected: &'static str| {
            SceneError::InvalidParameter {
                name,
                value,
                expected,
            }
        };

        if !self.origin.is_finite() || !self.focus_point.is_finite() {
            return Err(invalid("camera position", f32::NAN, "finite coordinates"));
        }
        let to_focus = self.focus_point - self.origin;
        let heading = to_focus
            .try_normalize()
            .ok_or_else(|| invalid("camera heading", 0.0, "focus point distinct from origin"))?;
        let right = heading
            .cross(self.view_up)
            .try_normalize()
            .ok_or_else(|| invalid("view up", 0.0, "a vector not parallel to the heading"))?;
        let up = right.cross(heading);

        if self.width == 0 {
            return Err(invalid("width", 0.0, "a positive value"));
        }
        if self.height == 0 {
            return Err(invalid("height", 0.0, "a positive value"));
        }
        if self.samples == 0 {
            return Err(invalid("samples", 0.0, "a value >= 1"));
        }
        let positive = |name, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(invalid(name, value, "a positive value"))
            }
        };
        let view_plane_distance = positive("view plane distance", self.view_plane_distance)?;
        let magnification = positive("magnification", self.magnification)?;
        let focus_distance = positive(
            "focus distance",
            self.focus_distance.unwrap_or(to_focus.length()),
        )?;
        if !(self.aperture_radius.is_finite() && self.aperture_radius >= 0.0) {
            return Err(invalid(
                "aperture radius",
                self.aperture_radius,
                "a non-negative value",
            ));
        }
        if let Some(mask) = &self.aperture_mask {
            positive("aperture mask gamma", mask.gamma)?;
        }

        Ok(Camera {
            origin: self.origin,
            focus_point: self.focus_point,
            view_up: self.view_up,
            view_plane_distance,
            aperture_radius: self.aperture_radius,
            aperture_mask: self.aperture_mask,
            focus_distance,
            samples: self.samples,
            recursion_depth: self.recursion_depth,
            antialias: self.antialias,
            magnification,
            render_mode: self.render_mode,
            width: self.width,
            height: self.height,
            heading,
            right,
            up,
        })
    }
}

impl Default for CameraBuilder {
    fn default() -> Self {
        Self::new()
    }
}

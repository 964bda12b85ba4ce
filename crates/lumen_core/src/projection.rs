//! Image projections: mapping world-space points onto texture coordinates.

use std::f32::consts::{PI, TAU};
use std::path::{Path, PathBuf};

use lumen_math::{Vec2, Vec3};

use crate::color::DEFAULT_GAMMA;

/// Shape of the projection surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Planar projection along the normal of the `u`/`v` plane.
    Parallel,
    /// Latitude/longitude around `origin` with `v_axis` as the pole.
    Spherical,
    /// Angle around `v_axis` for `u`, height along it for `v`.
    Cylindrical,
}

/// Maps surface points to `(u, v)` in a texture image.
///
/// `(0, 0)` addresses the top-left corner of the image. Projections are
/// specified in world space and do not follow scene-graph transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageProjection {
    pub kind: ProjectionKind,
    pub path: PathBuf,
    pub gamma: f32,
    pub origin: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
    pub repeat_u: bool,
    pub repeat_v: bool,
    pub flip_u: bool,
    pub flip_v: bool,
}

impl ImageProjection {
    pub fn new(
        kind: ProjectionKind,
        path: impl Into<PathBuf>,
        origin: Vec3,
        u_axis: Vec3,
        v_axis: Vec3,
    ) -> Self {
        Self {
            kind,
            path: path.into(),
            gamma: DEFAULT_GAMMA,
            origin,
            u_axis,
            v_axis,
            repeat_u: false,
            repeat_v: false,
            flip_u: false,
            flip_v: false,
        }
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_repeat(mut self, repeat_u: bool, repeat_v: bool) -> Self {
        self.repeat_u = repeat_u;
        self.repeat_v = repeat_v;
        self
    }

    pub fn with_flip(mut self, flip_u: bool, flip_v: bool) -> Self {
        self.flip_u = flip_u;
        self.flip_v = flip_v;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Texture coordinates of `point`, or `None` when the projection is
    /// degenerate there.
    pub fn project(&self, point: Vec3) -> Option<Vec2> {
        let raw = match self.kind {
            ProjectionKind::Parallel => self.parallel(point)?,
            ProjectionKind::Spherical => self.spherical(point)?,
            ProjectionKind::Cylindrical => self.cylindrical(point)?,
        };
        if !raw.is_finite() {
            return None;
        }
        Some(Vec2::new(
            wrap(raw.x, self.repeat_u, self.flip_u),
            wrap(raw.y, self.repeat_v, self.flip_v),
        ))
    }

    fn parallel(&self, point: Vec3) -> Option<Vec2> {
        let uu = self.u_axis.length_squared();
        let vv = self.v_axis.length_squared();
        if uu == 0.0 || vv == 0.0 {
            return None;
        }
        let d = point - self.origin;
        Some(Vec2::new(d.dot(self.u_axis) / uu, d.dot(self.v_axis) / vv))
    }

    /// Orthonormal frame (equator, pole, equator x pole).
    fn frame(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let pole = self.v_axis.try_normalize()?;
        let equator = self.u_axis.reject_from_normalized(pole).try_normalize()?;
        Some((equator, pole, equator.cross(pole)))
    }

    fn spherical(&self, point: Vec3) -> Option<Vec2> {
        let (e, pole, w) = self.frame()?;
        let d = point - self.origin;
        let len = d.length();
        if len == 0.0 {
            return None;
        }
        let longitude = d.dot(w).atan2(d.dot(e)) / TAU + 0.5;
        let latitude = (d.dot(pole) / len).clamp(-1.0, 1.0).acos() / PI;
        Some(Vec2::new(longitude, latitude))
    }

    fn cylindrical(&self, point: Vec3) -> Option<Vec2> {
        let (e, _, w) = self.frame()?;
        let d = point - self.origin;
        let angle = d.dot(w).atan2(d.dot(e)) / TAU + 0.5;
        let height = d.dot(self.v_axis) / self.v_axis.length_squared();
        Some(Vec2::new(angle, height))
    }
}

/// Bring a raw coordinate into [0, 1]: wrap when repeating, clamp otherwise.
pub fn wrap(value: f32, repeat: bool, flip: bool) -> f32 {
    let v = if repeat {
        value.rem_euclid(1.0)
    } else {
        value.clamp(0.0, 1.0)
    };
    if flip {
        1.0 - v
    } else {
        v
    }
}

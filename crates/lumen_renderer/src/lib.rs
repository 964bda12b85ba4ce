//! Lumen Renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over `lumen_core` scenes: thin-lens camera,
//! three-lobe materials with image projections, parallel bucket rendering
//! and an optional UDP live monitor.

mod bucket;
mod camera;
mod config;
mod disc;
mod error;
mod facet;
mod hittable;
mod monitor;
mod renderer;
mod sampling;
mod session;
mod shading;
mod sphere;
mod traversal;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{ApertureMask, Camera, CameraBuilder, RenderMode};
pub use config::{MonitorConfig, RenderConfig, DEFAULT_MONITOR_ADDRESS};
pub use error::{RenderError, RenderResult};
pub use hittable::{Hit, Hittable, SELF_INTERSECTION_EPSILON};
pub use monitor::{DatagramSink, Monitor, PixelDatagram, UdpSink};
pub use renderer::{render_image, PathSample, PixelSample, RenderContext, Termination};
pub use sampling::pixel_rng;
pub use session::RenderSession;
pub use shading::{emitted_radiance, headlight, shade, surface_color, Scatter};
pub use traversal::intersect_scene;

/// Re-export common math types from lumen_math
pub use lumen_math::{Bounds, Interval, Ray, Vec3};

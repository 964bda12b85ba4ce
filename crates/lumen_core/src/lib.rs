//! Lumen Core - scene description and image pipeline for the Lumen path tracer.
//!
//! This crate provides:
//!
//! - **Scene graph**: `SceneGraph`, `NodeId`, `Scene` with cached bounds
//! - **Primitives**: `Sphere`, `Disc`, `FacetStructure`
//! - **Materials**: immutable `Material` values built with `MaterialBuilder`
//! - **Textures**: `ImageProjection`, `TextureCache`, `TextureSet`
//! - **Colour**: gamma conversion, CIE colorimetry, Kelvin colours
//! - **Images**: `ImageBuffer` with PNG and raw persistence
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Material, SceneGraph, Scene, Sphere};
//! use lumen_math::Vec3;
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.add_node();
//! let red = Material::builder().with_color(Vec3::new(0.8, 0.1, 0.1)).build()?;
//! graph.attach_primitive(root, Sphere::new(Vec3::ZERO, 1.0, red)?)?;
//! let scene = Scene::new(graph, root)?;
//! ```

mod cie;
pub mod color;
pub mod colorimetry;
pub mod error;
pub mod facet;
pub mod material;
pub mod primitive;
pub mod projection;
pub mod raster;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use color::Color;
pub use colorimetry::{kelvin_to_rgb, rgb_to_kelvin, Observer, Spectrum};
pub use error::{SceneError, SceneResult};
pub use facet::{Facet, FacetGroup, FacetStructure};
pub use material::{Material, MaterialBuilder};
pub use primitive::{Disc, Primitive, Sphere, BOUNDS_PADDING};
pub use projection::{ImageProjection, ProjectionKind};
pub use raster::{regrade, ImageBuffer, ImageIoError};
pub use scene::{NodeId, Scene, SceneGraph, SceneNode};
pub use texture::{
    ImageCrateDecoder, ImageDecoder, Texture, TextureCache, TextureError, TextureKey, TextureSet,
};

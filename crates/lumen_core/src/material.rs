//! Surface materials.
//!
//! A [`Material`] is an immutable description shared between primitives as
//! `Arc<Material>`. New materials, including modified copies of existing
//! ones, are made with [`MaterialBuilder`], which validates every parameter.

use std::sync::Arc;

use crate::color::Color;
use crate::error::{check_above, check_range, SceneResult};
use crate::projection::ImageProjection;

/// How a surface reflects, transmits and emits light.
///
/// `glossiness` selects mirror-like reflection over the other lobes,
/// `transparency` selects refraction over diffuse reflection, and
/// `roughness` blurs the mirror lobe.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    color: Color,
    emission: Color,
    glossiness: f32,
    roughness: f32,
    transparency: f32,
    refraction_index: f32,
    ray_terminator: bool,
    projection: Option<ImageProjection>,
}

impl Material {
    pub fn builder() -> MaterialBuilder {
        MaterialBuilder::default()
    }

    /// Start a builder from this material's values.
    pub fn to_builder(&self) -> MaterialBuilder {
        MaterialBuilder {
            material: self.clone(),
        }
    }

    /// Base colour (linear light).
    pub fn color(&self) -> Color {
        self.color
    }

    /// Emitted radiance (linear light, unclamped).
    pub fn emission(&self) -> Color {
        self.emission
    }

    pub fn glossiness(&self) -> f32 {
        self.glossiness
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    pub fn refraction_index(&self) -> f32 {
        self.refraction_index
    }

    /// Paths end at this surface; only its emission is collected.
    pub fn is_ray_terminator(&self) -> bool {
        self.ray_terminator
    }

    pub fn projection(&self) -> Option<&ImageProjection> {
        self.projection.as_ref()
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.max_element() > 0.0
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::splat(0.8),
            emission: Color::ZERO,
            glossiness: 0.0,
            roughness: 0.0,
            transparency: 0.0,
            refraction_index: 1.5,
            ray_terminator: false,
            projection: None,
        }
    }
}

/// Builder for [`Material`]. Parameters are checked in [`MaterialBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct MaterialBuilder {
    material: Material,
}

impl MaterialBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.material.color = color;
        self
    }

    pub fn with_emission(mut self, emission: Color) -> Self {
        self.material.emission = emission;
        self
    }

    pub fn with_glossiness(mut self, glossiness: f32) -> Self {
        self.material.glossiness = glossiness;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.material.roughness = roughness;
        self
    }

    pub fn with_transparency(mut self, transparency: f32) -> Self {
        self.material.transparency = transparency;
        self
    }

    pub fn with_refraction_index(mut self, refraction_index: f32) -> Self {
        self.material.refraction_index = refraction_index;
        self
    }

    pub fn with_ray_terminator(mut self, ray_terminator: bool) -> Self {
        self.material.ray_terminator = ray_terminator;
        self
    }

    pub fn with_projection(mut self, projection: ImageProjection) -> Self {
        self.material.projection = Some(projection);
        self
    }

    pub fn without_projection(mut self) -> Self {
        self.material.projection = None;
        self
    }

    pub fn build(self) -> SceneResult<Arc<Material>> {
        let m = &self.material;
        for c in m.color.to_array() {
            check_range("color", c, 0.0, f32::MAX)?;
        }
        for c in m.emission.to_array() {
            check_range("emission", c, 0.0, f32::MAX)?;
        }
        check_range("glossiness", m.glossiness, 0.0, 1.0)?;
        check_range("roughness", m.roughness, 0.0, 1.0)?;
        check_range("transparency", m.transparency, 0.0, 1.0)?;
        check_above("refraction index", m.refraction_index, 1.0)?;
        if let Some(p) = &m.projection {
            check_range("projection gamma", p.gamma, f32::MIN_POSITIVE, f32::MAX)?;
        }
        Ok(Arc::new(self.material))
    }
}

//! Errors raised while building a scene.
//!
//! Only construction-time problems end up here. Numeric degeneracies met
//! while rendering (grazing rays, zero-length vectors) are resolved locally
//! by the renderer and never become errors.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("invalid {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },

    #[error("degenerate facet: {0}")]
    DegenerateFacet(String),

    #[error("unknown scene node {0}")]
    UnknownNode(usize),

    #[error("scene node {0} already has a parent")]
    AlreadyAttached(usize),

    #[error("attaching node {child} under node {parent} would create a cycle")]
    Cycle { parent: usize, child: usize },

    #[error("transform must be finite with a non-zero scale")]
    InvalidTransform,
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Check that `value` lies in `[min, max]`, reporting `name` otherwise.
pub(crate) fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> SceneResult<f32> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(SceneError::InvalidParameter {
            name,
            value,
            expected: range_label(min, max),
        })
    }
}

fn range_label(min: f32, max: f32) -> &'static str {
    match (min, max) {
        (a, b) if a == 0.0 && b == 1.0 => "a value in [0, 1]",
        (a, b) if a == 0.0 && b == f32::MAX => "a non-negative value",
        (a, b) if a > 0.0 && b == f32::MAX => "a positive value",
        _ => "a value in the allowed range",
    }
}

/// Check that `value` is finite and strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f32) -> SceneResult<f32> {
    check_above(name, value, 0.0)
}

/// Check that `value` is finite and strictly greater than `bound`.
pub(crate) fn check_above(name: &'static str, value: f32, bound: f32) -> SceneResult<f32> {
    if value.is_finite() && value > bound {
        Ok(value)
    } else {
        Err(SceneError::InvalidParameter {
            name,
            value,
            expected: if bound == 0.0 {
                "a positive value"
            } else {
                "a value > 1"
            },
        })
    }
}

//!
//! # Ports
//!
//! Named, oriented connection points of a [Component](crate::Component).
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    data::LayerSpec,
    error::{LayoutError, LayoutResult},
    geom::{normalize_angle, Point, Transform, TransformTrait},
};

/// Tolerance, in degrees, within which orientations are regarded as orthogonal
pub const ORTHOGONAL_TOL: f64 = 1e-3;

/// Quantize `angle` to the nearest multiple of 90 degrees if within `tol` of it,
/// and normalize the result into [0, 360).
pub fn quantize_orientation(angle: f64, tol: f64) -> f64 {
    let nearest = (angle / 90.0).round() * 90.0;
    if (angle - nearest).abs() <= tol {
        normalize_angle(nearest)
    } else {
        normalize_angle(angle)
    }
}

/// # Port
///
/// Orientations are in degrees, counter-clockwise from +x,
/// and point *out of* the owning component.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Port {
    pub name: String,
    pub center: Point,
    pub orientation: f64,
    pub width: f64,
    pub layer: LayerSpec,
}
impl Port {
    /// Create a new [Port]. Fails on non-positive `width`.
    pub fn new(
        name: impl Into<String>,
        center: Point,
        orientation: f64,
        width: f64,
        layer: LayerSpec,
    ) -> LayoutResult<Self> {
        let name = name.into();
        if !(width > 0.0) || !width.is_finite() {
            return Err(LayoutError::param(
                "width",
                format!("Port `{}` width must be positive, got {}", name, width),
            ));
        }
        Ok(Self {
            name,
            center,
            orientation: normalize_angle(orientation),
            width,
            layer,
        })
    }
    /// Unit vector pointing along our orientation
    pub fn direction(&self) -> Point {
        Point::unit(self.orientation)
    }
    /// Boolean indication of whether we face along a multiple of 90 degrees
    pub fn is_orthogonal(&self) -> bool {
        let q = quantize_orientation(self.orientation, ORTHOGONAL_TOL);
        q % 90.0 == 0.0
    }
    /// Create a renamed copy
    pub fn renamed(&self, name: impl Into<String>) -> Port {
        Port {
            name: name.into(),
            ..self.clone()
        }
    }
    /// Create a copy with its center snapped to `grid`,
    /// and its orientation quantized and normalized.
    pub fn snap(&self, grid: f64) -> Port {
        Port {
            center: self.center.snap(grid),
            orientation: quantize_orientation(self.orientation, ORTHOGONAL_TOL),
            ..self.clone()
        }
    }
}
impl TransformTrait for Port {
    fn transform(&self, trans: &Transform) -> Self {
        Port {
            center: self.center.transform(trans),
            orientation: trans.apply_angle(self.orientation),
            ..self.clone()
        }
    }
}

//!
//! # Fabrication Clean-Up
//!
//! Composed layouts carry overlapping extrusions whose shared edges differ by floating-point noise.
//! [snap_all_polygons_iteratively] flattens a [Component], fuses each layer by shrinking,
//! merging, and re-growing it, and snaps everything onto the mask write-grid.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::raw::{ops, quantize_orientation, Component, Label, Polygon, Port, ORTHOGONAL_TOL};
use crate::tech::Tech;
use crate::utils::SerdeFile;

/// # Clean-Up Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleanupConfig {
    /// Write-grid
    pub grid_size: f64,
    /// Shrink and re-grow distance, in grid units
    pub shrink_units: f64,
    /// Port orientations within this many degrees of a multiple of 90 are snapped onto it
    pub orthogonal_tol: f64,
}
impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            grid_size: 0.001,
            shrink_units: 20.0,
            orthogonal_tol: ORTHOGONAL_TOL,
        }
    }
}
impl SerdeFile for CleanupConfig {}

impl CleanupConfig {
    /// Default parameters, on the write-grid of `tech`
    pub fn from_tech(tech: &Tech) -> Self {
        Self {
            grid_size: tech.grid_size,
            ..Default::default()
        }
    }
}

/// Flatten `comp` in place, and return a cleaned, grid-snapped copy of it.
///
/// Each layer is shrunk by `shrink_units` grid units, merged, re-grown, and merged again,
/// fusing polygons which touch or nearly touch. Vertices, port centers, and label positions
/// are then snapped to the grid, and near-orthogonal port orientations made exact.
///
/// If `comp` cannot be flattened, the result is an empty component named `<name>_flatten_failed`.
///
pub fn snap_all_polygons_iteratively(comp: &mut Component, cfg: &CleanupConfig) -> Component {
    if let Err(e) = comp.flatten() {
        tracing::error!("failed to flatten `{}`: {}", comp.name, e);
        return Component::new(format!("{}_flatten_failed", comp.name));
    }
    let grid = cfg.grid_size;
    let distance = cfg.shrink_units * grid;

    let mut out = Component::new(comp.name.clone());
    out.elems = comp.elems.clone();
    for layer in comp.layers() {
        ops::offset_layer(&mut out, layer, -distance);
        ops::offset_layer(&mut out, layer, distance);
        if let Some(polys) = out.elems.get_mut(&layer) {
            let mut snapped: Vec<Polygon> = polys
                .iter()
                .filter_map(|p| p.snap(grid).normalized())
                .collect();
            ops::sort_polygons(&mut snapped);
            tracing::debug!(
                "layer {}: {} polygons cleaned into {}",
                layer,
                comp.polygons(&layer).len(),
                snapped.len()
            );
            *polys = snapped;
        }
    }
    out.elems.retain(|_, polys| !polys.is_empty());
    for port in comp.ports.values() {
        out.ports.insert(
            port.name.clone(),
            Port {
                center: port.center.snap(grid),
                orientation: quantize_orientation(port.orientation, cfg.orthogonal_tol),
                ..port.clone()
            },
        );
    }
    out.labels = comp
        .labels
        .iter()
        .map(|l| Label {
            loc: l.loc.snap(grid),
            ..l.clone()
        })
        .collect();
    out.info = comp.info.clone();
    out
}

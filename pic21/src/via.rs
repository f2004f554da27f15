//!
//! # Via Arrays
//!
//! Tiles square vias on a regular grid, keeping only those fully inside the
//! interior of their enclosing metal, inset by an enclosure margin.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::raw::{ops, BoundBoxTrait, Component, LayerSpec, LayoutError, LayoutResult, Point, Polygon, Rect};
use crate::tech::VIA;
use crate::utils::SerdeFile;

/// Containment slack, absorbing round-off from the boolean and offset engine
const CONTAIN_TOL: f64 = 1e-6;

/// # Via Array Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViaArray {
    /// Via side length
    pub width: f64,
    /// Center-to-center via pitch, in both directions
    pub pitch: f64,
    /// Minimum enclosure of each via by its enclosing metal
    pub margin: f64,
    /// Via layer
    pub layer: LayerSpec,
}
impl Default for ViaArray {
    fn default() -> Self {
        Self {
            width: 0.5,
            pitch: 1.1,
            margin: 0.5,
            layer: VIA,
        }
    }
}
impl SerdeFile for ViaArray {}

impl ViaArray {
    /// Check parameter ranges
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.width > 0.0) || !self.width.is_finite() {
            return Err(LayoutError::param(
                "width",
                format!("Via width must be positive, got {}", self.width),
            ));
        }
        if !(self.pitch > 0.0) || !self.pitch.is_finite() {
            return Err(LayoutError::param(
                "pitch",
                format!("Via pitch must be positive, got {}", self.pitch),
            ));
        }
        if !(self.margin >= 0.0) || !self.margin.is_finite() {
            return Err(LayoutError::param(
                "margin",
                format!("Via enclosure margin must be non-negative, got {}", self.margin),
            ));
        }
        Ok(())
    }
    /// Fill the polygons on `layer` of `enclosure` with vias, each also inside
    /// the polygons on every layer of `extra_layers`.
    /// Returns a new [Component] named `name`, holding only vias.
    pub fn fill(
        &self,
        enclosure: &Component,
        layer: LayerSpec,
        extra_layers: &[LayerSpec],
        name: impl Into<String>,
    ) -> LayoutResult<Component> {
        let extras: Vec<Vec<Polygon>> = extra_layers
            .iter()
            .map(|l| enclosure.polygons(l).to_vec())
            .collect();
        let vias = self.fill_polygons(enclosure.polygons(&layer), &extras)?;
        let mut comp = Component::new(name);
        comp.add_polygons(self.layer, vias);
        Ok(comp)
    }
    /// Fill polygon set `polys` with vias, each also inside every polygon set of `extras`
    pub fn fill_polygons(&self, polys: &[Polygon], extras: &[Vec<Polygon>]) -> LayoutResult<Vec<Polygon>> {
        self.validate()?;
        let region = self.inset(polys);
        if region.is_empty() {
            tracing::debug!("via enclosure is empty after a {} inset", self.margin);
            return Ok(Vec::new());
        }
        let extras: Vec<Vec<Polygon>> = extras.iter().map(|e| self.inset(e)).collect();

        let (w, s) = (self.width, self.pitch);
        let mut vias = Vec::new();
        for poly in region.iter() {
            let bbox = poly.bbox();
            let (dx, dy) = bbox.size();
            let cols = ((dx - w) / s).floor().max(-1.) as i64 + 5;
            let rows = ((dy - w) / s).floor().max(-1.) as i64 + 5;
            for i in 0..cols {
                for j in 0..rows {
                    let center = Point::new(
                        bbox.p0.x + w / 2. + i as f64 * s,
                        bbox.p0.y + w / 2. + j as f64 * s,
                    );
                    let test = Rect::centered(center, w - 2. * CONTAIN_TOL, w - 2. * CONTAIN_TOL).to_poly();
                    if !poly.encloses(&test) {
                        continue;
                    }
                    if !extras.iter().all(|e| e.iter().any(|p| p.encloses(&test))) {
                        continue;
                    }
                    vias.push(Rect::centered(center, w, w).to_poly());
                }
            }
        }
        tracing::debug!("placed {} vias in {} enclosing polygons", vias.len(), region.len());
        Ok(vias)
    }
    /// Merge `polys` and shrink them by our margin
    fn inset(&self, polys: &[Polygon]) -> Vec<Polygon> {
        let merged = ops::union(polys);
        if self.margin == 0.0 {
            return merged;
        }
        ops::union(&ops::offset_all(&merged, -self.margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::BoundBox;

    fn square(x0: f64, y0: f64, side: f64) -> Polygon {
        Rect::new(Point::new(x0, y0), Point::new(x0 + side, y0 + side)).to_poly()
    }

    #[test]
    fn fills_square() -> LayoutResult<()> {
        let cfg = ViaArray {
            width: 0.5,
            pitch: 1.1,
            margin: 5.,
            layer: VIA,
        };
        let vias = cfg.fill_polygons(&[square(0., 0., 100.)], &[])?;
        assert_eq!(vias.len(), 82 * 82);
        let inset = BoundBox::from_points(Point::new(5., 5.), Point::new(95., 95.));
        for via in vias.iter() {
            let b = via.bbox();
            assert!((b.p1.x - b.p0.x - 0.5).abs() < 1e-12);
            assert!(b.p0.x >= inset.p0.x - 1e-6 && b.p1.x <= inset.p1.x + 1e-6);
            assert!(b.p0.y >= inset.p0.y - 1e-6 && b.p1.y <= inset.p1.y + 1e-6);
        }
        Ok(())
    }
    #[test]
    fn respects_concave_enclosures() -> LayoutResult<()> {
        // An L-shape: two overlapping arms
        let arms = [
            Rect::new(Point::new(0., 0.), Point::new(20., 4.)).to_poly(),
            Rect::new(Point::new(0., 0.), Point::new(4., 20.)).to_poly(),
        ];
        let cfg = ViaArray {
            width: 1.,
            pitch: 2.,
            margin: 1.,
            layer: VIA,
        };
        let vias = cfg.fill_polygons(&arms, &[])?;
        assert!(!vias.is_empty());
        let region = ops::union(&ops::offset_all(&ops::union(&arms), -1.));
        for via in vias.iter() {
            let c = via.bbox().center();
            // Nothing in the notch of the L
            assert!(!(c.x > 4. && c.y > 4.));
            assert!(region.iter().any(|r| r.encloses(&Rect::centered(c, 0.999, 0.999).to_poly())));
        }
        Ok(())
    }
    #[test]
    fn extra_layers_restrict() -> LayoutResult<()> {
        let mut pad = Component::new("pad");
        let top = LayerSpec::new(12, 0);
        let bot = LayerSpec::new(11, 0);
        pad.add_polygon(top, square(0., 0., 10.));
        pad.add_polygon(bot, Rect::new(Point::new(0., 0.), Point::new(10., 4.)).to_poly());
        let cfg = ViaArray {
            width: 0.5,
            pitch: 1.,
            margin: 0.5,
            layer: VIA,
        };
        let all = cfg.fill(&pad, top, &[], "vias")?;
        let both = cfg.fill(&pad, top, &[bot], "vias")?;
        assert_eq!(all.polygons(&VIA).len(), 9 * 9);
        assert_eq!(both.polygons(&VIA).len(), 9 * 3);
        for via in both.polygons(&VIA) {
            assert!(via.bbox().p1.y <= 3.5 + 1e-9);
        }
        Ok(())
    }
    #[test]
    fn empty_interiors() -> LayoutResult<()> {
        let cfg = ViaArray {
            margin: 2.,
            ..Default::default()
        };
        assert!(cfg.fill_polygons(&[square(0., 0., 3.)], &[])?.is_empty());
        assert!(cfg.fill_polygons(&[], &[])?.is_empty());
        Ok(())
    }
    #[test]
    fn invalid_parameters() {
        let poly = [square(0., 0., 10.)];
        for cfg in [
            ViaArray {
                width: 0.,
                ..Default::default()
            },
            ViaArray {
                pitch: -1.,
                ..Default::default()
            },
            ViaArray {
                margin: -0.1,
                ..Default::default()
            },
        ] {
            let err = cfg.fill_polygons(&poly, &[]).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidParameter { .. }));
        }
    }
}

//!
//! # Heater Synthesis
//!
//! Thermo-optic heaters drawn along a waveguide centerline [Path].
//! Each [HeaterStyle] emits its own arrangement of resistive (and, for `split`, routing) metal,
//! plus a stable set of named ports:
//!
//! * `default`: one ribbon centered on the waveguide
//! * `snake`: the centered ribbon, with gaps cut from alternating sides so current weaves along it
//! * `side`: one ribbon offset to the left of the waveguide
//! * `bothside`: ribbons offset to either side
//! * `split`: the centered ribbon, flanked by routing rails tied to it through via-filled contact pads
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::raw::{ops, Component, LayerSpec, LayoutError, LayoutResult, Path, Point, Polygon, Port};
use crate::tech::{HEATER, ROUTE};
use crate::utils::{enumstr, EnumStr, SerdeFile};
use crate::via::ViaArray;

/// Length of the split-heater end allowance
pub const SPLIT_END_ALLOWANCE: f64 = 0.5;
/// Distance snake gaps reach past the edge of the heater, so that cuts are clean on curved paths
const SNAKE_OVERSHOOT: f64 = 0.1;

enumstr!(
    /// # Heater Style
    HeaterStyle {
        Default: "default",
        Snake: "snake",
        Side: "side",
        BothSide: "bothside",
        Split: "split",
    }
);
impl HeaterStyle {
    /// Parse from keyword `txt`, failing with a list of the valid keywords
    pub fn parse(txt: &str) -> LayoutResult<Self> {
        Self::from_str(txt).ok_or_else(|| {
            LayoutError::param(
                "style",
                format!(
                    "Unknown heater style `{}`, expected one of {:?}",
                    txt,
                    Self::keywords()
                ),
            )
        })
    }
}

/// # Heater Parameters
///
/// Widths and offsets in micrometers. `offset` is the transverse distance
/// from the waveguide centerline to the side ribbons (`side`, `bothside`)
/// or to the routing rails (`split`).
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeaterConfig {
    pub style: HeaterStyle,
    /// Waveguide width
    pub wg_width: f64,
    /// Heater ribbon width
    pub heater_width: f64,
    /// Routing rail and contact pad width
    pub route_width: f64,
    /// Transverse offset of side ribbons and rails
    pub offset: f64,
    /// Gap between snake cuts or split contact pads
    pub gap: f64,
    /// Via size, pitch, enclosure, and layer, for `split` contact pads
    pub via: ViaArray,
    pub heater_layer: LayerSpec,
    pub route_layer: LayerSpec,
}
impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            style: HeaterStyle::Default,
            wg_width: 1.0,
            heater_width: 4.0,
            route_width: 2.0,
            offset: 5.0,
            gap: 2.0,
            via: ViaArray::default(),
            heater_layer: HEATER,
            route_layer: ROUTE,
        }
    }
}
impl SerdeFile for HeaterConfig {}

impl HeaterConfig {
    /// Check parameter ranges for our style
    pub fn validate(&self) -> LayoutResult<()> {
        for (param, val) in [
            ("wg_width", self.wg_width),
            ("heater_width", self.heater_width),
            ("route_width", self.route_width),
            ("gap", self.gap),
        ] {
            if !(val > 0.0) || !val.is_finite() {
                return Err(LayoutError::param(
                    param,
                    format!("Heater {} must be positive, got {}", param, val),
                ));
            }
        }
        match self.style {
            HeaterStyle::Snake if self.heater_width <= self.wg_width => {
                return Err(LayoutError::param(
                    "heater_width",
                    format!(
                        "Snake heater width {} must exceed the waveguide width {}",
                        self.heater_width, self.wg_width
                    ),
                ));
            }
            HeaterStyle::Side | HeaterStyle::BothSide | HeaterStyle::Split
                if !(self.offset > 0.0) || !self.offset.is_finite() =>
            {
                return Err(LayoutError::param(
                    "offset",
                    format!(
                        "Heater style `{}` requires a positive offset, got {}",
                        self.style, self.offset
                    ),
                ));
            }
            HeaterStyle::Split => self.via.validate()?,
            _ => (),
        }
        Ok(())
    }
}

/// Create a heater along `path`, in a new [Component] named `heater_<style>`
pub fn heater(path: &Path, cfg: &HeaterConfig) -> LayoutResult<Component> {
    let mut comp = Component::new(format!("heater_{}", cfg.style));
    add_heater(&mut comp, path, cfg)?;
    Ok(comp)
}

/// Add the polygons and ports of a heater along `path` to `comp`
pub fn add_heater(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    cfg.validate()?;
    let length = path.length();
    if !(length > 0.0) {
        return Err(LayoutError::param("path", "Heater path has zero length"));
    }
    comp.info.insert("length".into(), length);
    match cfg.style {
        HeaterStyle::Default => default_style(comp, path, cfg),
        HeaterStyle::Snake => snake_style(comp, path, cfg),
        HeaterStyle::Side => side_style(comp, path, cfg),
        HeaterStyle::BothSide => bothside_style(comp, path, cfg),
        HeaterStyle::Split => split_style(comp, path, cfg),
    }
}

/// Add an (input, output) port pair at the ends of `path`, offset `offset` to its left
fn add_port_pair(
    comp: &mut Component,
    path: &Path,
    names: (&str, &str),
    offset: f64,
    width: f64,
    layer: LayerSpec,
) -> LayoutResult<()> {
    comp.add_port(Port::new(
        names.0,
        path.start_offset(offset),
        path.start_angle + 180.,
        width,
        layer,
    )?)?;
    comp.add_port(Port::new(
        names.1,
        path.end_offset(offset),
        path.end_angle,
        width,
        layer,
    )?)
}

/// Add the centerline `HeatIn` and `HeatOut` ports
fn add_center_ports(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    add_port_pair(
        comp,
        path,
        ("HeatIn", "HeatOut"),
        0.,
        cfg.heater_width,
        cfg.heater_layer,
    )
}

fn default_style(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    comp.add_polygon(cfg.heater_layer, path.extrude(cfg.heater_width, 0.)?);
    add_center_ports(comp, path, cfg)
}

/// Gaps cut from a snake heater: one per period of `heater_width + gap`,
/// alternating between the left (even) and right (odd) sides of the path,
/// each leaving `wg_width` of heater on the opposite side.
pub fn snake_gaps(path: &Path, cfg: &HeaterConfig) -> LayoutResult<Vec<Polygon>> {
    let (wh, g) = (cfg.heater_width, cfg.gap);
    let period = wh + g;
    let ngaps = (path.length() / period).floor() as usize;
    let across = wh - cfg.wg_width + SNAKE_OVERSHOOT;
    let center = (cfg.wg_width + SNAKE_OVERSHOOT) / 2.;
    (0..ngaps)
        .map(|i| {
            let s0 = i as f64 * period + wh;
            let side = if i % 2 == 0 { 1. } else { -1. };
            path.slice(s0, s0 + g)?.extrude(across, side * center)
        })
        .collect()
}

fn snake_style(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    let ribbon = path.extrude(cfg.heater_width, 0.)?;
    let gaps = snake_gaps(path, cfg)?;
    if gaps.is_empty() {
        tracing::warn!(
            "path of length {} is too short for one snake period, drawing a plain heater",
            path.length()
        );
        comp.add_polygon(cfg.heater_layer, ribbon);
    } else {
        comp.add_polygons(cfg.heater_layer, ops::difference(&[ribbon], &gaps));
    }
    comp.info.insert("gaps".into(), gaps.len() as f64);
    add_center_ports(comp, path, cfg)
}

fn side_style(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    // The right-hand ribbon is reserved, and not drawn
    comp.add_polygon(cfg.heater_layer, path.extrude(cfg.heater_width, cfg.offset)?);
    add_center_ports(comp, path, cfg)
}

fn bothside_style(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    let (w, d, layer) = (cfg.heater_width, cfg.offset, cfg.heater_layer);
    comp.add_polygon(layer, path.extrude(w, d)?);
    comp.add_polygon(layer, path.extrude(w, -d)?);
    add_port_pair(comp, path, ("HeatLIn", "HeatLOut"), d, w, layer)?;
    add_port_pair(comp, path, ("HeatRIn", "HeatROut"), -d, w, layer)?;
    // Virtual ports, midway between the two sides
    let mid = |a: Point, b: Point| (a + b) * 0.5;
    let hin = mid(comp.port("HeatLIn")?.center, comp.port("HeatRIn")?.center);
    let hout = mid(comp.port("HeatLOut")?.center, comp.port("HeatROut")?.center);
    comp.add_port(Port::new("HeatIn", hin, path.start_angle + 180., w, layer)?)?;
    comp.add_port(Port::new("HeatOut", hout, path.end_angle, w, layer)?)
}

/// Number of split-heater contact-pad periods along `length`, and the recomputed gap between pads.
///
/// Pads of `width` are placed every `width + gap'`, the last ending [SPLIT_END_ALLOWANCE] short of `length`.
/// Periods are dropped while the recomputed gap would be non-positive.
pub fn split_gap(length: f64, width: f64, gap: f64) -> (usize, f64) {
    let mut n = (length / (width + gap)).floor() as usize;
    while n > 0 {
        let g = (length - width * (n + 1) as f64 - SPLIT_END_ALLOWANCE) / n as f64;
        if g > 0.0 {
            return (n, g);
        }
        n -= 1;
    }
    (0, gap)
}

fn split_style(comp: &mut Component, path: &Path, cfg: &HeaterConfig) -> LayoutResult<()> {
    let (wh, wr, d) = (cfg.heater_width, cfg.route_width, cfg.offset);
    let heater = path.extrude(wh, 0.)?;
    comp.add_polygon(cfg.heater_layer, heater.clone());
    comp.add_polygon(cfg.route_layer, path.extrude(wr, d)?);
    comp.add_polygon(cfg.route_layer, path.extrude(wr, -d)?);

    let length = path.length();
    let (n, gap) = split_gap(length, wr, cfg.gap);
    if n == 0 {
        tracing::warn!("split heater of length {} fits a single contact pad", length);
    }
    // Pads reach across the full heater, and onto the rail on their side
    let (t0, t1) = (-wh / 2., d + wr / 2.);
    let mut nvias = 0;
    for i in 0..=n {
        let s0 = i as f64 * (wr + gap);
        let s1 = (s0 + wr).min(length);
        let side = if i % 2 == 0 { 1. } else { -1. };
        let pad = path.slice(s0, s1)?.extrude(t1 - t0, side * (t0 + t1) / 2.)?;
        let contact = ops::intersection(&[pad.clone()], &[heater.clone()]);
        let vias = cfg.via.fill_polygons(&contact, &[])?;
        nvias += vias.len();
        comp.add_polygons(cfg.via.layer, vias);
        comp.add_polygon(cfg.route_layer, pad);
    }
    tracing::debug!(
        "split heater: {} pads with gap {:.4}, {} vias",
        n + 1,
        gap,
        nvias
    );
    comp.info.insert("pads".into(), (n + 1) as f64);
    comp.info.insert("gap".into(), gap);

    add_center_ports(comp, path, cfg)?;
    add_port_pair(comp, path, ("HeatLIn", "HeatLOut"), d, wr, cfg.route_layer)?;
    add_port_pair(comp, path, ("HeatRIn", "HeatROut"), -d, wr, cfg.route_layer)
}

//!
//! # Device Generators
//!
//! Waveguides, bends, rings, phase shifters, and probe pads, composed from the kernel.
//!
//! Every generator registers its cells in a [Library], named after their parameters,
//! so that repeated calls with identical parameters share a single cell.
//! Names read as a short summary of the main parameters, followed by a digest of all of them.
//!

// Std-Lib
use std::f64::consts::PI;

// Crates.io
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// Local imports
use crate::euler::{euler_path, EulerBend};
use crate::heater::{self, HeaterConfig};
use crate::raw::{
    Component, CrossSection, LayerSpec, LayoutError, LayoutResult, Library, Path, Point, Polygon, Port, Rect,
};
use crate::tech::{Tech, PAD, WG};
use crate::utils::{enumstr, Ptr, SerdeFile, SerializationFormat};
use crate::via::ViaArray;

/// Straight bus length beyond the ring, on either side
const BUS_MARGIN: f64 = 5.0;

/// Cell name: `summary`, followed by a digest of every parameter in `params`
fn cell_name(summary: String, params: &impl Serialize) -> LayoutResult<String> {
    let json = SerializationFormat::Json.to_string(params)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(format!("{}_{}", summary, hex::encode(&digest[..4])))
}

/// Number of points for an arc of `radius` turning `angle` degrees,
/// spaced roughly by the bend-point distance of `tech`
fn arc_points(radius: f64, angle: f64, tech: &Tech) -> usize {
    let len = angle.abs() / 360. * 2. * PI * radius;
    (len / tech.bend_points_distance).ceil().max(4.) as usize + 1
}

/// Straight waveguide of `length` along +x, with ports `o1` and `o2`
pub fn straight(lib: &mut Library, length: f64, xs: &CrossSection) -> LayoutResult<Ptr<Component>> {
    let width = xs.width().unwrap_or_default();
    let name = cell_name(format!("straight_L{}_W{}", length, width), &(length, xs))?;
    lib.get_or_create(&name, || xs.extrude(&Path::straight(length)?, name.clone()))
}

/// Euler-bend waveguide. Its `info` carries the bend's `Reff` and `Rmin`.
pub fn bend_euler(
    lib: &mut Library,
    cfg: &EulerBend,
    xs: &CrossSection,
    tech: &Tech,
) -> LayoutResult<Ptr<Component>> {
    let summary = format!(
        "bend_euler_R{}_A{}_P{}{}_W{}",
        cfg.radius,
        cfg.angle,
        cfg.p,
        if cfg.use_eff { "_eff" } else { "" },
        xs.width().unwrap_or_default(),
    );
    let name = cell_name(summary, &(cfg, xs, tech.bend_points_distance))?;
    lib.get_or_create(&name, || xs.extrude(&euler_path(cfg, tech)?, name.clone()))
}

enumstr!(
    /// # Ring-Bus Coupling
    RingCoupler {
        Point: "point",
        Pulley: "pulley",
    }
);

/// # Single-Bus Ring Parameters
///
/// Covers circular rings (`length_x = 0`) and racetracks (`length_x > 0`),
/// coupled to a straight bus at a point, or to a concentric pulley bus over `coupling_angle` degrees.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RingConfig {
    /// Bend radius of the ring centerline
    pub radius: f64,
    /// Edge-to-edge gap between ring and bus
    pub gap: f64,
    pub wg_width: f64,
    /// Length of each of the racetrack's straight sections
    pub length_x: f64,
    pub coupler: RingCoupler,
    /// Arc spanned by a pulley coupler, in degrees
    pub coupling_angle: f64,
    /// Heater over the top half of the ring, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heater: Option<HeaterConfig>,
    pub layer: LayerSpec,
}
impl Default for RingConfig {
    fn default() -> Self {
        Self {
            radius: 50.,
            gap: 0.3,
            wg_width: 1.,
            length_x: 0.,
            coupler: RingCoupler::Point,
            coupling_angle: 30.,
            heater: None,
            layer: WG,
        }
    }
}
impl SerdeFile for RingConfig {}

impl RingConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> LayoutResult<()> {
        for (param, val) in [
            ("radius", self.radius),
            ("gap", self.gap),
            ("wg_width", self.wg_width),
        ] {
            if !(val > 0.0) || !val.is_finite() {
                return Err(LayoutError::param(
                    param,
                    format!("Ring {} must be positive, got {}", param, val),
                ));
            }
        }
        if !(self.length_x >= 0.0) {
            return Err(LayoutError::param(
                "length_x",
                format!("Ring length_x must be non-negative, got {}", self.length_x),
            ));
        }
        if self.coupler == RingCoupler::Pulley {
            if self.length_x != 0.0 {
                return Err(LayoutError::param(
                    "length_x",
                    "Pulley couplers require a circular ring",
                ));
            }
            if !(self.coupling_angle > 0.0 && self.coupling_angle < 180.0) {
                return Err(LayoutError::param(
                    "coupling_angle",
                    format!(
                        "Pulley coupling angle must be in (0, 180), got {}",
                        self.coupling_angle
                    ),
                ));
            }
        }
        Ok(())
    }
    /// Cell name, for arcs sampled according to `tech`
    fn name(&self, tech: &Tech) -> LayoutResult<String> {
        let mut summary = format!(
            "ring_single_R{}_G{}_LX{}_W{}_{}",
            self.radius, self.gap, self.length_x, self.wg_width, self.coupler
        );
        if self.coupler == RingCoupler::Pulley {
            summary += &format!("{}", self.coupling_angle);
        }
        if let Some(h) = &self.heater {
            summary += &format!("_heater_{}", h.style);
        }
        cell_name(summary, &(self, tech.bend_points_distance))
    }
}

/// Closed centerline of a ring or racetrack, counter-clockwise,
/// starting at the left end of its bottom straight with the bottom at y = 0.
/// The last point repeats the first.
pub fn ring_path(radius: f64, length_x: f64, tech: &Tech) -> LayoutResult<Path> {
    let arc = Path::arc(radius, 180., arc_points(radius, 180., tech))?;
    let mut path = if length_x > 0.0 {
        let mut p = Path::straight(length_x)?;
        p.append(&arc).append(&Path::straight(length_x)?);
        p
    } else {
        arc.clone()
    };
    path.append(&arc);
    path.translate(-length_x / 2., 0.);
    Ok(path)
}

/// Ribbon of `width` along closed path `path`, as a polygon with one hole
pub fn loop_polygon(path: &Path, width: f64) -> LayoutResult<Polygon> {
    let mut pts = path.points.clone();
    if pts.len() > 1 && pts[0].approx_eq(&pts[pts.len() - 1], 1e-9) {
        pts.pop();
    }
    let n = pts.len();
    let mut outer = Vec::with_capacity(n);
    let mut inner = Vec::with_capacity(n);
    for k in 0..n {
        let d = pts[(k + 1) % n] - pts[(k + n - 1) % n];
        let nrm = Point::new(-d.y, d.x) * (1. / d.norm());
        outer.push(pts[k] - nrm * (width / 2.));
        inner.push(pts[k] + nrm * (width / 2.));
    }
    Polygon {
        points: outer,
        holes: vec![inner],
    }
    .normalized()
    .ok_or_else(|| LayoutError::param("path", "Degenerate ring path"))
}

/// Ring resonator with a single bus waveguide, ports `o1` and `o2`.
/// With a heater configured, its ports are added as well.
pub fn ring_single(lib: &mut Library, cfg: &RingConfig, tech: &Tech) -> LayoutResult<Ptr<Component>> {
    cfg.validate()?;
    let name = cfg.name(tech)?;
    if let Some(ptr) = lib.get(&name) {
        return Ok(ptr);
    }
    let (r, w, lx) = (cfg.radius, cfg.wg_width, cfg.length_x);
    let xs = CrossSection::strip(w, cfg.layer);
    let mut comp = Component::new(name.clone());

    // Ring, with its bottom centerline at y = w + gap
    let mut ring = ring_path(r, lx, tech)?;
    ring.translate(0., w + cfg.gap);
    comp.add_polygon(cfg.layer, loop_polygon(&ring, w)?);

    // Bus, with its closest approach centered at the origin
    match cfg.coupler {
        RingCoupler::Point => {
            let length = 2. * (r + w + BUS_MARGIN) + lx;
            let bus = straight(lib, length, &xs)?;
            let inst = comp.add_ref("bus", &bus);
            inst.translate(-length / 2., 0.);
            let inst = inst.clone();
            comp.add_ports_from(&inst, "")?;
        }
        RingCoupler::Pulley => {
            let rb = r + w + cfg.gap;
            let half_angle = cfg.coupling_angle / 2.;
            let arc = |angle: f64| Path::arc(rb, angle, arc_points(rb, angle, tech));
            let mut bus = Path::straight(r)?;
            bus.append(&arc(-half_angle)?).append(&arc(half_angle)?);
            let mid = bus.end();
            bus.append(&arc(half_angle)?)
                .append(&arc(-half_angle)?)
                .append(&Path::straight(r)?);
            bus.translate(-mid.x, -mid.y);
            xs.extrude_into(&bus, &mut comp)?;
        }
    }

    if let Some(hcfg) = &cfg.heater {
        // Over the top half, away from the coupler
        let s0 = lx + PI * r / 2.;
        let s1 = 2. * lx + 3. * PI * r / 2.;
        heater::add_heater(&mut comp, &ring.slice(s0, s1)?, hcfg)?;
    }
    comp.info.insert("radius".into(), r);
    comp.info.insert("length_x".into(), lx);
    Ok(lib.add(comp))
}

/// # Straight Heater (Phase-Shifter) Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StraightHeaterConfig {
    pub length: f64,
    pub wg_width: f64,
    pub heater: HeaterConfig,
    /// Side of the square contact pad at either end
    pub pad_size: f64,
    /// Vias tying each contact pad's routing metal to its heater metal
    pub vias: ViaArray,
    pub layer: LayerSpec,
}
impl Default for StraightHeaterConfig {
    fn default() -> Self {
        Self {
            length: 320.,
            wg_width: 1.,
            heater: HeaterConfig::default(),
            pad_size: 20.,
            vias: ViaArray {
                margin: 1.,
                ..Default::default()
            },
            layer: WG,
        }
    }
}
impl SerdeFile for StraightHeaterConfig {}

/// Heater contact pad: a square of heater and routing metal tied by vias, with port `e` at its center
fn contact_pad(lib: &mut Library, cfg: &StraightHeaterConfig) -> LayoutResult<Ptr<Component>> {
    let (size, hl, rl) = (cfg.pad_size, cfg.heater.heater_layer, cfg.heater.route_layer);
    let name = cell_name(format!("contact_pad_S{}", size), &(size, hl, rl, &cfg.vias))?;
    lib.get_or_create(&name, || {
        let mut comp = Component::new(name.clone());
        let square = Rect::centered(Point::default(), size, size).to_poly();
        comp.add_polygon(hl, square.clone());
        comp.add_polygon(rl, square);
        let vias = cfg.vias.fill(&comp, rl, &[hl], "vias")?;
        comp.add_polygons(cfg.vias.layer, vias.polygons(&cfg.vias.layer).to_vec());
        comp.add_port(Port::new("e", Point::default(), 90., size, rl)?)?;
        Ok(comp)
    })
}

/// Straight thermo-optic phase shifter: waveguide, heater, and a contact pad at either end.
/// Ports `o1`, `o2` (optical) and `e1`, `e2` (electrical).
pub fn straight_heater(lib: &mut Library, cfg: &StraightHeaterConfig) -> LayoutResult<Ptr<Component>> {
    let length = cfg.length;
    let hname = cell_name(format!("heater_{}_L{}", cfg.heater.style, length), &(length, &cfg.heater))?;
    let heater = lib.get_or_create(&hname, || heater::heater(&Path::straight(length)?, &cfg.heater))?;
    let wg = straight(lib, length, &CrossSection::strip(cfg.wg_width, cfg.layer))?;
    let pad = contact_pad(lib, cfg)?;

    let name = cell_name(
        format!("straight_heater_L{}_{}_P{}", length, cfg.heater.style, cfg.pad_size),
        cfg,
    )?;
    lib.get_or_create(&name, || {
        let mut comp = Component::new(name.clone());
        let inst = comp.add_ref("wg", &wg).clone();
        comp.add_ports_from(&inst, "")?;
        comp.add_ref("heater", &heater);
        let half = cfg.pad_size / 2.;
        for (inst_name, port_name, x) in [("pad1", "e1", -half), ("pad2", "e2", length + half)] {
            let inst = comp.add_ref(inst_name, &pad);
            inst.translate(x, 0.);
            let port = inst.port("e")?;
            comp.add_port(port.renamed(port_name))?;
        }
        Ok(comp)
    })
}

/// # Ground-Signal-Ground Pad Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GsgPadConfig {
    /// Side of each square pad
    pub size: f64,
    /// Center-to-center pad pitch
    pub pitch: f64,
    pub layer: LayerSpec,
}
impl Default for GsgPadConfig {
    fn default() -> Self {
        Self {
            size: 80.,
            pitch: 100.,
            layer: PAD,
        }
    }
}
impl SerdeFile for GsgPadConfig {}

/// Ground-signal-ground probe pads along x, with ports `G1`, `S`, `G2` at their centers facing -y
pub fn gsg_pad(lib: &mut Library, cfg: &GsgPadConfig) -> LayoutResult<Ptr<Component>> {
    if !(cfg.size > 0.0) || !(cfg.pitch >= cfg.size) {
        return Err(LayoutError::param(
            "pitch",
            format!(
                "GSG pads need a positive size no larger than their pitch, got {} and {}",
                cfg.size, cfg.pitch
            ),
        ));
    }
    let name = cell_name(format!("gsg_pad_S{}_P{}", cfg.size, cfg.pitch), cfg)?;
    lib.get_or_create(&name, || {
        let mut comp = Component::new(name.clone());
        for (port_name, k) in [("G1", -1.), ("S", 0.), ("G2", 1.)] {
            let center = Point::new(k * cfg.pitch, 0.);
            comp.add_polygon(cfg.layer, Rect::centered(center, cfg.size, cfg.size).to_poly());
            comp.add_port(Port::new(port_name, center, 270., cfg.size, cfg.layer)?)?;
        }
        Ok(comp)
    })
}

/// Write `comp`, and everything it instantiates, to GDSII file `fname`
pub fn export_gds(comp: Component, fname: impl AsRef<std::path::Path>) -> LayoutResult<()> {
    let mut lib = Library::new(comp.name.clone());
    lib.add(comp);
    lib.save_gds(fname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heater::HeaterStyle;
    use crate::raw::BoundBoxTrait;
    use crate::tech::HEATER;
    use approx::assert_abs_diff_eq;

    #[test]
    fn memoized_straights() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let xs = CrossSection::strip(1., WG);
        let a = straight(&mut lib, 10., &xs)?;
        let b = straight(&mut lib, 10., &xs)?;
        let c = straight(&mut lib, 20., &xs)?;
        assert!(a == b);
        assert!(a != c);
        assert_eq!(lib.len(), 2);
        assert!(a.read()?.name.starts_with("straight_L10_W1_"));
        // Same length and width, different layer
        let other = straight(&mut lib, 10., &CrossSection::strip(1., HEATER))?;
        assert!(other != a);
        assert_eq!(lib.len(), 3);
        Ok(())
    }
    #[test]
    fn euler_bend_cell() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let cfg = EulerBend {
            radius: 20.,
            use_eff: true,
            ..Default::default()
        };
        let bend = bend_euler(&mut lib, &cfg, &CrossSection::strip(1., WG), &Tech::default())?;
        let bend = bend.read()?;
        assert_abs_diff_eq!(bend.info["Reff"], 20., epsilon = 1e-9);
        let o2 = bend.port("o2")?;
        assert!(o2.center.approx_eq(&Point::new(20., 20.), 1e-6));
        assert_abs_diff_eq!(o2.orientation, 90., epsilon = 1e-6);
        Ok(())
    }
    #[test]
    fn ring_geometry() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let tech = Tech::default();
        let cfg = RingConfig::default();
        let ring = ring_single(&mut lib, &cfg, &tech)?;
        let again = ring_single(&mut lib, &cfg, &tech)?;
        assert!(ring == again);
        let ring = ring.read()?;
        let polys = ring.polygons(&WG);
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].holes.len(), 1);
        // The ring's bottom edge clears the bus by the gap
        let bbox = polys[0].holes[0].as_slice().bbox();
        let outer = polys[0].points.as_slice().bbox();
        assert_abs_diff_eq!(outer.p0.y, 0.5 + 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(bbox.p1.y - bbox.p0.y, 2. * 49.5, epsilon = 1e-2);
        let (o1, o2) = (ring.port("o1")?, ring.port("o2")?);
        assert_eq!(o1.orientation, 180.);
        assert_eq!(o2.orientation, 0.);
        assert_abs_diff_eq!(o2.center.x - o1.center.x, 2. * (50. + 1. + BUS_MARGIN), epsilon = 1e-9);
        Ok(())
    }
    #[test]
    fn racetrack_with_heater() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let cfg = RingConfig {
            radius: 20.,
            length_x: 30.,
            heater: Some(HeaterConfig::default()),
            ..Default::default()
        };
        let ring = ring_single(&mut lib, &cfg, &Tech::default())?;
        let ring = ring.read()?;
        let names: Vec<&str> = ring.ports.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["o1", "o2", "HeatIn", "HeatOut"]);
        // The heater runs over the top straight, from right to left
        let (hin, hout) = (ring.port("HeatIn")?, ring.port("HeatOut")?);
        let top = 1. + 0.3 + 40.;
        assert!(hin.center.approx_eq(&Point::new(15. + 20., 1.3 + 20.), 1e-2));
        assert!(hout.center.approx_eq(&Point::new(-15. - 20., 1.3 + 20.), 1e-2));
        assert!(ring.polygons(&HEATER)[0].bbox().p1.y <= top + 2. + 1e-6);
        Ok(())
    }
    #[test]
    fn pulley_ring() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let cfg = RingConfig {
            coupler: RingCoupler::Pulley,
            coupling_angle: 40.,
            ..Default::default()
        };
        let ring = ring_single(&mut lib, &cfg, &Tech::default())?;
        let ring = ring.read()?;
        assert_eq!(ring.polygons(&WG).len(), 2);
        let (o1, o2) = (ring.port("o1")?, ring.port("o2")?);
        assert_abs_diff_eq!(o1.orientation, 180., epsilon = 1e-6);
        assert_abs_diff_eq!(o2.orientation, 0., epsilon = 1e-6);
        // Symmetric about the ring's vertical axis
        assert_abs_diff_eq!(o1.center.x, -o2.center.x, epsilon = 1e-6);
        assert_abs_diff_eq!(o1.center.y, o2.center.y, epsilon = 1e-6);
        assert!(o1.center.y > 0.);

        let bad = RingConfig {
            coupler: RingCoupler::Pulley,
            length_x: 10.,
            ..Default::default()
        };
        assert!(ring_single(&mut lib, &bad, &Tech::default()).is_err());
        Ok(())
    }
    #[test]
    fn phase_shifter() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let cfg = StraightHeaterConfig {
            length: 100.,
            heater: HeaterConfig {
                style: HeaterStyle::Snake,
                ..Default::default()
            },
            ..Default::default()
        };
        let ps = straight_heater(&mut lib, &cfg)?;
        let ps = ps.read()?;
        let names: Vec<&str> = ps.ports.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["o1", "o2", "e1", "e2"]);
        assert_eq!(ps.port("e1")?.center, Point::new(-10., 0.));
        assert_eq!(ps.port("e2")?.center, Point::new(110., 0.));
        assert_eq!(ps.insts.len(), 4);
        // Pads carry vias
        let pad = ps.insts.iter().find(|i| i.inst_name == "pad1").unwrap().cell.clone();
        let vias = pad.read()?.polygons(&cfg.vias.layer).len();
        assert_eq!(vias, 16 * 16);
        Ok(())
    }
    #[test]
    fn cells_differ_in_any_parameter() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let narrow = StraightHeaterConfig {
            length: 50.,
            heater: HeaterConfig {
                heater_width: 4.,
                ..Default::default()
            },
            ..Default::default()
        };
        let wide = StraightHeaterConfig {
            heater: HeaterConfig {
                heater_width: 8.,
                ..narrow.heater.clone()
            },
            ..narrow.clone()
        };
        let a = straight_heater(&mut lib, &narrow)?;
        let b = straight_heater(&mut lib, &wide)?;
        assert!(a != b);
        assert!(straight_heater(&mut lib, &narrow)? == a);
        let heater_height = |ps: &Ptr<Component>| -> LayoutResult<f64> {
            let ps = ps.read()?;
            let inst = ps.insts.iter().find(|i| i.inst_name == "heater").unwrap();
            let cell = inst.cell.read()?;
            let b = cell.polygons(&HEATER)[0].bbox();
            Ok(b.p1.y - b.p0.y)
        };
        assert_abs_diff_eq!(heater_height(&a)?, 4., epsilon = 1e-9);
        assert_abs_diff_eq!(heater_height(&b)?, 8., epsilon = 1e-9);

        // Pads differing only in via pitch
        let mut pitched = narrow.clone();
        pitched.vias.pitch *= 2.;
        let c = straight_heater(&mut lib, &pitched)?;
        let pad = |ps: &Ptr<Component>| -> LayoutResult<Ptr<Component>> {
            let ps = ps.read()?;
            Ok(ps.insts.iter().find(|i| i.inst_name == "pad1").unwrap().cell.clone())
        };
        assert!(pad(&a)? != pad(&c)?);

        // Rings differing only in their heater's gap
        let tech = Tech::default();
        let ring = |gap: f64| RingConfig {
            heater: Some(HeaterConfig {
                style: HeaterStyle::Snake,
                gap,
                ..Default::default()
            }),
            ..Default::default()
        };
        let r1 = ring_single(&mut lib, &ring(2.), &tech)?;
        let r2 = ring_single(&mut lib, &ring(3.), &tech)?;
        assert!(r1 != r2);
        Ok(())
    }
    #[test]
    fn gsg() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let pads = gsg_pad(&mut lib, &GsgPadConfig::default())?;
        let pads = pads.read()?;
        assert_eq!(pads.polygons(&PAD).len(), 3);
        assert_eq!(pads.port("G1")?.center, Point::new(-100., 0.));
        assert_eq!(pads.port("S")?.orientation, 270.);
        let bad = GsgPadConfig {
            size: 120.,
            ..Default::default()
        };
        assert!(gsg_pad(&mut lib, &bad).is_err());
        Ok(())
    }
}

//!
//! # Partial-Euler Bends
//!
//! Bends whose curvature grows linearly from zero along an Euler spiral,
//! is held constant over a central circular arc, and falls back to zero at the far end.
//! The fraction `p` of the bend spent in the spiral sets how gradual the transition is:
//! `p = 1` is a full Euler bend, `p → 0` approaches a circular arc.
//!
//! The resulting polyline is scaled either so that its minimum radius of curvature
//! equals `radius`, or so that its *effective* radius (the distance from the bend's
//! endpoints to the intersection of their normals) does.
//! In the latter mode the bend replaces a circular arc of the same radius with identical endpoints.
//!
//! Reference: F. Vogelbacher et al., "Analysis of silicon nitride partial Euler waveguide bends",
//! Opt. Express 27, 31394 (2019).
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::fresnel;
use crate::raw::{LayoutError, LayoutResult, Path, Point, EPS};
use crate::tech::Tech;
use crate::utils::SerdeFile;

/// # Euler Bend Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EulerBend {
    /// Minimum radius if `use_eff` is false, effective radius otherwise
    pub radius: f64,
    /// Total turning angle in degrees. Negative angles turn clockwise.
    pub angle: f64,
    /// Fraction of the bend spent in the Euler spiral, in (0, 1]
    pub p: f64,
    /// Scale to the effective radius, rather than the minimum radius
    pub use_eff: bool,
    /// Number of points per half bend. Derived from the technology's bend-point distance if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub npoints: Option<usize>,
}
impl Default for EulerBend {
    fn default() -> Self {
        Self {
            radius: 10.0,
            angle: 90.0,
            p: 0.5,
            use_eff: false,
            npoints: None,
        }
    }
}
impl SerdeFile for EulerBend {}

impl EulerBend {
    /// Check parameter ranges
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(LayoutError::param(
                "radius",
                format!("Euler bend radius must be positive, got {}", self.radius),
            ));
        }
        if !self.angle.is_finite() || self.angle == 0.0 || self.angle.abs() >= 360.0 {
            return Err(LayoutError::param(
                "angle",
                format!(
                    "Euler bend angle must be non-zero and within (-360, 360), got {}",
                    self.angle
                ),
            ));
        }
        if !(self.p > 0.0 && self.p <= 1.0) {
            return Err(LayoutError::param(
                "p",
                format!("Euler fraction p must be in (0, 1], got {}", self.p),
            ));
        }
        Ok(())
    }
    /// Number of points per half bend, with bend points spaced roughly `delta` apart
    pub fn npoints(&self, delta: f64) -> LayoutResult<usize> {
        if let Some(n) = self.npoints {
            return Ok(n);
        }
        if !(delta > 0.0) {
            return Err(LayoutError::param(
                "bend_points_distance",
                format!("Bend-point distance must be positive, got {}", delta),
            ));
        }
        Ok(default_npoints(self.angle, self.radius, delta))
    }
    /// Generate the bend centerline, with bend points spaced roughly `delta` apart
    pub fn path(&self, delta: f64) -> LayoutResult<Path> {
        self.validate()?;
        let n = self.npoints(delta)?;
        let angle = self.angle.abs();

        let (points, reff, rmin) = if n < 4 {
            tracing::warn!(
                "euler bend with {} points per half, falling back to a two-point arc chord",
                n
            );
            let theta = angle.to_radians();
            let end = Point::new(self.radius * theta.sin(), self.radius * (1. - theta.cos()));
            (vec![Point::new(0., 0.), end], self.radius, self.radius)
        } else {
            let (points, reff, rmin) = unit_bend(angle, self.p, n);
            let scale = if self.use_eff {
                self.radius / reff
            } else {
                self.radius / rmin
            };
            let points = points.into_iter().map(|p| p * scale).collect();
            (points, reff * scale, rmin * scale)
        };

        let mut path = Path::with_angles(dedup(points), 0., angle)?;
        path.info.insert("Reff".into(), reff);
        path.info.insert("Rmin".into(), rmin);
        if self.angle < 0.0 {
            path.mirror_x();
        }
        tracing::debug!(
            "euler bend: angle {}, p {}, {} points, Reff {:.4}, Rmin {:.4}",
            self.angle,
            self.p,
            path.points.len(),
            reff,
            rmin
        );
        Ok(path)
    }
}

/// Generate the centerline of Euler bend `cfg`, using the bend-point density of `tech`
pub fn euler_path(cfg: &EulerBend, tech: &Tech) -> LayoutResult<Path> {
    cfg.path(tech.bend_points_distance)
}

/// Default number of points per half bend:
/// enough for a spacing of `delta` along the bend, and never fewer than `⌈360/angle⌉ + 1`.
pub fn default_npoints(angle: f64, radius: f64, delta: f64) -> usize {
    let angle = angle.abs();
    let by_length = (angle / 360. * radius / delta).ceil();
    let by_angle = (360. / angle).ceil() + 1.;
    by_length.max(by_angle) as usize
}

/// Largest end-tangent error, in radians, left by sampling the spiral, where the point budget allows
const SPIRAL_TANGENT_TOL: f64 = 1e-3;

/// Unit-scale bend of `angle` degrees (positive), with `n` points per half.
/// Returns the points, effective radius, and minimum radius.
fn unit_bend(angle: f64, p: f64, n: usize) -> (Vec<Point>, f64, f64) {
    let alpha = angle.to_radians();
    let rp = 1. / (p * alpha).sqrt();
    let sp = (p * alpha).sqrt();
    let s0 = 2. * sp + rp * alpha * (1. - p);

    let phi = p * alpha / 2.;

    // The first spiral segment deviates from the start tangent by about phi / 3m², over m segments
    let min_segments = (phi / (3. * SPIRAL_TANGENT_TOL)).sqrt().ceil() as usize;
    let by_length = (sp / (s0 / 2.) * n as f64).round() as usize;
    let n_euler = by_length.max(min_segments + 1).clamp(2, n - 2);
    let n_arc = n - n_euler;

    // First half: spiral, then an arc joined tangentially at its end
    let mut half = fresnel::sample(sp, n_euler);
    let join = half[half.len() - 1];
    let dx = join.x - rp * phi.sin();
    let dy = join.y - rp * (1. - phi.cos());
    half.extend((1..n_arc).map(|k| {
        let s = sp + (s0 / 2. - sp) * k as f64 / (n_arc - 1) as f64;
        let theta = (s - sp) / rp + phi;
        Point::new(rp * theta.sin() + dx, rp * (1. - theta.cos()) + dy)
    }));

    // Second half: the first, mirrored, reversed, and rotated onto its end
    let rot = angle - 180.;
    let mut second: Vec<Point> = half
        .iter()
        .rev()
        .map(|p| Point::new(p.x, -p.y).rotate(rot, &Point::default()))
        .collect();
    let shift = half[half.len() - 1] - second[0];
    for p in second.iter_mut() {
        *p = *p + shift;
    }
    let mut points = half;
    points.pop();
    points.extend(second);

    // Effective radius: distance from either endpoint to the intersection of their normals
    let end = points[points.len() - 1];
    let reff = if (180. - angle).abs() < 1e-3 {
        tracing::debug!("euler bend of {} degrees, using the half-height effective radius", angle);
        end.y / 2.
    } else if angle < 180. {
        // y-intercept of the end normal
        end.y - (angle - 90.).to_radians().tan() * end.x
    } else {
        // Past a half turn the normals meet behind the start, and the intercept turns negative
        end.norm() / (2. * (alpha / 2.).sin())
    };
    (points, reff, rp)
}

/// Remove consecutive duplicate points
fn dedup(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points.into_iter() {
        if out.last().map_or(true, |q| !q.approx_eq(&p, EPS)) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{normalize_angle, ANGLE_TOL};
    use approx::assert_abs_diff_eq;

    /// Direction, in degrees, of the last segment
    fn last_tangent(path: &Path) -> f64 {
        let n = path.points.len();
        normalize_angle((path.points[n - 1] - path.points[n - 2]).angle())
    }

    #[test]
    fn quarter_turn_effective() -> LayoutResult<()> {
        let cfg = EulerBend {
            radius: 100.,
            angle: 90.,
            p: 0.5,
            use_eff: true,
            npoints: None,
        };
        let path = euler_path(&cfg, &Tech::default())?;
        assert_eq!(path.start_angle, 0.);
        assert_abs_diff_eq!(path.end_angle, 90., epsilon = ANGLE_TOL);
        assert_eq!(path.start(), Point::new(0., 0.));
        assert!(path.end().approx_eq(&Point::new(100., 100.), 1e-2));
        let (reff, rmin) = (path.info["Reff"], path.info["Rmin"]);
        assert_abs_diff_eq!(reff, 100., epsilon = 1e-9);
        assert!(rmin <= reff);
        assert_abs_diff_eq!(last_tangent(&path), 90., epsilon = 0.05);
        Ok(())
    }
    #[test]
    fn hairpin_full_euler() -> LayoutResult<()> {
        let cfg = EulerBend {
            radius: 50.,
            angle: 180.,
            p: 1.,
            use_eff: true,
            npoints: Some(200),
        };
        let path = cfg.path(0.5)?;
        assert!(path.end().approx_eq(&Point::new(0., 100.), 1e-6));
        assert_abs_diff_eq!(path.info["Reff"], 50., epsilon = 1e-9);
        assert_abs_diff_eq!(path.end_angle, 180., epsilon = ANGLE_TOL);
        // A full Euler bend has a zero-length arc; its samples collapse onto one point
        for w in path.points.windows(2) {
            assert!(!w[0].approx_eq(&w[1], EPS));
        }
        Ok(())
    }
    #[test]
    fn minimum_radius_scaling() -> LayoutResult<()> {
        let cfg = EulerBend {
            radius: 10.,
            angle: 90.,
            p: 0.3,
            use_eff: false,
            npoints: None,
        };
        let path = cfg.path(0.5)?;
        assert_abs_diff_eq!(path.info["Rmin"], 10., epsilon = 1e-12);
        assert!(path.info["Reff"] > 10.);
        // The bend is symmetric about the line y = Reff - x
        let end = path.end();
        assert_abs_diff_eq!(end.x, end.y, epsilon = 1e-9);
        assert_abs_diff_eq!(end.y, path.info["Reff"], epsilon = 1e-9);
        Ok(())
    }
    #[test]
    fn closure_and_chord() -> LayoutResult<()> {
        for angle in [15., 45., 90., 135., 179.9995, 180., 200., 270., 330.] {
            for p in [0.1, 0.5, 1.0] {
                let radius = 20.;
                let cfg = EulerBend {
                    radius,
                    angle,
                    p,
                    use_eff: true,
                    npoints: None,
                };
                let path = cfg.path(0.5)?;
                assert_eq!(path.start_angle, 0.);
                let turn = normalize_angle(path.end_angle - path.start_angle);
                assert_abs_diff_eq!(turn, normalize_angle(angle), epsilon = ANGLE_TOL);
                let tangent = normalize_angle(last_tangent(&path) - angle + 180.) - 180.;
                assert!(tangent.abs() < 0.25, "angle {} p {}: tangent off by {}", angle, p, tangent);
                // Endpoints match those of an ideal circular arc
                let chord = path.start().dist(&path.end());
                let ideal = 2. * radius * (angle.to_radians() / 2.).sin();
                assert!(
                    (chord - ideal).abs() <= 1e-3 * radius,
                    "angle {} p {}: chord {} vs {}",
                    angle,
                    p,
                    chord,
                    ideal
                );
            }
        }
        Ok(())
    }
    #[test]
    fn large_turns_leave_along_x() -> LayoutResult<()> {
        for angle in [181., 190., 250., 270., 300., 330., 359.] {
            for p in [0.1, 0.5, 1.0] {
                for use_eff in [true, false] {
                    let cfg = EulerBend {
                        radius: 20.,
                        angle,
                        p,
                        use_eff,
                        npoints: None,
                    };
                    let path = cfg.path(0.5)?;
                    assert_eq!(path.start(), Point::new(0., 0.));
                    let first = normalize_angle((path.points[1] - path.points[0]).angle() + 180.) - 180.;
                    assert!(first.abs() < 0.25, "angle {} p {}: leaves at {}", angle, p, first);
                    let (reff, rmin) = (path.info["Reff"], path.info["Rmin"]);
                    assert!(rmin > 0. && reff > 0., "angle {} p {}: Reff {} Rmin {}", angle, p, reff, rmin);
                    // Counter-clockwise turns start off upward
                    assert!(path.points.iter().skip(1).take(3).all(|pt| pt.y >= 0.));
                }
            }
        }
        Ok(())
    }
    #[test]
    fn coarse_spirals_keep_end_tangent() -> LayoutResult<()> {
        // Few points per half and a short spiral
        let cfg = EulerBend {
            radius: 20.,
            angle: 45.,
            p: 0.1,
            use_eff: true,
            npoints: None,
        };
        let path = cfg.path(0.5)?;
        let tangent = normalize_angle(last_tangent(&path) - 45. + 180.) - 180.;
        assert!(tangent.abs() < 0.1, "tangent off by {}", tangent);
        Ok(())
    }
    #[test]
    fn negative_angles_mirror() -> LayoutResult<()> {
        let pos = EulerBend::default().path(0.5)?;
        let neg = EulerBend {
            angle: -90.,
            ..Default::default()
        }
        .path(0.5)?;
        assert_eq!(pos.points.len(), neg.points.len());
        for (a, b) in pos.points.iter().zip(neg.points.iter()) {
            assert!(b.approx_eq(&Point::new(a.x, -a.y), 1e-12));
        }
        assert_eq!(neg.start_angle, 0.);
        assert_abs_diff_eq!(neg.end_angle, 270., epsilon = ANGLE_TOL);
        Ok(())
    }
    #[test]
    fn point_budget() -> LayoutResult<()> {
        assert_eq!(default_npoints(90., 100., 0.5), 50);
        assert_eq!(default_npoints(90., 1., 0.5), 5);
        assert_eq!(default_npoints(270., 1., 0.5), 3);
        // Too few points for both spiral and arc: a two-point chord
        let cfg = EulerBend {
            radius: 1.,
            angle: 270.,
            ..Default::default()
        };
        let path = cfg.path(0.5)?;
        assert_eq!(path.points.len(), 2);
        assert_eq!(path.info["Reff"], 1.);
        Ok(())
    }
    #[test]
    fn invalid_parameters() {
        let bad = [
            EulerBend {
                p: 0.,
                ..Default::default()
            },
            EulerBend {
                p: 1.5,
                ..Default::default()
            },
            EulerBend {
                radius: 0.,
                ..Default::default()
            },
            EulerBend {
                angle: 0.,
                ..Default::default()
            },
            EulerBend {
                angle: 360.,
                ..Default::default()
            },
            EulerBend {
                radius: f64::NAN,
                ..Default::default()
            },
        ];
        for cfg in bad.iter() {
            let err = cfg.path(0.5).unwrap_err();
            assert!(matches!(err, LayoutError::InvalidParameter { .. }));
        }
    }
    #[test]
    fn euler_serde() -> LayoutResult<()> {
        use crate::utils::SerializationFormat;
        let cfg: EulerBend = SerializationFormat::Toml.from_str("radius = 25.0\nuse_eff = true\n")?;
        assert_eq!(cfg.radius, 25.);
        assert!(cfg.use_eff);
        assert_eq!(cfg.p, 0.5);
        assert_eq!(cfg.npoints, None);
        Ok(())
    }
}

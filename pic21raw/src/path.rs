//!
//! # Paths
//!
//! Waveguide and wire centerlines: ordered polylines with explicit tangent directions at either end.
//!

// Crates.io
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::{normalize_angle, Point, Polygon, Transform, TransformTrait, EPS},
};

/// Tolerance, in degrees, for agreement between declared end-angles and polyline tangents
pub const ANGLE_TOL: f64 = 1e-3;

/// # Path
///
/// Centerline of a waveguide or wire.
/// `start_angle` and `end_angle` are the tangent directions, in degrees,
/// at the first and last points respectively.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Numeric metadata, e.g. the effective and minimum radii of bends
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub info: IndexMap<String, f64>,
}
impl Path {
    /// Create a [Path] from `points`, inferring its end-angles from the first and last segments.
    /// Fails with fewer than two distinct points.
    pub fn new(points: Vec<Point>) -> LayoutResult<Self> {
        if points.len() < 2 {
            return Err(LayoutError::param(
                "points",
                format!("Path requires at least two points, got {}", points.len()),
            ));
        }
        let n = points.len();
        let first = points[1] - points[0];
        let last = points[n - 1] - points[n - 2];
        if first.norm() <= EPS || last.norm() <= EPS {
            return Err(LayoutError::param(
                "points",
                "Path end-segments must have non-zero length",
            ));
        }
        Ok(Self {
            start_angle: normalize_angle(first.angle()),
            end_angle: normalize_angle(last.angle()),
            points,
            info: IndexMap::new(),
        })
    }
    /// Create a [Path] with explicit end-angles
    pub fn with_angles(points: Vec<Point>, start_angle: f64, end_angle: f64) -> LayoutResult<Self> {
        if points.len() < 2 {
            return Err(LayoutError::param(
                "points",
                format!("Path requires at least two points, got {}", points.len()),
            ));
        }
        Ok(Self {
            points,
            start_angle,
            end_angle,
            info: IndexMap::new(),
        })
    }
    /// Straight path of `length` along +x, starting at the origin
    pub fn straight(length: f64) -> LayoutResult<Self> {
        if !(length > 0.0) || !length.is_finite() {
            return Err(LayoutError::param(
                "length",
                format!("Straight length must be positive, got {}", length),
            ));
        }
        Self::with_angles(vec![Point::new(0., 0.), Point::new(length, 0.)], 0., 0.)
    }
    /// Circular arc of `radius`, turning by `angle` degrees, starting at the origin heading +x.
    /// Positive angles turn counter-clockwise, negative angles clockwise.
    pub fn arc(radius: f64, angle: f64, npoints: usize) -> LayoutResult<Self> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(LayoutError::param(
                "radius",
                format!("Arc radius must be positive, got {}", radius),
            ));
        }
        if angle == 0.0 || !angle.is_finite() {
            return Err(LayoutError::param("angle", "Arc angle must be non-zero"));
        }
        let npoints = npoints.max(2);
        let sign = angle.signum();
        let points = (0..npoints)
            .map(|k| {
                let theta = (angle.abs() * k as f64 / (npoints - 1) as f64).to_radians();
                Point::new(radius * theta.sin(), sign * radius * (1. - theta.cos()))
            })
            .collect();
        Self::with_angles(points, 0., angle)
    }
    /// Total arc length
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].dist(&w[1])).sum()
    }
    /// First point
    pub fn start(&self) -> Point {
        self.points[0]
    }
    /// Last point
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }
    /// Point and tangent-direction (degrees) at arc length `s`, clamped to the path extent
    pub fn interpolate(&self, s: f64) -> (Point, f64) {
        if s <= 0.0 {
            return (self.start(), self.start_angle);
        }
        let mut acc = 0.0;
        for w in self.points.windows(2) {
            let seg = w[0].dist(&w[1]);
            if seg > 0.0 && acc + seg >= s {
                let t = (s - acc) / seg;
                let pt = w[0] + (w[1] - w[0]) * t;
                return (pt, (w[1] - w[0]).angle());
            }
            acc += seg;
        }
        (self.end(), self.end_angle)
    }
    /// Extract the portion of the path between arc lengths `s0` and `s1`
    pub fn slice(&self, s0: f64, s1: f64) -> LayoutResult<Path> {
        if !(s1 > s0) {
            return Err(LayoutError::param(
                "s1",
                format!("Path slice requires s1 > s0, got [{}, {}]", s0, s1),
            ));
        }
        let (p0, a0) = self.interpolate(s0);
        let (p1, a1) = self.interpolate(s1);
        let mut points = vec![p0];
        let mut acc = 0.0;
        for w in self.points.windows(2) {
            acc += w[0].dist(&w[1]);
            if acc > s0 + EPS && acc < s1 - EPS {
                points.push(w[1]);
            }
        }
        points.push(p1);
        Self::with_angles(points, a0, a1)
    }
    /// Translate by (`dx`, `dy`)
    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        *self = self.transform(&Transform::translate(dx, dy));
        self
    }
    /// Rotate by `angle` degrees about `center`
    pub fn rotate(&mut self, angle: f64, center: &Point) -> &mut Self {
        *self = self.transform(&Transform::rotate_about(angle, center));
        self
    }
    /// Mirror across the x-axis
    pub fn mirror_x(&mut self) -> &mut Self {
        *self = self.transform(&Transform::reflect_vert());
        self
    }
    /// Append `other`, rotated and translated to continue tangentially from our end
    pub fn append(&mut self, other: &Path) -> &mut Self {
        let rot = Transform::rotate_about(self.end_angle - other.start_angle, &other.start());
        let delta = self.end() - other.start();
        let trans = Transform::cascade(&Transform::translate(delta.x, delta.y), &rot);
        let other = other.transform(&trans);
        self.points.extend(other.points.iter().skip(1).copied());
        self.end_angle = other.end_angle;
        self
    }
    /// Unit normal (pointing left of the direction of travel) at each point.
    /// Interior normals come from centered differences, endpoint normals from the declared end-angles.
    fn normals(&self) -> Vec<Point> {
        let n = self.points.len();
        (0..n)
            .map(|k| {
                let tangent = if k == 0 {
                    Point::unit(self.start_angle)
                } else if k == n - 1 {
                    Point::unit(self.end_angle)
                } else {
                    let d = self.points[k + 1] - self.points[k - 1];
                    let len = d.norm();
                    if len > EPS {
                        d * (1. / len)
                    } else {
                        Point::unit(self.start_angle)
                    }
                };
                Point::new(-tangent.y, tangent.x)
            })
            .collect()
    }
    /// Point offset by `offset` to the left of the path's start
    pub fn start_offset(&self, offset: f64) -> Point {
        self.start() + Point::unit(self.start_angle + 90.) * offset
    }
    /// Point offset by `offset` to the left of the path's end
    pub fn end_offset(&self, offset: f64) -> Point {
        self.end() + Point::unit(self.end_angle + 90.) * offset
    }
    /// Extrude into a ribbon [Polygon] of `width`, centered `offset` to the left of the centerline
    pub fn extrude(&self, width: f64, offset: f64) -> LayoutResult<Polygon> {
        if !(width > 0.0) || !width.is_finite() {
            return Err(LayoutError::param(
                "width",
                format!("Extrusion width must be positive, got {}", width),
            ));
        }
        let normals = self.normals();
        let (left, right) = (offset + width / 2., offset - width / 2.);
        let mut points: Vec<Point> = self
            .points
            .iter()
            .zip(normals.iter())
            .map(|(p, nrm)| *p + *nrm * right)
            .collect();
        points.extend(
            self.points
                .iter()
                .zip(normals.iter())
                .rev()
                .map(|(p, nrm)| *p + *nrm * left),
        );
        Ok(Polygon::new(points))
    }
}
impl TransformTrait for Path {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
            start_angle: trans.apply_angle(self.start_angle),
            end_angle: trans.apply_angle(self.end_angle),
            info: self.info.clone(),
        }
    }
}

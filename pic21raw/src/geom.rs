//!
//! # Geometry Module
//!
//! Defines the core geometric types including [Point], [Rect], [Polygon], and [Transform],
//! and their core operations.
//!
//! All coordinates are real-valued and denominated in micrometers.
//! Snapping to a (mask-writer) grid happens explicitly, via [snap_to_grid] and friends.
//!

// Std-Lib
use std::ops::{Add, Mul, Neg, Sub};

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::bbox::{BoundBox, BoundBoxTrait};

/// Tolerance used for "on the boundary" and collinearity decisions, in micrometers.
pub const EPS: f64 = 1e-9;

/// Snap `val` to the nearest multiple of `grid`
#[inline]
pub fn snap_to_grid(val: f64, grid: f64) -> f64 {
    let snapped = (val / grid).round() * grid;
    // Avoid writing out negative zeros
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

/// Normalize an angle in degrees into [0, 360)
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Normalize into [0, 360), removing round-off near whole degrees
fn tidy_degrees(angle: f64) -> f64 {
    let rounded = angle.round();
    if (angle - rounded).abs() < 1e-9 {
        normalize_angle(rounded)
    } else {
        normalize_angle(angle)
    }
}

/// # Point in two-dimensional layout-space
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
    /// Create a unit-length [Point], i.e. a direction vector, pointing at `angle` degrees
    pub fn unit(angle: f64) -> Self {
        let (sin, cos) = exact_sin_cos(angle);
        Self::new(cos, sin)
    }
    /// Create a new point shifted by `p`
    pub fn shift(&self, p: &Point) -> Point {
        Point::new(self.x + p.x, self.y + p.y)
    }
    /// Euclidean distance to `other`
    pub fn dist(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
    /// Vector length
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
    /// Dot product
    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
    /// z-component of the cross product
    pub fn cross(&self, other: &Point) -> f64 {
        self.x * other.y - self.y * other.x
    }
    /// Direction of this point, as a vector, in degrees
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }
    /// Rotate by `angle` degrees (counter-clockwise) about `center`
    pub fn rotate(&self, angle: f64, center: &Point) -> Point {
        self.transform(&Transform::rotate_about(angle, center))
    }
    /// Snap both coordinates to `grid`
    pub fn snap(&self, grid: f64) -> Point {
        Point::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }
    /// Boolean indication of whether we lie on `grid`, within `tol` grid-units
    pub fn is_on_grid(&self, grid: f64, tol: f64) -> bool {
        let on = |v: f64| ((v / grid) - (v / grid).round()).abs() <= tol;
        on(self.x) && on(self.y)
    }
    /// Create a new [Point], transformed from our original location by `trans`
    pub fn transform(&self, trans: &Transform) -> Point {
        let x = trans.a[0][0] * self.x + trans.a[0][1] * self.y + trans.b[0];
        let y = trans.a[1][0] * self.x + trans.a[1][1] * self.y + trans.b[1];
        Point::new(x, y)
    }
    /// Approximate equality, within `tol` in each coordinate
    pub fn approx_eq(&self, other: &Point, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }
}
impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Self {
        Self::new(p.0, p.1)
    }
}
impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}
impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}
impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners.
///
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Create a new [Rect] from two opposite corners
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a [Rect] of size (`w`,`h`) centered at `center`
    pub fn centered(center: Point, w: f64, h: f64) -> Self {
        Self {
            p0: Point::new(center.x - w / 2., center.y - h / 2.),
            p1: Point::new(center.x + w / 2., center.y + h / 2.),
        }
    }
    /// Calculate our center-point
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2., (self.p0.y + self.p1.y) / 2.)
    }
    pub fn width(&self) -> f64 {
        (self.p1.x - self.p0.x).abs()
    }
    pub fn height(&self) -> f64 {
        (self.p1.y - self.p0.y).abs()
    }
    /// Convert to a (counter-clockwise) [Polygon]
    pub fn to_poly(&self) -> Polygon {
        let (xmin, xmax) = (self.p0.x.min(self.p1.x), self.p0.x.max(self.p1.x));
        let (ymin, ymax) = (self.p0.y.min(self.p1.y), self.p0.y.max(self.p1.y));
        Polygon::new(vec![
            Point::new(xmin, ymin),
            Point::new(xmax, ymin),
            Point::new(xmax, ymax),
            Point::new(xmin, ymax),
        ])
    }
}

/// Result of locating a [Point] relative to a closed ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Inside,
    Boundary,
    Outside,
}

/// Locate `pt` relative to closed ring `ring`, via the winding-number algorithm.
/// Points within [EPS] of an edge are reported as [Location::Boundary].
pub fn locate(ring: &[Point], pt: &Point) -> Location {
    let n = ring.len();
    if n < 3 {
        return Location::Outside;
    }
    let mut winding_num: isize = 0;
    for idx in 0..n {
        // Segment start and end points, wrapping back to the first point
        let (past, next) = (&ring[idx], &ring[(idx + 1) % n]);
        if on_segment(past, next, pt) {
            return Location::Boundary;
        }
        // Sort out whether the semi-infinite horizontal ray to the right of `pt` crosses the edge.
        // Half-open in y so that vertices are not double-counted.
        if past.y <= pt.y {
            if next.y > pt.y && (*next - *past).cross(&(*pt - *past)) > 0.0 {
                winding_num += 1;
            }
        } else if next.y <= pt.y && (*next - *past).cross(&(*pt - *past)) < 0.0 {
            winding_num -= 1;
        }
    }
    // Non-zero winding means inside
    if winding_num != 0 {
        Location::Inside
    } else {
        Location::Outside
    }
}

/// Boolean indication of whether `pt` lies on segment `a`-`b`, within [EPS]
fn on_segment(a: &Point, b: &Point, pt: &Point) -> bool {
    let ab = *b - *a;
    let len = ab.norm();
    if len <= EPS {
        return a.dist(pt) <= EPS;
    }
    let ap = *pt - *a;
    // Perpendicular distance
    if (ab.cross(&ap) / len).abs() > EPS {
        return false;
    }
    let t = ab.dot(&ap) / (len * len);
    t >= -EPS / len && t <= 1. + EPS / len
}

/// Boolean indication of whether segments `a0`-`a1` and `b0`-`b1` *properly* cross,
/// i.e. intersect at a single point interior to both.
fn segments_cross(a0: &Point, a1: &Point, b0: &Point, b1: &Point) -> bool {
    let d1 = (*a1 - *a0).cross(&(*b0 - *a0));
    let d2 = (*a1 - *a0).cross(&(*b1 - *a0));
    let d3 = (*b1 - *b0).cross(&(*a0 - *b0));
    let d4 = (*b1 - *b0).cross(&(*a1 - *b0));
    let tol = EPS * EPS;
    ((d1 > tol && d2 < -tol) || (d1 < -tol && d2 > tol))
        && ((d3 > tol && d4 < -tol) || (d3 < -tol && d4 > tol))
}

/// Signed area of closed ring `ring`. Positive for counter-clockwise rings.
pub fn ring_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    let mut acc = 0.0;
    for k in 0..n {
        acc += ring[k].cross(&ring[(k + 1) % n]);
    }
    acc / 2.
}

/// Boolean indication of whether rings `a` and `b` have any proper edge crossings
fn rings_cross(a: &[Point], b: &[Point]) -> bool {
    let (na, nb) = (a.len(), b.len());
    for i in 0..na {
        for j in 0..nb {
            if segments_cross(&a[i], &a[(i + 1) % na], &b[j], &b[(j + 1) % nb]) {
                return true;
            }
        }
    }
    false
}

/// # Polygon
///
/// Closed n-sided polygon with arbitrary number of vertices, and optional holes.
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct Polygon {
    /// Exterior ring
    pub points: Vec<Point>,
    /// Interior rings, i.e. holes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point>>,
}
impl Polygon {
    /// Create a new hole-less [Polygon]
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            holes: Vec::new(),
        }
    }
    /// Create a new [Polygon] from (x,y) tuples
    pub fn from_tuples(pts: &[(f64, f64)]) -> Self {
        Self::new(pts.iter().map(|p| Point::from(*p)).collect())
    }
    /// Area, net of any holes
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| ring_area(h).abs()).sum();
        ring_area(&self.points).abs() - holes
    }
    /// Boolean indication of whether the polygon contains [Point] `pt`.
    /// Containment is *inclusive*: points on the boundary are regarded as inside.
    pub fn contains(&self, pt: &Point) -> bool {
        if !self.points.bbox().contains(pt) {
            return false;
        }
        if locate(&self.points, pt) == Location::Outside {
            return false;
        }
        // Inside the exterior. Reject anything strictly inside a hole.
        !self
            .holes
            .iter()
            .any(|h| locate(h, pt) == Location::Inside)
    }
    /// Boolean indication of whether [Polygon] `inner` lies entirely within us.
    /// Touching boundaries count as contained.
    pub fn encloses(&self, inner: &Polygon) -> bool {
        if inner.points.is_empty() {
            return false;
        }
        // Every vertex of `inner` must be inside or on our boundary
        if !inner.points.iter().all(|p| self.contains(p)) {
            return false;
        }
        // None of our edges may cut through `inner`
        if rings_cross(&self.points, &inner.points) {
            return false;
        }
        // None of our (concave) vertices may poke into `inner`
        if self
            .points
            .iter()
            .any(|p| locate(&inner.points, p) == Location::Inside)
        {
            return false;
        }
        // And no hole may overlap `inner`
        for hole in self.holes.iter() {
            if rings_cross(hole, &inner.points)
                || hole
                    .iter()
                    .any(|p| locate(&inner.points, p) == Location::Inside)
            {
                return false;
            }
        }
        true
    }
    /// Create a copy with every vertex snapped to `grid`
    pub fn snap(&self, grid: f64) -> Polygon {
        let snap_ring = |r: &Vec<Point>| r.iter().map(|p| p.snap(grid)).collect::<Vec<_>>();
        Polygon {
            points: snap_ring(&self.points),
            holes: self.holes.iter().map(snap_ring).collect(),
        }
    }
    /// Create a canonical copy:
    /// * Consecutive duplicate and collinear vertices removed
    /// * Exterior counter-clockwise, holes clockwise
    /// * Each ring starting at its lowest-leftmost vertex
    /// * Holes sorted by their starting vertex
    ///
    /// Returns [None] if the exterior collapses to zero area.
    pub fn normalized(&self) -> Option<Polygon> {
        let points = canonical_ring(&self.points, true)?;
        let mut holes: Vec<Vec<Point>> = self
            .holes
            .iter()
            .filter_map(|h| canonical_ring(h, false))
            .collect();
        holes.sort_by(|a, b| cmp_points(&a[0], &b[0]));
        Some(Polygon { points, holes })
    }
    /// Fracture any holes into the exterior ring via zero-width "keyhole" cuts,
    /// producing a single hole-less ring as required by stream formats.
    pub fn keyholed(&self) -> Polygon {
        if self.holes.is_empty() {
            return self.clone();
        }
        let mut ring = self.points.clone();
        if ring_area(&ring) < 0.0 {
            ring.reverse();
        }
        // Process holes from right to left, so each bridge runs to the (already merged) ring
        let mut holes = self.holes.clone();
        holes.sort_by(|a, b| {
            let ax = a.iter().map(|p| p.x).fold(f64::MIN, f64::max);
            let bx = b.iter().map(|p| p.x).fold(f64::MIN, f64::max);
            bx.total_cmp(&ax)
        });
        for mut hole in holes.into_iter() {
            if hole.len() < 3 {
                continue;
            }
            if ring_area(&hole) > 0.0 {
                hole.reverse();
            }
            ring = bridge_hole(&ring, &hole);
        }
        Polygon::new(ring)
    }
}

/// Total ordering of points, lowest-y first, then lowest-x
fn cmp_points(a: &Point, b: &Point) -> std::cmp::Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

/// Clean up a ring: drop duplicate and collinear vertices, orient, and rotate to a canonical start.
fn canonical_ring(ring: &[Point], ccw: bool) -> Option<Vec<Point>> {
    let mut pts: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring.iter() {
        if pts.last().map_or(true, |q| !q.approx_eq(p, EPS)) {
            pts.push(*p);
        }
    }
    while pts.len() > 1 && pts[0].approx_eq(&pts[pts.len() - 1], EPS) {
        pts.pop();
    }
    // Repeatedly strip collinear vertices, until none remain
    loop {
        let n = pts.len();
        if n < 3 {
            return None;
        }
        let keep: Vec<bool> = (0..n)
            .map(|k| {
                let prev = pts[(k + n - 1) % n];
                let next = pts[(k + 1) % n];
                let (d1, d2) = (pts[k] - prev, next - pts[k]);
                let scale = d1.norm() * d2.norm();
                (d1.cross(&d2)).abs() > EPS * scale.max(EPS)
            })
            .collect();
        if keep.iter().all(|k| *k) {
            break;
        }
        pts = pts
            .iter()
            .zip(keep.iter())
            .filter(|(_, k)| **k)
            .map(|(p, _)| *p)
            .collect();
    }
    let area = ring_area(&pts);
    if area.abs() <= EPS {
        return None;
    }
    if (area > 0.0) != ccw {
        pts.reverse();
    }
    let start = (0..pts.len())
        .min_by(|a, b| cmp_points(&pts[*a], &pts[*b]))
        .unwrap_or(0);
    pts.rotate_left(start);
    Some(pts)
}

/// Merge `hole` into `ring` with a horizontal bridge from the hole's rightmost vertex.
fn bridge_hole(ring: &[Point], hole: &[Point]) -> Vec<Point> {
    // Rightmost hole vertex
    let hk = (0..hole.len())
        .max_by(|a, b| hole[*a].x.total_cmp(&hole[*b].x))
        .unwrap_or(0);
    let hp = hole[hk];
    // Nearest ring edge hit by a ray cast to the right of `hp`
    let n = ring.len();
    let mut best: Option<(f64, usize, Point)> = None;
    for k in 0..n {
        let (a, b) = (ring[k], ring[(k + 1) % n]);
        if (a.y - hp.y) * (b.y - hp.y) > 0.0 || a.y == b.y {
            continue;
        }
        let t = (hp.y - a.y) / (b.y - a.y);
        let x = a.x + t * (b.x - a.x);
        if x < hp.x {
            continue;
        }
        if best.map_or(true, |(bx, _, _)| x < bx) {
            best = Some((x, k, Point::new(x, hp.y)));
        }
    }
    let (k, hit) = match best {
        Some((_, k, hit)) => (k, hit),
        // No edge found to the right, which only happens for degenerate input.
        // Leave the hole out rather than emit a self-crossing ring.
        None => return ring.to_vec(),
    };
    let mut out = Vec::with_capacity(ring.len() + hole.len() + 3);
    out.extend_from_slice(&ring[..=k]);
    out.push(hit);
    for j in 0..=hole.len() {
        out.push(hole[(hk + j) % hole.len()]);
    }
    out.push(hit);
    out.extend_from_slice(&ring[k + 1..]);
    out
}

/// # Matrix-Vector Transformation
///
/// 2x2 rotation/reflection matrix and two-entry translation vector,
/// used for relative movement of [Point]s, [Polygon]s, and instances.
///
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Rotation / Transformation Matrix, in row-major order
    pub a: [[f64; 2]; 2],
    /// X-Y Translation
    pub b: [f64; 2],
}
impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
impl Transform {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }
    /// Translation by (x,y)
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x, y],
        }
    }
    /// Counter-clockwise rotation by `angle` degrees, about the origin
    pub fn rotate(angle: f64) -> Self {
        let (sin, cos) = exact_sin_cos(angle);
        Self {
            a: [[cos, -sin], [sin, cos]],
            b: [0., 0.],
        }
    }
    /// Counter-clockwise rotation by `angle` degrees, about `center`
    pub fn rotate_about(angle: f64, center: &Point) -> Self {
        let to = Self::translate(center.x, center.y);
        let from = Self::translate(-center.x, -center.y);
        Self::cascade(&to, &Self::cascade(&Self::rotate(angle), &from))
    }
    /// Reflection about the x-axis
    pub fn reflect_vert() -> Self {
        Self {
            a: [[1., 0.], [0., -1.]],
            b: [0., 0.],
        }
    }
    /// Reflection across the line through `p1` and `p2`
    pub fn mirror_line(p1: &Point, p2: &Point) -> Self {
        let angle = (*p2 - *p1).angle();
        let to_axis = Self::cascade(&Self::rotate(-angle), &Self::translate(-p1.x, -p1.y));
        let back = Self::cascade(&Self::translate(p1.x, p1.y), &Self::rotate(angle));
        Self::cascade(&back, &Self::cascade(&Self::reflect_vert(), &to_axis))
    }
    /// Create a transform from instance fields.
    /// Reflection about the x-axis is applied first, then counter-clockwise rotation, then translation to `loc`.
    pub fn from_instance(loc: &Point, reflect_vert: bool, angle: f64) -> Self {
        let rot = Self::rotate(angle);
        let local = if reflect_vert {
            Self::cascade(&rot, &Self::reflect_vert())
        } else {
            rot
        };
        Self::cascade(&Self::translate(loc.x, loc.y), &local)
    }
    /// Decompose into instance fields: (location, reflection, rotation-angle in [0, 360))
    pub fn to_instance(&self) -> (Point, bool, f64) {
        let loc = Point::new(self.b[0], self.b[1]);
        let reflect = self.det() < 0.0;
        let angle = tidy_degrees(self.a[1][0].atan2(self.a[0][0]).to_degrees());
        (loc, reflect, angle)
    }
    /// Matrix determinant. Negative for reflecting transforms.
    pub fn det(&self) -> f64 {
        self.a[0][0] * self.a[1][1] - self.a[0][1] * self.a[1][0]
    }
    /// Transform a direction, given in degrees, returning the new direction in [0, 360)
    pub fn apply_angle(&self, angle: f64) -> f64 {
        let (sin, cos) = exact_sin_cos(angle);
        let x = self.a[0][0] * cos + self.a[0][1] * sin;
        let y = self.a[1][0] * cos + self.a[1][1] * sin;
        tidy_degrees(y.atan2(x).to_degrees())
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    /// Note this operation *is not* commutative:
    /// `child` is applied first, then `parent`.
    ///
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }
}
/// Sine and cosine of `angle` degrees, exact at multiples of 90
pub(crate) fn exact_sin_cos(angle: f64) -> (f64, f64) {
    let quarter = angle / 90.0;
    if quarter == quarter.round() {
        match (quarter.round() as i64).rem_euclid(4) {
            0 => (0., 1.),
            1 => (1., 0.),
            2 => (0., -1.),
            _ => (-1., 0.),
        }
    } else {
        let rad = angle.to_radians();
        (rad.sin(), rad.cos())
    }
}
/// Multiply 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}
/// Multiply a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector
fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}

pub trait TransformTrait {
    /// Apply matrix-vector [Transform] `trans`.
    /// Creates a new object at a location equal to the transformation of our own.
    fn transform(&self, trans: &Transform) -> Self;
}
impl TransformTrait for Point {
    fn transform(&self, trans: &Transform) -> Self {
        Point::transform(self, trans)
    }
}
impl TransformTrait for Polygon {
    fn transform(&self, trans: &Transform) -> Self {
        let ring = |r: &Vec<Point>| r.iter().map(|p| p.transform(trans)).collect::<Vec<_>>();
        let mut points = ring(&self.points);
        let mut holes: Vec<Vec<Point>> = self.holes.iter().map(ring).collect();
        // Reflections flip ring orientation. Flip it back.
        if trans.det() < 0.0 {
            points.reverse();
            holes.iter_mut().for_each(|h| h.reverse());
        }
        Polygon { points, holes }
    }
}
impl TransformTrait for Rect {
    fn transform(&self, trans: &Transform) -> Self {
        Rect::new(self.p0.transform(trans), self.p1.transform(trans))
    }
}

impl BoundBoxTrait for Polygon {
    fn bbox(&self) -> BoundBox {
        self.points.bbox()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn transform_rotate() {
        let p = Point::new(1., 0.);
        let trans = Transform::rotate(90.);
        assert_eq!(p.transform(&trans), Point::new(0., 1.));
        let p2 = p.transform(&Transform::cascade(&trans, &trans));
        assert_eq!(p2, Point::new(-1., 0.));
    }
    #[test]
    fn test_cascade() {
        let trans1 = Transform::reflect_vert();
        let trans2 = Transform::translate(1., 1.);

        let p = Point::new(1., 1.);
        let pc1 = p.transform(&Transform::cascade(&trans1, &trans2));
        assert_eq!(pc1, Point::new(2., -2.));

        let pc2 = p.transform(&Transform::cascade(&trans2, &trans1));
        assert_eq!(pc2, Point::new(2., 0.));
    }
    #[test]
    fn instance_round_trip() {
        let loc = Point::new(3., -4.);
        let t = Transform::from_instance(&loc, true, 30.);
        let (loc2, reflect, angle) = t.to_instance();
        assert!(loc2.approx_eq(&loc, 1e-12));
        assert!(reflect);
        assert!((angle - 30.).abs() < 1e-9);
        // Reflect first, then rotate
        let p = Point::new(1., 0.).transform(&Transform::from_instance(&Point::default(), true, 90.));
        assert!(p.approx_eq(&Point::new(0., 1.), 1e-12));
        let p = Point::new(0., 1.).transform(&Transform::from_instance(&Point::default(), true, 90.));
        assert!(p.approx_eq(&Point::new(1., 0.), 1e-12));
    }
    #[test]
    fn mirror_line() {
        // Mirror across the line y = x
        let t = Transform::mirror_line(&Point::new(0., 0.), &Point::new(1., 1.));
        let p = Point::new(2., 0.).transform(&t);
        assert!(p.approx_eq(&Point::new(0., 2.), 1e-12));
        assert!((t.apply_angle(0.) - 90.).abs() < 1e-9);
    }
    #[test]
    fn test_polygon_contains() {
        // Create a right triangle at the origin
        let triangle = Polygon::from_tuples(&[(0., 0.), (2., 0.), (0., 2.)]);
        assert!(triangle.contains(&Point::new(0., 0.)));
        assert!(triangle.contains(&Point::new(1., 0.)));
        assert!(triangle.contains(&Point::new(1., 1.)));
        assert!(triangle.contains(&Point::new(0.5, 0.5)));
        assert!(!triangle.contains(&Point::new(2., 2.)));

        // A U-shaped polygon, inside a 10x10 square
        let u = Polygon::from_tuples(&[
            (0., 0.),
            (0., 10.),
            (2., 10.),
            (2., 2.),
            (8., 2.),
            (8., 10.),
            (10., 10.),
            (10., 0.),
        ]);
        for pt in &u.points {
            assert!(u.contains(pt));
        }
        assert!(u.contains(&Point::new(1., 9.)));
        assert!(u.contains(&Point::new(9., 1.)));
        assert!(!u.contains(&Point::new(3., 3.)));
        assert!(!u.contains(&Point::new(7., 9.)));

        // A square with a square hole
        let mut donut = Rect::new(Point::new(0., 0.), Point::new(10., 10.)).to_poly();
        donut.holes.push(
            Rect::new(Point::new(4., 4.), Point::new(6., 6.))
                .to_poly()
                .points,
        );
        assert!(donut.contains(&Point::new(1., 1.)));
        assert!(donut.contains(&Point::new(4., 5.)));
        assert!(!donut.contains(&Point::new(5., 5.)));
        assert!((donut.area() - 96.).abs() < 1e-12);
    }
    #[test]
    fn test_polygon_encloses() {
        let u = Polygon::from_tuples(&[
            (0., 0.),
            (0., 10.),
            (2., 10.),
            (2., 2.),
            (8., 2.),
            (8., 10.),
            (10., 10.),
            (10., 0.),
        ]);
        let inside = Rect::new(Point::new(0.5, 0.5), Point::new(1.5, 1.5)).to_poly();
        assert!(u.encloses(&inside));
        // Touching the boundary is fine
        let touching = Rect::new(Point::new(0., 0.), Point::new(1., 1.)).to_poly();
        assert!(u.encloses(&touching));
        // Spanning the notch is not, even though all four corners are inside
        let bridge = Rect::new(Point::new(1., 0.5), Point::new(9., 9.)).to_poly();
        assert!(!u.encloses(&bridge));
    }
    #[test]
    fn normalize_polygon() {
        // Clockwise, with a duplicate and a collinear vertex
        let p = Polygon::from_tuples(&[
            (0., 10.),
            (10., 10.),
            (10., 5.),
            (10., 0.),
            (10., 0.),
            (0., 0.),
        ]);
        let n = p.normalized().unwrap();
        assert_eq!(
            n.points,
            vec![
                Point::new(0., 0.),
                Point::new(10., 0.),
                Point::new(10., 10.),
                Point::new(0., 10.),
            ]
        );
        // Degenerate slivers vanish
        let sliver = Polygon::from_tuples(&[(0., 0.), (1., 0.), (2., 0.)]);
        assert!(sliver.normalized().is_none());
    }
    #[test]
    fn keyhole() {
        let mut donut = Rect::new(Point::new(0., 0.), Point::new(10., 10.)).to_poly();
        donut.holes.push(
            Rect::new(Point::new(4., 4.), Point::new(6., 6.))
                .to_poly()
                .points,
        );
        let k = donut.keyholed();
        assert!(k.holes.is_empty());
        assert!((ring_area(&k.points) - 96.).abs() < 1e-9);
        assert!(!k.contains(&Point::new(5., 5.)));
        assert!(k.contains(&Point::new(1., 1.)));
    }
    #[test]
    fn snapping() {
        assert_eq!(snap_to_grid(1.0004, 0.001), 1.0);
        assert!((snap_to_grid(1.0006, 0.001) - 1.001).abs() < 1e-12);
        assert_eq!(snap_to_grid(-0.0001, 0.001), 0.0);
        assert!(Point::new(0.123, 4.5).is_on_grid(0.001, 1e-9));
        assert!(!Point::new(0.1234, 4.5).is_on_grid(0.001, 1e-9));
        assert_eq!(normalize_angle(-90.), 270.);
        assert_eq!(normalize_angle(360.), 0.);
    }
}

//!
//! # Polygon Boolean and Offset Operations
//!
//! Union, difference, intersection, and miter-joined offsets,
//! performed by conversion to and from [geo] polygons.
//! Results are returned normalized (see [Polygon::normalized]),
//! with degenerate slivers dropped.
//!

// Crates.io
use geo::algorithm::buffer::{Buffer, BufferStyle, LineJoin};
use geo::{BooleanOps, Coord, LineString, MultiPolygon};

// Local imports
use crate::{
    data::{Component, LayerSpec},
    geom::{Point, Polygon},
};

/// Sharpest corner angle, in radians, which offsets still miter.
/// [LineJoin::Miter] takes this minimum angle rather than a length ratio.
/// Corners sharper than it are clipped; right angles and everything blunter keep a full miter.
pub const MITER_MIN_ANGLE: f64 = 0.1;

/// Convert a ring of [Point]s to a closed [LineString]
fn to_linestring(ring: &[Point]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    if let Some(first) = coords.first().cloned() {
        if coords.last() != Some(&first) {
            coords.push(first);
        }
    }
    LineString::from(coords)
}
/// Convert a closed [LineString] to a ring of [Point]s, dropping the repeated closing point
fn from_linestring(ls: &LineString<f64>) -> Vec<Point> {
    let mut pts: Vec<Point> = ls.coords().map(|c| Point::new(c.x, c.y)).collect();
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    pts
}
/// Convert a [Polygon] to a [geo::Polygon]
pub fn to_geo(poly: &Polygon) -> geo::Polygon<f64> {
    geo::Polygon::new(
        to_linestring(&poly.points),
        poly.holes.iter().map(|h| to_linestring(h)).collect(),
    )
}
/// Convert a [geo::Polygon] to a [Polygon]
pub fn from_geo(poly: &geo::Polygon<f64>) -> Polygon {
    Polygon {
        points: from_linestring(poly.exterior()),
        holes: poly.interiors().iter().map(from_linestring).collect(),
    }
}
/// Convert a slice of [Polygon]s to a [MultiPolygon]
pub fn to_multi(polys: &[Polygon]) -> MultiPolygon<f64> {
    MultiPolygon::new(
        polys
            .iter()
            .filter(|p| p.points.len() >= 3)
            .map(to_geo)
            .collect(),
    )
}
/// Convert a [MultiPolygon] to normalized [Polygon]s
pub fn from_multi(multi: &MultiPolygon<f64>) -> Vec<Polygon> {
    let mut polys: Vec<Polygon> = multi
        .iter()
        .map(from_geo)
        .filter_map(|p| p.normalized())
        .collect();
    sort_polygons(&mut polys);
    polys
}
/// Sort polygons into a canonical order, by their first vertex
pub fn sort_polygons(polys: &mut [Polygon]) {
    polys.sort_by(|a, b| {
        let (pa, pb) = (a.points.first(), b.points.first());
        match (pa, pb) {
            (Some(pa), Some(pb)) => pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x)),
            _ => a.points.len().cmp(&b.points.len()),
        }
    });
}

/// Union (boolean OR) of all polygons in `polys`
pub fn union(polys: &[Polygon]) -> Vec<Polygon> {
    let mut result: Option<MultiPolygon<f64>> = None;
    for poly in polys.iter().filter(|p| p.points.len() >= 3) {
        let multi: MultiPolygon<f64> = to_geo(poly).into();
        result = Some(match result {
            Some(existing) => existing.union(&multi),
            None => multi,
        });
    }
    match result {
        // Union the first polygon with nothing, to normalize self-overlaps
        Some(multi) => from_multi(&multi.union(&MultiPolygon::new(vec![]))),
        None => Vec::new(),
    }
}
/// Difference (boolean NOT): `a` minus `b`
pub fn difference(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if b.is_empty() {
        return union(a);
    }
    from_multi(&to_multi(a).difference(&to_multi(b)))
}
/// Intersection (boolean AND) of `a` and `b`
pub fn intersection(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    from_multi(&to_multi(a).intersection(&to_multi(b)))
}
/// Offset a single polygon by `distance`, with mitred joins.
/// Positive distances grow, negative distances shrink.
/// Shrinking may split a polygon into several, or eliminate it entirely.
pub fn offset(poly: &Polygon, distance: f64) -> Vec<Polygon> {
    if poly.points.len() < 3 {
        return Vec::new();
    }
    if distance == 0.0 {
        return poly.normalized().into_iter().collect();
    }
    let style = BufferStyle::new(distance).line_join(LineJoin::Miter(MITER_MIN_ANGLE));
    from_multi(&to_geo(poly).buffer_with_style(style))
}
/// Offset each of `polys` by `distance`, independently. Results may overlap.
pub fn offset_all(polys: &[Polygon], distance: f64) -> Vec<Polygon> {
    polys.iter().flat_map(|p| offset(p, distance)).collect()
}

/// Replace the polygons on `layer` of `comp` with their union
pub fn merge_layer(comp: &mut Component, layer: LayerSpec) {
    if let Some(polys) = comp.elems.get_mut(&layer) {
        *polys = union(polys);
    }
}
/// Offset every polygon on `layer` by `distance`, then merge the results
pub fn offset_layer(comp: &mut Component, layer: LayerSpec, distance: f64) {
    if let Some(polys) = comp.elems.get_mut(&layer) {
        *polys = offset_all(polys, distance);
    }
    merge_layer(comp, layer);
}

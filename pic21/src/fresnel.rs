//!
//! # Fresnel Integrals
//!
//! Samples of the Euler (Cornu) spiral with unit curvature rate,
//! i.e. the curve whose curvature at arc length `s` equals `s`:
//!
//! ```text
//! x(s) = ∫₀ˢ cos(t²/2) dt
//! y(s) = ∫₀ˢ sin(t²/2) dt
//! ```
//!
//! Both are evaluated by their power series, which converge quickly over the
//! arc lengths partial-Euler bends use (`s ≤ √(2π)`).
//!

use crate::raw::Point;

/// Maximum number of series terms
const MAX_TERMS: usize = 64;
/// Relative size at which further terms are dropped
const TERM_TOL: f64 = 1e-17;

/// Evaluate the spiral at arc length `s`
pub fn fresnel(s: f64) -> Point {
    let s4 = s.powi(4);
    // Running terms (-1)ⁿ s⁴ⁿ / (2²ⁿ (2n)!) and (-1)ⁿ s⁴ⁿ⁺² / (2²ⁿ⁺¹ (2n+1)!)
    let mut c = 1.0;
    let mut d = s * s / 2.0;
    let (mut x, mut y) = (0.0, 0.0);
    for n in 0..MAX_TERMS {
        let nf = n as f64;
        let dx = c / (4. * nf + 1.);
        let dy = d / (4. * nf + 3.);
        x += dx;
        y += dy;
        if dx.abs() <= TERM_TOL * x.abs() && dy.abs() <= TERM_TOL * y.abs().max(TERM_TOL) {
            break;
        }
        c *= -s4 / (4. * (2. * nf + 1.) * (2. * nf + 2.));
        d *= -s4 / (4. * (2. * nf + 2.) * (2. * nf + 3.));
    }
    Point::new(s * x, s * y)
}

/// Sample the spiral at `npoints` evenly spaced arc lengths over `[0, s_end]`
pub fn sample(s_end: f64, npoints: usize) -> Vec<Point> {
    match npoints {
        0 => vec![],
        1 => vec![Point::new(0., 0.)],
        _ => (0..npoints)
            .map(|k| fresnel(s_end * k as f64 / (npoints - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn small_arguments() {
        let p = fresnel(0.0);
        assert_eq!(p, Point::new(0., 0.));
        // Leading terms: x ≈ s - s⁵/40, y ≈ s³/6
        let s = 0.01;
        let p = fresnel(s);
        assert_abs_diff_eq!(p.x, s - s.powi(5) / 40., epsilon = 1e-15);
        assert_abs_diff_eq!(p.y, s.powi(3) / 6., epsilon = 1e-15);
    }
    #[test]
    fn derivative_is_unit_tangent() {
        // dx/ds = cos(s²/2), dy/ds = sin(s²/2)
        let h = 1e-5;
        for s in [0.3, 1.0, 1.7, 2.5] {
            let (a, b) = (fresnel(s - h), fresnel(s + h));
            assert_abs_diff_eq!((b.x - a.x) / (2. * h), (s * s / 2.).cos(), epsilon = 1e-6);
            assert_abs_diff_eq!((b.y - a.y) / (2. * h), (s * s / 2.).sin(), epsilon = 1e-6);
        }
    }
    #[test]
    fn known_values() {
        // Standard Fresnel integrals C(1) and S(1), related by s = t·√π
        let t = std::f64::consts::PI.sqrt();
        let p = fresnel(t);
        assert_abs_diff_eq!(p.x / t, 0.779_893_400_376_823, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y / t, 0.438_259_147_390_355, epsilon = 1e-12);
    }
    #[test]
    fn sampling() {
        let pts = sample(1.0, 11);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], Point::new(0., 0.));
        assert_eq!(pts[10], fresnel(1.0));
        assert!(sample(1.0, 0).is_empty());
    }
}

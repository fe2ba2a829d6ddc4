//! Tolerance tests and vector helpers shared by the solvers and the pipeline

use glam::DVec3;

use crate::defaults::MIN_VECTOR_LENGTH;
use crate::log::warn;
use crate::types::{Bearing, Rotation, Side};

/// Component-wise closeness of two fixed-size numeric arrays.
///
/// Scalars are compared as one-element arrays.
pub fn within_tolerance<const N: usize>(a: [f64; N], b: [f64; N], eps: f64) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() <= eps)
}

#[inline]
pub fn close(a: f64, b: f64, eps: f64) -> bool {
    within_tolerance([a], [b], eps)
}

#[inline]
pub fn points_close(a: DVec3, b: DVec3, eps: f64) -> bool {
    within_tolerance(a.to_array(), b.to_array(), eps)
}

/// Rotation carrying `entering` onto `exiting`: the sign of the z component
/// of their cross product. `None` for collinear or zero vectors.
pub fn rotation_of(entering: DVec3, exiting: DVec3) -> Option<Rotation> {
    if entering.length() < MIN_VECTOR_LENGTH || exiting.length() < MIN_VECTOR_LENGTH {
        return None;
    }
    Rotation::from_sign(DVec3::Z.dot(entering.cross(exiting)))
}

/// Vector of `length` along `bearing`.
#[inline]
pub fn along(bearing: Bearing, length: f64) -> DVec3 {
    bearing.unit() * length
}

/// Unit vector perpendicular to the direction of travel, toward `side`.
#[inline]
pub fn orthogonal(bearing: Bearing, side: Side) -> DVec3 {
    bearing.rotate(side.angle()).unit()
}

/// Values the solvers can compare against a computed counterpart.
pub trait Tolerant: Copy + std::fmt::Debug {
    fn discrepancy(self, other: Self) -> f64;
}

impl Tolerant for f64 {
    fn discrepancy(self, other: Self) -> f64 {
        (self - other).abs()
    }
}

impl Tolerant for DVec3 {
    fn discrepancy(self, other: Self) -> f64 {
        self.distance(other)
    }
}

impl Tolerant for Bearing {
    fn discrepancy(self, other: Self) -> f64 {
        self.turn_to(other).abs()
    }
}

impl Tolerant for Rotation {
    fn discrepancy(self, other: Self) -> f64 {
        if self == other { 0.0 } else { 2.0 }
    }
}

/// Choose between a caller-supplied value and a computed one.
///
/// The supplied value is kept when it lies within `eps` of the computed value;
/// otherwise the computed value wins and the discrepancy is logged.
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn reconcile<T: Tolerant>(
    name: &'static str,
    supplied: Option<T>,
    computed: Option<T>,
    eps: f64,
) -> Option<T> {
    match (supplied, computed) {
        (Some(s), Some(c)) => {
            let discrepancy = s.discrepancy(c);
            if discrepancy <= eps {
                Some(s)
            } else {
                warn!(
                    field = name,
                    supplied = ?s,
                    computed = ?c,
                    discrepancy,
                    "supplied value replaced by computed value"
                );
                Some(c)
            }
        }
        (Some(s), None) => Some(s),
        (None, c) => c,
    }
}

/// [`reconcile`] against a value that is always computable.
pub fn settle<T: Tolerant>(name: &'static str, supplied: Option<T>, computed: T, eps: f64) -> T {
    reconcile(name, supplied, Some(computed), eps).unwrap_or(computed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_tolerance_scalar_and_vector() {
        assert!(close(1.0, 1.00005, 1e-4));
        assert!(!close(1.0, 1.001, 1e-4));
        assert!(within_tolerance([1.0, 2.0, 3.0], [1.0, 2.00001, 3.0], 1e-4));
        assert!(!within_tolerance([1.0, 2.0], [1.0, 2.1], 1e-4));
    }

    #[test]
    fn rotation_of_right_turn_is_clockwise() {
        let north = DVec3::Y;
        let east = DVec3::X;
        assert_eq!(rotation_of(north, east), Some(Rotation::Clockwise));
        assert_eq!(rotation_of(east, north), Some(Rotation::CounterClockwise));
        assert_eq!(rotation_of(north, north * 3.0), None);
        assert_eq!(rotation_of(DVec3::ZERO, east), None);
    }

    #[test]
    fn orthogonal_sides() {
        let left = orthogonal(Bearing::NORTH, Side::Left);
        let right = orthogonal(Bearing::NORTH, Side::Right);
        assert!(points_close(left, -DVec3::X, 1e-12));
        assert!(points_close(right, DVec3::X, 1e-12));
    }

    #[test]
    fn reconcile_keeps_close_supplied_values() {
        assert_eq!(reconcile("radius", Some(100.00001), Some(100.0), 1e-4), Some(100.00001));
        assert_eq!(reconcile("radius", Some(120.0), Some(100.0), 1e-4), Some(100.0));
        assert_eq!(reconcile("radius", Some(120.0), None, 1e-4), Some(120.0));
        assert_eq!(reconcile::<f64>("radius", None, None, 1e-4), None);
        assert_eq!(settle("length", None, 7.0, 1e-4), 7.0);
    }

    #[test]
    fn reconcile_bearings_wrap() {
        let supplied = Bearing::new(-1e-6);
        let kept = reconcile("bearing", Some(supplied), Some(Bearing::NORTH), 1e-4);
        assert_eq!(kept, Some(supplied));
    }
}

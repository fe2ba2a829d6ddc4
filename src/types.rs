//! Strongly-typed directional primitives for alignment geometry.
//!
//! Bearings are compass angles (clockwise from north, +y) kept normalized in
//! `[0, 2π)`. Rotation is the sense of a curve as seen from above.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use glam::DVec3;

use crate::defaults::MIN_VECTOR_LENGTH;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN, infinite, zero and negative values.
pub(crate) fn positive(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Compass direction in radians, clockwise from north.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Bearing(f64);

impl Bearing {
    pub const NORTH: Bearing = Bearing(0.0);
    pub const EAST: Bearing = Bearing(FRAC_PI_2);
    pub const SOUTH: Bearing = Bearing(PI);
    pub const WEST: Bearing = Bearing(PI + FRAC_PI_2);

    /// Create a bearing from any angle, wrapping into `[0, 2π)`.
    #[inline]
    pub fn new(radians: f64) -> Bearing {
        let wrapped = radians.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU { Bearing(0.0) } else { Bearing(wrapped) }
    }

    /// Create a bearing with validation (rejects NaN/infinite)
    pub fn try_new(radians: f64) -> Result<Bearing, NumericError> {
        if radians.is_nan() {
            Err(NumericError::NaN)
        } else if radians.is_infinite() {
            Err(NumericError::Infinite)
        } else {
            Ok(Bearing::new(radians))
        }
    }

    pub fn from_degrees(degrees: f64) -> Bearing {
        Bearing::new(degrees.to_radians())
    }

    /// Bearing of a planar vector; `None` when the vector has no length.
    pub fn of(v: DVec3) -> Option<Bearing> {
        if v.x.hypot(v.y) < MIN_VECTOR_LENGTH {
            None
        } else {
            Some(Bearing::new(v.x.atan2(v.y)))
        }
    }

    #[inline]
    pub fn radians(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0.to_degrees()
    }

    /// Unit vector pointing along this bearing.
    #[inline]
    pub fn unit(self) -> DVec3 {
        let (sin, cos) = self.0.sin_cos();
        DVec3::new(sin, cos, 0.0)
    }

    /// Rotate by `angle` radians (positive is clockwise).
    #[inline]
    pub fn rotate(self, angle: f64) -> Bearing {
        Bearing::new(self.0 + angle)
    }

    #[inline]
    pub fn reverse(self) -> Bearing {
        self.rotate(PI)
    }

    /// Signed turn from `self` to `other` in `(-π, π]`, positive clockwise.
    pub fn turn_to(self, other: Bearing) -> f64 {
        let mut turn = (other.0 - self.0).rem_euclid(TAU);
        if turn > PI {
            turn -= TAU;
        }
        turn
    }

    /// Angular closeness that treats 0 and 2π as the same direction.
    #[inline]
    pub fn within(self, other: Bearing, eps: f64) -> bool {
        self.turn_to(other).abs() <= eps
    }
}

impl fmt::Display for Bearing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°", self.degrees())
    }
}

/// Sense of rotation of a curve, viewed from above.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    /// Cross-product sign convention: clockwise is -1.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Rotation::Clockwise => -1.0,
            Rotation::CounterClockwise => 1.0,
        }
    }

    /// Sign of the bearing change along the curve (clockwise bearings increase).
    #[inline]
    pub fn turn(self) -> f64 {
        -self.sign()
    }

    /// Rotation from a cross-product z component; `None` when collinear.
    pub fn from_sign(z: f64) -> Option<Rotation> {
        if z.abs() < MIN_VECTOR_LENGTH {
            None
        } else if z > 0.0 {
            Some(Rotation::CounterClockwise)
        } else {
            Some(Rotation::Clockwise)
        }
    }

    /// Rotation from a signed bearing change; `None` when there is no turn.
    pub fn from_turn(turn: f64) -> Option<Rotation> {
        Rotation::from_sign(-turn)
    }

    pub fn reverse(self) -> Rotation {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Clockwise => write!(f, "clockwise"),
            Rotation::CounterClockwise => write!(f, "counter-clockwise"),
        }
    }
}

/// Side of the route, relative to the direction of travel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Bearing offset from the direction of travel toward this side.
    #[inline]
    pub fn angle(self) -> f64 {
        match self {
            Side::Left => -FRAC_PI_2,
            Side::Right => FRAC_PI_2,
        }
    }
}

/// Continuous position range of a segment along the whole alignment.
///
/// Unlike nominal stations, internal stations never jump at station equations.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InternalStation {
    pub start: f64,
    pub end: f64,
}

impl InternalStation {
    pub fn new(start: f64, length: f64) -> Self {
        Self { start, end: start + length }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

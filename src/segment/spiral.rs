//! Euler spiral (clothoid) transition curves
//!
//! A spiral joins a straight (infinite radius) end to a circular end of radius
//! `R`. Curvature grows linearly with distance from the straight end, so the
//! tangent turns by `φ = s²/(2RL)` after a distance `s`, and by the spiral
//! angle `θ = L/(2R)` over the whole length. Positions use the truncated
//! series expansion of the Fresnel integrals.

use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DVec3};

use super::{Core, Element, SegmentInput, SegmentKind};
use crate::defaults::MIN_VECTOR_LENGTH;
use crate::errors::SolveError;
use crate::geometry::{along, reconcile, rotation_of, settle};
use crate::log::debug;
use crate::types::{Bearing, Rotation};

/// A fully defined spiral.
#[derive(Debug, Clone, PartialEq)]
pub struct Spiral {
    pub core: Core,
    /// Point of intersection of the end tangents
    pub pi: DVec3,
    /// `f64::INFINITY` when the spiral leaves a straight
    pub start_radius: f64,
    /// `f64::INFINITY` when the spiral enters a straight
    pub end_radius: f64,
    /// Spiral angle: total change of bearing
    pub theta: f64,
    pub direction: Rotation,
    pub tan_short: f64,
    pub tan_long: f64,
    /// Offset of the circular end along the straight-end tangent
    pub total_x: f64,
    /// Offset of the circular end toward the curve
    pub total_y: f64,
}

/// Series for the clothoid coordinates of a unit-length spiral with angle `theta`:
/// `(x, y)` with `x` along the straight-end tangent.
pub fn unit_offsets(theta: f64) -> (f64, f64) {
    let t2 = theta * theta;
    let x = 1.0 - t2 / 10.0 + t2 * t2 / 216.0 - t2.powi(3) / 9360.0 + t2.powi(4) / 685_440.0;
    let y = theta * (1.0 / 3.0 - t2 / 42.0 + t2 * t2 / 1320.0 - t2.powi(3) / 75_600.0);
    (x, y)
}

/// Long and short tangent of a unit-length spiral with angle `theta`.
fn unit_tangents(theta: f64) -> (f64, f64) {
    let (x, y) = unit_offsets(theta);
    (x - y / theta.tan(), y / theta.sin())
}

impl Spiral {
    pub fn degenerate(input: &SegmentInput) -> Spiral {
        let core = input.placeholder_core();
        Spiral {
            pi: input.pi.unwrap_or(core.start),
            start_radius: f64::INFINITY,
            end_radius: 0.0,
            theta: 0.0,
            direction: input.direction.unwrap_or(Rotation::Clockwise),
            tan_short: 0.0,
            tan_long: 0.0,
            total_x: 0.0,
            total_y: 0.0,
            core,
        }
    }

    /// The finite radius.
    pub fn radius(&self) -> f64 {
        if self.start_radius.is_finite() {
            self.start_radius
        } else {
            self.end_radius
        }
    }

    /// True when the straight end is the start.
    pub fn is_entering(&self) -> bool {
        self.start_radius.is_infinite()
    }

    /// Origin, tangent and normal of the local clothoid frame at the straight end.
    fn frame(&self) -> (DVec3, DVec3, DVec3) {
        let turn = self.direction.turn();
        if self.is_entering() {
            let bearing = self.core.bearing_in;
            (self.core.start, bearing.unit(), bearing.rotate(turn * FRAC_PI_2).unit())
        } else {
            let bearing = self.core.bearing_out;
            (self.core.end, -bearing.unit(), bearing.rotate(turn * FRAC_PI_2).unit())
        }
    }

    /// Bearing change after `s` from the straight end.
    fn partial_angle(&self, s: f64) -> f64 {
        s * s / (2.0 * self.radius() * self.core.length)
    }

    fn from_straight_end(&self, distance: f64) -> f64 {
        if self.is_entering() {
            distance
        } else {
            self.core.length - distance
        }
    }
}

/// Start, PI and End all known: tangents, bearings and the spiral angle come
/// from the Gram matrix of the two tangent vectors.
struct Absolute {
    tan_in: f64,
    tan_out: f64,
    theta: f64,
    direction: Option<Rotation>,
    bearing_in: Option<Bearing>,
}

impl Absolute {
    fn new(input: &SegmentInput) -> Option<Absolute> {
        let (start, pi, end) = (input.start?, input.pi?, input.end?);
        let basis = DMat3::from_cols(pi - start, end - pi, DVec3::Z);
        let gram = basis.transpose() * basis;
        let tan_in = gram.x_axis.x.max(0.0).sqrt();
        let tan_out = gram.y_axis.y.max(0.0).sqrt();
        if tan_in < MIN_VECTOR_LENGTH || tan_out < MIN_VECTOR_LENGTH {
            return None;
        }
        let theta = (gram.y_axis.x / (tan_in * tan_out)).clamp(-1.0, 1.0).acos();
        Some(Absolute {
            tan_in,
            tan_out,
            theta,
            direction: rotation_of(basis.x_axis, basis.y_axis),
            bearing_in: Bearing::of(basis.x_axis),
        })
    }
}

/// Which end is straight: `Some(true)` for the start.
fn straight_start(input: &SegmentInput) -> Result<Option<bool>, SolveError> {
    match (input.start_radius, input.end_radius) {
        (Some(start), Some(end)) if start.is_infinite() == end.is_infinite() => {
            Err(SolveError::SpiralWithoutCurve)
        }
        (Some(start), _) => Ok(Some(start.is_infinite())),
        (None, Some(end)) => Ok(Some(!end.is_infinite())),
        (None, None) => Ok(None),
    }
}

/// Reconstruct a spiral from either its three points or its bearings, plus its
/// radius or length.
pub fn solve(input: &SegmentInput, tolerance: f64) -> Result<Spiral, SolveError> {
    let kind = SegmentKind::Spiral;
    let fail = |err: SolveError| {
        debug!(?input, %err, "spiral cannot be solved");
        err
    };

    let straight = straight_start(input).map_err(fail)?;
    let supplied_radius = input.radius.or_else(|| {
        input
            .start_radius
            .into_iter()
            .chain(input.end_radius)
            .find(|radius| radius.is_finite())
    });
    let absolute = Absolute::new(input);

    let from_bearings = match (input.bearing_in, input.bearing_out) {
        (Some(entering), Some(exiting)) => Some(entering.turn_to(exiting)),
        _ => None,
    };
    let theta = reconcile(
        "theta",
        input.theta,
        absolute
            .as_ref()
            .map(|a| a.theta)
            .or(from_bearings.map(f64::abs)),
        tolerance,
    )
    .ok_or_else(|| fail(SolveError::AngleUndetermined { kind }))?;
    if !(theta > 0.0 && theta <= FRAC_PI_2) {
        return Err(fail(SolveError::InvalidValue {
            kind,
            field: "theta",
            value: theta,
        }));
    }

    let direction = reconcile(
        "direction",
        input.direction,
        absolute
            .as_ref()
            .and_then(|a| a.direction)
            .or_else(|| from_bearings.and_then(Rotation::from_turn)),
        tolerance,
    )
    .ok_or_else(|| fail(SolveError::DirectionUndetermined { kind }))?;
    let turn = direction.turn();

    let bearing_in = reconcile(
        "bearing_in",
        input.bearing_in,
        absolute.as_ref().and_then(|a| a.bearing_in),
        tolerance,
    )
    .or_else(|| input.bearing_out.map(|b| b.rotate(-turn * theta)))
    .ok_or_else(|| fail(SolveError::Unoriented { kind }))?;
    let bearing_out = settle(
        "bearing_out",
        input.bearing_out,
        bearing_in.rotate(turn * theta),
        tolerance,
    );

    let entering = straight
        .or_else(|| absolute.as_ref().map(|a| a.tan_in >= a.tan_out))
        .unwrap_or(true);
    let (unit_long, unit_short) = unit_tangents(theta);

    let length = match supplied_radius {
        Some(radius) => Some(settle("length", input.length, 2.0 * radius * theta, tolerance)),
        None => input.length.or_else(|| {
            absolute.as_ref().map(|a| {
                let long = if entering { a.tan_in } else { a.tan_out };
                long / unit_long
            })
        }),
    }
    .ok_or_else(|| fail(SolveError::RadiusUndetermined { kind }))?;
    let radius = supplied_radius.unwrap_or(length / (2.0 * theta));
    for (field, value) in [("radius", radius), ("length", length)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(fail(SolveError::InvalidValue { kind, field, value }));
        }
    }

    let (unit_x, unit_y) = unit_offsets(theta);
    let (tan_long, tan_short) = (length * unit_long, length * unit_short);
    let (tan_in, tan_out) = if entering {
        (tan_long, tan_short)
    } else {
        (tan_short, tan_long)
    };

    let anchor = input
        .start
        .map(|start| start + along(bearing_in, tan_in))
        .or(input.pi)
        .or_else(|| input.end.map(|end| end - along(bearing_out, tan_out)))
        .ok_or_else(|| fail(SolveError::Unplaced { kind }))?;
    let pi = settle("pi", input.pi, anchor, tolerance);
    let start = settle("start", input.start, pi - along(bearing_in, tan_in), tolerance);
    let end = settle("end", input.end, pi + along(bearing_out, tan_out), tolerance);

    let (start_radius, end_radius) = if entering {
        (f64::INFINITY, radius)
    } else {
        (radius, f64::INFINITY)
    };

    Ok(Spiral {
        core: Core {
            start,
            end,
            bearing_in,
            bearing_out,
            length,
            start_station: input.start_station,
            ..Core::default()
        },
        pi,
        start_radius,
        end_radius,
        theta,
        direction,
        tan_short,
        tan_long,
        total_x: length * unit_x,
        total_y: length * unit_y,
    })
}

impl Element for Spiral {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Spiral
    }

    fn point_at(&self, distance: f64) -> DVec3 {
        if self.is_degenerate() {
            return self.core.start;
        }
        let s = self.from_straight_end(distance);
        let (x, y) = unit_offsets(self.partial_angle(s));
        let (origin, tangent, normal) = self.frame();
        origin + tangent * (s * x) + normal * (s * y)
    }

    fn bearing_at(&self, distance: f64) -> Bearing {
        if self.is_degenerate() {
            return self.core.bearing_in;
        }
        let turn = self.direction.turn();
        let s = self.from_straight_end(distance);
        if self.is_entering() {
            self.core.bearing_in.rotate(turn * self.partial_angle(s))
        } else {
            self.core.bearing_out.rotate(-turn * self.partial_angle(s))
        }
    }

    fn translate(&mut self, offset: DVec3) {
        self.core.translate(offset);
        self.pi += offset;
    }

    fn tolerance_step(&self, deviation: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        let radius = self.radius();
        let angle = 2.0 * (1.0 - deviation / radius).clamp(-1.0, 1.0).acos();
        Some(radius * angle.min(std::f64::consts::PI))
    }

    /// Series positions, shifted so the far end lands exactly on `end`.
    fn points_at(&self, distances: &[f64]) -> Vec<DVec3> {
        let drift = self.core.end - self.point_at(self.core.length);
        distances
            .iter()
            .map(|&d| {
                if d >= self.core.length {
                    self.core.end
                } else {
                    self.point_at(d) + drift
                }
            })
            .collect()
    }

    fn is_degenerate(&self) -> bool {
        !(self.radius() > 0.0 && self.core.length > 0.0)
    }
}

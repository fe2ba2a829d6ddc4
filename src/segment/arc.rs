//! Circular curves
//!
//! An arc is reconstructed from whatever subset of its points, lengths,
//! bearings and angles is known. The known points are turned into seven
//! vectors whose Gram matrix yields every magnitude and pairwise angle at once;
//! a fixed table maps those angles onto the central angle.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::DVec3;
use nalgebra::{SMatrix, Vector3};

use super::{Core, Element, SegmentInput, SegmentKind};
use crate::defaults::MIN_VECTOR_LENGTH;
use crate::errors::SolveError;
use crate::geometry::{along, close, reconcile, settle};
use crate::log::debug;
use crate::types::{Bearing, Rotation};

/// Columns are the seven reference vectors, rows are x/y/z.
type Basis = SMatrix<f64, 3, 7>;
type Gram = SMatrix<f64, 7, 7>;

/// Start − Center
const RS: usize = 0;
/// End − Center
const RE: usize = 1;
/// PI − Start
const TS: usize = 2;
/// End − PI
const TE: usize = 3;
/// PI − Center
const MO: usize = 4;
/// End − Start
const CH: usize = 5;
const UP: usize = 6;

/// Vector pairs whose angle θ fixes the central angle as `Δ = a·θ + b`.
/// Earlier rows are preferred.
const DELTA_TABLE: [(usize, usize, f64, f64); 10] = [
    (RS, RE, 1.0, 0.0),
    (TS, TE, 1.0, 0.0),
    (RS, MO, 2.0, 0.0),
    (RE, MO, 2.0, 0.0),
    (TS, CH, 2.0, 0.0),
    (TE, CH, 2.0, 0.0),
    (RS, CH, 2.0, -PI),
    (RE, CH, -2.0, PI),
    (TS, MO, -2.0, PI),
    (TE, MO, 2.0, -PI),
];

/// Ordered (entering, exiting) pairs that turn the same way as the curve.
const DIRECTION_PAIRS: [(usize, usize); 9] = [
    (RS, RE),
    (TS, TE),
    (RS, TS),
    (RE, TE),
    (TS, CH),
    (CH, TE),
    (RS, MO),
    (MO, RE),
    (RS, CH),
];

/// A fully defined circular curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Arc {
    pub core: Core,
    pub center: DVec3,
    /// Point of intersection of the two tangents
    pub pi: DVec3,
    pub radius: f64,
    /// Central angle in radians
    pub delta: f64,
    pub direction: Rotation,
    /// `R·tan(Δ/2)`; negative past a half turn, where the PI lies behind the start
    pub tangent: f64,
    pub chord: f64,
    pub external: f64,
    pub middle_ordinate: f64,
}

impl Arc {
    /// Placeholder kept in an alignment when the solve failed. Its radius is 0.
    pub fn degenerate(input: &SegmentInput) -> Arc {
        let core = input.placeholder_core();
        Arc {
            center: input.center.unwrap_or(core.start),
            pi: input.pi.unwrap_or(core.start),
            radius: 0.0,
            delta: input.delta.unwrap_or_default(),
            direction: input.direction.unwrap_or(Rotation::Clockwise),
            tangent: 0.0,
            chord: 0.0,
            external: 0.0,
            middle_ordinate: 0.0,
            core,
        }
    }

    /// Bearing of the radius vector from the center to the start point.
    pub fn radial_bearing(&self) -> Bearing {
        self.core.bearing_in.rotate(-self.direction.turn() * FRAC_PI_2)
    }
}

/// The seven reference vectors and their Gram matrix.
struct Vectors {
    columns: [DVec3; 7],
    gram: Gram,
}

impl Vectors {
    fn new(input: &SegmentInput) -> Self {
        let diff = |head: Option<DVec3>, tail: Option<DVec3>| match (head, tail) {
            (Some(head), Some(tail)) => head - tail,
            _ => DVec3::ZERO,
        };
        let columns = [
            diff(input.start, input.center),
            diff(input.end, input.center),
            diff(input.pi, input.start),
            diff(input.end, input.pi),
            diff(input.pi, input.center),
            diff(input.end, input.start),
            DVec3::Z,
        ];
        let basis = Basis::from_columns(&columns.map(|v| Vector3::new(v.x, v.y, v.z)));
        Self {
            columns,
            gram: basis.transpose() * basis,
        }
    }

    fn magnitude(&self, i: usize) -> Option<f64> {
        let magnitude = self.gram[(i, i)].max(0.0).sqrt();
        (magnitude >= MIN_VECTOR_LENGTH).then_some(magnitude)
    }

    fn angle(&self, i: usize, j: usize) -> Option<f64> {
        let denom = self.magnitude(i)? * self.magnitude(j)?;
        Some((self.gram[(i, j)] / denom).clamp(-1.0, 1.0).acos())
    }

    fn bearing(&self, i: usize) -> Option<Bearing> {
        self.magnitude(i)?;
        Bearing::of(self.columns[i])
    }

    fn delta(&self) -> Option<f64> {
        DELTA_TABLE
            .iter()
            .find_map(|&(i, j, a, b)| self.angle(i, j).map(|theta| a * theta + b))
    }

    fn rotation(&self) -> Option<Rotation> {
        DIRECTION_PAIRS.iter().find_map(|&(i, j)| {
            self.magnitude(i)?;
            self.magnitude(j)?;
            let (a, b) = (self.columns[i], self.columns[j]);
            Rotation::from_sign(self.columns[UP].dot(a.cross(b)))
        })
    }

    /// Entering bearing from the first vector whose direction is known.
    ///
    /// Past a half turn the tangents are negative: the PI lies behind the
    /// start, so the vectors through it point backwards.
    fn bearing_in(&self, delta: f64, turn: f64) -> Option<Bearing> {
        let behind = if delta > PI { PI } else { 0.0 };
        let offsets = [
            (TS, behind),
            (TE, behind - turn * delta),
            (RS, turn * FRAC_PI_2),
            (RE, turn * (FRAC_PI_2 - delta)),
            (CH, -turn * delta / 2.0),
            (MO, behind + turn * (FRAC_PI_2 - delta / 2.0)),
        ];
        offsets
            .iter()
            .find_map(|&(i, offset)| self.bearing(i).map(|b| b.rotate(offset)))
    }
}

/// Reconstruct an arc from a partial definition.
pub fn solve(input: &SegmentInput, tolerance: f64) -> Result<Arc, SolveError> {
    let kind = SegmentKind::Arc;
    let fail = |err: SolveError| {
        debug!(?input, %err, "arc cannot be solved");
        err
    };
    let vectors = Vectors::new(input);

    // the vectors only see the folded angle; a supplied reflex central angle
    // is kept and reverses the sense they report
    let folded = vectors.delta();
    let reflex = match (folded, input.delta) {
        (Some(folded), Some(supplied)) => {
            close(supplied, TAU - folded, tolerance) && !close(supplied, folded, tolerance)
        }
        _ => false,
    };
    let sensed = vectors
        .rotation()
        .map(|rotation| if reflex { rotation.reverse() } else { rotation });

    let direction = reconcile("direction", input.direction, sensed, tolerance).or_else(
        || match (input.bearing_in, input.bearing_out) {
            (Some(entering), Some(exiting)) => Rotation::from_turn(entering.turn_to(exiting)),
            _ => None,
        },
    );

    let from_bearings = match (direction, input.bearing_in, input.bearing_out) {
        (Some(direction), Some(entering), Some(exiting)) => {
            Some((direction.turn() * (exiting.radians() - entering.radians())).rem_euclid(TAU))
                .filter(|delta| *delta > tolerance)
        }
        _ => None,
    };
    let computed_delta = if reflex {
        input.delta
    } else {
        folded.or(from_bearings)
    };

    let measured_radius = reconcile(
        "radius",
        input.radius,
        vectors.magnitude(RS).or(vectors.magnitude(RE)),
        tolerance,
    );
    let measured = Measured {
        tangent: vectors.magnitude(TS).or(vectors.magnitude(TE)).or(input.tangent),
        chord: vectors.magnitude(CH).or(input.chord),
        length: input.length,
        middle: vectors.magnitude(MO),
        external: input.external,
        middle_ordinate: input.middle_ordinate,
    };

    let delta = reconcile("delta", input.delta, computed_delta, tolerance)
        .or_else(|| measured_radius.and_then(|radius| measured.delta(radius)))
        .or_else(|| measured.delta_from_tangent_and_chord())
        .ok_or_else(|| fail(SolveError::AngleUndetermined { kind }))?;
    if !(delta > 0.0 && delta < TAU) {
        return Err(fail(SolveError::InvalidValue {
            kind,
            field: "delta",
            value: delta,
        }));
    }

    let radius = measured_radius
        .or_else(|| measured.radius(delta))
        .ok_or_else(|| fail(SolveError::RadiusUndetermined { kind }))?;
    if !(radius.is_finite() && radius > 0.0) {
        return Err(fail(SolveError::InvalidValue {
            kind,
            field: "radius",
            value: radius,
        }));
    }

    let direction = direction.ok_or_else(|| fail(SolveError::DirectionUndetermined { kind }))?;
    let turn = direction.turn();

    let half = delta / 2.0;
    let length = settle("length", input.length, radius * delta, tolerance);
    let tangent = settle("tangent", input.tangent, radius * half.tan(), tolerance);
    let chord = settle("chord", input.chord, 2.0 * radius * half.sin(), tolerance);
    let external = radius * (1.0 / half.cos() - 1.0);
    let middle_ordinate = radius * (1.0 - half.cos());

    let bearing_in = match vectors.bearing_in(delta, turn) {
        computed @ Some(_) => reconcile("bearing_in", input.bearing_in, computed, tolerance),
        None => input
            .bearing_in
            .or_else(|| input.bearing_out.map(|b| b.rotate(-turn * delta))),
    }
    .ok_or_else(|| fail(SolveError::Unoriented { kind }))?;
    let bearing_out = settle(
        "bearing_out",
        input.bearing_out,
        bearing_in.rotate(turn * delta),
        tolerance,
    );

    let radial = bearing_in.rotate(-turn * FRAC_PI_2);
    let chord_bearing = bearing_in.rotate(turn * half);
    let start = input
        .start
        .or_else(|| input.center.map(|center| center + along(radial, radius)))
        .or_else(|| input.pi.map(|pi| pi - along(bearing_in, tangent)))
        .or_else(|| input.end.map(|end| end - along(chord_bearing, chord)))
        .ok_or_else(|| fail(SolveError::Unplaced { kind }))?;
    let center = settle("center", input.center, start - along(radial, radius), tolerance);
    let pi = settle("pi", input.pi, start + along(bearing_in, tangent), tolerance);
    let end = settle("end", input.end, start + along(chord_bearing, chord), tolerance);

    Ok(Arc {
        core: Core {
            start,
            end,
            bearing_in,
            bearing_out,
            length,
            start_station: input.start_station,
            ..Core::default()
        },
        center,
        pi,
        radius,
        delta,
        direction,
        tangent,
        chord,
        external,
        middle_ordinate,
    })
}

/// Lengths known either from the supplied points or directly from the input.
struct Measured {
    tangent: Option<f64>,
    chord: Option<f64>,
    length: Option<f64>,
    middle: Option<f64>,
    external: Option<f64>,
    middle_ordinate: Option<f64>,
}

impl Measured {
    fn delta(&self, radius: f64) -> Option<f64> {
        self.chord
            .filter(|chord| *chord <= 2.0 * radius)
            .map(|chord| 2.0 * (chord / (2.0 * radius)).asin())
            .or_else(|| self.tangent.map(|tangent| 2.0 * (tangent / radius).atan()))
            .or_else(|| self.length.map(|length| length / radius))
            .or_else(|| {
                self.middle
                    .filter(|middle| *middle >= radius)
                    .map(|middle| 2.0 * (radius / middle).acos())
            })
            .filter(|delta| delta.is_finite() && *delta > 0.0)
    }

    fn delta_from_tangent_and_chord(&self) -> Option<f64> {
        let (tangent, chord) = (self.tangent?, self.chord?);
        Some(2.0 * (chord / (2.0 * tangent)).clamp(-1.0, 1.0).acos())
    }

    fn radius(&self, delta: f64) -> Option<f64> {
        let half = delta / 2.0;
        self.tangent
            .map(|tangent| (tangent / half.tan()).abs())
            .or_else(|| self.chord.map(|chord| chord / (2.0 * half.sin())))
            .or_else(|| self.length.map(|length| length / delta))
            .or_else(|| self.middle.map(|middle| middle * half.cos().abs()))
            .or_else(|| self.external.map(|external| external / (1.0 / half.cos() - 1.0)))
            .or_else(|| self.middle_ordinate.map(|mo| mo / (1.0 - half.cos())))
            .filter(|radius| radius.is_finite() && *radius > 0.0)
    }
}

impl Element for Arc {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Arc
    }

    fn point_at(&self, distance: f64) -> DVec3 {
        if self.is_degenerate() {
            return self.core.start;
        }
        let swept = self.direction.turn() * distance / self.radius;
        self.center + along(self.radial_bearing().rotate(swept), self.radius)
    }

    fn bearing_at(&self, distance: f64) -> Bearing {
        if self.is_degenerate() {
            return self.core.bearing_in;
        }
        self.core
            .bearing_in
            .rotate(self.direction.turn() * distance / self.radius)
    }

    fn translate(&mut self, offset: DVec3) {
        self.core.translate(offset);
        self.center += offset;
        self.pi += offset;
    }

    fn tolerance_step(&self, deviation: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        let angle = 2.0 * (1.0 - deviation / self.radius).clamp(-1.0, 1.0).acos();
        Some(self.radius * angle.min(PI))
    }

    fn is_degenerate(&self) -> bool {
        self.radius <= 0.0
    }
}

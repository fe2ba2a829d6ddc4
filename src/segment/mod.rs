//! Segment types and their parameter solvers
//!
//! Each segment type knows how to:
//! - Reconstruct itself from a partially specified [`SegmentInput`]
//! - Report positions and bearings at a distance along itself
//! - Move itself when the alignment re-references coordinates

pub mod arc;
pub mod line;
pub mod spiral;

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use glam::DVec3;

use crate::config::EngineConfig;
use crate::defaults::TOLERANCE;
use crate::errors::{ParseKindError, SolveError};
use crate::geometry::orthogonal;
use crate::types::{Bearing, InternalStation, Rotation, Side};

pub use arc::Arc;
pub use line::Line;
pub use spiral::Spiral;

/// Geometry type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SegmentKind {
    #[default]
    Line,
    Arc,
    Spiral,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Line => write!(f, "line"),
            SegmentKind::Arc => write!(f, "arc"),
            SegmentKind::Spiral => write!(f, "spiral"),
        }
    }
}

impl FromStr for SegmentKind {
    type Err = ParseKindError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(SegmentKind::Line),
            "arc" | "curve" => Ok(SegmentKind::Arc),
            "spiral" => Ok(SegmentKind::Spiral),
            _ => Err(ParseKindError {
                tag: tag.to_string(),
            }),
        }
    }
}

/// Fields shared by every segment type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Core {
    pub start: DVec3,
    pub end: DVec3,
    pub bearing_in: Bearing,
    pub bearing_out: Bearing,
    pub length: f64,
    /// Nominal station of `start`, if known
    pub start_station: Option<f64>,
    pub internal_station: InternalStation,
}

impl Core {
    pub fn translate(&mut self, offset: DVec3) {
        self.start += offset;
        self.end += offset;
    }
}

/// Common behavior for all segment types
#[enum_dispatch]
pub trait Element {
    fn core(&self) -> &Core;

    fn core_mut(&mut self) -> &mut Core;

    fn kind(&self) -> SegmentKind;

    /// Position at `distance` from the start, measured along the segment
    fn point_at(&self, distance: f64) -> DVec3;

    /// Direction of travel at `distance` from the start
    fn bearing_at(&self, distance: f64) -> Bearing;

    /// Move every point of the segment by `offset`
    fn translate(&mut self, offset: DVec3);

    /// Longest step along the segment whose chord strays at most `deviation`
    /// from the curve. `None` when a straight chord is exact.
    fn tolerance_step(&self, deviation: f64) -> Option<f64>;

    /// Positions at each of `distances`, in order
    fn points_at(&self, distances: &[f64]) -> Vec<DVec3> {
        distances.iter().map(|&d| self.point_at(d)).collect()
    }

    /// True for placeholders kept after a failed solve
    fn is_degenerate(&self) -> bool {
        false
    }
}

/// A fully defined line, arc or spiral
#[enum_dispatch(Element)]
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line(Line),
    Arc(Arc),
    Spiral(Spiral),
}

/// Identity derived from a segment's endpoints, for correlating rendered
/// edges with segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentHash(pub u64);

impl fmt::Display for SegmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Segment {
    pub fn start(&self) -> DVec3 {
        self.core().start
    }

    pub fn end(&self) -> DVec3 {
        self.core().end
    }

    pub fn bearing_in(&self) -> Bearing {
        self.core().bearing_in
    }

    pub fn bearing_out(&self) -> Bearing {
        self.core().bearing_out
    }

    pub fn length(&self) -> f64 {
        self.core().length
    }

    pub fn start_station(&self) -> Option<f64> {
        self.core().start_station
    }

    pub fn internal_station(&self) -> InternalStation {
        self.core().internal_station
    }

    /// Endpoint identity; coordinates are quantized to the default tolerance so
    /// rounding noise does not change it.
    pub fn hash(&self) -> SegmentHash {
        let mut hasher = DefaultHasher::new();
        for value in self.start().to_array().into_iter().chain(self.end().to_array()) {
            ((value / TOLERANCE).round() as i64).hash(&mut hasher);
        }
        SegmentHash(hasher.finish())
    }

    /// Unit tangent at `distance` from the start
    pub fn tangent_at(&self, distance: f64) -> DVec3 {
        self.bearing_at(distance).unit()
    }

    /// Unit vector perpendicular to the segment at `distance`, toward `side`
    pub fn orthogonal_at(&self, distance: f64, side: Side) -> DVec3 {
        orthogonal(self.bearing_at(distance), side)
    }

    pub fn as_arc(&self) -> Option<&Arc> {
        match self {
            Segment::Arc(arc) => Some(arc),
            _ => None,
        }
    }

    pub fn as_spiral(&self) -> Option<&Spiral> {
        match self {
            Segment::Spiral(spiral) => Some(spiral),
            _ => None,
        }
    }
}

/// Partially specified segment, as supplied by a host document.
///
/// Every field is optional; the solver for `kind` decides which combinations
/// are sufficient.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentInput {
    pub kind: SegmentKind,
    pub start: Option<DVec3>,
    pub end: Option<DVec3>,
    pub center: Option<DVec3>,
    pub pi: Option<DVec3>,
    pub radius: Option<f64>,
    /// Spiral radius at `start` (`f64::INFINITY` for the straight end)
    pub start_radius: Option<f64>,
    /// Spiral radius at `end` (`f64::INFINITY` for the straight end)
    pub end_radius: Option<f64>,
    pub delta: Option<f64>,
    pub theta: Option<f64>,
    pub tangent: Option<f64>,
    pub chord: Option<f64>,
    pub external: Option<f64>,
    pub middle_ordinate: Option<f64>,
    pub length: Option<f64>,
    pub bearing_in: Option<Bearing>,
    pub bearing_out: Option<Bearing>,
    pub direction: Option<Rotation>,
    pub start_station: Option<f64>,
}

macro_rules! builder {
    ($($method:ident => $field:ident : $ty:ty),* $(,)?) => {
        $(
            pub fn $method(mut self, value: $ty) -> Self {
                self.$field = Some(value);
                self
            }
        )*
    };
}

impl SegmentInput {
    pub fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn line() -> Self {
        Self::new(SegmentKind::Line)
    }

    pub fn arc() -> Self {
        Self::new(SegmentKind::Arc)
    }

    pub fn spiral() -> Self {
        Self::new(SegmentKind::Spiral)
    }

    builder! {
        with_start => start: DVec3,
        with_end => end: DVec3,
        with_center => center: DVec3,
        with_pi => pi: DVec3,
        with_radius => radius: f64,
        with_start_radius => start_radius: f64,
        with_end_radius => end_radius: f64,
        with_delta => delta: f64,
        with_theta => theta: f64,
        with_tangent => tangent: f64,
        with_chord => chord: f64,
        with_external => external: f64,
        with_middle_ordinate => middle_ordinate: f64,
        with_length => length: f64,
        with_bearing_in => bearing_in: Bearing,
        with_bearing_out => bearing_out: Bearing,
        with_direction => direction: Rotation,
        with_start_station => start_station: f64,
    }

    /// True when none of start, end, center or PI is known.
    pub fn is_unplaced(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.center.is_none() && self.pi.is_none()
    }

    /// Reconstruct the full segment.
    pub fn solve(&self, config: &EngineConfig) -> Result<Segment, SolveError> {
        match self.kind {
            SegmentKind::Line => line::solve(self, config.tolerance).map(Segment::from),
            SegmentKind::Arc => arc::solve(self, config.tolerance).map(Segment::from),
            SegmentKind::Spiral => spiral::solve(self, config.tolerance).map(Segment::from),
        }
    }

    /// Placeholder for a segment whose solve failed; `None` for lines, which are
    /// dropped instead.
    pub fn degenerate(&self) -> Option<Segment> {
        match self.kind {
            SegmentKind::Line => None,
            SegmentKind::Arc => Some(Segment::Arc(Arc::degenerate(self))),
            SegmentKind::Spiral => Some(Segment::Spiral(Spiral::degenerate(self))),
        }
    }

    /// Best-effort common fields for placeholders.
    pub(crate) fn placeholder_core(&self) -> Core {
        let start = self.start.or(self.pi).or(self.center).or(self.end).unwrap_or_default();
        let end = self.end.unwrap_or(start);
        let chord = Bearing::of(end - start).unwrap_or_default();
        Core {
            start,
            end,
            bearing_in: self.bearing_in.unwrap_or(chord),
            bearing_out: self.bearing_out.unwrap_or(chord),
            length: self.length.filter(|l| l.is_finite()).unwrap_or_default(),
            start_station: self.start_station,
            ..Core::default()
        }
    }
}

impl From<&Segment> for SegmentInput {
    fn from(segment: &Segment) -> Self {
        let core = segment.core();
        let input = SegmentInput::new(segment.kind())
            .with_start(core.start)
            .with_end(core.end)
            .with_bearing_in(core.bearing_in)
            .with_bearing_out(core.bearing_out)
            .with_length(core.length);
        let input = SegmentInput {
            start_station: core.start_station,
            ..input
        };
        match segment {
            Segment::Line(_) => input,
            Segment::Arc(arc) => input
                .with_center(arc.center)
                .with_pi(arc.pi)
                .with_radius(arc.radius)
                .with_delta(arc.delta)
                .with_direction(arc.direction)
                .with_tangent(arc.tangent)
                .with_chord(arc.chord),
            Segment::Spiral(spiral) => input
                .with_pi(spiral.pi)
                .with_start_radius(spiral.start_radius)
                .with_end_radius(spiral.end_radius)
                .with_theta(spiral.theta)
                .with_direction(spiral.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_host_tags() {
        assert_eq!("Line".parse::<SegmentKind>(), Ok(SegmentKind::Line));
        assert_eq!(" curve ".parse::<SegmentKind>(), Ok(SegmentKind::Arc));
        assert_eq!("SPIRAL".parse::<SegmentKind>(), Ok(SegmentKind::Spiral));
        let err = "clothoid".parse::<SegmentKind>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported geometry type: \"clothoid\"");
    }

    #[test]
    fn hash_ignores_rounding_noise() {
        let config = EngineConfig::default();
        let a = SegmentInput::line()
            .with_start(DVec3::ZERO)
            .with_end(DVec3::new(0.0, 100.0, 0.0))
            .solve(&config)
            .unwrap();
        let b = SegmentInput::line()
            .with_start(DVec3::new(1e-9, 0.0, 0.0))
            .with_end(DVec3::new(0.0, 100.0, 0.0))
            .solve(&config)
            .unwrap();
        let c = SegmentInput::line()
            .with_start(DVec3::ZERO)
            .with_end(DVec3::new(0.0, 101.0, 0.0))
            .solve(&config)
            .unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), c.hash());
    }

    #[test]
    fn dispatch_reaches_each_variant() {
        let config = EngineConfig::default();
        let line = SegmentInput::line()
            .with_start(DVec3::ZERO)
            .with_end(DVec3::new(0.0, 10.0, 0.0))
            .solve(&config)
            .unwrap();
        assert_eq!(line.kind(), SegmentKind::Line);
        assert!((line.point_at(4.0) - DVec3::new(0.0, 4.0, 0.0)).length() < 1e-12);
        assert!((line.orthogonal_at(2.0, Side::Right) - DVec3::X).length() < 1e-12);
        assert!(!line.is_degenerate());
    }

    #[test]
    fn degenerate_placeholders() {
        let input = SegmentInput::arc().with_start(DVec3::new(5.0, 5.0, 0.0));
        let placeholder = input.degenerate().unwrap();
        assert!(placeholder.is_degenerate());
        assert_eq!(placeholder.start(), DVec3::new(5.0, 5.0, 0.0));
        assert_eq!(SegmentInput::line().degenerate(), None);
    }
}

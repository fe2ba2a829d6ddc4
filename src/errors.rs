//! Error types with diagnostic codes using miette
//!
//! Solver and discretizer failures are returned as values; the alignment
//! engine collects them into its error list instead of aborting.

use miette::Diagnostic;
use thiserror::Error;

use crate::segment::SegmentKind;
use crate::types::Bearing;

// ============================================================================
// Solve Errors
// ============================================================================

/// A segment definition that cannot be reconstructed
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("line needs both endpoints, or one endpoint with a bearing and a length")]
    #[diagnostic(code(halign::solve::line_underdetermined))]
    LineUnderdetermined,

    #[error("{kind} radius cannot be determined")]
    #[diagnostic(
        code(halign::solve::radius_undetermined),
        help("supply a radius, a center with a start or end point, or a length with the central angle")
    )]
    RadiusUndetermined { kind: SegmentKind },

    #[error("{kind} central angle cannot be determined")]
    #[diagnostic(
        code(halign::solve::angle_undetermined),
        help("supply both bearings, a central angle, or two of the curve's points")
    )]
    AngleUndetermined { kind: SegmentKind },

    #[error("{kind} rotation direction cannot be determined")]
    #[diagnostic(
        code(halign::solve::direction_undetermined),
        help("supply the direction, both bearings, or a point of intersection")
    )]
    DirectionUndetermined { kind: SegmentKind },

    #[error("{kind} orientation cannot be determined")]
    #[diagnostic(
        code(halign::solve::unoriented),
        help("supply a bearing or a second point")
    )]
    Unoriented { kind: SegmentKind },

    #[error("{kind} cannot be placed: no start, end, center or point of intersection")]
    #[diagnostic(code(halign::solve::unplaced))]
    Unplaced { kind: SegmentKind },

    #[error("spiral has no finite radius end")]
    #[diagnostic(
        code(halign::solve::spiral_radius),
        help("exactly one of the start and end radii of a spiral must be infinite")
    )]
    SpiralWithoutCurve,

    #[error("{kind} has invalid {field}: {value}")]
    #[diagnostic(code(halign::solve::invalid_value))]
    InvalidValue {
        kind: SegmentKind,
        field: &'static str,
        value: f64,
    },
}

// ============================================================================
// Validation Errors
// ============================================================================

/// Inconsistencies that stop the validation pipeline
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "bearing discontinuity between segments {back} and {ahead}: leaves at {bearing_out}, enters at {bearing_in}"
    )]
    #[diagnostic(
        code(halign::validate::bearing_discontinuity),
        help("adjacent segments must share the bearing at their common point")
    )]
    BearingDiscontinuity {
        back: usize,
        ahead: usize,
        bearing_out: Bearing,
        bearing_in: Bearing,
    },

    #[error("segment {index} has no entering bearing")]
    #[diagnostic(
        code(halign::validate::missing_bearing),
        help("the segment could not be solved; see the earlier solve error")
    )]
    MissingBearing { index: usize },
}

// ============================================================================
// Discretize Errors
// ============================================================================

/// Invalid subdivision requests
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum DiscretizeError {
    #[error("invalid subdivision size: {size}")]
    #[diagnostic(
        code(halign::discretize::invalid_size),
        help("size must be a positive, finite number (a count of at least 1 for the segment method)")
    )]
    InvalidSize { size: f64 },

    #[error("subdivision would produce {count} points")]
    #[diagnostic(
        code(halign::discretize::too_many_points),
        help("only {max} points may be produced for one segment")
    )]
    TooManyPoints { count: usize, max: usize },
}

// ============================================================================
// Input Errors
// ============================================================================

/// Unknown geometry type tag from a host document
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("unsupported geometry type: {tag:?}")]
#[diagnostic(
    code(halign::input::unknown_kind),
    help("expected one of: line, arc, curve, spiral")
)]
pub struct ParseKindError {
    pub tag: String,
}

// ============================================================================
// Alignment Diagnostics
// ============================================================================

/// One entry of an alignment's error list
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("segment {index}: {source}")]
    #[diagnostic(code(halign::alignment::unsolved_segment))]
    Unsolved {
        index: usize,
        #[source]
        source: SolveError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("segment {index}: {source}")]
    #[diagnostic(code(halign::alignment::unknown_kind))]
    UnknownKind {
        index: usize,
        #[source]
        source: ParseKindError,
    },
}

//! Alignment model
//!
//! An alignment is an ordered chain of solved segments plus the metadata that
//! places it on the ground: a datum (station and coordinate of its start), a
//! station equation table, and a reported total length.
//!
//! [`AlignmentModel::new`] solves the raw inputs; [`AlignmentModel::validate`]
//! repairs and checks the chain. Station queries are meaningful after a
//! successful validation.

mod validate;

use glam::DVec3;

use crate::config::EngineConfig;
use crate::discretize::{self, Method};
use crate::errors::{AlignmentError, DiscretizeError};
use crate::log::debug;
use crate::segment::{Element, Segment, SegmentHash, SegmentInput, SegmentKind};
use crate::stationing::StationEquations;
use crate::types::Side;

/// Station and coordinate of the alignment's reference point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Datum {
    pub station: Option<f64>,
    pub start: Option<DVec3>,
}

/// Descriptive and referencing data supplied with the segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentMeta {
    pub id: String,
    pub description: String,
    pub status: String,
    pub datum: Datum,
    pub equations: StationEquations,
    /// Total length as reported by the host document
    pub length: Option<f64>,
}

/// Raw alignment definition as handed over by a host document.
#[derive(Debug, Clone, Default)]
pub struct AlignmentInput {
    pub meta: AlignmentMeta,
    pub segments: Vec<SegmentInput>,
    rejected: Vec<AlignmentError>,
}

impl AlignmentInput {
    pub fn new(meta: AlignmentMeta) -> Self {
        Self {
            meta,
            ..Self::default()
        }
    }

    pub fn with_segment(mut self, input: SegmentInput) -> Self {
        self.segments.push(input);
        self
    }

    pub fn push(&mut self, input: SegmentInput) {
        self.segments.push(input);
    }

    /// Add a segment whose geometry type is a host tag such as `"curve"`.
    /// Unknown tags are recorded and the segment is skipped.
    pub fn push_tagged(&mut self, tag: &str, input: SegmentInput) {
        let index = self.segments.len() + self.rejected.len();
        match tag.parse::<SegmentKind>() {
            Ok(kind) => self.segments.push(SegmentInput { kind, ..input }),
            Err(source) => {
                debug!(index, tag, "unknown geometry type");
                self.rejected.push(AlignmentError::UnknownKind { index, source });
            }
        }
    }

    /// Diagnostics recorded while collecting segments.
    pub fn rejected(&self) -> &[AlignmentError] {
        &self.rejected
    }
}

/// A solved (and, after [`validate`](AlignmentModel::validate), repaired)
/// chain of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentModel {
    pub id: String,
    pub description: String,
    pub status: String,
    pub datum: Datum,
    pub equations: StationEquations,
    pub segments: Vec<Segment>,
    /// Reported total length; reconciled with the segments on validation
    pub length: Option<f64>,
    /// World position of the local origin once coordinates are datum-relative
    pub reference: DVec3,
    pub config: EngineConfig,
    errors: Vec<AlignmentError>,
}

impl AlignmentModel {
    /// Solve every segment in order.
    ///
    /// A segment given without any point continues from the previous segment's
    /// end and exit bearing (or from the datum). Unsolvable arcs and spirals
    /// are kept as degenerate placeholders; unsolvable lines are dropped.
    pub fn new(input: AlignmentInput, config: EngineConfig) -> Self {
        let AlignmentInput {
            meta,
            segments: inputs,
            rejected,
        } = input;
        let mut errors = rejected;
        let mut segments: Vec<Segment> = Vec::with_capacity(inputs.len());

        for (index, raw) in inputs.into_iter().enumerate() {
            let raw = chain(raw, segments.last(), &meta.datum);
            match raw.solve(&config) {
                Ok(segment) => segments.push(segment),
                Err(source) => {
                    debug!(index, %source, "segment left unsolved");
                    segments.extend(raw.degenerate());
                    errors.push(AlignmentError::Unsolved { index, source });
                }
            }
        }

        Self {
            id: meta.id,
            description: meta.description,
            status: meta.status,
            datum: meta.datum,
            equations: meta.equations,
            segments,
            length: meta.length,
            reference: DVec3::ZERO,
            config,
            errors,
        }
    }

    pub fn errors(&self) -> &[AlignmentError] {
        &self.errors
    }

    /// Errors rendered for display to a user.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total length of the segments.
    pub fn segments_length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Continuous position (base units) of a nominal station.
    pub fn internal_station(&self, station: f64) -> f64 {
        self.config
            .station_to_length(self.equations.internal_station(station))
    }

    /// Nominal station of a continuous position (base units).
    pub fn nominal_station(&self, internal: f64) -> f64 {
        self.equations
            .nominal_station(self.config.length_to_station(internal))
    }

    /// The last segment starting at or before `internal`.
    pub fn locate_segment(&self, internal: f64) -> Option<(usize, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .rev()
            .find(|(_, segment)| segment.internal_station().start <= internal)
    }

    /// Owning segment and distance along it for a nominal station.
    fn locate_station(&self, station: f64) -> Option<(&Segment, f64)> {
        let internal = self.internal_station(station);
        let (_, segment) = self.locate_segment(internal)?;
        Some((segment, internal - segment.internal_station().start))
    }

    /// Position at a nominal station.
    pub fn point_at(&self, station: f64) -> Option<DVec3> {
        let (segment, distance) = self.locate_station(station)?;
        Some(segment.point_at(distance))
    }

    /// Position and unit tangent at a nominal station.
    pub fn tangent_at(&self, station: f64) -> Option<(DVec3, DVec3)> {
        let (segment, distance) = self.locate_station(station)?;
        Some((segment.point_at(distance), segment.tangent_at(distance)))
    }

    /// Position and unit perpendicular toward `side` at a nominal station,
    /// for placing cross-sections.
    pub fn orthogonal_at(&self, station: f64, side: Side) -> Option<(DVec3, DVec3)> {
        let (segment, distance) = self.locate_station(station)?;
        Some((
            segment.point_at(distance),
            segment.orthogonal_at(distance, side),
        ))
    }

    pub fn segment_by_hash(&self, hash: SegmentHash) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.hash() == hash)
    }

    /// Points along the whole alignment; see [`discretize::alignment_points`].
    pub fn discretize(&self, method: Method, size: f64) -> Result<Vec<DVec3>, DiscretizeError> {
        discretize::alignment_points(self, method, size)
    }

    /// Convert a model coordinate back to the host's world coordinates.
    pub fn to_world(&self, point: DVec3) -> DVec3 {
        point + self.reference
    }
}

/// Continue a segment without any point from where the chain left off.
fn chain(raw: SegmentInput, previous: Option<&Segment>, datum: &Datum) -> SegmentInput {
    if !raw.is_unplaced() {
        return raw;
    }
    let start = previous
        .map(Segment::end)
        .or(datum.start)
        .unwrap_or_default();
    SegmentInput {
        start: Some(start),
        bearing_in: raw.bearing_in.or(previous.map(Segment::bearing_out)),
        ..raw
    }
}

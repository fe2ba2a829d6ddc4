//! Discretization of segments and whole alignments into point sequences
//!
//! A segment's sequence excludes its start and includes its end, so sequences
//! of consecutive segments concatenate without repeating the shared point.

use glam::DVec3;

use crate::alignment::AlignmentModel;
use crate::defaults::{COINCIDENT_EPSILON, MAX_SUBDIVISIONS};
use crate::errors::DiscretizeError;
use crate::geometry::along;
use crate::segment::{Element, Segment};

/// How the spacing of the points is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// `size` equal pieces
    #[default]
    Segment,
    /// Fixed steps of `size` along the segment, then the end
    Interval,
    /// Steps whose chord strays at most `size` from the curve
    Tolerance,
}

/// Portion of a segment, measured from its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub offset: f64,
    pub length: f64,
}

fn check_size(size: f64) -> Result<f64, DiscretizeError> {
    if size.is_finite() && size > 0.0 {
        Ok(size)
    } else {
        Err(DiscretizeError::InvalidSize { size })
    }
}

fn check_count(count: f64) -> Result<usize, DiscretizeError> {
    if count > MAX_SUBDIVISIONS as f64 {
        return Err(DiscretizeError::TooManyPoints {
            count: count.min(usize::MAX as f64) as usize,
            max: MAX_SUBDIVISIONS,
        });
    }
    Ok(count as usize)
}

/// Distances along `segment` at which points are produced.
pub fn distances(
    segment: &Segment,
    method: Method,
    size: f64,
    span: Option<Span>,
) -> Result<Vec<f64>, DiscretizeError> {
    let size = check_size(size)?;
    let total = segment.length();
    let offset = span.map_or(0.0, |span| span.offset.clamp(0.0, total));
    let length = span.map_or(total - offset, |span| span.length.clamp(0.0, total - offset));
    let stop = offset + length;

    if length <= 0.0 {
        return Ok(vec![stop]);
    }

    let pieces = match method {
        Method::Segment => {
            let count = size.round();
            if count < 1.0 {
                return Err(DiscretizeError::InvalidSize { size });
            }
            check_count(count)?
        }
        Method::Interval => {
            let count = check_count((length / size).ceil())?;
            let mut steps: Vec<f64> = (1..count)
                .map(|k| offset + k as f64 * size)
                .filter(|d| *d < stop)
                .collect();
            steps.push(stop);
            return Ok(steps);
        }
        Method::Tolerance => match segment.tolerance_step(size) {
            Some(step) if step > 0.0 => check_count((length / step).ceil())?.max(1),
            _ => 1,
        },
    };

    Ok((1..=pieces)
        .map(|k| {
            if k == pieces {
                stop
            } else {
                offset + length * k as f64 / pieces as f64
            }
        })
        .collect())
}

/// Points along `segment`; the sequence ends exactly on `End` when the span
/// reaches it.
pub fn segment_points(
    segment: &Segment,
    method: Method,
    size: f64,
    span: Option<Span>,
) -> Result<Vec<DVec3>, DiscretizeError> {
    let distances = distances(segment, method, size, span)?;
    let mut points = segment.points_at(&distances);
    if let (Some(last), Some(&distance)) = (points.last_mut(), distances.last()) {
        if distance >= segment.length() {
            *last = segment.end();
        }
    }
    Ok(points)
}

/// Points along the whole alignment, from the first segment's start.
///
/// A segment's start is only emitted when it does not coincide with the
/// previous point. When the segments fall short of the reported length, a
/// last point continues along the final bearing.
pub fn alignment_points(
    model: &AlignmentModel,
    method: Method,
    size: f64,
) -> Result<Vec<DVec3>, DiscretizeError> {
    let mut points: Vec<DVec3> = Vec::new();
    for segment in &model.segments {
        let start = segment.start();
        if points
            .last()
            .is_none_or(|last| last.distance(start) >= COINCIDENT_EPSILON)
        {
            points.push(start);
        }
        points.extend(segment_points(segment, method, size, None)?);
    }

    if let (Some(reported), Some(last)) = (model.length, model.segments.last()) {
        let shortfall = reported - model.segments_length();
        if shortfall > model.config.length_tolerance() {
            points.push(last.end() + along(last.bearing_out(), shortfall));
        }
    }
    Ok(points)
}

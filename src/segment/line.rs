//! Straight segments

use glam::DVec3;

use super::{Core, Element, SegmentInput, SegmentKind};
use crate::errors::SolveError;
use crate::geometry::{along, reconcile};
use crate::log::debug;
use crate::types::Bearing;

/// A straight segment: bearing in and out are the same.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub core: Core,
}

/// Solve a line from both endpoints, or from one endpoint with a bearing and
/// a length.
pub fn solve(input: &SegmentInput, tolerance: f64) -> Result<Line, SolveError> {
    let supplied_bearing = input.bearing_in.or(input.bearing_out);

    let (start, end, bearing, length) = match (input.start, input.end) {
        (Some(start), Some(end)) => {
            let chord = end - start;
            let bearing = reconcile("bearing", supplied_bearing, Bearing::of(chord), tolerance)
                .ok_or(SolveError::Unoriented {
                    kind: SegmentKind::Line,
                })?;
            let length = reconcile("length", input.length, Some(chord.length()), tolerance)
                .unwrap_or_default();
            (start, end, bearing, length)
        }
        (Some(start), None) => {
            let (bearing, length) = projection(supplied_bearing, input.length)?;
            (start, start + along(bearing, length), bearing, length)
        }
        (None, Some(end)) => {
            let (bearing, length) = projection(supplied_bearing, input.length)?;
            (end - along(bearing, length), end, bearing, length)
        }
        (None, None) => {
            debug!(?input, "line has no endpoint");
            return Err(SolveError::LineUnderdetermined);
        }
    };

    Ok(Line {
        core: Core {
            start,
            end,
            bearing_in: bearing,
            bearing_out: bearing,
            length,
            start_station: input.start_station,
            ..Core::default()
        },
    })
}

fn projection(bearing: Option<Bearing>, length: Option<f64>) -> Result<(Bearing, f64), SolveError> {
    let (Some(bearing), Some(length)) = (bearing, length) else {
        debug!(?bearing, ?length, "line endpoint cannot be projected");
        return Err(SolveError::LineUnderdetermined);
    };
    if !length.is_finite() || length < 0.0 {
        return Err(SolveError::InvalidValue {
            kind: SegmentKind::Line,
            field: "length",
            value: length,
        });
    }
    Ok((bearing, length))
}

impl Element for Line {
    fn core(&self) -> &Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut Core {
        &mut self.core
    }

    fn kind(&self) -> SegmentKind {
        SegmentKind::Line
    }

    fn point_at(&self, distance: f64) -> DVec3 {
        self.core.start + along(self.core.bearing_in, distance)
    }

    fn bearing_at(&self, _distance: f64) -> Bearing {
        self.core.bearing_in
    }

    fn translate(&mut self, offset: DVec3) {
        self.core.translate(offset);
    }

    fn tolerance_step(&self, _deviation: f64) -> Option<f64> {
        None
    }
}

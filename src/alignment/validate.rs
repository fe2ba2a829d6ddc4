//! The validation pipeline
//!
//! Steps run in a fixed order and each may mutate the segments:
//!
//! 1. datum: reconcile the alignment datum with the first segment
//! 2. stationing: infer missing stations, assign internal stations
//! 3. bearings: adjacent segments must share their bearing (fatal)
//! 4. coordinates: repair station/coordinate disagreements
//! 5. alignment: fill gaps with lines, reconcile the reported length
//! 6. stationing again, for inserted segments
//! 7. re-reference coordinates to the datum

use glam::DVec3;

use super::AlignmentModel;
use crate::errors::{AlignmentError, ValidationError};
use crate::geometry::along;
use crate::log::debug;
use crate::segment::{Element, Segment, SegmentInput};
use crate::stationing::StationEquations;
use crate::types::{Bearing, InternalStation};

impl AlignmentModel {
    /// Run the validation pipeline.
    ///
    /// A bearing discontinuity stops the pipeline; it is recorded in
    /// [`errors`](AlignmentModel::errors) and returned. Running the pipeline on
    /// an already valid model changes nothing.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        if self.segments.is_empty() {
            return Ok(());
        }
        self.validate_datum();
        self.validate_stationing();
        if let Err(err) = self.validate_bearings() {
            debug!(%err, "validation stopped");
            self.errors.push(AlignmentError::from(err.clone()));
            return Err(err);
        }
        self.validate_coordinates();
        self.validate_alignment();
        self.validate_stationing();
        self.zero_reference_coordinates();
        Ok(())
    }

    /// Make both datum fields known, deriving the missing one from the first
    /// segment.
    fn validate_datum(&mut self) {
        let Some(first) = self.segments.first() else {
            return;
        };
        let tolerance = self.config.tolerance;
        let (first_station, first_start, bearing) =
            (first.start_station(), first.start(), first.bearing_in());

        match (self.datum.station, self.datum.start) {
            (Some(_), Some(_)) => {}
            (None, None) => {
                self.datum.station = Some(first_station.unwrap_or(0.0));
                self.datum.start = Some(first_start);
            }
            (Some(station), None) => {
                let delta = first_station.map_or(0.0, |first| first - station);
                let start = if delta.abs() <= tolerance {
                    first_start
                } else {
                    first_start - along(bearing, self.config.station_to_length(delta))
                };
                debug!(station, ?start, "datum coordinate derived");
                self.datum.start = Some(start);
            }
            (None, Some(start)) => {
                let distance = (first_start - start).dot(bearing.unit());
                let station = match first_station {
                    Some(first) if distance.abs() > self.config.length_tolerance() => {
                        first - self.config.length_to_station(distance)
                    }
                    Some(first) => first,
                    None => 0.0,
                };
                debug!(station, ?start, "datum station derived");
                self.datum.station = Some(station);
            }
        }
    }

    /// Give every segment a nominal start station and an internal station range.
    fn validate_stationing(&mut self) {
        let config = self.config;
        let tolerance = config.length_tolerance();
        let datum_station = self.datum.station.unwrap_or(0.0);
        if self.equations.is_empty() {
            self.equations = StationEquations::new(datum_station);
        }
        let equations = &self.equations;

        let mut previous_station = datum_station;
        let mut previous_end = self.datum.start.or(self.segments.first().map(Segment::start));
        let mut previous_internal = config.station_to_length(equations.internal_station(datum_station));

        for segment in &mut self.segments {
            let core = segment.core_mut();
            let station = core.start_station.unwrap_or_else(|| {
                let gap = previous_end.map_or(0.0, |end| end.distance(core.start));
                if gap > tolerance {
                    previous_station + config.length_to_station(gap)
                } else {
                    previous_station
                }
            });
            let mut start = config.station_to_length(equations.internal_station(station));
            if (start - previous_internal).abs() <= tolerance {
                start = previous_internal;
            }
            core.start_station = Some(station);
            core.internal_station = InternalStation::new(start, core.length);

            previous_internal = core.internal_station.end;
            previous_station =
                equations.nominal_station(config.length_to_station(previous_internal));
            previous_end = Some(core.end);
        }
    }

    /// Adjacent segments must leave and enter on the same bearing.
    fn validate_bearings(&self) -> Result<(), ValidationError> {
        let tolerance = self.config.tolerance;
        for (index, segment) in self.segments.iter().enumerate() {
            if segment.is_degenerate() {
                return Err(ValidationError::MissingBearing { index });
            }
            let Some(back) = index.checked_sub(1).map(|i| &self.segments[i]) else {
                continue;
            };
            if !back.bearing_out().within(segment.bearing_in(), tolerance) {
                return Err(ValidationError::BearingDiscontinuity {
                    back: index - 1,
                    ahead: index,
                    bearing_out: back.bearing_out(),
                    bearing_in: segment.bearing_in(),
                });
            }
        }
        Ok(())
    }

    /// Where the coordinate gap between two segments disagrees with their
    /// station gap, decide which one is wrong: a gap that runs along the ahead
    /// segment's bearing is real and its station is fixed; any other gap means
    /// the ahead segment is misplaced and it is moved. A sideways gap is a
    /// misplacement even when its width matches the station gap.
    fn validate_coordinates(&mut self) {
        let config = self.config;
        let tolerance = config.length_tolerance();

        for ahead in 1..self.segments.len() {
            let (done, rest) = self.segments.split_at_mut(ahead);
            let back = &done[ahead - 1];
            let segment = &mut rest[0];

            let gap = segment.start() - back.end();
            let expected = segment.internal_station().start - back.internal_station().end;
            let along_route = Bearing::of(gap)
                .is_some_and(|bearing| bearing.within(segment.bearing_in(), config.tolerance));
            let spaced = (gap.length() - expected).abs() <= tolerance;
            if spaced && (gap.length() <= tolerance || along_route) {
                continue;
            }

            if along_route {
                let internal = back.internal_station().end + gap.length();
                let station = self
                    .equations
                    .nominal_station(config.length_to_station(internal));
                debug!(ahead, station, "station corrected from coordinates");
                let core = segment.core_mut();
                core.start_station = Some(station);
                core.internal_station = InternalStation::new(internal, core.length);
            } else {
                let target = back.end() + along(segment.bearing_in(), expected);
                debug!(ahead, ?target, "segment moved to match its station");
                segment.translate(target - segment.start());
            }
        }
    }

    /// Fill coordinate gaps with lines and reconcile the reported length.
    fn validate_alignment(&mut self) {
        let tolerance = self.config.length_tolerance();
        let mut repaired: Vec<Segment> = Vec::with_capacity(self.segments.len());

        for segment in std::mem::take(&mut self.segments) {
            if let Some(previous) = repaired.last() {
                if previous.end().distance(segment.start()) > tolerance {
                    let gap = SegmentInput::line()
                        .with_start(previous.end())
                        .with_end(segment.start())
                        .with_bearing_in(segment.bearing_in());
                    match gap.solve(&self.config) {
                        Ok(line) => {
                            debug!(length = line.length(), "gap filled with a line");
                            repaired.push(line);
                        }
                        Err(source) => self.errors.push(AlignmentError::Unsolved {
                            index: repaired.len(),
                            source,
                        }),
                    }
                }
            }
            repaired.push(segment);
        }
        self.segments = repaired;

        let total = self.segments_length();
        match self.length {
            Some(reported) if reported > total + tolerance => self.extend(reported - total),
            Some(reported) if reported >= total - tolerance => {}
            _ => {
                debug!(reported = ?self.length, total, "reported length replaced");
                self.length = Some(total);
            }
        }
    }

    /// Append a tangent line covering a shortfall against the reported length.
    fn extend(&mut self, shortfall: f64) {
        let Some(last) = self.segments.last() else {
            return;
        };
        let extension = SegmentInput::line()
            .with_start(last.end())
            .with_bearing_in(last.bearing_out())
            .with_length(shortfall);
        match extension.solve(&self.config) {
            Ok(line) => {
                debug!(shortfall, "alignment extended to its reported length");
                self.segments.push(line);
            }
            Err(source) => self.errors.push(AlignmentError::Unsolved {
                index: self.segments.len(),
                source,
            }),
        }
    }

    /// Make coordinates relative to the datum; the world offset accumulates in
    /// `reference`.
    fn zero_reference_coordinates(&mut self) {
        let origin = self.datum.start.unwrap_or_default();
        if origin != DVec3::ZERO {
            for segment in &mut self.segments {
                segment.translate(-origin);
            }
            self.reference += origin;
        }
        self.datum.start = Some(DVec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{AlignmentInput, AlignmentMeta, Datum};
    use crate::config::EngineConfig;

    fn line(from: (f64, f64), to: (f64, f64)) -> SegmentInput {
        SegmentInput::line()
            .with_start(DVec3::new(from.0, from.1, 0.0))
            .with_end(DVec3::new(to.0, to.1, 0.0))
    }

    fn model(meta: AlignmentMeta, segments: Vec<SegmentInput>) -> AlignmentModel {
        let mut input = AlignmentInput::new(meta);
        segments.into_iter().for_each(|s| input.push(s));
        AlignmentModel::new(input, EngineConfig::default())
    }

    #[test]
    fn datum_adopts_first_segment() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![line((10.0, 20.0), (10.0, 120.0)).with_start_station(500.0)],
        );
        m.validate_datum();
        assert_eq!(m.datum.station, Some(500.0));
        assert_eq!(m.datum.start, Some(DVec3::new(10.0, 20.0, 0.0)));
    }

    #[test]
    fn datum_coordinate_projected_back_from_station() {
        let meta = AlignmentMeta {
            datum: Datum {
                station: Some(1000.0),
                start: None,
            },
            ..AlignmentMeta::default()
        };
        let mut m = model(meta, vec![line((0.0, 100.0), (0.0, 200.0)).with_start_station(1100.0)]);
        m.validate_datum();
        assert!((m.datum.start.unwrap() - DVec3::ZERO).length() < 1e-9);
    }

    #[test]
    fn datum_station_projected_from_coordinate() {
        let meta = AlignmentMeta {
            datum: Datum {
                station: None,
                start: Some(DVec3::ZERO),
            },
            ..AlignmentMeta::default()
        };
        let mut m = model(meta, vec![line((0.0, 40.0), (0.0, 200.0)).with_start_station(140.0)]);
        m.validate_datum();
        assert!((m.datum.station.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn stations_are_inferred_from_travel() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![line((0.0, 0.0), (0.0, 100.0)), line((0.0, 130.0), (0.0, 200.0))],
        );
        m.validate_datum();
        m.validate_stationing();
        assert_eq!(m.segments[0].start_station(), Some(0.0));
        assert!((m.segments[1].start_station().unwrap() - 130.0).abs() < 1e-9);
        assert!((m.segments[1].internal_station().start - 130.0).abs() < 1e-9);
    }

    #[test]
    fn misplaced_segment_is_moved() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![
                line((0.0, 0.0), (0.0, 100.0)).with_start_station(0.0),
                line((5.0, 100.0), (5.0, 200.0)).with_start_station(100.0),
            ],
        );
        m.validate().unwrap();
        assert_eq!(m.segments.len(), 2);
        assert!((m.segments[1].start() - DVec3::new(0.0, 100.0, 0.0)).length() < 1e-9);
        assert_eq!(m.length, Some(200.0));
    }

    #[test]
    fn station_follows_a_gap_along_the_route() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![
                line((0.0, 0.0), (0.0, 100.0)).with_start_station(0.0),
                line((0.0, 120.0), (0.0, 200.0)).with_start_station(100.0),
            ],
        );
        m.validate().unwrap();
        assert_eq!(m.segments.len(), 3);
        assert!((m.segments[1].length() - 20.0).abs() < 1e-9);
        assert!((m.segments[2].start_station().unwrap() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn sideways_gap_moves_the_segment_onto_the_route() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![line((0.0, 0.0), (0.0, 100.0)), line((30.0, 140.0), (30.0, 240.0))],
        );
        m.validate().unwrap();
        assert_eq!(m.segments.len(), 3);
        assert!((m.segments[2].start() - DVec3::new(0.0, 150.0, 0.0)).length() < 1e-9);
        assert!(m.segments[1].bearing_in().within(Bearing::NORTH, 1e-9));
        assert!((m.segments[1].length() - 50.0).abs() < 1e-9);
        assert!(m.validate_bearings().is_ok());
    }

    #[test]
    fn short_reported_length_is_extended() {
        let meta = AlignmentMeta {
            length: Some(150.0),
            ..AlignmentMeta::default()
        };
        let mut m = model(meta, vec![line((0.0, 0.0), (100.0, 0.0))]);
        m.validate().unwrap();
        assert_eq!(m.segments.len(), 2);
        assert!((m.segments[1].end() - DVec3::new(150.0, 0.0, 0.0)).length() < 1e-9);
        assert_eq!(m.length, Some(150.0));
    }

    #[test]
    fn long_reported_length_is_trimmed() {
        let meta = AlignmentMeta {
            length: Some(80.0),
            ..AlignmentMeta::default()
        };
        let mut m = model(meta, vec![line((0.0, 0.0), (100.0, 0.0))]);
        m.validate().unwrap();
        assert_eq!(m.segments.len(), 1);
        assert_eq!(m.length, Some(100.0));
    }

    #[test]
    fn coordinates_become_datum_relative() {
        let mut m = model(
            AlignmentMeta::default(),
            vec![line((1000.0, 2000.0), (1000.0, 2100.0))],
        );
        m.validate().unwrap();
        assert_eq!(m.segments[0].start(), DVec3::ZERO);
        assert_eq!(m.reference, DVec3::new(1000.0, 2000.0, 0.0));
        assert_eq!(m.to_world(m.segments[0].end()), DVec3::new(1000.0, 2100.0, 0.0));
    }
}

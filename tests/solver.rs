use std::f64::consts::FRAC_PI_4;

use glam::DVec3;
use halign::{Arc, Bearing, EngineConfig, Rotation, Segment, SegmentInput, SolveError};

const TOL: f64 = 1e-4;

fn solve(input: &SegmentInput) -> Result<Segment, SolveError> {
    input.solve(&EngineConfig::default())
}

fn arc(input: &SegmentInput) -> Arc {
    let segment = solve(input).unwrap();
    match segment.as_arc() {
        Some(arc) => arc.clone(),
        None => panic!("expected an arc, got {segment:?}"),
    }
}

fn close(a: DVec3, b: DVec3) -> bool {
    a.distance(b) <= TOL
}

#[test]
fn line_from_both_endpoints() {
    let line = solve(
        &SegmentInput::line()
            .with_start(DVec3::ZERO)
            .with_end(DVec3::new(1000.0, 1000.0, 0.0)),
    )
    .unwrap();
    assert!((line.length() - 1414.21).abs() < 0.01);
    assert!((line.bearing_in().radians() - FRAC_PI_4).abs() < TOL);
    assert!((line.bearing_out().radians() - FRAC_PI_4).abs() < TOL);
}

#[test]
fn arc_from_points_and_radius() {
    let start = DVec3::ZERO;
    let pi = DVec3::new(500.0, 500.0, 0.0);
    let solved = arc(&SegmentInput::arc()
        .with_start(start)
        .with_pi(pi)
        .with_end(DVec3::new(1000.0, 0.0, 0.0))
        .with_radius(400.0));

    assert!((solved.delta - std::f64::consts::FRAC_PI_2).abs() < TOL);
    assert!(solved.tangent <= start.distance(pi));
    assert!((solved.center.distance(solved.core.start) - 400.0).abs() < TOL);
    assert!((solved.center.distance(solved.core.end) - 400.0).abs() < TOL);
    assert!((solved.core.length - 400.0 * solved.delta).abs() < TOL);
}

#[test]
fn arc_round_trip_without_points() {
    let reference = arc(&SegmentInput::arc()
        .with_start(DVec3::new(10.0, 20.0, 0.0))
        .with_bearing_in(Bearing::from_degrees(30.0))
        .with_delta(70f64.to_radians())
        .with_direction(Rotation::Clockwise)
        .with_radius(250.0));
    let points = [
        reference.core.start,
        reference.core.end,
        reference.center,
        reference.pi,
    ];

    // every non-empty proper subset of {start, end, center, pi}
    for mask in 1u8..15 {
        let keep = |bit: u8| (mask & (1 << bit) != 0).then_some(points[bit as usize]);
        let input = SegmentInput {
            start: keep(0),
            end: keep(1),
            center: keep(2),
            pi: keep(3),
            ..SegmentInput::arc()
                .with_radius(reference.radius)
                .with_delta(reference.delta)
                .with_direction(reference.direction)
                .with_bearing_in(reference.core.bearing_in)
                .with_bearing_out(reference.core.bearing_out)
        };
        let solved = arc(&input);

        assert!((solved.radius - reference.radius).abs() < TOL, "mask {mask}");
        assert!((solved.delta - reference.delta).abs() < TOL, "mask {mask}");
        assert!((solved.tangent - reference.tangent).abs() < TOL, "mask {mask}");
        assert!((solved.chord - reference.chord).abs() < TOL, "mask {mask}");
        assert!(solved.core.bearing_in.within(reference.core.bearing_in, TOL), "mask {mask}");
        assert!(solved.core.bearing_out.within(reference.core.bearing_out, TOL), "mask {mask}");
        assert!(close(solved.core.start, reference.core.start), "mask {mask}");
        assert!(close(solved.core.end, reference.core.end), "mask {mask}");
        assert!(close(solved.center, reference.center), "mask {mask}");
        assert!(close(solved.pi, reference.pi), "mask {mask}");
    }
}

#[test]
fn reflex_arc_round_trip_from_points() {
    for direction in [Rotation::CounterClockwise, Rotation::Clockwise] {
        let reference = arc(&SegmentInput::arc()
            .with_start(DVec3::ZERO)
            .with_bearing_in(Bearing::from_degrees(30.0))
            .with_delta(200f64.to_radians())
            .with_direction(direction)
            .with_radius(250.0));
        // the PI of a curve longer than a half turn lies behind its start
        assert!(reference.tangent < 0.0);
        let points = [
            reference.core.start,
            reference.core.end,
            reference.center,
            reference.pi,
        ];

        // every subset of at least two of {start, end, center, pi}
        for mask in (3u8..16).filter(|mask| mask.count_ones() >= 2) {
            let keep = |bit: u8| (mask & (1 << bit) != 0).then_some(points[bit as usize]);
            let solved = arc(&SegmentInput {
                start: keep(0),
                end: keep(1),
                center: keep(2),
                pi: keep(3),
                ..SegmentInput::arc()
                    .with_radius(reference.radius)
                    .with_delta(reference.delta)
                    .with_direction(direction)
            });

            assert_eq!(solved.direction, direction, "mask {mask:04b}");
            assert!((solved.delta - reference.delta).abs() < TOL, "mask {mask:04b}");
            assert!(solved.core.bearing_in.within(reference.core.bearing_in, TOL), "mask {mask:04b}");
            assert!(close(solved.core.start, reference.core.start), "mask {mask:04b}");
            assert!(close(solved.core.end, reference.core.end), "mask {mask:04b}");
            assert!(close(solved.center, reference.center), "mask {mask:04b}");
            assert!(close(solved.pi, reference.pi), "mask {mask:04b}");
        }
    }
}

#[test]
fn arc_round_trip_through_segment_input() {
    let reference = solve(&SegmentInput::arc()
        .with_center(DVec3::new(-40.0, 5.0, 0.0))
        .with_start(DVec3::new(0.0, 5.0, 0.0))
        .with_end(DVec3::new(-40.0, 45.0, 0.0)))
    .unwrap();
    let again = solve(&SegmentInput::from(&reference)).unwrap();
    assert_eq!(again, reference);
}

#[test]
fn spiral_round_trip_through_segment_input() {
    let reference = solve(&SegmentInput::spiral()
        .with_start(DVec3::new(3.0, 4.0, 0.0))
        .with_start_radius(f64::INFINITY)
        .with_end_radius(250.0)
        .with_bearing_in(Bearing::from_degrees(120.0))
        .with_theta(0.15)
        .with_direction(Rotation::CounterClockwise))
    .unwrap();
    let again = solve(&SegmentInput::from(&reference)).unwrap();
    let (spiral, expected) = (again.as_spiral().unwrap(), reference.as_spiral().unwrap());
    assert!((spiral.tan_long - expected.tan_long).abs() < TOL);
    assert!(close(again.start(), reference.start()));
    assert!(close(again.end(), reference.end()));
    assert!((again.length() - reference.length()).abs() < TOL);
    assert!(again.bearing_out().within(reference.bearing_out(), TOL));
}

#[test]
fn solve_errors_carry_diagnostic_codes() {
    use miette::Diagnostic;

    let err = solve(&SegmentInput::arc().with_start(DVec3::ZERO)).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"arc central angle cannot be determined");
    assert_eq!(
        err.code().map(|code| code.to_string()).as_deref(),
        Some("halign::solve::angle_undetermined")
    );

    let err = solve(&SegmentInput::line().with_length(10.0)).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"line needs both endpoints, or one endpoint with a bearing and a length");
}

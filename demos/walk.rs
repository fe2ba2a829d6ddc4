use glam::DVec3;
use halign::{
    AlignmentInput, AlignmentModel, Bearing, Element, EngineConfig, Method, Rotation, SegmentInput,
    Side,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let step = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<f64>().expect("step must be a number"))
        .unwrap_or(25.0);

    let input = AlignmentInput::default()
        .with_segment(
            SegmentInput::line()
                .with_start(DVec3::new(1000.0, 2000.0, 0.0))
                .with_bearing_in(Bearing::NORTH)
                .with_length(200.0)
                .with_start_station(0.0),
        )
        .with_segment(
            SegmentInput::spiral()
                .with_start_radius(f64::INFINITY)
                .with_end_radius(400.0)
                .with_theta(0.1)
                .with_direction(Rotation::Clockwise),
        )
        .with_segment(
            SegmentInput::arc()
                .with_radius(400.0)
                .with_delta(0.6)
                .with_direction(Rotation::Clockwise),
        )
        .with_segment(
            SegmentInput::spiral()
                .with_start_radius(400.0)
                .with_end_radius(f64::INFINITY)
                .with_theta(0.1)
                .with_direction(Rotation::Clockwise),
        )
        // misplaced: validation moves it onto the route
        .with_segment(
            SegmentInput::line()
                .with_start(DVec3::new(0.0, 0.0, 0.0))
                .with_bearing_in(Bearing::new(0.8))
                .with_length(150.0)
                .with_start_station(560.0),
        );

    let mut model = AlignmentModel::new(input, EngineConfig::default());
    if let Err(e) = model.validate() {
        eprintln!("Error: {}", e);
    }
    for message in model.error_messages() {
        eprintln!("{}", message);
    }

    for segment in &model.segments {
        println!(
            "{:<6} {:>10.3} .. {:>10.3}  in {}  out {}",
            segment.kind().to_string(),
            segment.internal_station().start,
            segment.internal_station().end,
            segment.bearing_in(),
            segment.bearing_out(),
        );
    }

    let mut station = 0.0;
    while let Some((point, right)) = model.orthogonal_at(station, Side::Right) {
        let world = model.to_world(point);
        println!(
            "{:>10.3}  {:>12.3} {:>12.3}  right ({:.4}, {:.4})",
            station, world.x, world.y, right.x, right.y
        );
        station += step;
        if station > model.length.unwrap_or_default() {
            break;
        }
    }

    match model.discretize(Method::Tolerance, 0.05) {
        Ok(points) => println!("{} points at 0.05 chord tolerance", points.len()),
        Err(e) => eprintln!("Error: {}", e),
    }
}

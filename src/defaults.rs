//! Default tolerances and limits (all lengths in base units, angles in radians)

/// Closeness threshold for lengths, coordinates and angles.
pub const TOLERANCE: f64 = 1e-4;

/// Base length units per document (station) unit.
pub const UNIT_SCALE: f64 = 1.0;

/// Two discretized points closer than this are the same point.
pub const COINCIDENT_EPSILON: f64 = 1e-6;

/// Upper bound on points produced for a single segment.
pub const MAX_SUBDIVISIONS: usize = 1_000_000;

/// Vectors shorter than this carry no direction.
pub const MIN_VECTOR_LENGTH: f64 = 1e-9;

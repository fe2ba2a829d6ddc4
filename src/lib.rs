//! Horizontal alignment geometry for road and rail design.
//!
//! An alignment is a chain of straight lines, circular arcs and Euler-spiral
//! transitions. Host documents usually describe each element only partially;
//! this crate
//!
//! - reconstructs every missing parameter of each element ([`segment`]),
//! - repairs the chain so bearings, coordinates and stations agree
//!   ([`AlignmentModel::validate`]),
//! - answers station queries and produces point sequences for drawing
//!   ([`discretize`]).
//!
//! ```
//! use glam::DVec3;
//! use halign::{AlignmentInput, AlignmentModel, EngineConfig, SegmentInput};
//!
//! let input = AlignmentInput::default()
//!     .with_segment(
//!         SegmentInput::line()
//!             .with_start(DVec3::ZERO)
//!             .with_end(DVec3::new(0.0, 100.0, 0.0)),
//!     )
//!     .with_segment(
//!         SegmentInput::line()
//!             .with_start(DVec3::new(0.0, 150.0, 0.0))
//!             .with_end(DVec3::new(0.0, 250.0, 0.0)),
//!     );
//! let mut model = AlignmentModel::new(input, EngineConfig::default());
//! model.validate().unwrap();
//! assert_eq!(model.segments.len(), 3);
//! ```

pub mod alignment;
pub mod config;
pub mod defaults;
pub mod discretize;
pub mod errors;
pub mod geometry;
mod log;
pub mod segment;
pub mod stationing;
pub mod types;

pub use alignment::{AlignmentInput, AlignmentMeta, AlignmentModel, Datum};
pub use config::EngineConfig;
pub use discretize::{Method, Span};
pub use errors::{AlignmentError, DiscretizeError, ParseKindError, SolveError, ValidationError};
pub use segment::{Arc, Element, Line, Segment, SegmentHash, SegmentInput, SegmentKind, Spiral};
pub use stationing::{StationDirection, StationEquation, StationEquations};
pub use types::{Bearing, InternalStation, NumericError, Rotation, Side};

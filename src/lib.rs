pub mod error;
pub mod format;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod sketch;

pub use error::{Result, SketchError};
pub use geometry::{Embedding, Segment, SegmentKind};
pub use sketch::{SegmentId, SegmentMut, SegmentRef, Sketch, VertexIndex};

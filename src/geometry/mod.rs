pub mod embedding;
pub mod segment;

pub use embedding::Embedding;
pub use segment::{Bezier, CircularArc, Line, Nurb, Segment, SegmentKind};

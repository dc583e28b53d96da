use thiserror::Error;

use crate::geometry::SegmentKind;

/// Top-level error type for the sketch engine.
#[derive(Debug, Error)]
pub enum SketchError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// An index passed to the sketch was outside the valid range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("segment index {index} is out of range (sketch has {count} segments)")]
    Segment { index: usize, count: usize },

    #[error("vertex index {index} is out of range (pool has {count} vertices)")]
    Vertex { index: usize, count: usize },

    #[error("control point index {index} is out of range (curve has {count} control points)")]
    ControlPoint { index: usize, count: usize },

    #[error("knot index {index} is out of range (curve has {count} knots)")]
    Knot { index: usize, count: usize },

    #[error("cannot insert before segment {index}: sketch has {count} segments")]
    Insert { index: usize, count: usize },
}

/// A segment handle no longer matches the sketch it was taken from.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("segment handle refers to a deleted segment")]
    Stale,

    #[error("expected a {expected} segment, found a {found}")]
    KindMismatch {
        expected: SegmentKind,
        found: SegmentKind,
    },
}

/// Errors related to geometric computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Backing storage could not grow.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("out of memory while growing {what}")]
    OutOfMemory {
        what: &'static str,
        #[source]
        source: std::collections::TryReserveError,
    },
}

/// Errors related to the serialized sketch layout.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed sketch json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid sketch record: {0}")]
    Invalid(String),
}

/// Convenience type alias for results using [`SketchError`].
pub type Result<T> = std::result::Result<T, SketchError>;

/// Reserves room for `additional` more elements or reports which store failed to grow.
pub(crate) fn reserve<T>(vec: &mut Vec<T>, additional: usize, what: &'static str) -> Result<()> {
    vec.try_reserve(additional)
        .map_err(|source| StorageError::OutOfMemory { what, source }.into())
}

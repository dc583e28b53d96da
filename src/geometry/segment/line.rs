use crate::sketch::VertexIndex;

/// A straight segment between two pool vertices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    pub(crate) start: VertexIndex,
    pub(crate) end: VertexIndex,
}

impl Line {
    /// Creates a line from two vertex indices.
    #[must_use]
    pub fn new(start: VertexIndex, end: VertexIndex) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn start(&self) -> VertexIndex {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> VertexIndex {
        self.end
    }
}

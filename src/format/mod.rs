//! Serialized sketch layout.
//!
//! A [`SketchRecord`] mirrors the stored field layout of a sketch: the embedding frame,
//! the vertex pool in index order and the ordered segments, each tagged with its kind.
//! Vertex numbering is kept exactly as written, so a record round-trips without
//! renumbering.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FormatError, Result};
use crate::geometry::{Bezier, CircularArc, Embedding, Line, Nurb, Segment};
use crate::math::{Point2, Point3, Vector3};
use crate::sketch::{CurveSequence, Sketch, VertexIndex, VertexPool};

/// Current record layout version.
pub const FORMAT_VERSION: u32 = 1;

/// The stored form of a [`Sketch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchRecord {
    pub version: u32,
    pub embedding: EmbeddingRecord,
    pub vertices: Vec<[f64; 2]>,
    pub segments: Vec<SegmentRecord>,
}

/// The stored form of an [`Embedding`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub origin: [f64; 3],
    pub plane_x: [f64; 3],
    pub plane_y: [f64; 3],
}

/// The stored form of one segment. Vertex references are pool indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentRecord {
    Line {
        start: usize,
        end: usize,
        #[serde(default)]
        reverse: bool,
    },
    CircularArc {
        start: usize,
        end: usize,
        #[serde(default)]
        center: Option<usize>,
        radius: f64,
        center_is_left: bool,
        clockwise: bool,
        #[serde(default)]
        reverse: bool,
    },
    Nurb {
        order: usize,
        control_points: Vec<usize>,
        knots: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weights: Option<Vec<f64>>,
        #[serde(default)]
        reverse: bool,
    },
    Bezier {
        control_points: Vec<usize>,
        #[serde(default)]
        reverse: bool,
    },
}

impl From<Embedding> for EmbeddingRecord {
    fn from(embedding: Embedding) -> Self {
        let origin = embedding.origin();
        let x = embedding.plane_x();
        let y = embedding.plane_y();
        Self {
            origin: [origin.x, origin.y, origin.z],
            plane_x: [x.x, x.y, x.z],
            plane_y: [y.x, y.y, y.z],
        }
    }
}

impl From<EmbeddingRecord> for Embedding {
    fn from(record: EmbeddingRecord) -> Self {
        Embedding::new(
            Point3::from(record.origin),
            Vector3::from(record.plane_x),
            Vector3::from(record.plane_y),
        )
    }
}

fn indices(refs: &[VertexIndex]) -> Vec<usize> {
    refs.iter().map(|r| r.get()).collect()
}

impl SegmentRecord {
    fn from_segment(segment: &Segment, reverse: bool) -> Self {
        match segment {
            Segment::Line(line) => Self::Line {
                start: line.start().get(),
                end: line.end().get(),
                reverse,
            },
            Segment::CircularArc(arc) => Self::CircularArc {
                start: arc.start().get(),
                end: arc.end().get(),
                center: arc.center().map(VertexIndex::get),
                radius: arc.radius(),
                center_is_left: arc.center_is_left(),
                clockwise: arc.clockwise_oriented(),
                reverse,
            },
            Segment::Nurb(nurb) => Self::Nurb {
                order: nurb.order(),
                control_points: indices(nurb.control_points()),
                knots: nurb.knots().to_vec(),
                weights: nurb.weights().map(<[f64]>::to_vec),
                reverse,
            },
            Segment::Bezier(bezier) => Self::Bezier {
                control_points: indices(bezier.control_points()),
                reverse,
            },
        }
    }

    /// Converts the record into a segment and its reverse flag, checking every vertex
    /// reference against a pool of `vertex_count` entries.
    fn into_segment(self, position: usize, vertex_count: usize) -> Result<(Segment, bool)> {
        let check = |index: usize| -> Result<VertexIndex> {
            if index < vertex_count {
                Ok(VertexIndex::new(index))
            } else {
                Err(FormatError::Invalid(format!(
                    "segment {position} references vertex {index}, pool has {vertex_count}"
                ))
                .into())
            }
        };
        let check_all =
            |refs: Vec<usize>| -> Result<Vec<VertexIndex>> { refs.into_iter().map(&check).collect() };

        Ok(match self {
            Self::Line {
                start,
                end,
                reverse,
            } => (Segment::Line(Line::new(check(start)?, check(end)?)), reverse),
            Self::CircularArc {
                start,
                end,
                center,
                radius,
                center_is_left,
                clockwise,
                reverse,
            } => {
                let mut arc =
                    CircularArc::new(check(start)?, check(end)?, radius, center_is_left, clockwise);
                if let Some(center) = center {
                    arc = arc.with_center(check(center)?);
                }
                (Segment::CircularArc(arc), reverse)
            }
            Self::Nurb {
                order,
                control_points,
                knots,
                weights,
                reverse,
            } => {
                let control_points = check_all(control_points)?;
                if weights
                    .as_ref()
                    .is_some_and(|w| w.len() != control_points.len())
                {
                    return Err(FormatError::Invalid(format!(
                        "segment {position} has a weight list that does not match its control points"
                    ))
                    .into());
                }
                (
                    Segment::Nurb(Nurb::new(order, control_points, knots, weights)),
                    reverse,
                )
            }
            Self::Bezier {
                control_points,
                reverse,
            } => (
                Segment::Bezier(Bezier::new(check_all(control_points)?)),
                reverse,
            ),
        })
    }
}

impl Sketch {
    /// Captures the sketch in its stored layout.
    #[must_use]
    pub fn to_record(&self) -> SketchRecord {
        let curve = self.curve();
        let segments = curve
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let reverse = curve.is_reversed(index).unwrap_or(false);
                SegmentRecord::from_segment(segment, reverse)
            })
            .collect();
        SketchRecord {
            version: FORMAT_VERSION,
            embedding: self.embedding().into(),
            vertices: self.pool().points().iter().map(|p| [p.x, p.y]).collect(),
            segments,
        }
    }

    /// Rebuilds a sketch from its stored layout.
    ///
    /// Vertices are loaded as written, without merging coincident entries.
    ///
    /// # Errors
    ///
    /// Returns a format error for an unknown version or a dangling vertex reference, and
    /// a storage error if the sketch cannot be allocated.
    pub fn from_record(record: SketchRecord) -> Result<Self> {
        if record.version != FORMAT_VERSION {
            return Err(FormatError::Invalid(format!(
                "unsupported sketch record version {}",
                record.version
            ))
            .into());
        }

        let mut pool = VertexPool::new();
        for [x, y] in &record.vertices {
            pool.push_raw(Point2::new(*x, *y))?;
        }

        let mut curve = CurveSequence::new();
        for (position, segment) in record.segments.into_iter().enumerate() {
            let (segment, reverse) = segment.into_segment(position, pool.len())?;
            curve.push_with_orientation(segment, reverse)?;
        }

        debug!(
            vertices = pool.len(),
            segments = curve.len(),
            "sketch loaded from record"
        );
        Ok(Sketch::from_parts(pool, curve, record.embedding.into()))
    }

    /// Serializes the sketch as JSON.
    ///
    /// # Errors
    ///
    /// Returns a format error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_record()).map_err(|e| FormatError::Json(e).into())
    }

    /// Parses a sketch from JSON produced by [`Sketch::to_json`].
    ///
    /// # Errors
    ///
    /// Returns a format error for malformed JSON or an inconsistent record.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: SketchRecord = serde_json::from_str(json).map_err(FormatError::from)?;
        Self::from_record(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SketchError;
    use crate::sketch::SegmentEdit;

    #[test]
    fn record_keeps_layout() {
        let mut sketch = Sketch::new();
        {
            let mut line = sketch.append_line().unwrap();
            line.set_end_point(Point2::new(1.0, 0.0)).unwrap();
        }
        {
            let mut arc = sketch.append_arc().unwrap();
            arc.set_start_point(Point2::new(1.0, 0.0)).unwrap();
            arc.set_radius(2.0).unwrap();
            arc.set_center(Point2::new(1.0, 2.0)).unwrap();
        }
        sketch.set_reversed(1, true).unwrap();

        let record = sketch.to_record();
        assert_eq!(record.version, FORMAT_VERSION);
        assert_eq!(record.vertices.len(), sketch.number_of_vertices());
        assert_eq!(
            record.segments[0],
            SegmentRecord::Line {
                start: 0,
                end: 1,
                reverse: false
            }
        );
        assert!(matches!(
            record.segments[1],
            SegmentRecord::CircularArc {
                center: Some(_),
                reverse: true,
                ..
            }
        ));
    }

    #[test]
    fn json_uses_type_tags() {
        let mut sketch = Sketch::new();
        sketch.append_bezier().unwrap();
        let json = sketch.to_json().unwrap();
        assert!(json.contains("\"type\": \"bezier\""));
    }

    #[test]
    fn arc_without_center_writes_null() {
        let mut sketch = Sketch::new();
        sketch.append_arc().unwrap();
        let json = sketch.to_json().unwrap();
        assert!(json.contains("\"center\": null"), "{json}");

        let loaded = Sketch::from_json(&json).unwrap();
        assert_eq!(loaded.segment(0).unwrap(), sketch.segment(0).unwrap());
    }

    #[test]
    fn missing_reverse_defaults_to_false() {
        let json = r#"{
            "version": 1,
            "embedding": { "origin": [0, 0, 0], "plane_x": [1, 0, 0], "plane_y": [0, 1, 0] },
            "vertices": [[0, 0], [1, 1]],
            "segments": [{ "type": "line", "start": 0, "end": 1 }]
        }"#;
        let sketch = Sketch::from_json(json).unwrap();
        assert!(!sketch.is_reversed(0).unwrap());
        assert_eq!(sketch.vertex(VertexIndex::new(1)).unwrap(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn dangling_reference_is_rejected() {
        let json = r#"{
            "version": 1,
            "embedding": { "origin": [0, 0, 0], "plane_x": [1, 0, 0], "plane_y": [0, 1, 0] },
            "vertices": [[0, 0]],
            "segments": [{ "type": "line", "start": 0, "end": 3 }]
        }"#;
        let err = Sketch::from_json(json).unwrap_err();
        assert!(matches!(err, SketchError::Format(FormatError::Invalid(_))));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut record = Sketch::new().to_record();
        record.version = 99;
        assert!(Sketch::from_record(record).is_err());
    }

    #[test]
    fn malformed_json_is_a_format_error() {
        let err = Sketch::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SketchError::Format(FormatError::Json(_))));
    }
}

//! Data types for points, search hits, and collection metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arbitrary JSON metadata attached to a point.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Identifier of a stored point.
///
/// The vector database accepts unsigned integers or UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    /// Numeric identifier.
    Num(u64),
    /// UUID identifier in its hyphenated string form.
    Uuid(String),
}

impl PointId {
    /// Derive a stable identifier for chunk `index` of `source`.
    ///
    /// The id is a UUID v5 of `"{source}:{index}"` in the URL namespace, so
    /// re-ingesting the same chunk overwrites the stored point.
    pub fn for_chunk(source: &str, index: usize) -> Self {
        let name = format!("{source}:{index}");
        Self::Uuid(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string())
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Uuid(s) => f.write_str(s),
        }
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl From<Uuid> for PointId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id.to_string())
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        Self::Uuid(s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        Self::Uuid(s.to_string())
    }
}

/// A vector with its identifier and payload, ready to be upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique identifier of the point.
    pub id: PointId,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Metadata stored alongside the vector. Expected to carry `text` and `source`.
    pub payload: Payload,
}

impl Point {
    /// Create a new point.
    pub fn new(id: impl Into<PointId>, vector: Vec<f32>, payload: Payload) -> Self {
        Self { id: id.into(), vector, payload }
    }
}

/// A search hit: a stored point's id and payload paired with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Identifier of the matched point, if the service returned one.
    pub id: Option<PointId>,
    /// The stored payload.
    pub payload: Payload,
    /// The similarity score (higher is more similar).
    pub score: f32,
}

/// Distance metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    /// Cosine similarity.
    Cosine,
    /// Dot product.
    Dot,
    /// Euclidean distance.
    Euclid,
    /// Manhattan distance.
    Manhattan,
}

/// Collection parameters fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Distance metric.
    pub distance: Distance,
}

impl CollectionSpec {
    /// A cosine-distance collection of the given dimensionality.
    pub fn cosine(dimensions: usize) -> Self {
        Self { dimensions, distance: Distance::Cosine }
    }
}

/// Collection metadata reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Number of points currently stored.
    pub points_count: u64,
    /// Configured vector dimensionality, when reported.
    pub dimensions: Option<usize>,
    /// Configured distance metric, when reported.
    pub distance: Option<Distance>,
}

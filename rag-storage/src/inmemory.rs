//! In-memory vector client using cosine similarity.
//!
//! This module provides [`InMemoryVectorClient`], a [`VectorClient`] backed by
//! a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and demos that should run without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::VectorClient;
use crate::error::{Result, StorageError};
use crate::point::{CollectionInfo, CollectionSpec, Point, PointId, ScoredPoint};

const BACKEND: &str = "InMemory";

#[derive(Debug)]
struct Collection {
    spec: CollectionSpec,
    points: HashMap<PointId, Point>,
}

/// An in-memory vector client ranking points by cosine similarity.
///
/// Collections are stored as nested `HashMap`s: collection name → point ID → point.
/// The client counts the similarity searches it has served, which lets
/// callers assert that a query never reached the backend.
///
/// # Example
///
/// ```rust,ignore
/// use rag_storage::{InMemoryVectorClient, StorageAdapter, StorageConfig};
///
/// let client = Arc::new(InMemoryVectorClient::new());
/// let storage = StorageAdapter::initialize(client.clone(), &config).await?;
/// assert_eq!(client.search_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorClient {
    collections: RwLock<HashMap<String, Collection>>,
    searches: AtomicUsize,
}

impl InMemoryVectorClient {
    /// Create a new empty in-memory client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of similarity searches served so far.
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn missing(collection: &str) -> StorageError {
        StorageError::ServiceError {
            backend: BACKEND.to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }

    fn check_dimensions(spec: &CollectionSpec, vector: &[f32]) -> Result<()> {
        if vector.len() != spec.dimensions {
            return Err(StorageError::ServiceError {
                backend: BACKEND.to_string(),
                message: format!(
                    "wrong vector dimension: expected {}, got {}",
                    spec.dimensions,
                    vector.len()
                ),
            });
        }
        Ok(())
    }
}

/// Cosine of the angle between `stored` and `query`, or 0.0 when either is a
/// zero vector.
fn cosine_similarity(stored: &[f32], query: &[f32]) -> f32 {
    let (dot, stored_sq, query_sq) = stored
        .iter()
        .zip(query)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, s, q), (x, y)| (dot + x * y, s + x * x, q + y * y));
    let magnitude = (stored_sq * query_sq).sqrt();
    if magnitude == 0.0 { 0.0 } else { dot / magnitude }
}

#[async_trait]
impl VectorClient for InMemoryVectorClient {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn create_collection(&self, name: &str, spec: CollectionSpec) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            return Err(StorageError::ServiceError {
                backend: BACKEND.to_string(),
                message: format!("collection '{name}' already exists"),
            });
        }
        collections.insert(name.to_string(), Collection { spec, points: HashMap::new() });
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let collections = self.collections.read().await;
        let collection = collections.get(name).ok_or_else(|| Self::missing(name))?;
        Ok(CollectionInfo {
            points_count: collection.points.len() as u64,
            dimensions: Some(collection.spec.dimensions),
            distance: Some(collection.spec.distance),
        })
    }

    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        // Reject the whole batch before touching storage.
        for point in &points {
            Self::check_dimensions(&store.spec, &point.vector)?;
        }
        for point in points {
            store.points.insert(point.id.clone(), point);
        }
        Ok(())
    }

    async fn search_points(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Self::check_dimensions(&store.spec, vector)?;

        let mut scored: Vec<ScoredPoint> = store
            .points
            .values()
            .map(|point| ScoredPoint {
                id: Some(point.id.clone()),
                payload: point.payload.clone(),
                score: cosine_similarity(&point.vector, vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }
}

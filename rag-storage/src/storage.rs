//! Storage adapter over a vector database.
//!
//! The [`StorageAdapter`] owns a [`VectorClient`], makes sure the configured
//! collection exists, upserts embedding batches, and shapes similarity search
//! results into a [`QueryResponse`].
//!
//! # Example
//!
//! ```rust,ignore
//! use rag_storage::{PointId, StorageAdapter, StorageConfig};
//!
//! let storage = StorageAdapter::connect(StorageConfig::default()).await?;
//! storage.upsert(&[PointId::for_chunk("doc.pdf", 0)], &[embedding], &[payload]).await?;
//! let response = storage.search(&query_embedding, 5).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::client::VectorClient;
use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::point::{CollectionSpec, Distance, Payload, Point, PointId};
use crate::response::QueryResponse;

/// Number of results requested by [`StorageAdapter::search_default`].
pub const DEFAULT_TOP_K: usize = 5;

/// Adapter between a RAG application and a vector database collection.
///
/// Holds only the client handle and the collection parameters; every
/// operation is a fresh round-trip and nothing is cached between calls.
pub struct StorageAdapter {
    client: Arc<dyn VectorClient>,
    collection: String,
    dimensions: usize,
}

impl std::fmt::Debug for StorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter")
            .field("collection", &self.collection)
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl StorageAdapter {
    /// Connect to Qdrant and initialize the configured collection.
    ///
    /// # Errors
    ///
    /// See [`StorageAdapter::initialize`].
    #[cfg(feature = "qdrant")]
    pub async fn connect(config: StorageConfig) -> Result<Self> {
        let client = crate::qdrant::QdrantVectorClient::connect(&config)?;
        Self::initialize(Arc::new(client), &config).await
    }

    /// Ensure the configured collection exists, creating it with cosine
    /// distance when absent.
    ///
    /// Calling this repeatedly, or from concurrent initializers, against the
    /// same collection is safe. An existing collection is reused after
    /// checking its dimensionality.
    ///
    /// # Errors
    ///
    /// - [`StorageError::ConnectionError`] if the service is unreachable
    /// - [`StorageError::ServiceError`] if creation is rejected
    /// - [`StorageError::DimensionMismatch`] if the existing collection has a
    ///   different vector size
    pub async fn initialize(client: Arc<dyn VectorClient>, config: &StorageConfig) -> Result<Self> {
        let adapter = Self {
            client,
            collection: config.collection.clone(),
            dimensions: config.dimensions,
        };
        adapter.ensure_collection().await.map_err(|e| {
            error!(collection = %adapter.collection, error = %e, "failed to initialize collection");
            e
        })?;
        Ok(adapter)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let name = self.collection.as_str();
        if !self.client.collection_exists(name).await? {
            match self.client.create_collection(name, CollectionSpec::cosine(self.dimensions)).await {
                Ok(()) => {
                    debug!(collection = name, dimensions = self.dimensions, "created collection");
                    return Ok(());
                }
                // Another initializer may have created it since the existence check.
                Err(e) => {
                    if !self.client.collection_exists(name).await.unwrap_or(false) {
                        return Err(e);
                    }
                    debug!(collection = name, "collection created concurrently");
                }
            }
        }

        let info = self.client.collection_info(name).await?;
        match info.dimensions {
            Some(actual) if actual != self.dimensions => {
                return Err(StorageError::DimensionMismatch {
                    collection: name.to_string(),
                    expected: self.dimensions,
                    actual,
                });
            }
            _ => {}
        }
        if let Some(distance) = info.distance.filter(|d| *d != Distance::Cosine) {
            warn!(collection = name, ?distance, "existing collection does not use cosine distance");
        }
        debug!(collection = name, "collection already exists, skipping creation");
        Ok(())
    }

    /// Name of the collection this adapter writes to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Vector dimensionality of the collection.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The underlying vector database client.
    pub fn client(&self) -> &Arc<dyn VectorClient> {
        &self.client
    }

    /// Upsert a batch of points given as index-aligned ids, vectors and payloads.
    ///
    /// Existing ids are overwritten. The batch is sent as a single request.
    ///
    /// # Errors
    ///
    /// - [`StorageError::ValidationError`] if the three slices differ in length
    ///   or a vector has the wrong dimensionality; nothing is sent
    /// - [`StorageError::ServiceError`] if the service rejects the batch
    pub async fn upsert(
        &self,
        ids: &[PointId],
        vectors: &[Vec<f32>],
        payloads: &[Payload],
    ) -> Result<()> {
        if ids.len() != vectors.len() || ids.len() != payloads.len() {
            return Err(StorageError::ValidationError(format!(
                "ids ({}), vectors ({}) and payloads ({}) must have equal lengths",
                ids.len(),
                vectors.len(),
                payloads.len()
            )));
        }

        let points = ids
            .iter()
            .zip(vectors)
            .zip(payloads)
            .map(|((id, vector), payload)| Point::new(id.clone(), vector.clone(), payload.clone()))
            .collect();
        self.upsert_points(points).await
    }

    /// Upsert pre-built points as a single batch.
    ///
    /// # Errors
    ///
    /// Same as [`StorageAdapter::upsert`].
    pub async fn upsert_points(&self, points: Vec<Point>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        if let Some(point) = points.iter().find(|p| p.vector.len() != self.dimensions) {
            return Err(StorageError::ValidationError(format!(
                "vector for point {} has {} dimensions, expected {}",
                point.id,
                point.vector.len(),
                self.dimensions
            )));
        }

        let count = points.len();
        self.client.upsert_points(&self.collection, points).await.map_err(|e| {
            error!(collection = %self.collection, count, error = %e, "upsert failed");
            e
        })?;

        debug!(collection = %self.collection, count, "upserted points");
        Ok(())
    }

    /// Search with [`DEFAULT_TOP_K`].
    pub async fn search_default(&self, query: &[f32]) -> Result<QueryResponse> {
        self.search(query, DEFAULT_TOP_K).await
    }

    /// Retrieve contexts and sources for the `top_k` points nearest to `query`.
    ///
    /// The result count is capped at the collection's current point count.
    /// When that cap is zero no similarity query is issued and an empty
    /// response is returned.
    ///
    /// # Errors
    ///
    /// - [`StorageError::ValidationError`] if `query` has the wrong dimensionality
    /// - [`StorageError::ServiceError`] or [`StorageError::ConnectionError`] if
    ///   the count or search request fails
    pub async fn search(&self, query: &[f32], top_k: usize) -> Result<QueryResponse> {
        if query.len() != self.dimensions {
            return Err(StorageError::ValidationError(format!(
                "query vector has {} dimensions, expected {}",
                query.len(),
                self.dimensions
            )));
        }

        let info = self.client.collection_info(&self.collection).await.map_err(|e| {
            error!(collection = %self.collection, error = %e, "failed to fetch collection info");
            e
        })?;

        let limit = effective_limit(top_k, info.points_count);
        if limit == 0 {
            info!(
                collection = %self.collection,
                points = info.points_count,
                top_k,
                "no vectors available, returning empty result"
            );
            return Ok(QueryResponse::empty());
        }

        let hits = self.client.search_points(&self.collection, query, limit).await.map_err(|e| {
            error!(collection = %self.collection, limit, error = %e, "similarity search failed");
            e
        })?;

        let response = QueryResponse::from_hits(&hits);
        debug!(
            collection = %self.collection,
            limit,
            hits = hits.len(),
            contexts = response.num_contexts(),
            "search completed"
        );
        Ok(response)
    }
}

/// Number of results to request: `top_k` bounded by the stored point count.
fn effective_limit(top_k: usize, points_count: u64) -> usize {
    usize::try_from(points_count).map_or(top_k, |count| top_k.min(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(5, 0), 0);
        assert_eq!(effective_limit(0, 10), 0);
        assert_eq!(effective_limit(10, 3), 3);
        assert_eq!(effective_limit(5, 100), 5);
    }
}

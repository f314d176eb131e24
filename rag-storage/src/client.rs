//! Client trait for the external vector database.

use async_trait::async_trait;

use crate::error::Result;
use crate::point::{CollectionInfo, CollectionSpec, Point, ScoredPoint};

/// The operations the storage adapter needs from a vector database.
///
/// Implementations wrap a concrete service client. Every method is a single
/// request/response exchange; implementations must not retry.
///
/// # Example
///
/// ```rust,ignore
/// use rag_storage::{CollectionSpec, InMemoryVectorClient, VectorClient};
///
/// let client = InMemoryVectorClient::new();
/// if !client.collection_exists("docs").await? {
///     client.create_collection("docs", CollectionSpec::cosine(384)).await?;
/// }
/// let hits = client.search_points("docs", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorClient: Send + Sync {
    /// Check whether a collection with this name exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Create a collection with fixed vector parameters.
    async fn create_collection(&self, name: &str, spec: CollectionSpec) -> Result<()>;

    /// Fetch the collection's point count and vector parameters.
    async fn collection_info(&self, name: &str) -> Result<CollectionInfo>;

    /// Insert or overwrite a batch of points by id.
    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()>;

    /// Return up to `limit` nearest points with payloads, by descending score.
    async fn search_points(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;
}

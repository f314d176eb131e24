//! # rag-storage
//!
//! Vector storage for retrieval-augmented generation, backed by
//! [Qdrant](https://qdrant.tech/).
//!
//! The [`StorageAdapter`] makes sure a cosine-distance collection exists,
//! upserts embedding batches with `text`/`source` payloads, and turns
//! similarity search results into a [`QueryResponse`] of contexts and sources.
//!
//! ## Features
//!
//! - `qdrant` (default): [`QdrantVectorClient`] over gRPC
//!
//! [`InMemoryVectorClient`] is always available for tests and demos.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rag_storage::{PointId, StorageAdapter, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = StorageAdapter::connect(StorageConfig::from_env()?).await?;
//!     storage.upsert(&[PointId::for_chunk("manual.pdf", 0)], &[embedding], &[payload]).await?;
//!     let response = storage.search(&query_embedding, 5).await?;
//!     println!("{:?}", response.contexts);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod inmemory;
pub mod point;
pub mod response;
pub mod storage;

#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use client::VectorClient;
pub use config::{StorageConfig, StorageConfigBuilder};
pub use error::{Result, StorageError};
pub use inmemory::InMemoryVectorClient;
pub use point::{CollectionInfo, CollectionSpec, Distance, Payload, Point, PointId, ScoredPoint};
pub use response::QueryResponse;
pub use storage::{DEFAULT_TOP_K, StorageAdapter};

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorClient;

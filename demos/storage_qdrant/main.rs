//! # Storage Qdrant Example
//!
//! Connects to a running Qdrant server, ensures the collection exists,
//! upserts two points and runs a nearest-neighbour query.
//!
//! Configuration comes from `QDRANT_URL`, `QDRANT_COLLECTION`,
//! `QDRANT_TIMEOUT_SECS` and `QDRANT_API_KEY`. The demo vectors are
//! 3-dimensional, so `QDRANT_DIMENSIONS` is ignored.
//!
//! Start Qdrant: `docker run -p 6334:6334 qdrant/qdrant`
//! Run: `cargo run --example storage_qdrant`

use rag_storage::{Payload, PointId, StorageAdapter, StorageConfig};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn payload(value: serde_json::Value) -> anyhow::Result<Payload> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("payload must be a JSON object, got {other}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = StorageConfig::from_env()?;
    config.dimensions = 3;
    if std::env::var("QDRANT_COLLECTION").is_err() {
        config.collection = "rag_storage_demo".to_string();
    }
    info!(url = %config.url, collection = %config.collection, "connecting to qdrant");

    let storage = StorageAdapter::connect(config).await?;

    storage
        .upsert(
            &[PointId::Num(1), PointId::Num(2)],
            &[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            &[
                payload(json!({"text": "a", "source": "doc1"}))?,
                payload(json!({"text": "b", "source": "doc2"}))?,
            ],
        )
        .await?;

    let response = storage.search(&[1.0, 0.0, 0.0], 1).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

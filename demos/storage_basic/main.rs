//! # Storage Basic Example
//!
//! Upserts a few document chunks and queries them through [`StorageAdapter`].
//!
//! Uses `InMemoryVectorClient` and a deterministic hash-based embedding so it
//! runs with **no Qdrant server and no API keys**.
//!
//! Run: `cargo run --example storage_basic`

use std::sync::Arc;

use rag_storage::{InMemoryVectorClient, Payload, PointId, StorageAdapter, StorageConfig};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const DIMENSIONS: usize = 64;

/// Deterministic embedding: hash the text bytes, then spread the hash over a
/// normalised vector whose direction depends on the content.
fn mock_embed(text: &str) -> Vec<f32> {
    let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    let mut emb = vec![0.0f32; DIMENSIONS];
    for (i, v) in emb.iter_mut().enumerate() {
        *v = ((hash.wrapping_add(i as u64)) as f32).sin();
    }
    let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        emb.iter_mut().for_each(|x| *x /= norm);
    }
    emb
}

fn chunk_payload(text: &str, source: &str) -> Payload {
    let mut payload = Payload::new();
    payload.insert("text".into(), json!(text));
    payload.insert("source".into(), json!(source));
    payload
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rag_storage=debug")),
        )
        .init();

    // -- 1. Initialize the collection -------------------------------------
    let config = StorageConfig::builder().collection("handbook").dimensions(DIMENSIONS).build()?;
    let client = Arc::new(InMemoryVectorClient::new());
    let storage = StorageAdapter::initialize(client.clone(), &config).await?;

    // Searching before anything is stored short-circuits without a query.
    let empty = storage.search(&mock_embed("anything"), 5).await?;
    println!("Empty collection → {} context(s)", empty.num_contexts());

    // -- 2. Upsert chunks -------------------------------------------------
    let chunks = [
        ("handbook.pdf", "Rust achieves memory safety without a garbage collector."),
        ("handbook.pdf", "Ownership rules are checked by the borrow checker at compile time."),
        ("faq.pdf", "Qdrant stores vectors with payloads and serves nearest-neighbour queries."),
    ];

    let ids: Vec<PointId> =
        chunks.iter().enumerate().map(|(i, (source, _))| PointId::for_chunk(source, i)).collect();
    let vectors: Vec<Vec<f32>> = chunks.iter().map(|(_, text)| mock_embed(text)).collect();
    let payloads: Vec<Payload> =
        chunks.iter().map(|(source, text)| chunk_payload(text, source)).collect();
    storage.upsert(&ids, &vectors, &payloads).await?;
    println!("Upserted {} chunk(s) into '{}'", ids.len(), storage.collection());

    // -- 3. Query ---------------------------------------------------------
    // Querying with a stored chunk's own text returns that chunk first.
    for (_, text) in &chunks {
        let response = storage.search(&mock_embed(text), 2).await?;
        println!("\nQuery: \"{text}\"");
        for (i, context) in response.contexts.iter().enumerate() {
            println!("  {}. {context}", i + 1);
        }
        println!("  sources: {}", serde_json::to_string(&response.sources)?);
    }

    println!("\nSimilarity queries issued: {}", client.search_count());
    Ok(())
}

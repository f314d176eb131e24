//! Shaping search hits into a contexts/sources response.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::point::{Payload, ScoredPoint};

/// Payload field holding the chunk text.
pub const TEXT_FIELD: &str = "text";
/// Payload field holding the originating document name.
pub const SOURCE_FIELD: &str = "source";

/// Retrieved context for a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Chunk texts in descending similarity order.
    pub contexts: Vec<String>,
    /// Distinct sources of the retrieved points.
    pub sources: BTreeSet<String>,
}

impl QueryResponse {
    /// An empty response.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a response from hits ordered by descending score.
    ///
    /// A hit with text always records its source, `""` when absent. A hit
    /// without text adds nothing to `contexts` and records only a non-empty source.
    pub fn from_hits<'a>(hits: impl IntoIterator<Item = &'a ScoredPoint>) -> Self {
        let mut response = Self::empty();
        for hit in hits {
            let text = string_field(&hit.payload, TEXT_FIELD);
            let source = string_field(&hit.payload, SOURCE_FIELD);
            if !text.is_empty() {
                response.contexts.push(text.to_string());
                response.sources.insert(source.to_string());
            } else if !source.is_empty() {
                response.sources.insert(source.to_string());
            }
        }
        response
    }

    /// Number of retrieved contexts.
    pub fn num_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// Returns `true` if nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty() && self.sources.is_empty()
    }
}

fn string_field<'a>(payload: &'a Payload, key: &str) -> &'a str {
    payload.get(key).and_then(serde_json::Value::as_str).unwrap_or_default()
}

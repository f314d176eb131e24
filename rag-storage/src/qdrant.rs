//! Qdrant vector client.
//!
//! Provides [`QdrantVectorClient`] which implements [`VectorClient`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use rag_storage::qdrant::QdrantVectorClient;
//!
//! let client = QdrantVectorClient::connect(&StorageConfig::default())?;
//! let exists = client.collection_exists("docs").await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_config::Config as VectorsConfigKind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance as QdrantDistance, PointId as QdrantPointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParams,
    VectorParamsBuilder,
};
use qdrant_client::{Payload as QdrantPayload, Qdrant, QdrantError};
use tracing::debug;

use crate::client::VectorClient;
use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::point::{CollectionInfo, CollectionSpec, Distance, Payload, Point, PointId, ScoredPoint};

const BACKEND: &str = "qdrant";

// gRPC status codes that mean the request never got a server answer.
const GRPC_CANCELLED: i32 = 1;
const GRPC_DEADLINE_EXCEEDED: i32 = 4;
const GRPC_UNAVAILABLE: i32 = 14;

/// A [`VectorClient`] backed by [Qdrant](https://qdrant.tech/).
///
/// Wraps a [`qdrant_client::Qdrant`] client. The underlying channel is safe to
/// share, so one client can serve concurrent callers.
pub struct QdrantVectorClient {
    client: Qdrant,
    endpoint: String,
}

impl QdrantVectorClient {
    /// Build a client for the configured endpoint, timeout and API key.
    ///
    /// The gRPC channel connects lazily; an unreachable endpoint surfaces as
    /// [`StorageError::ConnectionError`] on the first request.
    pub fn connect(config: &StorageConfig) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.url)
            .timeout(config.timeout())
            .connect_timeout(config.timeout());
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("invalid qdrant client configuration: {e}"))
        })?;
        Ok(Self { client, endpoint: config.url.clone() })
    }

    /// Create a client from an existing [`Qdrant`] handle.
    pub fn from_client(client: Qdrant, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }

    fn map_err(&self, e: QdrantError) -> StorageError {
        Self::classify(&self.endpoint, e)
    }

    fn classify(endpoint: &str, e: QdrantError) -> StorageError {
        match e {
            QdrantError::ResponseError { status, .. }
                if matches!(
                    status.code() as i32,
                    GRPC_CANCELLED | GRPC_DEADLINE_EXCEEDED | GRPC_UNAVAILABLE
                ) =>
            {
                StorageError::ConnectionError {
                    endpoint: endpoint.to_string(),
                    message: status.message().to_string(),
                }
            }
            other => {
                StorageError::ServiceError { backend: BACKEND.to_string(), message: other.to_string() }
            }
        }
    }
}

fn convert_distance(distance: Distance) -> QdrantDistance {
    match distance {
        Distance::Cosine => QdrantDistance::Cosine,
        Distance::Dot => QdrantDistance::Dot,
        Distance::Euclid => QdrantDistance::Euclid,
        Distance::Manhattan => QdrantDistance::Manhattan,
    }
}

fn distance_from_params(params: &VectorParams) -> Option<Distance> {
    match params.distance() {
        QdrantDistance::Cosine => Some(Distance::Cosine),
        QdrantDistance::Dot => Some(Distance::Dot),
        QdrantDistance::Euclid => Some(Distance::Euclid),
        QdrantDistance::Manhattan => Some(Distance::Manhattan),
        _ => None,
    }
}

fn convert_point_id(id: PointId) -> QdrantPointId {
    match id {
        PointId::Num(n) => n.into(),
        PointId::Uuid(s) => s.into(),
    }
}

fn point_id_from_qdrant(id: &QdrantPointId) -> Option<PointId> {
    match &id.point_id_options {
        Some(PointIdOptions::Num(n)) => Some(PointId::Num(*n)),
        Some(PointIdOptions::Uuid(s)) => Some(PointId::Uuid(s.clone())),
        None => None,
    }
}

/// Convert a Qdrant payload value into JSON.
fn value_to_json(value: QdrantValue) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => serde_json::Value::Object(payload_to_json(s.fields)),
    }
}

fn payload_to_json(fields: HashMap<String, QdrantValue>) -> Payload {
    fields.into_iter().map(|(k, v)| (k, value_to_json(v))).collect()
}

#[async_trait]
impl VectorClient for QdrantVectorClient {
    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.client.collection_exists(name).await.map_err(|e| self.map_err(e))
    }

    async fn create_collection(&self, name: &str, spec: CollectionSpec) -> Result<()> {
        self.client
            .create_collection(CreateCollectionBuilder::new(name).vectors_config(
                VectorParamsBuilder::new(spec.dimensions as u64, convert_distance(spec.distance)),
            ))
            .await
            .map_err(|e| self.map_err(e))?;

        debug!(collection = name, dimensions = spec.dimensions, "created qdrant collection");
        Ok(())
    }

    async fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let response = self.client.collection_info(name).await.map_err(|e| self.map_err(e))?;
        let info = response.result.ok_or_else(|| StorageError::ServiceError {
            backend: BACKEND.to_string(),
            message: format!("no info returned for collection '{name}'"),
        })?;

        // Named-vector collections report a map; only a single unnamed vector is inspected.
        let params = info
            .config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|v| match &v.config {
                Some(VectorsConfigKind::Params(params)) => Some(params),
                _ => None,
            });

        Ok(CollectionInfo {
            points_count: info.points_count.unwrap_or_default(),
            dimensions: params.map(|p| p.size as usize),
            distance: params.and_then(distance_from_params),
        })
    }

    async fn upsert_points(&self, collection: &str, points: Vec<Point>) -> Result<()> {
        let count = points.len();
        let points = points
            .into_iter()
            .map(|point| {
                let payload = QdrantPayload::try_from(serde_json::Value::Object(point.payload))
                    .map_err(|e| self.map_err(e))?;
                Ok(PointStruct::new(convert_point_id(point.id), point.vector, payload))
            })
            .collect::<Result<Vec<PointStruct>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| self.map_err(e))?;

        debug!(collection, count, "upserted points to qdrant");
        Ok(())
    }

    async fn search_points(
        &self,
        collection: &str,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, vector.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(response
            .result
            .into_iter()
            .map(|scored| ScoredPoint {
                id: scored.id.as_ref().and_then(point_id_from_qdrant),
                payload: payload_to_json(scored.payload),
                score: scored.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use qdrant_client::qdrant::{ListValue, Struct};
    use serde_json::json;

    use super::*;

    fn value(kind: Kind) -> QdrantValue {
        QdrantValue { kind: Some(kind) }
    }

    #[test]
    fn test_value_to_json_scalars() {
        assert_eq!(value_to_json(value(Kind::StringValue("doc1".into()))), json!("doc1"));
        assert_eq!(value_to_json(value(Kind::IntegerValue(-3))), json!(-3));
        assert_eq!(value_to_json(value(Kind::DoubleValue(0.5))), json!(0.5));
        assert_eq!(value_to_json(value(Kind::DoubleValue(f64::NAN))), json!(null));
        assert_eq!(value_to_json(value(Kind::BoolValue(true))), json!(true));
        assert_eq!(value_to_json(QdrantValue { kind: None }), json!(null));
    }

    #[test]
    fn test_payload_to_json_nested() {
        let nested = Struct {
            fields: HashMap::from([("page".to_string(), value(Kind::IntegerValue(4)))]),
        };
        let list = ListValue { values: vec![value(Kind::StringValue("a".into()))] };
        let payload = payload_to_json(HashMap::from([
            ("text".to_string(), value(Kind::StringValue("hello".into()))),
            ("meta".to_string(), value(Kind::StructValue(nested))),
            ("tags".to_string(), value(Kind::ListValue(list))),
        ]));

        assert_eq!(
            serde_json::Value::Object(payload),
            json!({"text": "hello", "meta": {"page": 4}, "tags": ["a"]})
        );
    }

    #[test]
    fn test_point_id_conversion() {
        let num = convert_point_id(PointId::Num(9));
        assert_eq!(point_id_from_qdrant(&num), Some(PointId::Num(9)));

        let uuid = PointId::for_chunk("doc.pdf", 2);
        assert_eq!(point_id_from_qdrant(&convert_point_id(uuid.clone())), Some(uuid));
    }

    #[test]
    fn test_distance_conversion() {
        let params = VectorParams {
            size: 3,
            distance: convert_distance(Distance::Dot).into(),
            ..Default::default()
        };
        assert_eq!(distance_from_params(&params), Some(Distance::Dot));

        let unknown = VectorParams { size: 3, ..Default::default() };
        assert_eq!(distance_from_params(&unknown), None);
    }

    fn response_error(status: tonic::Status) -> QdrantError {
        QdrantError::ResponseError { status }
    }

    #[test]
    fn test_transport_statuses_are_connection_errors() {
        for status in [
            tonic::Status::unavailable("connection refused"),
            tonic::Status::deadline_exceeded("timed out"),
            tonic::Status::cancelled("request cancelled"),
        ] {
            let message = status.message().to_string();
            let err = QdrantVectorClient::classify("http://localhost:6334", response_error(status));
            assert!(err.is_connection(), "expected connection error, got {err:?}");
            assert!(matches!(
                err,
                StorageError::ConnectionError { ref endpoint, message: ref m }
                    if endpoint == "http://localhost:6334" && *m == message
            ));
        }
    }

    #[test]
    fn test_rejected_requests_are_service_errors() {
        let err = QdrantVectorClient::classify(
            "http://localhost:6334",
            response_error(tonic::Status::invalid_argument("wrong vector dimension")),
        );
        assert!(!err.is_connection());
        assert!(matches!(err, StorageError::ServiceError { ref backend, .. } if backend == "qdrant"));
    }

    #[test]
    fn test_non_transport_errors_are_service_errors() {
        let err = QdrantVectorClient::classify(
            "http://localhost:6334",
            QdrantError::ConversionError("bad payload".into()),
        );
        assert!(matches!(err, StorageError::ServiceError { ref backend, .. } if backend == "qdrant"));
    }
}

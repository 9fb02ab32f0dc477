//! Qdrant-backed [`VectorStore`].
//!
//! Collections and points go over gRPC through `qdrant-client`. Snapshots
//! use the REST API, which streams the archive bytes directly.
//!
//! Each namespace is one Qdrant collection.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, ListValue, PointId, PointStruct, SearchPointsBuilder,
    Struct, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use reqwest::Url;
use serde::Deserialize;

use memorb_core::memory::vector::VectorStore;
use memorb_types::config::VectorStoreConfig;
use memorb_types::error::RepositoryError;
use memorb_types::memory::{
    DistanceMetric, MemoryPoint, NamespaceSpec, ScoredPoint, SnapshotArchive,
};
use memorb_types::tenant::Namespace;

pub struct QdrantVectorStore {
    client: Qdrant,
    http: reqwest::Client,
    rest_base: Url,
}

impl QdrantVectorStore {
    /// Build a store from the vector-store config. No connection is made yet.
    pub fn new(config: &VectorStoreConfig) -> Result<Self, RepositoryError> {
        let client = Qdrant::from_url(&config.grpc_url())
            .build()
            .map_err(|e| RepositoryError::Connection(format!("failed to create Qdrant client: {e}")))?;
        let rest_base = Url::parse(&config.rest_url())
            .map_err(|e| RepositoryError::Connection(format!("invalid Qdrant REST url: {e}")))?;
        Ok(Self {
            client,
            http: reqwest::Client::new(),
            rest_base,
        })
    }

    /// `{rest}/collections/{namespace}/snapshots[/extra]`, with the namespace
    /// percent-encoded as one path segment.
    fn snapshots_url(&self, namespace: &Namespace, extra: Option<&str>) -> Result<Url, RepositoryError> {
        let mut url = self.rest_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RepositoryError::Connection("Qdrant REST url cannot be a base".into()))?;
            segments.pop_if_empty();
            segments.push("collections");
            segments.push(namespace.as_str());
            segments.push("snapshots");
            if let Some(extra) = extra {
                segments.push(extra);
            }
        }
        Ok(url)
    }

    async fn create_collection(&self, namespace: &Namespace, spec: NamespaceSpec) -> Result<(), RepositoryError> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(namespace.as_str())
                    .vectors_config(VectorParamsBuilder::new(spec.dims, to_distance(spec.distance))),
            )
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to create collection {namespace}: {e}")))?;
        tracing::info!(namespace = %namespace, dims = spec.dims, distance = %spec.distance, "created collection");
        Ok(())
    }

    async fn exists(&self, namespace: &Namespace) -> Result<bool, RepositoryError> {
        self.client
            .collection_exists(namespace.as_str())
            .await
            .map_err(|e| RepositoryError::Connection(format!("failed to check collection {namespace}: {e}")))
    }
}

fn to_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Dot => Distance::Dot,
        DistanceMetric::Euclid => Distance::Euclid,
    }
}

fn point_id_string(id: Option<PointId>) -> String {
    match id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

/// JSON payload value to Qdrant's protobuf value.
pub(crate) fn json_to_value(json: serde_json::Value) -> Value {
    let kind = match json {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Kind::StringValue(s),
        serde_json::Value::Array(items) => Kind::ListValue(ListValue {
            values: items.into_iter().map(json_to_value).collect(),
        }),
        serde_json::Value::Object(map) => Kind::StructValue(Struct {
            fields: map.into_iter().map(|(k, v)| (k, json_to_value(v))).collect(),
        }),
    };
    Value { kind: Some(kind) }
}

/// Qdrant's protobuf value back to JSON.
pub(crate) fn value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => b.into(),
        Some(Kind::IntegerValue(i)) => i.into(),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => s.into(),
        Some(Kind::ListValue(list)) => list.values.into_iter().map(value_to_json).collect(),
        Some(Kind::StructValue(st)) => serde_json::Value::Object(
            st.fields.into_iter().map(|(k, v)| (k, value_to_json(v))).collect(),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotCreated {
    result: SnapshotDescription,
}

#[derive(Debug, Deserialize)]
struct SnapshotDescription {
    name: String,
}

async fn check_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::Snapshot(format!("{action} failed with HTTP {status}: {body}")))
}

impl VectorStore for QdrantVectorStore {
    async fn ensure_namespace(&self, namespace: &Namespace, spec: NamespaceSpec) -> Result<(), RepositoryError> {
        if self.exists(namespace).await? {
            tracing::debug!(namespace = %namespace, "collection already exists");
            return Ok(());
        }
        self.create_collection(namespace, spec).await
    }

    async fn recreate_namespace(&self, namespace: &Namespace, spec: NamespaceSpec) -> Result<(), RepositoryError> {
        if self.exists(namespace).await? {
            self.delete_namespace(namespace).await?;
        }
        self.create_collection(namespace, spec).await
    }

    async fn delete_namespace(&self, namespace: &Namespace) -> Result<(), RepositoryError> {
        self.client
            .delete_collection(namespace.as_str())
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to delete collection {namespace}: {e}")))?;
        tracing::info!(namespace = %namespace, "deleted collection");
        Ok(())
    }

    async fn search(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, RepositoryError> {
        let response = self
            .client
            .search_points(SearchPointsBuilder::new(namespace.as_str(), vector, limit).with_payload(true))
            .await
            .map_err(|e| RepositoryError::Query(format!("search in {namespace} failed: {e}")))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point_id_string(point.id),
                score: point.score,
                payload: point
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, value_to_json(v)))
                    .collect(),
            })
            .collect())
    }

    async fn upsert(&self, namespace: &Namespace, points: Vec<MemoryPoint>) -> Result<(), RepositoryError> {
        let count = points.len();
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                let payload: HashMap<String, Value> = p
                    .payload
                    .into_iter()
                    .map(|(k, v)| (k, json_to_value(v)))
                    .collect();
                PointStruct::new(p.id.to_string(), p.vector, payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(namespace.as_str(), points).wait(true))
            .await
            .map_err(|e| RepositoryError::Query(format!("upsert into {namespace} failed: {e}")))?;
        tracing::debug!(namespace = %namespace, count, "upserted points");
        Ok(())
    }

    async fn export_snapshot(&self, namespace: &Namespace) -> Result<SnapshotArchive, RepositoryError> {
        let mut create_url = self.snapshots_url(namespace, None)?;
        create_url.query_pairs_mut().append_pair("wait", "true");

        let response = self
            .http
            .post(create_url)
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        let created: SnapshotCreated = check_status(response, "snapshot creation")
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Snapshot(format!("unexpected snapshot response: {e}")))?;
        let name = created.result.name;
        tracing::info!(namespace = %namespace, snapshot = %name, "created snapshot");

        let response = self
            .http
            .get(self.snapshots_url(namespace, Some(&name))?)
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        let bytes = check_status(response, "snapshot download")
            .await?
            .bytes()
            .await
            .map_err(|e| RepositoryError::Snapshot(format!("snapshot download interrupted: {e}")))?;

        Ok(SnapshotArchive {
            name,
            bytes: bytes.to_vec(),
        })
    }

    async fn import_snapshot(&self, namespace: &Namespace, archive: SnapshotArchive) -> Result<(), RepositoryError> {
        let mut url = self.snapshots_url(namespace, Some("upload"))?;
        url.query_pairs_mut()
            .append_pair("wait", "true")
            .append_pair("priority", "snapshot");

        let size = archive.bytes.len();
        let part = reqwest::multipart::Part::bytes(archive.bytes)
            .file_name(archive.name)
            .mime_str("application/octet-stream")
            .map_err(|e| RepositoryError::Snapshot(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("snapshot", part);

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        check_status(response, "snapshot upload").await?;
        tracing::info!(namespace = %namespace, size, "restored snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> QdrantVectorStore {
        QdrantVectorStore::new(&VectorStoreConfig::default()).unwrap()
    }

    #[test]
    fn test_snapshot_urls_encode_namespace() {
        let store = store();
        let ns = Namespace::from_raw("memory_orb_team/a b");
        let url = store.snapshots_url(&ns, Some("upload")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:6333/collections/memory_orb_team%2Fa%20b/snapshots/upload"
        );
        let url = store.snapshots_url(&Namespace::from_raw("memory_orb_alice"), None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:6333/collections/memory_orb_alice/snapshots");
    }

    #[test]
    fn test_payload_value_conversion_round_trip() {
        let payload = json!({
            "conversation": "HUMAN: hi",
            "context_tags": ["a", "b"],
            "count": 3,
            "score": 0.5,
            "nested": {"ok": true, "none": null}
        });
        let back = value_to_json(json_to_value(payload.clone()));
        assert_eq!(back, payload);
    }

    #[test]
    fn test_point_id_string() {
        let id = PointId {
            point_id_options: Some(PointIdOptions::Num(7)),
        };
        assert_eq!(point_id_string(Some(id)), "7");
        assert_eq!(point_id_string(None), "");
    }

    #[tokio::test]
    #[ignore = "requires a running Qdrant on localhost"]
    async fn test_live_namespace_lifecycle() {
        let store = store();
        let ns = Namespace::from_raw("memorb_test_lifecycle");
        let spec = NamespaceSpec {
            dims: 4,
            distance: DistanceMetric::Cosine,
        };
        store.recreate_namespace(&ns, spec).await.unwrap();

        let mut payload = serde_json::Map::new();
        payload.insert("memory".into(), "likes tea".into());
        store
            .upsert(
                &ns,
                vec![MemoryPoint {
                    id: uuid::Uuid::now_v7(),
                    vector: vec![0.1, 0.2, 0.3, 0.4],
                    payload,
                }],
            )
            .await
            .unwrap();

        let hits = store.search(&ns, vec![0.1, 0.2, 0.3, 0.4], 5).await.unwrap();
        assert_eq!(hits[0].payload["memory"], "likes tea");

        let archive = store.export_snapshot(&ns).await.unwrap();
        assert!(!archive.bytes.is_empty());
        store.import_snapshot(&ns, archive).await.unwrap();

        store.delete_namespace(&ns).await.unwrap();
    }
}

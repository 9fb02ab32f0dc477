//! Memory types for memorb.
//!
//! These types model what flows in and out of a tenant's vector namespace:
//! points to upsert, scored search hits, and opaque snapshot archives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Distance metric of a vector namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    Cosine,
    Dot,
    Euclid,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Cosine => write!(f, "cosine"),
            DistanceMetric::Dot => write!(f, "dot"),
            DistanceMetric::Euclid => write!(f, "euclid"),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "dot" => Ok(DistanceMetric::Dot),
            "euclid" | "euclidean" => Ok(DistanceMetric::Euclid),
            other => Err(format!("invalid distance metric: '{other}'")),
        }
    }
}

/// Shape of a namespace: vector dimensionality plus distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSpec {
    pub dims: u64,
    pub distance: DistanceMetric,
}

/// A point to write into a namespace.
///
/// `payload` is stored alongside the vector and returned by searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl MemoryPoint {
    /// A point holding one remembered fact for a tenant.
    pub fn fact(tenant: &str, fact: &str, vector: Vec<f32>, created_at: DateTime<Utc>) -> Self {
        let mut payload = serde_json::Map::new();
        payload.insert("memory".into(), fact.into());
        payload.insert("user_id".into(), tenant.into());
        payload.insert("created_at".into(), created_at.to_rfc3339().into());
        Self {
            id: Uuid::now_v7(),
            vector,
            payload,
        }
    }
}

/// One similarity-search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// A remembered fact returned by a memory session search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: String,
    pub memory: String,
    pub score: f32,
}

impl MemoryHit {
    /// Convert a raw search result; `None` if the payload carries no `memory` text.
    pub fn from_scored(point: ScoredPoint) -> Option<Self> {
        let memory = point.payload.get("memory")?.as_str()?.to_string();
        Some(Self {
            id: point.id,
            memory,
            score: point.score,
        })
    }
}

/// Opaque snapshot of one namespace, as produced by the vector store.
#[derive(Clone, Serialize, Deserialize)]
pub struct SnapshotArchive {
    /// File name reported by the store (used as the download name).
    pub name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SnapshotArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotArchive")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_point_payload() {
        let point = MemoryPoint::fact("alice", "Alice likes tea", vec![0.1, 0.2], Utc::now());
        assert_eq!(point.payload["memory"], "Alice likes tea");
        assert_eq!(point.payload["user_id"], "alice");
        assert!(point.payload.contains_key("created_at"));
    }

    #[test]
    fn test_memory_hit_requires_memory_text() {
        let mut payload = serde_json::Map::new();
        payload.insert("memory".into(), "likes tea".into());
        let hit = MemoryHit::from_scored(ScoredPoint {
            id: "p1".into(),
            score: 0.9,
            payload,
        })
        .unwrap();
        assert_eq!(hit.memory, "likes tea");

        let missing = MemoryHit::from_scored(ScoredPoint {
            id: "p2".into(),
            score: 0.5,
            payload: serde_json::Map::new(),
        });
        assert!(missing.is_none());
    }

    #[test]
    fn test_distance_metric_parse() {
        assert_eq!("Cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert_eq!("euclidean".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclid);
        assert!("manhattan".parse::<DistanceMetric>().is_err());
    }

    #[test]
    fn test_snapshot_debug_hides_bytes() {
        let snap = SnapshotArchive {
            name: "memory_orb_alice-1.snapshot".into(),
            bytes: vec![0u8; 42],
        };
        let dbg = format!("{snap:?}");
        assert!(dbg.contains("len: 42"));
    }
}

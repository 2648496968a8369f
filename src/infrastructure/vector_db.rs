use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub use qdrant_client;
use self::qdrant_client::qdrant::value::Kind as QdrantValueKind;
use self::qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeleteCollectionBuilder, Distance, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use self::qdrant_client::{Payload, Qdrant};

use crate::domain::document::SearchResult;
use crate::domain::vector_repository::VectorRepository;

const PAYLOAD_SOURCE: &str = "source";
const PAYLOAD_CHUNK_INDEX: &str = "chunk_index";
const PAYLOAD_CONTENT: &str = "content_chunk";

/// Payload stored next to every vector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub source: String,
    pub chunk_index: usize,
    pub content_chunk: String,
}

/// A chunk and its embedding, ready to become a Qdrant point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentToUpsert {
    pub source: String,
    pub chunk_index: usize,
    pub content_chunk: String,
    pub vector: Vec<f32>,
}

pub struct VectorDb {
    client: Box<Qdrant>,
    collection_name: String,
    vector_size: u64,
}

impl VectorDb {
    /// Wraps a Qdrant client for a single collection of `vector_size`-dimensional cosine vectors.
    pub fn new(client: Box<Qdrant>, collection_name: String, vector_size: u64) -> Result<Self> {
        if collection_name.is_empty() {
            return Err(anyhow!("Collection name cannot be empty"));
        }
        if vector_size == 0 {
            return Err(anyhow!("Vector size must be greater than zero"));
        }
        Ok(Self {
            client,
            collection_name,
            vector_size,
        })
    }

    /// Connects to the Qdrant server at `url`.
    pub fn connect(url: &str, collection_name: String, vector_size: u64) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .build()
            .with_context(|| format!("Failed to create Qdrant client for {}", url))?;
        Self::new(Box::new(client), collection_name, vector_size)
    }

    /// Creates the collection if it doesn't exist yet.
    pub async fn initialize_collection(&self) -> Result<()> {
        log::info!("Checking if collection '{}' exists...", self.collection_name);
        let exists = self
            .client
            .collection_exists(&self.collection_name)
            .await
            .with_context(|| format!("Failed to check collection '{}'", self.collection_name))?;

        if exists {
            log::info!("Collection '{}' already exists.", self.collection_name);
            Ok(())
        } else {
            self.create_collection_internal().await
        }
    }

    /// Drops the collection (if present) and creates it again, empty.
    pub async fn reset_collection(&self) -> Result<()> {
        let exists = self
            .client
            .collection_exists(&self.collection_name)
            .await
            .with_context(|| format!("Failed to check collection '{}'", self.collection_name))?;
        if exists {
            log::warn!("Deleting collection '{}'...", self.collection_name);
            self.client
                .delete_collection(DeleteCollectionBuilder::new(self.collection_name.clone()))
                .await
                .with_context(|| format!("Failed to delete collection '{}'", self.collection_name))?;
        }
        self.create_collection_internal().await
    }

    async fn create_collection_internal(&self) -> Result<()> {
        log::info!(
            "Creating collection '{}' with size {} and distance Cosine...",
            self.collection_name,
            self.vector_size
        );
        let create_builder = CreateCollectionBuilder::new(self.collection_name.clone())
            .vectors_config(VectorParamsBuilder::new(self.vector_size, Distance::Cosine));

        match self.client.create_collection(create_builder).await {
            Ok(_) => {
                log::info!("Successfully created collection '{}'.", self.collection_name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to create collection '{}': {}", self.collection_name, e);
                Err(anyhow!("Failed to create collection: {}", e))
            }
        }
    }

    fn to_point(&self, doc: &DocumentToUpsert) -> Result<PointStruct> {
        if doc.vector.len() as u64 != self.vector_size {
            return Err(anyhow!(
                "Vector dimension ({}) for chunk {} of '{}' does not match collection dimension ({})",
                doc.vector.len(),
                doc.chunk_index,
                doc.source,
                self.vector_size
            ));
        }
        let payload_value = serde_json::to_value(DocumentPayload {
            source: doc.source.clone(),
            chunk_index: doc.chunk_index,
            content_chunk: doc.content_chunk.clone(),
        })?;
        let payload = Payload::try_from(payload_value)
            .map_err(|e| anyhow!("Failed to convert payload for '{}': {}", doc.source, e))?;

        Ok(PointStruct::new(
            Uuid::new_v4().to_string(),
            doc.vector.clone(),
            payload,
        ))
    }

    pub async fn upsert_documents_impl(&self, documents: &[DocumentToUpsert]) -> Result<()> {
        if documents.is_empty() {
            log::info!("No documents provided for upsert.");
            return Ok(());
        }

        let points = documents
            .iter()
            .map(|doc| self.to_point(doc))
            .collect::<Result<Vec<_>>>()?;

        let points_count = points.len();
        log::info!(
            "Upserting {} points into collection '{}'...",
            points_count,
            self.collection_name
        );

        let upsert_builder = UpsertPointsBuilder::new(self.collection_name.clone(), points).wait(true);
        match self.client.upsert_points(upsert_builder).await {
            Ok(response) => {
                if let Some(result) = response.result {
                    log::debug!("Upsert operation completed with status: {:?}", result.status());
                }
                log::info!("Upserted {} points.", points_count);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "Failed to upsert points into collection '{}': {}",
                    self.collection_name,
                    e
                );
                Err(anyhow!("Qdrant upsert failed: {}", e))
            }
        }
    }

    pub async fn search_impl(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        if query_vector.len() as u64 != self.vector_size {
            return Err(anyhow!(
                "Query vector dimension ({}) does not match collection dimension ({})",
                query_vector.len(),
                self.vector_size
            ));
        }

        log::info!(
            "Searching in collection '{}' with limit {}...",
            self.collection_name,
            limit
        );

        let mut request =
            SearchPointsBuilder::new(self.collection_name.clone(), query_vector, limit as u64)
                .with_payload(true);
        if let Some(threshold) = score_threshold {
            request = request.score_threshold(threshold);
        }

        let response = self.client.search_points(request).await.map_err(|e| {
            log::error!(
                "Qdrant search failed in collection '{}': {}",
                self.collection_name,
                e
            );
            anyhow!("Qdrant search failed: {}", e)
        })?;

        let results: Vec<SearchResult> = response
            .result
            .into_iter()
            .filter_map(|point| match payload_to_document(&point.payload) {
                Some(payload) => Some(SearchResult {
                    source: payload.source,
                    chunk_index: payload.chunk_index,
                    content_chunk: payload.content_chunk,
                    score: point.score,
                }),
                None => {
                    log::warn!("Search result point {:?} has an incomplete payload, skipping.", point.id);
                    None
                }
            })
            .collect();

        log::info!("Search returned {} results.", results.len());
        Ok(results)
    }

    pub async fn count_impl(&self) -> Result<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(self.collection_name.clone()).exact(true))
            .await
            .map_err(|e| anyhow!("Qdrant count failed: {}", e))?;
        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }
}

/// Reads our payload fields back out of a Qdrant payload map.
fn payload_to_document(payload: &HashMap<String, QdrantValue>) -> Option<DocumentPayload> {
    let source = match payload.get(PAYLOAD_SOURCE)?.kind.as_ref()? {
        QdrantValueKind::StringValue(s) => s.clone(),
        _ => return None,
    };
    let content_chunk = match payload.get(PAYLOAD_CONTENT)?.kind.as_ref()? {
        QdrantValueKind::StringValue(s) => s.clone(),
        _ => return None,
    };
    let chunk_index = match payload.get(PAYLOAD_CHUNK_INDEX).and_then(|v| v.kind.as_ref()) {
        Some(QdrantValueKind::IntegerValue(i)) => usize::try_from(*i).ok()?,
        Some(QdrantValueKind::DoubleValue(d)) if *d >= 0.0 => *d as usize,
        _ => 0,
    };
    Some(DocumentPayload {
        source,
        chunk_index,
        content_chunk,
    })
}

#[async_trait]
impl VectorRepository for VectorDb {
    async fn upsert_documents(&self, documents: &[DocumentToUpsert]) -> Result<()> {
        self.upsert_documents_impl(documents).await
    }

    async fn search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        self.search_impl(query_vector, limit, score_threshold).await
    }

    async fn count(&self) -> Result<u64> {
        self.count_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_value(s: &str) -> QdrantValue {
        QdrantValue {
            kind: Some(QdrantValueKind::StringValue(s.to_string())),
        }
    }

    fn db(vector_size: u64) -> VectorDb {
        VectorDb::connect("http://localhost:6334", "test".to_string(), vector_size).unwrap()
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_params() {
        assert!(VectorDb::connect("http://localhost:6334", "".to_string(), 3).is_err());
        assert!(VectorDb::connect("http://localhost:6334", "docs".to_string(), 0).is_err());
    }

    #[test]
    fn test_payload_round_trip_through_qdrant_values() {
        let mut payload = HashMap::new();
        payload.insert(PAYLOAD_SOURCE.to_string(), string_value("data/document.txt"));
        payload.insert(PAYLOAD_CONTENT.to_string(), string_value("Some text."));
        payload.insert(
            PAYLOAD_CHUNK_INDEX.to_string(),
            QdrantValue {
                kind: Some(QdrantValueKind::IntegerValue(7)),
            },
        );
        assert_eq!(
            payload_to_document(&payload),
            Some(DocumentPayload {
                source: "data/document.txt".to_string(),
                chunk_index: 7,
                content_chunk: "Some text.".to_string(),
            })
        );
    }

    #[test]
    fn test_payload_without_content_is_skipped() {
        let mut payload = HashMap::new();
        payload.insert(PAYLOAD_SOURCE.to_string(), string_value("a.txt"));
        assert!(payload_to_document(&payload).is_none());
    }

    #[tokio::test]
    async fn test_to_point_rejects_wrong_dimension() {
        let doc = DocumentToUpsert {
            source: "a.txt".to_string(),
            chunk_index: 0,
            content_chunk: "hello".to_string(),
            vector: vec![0.1, 0.2],
        };
        let err = db(3).to_point(&doc).unwrap_err();
        assert!(err.to_string().contains("does not match collection dimension (3)"));
    }

    #[tokio::test]
    async fn test_to_point_carries_payload() {
        let doc = DocumentToUpsert {
            source: "a.txt".to_string(),
            chunk_index: 2,
            content_chunk: "hello".to_string(),
            vector: vec![0.1, 0.2, 0.3],
        };
        let point = db(3).to_point(&doc).unwrap();
        assert!(point.id.is_some());
        assert_eq!(
            payload_to_document(&point.payload),
            Some(DocumentPayload {
                source: "a.txt".to_string(),
                chunk_index: 2,
                content_chunk: "hello".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_dimension() {
        let err = db(3).search(vec![0.1, 0.2], 5, None).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("Query vector dimension (2) does not match collection dimension (3)"));
    }
}

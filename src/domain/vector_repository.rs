use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::document::SearchResult;
use crate::infrastructure::vector_db::DocumentToUpsert;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    /// Stores every document as a new point with an auto-assigned id.
    async fn upsert_documents(&self, documents: &[DocumentToUpsert]) -> Result<()>;

    /// Returns up to `limit` points closest to `query_vector`, best first.
    async fn search(
        &self,
        query_vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>>;

    /// Number of points currently stored.
    async fn count(&self) -> Result<u64>;
}

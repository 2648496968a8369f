use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::domain::document::{Answer, IngestReport};

#[async_trait]
pub trait RagService: Send + Sync {
    /// Splits, embeds and stores the document(s) at `path`.
    async fn ingest(&self, path: &Path) -> Result<IngestReport>;

    /// Retrieves context for `question` and asks the chat model to answer it.
    async fn ask(&self, question: &str) -> Result<Answer>;
}

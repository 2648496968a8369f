use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::application::prompt::build_prompt;
use crate::domain::document::{Answer, DocumentChunk, IngestReport, SearchQuery, SearchResult};
use crate::domain::error::RagError;
use crate::domain::rag::RagService;
use crate::domain::vector_repository::VectorRepository;
use crate::infrastructure::file_system::load_text_documents;
use crate::infrastructure::ollama::{ChatMessage, OllamaClient};
use crate::infrastructure::text_splitter::RecursiveTextSplitter;
use crate::infrastructure::vector_db::DocumentToUpsert;

/// How many chunks `ask` retrieves and how close they must be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 4,
            score_threshold: None,
        }
    }
}

pub struct RagServiceImpl {
    ollama: Arc<OllamaClient>,
    vector_db: Arc<dyn VectorRepository>,
    splitter: RecursiveTextSplitter,
    retrieval: RetrievalSettings,
}

impl RagServiceImpl {
    pub fn new(
        ollama: Arc<OllamaClient>,
        vector_db: Arc<dyn VectorRepository>,
        splitter: RecursiveTextSplitter,
        retrieval: RetrievalSettings,
    ) -> Self {
        Self {
            ollama,
            vector_db,
            splitter,
            retrieval,
        }
    }

    async fn embed_chunks(&self, chunks: Vec<DocumentChunk>) -> Result<Vec<DocumentToUpsert>> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self
            .ollama
            .embed(&texts)
            .await
            .with_context(|| format!("Failed to embed chunks with '{}'", self.ollama.embedding_model()))?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::EmbeddingCountMismatch {
                expected: chunks.len(),
                received: embeddings.len(),
            }
            .into());
        }

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, vector)| DocumentToUpsert {
                source: chunk.source,
                chunk_index: chunk.chunk_index,
                content_chunk: chunk.text,
                vector,
            })
            .collect())
    }

    /// Embeds the query text and returns the nearest stored chunks.
    pub async fn retrieve(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let query_embedding = self
            .ollama
            .embed_one(&query.text)
            .await
            .with_context(|| format!("Failed to embed query: {}", query.text))?;
        self.vector_db
            .search(query_embedding, query.limit, query.score_threshold)
            .await
    }
}

#[async_trait]
impl RagService for RagServiceImpl {
    async fn ingest(&self, path: &Path) -> Result<IngestReport> {
        info!("Loading documents from {}", path.display());
        let documents = load_text_documents(path)?;

        let mut chunks = Vec::new();
        for (source, content) in &documents {
            let document_chunks = self.splitter.split_document(source, content);
            if document_chunks.is_empty() {
                warn!("Document '{}' is empty, skipping.", source);
                continue;
            }
            log::debug!("Split '{}' into {} chunks", source, document_chunks.len());
            chunks.extend(document_chunks);
        }

        let chunk_count = chunks.len();
        info!(
            "Split {} document(s) into {} chunks.",
            documents.len(),
            chunk_count
        );

        if chunk_count > 0 {
            let to_upsert = self.embed_chunks(chunks).await?;
            self.vector_db.upsert_documents(&to_upsert).await?;
        } else {
            warn!("No chunks to ingest.");
        }

        let stored_records = self.vector_db.count().await?;
        Ok(IngestReport {
            documents: documents.len(),
            chunks: chunk_count,
            stored_records,
        })
    }

    async fn ask(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(anyhow!("Question cannot be empty"));
        }

        let query = SearchQuery {
            text: question.to_string(),
            limit: self.retrieval.top_k,
            score_threshold: self.retrieval.score_threshold,
        };
        let context = self.retrieve(&query).await?;
        if context.is_empty() {
            warn!("No relevant chunks found; asking without context.");
        } else {
            info!("Retrieved {} chunks for the question.", context.len());
        }

        let prompt = build_prompt(question, &context);
        log::debug!("Prompt:\n{}", prompt);

        let answer = self
            .ollama
            .chat(&[ChatMessage::user(prompt)])
            .await
            .with_context(|| format!("Chat model '{}' failed", self.ollama.chat_model()))?;

        Ok(Answer {
            question: question.to_string(),
            answer: answer.trim().to_string(),
            context,
        })
    }
}

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::rag_service::{RagServiceImpl, RetrievalSettings};
use crate::config::RagConfig;
use crate::domain::vector_repository::VectorRepository;
use crate::infrastructure::ollama::OllamaClient;
use crate::infrastructure::text_splitter::RecursiveTextSplitter;
use crate::infrastructure::vector_db::VectorDb;

/// Whether the collection should be kept or emptied before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionMode {
    /// Create the collection if missing, keep existing points.
    Keep,
    /// Drop and recreate the collection.
    Reset,
}

/// Connects to Qdrant and Ollama and wires up the service.
pub async fn build_rag_service(config: &RagConfig, mode: CollectionMode) -> Result<RagServiceImpl> {
    log::info!(
        "Using Ollama at {} (embeddings: '{}', chat: '{}')",
        config.ollama.base_url,
        config.ollama.embedding_model,
        config.ollama.chat_model
    );
    let ollama = OllamaClient::new(&config.ollama).context("Failed to create Ollama client")?;

    log::info!(
        "Using Qdrant at {} (collection: '{}')",
        config.vector_store.url,
        config.vector_store.collection_name
    );
    let vector_db_instance = VectorDb::connect(
        &config.vector_store.url,
        config.vector_store.collection_name.clone(),
        config.vector_store.vector_size,
    )?;
    match mode {
        CollectionMode::Keep => vector_db_instance.initialize_collection().await?,
        CollectionMode::Reset => vector_db_instance.reset_collection().await?,
    }
    let vector_db: Arc<dyn VectorRepository> = Arc::new(vector_db_instance);

    let splitter = RecursiveTextSplitter::new(config.ingest.splitter_settings())?;
    let retrieval = RetrievalSettings {
        top_k: config.ask.top_k,
        score_threshold: config.ask.score_threshold,
    };

    Ok(RagServiceImpl::new(Arc::new(ollama), vector_db, splitter, retrieval))
}

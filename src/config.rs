use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::text_splitter::SplitterSettings;

pub const CONFIG_PATH_ENV: &str = "RAG_CONFIG_PATH";
pub const DEFAULT_CONFIG_FILENAME: &str = "rag_config.toml";

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
const DEFAULT_CHAT_MODEL: &str = "llama3.2:3b";
const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";
const DEFAULT_COLLECTION: &str = "my_documents";
// all-minilm produces 384-dimensional vectors
const DEFAULT_VECTOR_SIZE: u64 = 384;
const DEFAULT_INPUT_PATH: &str = "data/document.txt";
pub const DEFAULT_QUESTION: &str = "What is this document about?";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OllamaConfig {
    pub base_url: String,
    /// Model used for both document and query embeddings.
    pub embedding_model: String,
    pub chat_model: String,
    #[serde(default)]
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Maximum number of texts sent in a single `/api/embed` request.
    pub embed_batch_size: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
            timeout_secs: 120,
            embed_batch_size: 32,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VectorStoreConfig {
    /// gRPC endpoint of the Qdrant server.
    pub url: String,
    pub collection_name: String,
    /// Must match the dimension of the embedding model.
    pub vector_size: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// A text file, or a directory whose `.txt`/`.md` files are ingested.
    pub input_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let splitter = SplitterSettings::default();
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            chunk_size: splitter.chunk_size,
            chunk_overlap: splitter.chunk_overlap,
        }
    }
}

impl IngestConfig {
    pub fn splitter_settings(&self) -> SplitterSettings {
        SplitterSettings {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AskConfig {
    /// Asked when `ask` is run without a question.
    pub default_question: String,
    pub top_k: usize,
    #[serde(default)]
    pub score_threshold: Option<f32>,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            default_question: DEFAULT_QUESTION.to_string(),
            top_k: 4,
            score_threshold: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RagConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub ask: AskConfig,
}

/// Loads the configuration from defaults, the TOML file and `RAG_*` environment variables,
/// in increasing order of precedence.
pub fn load_config() -> Result<RagConfig> {
    let config_path_env = std::env::var(CONFIG_PATH_ENV).ok();
    let config_path = config_path_env
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_FILENAME.to_string());

    if let Some(ref env_path) = config_path_env {
        if !std::path::Path::new(env_path).exists() {
            return Err(anyhow::anyhow!(
                "Config file not found at {}: {}",
                CONFIG_PATH_ENV,
                env_path
            ));
        }
        log::info!("{} is set: {}", CONFIG_PATH_ENV, env_path);
    } else {
        log::debug!("{} not set, falling back to default: {}", CONFIG_PATH_ENV, config_path);
    }

    let figment = Figment::new()
        .merge(Serialized::defaults(RagConfig::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("RAG_").ignore(&["CONFIG_PATH"]).split("__"));

    let config: RagConfig = figment.extract().context("Failed to extract RagConfig")?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RagConfig) -> Result<()> {
    if config.ollama.base_url.trim().is_empty() {
        return Err(anyhow::anyhow!("ollama.base_url cannot be empty"));
    }
    if config.ollama.embedding_model.trim().is_empty() || config.ollama.chat_model.trim().is_empty() {
        return Err(anyhow::anyhow!("ollama model names cannot be empty"));
    }
    if config.ollama.embed_batch_size == 0 {
        return Err(anyhow::anyhow!("ollama.embed_batch_size must be greater than zero"));
    }
    if config.vector_store.url.trim().is_empty() {
        return Err(anyhow::anyhow!("vector_store.url cannot be empty"));
    }
    if config.vector_store.collection_name.trim().is_empty() {
        return Err(anyhow::anyhow!("vector_store.collection_name cannot be empty"));
    }
    if config.vector_store.vector_size == 0 {
        return Err(anyhow::anyhow!("vector_store.vector_size must be greater than zero"));
    }
    if config.ingest.input_path.as_os_str().is_empty() {
        return Err(anyhow::anyhow!("ingest.input_path cannot be empty"));
    }
    if config.ask.top_k == 0 {
        return Err(anyhow::anyhow!("ask.top_k must be greater than zero"));
    }
    config
        .ingest
        .splitter_settings()
        .validate()
        .context("Invalid ingest splitter settings")?;
    Ok(())
}

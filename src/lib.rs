pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod initialization;

pub use application::rag_service::{RagServiceImpl, RetrievalSettings};
pub use config::{load_config, RagConfig};
pub use domain::document::{Answer, DocumentChunk, IngestReport, SearchQuery, SearchResult};
pub use domain::error::RagError;
pub use domain::rag::RagService;
pub use domain::vector_repository::VectorRepository;
pub use infrastructure::vector_db::{qdrant_client, DocumentToUpsert, VectorDb};
pub use initialization::{build_rag_service, CollectionMode};

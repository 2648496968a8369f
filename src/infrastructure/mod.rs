pub mod file_system;
pub mod ollama;
pub mod text_splitter;
pub mod vector_db;

// Re-export key types for easier access from application layer
pub use ollama::OllamaClient;
pub use text_splitter::{RecursiveTextSplitter, SplitterSettings};
pub use vector_db::VectorDb;

use serde::{Deserialize, Serialize};

/// A piece of a source document produced by the text splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Path of the file the chunk was cut from.
    pub source: String,
    /// Position of the chunk within its source, starting at 0.
    pub chunk_index: usize,
    pub text: String,
}

// A query against the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub limit: usize,
    pub score_threshold: Option<f32>,
}

/// A stored chunk returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub source: String,
    pub chunk_index: usize,
    pub content_chunk: String,
    pub score: f32,
}

/// Outcome of an ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    /// Points in the collection after the upsert.
    pub stored_records: u64,
}

/// A generated answer together with the context it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub context: Vec<SearchResult>,
}

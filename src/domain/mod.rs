pub mod document;
pub mod error;
pub mod rag;
pub mod vector_repository;

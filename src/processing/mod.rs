//! Matching and indexing module

pub mod records;
pub mod similarity;
pub mod fit_scorer;
pub mod embeddings;
pub mod vector_store;
pub mod semantic_matcher;

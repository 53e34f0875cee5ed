//! Orchestration services for metadata retrieval.

mod retriever;

pub use retriever::{MetadataRetriever, RetrievalTarget};

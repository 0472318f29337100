//! Vector store backends and the tenant collection manager.
//!
//! Isolation contract: every tenant owns one physical collection; chunks,
//! queries, and results never cross tenant boundaries.

pub mod in_memory;
pub mod qdrant;
pub mod tenant;
pub mod vector_store;

pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantVectorStore;
pub use tenant::{CollectionError, EmbedFn, RetrievedChunk, TenantCollections};
pub use vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};

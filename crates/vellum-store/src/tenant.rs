use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use vellum_core::{Chunk, DocumentId, TenantId};
use vellum_embed::{EmbedError, EmbedFuture};

use crate::vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};

/// Injected embedding closure, shared by the write and query paths.
pub type EmbedFn = Box<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("collection already provisioned for tenant {0}")]
    DuplicateCollection(TenantId),

    #[error("no collection provisioned for tenant {0}")]
    UnknownTenant(TenantId),

    #[error("embedding failed: {0}")]
    Embed(#[from] EmbedError),

    #[error("collection provisioning failed: {0}")]
    Provision(VectorStoreError),

    #[error("collection write failed: {0}")]
    Write(VectorStoreError),

    #[error("collection query failed: {0}")]
    Query(VectorStoreError),
}

/// A chunk returned from a tenant-scoped similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub text: String,
    pub document_id: DocumentId,
    pub chunk_index: usize,
    pub page_number: Option<u32>,
    pub score: f32,
}

/// Name of the physical collection backing a tenant.
#[must_use]
pub fn collection_name(tenant_id: TenantId) -> String {
    format!("tenant_{tenant_id}")
}

/// Manages one isolated retrieval namespace per tenant.
///
/// The vector store handle and the embedding closure are constructor
/// dependencies; `tenant_id` is the sole addressing key. Chunks written for
/// one tenant are physically separated from every other tenant's.
pub struct TenantCollections {
    store: Arc<dyn VectorStore>,
    embed_fn: EmbedFn,
    vector_size: u64,
}

impl std::fmt::Debug for TenantCollections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantCollections")
            .field("vector_size", &self.vector_size)
            .finish_non_exhaustive()
    }
}

impl TenantCollections {
    #[must_use]
    pub fn new(store: Arc<dyn VectorStore>, embed_fn: EmbedFn, vector_size: u64) -> Self {
        Self {
            store,
            embed_fn,
            vector_size,
        }
    }

    /// Provision the retrieval namespace for a newly registered tenant.
    ///
    /// Called exactly once per tenant, before the registration transaction
    /// commits; the caller aborts registration when this fails.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::DuplicateCollection`] when the tenant was
    /// already provisioned, or a provisioning error from the store.
    pub async fn create_collection(&self, tenant_id: TenantId) -> Result<(), CollectionError> {
        let name = collection_name(tenant_id);
        if self
            .store
            .collection_exists(&name)
            .await
            .map_err(CollectionError::Provision)?
        {
            return Err(CollectionError::DuplicateCollection(tenant_id));
        }
        self.store
            .create_collection(&name, self.vector_size)
            .await
            .map_err(CollectionError::Provision)?;
        tracing::info!(%tenant_id, collection = %name, "provisioned tenant collection");
        Ok(())
    }

    /// Remove a tenant's namespace. Compensation hook for tenant
    /// off-boarding or a failed registration transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot delete the collection.
    pub async fn delete_collection(&self, tenant_id: TenantId) -> Result<(), CollectionError> {
        self.store
            .delete_collection(&collection_name(tenant_id))
            .await
            .map_err(CollectionError::Provision)
    }

    /// Append chunk payloads to the tenant's namespace.
    ///
    /// Every chunk is embedded before anything is written, so an embedding
    /// failure leaves the collection untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownTenant`] when the tenant has no
    /// collection, an embedding error, or a write error from the store.
    pub async fn add_chunks(
        &self,
        tenant_id: TenantId,
        chunks: &[Chunk],
    ) -> Result<(), CollectionError> {
        let name = collection_name(tenant_id);
        if !self
            .store
            .collection_exists(&name)
            .await
            .map_err(CollectionError::Write)?
        {
            return Err(CollectionError::UnknownTenant(tenant_id));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = (self.embed_fn)(&chunk.text).await?;
            points.push(VectorPoint {
                id: Uuid::new_v4().to_string(),
                vector,
                payload: chunk_payload(chunk),
            });
        }

        let count = points.len();
        self.store
            .upsert(&name, points)
            .await
            .map_err(CollectionError::Write)?;
        tracing::debug!(%tenant_id, chunks = count, "appended chunks to tenant collection");
        Ok(())
    }

    /// Search the tenant's namespace for the `top_k` most similar chunks.
    ///
    /// Results are ordered by descending score; ties break on lower
    /// chunk_index, then lower document_id, so repeated queries rank
    /// identically.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownTenant`] when the tenant has no
    /// collection, an embedding error, or a search error from the store.
    pub async fn query(
        &self,
        tenant_id: TenantId,
        query_text: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, CollectionError> {
        let name = collection_name(tenant_id);
        if !self
            .store
            .collection_exists(&name)
            .await
            .map_err(CollectionError::Query)?
        {
            return Err(CollectionError::UnknownTenant(tenant_id));
        }

        let vector = (self.embed_fn)(query_text).await?;
        let limit = u64::try_from(top_k).unwrap_or(u64::MAX);
        let points = self
            .store
            .search(&name, vector, limit)
            .await
            .map_err(CollectionError::Query)?;

        let mut results: Vec<RetrievedChunk> =
            points.into_iter().filter_map(decode_point).collect();
        rank(&mut results);
        Ok(results)
    }
}

fn chunk_payload(chunk: &Chunk) -> HashMap<String, serde_json::Value> {
    HashMap::from([
        ("content".to_owned(), serde_json::json!(chunk.text)),
        (
            "document_id".to_owned(),
            serde_json::json!(chunk.document_id),
        ),
        (
            "chunk_index".to_owned(),
            serde_json::json!(chunk.chunk_index),
        ),
        (
            "page_number".to_owned(),
            serde_json::json!(chunk.page_number),
        ),
    ])
}

fn decode_point(point: ScoredVectorPoint) -> Option<RetrievedChunk> {
    let text = point.payload.get("content")?.as_str()?.to_owned();
    let document_id = DocumentId(point.payload.get("document_id")?.as_i64()?);
    let chunk_index = usize::try_from(point.payload.get("chunk_index")?.as_i64()?).ok()?;
    let page_number = point
        .payload
        .get("page_number")
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    Some(RetrievedChunk {
        text,
        document_id,
        chunk_index,
        page_number,
        score: point.score,
    })
}

/// Deterministic ranking: score descending, ties broken by lower
/// chunk_index then lower document_id.
fn rank(results: &mut [RetrievedChunk]) {
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.chunk_index.cmp(&b.chunk_index))
            .then_with(|| a.document_id.cmp(&b.document_id))
    });
}

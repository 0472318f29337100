use serde::{Deserialize, Serialize};

/// Identifier of an isolated customer account.
///
/// Every document, chunk, and retrieval result is scoped to exactly one
/// tenant. Ids are issued by the external relational layer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub i64);

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an uploaded document within a tenant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bounded span of a document's text, the unit of retrieval.
///
/// `chunk_index` is zero-based and contiguous within a document.
/// `page_number` is a best-effort attribution for citation display and must
/// never be treated as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub chunk_index: usize,
    pub document_id: DocumentId,
    pub page_number: Option<u32>,
    pub char_count: usize,
}

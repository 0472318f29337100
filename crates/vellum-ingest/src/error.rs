use std::path::PathBuf;

use vellum_core::{DocumentId, TenantId};
use vellum_store::CollectionError;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty file")]
    EmptyFile,

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[error("PDF parse error: {0}")]
    Parse(String),
}

/// Failure of a single document ingestion, carrying enough context to mark
/// the document as unprocessed on the caller's side.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{} is not a readable PDF", .path.display())]
    Rejected { path: PathBuf },

    #[error("extraction failed for {}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: ExtractionError,
    },

    #[error("indexing failed for tenant {tenant_id} document {document_id}")]
    Collection {
        tenant_id: TenantId,
        document_id: DocumentId,
        #[source]
        source: CollectionError,
    },
}

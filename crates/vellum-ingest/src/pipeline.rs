use std::path::Path;
use std::sync::Arc;

use vellum_core::{DocumentId, TenantId};
use vellum_store::TenantCollections;

use crate::chunk::TextChunker;
use crate::error::IngestError;
use crate::extract::PdfExtractor;

/// Counts returned to the caller for persistence on the document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub chunk_count: usize,
    pub pages_processed: usize,
}

/// Orchestrates extract → chunk → index for one uploaded document.
///
/// The only component that touches tenant and document identifiers; the
/// collection manager is an injected dependency, never process-global.
pub struct IngestionPipeline {
    extractor: PdfExtractor,
    chunker: TextChunker,
    collections: Arc<TenantCollections>,
}

impl IngestionPipeline {
    #[must_use]
    pub fn new(
        extractor: PdfExtractor,
        chunker: TextChunker,
        collections: Arc<TenantCollections>,
    ) -> Self {
        Self {
            extractor,
            chunker,
            collections,
        }
    }

    /// Ingest one document for a tenant, all-or-nothing.
    ///
    /// Nothing is forwarded to the tenant's collection unless extraction and
    /// chunking completed for the whole document. When forwarding fails the
    /// document stays unprocessed on the caller's side and can be retried;
    /// this pipeline does not retry.
    ///
    /// # Errors
    ///
    /// Returns an error when the file fails the pre-flight check, cannot be
    /// extracted, or the chunks cannot be written to the tenant's
    /// collection.
    pub async fn ingest(
        &self,
        path: &Path,
        tenant_id: TenantId,
        document_id: DocumentId,
    ) -> Result<IngestReport, IngestError> {
        let valid = {
            let extractor = self.extractor.clone();
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || extractor.validate(&path))
                .await
                .unwrap_or(false)
        };
        if !valid {
            return Err(IngestError::Rejected {
                path: path.to_path_buf(),
            });
        }

        let document = self
            .extractor
            .extract(path)
            .await
            .map_err(|source| IngestError::Extraction {
                path: path.to_path_buf(),
                source,
            })?;

        let chunks = self
            .chunker
            .chunk(&document.full_text, document_id, Some(&document.pages));
        if chunks.is_empty() {
            tracing::debug!(%tenant_id, %document_id, "document yielded no extractable text");
            return Ok(IngestReport {
                chunk_count: 0,
                pages_processed: document.page_count,
            });
        }

        self.collections
            .add_chunks(tenant_id, &chunks)
            .await
            .map_err(|source| IngestError::Collection {
                tenant_id,
                document_id,
                source,
            })?;

        tracing::info!(
            %tenant_id,
            %document_id,
            chunks = chunks.len(),
            pages = document.page_count,
            "document ingested"
        );
        Ok(IngestReport {
            chunk_count: chunks.len(),
            pages_processed: document.page_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkerConfig;
    use vellum_embed::{Embedder, MockEmbedder};
    use vellum_store::tenant::EmbedFn;
    use vellum_store::{CollectionError, InMemoryVectorStore};

    fn mock_embed_fn() -> EmbedFn {
        let embedder = MockEmbedder::default();
        Box::new(move |text: &str| {
            let e = embedder.clone();
            let owned = text.to_owned();
            Box::pin(async move { e.embed(&owned).await })
        })
    }

    fn pipeline() -> (IngestionPipeline, Arc<TenantCollections>) {
        let collections = Arc::new(TenantCollections::new(
            Arc::new(InMemoryVectorStore::new()),
            mock_embed_fn(),
            16,
        ));
        let pipeline = IngestionPipeline::new(
            PdfExtractor::default(),
            TextChunker::new(ChunkerConfig::default()),
            Arc::clone(&collections),
        );
        (pipeline, collections)
    }

    fn one_page_pdf(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{Document, Object, Stream, dictionary};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn ingest_reports_counts_and_indexes_chunks() {
        let (pipeline, collections) = pipeline();
        let tenant = TenantId(1);
        collections.create_collection(tenant).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, one_page_pdf("The onboarding policy covers laptops.")).unwrap();

        let report = pipeline.ingest(&path, tenant, DocumentId(7)).await.unwrap();
        assert_eq!(report.pages_processed, 1);
        assert_eq!(report.chunk_count, 1);

        let results = collections
            .query(tenant, "onboarding policy", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document_id, DocumentId(7));
        assert!(results[0].text.contains("onboarding policy"));
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_extraction() {
        let (pipeline, collections) = pipeline();
        let tenant = TenantId(1);
        collections.create_collection(tenant).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"plain text masquerading as pdf").unwrap();

        let err = pipeline
            .ingest(&path, tenant, DocumentId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Rejected { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_rejected() {
        let (pipeline, collections) = pipeline();
        collections.create_collection(TenantId(1)).await.unwrap();

        let err = pipeline
            .ingest(Path::new("/nonexistent.pdf"), TenantId(1), DocumentId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Rejected { .. }));
    }

    #[tokio::test]
    async fn unprovisioned_tenant_fails_with_unknown_tenant() {
        let (pipeline, _collections) = pipeline();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, one_page_pdf("Some indexable sentence.")).unwrap();

        let err = pipeline
            .ingest(&path, TenantId(99), DocumentId(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Collection {
                source: CollectionError::UnknownTenant(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blank_document_short_circuits_with_zero_chunks() {
        let (pipeline, collections) = pipeline();
        let tenant = TenantId(1);
        collections.create_collection(tenant).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.pdf");
        std::fs::write(&path, one_page_pdf("")).unwrap();

        let report = pipeline.ingest(&path, tenant, DocumentId(2)).await.unwrap();
        assert_eq!(report.chunk_count, 0);
        assert_eq!(report.pages_processed, 1);

        let results = collections.query(tenant, "anything", 5).await.unwrap();
        assert!(results.is_empty());
    }
}

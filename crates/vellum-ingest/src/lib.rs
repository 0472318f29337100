//! Document ingestion: PDF text extraction, sentence-aware chunking with
//! overlap, and the pipeline that feeds a tenant's vector collection.

pub mod chunk;
pub mod error;
pub mod extract;
pub mod pipeline;

pub use chunk::{ChunkerConfig, TextChunker, attribute_page};
pub use error::{ExtractionError, IngestError};
pub use extract::{PageText, PdfExtractor, RawDocument};
pub use pipeline::{IngestReport, IngestionPipeline};

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

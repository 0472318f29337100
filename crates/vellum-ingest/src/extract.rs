use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object};

use crate::DEFAULT_MAX_FILE_SIZE;
use crate::error::ExtractionError;

/// Text of a single page. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// Everything extracted from one PDF, produced once per ingestion.
///
/// `pages` records every page, including those that yielded no text;
/// `full_text` concatenates only the non-empty pages, each preceded by a
/// `--- Page N ---` marker.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub file_path: PathBuf,
    pub page_count: usize,
    pub pages: Vec<PageText>,
    pub full_text: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct PdfExtractor {
    pub max_file_size: u64,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl PdfExtractor {
    /// Extract full text, per-page text, page count, and metadata.
    ///
    /// The file is read once; parsing runs on a blocking task. No handle
    /// stays open after return, on success or failure.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, is empty, exceeds
    /// `max_file_size`, or cannot be parsed as a PDF.
    pub async fn extract(&self, path: &Path) -> Result<RawDocument, ExtractionError> {
        let path = std::fs::canonicalize(path)?;

        let meta = tokio::fs::metadata(&path).await?;
        if meta.len() == 0 {
            return Err(ExtractionError::EmptyFile);
        }
        if meta.len() > self.max_file_size {
            return Err(ExtractionError::FileTooLarge(meta.len()));
        }

        let bytes = tokio::fs::read(&path).await?;
        let (page_texts, metadata) = tokio::task::spawn_blocking(move || parse_pdf(&bytes))
            .await
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))??;

        let pages: Vec<PageText> = page_texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: u32::try_from(i + 1).unwrap_or(u32::MAX),
                text: text.trim().to_owned(),
            })
            .collect();
        let full_text = join_pages(&pages);

        Ok(RawDocument {
            file_path: path,
            page_count: pages.len(),
            pages,
            full_text,
            metadata,
        })
    }

    /// Cheap structural pre-flight: the file loads as a PDF and has at
    /// least one page. Never errors; any failure maps to `false`.
    #[must_use]
    pub fn validate(&self, path: &Path) -> bool {
        Document::load(path)
            .map(|doc| !doc.get_pages().is_empty())
            .unwrap_or(false)
    }
}

type ParsedPdf = (Vec<String>, HashMap<String, serde_json::Value>);

fn parse_pdf(bytes: &[u8]) -> Result<ParsedPdf, ExtractionError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractionError::Parse(e.to_string()))?;

    // Metadata is advisory; a malformed Info dictionary never fails extraction.
    let metadata = Document::load_mem(bytes)
        .map(|doc| info_metadata(&doc))
        .unwrap_or_default();

    Ok((pages, metadata))
}

fn join_pages(pages: &[PageText]) -> String {
    use std::fmt::Write;

    let mut full = String::new();
    for page in pages {
        if page.text.is_empty() {
            continue;
        }
        let _ = write!(full, "\n\n--- Page {} ---\n\n", page.page_number);
        full.push_str(&page.text);
    }
    full.trim().to_owned()
}

/// Read the trailer `Info` dictionary into an open key-value map.
///
/// PDF metadata fields are producer-defined; values are kept loosely typed
/// and validated lazily by consumers.
fn info_metadata(doc: &Document) -> HashMap<String, serde_json::Value> {
    let mut metadata = HashMap::new();
    let Ok(info) = doc.trailer.get(b"Info") else {
        return metadata;
    };
    let info = match info {
        Object::Reference(id) => match doc.get_dictionary(*id) {
            Ok(dict) => dict,
            Err(_) => return metadata,
        },
        Object::Dictionary(dict) => dict,
        _ => return metadata,
    };

    for (key, value) in info.iter() {
        let key = String::from_utf8_lossy(key).into_owned();
        match value {
            Object::String(bytes, _) => {
                metadata.insert(key, serde_json::Value::String(decode_pdf_string(bytes)));
            }
            Object::Name(name) => {
                metadata.insert(
                    key,
                    serde_json::Value::String(String::from_utf8_lossy(name).into_owned()),
                );
            }
            Object::Integer(i) => {
                metadata.insert(key, serde_json::Value::from(*i));
            }
            Object::Real(r) => {
                metadata.insert(key, serde_json::Value::from(f64::from(*r)));
            }
            Object::Boolean(b) => {
                metadata.insert(key, serde_json::Value::Bool(*b));
            }
            _ => {}
        }
    }
    metadata
}

/// PDF text strings are UTF-16BE with a BOM or a one-byte encoding.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

//! services/api/src/adapters/pdf_text.rs
//!
//! Page-by-page PDF text extraction on top of `lopdf`.

use legal_qa_core::ports::ExtractionError;
use lopdf::Document;
use tracing::{debug, warn};

/// Extracts the text layer of a PDF held in memory.
///
/// Pages are visited in page order and joined with `\n`. A page with no text,
/// or whose content stream can't be decoded, is skipped rather than failing
/// the whole document. Only a file that can't be opened as a PDF is an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    page_texts.push(text.to_string());
                }
            }
            Err(e) => {
                warn!("Skipping PDF page {}: {}", page_number, e);
            }
        }
    }

    Ok(page_texts.join("\n"))
}

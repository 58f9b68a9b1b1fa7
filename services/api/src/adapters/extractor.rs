//! services/api/src/adapters/extractor.rs
//!
//! This module contains the adapter that turns uploaded files into plain text.
//! It implements the `TextExtractionService` port from the `core` crate.

use crate::adapters::{docx_text::extract_docx_text, pdf_text::extract_pdf_text};
use async_trait::async_trait;
use legal_qa_core::{
    domain::{MediaType, UploadedDocument},
    ports::{ExtractionError, TextExtractionService},
};
use std::time::Instant;
use tracing::info;

const UTF8_BOM: &str = "\u{feff}";

/// Extracts text with the strategy matching `media_type`.
pub fn extract_text(media_type: MediaType, bytes: &[u8]) -> Result<String, ExtractionError> {
    match media_type {
        MediaType::Pdf => extract_pdf_text(bytes),
        MediaType::WordDocument => extract_docx_text(bytes),
        MediaType::PlainText => Ok(decode_text_lossy(bytes)),
    }
}

/// Decodes bytes as UTF-8, dropping any invalid sequences.
pub fn decode_text_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextExtractionService` with in-process parsers.
#[derive(Clone, Default)]
pub struct DocumentTextExtractor;

impl DocumentTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractionService for DocumentTextExtractor {
    async fn extract(&self, document: UploadedDocument) -> Result<String, ExtractionError> {
        let start = Instant::now();
        let UploadedDocument {
            file_name,
            media_type,
            content,
        } = document;
        let size = content.len();

        // Parsing is CPU-bound; keep it off the async workers.
        let text = tokio::task::spawn_blocking(move || extract_text(media_type, &content))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))??;

        info!(
            "Extracted {} chars from '{}' ({:?}, {} bytes) in {:?}",
            text.chars().count(),
            file_name,
            media_type,
            size,
            start.elapsed()
        );
        Ok(text)
    }
}

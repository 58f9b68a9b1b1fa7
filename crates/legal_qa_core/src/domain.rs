//! crates/legal_qa_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any web framework or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// File extensions the upload control accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

//=========================================================================================
// Media Types
//=========================================================================================

/// The closed set of extraction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Pdf,
    WordDocument,
    PlainText,
}

impl MediaType {
    /// Maps a declared media type onto an extraction strategy.
    /// Anything that is not PDF or DOCX is read as plain text.
    pub fn from_declared(declared: &str) -> Self {
        let essence = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => MediaType::Pdf,
            DOCX_MIME => MediaType::WordDocument,
            _ => MediaType::PlainText,
        }
    }

    /// Maps a file extension (without the dot) onto an extraction strategy.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => MediaType::Pdf,
            "docx" => MediaType::WordDocument,
            _ => MediaType::PlainText,
        }
    }

    /// Resolves the media type of an upload.
    ///
    /// A specific declared type wins. Browsers send an empty type or
    /// `application/octet-stream` when they don't know the file, in which case
    /// the extension decides.
    pub fn resolve(declared: Option<&str>, file_name: &str) -> Self {
        match declared.map(str::trim) {
            Some(d) if !d.is_empty() && !d.eq_ignore_ascii_case("application/octet-stream") => {
                Self::from_declared(d)
            }
            _ => extension_of(file_name)
                .map(|ext| Self::from_extension(&ext))
                .unwrap_or(MediaType::PlainText),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => PDF_MIME,
            MediaType::WordDocument => DOCX_MIME,
            MediaType::PlainText => TEXT_MIME,
        }
    }
}

/// Returns true when the file name carries one of the accepted extensions.
pub fn is_accepted_upload(file_name: &str) -> bool {
    extension_of(file_name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

//=========================================================================================
// Uploaded Document
//=========================================================================================

/// A file handed to the extractor. Lives only as long as one extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub media_type: MediaType,
    pub content: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, media_type: MediaType, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            content: content.into(),
        }
    }
}

//=========================================================================================
// Chat Transcript
//=========================================================================================

/// Who said a line in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Asker,
    Responder,
}

impl Speaker {
    /// The label shown next to a message.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Asker => "You",
            Speaker::Responder => "AI",
        }
    }
}

/// A single line of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    speaker: Speaker,
    message: String,
    created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The ordered record of a session's questions and answers.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, speaker: Speaker, message: impl Into<String>) {
        self.turns.push(ChatTurn::new(speaker, message));
    }

    /// All turns in insertion order.
    pub fn all(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_map_to_strategies() {
        assert_eq!(MediaType::from_declared("application/pdf"), MediaType::Pdf);
        assert_eq!(MediaType::from_declared(DOCX_MIME), MediaType::WordDocument);
        assert_eq!(MediaType::from_declared("text/plain; charset=utf-8"), MediaType::PlainText);
        assert_eq!(MediaType::from_declared("APPLICATION/PDF"), MediaType::Pdf);
        assert_eq!(MediaType::from_declared("image/png"), MediaType::PlainText);
    }

    #[test]
    fn resolve_falls_back_to_extension_for_generic_types() {
        assert_eq!(MediaType::resolve(None, "lease.PDF"), MediaType::Pdf);
        assert_eq!(
            MediaType::resolve(Some("application/octet-stream"), "nda.docx"),
            MediaType::WordDocument
        );
        assert_eq!(MediaType::resolve(Some(""), "notes"), MediaType::PlainText);
        assert_eq!(MediaType::resolve(Some("text/plain"), "odd.pdf"), MediaType::PlainText);
    }

    #[test]
    fn only_pdf_docx_and_txt_are_accepted() {
        assert!(is_accepted_upload("contract.pdf"));
        assert!(is_accepted_upload("Contract.DOCX"));
        assert!(is_accepted_upload("terms.txt"));
        assert!(!is_accepted_upload("scan.png"));
        assert!(!is_accepted_upload("README"));
    }

    #[test]
    fn transcript_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::Asker, "q1");
        transcript.append(Speaker::Responder, "a1");
        transcript.append(Speaker::Asker, "q2");
        transcript.append(Speaker::Responder, "a2");

        let seen: Vec<(Speaker, &str)> = transcript
            .all()
            .iter()
            .map(|t| (t.speaker(), t.message()))
            .collect();
        assert_eq!(
            seen,
            vec![
                (Speaker::Asker, "q1"),
                (Speaker::Responder, "a1"),
                (Speaker::Asker, "q2"),
                (Speaker::Responder, "a2"),
            ]
        );
    }

    #[test]
    fn speaker_labels() {
        assert_eq!(Speaker::Asker.label(), "You");
        assert_eq!(Speaker::Responder.label(), "AI");
    }
}

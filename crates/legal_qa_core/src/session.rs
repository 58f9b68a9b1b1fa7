//! crates/legal_qa_core/src/session.rs
//!
//! The per-session state machine: one uploaded document at a time, questions
//! answered against it, and the running transcript.

use crate::answering::answer;
use crate::domain::{Speaker, Transcript, UploadedDocument};
use crate::ports::{ExtractionError, ExtractiveQaModel, PortResult, TextExtractionService};
use std::sync::Arc;
use uuid::Uuid;

/// Where a session is in the upload/ask cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No document yet.
    Idle,
    Extracting,
    /// Text is available; questions are accepted.
    Ready,
    /// The last upload produced no usable text. Only a new upload leaves this state.
    Blocked,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Extracting => "extracting",
            SessionPhase::Ready => "ready",
            SessionPhase::Blocked => "blocked",
        }
    }
}

/// The result of handing a document to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Ready { characters: usize },
    /// The file was readable but held no text (e.g. a scanned PDF).
    Empty,
    Failed(ExtractionError),
}

/// The result of submitting a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Blank question; nothing was asked.
    Ignored,
    /// No document text to ask about.
    NotReady,
    Answered { answer: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Start a fresh transcript whenever a new document is uploaded.
    pub clear_transcript_on_upload: bool,
}

/// One interactive session. Owned by whoever drives the conversation and
/// dropped with it; nothing here outlives the session.
pub struct ChatSession {
    id: Uuid,
    extractor: Arc<dyn TextExtractionService>,
    qa_model: Arc<dyn ExtractiveQaModel>,
    options: SessionOptions,
    phase: SessionPhase,
    document_name: Option<String>,
    document_text: Option<String>,
    transcript: Transcript,
}

impl ChatSession {
    pub fn new(
        extractor: Arc<dyn TextExtractionService>,
        qa_model: Arc<dyn ExtractiveQaModel>,
        options: SessionOptions,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            extractor,
            qa_model,
            options,
            phase: SessionPhase::Idle,
            document_name: None,
            document_text: None,
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document_name.as_deref()
    }

    pub fn document_text(&self) -> Option<&str> {
        self.document_text.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Replaces the current document with `document` and extracts its text.
    ///
    /// The previous text is discarded before extraction starts, so a failed
    /// upload never leaves the old document answerable.
    pub async fn upload(&mut self, document: UploadedDocument) -> UploadOutcome {
        self.replace_document(&document.file_name);
        self.phase = SessionPhase::Extracting;

        match self.extractor.extract(document).await {
            Ok(text) if !text.trim().is_empty() => {
                let characters = text.chars().count();
                self.document_text = Some(text);
                self.phase = SessionPhase::Ready;
                UploadOutcome::Ready { characters }
            }
            Ok(_) => {
                self.phase = SessionPhase::Blocked;
                UploadOutcome::Empty
            }
            Err(e) => {
                self.phase = SessionPhase::Blocked;
                UploadOutcome::Failed(e)
            }
        }
    }

    /// Records an upload that was refused before extraction (wrong type, too
    /// large). The previous document is discarded and the session is blocked
    /// until a usable file arrives.
    pub fn reject_upload(&mut self, file_name: &str) {
        self.replace_document(file_name);
        self.phase = SessionPhase::Blocked;
    }

    fn replace_document(&mut self, file_name: &str) {
        self.document_text = None;
        self.document_name = Some(file_name.to_string());
        if self.options.clear_transcript_on_upload {
            self.transcript.clear();
        }
    }

    /// Answers `question` against the current document and records both sides.
    ///
    /// A model error leaves the transcript untouched.
    pub async fn ask(&mut self, question: &str) -> PortResult<AskOutcome> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(AskOutcome::Ignored);
        }
        let context = match (self.phase, self.document_text.as_deref()) {
            (SessionPhase::Ready, Some(text)) => text,
            _ => return Ok(AskOutcome::NotReady),
        };

        let reply = answer(self.qa_model.as_ref(), context, question).await?;

        self.transcript.append(Speaker::Asker, question);
        self.transcript.append(Speaker::Responder, reply.clone());
        Ok(AskOutcome::Answered { answer: reply })
    }

    /// Forgets the document and the conversation.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.document_text = None;
        self.document_name = None;
        self.phase = SessionPhase::Idle;
    }
}

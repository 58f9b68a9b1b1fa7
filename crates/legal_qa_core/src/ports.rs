//! crates/legal_qa_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific parsing libraries or model backends.

use async_trait::async_trait;
use crate::domain::UploadedDocument;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Model backend error: {0}")]
    Backend(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Why a document produced no text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("could not read PDF: {0}")]
    Pdf(String),
    #[error("could not read Word document: {0}")]
    WordDocument(String),
    #[error("extraction task failed: {0}")]
    Task(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Turns an uploaded file into plain text.
    ///
    /// `Ok("")` means the file was readable but carried no text.
    async fn extract(&self, document: UploadedDocument) -> Result<String, ExtractionError>;
}

/// What an extractive model returns for one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QaPrediction {
    pub answer: String,
    pub score: f32,
}

#[async_trait]
pub trait ExtractiveQaModel: Send + Sync {
    /// Picks the span of `context` that best answers `question`.
    /// `None` when the model finds nothing worth returning.
    async fn infer(&self, context: &str, question: &str) -> PortResult<Option<QaPrediction>>;
}

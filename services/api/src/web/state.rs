//! services/api/src/web/state.rs
//!
//! Defines the application's shared and session-specific states.

use crate::{
    adapters::{DocumentTextExtractor, LexicalQaModel, OpenAiQaAdapter},
    config::{Config, QaBackend},
};
use async_openai::{config::OpenAIConfig, Client};
use legal_qa_core::{
    ports::{ExtractiveQaModel, TextExtractionService},
    session::{ChatSession, SessionOptions},
};
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn TextExtractionService>,
    pub qa_model: Arc<dyn ExtractiveQaModel>,
}

impl AppState {
    /// Wires up the adapters selected by `config`.
    pub fn from_config(config: Arc<Config>) -> Self {
        let qa_model: Arc<dyn ExtractiveQaModel> = match &config.qa_backend {
            QaBackend::Local => {
                info!("Using the local lexical QA model (min score {}).", config.qa_min_score);
                Arc::new(LexicalQaModel::new(config.qa_min_score))
            }
            QaBackend::OpenAi { api_key, base_url } => {
                info!("Using OpenAI QA model '{}'.", config.qa_model);
                let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
                if let Some(base_url) = base_url {
                    openai_config = openai_config.with_api_base(base_url);
                }
                Arc::new(OpenAiQaAdapter::new(
                    Client::with_config(openai_config),
                    config.qa_model.clone(),
                ))
            }
        };

        Self {
            config,
            extractor: Arc::new(DocumentTextExtractor::new()),
            qa_model,
        }
    }

    /// Starts a fresh chat session backed by the shared adapters.
    pub fn new_session(&self) -> ChatSession {
        ChatSession::new(
            self.extractor.clone(),
            self.qa_model.clone(),
            SessionOptions {
                clear_transcript_on_upload: self.config.clear_transcript_on_upload,
            },
        )
    }
}

//=========================================================================================
// SessionState (Specific to One WebSocket Connection)
//=========================================================================================

/// A file whose bytes are still arriving.
#[derive(Debug)]
pub struct PendingUpload {
    pub file_name: String,
    pub declared_type: Option<String>,
    pub buffer: Vec<u8>,
    /// Set once the buffer passes the configured size limit; the bytes are dropped.
    pub oversized: bool,
}

/// The state for a single, active WebSocket connection.
pub struct SessionState {
    pub chat: ChatSession,
    pub pending_upload: Option<PendingUpload>,
    max_upload_bytes: Option<usize>,
}

impl SessionState {
    pub fn new(chat: ChatSession, max_upload_bytes: Option<usize>) -> Self {
        Self {
            chat,
            pending_upload: None,
            max_upload_bytes,
        }
    }

    /// Opens a new upload, dropping any that was never finished.
    pub fn begin_upload(&mut self, file_name: String, declared_type: Option<String>) {
        self.pending_upload = Some(PendingUpload {
            file_name,
            declared_type,
            buffer: Vec::new(),
            oversized: false,
        });
    }

    /// Appends a chunk to the open upload. Returns false when no upload is open.
    pub fn push_upload_chunk(&mut self, chunk: &[u8]) -> bool {
        let limit = self.max_upload_bytes;
        let Some(upload) = self.pending_upload.as_mut() else {
            return false;
        };
        if upload.oversized {
            return true;
        }
        if limit.is_some_and(|max| upload.buffer.len() + chunk.len() > max) {
            upload.oversized = true;
            upload.buffer = Vec::new();
        } else {
            upload.buffer.extend_from_slice(chunk);
        }
        true
    }

    pub fn max_upload_bytes(&self) -> Option<usize> {
        self.max_upload_bytes
    }
}

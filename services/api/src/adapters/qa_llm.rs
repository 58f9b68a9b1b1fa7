//! services/api/src/adapters/qa_llm.rs
//!
//! This module contains the adapter for an LLM-backed extractive QA model.
//! It implements the `ExtractiveQaModel` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are an extractive question-answering model for legal documents.

You receive the full text of a document (CONTEXT) and a QUESTION about it.

Rules:
- Answer ONLY by copying a contiguous span of the CONTEXT, word for word.
- Pick the shortest span that fully answers the question (a clause, a date, an amount, a sentence).
- Do not paraphrase, summarize, add legal advice, or use outside knowledge.
- If the CONTEXT does not contain the answer, return an empty answer.

Output format:
Respond with a single JSON object and nothing else:
{"answer": "<span copied from the context, or empty>", "score": <confidence between 0 and 1>}"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::responses::CreateResponseArgs,
    Client,
};
use async_trait::async_trait;
use legal_qa_core::ports::{ExtractiveQaModel, PortError, PortResult, QaPrediction};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("code fence pattern is valid")
});

fn user_input(context: &str, question: &str) -> String {
    format!("CONTEXT:\n---\n{}\n---\n\nQUESTION:\n{}", context, question)
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ExtractiveQaModel` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQaAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQaAdapter {
    /// Creates a new `OpenAiQaAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Reads the model's reply into a prediction. An empty or null answer means
    /// the model found nothing. A malformed score counts as zero. A reply that
    /// isn't JSON is taken as the answer text.
    fn parse_prediction(raw: &str, context: &str) -> Option<QaPrediction> {
        let body = match CODE_FENCE.captures(raw) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
            None => raw.trim(),
        };

        let (answer, score) = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(fields)) => {
                let answer = fields.get("answer").and_then(Value::as_str).unwrap_or_default();
                let score = fields.get("score").and_then(Value::as_f64).unwrap_or(0.0);
                (answer.trim().to_string(), score as f32)
            }
            Ok(Value::String(text)) => (text.trim().to_string(), 0.0),
            Ok(_) => (body.trim().to_string(), 0.0),
            Err(e) => {
                warn!("QA model reply was not JSON ({}); using it verbatim", e);
                (body.trim().to_string(), 0.0)
            }
        };

        if answer.is_empty() {
            return None;
        }
        if !context.to_lowercase().contains(&answer.to_lowercase()) {
            debug!("QA model answer is not a verbatim span of the context");
        }

        Some(QaPrediction {
            answer,
            score: score.clamp(0.0, 1.0),
        })
    }
}

//=========================================================================================
// `ExtractiveQaModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl ExtractiveQaModel for OpenAiQaAdapter {
    async fn infer(&self, context: &str, question: &str) -> PortResult<Option<QaPrediction>> {
        debug!("QUESTION: {}", question);

        let request = CreateResponseArgs::default()
            .model(&self.model)
            .instructions(SYSTEM_INSTRUCTIONS)
            .input(user_input(context, question))
            .max_output_tokens(400u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Backend(e.to_string()))?;

        let raw_answer = response.output_text().unwrap_or_default();
        let prediction = Self::parse_prediction(&raw_answer, context);
        info!(
            "QA model '{}' answered: {:?}",
            self.model,
            prediction.as_ref().map(|p| p.answer.as_str())
        );
        Ok(prediction)
    }
}

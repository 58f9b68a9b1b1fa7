//! crates/legal_qa_core/src/answering.rs
//!
//! Turns a model prediction into the text shown to the user.

use crate::ports::{ExtractiveQaModel, PortResult};

/// Shown when the model has no answer for a question.
pub const NO_ANSWER_FALLBACK: &str = "No answer found.";

/// Asks `model` about `context` and returns the answer text, or the fallback
/// when the model comes back empty-handed.
pub async fn answer(
    model: &dyn ExtractiveQaModel,
    context: &str,
    question: &str,
) -> PortResult<String> {
    let prediction = model.infer(context, question).await?;
    let text = prediction
        .map(|p| p.answer.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string());
    Ok(text)
}

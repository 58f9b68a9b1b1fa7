//! services/api/src/web/qa_task.rs
//!
//! This module contains the "worker" function responsible for
//! handling a single question-and-answer cycle.

use crate::web::{
    protocol::{ServerMessage, StatusLevel},
    send_message,
    state::SessionState,
    ClientSink,
};
use legal_qa_core::{
    ports::PortResult,
    session::{AskOutcome, SessionPhase},
};
use std::time::Instant;
use tracing::{debug, error, info};

/// Answers one question and re-sends the whole transcript.
///
/// A failure inside the model is reported to the client and ends this
/// question only; the returned error is reserved for a broken connection.
pub async fn qa_process<S: ClientSink>(
    session: &mut SessionState,
    ws_sender: &mut S,
    question: &str,
) -> PortResult<()> {
    if question.trim().is_empty() {
        debug!("Ignoring empty question.");
        return Ok(());
    }
    if session.chat.phase() != SessionPhase::Ready {
        return send_message(
            ws_sender,
            &ServerMessage::status(
                StatusLevel::Warning,
                "Upload a document with readable text before asking questions.",
            ),
        )
        .await;
    }

    let start_time = Instant::now();
    info!("QA process started.");
    send_message(ws_sender, &ServerMessage::AnsweringStarted).await?;

    match session.chat.ask(question).await {
        Ok(AskOutcome::Answered { answer }) => {
            info!("Generated answer: '{}'", answer);
            info!("⏱️ Total QA process took: {:?}", start_time.elapsed());
            send_message(ws_sender, &ServerMessage::transcript(session.chat.transcript())).await?;
        }
        Ok(outcome) => {
            debug!("Question not answered: {:?}", outcome);
        }
        Err(e) => {
            error!("Error in QA process: {:?}", e);
            send_message(
                ws_sender,
                &ServerMessage::Error {
                    message: format!("Failed to answer the question: {}", e),
                },
            )
            .await?;
        }
    }

    send_message(ws_sender, &ServerMessage::AnsweringEnded).await
}

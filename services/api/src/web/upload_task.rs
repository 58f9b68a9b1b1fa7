//! services/api/src/web/upload_task.rs
//!
//! Handles a finished upload: resolve its type, extract its text, and tell the
//! client how it went.

use crate::web::{
    protocol::{ServerMessage, StatusLevel},
    send_message,
    state::SessionState,
    ClientSink,
};
use legal_qa_core::{
    domain::{is_accepted_upload, MediaType, UploadedDocument, ACCEPTED_EXTENSIONS},
    ports::PortResult,
    session::{SessionPhase, UploadOutcome},
};
use tracing::{error, info, warn};

/// Maps the outcome of an extraction onto the status line.
pub fn status_for(outcome: &UploadOutcome) -> ServerMessage {
    match outcome {
        UploadOutcome::Ready { .. } => {
            ServerMessage::status(StatusLevel::Success, "Document processed successfully.")
        }
        UploadOutcome::Empty => {
            ServerMessage::status(StatusLevel::Warning, "No text extracted from the document.")
        }
        UploadOutcome::Failed(e) => {
            ServerMessage::status(StatusLevel::Error, format!("Failed to extract text: {}", e))
        }
    }
}

/// Runs extraction for the upload that was just completed.
pub async fn process_upload<S: ClientSink>(session: &mut SessionState, ws_sender: &mut S) -> PortResult<()> {
    let Some(upload) = session.pending_upload.take() else {
        warn!("upload_ended received without an open upload.");
        return send_message(
            ws_sender,
            &ServerMessage::Error {
                message: "No upload in progress.".to_string(),
            },
        )
        .await;
    };

    let rejection = if upload.oversized {
        let limit = session.max_upload_bytes().unwrap_or_default();
        info!("Rejected '{}': larger than {} bytes.", upload.file_name, limit);
        Some(format!("File is larger than the {}-byte upload limit.", limit))
    } else if !is_accepted_upload(&upload.file_name) {
        info!("Rejected '{}': unsupported file type.", upload.file_name);
        Some(format!(
            "Unsupported file type. Accepted: {}.",
            ACCEPTED_EXTENSIONS.join(", ")
        ))
    } else {
        None
    };

    if let Some(message) = rejection {
        // The previous document must not stay answerable behind an error.
        session.chat.reject_upload(&upload.file_name);
        send_message(ws_sender, &ServerMessage::status(StatusLevel::Error, message)).await?;
        send_message(ws_sender, &ServerMessage::phase(session.chat.phase())).await?;
        return send_message(ws_sender, &ServerMessage::transcript(session.chat.transcript())).await;
    }

    let media_type = MediaType::resolve(upload.declared_type.as_deref(), &upload.file_name);
    info!(
        "Extracting '{}' as {:?} ({} bytes).",
        upload.file_name,
        media_type,
        upload.buffer.len()
    );

    send_message(ws_sender, &ServerMessage::phase(SessionPhase::Extracting)).await?;
    let document = UploadedDocument::new(upload.file_name, media_type, upload.buffer);
    let outcome = session.chat.upload(document).await;

    match &outcome {
        UploadOutcome::Ready { characters } => info!("Document ready: {} characters.", characters),
        UploadOutcome::Empty => warn!("Document contained no extractable text."),
        UploadOutcome::Failed(e) => error!("Extraction failed: {}", e),
    }

    send_message(ws_sender, &status_for(&outcome)).await?;
    send_message(ws_sender, &ServerMessage::phase(session.chat.phase())).await?;
    send_message(ws_sender, &ServerMessage::transcript(session.chat.transcript())).await
}


#[cfg(test)]
mod tests {
    use super::test_support::{phases, session_with_limit, upload};
    use super::*;
    use legal_qa_core::ports::ExtractionError;

    const LEASE: &[u8] = b"Tenant shall pay rent on the first day of each month.";

    fn level_and_message(msg: ServerMessage) -> (StatusLevel, String) {
        match msg {
            ServerMessage::Status { level, message } => (level, message),
            other => panic!("expected a status, got {:?}", other),
        }
    }

    #[test]
    fn outcomes_map_to_status_levels() {
        let (level, _) = level_and_message(status_for(&UploadOutcome::Ready { characters: 10 }));
        assert_eq!(level, StatusLevel::Success);

        let (level, message) = level_and_message(status_for(&UploadOutcome::Empty));
        assert_eq!(level, StatusLevel::Warning);
        assert_eq!(message, "No text extracted from the document.");

        let failed = UploadOutcome::Failed(ExtractionError::Pdf("invalid file header".to_string()));
        let (level, message) = level_and_message(status_for(&failed));
        assert_eq!(level, StatusLevel::Error);
        assert!(message.starts_with("Failed to extract text:"));
        assert!(message.contains("invalid file header"));
    }

    #[tokio::test]
    async fn readable_upload_reports_extracting_then_ready() {
        let mut session = session_with_limit(None);
        let sent = upload(&mut session, "lease.txt", LEASE).await;

        assert_eq!(phases(&sent), vec!["extracting", "ready"]);
        assert!(matches!(
            &sent[1],
            ServerMessage::Status { level: StatusLevel::Success, .. }
        ));
        assert!(matches!(sent.last(), Some(ServerMessage::Transcript { .. })));
        assert_eq!(session.chat.phase(), SessionPhase::Ready);
    }

    #[tokio::test]
    async fn unsupported_type_blocks_and_drops_previous_document() {
        let mut session = session_with_limit(None);
        upload(&mut session, "lease.txt", LEASE).await;

        let sent = upload(&mut session, "photo.png", b"\x89PNG").await;
        let (level, message) = level_and_message(sent[0].clone());
        assert_eq!(level, StatusLevel::Error);
        assert!(message.starts_with("Unsupported file type."));
        assert_eq!(phases(&sent), vec!["blocked"]);
        assert_eq!(session.chat.phase(), SessionPhase::Blocked);
        assert_eq!(session.chat.document_text(), None);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let mut session = session_with_limit(Some(16));
        let sent = upload(&mut session, "lease.txt", LEASE).await;

        let (level, message) = level_and_message(sent[0].clone());
        assert_eq!(level, StatusLevel::Error);
        assert!(message.contains("16-byte upload limit"));
        assert_eq!(phases(&sent), vec!["blocked"]);
        assert_eq!(session.chat.document_text(), None);
    }

    #[tokio::test]
    async fn corrupt_pdf_reports_failure_and_blocks() {
        let mut session = session_with_limit(None);
        let sent = upload(&mut session, "contract.pdf", b"not a pdf").await;

        assert_eq!(phases(&sent), vec!["extracting", "blocked"]);
        let (level, _) = level_and_message(sent[1].clone());
        assert_eq!(level, StatusLevel::Error);
    }

    #[tokio::test]
    async fn upload_end_without_start_is_an_error() {
        let mut session = session_with_limit(None);
        let mut sent = Vec::new();
        process_upload(&mut session, &mut sent).await.unwrap();

        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], ServerMessage::Error { message } if message == "No upload in progress."));
        assert_eq!(session.chat.phase(), SessionPhase::Idle);
    }
}

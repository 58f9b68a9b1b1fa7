//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! One connection is one chat session: its state lives on this task's stack and
//! is dropped when the client goes away.

use crate::web::{
    protocol::{ClientMessage, ServerMessage, StatusLevel},
    qa_task::qa_process,
    send_message,
    state::{AppState, SessionState},
    upload_task::process_upload,
    WsSender,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::StreamExt;
use legal_qa_core::ports::PortResult;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const IDLE_HINT: &str = "Upload a document to begin chatting.";

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let (mut ws_sender, mut receiver) = socket.split();
    let mut session = SessionState::new(app_state.new_session(), app_state.config.max_upload_bytes);
    let session_id = session.chat.id();
    info!("New WebSocket connection established, session {}", session_id);

    // --- 1. Initialization Phase ---
    if let Err(e) = send_greeting(&mut session, &mut ws_sender).await {
        error!("Failed to initialize session {}: {:?}", session_id, e);
        return;
    }

    // --- 2. Main Message Loop ---
    // Each message is handled to completion before the next one is read.
    while let Some(frame) = receiver.next().await {
        let result = match frame {
            Ok(Message::Text(text)) => {
                handle_text_message(text.as_str(), &mut session, &mut ws_sender).await
            }
            Ok(Message::Binary(data)) => {
                if !session.push_upload_chunk(&data) {
                    warn!("Binary frame received outside an upload; ignored.");
                }
                Ok(())
            }
            Ok(Message::Close(_)) => {
                info!("Client sent close message.");
                break;
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        };

        if let Err(e) = result {
            error!("Session {} lost its connection: {:?}", session_id, e);
            break;
        }
    }

    // --- 3. Cleanup ---
    info!(
        "WebSocket connection closed, session {} ended with {} transcript turns.",
        session_id,
        session.chat.transcript().len()
    );
}

async fn send_greeting(session: &mut SessionState, ws_sender: &mut WsSender) -> PortResult<()> {
    send_message(
        ws_sender,
        &ServerMessage::SessionInitialized {
            session_id: session.chat.id(),
        },
    )
    .await?;
    send_message(ws_sender, &ServerMessage::phase(session.chat.phase())).await?;
    send_message(ws_sender, &ServerMessage::status(StatusLevel::Info, IDLE_HINT)).await
}

/// Helper function to handle the logic for different `ClientMessage` variants.
async fn handle_text_message(
    text: &str,
    session: &mut SessionState,
    ws_sender: &mut WsSender,
) -> PortResult<()> {
    let client_msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            return send_message(
                ws_sender,
                &ServerMessage::Error {
                    message: format!("Unrecognized message: {}", e),
                },
            )
            .await;
        }
    };

    match client_msg {
        ClientMessage::UploadStarted {
            file_name,
            media_type,
        } => {
            info!("UploadStarted received for '{}'.", file_name);
            if session.pending_upload.is_some() {
                warn!("Previous upload was never finished; discarding it.");
            }
            session.begin_upload(file_name, media_type);
            Ok(())
        }
        ClientMessage::UploadEnded => {
            debug!("UploadEnded received.");
            process_upload(session, ws_sender).await
        }
        ClientMessage::Ask { question } => qa_process(session, ws_sender, &question).await,
        ClientMessage::Reset => {
            info!("Reset received.");
            session.pending_upload = None;
            session.chat.reset();
            send_message(ws_sender, &ServerMessage::phase(session.chat.phase())).await?;
            send_message(ws_sender, &ServerMessage::transcript(session.chat.transcript())).await?;
            send_message(ws_sender, &ServerMessage::status(StatusLevel::Info, IDLE_HINT)).await
        }
    }
}

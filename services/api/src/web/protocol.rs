//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the API server
//! for the document chat page.

use legal_qa_core::{
    domain::{ChatTurn, Transcript},
    session::SessionPhase,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: The uploaded file's bytes are sent as raw Binary frames between
// `UploadStarted` and `UploadEnded`, not as part of this enum.
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announces a file. Binary frames that follow carry its bytes.
    UploadStarted {
        file_name: String,
        /// The type the browser declared for the file, if any.
        #[serde(default)]
        media_type: Option<String>,
    },

    /// All bytes of the announced file have been sent; extract it now.
    UploadEnded,

    /// A question about the current document.
    Ask { question: String },

    /// Forget the document and the conversation.
    Reset,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One transcript line as the page renders it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    pub speaker: &'static str,
    pub message: String,
}

impl From<&ChatTurn> for TurnView {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            speaker: turn.speaker().label(),
            message: turn.message().to_string(),
        }
    }
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once when the connection opens.
    SessionInitialized { session_id: Uuid },

    /// The status line under the upload control.
    Status { level: StatusLevel, message: String },

    /// The session moved to a new phase. The question box is only enabled in `ready`.
    Phase { phase: &'static str },

    /// The server is working on a question. The UI can show a spinner.
    AnsweringStarted,

    /// The answer (or error) for the last question has been sent.
    AnsweringEnded,

    /// The full transcript, to be re-rendered in place of the old one.
    Transcript { turns: Vec<TurnView> },

    /// Reports a failure of the last action.
    Error { message: String },
}

impl ServerMessage {
    pub fn status(level: StatusLevel, message: impl Into<String>) -> Self {
        ServerMessage::Status {
            level,
            message: message.into(),
        }
    }

    pub fn phase(phase: SessionPhase) -> Self {
        ServerMessage::Phase {
            phase: phase.as_str(),
        }
    }

    pub fn transcript(transcript: &Transcript) -> Self {
        ServerMessage::Transcript {
            turns: transcript.all().iter().map(TurnView::from).collect(),
        }
    }
}

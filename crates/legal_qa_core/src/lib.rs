pub mod answering;
pub mod domain;
pub mod ports;
pub mod session;

pub use answering::{answer, NO_ANSWER_FALLBACK};
pub use domain::{is_accepted_upload, ChatTurn, MediaType, Speaker, Transcript, UploadedDocument};
pub use ports::{
    ExtractionError, ExtractiveQaModel, PortError, PortResult, QaPrediction, TextExtractionService,
};
pub use session::{AskOutcome, ChatSession, SessionOptions, SessionPhase, UploadOutcome};

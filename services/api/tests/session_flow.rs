//! End-to-end runs of a chat session over the real extractor and the local model.

use api_lib::{
    adapters::{DocumentTextExtractor, LexicalQaModel},
    config::Config,
    web::state::AppState,
};
use legal_qa_core::{
    domain::{MediaType, Speaker, UploadedDocument},
    session::{AskOutcome, ChatSession, SessionOptions, SessionPhase, UploadOutcome},
    NO_ANSWER_FALLBACK,
};
use std::io::{Cursor, Write};
use std::sync::Arc;

fn local_session(options: SessionOptions) -> ChatSession {
    ChatSession::new(
        Arc::new(DocumentTextExtractor::new()),
        Arc::new(LexicalQaModel::default()),
        options,
    )
}

fn docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn plain_text_upload_then_question() {
    let mut session = local_session(SessionOptions::default());
    let document = UploadedDocument::new(
        "lease.txt",
        MediaType::resolve(Some("text/plain"), "lease.txt"),
        b"Tenant shall pay rent by the 1st of each month.".to_vec(),
    );

    assert!(matches!(session.upload(document).await, UploadOutcome::Ready { .. }));
    assert_eq!(session.phase(), SessionPhase::Ready);

    let outcome = session.ask("When is rent due?").await.unwrap();
    assert!(matches!(outcome, AskOutcome::Answered { .. }));

    let turns = session.transcript().all();
    let (question, answer) = (&turns[turns.len() - 2], &turns[turns.len() - 1]);
    assert_eq!(question.speaker(), Speaker::Asker);
    assert_eq!(question.message(), "When is rent due?");
    assert_eq!(answer.speaker(), Speaker::Responder);
    assert!(answer.message().contains("1st of each month"));
}

#[tokio::test]
async fn word_document_upload_answers_from_the_right_paragraph() {
    let mut session = local_session(SessionOptions::default());
    let bytes = docx(&[
        "RESIDENTIAL LEASE AGREEMENT",
        "",
        "The contract term is 12 months.",
        "The security deposit is refundable within 30 days.",
    ]);
    let document = UploadedDocument::new(
        "lease.docx",
        MediaType::resolve(Some("application/octet-stream"), "lease.docx"),
        bytes,
    );

    assert!(matches!(session.upload(document).await, UploadOutcome::Ready { .. }));
    session.ask("What is the contract term?").await.unwrap();

    let last = session.transcript().all().last().unwrap();
    assert!(last.message().contains("12 months"));
}

#[tokio::test]
async fn unanswerable_question_gets_the_fallback() {
    let mut session = local_session(SessionOptions::default());
    let document = UploadedDocument::new(
        "nda.txt",
        MediaType::PlainText,
        b"The Recipient shall keep all Confidential Information secret.".to_vec(),
    );
    session.upload(document).await;
    session.ask("Who won the football game?").await.unwrap();

    assert_eq!(session.transcript().all().last().unwrap().message(), NO_ANSWER_FALLBACK);
}

#[tokio::test]
async fn corrupt_pdf_blocks_until_the_next_upload() {
    let mut session = local_session(SessionOptions::default());
    let corrupt = UploadedDocument::new("lease.pdf", MediaType::Pdf, b"%PDF-1.7 truncated".to_vec());

    assert!(matches!(session.upload(corrupt).await, UploadOutcome::Failed(_)));
    assert_eq!(session.phase(), SessionPhase::Blocked);
    assert_eq!(session.ask("When is rent due?").await.unwrap(), AskOutcome::NotReady);
    assert!(session.transcript().is_empty());

    let good = UploadedDocument::new("lease.txt", MediaType::PlainText, b"Rent is due on Fridays.".to_vec());
    assert!(matches!(session.upload(good).await, UploadOutcome::Ready { .. }));
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn transcript_survives_a_new_upload_unless_configured_otherwise() {
    for (clear, expected_turns) in [(false, 2), (true, 0)] {
        let mut session = local_session(SessionOptions {
            clear_transcript_on_upload: clear,
        });
        let first = UploadedDocument::new("a.txt", MediaType::PlainText, b"Rent is 900 dollars.".to_vec());
        session.upload(first).await;
        session.ask("How much is rent?").await.unwrap();

        let second = UploadedDocument::new("b.txt", MediaType::PlainText, b"Deposit is 500 dollars.".to_vec());
        session.upload(second).await;
        assert_eq!(session.transcript().len(), expected_turns, "clear = {}", clear);
    }
}

#[tokio::test]
async fn app_state_sessions_follow_the_configured_policy() {
    let config = Config::from_lookup(|key| match key {
        "CLEAR_TRANSCRIPT_ON_UPLOAD" => Some("true".to_string()),
        _ => None,
    })
    .unwrap();
    let app_state = AppState::from_config(Arc::new(config));
    let mut session = app_state.new_session();

    let doc = UploadedDocument::new("a.txt", MediaType::PlainText, b"Rent is 900 dollars.".to_vec());
    session.upload(doc).await;
    session.ask("How much is rent?").await.unwrap();
    assert_eq!(session.transcript().len(), 2);

    let doc = UploadedDocument::new("b.txt", MediaType::PlainText, b"Deposit is 500 dollars.".to_vec());
    session.upload(doc).await;
    assert!(session.transcript().is_empty());
}

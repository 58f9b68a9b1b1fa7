//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use legal_qa_core::domain::{is_accepted_upload, MediaType, UploadedDocument, ACCEPTED_EXTENSIONS};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        extract_handler,
    ),
    components(
        schemas(ExtractResponse)
    ),
    tags(
        (name = "Legal Document Q&A API", description = "Text extraction for the document chat page.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after a document's text was extracted.
#[derive(Serialize, ToSchema, Debug)]
pub struct ExtractResponse {
    pub file_name: String,
    /// The media type the file was read as.
    pub media_type: String,
    /// Number of characters in `text`; zero when the file carries no text layer.
    pub characters: usize,
    pub text: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Extract the plain text of an uploaded document.
///
/// Accepts a multipart/form-data request with a single file part
/// (`.pdf`, `.docx` or `.txt`).
#[utoipa::path(
    post,
    path = "/extract",
    request_body(content_type = "multipart/form-data", description = "The document to read."),
    responses(
        (status = 200, description = "Text extracted (possibly empty)", body = ExtractResponse),
        (status = 400, description = "Bad request (e.g., missing or unsupported file)"),
        (status = 422, description = "The file could not be parsed as its declared type"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn extract_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read multipart data: {}", e),
            )
        })?
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;

    let file_name = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "Multipart form must include a file".to_string(),
            )
        })?;
    let declared_type = field.content_type().map(str::to_string);
    if !is_accepted_upload(&file_name) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Unsupported file type for '{}'. Accepted: {}",
                file_name,
                ACCEPTED_EXTENSIONS.join(", ")
            ),
        ));
    }

    let data = field.bytes().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read file bytes: {}", e),
        )
    })?;

    let media_type = MediaType::resolve(declared_type.as_deref(), &file_name);
    info!("REST extraction of '{}' as {:?}", file_name, media_type);

    let document = UploadedDocument::new(file_name.clone(), media_type, data);
    match app_state.extractor.extract(document).await {
        Ok(text) => Ok(Json(ExtractResponse {
            file_name,
            media_type: media_type.mime().to_string(),
            characters: text.chars().count(),
            text,
        })),
        Err(e) => {
            error!("Failed to extract '{}': {}", file_name, e);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Failed to extract text: {}", e),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request},
        routing::post,
        Router,
    };
    use tower::ServiceExt;

    const BOUNDARY: &str = "lease-boundary";

    fn app() -> Router {
        let config = Arc::new(Config::from_lookup(|_| None).expect("default config"));
        Router::new()
            .route("/extract", post(extract_handler))
            .with_state(Arc::new(AppState::from_config(config)))
    }

    /// One form part; `file_name` of `None` leaves the filename attribute out.
    fn form_part(file_name: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
        let disposition = match file_name {
            Some(name) => format!(r#"form-data; name="file"; filename="{}""#, name),
            None => r#"form-data; name="file""#.to_string(),
        };
        let mut body = format!(
            "--{}\r\nContent-Disposition: {}\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, disposition, content_type
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn post_form(body: Vec<u8>) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri("/extract")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn plain_text_is_extracted() {
        let body = form_part(Some("lease.txt"), "text/plain", b"Rent is due monthly.");
        let (status, bytes) = post_form(body).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["file_name"], "lease.txt");
        assert_eq!(json["media_type"], "text/plain");
        assert_eq!(json["characters"], 20);
        assert_eq!(json["text"], "Rent is due monthly.");
    }

    #[tokio::test]
    async fn form_without_a_file_is_a_bad_request() {
        let (status, _) = post_form(format!("--{}--\r\n", BOUNDARY).into_bytes()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn part_without_a_file_name_is_a_bad_request() {
        let body = form_part(None, "text/plain", b"Rent is due monthly.");
        let (status, bytes) = post_form(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(bytes, b"Multipart form must include a file");
    }

    #[tokio::test]
    async fn unsupported_extension_is_a_bad_request() {
        let (status, bytes) = post_form(form_part(Some("photo.png"), "image/png", b"\x89PNG")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&bytes).contains("Unsupported file type"));
    }

    #[tokio::test]
    async fn corrupt_pdf_is_unprocessable() {
        let body = form_part(Some("contract.pdf"), "application/pdf", b"not a pdf");
        let (status, bytes) = post_form(body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(String::from_utf8_lossy(&bytes).starts_with("Failed to extract text:"));
    }
}

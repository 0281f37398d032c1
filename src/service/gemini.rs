//! Gemini REST client: Files API upload + `generateContent`.
//!
//! ## Upload
//!
//! Uses the resumable protocol in two requests:
//! 1. `POST {base}/upload/v1beta/files` with `X-Goog-Upload-Command: start`
//!    and the byte count / content type as headers. The response carries the
//!    session URL in `x-goog-upload-url`.
//! 2. `POST {session}` with the raw bytes and
//!    `X-Goog-Upload-Command: upload, finalize`. The response body is the
//!    stored `File` resource.
//!
//! ## Generate
//!
//! `POST {base}/v1beta/models/{model}:generateContent` with the system
//! instruction, one user turn (`[text, fileData]`), and the generation config.
//! The first candidate's text parts are concatenated into the result.

use super::{GenerateRequest, UploadedFile, VisionService};
use crate::config::{GenerationSettings, RenameConfig, API_KEY_ENV};
use crate::error::{RenameError, ServiceError};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// [`VisionService`] backed by the Google Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Point the client at another endpoint (proxy, mock server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a client from the run configuration.
    ///
    /// The API key comes from `config.api_key`, falling back to
    /// `GEMINI_API_KEY`.
    pub fn from_config(config: &RenameConfig) -> Result<Self, RenameError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), std::env::var(API_KEY_ENV).ok())?;
        Ok(Self::new(api_key, &config.model).with_base_url(&config.base_url))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Pick the explicit key if present, else the environment value.
fn resolve_api_key(explicit: Option<&str>, env: Option<String>) -> Result<String, RenameError> {
    explicit
        .map(str::to_string)
        .or(env)
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| RenameError::ProviderNotConfigured {
            provider: "gemini".to_string(),
            hint: format!("Set {API_KEY_ENV} or pass --api-key."),
        })
}

#[async_trait]
impl VisionService for GeminiClient {
    async fn upload(&self, path: &Path, mime_type: &str) -> Result<UploadedFile, ServiceError> {
        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUpload {
                file: FileMetadata {
                    display_name: &display_name,
                },
            })
            .send()
            .await?;
        let start = check_status(start).await?;

        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ServiceError::MalformedResponse(format!("missing {UPLOAD_URL_HEADER} header"))
            })?;
        debug!("Upload session for {}: {}", display_name, session_url);

        let finish = self
            .http
            .post(&session_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let finish = check_status(finish).await?;
        let stored: UploadResponse = finish.json().await?;

        let file = UploadedFile {
            display_name: stored
                .file
                .display_name
                .unwrap_or_else(|| display_name.clone()),
            name: stored.file.name,
            uri: stored.file.uri,
            mime_type: stored.file.mime_type.unwrap_or_else(|| mime_type.to_string()),
        };
        info!("Uploaded file '{}' as: {}", file.display_name, file.uri);
        Ok(file)
    }

    async fn generate(
        &self,
        file: &UploadedFile,
        request: GenerateRequest<'_>,
    ) -> Result<String, ServiceError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text(request.system_instruction)],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::Text(request.instruction),
                    Part::FileData(FileData {
                        mime_type: &file.mime_type,
                        file_uri: &file.uri,
                    }),
                ],
            }],
            generation_config: GenerationConfig::from(request.settings),
        };

        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;
        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_text()
    }
}

/// Map non-success statuses to [`ServiceError`], keeping the API's message.
async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&raw)
        .map(|b| b.error.message)
        .unwrap_or(raw);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Auth {
            status: status.as_u16(),
            message,
        },
        _ => ServiceError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StartUpload<'a> {
    file: FileMetadata<'a>,
}

#[derive(Serialize)]
struct FileMetadata<'a> {
    display_name: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    display_name: Option<String>,
    mime_type: Option<String>,
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    FileData(FileData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

impl<'a> From<&'a GenerationSettings> for GenerationConfig<'a> {
    fn from(s: &'a GenerationSettings) -> Self {
        Self {
            temperature: s.temperature,
            top_p: s.top_p,
            top_k: s.top_k,
            max_output_tokens: s.max_output_tokens,
            response_mime_type: &s.response_mime_type,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, ServiceError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "none given".to_string());
            return Err(ServiceError::MalformedResponse(format!(
                "no candidates returned (block reason: {reason})"
            )));
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if texts.is_empty() {
            return Err(ServiceError::MalformedResponse(format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(texts.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key", "gemini-2.0-flash").with_base_url(server.uri())
    }

    fn uploaded() -> UploadedFile {
        UploadedFile {
            name: "files/abc".into(),
            display_name: "photo.png".into(),
            uri: "https://example.test/files/abc".into(),
            mime_type: "image/png".into(),
        }
    }

    #[test]
    fn test_explicit_key_wins_over_env() {
        let key = resolve_api_key(Some("explicit"), Some("env".into())).unwrap();
        assert_eq!(key, "explicit");
        let key = resolve_api_key(None, Some("env".into())).unwrap();
        assert_eq!(key, "env");
    }

    #[test]
    fn test_missing_key_is_provider_not_configured() {
        let err = resolve_api_key(None, None).unwrap_err();
        assert!(matches!(err, RenameError::ProviderNotConfigured { .. }));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(resolve_api_key(Some("  "), None).is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let c = GeminiClient::new("secret-key", "m");
        assert!(!format!("{c:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn test_upload_runs_resumable_protocol() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("photo.png");
        std::fs::write(&image, b"\x89PNG fake").unwrap();

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .and(header("x-goog-api-key", "test-key"))
            .and(header("x-goog-upload-command", "start"))
            .and(header("x-goog-upload-header-content-type", "image/png"))
            .and(body_partial_json(json!({"file": {"display_name": "photo.png"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-goog-upload-url", format!("{}/session/1", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/session/1"))
            .and(header("x-goog-upload-offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file": {
                    "name": "files/abc",
                    "displayName": "photo.png",
                    "mimeType": "image/png",
                    "uri": "https://example.test/files/abc"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = client(&server).upload(&image, "image/png").await.unwrap();
        assert_eq!(file, uploaded());
    }

    #[tokio::test]
    async fn test_upload_without_session_header_is_malformed() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        std::fs::write(&image, b"jpeg").unwrap();

        Mock::given(method("POST"))
            .and(path("/upload/v1beta/files"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = client(&server).upload(&image, "image/jpeg").await.unwrap_err();
        assert!(matches!(err, ServiceError::MalformedResponse(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_upload_of_missing_file_is_io_error() {
        let server = MockServer::start().await;
        let err = client(&server)
            .upload(Path::new("/definitely/not/here.png"), "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Io(_)), "got: {err}");
    }

    #[tokio::test]
    async fn test_generate_sends_config_and_file_reference() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "name it"},
                        {"fileData": {"mimeType": "image/png", "fileUri": "https://example.test/files/abc"}}
                    ]
                }],
                "generationConfig": {
                    "topK": 40,
                    "maxOutputTokens": 8192,
                    "responseMimeType": "text/plain"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "golden-"}, {"text": "retriever-puppy"}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = GenerationSettings::default();
        let text = client(&server)
            .generate(
                &uploaded(),
                GenerateRequest {
                    system_instruction: "sys",
                    instruction: "name it",
                    settings: &settings,
                },
            )
            .await
            .unwrap();
        assert_eq!(text, "golden-retriever-puppy");
    }

    #[tokio::test]
    async fn test_generate_maps_forbidden_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
            })))
            .mount(&server)
            .await;

        let settings = GenerationSettings::default();
        let err = client(&server)
            .generate(
                &uploaded(),
                GenerateRequest {
                    system_instruction: "sys",
                    instruction: "name it",
                    settings: &settings,
                },
            )
            .await
            .unwrap_err();
        match err {
            ServiceError::Auth { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_server_error_keeps_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let settings = GenerationSettings::default();
        let err = client(&server)
            .generate(
                &uploaded(),
                GenerateRequest {
                    system_instruction: "sys",
                    instruction: "name it",
                    settings: &settings,
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"), "got: {err}");
        assert!(err.to_string().contains("backend exploded"), "got: {err}");
    }

    #[test]
    fn test_blocked_prompt_reports_reason() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = resp.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"), "got: {err}");
    }
}

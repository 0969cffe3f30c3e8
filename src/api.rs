// API client module: a small blocking HTTP client for the two cleaning
// endpoints. The caller decides where the blocking call runs; the terminal
// front end moves it to a worker thread so the UI keeps ticking.

use crate::error::Result;
use crate::input::FileInput;
use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default service address when neither `--server-url` nor `UNICODEFIX_URL` is set.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Anything that can clean text. Implemented by [`ApiClient`] and by test
/// doubles.
pub trait CleaningService: Send + Sync {
    fn clean_text(&self, text: &str) -> ApiOutcome;
    fn clean_file(&self, file: &FileInput) -> ApiOutcome;
}

/// Body of `POST /api/clean-text`.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CleanTextRequest<'a> {
    pub text: &'a str,
    pub preserve_formatting: bool,
}

/// Wire shape shared by both endpoints. Every field is optional on the wire;
/// [`ApiOutcome::from_body`] decides what a usable answer looks like.
#[derive(Deserialize, Debug, Default)]
pub struct CleanResponse {
    #[serde(default)]
    pub success: bool,
    pub cleaned_text: Option<String>,
    #[serde(default)]
    pub changes_made: u64,
    #[serde(default)]
    pub original_size: u64,
    #[serde(default)]
    pub cleaned_size: u64,
    pub error: Option<String>,
    /// Rejections raised by the service framework carry `detail` instead of
    /// `error`. It is usually a string but may be a list of field errors.
    pub detail: Option<serde_json::Value>,
}

/// Cleaned text and statistics from a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningResult {
    pub cleaned_text: String,
    pub changes_made: u64,
    pub original_size: u64,
    pub cleaned_size: u64,
}

/// How a request resolved. Failures are values, not errors: the controller
/// turns each variant into a banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome {
    Cleaned(CleaningResult),
    /// The service answered and said no. `message` is its explanation, if any.
    Rejected { message: Option<String> },
    /// No usable answer: connection failure or an unparseable body. The
    /// string is for logs only.
    Unreachable(String),
}

impl ApiOutcome {
    /// Interpret a response body. The HTTP status is deliberately ignored:
    /// the service reports failures inside the JSON.
    pub fn from_body(body: &str) -> Self {
        let resp: CleanResponse = match serde_json::from_str(body) {
            Ok(resp) => resp,
            Err(e) => return ApiOutcome::Unreachable(format!("malformed response body: {}", e)),
        };

        if !resp.success {
            let message = resp
                .error
                .filter(|m| !m.is_empty())
                .or_else(|| match resp.detail {
                    Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
                    _ => None,
                });
            return ApiOutcome::Rejected { message };
        }

        match resp.cleaned_text {
            Some(cleaned_text) => ApiOutcome::Cleaned(CleaningResult {
                cleaned_text,
                changes_made: resp.changes_made,
                original_size: resp.original_size,
                cleaned_size: resp.cleaned_size,
            }),
            None => ApiOutcome::Unreachable("success response without cleaned_text".into()),
        }
    }
}

/// Blocking client holding a reqwest client and the service base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`. A trailing slash is tolerated.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a prepared request and interpret whatever comes back.
    fn send(&self, req: RequestBuilder) -> ApiOutcome {
        let res = match req.send() {
            Ok(res) => res,
            Err(e) => return ApiOutcome::Unreachable(format!("request failed: {}", e)),
        };
        let status = res.status();
        let body = match res.text() {
            Ok(body) => body,
            Err(e) => return ApiOutcome::Unreachable(format!("reading body failed: {}", e)),
        };
        debug!(%status, bytes = body.len(), "cleaning service responded");
        ApiOutcome::from_body(&body)
    }
}

impl CleaningService for ApiClient {
    /// `POST /api/clean-text`. Formatting preservation is always requested.
    fn clean_text(&self, text: &str) -> ApiOutcome {
        let body = CleanTextRequest {
            text,
            preserve_formatting: true,
        };
        self.send(self.client.post(self.url("/api/clean-text")).json(&body))
    }

    /// `POST /api/clean-file` with the file as the single multipart field.
    fn clean_file(&self, file: &FileInput) -> ApiOutcome {
        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = multipart::Form::new().part("file", part);
        self.send(self.client.post(self.url("/api/clean-file")).multipart(form))
    }
}

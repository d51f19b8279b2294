use std::time::Instant;

use omnicaption_config::ApiConfig;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use strum::IntoEnumIterator;
use url::Url;

use crate::error::{CaptionClientError, Result};
use crate::types::{
    CaptionsResponse, FormField, GenerationRequest, HealthStatus, ImageUpload, Platform, Tone,
};

/// Path of the caption generation endpoint, relative to the base URL
const GENERATE_PATH: &str = "/api/generate";

/// Path of the service health endpoint
const HEALTH_PATH: &str = "/health";

/// Typed client for the caption generation API
///
/// Sends exactly one request per call: no retries and no timeout beyond the
/// transport defaults.
#[derive(Debug, Clone)]
pub struct CaptionClient {
    base_url: Url,
    http: reqwest::Client,
}

impl CaptionClient {
    /// Create a new client pointing at the given base URL
    ///
    /// # Errors
    ///
    /// Returns a config error if the URL cannot be parsed, is not http(s),
    /// or has no host
    pub fn new(base_url: &str) -> Result<Self> {
        let config = ApiConfig::with_base_url(base_url)
            .map_err(|e| CaptionClientError::Config(e.to_string()))?;

        Ok(Self::from_config(&config))
    }

    /// Create a client from resolved configuration
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::with_http(config.base_url.clone(), reqwest::Client::new())
    }

    /// Create a client that shares an existing HTTP connection pool
    pub const fn with_http(base_url: Url, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }

    /// Base URL requests are sent to
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Generate captions for a request
    ///
    /// The request is validated first; an empty request never reaches the
    /// network.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty request, an HTTP error when the
    /// request cannot be sent, a server error for a non-2xx status or an
    /// in-band error body, and a parse error for a malformed body
    pub async fn generate(&self, request: &GenerationRequest) -> Result<CaptionsResponse> {
        request.validate()?;

        let url = make_url(&self.base_url, GENERATE_PATH);
        let form = encode_form(request)?;

        tracing::debug!(
            url = %url,
            tone = %request.tone(),
            has_topic = request.has_topic(),
            image_bytes = request.image().map_or(0, ImageUpload::len),
            "sending caption request"
        );

        let started = Instant::now();
        let result = self.send_generate(url, form).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(response) => tracing::debug!(
                elapsed_ms,
                missing = ?response.missing_platforms(),
                "captions received"
            ),
            Err(e) => tracing::warn!(elapsed_ms, error = %e, "caption request failed"),
        }

        result
    }

    /// Build a request from raw form input and generate captions for it
    ///
    /// # Errors
    ///
    /// Same as [`CaptionClient::generate`]
    pub async fn generate_captions(
        &self,
        topic: &str,
        tone: Tone,
        image: Option<ImageUpload>,
    ) -> Result<CaptionsResponse> {
        self.generate(&GenerationRequest::new(topic, tone, image)).await
    }

    /// Query the service health endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = make_url(&self.base_url, HEALTH_PATH);

        let response = self.http.get(url).send().await?;
        let body = handle_error(response).await?.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| CaptionClientError::Parse(format!("invalid health response: {e}")))
    }

    async fn send_generate(&self, url: Url, form: Form) -> Result<CaptionsResponse> {
        let response = self.http.post(url).multipart(form).send().await?;

        let response = handle_error(response).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        decode_captions(status, &body)
    }
}

// -- Helper functions --

/// Append a path to the base URL, keeping any prefix the base already has
fn make_url(base_url: &Url, path: &str) -> Url {
    let mut url = base_url.clone();
    let prefix = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{prefix}{path}"));
    url
}

/// Turn the request's fields into a multipart form
fn encode_form(request: &GenerationRequest) -> Result<Form> {
    request.form_fields().into_iter().try_fold(Form::new(), |form, field| match field {
        FormField::Text { name, value } => Ok(form.text(name, value.to_owned())),
        FormField::File { name, upload } => {
            let part = Part::bytes(upload.bytes().to_vec())
                .file_name(upload.file_name().to_owned())
                .mime_str(&upload.mime_type())
                .map_err(|e| CaptionClientError::Config(format!("invalid mime type: {e}")))?;

            Ok(form.part(name, part))
        }
    })
}

/// Check an HTTP response for errors
async fn handle_error(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(CaptionClientError::Server {
        status: status.as_u16(),
        message: parse_error_body(&body),
    })
}

/// Pull a human-readable message out of an error body
///
/// Understands `{"detail": ...}`, `{"error": "..."}` and
/// `{"error": {"message": "..."}}`; anything else is returned as-is.
fn parse_error_body(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };

    let message = match (&json["detail"], &json["error"]) {
        (Value::String(detail), _) => Some(detail.clone()),
        (Value::Null, Value::String(error)) => Some(error.clone()),
        (Value::Null, Value::Object(error)) => {
            error.get("message").and_then(Value::as_str).map(str::to_owned)
        }
        (detail @ (Value::Array(_) | Value::Object(_)), _) => Some(detail.to_string()),
        _ => None,
    };

    message.unwrap_or_else(|| body.to_owned())
}

/// Decode a successful body, treating an in-band `error` object as a failure
///
/// The body must be a JSON object carrying at least one platform key;
/// individual platforms may still be missing.
fn decode_captions(status: u16, body: &str) -> Result<CaptionsResponse> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| CaptionClientError::Parse(format!("response is not JSON: {e}")))?;

    let Value::Object(fields) = &json else {
        return Err(CaptionClientError::Parse(
            "expected a JSON object of captions".to_owned(),
        ));
    };

    let has_captions = Platform::iter().any(|platform| fields.contains_key(platform.key()));

    if !has_captions {
        if fields.contains_key("error") {
            return Err(CaptionClientError::Server {
                status,
                message: parse_error_body(body),
            });
        }

        return Err(CaptionClientError::Parse(
            "response carries no platform captions".to_owned(),
        ));
    }

    serde_json::from_value(json)
        .map_err(|e| CaptionClientError::Parse(format!("unexpected response shape: {e}")))
}

//! REST client for the ad-generation backend.
//!
//! Every request carries a fresh `x-request-id` (UUID v4) that is also
//! logged, plus the configured bearer token. Responses are decoded
//! through [`ApiEnvelope`] except for the cinematic endpoints, which use
//! their own documented shapes.

use adgen_core::error::CoreError;
use adgen_core::job::{JobSnapshot, JobTicket};
use adgen_core::user_message::{backend_message, user_message, FailureKind};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::config::ClientConfig;
use crate::envelope::ApiEnvelope;
use crate::models::{
    AvatarVideoBody, AvatarVideoRequest, BulkAdRequest, CinematicAdRequest, CinematicJobStatus,
    CinematicSubmitResponse, CreditsBalance, LogoSource, Profile, ScrapeRequest, Subscription,
};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for one backend deployment.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct AdGenApi {
    client: reqwest::Client,
    api_url: String,
    api_token: Option<String>,
}

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decode, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The backend answered `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The backend answered `success: true` without a payload.
    #[error("Response is missing its data")]
    MissingData,

    /// The request failed validation before it was sent.
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A domain rule rejected the request before it was sent.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// Which part of the failure taxonomy this error belongs to.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ApiError::Request(_) => FailureKind::Transient,
            ApiError::Status { status, .. } if *status >= 500 => FailureKind::Transient,
            ApiError::Status { .. } | ApiError::Rejected(_) | ApiError::MissingData => {
                FailureKind::Backend
            }
            ApiError::Validation(_) | ApiError::Core(_) => FailureKind::Validation,
        }
    }

    /// Message suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { body, .. } => match extract_message(body) {
                Some(message) => backend_message(&message),
                None => user_message(self.failure_kind(), ""),
            },
            ApiError::Rejected(message) => backend_message(message),
            ApiError::MissingData => {
                "The server sent an unexpected response. Please try again.".to_string()
            }
            ApiError::Validation(errors) => {
                let field_errors = errors.field_errors();
                let mut fields: Vec<&str> = field_errors.keys().map(|k| k.as_ref()).collect();
                fields.sort_unstable();
                format!("Please check: {}", fields.join(", "))
            }
            ApiError::Core(CoreError::Validation(message)) => message.clone(),
            other => user_message(other.failure_kind(), &other.to_string()),
        }
    }
}

/// Pull `message` (or `error`) out of a JSON error body.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

impl AdGenApi {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- job submission ----

    /// Start scraping a product page. `POST /scrape`.
    pub async fn submit_scrape(&self, request: &ScrapeRequest) -> Result<JobTicket, ApiError> {
        request.validate()?;
        let builder = self.request(Method::POST, &["scrape"])?.json(request);
        self.send_enveloped(builder, "/scrape").await
    }

    /// Start bulk static ad generation. `POST /ads/generate-bulk`
    /// (multipart).
    pub async fn submit_bulk_ads(&self, request: &BulkAdRequest) -> Result<JobTicket, ApiError> {
        request.validate()?;
        let form = bulk_ad_form(request)?;
        tracing::debug!(
            product_id = %request.product_id,
            count = request.count,
            aspect_ratio = request.aspect_ratio.as_str(),
            "Submitting bulk ad generation",
        );
        let builder = self
            .request(Method::POST, &["ads", "generate-bulk"])?
            .multipart(form);
        self.send_enveloped(builder, "/ads/generate-bulk").await
    }

    /// Start an avatar video. `POST /avatar/generate-video`.
    ///
    /// Missing selections are reported before any request is made.
    pub async fn submit_avatar_video(
        &self,
        request: &AvatarVideoRequest,
    ) -> Result<JobTicket, ApiError> {
        request.selection.validate()?;
        let sel = &request.selection;
        let body = AvatarVideoBody {
            script: sel.script.as_deref().unwrap_or_default(),
            avatar_id: sel.avatar_id.as_deref().unwrap_or_default(),
            voice_id: sel.voice_id.as_deref().unwrap_or_default(),
            product_id: request.product_id.as_deref(),
        };
        let builder = self
            .request(Method::POST, &["avatar", "generate-video"])?
            .json(&body);
        self.send_enveloped(builder, "/avatar/generate-video").await
    }

    /// Start a cinematic ad. `POST /cinematic-ad/generate`.
    pub async fn submit_cinematic_ad(
        &self,
        request: &CinematicAdRequest,
    ) -> Result<JobTicket, ApiError> {
        request.validate()?;
        let builder = self
            .request(Method::POST, &["cinematic-ad", "generate"])?
            .json(request);
        let response: CinematicSubmitResponse =
            self.send_json(builder, "/cinematic-ad/generate").await?;
        response.into_ticket()
    }

    // ---- job status ----

    /// Read a job's status. `GET /jobs/{job_id}`.
    pub async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let path = format!("/jobs/{job_id}");
        let builder = self.request(Method::GET, &["jobs", job_id])?;
        self.send_enveloped(builder, &path).await
    }

    /// Read a cinematic job's status. `GET /cinematic-ad/jobs/{job_id}`.
    pub async fn cinematic_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let path = format!("/cinematic-ad/jobs/{job_id}");
        let builder = self.request(Method::GET, &["cinematic-ad", "jobs", job_id])?;
        let status: CinematicJobStatus = self.send_json(builder, &path).await?;
        Ok(status.into())
    }

    // ---- account ----

    /// `GET /credits/balance`.
    pub async fn credits_balance(&self) -> Result<CreditsBalance, ApiError> {
        let builder = self.request(Method::GET, &["credits", "balance"])?;
        self.send_enveloped(builder, "/credits/balance").await
    }

    /// `GET /subscription/current`.
    pub async fn subscription(&self) -> Result<Subscription, ApiError> {
        let builder = self.request(Method::GET, &["subscription", "current"])?;
        self.send_enveloped(builder, "/subscription/current").await
    }

    /// `GET /auth/profile`.
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        let builder = self.request(Method::GET, &["auth", "profile"])?;
        self.send_enveloped(builder, "/auth/profile").await
    }

    // ---- private helpers ----

    /// `{api_url}/{segments...}` with each segment percent-encoded, so
    /// an opaque job id can never change the path or add a query.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ApiError> {
        let invalid = |reason: String| {
            CoreError::Internal(format!("Invalid API URL '{}': {reason}", self.api_url))
        };
        let mut url = reqwest::Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("not a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send with a fresh request id and decode the JSON body as `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(request_id = %request_id, path, "Sending backend request");

        let response = builder
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(request_id = %request_id, path, error = %e, "Backend request failed");
                e
            })?;

        let response = Self::ensure_success(response).await.map_err(|e| {
            tracing::warn!(request_id = %request_id, path, error = %e, "Backend returned an error");
            e
        })?;
        Ok(response.json::<T>().await?)
    }

    /// Send and unwrap the `{ success, data }` envelope.
    async fn send_enveloped<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let envelope: ApiEnvelope<T> = self.send_json(builder, path).await?;
        envelope.into_result()
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Build the multipart form for bulk ad generation.
fn bulk_ad_form(request: &BulkAdRequest) -> Result<Form, ApiError> {
    let colors = request.normalized_colors()?;
    let colors_json = serde_json::to_string(&colors)
        .map_err(|e| CoreError::Internal(format!("Failed to encode colors: {e}")))?;
    let images_json = serde_json::to_string(&request.product_image_urls)
        .map_err(|e| CoreError::Internal(format!("Failed to encode image URLs: {e}")))?;

    let mut form = Form::new()
        .text("brand_id", request.brand_id.clone())
        .text("product_id", request.product_id.clone())
        .text("colors", colors_json)
        .text("product_image_urls", images_json)
        .text("count", request.count.to_string())
        .text("aspect_ratio", request.aspect_ratio.as_str())
        .text("lang", request.lang.clone());

    match &request.logo {
        Some(LogoSource::File {
            file_name,
            mime,
            bytes,
        }) => {
            let part = Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str(mime)?;
            form = form.part("logo", part);
        }
        Some(LogoSource::Url(url)) => {
            form = form.text("logo_url", url.clone());
        }
        None => {}
    }

    Ok(form)
}

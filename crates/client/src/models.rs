//! Request and response bodies for the backend endpoints.

use adgen_core::error::CoreError;
use adgen_core::job::{JobProgress, JobSnapshot, JobState, JobTicket};
use adgen_core::types::Timestamp;
use adgen_core::validation::{normalize_hex_color, AvatarVideoSelection};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ---------------------------------------------------------------------------
// Scraping
// ---------------------------------------------------------------------------

/// Import a product by scraping its page.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ScrapeRequest {
    #[validate(url)]
    pub url: String,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Bulk ad generation
// ---------------------------------------------------------------------------

/// Output aspect ratio for generated creatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:5")]
    Feed,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Feed => "4:5",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
        }
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "4:5" => Ok(AspectRatio::Feed),
            "9:16" => Ok(AspectRatio::Portrait),
            "16:9" => Ok(AspectRatio::Landscape),
            other => Err(CoreError::Validation(format!(
                "Unsupported aspect ratio '{other}'"
            ))),
        }
    }
}

/// Brand logo, either uploaded or referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
    Url(String),
}

/// Generate a batch of static ad creatives for one product.
#[derive(Debug, Clone, Validate)]
pub struct BulkAdRequest {
    #[validate(length(min = 1))]
    pub brand_id: String,
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Brand colors as hex strings; normalized before sending.
    pub colors: Vec<String>,
    pub logo: Option<LogoSource>,
    #[validate(length(min = 1))]
    pub product_image_urls: Vec<String>,
    #[validate(range(min = 1, max = 20))]
    pub count: u32,
    pub aspect_ratio: AspectRatio,
    /// Output language code, e.g. `en` or `pt-BR`.
    #[validate(length(min = 2, max = 5))]
    pub lang: String,
}

impl BulkAdRequest {
    /// Colors as upper-case `#RRGGBB`, rejecting anything else.
    pub fn normalized_colors(&self) -> Result<Vec<String>, CoreError> {
        self.colors.iter().map(|c| normalize_hex_color(c)).collect()
    }
}

// ---------------------------------------------------------------------------
// Avatar video
// ---------------------------------------------------------------------------

/// Generate a talking-avatar video.
#[derive(Debug, Clone, Default)]
pub struct AvatarVideoRequest {
    pub selection: AvatarVideoSelection,
    pub product_id: Option<String>,
}

/// Wire body for `POST /avatar/generate-video`, built after validation.
#[derive(Debug, Serialize)]
pub(crate) struct AvatarVideoBody<'a> {
    pub script: &'a str,
    pub avatar_id: &'a str,
    pub voice_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Cinematic ad
// ---------------------------------------------------------------------------

/// Generate a cinematic video ad.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CinematicAdRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Creative direction for the video.
    #[validate(length(min = 1, max = 2000))]
    pub concept: String,
    pub aspect_ratio: AspectRatio,
    #[validate(range(min = 5, max = 60))]
    pub duration_secs: u32,
}

/// Response of `POST /cinematic-ad/generate`.
///
/// Older deployments call the id `task_id`; both names are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct CinematicSubmitResponse {
    pub success: bool,
    #[serde(default, alias = "task_id")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Output of a completed cinematic job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinematicResult {
    pub video_url: String,
}

/// Response of `GET /cinematic-ad/jobs/{job_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CinematicJobStatus {
    pub job_id: String,
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<JobProgress>,
    #[serde(default)]
    pub result_data: Option<CinematicResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<CinematicJobStatus> for JobSnapshot {
    fn from(status: CinematicJobStatus) -> Self {
        JobSnapshot {
            status: status.status,
            progress: status.progress,
            result: status
                .result_data
                .map(|r| serde_json::json!({ "video_url": r.video_url })),
            error: status.error,
        }
    }
}

impl CinematicSubmitResponse {
    pub fn into_ticket(self) -> Result<JobTicket, crate::api::ApiError> {
        if !self.success {
            return Err(crate::api::ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Cinematic ad request was rejected".to_string()),
            ));
        }
        self.job_id
            .map(|job_id| JobTicket { job_id })
            .ok_or(crate::api::ApiError::MissingData)
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsBalance {
    pub balance: i64,
    #[serde(default)]
    pub monthly_allowance: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub plan: String,
    pub status: String,
    #[serde(default)]
    pub renews_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

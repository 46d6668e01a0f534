//! HTTP client for the face verification service.

use crate::error::VerifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `GET /status/{user_id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
}

#[derive(Debug, Serialize)]
struct EnrollRequest<'a> {
    user_id: &'a str,
    image: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    user_id: &'a str,
    image: &'a str,
    skip_liveness: bool,
}

/// `POST /enroll` response. The service reports failure detail under
/// either `detail` or `message` depending on the path that rejected it.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EnrollResponse {
    pub fn detail_text(&self) -> String {
        self.detail
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "enrollment failed".to_string())
    }
}

/// `POST /verify` success-path response body.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub verified: bool,
    #[serde(default)]
    pub liveness_passed: bool,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires_in_seconds: Option<u64>,
}

/// HTTP-level verify outcome. 404 and other rejections are distinct
/// because the caller renders them differently.
#[derive(Debug, Clone)]
pub enum VerifyHttpOutcome {
    /// HTTP 404: the user has no enrolled face.
    NotEnrolled,
    /// Any other non-2xx, with the server-provided detail.
    Rejected { detail: String },
    Accepted(VerifyResponse),
}

/// Seam between the manager and the wire, so tests drive the manager
/// without a network.
#[async_trait]
pub trait VerificationApi: Send + Sync {
    async fn status(&self, user_id: &str) -> Result<EnrollmentStatus, VerifyError>;
    async fn enroll(&self, user_id: &str, image: &str) -> Result<EnrollResponse, VerifyError>;
    async fn verify(
        &self,
        user_id: &str,
        image: &str,
        skip_liveness: bool,
    ) -> Result<VerifyHttpOutcome, VerifyError>;
}

/// Reqwest-backed client for the face service.
#[derive(Clone)]
pub struct FaceServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl FaceServiceClient {
    /// Create a client targeting the given base URL
    /// (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, VerifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| VerifyError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl VerificationApi for FaceServiceClient {
    async fn status(&self, user_id: &str) -> Result<EnrollmentStatus, VerifyError> {
        let response = self
            .http
            .get(format!("{}/status/{user_id}", self.base_url))
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| VerifyError::Service(format!("status response: {e}")))
    }

    async fn enroll(&self, user_id: &str, image: &str) -> Result<EnrollResponse, VerifyError> {
        let response = self
            .http
            .post(format!("{}/enroll", self.base_url))
            .json(&EnrollRequest { user_id, image })
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;

        let http_ok = response.status().is_success();
        let mut body: EnrollResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Service(format!("enroll response: {e}")))?;
        // A non-2xx can still carry a parseable body; it is never a success.
        body.success = body.success && http_ok;
        Ok(body)
    }

    async fn verify(
        &self,
        user_id: &str,
        image: &str,
        skip_liveness: bool,
    ) -> Result<VerifyHttpOutcome, VerifyError> {
        let response = self
            .http
            .post(format!("{}/verify", self.base_url))
            .json(&VerifyRequest {
                user_id,
                image,
                skip_liveness,
            })
            .send()
            .await
            .map_err(|e| VerifyError::Http(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(VerifyHttpOutcome::NotEnrolled);
        }
        if !response.status().is_success() {
            #[derive(Deserialize)]
            struct Rejection {
                #[serde(default)]
                detail: Option<String>,
            }
            let status = response.status();
            let detail = response
                .json::<Rejection>()
                .await
                .ok()
                .and_then(|r| r.detail)
                .unwrap_or_else(|| format!("verification failed (HTTP {status})"));
            return Ok(VerifyHttpOutcome::Rejected { detail });
        }

        let body = response
            .json()
            .await
            .map_err(|e| VerifyError::Service(format!("verify response: {e}")))?;
        Ok(VerifyHttpOutcome::Accepted(body))
    }
}

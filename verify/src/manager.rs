//! Verification manager: camera state machine plus enroll/verify flows.

use crate::camera::{StreamConstraints, VideoDevice, VideoStream};
use crate::client::{VerificationApi, VerifyHttpOutcome};
use crate::error::{CameraError, VerifyError};
use base64::Engine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use voteth_store::TokenStore;
use voteth_types::{unix_now_ms, CapabilityToken};

/// Minimum similarity the service accepts, echoed in user messages.
pub const MATCH_THRESHOLD: f64 = 70.0;

/// Fixed JPEG quality for captured frames, bounding payload size.
pub const JPEG_QUALITY: f32 = 0.9;

/// Result of an enroll attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrollOutcome {
    pub success: bool,
    pub message: String,
}

/// Classified result of a verify attempt. Only `Verified` issues a
/// capability token.
#[derive(Clone, Debug, PartialEq)]
pub enum VerifyOutcome {
    /// Service has no enrolled face for this user (HTTP 404).
    NotEnrolled,
    /// Service rejected the request; `detail` is server-provided.
    ServiceRejected { detail: String },
    /// The frame did not come from a live subject. Distinct from a
    /// similarity failure so the user fixes the right thing.
    LivenessFailed,
    /// Live subject, but the match was below threshold.
    ScoreTooLow { score: f64, threshold: f64 },
    Verified { token: CapabilityToken },
}

impl VerifyOutcome {
    /// Fixed user-facing message for this outcome.
    pub fn message(&self) -> String {
        match self {
            VerifyOutcome::NotEnrolled => {
                "Not enrolled. Please enroll your face first.".to_string()
            }
            VerifyOutcome::ServiceRejected { detail } => detail.clone(),
            VerifyOutcome::LivenessFailed => {
                "Liveness check failed. Please use a real camera and look directly at it."
                    .to_string()
            }
            VerifyOutcome::ScoreTooLow { score, threshold } => {
                format!("Verification failed ({score:.1}% match, need {threshold:.0}%)")
            }
            VerifyOutcome::Verified { token } => {
                format!("Verification successful ({:.1}% match)", token.score)
            }
        }
    }
}

/// Camera lifecycle plus the enroll/verify exchange.
///
/// States: Idle → CameraActive → {Enrolling|Verifying} → CameraActive.
/// Enroll and verify share one in-flight flag: a second call while one is
/// outstanding is dropped (returns `None`), never queued. The only writer
/// of capability tokens in the whole client lives here, on the
/// `Verified` path.
pub struct FaceVerificationManager {
    api: Arc<dyn VerificationApi>,
    device: Arc<dyn VideoDevice>,
    tokens: TokenStore,
    stream: Mutex<Option<Box<dyn VideoStream>>>,
    in_flight: AtomicBool,
    enrolled: AtomicBool,
}

impl FaceVerificationManager {
    pub fn new(
        api: Arc<dyn VerificationApi>,
        device: Arc<dyn VideoDevice>,
        tokens: TokenStore,
    ) -> Self {
        Self {
            api,
            device,
            tokens,
            stream: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            enrolled: AtomicBool::new(false),
        }
    }

    pub fn camera_active(&self) -> bool {
        self.stream.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn is_enrolled(&self) -> bool {
        self.enrolled.load(Ordering::Relaxed)
    }

    /// Idle → CameraActive. A failure leaves the manager Idle with no
    /// half-open stream; an already-active stream is fully released
    /// before the replacement is stored.
    pub fn start_camera(&self) -> Result<(), CameraError> {
        let new_stream = self.device.open(StreamConstraints::default())?;
        let mut slot = self.stream.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut old) = slot.take() {
            old.release_tracks();
        }
        *slot = Some(new_stream);
        tracing::debug!("camera started");
        Ok(())
    }

    /// Release every acquired track. Idempotent; safe when Idle.
    pub fn stop_camera(&self) {
        let mut slot = self.stream.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(mut stream) = slot.take() {
            stream.release_tracks();
            tracing::debug!("camera stopped, tracks released");
        }
    }

    /// Best-effort enrollment probe: a network failure is logged and
    /// swallowed, leaving the previous enrolled flag intact.
    pub async fn check_status(&self, user_id: &str) {
        match self.api.status(user_id).await {
            Ok(status) => self.enrolled.store(status.enrolled, Ordering::Relaxed),
            Err(e) => tracing::warn!(error = %e, "could not check enrollment status"),
        }
    }

    /// Capture a frame and enroll it. Requires no pre-existing token.
    /// Returns `None` when another enroll/verify is already in flight.
    pub async fn enroll(&self, user_id: &str) -> Result<Option<EnrollOutcome>, VerifyError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("enroll dropped, another operation in flight");
            return Ok(None);
        };

        let image = self.capture_data_url()?;
        let response = self.api.enroll(user_id, &image).await?;
        let outcome = if response.success {
            self.enrolled.store(true, Ordering::Relaxed);
            tracing::info!(user_id, "face enrolled");
            EnrollOutcome {
                success: true,
                message: "Face enrolled successfully. You can now verify.".to_string(),
            }
        } else {
            EnrollOutcome {
                success: false,
                message: format!("Enrollment failed: {}", response.detail_text()),
            }
        };
        Ok(Some(outcome))
    }

    /// Capture a frame and verify it against the enrolled face. Returns
    /// `None` when another enroll/verify is already in flight; otherwise
    /// the classified [`VerifyOutcome`], with a capability token stored
    /// on the `Verified` path only.
    pub async fn verify(&self, user_id: &str) -> Result<Option<VerifyOutcome>, VerifyError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("verify dropped, another operation in flight");
            return Ok(None);
        };

        let image = self.capture_data_url()?;
        let outcome = match self.api.verify(user_id, &image, false).await? {
            VerifyHttpOutcome::NotEnrolled => VerifyOutcome::NotEnrolled,
            VerifyHttpOutcome::Rejected { detail } => VerifyOutcome::ServiceRejected { detail },
            VerifyHttpOutcome::Accepted(resp) if resp.verified => {
                let value = resp
                    .token
                    .ok_or_else(|| VerifyError::Service("verified but no token issued".into()))?;
                let expires_in = resp.expires_in_seconds.ok_or_else(|| {
                    VerifyError::Service("verified but no token lifetime".into())
                })?;
                let token = CapabilityToken::issued(
                    value,
                    resp.similarity_score,
                    expires_in,
                    unix_now_ms(),
                );
                self.tokens.set(&token);
                tracing::info!(score = resp.similarity_score, "face verified, token issued");
                VerifyOutcome::Verified { token }
            }
            VerifyHttpOutcome::Accepted(resp) if !resp.liveness_passed => {
                VerifyOutcome::LivenessFailed
            }
            VerifyHttpOutcome::Accepted(resp) => VerifyOutcome::ScoreTooLow {
                score: resp.similarity_score,
                threshold: MATCH_THRESHOLD,
            },
        };
        Ok(Some(outcome))
    }

    /// JPEG-at-call-time capture, encoded as a data URL for the service.
    fn capture_data_url(&self) -> Result<String, VerifyError> {
        let mut slot = self.stream.lock().unwrap_or_else(|e| e.into_inner());
        let stream = slot.as_mut().ok_or(CameraError::NotActive)?;
        let jpeg = stream.capture_jpeg(JPEG_QUALITY)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        Ok(format!("data:image/jpeg;base64,{encoded}"))
    }
}

impl Drop for FaceVerificationManager {
    fn drop(&mut self) {
        self.stop_camera();
    }
}

/// Releases the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

//! Biometric verification for the VotEth client.
//!
//! Owns the camera lifecycle and the enroll/verify HTTP exchange with the
//! face service, and is the only component allowed to write a capability
//! token into the token store. The recognition and liveness algorithms
//! live in the external service; this crate only orchestrates.

pub mod camera;
pub mod client;
pub mod error;
pub mod manager;

pub use camera::{StreamConstraints, VideoDevice, VideoStream};
pub use client::{
    EnrollResponse, EnrollmentStatus, FaceServiceClient, VerificationApi, VerifyHttpOutcome,
    VerifyResponse,
};
pub use error::{CameraError, VerifyError};
pub use manager::{
    EnrollOutcome, FaceVerificationManager, VerifyOutcome, JPEG_QUALITY, MATCH_THRESHOLD,
};

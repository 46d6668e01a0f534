use thiserror::Error;

/// Camera acquisition/capture failures. Environment errors: fatal to the
/// attempted action, remediated by the user, never retried automatically.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device available")]
    NoDevice,

    #[error("camera is not active")]
    NotActive,

    #[error("camera failure: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("face service request failed: {0}")]
    Http(String),

    #[error("invalid face service response: {0}")]
    Service(String),
}

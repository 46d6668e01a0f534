//! Camera device and stream abstraction.
//!
//! The stream owns its media tracks; whoever holds a stream is
//! responsible for releasing every track before dropping or replacing it.
//! Frames are always captured at the moment of the call, never cached.

use crate::error::CameraError;

/// Requested stream shape: nominal resolution, facing the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_user: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            facing_user: true,
        }
    }
}

/// A live video stream holding one or more media tracks.
pub trait VideoStream: Send {
    /// Grab the current frame, JPEG-encoded at the given quality (0..=1).
    fn capture_jpeg(&mut self, quality: f32) -> Result<Vec<u8>, CameraError>;

    /// Tracks still held by this stream.
    fn track_count(&self) -> usize;

    /// Stop and release every acquired track. Idempotent.
    fn release_tracks(&mut self);
}

/// A camera device that can open streams.
pub trait VideoDevice: Send + Sync {
    fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn VideoStream>, CameraError>;
}

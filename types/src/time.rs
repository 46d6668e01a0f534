//! Clock helper.
//!
//! All token expiry and election-history bookkeeping works in epoch
//! milliseconds, matching the persisted `face_verification_expiry` format.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in milliseconds.
pub fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

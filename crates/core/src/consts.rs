//! Constant variables.
use std::time::Duration;

/// Quiet period after the last key edit before a hash preview is requested.
pub const KEY_DEBOUNCE: Duration = Duration::from_millis(500);

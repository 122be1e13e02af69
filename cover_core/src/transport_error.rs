//! Maps `Box<dyn Error>` from the transport boundary to typed `CoverError`.
//!
//! `cover_traits::Transport` returns `Box<dyn Error + Send + Sync>` so any
//! blaster backend can plug in; this module converts those to our typed error
//! enum, with an optional feature-gated path for `cover_hardware::HwError`.

use crate::error::CoverError;

/// Map a transport-boundary error to a typed `CoverError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_transport_error(e: &(dyn std::error::Error + 'static)) -> CoverError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<cover_hardware::error::HwError>() {
            return match hw {
                cover_hardware::error::HwError::Timeout => CoverError::Timeout,
                other => CoverError::TransportFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        CoverError::Timeout
    } else {
        CoverError::Transport(s)
    }
}

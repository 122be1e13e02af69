//! Position and timing helpers shared by the estimator and the controller.

use std::time::Duration;

/// Fully closed.
pub const POSITION_MIN: u8 = 0;
/// Fully open.
pub const POSITION_MAX: u8 = 100;

/// Travel speed in position units per second for a full-traverse time.
/// An unconfigured (zero) time is treated as instantaneous travel.
#[inline]
pub fn speed_for(travel_time_s: f64) -> f64 {
    if travel_time_s > 0.0 {
        f64::from(POSITION_MAX) / travel_time_s
    } else {
        f64::from(POSITION_MAX)
    }
}

/// Round half-to-even and clamp into `[POSITION_MIN, POSITION_MAX]`.
/// Returns `None` for NaN/±Inf.
#[inline]
pub fn clamp_position(value: f64) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let v = value
        .round_ties_even()
        .clamp(f64::from(POSITION_MIN), f64::from(POSITION_MAX));
    Some(v as u8)
}

/// Seconds to `Duration`, mapping negative or non-finite input to zero.
#[inline]
pub fn secs(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_time_is_instantaneous() {
        assert_eq!(speed_for(0.0), 100.0);
        assert_eq!(speed_for(10.0), 10.0);
        assert_eq!(speed_for(8.0), 12.5);
    }

    #[test]
    fn clamp_rounds_half_to_even() {
        assert_eq!(clamp_position(42.5), Some(42));
        assert_eq!(clamp_position(43.5), Some(44));
        assert_eq!(clamp_position(-3.0), Some(0));
        assert_eq!(clamp_position(180.0), Some(100));
        assert_eq!(clamp_position(f64::NAN), None);
    }

    #[test]
    fn secs_never_panics() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(f64::INFINITY), Duration::ZERO);
        assert_eq!(secs(1.5), Duration::from_millis(1500));
    }
}

//! Per-axis travel status and commanded direction.

use crate::util::{POSITION_MAX, POSITION_MIN};

/// Status of one axis. `None` at the call sites means "never known".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStatus {
    Closed,
    Closing,
    Opened,
    Opening,
}

impl CoverStatus {
    /// State label as persisted and shown to observers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Closing => "closing",
            Self::Opened => "open",
            Self::Opening => "opening",
        }
    }

    /// Terminal status for an idle axis. An unknown position counts as open.
    pub fn settled_at(position: Option<u8>) -> Self {
        if position == Some(POSITION_MIN) {
            Self::Closed
        } else {
            Self::Opened
        }
    }
}

/// Direction of a commanded traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Opening,
    Closing,
}

impl Direction {
    /// Where a traverse is assumed to start when the position is unknown.
    pub fn assumed_start(self) -> u8 {
        match self {
            Self::Opening => POSITION_MIN,
            Self::Closing => POSITION_MAX,
        }
    }

    /// End stop reached by a full traverse in this direction.
    pub fn end_stop(self) -> u8 {
        match self {
            Self::Opening => POSITION_MAX,
            Self::Closing => POSITION_MIN,
        }
    }
}

impl From<Direction> for CoverStatus {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Opening => CoverStatus::Opening,
            Direction::Closing => CoverStatus::Closing,
        }
    }
}

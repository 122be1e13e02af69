#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Time-based position estimation for IR/RF covers (hardware-agnostic).
//!
//! The actuators behind these covers take fire-and-forget pulses and never
//! report back, so every position here is inferred from elapsed time and the
//! calibrated travel speed. All I/O goes through `cover_traits::Transport`,
//! and all timing through `cover_traits::Scheduler` and `cover_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Estimation**: per-axis travel state machine (`estimator` module)
//! - **Commands**: open/close/stop/set-position on one axis (`axis` module)
//! - **Cover**: main + tilt composition with capability gating (`cover` module)
//! - **Timers**: in-process `Scheduler` and a driver loop (`timers`, `runner`)

pub mod axis;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod cover;
pub mod error;
pub mod estimator;
pub mod mocks;
pub mod runner;
pub mod status;
pub mod timers;
pub mod transport_error;
pub mod util;

pub use axis::AxisController;
pub use builder::CoverBuilder;
pub use config::{AxisCfg, AxisCommands, Capabilities, CoverCfg};
pub use cover::{CapabilityFlags, Cover, CoverState};
pub use error::{BuildError, CoverError, Report, Result};
pub use estimator::TravelEstimator;
pub use status::{CoverStatus, Direction};
pub use timers::TimerQueue;

//! VR session layer for Simlife.
//!
//! Owns everything stateful about VR: the one-shot hardware capability
//! probe, session initialization against a [`runtime::VrRuntime`],
//! per-frame head/hand pose propagation, controller button-edge dispatch,
//! and joystick locomotion with edge-armed snap turns. When VR is absent
//! or fails, callers fall back to the desktop presentation; nothing in
//! this crate is fatal to the process.

#![forbid(unsafe_code)]

pub mod bindings;
pub mod locomotion;
pub mod runtime;
pub mod session;
pub mod types;

pub use bindings::{Action, Bindings};
pub use locomotion::{Locomotion, Steer, MOVE_SPEED, SNAP_DEADZONE};
pub use runtime::{HeadlessRuntime, SessionCaps, SimulatedRuntime, VrRuntime};
pub use session::{SessionManager, VrOptions};
pub use types::{Pose, TrackingSnapshot};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VrError {
    /// No runtime on the host, or VR disabled by settings. Initialization
    /// had no side effects.
    #[error("vr unavailable: {0}")]
    Unavailable(String),
    /// Runtime present but refused a required capability. Logged, the
    /// caller continues in desktop mode without retry.
    #[error("vr initialization failed: {0}")]
    InitFailed(String),
}

/// Per-frame pose-read outcome. `Transient` is expected jitter and is
/// swallowed by the session tick; `Fatal` ends the session.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("transient tracking read failure")]
    Transient,
    #[error("fatal tracking failure: {0}")]
    Fatal(String),
}

pub type VrResult<T> = Result<T, VrError>;

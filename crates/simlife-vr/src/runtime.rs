//! The seam between the session manager and an actual VR runtime.
//!
//! A real OpenXR-backed runtime plugs in behind [`VrRuntime`]; the crate
//! ships [`HeadlessRuntime`] for hosts with no VR stack and
//! [`SimulatedRuntime`] for exercising the VR path without hardware.

use crate::types::{Pose, TrackingSnapshot};
use crate::{TrackingError, VrError, VrResult};

/// Capabilities a session requires from the runtime. Refusing a required
/// capability is an initialization failure, not a degraded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCaps {
    pub hand_tracking: bool,
    pub room_scale: bool,
}

impl Default for SessionCaps {
    fn default() -> Self {
        SessionCaps {
            hand_tracking: true,
            room_scale: true,
        }
    }
}

pub trait VrRuntime: Send {
    /// One-shot hardware detection. No side effects beyond detection.
    fn probe(&self) -> bool;

    /// Acquires the runtime and configures `caps`.
    fn begin_session(&mut self, caps: SessionCaps) -> VrResult<()>;

    /// Reads the current head and controller poses.
    fn read_poses(&mut self) -> Result<TrackingSnapshot, TrackingError>;

    fn end_session(&mut self);
}

/// Fallback for hosts with no VR stack: probes false, refuses sessions.
pub struct HeadlessRuntime;

impl VrRuntime for HeadlessRuntime {
    fn probe(&self) -> bool {
        false
    }

    fn begin_session(&mut self, _caps: SessionCaps) -> VrResult<()> {
        Err(VrError::Unavailable("headless runtime".into()))
    }

    fn read_poses(&mut self) -> Result<TrackingSnapshot, TrackingError> {
        Err(TrackingError::Transient)
    }

    fn end_session(&mut self) {}
}

/// Pretends hardware is present and synthesizes a gently swaying head
/// pose with both controllers at rest. Useful for driving the whole VR
/// path on a desk.
pub struct SimulatedRuntime {
    frame: u64,
    in_session: bool,
    eye_height: f32,
}

impl SimulatedRuntime {
    pub fn new(eye_height: f32) -> Self {
        Self {
            frame: 0,
            in_session: false,
            eye_height,
        }
    }
}

impl VrRuntime for SimulatedRuntime {
    fn probe(&self) -> bool {
        true
    }

    fn begin_session(&mut self, _caps: SessionCaps) -> VrResult<()> {
        self.in_session = true;
        Ok(())
    }

    fn read_poses(&mut self) -> Result<TrackingSnapshot, TrackingError> {
        if !self.in_session {
            return Err(TrackingError::Transient);
        }
        self.frame += 1;
        let t = self.frame as f32 / 90.0;
        let sway = (t * 0.8).sin() * 0.02;
        Ok(TrackingSnapshot {
            head: Pose {
                position: [sway, self.eye_height + (t * 1.3).sin() * 0.01, 0.0],
                orientation: [0.0, 0.0, 0.0, 1.0],
            },
            hands: [
                Some(Pose {
                    position: [-0.2, self.eye_height - 0.4, -0.3],
                    orientation: [0.0, 0.0, 0.0, 1.0],
                }),
                Some(Pose {
                    position: [0.2, self.eye_height - 0.4, -0.3],
                    orientation: [0.0, 0.0, 0.0, 1.0],
                }),
            ],
        })
    }

    fn end_session(&mut self) {
        self.in_session = false;
    }
}

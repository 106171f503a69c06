//! The VR session manager.
//!
//! Owns the session state: `available` is set once from the capability
//! probe and never changes; `initialized` goes false -> true on a
//! successful init and true -> false on a fatal tracking failure. Head
//! and hand transforms are republished every tick while initialized and
//! frozen otherwise.

use simlife_core::{AxisSample, Transform, Vec3};
use tracing::{info, warn};

use crate::locomotion::{Locomotion, Steer};
use crate::runtime::{SessionCaps, VrRuntime};
use crate::{TrackingError, VrError, VrResult};

/// The slice of settings the session layer needs. The app builds this
/// from the persisted configuration.
#[derive(Debug, Clone, Copy)]
pub struct VrOptions {
    /// False when the strap mode disables VR outright.
    pub enabled: bool,
    pub user_height_m: f32,
    pub snap_turn_degrees: f32,
}

pub struct SessionManager {
    runtime: Box<dyn VrRuntime>,
    available: bool,
    initialized: bool,
    head: Transform,
    hands: [Transform; 2],
    controller_bound: [bool; 2],
    locomotion: Locomotion,
    height_m: f32,
    height_offset: f32,
    raw_head_y: f32,
}

impl SessionManager {
    /// Runs the capability probe once; the result never changes for the
    /// lifetime of the session.
    pub fn new(runtime: Box<dyn VrRuntime>) -> Self {
        let available = runtime.probe();
        if available {
            info!("vr runtime detected");
        }
        Self {
            runtime,
            available,
            initialized: false,
            head: Transform::IDENTITY,
            hands: [Transform::IDENTITY; 2],
            controller_bound: [false; 2],
            locomotion: Locomotion::new(30.0),
            height_m: 0.0,
            height_offset: 0.0,
            raw_head_y: 0.0,
        }
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn initialized(&self) -> bool {
        self.initialized
    }

    pub fn head(&self) -> Transform {
        self.head
    }

    pub fn hand(&self, index: usize) -> Transform {
        self.hands[index]
    }

    pub fn controller_bound(&self, index: usize) -> bool {
        self.controller_bound[index]
    }

    /// Attempts to acquire the VR runtime with the required capabilities.
    ///
    /// Returns `Unavailable` without side effects when the probe reported
    /// no hardware or settings disable VR; `InitFailed` when the runtime
    /// refused a required capability. Either way the caller continues in
    /// desktop mode without retry.
    pub fn initialize(&mut self, opts: &VrOptions) -> VrResult<()> {
        if !self.available {
            return Err(VrError::Unavailable("no vr runtime on host".into()));
        }
        if !opts.enabled {
            return Err(VrError::Unavailable("vr disabled by settings".into()));
        }

        self.runtime.begin_session(SessionCaps::default())?;

        self.locomotion = Locomotion::new(opts.snap_turn_degrees);
        self.head = Transform::from_position(Vec3::new(0.0, opts.user_height_m, 0.0));
        self.height_m = opts.user_height_m;
        self.height_offset = 0.0;
        self.raw_head_y = opts.user_height_m;
        self.controller_bound = [true, true];
        self.initialized = true;
        info!("vr session initialized");
        Ok(())
    }

    /// Per-frame pose propagation.
    ///
    /// A transient read failure freezes the poses for this frame and is
    /// never escalated; the session coasts through tracking jitter. A
    /// fatal failure ends the session and the desktop path takes over.
    pub fn tick(&mut self) {
        if !self.initialized {
            return;
        }
        match self.runtime.read_poses() {
            Ok(snapshot) => {
                self.raw_head_y = snapshot.head.position[1];
                let mut head = snapshot.head.to_transform();
                head.position.y += self.height_offset;
                self.head = head;
                for (index, hand) in snapshot.hands.iter().enumerate() {
                    match hand {
                        Some(pose) => {
                            self.hands[index] = pose.to_transform();
                            self.controller_bound[index] = true;
                        }
                        None => self.controller_bound[index] = false,
                    }
                }
            }
            Err(TrackingError::Transient) => {
                // Coast through jitter: poses stay frozen this frame.
            }
            Err(TrackingError::Fatal(reason)) => {
                warn!(%reason, "fatal tracking failure, ending vr session");
                self.initialized = false;
                self.runtime.end_session();
            }
        }
    }

    /// Re-seats the head to the configured user height. The offset is
    /// applied on top of every subsequent raw pose, so relative head
    /// movement still comes through.
    pub fn recenter(&mut self) {
        if !self.initialized {
            return;
        }
        self.height_offset = self.height_m - self.raw_head_y;
        info!(offset = self.height_offset, "recentered head height");
    }

    /// Joystick locomotion against the current head orientation. See
    /// [`Locomotion`] for the snap-turn arming rules.
    pub fn steer(&mut self, sample: AxisSample, dt: f32) -> Option<Steer> {
        if !self.initialized {
            return None;
        }
        let head_yaw = self.head.rotation.yaw();
        self.locomotion.steer(sample, head_yaw, dt)
    }

    /// Explicit teardown on quit.
    pub fn shutdown(&mut self) {
        if self.initialized {
            self.runtime.end_session();
            self.initialized = false;
        }
    }
}

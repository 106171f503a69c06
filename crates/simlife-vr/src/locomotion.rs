//! Joystick locomotion: smooth translation on the left stick, edge-armed
//! snap turns on the right.

use simlife_core::math::yaw_basis;
use simlife_core::{AxisSample, Hand, Vec3};

/// Continuous translation speed in meters per second.
pub const MOVE_SPEED: f32 = 2.0;

/// Right-stick magnitude that triggers a snap turn.
pub const SNAP_DEADZONE: f32 = 0.7;

/// Left stick below this is treated as at rest.
const MOVE_DEADZONE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steer {
    /// World-space translation delta for this frame.
    Translate(Vec3),
    /// Discrete yaw rotation in degrees (sign follows the stick).
    SnapTurn(f32),
}

#[derive(Debug)]
pub struct Locomotion {
    snap_turn_degrees: f32,
    snap_armed: bool,
}

impl Locomotion {
    pub fn new(snap_turn_degrees: f32) -> Self {
        Self {
            snap_turn_degrees,
            snap_armed: true,
        }
    }

    /// Consumes one joystick sample. `head_yaw` is the current head yaw in
    /// radians; `dt` the frame delta in seconds.
    ///
    /// Snap turns are edge-triggered: one turn per threshold crossing, and
    /// the stick must return below the deadzone before the next one arms.
    /// Holding the stick hard over produces exactly one turn.
    pub fn steer(&mut self, sample: AxisSample, head_yaw: f32, dt: f32) -> Option<Steer> {
        match sample.hand {
            Hand::Left => {
                if sample.x.abs() < MOVE_DEADZONE && sample.y.abs() < MOVE_DEADZONE {
                    return None;
                }
                let (forward, right) = yaw_basis(head_yaw);
                let delta = (forward * sample.y + right * sample.x).flattened()
                    * (MOVE_SPEED * dt);
                Some(Steer::Translate(delta))
            }
            Hand::Right => {
                if sample.x.abs() > SNAP_DEADZONE {
                    if self.snap_armed {
                        self.snap_armed = false;
                        return Some(Steer::SnapTurn(
                            self.snap_turn_degrees * sample.x.signum(),
                        ));
                    }
                    None
                } else {
                    self.snap_armed = true;
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn right(x: f32) -> AxisSample {
        AxisSample {
            hand: Hand::Right,
            x,
            y: 0.0,
        }
    }

    fn left(x: f32, y: f32) -> AxisSample {
        AxisSample {
            hand: Hand::Left,
            x,
            y,
        }
    }

    #[test]
    fn held_stick_produces_exactly_one_snap_turn() {
        let mut loco = Locomotion::new(30.0);
        let mut turns = 0;
        for _ in 0..10 {
            if let Some(Steer::SnapTurn(_)) = loco.steer(right(0.9), 0.0, 0.016) {
                turns += 1;
            }
        }
        assert_eq!(turns, 1, "held stick must not spin continuously");
    }

    #[test]
    fn snap_rearms_after_returning_below_deadzone() {
        let mut loco = Locomotion::new(30.0);
        assert!(matches!(
            loco.steer(right(0.9), 0.0, 0.016),
            Some(Steer::SnapTurn(_))
        ));
        assert!(loco.steer(right(0.9), 0.0, 0.016).is_none());
        assert!(loco.steer(right(0.1), 0.0, 0.016).is_none());
        assert!(matches!(
            loco.steer(right(-0.9), 0.0, 0.016),
            Some(Steer::SnapTurn(d)) if d < 0.0
        ));
    }

    #[test]
    fn below_deadzone_never_turns() {
        let mut loco = Locomotion::new(30.0);
        for _ in 0..20 {
            assert!(loco.steer(right(0.69), 0.0, 0.016).is_none());
        }
    }

    #[test]
    fn snap_turn_angle_and_sign_follow_settings_and_stick() {
        let mut loco = Locomotion::new(45.0);
        match loco.steer(right(0.95), 0.0, 0.016) {
            Some(Steer::SnapTurn(deg)) => assert_eq!(deg, 45.0),
            other => panic!("expected snap turn, got {:?}", other),
        }
    }

    #[test]
    fn left_stick_translates_along_head_forward() {
        let mut loco = Locomotion::new(30.0);
        // Facing -Z, pushing forward should move toward -Z.
        match loco.steer(left(0.0, 1.0), 0.0, 0.5) {
            Some(Steer::Translate(v)) => {
                assert!(v.z < 0.0, "forward push should move -Z, got {:?}", v);
                assert!((v.length() - MOVE_SPEED * 0.5).abs() < 1e-4);
                assert_eq!(v.y, 0.0, "translation stays on the horizontal plane");
            }
            other => panic!("expected translation, got {:?}", other),
        }
    }

    #[test]
    fn left_stick_respects_head_yaw() {
        let mut loco = Locomotion::new(30.0);
        let quarter = std::f32::consts::FRAC_PI_2;
        // Yawed 90 degrees left, forward is now -X.
        match loco.steer(left(0.0, 1.0), quarter, 1.0) {
            Some(Steer::Translate(v)) => {
                assert!(v.x < -1.0, "expected -X travel, got {:?}", v);
                assert!(v.z.abs() < 1e-4);
            }
            other => panic!("expected translation, got {:?}", other),
        }
    }

    #[test]
    fn resting_left_stick_is_a_no_op() {
        let mut loco = Locomotion::new(30.0);
        assert!(loco.steer(left(0.01, -0.02), 0.0, 0.016).is_none());
    }
}

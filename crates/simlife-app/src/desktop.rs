//! Desktop camera behavior: idle vertical bob plus re-aiming at the
//! avatar. Only runs while the simulation is on screen and unpaused, so a
//! pause round-trip leaves the camera transform bit-identical.

use simlife_core::{Quat, Transform, Vec3};

use crate::scene::{Rig, Scene};

const BOB_AMPLITUDE: f32 = 0.15;
const BOB_FREQUENCY_HZ: f32 = 0.25;

#[derive(Debug)]
pub struct DesktopCamera {
    base: Vec3,
    phase: f32,
}

impl DesktopCamera {
    pub fn new(base: Vec3) -> Self {
        Self { base, phase: 0.0 }
    }

    pub fn update(&mut self, dt: f32, scene: &mut Scene, rig: &Rig) {
        self.phase += dt;

        let bob = (self.phase * BOB_FREQUENCY_HZ * std::f32::consts::TAU).sin() * BOB_AMPLITUDE;
        let position = Vec3::new(self.base.x, self.base.y + bob, self.base.z);

        let avatar = scene
            .transform(rig.avatar)
            .map(|t| t.position)
            .unwrap_or(Vec3::ZERO);
        let to_avatar = avatar - position;
        // Forward is -Z, so yaw aims the camera down the offset vector.
        let yaw = (-to_avatar.x).atan2(-to_avatar.z);

        scene.set_transform(
            rig.camera,
            Transform {
                position,
                rotation: Quat::from_yaw(yaw),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Rig, Scene};

    #[test]
    fn camera_bobs_around_base_height() {
        let mut scene = Scene::new();
        let rig = Rig::build(&mut scene);
        let base = Vec3::new(0.0, 20.0, -40.0);
        let mut camera = DesktopCamera::new(base);

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..600 {
            camera.update(1.0 / 60.0, &mut scene, &rig);
            let y = scene.transform(rig.camera).unwrap().position.y;
            min = min.min(y);
            max = max.max(y);
        }
        assert!(max <= base.y + BOB_AMPLITUDE + 1e-4);
        assert!(min >= base.y - BOB_AMPLITUDE - 1e-4);
        assert!(max - min > BOB_AMPLITUDE, "camera should actually move");
    }

    #[test]
    fn camera_aims_at_avatar() {
        let mut scene = Scene::new();
        let rig = Rig::build(&mut scene);
        // Camera on +Z, avatar at the origin: aiming means yaw 0.
        let mut camera = DesktopCamera::new(Vec3::new(0.0, 10.0, 40.0));
        camera.update(1.0 / 60.0, &mut scene, &rig);

        let rotation = scene.transform(rig.camera).unwrap().rotation;
        assert!(rotation.yaw().abs() < 1e-4, "avatar at origin means yaw 0");
    }
}

use simlife_core::{Quat, Transform, Vec3};

/// Raw runtime pose, `[x, y, z]` position and `[x, y, z, w]` orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Pose {
    pub fn to_transform(self) -> Transform {
        Transform {
            position: Vec3::new(self.position[0], self.position[1], self.position[2]),
            rotation: Quat::new(
                self.orientation[0],
                self.orientation[1],
                self.orientation[2],
                self.orientation[3],
            ),
        }
    }
}

/// One frame of tracking data. A `None` hand means that controller was
/// not tracked this frame; its last published transform stays frozen.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackingSnapshot {
    pub head: Pose,
    pub hands: [Option<Pose>; 2],
}

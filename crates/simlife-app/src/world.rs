//! Optional world file: a JSON list of named objects with positions,
//! attached under the world root at startup.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use simlife_common::{Error, Result};
use simlife_core::{Transform, Vec3};
use tracing::info;

use crate::scene::{NodeId, Scene};

pub const WORLD_FILE: &str = "world.json";

#[derive(Debug, Deserialize)]
struct WorldFile {
    #[serde(default)]
    objects: Vec<WorldObject>,
}

#[derive(Debug, Deserialize)]
struct WorldObject {
    #[serde(default = "default_object_name")]
    name: String,
    #[serde(default)]
    position: [f32; 3],
}

fn default_object_name() -> String {
    "Object".to_string()
}

/// Loads `path` into children of `world`. A missing file loads nothing;
/// a malformed one is a serialization error for the caller to log.
pub fn load_world(scene: &mut Scene, world: NodeId, path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let raw = fs::read_to_string(path)?;
    let file: WorldFile = serde_json::from_str(&raw).map_err(Error::serialization)?;

    let count = file.objects.len();
    for object in file.objects {
        let id = scene.attach(Some(world), object.name);
        scene.set_transform(
            id,
            Transform::from_position(Vec3::new(
                object.position[0],
                object.position[1],
                object.position[2],
            )),
        );
    }
    info!(count, path = %path.display(), "world objects loaded");
    Ok(count)
}

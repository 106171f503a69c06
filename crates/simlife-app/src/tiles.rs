//! Map tile provider: a thin request/response contract with the Mapbox
//! static-image API. Any failure is logged and the scene proceeds with no
//! map texture; decoding the image bytes is someone else's job.

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::scene::{NodeId, Scene};

pub const TILE_SIZE: u32 = 512;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("tile request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tile service returned status {0}")]
    Status(u16),
    #[error("no map token configured")]
    NoToken,
}

/// Undecoded tile imagery straight from the service.
#[derive(Debug, Clone)]
pub struct MapTile {
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct MapboxStatic {
    token: String,
    style: String,
}

impl MapboxStatic {
    pub fn new(token: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            style: style.into(),
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    pub async fn fetch(&self, lat: f64, lon: f64, zoom: u8) -> Result<MapTile, TileError> {
        if !self.has_token() {
            return Err(TileError::NoToken);
        }
        let url = tile_url(&self.style, lat, lon, zoom, &self.token);
        let response = reqwest::get(&url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TileError::Status(status.as_u16()));
        }
        let data = response.bytes().await?;
        info!(lat, lon, zoom, bytes = data.len(), "map tile loaded");
        Ok(MapTile {
            width: TILE_SIZE,
            height: TILE_SIZE,
            data,
        })
    }
}

/// Mapbox static-image URL: `{style}/static/{lon},{lat},{zoom}/WxH`.
pub fn tile_url(style: &str, lat: f64, lon: f64, zoom: u8, token: &str) -> String {
    format!(
        "https://api.mapbox.com/styles/v1/{style}/static/{lon},{lat},{zoom}/{TILE_SIZE}x{TILE_SIZE}?access_token={token}"
    )
}

/// Attaches the fetched tile under the world root, or logs and moves on.
/// Never lets a fetch failure escape to the caller.
pub fn attach_map_tile(
    scene: &mut Scene,
    world: NodeId,
    result: Result<MapTile, TileError>,
) -> Option<NodeId> {
    match result {
        Ok(_tile) => Some(scene.attach(Some(world), "MapTile")),
        Err(TileError::NoToken) => {
            info!("no map token provided, skipping map tile");
            None
        }
        Err(err) => {
            warn!(%err, "map tile unavailable, continuing without it");
            None
        }
    }
}

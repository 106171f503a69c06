//! Simlife application layer.
//!
//! Composes the settings store, VR session manager, screen flow, and
//! frame scheduler into one [`app::App`] driven by an externally-owned
//! frame callback, plus the thin collaborators around it: the scene
//! contract, desktop camera, map-tile provider, and world loader.

#![forbid(unsafe_code)]

pub mod app;
pub mod desktop;
pub mod scene;
pub mod tiles;
pub mod world;

pub use app::{App, DeferredTask};
pub use scene::{NodeId, Rig, Scene};
pub use tiles::{MapTile, MapboxStatic, TileError};

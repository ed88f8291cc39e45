//! Strategic map layer - territories, adjacency, and map loading

pub mod atlas;
pub mod store;
pub mod territory;

pub use atlas::{default_world, AtlasLoadError};
pub use store::MapStore;
pub use territory::{ForceComposition, Region, Territory};

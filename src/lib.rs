pub mod canvas;
pub mod colour;
pub mod common;
pub mod error;
pub mod fill;
pub mod message;
pub mod palette;
pub mod persist;
pub mod project;
pub mod state;
pub mod tile;
pub mod tileset;
pub mod undo;
pub mod update;

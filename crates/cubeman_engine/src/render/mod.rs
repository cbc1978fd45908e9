//! Renderer-facing data
//!
//! The engine never draws. It keeps a [`Camera`] and CPU-side [`Geometry`]
//! that an external renderer uploads and draws after every frame.

pub mod camera;
pub mod geometry;

pub use camera::Camera;
pub use geometry::{calculate_uv, CubeGeometry, FaceAtlas, Geometry, TerrainGeometry, Vertex};

//! Scene graph
//!
//! Arena of transform nodes the renderer draws. Components own nodes through
//! [`NodeId`](crate::foundation::collections::NodeId) handles.

pub mod scene_graph;

pub use scene_graph::{AABB, SceneGraph, SceneNode};

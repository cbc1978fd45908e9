//! Component lifecycle
//!
//! Components are named, boxed behaviors owned by the [`Environment`]. They are
//! registered at any time, but only initialized and started at the beginning
//! of the next ready frame: first every pending component is initialized, then
//! every successfully initialized one is started. Only started components
//! receive updates, input and hits.

pub mod component;
pub mod context;
pub mod environment;
pub mod readiness;
pub mod world;

#[cfg(test)]
mod tests;

pub use component::{AsAny, Component, Component3D, ComponentError, ComponentState};
pub use context::Context;
pub use environment::{ComponentFailure, Environment, EnvironmentError, FrameStatus, LifecyclePhase, RenderView};
pub use readiness::{GateStatus, ReadinessGate};
pub use world::World;

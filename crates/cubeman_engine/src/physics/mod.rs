//! Collision detection
//!
//! Axis-aligned box queries against a flat registry of collidables. There is
//! no physical response: callers decide what to do with a hit.

pub mod collision;
pub mod collision_layers;
pub mod collision_manager;

pub use collision::{CollisionHit, HitResult, Ray};
pub use collision_layers::CollisionType;
pub use collision_manager::{Collidable, CollisionManager};

//! Generational handle types
//!
//! Components and scene nodes are stored in slot maps. A handle stays valid
//! until its slot is removed; after that every lookup through it returns
//! `None` instead of aliasing a newer occupant.

pub use slotmap::{SlotMap, SecondaryMap};

slotmap::new_key_type! {
    /// Handle to a component registered with the environment
    pub struct ComponentId;

    /// Handle to a node in the scene graph
    pub struct NodeId;
}

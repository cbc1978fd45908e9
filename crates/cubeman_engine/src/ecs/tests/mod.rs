//! Scenario tests driving a whole [`crate::ecs::Environment`]

mod movement;

//! Static boxes placed by the level

use crate::assets::{ObstacleKind, ObstacleRecord};
use crate::ecs::{Component, Component3D, ComponentError, Context};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::physics::{CollisionHit, CollisionType};
use crate::render::{CubeGeometry, FaceAtlas};
use crate::scene::{SceneGraph, AABB};

impl From<ObstacleKind> for CollisionType {
    fn from(kind: ObstacleKind) -> Self {
        match kind {
            ObstacleKind::Wall => Self::WALL,
            ObstacleKind::Enemy => Self::ENEMY,
        }
    }
}

/// A box collidable that never moves
///
/// Walls block the character; enemies are only notified when touched.
pub struct Obstacle {
    body: Component3D,
    kind: CollisionType,
    contacts: u32,
}

impl Obstacle {
    /// Create a cube spanning `center ± half_extents`
    pub fn new(scene: &mut SceneGraph, name: &str, center: Vec3, half_extents: Vec3, kind: CollisionType) -> Self {
        let body = Component3D::new(scene, name);
        if let Some(node) = scene.get_mut(body.node()) {
            node.transform = Transform::new(center, Quat::identity(), half_extents * 2.0);
            node.geometry = Some(CubeGeometry::build(Vec3::zeros(), &FaceAtlas::uniform([1.0, 0.0]), false));
        }
        Self { body, kind, contacts: 0 }
    }

    /// Create an obstacle from a level record
    pub fn from_record(scene: &mut SceneGraph, name: &str, record: &ObstacleRecord) -> Self {
        Self::new(
            scene,
            name,
            Vec3::from(record.center),
            Vec3::from(record.half_extents),
            record.kind.into(),
        )
    }

    /// Collision tag
    pub fn kind(&self) -> CollisionType {
        self.kind
    }

    /// Times another collidable reported touching this one
    pub fn contacts(&self) -> u32 {
        self.contacts
    }
}

impl Component for Obstacle {
    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        self.body.attach(ctx.scene_mut());
        let unit = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(0.5));
        ctx.register_collidable(self.body.node(), unit, self.kind);
        Ok(())
    }

    fn on_hit(&mut self, _ctx: &mut Context<'_>, other: &CollisionHit) {
        self.contacts += 1;
        log::debug!("Obstacle touched by '{}'", other.name);
    }

    fn node(&self) -> Option<NodeId> {
        Some(self.body.node())
    }
}

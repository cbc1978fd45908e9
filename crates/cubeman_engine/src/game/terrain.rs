//! Ground grid

use crate::assets::TerrainRecord;
use crate::ecs::{Component, Component3D, ComponentError, Context};
use crate::foundation::collections::NodeId;
use crate::render::TerrainGeometry;
use crate::scene::SceneGraph;

/// Flat grid of `cell_size` cells centered on the origin
pub struct Terrain {
    body: Component3D,
    texture_path: Option<String>,
}

impl Terrain {
    /// Build the grid geometry for `record`
    pub fn new(scene: &mut SceneGraph, record: &TerrainRecord) -> Self {
        let body = Component3D::new(scene, "terrain");
        if let Some(node) = scene.get_mut(body.node()) {
            node.geometry = Some(TerrainGeometry::build(record.cell_size, record.rows, record.columns));
        }
        Self {
            body,
            texture_path: record.texture_path.clone(),
        }
    }

    /// Ground texture requested by the level
    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }
}

impl Component for Terrain {
    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        self.body.attach(ctx.scene_mut());
        Ok(())
    }

    fn node(&self) -> Option<NodeId> {
        Some(self.body.node())
    }
}

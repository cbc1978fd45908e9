//! Sky box that travels with the followed node

use crate::core::config::SkyboxSettings;
use crate::ecs::{Component, Component3D, ComponentError, Context};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::{CubeGeometry, FaceAtlas};
use crate::scene::SceneGraph;

/// Inward-facing cube re-centred on a target component every update
pub struct Skybox {
    body: Component3D,
    target: String,
    target_node: Option<NodeId>,
}

impl Skybox {
    /// Create the cube; `target` names the component to follow
    pub fn new(scene: &mut SceneGraph, settings: &SkyboxSettings, target: impl Into<String>) -> Self {
        let body = Component3D::new(scene, "skybox");
        let atlas = FaceAtlas {
            nx: [0.0, 2.0],
            px: [0.0, 2.0],
            ny: [0.0, 1.0],
            py: [0.0, 3.0],
            nz: [0.0, 2.0],
            pz: [0.0, 2.0],
        };
        let mesh = scene.create_node("skybox-mesh");
        if let Some(node) = scene.get_mut(mesh) {
            node.transform = Transform::new(
                Vec3::new(0.0, settings.height, 0.0),
                Quat::identity(),
                Vec3::from(settings.scale),
            );
            node.geometry = Some(CubeGeometry::build(Vec3::zeros(), &atlas, true));
        }
        scene.add_child(body.node(), mesh);

        Self {
            body,
            target: target.into(),
            target_node: None,
        }
    }
}

impl Component for Skybox {
    fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
        let target = ctx
            .node_of(&self.target)
            .ok_or_else(|| ComponentError::MissingDependency(self.target.clone()))?;
        self.target_node = Some(target);
        self.body.attach(ctx.scene_mut());
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, _delta: f32) {
        let Some(position) = self.target_node.and_then(|node| ctx.scene().world_position(node)) else {
            return;
        };
        self.body.set_position(ctx.scene_mut(), position);
    }

    fn node(&self) -> Option<NodeId> {
        Some(self.body.node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::ecs::Environment;
    use approx::assert_relative_eq;

    struct Marker(Component3D);

    impl Component for Marker {
        fn start(&mut self, ctx: &mut Context<'_>) -> Result<(), ComponentError> {
            self.0.attach(ctx.scene_mut());
            Ok(())
        }

        fn node(&self) -> Option<NodeId> {
            Some(self.0.node())
        }
    }

    fn ready(env: &mut Environment) {
        env.load_models_json("[]").unwrap();
        env.load_level_json(r#"{ "seed": 0, "terrain": { "rows": 1, "columns": 1, "cellSize": 1 }, "itemCount": 0 }"#)
            .unwrap();
    }

    #[test]
    fn test_follows_target() {
        let mut env = Environment::new(GameConfig::default());
        let marker = Marker(Component3D::new(env.scene_mut(), "marker"));
        let marker_node = marker.0.node();
        env.register("marker", Box::new(marker)).unwrap();
        let settings = env.config().skybox.clone();
        let skybox = Skybox::new(env.scene_mut(), &settings, "marker");
        env.register("skybox", Box::new(skybox)).unwrap();
        ready(&mut env);
        env.on_update(0.016).unwrap();

        env.scene_mut().transform_mut(marker_node).unwrap().position = Vec3::new(30.0, 0.0, -40.0);
        env.on_update(0.016).unwrap();

        let node = env.get::<Skybox>("skybox").unwrap().body.node();
        let position = env.scene().world_position(node).unwrap();
        assert_relative_eq!(position, Vec3::new(30.0, 0.0, -40.0));
    }

    #[test]
    fn test_missing_target_fails_start() {
        let mut env = Environment::new(GameConfig::default());
        let settings = env.config().skybox.clone();
        let skybox = Skybox::new(env.scene_mut(), &settings, "nobody");
        env.register("skybox", Box::new(skybox)).unwrap();
        ready(&mut env);
        env.on_update(0.016).unwrap();

        assert!(env.find("skybox").is_none());
        assert!(matches!(
            env.failures()[0].error,
            ComponentError::MissingDependency(ref name) if name == "nobody"
        ));
    }
}

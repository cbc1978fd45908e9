//! Building scene nodes from model records

use std::sync::Arc;

use super::{AssetError, AssetLibrary};
use crate::animation::AnimationClip;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::render::geometry::CubeGeometry;
use crate::scene::{SceneGraph, AABB};

/// A model instantiated into the scene
#[derive(Debug, Clone)]
pub struct Model {
    /// Detached root node; the owning component attaches it
    pub root: NodeId,
    /// Model-space box around every part
    pub bounds: AABB,
    clips: Vec<Arc<AnimationClip>>,
}

impl Model {
    /// Create nodes for every mesh of `name` below a new root node
    ///
    /// Meshes with a `parent` are linked under that mesh, the rest under the
    /// root. Nothing is left in the scene when the record is missing, a
    /// parent cannot be resolved, or parents form a cycle.
    pub fn instantiate(library: &AssetLibrary, name: &str, scene: &mut SceneGraph) -> Result<Self, AssetError> {
        let record = library.model(name)?;
        let clips = library.clips(name)?.to_vec();

        let root = scene.create_node(record.name.clone());
        let mut nodes = Vec::with_capacity(record.meshes.len());
        for mesh in &record.meshes {
            let node = scene.create_node(mesh.name.clone());
            if let Some(scene_node) = scene.get_mut(node) {
                let [rx, ry, rz] = mesh.rotation;
                scene_node.transform = Transform::new(
                    Vec3::from(mesh.position),
                    Quat::from_euler_angles(rx, ry, rz),
                    Vec3::from(mesh.scale),
                );
                scene_node.geometry = Some(CubeGeometry::build(Vec3::from(mesh.offset), &mesh.faces, false));
            }
            nodes.push(node);
        }

        for (mesh, &node) in record.meshes.iter().zip(&nodes) {
            let parent = match &mesh.parent {
                None => root,
                Some(parent) => {
                    let found = record.meshes.iter().zip(&nodes).find(|(m, _)| &m.name == parent);
                    let Some((_, &parent_node)) = found else {
                        discard(scene, root, &nodes);
                        return Err(AssetError::UnknownParent {
                            model: record.name.clone(),
                            mesh: mesh.name.clone(),
                            parent: parent.clone(),
                        });
                    };
                    parent_node
                }
            };
            if !scene.add_child(parent, node) {
                discard(scene, root, &nodes);
                return Err(AssetError::ParentCycle {
                    model: record.name.clone(),
                    mesh: mesh.name.clone(),
                });
            }
        }

        let bounds = record
            .meshes
            .iter()
            .zip(&nodes)
            .filter_map(|(mesh, &node)| {
                let local = AABB::from_center_extents(Vec3::from(mesh.offset), Vec3::repeat(0.5));
                scene.world_matrix(node).map(|matrix| local.transformed(&matrix))
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| AABB::new(Vec3::zeros(), Vec3::zeros()));

        log::debug!("Instantiated model '{}' with bounds {:?}", name, bounds);
        Ok(Self { root, bounds, clips })
    }

    /// Look up a clip by name
    pub fn clip(&self, name: &str) -> Result<Arc<AnimationClip>, AssetError> {
        self.clips
            .iter()
            .find(|clip| clip.name == name)
            .cloned()
            .ok_or_else(|| AssetError::clip_not_found(name))
    }
}

fn discard(scene: &mut SceneGraph, root: NodeId, nodes: &[NodeId]) {
    scene.remove(root);
    for &node in nodes {
        scene.remove(node);
    }
}

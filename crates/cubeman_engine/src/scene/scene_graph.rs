//! Node hierarchy and bounding boxes

use crate::foundation::collections::{NodeId, SlotMap};
use crate::foundation::math::{utils, Mat4, Point3, Transform, Vec3};
use crate::render::geometry::Geometry;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching faces count)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// The same box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> AABB {
        AABB::new(self.min + offset, self.max + offset)
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Axis-aligned box around this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point(&corner).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        AABB::new(min, max)
    }
}

/// A transform node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug name, also used to resolve animation tracks
    pub name: String,
    /// Transform relative to the parent
    pub transform: Transform,
    /// Whether the renderer should draw this node and its children
    pub visible: bool,
    /// Mesh data drawn at this node, if any
    pub geometry: Option<Geometry>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            visible: true,
            geometry: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Parent node, `None` for the root and for detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene hierarchy with a single root
///
/// Nodes are created detached and become part of the drawn scene once they
/// are linked under the root. Removing a node removes its whole subtree and
/// invalidates every handle into it.
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("scene"));
        Self { nodes, root }
    }

    /// Root node handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name))
    }

    /// Check whether a handle still refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Local transform of a node
    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id).map(|node| &node.transform)
    }

    /// Mutable local transform of a node
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|node| &mut node.transform)
    }

    /// Link `child` under `parent`, unlinking it from any previous parent
    ///
    /// Returns false when either node is gone or the link would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            log::warn!("Refusing to parent {:?} under its own descendant {:?}", child, parent);
            return false;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Unlink a node from its parent, keeping it and its subtree alive
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&c| c != id);
        }
    }

    /// Remove a node and its whole subtree, returning how many nodes were freed
    pub fn remove(&mut self, id: NodeId) -> usize {
        if id == self.root || !self.contains(id) {
            return 0;
        }
        self.detach(id);
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// Whether the node is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|ancestor| ancestor == self.root)
    }

    /// First direct child with the given name
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes.get(child).is_some_and(|node| node.name == name))
    }

    /// First node named `name` in the subtree below `parent`, depth first
    pub fn find_descendant(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.nodes.get(parent)?.children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            let node = self.nodes.get(next)?;
            if node.name == name {
                return Some(next);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Composed parent-to-world matrix of the node
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut matrix = self.nodes.get(id)?.transform.to_matrix();
        for ancestor in self.ancestors(id) {
            matrix = self.nodes.get(ancestor)?.transform.to_matrix() * matrix;
        }
        Some(matrix)
    }

    /// World-space origin of the node
    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id).map(|matrix| utils::translation_of(&matrix))
    }

    /// World-space direction of the node's local +Z axis, normalized
    pub fn world_direction(&self, id: NodeId) -> Option<Vec3> {
        let matrix = self.world_matrix(id)?;
        matrix.transform_vector(&Vec3::z()).try_normalize(f32::EPSILON)
    }

    /// Visible nodes reachable from the root with their world matrices
    pub fn visible_nodes(&self) -> Vec<(NodeId, Mat4)> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root, Mat4::identity())];
        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            if !node.visible {
                continue;
            }
            let matrix = parent_matrix * node.transform.to_matrix();
            out.push((id, matrix));
            stack.extend(node.children.iter().rev().map(|&child| (child, matrix)));
        }
        out
    }

    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.nodes.get(id).and_then(|node| node.parent);
        std::iter::from_fn(move || {
            let next = current?;
            current = self.nodes.get(next).and_then(|node| node.parent);
            Some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_touching_faces_intersect() {
        let a = AABB::new(Vec3::zeros(), Vec3::repeat(10.0));
        let b = AABB::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(12.0, 10.0, 10.0));
        let c = AABB::new(Vec3::new(10.5, 0.0, 0.0), Vec3::new(12.0, 10.0, 10.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_aabb_transformed_by_rotation() {
        let unit = AABB::from_center_extents(Vec3::zeros(), Vec3::new(2.0, 1.0, 1.0));
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let matrix = Transform::new(Vec3::new(0.0, 0.0, 5.0), rotation, Vec3::repeat(1.0)).to_matrix();
        let moved = unit.transformed(&matrix);
        assert_relative_eq!(moved.extents().x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(moved.extents().z, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.center().z, 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_world_position_composes_parents() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        assert!(graph.add_child(graph.root(), parent));
        assert!(graph.add_child(parent, child));

        graph.transform_mut(parent).unwrap().position = Vec3::new(10.0, 0.0, 0.0);
        graph.transform_mut(parent).unwrap().scale = Vec3::repeat(2.0);
        graph.transform_mut(child).unwrap().position = Vec3::new(0.0, 1.0, 0.0);

        let world = graph.world_position(child).unwrap();
        assert_relative_eq!(world, Vec3::new(10.0, 2.0, 0.0), epsilon = 1e-5);
        assert!(graph.is_attached(child));
    }

    #[test]
    fn test_remove_invalidates_subtree_handles() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let child = graph.create_node("child");
        graph.add_child(graph.root(), parent);
        graph.add_child(parent, child);

        assert_eq!(graph.remove(parent), 2);
        assert!(!graph.contains(child));
        assert!(graph.world_position(child).is_none());
        assert!(graph.get(graph.root()).unwrap().children().is_empty());
        assert_eq!(graph.remove(parent), 0);
    }

    #[test]
    fn test_cycle_is_refused() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        graph.add_child(a, b);
        assert!(!graph.add_child(b, a));
        assert!(!graph.is_attached(a));
    }

    #[test]
    fn test_hidden_subtree_is_not_drawn() {
        let mut graph = SceneGraph::new();
        let shown = graph.create_node("shown");
        let hidden = graph.create_node("hidden");
        graph.add_child(graph.root(), shown);
        graph.add_child(graph.root(), hidden);
        graph.get_mut(hidden).unwrap().visible = false;
        let drawn: Vec<NodeId> = graph.visible_nodes().into_iter().map(|(id, _)| id).collect();
        assert!(drawn.contains(&shown));
        assert!(!drawn.contains(&hidden));
    }
}

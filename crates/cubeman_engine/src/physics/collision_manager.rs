//! Registry of collidables and the box/ray queries over it

use crate::foundation::collections::{ComponentId, NodeId};
use crate::foundation::math::Vec3;
use crate::scene::{SceneGraph, AABB};

use super::collision::{correction_vector, CollisionHit, HitResult, Ray};
use super::collision_layers::CollisionType;

/// Collision capability attached to a component's scene node
///
/// `bounds` are in the node's local space. The world box is recomputed from
/// the node's current world matrix on every query.
#[derive(Debug, Clone)]
pub struct Collidable {
    /// Component that receives hits
    pub owner: ComponentId,
    /// Owner name, used for removal
    pub name: String,
    /// Node whose world transform places the box
    pub node: NodeId,
    /// Box in node-local space
    pub bounds: AABB,
    /// Tag matched against query masks
    pub kind: CollisionType,
    world_box: Option<AABB>,
    dirty: bool,
}

impl Collidable {
    /// Describe a collidable for `owner`
    pub fn new(owner: ComponentId, name: impl Into<String>, node: NodeId, bounds: AABB, kind: CollisionType) -> Self {
        Self {
            owner,
            name: name.into(),
            node,
            bounds,
            kind,
            world_box: None,
            dirty: true,
        }
    }

    /// Current world-space box, `None` when the node no longer exists
    pub fn world_box(&self, scene: &SceneGraph) -> Option<AABB> {
        scene.world_matrix(self.node).map(|matrix| self.bounds.transformed(&matrix))
    }

    /// Box captured by the last [`CollisionManager::refresh`]
    pub fn last_world_box(&self) -> Option<AABB> {
        self.world_box
    }
}

/// Linear-scan collision registry
///
/// Entries are kept in insertion order and scanned front to back; the first
/// match wins, not the closest.
#[derive(Default)]
pub struct CollisionManager {
    collidables: Vec<Collidable>,
}

impl CollisionManager {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a collidable. Duplicates are not checked.
    pub fn register_collidable(&mut self, collidable: Collidable) {
        log::debug!("Registered collidable '{}' as {:?}", collidable.name, collidable.kind);
        self.collidables.push(collidable);
    }

    /// Remove every entry owned by a component with this name
    pub fn remove_component(&mut self, name: &str) -> usize {
        let before = self.collidables.len();
        self.collidables.retain(|c| c.name != name);
        let removed = before - self.collidables.len();
        if removed > 0 {
            log::debug!("Removed {} collidable(s) of '{}'", removed, name);
        }
        removed
    }

    /// Remove every entry owned by `owner`
    pub fn remove_owner(&mut self, owner: ComponentId) -> usize {
        let before = self.collidables.len();
        self.collidables.retain(|c| c.owner != owner);
        before - self.collidables.len()
    }

    /// Number of registered entries
    pub fn len(&self) -> usize {
        self.collidables.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.collidables.is_empty()
    }

    /// Entries in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Collidable> {
        self.collidables.iter()
    }

    /// First collidable matching `mask` whose box intersects `query`
    pub fn check_hit_box(&self, scene: &SceneGraph, query: &AABB, mask: CollisionType) -> HitResult {
        self.check_hit_box_excluding(scene, query, mask, None)
    }

    /// Like [`Self::check_hit_box`] but ignores entries owned by `exclude`
    pub fn check_hit_box_excluding(
        &self,
        scene: &SceneGraph,
        query: &AABB,
        mask: CollisionType,
        exclude: Option<ComponentId>,
    ) -> HitResult {
        for (candidate, bounds) in self.candidates(scene, mask, exclude) {
            if bounds.intersects(query) {
                let correction = correction_vector(query, &bounds);
                log::trace!("Box query hit '{}' correction {:?}", candidate.name, correction);
                return HitResult::with_hit(Self::hit_of(candidate, bounds), correction);
            }
        }
        HitResult::miss()
    }

    /// First collidable matching `mask` whose box contains `origin + direction`
    pub fn check_hit_ray(&self, scene: &SceneGraph, ray: &Ray, mask: CollisionType) -> HitResult {
        self.check_hit_ray_excluding(scene, ray, mask, None)
    }

    /// Like [`Self::check_hit_ray`] but ignores entries owned by `exclude`
    pub fn check_hit_ray_excluding(
        &self,
        scene: &SceneGraph,
        ray: &Ray,
        mask: CollisionType,
        exclude: Option<ComponentId>,
    ) -> HitResult {
        let probe = ray.probe_point();
        self.candidates(scene, mask, exclude)
            .find(|(_, bounds)| bounds.contains_point(probe))
            .map_or_else(HitResult::miss, |(candidate, bounds)| {
                HitResult::with_hit(Self::hit_of(candidate, bounds), Vec3::zeros())
            })
    }

    /// Flag an owner's entries so the next refresh recaptures their boxes
    pub fn mark_dirty(&mut self, owner: ComponentId) {
        for collidable in self.collidables.iter_mut().filter(|c| c.owner == owner) {
            collidable.dirty = true;
        }
    }

    /// Recapture world boxes of dirty entries for the render hook
    ///
    /// Queries never read these snapshots.
    pub fn refresh(&mut self, scene: &SceneGraph) -> usize {
        let mut refreshed = 0;
        for collidable in self.collidables.iter_mut().filter(|c| c.dirty) {
            collidable.world_box = collidable.world_box(scene);
            collidable.dirty = false;
            refreshed += 1;
        }
        refreshed
    }

    /// Last captured world box of every entry, for debug drawing
    pub fn debug_boxes(&self) -> Vec<(String, CollisionType, AABB)> {
        self.collidables
            .iter()
            .filter_map(|c| c.world_box.map(|bounds| (c.name.clone(), c.kind, bounds)))
            .collect()
    }

    fn candidates<'a>(
        &'a self,
        scene: &'a SceneGraph,
        mask: CollisionType,
        exclude: Option<ComponentId>,
    ) -> impl Iterator<Item = (&'a Collidable, AABB)> + 'a {
        self.collidables
            .iter()
            .filter(move |c| c.kind.matches(mask) && Some(c.owner) != exclude)
            .filter_map(move |c| c.world_box(scene).map(|bounds| (c, bounds)))
    }

    fn hit_of(candidate: &Collidable, bounds: AABB) -> CollisionHit {
        CollisionHit {
            owner: candidate.owner,
            name: candidate.name.clone(),
            kind: candidate.kind,
            bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;
    use crate::foundation::math::Quat;
    use approx::assert_relative_eq;

    struct Fixture {
        scene: SceneGraph,
        ids: SlotMap<ComponentId, ()>,
        manager: CollisionManager,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: SceneGraph::new(),
                ids: SlotMap::with_key(),
                manager: CollisionManager::new(),
            }
        }

        fn add_box(&mut self, name: &str, center: Vec3, half: Vec3, kind: CollisionType) -> (ComponentId, NodeId) {
            let owner = self.ids.insert(());
            let node = self.scene.create_node(name);
            self.scene.add_child(self.scene.root(), node);
            self.scene.transform_mut(node).unwrap().position = center;
            let bounds = AABB::from_center_extents(Vec3::zeros(), half);
            self.manager.register_collidable(Collidable::new(owner, name, node, bounds, kind));
            (owner, node)
        }
    }

    #[test]
    fn test_mask_filters_candidates() {
        let mut f = Fixture::new();
        f.add_box("wall", Vec3::zeros(), Vec3::repeat(5.0), CollisionType::WALL);
        let query = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));

        assert!(!f.manager.check_hit_box(&f.scene, &query, CollisionType::SOFT).hit);
        let result = f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL | CollisionType::ITEM);
        assert!(result.hit);
        assert_eq!(result.object.unwrap().name, "wall");
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut f = Fixture::new();
        f.add_box("far", Vec3::new(4.0, 0.0, 0.0), Vec3::repeat(3.0), CollisionType::ITEM);
        f.add_box("near", Vec3::zeros(), Vec3::repeat(3.0), CollisionType::ITEM);
        let query = AABB::from_center_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::repeat(1.0));
        let result = f.manager.check_hit_box(&f.scene, &query, CollisionType::ITEM);
        assert_eq!(result.object.unwrap().name, "far");
    }

    #[test]
    fn test_miss_reports_zero_correction() {
        let mut f = Fixture::new();
        f.add_box("wall", Vec3::new(100.0, 0.0, 0.0), Vec3::repeat(5.0), CollisionType::WALL);
        let query = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let result = f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL);
        assert!(!result.hit);
        assert!(result.object.is_none());
        assert_relative_eq!(result.correction, Vec3::zeros());
    }

    #[test]
    fn test_correction_axis_for_shallow_x_overlap() {
        let mut f = Fixture::new();
        f.add_box("b", Vec3::new(12.0, 5.0, 5.0), Vec3::new(3.0, 4.0, 4.0), CollisionType::WALL);
        let query = AABB::new(Vec3::zeros(), Vec3::repeat(10.0));
        let result = f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL);
        assert!(result.hit);
        assert_relative_eq!(result.correction, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_box_follows_current_node_transform() {
        let mut f = Fixture::new();
        let (_, node) = f.add_box("crate", Vec3::zeros(), Vec3::new(1.0, 1.0, 4.0), CollisionType::WALL);
        let query = AABB::from_center_extents(Vec3::new(3.0, 0.0, 0.0), Vec3::repeat(1.0));
        assert!(!f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL).hit);

        f.scene.transform_mut(node).unwrap().rotation =
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        assert!(f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL).hit);
    }

    #[test]
    fn test_ray_probe_tests_single_point() {
        let mut f = Fixture::new();
        f.add_box("item", Vec3::new(0.0, 0.0, 10.0), Vec3::repeat(1.0), CollisionType::ITEM);

        let short = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 5.0));
        assert!(!f.manager.check_hit_ray(&f.scene, &short, CollisionType::ITEM).hit);

        let reaching = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 10.0));
        assert!(f.manager.check_hit_ray(&f.scene, &reaching, CollisionType::ITEM).hit);

        let past = Ray::new(Vec3::zeros(), Vec3::new(0.0, 0.0, 20.0));
        assert!(!f.manager.check_hit_ray(&f.scene, &past, CollisionType::ITEM).hit);
    }

    #[test]
    fn test_remove_component_drops_every_entry() {
        let mut f = Fixture::new();
        let (owner, node) = f.add_box("twice", Vec3::zeros(), Vec3::repeat(1.0), CollisionType::ITEM);
        f.manager.register_collidable(Collidable::new(
            owner,
            "twice",
            node,
            AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0)),
            CollisionType::ITEM,
        ));
        assert_eq!(f.manager.remove_component("twice"), 2);
        assert_eq!(f.manager.remove_component("twice"), 0);
        assert!(f.manager.is_empty());
    }

    #[test]
    fn test_removed_node_is_skipped() {
        let mut f = Fixture::new();
        let (_, node) = f.add_box("ghost", Vec3::zeros(), Vec3::repeat(5.0), CollisionType::WALL);
        f.scene.remove(node);
        let query = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        assert!(!f.manager.check_hit_box(&f.scene, &query, CollisionType::WALL).hit);
    }

    #[test]
    fn test_exclude_skips_own_entry() {
        let mut f = Fixture::new();
        let (me, _) = f.add_box("me", Vec3::zeros(), Vec3::repeat(1.0), CollisionType::CHARACTER);
        let query = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        let result = f.manager.check_hit_box_excluding(&f.scene, &query, CollisionType::all(), Some(me));
        assert!(!result.hit);
    }

    #[test]
    fn test_refresh_captures_dirty_boxes_only() {
        let mut f = Fixture::new();
        let (owner, node) = f.add_box("mover", Vec3::zeros(), Vec3::repeat(1.0), CollisionType::CHARACTER);
        assert_eq!(f.manager.refresh(&f.scene), 1);
        assert_eq!(f.manager.refresh(&f.scene), 0);

        f.scene.transform_mut(node).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
        f.manager.mark_dirty(owner);
        assert_eq!(f.manager.refresh(&f.scene), 1);
        let boxes = f.manager.debug_boxes();
        assert_relative_eq!(boxes[0].2.center().x, 5.0);
    }
}

//! Clip playback bound to a scene subtree

use std::sync::Arc;

use super::clip::{AnimationClip, TrackProperty, TrackValue};
use crate::foundation::collections::NodeId;
use crate::scene::SceneGraph;

/// What happens when an action reaches the end of its clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Wrap around and keep playing
    #[default]
    Repeat,
    /// Hold the last frame and stop
    Once,
}

/// Handle to an action owned by a mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

struct AnimationAction {
    clip: Arc<AnimationClip>,
    /// Target node per clip track, `None` when the node was not found
    bindings: Vec<Option<NodeId>>,
    time: f32,
    time_scale: f32,
    loop_mode: LoopMode,
    start_delay: f32,
    delay_left: f32,
    running: bool,
}

/// Plays clip actions on the nodes below one model root
pub struct AnimationMixer {
    root: NodeId,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    /// Create a mixer driving the subtree below `root`
    pub fn new(root: NodeId) -> Self {
        Self { root, actions: Vec::new() }
    }

    /// Create an action for `clip`, binding each track to a node by name
    pub fn clip_action(&mut self, scene: &SceneGraph, clip: Arc<AnimationClip>) -> ActionId {
        let bindings = clip
            .tracks
            .iter()
            .map(|track| {
                let node = scene.find_descendant(self.root, &track.node);
                if node.is_none() {
                    log::debug!("Clip '{}' track targets missing node '{}'", clip.name, track.node);
                }
                node
            })
            .collect();

        self.actions.push(AnimationAction {
            clip,
            bindings,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Repeat,
            start_delay: 0.0,
            delay_left: 0.0,
            running: false,
        });
        ActionId(self.actions.len() - 1)
    }

    /// Start playing an action from its current time
    pub fn play(&mut self, id: ActionId) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.running = true;
        }
    }

    /// Stop an action and rewind it
    pub fn stop(&mut self, id: ActionId) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.running = false;
            action.time = 0.0;
            action.delay_left = action.start_delay;
        }
    }

    /// Rewind an action without changing whether it runs
    pub fn reset(&mut self, id: ActionId) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.time = 0.0;
            action.delay_left = action.start_delay;
        }
    }

    /// Whether the action is currently playing
    pub fn is_running(&self, id: ActionId) -> bool {
        self.actions.get(id.0).is_some_and(|action| action.running)
    }

    /// Set the playback rate
    pub fn set_time_scale(&mut self, id: ActionId, scale: f32) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.time_scale = scale;
        }
    }

    /// Set the loop behavior
    pub fn set_loop(&mut self, id: ActionId, mode: LoopMode) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.loop_mode = mode;
        }
    }

    /// Delay, in seconds of scaled time, before the action starts advancing
    pub fn set_start_delay(&mut self, id: ActionId, delay: f32) {
        if let Some(action) = self.actions.get_mut(id.0) {
            action.start_delay = delay;
            action.delay_left = delay;
        }
    }

    /// Advance every running action and write sampled values to the scene
    pub fn update(&mut self, scene: &mut SceneGraph, delta: f32) {
        for action in self.actions.iter_mut().filter(|action| action.running) {
            let mut step = delta * action.time_scale;
            if action.delay_left > 0.0 {
                let consumed = step.min(action.delay_left);
                action.delay_left -= consumed;
                step -= consumed;
                if action.delay_left > 0.0 {
                    continue;
                }
            }

            action.time += step;
            let duration = action.clip.duration;
            if action.time >= duration {
                match action.loop_mode {
                    LoopMode::Repeat if duration > 0.0 => action.time %= duration,
                    LoopMode::Repeat => action.time = 0.0,
                    LoopMode::Once => {
                        action.time = duration;
                        action.running = false;
                    }
                }
            }

            for (track, binding) in action.clip.tracks.iter().zip(&action.bindings) {
                let Some(transform) = binding.and_then(|node| scene.transform_mut(node)) else {
                    continue;
                };
                match (track.property, track.sample(action.time)) {
                    (TrackProperty::Position, TrackValue::Vector(v)) => transform.position = v,
                    (TrackProperty::Scale, TrackValue::Vector(v)) => transform.scale = v,
                    (TrackProperty::Quaternion, TrackValue::Rotation(q)) => transform.rotation = q,
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{Interpolation, KeyframeTrack};
    use approx::assert_relative_eq;

    fn bob_clip() -> Arc<AnimationClip> {
        let track = KeyframeTrack::new(
            "head.position",
            vec![0.0, 1.0, 2.0],
            vec![0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0],
            Interpolation::Linear,
        )
        .unwrap();
        Arc::new(AnimationClip::new("bob", 2.0, vec![track]))
    }

    fn scene_with_head() -> (SceneGraph, NodeId, NodeId) {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("model");
        let head = scene.create_node("head");
        scene.add_child(root, head);
        (scene, root, head)
    }

    #[test]
    fn test_running_action_moves_bound_node() {
        let (mut scene, root, head) = scene_with_head();
        let mut mixer = AnimationMixer::new(root);
        let action = mixer.clip_action(&scene, bob_clip());
        mixer.play(action);

        mixer.update(&mut scene, 0.5);
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 5.0);

        mixer.update(&mut scene, 2.0);
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 5.0);
        assert!(mixer.is_running(action));
    }

    #[test]
    fn test_once_action_stops_at_end() {
        let (mut scene, root, head) = scene_with_head();
        let mut mixer = AnimationMixer::new(root);
        let action = mixer.clip_action(&scene, bob_clip());
        mixer.set_loop(action, LoopMode::Once);
        mixer.set_time_scale(action, 2.0);
        mixer.play(action);

        mixer.update(&mut scene, 1.5);
        assert!(!mixer.is_running(action));
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 0.0);
    }

    #[test]
    fn test_start_delay_holds_pose() {
        let (mut scene, root, head) = scene_with_head();
        let mut mixer = AnimationMixer::new(root);
        let action = mixer.clip_action(&scene, bob_clip());
        mixer.set_start_delay(action, 1.0);
        mixer.play(action);

        mixer.update(&mut scene, 0.5);
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 0.0);
        mixer.update(&mut scene, 1.0);
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 5.0);
    }

    #[test]
    fn test_stopped_action_does_not_advance() {
        let (mut scene, root, head) = scene_with_head();
        let mut mixer = AnimationMixer::new(root);
        let action = mixer.clip_action(&scene, bob_clip());
        mixer.play(action);
        mixer.stop(action);
        scene.transform_mut(head).unwrap().position.y = 42.0;
        mixer.update(&mut scene, 0.5);
        assert_relative_eq!(scene.transform(head).unwrap().position.y, 42.0);
    }
}

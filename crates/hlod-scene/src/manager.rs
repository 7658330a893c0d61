//! Registry of live HLOD nodes and the per-frame update that drives them.

use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use hlod_lod::VisibilityState;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::node::{HlodNode, NodeId, NodeSettings, SharedNode};
use crate::viewer::Viewer;

/// Number of registered nodes in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub high: usize,
    pub low: usize,
    pub cull: usize,
    /// Nodes whose state machine is not built yet.
    pub unbuilt: usize,
}

/// Owns the local executor transitions run on and the set of live nodes.
///
/// Construct one per process (or per test). Registration is idempotent:
/// registering twice or unregistering an absent node is a no-op.
pub struct HlodManager {
    pool: LocalPool,
    nodes: FxHashMap<NodeId, SharedNode>,
}

impl Default for HlodManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HlodManager {
    /// Create a manager with an empty registry and a fresh executor.
    pub fn new() -> Self {
        Self {
            pool: LocalPool::new(),
            nodes: FxHashMap::default(),
        }
    }

    /// Spawner nodes use for their transitions.
    pub fn spawner(&self) -> LocalSpawner {
        self.pool.spawner()
    }

    /// Create a node bound to this manager's executor. It is not registered.
    pub fn create_node(&self, name: impl Into<String>, settings: NodeSettings) -> SharedNode {
        HlodNode::new(name, settings, self.spawner()).into_shared()
    }

    /// Add a node to the live set. Returns `false` if it was already registered.
    pub fn register(&mut self, node: &SharedNode) -> bool {
        let id = node.borrow().id();
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, Rc::clone(node));
        debug!(node = %id, live = self.nodes.len(), "registered");
        true
    }

    /// Remove a node from the live set. Returns `false` if it was not registered.
    pub fn unregister(&mut self, id: NodeId) -> bool {
        let removed = self.nodes.remove(&id).is_some();
        if removed {
            debug!(node = %id, live = self.nodes.len(), "unregistered");
        }
        removed
    }

    /// Node became active: enable it and register it.
    pub fn activate(&mut self, node: &SharedNode) -> bool {
        node.borrow_mut().set_enabled(true);
        self.register(node)
    }

    /// Node became inactive: disable it and unregister it.
    pub fn deactivate(&mut self, node: &SharedNode) -> bool {
        node.borrow_mut().set_enabled(false);
        let id = node.borrow().id();
        self.unregister(id)
    }

    /// Node is being destroyed.
    pub fn destroy(&mut self, node: &SharedNode) -> bool {
        let id = node.borrow().id();
        self.unregister(id)
    }

    /// Whether the node with `id` is registered.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Run the cull update of every registered node for `viewer`.
    pub fn update_cull(&mut self, viewer: &Viewer) {
        let view = viewer.view_params();
        for node in self.nodes.values() {
            node.borrow_mut().update_cull(&view);
        }
    }

    /// Advance every transition that can make progress without blocking.
    pub fn run_transitions(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Per-frame entry point: cull update, then transition progress.
    pub fn update(&mut self, viewer: &Viewer) {
        self.update_cull(viewer);
        self.run_transitions();
    }

    /// Count registered nodes per visibility state.
    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for node in self.nodes.values() {
            match node.borrow().state() {
                Some(VisibilityState::High) => counts.high += 1,
                Some(VisibilityState::Low) => counts.low += 1,
                Some(VisibilityState::Cull) => counts.cull += 1,
                None => counts.unbuilt += 1,
            }
        }
        counts
    }

    /// Drain runnable transitions and release every registered node.
    pub fn shutdown(mut self) {
        self.run_transitions();
        debug!(live = self.nodes.len(), "manager shut down");
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RepresentationRoot;
    use glam::Vec3;
    use hlod_lod::{Bounds, ResidentController};

    fn wired_node(manager: &HlodManager, center: Vec3) -> SharedNode {
        let node = manager.create_node("node", NodeSettings::default());
        {
            let mut n = node.borrow_mut();
            n.set_high_root(Some(RepresentationRoot::with_controller(
                "High",
                ResidentController::new().into_handle(),
            )));
            n.set_low_root(Some(RepresentationRoot::with_controller(
                "Low",
                ResidentController::new().into_handle(),
            )));
            n.set_bounds(Bounds::new(center, Vec3::splat(10.0)));
        }
        node
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut manager = HlodManager::new();
        let node = wired_node(&manager, Vec3::ZERO);
        assert!(manager.register(&node));
        assert!(!manager.register(&node));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_double_unregister_is_noop() {
        let mut manager = HlodManager::new();
        let node = wired_node(&manager, Vec3::ZERO);
        let id = node.borrow().id();
        manager.register(&node);

        assert!(manager.unregister(id));
        assert!(!manager.unregister(id));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_unregister_never_registered_is_noop() {
        let mut manager = HlodManager::new();
        let node = wired_node(&manager, Vec3::ZERO);
        assert!(!manager.destroy(&node));
    }

    #[test]
    fn test_deactivate_then_destroy() {
        let mut manager = HlodManager::new();
        let node = wired_node(&manager, Vec3::ZERO);
        assert!(manager.activate(&node));
        assert!(node.borrow().is_enabled());

        assert!(manager.deactivate(&node));
        assert!(!node.borrow().is_enabled());
        assert!(!manager.destroy(&node));
        assert!(!manager.contains(node.borrow().id()));
    }

    #[test]
    fn test_update_only_touches_registered_nodes() {
        let mut manager = HlodManager::new();
        let registered = wired_node(&manager, Vec3::ZERO);
        let loose = wired_node(&manager, Vec3::ZERO);
        manager.activate(&registered);

        // 90 degree fov: scale 0.5, 10 * 0.5 / 10 = 0.5 > 0.3
        let viewer = Viewer::perspective(Vec3::new(0.0, 0.0, 10.0), std::f32::consts::FRAC_PI_2);
        manager.update(&viewer);

        assert_eq!(registered.borrow().state(), Some(VisibilityState::High));
        assert_eq!(loose.borrow().state(), None);
    }

    #[test]
    fn test_state_counts() {
        let mut manager = HlodManager::new();
        let near = wired_node(&manager, Vec3::ZERO);
        let far = wired_node(&manager, Vec3::new(0.0, 0.0, -5000.0));
        let unwired = manager.create_node("unwired", NodeSettings::default());
        for node in [&near, &far, &unwired] {
            manager.activate(node);
        }

        let viewer = Viewer::perspective(Vec3::new(0.0, 0.0, 10.0), std::f32::consts::FRAC_PI_2);
        manager.update(&viewer);

        assert_eq!(
            manager.state_counts(),
            StateCounts {
                high: 1,
                low: 0,
                cull: 1,
                unbuilt: 1,
            }
        );
    }

    #[test]
    fn test_shutdown_releases_nodes() {
        let mut manager = HlodManager::new();
        let node = wired_node(&manager, Vec3::ZERO);
        manager.activate(&node);
        manager.shutdown();
        assert_eq!(Rc::strong_count(&node), 1);
    }
}

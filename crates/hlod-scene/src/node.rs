//! HLOD node: configuration, representation roots, and the lazily built
//! state machine that switches between them.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::executor::LocalSpawner;
use hlod_config::{BuildConfig, Config, StreamingConfig};
use hlod_lod::{
    Bounds, ControllerHandle, LodStateMachine, LodThresholds, ViewParams, VisibilityState,
    decide,
};
use tracing::{debug, warn};

use crate::error::SceneError;
use crate::registry::ControllerRegistry;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an HLOD node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hlod#{}", self.0)
    }
}

/// A node of the scene hierarchy holding one representation.
///
/// The root owns its controller (if any); the state machine only refers to it.
#[derive(Clone)]
pub struct RepresentationRoot {
    name: String,
    controller: Option<ControllerHandle>,
}

impl RepresentationRoot {
    /// A root with no controller attached yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            controller: None,
        }
    }

    /// A root that already owns `controller`.
    pub fn with_controller(name: impl Into<String>, controller: ControllerHandle) -> Self {
        Self {
            name: name.into(),
            controller: Some(controller),
        }
    }

    /// Name of the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller attached to the root, if any.
    pub fn controller(&self) -> Option<&ControllerHandle> {
        self.controller.as_ref()
    }

    /// Attach `controller`, replacing any previous one.
    pub fn attach(&mut self, controller: ControllerHandle) {
        self.controller = Some(controller);
    }
}

impl fmt::Debug for RepresentationRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepresentationRoot")
            .field("name", &self.name)
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}

/// Per-node configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSettings {
    pub thresholds: LodThresholds,
    pub build: BuildConfig,
    pub streaming: StreamingConfig,
}

impl NodeSettings {
    /// Settings taken from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            thresholds: LodThresholds::new(config.lod.lod_distance, config.lod.cull_distance),
            build: config.build.clone(),
            streaming: config.streaming.clone(),
        }
    }
}

/// Shared handle to a node; the manager's registry holds clones of it.
pub type SharedNode = Rc<RefCell<HlodNode>>;

/// One HLOD node of the scene.
pub struct HlodNode {
    id: NodeId,
    name: String,
    settings: NodeSettings,
    bounds: Bounds,
    high_root: Option<RepresentationRoot>,
    low_root: Option<RepresentationRoot>,
    state_machine: Option<LodStateMachine>,
    spawner: LocalSpawner,
    enabled: bool,
}

impl HlodNode {
    /// Transitions of this node are spawned through `spawner`.
    pub fn new(name: impl Into<String>, settings: NodeSettings, spawner: LocalSpawner) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            settings,
            bounds: Bounds::ZERO,
            high_root: None,
            low_root: None,
            state_machine: None,
            spawner,
            enabled: true,
        }
    }

    /// Wrap in a shared handle.
    pub fn into_shared(self) -> SharedNode {
        Rc::new(RefCell::new(self))
    }

    /// Identifier of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Name of the node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Per-node settings.
    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    /// Relative-height thresholds used by the cull decision.
    pub fn thresholds(&self) -> LodThresholds {
        self.settings.thresholds
    }

    /// Replace the thresholds. Unordered thresholds are accepted with a warning.
    pub fn set_thresholds(&mut self, thresholds: LodThresholds) {
        if !thresholds.is_ordered() {
            warn!(node = %self.id, ?thresholds, "LOD thresholds are not ordered");
        }
        self.settings.thresholds = thresholds;
    }

    /// Build settings carried for the generation pipeline.
    pub fn build_settings(&self) -> &BuildConfig {
        &self.settings.build
    }

    /// Bounds used by the cull decision.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Replace the bounds.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    /// High-detail root, if any.
    pub fn high_root(&self) -> Option<&RepresentationRoot> {
        self.high_root.as_ref()
    }

    /// Low-detail root, if any.
    pub fn low_root(&self) -> Option<&RepresentationRoot> {
        self.low_root.as_ref()
    }

    /// Replace the high root. A state machine that was already built keeps
    /// driving the controllers it was built with.
    pub fn set_high_root(&mut self, root: Option<RepresentationRoot>) {
        self.high_root = root;
    }

    /// Replace the low root. See [`HlodNode::set_high_root`].
    pub fn set_low_root(&mut self, root: Option<RepresentationRoot>) {
        self.low_root = root;
    }

    /// Whether the node is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Current visibility state, or `None` while the state machine is not built.
    pub fn state(&self) -> Option<VisibilityState> {
        self.state_machine.as_ref().map(LodStateMachine::current)
    }

    /// State machine, once built.
    pub fn state_machine(&self) -> Option<&LodStateMachine> {
        self.state_machine.as_ref()
    }

    /// Default posture when the node is created: low container active, high inactive.
    pub fn awake(&mut self) {
        if let Some(controller) = self.low_root.as_ref().and_then(RepresentationRoot::controller) {
            controller.borrow_mut().set_active(true);
        }
        if let Some(controller) = self.high_root.as_ref().and_then(RepresentationRoot::controller)
        {
            controller.borrow_mut().set_active(false);
        }
    }

    /// Build the state machine if possible and enable the controllers.
    pub fn install(&mut self) {
        if !self.enabled {
            return;
        }
        if let Some(machine) = self.update_controller() {
            machine.enable();
        }
    }

    /// Create controllers for roots that have none, using the configured
    /// streaming key. Returns how many controllers were attached.
    pub fn attach_controllers(&mut self, registry: &ControllerRegistry) -> Result<usize, SceneError> {
        let key = self.settings.streaming.streaming_type.as_str();
        let options = &self.settings.streaming.options;
        let mut attached = 0;

        for root in [self.high_root.as_mut(), self.low_root.as_mut()]
            .into_iter()
            .flatten()
        {
            if root.controller().is_none() {
                let controller = registry.create(key, root.name(), options)?;
                root.attach(controller);
                attached += 1;
            }
        }

        if self.high_root.is_none() || self.low_root.is_none() {
            warn!(node = %self.id, "node is missing a representation root");
        }
        debug!(node = %self.id, attached, streaming = key, "attached controllers");
        Ok(attached)
    }

    /// Pick the representation for `view` and drive the state machine toward it.
    ///
    /// A silent no-op until both roots resolve to a controller.
    pub fn update_cull(&mut self, view: &ViewParams) {
        let bounds = self.bounds;
        let thresholds = self.settings.thresholds;
        let Some(machine) = self.update_controller() else {
            return;
        };

        match decide(&bounds, view, &thresholds) {
            VisibilityState::High => machine.show_high(),
            VisibilityState::Low => machine.show_low(),
            VisibilityState::Cull => machine.hide(),
        }
    }

    /// Recompute the bounds from the world bounds of every renderable below the node.
    pub fn calc_bounds<'a, I>(&mut self, renderers: I) -> Bounds
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        self.bounds = Bounds::isotropic_union(renderers);
        self.bounds
    }

    fn update_controller(&mut self) -> Option<&mut LodStateMachine> {
        if self.state_machine.is_none() {
            let high = self.high_root.as_ref()?.controller()?;
            let low = self.low_root.as_ref()?.controller()?;
            self.state_machine = Some(LodStateMachine::new(high, low, self.spawner.clone()));
            debug!(node = %self.id, name = %self.name, "state machine built");
        }
        self.state_machine.as_mut()
    }
}

impl fmt::Debug for HlodNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HlodNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("state", &self.state())
            .field("enabled", &self.enabled)
            .finish()
    }
}

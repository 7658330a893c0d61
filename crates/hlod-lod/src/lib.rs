//! Level-of-detail switching for HLOD nodes: the visibility state machine,
//! its transition scheduler, and the screen-relative cull decision.

mod bounds;
mod controller;
mod cull;
mod scheduler;
mod state_machine;

pub use bounds::Bounds;
pub use controller::{
    ControllerHandle, LoadFuture, RepresentationController, ResidentController,
    WeakControllerHandle,
};
pub use cull::{LodThresholds, ViewParams, decide, relative_height};
pub use scheduler::{PendingTransition, TransitionScheduler};
pub use state_machine::{LodStateMachine, VisibilityState};

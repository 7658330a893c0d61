//! Scene-side wiring of HLOD nodes.
//!
//! [`HlodNode`] owns a node's configuration, bounds, and representation roots
//! and lazily builds its [`hlod_lod::LodStateMachine`]. [`HlodManager`] keeps
//! the live nodes, runs their cull update for a [`Viewer`] each frame, and
//! drives the executor their transitions run on. [`ControllerRegistry`]
//! resolves the configured streaming key to a controller factory.

mod error;
mod manager;
mod node;
mod registry;
mod viewer;

pub use error::SceneError;
pub use manager::{HlodManager, StateCounts};
pub use node::{HlodNode, NodeId, NodeSettings, RepresentationRoot, SharedNode};
pub use registry::{ControllerRegistry, RESIDENT_STREAMING, StreamingOptions};
pub use viewer::{Projection, Viewer};

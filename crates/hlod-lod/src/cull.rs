//! Screen-relative LOD selection for a single node.

use glam::Vec3;

use crate::bounds::Bounds;
use crate::state_machine::VisibilityState;

/// Relative-height thresholds of a node.
///
/// Meaningful decisions need `lod_distance > cull_distance > 0`; the ordering
/// is not enforced, [`LodThresholds::is_ordered`] reports it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodThresholds {
    /// Relative height above which the high representation is shown.
    pub lod_distance: f32,
    /// Relative height above which the low representation is shown.
    pub cull_distance: f32,
}

impl LodThresholds {
    /// Create thresholds from the high and cull relative heights.
    pub fn new(lod_distance: f32, cull_distance: f32) -> Self {
        Self {
            lod_distance,
            cull_distance,
        }
    }

    /// Whether `lod_distance > cull_distance > 0`.
    pub fn is_ordered(&self) -> bool {
        self.lod_distance > self.cull_distance && self.cull_distance > 0.0
    }

    /// Map a relative height to the state that should be visible.
    pub fn classify(&self, relative_height: f32) -> VisibilityState {
        if relative_height > self.lod_distance {
            VisibilityState::High
        } else if relative_height > self.cull_distance {
            VisibilityState::Low
        } else {
            VisibilityState::Cull
        }
    }
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self::new(0.3, 0.01)
    }
}

/// Viewer parameters shared by every node in one cull update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    /// Orthographic projections ignore distance.
    pub is_orthographic: bool,
    /// Viewer position in world space.
    pub position: Vec3,
    /// Projection-derived factor turning world size into screen-relative size.
    pub scale_factor: f32,
}

impl ViewParams {
    /// View from a perspective camera at `position`.
    pub fn perspective(position: Vec3, scale_factor: f32) -> Self {
        Self {
            is_orthographic: false,
            position,
            scale_factor,
        }
    }

    /// View from an orthographic camera. Distance is ignored.
    pub fn orthographic(position: Vec3, scale_factor: f32) -> Self {
        Self {
            is_orthographic: true,
            position,
            scale_factor,
        }
    }
}

/// Unitless estimate of how much of the screen the node covers.
///
/// Orthographic views use a distance of 1. A perspective viewer sitting on the
/// node's center yields `f32::INFINITY`.
pub fn relative_height(bounds: &Bounds, view: &ViewParams) -> f32 {
    let distance = if view.is_orthographic {
        1.0
    } else {
        bounds.center.distance(view.position)
    };

    if distance == 0.0 {
        return f32::INFINITY;
    }
    // size is cubical, any axis works
    bounds.size.x * view.scale_factor / distance
}

/// Decide which representation a node should show for the given view.
pub fn decide(bounds: &Bounds, view: &ViewParams, thresholds: &LodThresholds) -> VisibilityState {
    thresholds.classify(relative_height(bounds, view))
}

//! Viewer description used to drive a cull update.

use glam::Vec3;
use hlod_lod::ViewParams;

/// Projection of the viewing camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
    },
    /// Orthographic projection.
    Orthographic {
        /// Half-height of the view volume in world units.
        half_height: f32,
    },
}

/// The camera a frame's cull update is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewer {
    /// Position in world space.
    pub position: Vec3,
    pub projection: Projection,
    /// Multiplier on the scale factor; values above 1 keep detail longer.
    pub lod_bias: f32,
}

impl Viewer {
    /// Perspective viewer with vertical field of view `fov_y` in radians.
    pub fn perspective(position: Vec3, fov_y: f32) -> Self {
        Self {
            position,
            projection: Projection::Perspective { fov_y },
            lod_bias: 1.0,
        }
    }

    /// Orthographic viewer showing `half_height` units above and below center.
    pub fn orthographic(position: Vec3, half_height: f32) -> Self {
        Self {
            position,
            projection: Projection::Orthographic { half_height },
            lod_bias: 1.0,
        }
    }

    /// Scale the scale factor by `lod_bias`.
    pub fn with_lod_bias(mut self, lod_bias: f32) -> Self {
        self.lod_bias = lod_bias;
        self
    }

    /// Whether the projection is orthographic.
    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    /// Factor turning world size over distance into a fraction of screen height.
    ///
    /// Perspective: `0.5 / tan(fov_y / 2)`. Orthographic: `0.5 / half_height`.
    /// Both are multiplied by `lod_bias`.
    pub fn scale_factor(&self) -> f32 {
        let base = match self.projection {
            Projection::Perspective { fov_y } => 0.5 / (fov_y * 0.5).tan(),
            Projection::Orthographic { half_height } => 0.5 / half_height,
        };
        base * self.lod_bias
    }

    /// Parameters handed to every node's cull update.
    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            is_orthographic: self.is_orthographic(),
            position: self.position,
            scale_factor: self.scale_factor(),
        }
    }
}

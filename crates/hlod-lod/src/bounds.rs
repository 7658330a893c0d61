//! World-space bounds of an HLOD node.

use glam::Vec3;

/// An axis-aligned box stored as center and full size.
///
/// Bounds produced by [`Bounds::isotropic_union`] are cubical, so the LOD
/// metric can read any single axis of `size`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Center of the box in world space.
    pub center: Vec3,
    /// Full edge lengths along each axis.
    pub size: Vec3,
}

impl Bounds {
    /// Zero-size box at the origin.
    pub const ZERO: Self = Self {
        center: Vec3::ZERO,
        size: Vec3::ZERO,
    };

    /// Create bounds from a center and full size.
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    /// Box spanning the two corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Largest edge length.
    pub fn max_extent(&self) -> f32 {
        self.size.max_element()
    }

    /// Grow this box to contain `other`.
    pub fn encapsulate(&mut self, other: &Bounds) {
        *self = Self::from_min_max(self.min().min(other.min()), self.max().max(other.max()));
    }

    /// Union of all boxes with the size forced cubical to the union's largest edge.
    ///
    /// Returns [`Bounds::ZERO`] when the iterator is empty.
    pub fn isotropic_union<'a, I>(boxes: I) -> Self
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        let mut boxes = boxes.into_iter();
        let Some(first) = boxes.next() else {
            return Self::ZERO;
        };

        let mut union = *first;
        for b in boxes {
            union.encapsulate(b);
        }

        Self {
            center: union.center,
            size: Vec3::splat(union.max_extent()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_max_roundtrip_through_center_size() {
        let b = Bounds::from_min_max(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 4.0));
        assert_eq!(b.center, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size, Vec3::new(4.0, 4.0, 2.0));
        assert_eq!(b.min(), Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(b.max(), Vec3::new(3.0, 4.0, 4.0));
    }

    #[test]
    fn test_encapsulate_grows_to_cover_both() {
        let mut a = Bounds::from_min_max(Vec3::ZERO, Vec3::ONE);
        a.encapsulate(&Bounds::from_min_max(Vec3::splat(2.0), Vec3::splat(3.0)));
        assert_eq!(a.min(), Vec3::ZERO);
        assert_eq!(a.max(), Vec3::splat(3.0));
    }

    #[test]
    fn test_empty_union_is_zero_box_at_origin() {
        let union = Bounds::isotropic_union(std::iter::empty());
        assert_eq!(union.center, Vec3::ZERO);
        assert_eq!(union.size, Vec3::ZERO);
    }

    #[test]
    fn test_union_size_is_cubical_max_extent() {
        let children = [
            Bounds::from_min_max(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0)),
            Bounds::from_min_max(Vec3::new(8.0, 0.0, 0.0), Vec3::new(10.0, 3.0, 1.0)),
        ];
        let union = Bounds::isotropic_union(&children);

        assert_eq!(union.size, Vec3::splat(10.0));
        assert_eq!(union.center, Vec3::new(5.0, 1.5, 0.5));
    }

    #[test]
    fn test_single_child_union_keeps_center() {
        let child = Bounds::new(Vec3::new(4.0, 5.0, 6.0), Vec3::new(1.0, 7.0, 2.0));
        let union = Bounds::isotropic_union(std::iter::once(&child));
        assert_eq!(union.center, child.center);
        assert_eq!(union.size, Vec3::splat(7.0));
    }
}

//! Axis-aligned bounding volumes
//!
//! A [`BoundingVolume`] is a box with a center, half-extents on each axis, cached
//! min/max bounds and a composed affine transform kept in sync with the center.
//! Overlap comes in two flavours:
//! - rest overlap (inclusive): touching faces count, used for "already touching" queries
//! - would-overlap (exclusive): touching faces do not count, used to probe a move
//!   so a volume resting on a surface is still free to slide along it

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Min/max corners of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box of `half` extents around `center`
    #[inline]
    pub fn around(center: Vec3, half: Vec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Same box shifted by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Inclusive overlap: exact touch counts
    #[inline]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Exclusive overlap: exact touch does not count
    #[inline]
    pub fn would_overlap(&self, other: &Bounds) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }

    /// Inclusive point containment
    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Collision box with a render transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    center: Vec3,
    /// Half-extents (width, height, length)
    half: Vec3,
    bounds: Bounds,
    transform: Mat4,
    /// Render scale for imported meshes that are not unit-sized
    manual_scale: Option<Vec3>,
}

impl BoundingVolume {
    /// Volume centered at `center` with a pure translation transform
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self::with_transform(center, Mat4::from_translation(center), half_extents)
    }

    /// Volume whose render transform differs from a plain translation (e.g. a mesh offset)
    pub fn with_transform(center: Vec3, transform: Mat4, half_extents: Vec3) -> Self {
        Self {
            center,
            half: half_extents,
            bounds: Bounds::around(center, half_extents),
            transform,
            manual_scale: None,
        }
    }

    /// Unit cube (half-extent 1) at `center`
    pub fn unit(center: Vec3) -> Self {
        Self::new(center, Vec3::ONE)
    }

    /// Render the mesh at `scale` instead of the collision extents
    pub fn with_manual_scale(mut self, scale: Vec3) -> Self {
        self.manual_scale = Some(scale);
        self
    }

    #[inline]
    pub fn get_center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        self.half
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.bounds.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.bounds.max
    }

    /// Highest point of the box (snap target for anything landing on it)
    #[inline]
    pub fn get_top(&self) -> f32 {
        self.bounds.max.y
    }

    #[inline]
    pub fn get_bottom(&self) -> f32 {
        self.bounds.min.y
    }

    /// Composed transform without the extent scale
    #[inline]
    pub fn placement(&self) -> Mat4 {
        self.transform
    }

    /// Render transform: placement, then the extent scale (or the manual override)
    pub fn get_transform(&self) -> Mat4 {
        let scale = self.manual_scale.unwrap_or(self.half);
        self.transform * Mat4::from_scale(scale)
    }

    /// Bounds this volume would have after moving by `offset`
    #[inline]
    pub fn bounds_if_translated(&self, offset: Vec3) -> Bounds {
        self.bounds.translated(offset)
    }

    /// Inclusive overlap with another volume at rest
    #[inline]
    pub fn check_overlap(&self, other: &BoundingVolume) -> bool {
        self.bounds.overlaps(&other.bounds)
    }

    /// Bake a displacement into center, bounds and transform together
    pub fn apply_translation(&mut self, offset: Vec3) {
        self.center += offset;
        // Rebuilt from the center so extents cannot accumulate rounding
        self.bounds = Bounds::around(self.center, self.half);
        self.transform = crate::then_translate(&self.transform, offset);
    }
}

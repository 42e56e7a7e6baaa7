//! Spatial nodes: the values held in streamed object lists
//!
//! A node pairs a spawn transform and timestamp with an optional bounding
//! volume and a body describing what the object is. Kind-specific data lives
//! in the [`NodeBody`] variant, so a hazard always has a velocity and radius
//! and a platform never does.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::list::StreamedList;
use super::volume::BoundingVolume;

/// List of streamed world objects
pub type NodeList = StreamedList<SpatialNode>;

/// Ring planet drift (units/s)
pub const RING_PLANET_VELOCITY: Vec3 = Vec3::new(-3.0, 0.0, 8.0);

/// Plain type tag of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Ground,
    Spike,
    Fire,
    StartGameFire,
    EndGameFire,
    CometFire,
    Bomb,
    Asteroid,
    Comet,
    AsteroidExplosion,
    EndGameExplosion,
    RingPlanet,
}

impl NodeKind {
    /// Purely visual objects never take part in collisions
    pub fn is_decorative(self) -> bool {
        matches!(
            self,
            NodeKind::CometFire
                | NodeKind::RingPlanet
                | NodeKind::AsteroidExplosion
                | NodeKind::EndGameExplosion
        )
    }

    pub fn is_ground(self) -> bool {
        self == NodeKind::Ground
    }
}

/// Mesh used for a ground segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformShape {
    /// Starting runway
    LongBox,
    #[default]
    Box,
}

/// Motion state of a sphere-approximated hazard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardMotion {
    /// Units per second, applied from the node's spawn transform
    pub velocity: Vec3,
    pub radius: f32,
    /// Set once the hazard has hit something; effects spawn only on the first impact
    pub impact: bool,
    /// Run time of the last hit (cooldown reference)
    pub impact_time: f32,
    pub rotate_speed: f32,
}

impl HazardMotion {
    pub fn new(velocity: Vec3, radius: f32, rotate_speed: f32) -> Self {
        Self {
            velocity,
            radius,
            impact: false,
            impact_time: 0.0,
            rotate_speed,
        }
    }
}

/// Kind-specific node data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeBody {
    Ground { shape: PlatformShape },
    Spike,
    Fire,
    StartGameFire { color: [f32; 4] },
    EndGameFire,
    CometFire { velocity: Vec3, post_transform: Mat4 },
    Bomb,
    Asteroid(HazardMotion),
    Comet { velocity: Vec3, radius: f32, rotate_speed: f32 },
    AsteroidExplosion { expiration: f32, scale: f32, rotate_left: bool },
    EndGameExplosion { expiration: f32 },
    RingPlanet,
}

impl NodeBody {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Ground { .. } => NodeKind::Ground,
            NodeBody::Spike => NodeKind::Spike,
            NodeBody::Fire => NodeKind::Fire,
            NodeBody::StartGameFire { .. } => NodeKind::StartGameFire,
            NodeBody::EndGameFire => NodeKind::EndGameFire,
            NodeBody::CometFire { .. } => NodeKind::CometFire,
            NodeBody::Bomb => NodeKind::Bomb,
            NodeBody::Asteroid(_) => NodeKind::Asteroid,
            NodeBody::Comet { .. } => NodeKind::Comet,
            NodeBody::AsteroidExplosion { .. } => NodeKind::AsteroidExplosion,
            NodeBody::EndGameExplosion { .. } => NodeKind::EndGameExplosion,
            NodeBody::RingPlanet => NodeKind::RingPlanet,
        }
    }
}

/// A streamed world object
///
/// Identity (kind, spawn time, body) is fixed at construction; state changes
/// go through [`StreamedList::replace_node`](super::list::StreamedList::replace_node).
/// Only the owned volume moves in place as the world scrolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialNode {
    transform: Mat4,
    spawn_time: f32,
    volume: Option<BoundingVolume>,
    body: NodeBody,
}

impl SpatialNode {
    pub fn new(transform: Mat4, spawn_time: f32, body: NodeBody, volume: Option<BoundingVolume>) -> Self {
        Self {
            transform,
            spawn_time,
            volume,
            body,
        }
    }

    /// Node whose transform is taken from its volume
    pub fn with_volume(spawn_time: f32, body: NodeBody, volume: BoundingVolume) -> Self {
        Self::new(volume.placement(), spawn_time, body, Some(volume))
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    #[inline]
    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Spawn transform
    #[inline]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    #[inline]
    pub fn spawn_time(&self) -> f32 {
        self.spawn_time
    }

    /// Seconds since spawn at run time `t`
    #[inline]
    pub fn age(&self, t: f32) -> f32 {
        t - self.spawn_time
    }

    #[inline]
    pub fn volume(&self) -> Option<&BoundingVolume> {
        self.volume.as_ref()
    }

    #[inline]
    pub fn volume_mut(&mut self) -> Option<&mut BoundingVolume> {
        self.volume.as_mut()
    }

    /// Velocity-driven objects (hazards, comet trails, ring planet) at run time `t`
    ///
    /// Position is a pure function of spawn transform and age.
    pub fn drifted_transform(&self, t: f32) -> Option<Mat4> {
        let velocity = match &self.body {
            NodeBody::Asteroid(motion) => motion.velocity,
            NodeBody::Comet { velocity, .. } | NodeBody::CometFire { velocity, .. } => *velocity,
            NodeBody::RingPlanet => RING_PLANET_VELOCITY,
            _ => return None,
        };
        Some(crate::then_translate(&self.transform, velocity * self.age(t)))
    }

    /// Render-time expiry for explosions
    pub fn expiration(&self) -> Option<f32> {
        match self.body {
            NodeBody::AsteroidExplosion { expiration, .. } | NodeBody::EndGameExplosion { expiration } => {
                Some(expiration)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_body() {
        let node = SpatialNode::with_volume(
            0.0,
            NodeBody::Ground {
                shape: PlatformShape::LongBox,
            },
            BoundingVolume::new(Vec3::ZERO, Vec3::new(8.0, 1.0, 100.0)),
        );
        assert_eq!(node.kind(), NodeKind::Ground);
        assert!(node.kind().is_ground());
        assert!(!node.kind().is_decorative());
    }

    #[test]
    fn test_drifted_transform_uses_age() {
        let motion = HazardMotion::new(Vec3::new(30.0, -10.0, 20.0), 1.0, 0.5);
        let node = SpatialNode::new(
            Mat4::from_translation(Vec3::new(-300.0, 50.0, -400.0)),
            2.0,
            NodeBody::Asteroid(motion),
            None,
        );
        let model = node.drifted_transform(3.0).unwrap();
        let pos = crate::translation_of(&model);
        assert!((pos - Vec3::new(-270.0, 40.0, -380.0)).length() < 1e-4);

        let spike = SpatialNode::with_volume(0.0, NodeBody::Spike, BoundingVolume::unit(Vec3::ZERO));
        assert!(spike.drifted_transform(1.0).is_none());
    }

    #[test]
    fn test_comet_trail_is_decorative() {
        assert!(NodeKind::CometFire.is_decorative());
        assert!(!NodeKind::Fire.is_decorative());
        assert!(!NodeKind::Spike.is_decorative());
    }
}

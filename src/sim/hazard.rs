//! Sphere-approximated hazard collisions
//!
//! Asteroids are spheres, but tested cheaply against boxes: a hit is either
//! the sphere point nearest the target (projected in the x/y plane) landing
//! inside the box, or the sphere's ±radius box overlapping it. A cooldown
//! keeps one obstacle from registering a burst of hits while the hazard is
//! still touching it.
//!
//! Bounces pick one of three fixed outcomes from the approach direction:
//! - from the side (approach almost purely along +x): thrown back the other way
//! - from below: pushed down, damped
//! - otherwise: default upward damped bounce

use glam::Vec3;

use super::node::{HazardMotion, NodeKind, NodeList};
use super::volume::{Bounds, BoundingVolume};
use crate::consts::{HAZARD_CHECK_MAX_Z, HAZARD_CHECK_RANGE_X};

/// Direction x-component above which an approach counts as a side hit
const SIDE_HIT_THRESHOLD: f32 = 0.994;
/// Ground is tested with an enlarged reach to catch glancing hits
const GROUND_REACH_SCALE: f32 = 2.0;

/// Which face a hazard struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactSide {
    Side,
    Below,
    Top,
}

/// Secondary effects spawned by a hazard's first impact on the ground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEffects {
    pub position: Vec3,
    /// Spawn time of the struck segment, so effects scroll with it
    pub spawn_time: f32,
    /// Leave a fire burning at the impact point
    pub fire: bool,
    pub explosion_scale: f32,
    pub rotate_left: bool,
}

/// Result of testing one hazard for a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardOutcome {
    Clear,
    /// Struck the player (and the player is not invincible)
    HitPlayer,
    Bounced {
        motion: HazardMotion,
        side: ImpactSide,
        effects: Option<ImpactEffects>,
    },
}

/// Unit direction from the hazard toward a target, flattened to the x/y plane
#[inline]
pub fn approach_direction(hazard: Vec3, target: Vec3) -> Vec3 {
    Vec3::new(target.x - hazard.x, target.y - hazard.y, 0.0).normalize_or_zero()
}

/// Approximate sphere-vs-box test
pub fn sphere_hits_box(center: Vec3, radius: f32, reach: f32, direction: Vec3, target: &Bounds) -> bool {
    let nearest = center + direction * reach;
    target.contains_point(nearest) || Bounds::around(center, Vec3::splat(radius)).overlaps(target)
}

/// Classify the approach direction
pub fn impact_side(direction: Vec3) -> ImpactSide {
    if direction.x > SIDE_HIT_THRESHOLD {
        ImpactSide::Side
    } else if direction.y > 0.0 {
        ImpactSide::Below
    } else {
        ImpactSide::Top
    }
}

/// Velocity after bouncing off `side`
pub fn reflect_velocity(velocity: Vec3, side: ImpactSide) -> Vec3 {
    match side {
        ImpactSide::Side => Vec3::new(-(velocity.x.abs() / 3.0).max(5.0), velocity.y, velocity.z),
        ImpactSide::Below => Vec3::new(
            (velocity.x / 2.0).max(8.0),
            -(velocity.y.abs() / 2.0).max(3.0),
            velocity.z,
        ),
        ImpactSide::Top => Vec3::new(
            (velocity.x / 2.0).max(8.0),
            (velocity.y.abs() / 2.0).max(3.0),
            velocity.z,
        ),
    }
}

/// Keep `value` one unit inside `[lo, hi]`
#[inline]
fn inset(value: f32, lo: f32, hi: f32) -> f32 {
    if value < lo + 1.0 {
        lo + 1.0
    } else if value > hi - 1.0 {
        hi - 1.0
    } else {
        value
    }
}

/// Where impact effects appear on the struck box
fn effect_position(center: Vec3, target: &Bounds, side: ImpactSide) -> Vec3 {
    match side {
        ImpactSide::Side => Vec3::new(
            target.min.x + 0.4,
            target.min.y + 1.0,
            inset(center.z, target.min.z, target.max.z),
        ),
        _ => Vec3::new(
            inset(center.x, target.min.x, target.max.x),
            target.max.y - 1.4,
            inset(center.z, target.min.z, target.max.z),
        ),
    }
}

/// Bounce `motion` off `target`; effects only for the first impact on a ground segment
fn bounce(
    motion: &HazardMotion,
    center: Vec3,
    direction: Vec3,
    target: &Bounds,
    ground_spawn_time: Option<f32>,
    t: f32,
) -> HazardOutcome {
    let side = impact_side(direction);
    let effects = match ground_spawn_time {
        Some(spawn_time) if !motion.impact && side != ImpactSide::Below => Some(ImpactEffects {
            position: effect_position(center, target, side),
            spawn_time,
            fire: side == ImpactSide::Top,
            explosion_scale: 10.0 * motion.radius,
            rotate_left: side == ImpactSide::Side,
        }),
        _ => None,
    };

    HazardOutcome::Bounced {
        motion: HazardMotion {
            velocity: reflect_velocity(motion.velocity, side),
            impact: true,
            impact_time: t,
            ..*motion
        },
        side,
        effects,
    }
}

/// Test a hazard at `center` against the player and the ground list
///
/// `player` is the volume at the player's drawn position.
pub fn resolve_hazard(
    motion: &HazardMotion,
    center: Vec3,
    t: f32,
    ground: &NodeList,
    player: &BoundingVolume,
    invincible: bool,
    cooldown: f32,
) -> HazardOutcome {
    let player_center = player.get_center();
    if (center.x - player_center.x).abs() > HAZARD_CHECK_RANGE_X || center.z > HAZARD_CHECK_MAX_Z {
        return HazardOutcome::Clear;
    }
    if t - motion.impact_time <= cooldown {
        return HazardOutcome::Clear;
    }

    let direction = approach_direction(center, player_center);
    let bounds = player.bounds();
    if sphere_hits_box(center, motion.radius, motion.radius, direction, &bounds) {
        if !invincible {
            return HazardOutcome::HitPlayer;
        }
        return bounce(motion, center, direction, &bounds, None, t);
    }

    for node in ground.iter() {
        if node.kind() == NodeKind::Spike {
            continue;
        }
        let Some(volume) = node.volume() else {
            continue;
        };
        let direction = approach_direction(center, volume.get_center());
        let bounds = volume.bounds();
        let reach = GROUND_REACH_SCALE * motion.radius;
        if sphere_hits_box(center, motion.radius, reach, direction, &bounds) {
            return bounce(motion, center, direction, &bounds, Some(node.spawn_time()), t);
        }
    }

    HazardOutcome::Clear
}

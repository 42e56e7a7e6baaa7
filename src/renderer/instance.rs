//! Per-object instance data for a renderer
//!
//! [`collect_instances`] flattens the simulation into plain-old-data records
//! (model matrix, tint, mesh kind) ready to upload as an instance buffer.
//! Mesh-specific render offsets and animation rotations are baked in here so
//! the simulation itself only tracks collision transforms.

use std::f32::consts::{FRAC_PI_2, PI};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::sim::{GamePhase, NodeBody, PlatformShape, Scene, SimState, SpatialNode};

/// Mesh selector for an instance
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Player = 0,
    Ground = 1,
    LongGround = 2,
    Spike = 3,
    Fire = 4,
    CometFire = 5,
    Bomb = 6,
    Bomber = 7,
    Asteroid = 8,
    Comet = 9,
    Explosion = 10,
    BigExplosion = 11,
    RingPlanet = 12,
    Ring = 13,
}

/// One drawable instance (must match shader layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub kind: u32,
    _pad: [u32; 3], // Pad to 96 bytes
}

impl InstanceRaw {
    pub fn new(model: Mat4, tint: [f32; 4], kind: InstanceKind) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            tint,
            kind: kind as u32,
            _pad: [0; 3],
        }
    }

    pub fn kind(&self) -> u32 {
        self.kind
    }
}

/// Colors for world objects
pub mod colors {
    pub const PLAYER_EARTH: [f32; 4] = [0.9, 0.6, 0.2, 1.0];
    pub const PLAYER_SPACE: [f32; 4] = [0.5, 0.3, 0.9, 1.0];
    pub const GROUND_EARTH: [f32; 4] = [0.35, 0.55, 0.25, 1.0];
    pub const GROUND_SPACE: [f32; 4] = [0.3, 0.3, 0.4, 1.0];
    pub const SPIKE: [f32; 4] = [0.7, 0.7, 0.75, 1.0];
    pub const FIRE: [f32; 4] = [1.0, 0.45, 0.1, 1.0];
    pub const COMET_FIRE: [f32; 4] = [0.4, 0.8, 1.0, 1.0];
    pub const BOMB: [f32; 4] = [0.15, 0.15, 0.15, 1.0];
    pub const BOMBER: [f32; 4] = [0.6, 0.9, 0.6, 1.0];
    pub const ASTEROID: [f32; 4] = [0.45, 0.4, 0.35, 1.0];
    pub const COMET: [f32; 4] = [0.8, 0.9, 1.0, 1.0];
    pub const RING_PLANET: [f32; 4] = [0.85, 0.7, 0.5, 1.0];
    pub const RING: [f32; 4] = [0.9, 0.85, 0.7, 0.8];
}

/// `[r, g, b, a]` with alpha replaced
fn faded(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

fn spin(axis: Vec3, angle: f32) -> Mat4 {
    Mat4::from_axis_angle(axis.normalize(), angle)
}

/// Collision transform of a node with a volume
fn volume_transform(node: &SpatialNode) -> Mat4 {
    node.volume().map(|v| v.get_transform()).unwrap_or(node.transform())
}

/// Build the instance list for the current frame
pub fn collect_instances(state: &SimState) -> Vec<InstanceRaw> {
    let t = state.time;
    let t_fx = state.effects_time;
    let space = state.scene == Scene::Space;
    let settings = &state.settings;
    let mut out = Vec::with_capacity(
        1 + state.ground.len() + state.fire.len() + 2 * state.special.len() + state.bombs.len() + state.explosions.len(),
    );

    let player_tint = if space { colors::PLAYER_SPACE } else { colors::PLAYER_EARTH };
    out.push(InstanceRaw::new(state.player.visual_transform(), player_tint, InstanceKind::Player));

    let ground_tint = if space { colors::GROUND_SPACE } else { colors::GROUND_EARTH };
    for node in &state.ground {
        let model = volume_transform(node);
        match node.body() {
            NodeBody::Ground { shape } => {
                let kind = match shape {
                    PlatformShape::LongBox => InstanceKind::LongGround,
                    PlatformShape::Box => InstanceKind::Ground,
                };
                out.push(InstanceRaw::new(model, ground_tint, kind));
            }
            NodeBody::Spike => {
                out.push(InstanceRaw::new(model * Mat4::from_rotation_y(t_fx), colors::SPIKE, InstanceKind::Spike));
            }
            _ => {}
        }
    }

    for node in &state.fire {
        let model = volume_transform(node);
        let instance = match node.body() {
            NodeBody::Fire => InstanceRaw::new(model * Mat4::from_scale(Vec3::splat(8.0)), colors::FIRE, InstanceKind::Fire),
            NodeBody::EndGameFire => {
                InstanceRaw::new(model * Mat4::from_scale(Vec3::splat(20.0)), colors::FIRE, InstanceKind::Fire)
            }
            NodeBody::StartGameFire { color } => InstanceRaw::new(
                model * Mat4::from_scale(Vec3::splat(5.0)) * Mat4::from_translation(Vec3::new(0.0, -0.2, 0.0)),
                *color,
                InstanceKind::Fire,
            ),
            NodeBody::CometFire { post_transform, .. } => {
                let Some(drifted) = node.drifted_transform(t) else {
                    continue;
                };
                InstanceRaw::new(
                    drifted * *post_transform * Mat4::from_scale(Vec3::splat(10.0)),
                    colors::COMET_FIRE,
                    InstanceKind::CometFire,
                )
            }
            _ => continue,
        };
        out.push(instance);
    }

    for node in &state.special {
        let Some(model) = node.drifted_transform(t) else {
            continue;
        };
        let age = node.age(t);
        match node.body() {
            NodeBody::Asteroid(motion) => out.push(InstanceRaw::new(
                model
                    * spin(Vec3::new(1.0, 0.0, 1.0), -motion.rotate_speed * PI * age)
                    * Mat4::from_scale(Vec3::splat(motion.radius)),
                colors::ASTEROID,
                InstanceKind::Asteroid,
            )),
            NodeBody::Comet { radius, rotate_speed, .. } => out.push(InstanceRaw::new(
                model * spin(Vec3::new(0.0, 1.0, 1.0), -rotate_speed * PI * age) * Mat4::from_scale(Vec3::splat(*radius)),
                colors::COMET,
                InstanceKind::Comet,
            )),
            NodeBody::RingPlanet => {
                let model = model * spin(Vec3::new(1.0, 1.0, 0.0), PI / 3.0 * age);
                out.push(InstanceRaw::new(
                    model * Mat4::from_scale(Vec3::splat(5.0)),
                    colors::RING_PLANET,
                    InstanceKind::RingPlanet,
                ));
                out.push(InstanceRaw::new(
                    model * Mat4::from_scale(Vec3::new(5.0, 5.0, 0.1)),
                    colors::RING,
                    InstanceKind::Ring,
                ));
            }
            _ => {}
        }
    }

    if let Some(bomber) = state.bomber {
        if state.phase != GamePhase::Title {
            out.push(InstanceRaw::new(
                bomber * Mat4::from_scale(Vec3::splat(3.0)),
                colors::BOMBER,
                InstanceKind::Bomber,
            ));
        }
    }
    for node in &state.bombs {
        out.push(InstanceRaw::new(volume_transform(node), colors::BOMB, InstanceKind::Bomb));
    }

    for node in &state.explosions {
        let model = volume_transform(node);
        match *node.body() {
            NodeBody::AsteroidExplosion {
                expiration,
                scale,
                rotate_left,
            } => {
                let fade = (expiration - t_fx) / settings.asteroid_explosion_time;
                // Side hits burst sideways and smaller
                let (size, model) = if rotate_left {
                    (scale / 3.0, model * Mat4::from_rotation_z(FRAC_PI_2))
                } else {
                    (scale, model)
                };
                out.push(InstanceRaw::new(
                    model * Mat4::from_scale(Vec3::splat(size)),
                    faded(colors::FIRE, fade),
                    InstanceKind::Explosion,
                ));
            }
            NodeBody::EndGameExplosion { expiration } => {
                let fade = 2.0 * (expiration - t_fx) / settings.final_explosion_time;
                out.push(InstanceRaw::new(
                    model * Mat4::from_scale(Vec3::splat(15.0)),
                    faded(colors::FIRE, fade),
                    InstanceKind::BigExplosion,
                ));
            }
            _ => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::DeathCause;

    fn count(instances: &[InstanceRaw], kind: InstanceKind) -> usize {
        instances.iter().filter(|i| i.kind() == kind as u32).count()
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
        let raw = InstanceRaw::new(Mat4::IDENTITY, [1.0; 4], InstanceKind::Bomb);
        assert_eq!(bytemuck::bytes_of(&raw).len(), 96);
    }

    #[test]
    fn test_stage_one_instances() {
        let state = SimState::new(5, Settings::default());
        let instances = collect_instances(&state);

        // Player, runway, three spikes, forty start fires
        assert_eq!(instances.len(), 45);
        assert_eq!(instances[0].kind(), InstanceKind::Player as u32);
        assert_eq!(count(&instances, InstanceKind::LongGround), 1);
        assert_eq!(count(&instances, InstanceKind::Spike), 3);
        assert_eq!(count(&instances, InstanceKind::Fire), 40);
        assert_eq!(count(&instances, InstanceKind::Bomber), 0);

        // Player drawn at its visual position
        let model = Mat4::from_cols_array_2d(&instances[0].model);
        assert_eq!(crate::translation_of(&model), state.player.visual_position());
        assert_eq!(bytemuck::cast_slice::<InstanceRaw, u8>(&instances).len(), 45 * 96);
    }

    #[test]
    fn test_runway_scaled_by_extents() {
        let state = SimState::new(5, Settings::default());
        let instances = collect_instances(&state);
        let runway = instances
            .iter()
            .find(|i| i.kind() == InstanceKind::LongGround as u32)
            .unwrap();
        // Column 0 carries the x scale, column 2 the z scale
        assert_eq!(runway.model[0][0], 8.0);
        assert_eq!(runway.model[2][2], 100.0);
        assert_eq!(runway.model[3][2], -80.0);
    }

    #[test]
    fn test_end_explosion_fades() {
        let mut state = SimState::new(5, Settings::default());
        state.phase = GamePhase::Playing;
        state.time = 3.0;
        state.effects_time = 3.0;
        state.end_run(DeathCause::Fell);

        let fresh = collect_instances(&state);
        let big = fresh
            .iter()
            .find(|i| i.kind() == InstanceKind::BigExplosion as u32)
            .unwrap();
        assert_eq!(big.tint[3], 1.0);

        state.effects_time += 0.6;
        let later = collect_instances(&state);
        let big = later
            .iter()
            .find(|i| i.kind() == InstanceKind::BigExplosion as u32)
            .unwrap();
        assert!(big.tint[3] < 0.5);
    }
}

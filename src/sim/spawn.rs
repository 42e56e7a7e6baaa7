//! World generation
//!
//! Everything that enters the object lists comes through here:
//! - the stage-one runway, its spikes and start-line fires
//! - ground segments streamed in ahead of the player, with spikes on top
//! - bombs under the bomber
//! - asteroid fields, comet volleys and the ring planet
//! - end-of-run effects

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use rand::Rng;

use super::collision::ActorKind;
use super::node::{HazardMotion, NodeBody, NodeKind, NodeList, PlatformShape, SpatialNode};
use super::player::{DeathCause, Player};
use super::state::{GameEvent, GamePhase, SimState};
use super::volume::BoundingVolume;
use crate::consts::*;
use crate::{then_translate, translation_of};

/// Tint of the start-line fires
pub const START_FIRE_COLOR: [f32; 4] = [0.25, 0.25, 8.25, 1.0];
/// Start-line fires run this far down the runway
const START_FIRE_RUN: u32 = 180;
const START_FIRE_SPACING: usize = 9;
/// Largest possible segment footprint, for spike odds
const MAX_GROUND_AREA: f32 = GROUND_MAX_WIDTH * GROUND_MAX_LENGTH;
/// Minimum z gap between spike rows on one segment
const SPIKE_ROW_GAP: f32 = 2.0;
/// Bomb mesh offset inside its collision box
const BOMB_MESH_OFFSET: Vec3 = Vec3::new(-0.01, 0.35, 0.0);
const BOMB_MESH_SCALE: Vec3 = Vec3::new(1.1, 1.0, 1.0);
/// Hazard fields start this far to the player's left
const FIELD_OFFSET_X: f32 = -300.0;

/// What a hazard field is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Asteroid,
    Comet,
}

/// Grid a hazard field is laid out on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLayout {
    pub rows: u32,
    pub base_y: f32,
    pub range_y: f32,
    pub columns: u32,
    pub base_z: f32,
    pub range_z: f32,
}

pub const ASTEROID_FIELD: FieldLayout = FieldLayout {
    rows: 4,
    base_y: 50.0,
    range_y: 100.0,
    columns: 12,
    base_z: -400.0,
    range_z: 300.0,
};

pub const COMET_FIELD: FieldLayout = FieldLayout {
    rows: 1,
    base_y: 70.0,
    range_y: 20.0,
    columns: 2,
    base_z: -250.0,
    range_z: 125.0,
};

/// Bomber hovers above and ahead of the player, weaving side to side
pub fn bomber_transform(player_visual: &Mat4, t: f32) -> Mat4 {
    then_translate(player_visual, Vec3::new(5.0 * (2.0 * t).sin(), 25.0, -70.0))
}

impl SimState {
    /// Build the starting runway and place the player above it
    pub fn spawn_stage_one(&mut self) {
        self.ground.clear();
        self.fire.clear();
        self.special.clear();
        self.bombs.clear();
        self.explosions.clear();

        let mut runway = BoundingVolume::new(Vec3::ZERO, Vec3::new(GROUND_MIN_WIDTH, GROUND_HEIGHT, 100.0));
        runway.translate_free(Vec3::new(0.0, 0.0, -80.0));
        self.ground.push(SpatialNode::with_volume(
            0.0,
            NodeBody::Ground {
                shape: PlatformShape::LongBox,
            },
            runway,
        ));

        // One early spike row so the first hit comes quickly
        self.spawn_spike_triplet(0.0, 0.0, -60.0, 0.0);

        for z in (0..START_FIRE_RUN).step_by(START_FIRE_SPACING) {
            let z = -(z as f32);
            for x in [-7.0, 7.0] {
                self.spawn_obstacle(
                    x,
                    -0.6,
                    z,
                    0.0,
                    NodeBody::StartGameFire {
                        color: START_FIRE_COLOR,
                    },
                );
            }
        }

        let mut volume = BoundingVolume::unit(Vec3::ZERO);
        volume.translate(
            Vec3::new(0.0, PLAYER_START_HEIGHT, 0.0),
            &[&self.ground, &self.fire],
            ActorKind::Player,
            None,
            true,
        );
        self.player = Player::new(volume);

        log::debug!(
            "Stage one built: {} ground nodes, {} fires",
            self.ground.len(),
            self.fire.len()
        );
    }

    /// List a node of `kind` belongs in
    fn list_for(&mut self, kind: NodeKind) -> &mut NodeList {
        match kind {
            NodeKind::Ground | NodeKind::Spike => &mut self.ground,
            NodeKind::Fire | NodeKind::StartGameFire | NodeKind::EndGameFire | NodeKind::CometFire => {
                &mut self.fire
            }
            NodeKind::Bomb => &mut self.bombs,
            NodeKind::AsteroidExplosion | NodeKind::EndGameExplosion => &mut self.explosions,
            NodeKind::Asteroid | NodeKind::Comet | NodeKind::RingPlanet => &mut self.special,
        }
    }

    /// Place a unit-sized object so it rests on a platform whose center is at height `y`
    pub fn spawn_obstacle(&mut self, x: f32, y: f32, z: f32, t: f32, body: NodeBody) {
        let volume = BoundingVolume::unit(Vec3::new(x, y + OBSTACLE_LIFT, z));
        let node = SpatialNode::new(Mat4::IDENTITY, t, body, Some(volume));
        self.list_for(node.kind()).push(node);
    }

    /// Three spikes side by side, 2 units apart
    pub fn spawn_spike_triplet(&mut self, x: f32, y: f32, z: f32, t: f32) {
        for dx in [-2.0, 0.0, 2.0] {
            self.spawn_obstacle(x + dx, y, z, t, NodeBody::Spike);
        }
    }

    /// Stream in the next ground segment once the spawn interval has passed
    ///
    /// Returns whether a segment was spawned.
    pub fn spawn_ground(&mut self, t: f32) -> bool {
        if t - self.settings.ground_spawn_interval <= self.last_ground_spawn {
            return false;
        }
        self.last_ground_spawn = t;

        let origin = self.player.visual_position();
        let width = self.uniform(GROUND_MIN_WIDTH, GROUND_MAX_WIDTH);
        let length = self.uniform(GROUND_MIN_LENGTH, GROUND_MAX_LENGTH);
        let x = self.uniform(-15.0, 15.0) + origin.x;
        let y = self.uniform(-1.5, 1.5) + origin.y;
        let z = GROUND_SPAWN_DEPTH;

        self.ground.push(SpatialNode::with_volume(
            t,
            NodeBody::Ground {
                shape: PlatformShape::Box,
            },
            BoundingVolume::new(Vec3::new(x, y, z), Vec3::new(width, GROUND_HEIGHT, length)),
        ));

        // Bigger segments are more likely to carry spikes; each extra row is less likely
        let area = width * length;
        let (min_x, max_x) = (x - width + 3.0, x + width - 3.0);
        let (min_z, max_z) = (z - length + 6.0, z + length - 6.0);
        let mut rows: Vec<f32> = Vec::new();
        let mut attempts = 0u32;
        let mut selector = self.rng.random::<f32>();
        while selector <= (1.1 - 15.0 * attempts as f32 / area) * area / MAX_GROUND_AREA
            && (attempts as f32) < length / 5.0
        {
            let spike_x = self.uniform(min_x, max_x);
            let spike_z = self.uniform(min_z, max_z);
            if rows.iter().all(|&row| (spike_z - row).abs() >= SPIKE_ROW_GAP) {
                self.spawn_spike_triplet(spike_x, y, spike_z, t);
                rows.push(spike_z);
            }
            selector = self.rng.random::<f32>();
            attempts += 1;
        }

        log::debug!(
            "Ground at ({x:.1}, {y:.1}) {:.1}x{:.1}, {} spike rows",
            2.0 * width,
            2.0 * length,
            rows.len()
        );
        true
    }

    /// Drop a bomb from the bomber once the bomb interval has passed
    pub fn spawn_bomb(&mut self, t: f32) -> bool {
        let Some(bomber) = self.bomber else {
            return false;
        };
        if t - self.bomb_interval() <= self.last_bomb_spawn {
            return false;
        }
        self.last_bomb_spawn = t;

        let transform = then_translate(&bomber, BOMB_MESH_OFFSET);
        let volume = BoundingVolume::with_transform(translation_of(&bomber), transform, Vec3::ONE)
            .with_manual_scale(BOMB_MESH_SCALE);
        self.bombs.push(SpatialNode::new(transform, t, NodeBody::Bomb, Some(volume)));
        self.events.push(GameEvent::BombDropped);
        true
    }

    /// Lay out a field of hazards off to the player's left, drifting across
    pub fn spawn_hazard_field(&mut self, t: f32, kind: HazardKind) {
        let layout = match kind {
            HazardKind::Asteroid => ASTEROID_FIELD,
            HazardKind::Comet => COMET_FIELD,
        };
        let origin = self.player.visual_position();
        let step_y = layout.range_y / layout.rows as f32;
        let step_z = -layout.range_z / layout.columns as f32;

        let mut cell = Mat4::from_translation(Vec3::new(
            FIELD_OFFSET_X + origin.x,
            layout.base_y + origin.y,
            layout.base_z,
        ));
        let mut spawned = 0;
        for _ in 0..layout.rows {
            cell = then_translate(&cell, Vec3::new(0.0, step_y, layout.range_z));
            for _ in 0..layout.columns {
                cell = then_translate(&cell, Vec3::new(0.0, 0.0, step_z));

                // Asteroids fill a quarter of the cells, comets all of them
                let selector = self.rng.random_range(0..4u32);
                if kind == HazardKind::Asteroid && selector != 0 {
                    continue;
                }

                let offset = Vec3::new(
                    self.uniform(-25.0, 25.0),
                    step_y * self.uniform(-0.25, 0.25),
                    step_z * self.uniform(-0.25, 0.25),
                );
                let jitter = Vec3::new(self.uniform(-3.0, 3.0), self.uniform(-1.0, 1.0), self.uniform(-2.0, 2.0));
                let radius = self.uniform(0.5, 2.5);
                let rotate_speed = self.uniform(1.0, 3.0) / 4.0;
                let transform = then_translate(&cell, offset);

                match kind {
                    HazardKind::Asteroid => {
                        let velocity = Vec3::new(30.0, -10.0, 20.0) + jitter;
                        self.special.push(SpatialNode::new(
                            transform,
                            t,
                            NodeBody::Asteroid(HazardMotion::new(velocity, radius, rotate_speed)),
                            None,
                        ));
                    }
                    HazardKind::Comet => {
                        let radius = 2.0 * radius;
                        let velocity = Vec3::new(40.0, -5.0, 15.0) + jitter;
                        // Trail sits behind the head along the direction of travel
                        let trail_offset =
                            offset - 0.5 * radius * velocity.normalize() + Vec3::new(0.0, 0.0, radius / 2.0);
                        self.fire.push(SpatialNode::new(
                            then_translate(&cell, trail_offset),
                            t,
                            NodeBody::CometFire {
                                velocity,
                                post_transform: Mat4::from_rotation_z(FRAC_PI_2)
                                    * Mat4::from_scale(Vec3::splat(radius)),
                            },
                            None,
                        ));
                        self.special.push(SpatialNode::new(
                            transform,
                            t,
                            NodeBody::Comet {
                                velocity,
                                radius,
                                rotate_speed,
                            },
                            None,
                        ));
                    }
                }
                spawned += 1;
            }
        }
        log::debug!("Spawned {spawned} {kind:?} hazards at t={t:.2}");
    }

    /// Ring planet, once per run when space begins
    pub fn spawn_ring_planet(&mut self, t: f32) {
        let origin = self.player.visual_position();
        let transform = Mat4::from_translation(Vec3::new(50.0 + origin.x, 50.0 + origin.y, -300.0));
        self.special.push(SpatialNode::new(transform, t, NodeBody::RingPlanet, None));
        self.space_stage_began = true;
    }

    /// End the run: freeze the score and leave a crater where the player was
    pub fn end_run(&mut self, cause: DeathCause) {
        if self.final_score.is_some() {
            return;
        }
        let t = self.time;
        let score = SCORE_RATE * t;
        self.score = score;
        self.final_score = Some(score);
        self.high_score = self.high_score.max(score);
        self.high_scores.add_score(score as u64, self.stage.number());

        let at = self.player.visual_position();
        let expiration = t + self.settings.final_explosion_time;
        self.spawn_obstacle(at.x, at.y - 2.0, at.z, t, NodeBody::EndGameExplosion { expiration });
        self.spawn_obstacle(at.x, at.y - 2.0, at.z, t, NodeBody::EndGameFire);

        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::PlayerKilled { cause });
        self.events.push(GameEvent::RunEnded { score });
        log::info!(
            "Run ended ({cause:?}) at t={t:.2}, stage {}, score {score:.0}",
            self.stage.number()
        );
    }
}

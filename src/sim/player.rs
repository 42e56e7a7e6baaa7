//! Player vertical motion
//!
//! The player owns an authoritative collision volume and a visual transform.
//! The volume only moves at event boundaries (landing, strafing, a second
//! jump); between them the visual transform is the volume's placement plus a
//! kinematic offset computed from the time since the last event:
//! - jumping: `v·t - g·t²/2`
//! - grounded / falling: `-g·t²/2`
//!
//! Each frame that offset is probed against the world without committing. A
//! landing commits the snapped position and restarts the clock.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::ActorKind;
use super::node::NodeList;
use super::volume::BoundingVolume;
use crate::settings::Settings;

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalState {
    Grounded,
    Jumping,
    /// Walked off a ledge
    Falling,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Ran into a spike or fire
    Obstacle,
    /// Fell (or flew) too long without landing
    Fell,
    /// Touched by a bomb
    Bomb,
    /// Struck by an asteroid
    Asteroid,
}

/// Per-frame movement intent
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControls {
    pub left: bool,
    pub right: bool,
    pub fast_fall: bool,
}

/// Result of one player update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStep {
    /// Touched down this frame after being airborne
    pub landed: bool,
    pub death: Option<DeathCause>,
}

/// Kinematic height offset after `elapsed` seconds
#[inline]
pub fn jump_offset(jump_velocity: f32, gravity: f32, elapsed: f32) -> f32 {
    jump_velocity * elapsed - 0.5 * gravity * elapsed * elapsed
}

/// Free-fall height offset after `elapsed` seconds from rest
#[inline]
pub fn free_fall_offset(gravity: f32, elapsed: f32) -> f32 {
    jump_offset(0.0, gravity, elapsed)
}

/// The player cube
#[derive(Debug, Clone)]
pub struct Player {
    volume: BoundingVolume,
    state: VerticalState,
    jump_time: f32,
    fall_time: f32,
    can_jump: bool,
    /// Current kinematic offset of the visual transform
    delta_y: f32,
    visual: Mat4,
}

impl Player {
    pub fn new(volume: BoundingVolume) -> Self {
        let visual = volume.placement();
        Self {
            volume,
            state: VerticalState::Grounded,
            jump_time: 0.0,
            fall_time: 0.0,
            can_jump: true,
            delta_y: 0.0,
            visual,
        }
    }

    #[inline]
    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    #[inline]
    pub fn volume_mut(&mut self) -> &mut BoundingVolume {
        &mut self.volume
    }

    #[inline]
    pub fn state(&self) -> VerticalState {
        self.state
    }

    #[inline]
    pub fn can_jump(&self) -> bool {
        self.can_jump
    }

    /// Where the cube is drawn
    #[inline]
    pub fn visual_transform(&self) -> Mat4 {
        self.visual
    }

    #[inline]
    pub fn visual_position(&self) -> Vec3 {
        crate::translation_of(&self.visual)
    }

    /// Unit volume at the drawn position (what bombs and hazards hit)
    pub fn visual_volume(&self) -> BoundingVolume {
        BoundingVolume::with_transform(self.visual_position(), self.visual, Vec3::ONE)
    }

    /// Start a jump; one extra jump is allowed while airborne
    ///
    /// Returns `false` if no jump is available.
    pub fn jump(&mut self, t: f32, candidates: &[&NodeList]) -> bool {
        if !self.can_jump {
            return false;
        }
        match self.state {
            VerticalState::Grounded => {}
            VerticalState::Jumping => {
                self.can_jump = false;
                self.settle(candidates);
            }
            VerticalState::Falling => self.settle(candidates),
        }
        self.state = VerticalState::Jumping;
        self.jump_time = t;
        self.delta_y = 0.0;
        self.refresh_visual();
        true
    }

    /// Advance vertical motion and apply strafing at run time `t`
    pub fn update(
        &mut self,
        t: f32,
        dt: f32,
        controls: PlayerControls,
        candidates: &[&NodeList],
        settings: &Settings,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();

        self.delta_y = match self.state {
            VerticalState::Jumping => {
                jump_offset(settings.jump_velocity, settings.gravity, t - self.jump_time)
            }
            VerticalState::Grounded | VerticalState::Falling => {
                free_fall_offset(settings.gravity, t - self.fall_time)
            }
        };

        let probe = self.volume.translate(
            Vec3::new(0.0, self.delta_y, 0.0),
            candidates,
            ActorKind::Player,
            None,
            false,
        );

        if probe.fatal && !settings.invincible {
            step.death = Some(DeathCause::Obstacle);
            return step;
        }

        if probe.contact {
            // Fatal probes carry no displacement: an invincible cube rests where it is
            if let Some(offset) = probe.displacement {
                self.volume.apply_translation(offset);
            }
            step.landed = self.state != VerticalState::Grounded;
            self.state = VerticalState::Grounded;
            self.can_jump = true;
            self.jump_time = t;
            self.fall_time = t;
            self.delta_y = 0.0;
        } else if self.state == VerticalState::Grounded {
            self.state = VerticalState::Falling;
        }

        if !settings.invincible {
            let airborne_too_long = match self.state {
                VerticalState::Jumping => t - self.jump_time > settings.max_jump_time,
                _ => t - self.fall_time > settings.max_fall_time,
            };
            if airborne_too_long {
                step.death = Some(DeathCause::Fell);
            }
        }

        if controls.left {
            self.volume.translate_free(Vec3::new(-settings.lateral_speed * dt, 0.0, 0.0));
        }
        if controls.right {
            self.volume.translate_free(Vec3::new(settings.lateral_speed * dt, 0.0, 0.0));
        }
        if controls.fast_fall && self.state == VerticalState::Jumping {
            self.volume.translate_free(Vec3::new(0.0, -settings.fast_fall_speed * dt, 0.0));
        }

        self.refresh_visual();
        step
    }

    /// Bake the airborne offset into the volume before a new jump
    fn settle(&mut self, candidates: &[&NodeList]) {
        let offset = Vec3::new(0.0, self.delta_y, 0.0);
        self.volume.translate(offset, candidates, ActorKind::Player, None, true);
        self.delta_y = 0.0;
    }

    fn refresh_visual(&mut self) {
        self.visual = crate::then_translate(&self.volume.placement(), Vec3::new(0.0, self.delta_y, 0.0));
    }
}

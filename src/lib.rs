//! Cube Runner - a forward-scrolling 3D runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (object lists, bounding volumes, collision policies)
//! - `renderer`: Render-facing instance export (no GPU code)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `highscores`: In-memory run leaderboard

pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;

use glam::{Mat4, Vec3};

/// Game configuration constants
pub mod consts {
    /// Reference frame step used by the native runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Player kinematics
    /// Max jump height is jump_velocity² / gravity; apex is reached after jump_velocity / gravity seconds
    pub const GRAVITY: f32 = 20.0;
    pub const JUMP_VELOCITY: f32 = 12.5;
    /// Lateral strafe speed (units/s)
    pub const LATERAL_SPEED: f32 = 15.0;
    /// Extra downward speed while fast-falling (units/s)
    pub const FAST_FALL_SPEED: f32 = 15.0;
    /// A fall with no landing longer than this ends the run
    pub const MAX_FALL_TIME: f32 = 2.0;
    pub const MAX_JUMP_TIME: f32 = 3.0;
    /// Player starts this high above the origin
    pub const PLAYER_START_HEIGHT: f32 = 8.0;

    /// World scroll: objects move toward the camera (+z) with speed = accel * age
    pub const SCROLL_ACCELERATION: f32 = 12.0;
    /// Bomb forward speed ramp (units/s per second of age)
    pub const BOMB_SCROLL_ACCELERATION: f32 = 36.0;
    /// Bomb initial drop speed and drop acceleration (units/s, units/s²)
    pub const BOMB_DROP_SPEED: f32 = 15.0;
    pub const BOMB_DROP_ACCELERATION: f32 = 3.0;

    /// Objects whose near face passes this depth are behind the camera
    pub const CULL_DEPTH_Z: f32 = 20.0;
    /// Ring planet drifts further before it is dropped
    pub const RING_PLANET_CULL_Z: f32 = 100.0;
    /// Moving hazards are dropped once they drift this far to the side
    pub const HAZARD_CULL_X: f32 = 200.0;
    /// Ground whose far face is still beyond this depth cannot reach the player this frame
    pub const GROUND_SCAN_CUTOFF_Z: f32 = -10.0;

    /// Ground generation
    pub const GROUND_SPAWN_INTERVAL: f32 = 1.5;
    pub const GROUND_SPAWN_DEPTH: f32 = -150.0;
    pub const GROUND_HEIGHT: f32 = 1.0;
    pub const GROUND_MIN_WIDTH: f32 = 8.0;
    pub const GROUND_MAX_WIDTH: f32 = 15.0;
    pub const GROUND_MIN_LENGTH: f32 = 10.0;
    pub const GROUND_MAX_LENGTH: f32 = 30.0;
    /// Obstacles are lifted so a unit box rests on a 1-high platform
    pub const OBSTACLE_LIFT: f32 = 2.0;

    /// Bomber / bombs
    pub const BOMB_SPAWN_INTERVAL: f32 = 0.9;
    pub const FINAL_BOMB_SPAWN_INTERVAL: f32 = 0.15;
    pub const BOMBER_INTRO_LENGTH: f32 = 2.0;

    /// Stage start times (seconds of run time)
    pub const SECOND_STAGE_START: f32 = 15.0;
    pub const THIRD_STAGE_START: f32 = 35.0;
    pub const FOURTH_STAGE_START: f32 = 55.0;

    /// Hazards
    pub const HAZARD_HIT_COOLDOWN: f32 = 0.75;
    pub const ASTEROID_SPAWN_DELAY: f32 = 3.0;
    pub const COMET_SPAWN_DELAY: f32 = 3.0;
    /// Hazards only test collisions within this lateral distance of the player
    pub const HAZARD_CHECK_RANGE_X: f32 = 40.0;
    pub const HAZARD_CHECK_MAX_Z: f32 = 10.0;

    /// Explosion lifetimes
    pub const ASTEROID_EXPLOSION_TIME: f32 = 1.0;
    pub const FINAL_EXPLOSION_TIME: f32 = 0.7;

    /// Score per second survived
    pub const SCORE_RATE: f32 = 10.0;
}

/// Translation column of an affine transform
#[inline]
pub fn translation_of(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Post-multiply a translation onto a transform (existing transform first, then the offset)
#[inline]
pub fn then_translate(m: &Mat4, offset: Vec3) -> Mat4 {
    *m * Mat4::from_translation(offset)
}

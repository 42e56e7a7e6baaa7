//! Simulation settings and tuning
//!
//! Every gameplay constant can be overridden from a JSON document; missing
//! fields fall back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::error::{Result, SimError};

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Player ===
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Initial upward speed of a jump (units/s)
    pub jump_velocity: f32,
    pub lateral_speed: f32,
    pub fast_fall_speed: f32,
    /// Airborne limits before the run is considered lost
    pub max_fall_time: f32,
    pub max_jump_time: f32,

    // === World scroll ===
    pub scroll_acceleration: f32,
    pub bomb_scroll_acceleration: f32,
    pub bomb_drop_speed: f32,
    pub bomb_drop_acceleration: f32,

    // === Spawning ===
    pub ground_spawn_interval: f32,
    pub bomb_spawn_interval: f32,
    pub final_bomb_spawn_interval: f32,
    pub asteroid_spawn_delay: f32,
    pub comet_spawn_delay: f32,

    // === Stages ===
    pub second_stage_start: f32,
    pub third_stage_start: f32,
    pub fourth_stage_start: f32,
    /// Seconds the world stays frozen while the bomber arrives
    pub bomber_intro_length: f32,

    // === Hazards / effects ===
    pub hazard_hit_cooldown: f32,
    pub asteroid_explosion_time: f32,
    pub final_explosion_time: f32,

    // === Cheats ===
    /// Nothing kills the player
    pub invincible: bool,
    /// Player is frozen in place and invincible
    pub spectator: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            lateral_speed: LATERAL_SPEED,
            fast_fall_speed: FAST_FALL_SPEED,
            max_fall_time: MAX_FALL_TIME,
            max_jump_time: MAX_JUMP_TIME,

            scroll_acceleration: SCROLL_ACCELERATION,
            bomb_scroll_acceleration: BOMB_SCROLL_ACCELERATION,
            bomb_drop_speed: BOMB_DROP_SPEED,
            bomb_drop_acceleration: BOMB_DROP_ACCELERATION,

            ground_spawn_interval: GROUND_SPAWN_INTERVAL,
            bomb_spawn_interval: BOMB_SPAWN_INTERVAL,
            final_bomb_spawn_interval: FINAL_BOMB_SPAWN_INTERVAL,
            asteroid_spawn_delay: ASTEROID_SPAWN_DELAY,
            comet_spawn_delay: COMET_SPAWN_DELAY,

            second_stage_start: SECOND_STAGE_START,
            third_stage_start: THIRD_STAGE_START,
            fourth_stage_start: FOURTH_STAGE_START,
            bomber_intro_length: BOMBER_INTRO_LENGTH,

            hazard_hit_cooldown: HAZARD_HIT_COOLDOWN,
            asteroid_explosion_time: ASTEROID_EXPLOSION_TIME,
            final_explosion_time: FINAL_EXPLOSION_TIME,

            invincible: false,
            spectator: false,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("gravity", self.gravity),
            ("ground_spawn_interval", self.ground_spawn_interval),
            ("bomb_spawn_interval", self.bomb_spawn_interval),
            ("final_bomb_spawn_interval", self.final_bomb_spawn_interval),
            ("max_fall_time", self.max_fall_time),
            ("max_jump_time", self.max_jump_time),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(SimError::InvalidSetting {
                    name,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        if !(self.second_stage_start < self.third_stage_start
            && self.third_stage_start < self.fourth_stage_start)
        {
            return Err(SimError::InvalidSetting {
                name: "stage starts",
                reason: format!(
                    "must increase, got {} / {} / {}",
                    self.second_stage_start, self.third_stage_start, self.fourth_stage_start
                ),
            });
        }
        Ok(())
    }

    /// Spectator mode implies invincibility
    pub fn toggle_spectator(&mut self) {
        self.spectator = !self.spectator;
        self.invincible = self.spectator;
    }

    pub fn toggle_invincible(&mut self) {
        self.invincible = !self.invincible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "gravity": 30.0, "invincible": true }"#).unwrap();
        assert_eq!(settings.gravity, 30.0);
        assert!(settings.invincible);
        assert_eq!(settings.jump_velocity, JUMP_VELOCITY);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            bomb_spawn_interval: 0.5,
            ..Settings::default()
        };
        let parsed = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Settings::from_json(r#"{ "gravity": 0.0 }"#),
            Err(SimError::InvalidSetting { name: "gravity", .. })
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "third_stage_start": 10.0 }"#),
            Err(SimError::InvalidSetting { .. })
        ));
        assert!(matches!(Settings::from_json("{ nope"), Err(SimError::Config(_))));
    }

    #[test]
    fn test_spectator_toggles_invincibility() {
        let mut settings = Settings::default();
        settings.toggle_spectator();
        assert!(settings.spectator && settings.invincible);
        settings.toggle_spectator();
        assert!(!settings.spectator && !settings.invincible);
    }
}

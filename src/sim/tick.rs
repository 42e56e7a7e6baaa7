//! Fixed timestep simulation tick
//!
//! One call advances the run by `dt`. A playing frame runs, in order:
//! 1. stage / scene transitions (possibly entering the bomber intro)
//! 2. bomber, bomb spawning and the bomb sweep
//! 3. player motion
//! 4. special objects: hazard spawning, drift and the hazard policy
//! 5. ground spawning, then the ground, fire and explosion sweeps
//!
//! Sweeps walk each list once with its cursor, removing culled nodes in place.

use glam::Vec3;

use super::collision::ActorKind;
use super::error::Result;
use super::hazard::{HazardOutcome, resolve_hazard};
use super::node::{NodeBody, NodeKind, NodeList, SpatialNode};
use super::player::{DeathCause, PlayerControls};
use super::spawn::{HazardKind, bomber_transform};
use super::state::{GameEvent, GamePhase, Scene, SimState, Stage};
use crate::consts::*;
use crate::translation_of;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Leave the title screen
    pub start: bool,
    /// Jump (or the one extra jump while airborne)
    pub jump: bool,
    pub left: bool,
    pub right: bool,
    pub fast_fall: bool,
    /// Pause toggle
    pub pause: bool,
    /// Skip the rest of the bomber intro
    pub continue_intro: bool,
    pub toggle_invincible: bool,
    pub toggle_spectator: bool,
    /// Start over after a game over
    pub restart: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> Result<()> {
    if input.toggle_invincible {
        state.settings.toggle_invincible();
        log::info!("Invincibility {}", on_off(state.settings.invincible));
    }
    if input.toggle_spectator {
        state.settings.toggle_spectator();
        log::info!("Spectator mode {}", on_off(state.settings.spectator));
    }

    match state.phase {
        GamePhase::Title => {
            if input.start {
                state.phase = GamePhase::Playing;
                log::info!("Run started (seed {})", state.seed);
            }
            Ok(())
        }
        GamePhase::Paused => {
            if input.pause {
                state.phase = GamePhase::Playing;
            }
            Ok(())
        }
        GamePhase::BomberIntro => {
            advance_bomber_intro(state, input, dt);
            Ok(())
        }
        GamePhase::GameOver => {
            state.effects_time += dt;
            let t2 = state.effects_time;
            sweep_explosions(&mut state.explosions, t2, None)?;
            if input.restart {
                state.restart();
            }
            Ok(())
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                return Ok(());
            }
            play_frame(state, input, dt)
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn play_frame(state: &mut SimState, input: &TickInput, dt: f32) -> Result<()> {
    state.time += dt;
    state.effects_time += dt;
    let t = state.time;

    update_stage(state, t);

    if state.stage >= Stage::Two && !state.bomber_intro_done {
        state.phase = GamePhase::BomberIntro;
        state.intro_elapsed = 0.0;
        state.bomber = Some(bomber_transform(&state.player.visual_transform(), t));
        state.events.push(GameEvent::BomberArrived);
        log::info!("Bomber arrived at t={t:.2}");
        return Ok(());
    }

    if state.bomber_intro_done {
        state.bomber = Some(bomber_transform(&state.player.visual_transform(), t));
        state.spawn_bomb(t);
        if sweep_bombs(state, t, dt)? {
            state.end_run(DeathCause::Bomb);
            return Ok(());
        }
    }

    if let Some(cause) = step_player(state, input, t, dt) {
        state.end_run(cause);
        return Ok(());
    }

    state.score = SCORE_RATE * t;

    spawn_special(state, t);
    if sweep_special(state, t)? {
        state.end_run(DeathCause::Asteroid);
        return Ok(());
    }

    state.spawn_ground(t);

    let scroll = state.settings.scroll_acceleration * dt;
    sweep_ground(&mut state.ground, t, scroll)?;
    sweep_fire(&mut state.fire, t, scroll)?;
    sweep_explosions(&mut state.explosions, t, Some(scroll))?;
    Ok(())
}

fn update_stage(state: &mut SimState, t: f32) {
    let stage = Stage::at(t, &state.settings);
    if stage == state.stage {
        return;
    }
    state.stage = stage;
    if stage >= Stage::Two && state.scene == Scene::Earth {
        state.scene = Scene::Space;
    }
    state.events.push(GameEvent::StageChanged { stage });
    log::info!("Stage {} began at t={t:.2}", stage.number());
}

/// World stays frozen until the player continues or the intro runs out
fn advance_bomber_intro(state: &mut SimState, input: &TickInput, dt: f32) {
    state.intro_elapsed += dt;
    if input.continue_intro || state.intro_elapsed > state.settings.bomber_intro_length {
        state.bomber_intro_done = true;
        state.phase = GamePhase::Playing;
        log::debug!("Bomber intro finished after {:.2}s", state.intro_elapsed);
    }
}

fn step_player(state: &mut SimState, input: &TickInput, t: f32, dt: f32) -> Option<DeathCause> {
    if state.settings.spectator {
        return None;
    }
    let candidates = [&state.ground, &state.fire];

    if input.jump && state.player.jump(t, &candidates) {
        state.events.push(GameEvent::Jumped);
    }

    let controls = PlayerControls {
        left: input.left,
        right: input.right,
        fast_fall: input.fast_fall,
    };
    let step = state.player.update(t, dt, controls, &candidates, &state.settings);
    if step.landed {
        state.events.push(GameEvent::Landed);
    }
    step.death
}

/// Walk `list` once, dropping every node `keep` rejects
fn sweep(list: &mut NodeList, mut keep: impl FnMut(&mut SpatialNode) -> bool) -> Result<usize> {
    let mut removed = 0;
    list.reset_pointer();
    for _ in 0..list.len() {
        if keep(list.get_current_node_mut()?) {
            list.advance_node()?;
        } else {
            list.remove_current_node()?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Move a node's volume toward the camera; speed grows with age
fn scroll(node: &mut SpatialNode, t: f32, scale: f32) {
    let step = scale * node.age(t);
    if let Some(volume) = node.volume_mut() {
        volume.translate_free(Vec3::new(0.0, 0.0, step));
    }
}

/// Behind the camera
fn passed_camera(node: &SpatialNode) -> bool {
    node.volume().is_some_and(|volume| volume.min().z > CULL_DEPTH_Z)
}

fn sweep_ground(ground: &mut NodeList, t: f32, scale: f32) -> Result<()> {
    let removed = sweep(ground, |node| {
        scroll(node, t, scale);
        !passed_camera(node)
    })?;
    if removed > 0 {
        log::trace!("Culled {removed} ground nodes");
    }
    Ok(())
}

fn sweep_fire(fire: &mut NodeList, t: f32, scale: f32) -> Result<()> {
    sweep(fire, |node| match node.kind() {
        NodeKind::Fire | NodeKind::StartGameFire => {
            scroll(node, t, scale);
            !passed_camera(node)
        }
        NodeKind::CometFire => node
            .drifted_transform(t)
            .is_none_or(|model| translation_of(&model).x <= HAZARD_CULL_X),
        _ => !passed_camera(node),
    })?;
    Ok(())
}

/// Drop expired explosions; live ones scroll with the world when `scale` is given
fn sweep_explosions(explosions: &mut NodeList, t: f32, scale: Option<f32>) -> Result<()> {
    sweep(explosions, |node| {
        let alive = node.expiration().is_some_and(|expiration| expiration > t);
        if let (true, Some(scale)) = (alive, scale) {
            scroll(node, t, scale);
        }
        alive
    })?;
    Ok(())
}

/// Move bombs; returns whether one struck the player
fn sweep_bombs(state: &mut SimState, t: f32, dt: f32) -> Result<bool> {
    let target = state.player.visual_volume();
    let invincible = state.settings.invincible;
    let settings = &state.settings;
    let ground = &state.ground;
    let mut struck = false;

    sweep(&mut state.bombs, |node| {
        let age = node.age(t);
        let displacement = Vec3::new(
            0.0,
            -(settings.bomb_drop_speed * age + settings.bomb_drop_acceleration * age * age) * dt,
            settings.bomb_scroll_acceleration * age * dt,
        );
        let Some(volume) = node.volume_mut() else {
            return false;
        };
        let resolution = volume.translate(displacement, &[ground], ActorKind::Bomb, Some(&target), true);
        if resolution.fatal && !invincible {
            struck = true;
            return false;
        }
        volume.get_center().z <= CULL_DEPTH_Z
    })?;
    Ok(struck)
}

/// Ring planet once, asteroid fields and comet volleys on their delays
fn spawn_special(state: &mut SimState, t: f32) {
    let settings = &state.settings;
    if t <= settings.second_stage_start {
        return;
    }
    let asteroids_due =
        t > settings.third_stage_start && t - state.last_asteroid_spawn > settings.asteroid_spawn_delay;
    let comets_due = t - state.last_comet_spawn > settings.comet_spawn_delay;

    if !state.space_stage_began {
        state.spawn_ring_planet(t);
    }
    if asteroids_due {
        state.spawn_hazard_field(t, HazardKind::Asteroid);
        state.last_asteroid_spawn = t;
    }
    if comets_due {
        state.spawn_hazard_field(t, HazardKind::Comet);
        state.last_comet_spawn = t;
    }
}

/// Drift special objects and run asteroid collisions; returns whether the player was hit
fn sweep_special(state: &mut SimState, t: f32) -> Result<bool> {
    let target = state.player.visual_volume();
    let invincible = state.settings.invincible;
    let cooldown = state.settings.hazard_hit_cooldown;
    let mut impacts = Vec::new();
    let mut hit_player = false;

    let special = &mut state.special;
    special.reset_pointer();
    for _ in 0..special.len() {
        let node = special.get_current_node()?;
        let Some(model) = node.drifted_transform(t) else {
            special.advance_node()?;
            continue;
        };
        let position = translation_of(&model);
        let culled = match node.kind() {
            NodeKind::RingPlanet => position.z > RING_PLANET_CULL_Z,
            _ => position.z > CULL_DEPTH_Z || position.x > HAZARD_CULL_X,
        };
        if culled {
            special.remove_current_node()?;
            continue;
        }

        if let &NodeBody::Asteroid(motion) = node.body() {
            match resolve_hazard(&motion, position, t, &state.ground, &target, invincible, cooldown) {
                HazardOutcome::Clear => {}
                HazardOutcome::HitPlayer => hit_player = true,
                HazardOutcome::Bounced { motion, effects, .. } => {
                    // Restart the drift from here with the new velocity
                    special.replace_node(SpatialNode::new(model, t, NodeBody::Asteroid(motion), None))?;
                    impacts.push((position, effects));
                }
            }
        }
        special.advance_node()?;
    }

    for (position, effects) in impacts {
        state.events.push(GameEvent::HazardImpact { position });
        let Some(fx) = effects else {
            continue;
        };
        let p = fx.position;
        if fx.fire {
            state.spawn_obstacle(p.x, p.y, p.z, fx.spawn_time, NodeBody::Fire);
        }
        let expiration = t + state.settings.asteroid_explosion_time;
        state.spawn_obstacle(
            p.x,
            p.y,
            p.z,
            fx.spawn_time,
            NodeBody::AsteroidExplosion {
                expiration,
                scale: fx.explosion_scale,
                rotate_left: fx.rotate_left,
            },
        );
    }
    Ok(hit_player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::player::VerticalState;

    fn run(state: &mut SimState, input: &TickInput, seconds: f32) {
        let frames = (seconds / FRAME_DT).round() as usize;
        for _ in 0..frames {
            tick(state, input, FRAME_DT).unwrap();
            if state.is_over() {
                break;
            }
        }
    }

    fn started(settings: Settings) -> SimState {
        let mut state = SimState::new(12345, settings);
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, FRAME_DT).unwrap();
        state
    }

    fn spike_row_z(state: &SimState) -> f32 {
        state
            .ground
            .iter()
            .find(|n| n.kind() == NodeKind::Spike)
            .and_then(|n| n.volume())
            .map(|v| v.get_center().z)
            .unwrap()
    }

    #[test]
    fn test_title_waits_for_start() {
        let mut state = SimState::new(1, Settings::default());
        run(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.time, 0.0);

        let state = started(Settings::default());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_player_lands_on_runway() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 1.5);

        assert!(!state.is_over());
        assert_eq!(state.player.state(), VerticalState::Grounded);
        assert_eq!(state.player.volume().get_bottom(), 1.0);
        assert!(state.drain_events().contains(&GameEvent::Landed));
        assert!((state.score - SCORE_RATE * state.time).abs() < 1e-3);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 1.0);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Paused);

        let time = state.time;
        let spike_z = spike_row_z(&state);
        run(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.time, time);
        assert_eq!(spike_row_z(&state), spike_z);

        tick(&mut state, &pause, FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();
        assert!(spike_row_z(&state) > spike_z);
    }

    #[test]
    fn test_scroll_speed_grows_with_age() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 2.0);
        // Spike row started at z=-60 and moves at scroll_acceleration * age
        let expected = -60.0 + 0.5 * SCROLL_ACCELERATION * state.time * state.time;
        assert!((spike_row_z(&state) - expected).abs() < 0.5);
    }

    #[test]
    fn test_spike_row_kills_idle_player() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 6.0);

        assert!(state.is_over());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerKilled {
            cause: DeathCause::Obstacle
        }));
        let score = state.final_score.unwrap();
        assert!((score - SCORE_RATE * state.time).abs() < 1e-3);
        assert!(state.time > 2.5 && state.time < 3.5);
    }

    #[test]
    fn test_strafing_past_spikes() {
        let mut state = started(Settings::default());
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        // 18 frames at 15 units/s puts the player between the spikes and the fires
        for _ in 0..18 {
            tick(&mut state, &right, FRAME_DT).unwrap();
        }
        run(&mut state, &TickInput::default(), 3.0);

        assert!(!state.is_over());
        assert!(spike_row_z(&state) > 2.0);
        assert!((state.player.volume().get_center().x - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_double_jump_event_flow() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 1.0);
        state.drain_events();

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, FRAME_DT).unwrap();
        run(&mut state, &TickInput::default(), 0.2);
        tick(&mut state, &jump, FRAME_DT).unwrap();
        tick(&mut state, &jump, FRAME_DT).unwrap();

        let jumps = state.drain_events().iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 2);
        assert!(!state.player.can_jump());
    }

    #[test]
    fn test_game_over_effects_play_out() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 6.0);
        assert!(state.is_over());
        assert_eq!(state.count_kind(NodeKind::EndGameExplosion), 1);

        let time = state.time;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();
        }
        assert_eq!(state.time, time);
        assert!(state.effects_time > time + 0.9);
        assert_eq!(state.count_kind(NodeKind::EndGameExplosion), 0);
        assert_eq!(state.count_kind(NodeKind::EndGameFire), 1);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = started(Settings::default());
        run(&mut state, &TickInput::default(), 6.0);
        assert!(state.is_over());
        let best = state.high_score;

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.time, 0.0);
        assert_eq!(state.high_score, best);
        assert_eq!(state.high_scores.entries.len(), 1);
        assert_eq!(state.count_kind(NodeKind::Spike), 3);
    }

    #[test]
    fn test_bomber_intro_freezes_then_resumes() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        run(&mut state, &TickInput::default(), 15.2);

        assert_eq!(state.phase, GamePhase::BomberIntro);
        assert_eq!(state.scene, Scene::Space);
        assert!(state.bomber.is_some());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::StageChanged { stage: Stage::Two }));
        assert!(events.contains(&GameEvent::BomberArrived));

        let time = state.time;
        run(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.time, time);
        assert_eq!(state.phase, GamePhase::BomberIntro);

        let resume = TickInput {
            continue_intro: true,
            ..Default::default()
        };
        tick(&mut state, &resume, FRAME_DT).unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
        run(&mut state, &TickInput::default(), 2.0);
        assert!(!state.bombs.is_empty());
        assert_eq!(state.count_kind(NodeKind::RingPlanet), 1);
        assert!(state.count_kind(NodeKind::Comet) > 0);
    }

    #[test]
    fn test_intro_times_out() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        run(&mut state, &TickInput::default(), 15.2);
        assert_eq!(state.phase, GamePhase::BomberIntro);
        let intro_length = state.settings.bomber_intro_length;
        run(&mut state, &TickInput::default(), intro_length + 0.1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_bombs_fall_and_move_forward() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        state.time = 20.0;
        state.stage = Stage::Two;
        state.scene = Scene::Space;
        state.bomber_intro_done = true;

        tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();
        let spawned = state.bombs.iter().next().unwrap().volume().unwrap().get_center();

        run(&mut state, &TickInput::default(), 0.5);
        let bomb = state.bombs.iter().next().unwrap();
        let center = bomb.volume().unwrap().get_center();
        assert!(center.y < spawned.y);
        assert!(center.z > spawned.z);
    }

    #[test]
    fn test_asteroids_arrive_in_stage_three() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        state.time = 36.0;
        state.stage = Stage::Three;
        state.scene = Scene::Space;
        state.bomber_intro_done = true;

        tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();
        assert_eq!(state.last_asteroid_spawn, state.time);
        assert_eq!(state.count_kind(NodeKind::RingPlanet), 1);
    }

    #[test]
    fn test_final_stage_drops_bombs_faster() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        state.time = 56.0;
        state.stage = Stage::Four;
        state.scene = Scene::Space;
        state.bomber_intro_done = true;

        state.drain_events();
        run(&mut state, &TickInput::default(), 1.0);
        let dropped = state.drain_events().iter().filter(|e| **e == GameEvent::BombDropped).count();
        assert!(dropped >= 6);
    }

    #[test]
    fn test_ground_stays_ordered_for_early_exit() {
        let settings = Settings {
            spectator: true,
            invincible: true,
            ..Settings::default()
        };
        let mut state = started(settings);
        for _ in 0..(14.0 / FRAME_DT) as usize {
            tick(&mut state, &TickInput::default(), FRAME_DT).unwrap();

            // Once a segment is beyond the cutoff, every later segment is too
            let mut beyond = false;
            for node in state.ground.iter().filter(|n| n.kind() == NodeKind::Ground) {
                let far = node.volume().unwrap().max().z < GROUND_SCAN_CUTOFF_Z;
                assert!(!beyond || far, "ground out of order at t={}", state.time);
                beyond |= far;
            }
        }
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            invincible: true,
            ..Settings::default()
        };
        let mut a = started(settings.clone());
        let mut b = started(settings);

        let inputs = [
            TickInput::default(),
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput {
                left: true,
                ..Default::default()
            },
        ];
        for i in 0..1200 {
            let input = &inputs[(i / 30) % inputs.len()];
            tick(&mut a, input, FRAME_DT).unwrap();
            tick(&mut b, input, FRAME_DT).unwrap();
        }

        assert_eq!(a.time, b.time);
        assert_eq!(a.ground.len(), b.ground.len());
        assert_eq!(a.player.visual_position(), b.player.visual_position());
        assert_eq!(a.events, b.events);
    }
}

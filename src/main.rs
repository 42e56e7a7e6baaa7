//! Cube Runner headless runner
//!
//! Runs one seeded session at a fixed 60 Hz with a simple autopilot and logs
//! how it went. Usage: `cube-runner [settings.json] [seed]`.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use cube_runner::Settings;
    use cube_runner::consts::FRAME_DT;
    use cube_runner::sim::{GameEvent, NodeKind, SimState, TickInput, tick};

    /// Stop the session after this much run time even if the player survives
    const MAX_RUN_TIME: f32 = 120.0;
    const DEFAULT_SEED: u64 = 0xC0BE;

    pub fn run() -> cube_runner::sim::Result<()> {
        let mut args = std::env::args().skip(1);
        let settings = match args.next() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);

        let mut state = SimState::new(seed, settings);
        log::info!("Game initialized with seed: {seed}");

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, FRAME_DT)?;

        let mut frames: u64 = 0;
        while !state.is_over() && state.time < MAX_RUN_TIME {
            let input = autopilot(&state);
            tick(&mut state, &input, FRAME_DT)?;
            frames += 1;

            for event in state.drain_events() {
                match event {
                    GameEvent::StageChanged { stage } => log::info!("Reached stage {}", stage.number()),
                    GameEvent::RunEnded { score } => log::info!("Final score: {score:.0}"),
                    other => log::debug!("{other:?}"),
                }
            }
        }

        if !state.is_over() {
            log::info!("Survived {MAX_RUN_TIME}s, score {:.0}", state.score);
        }
        log::info!(
            "{frames} frames, {} ground / {} fire / {} special nodes live at exit",
            state.ground.len(),
            state.fire.len(),
            state.special.len()
        );
        if let Some(best) = state.high_scores.top_score() {
            log::info!("High score: {best}");
        }
        Ok(())
    }

    /// Idle-mode player: jump over obstacles in our lane, steer toward solid ground
    fn autopilot(state: &SimState) -> TickInput {
        let p = state.player.visual_position();

        let threat = state
            .ground
            .iter()
            .chain(state.fire.iter())
            .filter(|n| matches!(n.kind(), NodeKind::Spike | NodeKind::Fire | NodeKind::StartGameFire))
            .filter_map(|n| n.volume())
            .any(|v| (v.get_center().x - p.x).abs() < 2.5 && (-12.0..-2.0).contains(&v.max().z));

        // Segment under us, else the nearest one still ahead
        let target = state
            .ground
            .iter()
            .filter(|n| n.kind() == NodeKind::Ground)
            .filter_map(|n| n.volume())
            .filter(|v| v.min().z < 1.0)
            .max_by(|a, b| a.max().z.total_cmp(&b.max().z))
            .map(|v| (v.get_center().x, v.half_extents().x));

        let (left, right) = match target {
            Some((x, half_width)) if (x - p.x).abs() > half_width - 2.0 => (x < p.x, x > p.x),
            _ => (false, false),
        };

        TickInput {
            jump: threat && state.player.can_jump(),
            left,
            right,
            ..Default::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cube Runner (native) starting...");

    if let Err(err) = native::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by an embedding frontend on wasm
}

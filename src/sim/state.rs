//! Simulation state and core run types
//!
//! Everything a run needs lives here: the five object lists, the player,
//! both clocks, spawn timers and the seeded RNG. Rebuilding a state from the
//! same seed and settings and feeding it the same inputs replays the run.

use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::node::{NodeKind, NodeList};
use super::player::{DeathCause, Player};
use super::volume::BoundingVolume;
use crate::highscores::HighScores;
use crate::settings::Settings;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Stage one built, waiting for the start input
    Title,
    /// Active gameplay
    Playing,
    /// World frozen while the bomber flies in
    BomberIntro,
    Paused,
    /// Run ended; effects keep playing out
    GameOver,
}

/// Difficulty stage, selected by run time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Ground and spikes only
    One,
    /// Space scene, bomber, comets
    Two,
    /// Asteroid fields
    Three,
    /// Bombs fall much faster
    Four,
}

impl Stage {
    /// Stage for run time `t`
    pub fn at(t: f32, settings: &Settings) -> Self {
        if t >= settings.fourth_stage_start {
            Stage::Four
        } else if t >= settings.third_stage_start {
            Stage::Three
        } else if t >= settings.second_stage_start {
            Stage::Two
        } else {
            Stage::One
        }
    }

    /// 1-based stage number
    pub fn number(self) -> u8 {
        match self {
            Stage::One => 1,
            Stage::Two => 2,
            Stage::Three => 3,
            Stage::Four => 4,
        }
    }
}

/// Backdrop; switches once when stage two begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    Earth,
    Space,
}

/// Notable things that happened during a tick
///
/// Queued on the state for the audio/UI layer to drain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Landed,
    StageChanged { stage: Stage },
    BomberArrived,
    BombDropped,
    /// An asteroid bounced off something at this position
    HazardImpact { position: Vec3 },
    PlayerKilled { cause: DeathCause },
    RunEnded { score: f32 },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub settings: Settings,
    pub phase: GamePhase,
    pub stage: Stage,
    pub scene: Scene,

    /// Run time: advances only while playing
    pub time: f32,
    /// Effects time: also advances after game over so explosions finish
    pub effects_time: f32,
    /// Seconds spent in the current bomber intro
    pub intro_elapsed: f32,

    // === Object lists ===
    /// Ground segments and spikes
    pub ground: NodeList,
    /// Fires, start/end fires, comet trails
    pub fire: NodeList,
    /// Asteroids, comets, ring planet
    pub special: NodeList,
    pub bombs: NodeList,
    pub explosions: NodeList,

    pub player: Player,
    /// Bomber transform once it has arrived
    pub bomber: Option<Mat4>,
    pub bomber_intro_done: bool,
    /// Ring planet spawned for this run
    pub space_stage_began: bool,

    // === Spawn timers (run time of the last spawn) ===
    pub last_ground_spawn: f32,
    pub last_bomb_spawn: f32,
    pub last_asteroid_spawn: f32,
    pub last_comet_spawn: f32,

    pub score: f32,
    /// Set once when the run ends
    pub final_score: Option<f32>,
    /// Best score this process has seen
    pub high_score: f32,
    pub high_scores: HighScores,

    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl SimState {
    /// Create a state with stage one built, waiting for the start input
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            phase: GamePhase::Title,
            stage: Stage::One,
            scene: Scene::Earth,
            time: 0.0,
            effects_time: 0.0,
            intro_elapsed: 0.0,
            ground: NodeList::new(),
            fire: NodeList::new(),
            special: NodeList::new(),
            bombs: NodeList::new(),
            explosions: NodeList::new(),
            player: Player::new(BoundingVolume::unit(Vec3::ZERO)),
            bomber: None,
            bomber_intro_done: false,
            space_stage_began: false,
            last_ground_spawn: 0.0,
            last_bomb_spawn: 0.0,
            last_asteroid_spawn: 0.0,
            last_comet_spawn: 0.0,
            score: 0.0,
            final_score: None,
            high_score: 0.0,
            high_scores: HighScores::new(),
            events: Vec::new(),
        };
        state.spawn_stage_one();
        state
    }

    /// Throw the run away and rebuild stage one
    ///
    /// Settings, high scores and the RNG stream carry over.
    pub fn restart(&mut self) {
        self.phase = GamePhase::Title;
        self.stage = Stage::One;
        self.scene = Scene::Earth;
        self.time = 0.0;
        self.effects_time = 0.0;
        self.intro_elapsed = 0.0;
        self.bomber = None;
        self.bomber_intro_done = false;
        self.space_stage_began = false;
        self.last_ground_spawn = 0.0;
        self.last_bomb_spawn = 0.0;
        self.last_asteroid_spawn = 0.0;
        self.last_comet_spawn = 0.0;
        self.score = 0.0;
        self.final_score = None;
        self.events.clear();
        self.spawn_stage_one();
        log::info!("Run restarted");
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Current bomb cadence
    pub fn bomb_interval(&self) -> f32 {
        if self.stage == Stage::Four {
            self.settings.final_bomb_spawn_interval
        } else {
            self.settings.bomb_spawn_interval
        }
    }

    /// Live nodes of `kind` across all lists
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        [&self.ground, &self.fire, &self.special, &self.bombs, &self.explosions]
            .into_iter()
            .flat_map(|list| list.iter())
            .filter(|node| node.kind() == kind)
            .count()
    }

    /// Uniform sample in `[lo, hi)`
    pub(crate) fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.rng.random::<f32>() * (hi - lo)
    }
}

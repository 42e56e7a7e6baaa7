//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (list insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod error;
pub mod hazard;
pub mod list;
pub mod node;
pub mod player;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod volume;

pub use collision::{ActorKind, Resolution};
pub use error::{Result, SimError};
pub use hazard::{HazardOutcome, ImpactEffects, ImpactSide, resolve_hazard};
pub use list::StreamedList;
pub use node::{HazardMotion, NodeBody, NodeKind, NodeList, PlatformShape, SpatialNode};
pub use player::{DeathCause, Player, PlayerControls, PlayerStep, VerticalState};
pub use spawn::{HazardKind, bomber_transform};
pub use state::{GameEvent, GamePhase, Scene, SimState, Stage};
pub use tick::{TickInput, tick};
pub use volume::{Bounds, BoundingVolume};

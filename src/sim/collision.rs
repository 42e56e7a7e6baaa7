//! Movement resolution for bounding volumes
//!
//! [`BoundingVolume::translate`] is the single entry point for moving a volume
//! through the world. The actor kind picks the policy:
//! - `Player`: snap onto ground, anything else solid is fatal and blocks the move
//! - `Bomb`: snap onto ground, touching the player is fatal
//! - `Unconstrained`: no collision checks (strafing, scrolling, decorative motion)
//!
//! With `commit == false` the outcome is computed but nothing moves, so a
//! caller can probe a move and decide afterwards.

use glam::Vec3;

use super::node::NodeList;
use super::volume::BoundingVolume;
use crate::consts::GROUND_SCAN_CUTOFF_Z;

/// Movement policy for a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Bomb,
    Unconstrained,
}

/// Outcome of a translation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Landed on / hit a ground segment
    pub contact: bool,
    /// The move kills the player
    pub fatal: bool,
    /// Displacement after snapping, or `None` if the move was rejected
    pub displacement: Option<Vec3>,
    /// Candidate nodes examined
    pub scanned: usize,
}

impl Resolution {
    fn free(displacement: Vec3) -> Self {
        Self {
            contact: false,
            fatal: false,
            displacement: Some(displacement),
            scanned: 0,
        }
    }

    /// `(contact, fatal)` pair
    #[inline]
    pub fn status(&self) -> (bool, bool) {
        (self.contact, self.fatal)
    }
}

impl BoundingVolume {
    /// Request a move of `displacement`, checking `candidates` according to `actor`
    ///
    /// `reference` is the player volume when moving a bomb. Rejected moves are
    /// never committed; accepted ones are committed only when `commit` is set.
    pub fn translate(
        &mut self,
        displacement: Vec3,
        candidates: &[&NodeList],
        actor: ActorKind,
        reference: Option<&BoundingVolume>,
        commit: bool,
    ) -> Resolution {
        let resolution = match actor {
            ActorKind::Player => self.resolve_player(displacement, candidates),
            ActorKind::Bomb => self.resolve_bomb(displacement, candidates, reference),
            ActorKind::Unconstrained => Resolution::free(displacement),
        };

        if commit {
            if let Some(offset) = resolution.displacement {
                self.apply_translation(offset);
            }
        }
        resolution
    }

    /// Unchecked committed move
    #[inline]
    pub fn translate_free(&mut self, displacement: Vec3) {
        self.translate(displacement, &[], ActorKind::Unconstrained, None, true);
    }

    fn resolve_player(&self, displacement: Vec3, candidates: &[&NodeList]) -> Resolution {
        let mut offset = displacement;
        let mut probe = self.bounds_if_translated(offset);
        let mut landed = false;
        let mut scanned = 0;

        for list in candidates {
            for node in list.iter() {
                scanned += 1;
                let kind = node.kind();
                if kind.is_decorative() {
                    continue;
                }
                let Some(other) = node.volume() else {
                    continue;
                };
                // Ground is appended in spawn order, so everything after a distant segment is further still
                if kind.is_ground() && other.max().z < GROUND_SCAN_CUTOFF_Z {
                    break;
                }
                if !probe.would_overlap(&other.bounds()) {
                    continue;
                }

                if kind.is_ground() {
                    offset.y = other.get_top() - self.get_bottom();
                    probe = self.bounds_if_translated(offset);
                    landed = true;
                } else {
                    return Resolution {
                        contact: true,
                        fatal: true,
                        displacement: None,
                        scanned,
                    };
                }
            }
        }

        Resolution {
            contact: landed,
            fatal: false,
            displacement: Some(offset),
            scanned,
        }
    }

    fn resolve_bomb(
        &self,
        displacement: Vec3,
        candidates: &[&NodeList],
        reference: Option<&BoundingVolume>,
    ) -> Resolution {
        let probe = self.bounds_if_translated(displacement);
        let hit_player = reference.is_some_and(|player| probe.would_overlap(&player.bounds()));

        let mut offset = displacement;
        let mut hit_ground = false;
        let mut scanned = 0;

        for list in candidates {
            for node in list.iter() {
                scanned += 1;
                if !node.kind().is_ground() {
                    continue;
                }
                let Some(ground) = node.volume() else {
                    continue;
                };
                if probe.would_overlap(&ground.bounds()) {
                    offset.y = ground.get_top() - self.get_bottom();
                    hit_ground = true;
                }
            }
            if hit_ground || hit_player {
                break;
            }
        }

        Resolution {
            contact: hit_ground,
            fatal: hit_player,
            // A bomb that only found the player stays where it is
            displacement: (hit_ground || !hit_player).then_some(offset),
            scanned,
        }
    }
}

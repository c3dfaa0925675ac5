//! TrailSet — every trail in a scene, plus the groups that share anchors.
//!
//! A *trail* is one [`ParticleChain`] with the [`RibbonBuilder`] that turns it
//! into geometry.  A *group* is a list of trails that all receive the same
//! anchor on [`TrailSet::update_group`]; each member still has its own
//! spring parameters, so a group fans out into several distinct ribbons
//! chasing one point.
//!
//! ## Frame order
//!
//! | Step | Call | Effect |
//! |---|---|---|
//! | 1 | `update_group` / `update_trail` | pin heads (zero or more calls) |
//! | 2 | `step_all` | advance physics |
//! | 3 | `rebuild_all` | derive ribbon vertices |
//! | 4 | `for_each_dirty` | hand buffers to the renderer |
//!
//! [`TrailSet::advance`] performs steps 2–3 unless the set is paused.  While
//! paused, heads keep tracking their anchors but the bodies freeze, so the
//! first frame after resuming shows the head far ahead of particle 1.

use glam::Vec3;
use log::{debug, info};
use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::chain::ParticleChain;
use crate::error::{Result, TrailError};
use crate::ribbon::{RibbonBuilder, DEFAULT_INSET};

// ════════════════════════════════════════════════════════════════════════════
// Handles
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrailId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl TrailId {
    pub fn index(self) -> usize { self.0 }
}

impl GroupId {
    pub fn index(self) -> usize { self.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// Trail
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct Trail {
    chain:  ParticleChain,
    ribbon: RibbonBuilder,
}

impl Trail {
    pub fn new(chain: ParticleChain, inset: f32) -> Self {
        Trail { chain, ribbon: RibbonBuilder::new(inset) }
    }

    pub fn chain(&self)  -> &ParticleChain { &self.chain }
    pub fn ribbon(&self) -> &RibbonBuilder { &self.ribbon }

    pub fn update(&mut self, anchor: Vec3, normal: Vec3) { self.chain.update(anchor, normal); }
    pub fn step(&mut self)                                { self.chain.step(); }
    pub fn rebuild(&mut self)                             { self.ribbon.rebuild(&self.chain); }
}

// ════════════════════════════════════════════════════════════════════════════
// TrailGroup
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct TrailGroup {
    members: Vec<TrailId>,
}

impl TrailGroup {
    pub fn members(&self) -> &[TrailId] { &self.members }
    pub fn len(&self)      -> usize      { self.members.len() }
    pub fn is_empty(&self) -> bool       { self.members.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// TrailSet
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct TrailSet {
    trails: Vec<Trail>,
    groups: Vec<TrailGroup>,
    inset:  f32,
    paused: bool,
}

impl TrailSet {
    pub fn new() -> Self { Self::with_inset(DEFAULT_INSET) }

    /// An empty set whose ribbons sit `inset` off their centrelines.
    pub fn with_inset(inset: f32) -> Self {
        TrailSet { trails: Vec::new(), groups: Vec::new(), inset, paused: false }
    }

    // ── setup ─────────────────────────────────────────────────────────────

    pub fn add_trail(&mut self, chain: ParticleChain) -> TrailId {
        let id = TrailId(self.trails.len());
        self.trails.push(Trail::new(chain, self.inset));
        id
    }

    /// Add `count` chains with randomly drawn parameters as one group.
    pub fn add_group<R: Rng + ?Sized>(
        &mut self,
        count:  usize,
        length: usize,
        width:  f32,
        rng:    &mut R,
    ) -> GroupId {
        self.add_group_from((0..count).map(|_| ParticleChain::random(length, width, &mut *rng)))
    }

    /// Add pre-built chains as one group.
    pub fn add_group_from<I>(&mut self, chains: I) -> GroupId
    where
        I: IntoIterator<Item = ParticleChain>,
    {
        let members: Vec<TrailId> = chains.into_iter().map(|c| self.add_trail(c)).collect();
        let id = GroupId(self.groups.len());
        debug!("group #{} registered with {} trails", id.0, members.len());
        self.groups.push(TrailGroup { members });
        id
    }

    // ── anchors ───────────────────────────────────────────────────────────

    pub fn update_trail(&mut self, id: TrailId, anchor: Vec3, normal: Vec3) -> Result<()> {
        let trail = self.trails.get_mut(id.0).ok_or(TrailError::UnknownTrail(id.0))?;
        trail.update(anchor, normal);
        Ok(())
    }

    /// Give every member of `id` the same anchor.
    pub fn update_group(&mut self, id: GroupId, anchor: Vec3, normal: Vec3) -> Result<()> {
        let group = self.groups.get(id.0).ok_or(TrailError::UnknownGroup(id.0))?;
        for member in &group.members {
            self.trails[member.0].update(anchor, normal);
        }
        Ok(())
    }

    // ── per-frame work ────────────────────────────────────────────────────

    #[cfg(not(feature = "parallel"))]
    pub fn step_all(&mut self) {
        self.trails.iter_mut().for_each(Trail::step);
    }

    #[cfg(feature = "parallel")]
    pub fn step_all(&mut self) {
        self.trails.par_iter_mut().for_each(Trail::step);
    }

    #[cfg(not(feature = "parallel"))]
    pub fn rebuild_all(&mut self) {
        self.trails.iter_mut().for_each(Trail::rebuild);
    }

    #[cfg(feature = "parallel")]
    pub fn rebuild_all(&mut self) {
        self.trails.par_iter_mut().for_each(Trail::rebuild);
    }

    /// Step and rebuild every trail unless paused.  Returns whether any work
    /// was done.
    pub fn advance(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.step_all();
        self.rebuild_all();
        true
    }

    /// Hand every ribbon rebuilt since the last call to `upload`, then clear
    /// its dirty flag.
    pub fn for_each_dirty<F>(&mut self, mut upload: F)
    where
        F: FnMut(TrailId, &RibbonBuilder),
    {
        for (i, trail) in self.trails.iter_mut().enumerate() {
            if trail.ribbon.is_dirty() {
                upload(TrailId(i), &trail.ribbon);
                trail.ribbon.mark_uploaded();
            }
        }
    }

    // ── pause ─────────────────────────────────────────────────────────────

    pub fn is_paused(&self) -> bool { self.paused }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!("trails {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Flip the pause flag; returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.set_paused(!self.paused);
        self.paused
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn len(&self)         -> usize       { self.trails.len() }
    pub fn is_empty(&self)    -> bool        { self.trails.is_empty() }
    pub fn group_count(&self) -> usize       { self.groups.len() }
    pub fn trails(&self)      -> &[Trail]    { &self.trails }
    pub fn inset(&self)       -> f32         { self.inset }

    pub fn trail(&self, id: TrailId) -> Option<&Trail>      { self.trails.get(id.0) }
    pub fn group(&self, id: GroupId) -> Option<&TrailGroup> { self.groups.get(id.0) }

    pub fn iter(&self) -> impl Iterator<Item = (TrailId, &Trail)> {
        self.trails.iter().enumerate().map(|(i, t)| (TrailId(i), t))
    }
}

impl Default for TrailSet {
    fn default() -> Self { TrailSet::new() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ChainParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn set_with_group(count: usize) -> (TrailSet, GroupId) {
        let mut set = TrailSet::new();
        let mut rng = StdRng::seed_from_u64(3);
        let g = set.add_group(count, 8, 0.1, &mut rng);
        (set, g)
    }

    #[test]
    fn group_registers_members_in_order() {
        let (set, g) = set_with_group(4);
        assert_eq!(set.len(), 4);
        assert_eq!(set.group_count(), 1);
        let ids: Vec<usize> = set.group(g).unwrap().members().iter().map(|t| t.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn group_members_get_distinct_params() {
        let (set, _) = set_with_group(3);
        let p0 = set.trails()[0].chain().params();
        let p1 = set.trails()[1].chain().params();
        assert_ne!(p0, p1);
    }

    #[test]
    fn update_group_pins_every_member() {
        let (mut set, g) = set_with_group(3);
        set.update_group(g, Vec3::new(1.0, 2.0, 3.0), Vec3::Z).unwrap();
        for (_, t) in set.iter() {
            assert_eq!(t.chain().particles()[0].position, Vec3::new(1.0, 2.0, 3.0));
            assert_eq!(t.chain().particles()[0].normal, Vec3::Z);
        }
    }

    #[test]
    fn update_group_leaves_other_trails_alone() {
        let (mut set, g) = set_with_group(2);
        let loner = set.add_trail(ParticleChain::new(4, 0.1, ChainParams::midpoint()));
        set.update_group(g, Vec3::ONE, Vec3::Y).unwrap();
        assert!(!set.trail(loner).unwrap().chain().is_initialized());
    }

    #[test]
    fn unknown_handles_are_errors() {
        let (mut set, _) = set_with_group(1);
        assert!(matches!(
            set.update_group(GroupId(9), Vec3::ZERO, Vec3::Y),
            Err(TrailError::UnknownGroup(9))
        ));
        assert!(matches!(
            set.update_trail(TrailId(9), Vec3::ZERO, Vec3::Y),
            Err(TrailError::UnknownTrail(9))
        ));
    }

    #[test]
    fn advance_respects_pause() {
        let (mut set, g) = set_with_group(1);
        set.update_group(g, Vec3::ZERO, Vec3::Y).unwrap();
        assert!(set.toggle_pause());
        assert!(!set.advance());
        assert!(set.trails()[0].ribbon().vertices().is_empty());
        assert!(!set.toggle_pause());
        assert!(set.advance());
        assert_eq!(set.trails()[0].ribbon().vertices().len(), 16);
    }

    #[test]
    fn for_each_dirty_visits_rebuilt_ribbons_once() {
        let (mut set, g) = set_with_group(3);
        set.update_group(g, Vec3::ZERO, Vec3::Y).unwrap();
        set.advance();
        let mut seen = Vec::new();
        set.for_each_dirty(|id, r| seen.push((id.index(), r.vertices().len())));
        assert_eq!(seen, vec![(0, 16), (1, 16), (2, 16)]);
        let mut again = 0;
        set.for_each_dirty(|_, _| again += 1);
        assert_eq!(again, 0);
    }
}

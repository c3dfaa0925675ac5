//! FingerRig — which trail group follows which fingertip.
//!
//! Two hands × five fingertips = ten groups, each of `group_size` chains.
//! Group order in the [`TrailSet`] is left hand thumb→pinky, then right hand.

use trail_physics::{GroupId, Result, TrailConfig, TrailSet};

use crate::anchor::{Finger, Hand, TrackedPoint};

pub const TRACKED_POINTS: usize = Hand::ALL.len() * Finger::ALL.len();

#[derive(Clone, Debug)]
pub struct FingerRig {
    groups: Vec<GroupId>,
}

impl FingerRig {
    /// Build the trail set for every fingertip from `cfg`.
    pub fn build(cfg: &TrailConfig) -> Result<(TrailSet, FingerRig)> {
        let (set, groups) = cfg.build(TRACKED_POINTS)?;
        Ok((set, FingerRig { groups }))
    }

    pub fn group(&self, hand: Hand, finger: Finger) -> GroupId {
        self.groups[hand.index() * Finger::ALL.len() + finger.index()]
    }

    /// Pin every group whose fingertip is in `points`.  Fingertips not seen
    /// this frame keep their last head position.  Returns the number of
    /// groups updated.
    pub fn apply(&self, set: &mut TrailSet, points: &[TrackedPoint]) -> Result<usize> {
        for p in points {
            set.update_group(self.group(p.hand, p.finger), p.position, p.direction)?;
        }
        Ok(points.len())
    }
}

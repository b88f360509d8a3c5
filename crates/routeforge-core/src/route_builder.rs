//! Incremental route layout.
//!
//! A [`RouteLayout`] keeps one [`SegmentSlot`] per consecutive waypoint pair
//! and the stitched path derived from them. Mutations come in two halves: a
//! synchronous `begin_*` call that reshapes the slots and hands back the
//! [`PendingSegment`]s that need a resolver answer, and [`RouteLayout::apply`]
//! which lands an answer if its slot has not been reassigned since.
//!
//! Pending slots hold a straight line until their answer arrives, so the path
//! starts and ends on the first and last waypoints at every point in time.

use crate::models::{Position, Segment};
use crate::spatial::{find_last_near, JUNCTION_TOLERANCE_DEG};
use crate::waypoints::WaypointStore;
use serde::Serialize;

/// Concatenate segments into one path, dropping each junction duplicate.
pub fn stitch<'a, I>(segments: I) -> Vec<Position>
where
    I: IntoIterator<Item = &'a Segment>,
{
    let mut path: Vec<Position> = Vec::new();
    for (idx, segment) in segments.into_iter().enumerate() {
        let skip = if idx == 0 { 0 } else { 1 };
        path.extend(segment.points().iter().skip(skip).copied());
    }
    path
}

/// A segment plus the generation that last assigned its endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSlot {
    pub segment: Segment,
    pub generation: u64,
    pub resolved: bool,
}

/// A segment waiting on the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSegment {
    pub index: usize,
    pub from: Position,
    pub to: Position,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLayout {
    slots: Vec<SegmentSlot>,
    path: Vec<Position>,
}

impl RouteLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn slots(&self) -> &[SegmentSlot] {
        &self.slots
    }

    pub fn segment_count(&self) -> usize {
        self.slots.len()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.slots.get(index).map(|slot| &slot.segment)
    }

    /// Number of slots still showing a placeholder line.
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.resolved).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.path.clear();
    }

    /// Layout for a store that just gained its last waypoint.
    ///
    /// With one waypoint the path is that point alone. Otherwise a single new
    /// slot is opened for the trailing pair.
    pub fn begin_append(&mut self, store: &WaypointStore, generation: u64) -> Option<PendingSegment> {
        if store.len() <= 1 {
            self.slots.clear();
            self.path = store.positions().to_vec();
            return None;
        }
        let index = store.len() - 2;
        let (from, to) = store.segment_endpoints(index)?;
        self.slots.truncate(index);
        self.slots.push(placeholder(from, to, generation));
        self.restitch();
        Some(PendingSegment {
            index,
            from,
            to,
            generation,
        })
    }

    /// Reopens the one or two slots touching waypoint `waypoint`.
    pub fn begin_splice(
        &mut self,
        store: &WaypointStore,
        waypoint: usize,
        generation: u64,
    ) -> Vec<PendingSegment> {
        if store.len() <= 1 {
            self.slots.clear();
            self.path = store.positions().to_vec();
            return Vec::new();
        }
        let mut pending = Vec::with_capacity(2);
        let touched = [waypoint.checked_sub(1), Some(waypoint)];
        for index in touched.into_iter().flatten() {
            let Some((from, to)) = store.segment_endpoints(index) else {
                continue;
            };
            if let Some(slot) = self.slots.get_mut(index) {
                *slot = placeholder(from, to, generation);
                pending.push(PendingSegment {
                    index,
                    from,
                    to,
                    generation,
                });
            }
        }
        self.restitch();
        pending
    }

    /// Reopens every slot; used by bulk edits.
    pub fn begin_rebuild(&mut self, store: &WaypointStore, generation: u64) -> Vec<PendingSegment> {
        self.slots.clear();
        if store.len() <= 1 {
            self.path = store.positions().to_vec();
            return Vec::new();
        }
        let pending: Vec<PendingSegment> = (0..store.len() - 1)
            .filter_map(|index| {
                let (from, to) = store.segment_endpoints(index)?;
                Some(PendingSegment {
                    index,
                    from,
                    to,
                    generation,
                })
            })
            .collect();
        self.slots = pending
            .iter()
            .map(|p| placeholder(p.from, p.to, generation))
            .collect();
        self.restitch();
        pending
    }

    /// Lands a resolver answer.
    ///
    /// Returns `false` when the slot is gone or was reassigned by a newer
    /// generation; the answer is then dropped.
    pub fn apply(&mut self, pending: &PendingSegment, resolved: Option<Vec<Position>>) -> bool {
        let Some(slot) = self.slots.get_mut(pending.index) else {
            return false;
        };
        if slot.generation != pending.generation {
            return false;
        }
        slot.segment = Segment::from_resolution(pending.from, pending.to, resolved);
        slot.resolved = true;
        self.restitch();
        true
    }

    /// Drops the trailing slot after the store lost its last waypoint.
    ///
    /// The path is cut at the junction matching the new last waypoint rather
    /// than re-stitched. Returns `false` when no junction matches, in which
    /// case the caller has to rebuild.
    pub fn truncate_to(&mut self, store: &WaypointStore) -> bool {
        match store.len() {
            0 => {
                self.clear();
                return true;
            }
            1 => {
                self.slots.clear();
                self.path = store.positions().to_vec();
                return true;
            }
            _ => {}
        }
        let Some(new_last) = store.last() else {
            return false;
        };
        let Some(removed) = self.slots.pop() else {
            return false;
        };
        let search_end = self.path.len().saturating_sub(removed.segment.len());
        match find_last_near(&self.path, &new_last, search_end, JUNCTION_TOLERANCE_DEG) {
            Some(cut) if self.slots.len() + 1 == store.len() => {
                self.path.truncate(cut + 1);
                true
            }
            _ => false,
        }
    }

    /// Adopts an externally loaded path whose waypoints were sampled at
    /// `waypoint_indices` (strictly increasing indices into `path`).
    pub fn adopt(&mut self, path: Vec<Position>, waypoint_indices: &[usize], generation: u64) {
        self.slots = waypoint_indices
            .windows(2)
            .filter(|pair| pair[0] < pair[1] && pair[1] < path.len())
            .map(|pair| SegmentSlot {
                segment: Segment::from_points(path[pair[0]..=pair[1]].to_vec()),
                generation,
                resolved: true,
            })
            .collect();
        if self.slots.is_empty() {
            self.path = path.into_iter().take(1).collect();
        } else {
            self.restitch();
        }
    }

    fn restitch(&mut self) {
        self.path = stitch(self.slots.iter().map(|slot| &slot.segment));
    }
}

fn placeholder(from: Position, to: Position, generation: u64) -> SegmentSlot {
    SegmentSlot {
        segment: Segment::straight(from, to),
        generation,
        resolved: false,
    }
}

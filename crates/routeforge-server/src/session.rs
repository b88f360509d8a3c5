//! The route editing session.
//!
//! State lives behind a `std::sync::Mutex` that is only held for synchronous
//! bookkeeping. Network calls happen with the lock released, and their
//! answers are landed through [`RouteLayout::apply`], which drops anything a
//! newer mutation has superseded.

use crate::activity::{build_report, ActivityReport};
use crate::indicator::RecalcIndicator;
use futures::future::join_all;
use routeforge_core::{
    path_distance_km, resample_waypoints, sample_path, ActivityProfile, ElevationSource,
    PendingSegment, Position, ProfileError, ProfileUpdate, RouteLayout, SegmentResolver,
    StoreError, Waypoint, WaypointStore, DEFAULT_MAX_SAMPLES,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct SessionState {
    store: WaypointStore,
    layout: RouteLayout,
    profile: ActivityProfile,
}

/// What the UI renders after every operation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub waypoints: Vec<Waypoint>,
    pub path: Vec<Position>,
    pub segment_count: usize,
    pub pending_segments: usize,
    pub distance_km: f64,
    pub generation: u64,
    pub recalculating: bool,
}

pub struct RouteSession<R, E> {
    resolver: R,
    elevation: E,
    state: Mutex<SessionState>,
    generation: AtomicU64,
    indicator: RecalcIndicator,
}

impl<R, E> RouteSession<R, E>
where
    R: SegmentResolver,
    E: ElevationSource,
{
    pub fn new(resolver: R, elevation: E, recalc_delay: Duration) -> Self {
        Self {
            resolver,
            elevation,
            state: Mutex::new(SessionState::default()),
            generation: AtomicU64::new(0),
            indicator: RecalcIndicator::new(recalc_delay),
        }
    }

    pub fn indicator(&self) -> &RecalcIndicator {
        &self.indicator
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Must be called with the state lock held so stamps follow lock order.
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from_state(&self.lock(), self)
    }

    /// Adds a waypoint at the end. Resolves only the new trailing segment.
    pub async fn append(&self, position: Position) -> Result<SessionSnapshot, StoreError> {
        let pending = {
            let mut state = self.lock();
            let index = state.store.push(position)?;
            let generation = self.next_generation();
            let SessionState { store, layout, .. } = &mut *state;
            tracing::info!(index, generation, "Waypoint appended");
            layout.begin_append(store, generation)
        };
        self.resolve_pending(pending.into_iter().collect()).await;
        Ok(self.snapshot())
    }

    /// Drops the last waypoint, cutting the path back without network calls
    /// when the junction can be found.
    pub async fn remove_last(&self) -> SessionSnapshot {
        let pending = {
            let mut state = self.lock();
            if state.store.pop().is_none() {
                return SessionSnapshot::from_state(&state, self);
            }
            let generation = self.next_generation();
            let SessionState { store, layout, .. } = &mut *state;
            if layout.truncate_to(store) {
                tracing::info!(generation, remaining = store.len(), "Last waypoint removed");
                Vec::new()
            } else {
                tracing::info!(generation, "Junction not found after removal, rebuilding");
                layout.begin_rebuild(store, generation)
            }
        };
        self.resolve_pending(pending).await;
        self.snapshot()
    }

    /// Removes waypoint `index` and rebuilds every segment.
    pub async fn delete_at(&self, index: usize) -> Result<SessionSnapshot, StoreError> {
        let pending = {
            let mut state = self.lock();
            let len = state.store.len();
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
            let generation = self.next_generation();
            if len <= 1 {
                state.store.clear();
                state.layout.clear();
                tracing::info!(generation, "Last remaining waypoint deleted");
                Vec::new()
            } else {
                state.store.remove(index)?;
                let SessionState { store, layout, .. } = &mut *state;
                tracing::info!(index, generation, "Waypoint deleted, rebuilding route");
                layout.begin_rebuild(store, generation)
            }
        };
        self.resolve_pending(pending).await;
        Ok(self.snapshot())
    }

    /// Moves waypoint `index` and re-resolves the one or two segments touching it.
    pub async fn move_to(
        &self,
        index: usize,
        position: Position,
    ) -> Result<SessionSnapshot, StoreError> {
        let pending = {
            let mut state = self.lock();
            state.store.set(index, position)?;
            let generation = self.next_generation();
            let SessionState { store, layout, .. } = &mut *state;
            tracing::info!(index, generation, "Waypoint moved");
            layout.begin_splice(store, index, generation)
        };
        self.resolve_pending(pending).await;
        Ok(self.snapshot())
    }

    /// Updates a waypoint while it is being dragged. The path is left alone
    /// until the drag ends with [`RouteSession::move_to`].
    pub fn drag_preview(&self, index: usize, position: Position) -> Result<SessionSnapshot, StoreError> {
        let mut state = self.lock();
        state.store.set(index, position)?;
        Ok(SessionSnapshot::from_state(&state, self))
    }

    pub fn clear(&self) -> SessionSnapshot {
        let mut state = self.lock();
        let generation = self.next_generation();
        state.store.clear();
        state.layout.clear();
        tracing::info!(generation, "Route cleared");
        SessionSnapshot::from_state(&state, self)
    }

    /// Replaces all waypoints and resolves every segment concurrently.
    pub async fn load_batch(&self, positions: Vec<Position>) -> Result<SessionSnapshot, StoreError> {
        let pending = {
            let mut state = self.lock();
            state.store.replace(positions)?;
            let generation = self.next_generation();
            let SessionState { store, layout, .. } = &mut *state;
            tracing::info!(waypoints = store.len(), generation, "Waypoints loaded");
            layout.begin_rebuild(store, generation)
        };
        self.resolve_pending(pending).await;
        Ok(self.snapshot())
    }

    /// Adopts an externally loaded path and samples waypoints from it.
    pub fn import_path(&self, path: Vec<Position>) -> Result<SessionSnapshot, StoreError> {
        if path.iter().any(|p| !p.is_finite()) {
            return Err(StoreError::InvalidPosition);
        }
        let indices = resample_waypoints(&path);
        let waypoints: Vec<Position> = indices.iter().map(|&i| path[i]).collect();
        let mut state = self.lock();
        state.store.replace(waypoints)?;
        let generation = self.next_generation();
        tracing::info!(
            points = path.len(),
            waypoints = indices.len(),
            generation,
            "Path imported"
        );
        state.layout.adopt(path, &indices, generation);
        Ok(SessionSnapshot::from_state(&state, self))
    }

    pub fn profile(&self) -> ActivityProfile {
        self.lock().profile.clone()
    }

    /// Applies a profile update; a rejected update leaves the profile as it was.
    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<ActivityProfile, ProfileError> {
        let mut state = self.lock();
        state.profile.apply(update)?;
        tracing::info!(activity = ?state.profile.activity, "Profile updated");
        Ok(state.profile.clone())
    }

    /// Elevation lookup plus simulation over the current path.
    pub async fn activity(&self, seed: Option<u64>) -> ActivityReport {
        let (path, profile) = {
            let state = self.lock();
            (state.layout.path().to_vec(), state.profile.clone())
        };
        let samples = sample_path(&path, DEFAULT_MAX_SAMPLES);
        let elevations = if samples.len() >= 2 {
            self.elevation.lookup(&samples).await
        } else {
            None
        };
        build_report(&path, &profile, elevations.as_deref(), seed)
    }

    async fn resolve_pending(&self, pending: Vec<PendingSegment>) {
        if pending.is_empty() {
            return;
        }
        let _guard = self.indicator.begin();
        let answers = join_all(
            pending
                .iter()
                .map(|segment| self.resolver.resolve(segment.from, segment.to)),
        )
        .await;

        let mut state = self.lock();
        for (segment, answer) in pending.iter().zip(answers) {
            if !state.layout.apply(segment, answer) {
                tracing::debug!(
                    index = segment.index,
                    generation = segment.generation,
                    "Discarding superseded segment"
                );
            }
        }
    }
}

impl SessionSnapshot {
    fn from_state<R, E>(state: &SessionState, session: &RouteSession<R, E>) -> Self {
        Self {
            waypoints: state.store.waypoints(),
            path: state.layout.path().to_vec(),
            segment_count: state.layout.segment_count(),
            pending_segments: state.layout.pending_count(),
            distance_km: path_distance_km(state.layout.path()),
            generation: session.generation.load(Ordering::SeqCst),
            recalculating: session.indicator.is_visible(),
        }
    }
}

#[cfg(test)]
mod tests;

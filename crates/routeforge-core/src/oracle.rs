//! Seams to the external services the core leans on.
//!
//! Implementations live in `routeforge-oracles`; tests script their own.

use crate::models::Position;
use std::future::Future;

/// Directions between two points.
pub trait SegmentResolver: Send + Sync {
    /// Ordered path from `from` to `to`, or `None` on any failure.
    ///
    /// Callers treat `None` as the direct line; implementations must not retry.
    fn resolve(
        &self,
        from: Position,
        to: Position,
    ) -> impl Future<Output = Option<Vec<Position>>> + Send;
}

/// Elevation lookups for a batch of positions.
pub trait ElevationSource: Send + Sync {
    /// One elevation per input position, in input order, or `None` on failure.
    fn lookup(&self, positions: &[Position]) -> impl Future<Output = Option<Vec<f64>>> + Send;
}

/// Resolver that never finds a road; every segment is a straight line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineResolver;

impl SegmentResolver for StraightLineResolver {
    fn resolve(
        &self,
        _from: Position,
        _to: Position,
    ) -> impl Future<Output = Option<Vec<Position>>> + Send {
        std::future::ready(None)
    }
}

/// Elevation source with no data; the simulator falls back to placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoElevation;

impl ElevationSource for NoElevation {
    fn lookup(&self, _positions: &[Position]) -> impl Future<Output = Option<Vec<f64>>> + Send {
        std::future::ready(None)
    }
}

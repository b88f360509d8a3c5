//! Ordered list of user-placed waypoints.
//!
//! The store is the only record of user intent. It knows nothing about
//! segments or the network; the route layout is derived from it.

use crate::models::{Position, Waypoint, WaypointRole};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("waypoint index {index} out of range ({len} waypoints)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("waypoint position must be finite")]
    InvalidPosition,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaypointStore {
    positions: Vec<Position>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: Vec<Position>) -> Result<Self, StoreError> {
        if positions.iter().any(|position| !position.is_finite()) {
            return Err(StoreError::InvalidPosition);
        }
        Ok(Self { positions })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn get(&self, index: usize) -> Option<Position> {
        self.positions.get(index).copied()
    }

    pub fn last(&self) -> Option<Position> {
        self.positions.last().copied()
    }

    /// Waypoints with their indices, in order.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.positions
            .iter()
            .enumerate()
            .map(|(index, position)| Waypoint {
                index,
                position: *position,
            })
            .collect()
    }

    pub fn role(&self, index: usize) -> Option<WaypointRole> {
        let len = self.positions.len();
        if index >= len {
            return None;
        }
        Some(if index == 0 {
            WaypointRole::Start
        } else if index == len - 1 {
            WaypointRole::End
        } else {
            WaypointRole::Intermediate
        })
    }

    /// Endpoints of segment `index` (waypoint `index` to `index + 1`).
    pub fn segment_endpoints(&self, index: usize) -> Option<(Position, Position)> {
        let from = self.positions.get(index)?;
        let to = self.positions.get(index + 1)?;
        Some((*from, *to))
    }

    /// Appends a waypoint and returns its index.
    pub fn push(&mut self, position: Position) -> Result<usize, StoreError> {
        if !position.is_finite() {
            return Err(StoreError::InvalidPosition);
        }
        self.positions.push(position);
        Ok(self.positions.len() - 1)
    }

    pub fn pop(&mut self) -> Option<Position> {
        self.positions.pop()
    }

    pub fn remove(&mut self, index: usize) -> Result<Position, StoreError> {
        self.check_index(index)?;
        Ok(self.positions.remove(index))
    }

    /// Moves waypoint `index` and returns its previous position.
    pub fn set(&mut self, index: usize, position: Position) -> Result<Position, StoreError> {
        self.check_index(index)?;
        if !position.is_finite() {
            return Err(StoreError::InvalidPosition);
        }
        Ok(std::mem::replace(&mut self.positions[index], position))
    }

    pub fn replace(&mut self, positions: Vec<Position>) -> Result<(), StoreError> {
        *self = Self::from_positions(positions)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.positions.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.positions.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(points: &[(f64, f64)]) -> WaypointStore {
        WaypointStore::from_positions(points.iter().map(|&p| Position::from(p)).collect()).unwrap()
    }

    #[test]
    fn roles_follow_list_position() {
        let store = store(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        assert_eq!(store.role(0), Some(WaypointRole::Start));
        assert_eq!(store.role(1), Some(WaypointRole::Intermediate));
        assert_eq!(store.role(2), Some(WaypointRole::End));
        assert_eq!(store.role(3), None);

        let single = self::store(&[(1.0, 1.0)]);
        assert_eq!(single.role(0), Some(WaypointRole::Start));
    }

    #[test]
    fn out_of_range_mutations_leave_store_untouched() {
        let mut store = store(&[(0.0, 0.0), (0.0, 0.01)]);
        let before = store.clone();
        assert_eq!(
            store.remove(5),
            Err(StoreError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert!(store.set(2, Position::new(1.0, 1.0)).is_err());
        assert!(store.set(0, Position::new(f64::NAN, 1.0)).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn segment_endpoints_pair_neighbours() {
        let store = store(&[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)]);
        assert_eq!(
            store.segment_endpoints(1),
            Some((Position::new(0.0, 0.01), Position::new(0.0, 0.02)))
        );
        assert_eq!(store.segment_endpoints(2), None);
    }

    #[test]
    fn waypoints_carry_indices() {
        let store = store(&[(5.0, 5.0), (6.0, 6.0)]);
        let waypoints = store.waypoints();
        assert_eq!(waypoints[1].index, 1);
        assert_eq!(waypoints[1].position, Position::new(6.0, 6.0));
    }
}

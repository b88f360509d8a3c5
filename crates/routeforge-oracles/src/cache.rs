//! Per-coordinate elevation cache.

use dashmap::DashMap;
use routeforge_core::Position;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

/// Drops expired entries, then the oldest ones until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();

    entries.retain(|(key, fetched_at)| {
        if now.duration_since(*fetched_at) > max_age {
            cache.remove(key);
            false
        } else {
            true
        }
    });

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

/// Coordinates rounded to four decimals (about 11 m).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey(i64, i64);

impl From<&Position> for CoordKey {
    fn from(position: &Position) -> Self {
        CoordKey(
            (position.lat * 10_000.0).round() as i64,
            (position.lon * 10_000.0).round() as i64,
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct ElevationEntry {
    fetched_at: Instant,
    elevation_m: f64,
}

impl CacheEntry for ElevationEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

/// Shared elevation cache, injected into the elevation client.
#[derive(Debug)]
pub struct ElevationCache {
    entries: DashMap<CoordKey, ElevationEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ElevationCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, position: &Position) -> Option<f64> {
        let entry = self.entries.get(&CoordKey::from(position))?;
        if entry.fetched_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.elevation_m)
    }

    pub fn insert(&self, position: &Position, elevation_m: f64) {
        self.entries.insert(
            CoordKey::from(position),
            ElevationEntry {
                fetched_at: Instant::now(),
                elevation_m,
            },
        );
        if self.entries.len() > self.max_entries {
            self.prune();
        }
    }

    pub fn prune(&self) {
        prune_cache(&self.entries, self.max_entries, self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ElevationCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 50_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearby_points_share_a_key() {
        let cache = ElevationCache::default();
        cache.insert(&Position::new(37.774_91, -122.419_41), 52.0);
        assert_eq!(cache.get(&Position::new(37.774_94, -122.419_38)), Some(52.0));
        assert_eq!(cache.get(&Position::new(37.7751, -122.4194)), None);
    }

    #[test]
    fn oldest_entries_are_evicted_first() {
        let cache = ElevationCache::new(Duration::from_secs(3600), 2);
        cache.insert(&Position::new(0.0, 0.0), 1.0);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(&Position::new(0.0, 1.0), 2.0);
        std::thread::sleep(Duration::from_millis(2));
        cache.insert(&Position::new(0.0, 2.0), 3.0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&Position::new(0.0, 0.0)), None);
        assert_eq!(cache.get(&Position::new(0.0, 2.0)), Some(3.0));
    }

    #[test]
    fn expired_entries_are_ignored_and_pruned() {
        let cache = ElevationCache::new(Duration::from_millis(1), 10);
        cache.insert(&Position::new(1.0, 1.0), 9.0);
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&Position::new(1.0, 1.0)), None);
        cache.prune();
        assert!(cache.is_empty());
    }
}

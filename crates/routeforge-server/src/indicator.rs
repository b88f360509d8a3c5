//! Deferred "recalculating" flag.
//!
//! Every network-bound operation holds a [`RecalcGuard`]. The flag goes up
//! only once some guard has been alive longer than the reveal delay, and the
//! guard's drop cancels its timer, so fast operations never show it and a
//! finished operation never leaves it stuck.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Shared {
    /// (operations in flight, operations past the reveal delay)
    counts: Mutex<(usize, usize)>,
    visible: watch::Sender<bool>,
}

impl Shared {
    fn update(&self, f: impl FnOnce(&mut (usize, usize))) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut counts);
        self.visible.send_if_modified(|visible| {
            let next = counts.1 > 0;
            let changed = *visible != next;
            *visible = next;
            changed
        });
    }
}

#[derive(Clone)]
pub struct RecalcIndicator {
    shared: Arc<Shared>,
    delay: Duration,
}

impl RecalcIndicator {
    pub fn new(delay: Duration) -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                counts: Mutex::new((0, 0)),
                visible,
            }),
            delay,
        }
    }

    /// Starts tracking one operation. Must be called inside a tokio runtime.
    pub fn begin(&self) -> RecalcGuard {
        self.shared.update(|counts| counts.0 += 1);
        let overdue = Arc::new(AtomicBool::new(false));
        let timer = {
            let shared = self.shared.clone();
            let overdue = overdue.clone();
            let delay = self.delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if !overdue.swap(true, Ordering::SeqCst) {
                    tracing::debug!("Recalculation running long, showing indicator");
                    shared.update(|counts| counts.1 += 1);
                }
            })
        };
        RecalcGuard {
            shared: self.shared.clone(),
            overdue,
            timer,
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.shared.visible.borrow()
    }

    pub fn in_flight(&self) -> usize {
        self.shared
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .0
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shared.visible.subscribe()
    }
}

pub struct RecalcGuard {
    shared: Arc<Shared>,
    overdue: Arc<AtomicBool>,
    timer: JoinHandle<()>,
}

impl Drop for RecalcGuard {
    fn drop(&mut self) {
        self.timer.abort();
        // If the timer already counted us, undo it; otherwise stop it from doing so.
        let was_counted = self.overdue.swap(true, Ordering::SeqCst);
        self.shared.update(|counts| {
            counts.0 = counts.0.saturating_sub(1);
            if was_counted {
                counts.1 = counts.1.saturating_sub(1);
            }
        });
    }
}

//! Delayed-event scheduling.
//!
//! Many TIA register writes do not take effect on the color-clock they
//! arrive: a sprite reset lands a few clocks later, a delayed GRP flips
//! when its counterpart is written. Each chip owns a small scheduler of
//! pending events. Payloads are plain values the owner dispatches on,
//! kept in contiguous storage.

/// Identifies a scheduled event for `force`/`cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: u64,
    remaining: u32,
    payload: T,
    label: &'static str,
}

/// A per-chip queue of delayed events.
///
/// Due events fire in scheduling order. An event scheduled with 0 cycles
/// fires on the next tick, never synchronously.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(4),
            next_id: 0,
        }
    }

    /// Schedule `payload` to fire after `cycles` further ticks.
    pub fn schedule(&mut self, cycles: u32, payload: T, label: &'static str) -> Handle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            remaining: cycles,
            payload,
            label,
        });
        Handle(id)
    }

    /// Advance one tick, handing each due payload to `fire` in
    /// scheduling order.
    pub fn tick(&mut self, mut fire: impl FnMut(T)) {
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].remaining == 0 {
                let entry = self.entries.remove(i);
                fire(entry.payload);
            } else {
                self.entries[i].remaining -= 1;
                i += 1;
            }
        }
    }

    /// Fire the event now, regardless of remaining cycles. Returns the
    /// payload for the caller to service, or None if it already fired or
    /// was cancelled.
    pub fn force(&mut self, handle: Handle) -> Option<T> {
        let i = self.entries.iter().position(|e| e.id == handle.0)?;
        Some(self.entries.remove(i).payload)
    }

    /// Remove the event without firing it.
    pub fn cancel(&mut self, handle: Handle) {
        self.entries.retain(|e| e.id != handle.0);
    }

    /// Whether the event is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: Handle) -> bool {
        self.entries.iter().any(|e| e.id == handle.0)
    }

    /// Remaining cycles before the event fires.
    #[must_use]
    pub fn remaining(&self, handle: Handle) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.id == handle.0)
            .map(|e| e.remaining)
    }

    /// Label of the pending event, for machine-state reporting.
    #[must_use]
    pub fn label(&self, handle: Handle) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.id == handle.0)
            .map(|e| e.label)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cycles_fires_on_next_tick_only() {
        let mut sched: Scheduler<&str> = Scheduler::new();
        sched.schedule(0, "event", "test");

        let mut fired = Vec::new();
        sched.tick(|p| fired.push(p));
        assert_eq!(fired, vec!["event"]);

        fired.clear();
        sched.tick(|p| fired.push(p));
        assert!(fired.is_empty());
    }

    #[test]
    fn fires_after_n_ticks() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        sched.schedule(2, 1, "delayed");

        let mut fired = Vec::new();
        sched.tick(|p| fired.push(p));
        sched.tick(|p| fired.push(p));
        assert!(fired.is_empty());
        sched.tick(|p| fired.push(p));
        assert_eq!(fired, vec![1]);
    }

    #[test]
    fn due_events_fire_in_scheduling_order() {
        let mut sched: Scheduler<u8> = Scheduler::new();
        sched.schedule(0, 1, "first");
        sched.schedule(0, 2, "second");
        sched.schedule(1, 3, "later");

        let mut fired = Vec::new();
        sched.tick(|p| fired.push(p));
        assert_eq!(fired, vec![1, 2]);
    }

    #[test]
    fn force_and_cancel() {
        let mut sched: Scheduler<&str> = Scheduler::new();
        let a = sched.schedule(10, "a", "a");
        let b = sched.schedule(10, "b", "b");

        assert_eq!(sched.force(a), Some("a"));
        assert!(!sched.is_pending(a));

        sched.cancel(b);
        let mut fired = Vec::new();
        for _ in 0..12 {
            sched.tick(|p| fired.push(p));
        }
        assert!(fired.is_empty());
    }

    #[test]
    fn remaining_counts_down() {
        let mut sched: Scheduler<()> = Scheduler::new();
        let h = sched.schedule(3, (), "countdown");
        assert_eq!(sched.remaining(h), Some(3));
        sched.tick(|()| {});
        assert_eq!(sched.remaining(h), Some(2));
        assert_eq!(sched.label(h), Some("countdown"));
    }
}

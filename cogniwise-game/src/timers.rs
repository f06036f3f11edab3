//! Session-owned timer set on a virtual millisecond clock.
//!
//! Every delayed or repeating callback a stage needs is registered here and
//! fires only when the owner advances the clock. Leaving a stage cancels the
//! whole set, so nothing scheduled by an earlier stage can outlive it.

/// Milliseconds since the session clock started.
pub type Millis = u64;

/// Handle returned when scheduling, usable for targeted cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<K> {
    id: TimerId,
    kind: K,
    due: Millis,
    period: Option<Millis>,
}

/// Pending one-shot and repeating timers, ordered by deadline then registration.
#[derive(Debug, Clone)]
pub struct TimerSet<K> {
    next_id: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for TimerSet<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: Copy> TimerSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `kind` once, `delay` milliseconds after `now`.
    pub fn once(&mut self, now: Millis, delay: Millis, kind: K) -> TimerId {
        self.push(now.saturating_add(delay), None, kind)
    }

    /// Fire `kind` every `period` milliseconds, first at `now + period`.
    ///
    /// A zero period is bumped to one millisecond so the set always makes progress.
    pub fn every(&mut self, now: Millis, period: Millis, kind: K) -> TimerId {
        let period = period.max(1);
        self.push(now.saturating_add(period), Some(period), kind)
    }

    fn push(&mut self, due: Millis, period: Option<Millis>, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Entry {
            id,
            kind,
            due,
            period,
        });
        id
    }

    /// Cancel a single timer. Returns false when it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    ///
    /// Repeating timers are re-armed one period after their own deadline, so a
    /// late `now` replays every missed tick in order.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, K)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.id))
            .map(|(index, _)| index)?;

        let Entry {
            due, kind, period, ..
        } = self.entries[index];
        match period {
            Some(period) => self.entries[index].due = due.saturating_add(period),
            None => {
                self.entries.swap_remove(index);
            }
        }
        Some((due, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tick {
        Fast,
        Slow,
        Once,
    }

    fn drain(set: &mut TimerSet<Tick>, now: Millis) -> Vec<(Millis, Tick)> {
        std::iter::from_fn(|| set.pop_due(now)).collect()
    }

    #[test]
    fn fires_in_deadline_order_with_replay() {
        let mut set = TimerSet::new();
        set.every(0, 30, Tick::Fast);
        set.every(0, 100, Tick::Slow);
        set.once(0, 45, Tick::Once);

        let fired = drain(&mut set, 100);
        assert_eq!(
            fired,
            vec![
                (30, Tick::Fast),
                (45, Tick::Once),
                (60, Tick::Fast),
                (90, Tick::Fast),
                (100, Tick::Slow),
            ]
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.next_due(), Some(120));
    }

    #[test]
    fn ties_break_by_registration_order() {
        let mut set = TimerSet::new();
        set.once(0, 10, Tick::Slow);
        set.once(0, 10, Tick::Fast);
        assert_eq!(drain(&mut set, 10), vec![(10, Tick::Slow), (10, Tick::Fast)]);
    }

    #[test]
    fn cancellation_is_positive() {
        let mut set = TimerSet::new();
        let fast = set.every(0, 30, Tick::Fast);
        set.once(0, 50, Tick::Once);
        assert!(set.cancel(fast));
        assert!(!set.cancel(fast));
        assert!(!set.is_pending(fast));
        assert_eq!(set.cancel_all(), 1);
        assert!(set.is_empty());
        assert!(set.pop_due(Millis::MAX).is_none());
    }

    #[test]
    fn nothing_fires_early() {
        let mut set = TimerSet::new();
        set.once(100, 20, Tick::Once);
        assert!(set.pop_due(119).is_none());
        assert_eq!(set.pop_due(120), Some((120, Tick::Once)));
    }
}

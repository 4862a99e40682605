//! Deferred game-clock tasks
//!
//! The scheduler keeps its own clock that only moves when the simulation
//! advances it, so time spent paused or in skipped ticks never counts toward
//! a delay.

/// A task waiting for its due time
#[derive(Debug, Clone)]
struct Pending<T> {
    due: f64,
    task: T,
}

/// Ordered queue of tasks keyed by game-clock due time
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            pending: Vec::new(),
        }
    }

    /// Game-clock milliseconds elapsed since construction
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue `task` to run once `delay_ms` of game time has elapsed.
    ///
    /// Negative delays are treated as zero.
    pub fn schedule(&mut self, task: T, delay_ms: f32) {
        let due = self.now + f64::from(delay_ms.max(0.0));
        // Insert after every task due at or before `due` to keep FIFO order on ties
        let index = self.pending.partition_point(|p| p.due <= due);
        self.pending.insert(index, Pending { due, task });
    }

    /// Advance the clock by `dt` ms and hand back every task now due, in due
    /// order. The tasks are removed before they are returned, so anything
    /// scheduled while running them waits for a later advance even with a
    /// zero delay.
    pub fn advance_time(&mut self, dt: f32) -> Vec<T> {
        self.now += f64::from(dt.max(0.0));
        let ready = self.pending.partition_point(|p| p.due <= self.now);
        self.pending.drain(..ready).map(|p| p.task).collect()
    }

    /// Tasks still waiting, in due order
    pub fn pending(&self) -> impl Iterator<Item = (&T, f32)> {
        self.pending
            .iter()
            .map(|p| (&p.task, (p.due - self.now) as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule("late", 300.0);
        s.schedule("early", 100.0);
        s.schedule("middle", 200.0);

        assert!(s.advance_time(99.0).is_empty());
        assert_eq!(s.advance_time(1.0), vec!["early"]);
        assert_eq!(s.advance_time(500.0), vec!["middle", "late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_ties_fire_in_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(1, 50.0);
        s.schedule(2, 50.0);
        s.schedule(3, 50.0);
        assert_eq!(s.advance_time(50.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_is_relative_to_current_clock() {
        let mut s = Scheduler::new();
        s.advance_time(1000.0);
        s.schedule("x", 100.0);
        assert_eq!(s.pending().next().map(|(_, left)| left), Some(100.0));
        assert!(s.advance_time(50.0).is_empty());
        assert_eq!(s.advance_time(50.0), vec!["x"]);
        assert_eq!(s.now(), 1100.0);
    }

    #[test]
    fn test_zero_delay_waits_for_next_advance() {
        let mut s = Scheduler::new();
        s.schedule("first", 0.0);
        let fired = s.advance_time(16.0);
        assert_eq!(fired, vec!["first"]);
        // Scheduled while handling the fired batch
        s.schedule("follow-up", 0.0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.advance_time(0.0), vec!["follow-up"]);
    }

    #[test]
    fn test_clock_keeps_resolution_in_long_sessions() {
        let mut s = Scheduler::new();
        // About 150 hours of play
        s.advance_time(536_870_912.0);
        s.schedule("respawn", 250.0);

        let mut fired = Vec::new();
        for _ in 0..1000 {
            fired.extend(s.advance_time(16.0));
        }
        assert_eq!(fired, vec!["respawn"]);
        assert_eq!(s.now(), 536_870_912.0 + 16_000.0);
    }
}

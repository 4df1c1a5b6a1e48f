//! Deferred event delivery
//!
//! Key principles:
//! - Events are posted for delivery at an absolute time
//! - Every posting returns a [`TimerHandle`] that can cancel it later
//! - Due events are handed back in delivery-time order; ties keep posting order
//!
//! Scene code uses this for fail-safe timeouts and delayed reveals. Timers
//! that belong to a torn-down scene are canceled through their handles so
//! they can never fire against freed state.

/// Timer events a presentation schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationEvent {
    /// The loading fail-safe ran out
    LoadingTimeout,
    /// Every gallery image was found; reveal the way onwards
    RevealAllFound,
    /// The intro's continue control never appeared on its own
    IntroContinueFailSafe,
    /// Fade the gallery tutorial in
    ShowTutorial,
    /// Start letting input dismiss the gallery tutorial
    AcceptTutorialInput,
    /// The gallery tutorial was shown long enough
    DismissTutorial,
}

/// Cancelable reference to a posted event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Deferred<E> {
    handle: TimerHandle,
    delivery_time: f64,
    event: E,
}

/// Time-ordered queue of deferred events
#[derive(Debug)]
pub struct Scheduler<E> {
    deferred_queue: Vec<Deferred<E>>,
    current_time: f64,
    next_id: u64,
}

impl<E> Scheduler<E> {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            deferred_queue: Vec::new(),
            current_time: 0.0,
            next_id: 0,
        }
    }

    /// Current time (seconds since start)
    pub fn now(&self) -> f64 {
        self.current_time
    }

    /// Post event for deferred delivery at an absolute time
    pub fn post(&mut self, delivery_time: f64, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.deferred_queue.push(Deferred { handle, delivery_time, event });
        handle
    }

    /// Post event for delivery `delay` seconds from now
    pub fn post_after(&mut self, delay: f64, event: E) -> TimerHandle {
        self.post(self.current_time + delay.max(0.0), event)
    }

    /// Cancel a pending event; returns false if it already fired or was canceled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.deferred_queue.len();
        self.deferred_queue.retain(|entry| entry.handle != handle);
        before != self.deferred_queue.len()
    }

    /// Whether an event is still waiting for delivery
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deferred_queue.iter().any(|entry| entry.handle == handle)
    }

    /// Number of pending events
    pub fn pending_count(&self) -> usize {
        self.deferred_queue.len()
    }

    /// Advance time and take every event that became due
    pub fn advance_to(&mut self, time: f64) -> Vec<E> {
        self.current_time = self.current_time.max(time);

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.deferred_queue.len() {
            if self.deferred_queue[i].delivery_time <= self.current_time {
                due.push(self.deferred_queue.remove(i));
            } else {
                i += 1;
            }
        }

        // Stable sort keeps posting order for equal delivery times
        due.sort_by(|a, b| a.delivery_time.total_cmp(&b.delivery_time));
        due.into_iter().map(|entry| entry.event).collect()
    }

    /// Clear all queued events (useful for state transitions)
    pub fn clear(&mut self) {
        self.deferred_queue.clear();
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deferred_dispatch() {
        let mut scheduler = Scheduler::new();
        scheduler.post(1.0, "late");

        // Event should not dispatch at t=0.5
        assert!(scheduler.advance_to(0.5).is_empty());
        assert_eq!(scheduler.pending_count(), 1);

        // Event should dispatch at t=1.0
        assert_eq!(scheduler.advance_to(1.0), vec!["late"]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_due_events_come_out_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.post(0.3, 3);
        scheduler.post(0.1, 1);
        scheduler.post(0.2, 2);
        scheduler.post(0.2, 22);
        assert_eq!(scheduler.advance_to(1.0), vec![1, 2, 22, 3]);
    }

    #[test]
    fn test_canceled_event_never_fires() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.post_after(0.8, "reveal");
        assert!(scheduler.is_pending(handle));
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert!(scheduler.advance_to(5.0).is_empty());
    }

    #[test]
    fn test_post_after_is_relative_to_now() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(10.0);
        scheduler.post_after(2.0, ());
        assert!(scheduler.advance_to(11.9).is_empty());
        assert_eq!(scheduler.advance_to(12.0).len(), 1);
    }

    #[test]
    fn test_time_never_runs_backwards() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.advance_to(4.0);
        scheduler.advance_to(1.0);
        assert!((scheduler.now() - 4.0).abs() < f64::EPSILON);
    }
}

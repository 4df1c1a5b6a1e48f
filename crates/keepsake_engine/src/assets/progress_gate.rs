//! One-shot loading completion gate
//!
//! The gate completes exactly once, on whichever comes first: every asset
//! ending (loaded or failed) or the fail-safe timer running out. Anything
//! reported afterwards only updates the percentage.

use crate::events::{PresentationEvent, Scheduler, TimerHandle};

/// Why the gate opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    /// Every asset ended
    AllEnded,
    /// The fail-safe fired first
    TimedOut,
}

/// Loading progress with a fail-safe timeout
#[derive(Debug)]
pub struct ProgressGate {
    ended: usize,
    total: usize,
    opened: Option<GateReason>,
    fail_safe: Option<TimerHandle>,
}

impl ProgressGate {
    /// Arm the gate; the fail-safe is posted on `scheduler` right away
    pub fn new(total: usize, fail_safe_timeout: f64, scheduler: &mut Scheduler<PresentationEvent>) -> Self {
        let fail_safe = scheduler.post_after(fail_safe_timeout, PresentationEvent::LoadingTimeout);
        Self {
            ended: 0,
            total,
            opened: None,
            fail_safe: Some(fail_safe),
        }
    }

    /// Record progress. Returns true only on the call that opens the gate.
    pub fn report(&mut self, ended: usize, total: usize, scheduler: &mut Scheduler<PresentationEvent>) -> bool {
        self.ended = ended.min(total);
        self.total = total;
        log::debug!("Loading progress {}/{} ({:.0}%)", self.ended, self.total, self.percentage());

        if self.opened.is_some() || self.ended < self.total {
            return false;
        }
        if let Some(handle) = self.fail_safe.take() {
            scheduler.cancel(handle);
        }
        self.opened = Some(GateReason::AllEnded);
        log::info!("Loading finished: {} asset(s) ended", self.total);
        true
    }

    /// Deliver the fail-safe event. Returns true if this opened the gate.
    pub fn time_out(&mut self) -> bool {
        self.fail_safe = None;
        if self.opened.is_some() {
            return false;
        }
        log::warn!(
            "Loading fail-safe reached with {}/{} asset(s) ended; continuing anyway",
            self.ended,
            self.total
        );
        self.opened = Some(GateReason::TimedOut);
        true
    }

    /// Progress in percent; an empty load counts as complete
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.ended as f32 / self.total as f32 * 100.0
    }

    /// Whether the gate has opened
    pub fn is_open(&self) -> bool {
        self.opened.is_some()
    }

    /// How the gate opened, if it has
    pub fn reason(&self) -> Option<GateReason> {
        self.opened
    }

    /// Assets ended so far
    pub fn ended(&self) -> usize {
        self.ended
    }

    /// Assets expected
    pub fn total(&self) -> usize {
        self.total
    }
}

//! Time management utilities

/// Frame clock advanced by the host's display-refresh callback
///
/// The presentation never reads the wall clock itself; every timer, tween and
/// physics step is derived from the deltas handed to [`FrameClock::advance`],
/// which keeps scripted runs and tests deterministic.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame; negative or non-finite deltas count as zero
    pub fn advance(&mut self, delta_time: f32) {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        self.delta_time = delta_time;
        self.total_time += f64::from(delta_time);
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since clock creation
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.total_time() - 0.75).abs() < 1e-9);
        assert_eq!(clock.frame_count(), 2);
        assert!((clock.delta_time() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bad_delta_is_ignored() {
        let mut clock = FrameClock::new();
        clock.advance(-1.0);
        clock.advance(f32::NAN);
        assert!(clock.total_time().abs() < f64::EPSILON);
    }
}

//! Sequencing helpers built on top of single tweens

use rand::seq::SliceRandom;
use rand::Rng;

use super::tween::{AnimationDriver, TweenHandle, TweenSpec};

/// Where a timeline entry starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// When the previous entry ends
    AfterPrevious,
    /// Offset (positive or negative) from the end of the previous entry
    Relative(f32),
    /// Together with the previous entry
    WithPrevious,
    /// At an absolute time from the timeline start
    At(f32),
}

/// Ordered list of tweens laid out on a shared clock
///
/// Every entry becomes an independent tween when the timeline is played, its
/// delay set to the entry's absolute start. Entries cannot be nested.
#[derive(Debug, Clone)]
pub struct Timeline<T, C> {
    entries: Vec<TweenSpec<T, C>>,
    previous_start: f32,
    previous_end: f32,
}

impl<T, C> Timeline<T, C> {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            previous_start: 0.0,
            previous_end: 0.0,
        }
    }

    /// Append a tween after the previous one
    #[must_use]
    pub fn then(self, spec: TweenSpec<T, C>) -> Self {
        self.place(spec, Placement::AfterPrevious)
    }

    /// Add a tween at an explicit placement
    ///
    /// The spec's own delay is kept and added on top of the placement.
    #[must_use]
    pub fn place(mut self, mut spec: TweenSpec<T, C>, placement: Placement) -> Self {
        let anchor = match placement {
            Placement::AfterPrevious => self.previous_end,
            Placement::Relative(offset) => self.previous_end + offset,
            Placement::WithPrevious => self.previous_start,
            Placement::At(time) => time,
        };
        let start = anchor.max(0.0) + spec.delay.max(0.0);

        spec.delay = start;
        self.previous_start = start;
        self.previous_end = start + spec.active_duration();
        self.entries.push(spec);
        self
    }

    /// End time of the last entry to finish
    pub fn duration(&self) -> f32 {
        self.entries
            .iter()
            .map(|spec| spec.delay + spec.active_duration())
            .fold(0.0, f32::max)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand every entry to a driver
    pub fn play(self, driver: &mut dyn AnimationDriver<T, C>) -> Vec<TweenHandle> {
        self.entries.into_iter().map(|spec| driver.animate(spec)).collect()
    }
}

impl<T, C> Default for Timeline<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order in which staggered targets start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaggerFrom {
    /// First target first
    Start,
    /// Shuffled order
    Random,
}

/// Spreads the start of many similar tweens over a time window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stagger {
    /// Time between the first and the last start
    pub amount: f32,
    /// Start order
    pub from: StaggerFrom,
}

impl Stagger {
    /// Stagger over `amount` seconds in the given order
    pub fn new(amount: f32, from: StaggerFrom) -> Self {
        Self { amount, from }
    }

    /// Extra start delay for each of `count` targets, indexed by target
    pub fn delays<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<f32> {
        if count < 2 {
            return vec![0.0; count];
        }

        let mut order: Vec<usize> = (0..count).collect();
        if self.from == StaggerFrom::Random {
            order.shuffle(rng);
        }

        let step = self.amount.max(0.0) / (count - 1) as f32;
        let mut delays = vec![0.0; count];
        for (slot, target) in order.into_iter().enumerate() {
            delays[target] = slot as f32 * step;
        }
        delays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tween::{tests::Store, Property, TweenEngine};
    use crate::foundation::math::Vec3;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_relative_placement_accumulates() {
        let timeline: Timeline<&'static str, u32> = Timeline::new()
            .then(TweenSpec::scalar("shutter", Property::Offset, 0.0).duration(0.6))
            .place(TweenSpec::scalar("shutter", Property::Offset, -1.0).duration(0.6), Placement::Relative(0.1))
            .place(TweenSpec::scalar("title", Property::Opacity, 1.0).duration(0.2), Placement::WithPrevious);

        assert_eq!(timeline.len(), 3);
        assert_relative_eq!(timeline.entries[1].delay, 0.7);
        assert_relative_eq!(timeline.entries[2].delay, 0.7);
        assert_relative_eq!(timeline.duration(), 1.3);
    }

    #[test]
    fn test_played_timeline_runs_in_order() {
        let mut store = Store::default()
            .with("card", Property::Emissive, Vec3::zeros())
            .with("card", Property::Scale, Vec3::repeat(1.0));
        let mut engine: TweenEngine<&'static str, u32> = TweenEngine::new();

        Timeline::new()
            .then(TweenSpec::scalar("card", Property::Emissive, 0.8).duration(0.2).repeat(1, true).on_complete(1))
            .then(TweenSpec::new("card", Property::Scale, Vec3::repeat(1.2)).duration(0.3).on_complete(2))
            .play(&mut engine);

        let mut cues = Vec::new();
        for _ in 0..100 {
            cues.extend(engine.advance(0.01, &mut store));
        }
        assert_eq!(cues, vec![1, 2]);
        assert_relative_eq!(store.get("card", Property::Scale), Vec3::repeat(1.2));
    }

    #[test]
    fn test_stagger_spreads_over_amount() {
        let mut rng = StdRng::seed_from_u64(3);
        let delays = Stagger::new(1.0, StaggerFrom::Start).delays(5, &mut rng);
        assert_eq!(delays, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_random_stagger_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut delays = Stagger::new(1.0, StaggerFrom::Random).delays(5, &mut rng);
        delays.sort_by(f32::total_cmp);
        assert_eq!(delays, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}

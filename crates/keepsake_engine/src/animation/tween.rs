//! Property tweens
//!
//! A tween drives one property of one target from its value at the moment the
//! tween starts towards a destination value. Targets are opaque keys; reading
//! and writing the actual property goes through [`PropertyAccess`], so the
//! driver never holds references into the objects it animates. A tween whose
//! target can no longer be read or written is dropped silently.
//!
//! Completion is reported through cues: every spec may carry an `on_start`
//! and an `on_complete` value, handed back from [`TweenEngine::advance`] in
//! the order they happen. Killed tweens report nothing.

use bitflags::bitflags;

use super::easing::Easing;
use crate::foundation::math::{utils, Vec3};

/// Animatable property of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Local position
    Position,
    /// Local rotation as Euler angles
    Rotation,
    /// Local scale
    Scale,
    /// Material or layer opacity (scalar)
    Opacity,
    /// Emissive glow (scalar)
    Emissive,
    /// Generic scalar offset, used by overlay layers
    Offset,
}

bitflags! {
    /// Vector components a tween writes
    ///
    /// Two tweens only conflict when they animate the same property of the
    /// same target on at least one common channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Channels: u8 {
        /// X component (also the value of scalar properties)
        const X = 0b001;
        /// Y component
        const Y = 0b010;
        /// Z component
        const Z = 0b100;
        /// X and Y components
        const XY = Self::X.bits() | Self::Y.bits();
        /// Every component
        const XYZ = Self::X.bits() | Self::Y.bits() | Self::Z.bits();
    }
}

impl Channels {
    /// Copy the selected components of `value` over `base`
    pub fn merge(self, base: Vec3, value: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Self::X) { value.x } else { base.x },
            if self.contains(Self::Y) { value.y } else { base.y },
            if self.contains(Self::Z) { value.z } else { base.z },
        )
    }
}

/// What happens to other tweens on the same property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// When this tween starts, running tweens lose the channels it animates
    #[default]
    Auto,
    /// When this tween is created, every tween on the same property is killed
    All,
    /// Tweens run side by side; the last writer wins each frame
    None,
}

/// Reads and writes animated properties on behalf of the driver
pub trait PropertyAccess<T> {
    /// Current value of a property, or `None` if the target is gone
    fn read(&self, target: &T, property: Property) -> Option<Vec3>;

    /// Write the selected channels of a property; false if the target is gone
    fn write(&mut self, target: &T, property: Property, value: Vec3, channels: Channels) -> bool;
}

/// Description of a single tween
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec<T, C> {
    /// Animated object
    pub target: T,
    /// Animated property
    pub property: Property,
    /// Destination value
    pub to: Vec3,
    /// Explicit start value; when `None` the value at start time is captured
    pub from: Option<Vec3>,
    /// Components written
    pub channels: Channels,
    /// Seconds per cycle
    pub duration: f32,
    /// Seconds before the tween starts
    pub delay: f32,
    /// Easing curve
    pub easing: Easing,
    /// Extra cycles after the first
    pub repeat: u32,
    /// Alternate direction on every repeat
    pub yoyo: bool,
    /// Conflict policy
    pub overwrite: Overwrite,
    /// Cue emitted when the tween starts
    pub on_start: Option<C>,
    /// Cue emitted when the tween finishes
    pub on_complete: Option<C>,
}

impl<T, C> TweenSpec<T, C> {
    /// Tween a vector property on all three channels
    pub fn new(target: T, property: Property, to: Vec3) -> Self {
        Self {
            target,
            property,
            to,
            from: None,
            channels: Channels::XYZ,
            duration: 0.5,
            delay: 0.0,
            easing: Easing::DEFAULT,
            repeat: 0,
            yoyo: false,
            overwrite: Overwrite::Auto,
            on_start: None,
            on_complete: None,
        }
    }

    /// Tween a scalar property
    pub fn scalar(target: T, property: Property, to: f32) -> Self {
        Self::new(target, property, Vec3::new(to, 0.0, 0.0)).channels(Channels::X)
    }

    /// Set the cycle duration
    #[must_use]
    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds;
        self
    }

    /// Set the start delay
    #[must_use]
    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Set the easing curve
    #[must_use]
    pub fn ease(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Restrict the written channels
    #[must_use]
    pub fn channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    /// Start from an explicit value instead of the current one
    #[must_use]
    pub fn from(mut self, from: Vec3) -> Self {
        self.from = Some(from);
        self
    }

    /// Repeat count and direction
    #[must_use]
    pub fn repeat(mut self, count: u32, yoyo: bool) -> Self {
        self.repeat = count;
        self.yoyo = yoyo;
        self
    }

    /// Set the conflict policy
    #[must_use]
    pub fn overwrite(mut self, overwrite: Overwrite) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Emit `cue` when the tween starts
    #[must_use]
    pub fn on_start(mut self, cue: C) -> Self {
        self.on_start = Some(cue);
        self
    }

    /// Emit `cue` when the tween finishes
    #[must_use]
    pub fn on_complete(mut self, cue: C) -> Self {
        self.on_complete = Some(cue);
        self
    }

    /// Length of all cycles, delay excluded
    pub fn active_duration(&self) -> f32 {
        self.duration.max(0.0) * (self.repeat + 1) as f32
    }

    /// Eased progress and completion flag at `local` seconds after the start
    fn progress_at(&self, local: f32) -> (f32, bool) {
        let end = if self.yoyo && self.repeat % 2 == 1 { 0.0 } else { 1.0 };
        let duration = self.duration.max(0.0);
        if duration <= 0.0 || local >= self.active_duration() {
            return (self.easing.apply(end), true);
        }

        let cycle = (local / duration).floor();
        let fraction = (local - cycle * duration) / duration;
        let reversed = self.yoyo && (cycle as u32) % 2 == 1;
        let linear = if reversed { 1.0 - fraction } else { fraction };
        (self.easing.apply(linear), false)
    }
}

/// Handle returned by [`AnimationDriver::animate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenHandle(u64);

/// Capability to animate properties over time
pub trait AnimationDriver<T, C> {
    /// Schedule a tween
    fn animate(&mut self, spec: TweenSpec<T, C>) -> TweenHandle;

    /// Kill one tween; false if it already finished
    fn cancel(&mut self, handle: TweenHandle) -> bool;

    /// Kill every tween on a target, returning how many were killed
    fn kill_tweens_of(&mut self, target: &T) -> usize;

    /// Kill every tween whose target matches, returning how many were killed
    fn kill_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> usize;

    /// Whether any tween (pending or running) targets `target`
    fn is_animating(&self, target: &T) -> bool;
}

#[derive(Debug)]
struct ActiveTween<T, C> {
    handle: TweenHandle,
    spec: TweenSpec<T, C>,
    elapsed: f32,
    from: Vec3,
    started: bool,
    finished: bool,
}

/// Frame-stepped tween driver
#[derive(Debug)]
pub struct TweenEngine<T, C> {
    tweens: Vec<ActiveTween<T, C>>,
    next_id: u64,
}

impl<T: PartialEq, C> TweenEngine<T, C> {
    /// Create an idle driver
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of pending or running tweens
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether no tween is pending or running
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Step every tween by `delta_time` seconds and collect emitted cues
    pub fn advance(&mut self, delta_time: f32, access: &mut dyn PropertyAccess<T>) -> Vec<C> {
        let mut cues = Vec::new();

        for index in 0..self.tweens.len() {
            if self.tweens[index].finished {
                continue;
            }

            let just_started = {
                let tween = &mut self.tweens[index];
                tween.elapsed += delta_time;
                if tween.started {
                    false
                } else if tween.elapsed < tween.spec.delay {
                    continue;
                } else {
                    match tween.spec.from.or_else(|| access.read(&tween.spec.target, tween.spec.property)) {
                        Some(from) => {
                            tween.from = from;
                            tween.started = true;
                            true
                        }
                        None => {
                            tween.finished = true;
                            continue;
                        }
                    }
                }
            };

            if just_started {
                if self.tweens[index].spec.overwrite == Overwrite::Auto {
                    self.release_conflicting_channels(index);
                }
                if let Some(cue) = self.tweens[index].spec.on_start.take() {
                    cues.push(cue);
                }
            }

            let tween = &mut self.tweens[index];
            let local = tween.elapsed - tween.spec.delay;
            let (progress, done) = tween.spec.progress_at(local);
            let value = utils::lerp_vec(&tween.from, &tween.spec.to, progress);
            if !access.write(&tween.spec.target, tween.spec.property, value, tween.spec.channels) {
                tween.finished = true;
                continue;
            }

            if done {
                tween.finished = true;
                if let Some(cue) = tween.spec.on_complete.take() {
                    cues.push(cue);
                }
            }
        }

        self.tweens.retain(|tween| !tween.finished);
        cues
    }

    /// Strip the channels of the tween at `index` from every other running
    /// tween on the same property; tweens left without channels are killed
    fn release_conflicting_channels(&mut self, index: usize) {
        let (handle, channels) = (self.tweens[index].handle, self.tweens[index].spec.channels);
        for other_index in 0..self.tweens.len() {
            if other_index == index {
                continue;
            }
            let conflicts = {
                let (current, other) = (&self.tweens[index], &self.tweens[other_index]);
                other.started
                    && !other.finished
                    && other.handle != handle
                    && other.spec.property == current.spec.property
                    && other.spec.target == current.spec.target
                    && other.spec.channels.intersects(channels)
            };
            if conflicts {
                let other = &mut self.tweens[other_index];
                other.spec.channels.remove(channels);
                if other.spec.channels.is_empty() {
                    other.finished = true;
                }
            }
        }
    }
}

impl<T: PartialEq, C> AnimationDriver<T, C> for TweenEngine<T, C> {
    fn animate(&mut self, spec: TweenSpec<T, C>) -> TweenHandle {
        if spec.overwrite == Overwrite::All {
            for tween in &mut self.tweens {
                if tween.spec.target == spec.target && tween.spec.property == spec.property {
                    tween.finished = true;
                }
            }
            self.tweens.retain(|tween| !tween.finished);
        }

        let handle = TweenHandle(self.next_id);
        self.next_id += 1;
        self.tweens.push(ActiveTween {
            handle,
            spec,
            elapsed: 0.0,
            from: Vec3::zeros(),
            started: false,
            finished: false,
        });
        handle
    }

    fn cancel(&mut self, handle: TweenHandle) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|tween| tween.handle != handle);
        before != self.tweens.len()
    }

    fn kill_tweens_of(&mut self, target: &T) -> usize {
        self.kill_where(&|candidate| candidate == target)
    }

    fn kill_where(&mut self, predicate: &dyn Fn(&T) -> bool) -> usize {
        let before = self.tweens.len();
        self.tweens.retain(|tween| !predicate(&tween.spec.target));
        before - self.tweens.len()
    }

    fn is_animating(&self, target: &T) -> bool {
        self.tweens.iter().any(|tween| &tween.spec.target == target)
    }
}

impl<T: PartialEq, C> Default for TweenEngine<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

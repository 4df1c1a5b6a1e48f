//! Scene transition controller
//!
//! Moves the presentation from one scene to another behind a full-screen
//! shutter:
//!
//! 1. the shutter slides in over the current scene;
//! 2. once it fully covers the screen the swap is committed in one step
//!    (release the old scene's resources, reset the letter, show the new
//!    scene, prepare its resources, record it as current);
//! 3. only then does the shutter slide away.
//!
//! Letter to finale is the exception: the two layers cross-fade instead.
//! Progress is driven entirely by animation cues, so nothing here waits or
//! sleeps, and a second request while one transition is running is refused.

use thiserror::Error;

use super::registry::{SceneId, SceneRegistry, UnknownScene};
use crate::animation::{AnimTarget, Channels, Cue, Driver, Easing, Property, PropertyAccess, TweenSpec};
use crate::core::config::TransitionConfig;
use crate::foundation::math::Vec3;

/// Shutter offset while parked below the screen
pub const SHUTTER_PARKED: f32 = 1.0;
/// Shutter offset while covering the screen
pub const SHUTTER_COVERING: f32 = 0.0;
/// Shutter offset after leaving through the top
pub const SHUTTER_CLEARED: f32 = -1.0;

/// Everything a transition needs from the rest of the presentation
///
/// Hooks default to doing nothing, so a host only implements what exists.
pub trait SceneHost {
    /// Animation driver for the shutter and layer fades
    fn driver(&mut self) -> &mut Driver;

    /// Whether a resource-heavy scene already holds its resources
    fn is_prepared(&self, scene: SceneId) -> bool;

    /// Allocate a resource-heavy scene's resources
    fn prepare(&mut self, scene: SceneId);

    /// Release a resource-heavy scene's resources, synchronously
    fn release(&mut self, scene: SceneId);

    /// Return the letter interaction to its sealed state
    fn reset_letter(&mut self) {}

    /// A scene stopped being shown
    fn scene_left(&mut self, _scene: SceneId) {}

    /// A scene started being shown
    fn scene_entered(&mut self, _scene: SceneId) {}
}

/// How a transition is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStyle {
    /// Cover, swap, reveal
    Shutter,
    /// Fade out, swap, fade in
    CrossFade,
}

/// Where the controller is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// No transition running
    Idle,
    /// Shutter sliding in
    Covering {
        /// Outgoing scene
        from: SceneId,
        /// Incoming scene
        to: SceneId,
    },
    /// Swap committed, shutter sliding away
    Revealing {
        /// Scene now current
        to: SceneId,
    },
    /// Outgoing layer fading out
    FadingOut {
        /// Outgoing scene
        from: SceneId,
        /// Incoming scene
        to: SceneId,
    },
    /// Swap committed, incoming layer fading in
    FadingIn {
        /// Scene now current
        to: SceneId,
    },
}

/// Reasons a transition request is ignored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionRejected {
    /// Target is already the current scene
    #[error("Scene '{0}' is already current")]
    AlreadyCurrent(SceneId),

    /// Another transition is still running
    #[error("Transition to '{requested}' ignored while {running:?}")]
    Busy {
        /// Requested target
        requested: SceneId,
        /// Running phase
        running: TransitionPhase,
    },

    /// Target name matches no scene
    #[error(transparent)]
    Unknown(#[from] UnknownScene),
}

/// Cover/swap/reveal state machine
#[derive(Debug, Clone)]
pub struct SceneTransitionController {
    config: TransitionConfig,
    phase: TransitionPhase,
    shutter: f32,
    completed: u32,
}

impl SceneTransitionController {
    /// Idle controller with the shutter parked
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            phase: TransitionPhase::Idle,
            shutter: SHUTTER_PARKED,
            completed: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Whether a transition is running
    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    /// Number of transitions that ran to completion
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Shutter offset (1 parked below, 0 covering, -1 cleared above)
    pub fn shutter_offset(&self) -> f32 {
        self.shutter
    }

    /// Shutter offset, for the animation driver
    pub fn shutter_mut(&mut self) -> &mut f32 {
        &mut self.shutter
    }

    /// Request a transition by scene name
    pub fn transition_to_named(
        &mut self,
        name: &str,
        registry: &SceneRegistry,
        driver: &mut Driver,
    ) -> Result<TransitionStyle, TransitionRejected> {
        let target = name.parse::<SceneId>()?;
        self.transition_to(target, registry, driver)
    }

    /// Request a transition to `target`
    pub fn transition_to(
        &mut self,
        target: SceneId,
        registry: &SceneRegistry,
        driver: &mut Driver,
    ) -> Result<TransitionStyle, TransitionRejected> {
        let from = registry.current();
        if target == from {
            return Err(TransitionRejected::AlreadyCurrent(target));
        }
        if self.is_transitioning() {
            return Err(TransitionRejected::Busy {
                requested: target,
                running: self.phase,
            });
        }

        if from == SceneId::Letter && target == SceneId::Finale {
            log::debug!("Cross-fading {from} -> {target}");
            self.phase = TransitionPhase::FadingOut { from, to: target };
            driver.animate(
                TweenSpec::scalar(AnimTarget::SceneLayer(from), Property::Opacity, 0.0)
                    .duration(self.config.cross_fade_duration)
                    .ease(Easing::PowerInOut(1))
                    .on_complete(Cue::LayerFadedOut),
            );
            return Ok(TransitionStyle::CrossFade);
        }

        log::debug!("Covering {from} -> {target}");
        self.phase = TransitionPhase::Covering { from, to: target };
        driver.animate(
            TweenSpec::scalar(AnimTarget::Shutter, Property::Offset, SHUTTER_COVERING)
                .from(Vec3::new(SHUTTER_PARKED, 0.0, 0.0))
                .duration(self.config.cover_duration)
                .ease(Easing::PowerInOut(2))
                .on_complete(Cue::ShutterCovered),
        );
        Ok(TransitionStyle::Shutter)
    }

    /// Advance the state machine on an animation cue
    ///
    /// Returns false for cues that do not belong to the current phase.
    pub fn handle_cue(&mut self, cue: Cue, registry: &mut SceneRegistry, host: &mut dyn SceneHost) -> bool {
        match (cue, self.phase) {
            (Cue::ShutterCovered, TransitionPhase::Covering { from, to }) => {
                self.commit_swap(from, to, registry, host);
                self.phase = TransitionPhase::Revealing { to };
                host.driver().animate(
                    TweenSpec::scalar(AnimTarget::Shutter, Property::Offset, SHUTTER_CLEARED)
                        .delay(self.config.reveal_gap)
                        .duration(self.config.reveal_duration)
                        .ease(Easing::PowerInOut(2))
                        .on_complete(Cue::ShutterRevealed),
                );
                true
            }
            (Cue::ShutterRevealed, TransitionPhase::Revealing { to }) => {
                self.shutter = SHUTTER_PARKED;
                self.finish(to);
                true
            }
            (Cue::LayerFadedOut, TransitionPhase::FadingOut { from, to }) => {
                registry.deactivate(from);
                host.reset_letter();
                host.scene_left(from);
                registry.set_current(to);
                registry.activate(to);
                registry.scene_mut(to).opacity = 0.0;
                host.scene_entered(to);

                self.phase = TransitionPhase::FadingIn { to };
                host.driver().animate(
                    TweenSpec::scalar(AnimTarget::SceneLayer(to), Property::Opacity, 1.0)
                        .duration(self.config.cross_fade_duration)
                        .ease(Easing::PowerInOut(1))
                        .on_complete(Cue::LayerFadedIn),
                );
                true
            }
            (Cue::LayerFadedIn, TransitionPhase::FadingIn { to }) => {
                self.finish(to);
                true
            }
            _ => false,
        }
    }

    fn commit_swap(&mut self, from: SceneId, to: SceneId, registry: &mut SceneRegistry, host: &mut dyn SceneHost) {
        log::debug!("Swapping {from} -> {to} behind the shutter");
        if from.is_resource_heavy() {
            host.release(from);
        }
        if from == SceneId::Letter {
            host.reset_letter();
        }
        host.scene_left(from);

        registry.show_only(to);
        if to.is_resource_heavy() && !host.is_prepared(to) {
            host.prepare(to);
        }
        host.scene_entered(to);
        registry.set_current(to);
    }

    fn finish(&mut self, to: SceneId) {
        self.phase = TransitionPhase::Idle;
        self.completed += 1;
        log::info!("Now showing scene '{to}'");
    }
}

/// Property access for the overlay targets the controller animates
pub struct OverlayAccess<'a> {
    /// Scene layers
    pub registry: &'a mut SceneRegistry,
    /// Shutter offset
    pub shutter: &'a mut f32,
}

impl PropertyAccess<AnimTarget> for OverlayAccess<'_> {
    fn read(&self, target: &AnimTarget, property: Property) -> Option<Vec3> {
        match (target, property) {
            (AnimTarget::Shutter, Property::Offset) => Some(Vec3::new(*self.shutter, 0.0, 0.0)),
            (AnimTarget::SceneLayer(id), Property::Opacity) => {
                Some(Vec3::new(self.registry.scene(*id).opacity, 0.0, 0.0))
            }
            _ => None,
        }
    }

    fn write(&mut self, target: &AnimTarget, property: Property, value: Vec3, _channels: Channels) -> bool {
        match (target, property) {
            (AnimTarget::Shutter, Property::Offset) => {
                *self.shutter = value.x;
                true
            }
            (AnimTarget::SceneLayer(id), Property::Opacity) => {
                self.registry.scene_mut(*id).opacity = value.x;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Tweens;

    #[derive(Default)]
    struct RecordingHost {
        tweens: Tweens,
        prepared: bool,
        calls: Vec<String>,
    }

    impl SceneHost for RecordingHost {
        fn driver(&mut self) -> &mut Driver {
            &mut self.tweens
        }

        fn is_prepared(&self, _scene: SceneId) -> bool {
            self.prepared
        }

        fn prepare(&mut self, scene: SceneId) {
            self.prepared = true;
            self.calls.push(format!("prepare {scene}"));
        }

        fn release(&mut self, scene: SceneId) {
            self.prepared = false;
            self.calls.push(format!("release {scene}"));
        }

        fn reset_letter(&mut self) {
            self.calls.push("reset letter".to_string());
        }
    }

    struct Rig {
        controller: SceneTransitionController,
        registry: SceneRegistry,
        host: RecordingHost,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                controller: SceneTransitionController::new(TransitionConfig::default()),
                registry: SceneRegistry::new(),
                host: RecordingHost::default(),
            }
        }

        fn request(&mut self, target: SceneId) -> Result<TransitionStyle, TransitionRejected> {
            self.controller.transition_to(target, &self.registry, &mut self.host.tweens)
        }

        fn run(&mut self, seconds: f32) {
            let dt = 1.0 / 60.0;
            let mut elapsed = 0.0;
            while elapsed < seconds {
                let cues = {
                    let mut access = OverlayAccess {
                        registry: &mut self.registry,
                        shutter: self.controller.shutter_mut(),
                    };
                    self.host.tweens.advance(dt, &mut access)
                };
                for cue in cues {
                    self.controller.handle_cue(cue, &mut self.registry, &mut self.host);
                }
                elapsed += dt;
            }
        }
    }

    #[test]
    fn test_swap_happens_only_once_covered() {
        let mut rig = Rig::new();
        assert_eq!(rig.request(SceneId::Memory), Ok(TransitionStyle::Shutter));

        rig.run(0.3);
        assert_eq!(rig.registry.current(), SceneId::Intro);
        assert!(rig.host.calls.is_empty());

        rig.run(0.4);
        assert_eq!(rig.registry.current(), SceneId::Memory);
        assert_eq!(rig.host.calls, vec!["prepare memory"]);
        assert!(matches!(rig.controller.phase(), TransitionPhase::Revealing { .. }));

        rig.run(1.0);
        assert_eq!(rig.controller.phase(), TransitionPhase::Idle);
        assert!((rig.controller.shutter_offset() - SHUTTER_PARKED).abs() < f32::EPSILON);
        assert_eq!(rig.registry.active_scenes(), vec![SceneId::Memory]);
    }

    #[test]
    fn test_requests_are_refused_while_running() {
        let mut rig = Rig::new();
        rig.request(SceneId::Memory).expect("first request");
        assert!(matches!(rig.request(SceneId::Letter), Err(TransitionRejected::Busy { .. })));
        assert_eq!(rig.request(SceneId::Intro), Err(TransitionRejected::AlreadyCurrent(SceneId::Intro)));
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let mut rig = Rig::new();
        let result = rig.controller.transition_to_named("credits", &rig.registry, &mut rig.host.tweens);
        assert!(matches!(result, Err(TransitionRejected::Unknown(_))));
        assert!(!rig.controller.is_transitioning());
    }

    #[test]
    fn test_memory_letter_memory_releases_and_reprepares() {
        let mut rig = Rig::new();
        rig.request(SceneId::Memory).expect("to memory");
        rig.run(2.0);
        rig.request(SceneId::Letter).expect("to letter");
        rig.run(2.0);
        assert!(!rig.host.prepared);
        rig.request(SceneId::Memory).expect("back to memory");
        rig.run(2.0);

        assert_eq!(
            rig.host.calls,
            vec!["prepare memory", "release memory", "reset letter", "prepare memory"]
        );
        assert_eq!(rig.registry.current(), SceneId::Memory);
        assert_eq!(rig.controller.completed(), 3);
    }

    #[test]
    fn test_letter_to_finale_cross_fades() {
        let mut rig = Rig::new();
        rig.registry.show_only(SceneId::Letter);
        rig.registry.set_current(SceneId::Letter);

        assert_eq!(rig.request(SceneId::Finale), Ok(TransitionStyle::CrossFade));
        rig.run(0.5);
        assert!(rig.registry.scene(SceneId::Letter).opacity < 1.0);
        assert_eq!(rig.registry.current(), SceneId::Letter);

        rig.run(0.6);
        assert_eq!(rig.registry.current(), SceneId::Finale);
        assert_eq!(rig.registry.active_scenes(), vec![SceneId::Finale]);
        assert_eq!(rig.host.calls, vec!["reset letter"]);

        rig.run(1.1);
        assert_eq!(rig.controller.phase(), TransitionPhase::Idle);
        assert!((rig.registry.scene(SceneId::Finale).opacity - 1.0).abs() < 1e-5);
        // The shutter never moved
        assert!((rig.controller.shutter_offset() - SHUTTER_PARKED).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stray_cue_is_ignored() {
        let mut rig = Rig::new();
        assert!(!rig.controller.handle_cue(Cue::ShutterCovered, &mut rig.registry, &mut rig.host));
        assert_eq!(rig.registry.current(), SceneId::Intro);
    }
}

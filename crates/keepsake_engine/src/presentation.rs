//! Presentation orchestration
//!
//! [`Presentation`] owns every subsystem and is driven by two entry points:
//! [`Presentation::update`] from the host's display-refresh callback and
//! [`Presentation::handle_event`] for input. Within a frame the order is
//! fixed: due timers, one asset load, tween step, cue routing, gallery
//! physics, render.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimTarget, Channels, Cue, Driver, Property, PropertyAccess, Tweens};
use crate::application::AppEvent;
use crate::assets::{AssetSource, LoadingManager, ProgressGate};
use crate::core::config::{InteractionConfig, PresentationConfig};
use crate::events::{PresentationEvent, Scheduler, TimerHandle};
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameClock;
use crate::gallery::{GalleryLifecycle, ResourceBundle, ViewedSet};
use crate::input::KeyCode;
use crate::interaction::{InteractionContext, InteractionEngine, Tutorial};
use crate::render::{SurfaceFactory, Viewport};
use crate::scene::{
    OverlayAccess, SceneHost, SceneId, SceneRegistry, SceneTransitionController, TransitionRejected,
    TransitionStyle,
};
use crate::stage::{Cursor, Stage};

/// The whole scripted presentation
pub struct Presentation<S: Stage> {
    config: PresentationConfig,
    registry: SceneRegistry,
    transitions: SceneTransitionController,
    tweens: Tweens,
    scheduler: Scheduler<PresentationEvent>,
    gallery: GalleryLifecycle,
    interaction: Option<InteractionEngine>,
    tutorial: Tutorial,
    viewed: ViewedSet,
    stage: S,
    loader: LoadingManager,
    gate: ProgressGate,
    viewport: Viewport,
    clock: FrameClock,
    rng: StdRng,
    intro_continue: Option<TimerHandle>,
    continue_revealed: bool,
    finale_started: bool,
}

impl<S: Stage> std::fmt::Debug for Presentation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Presentation")
            .field("current", &self.registry.current())
            .field("phase", &self.transitions.phase())
            .field("gallery", &self.gallery)
            .field("viewed", &self.viewed)
            .field("gate", &self.gate)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl<S: Stage> Presentation<S> {
    /// Create a presentation on the intro scene with loading under way
    pub fn new(
        config: PresentationConfig,
        viewport: Viewport,
        factory: Box<dyn SurfaceFactory>,
        source: Box<dyn AssetSource>,
        stage: S,
    ) -> Self {
        Self::with_rng(config, viewport, factory, source, stage, StdRng::from_entropy())
    }

    /// Same as [`Presentation::new`] with a fixed random source
    pub fn with_rng(
        config: PresentationConfig,
        viewport: Viewport,
        factory: Box<dyn SurfaceFactory>,
        source: Box<dyn AssetSource>,
        stage: S,
        mut rng: StdRng,
    ) -> Self {
        let mut scheduler = Scheduler::new();

        let mut loader = LoadingManager::new(source);
        loader.register_all(config.gallery.images.iter().cloned());
        loader.register_all(config.loading.extra_assets.iter().cloned());
        let gate = ProgressGate::new(loader.progress().total, config.loading.fail_safe_timeout, &mut scheduler);
        log::info!("Loading {} asset(s)", loader.progress().total);

        let gallery = GalleryLifecycle::with_rng(config.gallery.clone(), factory, StdRng::seed_from_u64(rng.gen()));
        let viewed = ViewedSet::new(config.gallery.unique_image_count());

        Self {
            registry: SceneRegistry::new(),
            transitions: SceneTransitionController::new(config.transition.clone()),
            tweens: Tweens::new(),
            scheduler,
            gallery,
            interaction: None,
            tutorial: Tutorial::new(),
            viewed,
            stage,
            loader,
            gate,
            viewport,
            clock: FrameClock::new(),
            rng,
            intro_continue: None,
            continue_revealed: false,
            finale_started: false,
            config,
        }
    }

    /// Advance the presentation by one display frame
    pub fn update(&mut self, delta_time: f32) {
        self.clock.advance(delta_time);
        let delta_time = self.clock.delta_time();

        for event in self.scheduler.advance_to(self.clock.total_time()) {
            self.handle_timer(event);
        }

        self.poll_loading();

        let cues = {
            let mut access = PresentationAccess {
                overlay: OverlayAccess {
                    registry: &mut self.registry,
                    shutter: self.transitions.shutter_mut(),
                },
                bundle: self.gallery.bundle_mut(),
            };
            self.tweens.advance(delta_time, &mut access)
        };
        for cue in cues {
            self.route_cue(cue);
        }

        self.with_interaction(|engine, ctx| engine.update_frame(delta_time, ctx));
        self.gallery.render_frame();
    }

    /// Deliver a host event
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PointerMoved { x, y } => {
                if self.is_interactive() {
                    self.with_interaction(|engine, ctx| engine.pointer_moved(x, y, ctx));
                }
            }
            AppEvent::PointerPressed => {
                if self.is_interactive() {
                    self.tutorial.user_input(&mut self.scheduler, &mut self.stage);
                    if let Some(engine) = self.interaction.as_mut() {
                        engine.pointer_pressed();
                    }
                }
            }
            AppEvent::Wheel { delta } => {
                if self.is_interactive() {
                    self.tutorial.user_input(&mut self.scheduler, &mut self.stage);
                    self.with_interaction(|engine, ctx| engine.wheel(delta, ctx));
                }
            }
            AppEvent::PointerReleased => {
                if self.is_interactive() {
                    self.with_interaction(|engine, ctx| engine.pointer_released(ctx));
                }
            }
            AppEvent::KeyPressed(KeyCode::Escape) | AppEvent::CloseRequested => {
                if self.is_interactive() {
                    self.with_interaction(|engine, ctx| engine.close_focus(ctx));
                }
            }
            AppEvent::KeyPressed(_) => {}
            AppEvent::WindowResized { width, height } => {
                self.resize(Viewport::new(width, height));
            }
            AppEvent::NavigateTo(target) => {
                if let Err(e) = self.navigate(target) {
                    log::debug!("{e}");
                }
            }
        }
    }

    /// Request a scene change
    pub fn navigate(&mut self, target: SceneId) -> Result<TransitionStyle, TransitionRejected> {
        self.transitions.transition_to(target, &self.registry, &mut self.tweens)
    }

    /// Request a scene change by name
    pub fn navigate_named(&mut self, name: &str) -> Result<TransitionStyle, TransitionRejected> {
        self.transitions.transition_to_named(name, &self.registry, &mut self.tweens)
    }

    /// The intro showed its continue control on its own
    pub fn intro_continue_ready(&mut self) {
        if let Some(handle) = self.intro_continue.take() {
            self.scheduler.cancel(handle);
        }
        self.reveal_intro_continue();
    }

    /// Propagate a new window size
    pub fn resize(&mut self, viewport: Viewport) {
        log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.gallery.resize(viewport);
        if let Some(engine) = self.interaction.as_mut() {
            engine.resize(viewport);
        }
    }

    /// Whether pointer input reaches the gallery
    pub fn is_interactive(&self) -> bool {
        self.registry.current() == SceneId::Memory && !self.transitions.is_transitioning()
    }

    /// Scene registry
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Scene currently shown
    pub fn current_scene(&self) -> SceneId {
        self.registry.current()
    }

    /// Transition state machine
    pub fn transitions(&self) -> &SceneTransitionController {
        &self.transitions
    }

    /// Gallery lifecycle
    pub fn gallery(&self) -> &GalleryLifecycle {
        &self.gallery
    }

    /// Interaction engine, alive while the gallery is
    pub fn interaction(&self) -> Option<&InteractionEngine> {
        self.interaction.as_ref()
    }

    /// Gallery tutorial hint
    pub fn tutorial(&self) -> &Tutorial {
        &self.tutorial
    }

    /// Images found so far
    pub fn viewed(&self) -> &ViewedSet {
        &self.viewed
    }

    /// Loading gate
    pub fn gate(&self) -> &ProgressGate {
        &self.gate
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Stage hooks
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Stage hooks, mutably
    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    /// Active configuration
    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    fn poll_loading(&mut self) {
        let progress = match self.loader.poll() {
            Some(progress) => {
                self.stage.loading_progress(progress.ended, progress.total);
                progress
            }
            None if !self.gate.is_open() => self.loader.progress(),
            None => return,
        };
        if self.gate.report(progress.ended, progress.total, &mut self.scheduler) {
            self.finish_loading();
        }
    }

    fn finish_loading(&mut self) {
        self.stage.loading_finished();
        self.stage.scene_entered(self.registry.current());
        self.intro_continue = Some(self.scheduler.post_after(
            self.config.transition.intro_continue_fail_safe,
            PresentationEvent::IntroContinueFailSafe,
        ));
    }

    fn reveal_intro_continue(&mut self) {
        if self.continue_revealed || self.registry.current() != SceneId::Intro {
            return;
        }
        self.continue_revealed = true;
        self.stage.reveal_next_scene_affordance(SceneId::Memory);
    }

    fn handle_timer(&mut self, event: PresentationEvent) {
        match event {
            PresentationEvent::LoadingTimeout => {
                if self.gate.time_out() {
                    self.finish_loading();
                }
            }
            PresentationEvent::RevealAllFound => {
                if let Some(engine) = self.interaction.as_mut() {
                    engine.reveal_all_found(&mut self.stage);
                }
            }
            PresentationEvent::IntroContinueFailSafe => {
                self.intro_continue = None;
                log::warn!("Intro continue control did not appear in time; revealing it");
                self.reveal_intro_continue();
            }
            PresentationEvent::ShowTutorial
            | PresentationEvent::AcceptTutorialInput
            | PresentationEvent::DismissTutorial => {
                self.tutorial.handle_timer(event, &mut self.scheduler, &mut self.stage);
            }
        }
    }

    fn route_cue(&mut self, cue: Cue) {
        let mut host = SceneServices {
            tweens: &mut self.tweens,
            gallery: &mut self.gallery,
            interaction: &mut self.interaction,
            tutorial: &mut self.tutorial,
            scheduler: &mut self.scheduler,
            viewed: &mut self.viewed,
            stage: &mut self.stage,
            viewport: self.viewport,
            interaction_config: &self.config.interaction,
            rng: &mut self.rng,
        };
        if self.transitions.handle_cue(cue, &mut self.registry, &mut host) {
            if !self.transitions.is_transitioning() && self.registry.current() == SceneId::Finale && !self.finale_started {
                self.finale_started = true;
                log::info!("Starting finale");
                self.stage.start_finale();
            }
            return;
        }

        match cue {
            Cue::GalleryEntered => log::debug!("Gallery entry choreography finished"),
            _ => {
                let handled = self.with_interaction(|engine, ctx| engine.handle_cue(cue, ctx));
                if handled != Some(true) {
                    log::debug!("Dropping stray cue {cue:?}");
                }
            }
        }
    }

    fn with_interaction<R>(
        &mut self,
        f: impl FnOnce(&mut InteractionEngine, &mut InteractionContext<'_>) -> R,
    ) -> Option<R> {
        let engine = self.interaction.as_mut()?;
        let (bundle, resources) = self.gallery.parts_mut()?;
        let mut ctx = InteractionContext {
            bundle,
            resources,
            driver: &mut self.tweens,
            scheduler: &mut self.scheduler,
            viewed: &mut self.viewed,
            stage: &mut self.stage,
        };
        Some(f(engine, &mut ctx))
    }
}

/// Routes animated properties to the overlay or the gallery bundle
struct PresentationAccess<'a> {
    overlay: OverlayAccess<'a>,
    bundle: Option<&'a mut ResourceBundle>,
}

impl PropertyAccess<AnimTarget> for PresentationAccess<'_> {
    fn read(&self, target: &AnimTarget, property: Property) -> Option<Vec3> {
        if target.is_gallery_owned() {
            self.bundle.as_ref()?.read(target, property)
        } else {
            self.overlay.read(target, property)
        }
    }

    fn write(&mut self, target: &AnimTarget, property: Property, value: Vec3, channels: Channels) -> bool {
        if target.is_gallery_owned() {
            self.bundle
                .as_mut()
                .map_or(false, |bundle| bundle.write(target, property, value, channels))
        } else {
            self.overlay.write(target, property, value, channels)
        }
    }
}

/// What scene transitions may touch while swapping scenes
struct SceneServices<'a> {
    tweens: &'a mut Tweens,
    gallery: &'a mut GalleryLifecycle,
    interaction: &'a mut Option<InteractionEngine>,
    tutorial: &'a mut Tutorial,
    scheduler: &'a mut Scheduler<PresentationEvent>,
    viewed: &'a mut ViewedSet,
    stage: &'a mut dyn Stage,
    viewport: Viewport,
    interaction_config: &'a InteractionConfig,
    rng: &'a mut StdRng,
}

impl SceneHost for SceneServices<'_> {
    fn driver(&mut self) -> &mut Driver {
        &mut *self.tweens
    }

    fn is_prepared(&self, scene: SceneId) -> bool {
        scene == SceneId::Memory && self.gallery.is_initialized()
    }

    fn prepare(&mut self, scene: SceneId) {
        if scene != SceneId::Memory {
            return;
        }
        match self.gallery.setup(self.viewport, &mut *self.tweens) {
            Ok(_) => {
                *self.interaction = Some(InteractionEngine::with_rng(
                    self.interaction_config.clone(),
                    self.gallery.config(),
                    self.viewport,
                    StdRng::seed_from_u64(self.rng.gen()),
                ));
                self.stage.update_memory_counter(self.viewed.len(), self.viewed.total());
                self.tutorial.start(self.interaction_config, self.scheduler);
            }
            Err(e) => log::error!("Gallery setup failed, continuing without it: {e}"),
        }
    }

    fn release(&mut self, scene: SceneId) {
        if scene != SceneId::Memory {
            return;
        }
        if let Some(mut engine) = self.interaction.take() {
            engine.teardown(self.scheduler, self.viewed);
        }
        self.tutorial.cancel(self.scheduler, self.stage);
        if let Some(report) = self.gallery.teardown(&mut *self.tweens) {
            log::debug!("Released gallery: {report:?}");
        }
        self.stage.set_cursor(Cursor::Default);
        self.stage.set_close_affordance(false);
    }

    fn reset_letter(&mut self) {
        self.stage.reset_letter_state();
    }

    fn scene_left(&mut self, scene: SceneId) {
        self.stage.scene_left(scene);
    }

    fn scene_entered(&mut self, scene: SceneId) {
        self.stage.scene_entered(scene);
    }
}

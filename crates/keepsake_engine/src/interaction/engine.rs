//! Gallery interaction engine
//!
//! Per-card state machine:
//!
//! ```text
//! idle -> hovered -> idle
//! idle | hovered -> focused -> returning -> idle
//! ```
//!
//! At most one card is focused. Focusing another card while one is focused
//! first returns the current one and only starts the new focus once the
//! return animation has reported completion, so two focus animations never
//! overlap.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{AnimTarget, Channels, Cue, Easing, Property, TweenSpec};
use crate::core::config::{GalleryConfig, InteractionConfig};
use crate::events::{PresentationEvent, Scheduler, TimerHandle};
use crate::foundation::collections::ItemKey;
use crate::foundation::math::{constants::TAU, Vec3};
use crate::gallery::{HoverRestore, ResourceBundle, ViewedSet};
use crate::input::PointerState;
use crate::physics::collision::{nearest_hit, RayHit};
use crate::render::{Blending, Geometry, Material, TextureSlot, TextureSource, Viewport};
use crate::scene::graph::{NodeKind, NodeTransform};
use crate::scene::SceneId;
use crate::stage::{Cursor, Stage};

use super::InteractionContext;

/// Where the single focus slot is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusState {
    /// Nothing focused
    Idle,
    /// Card flying to the front
    Focusing(ItemKey),
    /// Card resting in front of the camera
    Focused(ItemKey),
    /// Card flying back into the cloud
    Returning {
        /// Returning card
        item: ItemKey,
        /// Card to focus once the return completes
        next: Option<ItemKey>,
    },
}

impl FocusState {
    /// Card occupying the focus slot
    pub fn item(&self) -> Option<ItemKey> {
        match *self {
            Self::Idle => None,
            Self::Focusing(item) | Self::Focused(item) | Self::Returning { item, .. } => Some(item),
        }
    }

    /// Whether a focus or return animation is in flight
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Focusing(_) | Self::Returning { .. })
    }
}

/// Hover, focus and ambient motion for one gallery bundle
#[derive(Debug)]
pub struct InteractionEngine {
    config: InteractionConfig,
    baseline_opacity: f32,
    star_spin: f32,
    pointer: PointerState,
    hovered: Option<ItemKey>,
    focus: FocusState,
    reveal_timer: Option<TimerHandle>,
    rng: StdRng,
}

impl InteractionEngine {
    /// Engine for a freshly built bundle
    pub fn new(config: InteractionConfig, gallery: &GalleryConfig, viewport: Viewport) -> Self {
        Self::with_rng(config, gallery, viewport, StdRng::from_entropy())
    }

    /// Engine with an explicit generator for the floating parameters
    pub fn with_rng(config: InteractionConfig, gallery: &GalleryConfig, viewport: Viewport, rng: StdRng) -> Self {
        Self {
            config,
            baseline_opacity: gallery.base_opacity,
            star_spin: gallery.star_spin,
            pointer: PointerState::new(viewport),
            hovered: None,
            focus: FocusState::Idle,
            reveal_timer: None,
            rng,
        }
    }

    /// Card under the pointer
    pub fn hovered(&self) -> Option<ItemKey> {
        self.hovered
    }

    /// Card in the focus slot
    pub fn focused(&self) -> Option<ItemKey> {
        self.focus.item()
    }

    /// Focus slot state
    pub fn focus_state(&self) -> FocusState {
        self.focus
    }

    /// Whether a card is focused
    pub fn is_zoomed(&self) -> bool {
        self.focused().is_some()
    }

    /// Pointer tracking state
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Keep pointer normalization in step with the viewport
    pub fn resize(&mut self, viewport: Viewport) {
        self.pointer.update_viewport(viewport);
    }

    /// Nearest card under the pointer
    ///
    /// Every card is tested, the focused one included. Exact distance ties
    /// keep the card created first.
    pub fn hit_test(&self, bundle: &ResourceBundle) -> Option<RayHit<ItemKey>> {
        let (ndc_x, ndc_y) = self.pointer.ndc();
        let ray = bundle.camera.screen_to_world_ray(ndc_x, ndc_y)?;
        nearest_hit(bundle.items.keys().filter_map(|key| {
            let distance = bundle.card_quad(key)?.intersect_ray(&ray)?;
            Some(RayHit {
                target: key,
                distance,
                point: ray.point_at(distance),
            })
        }))
    }

    /// Pointer moved to a screen position
    pub fn pointer_moved(&mut self, x: f64, y: f64, ctx: &mut InteractionContext<'_>) {
        self.pointer.update_position(x, y);

        if let Some((dx, dy)) = self.pointer.take_drag_delta() {
            if !self.is_zoomed() {
                ctx.bundle.cloud_target.y += dx * self.config.drag_sensitivity;
                ctx.bundle.cloud_target.x += dy * self.config.drag_sensitivity;
            }
        }

        let hit = self.hit_test(ctx.bundle).map(|hit| hit.target);
        self.update_hover(hit, ctx);

        if !self.is_zoomed() {
            self.apply_parallax(ctx);
        }
    }

    /// Wheel dolly towards (negative delta) or away from the cloud
    ///
    /// Stays available while a card is focused. The camera depth is clamped
    /// to the configured zoom range.
    pub fn wheel(&self, delta: f64, ctx: &mut InteractionContext<'_>) {
        if !delta.is_finite() || delta.abs() < f64::EPSILON {
            return;
        }
        let config = &self.config;
        let notches = (delta / config.wheel_notch) as f32;
        let depth = (ctx.bundle.camera_target_z * config.zoom_step.powf(-notches))
            .max(config.zoom_min_distance)
            .min(config.zoom_max_distance);
        ctx.bundle.camera_target_z = depth;
        log::debug!("Camera zoom to depth {depth:.1}");
        ctx.driver.animate(
            TweenSpec::new(AnimTarget::Camera, Property::Position, Vec3::new(0.0, 0.0, depth))
                .channels(Channels::Z)
                .duration(config.zoom_duration)
                .ease(Easing::PowerOut(2)),
        );
    }

    /// Pointer button pressed
    pub fn pointer_pressed(&mut self) {
        self.pointer.press();
    }

    /// Pointer button released; taps resolve into focus changes
    pub fn pointer_released(&mut self, ctx: &mut InteractionContext<'_>) {
        let tap = self.pointer.is_tap(self.config.tap_threshold);
        self.pointer.release();
        if !tap {
            return;
        }
        if self.focus.is_animating() {
            log::debug!("Click ignored while {:?}", self.focus);
            return;
        }

        let hit = self.hit_test(ctx.bundle).map(|hit| hit.target);
        match (self.focus, hit) {
            (FocusState::Focused(current), Some(clicked)) if clicked != current => {
                self.start_return(current, Some(clicked), ctx);
            }
            (FocusState::Focused(current), _) => self.start_return(current, None, ctx),
            (FocusState::Idle, Some(clicked)) => self.start_focus(clicked, ctx),
            _ => {}
        }
    }

    /// Escape key or close control: send the focused card home
    pub fn close_focus(&mut self, ctx: &mut InteractionContext<'_>) {
        if let FocusState::Focused(current) = self.focus {
            self.start_return(current, None, ctx);
        }
    }

    /// Route an animation cue; false if it is not ours
    pub fn handle_cue(&mut self, cue: Cue, ctx: &mut InteractionContext<'_>) -> bool {
        match (cue, self.focus) {
            (Cue::FocusSettled(key), FocusState::Focusing(current)) if key == current => {
                self.focus = FocusState::Focused(key);
                true
            }
            (Cue::ReturnSettled(key), FocusState::Returning { item, next }) if key == item => {
                self.complete_return(key, next, ctx);
                true
            }
            _ => false,
        }
    }

    /// The delayed "all found" timer fired
    pub fn reveal_all_found(&mut self, stage: &mut dyn Stage) {
        if self.reveal_timer.take().is_some() {
            log::info!("Every memory found");
            stage.reveal_next_scene_affordance(SceneId::Letter);
        }
    }

    /// Ambient motion for one rendered frame
    pub fn update_frame(&mut self, delta_time: f32, ctx: &mut InteractionContext<'_>) {
        let bundle = &mut *ctx.bundle;
        bundle.elapsed += delta_time;
        let t = bundle.elapsed;

        if let Some(stars) = bundle.graph.transform_mut(bundle.stars) {
            stars.rotation.y += self.star_spin * delta_time;
        }

        if !self.is_zoomed() {
            bundle.cloud_target.y += self.config.idle_spin * delta_time;
            let (target, smoothing) = (bundle.cloud_target, self.config.drag_smoothing);
            if let Some(group) = bundle.graph.transform_mut(bundle.float_group) {
                group.rotation.x += (target.x - group.rotation.x) * smoothing;
                group.rotation.y += (target.y - group.rotation.y) * smoothing;
            }
        }

        for item in bundle.items.values_mut() {
            if item.locked {
                continue;
            }
            let physics = item.physics_or_init(&mut self.rng, &self.config);
            let offset = physics.offset(t, self.config.sway_amplitude);
            let Some(transform) = bundle.graph.transform_mut(item.node) else {
                continue;
            };
            let rest = item.original_position();
            transform.position.x = rest.x + offset.x;
            transform.position.y = rest.y + offset.y;
            transform.rotation += physics.axis * self.config.drift_speed * delta_time;
        }
    }

    /// Drop every reference into the bundle that is about to be freed
    ///
    /// Cancels the pending "all found" timer; an unfired reveal is handed
    /// back so a later visit can still earn it.
    pub fn teardown(&mut self, scheduler: &mut Scheduler<PresentationEvent>, viewed: &mut ViewedSet) {
        if let Some(timer) = self.reveal_timer.take() {
            if scheduler.cancel(timer) {
                viewed.release_reveal();
            }
        }
        self.hovered = None;
        self.focus = FocusState::Idle;
        self.pointer.release();
    }

    fn update_hover(&mut self, hit: Option<ItemKey>, ctx: &mut InteractionContext<'_>) {
        if hit != self.hovered {
            if let Some(previous) = self.hovered.take() {
                self.leave_hover(previous, ctx);
            }
            self.hovered = hit;
            ctx.stage.set_cursor(if hit.is_some() { Cursor::Pointer } else { Cursor::Default });
        }
        if let Some(key) = hit {
            self.enter_hover(key, ctx);
        }
    }

    fn enter_hover(&self, key: ItemKey, ctx: &mut InteractionContext<'_>) {
        if self.is_zoomed() {
            return;
        }
        let Some(item) = ctx.bundle.item_mut(key) else {
            return;
        };
        if item.locked || item.hover_restore.is_some() {
            return;
        }
        let lift = item.original_position().z + self.config.hover_lift;
        // Opacity goes back to the resting value, never to a mid-fade snapshot
        item.hover_restore = Some(HoverRestore {
            opacity: self.baseline_opacity,
            emissive: item.emissive,
        });

        let (scale, duration) = (self.config.hover_scale, self.config.hover_duration);
        let target = AnimTarget::Item(key);
        ctx.driver.animate(
            TweenSpec::new(target, Property::Scale, Vec3::new(scale, scale, scale)).duration(duration),
        );
        ctx.driver.animate(
            TweenSpec::new(target, Property::Position, Vec3::new(0.0, 0.0, lift))
                .channels(Channels::Z)
                .duration(duration),
        );
        ctx.driver.animate(TweenSpec::scalar(target, Property::Opacity, 1.0).duration(duration));
        ctx.driver.animate(
            TweenSpec::scalar(target, Property::Emissive, self.config.hover_emissive).duration(duration),
        );
    }

    fn leave_hover(&self, key: ItemKey, ctx: &mut InteractionContext<'_>) {
        if self.focused() == Some(key) {
            return;
        }
        let Some((restore, rest)) = ctx
            .bundle
            .item_mut(key)
            .and_then(|item| Some((item.hover_restore.take()?, item.original_position())))
        else {
            return;
        };
        let duration = self.config.hover_duration;
        let target = AnimTarget::Item(key);
        ctx.driver.animate(TweenSpec::new(target, Property::Scale, Vec3::new(1.0, 1.0, 1.0)).duration(duration));
        ctx.driver.animate(
            TweenSpec::new(target, Property::Position, rest)
                .channels(Channels::Z)
                .duration(duration),
        );
        ctx.driver.animate(TweenSpec::scalar(target, Property::Opacity, restore.opacity).duration(duration));
        ctx.driver.animate(TweenSpec::scalar(target, Property::Emissive, restore.emissive).duration(duration));
    }

    fn apply_parallax(&self, ctx: &mut InteractionContext<'_>) {
        let (px, py) = self.pointer.parallax();
        let reach = self.config.parallax_strength * self.config.parallax_range;
        ctx.driver.animate(
            TweenSpec::new(AnimTarget::Camera, Property::Position, Vec3::new(px * reach, -py * reach, 0.0))
                .channels(Channels::XY)
                .duration(self.config.parallax_duration),
        );
        ctx.bundle.set_fog_lightness(self.config.fog_base + px * self.config.fog_swing);
    }

    fn start_focus(&mut self, key: ItemKey, ctx: &mut InteractionContext<'_>) {
        let root = ctx.bundle.graph.root();
        // Where the camera settles, not where a fly-in or zoom currently has it
        let camera_z = ctx.bundle.camera_target_z;
        let Some((node, image)) = ctx.bundle.item(key).map(|item| (item.node, item.image.clone())) else {
            return;
        };
        if !ctx.bundle.graph.attach(node, root) {
            log::warn!("Could not lift card {key:?} out of the cloud");
            return;
        }
        if let Some(item) = ctx.bundle.item_mut(key) {
            item.locked = true;
            item.hover_restore = None;
        }
        self.focus = FocusState::Focusing(key);
        log::debug!("Focusing card {key:?} ({image})");

        let config = &self.config;
        let target = AnimTarget::Item(key);
        let scale = config.focus_scale;
        ctx.driver.animate(
            TweenSpec::new(target, Property::Position, Vec3::new(0.0, 0.0, camera_z * config.focus_depth_fraction))
                .duration(config.focus_duration)
                .ease(Easing::PowerInOut(2)),
        );
        ctx.driver.animate(
            TweenSpec::new(target, Property::Rotation, Vec3::new(0.0, TAU + config.focus_spin, 0.0))
                .duration(config.focus_duration)
                .ease(Easing::BackOut(1.2)),
        );
        ctx.driver.animate(
            TweenSpec::new(target, Property::Scale, Vec3::new(scale, scale, scale))
                .duration(config.focus_duration)
                .ease(Easing::PowerInOut(2))
                .on_complete(Cue::FocusSettled(key)),
        );
        ctx.driver.animate(TweenSpec::scalar(target, Property::Opacity, 1.0).duration(config.focus_duration));
        ctx.driver.animate(
            TweenSpec::scalar(target, Property::Emissive, config.flash_emissive)
                .from(Vec3::zeros())
                .duration(config.flash_duration)
                .repeat(1, true),
        );

        for other in ctx.bundle.item_keys() {
            if other == key {
                continue;
            }
            let other_target = AnimTarget::Item(other);
            if let Some((restore, rest)) = ctx
                .bundle
                .item_mut(other)
                .and_then(|item| Some((item.hover_restore.take()?, item.original_position())))
            {
                ctx.driver.animate(
                    TweenSpec::new(other_target, Property::Scale, Vec3::new(1.0, 1.0, 1.0))
                        .duration(config.hover_duration),
                );
                ctx.driver.animate(
                    TweenSpec::new(other_target, Property::Position, rest)
                        .channels(Channels::Z)
                        .duration(config.hover_duration),
                );
                ctx.driver.animate(
                    TweenSpec::scalar(other_target, Property::Emissive, restore.emissive)
                        .duration(config.hover_duration),
                );
            }
            ctx.driver.animate(
                TweenSpec::scalar(other_target, Property::Opacity, config.dim_opacity).duration(config.return_duration),
            );
        }

        if !image.is_empty() && ctx.viewed.record(&image) {
            log::info!("Memory found: {} ({}/{})", image, ctx.viewed.len(), ctx.viewed.total());
            ctx.stage.update_memory_counter(ctx.viewed.len(), ctx.viewed.total());
        }
        ctx.stage.set_close_affordance(true);
        self.add_highlight(key, ctx);
    }

    /// Glow plane behind a focused card
    fn add_highlight(&self, key: ItemKey, ctx: &mut InteractionContext<'_>) {
        let Some(node) = ctx.bundle.item(key).filter(|item| item.highlight.is_none()).map(|item| item.node) else {
            return;
        };
        let size = ctx.bundle.card_size * 1.1;
        let geometry = ctx.resources.create_geometry(Geometry::Plane {
            width: size.x,
            height: size.y,
        });
        let glow = ctx.resources.create_texture(TextureSource::Procedural("glow"));
        let material = ctx.resources.create_material(
            Material::new()
                .transparent(Blending::Additive)
                .with_map(TextureSlot::Map, glow),
        );
        let highlight = ctx.bundle.graph.add(
            node,
            "highlight",
            NodeKind::Mesh { geometry, material },
            NodeTransform::at(Vec3::new(0.0, 0.0, -1.0)).scaled(Vec3::new(1.08, 1.08, 1.0)),
        );
        ctx.driver.animate(
            TweenSpec::new(AnimTarget::Node(highlight), Property::Scale, Vec3::new(1.12, 1.12, 1.0))
                .channels(Channels::XY)
                .duration(self.config.focus_duration)
                .ease(Easing::PowerInOut(2)),
        );
        if let Some(item) = ctx.bundle.item_mut(key) {
            item.highlight = Some(highlight);
        }
    }

    fn remove_highlight(&self, key: ItemKey, ctx: &mut InteractionContext<'_>) {
        let Some(highlight) = ctx.bundle.item_mut(key).and_then(|item| item.highlight.take()) else {
            return;
        };
        ctx.driver.kill_tweens_of(&AnimTarget::Node(highlight));
        for node in ctx.bundle.graph.remove(highlight) {
            if let Some((geometry, material)) = node.kind.resources() {
                ctx.resources.dispose_geometry(geometry);
                ctx.resources.dispose_material(material);
            }
        }
    }

    fn start_return(&mut self, key: ItemKey, next: Option<ItemKey>, ctx: &mut InteractionContext<'_>) {
        let float_group = ctx.bundle.float_group;
        let Some((node, position, rotation)) = ctx
            .bundle
            .item(key)
            .map(|item| (item.node, item.original_position(), item.original_rotation()))
        else {
            self.focus = FocusState::Idle;
            return;
        };
        if !ctx.bundle.graph.attach(node, float_group) {
            log::warn!("Could not put card {key:?} back into the cloud");
        }
        self.focus = FocusState::Returning { item: key, next };
        log::debug!("Returning card {key:?}, next {next:?}");
        self.remove_highlight(key, ctx);

        let duration = self.config.return_duration;
        let target = AnimTarget::Item(key);
        ctx.driver.animate(
            TweenSpec::new(target, Property::Position, position)
                .duration(duration)
                .ease(Easing::PowerInOut(2))
                .on_complete(Cue::ReturnSettled(key)),
        );
        ctx.driver.animate(
            TweenSpec::new(target, Property::Rotation, rotation)
                .duration(duration)
                .ease(Easing::PowerInOut(2)),
        );
        ctx.driver.animate(TweenSpec::new(target, Property::Scale, Vec3::new(1.0, 1.0, 1.0)).duration(duration));
        ctx.driver.animate(TweenSpec::scalar(target, Property::Emissive, 0.0).duration(duration));
    }

    fn complete_return(&mut self, key: ItemKey, next: Option<ItemKey>, ctx: &mut InteractionContext<'_>) {
        if let Some(item) = ctx.bundle.item_mut(key) {
            item.locked = false;
        }
        for other in ctx.bundle.item_keys() {
            ctx.driver.animate(
                TweenSpec::scalar(AnimTarget::Item(other), Property::Opacity, self.baseline_opacity)
                    .duration(self.config.return_duration),
            );
        }
        ctx.stage.set_close_affordance(false);
        self.focus = FocusState::Idle;

        if ctx.viewed.claim_reveal() {
            self.reveal_timer = Some(
                ctx.scheduler
                    .post_after(self.config.all_found_delay, PresentationEvent::RevealAllFound),
            );
        }

        if let Some(next) = next {
            self.start_focus(next, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Tweens;
    use crate::core::config::DeviceTier;
    use crate::gallery::{GalleryItem, GalleryLifecycle};
    use crate::render::HeadlessSurfaceFactory;
    use approx::assert_relative_eq;

    const VIEWPORT: Viewport = Viewport { width: 1280, height: 720 };
    const STEP: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingStage {
        cursor: Cursor,
        close_visible: bool,
        counter: Option<(usize, usize)>,
        reveals: usize,
    }

    impl Stage for RecordingStage {
        fn set_cursor(&mut self, cursor: Cursor) {
            self.cursor = cursor;
        }

        fn set_close_affordance(&mut self, visible: bool) {
            self.close_visible = visible;
        }

        fn update_memory_counter(&mut self, found: usize, total: usize) {
            self.counter = Some((found, total));
        }

        fn reveal_next_scene_affordance(&mut self, _next: SceneId) {
            self.reveals += 1;
        }
    }

    struct Rig {
        gallery: GalleryLifecycle,
        engine: InteractionEngine,
        tweens: Tweens,
        scheduler: Scheduler<PresentationEvent>,
        viewed: ViewedSet,
        stage: RecordingStage,
        keys: Vec<ItemKey>,
    }

    /// Three cards, no random placement
    fn gallery_config(images: &[&str]) -> GalleryConfig {
        GalleryConfig {
            images: images.iter().map(|image| image.to_string()).collect(),
            desktop: DeviceTier {
                card_count: 3,
                spread: [0.0; 3],
                fov_degrees: 75.0,
            },
            initial_rotation_range: 0.0,
            star_count: 16,
            ..GalleryConfig::default()
        }
    }

    /// No ambient motion
    fn still_config() -> InteractionConfig {
        InteractionConfig {
            float_amplitude: [0.0, 0.0],
            sway_amplitude: 0.0,
            drift_speed: 0.0,
            idle_spin: 0.0,
            ..InteractionConfig::default()
        }
    }

    impl Rig {
        /// Three motionless cards in a row, entry choreography finished
        fn new(images: &[&str]) -> Self {
            Self::build(gallery_config(images), still_config(), 3.0)
        }

        /// Three cards in a row, `settle` seconds into the entry choreography
        fn build(gallery_config: GalleryConfig, interaction_config: InteractionConfig, settle: f32) -> Self {
            let mut gallery = GalleryLifecycle::with_rng(
                gallery_config.clone(),
                Box::new(HeadlessSurfaceFactory::new()),
                StdRng::seed_from_u64(11),
            );
            let mut tweens = Tweens::new();
            gallery.setup(VIEWPORT, &mut tweens).expect("setup");

            let mut rig = Self {
                gallery,
                engine: InteractionEngine::with_rng(
                    interaction_config,
                    &gallery_config,
                    VIEWPORT,
                    StdRng::seed_from_u64(12),
                ),
                tweens,
                scheduler: Scheduler::new(),
                viewed: ViewedSet::new(gallery_config.unique_image_count()),
                stage: RecordingStage::default(),
                keys: Vec::new(),
            };
            rig.run(settle);

            let bundle = rig.gallery.bundle_mut().expect("bundle");
            rig.keys = bundle.item_keys();
            for (key, x) in rig.keys.iter().zip([-130.0, 80.0, 150.0]) {
                let node = bundle.items[*key].node;
                if let Some(transform) = bundle.graph.transform_mut(node) {
                    transform.position = Vec3::new(x, 0.0, 0.0);
                }
            }
            rig
        }

        fn with_ctx<R>(&mut self, f: impl FnOnce(&mut InteractionEngine, &mut InteractionContext<'_>) -> R) -> R {
            let (bundle, resources) = self.gallery.parts_mut().expect("gallery");
            let mut ctx = InteractionContext {
                bundle,
                resources,
                driver: &mut self.tweens,
                scheduler: &mut self.scheduler,
                viewed: &mut self.viewed,
                stage: &mut self.stage,
            };
            f(&mut self.engine, &mut ctx)
        }

        fn run(&mut self, seconds: f32) {
            let steps = (seconds / STEP).ceil() as usize;
            for _ in 0..steps {
                let cues = match self.gallery.bundle_mut() {
                    Some(bundle) => self.tweens.advance(STEP, bundle),
                    None => Vec::new(),
                };
                for cue in cues {
                    self.with_ctx(|engine, ctx| engine.handle_cue(cue, ctx));
                }
                let now = self.scheduler.now() + f64::from(STEP);
                for event in self.scheduler.advance_to(now) {
                    if event == PresentationEvent::RevealAllFound {
                        self.engine.reveal_all_found(&mut self.stage);
                    }
                }
            }
        }

        fn camera(&self) -> Vec3 {
            self.gallery.bundle().map(|bundle| bundle.camera.position).expect("bundle")
        }

        fn card_position(&self, key: ItemKey) -> Vec3 {
            self.gallery
                .bundle()
                .and_then(|bundle| bundle.item_transform(key))
                .map(|transform| transform.position)
                .expect("card")
        }

        fn wheel(&mut self, delta: f64) {
            self.with_ctx(|engine, ctx| engine.wheel(delta, ctx));
        }

        fn item(&self, key: ItemKey) -> &GalleryItem {
            &self.gallery.bundle().expect("bundle").items[key]
        }

        fn screen_of(&self, key: ItemKey) -> (f64, f64) {
            self.gallery
                .bundle()
                .and_then(|bundle| bundle.card_screen_position(key))
                .expect("card in front of the camera")
        }

        fn hover(&mut self, key: ItemKey) {
            let (x, y) = self.screen_of(key);
            self.with_ctx(|engine, ctx| engine.pointer_moved(x, y, ctx));
        }

        fn tap_at(&mut self, x: f64, y: f64) {
            self.with_ctx(|engine, ctx| {
                engine.pointer_moved(x, y, ctx);
                engine.pointer_pressed();
                engine.pointer_released(ctx);
            });
        }

        fn click(&mut self, key: ItemKey) {
            let (x, y) = self.screen_of(key);
            self.tap_at(x, y);
        }

        fn tap_empty(&mut self) {
            self.tap_at(640.0, 10.0);
        }
    }

    #[test]
    fn test_focus_locks_records_and_dims() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);
        let live_before = rig.gallery.resources().live_count();

        rig.click(a);
        assert_eq!(rig.engine.focus_state(), FocusState::Focusing(a));
        assert!(rig.engine.is_zoomed());
        assert!(rig.item(a).locked);
        assert!(rig.item(a).highlight.is_some());
        assert!(rig.viewed.contains("a.jpg"));
        assert_eq!(rig.stage.counter, Some((1, 2)));
        assert!(rig.stage.close_visible);
        assert_eq!(rig.gallery.resources().live_count(), live_before + 3);

        rig.run(1.3);
        assert_eq!(rig.engine.focus_state(), FocusState::Focused(a));
        let transform = rig.gallery.bundle().and_then(|bundle| bundle.item_transform(a)).copied().expect("card");
        assert_relative_eq!(transform.position, Vec3::new(0.0, 0.0, 105.0), epsilon = 1e-3);
        assert_relative_eq!(transform.scale.x, 1.2, epsilon = 1e-4);
        assert_relative_eq!(rig.item(b).opacity, 0.1, epsilon = 1e-4);
    }

    #[test]
    fn test_clicks_during_focus_animation_are_ignored() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.click(a);
        rig.run(0.2);
        rig.click(b);
        assert_eq!(rig.engine.focus_state(), FocusState::Focusing(a));
        assert!(!rig.item(b).locked);
    }

    #[test]
    fn test_switching_focus_is_serialized() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.click(a);
        rig.run(1.3);
        rig.click(b);
        assert_eq!(rig.engine.focus_state(), FocusState::Returning { item: a, next: Some(b) });
        assert!(!rig.item(b).locked);

        let mut b_locked_at = None;
        for step in 0..150 {
            rig.run(STEP);
            assert!(!(rig.item(a).locked && rig.item(b).locked), "both cards locked at step {step}");
            if b_locked_at.is_none() && rig.item(b).locked {
                assert!(!rig.item(a).locked);
                b_locked_at = Some(step);
            }
        }
        assert!(b_locked_at.is_some());
        assert_eq!(rig.engine.focused(), Some(b));
        assert_eq!(rig.viewed.len(), 2);
    }

    #[test]
    fn test_clicking_focused_card_returns_it() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let a = rig.keys[0];
        let live_before = rig.gallery.resources().live_count();

        rig.click(a);
        rig.run(1.3);
        rig.click(a);
        assert_eq!(rig.engine.focus_state(), FocusState::Returning { item: a, next: None });
        assert!(rig.item(a).highlight.is_none());
        assert_eq!(rig.gallery.resources().live_count(), live_before);

        rig.run(1.1);
        assert_eq!(rig.engine.focus_state(), FocusState::Idle);
        assert!(!rig.item(a).locked);
        assert!(!rig.stage.close_visible);

        rig.run(1.1);
        for key in rig.keys.clone() {
            assert_relative_eq!(rig.item(key).opacity, 0.8, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_empty_click_and_escape_return_the_focused_card() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.click(a);
        rig.run(1.3);
        rig.tap_empty();
        assert_eq!(rig.engine.focus_state(), FocusState::Returning { item: a, next: None });
        rig.run(1.1);
        assert_eq!(rig.engine.focus_state(), FocusState::Idle);

        rig.click(b);
        rig.run(1.3);
        rig.with_ctx(|engine, ctx| engine.close_focus(ctx));
        assert_eq!(rig.engine.focus_state(), FocusState::Returning { item: b, next: None });
    }

    #[test]
    fn test_empty_click_without_focus_does_nothing() {
        let mut rig = Rig::new(&["a.jpg"]);
        rig.tap_empty();
        assert_eq!(rig.engine.focus_state(), FocusState::Idle);
        assert!(rig.viewed.is_empty());
    }

    fn focus_and_close(rig: &mut Rig, key: ItemKey) {
        rig.click(key);
        rig.run(1.3);
        rig.with_ctx(|engine, ctx| engine.close_focus(ctx));
        rig.run(1.1);
    }

    #[test]
    fn test_all_found_reveal_fires_once() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (first, second, third) = (rig.keys[0], rig.keys[1], rig.keys[2]);

        focus_and_close(&mut rig, first);
        rig.run(1.0);
        assert_eq!(rig.stage.reveals, 0);

        focus_and_close(&mut rig, second);
        assert_eq!(rig.scheduler.pending_count(), 1);
        rig.run(1.0);
        assert_eq!(rig.stage.reveals, 1);

        focus_and_close(&mut rig, third);
        rig.run(1.0);
        assert_eq!(rig.stage.reveals, 1);
        assert_eq!(rig.viewed.len(), 2);
    }

    #[test]
    fn test_teardown_cancels_pending_reveal() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (first, second) = (rig.keys[0], rig.keys[1]);
        focus_and_close(&mut rig, first);
        focus_and_close(&mut rig, second);
        assert_eq!(rig.scheduler.pending_count(), 1);

        rig.engine.teardown(&mut rig.scheduler, &mut rig.viewed);
        assert_eq!(rig.scheduler.pending_count(), 0);
        assert!(!rig.viewed.is_revealed());
        assert_eq!(rig.engine.focus_state(), FocusState::Idle);

        rig.run(1.0);
        assert_eq!(rig.stage.reveals, 0);
    }

    #[test]
    fn test_hover_enters_and_restores() {
        let mut rig = Rig::new(&["a.jpg"]);
        let b = rig.keys[1];

        rig.hover(b);
        assert_eq!(rig.engine.hovered(), Some(b));
        assert_eq!(rig.stage.cursor, Cursor::Pointer);
        rig.run(0.4);
        assert_relative_eq!(rig.item(b).opacity, 1.0, epsilon = 1e-4);
        assert_relative_eq!(rig.item(b).emissive, 0.35, epsilon = 1e-4);
        assert_relative_eq!(rig.card_position(b).z, 25.0, epsilon = 1e-4);
        assert_relative_eq!(rig.card_position(b).x, 80.0, epsilon = 1e-4);

        rig.with_ctx(|engine, ctx| engine.pointer_moved(640.0, 10.0, ctx));
        assert_eq!(rig.engine.hovered(), None);
        assert_eq!(rig.stage.cursor, Cursor::Default);
        rig.run(0.4);
        let scale = rig.gallery.bundle().and_then(|bundle| bundle.item_transform(b)).map(|t| t.scale.x);
        assert_relative_eq!(scale.unwrap_or_default(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(rig.item(b).opacity, 0.8, epsilon = 1e-4);
        assert_relative_eq!(rig.item(b).emissive, 0.0, epsilon = 1e-4);
        assert_relative_eq!(rig.card_position(b).z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_hover_visuals_suppressed_while_zoomed() {
        let mut rig = Rig::new(&["a.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.click(a);
        rig.run(1.3);
        rig.hover(b);
        assert_eq!(rig.engine.hovered(), Some(b));
        assert!(rig.item(b).hover_restore.is_none());
    }

    #[test]
    fn test_nearest_card_wins_and_ties_keep_the_first() {
        let mut rig = Rig::new(&["a.jpg"]);
        let (b, c) = (rig.keys[1], rig.keys[2]);
        let c_node = rig.item(c).node;

        let set = |rig: &mut Rig, node, position: Vec3| {
            let bundle = rig.gallery.bundle_mut().expect("bundle");
            if let Some(transform) = bundle.graph.transform_mut(node) {
                transform.position = position;
            }
        };

        set(&mut rig, c_node, Vec3::new(80.0, 0.0, 10.0));
        rig.hover(b);
        let hit = rig.gallery.bundle().and_then(|bundle| rig.engine.hit_test(bundle));
        assert_eq!(hit.map(|hit| hit.target), Some(c));

        set(&mut rig, c_node, Vec3::new(80.0, 0.0, 0.0));
        let hit = rig.gallery.bundle().and_then(|bundle| rig.engine.hit_test(bundle));
        assert_eq!(hit.map(|hit| hit.target), Some(b));
    }

    #[test]
    fn test_floating_skips_locked_cards() {
        let mut rig = Rig::new(&["a.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.click(a);
        let before = rig.gallery.bundle().and_then(|bundle| bundle.item_transform(a)).copied();
        rig.with_ctx(|engine, ctx| engine.update_frame(0.5, ctx));

        let bundle = rig.gallery.bundle().expect("bundle");
        assert_eq!(bundle.item_transform(a).copied(), before);
        assert!(bundle.items[a].physics().is_none());
        assert!(bundle.items[b].physics().is_some());
        // Motionless physics puts the card back at its rest position
        assert_relative_eq!(bundle.item_transform(b).map(|t| t.position.x).unwrap_or(f32::NAN), 0.0);
    }

    #[test]
    fn test_drag_rotates_cloud_instead_of_clicking() {
        let mut rig = Rig::new(&["a.jpg"]);
        rig.with_ctx(|engine, ctx| {
            engine.pointer_moved(100.0, 100.0, ctx);
            engine.pointer_pressed();
            engine.pointer_moved(200.0, 100.0, ctx);
            engine.pointer_released(ctx);
        });

        assert_eq!(rig.engine.focus_state(), FocusState::Idle);
        let target = rig.gallery.bundle().map(|bundle| bundle.cloud_target).unwrap_or_default();
        assert_relative_eq!(target.y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(target.x, 0.0);
    }

    #[test]
    fn test_focus_during_camera_fly_in_lands_in_front_of_resting_camera() {
        let mut gallery = gallery_config(&["a.jpg"]);
        gallery.card_entry_delay = 0.0;
        gallery.card_entry_stagger = 0.0;
        gallery.card_entry_duration = 0.1;
        let mut rig = Rig::build(gallery, still_config(), 0.3);
        let a = rig.keys[0];
        assert!(rig.camera().z > 500.0, "camera still flying in");

        rig.click(a);
        assert_eq!(rig.engine.focus_state(), FocusState::Focusing(a));

        rig.run(3.0);
        assert_eq!(rig.engine.focus_state(), FocusState::Focused(a));
        assert_relative_eq!(rig.camera().z, 140.0, epsilon = 1e-3);
        assert_relative_eq!(rig.card_position(a).z, 105.0, epsilon = 1e-3);
        assert!(rig.card_position(a).z < rig.camera().z);
    }

    #[test]
    fn test_wheel_zoom_is_clamped() {
        let mut rig = Rig::new(&["a.jpg"]);

        rig.wheel(-100.0);
        rig.run(0.5);
        assert_relative_eq!(rig.camera().z, 133.0, epsilon = 1e-3);

        for _ in 0..100 {
            rig.wheel(-100.0);
        }
        rig.run(0.5);
        assert_relative_eq!(rig.camera().z, 50.0, epsilon = 1e-3);

        rig.wheel(1.0e6);
        rig.run(0.5);
        assert_relative_eq!(rig.camera().z, 400.0, epsilon = 1e-3);

        rig.wheel(0.0);
        rig.wheel(f64::NAN);
        rig.run(0.5);
        assert_relative_eq!(rig.camera().z, 400.0, epsilon = 1e-3);
    }

    #[test]
    fn test_focus_depth_follows_zoom_level() {
        let mut rig = Rig::new(&["a.jpg", "b.jpg"]);
        let (a, b) = (rig.keys[0], rig.keys[1]);

        rig.wheel(1.0e6);
        rig.run(0.5);
        rig.click(a);
        rig.run(1.3);
        assert_relative_eq!(rig.card_position(a).z, 300.0, epsilon = 1e-3);
        assert!(rig.card_position(a).z < rig.camera().z);

        // Zoom keeps working while a card is focused
        rig.wheel(-100.0);
        rig.run(0.5);
        assert_relative_eq!(rig.camera().z, 380.0, epsilon = 1e-2);
        assert_eq!(rig.engine.focused(), Some(a));

        rig.with_ctx(|engine, ctx| engine.close_focus(ctx));
        rig.run(1.1);
        rig.click(b);
        rig.run(1.3);
        assert_relative_eq!(rig.card_position(b).z, 285.0, epsilon = 1e-2);
    }

    #[test]
    fn test_parallax_follows_pointer_until_zoomed() {
        let mut rig = Rig::new(&["a.jpg"]);
        let a = rig.keys[0];

        rig.with_ctx(|engine, ctx| engine.pointer_moved(1280.0, 0.0, ctx));
        assert_relative_eq!(rig.gallery.bundle().map_or(0.0, ResourceBundle::fog_lightness), 0.2, epsilon = 1e-5);
        rig.run(0.6);
        let camera = rig.camera();
        assert_relative_eq!(camera.x, 0.75, epsilon = 1e-4);
        assert_relative_eq!(camera.y, 0.75, epsilon = 1e-4);
        assert_relative_eq!(camera.z, 140.0, epsilon = 1e-4);

        rig.with_ctx(|engine, ctx| engine.pointer_moved(0.0, 720.0, ctx));
        assert_relative_eq!(rig.gallery.bundle().map_or(0.0, ResourceBundle::fog_lightness), 0.1, epsilon = 1e-5);
        rig.run(0.6);
        assert_relative_eq!(rig.camera().x, -0.75, epsilon = 1e-4);
        assert_relative_eq!(rig.camera().y, -0.75, epsilon = 1e-4);

        rig.click(a);
        rig.run(1.3);
        let (camera, fog) = (rig.camera(), rig.gallery.bundle().map_or(0.0, ResourceBundle::fog_lightness));

        rig.with_ctx(|engine, ctx| engine.pointer_moved(1280.0, 0.0, ctx));
        rig.run(0.6);
        assert_relative_eq!(rig.camera().x, camera.x, epsilon = 1e-5);
        assert_relative_eq!(rig.camera().y, camera.y, epsilon = 1e-5);
        assert_relative_eq!(rig.gallery.bundle().map_or(0.0, ResourceBundle::fog_lightness), fog, epsilon = 1e-6);
    }

    #[test]
    fn test_cards_without_image_are_not_counted() {
        let mut rig = Rig::new(&[]);
        let a = rig.keys[0];

        rig.click(a);
        assert_eq!(rig.engine.focus_state(), FocusState::Focusing(a));
        assert!(rig.viewed.is_empty());
        assert_eq!(rig.stage.counter, None);
    }
}

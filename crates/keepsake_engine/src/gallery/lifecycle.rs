//! Gallery resource lifecycle
//!
//! Builds the 3D gallery when its scene is entered and frees every GPU
//! allocation when it is left. The bundle is either fully alive or absent;
//! there is no half-initialized state in between.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::bundle::ResourceBundle;
use super::item::GalleryItem;
use crate::animation::{
    AnimTarget, Channels, Cue, Driver, Easing, Placement, Property, Stagger, StaggerFrom, Timeline,
    TweenSpec,
};
use crate::core::config::GalleryConfig;
use crate::foundation::collections::{HandleMap, NodeId};
use crate::foundation::math::{Vec2, Vec3};
use crate::render::{
    Blending, Camera, DisposalReport, FrameStats, Geometry, Material, RenderError, RenderLoop,
    ResourceRegistry, SurfaceFactory, TextureSlot, TextureSource, Viewport,
};
use crate::scene::graph::{Fog, NodeKind, NodeTransform, SceneGraph};

/// Gallery lifecycle errors
#[derive(Error, Debug)]
pub enum GalleryError {
    /// The render surface could not be created
    #[error("Failed to create the gallery render surface: {0}")]
    Surface(#[from] RenderError),
}

/// Owner of the gallery's resource bundle
pub struct GalleryLifecycle {
    config: GalleryConfig,
    factory: Box<dyn SurfaceFactory>,
    resources: ResourceRegistry,
    bundle: Option<ResourceBundle>,
    rng: StdRng,
}

impl GalleryLifecycle {
    /// Lifecycle manager with an entropy-seeded layout generator
    pub fn new(config: GalleryConfig, factory: Box<dyn SurfaceFactory>) -> Self {
        Self::with_rng(config, factory, StdRng::from_entropy())
    }

    /// Lifecycle manager with an explicit layout generator
    pub fn with_rng(config: GalleryConfig, factory: Box<dyn SurfaceFactory>, rng: StdRng) -> Self {
        Self {
            config,
            factory,
            resources: ResourceRegistry::new(),
            bundle: None,
            rng,
        }
    }

    /// Whether the bundle is alive
    pub fn is_initialized(&self) -> bool {
        self.bundle.is_some()
    }

    /// Gallery settings
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// The live bundle
    pub fn bundle(&self) -> Option<&ResourceBundle> {
        self.bundle.as_ref()
    }

    /// The live bundle, for modification
    pub fn bundle_mut(&mut self) -> Option<&mut ResourceBundle> {
        self.bundle.as_mut()
    }

    /// GPU allocations made on behalf of the gallery
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// The live bundle together with the registry its resources live in
    pub fn parts_mut(&mut self) -> Option<(&mut ResourceBundle, &mut ResourceRegistry)> {
        let resources = &mut self.resources;
        self.bundle.as_mut().map(|bundle| (bundle, resources))
    }

    /// Build the gallery and start its entry choreography
    ///
    /// Returns `Ok(false)` without allocating anything when the gallery is
    /// already initialized.
    pub fn setup(&mut self, viewport: Viewport, driver: &mut Driver) -> Result<bool, GalleryError> {
        if self.bundle.is_some() {
            log::debug!("Gallery already initialized, skipping setup");
            return Ok(false);
        }

        let tier = self.config.tier_for_width(viewport.width).clone();
        let surface = self.factory.create_surface(viewport)?;
        let camera = Camera::perspective(
            Vec3::new(0.0, 0.0, self.config.camera_start_z),
            tier.fov_degrees,
            viewport.aspect(),
            self.config.camera_near,
            self.config.camera_far,
        );

        let mut graph = SceneGraph::new();
        graph.fog = Some(Fog {
            color: Vec3::zeros(),
            density: self.config.fog_density,
        });
        let root = graph.root();
        graph.add(
            root,
            "ambient_light",
            NodeKind::AmbientLight {
                intensity: self.config.ambient_intensity,
            },
            NodeTransform::default(),
        );
        graph.add(
            root,
            "point_light",
            NodeKind::PointLight {
                intensity: self.config.point_light_intensity,
                range: self.config.point_light_range,
            },
            NodeTransform::at(Vec3::from(self.config.point_light_position)),
        );
        let float_group = graph.add(root, "float_group", NodeKind::Group, NodeTransform::default());
        let stars = self.build_star_field(&mut graph);

        let textures: Vec<_> = self
            .config
            .images
            .iter()
            .map(|path| self.resources.create_texture(TextureSource::Image(path.clone())))
            .collect();
        let [card_width, card_height] = self.config.card_size;
        let plane = self.resources.create_geometry(Geometry::Plane {
            width: card_width,
            height: card_height,
        });

        let mut items = HandleMap::with_key();
        for index in 0..tier.card_count {
            let mut material = Material::new().transparent(Blending::Normal).double_sided();
            let mut image = String::new();
            if !textures.is_empty() {
                material.set_map(TextureSlot::Map, Some(textures[index % textures.len()]));
                image = self.config.images[index % self.config.images.len()].clone();
            }
            let material = self.resources.create_material(material);

            let position = Vec3::new(
                (self.rng.gen::<f32>() - 0.5) * tier.spread[0],
                (self.rng.gen::<f32>() - 0.5) * tier.spread[1],
                (self.rng.gen::<f32>() - 0.5) * tier.spread[2],
            );
            let range = self.config.initial_rotation_range;
            let rotation = Vec3::new(
                self.rng.gen::<f32>() * range,
                self.rng.gen::<f32>() * range,
                self.rng.gen::<f32>() * range,
            );
            let node = graph.add(
                float_group,
                format!("card_{index}"),
                NodeKind::Mesh { geometry: plane, material },
                NodeTransform::at(position).rotated(rotation).scaled(Vec3::zeros()),
            );
            items.insert(GalleryItem::new(
                index,
                node,
                position,
                rotation,
                image,
                material,
                self.config.base_opacity,
            ));
        }

        let mut render_loop = RenderLoop::new();
        render_loop.start();

        let bundle = ResourceBundle {
            surface,
            graph,
            camera,
            camera_target_z: self.config.camera_rest_z,
            render_loop,
            float_group,
            stars,
            items,
            textures,
            tier,
            card_size: Vec2::new(card_width, card_height),
            cloud_target: Vec2::zeros(),
            elapsed: 0.0,
        };
        self.play_entry(&bundle, driver);

        log::info!(
            "Gallery initialized: {} cards, {} GPU allocations",
            bundle.items.len(),
            self.resources.live_count()
        );
        self.bundle = Some(bundle);
        Ok(true)
    }

    fn build_star_field(&mut self, graph: &mut SceneGraph) -> NodeId {
        let spread = self.config.star_spread;
        let positions = (0..self.config.star_count)
            .map(|_| {
                Vec3::new(
                    (self.rng.gen::<f32>() - 0.5) * spread,
                    (self.rng.gen::<f32>() - 0.5) * spread,
                    (self.rng.gen::<f32>() - 0.5) * spread,
                )
            })
            .collect();
        let geometry = self.resources.create_geometry(Geometry::PointCloud { positions });
        let sprite = self.resources.create_texture(TextureSource::Procedural("star"));
        let mut material = Material::new()
            .transparent(Blending::Additive)
            .with_map(TextureSlot::Map, sprite);
        material.point_size = 4.0;
        let material = self.resources.create_material(material);

        let root = graph.root();
        graph.add(root, "stars", NodeKind::Points { geometry, material }, NodeTransform::default())
    }

    /// Camera fly-in plus staggered card scale-in
    fn play_entry(&mut self, bundle: &ResourceBundle, driver: &mut Driver) {
        let config = &self.config;
        let mut timeline = Timeline::new().place(
            TweenSpec::new(AnimTarget::Camera, Property::Position, Vec3::new(0.0, 0.0, config.camera_rest_z))
                .channels(Channels::Z)
                .duration(config.camera_entry_duration)
                .ease(Easing::PowerOut(2))
                .on_complete(Cue::GalleryEntered),
            Placement::At(0.0),
        );

        let keys = bundle.item_keys();
        let delays = Stagger::new(config.card_entry_stagger, StaggerFrom::Random).delays(keys.len(), &mut self.rng);
        for (key, delay) in keys.into_iter().zip(delays) {
            timeline = timeline.place(
                TweenSpec::new(AnimTarget::Item(key), Property::Scale, Vec3::new(1.0, 1.0, 1.0))
                    .duration(config.card_entry_duration)
                    .delay(delay)
                    .ease(Easing::back_out()),
                Placement::At(config.card_entry_delay),
            );
        }
        log::debug!("Gallery entry choreography: {:.2}s", timeline.duration());
        timeline.play(driver);
    }

    /// Free everything the gallery allocated
    ///
    /// Stops the render loop, kills every tween aimed at gallery objects,
    /// walks the scene graph disposing geometries, materials and every
    /// texture slot, then disposes the render surface. Returns `None` when
    /// there was nothing to tear down.
    pub fn teardown(&mut self, driver: &mut Driver) -> Option<DisposalReport> {
        let mut bundle = self.bundle.take()?;
        bundle.render_loop.stop();

        let killed = driver.kill_where(&|target: &AnimTarget| target.is_gallery_owned());

        let mut report = DisposalReport::default();
        for id in bundle.graph.traverse() {
            let Some((geometry, material)) = bundle.graph.node(id).and_then(|node| node.kind.resources()) else {
                continue;
            };
            if self.resources.dispose_geometry(geometry) {
                report.geometries += 1;
            }
            report += self.resources.dispose_material(material);
        }
        // Textures no card ended up using
        for texture in bundle.textures.drain(..) {
            if self.resources.dispose_texture(texture) {
                report.textures += 1;
            }
        }

        bundle.surface.dispose();
        log::info!(
            "Gallery torn down: freed {} allocations, killed {} tweens, {} still live",
            report.total(),
            killed,
            self.resources.live_count()
        );
        Some(report)
    }

    /// Resync camera and surface with a new viewport
    pub fn resize(&mut self, viewport: Viewport) {
        let tier = self.config.tier_for_width(viewport.width).clone();
        let Some(bundle) = self.bundle.as_mut() else {
            return;
        };
        bundle.camera.set_aspect_ratio(viewport.aspect());
        bundle.camera.set_fov_degrees(tier.fov_degrees);
        bundle.surface.resize(viewport);
        bundle.tier = tier;
    }

    /// Stop rendering without releasing anything
    pub fn pause_loop(&mut self) {
        if let Some(bundle) = self.bundle.as_mut() {
            bundle.render_loop.stop();
        }
    }

    /// Resume a paused render loop
    pub fn resume_loop(&mut self) {
        if let Some(bundle) = self.bundle.as_mut() {
            bundle.render_loop.start();
        }
    }

    /// Draw one frame if the loop is running
    pub fn render_frame(&mut self) -> Option<FrameStats> {
        let bundle = self.bundle.as_mut()?;
        if !bundle.render_loop.tick() {
            return None;
        }
        match bundle.surface.render(&bundle.graph, &bundle.camera) {
            Ok(stats) => Some(stats),
            Err(e) => {
                log::error!("Gallery frame failed: {e}");
                bundle.render_loop.stop();
                None
            }
        }
    }
}

impl std::fmt::Debug for GalleryLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryLifecycle")
            .field("bundle", &self.bundle)
            .field("live_allocations", &self.resources.live_count())
            .finish()
    }
}

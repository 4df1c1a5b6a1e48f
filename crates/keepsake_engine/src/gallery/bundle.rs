//! The gallery's resource bundle
//!
//! Everything the 3D gallery allocates while it is shown, held as one value
//! so ownership is explicit: the lifecycle manager owns the bundle, the
//! interaction engine borrows it for the duration of a call, and the
//! animation driver reaches into it only through [`PropertyAccess`].

use crate::animation::{AnimTarget, Channels, Property, PropertyAccess};
use crate::core::config::DeviceTier;
use crate::foundation::collections::{HandleMap, ItemKey, NodeId, TextureHandle};
use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::physics::collision::Quad;
use crate::render::{Camera, RenderLoop, RenderSurface};
use crate::scene::graph::{NodeTransform, SceneGraph};

use super::item::GalleryItem;

/// Live resources of an initialized gallery
pub struct ResourceBundle {
    /// Drawing target
    pub surface: Box<dyn RenderSurface>,
    /// Retained scene (lights, float group, stars, cards)
    pub graph: SceneGraph,
    /// Gallery camera
    pub camera: Camera,
    /// Depth the camera is settling at once its fly-in or zoom finishes
    pub camera_target_z: f32,
    /// Per-frame render flag
    pub render_loop: RenderLoop,
    /// Parent of every resting card
    pub float_group: NodeId,
    /// Star field backdrop
    pub stars: NodeId,
    /// Cards, in creation order
    pub items: HandleMap<ItemKey, GalleryItem>,
    /// Image textures shared round-robin by the cards
    pub textures: Vec<TextureHandle>,
    /// Device tier chosen for the current viewport
    pub tier: DeviceTier,
    /// Card plane size
    pub card_size: Vec2,
    /// Float group rotation the drag gesture steers towards
    pub cloud_target: Vec2,
    /// Seconds of floating motion so far
    pub elapsed: f32,
}

impl std::fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("nodes", &self.graph.len())
            .field("items", &self.items.len())
            .field("tier", &self.tier)
            .field("rendering", &self.render_loop.is_running())
            .finish()
    }
}

impl ResourceBundle {
    /// Card keys in creation order
    pub fn item_keys(&self) -> Vec<ItemKey> {
        self.items.keys().collect()
    }

    /// Look up a card
    pub fn item(&self, key: ItemKey) -> Option<&GalleryItem> {
        self.items.get(key)
    }

    /// Look up a card for modification
    pub fn item_mut(&mut self, key: ItemKey) -> Option<&mut GalleryItem> {
        self.items.get_mut(key)
    }

    /// Local transform of a card's node
    pub fn item_transform(&self, key: ItemKey) -> Option<&NodeTransform> {
        self.graph.transform(self.items.get(key)?.node)
    }

    /// World-space rectangle covered by a card
    pub fn card_quad(&self, key: ItemKey) -> Option<Quad> {
        let world = self.graph.world_transform(self.items.get(key)?.node)?;
        Some(Quad::from_matrix(self.card_size.x, self.card_size.y, &world.to_matrix()))
    }

    /// Pixel position of a card's centre on the surface, `None` behind the camera
    pub fn card_screen_position(&self, key: ItemKey) -> Option<(f64, f64)> {
        let center = self.graph.world_transform(self.items.get(key)?.node)?.position;
        let clip = self.camera.view_projection_matrix() * Vec4::new(center.x, center.y, center.z, 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let viewport = self.surface.viewport();
        let x = (clip.x / clip.w + 1.0) * 0.5 * viewport.width as f32;
        let y = (1.0 - clip.y / clip.w) * 0.5 * viewport.height as f32;
        Some((f64::from(x), f64::from(y)))
    }

    /// Fog lightness in [0, 1]
    pub fn fog_lightness(&self) -> f32 {
        self.graph.fog.as_ref().map(|fog| fog.color.x).unwrap_or(0.0)
    }

    /// Tint the fog with a grey of the given lightness
    pub fn set_fog_lightness(&mut self, lightness: f32) {
        if let Some(fog) = self.graph.fog.as_mut() {
            let lightness = lightness.clamp(0.0, 1.0);
            fog.color = Vec3::new(lightness, lightness, lightness);
        }
    }
}

fn read_transform(transform: &NodeTransform, property: Property) -> Option<Vec3> {
    match property {
        Property::Position => Some(transform.position),
        Property::Rotation => Some(transform.rotation),
        Property::Scale => Some(transform.scale),
        _ => None,
    }
}

fn write_transform(transform: &mut NodeTransform, property: Property, value: Vec3, channels: Channels) -> bool {
    let slot = match property {
        Property::Position => &mut transform.position,
        Property::Rotation => &mut transform.rotation,
        Property::Scale => &mut transform.scale,
        _ => return false,
    };
    *slot = channels.merge(*slot, value);
    true
}

impl PropertyAccess<AnimTarget> for ResourceBundle {
    fn read(&self, target: &AnimTarget, property: Property) -> Option<Vec3> {
        match *target {
            AnimTarget::Item(key) => {
                let item = self.items.get(key)?;
                match property {
                    Property::Opacity => Some(Vec3::new(item.opacity, 0.0, 0.0)),
                    Property::Emissive => Some(Vec3::new(item.emissive, 0.0, 0.0)),
                    _ => read_transform(self.graph.transform(item.node)?, property),
                }
            }
            AnimTarget::Node(id) => read_transform(self.graph.transform(id)?, property),
            AnimTarget::Camera => match property {
                Property::Position => Some(self.camera.position),
                _ => None,
            },
            AnimTarget::Shutter | AnimTarget::SceneLayer(_) => None,
        }
    }

    fn write(&mut self, target: &AnimTarget, property: Property, value: Vec3, channels: Channels) -> bool {
        match *target {
            AnimTarget::Item(key) => {
                let Some(item) = self.items.get_mut(key) else {
                    return false;
                };
                match property {
                    Property::Opacity => {
                        item.opacity = value.x;
                        true
                    }
                    Property::Emissive => {
                        item.emissive = value.x;
                        true
                    }
                    _ => {
                        let node = item.node;
                        self.graph
                            .transform_mut(node)
                            .map_or(false, |transform| write_transform(transform, property, value, channels))
                    }
                }
            }
            AnimTarget::Node(id) => self
                .graph
                .transform_mut(id)
                .map_or(false, |transform| write_transform(transform, property, value, channels)),
            AnimTarget::Camera => match property {
                Property::Position => {
                    self.camera.position = channels.merge(self.camera.position, value);
                    true
                }
                _ => false,
            },
            AnimTarget::Shutter | AnimTarget::SceneLayer(_) => false,
        }
    }
}

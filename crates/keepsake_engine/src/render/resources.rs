//! GPU resource registry
//!
//! Owns every geometry, material and texture allocated for a render surface.
//! Scene-graph nodes only hold handles. Disposal is idempotent per handle:
//! one geometry is shared by all gallery cards and the card textures are
//! shared round-robin, so a traversal that disposes "everything it meets"
//! will meet the same handle many times.

use crate::foundation::collections::{GeometryHandle, HandleMap, MaterialHandle, TextureHandle};
use crate::foundation::math::Vec3;

/// Shape of a geometry allocation
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Quad in the local XY plane, centred on the origin
    Plane {
        /// Extent along X
        width: f32,
        /// Extent along Y
        height: f32,
    },
    /// Unconnected points
    PointCloud {
        /// Point positions
        positions: Vec<Vec3>,
    },
}

/// Where a texture's pixels come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// A loaded image asset
    Image(String),
    /// Generated at runtime (soft star sprite, highlight glow)
    Procedural(&'static str),
}

/// Texture allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Pixel source
    pub source: TextureSource,
}

/// Texture binding points of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Base colour
    Map,
    /// Baked lighting
    LightMap,
    /// Ambient occlusion
    AoMap,
    /// Emissive colour
    EmissiveMap,
    /// Bump heights
    BumpMap,
    /// Tangent-space normals
    NormalMap,
    /// Specular intensity
    SpecularMap,
    /// Environment reflection
    EnvMap,
    /// Alpha mask
    AlphaMap,
    /// Roughness
    RoughnessMap,
    /// Metalness
    MetalnessMap,
    /// Vertex displacement
    DisplacementMap,
}

impl TextureSlot {
    /// Number of binding points
    pub const COUNT: usize = 12;

    /// Every binding point
    pub const ALL: [Self; Self::COUNT] = [
        Self::Map,
        Self::LightMap,
        Self::AoMap,
        Self::EmissiveMap,
        Self::BumpMap,
        Self::NormalMap,
        Self::SpecularMap,
        Self::EnvMap,
        Self::AlphaMap,
        Self::RoughnessMap,
        Self::MetalnessMap,
        Self::DisplacementMap,
    ];
}

/// How a material blends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    /// Standard alpha blending
    Normal,
    /// Additive, used by glows and stars
    Additive,
}

/// Material allocation
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base colour
    pub color: Vec3,
    /// Emissive colour
    pub emissive: Vec3,
    /// Whether the material is alpha blended
    pub transparent: bool,
    /// Blend mode
    pub blending: Blending,
    /// Rendered from both sides
    pub double_sided: bool,
    /// Point size for point clouds
    pub point_size: f32,
    maps: [Option<TextureHandle>; TextureSlot::COUNT],
}

impl Material {
    /// Opaque white material without textures
    pub fn new() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 1.0),
            emissive: Vec3::zeros(),
            transparent: false,
            blending: Blending::Normal,
            double_sided: false,
            point_size: 1.0,
            maps: [None; TextureSlot::COUNT],
        }
    }

    /// Bind a texture to a slot
    #[must_use]
    pub fn with_map(mut self, slot: TextureSlot, texture: TextureHandle) -> Self {
        self.set_map(slot, Some(texture));
        self
    }

    /// Enable alpha blending
    #[must_use]
    pub fn transparent(mut self, blending: Blending) -> Self {
        self.transparent = true;
        self.blending = blending;
        self
    }

    /// Render both faces
    #[must_use]
    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    /// Set or clear a texture slot
    pub fn set_map(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        self.maps[slot as usize] = texture;
    }

    /// Texture bound to a slot
    pub fn map(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.maps[slot as usize]
    }

    /// Every bound texture with its slot
    pub fn bound_maps(&self) -> impl Iterator<Item = (TextureSlot, TextureHandle)> + '_ {
        TextureSlot::ALL
            .into_iter()
            .filter_map(|slot| self.map(slot).map(|texture| (slot, texture)))
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new()
    }
}

/// Running totals of what was freed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposalReport {
    /// Geometries freed
    pub geometries: usize,
    /// Materials freed
    pub materials: usize,
    /// Textures freed
    pub textures: usize,
}

impl DisposalReport {
    /// Total number of freed allocations
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

impl std::ops::AddAssign for DisposalReport {
    fn add_assign(&mut self, other: Self) {
        self.geometries += other.geometries;
        self.materials += other.materials;
        self.textures += other.textures;
    }
}

/// Registry of live GPU allocations
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    geometries: HandleMap<GeometryHandle, Geometry>,
    materials: HandleMap<MaterialHandle, Material>,
    textures: HandleMap<TextureHandle, Texture>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a geometry
    pub fn create_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    /// Allocate a material
    pub fn create_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.insert(material)
    }

    /// Allocate a texture
    pub fn create_texture(&mut self, source: TextureSource) -> TextureHandle {
        self.textures.insert(Texture { source })
    }

    /// Look up a geometry
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    /// Look up a material
    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Look up a material for modification
    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }

    /// Look up a texture
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Free a geometry; false if it was already freed
    pub fn dispose_geometry(&mut self, handle: GeometryHandle) -> bool {
        self.geometries.remove(handle).is_some()
    }

    /// Free a texture; false if it was already freed
    pub fn dispose_texture(&mut self, handle: TextureHandle) -> bool {
        self.textures.remove(handle).is_some()
    }

    /// Free a material together with every texture bound to any of its slots
    pub fn dispose_material(&mut self, handle: MaterialHandle) -> DisposalReport {
        let mut report = DisposalReport::default();
        if let Some(material) = self.materials.remove(handle) {
            report.materials += 1;
            for (_, texture) in material.bound_maps() {
                if self.dispose_texture(texture) {
                    report.textures += 1;
                }
            }
        }
        report
    }

    /// Live geometry count
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Live material count
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Live texture count
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Total live allocations
    pub fn live_count(&self) -> usize {
        self.geometry_count() + self.material_count() + self.texture_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispose_is_idempotent() {
        let mut resources = ResourceRegistry::new();
        let plane = resources.create_geometry(Geometry::Plane { width: 24.0, height: 34.0 });
        assert!(resources.dispose_geometry(plane));
        assert!(!resources.dispose_geometry(plane));
        assert_eq!(resources.live_count(), 0);
    }

    #[test]
    fn test_material_disposal_frees_every_slot() {
        let mut resources = ResourceRegistry::new();
        let mut material = Material::new();
        for slot in TextureSlot::ALL {
            let texture = resources.create_texture(TextureSource::Procedural("test"));
            material.set_map(slot, Some(texture));
        }
        let handle = resources.create_material(material);
        assert_eq!(resources.texture_count(), TextureSlot::COUNT);

        let report = resources.dispose_material(handle);
        assert_eq!(report.materials, 1);
        assert_eq!(report.textures, TextureSlot::COUNT);
        assert_eq!(resources.live_count(), 0);
    }

    #[test]
    fn test_shared_texture_is_freed_once() {
        let mut resources = ResourceRegistry::new();
        let shared = resources.create_texture(TextureSource::Image("img1.jpg".to_string()));
        let first = resources.create_material(Material::new().with_map(TextureSlot::Map, shared));
        let second = resources.create_material(Material::new().with_map(TextureSlot::Map, shared));

        let mut report = resources.dispose_material(first);
        report += resources.dispose_material(second);
        assert_eq!(report, DisposalReport { geometries: 0, materials: 2, textures: 1 });
    }
}

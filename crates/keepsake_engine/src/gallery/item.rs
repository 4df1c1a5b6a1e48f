//! Gallery cards

use rand::Rng;

use crate::core::config::InteractionConfig;
use crate::foundation::collections::{MaterialHandle, NodeId};
use crate::foundation::math::{constants::TAU, Vec3};

/// Per-card floating motion parameters
///
/// Assigned the first time a card floats and kept for the card's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPhysics {
    /// Vertical bobbing amplitude
    pub amplitude: f32,
    /// Bobbing frequency
    pub frequency: f32,
    /// Phase offset
    pub phase: f32,
    /// Rotation drift direction, each component in [-0.5, 0.5)
    pub axis: Vec3,
}

impl FloatPhysics {
    /// Draw a random descriptor within the configured ranges
    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &InteractionConfig) -> Self {
        let [min_amplitude, max_amplitude] = config.float_amplitude;
        let [min_frequency, max_frequency] = config.float_frequency;
        Self {
            amplitude: sample(rng, min_amplitude, max_amplitude),
            frequency: sample(rng, min_frequency, max_frequency),
            phase: rng.gen::<f32>() * TAU,
            axis: Vec3::new(
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
                rng.gen::<f32>() - 0.5,
            ),
        }
    }

    /// Offset from the rest position at time `t`
    ///
    /// `y = sin(t·f + φ)·A`, `x = cos(0.5·t·f + φ)·sway`
    pub fn offset(&self, t: f32, sway: f32) -> Vec3 {
        Vec3::new(
            (0.5 * t * self.frequency + self.phase).cos() * sway,
            (t * self.frequency + self.phase).sin() * self.amplitude,
            0.0,
        )
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Appearance to restore when hover leaves a card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverRestore {
    /// Opacity before the hover
    pub opacity: f32,
    /// Glow before the hover
    pub emissive: f32,
}

/// One interactive card of the gallery
///
/// The card's current transform lives on its scene-graph node. The rest pose
/// recorded at creation never changes.
#[derive(Debug, Clone)]
pub struct GalleryItem {
    /// Creation index, stable for the bundle's lifetime
    pub index: usize,
    /// Scene-graph node drawing the card
    pub node: NodeId,
    original_position: Vec3,
    original_rotation: Vec3,
    /// Set while a focus or return animation owns the transform
    pub locked: bool,
    /// Material opacity
    pub opacity: f32,
    /// Glow intensity
    pub emissive: f32,
    /// Identifier of the image shown on the card
    pub image: String,
    /// Card material
    pub material: MaterialHandle,
    physics: Option<FloatPhysics>,
    /// Present while hover visuals are applied
    pub hover_restore: Option<HoverRestore>,
    /// Glow companion shown behind the card while focused (not owned)
    pub highlight: Option<NodeId>,
}

impl GalleryItem {
    /// Create an unlocked card resting at its original pose
    pub fn new(
        index: usize,
        node: NodeId,
        position: Vec3,
        rotation: Vec3,
        image: String,
        material: MaterialHandle,
        opacity: f32,
    ) -> Self {
        Self {
            index,
            node,
            original_position: position,
            original_rotation: rotation,
            locked: false,
            opacity,
            emissive: 0.0,
            image,
            material,
            physics: None,
            hover_restore: None,
            highlight: None,
        }
    }

    /// Rest position inside the float group
    pub fn original_position(&self) -> Vec3 {
        self.original_position
    }

    /// Rest rotation inside the float group
    pub fn original_rotation(&self) -> Vec3 {
        self.original_rotation
    }

    /// Floating parameters, if already assigned
    pub fn physics(&self) -> Option<&FloatPhysics> {
        self.physics.as_ref()
    }

    /// Floating parameters, assigning them on first use
    pub fn physics_or_init<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &InteractionConfig) -> FloatPhysics {
        *self.physics.get_or_insert_with(|| FloatPhysics::random(rng, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::HandleMap;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card() -> GalleryItem {
        let mut nodes: HandleMap<NodeId, ()> = HandleMap::with_key();
        let mut materials: HandleMap<MaterialHandle, ()> = HandleMap::with_key();
        GalleryItem::new(
            0,
            nodes.insert(()),
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::zeros(),
            "img1.jpg".to_string(),
            materials.insert(()),
            0.8,
        )
    }

    #[test]
    fn test_physics_is_assigned_once() {
        let config = InteractionConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut item = card();
        assert!(item.physics().is_none());

        let first = item.physics_or_init(&mut rng, &config);
        let second = item.physics_or_init(&mut rng, &config);
        assert_eq!(first, second);
        assert!((8.0..12.0).contains(&first.amplitude));
        assert!(first.axis.iter().all(|c| (-0.5..0.5).contains(c)));
    }

    #[test]
    fn test_offset_at_phase_origin() {
        let physics = FloatPhysics {
            amplitude: 10.0,
            frequency: 1.0,
            phase: 0.0,
            axis: Vec3::zeros(),
        };
        let offset = physics.offset(0.0, 8.0);
        assert_relative_eq!(offset.x, 8.0);
        assert_relative_eq!(offset.y, 0.0);
    }
}

//! # Unified Configuration System
//!
//! Every tunable of a presentation lives here: loading fail-safes, the
//! shutter transition timings, gallery layout per device tier and the
//! pointer-interaction constants. All structs deserialize with defaults, so a
//! config file only needs to list the values it overrides.
//!
//! ## Configuration Categories
//!
//! - **Loading**: asset list and the fail-safe timeout
//! - **Transition**: shutter cover/reveal and cross-fade timings
//! - **Gallery**: card layout, camera, lighting and star field
//! - **Interaction**: hover, focus, floating motion and parallax

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};

/// Upper bound on cards in one gallery tier
pub const MAX_CARDS: usize = 40;

fn check_seconds(name: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be a non-negative number of seconds, got {value}"))
    }
}

fn check_positive(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{name} must be positive, got {value}"))
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must lie in [0, 1], got {value}"))
    }
}

/// Top-level presentation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Asset loading and the progress gate
    pub loading: LoadingConfig,
    /// Scene transition timings
    pub transition: TransitionConfig,
    /// Memory gallery layout
    pub gallery: GalleryConfig,
    /// Pointer interaction tunables
    pub interaction: InteractionConfig,
}

impl Config for PresentationConfig {}

impl PresentationConfig {
    /// Validate every section and the constraints between them
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_sections().map_err(ConfigError::Invalid)
    }

    fn validate_sections(&self) -> Result<(), String> {
        self.loading.validate()?;
        self.transition.validate()?;
        self.gallery.validate()?;
        self.interaction.validate()?;

        let rest = self.gallery.camera_rest_z;
        let (near, far) = (self.interaction.zoom_min_distance, self.interaction.zoom_max_distance);
        if !(near..=far).contains(&rest) {
            return Err(format!("Camera rest depth {rest} lies outside the zoom range [{near}, {far}]"));
        }
        Ok(())
    }
}

/// # Loading Configuration
///
/// The progress gate opens when every listed asset has finished (loaded or
/// failed), or when the fail-safe timeout elapses, whichever comes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Seconds after which the gate opens regardless of progress
    pub fail_safe_timeout: f64,
    /// Non-image assets to preload (audio tracks and the like)
    pub extra_assets: Vec<String>,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            fail_safe_timeout: 12.0,
            extra_assets: vec![
                "assets/audio/intro.mp3".to_string(),
                "assets/audio/memories.mp3".to_string(),
                "assets/audio/finale.mp3".to_string(),
            ],
        }
    }
}

impl LoadingConfig {
    /// Validate the loading settings
    pub fn validate(&self) -> Result<(), String> {
        check_seconds("Loading fail-safe timeout", self.fail_safe_timeout)?;
        if self.fail_safe_timeout <= 0.0 {
            return Err("Loading fail-safe timeout must be positive".to_string());
        }
        Ok(())
    }
}

/// Shutter transition timings (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Shutter sliding in over the current scene
    pub cover_duration: f32,
    /// Pause between the swap and the reveal
    pub reveal_gap: f32,
    /// Shutter sliding away from the new scene
    pub reveal_duration: f32,
    /// Each half of the letter to finale cross-fade
    pub cross_fade_duration: f32,
    /// Delay after the intro starts before its continue affordance is forced visible
    pub intro_continue_fail_safe: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            cover_duration: 0.6,
            reveal_gap: 0.1,
            reveal_duration: 0.6,
            cross_fade_duration: 1.0,
            intro_continue_fail_safe: 9.0,
        }
    }
}

impl TransitionConfig {
    /// Validate the transition timings
    pub fn validate(&self) -> Result<(), String> {
        check_seconds("Cover duration", f64::from(self.cover_duration))?;
        check_seconds("Reveal gap", f64::from(self.reveal_gap))?;
        check_seconds("Reveal duration", f64::from(self.reveal_duration))?;
        check_seconds("Cross-fade duration", f64::from(self.cross_fade_duration))?;
        check_seconds("Intro continue fail-safe", self.intro_continue_fail_safe)
    }
}

/// Layout parameters that depend on the viewport size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTier {
    /// Number of cards in the cloud
    pub card_count: usize,
    /// Full extent of the random placement box on each axis
    pub spread: [f32; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

/// # Gallery Configuration
///
/// Layout of the memory cloud. The compact tier applies whenever the
/// viewport is narrower than `compact_breakpoint` pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Image identifiers shown on the cards, assigned round-robin
    pub images: Vec<String>,
    /// Viewport width (pixels) below which the compact tier is used
    pub compact_breakpoint: u32,
    /// Small-screen layout
    pub compact: DeviceTier,
    /// Desktop layout
    pub desktop: DeviceTier,
    /// Card plane width and height in world units
    pub card_size: [f32; 2],
    /// Upper bound of the random initial rotation on each axis (radians)
    pub initial_rotation_range: f32,
    /// Resting card opacity
    pub base_opacity: f32,
    /// Camera depth when the gallery is created
    pub camera_start_z: f32,
    /// Camera depth after the entry fly-in
    pub camera_rest_z: f32,
    /// Entry fly-in duration
    pub camera_entry_duration: f32,
    /// Near clipping plane
    pub camera_near: f32,
    /// Far clipping plane
    pub camera_far: f32,
    /// Delay before the cards start scaling in
    pub card_entry_delay: f32,
    /// Per-card scale-in duration
    pub card_entry_duration: f32,
    /// Total spread of the random scale-in stagger
    pub card_entry_stagger: f32,
    /// Exponential fog density
    pub fog_density: f32,
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Point light intensity
    pub point_light_intensity: f32,
    /// Point light range
    pub point_light_range: f32,
    /// Point light position
    pub point_light_position: [f32; 3],
    /// Number of background stars
    pub star_count: usize,
    /// Full extent of the star cube
    pub star_spread: f32,
    /// Star field spin around Y (radians per second)
    pub star_spin: f32,
}

impl DeviceTier {
    /// Validate one tier
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if self.card_count == 0 || self.card_count > MAX_CARDS {
            return Err(format!(
                "{name} tier card count must be between 1 and {MAX_CARDS}, got {}",
                self.card_count
            ));
        }
        if self.spread.iter().any(|extent| !extent.is_finite() || *extent < 0.0) {
            return Err(format!("{name} tier spread must be non-negative, got {:?}", self.spread));
        }
        if !(1.0..180.0).contains(&self.fov_degrees) {
            return Err(format!("{name} tier field of view must lie in [1, 180), got {}", self.fov_degrees));
        }
        Ok(())
    }
}

impl GalleryConfig {
    /// Validate the gallery layout
    pub fn validate(&self) -> Result<(), String> {
        if self.images.is_empty() {
            return Err("Gallery needs at least one image".to_string());
        }
        if let Some(blank) = self.images.iter().position(|image| image.trim().is_empty()) {
            return Err(format!("Gallery image {blank} has an empty path"));
        }
        self.compact.validate("Compact")?;
        self.desktop.validate("Desktop")?;

        check_positive("Card width", self.card_size[0])?;
        check_positive("Card height", self.card_size[1])?;
        check_unit("Base opacity", self.base_opacity)?;
        check_positive("Camera start depth", self.camera_start_z)?;
        check_positive("Camera rest depth", self.camera_rest_z)?;
        check_positive("Camera near plane", self.camera_near)?;
        if !self.camera_far.is_finite() || self.camera_far <= self.camera_near {
            return Err(format!(
                "Camera far plane {} must lie beyond the near plane {}",
                self.camera_far, self.camera_near
            ));
        }
        check_seconds("Camera entry duration", f64::from(self.camera_entry_duration))?;
        check_seconds("Card entry delay", f64::from(self.card_entry_delay))?;
        check_seconds("Card entry duration", f64::from(self.card_entry_duration))?;
        check_seconds("Card entry stagger", f64::from(self.card_entry_stagger))?;
        Ok(())
    }

    /// Pick the device tier for a viewport width
    pub fn tier_for_width(&self, width: u32) -> &DeviceTier {
        if width < self.compact_breakpoint {
            &self.compact
        } else {
            &self.desktop
        }
    }

    /// Number of distinct images, the goal of the discovery counter
    pub fn unique_image_count(&self) -> usize {
        let mut unique: Vec<&str> = self.images.iter().map(String::as_str).collect();
        unique.sort_unstable();
        unique.dedup();
        unique.len()
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            images: (1..=7).map(|i| format!("assets/images/img{i}.jpg")).collect(),
            compact_breakpoint: 768,
            compact: DeviceTier {
                card_count: 20,
                spread: [110.0, 170.0, 50.0],
                fov_degrees: 85.0,
            },
            desktop: DeviceTier {
                card_count: 38,
                spread: [320.0, 160.0, 180.0],
                fov_degrees: 75.0,
            },
            card_size: [24.0, 34.0],
            initial_rotation_range: 0.5,
            base_opacity: 0.8,
            camera_start_z: 1000.0,
            camera_rest_z: 140.0,
            camera_entry_duration: 2.5,
            camera_near: 0.1,
            camera_far: 2000.0,
            card_entry_delay: 0.5,
            card_entry_duration: 1.0,
            card_entry_stagger: 1.0,
            fog_density: 0.001,
            ambient_intensity: 1.2,
            point_light_intensity: 1.0,
            point_light_range: 1000.0,
            point_light_position: [200.0, 200.0, 200.0],
            star_count: 70_000,
            star_spread: 2000.0,
            star_spin: 0.012,
        }
    }
}

/// # Interaction Configuration
///
/// Hover, focus and ambient-motion constants for the gallery cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Uniform scale of a hovered card
    pub hover_scale: f32,
    /// How far a hovered card moves towards the camera
    pub hover_lift: f32,
    /// Glow of a hovered card
    pub hover_emissive: f32,
    /// Hover enter/leave animation duration
    pub hover_duration: f32,
    /// Focus animation duration
    pub focus_duration: f32,
    /// Return-to-cloud animation duration
    pub return_duration: f32,
    /// Focused card depth as a fraction of the camera depth
    pub focus_depth_fraction: f32,
    /// Uniform scale of a focused card
    pub focus_scale: f32,
    /// Extra Y rotation on top of a full turn when a card is focused
    pub focus_spin: f32,
    /// Opacity of the other cards while one is focused
    pub dim_opacity: f32,
    /// Peak glow of the focus flash
    pub flash_emissive: f32,
    /// Duration of one flash half-cycle
    pub flash_duration: f32,
    /// Pointer travel (pixels) below which a press/release pair is a tap
    pub tap_threshold: f64,
    /// Delay before the next-scene affordance appears once every image was found
    pub all_found_delay: f64,
    /// Parallax strength
    pub parallax_strength: f32,
    /// Camera offset (world units) at full parallax strength
    pub parallax_range: f32,
    /// Camera parallax easing duration
    pub parallax_duration: f32,
    /// Fog lightness at the centre of the screen
    pub fog_base: f32,
    /// Fog lightness swing across the screen
    pub fog_swing: f32,
    /// Vertical bobbing amplitude range (world units)
    pub float_amplitude: [f32; 2],
    /// Bobbing frequency range (radians per second)
    pub float_frequency: [f32; 2],
    /// Horizontal sway amplitude
    pub sway_amplitude: f32,
    /// Rotation drift speed (radians per second)
    pub drift_speed: f32,
    /// Cloud rotation per dragged pixel (radians)
    pub drag_sensitivity: f32,
    /// Fraction of the remaining cloud rotation applied per frame
    pub drag_smoothing: f32,
    /// Cloud idle spin (radians per second)
    pub idle_spin: f32,
    /// Closest camera depth the wheel can reach
    pub zoom_min_distance: f32,
    /// Farthest camera depth the wheel can reach
    pub zoom_max_distance: f32,
    /// Camera depth factor per wheel notch towards the cards
    pub zoom_step: f32,
    /// Wheel delta of one notch
    pub wheel_notch: f64,
    /// Camera easing duration after a wheel notch
    pub zoom_duration: f32,
    /// Delay after the gallery is built before the tutorial shows
    pub tutorial_show_delay: f64,
    /// Delay after the gallery is built before the tutorial hides on its own
    pub tutorial_auto_dismiss: f64,
    /// Delay after the gallery is built before input may dismiss the tutorial
    pub tutorial_input_delay: f64,
}

impl InteractionConfig {
    /// Validate the interaction tunables
    pub fn validate(&self) -> Result<(), String> {
        if !self.tap_threshold.is_finite() || self.tap_threshold <= 0.0 {
            return Err(format!("Tap threshold must be positive, got {}", self.tap_threshold));
        }
        for (name, seconds) in [
            ("Hover duration", self.hover_duration),
            ("Focus duration", self.focus_duration),
            ("Return duration", self.return_duration),
            ("Flash duration", self.flash_duration),
            ("Parallax duration", self.parallax_duration),
            ("Zoom duration", self.zoom_duration),
        ] {
            check_seconds(name, f64::from(seconds))?;
        }
        check_seconds("All-found delay", self.all_found_delay)?;
        check_seconds("Tutorial show delay", self.tutorial_show_delay)?;
        check_seconds("Tutorial auto-dismiss delay", self.tutorial_auto_dismiss)?;
        check_seconds("Tutorial input delay", self.tutorial_input_delay)?;

        let fraction = self.focus_depth_fraction;
        if fraction.is_nan() || fraction <= 0.0 || fraction >= 1.0 {
            return Err(format!(
                "Focus depth fraction must lie in (0, 1), got {}",
                self.focus_depth_fraction
            ));
        }
        check_positive("Focus scale", self.focus_scale)?;
        check_positive("Hover scale", self.hover_scale)?;
        check_unit("Dim opacity", self.dim_opacity)?;
        if self.drag_smoothing.is_nan() || self.drag_smoothing <= 0.0 || self.drag_smoothing > 1.0 {
            return Err(format!("Drag smoothing must lie in (0, 1], got {}", self.drag_smoothing));
        }

        check_positive("Minimum zoom distance", self.zoom_min_distance)?;
        if self.zoom_max_distance.is_nan() || self.zoom_max_distance < self.zoom_min_distance {
            return Err(format!(
                "Maximum zoom distance {} is below the minimum {}",
                self.zoom_max_distance, self.zoom_min_distance
            ));
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 0.0 || self.zoom_step >= 1.0 {
            return Err(format!("Zoom step must lie in (0, 1), got {}", self.zoom_step));
        }
        if !self.wheel_notch.is_finite() || self.wheel_notch <= 0.0 {
            return Err(format!("Wheel notch must be positive, got {}", self.wheel_notch));
        }
        Ok(())
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hover_scale: 1.15,
            hover_lift: 25.0,
            hover_emissive: 0.35,
            hover_duration: 0.3,
            focus_duration: 1.2,
            return_duration: 1.0,
            focus_depth_fraction: 0.75,
            focus_scale: 1.2,
            focus_spin: 0.3,
            dim_opacity: 0.1,
            flash_emissive: 0.8,
            flash_duration: 0.25,
            tap_threshold: 5.0,
            all_found_delay: 0.8,
            parallax_strength: 0.3,
            parallax_range: 5.0,
            parallax_duration: 0.5,
            fog_base: 0.15,
            fog_swing: 0.1,
            float_amplitude: [8.0, 12.0],
            float_frequency: [0.5, 0.8],
            sway_amplitude: 8.0,
            drift_speed: 0.12,
            drag_sensitivity: 0.005,
            drag_smoothing: 0.1,
            idle_spin: 0.03,
            zoom_min_distance: 50.0,
            zoom_max_distance: 400.0,
            zoom_step: 0.95,
            wheel_notch: 100.0,
            zoom_duration: 0.4,
            tutorial_show_delay: 1.0,
            tutorial_auto_dismiss: 5.0,
            tutorial_input_delay: 3.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_selection_uses_breakpoint() {
        let gallery = GalleryConfig::default();
        assert_eq!(gallery.tier_for_width(767).card_count, 20);
        assert_eq!(gallery.tier_for_width(768).card_count, 38);
        assert!((gallery.tier_for_width(400).fov_degrees - 85.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unique_image_count_ignores_duplicates() {
        let mut gallery = GalleryConfig::default();
        assert_eq!(gallery.unique_image_count(), 7);
        gallery.images.push("assets/images/img1.jpg".to_string());
        assert_eq!(gallery.unique_image_count(), 7);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            [gallery]
            compact_breakpoint = 600

            [interaction]
            hover_scale = 1.3
        "#;
        let config = PresentationConfig::from_str_with_format(text, "presentation.toml")
            .expect("valid toml");
        assert_eq!(config.gallery.compact_breakpoint, 600);
        assert_eq!(config.gallery.desktop.card_count, 38);
        assert!((config.interaction.hover_scale - 1.3).abs() < f32::EPSILON);
        assert!((config.loading.fail_safe_timeout - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = PresentationConfig::default();
        let text = ron::ser::to_string(&config).expect("serializable");
        let parsed = PresentationConfig::from_str_with_format(&text, "presentation.ron")
            .expect("valid ron");
        assert_eq!(parsed.gallery.images, config.gallery.images);
    }

    #[test]
    fn test_saved_toml_loads_back() {
        let path = std::env::temp_dir().join(format!("keepsake_config_{}.toml", std::process::id()));
        let path = path.to_string_lossy().into_owned();

        let mut config = PresentationConfig::default();
        config.transition.cover_duration = 0.9;
        config.save_to_file(&path).expect("writable temp dir");

        let loaded = PresentationConfig::load_from_file(&path).expect("readable");
        assert!((loaded.transition.cover_duration - 0.9).abs() < f32::EPSILON);
        assert_eq!(loaded.gallery.desktop, config.gallery.desktop);
        let _ = std::fs::remove_file(&path);
    }

    fn rejected(config: &PresentationConfig) -> String {
        match config.validate() {
            Err(ConfigError::Invalid(message)) => message,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PresentationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_card_count_is_capped() {
        let mut config = PresentationConfig::default();
        config.gallery.desktop.card_count = 500;
        assert!(rejected(&config).contains("card count"));

        config.gallery.desktop.card_count = MAX_CARDS;
        assert!(config.validate().is_ok());

        config.gallery.compact.card_count = 0;
        assert!(rejected(&config).contains("Compact"));
    }

    #[test]
    fn test_bad_durations_are_rejected() {
        let mut config = PresentationConfig::default();
        config.transition.cover_duration = -0.6;
        assert!(rejected(&config).contains("Cover duration"));

        let mut config = PresentationConfig::default();
        config.interaction.focus_duration = f32::NAN;
        assert!(rejected(&config).contains("Focus duration"));

        let mut config = PresentationConfig::default();
        config.loading.fail_safe_timeout = 0.0;
        assert!(rejected(&config).contains("fail-safe"));
    }

    #[test]
    fn test_tap_threshold_must_be_positive() {
        let mut config = PresentationConfig::default();
        config.interaction.tap_threshold = 0.0;
        assert!(rejected(&config).contains("Tap threshold"));
        config.interaction.tap_threshold = -3.0;
        assert!(rejected(&config).contains("Tap threshold"));
    }

    #[test]
    fn test_gallery_needs_images() {
        let mut config = PresentationConfig::default();
        config.gallery.images.clear();
        assert!(rejected(&config).contains("at least one image"));

        config.gallery.images = vec!["a.jpg".to_string(), " ".to_string()];
        assert!(rejected(&config).contains("empty path"));
    }

    #[test]
    fn test_zoom_range_must_hold_rest_depth() {
        let mut config = PresentationConfig::default();
        config.interaction.zoom_max_distance = 100.0;
        assert!(rejected(&config).contains("zoom range"));

        config.interaction.zoom_max_distance = 40.0;
        assert!(rejected(&config).contains("Maximum zoom distance"));
    }

    #[test]
    fn test_invalid_file_loads_but_fails_validation() {
        let text = r#"
            [gallery.desktop]
            card_count = 500
            spread = [320.0, 160.0, 180.0]
            fov_degrees = 75.0
        "#;
        let config = PresentationConfig::from_str_with_format(text, "presentation.toml")
            .expect("valid toml");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = PresentationConfig::from_str_with_format("", "presentation.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}

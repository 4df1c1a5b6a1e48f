//! Pointer state for picking operations
//!
//! Converts screen-space pointer positions into the two normalized spaces the
//! gallery uses: NDC for ray casting and a centred unit square for parallax.

use crate::render::surface::Viewport;

/// Pointer state for picking and drag gestures
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Current screen-space X position (pixels from left)
    pub screen_x: f64,
    /// Current screen-space Y position (pixels from top)
    pub screen_y: f64,
    /// Drawable area the position is relative to
    pub viewport: Viewport,
    /// Press position (None if the button is up)
    pub drag_start: Option<(f64, f64)>,
    /// Position of the previous move while the button is held
    last_drag: Option<(f64, f64)>,
}

impl PointerState {
    /// Pointer resting at the top-left corner of `viewport`
    pub fn new(viewport: Viewport) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            viewport,
            drag_start: None,
            last_drag: None,
        }
    }

    /// Convert screen coordinates to Normalized Device Coordinates (NDC)
    ///
    /// NDC range: [-1, 1] where:
    /// - X: -1 = left, +1 = right
    /// - Y: +1 = top, -1 = bottom (screen Y grows downwards)
    pub fn ndc(&self) -> (f32, f32) {
        let (width, height) = self.extent();
        let ndc_x = (self.screen_x / width) as f32 * 2.0 - 1.0;
        let ndc_y = -(self.screen_y / height) as f32 * 2.0 + 1.0;
        (ndc_x, ndc_y)
    }

    /// Pointer position in [-0.5, 0.5], Y down, centred on the viewport
    pub fn parallax(&self) -> (f32, f32) {
        let (width, height) = self.extent();
        ((self.screen_x / width - 0.5) as f32, (self.screen_y / height - 0.5) as f32)
    }

    /// Update the pointer position
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Update the viewport after a resize
    pub fn update_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Button pressed at the current position
    pub fn press(&mut self) {
        self.drag_start = Some((self.screen_x, self.screen_y));
        self.last_drag = self.drag_start;
    }

    /// Button released; returns the press position if there was one
    pub fn release(&mut self) -> Option<(f64, f64)> {
        self.last_drag = None;
        self.drag_start.take()
    }

    /// Whether the button is held
    pub fn is_down(&self) -> bool {
        self.drag_start.is_some()
    }

    /// Whether the pointer moved less than `threshold` pixels since the press
    pub fn is_tap(&self, threshold: f64) -> bool {
        self.drag_start
            .map(|(start_x, start_y)| {
                let dx = self.screen_x - start_x;
                let dy = self.screen_y - start_y;
                (dx * dx + dy * dy).sqrt() < threshold
            })
            .unwrap_or(false)
    }

    /// Movement since the previous call while the button is held
    pub fn take_drag_delta(&mut self) -> Option<(f32, f32)> {
        let (last_x, last_y) = self.last_drag?;
        self.last_drag = Some((self.screen_x, self.screen_y));
        Some(((self.screen_x - last_x) as f32, (self.screen_y - last_y) as f32))
    }

    fn extent(&self) -> (f64, f64) {
        (
            f64::from(self.viewport.width.max(1)),
            f64::from(self.viewport.height.max(1)),
        )
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer_at(x: f64, y: f64) -> PointerState {
        let mut pointer = PointerState::new(Viewport::new(1920, 1080));
        pointer.update_position(x, y);
        pointer
    }

    #[test]
    fn test_ndc_center() {
        let (ndc_x, ndc_y) = pointer_at(960.0, 540.0).ndc();
        assert!(ndc_x.abs() < 0.001);
        assert!(ndc_y.abs() < 0.001);
    }

    #[test]
    fn test_ndc_corners_flip_y() {
        let (ndc_x, ndc_y) = pointer_at(0.0, 0.0).ndc();
        assert!((ndc_x + 1.0).abs() < 0.001); // Left edge
        assert!((ndc_y - 1.0).abs() < 0.001); // Top edge

        let (ndc_x, ndc_y) = pointer_at(1920.0, 1080.0).ndc();
        assert!((ndc_x - 1.0).abs() < 0.001);
        assert!((ndc_y + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_parallax_range() {
        let (px, py) = pointer_at(0.0, 1080.0).parallax();
        assert!((px + 0.5).abs() < 0.001);
        assert!((py - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_tap_versus_drag() {
        let mut pointer = pointer_at(100.0, 100.0);
        assert!(!pointer.is_tap(5.0));

        pointer.press();
        pointer.update_position(103.0, 103.0);
        assert!(pointer.is_tap(5.0));

        pointer.update_position(110.0, 100.0);
        assert!(!pointer.is_tap(5.0));
        assert_eq!(pointer.release(), Some((100.0, 100.0)));
        assert!(!pointer.is_down());
    }

    #[test]
    fn test_drag_delta_is_incremental() {
        let mut pointer = pointer_at(10.0, 10.0);
        assert!(pointer.take_drag_delta().is_none());

        pointer.press();
        pointer.update_position(20.0, 5.0);
        assert_eq!(pointer.take_drag_delta(), Some((10.0, -5.0)));
        pointer.update_position(25.0, 5.0);
        assert_eq!(pointer.take_drag_delta(), Some((5.0, 0.0)));
    }
}

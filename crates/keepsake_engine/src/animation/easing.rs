//! Easing curves
//!
//! The `PowerN` family follows the usual naming where `power1` is quadratic,
//! `power2` cubic and `power3` quartic.

/// Maps linear progress in [0, 1] to eased progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// No easing
    Linear,
    /// Accelerating polynomial curve of the given power level
    PowerIn(u8),
    /// Decelerating polynomial curve of the given power level
    PowerOut(u8),
    /// Symmetric accelerate/decelerate polynomial curve
    PowerInOut(u8),
    /// Half-sine accelerate/decelerate
    SineInOut,
    /// Decelerating curve that overshoots the target before settling
    BackOut(f32),
}

impl Easing {
    /// `power1.out`, the default for new tweens
    pub const DEFAULT: Self = Self::PowerOut(1);

    /// Default overshoot of [`Easing::BackOut`]
    pub const BACK_OVERSHOOT: f32 = 1.70158;

    /// `back.out` with the default overshoot
    pub fn back_out() -> Self {
        Self::BackOut(Self::BACK_OVERSHOOT)
    }

    /// Evaluate the curve; input is clamped to [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::PowerIn(level) => t.powi(exponent(level)),
            Self::PowerOut(level) => 1.0 - (1.0 - t).powi(exponent(level)),
            Self::PowerInOut(level) => {
                let p = exponent(level);
                if t < 0.5 {
                    (2.0 * t).powi(p) * 0.5
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(p) * 0.5
                }
            }
            Self::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) * 0.5,
            Self::BackOut(overshoot) => {
                let u = t - 1.0;
                1.0 + (overshoot + 1.0) * u * u * u + overshoot * u * u
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn exponent(level: u8) -> i32 {
    i32::from(level) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::PowerIn(2),
        Easing::PowerOut(2),
        Easing::PowerInOut(2),
        Easing::PowerInOut(1),
        Easing::SineInOut,
        Easing::BackOut(1.2),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_relative_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_relative_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_in_out_is_symmetric_about_midpoint() {
        let easing = Easing::PowerInOut(2);
        assert_relative_eq!(easing.apply(0.5), 0.5, epsilon = 1e-6);
        assert_relative_eq!(easing.apply(0.25) + easing.apply(0.75), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_back_out_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::back_out().apply(i as f32 / 100.0))
            .fold(0.0_f32, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_relative_eq!(Easing::PowerOut(2).apply(3.0), 1.0);
        assert_relative_eq!(Easing::PowerOut(2).apply(-1.0), 0.0);
    }
}

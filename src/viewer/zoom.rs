//! Zoom state for page rendering
//!
//! Zoom moves in fixed steps inside a clamped range. The factor scales both
//! rasterization and the canvas coordinate space, so overlay positions are
//! multiplied by it when drawing and divided by it when mapping clicks back
//! to page coordinates.

/// Zoom factor for page viewing
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zoom {
    factor: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl Zoom {
    /// Minimum allowed zoom factor
    pub const MIN: f32 = 0.25;
    /// Maximum allowed zoom factor
    pub const MAX: f32 = 3.0;
    /// Additive step per zoom in/out
    pub const STEP: f32 = 0.25;

    #[must_use]
    pub fn new(factor: f32) -> Self {
        Self {
            factor: Self::clamp_factor(factor),
        }
    }

    /// Returns the current zoom factor
    #[must_use]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Zoom in by one step. Returns true if the factor changed.
    pub fn step_in(&mut self) -> bool {
        self.set(self.factor + Self::STEP)
    }

    /// Zoom out by one step. Returns true if the factor changed.
    pub fn step_out(&mut self) -> bool {
        self.set(self.factor - Self::STEP)
    }

    /// Set the factor, clamped to the valid range. Returns true on change.
    pub fn set(&mut self, factor: f32) -> bool {
        let clamped = Self::clamp_factor(factor);
        if (self.factor - clamped).abs() > f32::EPSILON {
            self.factor = clamped;
            true
        } else {
            false
        }
    }

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.clamp(Self::MIN, Self::MAX)
        }
    }
}

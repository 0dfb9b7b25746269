//! Scale state for the on-screen preview.
//!
//! Maps between the full-resolution export space and the scaled preview
//! shown inside a container. The ratio starts at the fit-to-container value
//! and can be zoomed within `[0.5 * fit, 3.0]`.
//!
//! `ScaleState` is a `Copy` value: every operation returns the new state and
//! the caller decides when to redraw.

/// Fit ratio leaves 5% of the container free.
pub const FIT_MARGIN: f32 = 0.95;
/// Zoom in step multiplier.
pub const ZOOM_IN_STEP: f32 = 1.2;
/// Zoom out step multiplier.
pub const ZOOM_OUT_STEP: f32 = 0.8;
/// Largest ratio, relative to the unscaled original.
pub const MAX_SCALE: f32 = 3.0;
/// Smallest ratio, relative to the current fit ratio.
pub const MIN_FIT_FRACTION: f32 = 0.5;

/// Largest uniform ratio that fits the original inside the container, minus
/// a 5% margin. Degenerate originals (zero width or height) give `1.0`.
pub fn fit_scale(orig_w: u32, orig_h: u32, container_w: u32, container_h: u32) -> f32 {
    if orig_w == 0 || orig_h == 0 {
        return 1.0;
    }
    let width_ratio = container_w as f32 / orig_w as f32;
    let height_ratio = container_h as f32 / orig_h as f32;
    width_ratio.min(height_ratio) * FIT_MARGIN
}

/// Current preview scale for one image inside one container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    ratio: f32,
    original: (u32, u32),
    container: (u32, u32),
}

impl ScaleState {
    /// Start at the fit ratio for this image and container.
    pub fn fit(original: (u32, u32), container: (u32, u32)) -> Self {
        Self {
            ratio: fit_scale(original.0, original.1, container.0, container.1),
            original,
            container,
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn original(&self) -> (u32, u32) {
        self.original
    }

    pub fn container(&self) -> (u32, u32) {
        self.container
    }

    /// Fit ratio for the current image and container.
    pub fn fit_ratio(&self) -> f32 {
        fit_scale(
            self.original.0,
            self.original.1,
            self.container.0,
            self.container.1,
        )
    }

    /// Smallest ratio `zoom_out` may reach.
    pub fn min_ratio(&self) -> f32 {
        self.fit_ratio() * MIN_FIT_FRACTION
    }

    /// Largest ratio `zoom_in` may reach.
    pub fn max_ratio(&self) -> f32 {
        MAX_SCALE
    }

    /// Enlarge by 20%, never past 3x the original. No-op at the cap.
    pub fn zoom_in(self) -> Self {
        if self.ratio >= MAX_SCALE {
            return self;
        }
        Self {
            ratio: (self.ratio * ZOOM_IN_STEP).min(MAX_SCALE),
            ..self
        }
    }

    /// Shrink by 20%, never below half the fit ratio. No-op at the floor.
    pub fn zoom_out(self) -> Self {
        let floor = self.min_ratio();
        if self.ratio <= floor {
            return self;
        }
        Self {
            ratio: (self.ratio * ZOOM_OUT_STEP).max(floor),
            ..self
        }
    }

    /// Return to the fit ratio.
    pub fn reset(self) -> Self {
        Self {
            ratio: self.fit_ratio(),
            ..self
        }
    }

    /// Adopt a new container size.
    ///
    /// The ratio is recomputed from scratch, discarding any manual zoom.
    pub fn resize(self, container: (u32, u32)) -> Self {
        Self::fit(self.original, container)
    }

    /// Font size to use when drawing on the scaled preview.
    pub fn preview_font_size(&self, export_font_size: u32) -> u32 {
        ((export_font_size as f32 * self.ratio).round() as u32).max(1)
    }

    /// Size of the scaled image, truncated to whole pixels and at least 1x1.
    pub fn scaled_size(&self) -> (u32, u32) {
        (
            ((self.original.0 as f32 * self.ratio) as u32).max(1),
            ((self.original.1 as f32 * self.ratio) as u32).max(1),
        )
    }

    /// Offset that centres the scaled image inside the container.
    /// Negative when zoomed past the container edges.
    pub fn centered_offset(&self) -> (i32, i32) {
        let (scaled_w, scaled_h) = self.scaled_size();
        (
            (self.container.0 as i32 - scaled_w as i32).div_euclid(2),
            (self.container.1 as i32 - scaled_h as i32).div_euclid(2),
        )
    }

    /// Ratio as a whole percentage, for status display.
    pub fn percent(&self) -> u32 {
        (self.ratio * 100.0) as u32
    }
}

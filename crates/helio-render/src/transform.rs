//! Coordinate transform pipeline: data domain → pixel space → clip space.
//!
//! Scales and plot areas are pure values; nothing here touches the GPU. The
//! convention is:
//!
//! ```text
//! pixel = plot_origin + (value - d0) / (d1 - d0) * extent   (x axis)
//! pixel = plot_origin + extent - scale(value)               (y axis, flipped once)
//! clip  = pixel / resolution * 2 - 1                        (y sign flipped in the matrix)
//! ```
//!
//! The data-up → screen-down flip happens exactly once, in [`ChartScales::screen_y`].
//! The projection matrix flips Y a second time only to go from screen-down
//! pixels to clip space; geometry builders must never flip again.

use crate::error::RenderError;
use crate::series::Margin;
use bytemuck::{Pod, Zeroable};
use helio_core::geometry::{Rect, Size};

/// A linear mapping from a data domain to a pixel extent starting at 0.
///
/// Construction clamps a degenerate domain (`max <= min`) to a 1-unit-wide
/// domain centred on the midpoint, so scaling never divides by zero and never
/// emits NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    range: f32,
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range_px: f32) -> Self {
        let [mut d0, mut d1] = domain;
        if d1 <= d0 {
            tracing::warn!("Degenerate domain [{}, {}] clamped to unit width", d0, d1);
            let mid = (d0 + d1) / 2.0;
            d0 = mid - 0.5;
            d1 = mid + 0.5;
        }
        Self {
            d0,
            d1,
            range: range_px,
        }
    }

    /// Validate a domain without clamping it.
    pub fn check_domain(domain: [f64; 2]) -> Result<(), RenderError> {
        if !domain[0].is_finite() || !domain[1].is_finite() {
            return Err(RenderError::InvalidProps(format!(
                "non-finite domain [{}, {}]",
                domain[0], domain[1]
            )));
        }
        Ok(())
    }

    /// Map a data value to a pixel offset in `0.0..=range`.
    ///
    /// `scale(d0) == 0.0` and `scale(d1) == range` hold exactly.
    #[inline]
    pub fn scale(&self, value: f64) -> f32 {
        (((value - self.d0) / (self.d1 - self.d0)) as f32) * self.range
    }

    /// Map a data value with the axis direction flipped (data-up to
    /// screen-down).
    #[inline]
    pub fn scale_flipped(&self, value: f64) -> f32 {
        self.range - self.scale(value)
    }

    pub fn domain(&self) -> [f64; 2] {
        [self.d0, self.d1]
    }

    pub fn range(&self) -> f32 {
        self.range
    }
}

/// The plot area (canvas inset by margins) plus the per-axis scales.
///
/// All dimensions are physical pixels; the caller applies the device pixel
/// ratio to the margin before constructing this.
#[derive(Debug, Clone, Copy)]
pub struct ChartScales {
    pub area: Rect<f32>,
    pub x: LinearScale,
    pub y: LinearScale,
}

impl ChartScales {
    pub fn new(size: Size<f32>, margin: Margin, x_domain: [f64; 2], y_domain: [f64; 2]) -> Self {
        let inner_width = (size.width - margin.left - margin.right).max(1.0);
        let inner_height = (size.height - margin.top - margin.bottom).max(1.0);
        let area = Rect::new(margin.left, margin.top, inner_width, inner_height);
        Self {
            area,
            x: LinearScale::new(x_domain, inner_width),
            y: LinearScale::new(y_domain, inner_height),
        }
    }

    /// Screen x coordinate of a data x value.
    #[inline]
    pub fn screen_x(&self, value: f64) -> f32 {
        self.area.x + self.x.scale(value)
    }

    /// Screen y coordinate of a data y value. Data-up becomes screen-down
    /// here; this is the only flip applied to geometry.
    #[inline]
    pub fn screen_y(&self, value: f64) -> f32 {
        self.area.y + self.y.scale_flipped(value)
    }
}

/// GPU uniform block for the pixel-to-clip transform.
///
/// Layout (80 bytes, 16-byte aligned):
/// ```text
/// offset 0:  mat4x4<f32> projection  (64 bytes)
/// offset 64: vec2<f32>   resolution  (8 bytes)
/// offset 72: vec2<f32>   padding     (8 bytes)
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct TransformUniform {
    /// Orthographic projection: pixel space (origin top-left, y-down) to clip
    /// space. Y is flipped here, and only here, on the way to clip space.
    pub projection: [[f32; 4]; 4],
    /// Render-target size in physical pixels.
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<TransformUniform>(), 80);

impl TransformUniform {
    pub fn new(resolution: Size<f32>) -> Self {
        Self {
            projection: Self::ortho_matrix(resolution.width, resolution.height),
            resolution: [resolution.width, resolution.height],
            _pad: [0.0; 2],
        }
    }

    /// Orthographic projection matrix for the given target size.
    ///
    /// Maps (0,0) to top-left (-1,1) and (width,height) to bottom-right (1,-1):
    /// `clip = pixel / resolution * 2 - 1`, y negated.
    pub fn ortho_matrix(width: f32, height: f32) -> [[f32; 4]; 4] {
        [
            [2.0 / width, 0.0, 0.0, 0.0],
            [0.0, -2.0 / height, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-1.0, 1.0, 0.0, 1.0],
        ]
    }
}

//! Caller-facing data model: series, margins, style flags, and the per-frame
//! [`RenderProps`] bundle.
//!
//! Series data is owned by the caller and read-only to the engine; a
//! [`RenderProps`] borrows it for exactly one `render` call and is never
//! retained.

use crate::color::Color;
use helio_core::geometry::{ScaleFactor, Size};

/// A single data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointXY {
    pub x: f64,
    pub y: f64,
}

impl PointXY {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One data series.
#[derive(Debug, Clone)]
pub struct Series {
    /// Caller-assigned identifier, used for diagnostics only. Buffer slots are
    /// keyed by series position, not identity.
    pub id: String,
    pub points: Vec<PointXY>,
    pub color: Color,
    /// Stroke width in logical pixels (line charts).
    pub stroke_width: f32,
    /// Fill opacity override (area charts). Defaults to 0.35 when `None`.
    pub fill_opacity: Option<f32>,
    /// Fixed baseline value (area/bar charts). Defaults to 0.0 when `None`.
    pub baseline: Option<f64>,
}

impl Series {
    pub fn new(id: impl Into<String>, points: Vec<PointXY>, color: Color) -> Self {
        Self {
            id: id.into(),
            points,
            color,
            stroke_width: 1.5,
            fill_opacity: None,
            baseline: None,
        }
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_fill_opacity(mut self, opacity: f32) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = Some(baseline);
        self
    }
}

/// Plot-area margins in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margin {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Scale every edge by the device pixel ratio.
    pub fn to_physical(self, scale_factor: ScaleFactor) -> Self {
        Self {
            top: scale_factor.to_physical(self.top),
            right: scale_factor.to_physical(self.right),
            bottom: scale_factor.to_physical(self.bottom),
            left: scale_factor.to_physical(self.left),
        }
    }
}

/// Bar chart orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Per-frame style flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub show_grid: bool,
    /// Stack area series on top of each other instead of overlaying them.
    pub stacked: bool,
    pub orientation: Orientation,
    pub background: Color,
    pub grid_color: Color,
    pub border_color: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            show_grid: true,
            stacked: false,
            orientation: Orientation::Vertical,
            background: Color::WHITE,
            grid_color: Color::from_hex(0xE2E8F0),
            border_color: Color::from_hex(0x94A3B8),
        }
    }
}

/// The per-frame input bundle.
///
/// Constructed fresh for every `render` call; the engine never retains it.
/// `size` is the render-target size in physical pixels; `margin` and tick
/// values are logical and are scaled by `scale_factor` inside the engine
/// before any geometry is built.
#[derive(Debug, Clone)]
pub struct RenderProps<'a> {
    pub series: &'a [Series],
    /// `[min, max]` data range of the x axis. A degenerate domain
    /// (`max <= min`) is clamped to a 1-unit-wide domain around the midpoint.
    pub x_domain: [f64; 2],
    pub y_domain: [f64; 2],
    pub x_ticks: &'a [f64],
    pub y_ticks: &'a [f64],
    /// Render-target size in physical pixels.
    pub size: Size<u32>,
    pub margin: Margin,
    pub scale_factor: ScaleFactor,
    pub style: ChartStyle,
}

//! Geometry builders: pure functions turning series data into flat vertex and
//! color arrays in pixel space.
//!
//! Builders are allocation-local (no shared mutable state between calls) and
//! never read the device pixel ratio; every dimension they receive — margins,
//! stroke widths, band widths, tick line widths — is already in physical
//! pixels. Output is consumed by either backend: the GPU backend uploads the
//! arrays into pooled vertex buffers, the raster backend feeds them straight
//! to the scanline rasterizer.

mod area;
mod bar;
mod grid;
mod line;

pub use area::{StackState, build_area_series};
pub use bar::build_bar_series;
pub use grid::{build_border, build_grid};
pub use line::build_line_series;

use crate::color::Color;
use crate::series::{Orientation, RenderProps};
use crate::transform::ChartScales;
use helio_core::profiling::profile_function;

/// How a vertex stream is to be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryTopology {
    /// Every 3 vertices form a triangle.
    TriangleList,
    /// Every 2 vertices form a 1px hairline segment.
    LineList,
}

/// Flat vertex output of a geometry builder.
///
/// `positions` holds interleaved x/y pairs in physical pixels; `colors` holds
/// one RGBA quadruple per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    positions: Vec<f32>,
    colors: Vec<f32>,
    topology: GeometryTopology,
}

impl VertexData {
    pub fn new(topology: GeometryTopology) -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            topology,
        }
    }

    pub fn with_capacity(topology: GeometryTopology, vertices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices * 2),
            colors: Vec::with_capacity(vertices * 4),
            topology,
        }
    }

    pub fn topology(&self) -> GeometryTopology {
        self.topology
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Byte size of the position channel.
    pub fn position_bytes(&self) -> u64 {
        std::mem::size_of_val(self.positions.as_slice()) as u64
    }

    /// Byte size of the color channel.
    pub fn color_bytes(&self) -> u64 {
        std::mem::size_of_val(self.colors.as_slice()) as u64
    }

    #[inline]
    pub fn push_vertex(&mut self, x: f32, y: f32, color: Color) {
        self.positions.push(x);
        self.positions.push(y);
        self.colors
            .extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Push an axis-aligned rectangle as two triangles.
    ///
    /// The corner pairs are normalized to min/max first, so the rectangle is
    /// never inverted regardless of the sign of the inputs.
    pub fn push_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

        self.push_vertex(left, top, color);
        self.push_vertex(right, top, color);
        self.push_vertex(right, bottom, color);
        self.push_vertex(left, top, color);
        self.push_vertex(right, bottom, color);
        self.push_vertex(left, bottom, color);
    }

    /// Push a hairline segment (LineList topology).
    pub fn push_segment(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        self.push_vertex(x0, y0, color);
        self.push_vertex(x1, y1, color);
    }

    /// Whether any position component is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.positions.iter().any(|v| !v.is_finite())
    }
}

/// The chart family a renderer is built for.
///
/// Selected once at engine construction; the backend plumbing is shared and
/// only the geometry strategy differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Area,
    Bar,
}

/// Everything one frame draws: optional grid and border plus one vertex
/// stream per series, in draw order (grid below series, border on top).
#[derive(Debug, Clone)]
pub struct FrameGeometry {
    pub grid: Option<VertexData>,
    pub border: Option<VertexData>,
    pub series: Vec<VertexData>,
}

/// Default fill opacity for area series without an explicit override.
pub const DEFAULT_FILL_OPACITY: f32 = 0.35;

/// Fraction of the category band occupied by bars (the rest is gap).
const BAR_BAND_FILL: f32 = 0.8;

/// Build all geometry for one frame.
///
/// `scales` must already describe the DPR-scaled plot area; `scale_factor`
/// from the props is only used to convert logical stroke/line widths.
pub fn build_frame(kind: ChartKind, props: &RenderProps, scales: &ChartScales) -> FrameGeometry {
    profile_function!();

    let dpr = props.scale_factor.0;
    let grid = props.style.show_grid.then(|| {
        build_grid(
            props.x_ticks,
            props.y_ticks,
            scales,
            props.style.grid_color,
            dpr.max(1.0),
        )
    });
    let border = Some(build_border(scales.area, props.style.border_color));

    let series_count = props.series.len();
    let mut stack = props.style.stacked.then(StackState::new);

    let series = match kind {
        ChartKind::Line => props
            .series
            .iter()
            .map(|s| build_line_series(&s.points, s.color, s.stroke_width * dpr, scales))
            .collect(),
        ChartKind::Area => props
            .series
            .iter()
            .map(|s| {
                build_area_series(
                    &s.points,
                    s.color.with_alpha(s.fill_opacity.unwrap_or(DEFAULT_FILL_OPACITY)),
                    s.baseline.unwrap_or(0.0),
                    stack.as_mut(),
                    scales,
                )
            })
            .collect(),
        ChartKind::Bar => {
            let band_px = bar_band_px(props, scales);
            props
                .series
                .iter()
                .enumerate()
                .map(|(index, s)| {
                    build_bar_series(
                        &s.points,
                        s.color,
                        index,
                        series_count,
                        band_px,
                        s.baseline.unwrap_or(0.0),
                        props.style.orientation,
                        scales,
                    )
                })
                .collect()
        }
    };

    FrameGeometry {
        grid,
        border,
        series,
    }
}

/// Category band width in physical pixels: the plot extent along the category
/// axis divided by the largest series length, with a fixed gap fraction.
fn bar_band_px(props: &RenderProps, scales: &ChartScales) -> f32 {
    let categories = props
        .series
        .iter()
        .map(|s| s.points.len())
        .max()
        .unwrap_or(0)
        .max(1);
    let extent = match props.style.orientation {
        Orientation::Vertical => scales.area.width,
        Orientation::Horizontal => scales.area.height,
    };
    extent / categories as f32 * BAR_BAND_FILL
}

//! Software rasterizer fallback (Backend-B).
//!
//! Raster-only and universally available: triangles are filled with a scanline
//! edge-function test, hairlines drawn with Bresenham, everything alpha
//! blended into an RGBA8 framebuffer. Commands are immediate and synchronous;
//! `render` returns after the presenter callback has been handed the finished
//! frame. No GPU resources exist on this tier, so there is nothing to pool.

use super::{BackendKind, ChartBackend};
use crate::color::Color;
use crate::error::RenderError;
use crate::geometry::{ChartKind, GeometryTopology, VertexData, build_frame};
use crate::series::RenderProps;
use crate::transform::ChartScales;
use crate::viewport::Viewport;
use helio_core::geometry::Size;
use helio_core::profiling::profile_function;

/// Receives each finished frame: raw RGBA8 bytes, row-major, plus the size.
pub type FramePresenter = Box<dyn FnMut(&[u8], Size<u32>) + Send>;

/// CPU raster backend.
pub struct RasterBackend {
    kind: ChartKind,
    size: Size<u32>,
    frame: Vec<u8>,
    presenter: Option<FramePresenter>,
    destroyed: bool,
}

impl RasterBackend {
    pub fn new(
        kind: ChartKind,
        size: Size<u32>,
        presenter: Option<FramePresenter>,
    ) -> Result<Self, RenderError> {
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::InvalidProps(format!(
                "raster target size {}x{} must be non-zero",
                size.width, size.height
            )));
        }

        tracing::info!(
            "Initialized software raster backend at {}x{}",
            size.width,
            size.height
        );

        Ok(Self {
            kind,
            size,
            frame: vec![0; size.width as usize * size.height as usize * 4],
            presenter,
            destroyed: false,
        })
    }

    /// The last rendered frame as raw RGBA8 bytes.
    pub fn frame_rgba8(&self) -> &[u8] {
        &self.frame
    }

    pub fn size(&self) -> Size<u32> {
        self.size
    }

    /// Read one pixel (testing/readback helper).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        self.frame.get(idx..idx + 4).map(|px| [px[0], px[1], px[2], px[3]])
    }

    fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba_u8();
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn draw(&mut self, data: &VertexData) {
        let positions = data.positions();
        let colors = data.colors();
        match data.topology() {
            GeometryTopology::TriangleList => {
                for tri in 0..data.vertex_count() / 3 {
                    let base = tri * 3;
                    let p = |i: usize| {
                        let v = base + i;
                        (positions[v * 2], positions[v * 2 + 1])
                    };
                    // Builders emit one color per primitive; flat shading from
                    // the first vertex is exact for this geometry.
                    let c = &colors[base * 4..base * 4 + 4];
                    self.fill_triangle(p(0), p(1), p(2), [c[0], c[1], c[2], c[3]]);
                }
            }
            GeometryTopology::LineList => {
                for seg in 0..data.vertex_count() / 2 {
                    let base = seg * 2;
                    let c = &colors[base * 4..base * 4 + 4];
                    self.draw_line(
                        (positions[base * 2], positions[base * 2 + 1]),
                        (positions[base * 2 + 2], positions[base * 2 + 3]),
                        [c[0], c[1], c[2], c[3]],
                    );
                }
            }
        }
    }

    /// Edge-function fill over the triangle's bounding box, sampling pixel
    /// centers.
    fn fill_triangle(&mut self, a: (f32, f32), b: (f32, f32), c: (f32, f32), color: [f32; 4]) {
        let area = edge(a, b, c);
        if area.abs() < f32::EPSILON {
            return;
        }
        // Normalize winding so the inside test is always >= 0.
        let (b, c) = if area < 0.0 { (c, b) } else { (b, c) };

        let min_x = a.0.min(b.0).min(c.0).floor().max(0.0) as i64;
        let max_x = (a.0.max(b.0).max(c.0).ceil() as i64).min(self.size.width as i64 - 1);
        let min_y = a.1.min(b.1).min(c.1).floor().max(0.0) as i64;
        let max_y = (a.1.max(b.1).max(c.1).ceil() as i64).min(self.size.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                if edge(a, b, p) >= 0.0 && edge(b, c, p) >= 0.0 && edge(c, a, p) >= 0.0 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Bresenham hairline.
    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), color: [f32; 4]) {
        let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.blend_pixel(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Source-over blend of one pixel, bounds-checked.
    fn blend_pixel(&mut self, x: i64, y: i64, color: [f32; 4]) {
        if x < 0 || y < 0 || x >= self.size.width as i64 || y >= self.size.height as i64 {
            return;
        }
        let idx = (y as usize * self.size.width as usize + x as usize) * 4;
        let alpha = color[3].clamp(0.0, 1.0);
        for ch in 0..3 {
            let src = color[ch].clamp(0.0, 1.0) * 255.0;
            let dst = self.frame[idx + ch] as f32;
            self.frame[idx + ch] = (src * alpha + dst * (1.0 - alpha) + 0.5) as u8;
        }
        let dst_a = self.frame[idx + 3] as f32 / 255.0;
        self.frame[idx + 3] = ((alpha + dst_a * (1.0 - alpha)) * 255.0 + 0.5) as u8;
    }
}

/// Signed parallelogram area of the edge `ab` against point `p`.
#[inline]
fn edge(a: (f32, f32), b: (f32, f32), p: (f32, f32)) -> f32 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

impl ChartBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn render(&mut self, props: &RenderProps<'_>) -> Result<(), RenderError> {
        profile_function!();

        if self.destroyed {
            tracing::warn!("Render called on a destroyed raster backend; frame dropped");
            return Ok(());
        }

        let viewport = Viewport::new(self.size.as_f32(), props.scale_factor);
        let margin = props.margin.to_physical(viewport.scale_factor);
        let scales = ChartScales::new(viewport.size, margin, props.x_domain, props.y_domain);
        let frame = build_frame(self.kind, props, &scales);

        self.clear(props.style.background);
        if let Some(grid) = &frame.grid {
            self.draw(grid);
        }
        for series in &frame.series {
            self.draw(series);
        }
        if let Some(border) = &frame.border {
            self.draw(border);
        }

        if let Some(presenter) = self.presenter.as_mut() {
            presenter(&self.frame, self.size);
        }

        Ok(())
    }

    fn resize(&mut self, size: Size<u32>) {
        if size.width == 0 || size.height == 0 || size == self.size {
            return;
        }
        self.size = size;
        self.frame = vec![0; size.width as usize * size.height as usize * 4];
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.frame = Vec::new();
        self.presenter = None;
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ChartStyle, Margin, PointXY, Series};
    use helio_core::geometry::ScaleFactor;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn line_props<'a>(series: &'a [Series], ticks: &'a [f64]) -> RenderProps<'a> {
        RenderProps {
            series,
            x_domain: [0.0, 10.0],
            y_domain: [0.0, 10.0],
            x_ticks: ticks,
            y_ticks: ticks,
            size: Size::new(100, 80),
            margin: Margin::uniform(10.0),
            scale_factor: ScaleFactor::IDENTITY,
            style: ChartStyle {
                background: Color::BLACK,
                ..Default::default()
            },
        }
    }

    #[test]
    fn triangle_fill_covers_interior_not_exterior() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(40, 40), None).unwrap();
        backend.clear(Color::BLACK);

        let mut data = VertexData::new(GeometryTopology::TriangleList);
        data.push_vertex(5.0, 5.0, Color::RED);
        data.push_vertex(35.0, 5.0, Color::RED);
        data.push_vertex(5.0, 35.0, Color::RED);
        backend.draw(&data);

        // Inside the triangle.
        assert_eq!(backend.pixel(10, 10).unwrap(), [255, 0, 0, 255]);
        // Outside (beyond the hypotenuse): still the clear color.
        assert_eq!(backend.pixel(34, 34).unwrap(), [0, 0, 0, 255]);
    }

    #[test]
    fn winding_does_not_matter() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(40, 40), None).unwrap();
        backend.clear(Color::BLACK);

        // Clockwise order of the same triangle as above.
        let mut data = VertexData::new(GeometryTopology::TriangleList);
        data.push_vertex(5.0, 5.0, Color::RED);
        data.push_vertex(5.0, 35.0, Color::RED);
        data.push_vertex(35.0, 5.0, Color::RED);
        backend.draw(&data);

        assert_eq!(backend.pixel(10, 10).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn hairline_hits_endpoints() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(40, 40), None).unwrap();
        backend.clear(Color::BLACK);

        let mut data = VertexData::new(GeometryTopology::LineList);
        data.push_segment(2.0, 2.0, 30.0, 20.0, Color::GREEN);
        backend.draw(&data);

        assert_eq!(backend.pixel(2, 2).unwrap(), [0, 255, 0, 255]);
        assert_eq!(backend.pixel(30, 20).unwrap(), [0, 255, 0, 255]);
    }

    #[test]
    fn end_to_end_line_chart_paints_pixels_and_presents() {
        let presented = Arc::new(AtomicUsize::new(0));
        let presented_clone = presented.clone();
        let presenter: FramePresenter = Box::new(move |frame, size| {
            assert_eq!(frame.len(), (size.width * size.height * 4) as usize);
            presented_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(100, 80), Some(presenter)).unwrap();

        let series = [Series::new(
            "s",
            vec![
                PointXY::new(0.0, 0.0),
                PointXY::new(5.0, 8.0),
                PointXY::new(10.0, 2.0),
            ],
            Color::RED,
        )
        .with_stroke_width(3.0)];
        let ticks = [0.0, 5.0, 10.0];
        backend.render(&line_props(&series, &ticks)).unwrap();

        assert_eq!(presented.load(Ordering::SeqCst), 1);
        let non_background = backend
            .frame_rgba8()
            .chunks_exact(4)
            .filter(|px| px[0] > 0 || px[1] > 0 || px[2] > 0)
            .count();
        assert!(non_background > 0, "expected painted pixels");
    }

    #[test]
    fn degenerate_domain_renders_without_nan_panics() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(50, 50), None).unwrap();
        let series = [Series::new(
            "s",
            vec![PointXY::new(5.0, 5.0), PointXY::new(5.0, 5.0)],
            Color::RED,
        )];
        let props = RenderProps {
            x_domain: [5.0, 5.0],
            y_domain: [5.0, 5.0],
            ..line_props(&series, &[])
        };
        backend.render(&props).unwrap();
    }

    #[test]
    fn destroy_is_idempotent_and_render_after_destroy_is_a_noop() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(10, 10), None).unwrap();
        backend.destroy();
        backend.destroy();

        let series = [];
        backend.render(&line_props(&series, &[])).unwrap();
        assert!(backend.frame_rgba8().is_empty());
    }

    #[test]
    fn resize_reallocates_the_framebuffer() {
        let mut backend =
            RasterBackend::new(ChartKind::Line, Size::new(10, 10), None).unwrap();
        backend.resize(Size::new(20, 30));
        assert_eq!(backend.frame_rgba8().len(), 20 * 30 * 4);
        // Zero sizes are ignored.
        backend.resize(Size::new(0, 5));
        assert_eq!(backend.size(), Size::new(20, 30));
    }

    #[test]
    fn zero_size_target_is_rejected() {
        assert!(RasterBackend::new(ChartKind::Line, Size::new(0, 10), None).is_err());
    }
}

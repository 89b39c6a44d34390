//! Grid and border geometry, independent of series data.

use super::{GeometryTopology, VertexData};
use crate::color::Color;
use crate::transform::ChartScales;
use helio_core::geometry::Rect;

/// Build triangle-list geometry for grid lines: one `line_px`-wide quad per
/// tick, spanning the plot area. Vertical quads for x ticks, horizontal for
/// y ticks. Shared by every chart family.
pub fn build_grid(
    x_ticks: &[f64],
    y_ticks: &[f64],
    scales: &ChartScales,
    color: Color,
    line_px: f32,
) -> VertexData {
    let mut out = VertexData::with_capacity(
        GeometryTopology::TriangleList,
        (x_ticks.len() + y_ticks.len()) * 6,
    );
    let half = line_px * 0.5;
    let area = scales.area;

    for &tick in x_ticks {
        let x = scales.screen_x(tick);
        out.push_rect(x - half, area.y, x + half, area.bottom(), color);
    }
    for &tick in y_ticks {
        let y = scales.screen_y(tick);
        out.push_rect(area.x, y - half, area.right(), y + half, color);
    }

    out
}

/// Build the plot-area outline as line-list hairline segments.
pub fn build_border(area: Rect<f32>, color: Color) -> VertexData {
    let mut out = VertexData::with_capacity(GeometryTopology::LineList, 8);
    let (left, top) = (area.x, area.y);
    let (right, bottom) = (area.right(), area.bottom());

    out.push_segment(left, top, right, top, color);
    out.push_segment(right, top, right, bottom, color);
    out.push_segment(right, bottom, left, bottom, color);
    out.push_segment(left, bottom, left, top, color);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Margin;
    use helio_core::geometry::Size;

    fn scales() -> ChartScales {
        ChartScales::new(
            Size::new(200.0, 100.0),
            Margin::uniform(10.0),
            [0.0, 10.0],
            [0.0, 10.0],
        )
    }

    #[test]
    fn six_vertices_per_tick() {
        let data = build_grid(&[0.0, 5.0, 10.0], &[0.0, 10.0], &scales(), Color::BLACK, 1.0);
        assert_eq!(data.vertex_count(), 5 * 6);
        assert_eq!(data.topology(), GeometryTopology::TriangleList);
    }

    #[test]
    fn grid_lines_span_the_plot_area() {
        let scales = scales();
        let data = build_grid(&[5.0], &[], &scales, Color::BLACK, 2.0);
        let ys: Vec<f32> = data.positions().iter().skip(1).step_by(2).copied().collect();
        assert!(ys.contains(&scales.area.y));
        assert!(ys.contains(&scales.area.bottom()));
    }

    #[test]
    fn border_is_a_line_list_loop() {
        let data = build_border(Rect::new(10.0, 10.0, 180.0, 80.0), Color::BLACK);
        assert_eq!(data.topology(), GeometryTopology::LineList);
        assert_eq!(data.vertex_count(), 8);
    }

    #[test]
    fn empty_ticks_build_nothing() {
        let data = build_grid(&[], &[], &scales(), Color::BLACK, 1.0);
        assert!(data.is_empty());
    }
}

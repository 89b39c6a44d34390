//! Line series geometry: one screen-space quad per segment.

use super::{GeometryTopology, VertexData};
use crate::color::Color;
use crate::series::PointXY;
use crate::transform::ChartScales;
use glam::Vec2;

/// Segments shorter than this are treated as degenerate and given a
/// horizontal direction so zero-length input never produces NaN normals.
const MIN_SEGMENT_LENGTH: f32 = 1e-4;

/// Build triangle-list geometry for a polyline.
///
/// For each adjacent point pair a quad (two triangles, six vertices) is
/// emitted, expanded along the segment normal by `stroke_px / 2`. Both
/// triangles of a segment share the same normal magnitude, so consecutive
/// segments join without gaps but are not mitered; bevel artifacts at sharp
/// turns are accepted.
///
/// `stroke_px` is in physical pixels. Output is exactly `6 * (n - 1)`
/// vertices for `n >= 2` input points, empty otherwise.
pub fn build_line_series(
    points: &[PointXY],
    color: Color,
    stroke_px: f32,
    scales: &ChartScales,
) -> VertexData {
    let mut out = VertexData::with_capacity(
        GeometryTopology::TriangleList,
        points.len().saturating_sub(1) * 6,
    );
    if points.len() < 2 {
        return out;
    }

    let half = stroke_px.max(0.0) * 0.5;

    for pair in points.windows(2) {
        let p0 = Vec2::new(scales.screen_x(pair[0].x), scales.screen_y(pair[0].y));
        let p1 = Vec2::new(scales.screen_x(pair[1].x), scales.screen_y(pair[1].y));

        let delta = p1 - p0;
        let length = delta.length();
        let dir = if length < MIN_SEGMENT_LENGTH {
            Vec2::X
        } else {
            delta / length
        };
        let normal = Vec2::new(-dir.y, dir.x) * half;

        let a = p0 + normal;
        let b = p1 + normal;
        let c = p1 - normal;
        let d = p0 - normal;

        out.push_vertex(a.x, a.y, color);
        out.push_vertex(b.x, b.y, color);
        out.push_vertex(c.x, c.y, color);
        out.push_vertex(a.x, a.y, color);
        out.push_vertex(c.x, c.y, color);
        out.push_vertex(d.x, d.y, color);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Margin;
    use helio_core::geometry::Size;

    fn scales(x_domain: [f64; 2], y_domain: [f64; 2]) -> ChartScales {
        ChartScales::new(
            Size::new(800.0, 600.0),
            Margin::uniform(0.0),
            x_domain,
            y_domain,
        )
    }

    fn points(n: usize) -> Vec<PointXY> {
        (0..n)
            .map(|i| PointXY::new(i as f64, (i as f64).sin()))
            .collect()
    }

    #[test]
    fn vertex_count_is_six_per_segment() {
        let scales = scales([0.0, 10.0], [-1.0, 1.0]);
        for n in [2usize, 3, 7, 100] {
            let data = build_line_series(&points(n), Color::RED, 2.0, &scales);
            assert_eq!(data.positions().len(), 12 * (n - 1));
            assert_eq!(data.vertex_count(), 6 * (n - 1));
            assert_eq!(data.colors().len(), 24 * (n - 1));
        }
    }

    #[test]
    fn fewer_than_two_points_yields_nothing() {
        let scales = scales([0.0, 10.0], [-1.0, 1.0]);
        assert!(build_line_series(&[], Color::RED, 2.0, &scales).is_empty());
        assert!(
            build_line_series(&[PointXY::new(1.0, 1.0)], Color::RED, 2.0, &scales).is_empty()
        );
    }

    #[test]
    fn quad_expands_by_half_stroke() {
        // Horizontal segment: the normal is vertical, so the quad's y extent
        // is exactly the stroke width.
        let scales = scales([0.0, 1.0], [0.0, 1.0]);
        let pts = [PointXY::new(0.0, 0.5), PointXY::new(1.0, 0.5)];
        let data = build_line_series(&pts, Color::RED, 8.0, &scales);

        let ys: Vec<f32> = data.positions().iter().skip(1).step_by(2).copied().collect();
        let min = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((max - min - 8.0).abs() < 1e-3);
    }

    #[test]
    fn duplicate_points_do_not_produce_nan() {
        let scales = scales([0.0, 10.0], [0.0, 1.0]);
        let pts = [PointXY::new(5.0, 0.5), PointXY::new(5.0, 0.5)];
        let data = build_line_series(&pts, Color::RED, 2.0, &scales);
        assert_eq!(data.vertex_count(), 6);
        assert!(!data.has_non_finite());
    }

    #[test]
    fn degenerate_domain_produces_finite_output() {
        let scales = scales([5.0, 5.0], [5.0, 5.0]);
        let data = build_line_series(&points(4), Color::RED, 2.0, &scales);
        assert!(!data.has_non_finite());
    }
}

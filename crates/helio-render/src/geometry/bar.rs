//! Bar series geometry: one normalized quad per category.

use super::{GeometryTopology, VertexData};
use crate::color::Color;
use crate::series::{Orientation, PointXY};
use crate::transform::ChartScales;

/// Build triangle-list geometry for a bar series.
///
/// `point.x` is the category coordinate and `point.y` the value. With
/// multiple series the category band is split into `series_count` grouped
/// bars of width `band_px / series_count`, offset by
/// `series_index * effective_width` from the band's left edge. Each bar spans
/// from the baseline to the value; the rectangle corners are normalized, so
/// bars below the baseline (negative values) are never inverted.
///
/// In [`Orientation::Horizontal`] the category still comes from `point.x` but
/// is mapped on the y axis, and the value extends along x.
#[allow(clippy::too_many_arguments)]
pub fn build_bar_series(
    points: &[PointXY],
    color: Color,
    series_index: usize,
    series_count: usize,
    band_px: f32,
    baseline: f64,
    orientation: Orientation,
    scales: &ChartScales,
) -> VertexData {
    let mut out = VertexData::with_capacity(GeometryTopology::TriangleList, points.len() * 6);

    let series_count = series_count.max(1);
    let effective = band_px / series_count as f32;
    let group_offset = series_index as f32 * effective;

    for point in points {
        match orientation {
            Orientation::Vertical => {
                let center = scales.screen_x(point.x);
                let left = center - band_px * 0.5 + group_offset;
                let value = scales.screen_y(point.y);
                let base = scales.screen_y(baseline);
                out.push_rect(left, base, left + effective, value, color);
            }
            Orientation::Horizontal => {
                let center = scales.screen_y(point.x);
                let top = center - band_px * 0.5 + group_offset;
                let value = scales.screen_x(point.y);
                let base = scales.screen_x(baseline);
                out.push_rect(base, top, value, top + effective, color);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Margin;
    use helio_core::geometry::Size;

    fn scales() -> ChartScales {
        ChartScales::new(
            Size::new(100.0, 100.0),
            Margin::uniform(0.0),
            [0.0, 10.0],
            [-5.0, 5.0],
        )
    }

    #[test]
    fn one_quad_per_category() {
        let pts = [
            PointXY::new(1.0, 2.0),
            PointXY::new(2.0, 3.0),
            PointXY::new(3.0, 1.0),
        ];
        let data = build_bar_series(
            &pts,
            Color::RED,
            0,
            1,
            8.0,
            0.0,
            Orientation::Vertical,
            &scales(),
        );
        assert_eq!(data.vertex_count(), 18);
    }

    #[test]
    fn grouped_bars_split_the_band() {
        let scales = scales();
        let pts = [PointXY::new(5.0, 2.0)];
        let band = 9.0;

        let first = build_bar_series(
            &pts,
            Color::RED,
            0,
            3,
            band,
            0.0,
            Orientation::Vertical,
            &scales,
        );
        let second = build_bar_series(
            &pts,
            Color::BLUE,
            1,
            3,
            band,
            0.0,
            Orientation::Vertical,
            &scales,
        );

        let width_of = |data: &VertexData| {
            let xs: Vec<f32> = data.positions().iter().step_by(2).copied().collect();
            let min = xs.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            (min, max - min)
        };

        let (first_left, first_width) = width_of(&first);
        let (second_left, second_width) = width_of(&second);
        assert!((first_width - 3.0).abs() < 1e-4);
        assert!((second_width - 3.0).abs() < 1e-4);
        // Second series sits one effective width to the right of the first.
        assert!((second_left - first_left - 3.0).abs() < 1e-4);
    }

    #[test]
    fn negative_values_never_invert_the_rect() {
        let scales = scales();
        let pts = [PointXY::new(5.0, -3.0)];
        let data = build_bar_series(
            &pts,
            Color::RED,
            0,
            1,
            8.0,
            0.0,
            Orientation::Vertical,
            &scales,
        );

        let ys: Vec<f32> = data.positions().iter().skip(1).step_by(2).copied().collect();
        let top = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let bottom = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        // Baseline (data 0) maps above the value (data -3) on screen; the
        // quad spans between them top-to-bottom without crossing.
        assert_eq!(top, scales.screen_y(0.0));
        assert_eq!(bottom, scales.screen_y(-3.0));
        assert!(top < bottom);
    }

    #[test]
    fn horizontal_bars_extend_along_x() {
        let scales = scales();
        let pts = [PointXY::new(5.0, 4.0)];
        let data = build_bar_series(
            &pts,
            Color::RED,
            0,
            1,
            8.0,
            0.0,
            Orientation::Horizontal,
            &scales,
        );
        let xs: Vec<f32> = data.positions().iter().step_by(2).copied().collect();
        let min = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(min, scales.screen_x(0.0));
        assert_eq!(max, scales.screen_x(4.0));
    }
}

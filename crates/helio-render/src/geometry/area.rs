//! Filled-area series geometry, with optional stacking.

use super::{GeometryTopology, VertexData};
use crate::color::Color;
use crate::series::PointXY;
use crate::transform::ChartScales;
use ahash::AHashMap;

/// Cumulative stack tops carried across series within one frame.
///
/// Lookup is keyed by the exact bit pattern of the x value
/// (`f64::to_bits`), so stacking requires series to share identical x
/// values; near-duplicate x values (e.g. `0.1 + 0.2` vs `0.3`) land in
/// separate keys. This mirrors the exact-equality contract of the data
/// sources this engine is built for.
#[derive(Debug, Default)]
pub struct StackState {
    tops: AHashMap<u64, f64>,
}

impl StackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative top at `x`, if any earlier series covered it.
    pub fn top(&self, x: f64) -> Option<f64> {
        self.tops.get(&x.to_bits()).copied()
    }

    fn record(&mut self, x: f64, top: f64) {
        self.tops.insert(x.to_bits(), top);
    }
}

/// Build triangle-list geometry for a filled area between the series values
/// and a baseline.
///
/// Per adjacent point pair one quad is emitted, bounded above by the two data
/// y values and below by the baseline. With `stack` supplied, each point's
/// baseline is the previous series' cumulative top at the same x (falling
/// back to `baseline` where no earlier series had a point there), and this
/// series' tops are recorded for the next one.
pub fn build_area_series(
    points: &[PointXY],
    fill: Color,
    baseline: f64,
    stack: Option<&mut StackState>,
    scales: &ChartScales,
) -> VertexData {
    let mut out = VertexData::with_capacity(
        GeometryTopology::TriangleList,
        points.len().saturating_sub(1) * 6,
    );

    // Resolve per-point base/top in data space first; with stacking this must
    // happen before recording so a series never reads its own tops.
    let resolved: Vec<(f64, f64, f64)> = match &stack {
        Some(state) => points
            .iter()
            .map(|p| {
                let base = state.top(p.x).unwrap_or(baseline);
                (p.x, base, base + p.y)
            })
            .collect(),
        None => points.iter().map(|p| (p.x, baseline, p.y)).collect(),
    };

    if let Some(state) = stack {
        for &(x, _, top) in &resolved {
            state.record(x, top);
        }
    }

    if resolved.len() < 2 {
        return out;
    }

    for pair in resolved.windows(2) {
        let (x0, base0, top0) = pair[0];
        let (x1, base1, top1) = pair[1];

        let sx0 = scales.screen_x(x0);
        let sx1 = scales.screen_x(x1);
        let st0 = scales.screen_y(top0);
        let st1 = scales.screen_y(top1);
        let sb0 = scales.screen_y(base0);
        let sb1 = scales.screen_y(base1);

        out.push_vertex(sx0, st0, fill);
        out.push_vertex(sx1, st1, fill);
        out.push_vertex(sx1, sb1, fill);
        out.push_vertex(sx0, st0, fill);
        out.push_vertex(sx1, sb1, fill);
        out.push_vertex(sx0, sb0, fill);
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
            [0.0, 1.0],
            [0.0, 4.0],
        )
    }

    #[test]
    fn quad_per_segment() {
        let pts = [
            PointXY::new(0.0, 1.0),
            PointXY::new(0.5, 2.0),
            PointXY::new(1.0, 1.5),
        ];
        let data = build_area_series(&pts, Color::BLUE, 0.0, None, &scales());
        assert_eq!(data.vertex_count(), 12);
        assert!(!data.has_non_finite());
    }

    #[test]
    fn stacked_baseline_is_previous_series_top() {
        let scales = scales();
        let mut stack = StackState::new();

        let a = [PointXY::new(0.0, 1.0), PointXY::new(1.0, 2.0)];
        let b = [PointXY::new(0.0, 1.0), PointXY::new(1.0, 1.0)];

        build_area_series(&a, Color::RED, 0.0, Some(&mut stack), &scales);
        // After A, the cumulative top at x=0 is A's value there.
        assert_eq!(stack.top(0.0), Some(1.0));

        let data = build_area_series(&b, Color::BLUE, 0.0, Some(&mut stack), &scales);
        // B sits on top of A: base 1, top 2 at x=0.
        assert_eq!(stack.top(0.0), Some(2.0));
        assert_eq!(stack.top(1.0), Some(3.0));

        // First vertex is B's top at x=0 => data y of 2.0.
        let positions = data.positions();
        assert_eq!(positions[0], scales.screen_x(0.0));
        assert_eq!(positions[1], scales.screen_y(2.0));
        // Last vertex is B's base at x=0 => data y of 1.0 (A's top).
        let n = positions.len();
        assert_eq!(positions[n - 1], scales.screen_y(1.0));
    }

    #[test]
    fn stacked_series_with_unmatched_x_falls_back_to_baseline() {
        let scales = scales();
        let mut stack = StackState::new();

        let a = [PointXY::new(0.0, 1.0), PointXY::new(1.0, 1.0)];
        build_area_series(&a, Color::RED, 0.0, Some(&mut stack), &scales);

        // x=0.5 was never covered by A, so B falls back to the fixed baseline.
        let b = [PointXY::new(0.5, 1.0), PointXY::new(1.0, 1.0)];
        build_area_series(&b, Color::BLUE, 0.0, Some(&mut stack), &scales);
        assert_eq!(stack.top(0.5), Some(1.0));
        assert_eq!(stack.top(1.0), Some(2.0));
    }

    #[test]
    fn series_crossing_baseline_stays_finite() {
        let pts = [PointXY::new(0.0, 2.0), PointXY::new(1.0, -1.0)];
        let data = build_area_series(&pts, Color::BLUE, 0.0, None, &scales());
        assert_eq!(data.vertex_count(), 6);
        assert!(!data.has_non_finite());
    }

    #[test]
    fn single_point_emits_nothing_but_still_records_top() {
        let mut stack = StackState::new();
        let pts = [PointXY::new(0.25, 3.0)];
        let data = build_area_series(&pts, Color::BLUE, 0.0, Some(&mut stack), &scales());
        assert!(data.is_empty());
        assert_eq!(stack.top(0.25), Some(3.0));
    }
}

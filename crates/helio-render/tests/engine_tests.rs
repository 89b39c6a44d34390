//! End-to-end engine tests on the raster tier, plus public-API pool tests
//! against the mock GPU context. No physical GPU is required.

use helio_core::geometry::{ScaleFactor, Size};
use helio_render::backend::{ChartBackend, RasterBackend};
use helio_render::geometry::{self, ChartKind};
use helio_render::transform::ChartScales;
use helio_render::{
    BackendKind, BackendPreference, ChartEngine, ChartStyle, Color, EngineDescriptor, Margin,
    PointXY, RenderProps, SeriesBufferPool, Series, SlotSizes,
};
use helio_test_utils::MockRenderContext;

fn base_style() -> ChartStyle {
    ChartStyle {
        background: Color::WHITE,
        ..Default::default()
    }
}

#[test]
fn line_chart_with_dpr_paints_grid_at_scaled_margin() {
    // Physical 200x160 target at DPR 2: a logical 10px margin becomes 20
    // physical pixels, so the plot area spans x in 20..180 and the x=5 grid
    // line sits at physical x=100.
    let mut backend = RasterBackend::new(ChartKind::Line, Size::new(200, 160), None).unwrap();

    let series = [Series::new(
        "s",
        vec![PointXY::new(2.0, 3.0), PointXY::new(8.0, 7.0)],
        Color::RED,
    )
    .with_stroke_width(2.0)];
    let props = RenderProps {
        series: &series,
        x_domain: [0.0, 10.0],
        y_domain: [0.0, 10.0],
        x_ticks: &[0.0, 5.0, 10.0],
        y_ticks: &[],
        size: Size::new(200, 160),
        margin: Margin::uniform(10.0),
        scale_factor: ScaleFactor(2.0),
        style: base_style(),
    };
    backend.render(&props).unwrap();

    let grid_rgba = props.style.grid_color.to_rgba_u8();
    assert_eq!(backend.pixel(100, 30).unwrap(), grid_rgba);

    // The polyline painted something that is neither background nor grid.
    let line_pixels = backend
        .frame_rgba8()
        .chunks_exact(4)
        .filter(|px| px[0] == 255 && px[1] == 0 && px[2] == 0)
        .count();
    assert!(line_pixels > 0, "expected red line pixels");
}

#[test]
fn bar_chart_fills_the_expected_region() {
    let mut backend = RasterBackend::new(ChartKind::Bar, Size::new(100, 100), None).unwrap();

    let series = [Series::new("bars", vec![PointXY::new(5.0, 8.0)], Color::BLUE)];
    let props = RenderProps {
        series: &series,
        x_domain: [0.0, 10.0],
        y_domain: [0.0, 10.0],
        x_ticks: &[],
        y_ticks: &[],
        size: Size::new(100, 100),
        margin: Margin::default(),
        scale_factor: ScaleFactor::IDENTITY,
        style: ChartStyle {
            show_grid: false,
            ..base_style()
        },
    };
    backend.render(&props).unwrap();

    // Bar center: category 5 maps to x=50, the bar spans data y in 0..=8.
    assert_eq!(backend.pixel(50, 60).unwrap(), Color::BLUE.to_rgba_u8());
    // Above the bar top (data y > 8) it is still background.
    assert_eq!(backend.pixel(50, 10).unwrap(), Color::WHITE.to_rgba_u8());
}

#[test]
fn stacked_area_geometry_is_deterministic() {
    let size = Size::new(100u32, 100u32);
    let margin = Margin::default();
    let a = Series::new(
        "a",
        vec![PointXY::new(0.0, 1.0), PointXY::new(1.0, 2.0)],
        Color::RED,
    );
    let b = Series::new(
        "b",
        vec![PointXY::new(0.0, 1.0), PointXY::new(1.0, 1.0)],
        Color::BLUE,
    );
    let series = [a, b];
    let props = RenderProps {
        series: &series,
        x_domain: [0.0, 1.0],
        y_domain: [0.0, 4.0],
        x_ticks: &[],
        y_ticks: &[],
        size,
        margin,
        scale_factor: ScaleFactor::IDENTITY,
        style: ChartStyle {
            stacked: true,
            show_grid: false,
            ..base_style()
        },
    };

    let scales = ChartScales::new(size.as_f32(), margin, props.x_domain, props.y_domain);
    let frame = geometry::build_frame(ChartKind::Area, &props, &scales);

    // B's baseline at x=0 is A's value there (1.0), so B's rendered top at
    // x=0 sits at data y = 2.0.
    let positions = frame.series[1].positions();
    assert_eq!(positions[0], scales.screen_x(0.0));
    assert_eq!(positions[1], scales.screen_y(2.0));
}

#[test]
fn engine_survives_destroy_and_renders_nothing_after() {
    let mut engine = ChartEngine::new(
        EngineDescriptor::new(ChartKind::Line, Size::new(64, 64))
            .backend_preference(BackendPreference::RasterOnly),
    )
    .unwrap();
    assert_eq!(engine.backend_kind(), Some(BackendKind::Raster));

    let series = [Series::new(
        "s",
        vec![PointXY::new(0.0, 0.0), PointXY::new(1.0, 1.0)],
        Color::RED,
    )];
    let props = RenderProps {
        series: &series,
        x_domain: [0.0, 1.0],
        y_domain: [0.0, 1.0],
        x_ticks: &[],
        y_ticks: &[],
        size: Size::new(64, 64),
        margin: Margin::default(),
        scale_factor: ScaleFactor::IDENTITY,
        style: base_style(),
    };

    engine.render(&props).unwrap();
    engine.destroy();
    engine.destroy();
    // Frames after destroy are dropped, not errors.
    engine.render(&props).unwrap();
    assert_eq!(engine.backend_kind(), None);
}

#[test]
fn pool_shrinks_when_series_count_drops() {
    let mock = MockRenderContext::new();
    let mut pool = SeriesBufferPool::new();

    let mut data = helio_render::VertexData::new(helio_render::GeometryTopology::TriangleList);
    for i in 0..30 {
        data.push_vertex(i as f32, i as f32, Color::RED);
    }

    // Frame 1: three series.
    for slot in 0..3 {
        pool.upload(&mock, slot, &data);
    }
    pool.trim(&mock, 3);
    assert_eq!(pool.len(), 3);

    // Frame 2: one series; exactly the two stale slots are destroyed.
    pool.upload(&mock, 0, &data);
    pool.trim(&mock, 1);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.stats().destroyed, 2);
}

#[test]
fn pool_round_trip_has_no_churn_through_the_public_api() {
    let mock = MockRenderContext::new();
    let mut pool = SeriesBufferPool::new();

    let mut data = helio_render::VertexData::new(helio_render::GeometryTopology::TriangleList);
    for i in 0..12 {
        data.push_vertex(i as f32, 0.0, Color::RED);
    }
    let required = SlotSizes::of(&data);

    pool.upload(&mock, 0, &data);
    pool.upload(&mock, 0, &data);

    assert_eq!(mock.count_buffer_creates(), 2);
    assert_eq!(mock.count_buffer_destroys(), 0);
    assert_eq!(*pool.get(0).unwrap().capacity(), required);
}

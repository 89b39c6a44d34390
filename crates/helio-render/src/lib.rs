//! Helio rendering engine: GPU-accelerated 2D charts.
//!
//! Given numeric series, domains, and a render target, the engine draws
//! lines, filled areas, bars, and grids at interactive frame rates. Two
//! backend tiers implement one contract and are negotiated automatically:
//! a wgpu device backend, and a software rasterizer that works everywhere.
//!
//! # Quick start
//!
//! ```no_run
//! use helio_core::geometry::{ScaleFactor, Size};
//! use helio_render::{
//!     ChartEngine, ChartKind, ChartStyle, Color, EngineDescriptor, Margin, PointXY, RenderProps,
//!     Series,
//! };
//!
//! let mut engine = ChartEngine::new(EngineDescriptor::new(
//!     ChartKind::Line,
//!     Size::new(800, 600),
//! ))?;
//!
//! let series = [Series::new(
//!     "revenue",
//!     vec![PointXY::new(0.0, 1.0), PointXY::new(1.0, 3.0)],
//!     Color::from_hex(0x2563EB),
//! )];
//!
//! engine.render(&RenderProps {
//!     series: &series,
//!     x_domain: [0.0, 1.0],
//!     y_domain: [0.0, 4.0],
//!     x_ticks: &[0.0, 0.5, 1.0],
//!     y_ticks: &[0.0, 2.0, 4.0],
//!     size: Size::new(800, 600),
//!     margin: Margin::new(16.0, 16.0, 32.0, 48.0),
//!     scale_factor: ScaleFactor(1.0),
//!     style: ChartStyle::default(),
//! })?;
//!
//! engine.destroy();
//! # Ok::<(), helio_render::RenderError>(())
//! ```
//!
//! # Architecture
//!
//! - [`context`]: device acquisition and the process-wide device cache
//! - [`transform`]: data domain → pixel space → clip space
//! - [`geometry`]: pure vertex builders per chart family
//! - [`buffer_pool`]: persistent per-series GPU buffer reuse
//! - [`backend`]: the two tiers behind one [`backend::ChartBackend`] contract
//! - [`scheduler`]: in-flight guard, visibility gating, resize latching
//! - [`engine`]: the caller-facing façade tying it together

pub mod backend;
pub mod buffer_pool;
pub mod color;
pub mod context;
pub mod engine;
pub mod error;
pub mod features;
pub mod geometry;
pub mod scheduler;
pub mod series;
pub mod transform;
pub mod viewport;

pub use backend::{BackendKind, ChartBackend, FramePresenter, RasterBackend};
pub use buffer_pool::{GridBufferStore, PoolStats, SeriesBufferPool, SlotSizes};
pub use color::Color;
pub use context::{GraphicsContext, GraphicsContextDescriptor};
pub use engine::{BackendPreference, ChartEngine, EngineDescriptor, EngineState};
pub use error::RenderError;
pub use features::GpuFeatures;
pub use geometry::{ChartKind, GeometryTopology, VertexData};
pub use scheduler::FrameScheduler;
pub use series::{ChartStyle, Margin, Orientation, PointXY, RenderProps, Series};
pub use transform::{ChartScales, LinearScale, TransformUniform};
pub use viewport::Viewport;

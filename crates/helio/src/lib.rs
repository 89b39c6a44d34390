//! Helio - a GPU-accelerated 2D chart rendering toolkit.
//!
//! Helio turns numeric series and a viewport into real-time chart output
//! (lines, filled areas, bars, grids) with automatic negotiation between a
//! wgpu backend and a software raster fallback.
//!
//! This crate re-exports the public API of the engine crates; most users only
//! need the [`prelude`].
//!
//! ```no_run
//! use helio::prelude::*;
//!
//! let engine = ChartEngine::new(EngineDescriptor::new(
//!     ChartKind::Area,
//!     Size::new(640, 480),
//! ));
//! ```

pub use helio_core as core;
pub use helio_render as render;

/// The commonly used types, in one import.
pub mod prelude {
    pub use helio_core::geometry::{Pos, Rect, ScaleFactor, Size};
    pub use helio_render::{
        BackendKind, BackendPreference, ChartEngine, ChartKind, ChartStyle, Color,
        EngineDescriptor, EngineState, GraphicsContext, GraphicsContextDescriptor, Margin,
        Orientation, PointXY, RenderError, RenderProps, Series, Viewport,
    };
}

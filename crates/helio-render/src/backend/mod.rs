//! Backend tiers and the negotiation that picks one.
//!
//! Both tiers implement the same [`ChartBackend`] contract; callers are
//! backend-agnostic after negotiation. The GPU tier is preferred; the raster
//! tier is the universally-available fallback.

pub mod gpu;
pub mod raster;

pub use gpu::{GpuBackend, GpuTargetDescriptor};
pub use raster::{FramePresenter, RasterBackend};

use crate::error::RenderError;
use crate::series::RenderProps;
use helio_core::geometry::Size;

/// Which backend tier a renderer runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// wgpu device rendering (Backend-A): encoder/pass submission model,
    /// compute-capable, completes at submission.
    Gpu,
    /// Software rasterizer (Backend-B): immediate synchronous drawing into an
    /// RGBA8 framebuffer.
    Raster,
}

/// The contract every backend tier implements.
///
/// `render` completes when commands are *submitted*, not when pixels are
/// presented; callers must not assume either tier blocks until the frame is
/// visible. `destroy` is idempotent and reachable from any state.
pub trait ChartBackend {
    fn kind(&self) -> BackendKind;

    /// Draw one frame from the given props.
    fn render(&mut self, props: &RenderProps<'_>) -> Result<(), RenderError>;

    /// Reconfigure the render target for a new physical size.
    fn resize(&mut self, size: Size<u32>);

    /// Release every GPU resource this backend created. Idempotent.
    fn destroy(&mut self);
}

/// A deferred backend constructor, one per tier.
pub type TierConstructor = Box<dyn FnOnce() -> Result<Box<dyn ChartBackend>, RenderError>>;

/// Try each tier in priority order and return the first that initializes.
///
/// A tier failure (device unavailable, missing feature, shader compile error)
/// is logged and the next tier is attempted; only exhaustion of every tier is
/// surfaced to the caller, carrying the last tier's error.
pub fn negotiate(
    tiers: Vec<(BackendKind, TierConstructor)>,
) -> Result<Box<dyn ChartBackend>, RenderError> {
    let mut last_error = RenderError::BackendUnavailable("no backend tiers configured".into());

    for (kind, constructor) in tiers {
        match constructor() {
            Ok(backend) => {
                tracing::info!("Initialized {:?} backend", kind);
                return Ok(backend);
            }
            Err(error) => {
                tracing::warn!("{:?} backend failed to initialize: {}", kind, error);
                last_error = error;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Counters {
        init: Cell<usize>,
        render: Cell<usize>,
    }

    struct CountingBackend {
        kind: BackendKind,
        counters: Rc<Counters>,
    }

    impl ChartBackend for CountingBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn render(&mut self, _props: &RenderProps<'_>) -> Result<(), RenderError> {
            self.counters.render.set(self.counters.render.get() + 1);
            Ok(())
        }

        fn resize(&mut self, _size: Size<u32>) {}

        fn destroy(&mut self) {}
    }

    fn failing_tier(counters: Rc<Counters>) -> TierConstructor {
        Box::new(move || {
            counters.init.set(counters.init.get() + 1);
            Err(RenderError::BackendUnavailable("simulated".into()))
        })
    }

    fn succeeding_tier(kind: BackendKind, counters: Rc<Counters>) -> TierConstructor {
        Box::new(move || {
            counters.init.set(counters.init.get() + 1);
            Ok(Box::new(CountingBackend {
                kind,
                counters: counters.clone(),
            }) as Box<dyn ChartBackend>)
        })
    }

    #[test]
    fn first_tier_wins_when_it_initializes() {
        let a = Rc::new(Counters::default());
        let b = Rc::new(Counters::default());
        let backend = negotiate(vec![
            (BackendKind::Gpu, succeeding_tier(BackendKind::Gpu, a.clone())),
            (
                BackendKind::Raster,
                succeeding_tier(BackendKind::Raster, b.clone()),
            ),
        ])
        .unwrap();
        assert_eq!(backend.kind(), BackendKind::Gpu);
        assert_eq!(a.init.get(), 1);
        // The fallback tier is never constructed.
        assert_eq!(b.init.get(), 0);
    }

    #[test]
    fn failing_first_tier_falls_back_exactly_once() {
        let a = Rc::new(Counters::default());
        let b = Rc::new(Counters::default());
        let mut backend = negotiate(vec![
            (BackendKind::Gpu, failing_tier(a.clone())),
            (
                BackendKind::Raster,
                succeeding_tier(BackendKind::Raster, b.clone()),
            ),
        ])
        .unwrap();

        assert_eq!(backend.kind(), BackendKind::Raster);
        assert_eq!(a.init.get(), 1);
        assert_eq!(b.init.get(), 1);

        // Rendering goes to the fallback; the failed tier never renders.
        let series = [];
        let props = RenderProps {
            series: &series,
            x_domain: [0.0, 1.0],
            y_domain: [0.0, 1.0],
            x_ticks: &[],
            y_ticks: &[],
            size: Size::new(10, 10),
            margin: crate::series::Margin::default(),
            scale_factor: helio_core::geometry::ScaleFactor::IDENTITY,
            style: crate::series::ChartStyle::default(),
        };
        backend.render(&props).unwrap();
        assert_eq!(a.render.get(), 0);
        assert_eq!(b.render.get(), 1);
    }

    #[test]
    fn exhausting_all_tiers_returns_last_error() {
        let a = Rc::new(Counters::default());
        let b = Rc::new(Counters::default());
        let result = negotiate(vec![
            (BackendKind::Gpu, failing_tier(a.clone())),
            (BackendKind::Raster, failing_tier(b.clone())),
        ]);
        assert!(matches!(result, Err(RenderError::BackendUnavailable(_))));
        assert_eq!(a.init.get(), 1);
        assert_eq!(b.init.get(), 1);
    }

    #[test]
    fn empty_tier_list_is_an_error() {
        assert!(negotiate(Vec::new()).is_err());
    }
}

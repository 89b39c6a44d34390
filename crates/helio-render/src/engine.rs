//! The chart engine: backend negotiation, lifecycle state machine, and
//! per-frame scheduling/error policy.
//!
//! One engine is active per render target at a time. The chart family is
//! fixed at construction ([`ChartKind`]); everything else arrives per frame in
//! [`RenderProps`].

use crate::backend::{
    BackendKind, ChartBackend, FramePresenter, GpuBackend, GpuTargetDescriptor, RasterBackend,
    TierConstructor, negotiate,
};
use crate::context::{GraphicsContext, GraphicsContextDescriptor};
use crate::error::RenderError;
use crate::geometry::ChartKind;
use crate::scheduler::FrameScheduler;
use crate::series::RenderProps;
use crate::transform::LinearScale;
use helio_core::geometry::Size;
use helio_core::profiling::profile_function;

/// Which backend tiers to attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// GPU first, software raster as fallback.
    #[default]
    Auto,
    /// GPU only; initialization fails if no device is available.
    GpuOnly,
    /// Software raster only.
    RasterOnly,
}

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Destroyed,
}

/// Configuration for [`ChartEngine::new`].
pub struct EngineDescriptor {
    pub kind: ChartKind,
    /// Initial render-target size in physical pixels.
    pub size: Size<u32>,
    /// Caller-created window surface for the GPU tier. Without one, the GPU
    /// tier renders into an offscreen texture.
    pub surface: Option<wgpu::Surface<'static>>,
    /// Frame delivery for the raster tier.
    pub presenter: Option<FramePresenter>,
    pub preference: BackendPreference,
    /// Device acquisition options for the GPU tier.
    pub context: GraphicsContextDescriptor,
}

impl EngineDescriptor {
    pub fn new(kind: ChartKind, size: Size<u32>) -> Self {
        Self {
            kind,
            size,
            surface: None,
            presenter: None,
            preference: BackendPreference::default(),
            context: GraphicsContextDescriptor::default(),
        }
    }

    pub fn with_surface(mut self, surface: wgpu::Surface<'static>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_presenter(mut self, presenter: FramePresenter) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn backend_preference(mut self, preference: BackendPreference) -> Self {
        self.preference = preference;
        self
    }

    pub fn context(mut self, descriptor: GraphicsContextDescriptor) -> Self {
        self.context = descriptor;
        self
    }
}

/// A chart renderer bound to one render target.
///
/// Lifecycle: `Uninitialized → Initializing → Ready → Destroyed`. Frames
/// arriving outside `Ready` are dropped with a warning, never a panic.
/// [`ChartEngine::destroy`] is idempotent and reachable from any state.
pub struct ChartEngine {
    state: EngineState,
    backend: Option<Box<dyn ChartBackend>>,
    scheduler: FrameScheduler,
    size: Size<u32>,
}

impl ChartEngine {
    /// Negotiate a backend and build a ready engine.
    ///
    /// Tier failures fall through to the next tier; only exhaustion of every
    /// configured tier returns an error.
    pub fn new(descriptor: EngineDescriptor) -> Result<Self, RenderError> {
        let EngineDescriptor {
            kind,
            size,
            surface,
            presenter,
            preference,
            context,
        } = descriptor;

        let gpu_tier = |surface: Option<wgpu::Surface<'static>>| -> TierConstructor {
            Box::new(move || {
                let graphics = GraphicsContext::shared(context)?;
                let target = match surface {
                    Some(surface) => GpuTargetDescriptor::Surface(surface),
                    None => GpuTargetDescriptor::Offscreen,
                };
                Ok(Box::new(GpuBackend::new(graphics, kind, target, size)?)
                    as Box<dyn ChartBackend>)
            })
        };
        let raster_tier = |presenter: Option<FramePresenter>| -> TierConstructor {
            Box::new(move || {
                Ok(Box::new(RasterBackend::new(kind, size, presenter)?) as Box<dyn ChartBackend>)
            })
        };

        let tiers: Vec<(BackendKind, TierConstructor)> = match preference {
            BackendPreference::Auto => vec![
                (BackendKind::Gpu, gpu_tier(surface)),
                (BackendKind::Raster, raster_tier(presenter)),
            ],
            BackendPreference::GpuOnly => vec![(BackendKind::Gpu, gpu_tier(surface))],
            BackendPreference::RasterOnly => {
                vec![(BackendKind::Raster, raster_tier(presenter))]
            }
        };

        let backend = negotiate(tiers)?;

        Ok(Self {
            state: EngineState::Ready,
            backend: Some(backend),
            scheduler: FrameScheduler::new(),
            size,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The tier that won negotiation, while the engine is alive.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|b| b.kind())
    }

    /// External visibility signal; invisible targets skip frames entirely.
    pub fn set_visible(&self, visible: bool) {
        self.scheduler.set_visible(visible);
    }

    /// Record a resize to apply before the next frame.
    pub fn request_resize(&self, size: Size<u32>) {
        self.scheduler.request_resize(size);
    }

    /// Draw one frame.
    ///
    /// Frames are dropped (returning `Ok`) when the engine is not ready, the
    /// target is not visible, or a frame is already in flight. Per-frame
    /// errors are logged and swallowed so rendering continues on the next
    /// trigger; only device loss is surfaced, after which the engine is
    /// destroyed and must be re-created against a fresh surface (the shared
    /// device cache has already been invalidated).
    pub fn render(&mut self, props: &RenderProps<'_>) -> Result<(), RenderError> {
        profile_function!();

        if self.state != EngineState::Ready {
            tracing::warn!(
                "Render called while engine is {:?}; frame dropped",
                self.state
            );
            return Ok(());
        }
        if !self.scheduler.should_render() {
            tracing::trace!("Target not visible; frame skipped");
            return Ok(());
        }
        // Degenerate domains are clamped downstream; non-finite ones are not
        // renderable at all and drop the frame here.
        if let Err(error) = LinearScale::check_domain(props.x_domain)
            .and_then(|()| LinearScale::check_domain(props.y_domain))
        {
            tracing::warn!("Frame dropped: {}", error);
            return Ok(());
        }
        if !self.scheduler.begin_frame() {
            tracing::trace!("Frame already in flight; render call dropped");
            return Ok(());
        }

        // Apply any pending reconfiguration before touching buffers. A size
        // change carried in the props is treated as an implicit resize.
        let mut target_size = self.scheduler.take_resize().unwrap_or(self.size);
        if props.size != target_size {
            target_size = props.size;
        }
        let backend = match self.backend.as_mut() {
            Some(backend) => backend,
            None => {
                self.scheduler.end_frame();
                return Ok(());
            }
        };
        if target_size != self.size {
            backend.resize(target_size);
            self.size = target_size;
        }

        let result = backend.render(props);
        self.scheduler.end_frame();

        match result {
            Ok(()) => Ok(()),
            Err(RenderError::DeviceLost) => {
                tracing::error!("Graphics device lost; engine must be re-created");
                self.destroy();
                Err(RenderError::DeviceLost)
            }
            Err(error) => {
                // Exhaustion, surface hiccups, validation: drop the frame and
                // keep the engine alive for the next trigger.
                tracing::warn!("Frame dropped: {}", error);
                Ok(())
            }
        }
    }

    /// Release every resource owned by the active backend. Idempotent.
    pub fn destroy(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        if let Some(mut backend) = self.backend.take() {
            backend.destroy();
        }
        self.state = EngineState::Destroyed;
    }
}

impl Drop for ChartEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}

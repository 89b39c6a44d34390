//! Graphics device acquisition and the process-wide device cache.

use crate::error::RenderError;
use crate::features::GpuFeatures;
use helio_test_utils::{GpuBuffer, RenderContext};
use std::sync::{Arc, Mutex};

/// The process-wide cached device.
///
/// Guarded by a single mutex: the first caller populates the cache while
/// holding the lock, so concurrent callers block on the same acquisition and
/// then share the resulting device (first writer wins). Acquisition failures
/// are not cached; the next caller retries.
static SHARED_CONTEXT: Mutex<Option<Arc<GraphicsContext>>> = Mutex::new(None);

fn shared_lock() -> std::sync::MutexGuard<'static, Option<Arc<GraphicsContext>>> {
    match SHARED_CONTEXT.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// A graphics context owning the wgpu instance, adapter, device, and queue.
///
/// Contexts are shared via `Arc`; cloning the `Arc` is cheap and dropping the
/// last clone releases the device. Most callers want [`GraphicsContext::shared`],
/// which caches one device per process.
pub struct GraphicsContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// The GPU features that were enabled on this context.
    enabled_features: GpuFeatures,
}

impl GraphicsContext {
    /// Acquire a fresh device with the default descriptor.
    pub async fn acquire() -> Result<Arc<Self>, RenderError> {
        Self::acquire_with(GraphicsContextDescriptor::default()).await
    }

    /// Acquire a fresh device with a custom descriptor.
    ///
    /// Returns [`RenderError::BackendUnavailable`] (never panics) when no
    /// suitable adapter or device exists, so callers can fall back to the
    /// raster tier.
    pub async fn acquire_with(
        descriptor: GraphicsContextDescriptor,
    ) -> Result<Arc<Self>, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: descriptor.backends,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: descriptor.power_preference,
                compatible_surface: None,
                force_fallback_adapter: descriptor.force_fallback_adapter,
            })
            .await
            .map_err(|e| RenderError::BackendUnavailable(format!("no suitable adapter: {e}")))?;

        // Required features must all be present on the adapter.
        let required_result = descriptor.required_gpu_features.check_support(&adapter);
        if let Some(missing) = required_result.missing() {
            return Err(RenderError::BackendUnavailable(format!(
                "required GPU features not supported by adapter {:?}: {:?}",
                adapter.get_info().name,
                missing
            )));
        }

        // Requested features are best-effort.
        let available_requested =
            descriptor.requested_gpu_features & GpuFeatures::from_wgpu(adapter.features());
        let unavailable_requested = descriptor.requested_gpu_features - available_requested;
        if !unavailable_requested.is_empty() {
            tracing::warn!(
                "Some requested GPU features are not available: {:?}",
                unavailable_requested
            );
        }

        let enabled_features = descriptor.required_gpu_features | available_requested;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: enabled_features.to_wgpu(),
                required_limits: descriptor.limits.clone(),
                label: descriptor.label,
                ..Default::default()
            })
            .await
            .map_err(|e| RenderError::BackendUnavailable(format!("device request failed: {e}")))?;

        tracing::info!(
            "Acquired graphics device {:?} with features: {:?}",
            adapter.get_info().name,
            enabled_features
        );

        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
            enabled_features,
        }))
    }

    /// Synchronous wrapper around [`GraphicsContext::acquire_with`].
    pub fn acquire_with_sync(
        descriptor: GraphicsContextDescriptor,
    ) -> Result<Arc<Self>, RenderError> {
        pollster::block_on(Self::acquire_with(descriptor))
    }

    /// Get the process-wide shared device, acquiring it on first use.
    ///
    /// Later callers reuse the cached device regardless of their descriptor;
    /// supplying a new render target never re-requests the device (surfaces
    /// are bound to the cached instance separately).
    pub fn shared(descriptor: GraphicsContextDescriptor) -> Result<Arc<Self>, RenderError> {
        let mut cache = shared_lock();
        if let Some(context) = cache.as_ref() {
            return Ok(context.clone());
        }
        let context = Self::acquire_with_sync(descriptor)?;
        *cache = Some(context.clone());
        Ok(context)
    }

    /// Drop the process-wide cached device.
    ///
    /// Called on unrecoverable device loss; the next [`GraphicsContext::shared`]
    /// call re-acquires instead of reusing a stale handle.
    pub fn invalidate_shared() {
        let mut cache = shared_lock();
        if cache.take().is_some() {
            tracing::warn!("Shared graphics device invalidated; next use re-acquires");
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Get adapter info for diagnostics.
    pub fn info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Get device limits.
    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Get the enabled GPU features (high-level wrapper).
    pub fn gpu_features(&self) -> GpuFeatures {
        self.enabled_features
    }

    /// Check if a specific GPU feature is enabled.
    pub fn has_feature(&self, feature: GpuFeatures) -> bool {
        self.enabled_features.contains(feature)
    }

    /// Maximum size of any single buffer, in bytes.
    #[inline]
    pub fn max_buffer_size(&self) -> u64 {
        self.device.limits().max_buffer_size
    }

    /// Maximum 2D texture dimension.
    #[inline]
    pub fn max_texture_dimension_2d(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

impl RenderContext for GraphicsContext {
    fn create_buffer(&self, desc: &wgpu::BufferDescriptor) -> GpuBuffer {
        GpuBuffer::from_wgpu(self.device.create_buffer(desc))
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer.as_wgpu(), offset, data);
    }

    fn destroy_buffer(&self, buffer: &GpuBuffer) {
        buffer.as_wgpu().destroy();
    }
}

/// Descriptor for configuring graphics context creation.
pub struct GraphicsContextDescriptor {
    /// GPU backends to consider.
    pub backends: wgpu::Backends,
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Whether to force the fallback adapter.
    pub force_fallback_adapter: bool,
    /// Required GPU features (acquisition fails if not available).
    pub required_gpu_features: GpuFeatures,
    /// Requested GPU features (best-effort, logs a warning if unavailable).
    pub requested_gpu_features: GpuFeatures,
    /// Required device limits.
    pub limits: wgpu::Limits,
    /// Optional label for debugging.
    pub label: Option<&'static str>,
}

impl Default for GraphicsContextDescriptor {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_gpu_features: GpuFeatures::empty(),
            requested_gpu_features: GpuFeatures::empty(),
            limits: wgpu::Limits::default(),
            label: None,
        }
    }
}

impl GraphicsContextDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set required GPU features (acquisition fails if not available).
    pub fn require_features(mut self, features: GpuFeatures) -> Self {
        self.required_gpu_features |= features;
        self
    }

    /// Set requested GPU features (best-effort, warns if unavailable).
    pub fn request_features(mut self, features: GpuFeatures) -> Self {
        self.requested_gpu_features |= features;
        self
    }

    /// Set the power preference.
    pub fn power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Set the backends to consider.
    pub fn backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Set the device limits.
    pub fn limits(mut self, limits: wgpu::Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the debug label.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

//! GPU feature detection and management.
//!
//! This module provides a type-safe wrapper around the wgpu features the chart
//! engine cares about, with support for required vs requested features.
//! Required features fail device acquisition when missing; requested features
//! are best-effort and masked out with a warning.

use bitflags::bitflags;

bitflags! {
    /// GPU features that can be requested or required.
    ///
    /// Use [`GpuFeatures::to_wgpu`] to convert to `wgpu::Features`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpuFeatures: u32 {
        /// Push constants for small, frequently updated per-draw data.
        const PUSH_CONSTANTS = 1 << 0;

        /// Timestamp queries for GPU profiling.
        const TIMESTAMP_QUERY = 1 << 1;

        /// Polygon mode: line (wireframe rendering), useful for geometry
        /// debugging overlays.
        const POLYGON_MODE_LINE = 1 << 2;

        /// 32-bit floating point texture filtering.
        const FLOAT32_FILTERABLE = 1 << 3;
    }
}

impl GpuFeatures {
    /// Convert to raw wgpu features.
    pub fn to_wgpu(self) -> wgpu::Features {
        let mut features = wgpu::Features::empty();
        if self.contains(Self::PUSH_CONSTANTS) {
            features |= wgpu::Features::PUSH_CONSTANTS;
        }
        if self.contains(Self::TIMESTAMP_QUERY) {
            features |= wgpu::Features::TIMESTAMP_QUERY;
        }
        if self.contains(Self::POLYGON_MODE_LINE) {
            features |= wgpu::Features::POLYGON_MODE_LINE;
        }
        if self.contains(Self::FLOAT32_FILTERABLE) {
            features |= wgpu::Features::FLOAT32_FILTERABLE;
        }
        features
    }

    /// Extract the subset of `features` this wrapper models.
    pub fn from_wgpu(features: wgpu::Features) -> Self {
        let mut result = Self::empty();
        if features.contains(wgpu::Features::PUSH_CONSTANTS) {
            result |= Self::PUSH_CONSTANTS;
        }
        if features.contains(wgpu::Features::TIMESTAMP_QUERY) {
            result |= Self::TIMESTAMP_QUERY;
        }
        if features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            result |= Self::POLYGON_MODE_LINE;
        }
        if features.contains(wgpu::Features::FLOAT32_FILTERABLE) {
            result |= Self::FLOAT32_FILTERABLE;
        }
        result
    }

    /// Check which of these features the adapter supports.
    pub fn check_support(self, adapter: &wgpu::Adapter) -> FeatureSupport {
        let supported = Self::from_wgpu(adapter.features());
        FeatureSupport {
            missing: self - supported,
        }
    }
}

/// Result of an adapter support check.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSupport {
    missing: GpuFeatures,
}

impl FeatureSupport {
    /// The features that were requested but are not supported, if any.
    pub fn missing(&self) -> Option<GpuFeatures> {
        if self.missing.is_empty() {
            None
        } else {
            Some(self.missing)
        }
    }
}

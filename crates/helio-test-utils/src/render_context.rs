//! Trait abstracting GPU buffer operations for testing.
//!
//! Methods take `&self` and return owned wrapper types, so the trait stays
//! object-safe and mock implementations can use interior mutability to record
//! calls. Buffer destruction goes through the context (not the buffer) so
//! mocks can count destroys for pool shrink assertions.

use crate::gpu_types::GpuBuffer;
use wgpu::BufferDescriptor;

/// Trait abstracting GPU buffer creation and upload.
pub trait RenderContext: Send + Sync {
    /// Create a GPU buffer.
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer;

    /// Write data to a buffer.
    ///
    /// For real buffers this maps to `queue.write_buffer()`; for mock buffers
    /// the operation is recorded for test verification.
    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]);

    /// Release a buffer's GPU memory.
    ///
    /// For real buffers this calls `wgpu::Buffer::destroy()`; for mock buffers
    /// the destroy is recorded.
    fn destroy_buffer(&self, buffer: &GpuBuffer);
}

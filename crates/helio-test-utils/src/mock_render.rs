//! Mock implementation of [`RenderContext`] for testing.
//!
//! Records operations without touching the GPU. `parking_lot::Mutex` gives
//! `&self` methods interior mutability while keeping the type `Send + Sync`.

use crate::{gpu_types::GpuBuffer, render_context::RenderContext};
use parking_lot::Mutex;
use wgpu::{BufferDescriptor, BufferUsages};

/// Records a GPU operation call for verification in tests.
#[derive(Debug, Clone)]
pub enum RenderCall {
    CreateBuffer {
        size: u64,
        usage: BufferUsages,
    },
    WriteBuffer {
        buffer_id: usize,
        offset: u64,
        size: usize,
    },
    DestroyBuffer {
        buffer_id: usize,
    },
}

/// Mock implementation of [`RenderContext`].
///
/// ```rust
/// use helio_test_utils::{MockRenderContext, RenderContext};
/// use wgpu::*;
///
/// let mock = MockRenderContext::new();
/// let buffer = mock.create_buffer(&BufferDescriptor {
///     label: None,
///     size: 1024,
///     usage: BufferUsages::VERTEX,
///     mapped_at_creation: false,
/// });
/// assert!(buffer.is_mock());
/// assert_eq!(mock.count_buffer_creates(), 1);
/// ```
pub struct MockRenderContext {
    /// Recorded calls for verification
    calls: Mutex<Vec<RenderCall>>,
    /// Counter for generating buffer IDs
    next_buffer_id: Mutex<usize>,
}

impl MockRenderContext {
    /// Create a new mock render context.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_buffer_id: Mutex::new(0),
        }
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Count buffer creations.
    pub fn count_buffer_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, RenderCall::CreateBuffer { .. }))
            .count()
    }

    /// Count buffer writes.
    pub fn count_buffer_writes(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, RenderCall::WriteBuffer { .. }))
            .count()
    }

    /// Count buffer destroys.
    pub fn count_buffer_destroys(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, RenderCall::DestroyBuffer { .. }))
            .count()
    }

    /// Forget all recorded calls (keeps the ID counter).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for MockRenderContext {
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer {
        let mut next_id = self.next_buffer_id.lock();
        let id = *next_id;
        *next_id += 1;

        self.calls.lock().push(RenderCall::CreateBuffer {
            size: desc.size,
            usage: desc.usage,
        });

        GpuBuffer::mock(id, desc.size)
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        self.calls.lock().push(RenderCall::WriteBuffer {
            buffer_id: buffer.mock_id().unwrap_or(usize::MAX),
            offset,
            size: data.len(),
        });
    }

    fn destroy_buffer(&self, buffer: &GpuBuffer) {
        self.calls.lock().push(RenderCall::DestroyBuffer {
            buffer_id: buffer.mock_id().unwrap_or(usize::MAX),
        });
    }
}

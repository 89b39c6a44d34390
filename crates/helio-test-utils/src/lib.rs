//! Test utilities for the Helio chart engine.
//!
//! The buffer pool and upload paths in `helio-render` talk to the GPU through
//! the [`RenderContext`] trait instead of holding a `wgpu::Device` directly.
//! This crate provides that trait, the real-or-mock [`GpuBuffer`] wrapper, and
//! (behind the `mock` feature) a [`MockRenderContext`] that records every
//! create/write/destroy call so pooling behavior can be asserted in tests
//! without a physical GPU.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use helio_test_utils::{MockRenderContext, RenderContext};
//! use wgpu::*;
//!
//! let mock = MockRenderContext::new();
//!
//! let buffer = mock.create_buffer(&BufferDescriptor {
//!     label: Some("test_buffer"),
//!     size: 1024,
//!     usage: BufferUsages::VERTEX,
//!     mapped_at_creation: false,
//! });
//!
//! assert!(buffer.is_mock());
//! assert_eq!(mock.count_buffer_creates(), 1);
//! # }
//! ```
//!
//! # Design
//!
//! All wrapper types are owned and cheap to clone; no lifetime parameters
//! propagate into the render crate. The mock uses `parking_lot::Mutex` for
//! interior mutability so `&self` methods can record calls while staying
//! `Send + Sync`.

pub mod gpu_types;
pub mod render_context;
#[cfg(feature = "mock")]
pub mod mock_render;

pub use gpu_types::GpuBuffer;
pub use render_context::RenderContext;
#[cfg(feature = "mock")]
pub use mock_render::{MockRenderContext, RenderCall};

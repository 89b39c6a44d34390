//! Persistent GPU buffer pooling for per-series vertex data.
//!
//! Steady-state frames reuse the same GPU allocations: a slot's buffers are
//! only recreated when the series outgrows them, and uploads overwrite just
//! the used prefix. Slots are keyed by series position, not identity — if the
//! caller reorders series between frames, a slot may briefly hold the previous
//! occupant's data (one-frame glitch); stable-identity keying is a known
//! alternative with different reuse semantics.
//!
//! Pooling goes through the [`RenderContext`] trait so the same code runs
//! against the real device and against the counting mock in tests.

use crate::geometry::VertexData;
use helio_core::profiling::profile_function;
use helio_test_utils::{GpuBuffer, RenderContext};

use ahash::AHashMap;

/// Grid buffers grow by this factor to absorb tick-count churn.
pub const GRID_GROWTH_FACTOR: f32 = 1.5;

/// wgpu rejects zero-sized buffers; empty uploads are clamped to this.
const MIN_BUFFER_BYTES: u64 = 4;

/// Byte capacities required for one slot's channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSizes {
    pub position_bytes: u64,
    pub color_bytes: u64,
}

impl SlotSizes {
    /// Sizes needed to hold `data`.
    pub fn of(data: &VertexData) -> Self {
        Self {
            position_bytes: data.position_bytes().max(MIN_BUFFER_BYTES),
            color_bytes: data.color_bytes().max(MIN_BUFFER_BYTES),
        }
    }

    /// Whether a slot with `capacity` can hold this much data.
    pub fn fits_in(&self, capacity: &SlotSizes) -> bool {
        self.position_bytes <= capacity.position_bytes && self.color_bytes <= capacity.color_bytes
    }
}

/// The pooled buffers for one logical series slot.
#[derive(Debug)]
pub struct SlotBuffers {
    pub position: GpuBuffer,
    pub color: GpuBuffer,
    capacity: SlotSizes,
}

impl SlotBuffers {
    fn allocate(
        ctx: &dyn RenderContext,
        label: &str,
        sizes: SlotSizes,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let position = ctx.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Position Buffer")),
            size: sizes.position_bytes,
            usage,
            mapped_at_creation: false,
        });
        let color = ctx.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Color Buffer")),
            size: sizes.color_bytes,
            usage,
            mapped_at_creation: false,
        });
        Self {
            position,
            color,
            capacity: sizes,
        }
    }

    fn destroy(&self, ctx: &dyn RenderContext) {
        ctx.destroy_buffer(&self.position);
        ctx.destroy_buffer(&self.color);
    }

    pub fn capacity(&self) -> &SlotSizes {
        &self.capacity
    }
}

/// Allocation accounting, exposed for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots allocated for the first time.
    pub created: usize,
    /// Requests served from an existing allocation.
    pub reused: usize,
    /// Slots destroyed and recreated because the series outgrew them.
    pub reallocated: usize,
    /// Slots destroyed by shrink cleanup.
    pub destroyed: usize,
}

/// Keyed cache of per-series GPU buffers.
pub struct SeriesBufferPool {
    slots: AHashMap<usize, SlotBuffers>,
    usage: wgpu::BufferUsages,
    stats: PoolStats,
}

impl SeriesBufferPool {
    pub fn new() -> Self {
        Self {
            slots: AHashMap::new(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            stats: PoolStats::default(),
        }
    }

    /// Get the buffers for `slot`, allocating or growing as needed.
    ///
    /// First request allocates exactly `required`; later requests reuse the
    /// allocation in place while it still fits, and otherwise destroy and
    /// reallocate exactly to the new size (per-series buffers carry no growth
    /// margin).
    pub fn get_or_create(
        &mut self,
        ctx: &dyn RenderContext,
        slot: usize,
        required: SlotSizes,
    ) -> &SlotBuffers {
        profile_function!();

        let fits = self
            .slots
            .get(&slot)
            .map(|existing| required.fits_in(existing.capacity()));

        match fits {
            Some(true) => {
                self.stats.reused += 1;
            }
            Some(false) => {
                if let Some(old) = self.slots.remove(&slot) {
                    old.destroy(ctx);
                }
                self.stats.reallocated += 1;
                tracing::trace!("Reallocating series slot {} to {:?}", slot, required);
                let buffers =
                    SlotBuffers::allocate(ctx, &format!("Series Slot {slot}"), required, self.usage);
                self.slots.insert(slot, buffers);
            }
            None => {
                self.stats.created += 1;
                let buffers =
                    SlotBuffers::allocate(ctx, &format!("Series Slot {slot}"), required, self.usage);
                self.slots.insert(slot, buffers);
            }
        }

        self.slots
            .get(&slot)
            .expect("slot was just ensured by get_or_create")
    }

    /// Upload `data` into `slot`, growing the slot first if needed. Only the
    /// used prefix of each buffer is overwritten.
    pub fn upload(
        &mut self,
        ctx: &dyn RenderContext,
        slot: usize,
        data: &VertexData,
    ) -> &SlotBuffers {
        let required = SlotSizes::of(data);
        let buffers = self.get_or_create(ctx, slot, required);
        if !data.is_empty() {
            ctx.write_buffer(&buffers.position, 0, bytemuck::cast_slice(data.positions()));
            ctx.write_buffer(&buffers.color, 0, bytemuck::cast_slice(data.colors()));
        }
        buffers
    }

    /// Destroy every slot whose index is `>= series_count`.
    ///
    /// Mandatory after each frame: without it, GPU memory grows monotonically
    /// whenever the series count shrinks across frames.
    pub fn trim(&mut self, ctx: &dyn RenderContext, series_count: usize) {
        let stale: Vec<usize> = self
            .slots
            .keys()
            .copied()
            .filter(|&slot| slot >= series_count)
            .collect();
        for slot in stale {
            if let Some(buffers) = self.slots.remove(&slot) {
                buffers.destroy(ctx);
                self.stats.destroyed += 1;
                tracing::trace!("Destroyed stale series slot {}", slot);
            }
        }
    }

    /// Destroy every slot (engine teardown).
    pub fn clear(&mut self, ctx: &dyn RenderContext) {
        for (_, buffers) in self.slots.drain() {
            buffers.destroy(ctx);
            self.stats.destroyed += 1;
        }
    }

    /// Look up a slot without allocating.
    pub fn get(&self, slot: usize) -> Option<&SlotBuffers> {
        self.slots.get(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl Default for SeriesBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Persistent grid/border vertex buffers with multiplicative growth.
///
/// Unlike series slots, grid geometry changes size with every tick-count
/// change, so reallocation is softened with a [`GRID_GROWTH_FACTOR`] margin.
pub struct GridBufferStore {
    buffers: Option<SlotBuffers>,
    usage: wgpu::BufferUsages,
    label: &'static str,
}

impl GridBufferStore {
    pub fn new(label: &'static str) -> Self {
        Self {
            buffers: None,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            label,
        }
    }

    /// Upload `data`, growing capacity to
    /// `max(required, current * GRID_GROWTH_FACTOR)` when it no longer fits.
    pub fn upload(&mut self, ctx: &dyn RenderContext, data: &VertexData) -> &SlotBuffers {
        let required = SlotSizes::of(data);
        let fits = self
            .buffers
            .as_ref()
            .is_some_and(|b| required.fits_in(b.capacity()));

        if !fits {
            let grown = match self.buffers.take() {
                Some(old) => {
                    old.destroy(ctx);
                    SlotSizes {
                        position_bytes: required
                            .position_bytes
                            .max((old.capacity.position_bytes as f32 * GRID_GROWTH_FACTOR) as u64),
                        color_bytes: required
                            .color_bytes
                            .max((old.capacity.color_bytes as f32 * GRID_GROWTH_FACTOR) as u64),
                    }
                }
                None => required,
            };
            self.buffers = Some(SlotBuffers::allocate(ctx, self.label, grown, self.usage));
        }

        let buffers = self
            .buffers
            .as_ref()
            .expect("grid buffers were just ensured");
        if !data.is_empty() {
            ctx.write_buffer(&buffers.position, 0, bytemuck::cast_slice(data.positions()));
            ctx.write_buffer(&buffers.color, 0, bytemuck::cast_slice(data.colors()));
        }
        buffers
    }

    /// Destroy the buffers (engine teardown).
    pub fn clear(&mut self, ctx: &dyn RenderContext) {
        if let Some(buffers) = self.buffers.take() {
            buffers.destroy(ctx);
        }
    }

    /// The current buffers, if any upload happened.
    pub fn buffers(&self) -> Option<&SlotBuffers> {
        self.buffers.as_ref()
    }

    pub fn capacity(&self) -> Option<&SlotSizes> {
        self.buffers.as_ref().map(SlotBuffers::capacity)
    }
}

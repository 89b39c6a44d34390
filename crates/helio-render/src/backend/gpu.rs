//! wgpu backend (Backend-A).
//!
//! Geometry arrives in pixel space; one small uniform holds the pixel-to-clip
//! projection, so pan/zoom and resize update 80 bytes instead of re-uploading
//! vertex data transforms. Vertex buffers are pooled per series slot and
//! reused across frames. Commands go through an encoder and a single render
//! pass per frame; `render` completes at submission, not presentation.

use super::{BackendKind, ChartBackend};
use crate::buffer_pool::{GridBufferStore, SeriesBufferPool, SlotSizes};
use crate::context::GraphicsContext;
use crate::error::RenderError;
use crate::geometry::{ChartKind, FrameGeometry, GeometryTopology, build_frame};
use crate::series::RenderProps;
use crate::transform::{ChartScales, TransformUniform};
use crate::viewport::Viewport;
use helio_core::geometry::Size;
use helio_core::profiling::{profile_function, profile_scope};
use helio_test_utils::{GpuBuffer, RenderContext};
use std::sync::Arc;

/// What the GPU backend draws into.
pub enum GpuTargetDescriptor {
    /// A caller-created window surface. The caller keeps ownership of the
    /// window; the backend owns the surface configuration.
    Surface(wgpu::Surface<'static>),
    /// An engine-created offscreen texture (testing, export).
    Offscreen,
}

enum GpuTarget {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
}

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// wgpu chart backend.
///
/// Owns every GPU resource it creates: pipelines, the uniform buffer and bind
/// group, the persistent grid/border buffers, and the per-series buffer pool.
/// [`ChartBackend::destroy`] releases all of them; nothing outlives the
/// backend.
pub struct GpuBackend {
    context: Arc<GraphicsContext>,
    kind: ChartKind,
    target: GpuTarget,
    size: Size<u32>,
    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    transform_buffer: GpuBuffer,
    transform_bind_group: wgpu::BindGroup,
    series_pool: SeriesBufferPool,
    grid_store: GridBufferStore,
    border_store: GridBufferStore,
    destroyed: bool,
}

impl GpuBackend {
    /// Create a backend for the given target.
    ///
    /// Shader or pipeline validation failures are caught through an error
    /// scope and surfaced as [`RenderError::ShaderCompile`] so negotiation can
    /// fall back a tier.
    pub fn new(
        context: Arc<GraphicsContext>,
        kind: ChartKind,
        target: GpuTargetDescriptor,
        size: Size<u32>,
    ) -> Result<Self, RenderError> {
        if size.width == 0 || size.height == 0 {
            return Err(RenderError::InvalidProps(format!(
                "render target size {}x{} must be non-zero",
                size.width, size.height
            )));
        }

        let (target, format) = match target {
            GpuTargetDescriptor::Surface(surface) => {
                let config = surface
                    .get_default_config(&context.adapter, size.width, size.height)
                    .ok_or_else(|| {
                        RenderError::BackendUnavailable(
                            "surface is not compatible with the adapter".into(),
                        )
                    })?;
                surface.configure(&context.device, &config);
                let format = config.format;
                (GpuTarget::Surface { surface, config }, format)
            }
            GpuTargetDescriptor::Offscreen => {
                let (texture, view) = create_offscreen(&context, size);
                (GpuTarget::Offscreen { texture, view }, OFFSCREEN_FORMAT)
            }
        };

        // Uniform buffer for the pixel-to-clip transform.
        let transform_buffer = context.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chart Transform Buffer"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            context
                .device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Chart Bind Group Layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let transform_bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Chart Transform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_wgpu().as_entire_binding(),
            }],
        });

        // Shader and pipelines, validated through an error scope so a compile
        // failure aborts this tier instead of raising an uncaptured error.
        context
            .device
            .push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = context
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Chart Shader"),
                source: wgpu::ShaderSource::Wgsl(CHART_SHADER.into()),
            });

        let pipeline_layout =
            context
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Chart Pipeline Layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

        let triangle_pipeline = create_pipeline(
            &context.device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::PrimitiveTopology::TriangleList,
            "Chart Triangle Pipeline",
        );
        let line_pipeline = create_pipeline(
            &context.device,
            &pipeline_layout,
            &shader,
            format,
            wgpu::PrimitiveTopology::LineList,
            "Chart Line Pipeline",
        );

        if let Some(error) = pollster::block_on(context.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile(error.to_string()));
        }

        Ok(Self {
            context,
            kind,
            target,
            size,
            triangle_pipeline,
            line_pipeline,
            transform_buffer,
            transform_bind_group,
            series_pool: SeriesBufferPool::new(),
            grid_store: GridBufferStore::new("Grid"),
            border_store: GridBufferStore::new("Border"),
            destroyed: false,
        })
    }

    /// Allocation statistics of the per-series pool.
    pub fn pool_stats(&self) -> crate::buffer_pool::PoolStats {
        self.series_pool.stats()
    }

    fn pipeline_for(&self, topology: GeometryTopology) -> &wgpu::RenderPipeline {
        match topology {
            GeometryTopology::TriangleList => &self.triangle_pipeline,
            GeometryTopology::LineList => &self.line_pipeline,
        }
    }
}

impl ChartBackend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn render(&mut self, props: &RenderProps<'_>) -> Result<(), RenderError> {
        profile_function!();

        if self.destroyed {
            tracing::warn!("Render called on a destroyed GPU backend; frame dropped");
            return Ok(());
        }

        let viewport = Viewport::new(self.size.as_f32(), props.scale_factor);
        let margin = props.margin.to_physical(viewport.scale_factor);
        let scales = ChartScales::new(viewport.size, margin, props.x_domain, props.y_domain);
        let frame = build_frame(self.kind, props, &scales);

        // A single series larger than the device's buffer limit cannot be
        // drawn; skip the frame instead of tripping device validation.
        let limit = self.context.max_buffer_size();
        for data in &frame.series {
            let required = SlotSizes::of(data);
            if required.position_bytes > limit || required.color_bytes > limit {
                return Err(RenderError::ResourceExhaustion(format!(
                    "series needs {} position bytes, device limit is {}",
                    required.position_bytes, limit
                )));
            }
        }

        let ctx: &dyn RenderContext = self.context.as_ref();

        // Upload the transform and all vertex data before encoding.
        let uniform = TransformUniform::new(viewport.size);
        ctx.write_buffer(&self.transform_buffer, 0, bytemuck::bytes_of(&uniform));

        upload_frame(
            ctx,
            &mut self.series_pool,
            &mut self.grid_store,
            &mut self.border_store,
            &frame,
        );

        // Mandatory shrink cleanup: slots at or beyond the current series
        // count would otherwise pin GPU memory forever.
        self.series_pool.trim(ctx, props.series.len());

        // Acquire the target view.
        let (view, surface_texture) = match &mut self.target {
            GpuTarget::Surface { surface, config } => {
                match surface.get_current_texture() {
                    Ok(frame_texture) => {
                        let view = frame_texture
                            .texture
                            .create_view(&wgpu::TextureViewDescriptor::default());
                        (view, Some(frame_texture))
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface frame acquisition timed out; frame dropped");
                        return Ok(());
                    }
                    Err(wgpu::SurfaceError::Outdated) => {
                        // Stale configuration (e.g. a resize raced the frame);
                        // reconfigure and let the next trigger redraw.
                        surface.configure(&self.context.device, config);
                        tracing::warn!("Surface outdated; reconfigured and dropped frame");
                        return Ok(());
                    }
                    Err(wgpu::SurfaceError::Lost) => {
                        GraphicsContext::invalidate_shared();
                        return Err(RenderError::DeviceLost);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        return Err(RenderError::ResourceExhaustion(
                            "surface out of memory".into(),
                        ));
                    }
                    Err(other) => {
                        return Err(RenderError::Surface(other.to_string()));
                    }
                }
            }
            GpuTarget::Offscreen { view, .. } => (view.clone(), None),
        };

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Chart Frame Encoder"),
                });

        {
            profile_scope!("chart_render_pass");
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chart Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(props.style.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_bind_group(0, &self.transform_bind_group, &[]);

            pass.push_debug_group("grid");
            if let (Some(grid), Some(buffers)) = (&frame.grid, self.grid_store.buffers()) {
                draw_stream(&mut pass, self.pipeline_for(grid.topology()), buffers, grid);
            }
            pass.pop_debug_group();

            pass.push_debug_group("series");
            for (slot, data) in frame.series.iter().enumerate() {
                if data.is_empty() {
                    continue;
                }
                if let Some(buffers) = self.series_pool.get(slot) {
                    draw_stream(&mut pass, self.pipeline_for(data.topology()), buffers, data);
                }
            }
            pass.pop_debug_group();

            pass.push_debug_group("border");
            if let (Some(border), Some(buffers)) = (&frame.border, self.border_store.buffers()) {
                draw_stream(
                    &mut pass,
                    self.pipeline_for(border.topology()),
                    buffers,
                    border,
                );
            }
            pass.pop_debug_group();
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        if let Some(surface_texture) = surface_texture {
            surface_texture.present();
        }

        Ok(())
    }

    fn resize(&mut self, size: Size<u32>) {
        if size.width == 0 || size.height == 0 || size == self.size {
            return;
        }
        self.size = size;
        match &mut self.target {
            GpuTarget::Surface { surface, config } => {
                config.width = size.width;
                config.height = size.height;
                surface.configure(&self.context.device, config);
            }
            GpuTarget::Offscreen { texture, view } => {
                let (new_texture, new_view) = create_offscreen(&self.context, size);
                *texture = new_texture;
                *view = new_view;
            }
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let ctx: &dyn RenderContext = self.context.as_ref();
        self.series_pool.clear(ctx);
        self.grid_store.clear(ctx);
        self.border_store.clear(ctx);
        ctx.destroy_buffer(&self.transform_buffer);
        self.destroyed = true;
        tracing::debug!("GPU backend destroyed");
    }
}

impl Drop for GpuBackend {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn create_offscreen(
    context: &GraphicsContext,
    size: Size<u32>,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = context.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Chart Offscreen Target"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: OFFSCREEN_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[
                // Positions: interleaved x/y pairs in pixel space.
                wgpu::VertexBufferLayout {
                    array_stride: 8,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x2,
                        offset: 0,
                        shader_location: 0,
                    }],
                },
                // Per-vertex RGBA colors.
                wgpu::VertexBufferLayout {
                    array_stride: 16,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: 0,
                        shader_location: 1,
                    }],
                },
            ],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn upload_frame(
    ctx: &dyn RenderContext,
    series_pool: &mut SeriesBufferPool,
    grid_store: &mut GridBufferStore,
    border_store: &mut GridBufferStore,
    frame: &FrameGeometry,
) {
    profile_scope!("upload_frame");

    if let Some(grid) = &frame.grid {
        grid_store.upload(ctx, grid);
    }
    if let Some(border) = &frame.border {
        border_store.upload(ctx, border);
    }
    for (slot, data) in frame.series.iter().enumerate() {
        if !data.is_empty() {
            series_pool.upload(ctx, slot, data);
        }
    }
}

fn draw_stream(
    pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    buffers: &crate::buffer_pool::SlotBuffers,
    data: &crate::geometry::VertexData,
) {
    pass.set_pipeline(pipeline);
    pass.set_vertex_buffer(0, buffers.position.as_wgpu().slice(0..data.position_bytes()));
    pass.set_vertex_buffer(1, buffers.color.as_wgpu().slice(0..data.color_bytes()));
    pass.draw(0..data.vertex_count() as u32, 0..1);
}

/// WGSL shader: pixel-space positions through the ortho projection, vertex
/// colors passed straight through.
const CHART_SHADER: &str = r#"
struct Transform {
    projection: mat4x4<f32>,
    resolution: vec2<f32>,
    _pad: vec2<f32>,
}

@group(0) @binding(0)
var<uniform> transform: Transform;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = transform.projection * vec4<f32>(input.position, 0.0, 1.0);
    output.color = input.color;
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

use crate::pack::AttributeBuffer;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{premul_alpha_blend, viewport_ubo_min_binding_size, ViewportUniform};

/// Expected packed schema: position (vec2) then color (vec4).
const POSITION: usize = 0;
const COLOR: usize = 1;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];

/// Triangle-strip renderer over packed attribute buffers.
///
/// Consumes the `pack` module's position/color schema: one flat `f32` array
/// per attribute, uploaded to its own vertex buffer slot. The caller packs
/// with a [`PackBatch`](crate::pack::PackBatch) and passes
/// `vertices_written()` as the draw range; consecutive shapes are stitched by
/// their degenerate duplicate vertices, so the whole range renders in one
/// draw call.
///
/// Skipping the upload for unchanged shards is the owner's decision: the
/// caches expose snapshot identity for exactly that purpose, and this
/// renderer re-uploads whenever it is called.
#[derive(Default)]
pub struct StripRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,

    position_vbo: Option<wgpu::Buffer>,
    color_vbo: Option<wgpu::Buffer>,
    vertex_capacity: usize,

    warned_schema: bool,
}

impl StripRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `buffer` and draws its first `vertex_count` vertices into
    /// `target`.
    ///
    /// `buffer` must carry the position/color schema; any other layout is a
    /// configuration error reported once via `log::warn!` and skipped.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        buffer: &AttributeBuffer,
        vertex_count: usize,
    ) {
        if !self.check_schema(buffer) {
            return;
        }
        if vertex_count == 0 {
            return;
        }
        let vertex_count = vertex_count.min(buffer.vertex_capacity());

        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        self.ensure_vertex_capacity(ctx, buffer.vertex_capacity());
        self.write_viewport_uniform(ctx);

        let (Some(position_vbo), Some(color_vbo)) =
            (self.position_vbo.as_ref(), self.color_vbo.as_ref())
        else {
            return;
        };

        ctx.queue
            .write_buffer(position_vbo, 0, bytemuck::cast_slice(buffer.values(POSITION)));
        ctx.queue
            .write_buffer(color_vbo, 0, bytemuck::cast_slice(buffer.values(COLOR)));

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("chorda strip pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, position_vbo.slice(..));
        rpass.set_vertex_buffer(1, color_vbo.slice(..));
        rpass.draw(0..vertex_count as u32, 0..1);
    }

    fn check_schema(&mut self, buffer: &AttributeBuffer) -> bool {
        let ok = buffer.attribute_count() == 2
            && buffer.descriptor(POSITION).component_count == 2
            && buffer.descriptor(COLOR).component_count == 4;
        if !ok && !self.warned_schema {
            log::warn!(
                "StripRenderer: buffer schema mismatch (expected vec2 position + vec4 color); \
                 skipping draw"
            );
            self.warned_schema = true;
        }
        ok
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader_src = include_str!("shaders/strip.wgsl");
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("chorda strip shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("chorda strip bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(viewport_ubo_min_binding_size()),
                        },
                        count: None,
                    }],
                });

        let pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("chorda strip pipeline layout"),
                    bind_group_layouts: &[&bind_group_layout],
                    immediate_size: 0,
                });

        let position_layout = wgpu::VertexBufferLayout {
            array_stride: (2 * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        };
        let color_layout = wgpu::VertexBufferLayout {
            array_stride: (4 * std::mem::size_of::<f32>()) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("chorda strip pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[position_layout, color_layout],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let viewport_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chorda strip viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("chorda strip bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_vertex_capacity(&mut self, ctx: &RenderCtx<'_>, required_vertices: usize) {
        if required_vertices <= self.vertex_capacity
            && self.position_vbo.is_some()
            && self.color_vbo.is_some()
        {
            return;
        }

        let new_cap = required_vertices.next_power_of_two().max(256);

        self.position_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chorda strip position vbo"),
            size: (new_cap * 2 * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.color_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("chorda strip color vbo"),
            size: (new_cap * 4 * std::mem::size_of::<f32>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.vertex_capacity = new_cap;
    }

    fn write_viewport_uniform(&mut self, ctx: &RenderCtx<'_>) {
        let Some(ubo) = self.viewport_ubo.as_ref() else { return };
        let u = ViewportUniform {
            viewport: [ctx.viewport.width.max(1.0), ctx.viewport.height.max(1.0)],
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

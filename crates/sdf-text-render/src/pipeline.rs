//! SDF text drawing.
//!
//! Text is drawn one glyph quad at a time. Each draw gets its own slot in a
//! uniform buffer (transform, colour, SDF parameters), selected with a
//! dynamic offset, and renders four strip indices from the atlas's index
//! buffer.
//!
//! Draws are collected on the CPU in a [`TextBatch`] and submitted with
//! [`SdfTextPipeline::render`].

use std::num::NonZeroU64;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use sdf_text::{FONT_TEXTURE_SLOT, GlyphGeometry, GlyphTable, GlyphVertex, TextLayout};
use tracing::debug;

use crate::context::GpuResources;
use crate::error::{RenderError, RenderResult};
use crate::font_atlas::GpuFontAtlas;

/// Default number of glyph draws per batch.
pub const DEFAULT_BATCH_CAPACITY: usize = 4096;

/// Bind group index of the per-draw uniforms.
const UNIFORM_SLOT: u32 = 0;

/// Per-draw shader uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TextUniforms {
    /// Model-view-projection matrix.
    pub mvp: [[f32; 4]; 4],
    /// Straight-alpha RGBA colour.
    pub color: [f32; 4],
    /// `[sdf_width, sdf_edge, 0, 0]`.
    pub sdf: [f32; 4],
}

impl TextUniforms {
    /// Build uniforms for one draw.
    pub fn new(mvp: Mat4, color: [f32; 4], sdf_width: f32, sdf_edge: f32) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            color,
            sdf: [sdf_width, sdf_edge, 0.0, 0.0],
        }
    }
}

/// Size of one uniform slot, rounded up to the device's offset alignment.
pub fn uniform_stride(alignment: u32) -> u64 {
    let size = std::mem::size_of::<TextUniforms>() as u64;
    size.next_multiple_of(u64::from(alignment.max(1)))
}

const GLYPH_VERTEX_ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2, // uv
];

/// Vertex buffer layout of [`GlyphVertex`].
pub fn glyph_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<GlyphVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &GLYPH_VERTEX_ATTRIBS,
    }
}

/// One queued glyph draw.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    /// Strip indices to draw.
    pub indices: Range<u32>,
    /// Uniforms for the draw.
    pub uniforms: TextUniforms,
}

/// Glyph draws for a single font, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBatch {
    sdf_width: f32,
    sdf_edge: f32,
    draws: Vec<TextDraw>,
}

impl TextBatch {
    /// Create an empty batch shaded with the table's SDF parameters.
    pub fn new(table: &GlyphTable) -> Self {
        Self {
            sdf_width: table.sdf_width(),
            sdf_edge: table.sdf_edge(),
            draws: Vec::new(),
        }
    }

    /// Queue every glyph of a laid-out line.
    pub fn add_layout(&mut self, layout: &TextLayout, projection: Mat4, color: [f32; 4]) {
        self.draws.extend(layout.placements.iter().map(|placement| TextDraw {
            indices: placement.index_range(),
            uniforms: TextUniforms::new(
                placement.transform(projection),
                color,
                self.sdf_width,
                self.sdf_edge,
            ),
        }));
    }

    /// Queue the whole atlas as one quad, for inspecting the character map.
    pub fn add_charmap(&mut self, geometry: &GlyphGeometry, transform: Mat4, color: [f32; 4]) {
        self.draws.push(TextDraw {
            indices: geometry.charmap_index_range(),
            uniforms: TextUniforms::new(transform, color, self.sdf_width, self.sdf_edge),
        });
    }

    /// Queued draws.
    pub fn draws(&self) -> &[TextDraw] {
        &self.draws
    }

    /// Number of queued draws.
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    /// Drop all queued draws.
    pub fn clear(&mut self) {
        self.draws.clear();
    }
}

/// Render pipeline and uniform storage for SDF text.
pub struct SdfTextPipeline {
    /// Render pipeline.
    pipeline: wgpu::RenderPipeline,
    /// Uniform slots, `capacity * stride` bytes.
    uniform_buffer: wgpu::Buffer,
    /// Bind group over one uniform slot, moved with dynamic offsets.
    uniform_bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
    /// Reused upload buffer.
    staging: Vec<u8>,
}

impl SdfTextPipeline {
    /// Create a pipeline rendering into `format` targets, with room for
    /// `capacity` glyph draws per batch.
    pub fn new(resources: &GpuResources, format: wgpu::TextureFormat, capacity: usize) -> Self {
        let device = &resources.device;
        let capacity = capacity.max(1);
        let stride = uniform_stride(resources.uniform_offset_alignment());
        let uniform_size = std::mem::size_of::<TextUniforms>() as u64;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_text_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text_sdf.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sdf_text_uniform_buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("sdf_text_uniform_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: NonZeroU64::new(uniform_size),
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_text_uniform_bind_group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: NonZeroU64::new(uniform_size),
                }),
            }],
        });

        let texture_bind_group_layout = GpuFontAtlas::bind_group_layout(device);

        // Group order must match UNIFORM_SLOT and FONT_TEXTURE_SLOT.
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_text_pipeline_layout"),
            bind_group_layouts: &[&uniform_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_text_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[glyph_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        debug!(
            target: "sdf_text_render::pipeline",
            ?format,
            capacity,
            stride,
            "created sdf text pipeline"
        );

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    /// Maximum draws per batch.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Byte distance between uniform slots.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Draw `batch` onto `target`, keeping its existing contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch holds more draws than the pipeline's
    /// capacity.
    pub fn render(
        &mut self,
        resources: &GpuResources,
        target: &wgpu::TextureView,
        atlas: &GpuFontAtlas,
        batch: &TextBatch,
    ) -> RenderResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > self.capacity {
            return Err(RenderError::BatchTooLarge {
                count: batch.len(),
                capacity: self.capacity,
            });
        }

        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * batch.len(), 0);
        for (slot, draw) in self.staging.chunks_exact_mut(stride).zip(batch.draws()) {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        resources
            .queue
            .write_buffer(&self.uniform_buffer, 0, &self.staging);

        let mut encoder = resources
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_text_render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_text_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(FONT_TEXTURE_SLOT, atlas.bind_group(), &[]);
            render_pass.set_vertex_buffer(0, atlas.vertex_buffer().slice(..));
            render_pass.set_index_buffer(atlas.index_buffer().slice(..), wgpu::IndexFormat::Uint32);

            for (slot, draw) in batch.draws().iter().enumerate() {
                let offset = (slot * stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(UNIFORM_SLOT, &self.uniform_bind_group, &[offset]);
                render_pass.draw_indexed(draw.indices.clone(), 0, 0..1);
            }
        }

        resources.queue.submit(std::iter::once(encoder.finish()));

        debug!(
            target: "sdf_text_render::pipeline",
            draws = batch.len(),
            "submitted sdf text batch"
        );

        Ok(())
    }
}

impl std::fmt::Debug for SdfTextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdfTextPipeline")
            .field("capacity", &self.capacity)
            .field("stride", &self.stride)
            .finish()
    }
}

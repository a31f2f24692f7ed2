//! GPU copy of a built font atlas.
//!
//! [`GpuFontAtlas`] owns the single-channel atlas texture, its sampler and
//! bind group, and the vertex/index buffers holding every glyph quad. All of
//! them are released when the atlas is dropped.

use sdf_text::{AtlasImage, GlyphGeometry, GlyphTable};
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::context::GpuResources;
use crate::error::{RenderError, RenderResult};

/// Texture format of uploaded atlases.
pub const ATLAS_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

/// A font atlas uploaded to the GPU.
pub struct GpuFontAtlas {
    /// Atlas texture.
    texture: wgpu::Texture,
    /// Texture view for sampling.
    texture_view: wgpu::TextureView,
    /// Linear sampler.
    sampler: wgpu::Sampler,
    /// Bind group of texture and sampler.
    bind_group: wgpu::BindGroup,
    /// Glyph quads.
    vertex_buffer: wgpu::Buffer,
    /// Strip indices for the quads.
    index_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    index_count: u32,
    sdf_width: f32,
    sdf_edge: f32,
}

impl GpuFontAtlas {
    /// Upload `image` and the quads of `geometry`.
    ///
    /// The image is consumed; the CPU copy is dropped once the texture has
    /// been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is empty or larger than the device
    /// allows.
    pub fn new(
        resources: &GpuResources,
        table: &GlyphTable,
        geometry: &GlyphGeometry,
        image: AtlasImage,
    ) -> RenderResult<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyAtlas { width, height });
        }
        let max = resources.max_texture_dimension();
        if width > max || height > max {
            return Err(RenderError::AtlasTooLarge { width, height, max });
        }

        let device = &resources.device;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sdf_font_atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ATLAS_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        resources.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );
        drop(image);

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Linear filtering keeps the distance field smooth under scaling.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sdf_font_atlas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = Self::bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_font_atlas_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sdf_font_vertex_buffer"),
            contents: geometry.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sdf_font_index_buffer"),
            contents: geometry.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        debug!(
            target: "sdf_text_render::font_atlas",
            width,
            height,
            glyphs = geometry.glyph_count(),
            "uploaded font atlas"
        );

        Ok(Self {
            texture,
            texture_view,
            sampler,
            bind_group,
            vertex_buffer,
            index_buffer,
            width,
            height,
            index_count: geometry.indices().len() as u32,
            sdf_width: table.sdf_width(),
            sdf_edge: table.sdf_edge(),
        })
    }

    /// Bind group layout shared by all font atlases.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_font_atlas_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Atlas size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The atlas texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the texture view for rendering.
    pub fn texture_view(&self) -> &wgpu::TextureView {
        &self.texture_view
    }

    /// The atlas sampler.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Get the bind group for rendering.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Glyph vertex buffer.
    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    /// Glyph index buffer.
    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    /// Number of indices in the index buffer.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// SDF shading `(width, edge)` of the font.
    pub fn sdf_params(&self) -> (f32, f32) {
        (self.sdf_width, self.sdf_edge)
    }
}

impl std::fmt::Debug for GpuFontAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuFontAtlas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("index_count", &self.index_count)
            .finish()
    }
}

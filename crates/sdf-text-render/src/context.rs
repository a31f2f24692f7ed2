//! GPU device setup.
//!
//! [`GpuResources`] owns the wgpu instance, adapter, device and queue. It is
//! created explicitly and passed to everything that touches the GPU; there
//! is no global context.

use tracing::{debug, info, trace};

use crate::error::{RenderError, RenderResult};

/// How [`GpuResources::new`] picks and opens a device.
#[derive(Debug, Clone)]
pub struct GraphicsConfig {
    /// Backends the instance may use.
    pub backends: wgpu::Backends,
    /// Adapter preference when several are present.
    pub power_preference: wgpu::PowerPreference,
    /// Limits the device must support.
    pub required_limits: wgpu::Limits,
    /// Turn on backend validation.
    pub debug_validation: bool,
    /// Only accept a software adapter.
    pub force_fallback_adapter: bool,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        let required_limits = if cfg!(target_arch = "wasm32") {
            wgpu::Limits::downlevel_webgl2_defaults()
        } else {
            wgpu::Limits::default()
        };
        Self {
            backends: wgpu::Backends::PRIMARY,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits,
            debug_validation: cfg!(debug_assertions),
            force_fallback_adapter: false,
        }
    }
}

impl GraphicsConfig {
    /// Set the backends to choose from.
    #[must_use]
    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Set the adapter power preference.
    #[must_use]
    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }

    /// Request a software adapter.
    #[must_use]
    pub fn with_fallback_adapter(mut self, fallback: bool) -> Self {
        self.force_fallback_adapter = fallback;
        self
    }

    fn instance_flags(&self) -> wgpu::InstanceFlags {
        if self.debug_validation {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::empty()
        }
    }
}

/// Device handles for uploading atlases and drawing text.
#[derive(Debug)]
pub struct GpuResources {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuResources {
    /// Open a device as described by `config`, blocking until it is ready.
    ///
    /// # Errors
    ///
    /// [`RenderError::NoAdapter`] when nothing matches the config, or
    /// [`RenderError::DeviceRequest`] when the adapter refuses the limits.
    pub fn new(config: &GraphicsConfig) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            flags: config.instance_flags(),
            ..Default::default()
        });
        let adapter = pick_adapter(&instance, config)?;
        let (device, queue) = open_device(&adapter, config)?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Adapter name, backend and type.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Largest 2D texture edge the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Required alignment of dynamic uniform buffer offsets.
    pub fn uniform_offset_alignment(&self) -> u32 {
        self.device.limits().min_uniform_buffer_offset_alignment
    }

    /// Block until submitted work is done.
    ///
    /// Returns `true` if nothing was in flight when the wait started.
    pub fn wait_idle(&self) -> bool {
        let idle = self.device.poll(wgpu::Maintain::Wait).is_queue_empty();
        trace!(target: "sdf_text_render::context", idle, "waited for device");
        idle
    }
}

fn pick_adapter(instance: &wgpu::Instance, config: &GraphicsConfig) -> RenderResult<wgpu::Adapter> {
    let options = wgpu::RequestAdapterOptions {
        power_preference: config.power_preference,
        compatible_surface: None,
        force_fallback_adapter: config.force_fallback_adapter,
    };
    let adapter =
        pollster::block_on(instance.request_adapter(&options)).ok_or(RenderError::NoAdapter)?;

    let info = adapter.get_info();
    info!(
        target: "sdf_text_render::context",
        name = info.name,
        backend = ?info.backend,
        device_type = ?info.device_type,
        "using adapter"
    );
    Ok(adapter)
}

fn open_device(
    adapter: &wgpu::Adapter,
    config: &GraphicsConfig,
) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let descriptor = wgpu::DeviceDescriptor {
        label: Some("sdf-text-device"),
        required_features: wgpu::Features::empty(),
        required_limits: config.required_limits.clone(),
        memory_hints: wgpu::MemoryHints::Performance,
    };
    let (device, queue) = pollster::block_on(adapter.request_device(&descriptor, None))?;

    debug!(
        target: "sdf_text_render::context",
        max_texture_dimension = device.limits().max_texture_dimension_2d,
        "device opened"
    );
    Ok((device, queue))
}

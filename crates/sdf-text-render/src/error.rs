//! Error types for the render crate.

use thiserror::Error;

/// Errors that can occur while uploading or drawing SDF text.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No suitable graphics adapter was found.
    #[error("no suitable graphics adapter found")]
    NoAdapter,

    /// Failed to request a graphics device.
    #[error("failed to request graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// The atlas image has a zero dimension.
    #[error("atlas image is empty ({width}x{height})")]
    EmptyAtlas { width: u32, height: u32 },

    /// The atlas image exceeds the device's texture size limit.
    #[error("atlas image {width}x{height} exceeds the device limit of {max}")]
    AtlasTooLarge { width: u32, height: u32, max: u32 },

    /// More glyph draws were queued than the pipeline has uniform slots for.
    #[error("text batch holds {count} draws, pipeline capacity is {capacity}")]
    BatchTooLarge { count: usize, capacity: usize },
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

use thiserror::Error;

/// Fatal renderer failures. Anything recoverable (missing texture, a material
/// with no shader for a pass, a degenerate view-projection) is handled with
/// skip-and-warn instead of surfacing here.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("surface frame acquisition failed: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("failed to load texture {path}: {reason}")]
    TextureLoad { path: String, reason: String },
}

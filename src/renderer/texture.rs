use crate::error::RenderError;

/// A sampled 2D texture. Everything uploads as a single mip level; the
/// material bind groups pair these with a shared sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Texture {
    /// Decode an image file and upload it. `is_srgb` selects the color-space
    /// of the format; albedo wants sRGB, data maps (normal, metal/roughness)
    /// want linear.
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
        is_srgb: bool,
    ) -> Result<Self, RenderError> {
        let image = image::open(path).map_err(|err| RenderError::TextureLoad {
            path: path.to_string(),
            reason: err.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let format = if is_srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        Ok(Self::from_rgba8(
            device,
            queue,
            &rgba,
            width,
            height,
            format,
            Some(path),
        ))
    }

    /// 1x1 solid color, linear format. Used for the permanently resident
    /// placeholders.
    pub fn from_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: Option<&str>,
    ) -> Self {
        Self::from_rgba8(
            device,
            queue,
            &color,
            1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            label,
        )
    }

    /// Flat tangent-space normal (0, 0, 1).
    pub fn flat_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [128, 128, 255, 255], Some("FlatNormal"))
    }

    /// Zero metallic, full roughness (G = roughness, B = metallic).
    pub fn default_metal_roughness(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [0, 255, 0, 255], Some("DefaultMetalRoughness"))
    }

    /// Opaque white, used when a basic material needs a neutral albedo.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_color(device, queue, [255, 255, 255, 255], Some("White"))
    }

    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixels: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

use winit::dpi::PhysicalSize;

use super::layouts::BindGroupLayouts;

pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const METAL_ROUGHNESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The geometry pass render targets plus the bind group the lighting pass
/// reads them through. Destroyed and rebuilt on resize.
pub(crate) struct GeometryBuffer {
    _albedo: wgpu::Texture,
    _normal: wgpu::Texture,
    _metal_roughness: wgpu::Texture,
    _depth: wgpu::Texture,
    pub albedo_view: wgpu::TextureView,
    pub normal_view: wgpu::TextureView,
    pub metal_roughness_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

fn color_target(
    device: &wgpu::Device,
    label: &str,
    size: PhysicalSize<u32>,
    format: wgpu::TextureFormat,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

impl GeometryBuffer {
    pub(crate) fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        size: PhysicalSize<u32>,
    ) -> Self {
        let albedo = color_target(device, "GBufferAlbedo", size, ALBEDO_FORMAT);
        let normal = color_target(device, "GBufferNormal", size, NORMAL_FORMAT);
        let metal_roughness =
            color_target(device, "GBufferMetalRoughness", size, METAL_ROUGHNESS_FORMAT);
        let depth = color_target(device, "GBufferDepth", size, DEPTH_FORMAT);

        let albedo_view = albedo.create_view(&wgpu::TextureViewDescriptor::default());
        let normal_view = normal.create_view(&wgpu::TextureViewDescriptor::default());
        let metal_roughness_view =
            metal_roughness.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBufferBindGroup"),
            layout: &layouts.gbuffer,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&metal_roughness_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&depth_view),
                },
            ],
        });

        Self {
            _albedo: albedo,
            _normal: normal,
            _metal_roughness: metal_roughness,
            _depth: depth,
            albedo_view,
            normal_view,
            metal_roughness_view,
            depth_view,
            bind_group,
        }
    }
}

/// Every bind group layout used by the passes, created once by the renderer
/// and handed to whoever builds pipelines or bind groups against them.
/// Nothing caches layouts statically; this struct is the single source.
pub(crate) struct BindGroupLayouts {
    /// binding 0: camera uniform, binding 1: scene uniform.
    pub camera_scene: wgpu::BindGroupLayout,
    /// binding 0: per-mesh model uniform.
    pub mesh: wgpu::BindGroupLayout,
    /// bindings 0-3: sampler, albedo, normal, metal/roughness; 4: scalars.
    pub material: wgpu::BindGroupLayout,
    /// binding 0: one light uniform block (shadow passes, forward pass).
    pub light: wgpu::BindGroupLayout,
    /// bindings 0-3: albedo, normal, metal/roughness, depth. Read with
    /// textureLoad, so no samplers.
    pub gbuffer: wgpu::BindGroupLayout,
    /// Lighting pass light inputs: directional block, spot block, the two
    /// shadow depth arrays, comparison sampler.
    pub lighting_lights: wgpu::BindGroupLayout,
    /// binding 0: sampler, binding 1: resolved color.
    pub output: wgpu::BindGroupLayout,
    /// binding 0: one shadow map layer as a plain depth texture.
    pub shadow_debug: wgpu::BindGroupLayout,
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, filterable: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn depth_entry(binding: u32, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: dimension,
            multisampled: false,
        },
        count: None,
    }
}

impl BindGroupLayouts {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let camera_scene = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("CameraSceneLayout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let mesh = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MeshLayout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MaterialLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                texture_entry(1, true),
                texture_entry(2, true),
                texture_entry(3, true),
                uniform_entry(4, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let light = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("LightLayout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });

        let gbuffer = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBufferLayout"),
            entries: &[
                texture_entry(0, false),
                texture_entry(1, false),
                texture_entry(2, false),
                depth_entry(3, wgpu::TextureViewDimension::D2),
            ],
        });

        let lighting_lights = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("LightingLightsLayout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                depth_entry(2, wgpu::TextureViewDimension::D2Array),
                depth_entry(3, wgpu::TextureViewDimension::D2Array),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        });

        let output = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("OutputLayout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                texture_entry(1, true),
            ],
        });

        let shadow_debug = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ShadowDebugLayout"),
            entries: &[depth_entry(0, wgpu::TextureViewDimension::D2)],
        });

        Self {
            camera_scene,
            mesh,
            material,
            light,
            gbuffer,
            lighting_lights,
            output,
            shadow_debug,
        }
    }
}

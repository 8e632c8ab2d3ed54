use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use super::assets::{Assets, Handle};
use super::gbuffer;
use super::layouts::BindGroupLayouts;
use super::material::{Material, MaterialId, MaterialKind, PassKind, ShaderHooks};
use super::pipeline_builder::PipelineBuilder;
use super::texture::Texture;
use super::vertex::Vertex;

const GEOMETRY_SHADER: &str = include_str!("shader/geometry.wgsl");
const FORWARD_SHADER: &str = include_str!("shader/forward.wgsl");

const ALBEDO_BEGIN: &str = "//--HOOK_ALBEDO_BEGIN--//";
const ALBEDO_END: &str = "//--HOOK_ALBEDO_END--//";
const UNIFORMS_MARKER: &str = "//--HOOK_UNIFORMS--//";

/// Albedo hook used by basic materials: flat color, no texture fetch.
const BASIC_ALBEDO_HOOK: &str =
    "fn get_albedo_color(uv: vec2<f32>) -> vec4<f32> { return material.base_color; }";

/// Scalar material parameters, re-pushed every frame for live materials.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    /// x = alpha cutoff, y = opacity, z = alpha-mask flag.
    pub params: [f32; 4],
}

impl MaterialUniform {
    fn from_material(material: &Material) -> Self {
        let base_color = match &material.kind {
            MaterialKind::Basic { color } => *color,
            _ => [1.0, 1.0, 1.0, 1.0],
        };
        let mask_flag = if material.alpha_mode == super::material::AlphaMode::Mask {
            1.0
        } else {
            0.0
        };
        Self {
            base_color,
            params: [material.alpha_cutoff, material.opacity, mask_flag, 0.0],
        }
    }
}

/// Substitute the optional hooks into a base shader. The albedo hook
/// replaces the whole default implementation between its markers; the
/// uniforms hook is spliced at the declaration marker.
pub(crate) fn apply_hooks(base: &str, hooks: &ShaderHooks) -> String {
    let mut source = base.to_string();

    if let Some(albedo) = &hooks.albedo {
        if let (Some(start), Some(end)) = (source.find(ALBEDO_BEGIN), source.find(ALBEDO_END)) {
            source.replace_range(start..end + ALBEDO_END.len(), albedo);
        } else {
            log::warn!("Shader has no albedo hook markers, hook ignored");
        }
    }

    if let Some(uniforms) = &hooks.uniforms {
        source = source.replace(UNIFORMS_MARKER, uniforms);
    }

    source
}

/// How one material texture slot binds: a resident cache entry or the
/// built-in placeholder for that slot (white albedo, flat normal,
/// zero-metal/full-rough).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureSlot {
    Resident(Handle<Texture>),
    Placeholder,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TextureSlots {
    pub albedo: TextureSlot,
    pub normal: TextureSlot,
    pub metal_roughness: TextureSlot,
}

/// Resolve the three texture slots for a material without touching the GPU.
/// `resident` is the number of textures in the cache; handles index
/// append-only storage, so a handle is resident exactly when its index is
/// below that count. A PBR material whose albedo is not resident cannot bind
/// at all and resolves to `None`; optional maps fall back to their
/// placeholders.
pub(crate) fn resolve_texture_slots(material: &Material, resident: usize) -> Option<TextureSlots> {
    let is_resident = |handle: Handle<Texture>| handle.index() < resident;
    let optional = |slot: Option<Handle<Texture>>| match slot {
        Some(handle) if is_resident(handle) => TextureSlot::Resident(handle),
        _ => TextureSlot::Placeholder,
    };

    match material.kind {
        MaterialKind::Pbr {
            albedo,
            normal,
            metal_roughness,
        } => {
            if !is_resident(albedo) {
                return None;
            }
            Some(TextureSlots {
                albedo: TextureSlot::Resident(albedo),
                normal: optional(normal),
                metal_roughness: optional(metal_roughness),
            })
        }
        _ => Some(TextureSlots {
            albedo: TextureSlot::Placeholder,
            normal: TextureSlot::Placeholder,
            metal_roughness: TextureSlot::Placeholder,
        }),
    }
}

/// Memoizes one pipeline per (material identity, pass) and one bind group
/// per material. A cached `None` means the material declares no shader for
/// that pass and the draw is skipped.
pub(crate) struct MaterialPipelines {
    geometry_layout: wgpu::PipelineLayout,
    forward_layout: wgpu::PipelineLayout,
    material_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<(MaterialId, PassKind), Option<wgpu::RenderPipeline>>,
    bind_groups: HashMap<MaterialId, wgpu::BindGroup>,
    uniform_buffers: HashMap<MaterialId, wgpu::Buffer>,
    sampler: wgpu::Sampler,
    placeholder_normal: Texture,
    placeholder_metal_roughness: Texture,
    placeholder_white: Texture,
}

impl MaterialPipelines {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
    ) -> Self {
        let geometry_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GeometryPipelineLayout"),
            bind_group_layouts: &[&layouts.camera_scene, &layouts.mesh, &layouts.material],
            push_constant_ranges: &[],
        });

        let forward_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ForwardPipelineLayout"),
            bind_group_layouts: &[
                &layouts.camera_scene,
                &layouts.mesh,
                &layouts.material,
                &layouts.light,
            ],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("MaterialSampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            geometry_layout,
            forward_layout,
            material_layout: layouts.material.clone(),
            pipelines: HashMap::new(),
            bind_groups: HashMap::new(),
            uniform_buffers: HashMap::new(),
            sampler,
            placeholder_normal: Texture::flat_normal(device, queue),
            placeholder_metal_roughness: Texture::default_metal_roughness(device, queue),
            placeholder_white: Texture::white(device, queue),
        }
    }

    /// Pipeline for this material and pass, building it on first use.
    /// Returns `None` when the material has no shader for the pass.
    pub(crate) fn pipeline(
        &mut self,
        device: &wgpu::Device,
        id: MaterialId,
        material: &Material,
        pass: PassKind,
    ) -> Option<&wgpu::RenderPipeline> {
        if !self.pipelines.contains_key(&(id, pass)) {
            let built = self.build_pipeline(device, material, pass);
            if built.is_none() {
                log::warn!(
                    "Material {} has no shader for {:?} pass, draws skipped",
                    material.name,
                    pass
                );
            }
            self.pipelines.insert((id, pass), built);
        }
        self.pipelines.get(&(id, pass)).and_then(|p| p.as_ref())
    }

    fn build_pipeline(
        &self,
        device: &wgpu::Device,
        material: &Material,
        pass: PassKind,
    ) -> Option<wgpu::RenderPipeline> {
        if !material.supports_pass(pass) {
            return None;
        }

        let source = match (&material.kind, pass) {
            (MaterialKind::Custom { geometry_source, .. }, PassKind::Geometry) => {
                geometry_source.clone()?
            }
            (MaterialKind::Custom { forward_source, .. }, PassKind::Forward) => {
                forward_source.clone()?
            }
            (MaterialKind::Basic { .. }, _) => {
                let mut hooks = material.hooks.clone();
                if hooks.albedo.is_none() {
                    hooks.albedo = Some(BASIC_ALBEDO_HOOK.to_string());
                }
                apply_hooks(base_shader(pass), &hooks)
            }
            (MaterialKind::Pbr { .. }, _) => apply_hooks(base_shader(pass), &material.hooks),
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{}-{:?}", material.name, pass)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layout = match pass {
            PassKind::Geometry => &self.geometry_layout,
            PassKind::Forward => &self.forward_layout,
        };

        let mut builder = PipelineBuilder::new(device, layout, &shader)
            .with_label(&material.name)
            .with_vertex_buffer(Vertex::layout());

        if material.double_sided {
            builder = builder.with_no_culling();
        }

        let pipeline = match pass {
            PassKind::Geometry => builder
                .with_color_target(gbuffer::ALBEDO_FORMAT, None)
                .with_color_target(gbuffer::NORMAL_FORMAT, None)
                .with_color_target(gbuffer::METAL_ROUGHNESS_FORMAT, None)
                .with_depth_stencil(gbuffer::DEPTH_FORMAT, true, wgpu::CompareFunction::Less)
                .build(),
            PassKind::Forward => builder
                .with_color_target(
                    super::passes::LIGHTING_FORMAT,
                    Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                )
                .with_depth_stencil(gbuffer::DEPTH_FORMAT, false, wgpu::CompareFunction::Less)
                .build(),
        };

        Some(pipeline)
    }

    /// Bind group for the material's textures and scalars, building it on
    /// first use. A PBR material whose albedo texture is missing from the
    /// cache gets no bind group and is skipped.
    pub(crate) fn bind_group(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        assets: &Assets,
        id: MaterialId,
        material: &Material,
    ) -> Option<&wgpu::BindGroup> {
        if !self.bind_groups.contains_key(&id) {
            let slots = match resolve_texture_slots(material, assets.textures.len()) {
                Some(slots) => slots,
                None => {
                    log::warn!(
                        "Material {} albedo texture not loaded, skipping",
                        material.name
                    );
                    return None;
                }
            };

            let albedo_view = match slots.albedo {
                TextureSlot::Resident(handle) => assets
                    .textures
                    .get(handle)
                    .map(|t| &t.view)
                    .unwrap_or(&self.placeholder_white.view),
                TextureSlot::Placeholder => &self.placeholder_white.view,
            };

            let normal_view = match slots.normal {
                TextureSlot::Resident(handle) => assets
                    .textures
                    .get(handle)
                    .map(|t| &t.view)
                    .unwrap_or(&self.placeholder_normal.view),
                TextureSlot::Placeholder => &self.placeholder_normal.view,
            };

            let metal_roughness_view = match slots.metal_roughness {
                TextureSlot::Resident(handle) => assets
                    .textures
                    .get(handle)
                    .map(|t| &t.view)
                    .unwrap_or(&self.placeholder_metal_roughness.view),
                TextureSlot::Placeholder => &self.placeholder_metal_roughness.view,
            };

            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("MaterialUniformBuffer"),
                size: std::mem::size_of::<MaterialUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            queue.write_buffer(
                &buffer,
                0,
                bytemuck::bytes_of(&MaterialUniform::from_material(material)),
            );

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&material.name),
                layout: &self.material_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(albedo_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(normal_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::TextureView(metal_roughness_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffer.as_entire_binding(),
                    },
                ],
            });

            self.uniform_buffers.insert(id, buffer);
            self.bind_groups.insert(id, bind_group);
        }
        self.bind_groups.get(&id)
    }

    /// Cache lookup without building, for use while a pass is recording.
    pub(crate) fn cached_pipeline(
        &self,
        id: MaterialId,
        pass: PassKind,
    ) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&(id, pass)).and_then(|p| p.as_ref())
    }

    pub(crate) fn cached_bind_group(&self, id: MaterialId) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(&id)
    }

    /// Re-push the scalar uniforms for a material already bound this frame.
    pub(crate) fn update_uniforms(
        &self,
        queue: &wgpu::Queue,
        id: MaterialId,
        material: &Material,
    ) {
        if let Some(buffer) = self.uniform_buffers.get(&id) {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&MaterialUniform::from_material(material)),
            );
        }
    }
}

fn base_shader(pass: PassKind) -> &'static str {
    match pass {
        PassKind::Geometry => GEOMETRY_SHADER,
        PassKind::Forward => FORWARD_SHADER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "//--HOOK_UNIFORMS--//\n\
        //--HOOK_ALBEDO_BEGIN--//\n\
        fn get_albedo_color(uv: vec2<f32>) -> vec4<f32> { return vec4<f32>(1.0); }\n\
        //--HOOK_ALBEDO_END--//\n\
        fn fs() {}";

    #[test]
    fn no_hooks_leaves_default_albedo() {
        let out = apply_hooks(BASE, &ShaderHooks::default());
        assert!(out.contains("return vec4<f32>(1.0);"));
        assert!(out.contains(UNIFORMS_MARKER));
    }

    #[test]
    fn albedo_hook_replaces_marker_block() {
        let hooks = ShaderHooks {
            albedo: Some(
                "fn get_albedo_color(uv: vec2<f32>) -> vec4<f32> { return custom(); }".into(),
            ),
            uniforms: None,
        };
        let out = apply_hooks(BASE, &hooks);
        assert!(out.contains("return custom();"));
        assert!(!out.contains("return vec4<f32>(1.0);"));
        assert!(!out.contains(ALBEDO_BEGIN));
    }

    #[test]
    fn uniforms_hook_splices_declarations() {
        let hooks = ShaderHooks {
            albedo: None,
            uniforms: Some("@group(2) @binding(5) var<uniform> extra: vec4<f32>;".into()),
        };
        let out = apply_hooks(BASE, &hooks);
        assert!(out.contains("var<uniform> extra"));
        assert!(!out.contains(UNIFORMS_MARKER));
    }

    #[test]
    fn base_shaders_carry_the_markers() {
        assert!(GEOMETRY_SHADER.contains(ALBEDO_BEGIN));
        assert!(GEOMETRY_SHADER.contains(ALBEDO_END));
        assert!(GEOMETRY_SHADER.contains(UNIFORMS_MARKER));
        assert!(FORWARD_SHADER.contains(ALBEDO_BEGIN));
        assert!(FORWARD_SHADER.contains(UNIFORMS_MARKER));
    }

    #[test]
    fn material_uniform_is_32_bytes() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn pbr_with_only_albedo_falls_back_to_placeholders() {
        let material = Material::pbr("brick", Handle::new(0));
        let slots = resolve_texture_slots(&material, 1).unwrap();
        assert_eq!(slots.albedo, TextureSlot::Resident(Handle::new(0)));
        assert_eq!(slots.normal, TextureSlot::Placeholder);
        assert_eq!(slots.metal_roughness, TextureSlot::Placeholder);
    }

    #[test]
    fn pbr_with_missing_albedo_cannot_bind() {
        let material = Material::pbr("brick", Handle::new(3));
        assert!(resolve_texture_slots(&material, 1).is_none());
    }

    #[test]
    fn pbr_with_all_maps_resident_binds_them() {
        let material = Material::pbr("brick", Handle::new(0))
            .with_normal(Handle::new(1))
            .with_metal_roughness(Handle::new(2));
        let slots = resolve_texture_slots(&material, 3).unwrap();
        assert_eq!(slots.albedo, TextureSlot::Resident(Handle::new(0)));
        assert_eq!(slots.normal, TextureSlot::Resident(Handle::new(1)));
        assert_eq!(slots.metal_roughness, TextureSlot::Resident(Handle::new(2)));
    }

    #[test]
    fn basic_material_resolves_to_neutral_placeholders() {
        let material = Material::basic("flat", [1.0, 0.0, 0.0, 1.0]);
        let slots = resolve_texture_slots(&material, 0).unwrap();
        assert_eq!(slots.albedo, TextureSlot::Placeholder);
        assert_eq!(slots.normal, TextureSlot::Placeholder);
        assert_eq!(slots.metal_roughness, TextureSlot::Placeholder);
    }
}

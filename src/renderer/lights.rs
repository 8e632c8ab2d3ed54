use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::csm::{self, CascadeSet, SHADOW_CASCADE_COUNT};
use super::layouts::BindGroupLayouts;
use crate::scene::{self, Camera, World, WorldMatrix};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 1;
pub const MAX_SPOT_LIGHTS: usize = 4;

pub const SPOT_SHADOW_NEAR: f32 = 0.1;
pub const SPOT_SHADOW_FAR: f32 = 100.0;

/// Directional light uniform block. The shaders index `cascade_view_proj`
/// with `active_cascade`, so the field order and padding are load-bearing:
/// matrices at 0, splits at 192, direction at 208, color at 224, index at
/// 240, padded to 256 total.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default)]
pub struct DirectionalLightUniform {
    pub cascade_view_proj: [[[f32; 4]; 4]; SHADOW_CASCADE_COUNT],
    pub cascade_splits: [f32; 4],
    pub direction: [f32; 4],
    pub color_intensity: [f32; 4],
    pub active_cascade: u32,
    pub _padding: [u32; 3],
}

impl DirectionalLightUniform {
    fn from_cascades(set: &CascadeSet, direction: Vec3, color: Vec3, intensity: f32) -> Self {
        let mut cascade_view_proj = [[[0.0; 4]; 4]; SHADOW_CASCADE_COUNT];
        for (dst, src) in cascade_view_proj.iter_mut().zip(set.view_proj.iter()) {
            *dst = src.to_cols_array_2d();
        }
        Self {
            cascade_view_proj,
            cascade_splits: [set.splits[1], set.splits[2], set.splits[3], 0.0],
            direction: direction.normalize().extend(0.0).to_array(),
            color_intensity: [color.x, color.y, color.z, intensity],
            active_cascade: 0,
            _padding: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default)]
pub struct SpotLightUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub color_intensity: [f32; 4],
    /// x = cos(inner), y = cos(outer).
    pub cone: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Default)]
pub struct SpotLightsUniform {
    /// x = active spot count.
    pub count: [u32; 4],
    pub spots: [SpotLightUniform; MAX_SPOT_LIGHTS],
}

/// Depth texture array with one render-target view per layer, shared array
/// view for sampling.
struct ShadowAtlas {
    _texture: wgpu::Texture,
    array_view: wgpu::TextureView,
    layer_views: Vec<wgpu::TextureView>,
}

impl ShadowAtlas {
    fn new(device: &wgpu::Device, label: &str, layers: u32, size: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers.max(1),
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label}ArrayView")),
            format: Some(wgpu::TextureFormat::Depth32Float),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            aspect: wgpu::TextureAspect::All,
            base_array_layer: 0,
            array_layer_count: Some(layers.max(1)),
            ..Default::default()
        });

        let mut layer_views = Vec::with_capacity(layers.max(1) as usize);
        for layer in 0..layers.max(1) {
            layer_views.push(texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some(&format!("{label}Layer{layer}")),
                format: Some(wgpu::TextureFormat::Depth32Float),
                dimension: Some(wgpu::TextureViewDimension::D2),
                aspect: wgpu::TextureAspect::All,
                base_array_layer: layer,
                array_layer_count: Some(1),
                ..Default::default()
            }));
        }

        Self {
            _texture: texture,
            array_view,
            layer_views,
        }
    }

    fn layer_view(&self, index: usize) -> &wgpu::TextureView {
        let clamped = index.min(self.layer_views.len().saturating_sub(1));
        if clamped != index {
            log::warn!("Shadow layer {index} out of range, clamping");
        }
        &self.layer_views[clamped]
    }
}

struct LightSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl LightSlot {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str, size: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Owns every light-related GPU resource: one uniform slot per light, the
/// shadow depth arrays, the comparison sampler, and the lighting pass bind
/// group that exposes all of it.
pub(crate) struct LightManager {
    directional: LightSlot,
    spot_slots: Vec<LightSlot>,
    spots_combined: wgpu::Buffer,
    /// Holds the constants 0..SHADOW_CASCADE_COUNT; copied into the
    /// directional block between cascade passes so each pass sees its own
    /// index despite queue writes all landing before submission.
    cascade_index_staging: wgpu::Buffer,
    directional_shadow: ShadowAtlas,
    spot_shadow: ShadowAtlas,
    lighting_bind_group: wgpu::BindGroup,
    directional_active: bool,
    spot_count: usize,
}

impl LightManager {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindGroupLayouts,
        shadow_map_size: u32,
    ) -> Self {
        let directional = LightSlot::new(
            device,
            &layouts.light,
            "DirectionalLightBuffer",
            std::mem::size_of::<DirectionalLightUniform>() as u64,
        );

        let spot_slots = (0..MAX_SPOT_LIGHTS)
            .map(|i| {
                LightSlot::new(
                    device,
                    &layouts.light,
                    &format!("SpotLightBuffer{i}"),
                    std::mem::size_of::<SpotLightUniform>() as u64,
                )
            })
            .collect();

        let spots_combined = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SpotLightsCombinedBuffer"),
            size: std::mem::size_of::<SpotLightsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let cascade_index_staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("CascadeIndexStaging"),
            size: (SHADOW_CASCADE_COUNT * 4) as u64,
            usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let indices: [u32; SHADOW_CASCADE_COUNT] = std::array::from_fn(|i| i as u32);
        queue.write_buffer(&cascade_index_staging, 0, bytemuck::cast_slice(&indices));

        let directional_shadow = ShadowAtlas::new(
            device,
            "DirectionalShadowAtlas",
            (MAX_DIRECTIONAL_LIGHTS * SHADOW_CASCADE_COUNT) as u32,
            shadow_map_size,
        );
        let spot_shadow = ShadowAtlas::new(
            device,
            "SpotShadowAtlas",
            MAX_SPOT_LIGHTS as u32,
            shadow_map_size,
        );

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShadowComparisonSampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let lighting_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("LightingLightsBindGroup"),
            layout: &layouts.lighting_lights,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: directional.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: spots_combined.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&directional_shadow.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&spot_shadow.array_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&comparison_sampler),
                },
            ],
        });

        Self {
            directional,
            spot_slots,
            spots_combined,
            cascade_index_staging,
            directional_shadow,
            spot_shadow,
            lighting_bind_group,
            directional_active: false,
            spot_count: 0,
        }
    }

    /// Gather the scene lights, refit cascades, and rewrite every light
    /// uniform for this frame.
    pub(crate) fn update(
        &mut self,
        queue: &wgpu::Queue,
        world: &World,
        camera: &Camera,
        aspect: f32,
    ) {
        self.update_directional(queue, world, camera, aspect);
        self.update_spots(queue, world);
    }

    fn update_directional(
        &mut self,
        queue: &wgpu::Queue,
        world: &World,
        camera: &Camera,
        aspect: f32,
    ) {
        let mut chosen: Option<scene::DirectionalLight> = None;
        for scene in world.scenes() {
            for (_, light) in scene.world.query::<&scene::DirectionalLight>().iter() {
                if chosen.is_none() {
                    chosen = Some(*light);
                } else {
                    log::warn!(
                        "More than {MAX_DIRECTIONAL_LIGHTS} directional light(s), extra ignored"
                    );
                }
            }
        }

        let corners = camera.frustum_corners_world_space(aspect);
        if chosen.is_some() && corners.is_none() {
            log::warn!("Camera view-projection not invertible, skipping shadow fit");
        }

        let (uniform, active) = directional_frame(chosen, corners, camera.near, camera.far);
        queue.write_buffer(&self.directional.buffer, 0, bytemuck::bytes_of(&uniform));
        self.directional_active = active;
    }

    fn update_spots(&mut self, queue: &wgpu::Queue, world: &World) {
        let mut combined = SpotLightsUniform::default();
        let mut count = 0usize;

        for scene in world.scenes() {
            for (_, (light, world_matrix)) in scene
                .world
                .query::<(&scene::SpotLight, &WorldMatrix)>()
                .iter()
            {
                if count >= MAX_SPOT_LIGHTS {
                    log::warn!("More than {MAX_SPOT_LIGHTS} spot lights, extra ignored");
                    break;
                }

                let position = world_matrix.0.transform_point3(Vec3::ZERO);
                let direction = world_matrix
                    .0
                    .transform_vector3(Vec3::NEG_Z)
                    .normalize_or_zero();
                if direction == Vec3::ZERO {
                    log::warn!("Spot light with degenerate direction skipped");
                    continue;
                }

                let view = Mat4::look_at_rh(
                    position,
                    position + direction,
                    csm::light_up(direction),
                );
                let proj = Mat4::perspective_rh(
                    light.outer_angle * 2.0,
                    1.0,
                    SPOT_SHADOW_NEAR,
                    SPOT_SHADOW_FAR,
                );

                let uniform = SpotLightUniform {
                    view_proj: (proj * view).to_cols_array_2d(),
                    position: position.extend(1.0).to_array(),
                    direction: direction.extend(0.0).to_array(),
                    color_intensity: [
                        light.color.x,
                        light.color.y,
                        light.color.z,
                        light.intensity,
                    ],
                    cone: [light.inner_angle.cos(), light.outer_angle.cos(), 0.0, 0.0],
                };

                queue.write_buffer(
                    &self.spot_slots[count].buffer,
                    0,
                    bytemuck::bytes_of(&uniform),
                );
                combined.spots[count] = uniform;
                count += 1;
            }
        }

        combined.count[0] = count as u32;
        queue.write_buffer(&self.spots_combined, 0, bytemuck::bytes_of(&combined));
        self.spot_count = count;
    }

    /// Patch the active cascade index in the directional block from the
    /// staging constants. Must be recorded on the frame encoder between
    /// cascade passes.
    pub(crate) fn set_active_cascade(&self, encoder: &mut wgpu::CommandEncoder, cascade: usize) {
        encoder.copy_buffer_to_buffer(
            &self.cascade_index_staging,
            (cascade * 4) as u64,
            &self.directional.buffer,
            core::mem::offset_of!(DirectionalLightUniform, active_cascade) as u64,
            4,
        );
    }

    pub(crate) fn directional_active(&self) -> bool {
        self.directional_active
    }

    pub(crate) fn spot_count(&self) -> usize {
        self.spot_count
    }

    pub(crate) fn directional_bind_group(&self) -> &wgpu::BindGroup {
        &self.directional.bind_group
    }

    pub(crate) fn spot_bind_group(&self, index: usize) -> &wgpu::BindGroup {
        &self.spot_slots[index].bind_group
    }

    pub(crate) fn directional_layer_view(&self, cascade: usize) -> &wgpu::TextureView {
        self.directional_shadow.layer_view(cascade)
    }

    pub(crate) fn spot_layer_view(&self, index: usize) -> &wgpu::TextureView {
        self.spot_shadow.layer_view(index)
    }

    pub(crate) fn lighting_bind_group(&self) -> &wgpu::BindGroup {
        &self.lighting_bind_group
    }
}

/// Decide this frame's directional uniform block. A missing or
/// zero-intensity light, or a camera whose frustum corners cannot be
/// recovered, yields the zeroed block so the lighting pass never shades with
/// the previous frame's cascades.
fn directional_frame(
    light: Option<scene::DirectionalLight>,
    corners: Option<[Vec3; 8]>,
    near: f32,
    far: f32,
) -> (DirectionalLightUniform, bool) {
    let light = match light {
        Some(light) if light.intensity > 0.0 => light,
        _ => return (DirectionalLightUniform::default(), false),
    };
    let corners = match corners {
        Some(corners) => corners,
        None => return (DirectionalLightUniform::default(), false),
    };

    let cascades = csm::compute_cascades(&corners, near, far, light.direction);
    let uniform = DirectionalLightUniform::from_cascades(
        &cascades,
        light.direction,
        light.color,
        light.intensity,
    );
    (uniform, true)
}

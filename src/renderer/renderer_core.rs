use std::collections::HashSet;
use std::sync::Arc;

use winit::{dpi::PhysicalSize, window::Window};

use crate::error::RenderError;
use crate::math::{aabb_in_frustum, frustum_planes};
use crate::scene::{
    Camera, MeshComponent, Scene, Transform, TransformComponent, Visible, World, WorldBounds,
    WorldMatrix,
};
use crate::settings::RenderSettings;

use super::assets::{AssetCache, Assets, Handle};
use super::context::RenderContext;
use super::gbuffer::GeometryBuffer;
use super::geometry::Geometry;
use super::layouts::BindGroupLayouts;
use super::lights::LightManager;
use super::material::{Material, MaterialId, PassKind};
use super::material_pipelines::MaterialPipelines;
use super::passes::forward::ForwardPass;
use super::passes::geometry::GeometryPass;
use super::passes::lighting::LightingPass;
use super::passes::output::OutputPass;
use super::passes::shadow::ShadowPass;
use super::passes::DrawMesh;
use super::texture::Texture;
use super::uniforms::{CameraUniform, MeshUniforms, SceneUniform};
use super::vertex::Vertex;

#[derive(Clone, Copy, Debug, Default)]
pub struct RendererStats {
    pub shadow_draw_calls: u32,
    pub geometry_draw_calls: u32,
    pub forward_draw_calls: u32,
    pub culled_meshes: u32,
}

impl RendererStats {
    pub fn total_draw_calls(&self) -> u32 {
        self.shadow_draw_calls + self.geometry_draw_calls + self.forward_draw_calls
    }
}

/// Owns the GPU context, every pass, and the asset and material caches.
/// A frame runs shadow, geometry, lighting, forward and output in that
/// order on a single command encoder.
pub struct Renderer {
    context: RenderContext,
    layouts: BindGroupLayouts,
    camera_buffer: wgpu::Buffer,
    scene_buffer: wgpu::Buffer,
    camera_scene_bind_group: wgpu::BindGroup,
    lights: LightManager,
    gbuffer: GeometryBuffer,
    shadow_pass: ShadowPass,
    lighting_pass: LightingPass,
    output_pass: OutputPass,
    pipelines: MaterialPipelines,
    assets: Assets,
    materials: AssetCache<Material>,
    frustum_culling: bool,
    settings: RenderSettings,
    stats: RendererStats,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, settings: RenderSettings) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let context = RenderContext::new(window, size, &settings).await?;
        Ok(Self::from_context(context, settings))
    }

    pub fn new_blocking(
        window: Arc<Window>,
        settings: RenderSettings,
    ) -> Result<Self, RenderError> {
        pollster::block_on(Self::new(window, settings))
    }

    fn from_context(context: RenderContext, settings: RenderSettings) -> Self {
        let device = &context.device;
        let layouts = BindGroupLayouts::new(device);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("CameraBuffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SceneBuffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CameraSceneBindGroup"),
            layout: &layouts.camera_scene,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scene_buffer.as_entire_binding(),
                },
            ],
        });

        let lights = LightManager::new(device, &context.queue, &layouts, settings.shadow_map_size);
        let gbuffer = GeometryBuffer::new(device, &layouts, context.size);
        let shadow_pass = ShadowPass::new(device, &layouts);
        let lighting_pass = LightingPass::new(device, &layouts, context.size);
        let output_pass = OutputPass::new(device, &layouts, context.config.format);
        let pipelines = MaterialPipelines::new(device, &context.queue, &layouts);

        Self {
            context,
            layouts,
            camera_buffer,
            scene_buffer,
            camera_scene_bind_group,
            lights,
            gbuffer,
            shadow_pass,
            lighting_pass,
            output_pass,
            pipelines,
            assets: Assets::new(),
            materials: AssetCache::new(),
            frustum_culling: true,
            settings,
            stats: RendererStats::default(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect()
    }

    pub fn set_frustum_culling(&mut self, enabled: bool) {
        self.frustum_culling = enabled;
    }

    pub fn frustum_culling(&self) -> bool {
        self.frustum_culling
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if new_size == self.context.size {
            return;
        }
        self.context.resize(new_size);
        self.gbuffer = GeometryBuffer::new(&self.context.device, &self.layouts, new_size);
        self.lighting_pass.resize(&self.context.device, new_size);
    }

    pub fn create_geometry(&mut self, vertices: &[Vertex], indices: &[u32]) -> Handle<Geometry> {
        self.assets
            .geometries
            .insert(Geometry::new(&self.context.device, vertices, indices))
    }

    pub fn create_cube(&mut self, size: f32) -> Handle<Geometry> {
        self.assets
            .geometries
            .insert(Geometry::cube(&self.context.device, size))
    }

    pub fn create_plane(&mut self, size: f32) -> Handle<Geometry> {
        self.assets
            .geometries
            .insert(Geometry::plane(&self.context.device, size))
    }

    pub fn load_texture(
        &mut self,
        path: &str,
        is_srgb: bool,
    ) -> Result<Handle<Texture>, RenderError> {
        let texture = Texture::from_path(&self.context.device, &self.context.queue, path, is_srgb)?;
        Ok(self.assets.textures.insert(texture))
    }

    pub fn create_color_texture(&mut self, rgba: [u8; 4]) -> Handle<Texture> {
        self.assets.textures.insert(Texture::from_color(
            &self.context.device,
            &self.context.queue,
            rgba,
            None,
        ))
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.insert(material)
    }

    /// Mutable access for live edits. Scalar fields (base color, opacity,
    /// cutoff) take effect next frame; texture and shader changes do not,
    /// since pipelines and bind groups are cached by material identity.
    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Spawn a mesh entity with its GPU state already attached. Entities
    /// assembled by hand get the same state lazily on their first frame.
    pub fn spawn_mesh(
        &self,
        scene: &mut Scene,
        geometry: Handle<Geometry>,
        material: MaterialId,
        transform: Transform,
    ) -> hecs::Entity {
        scene.spawn((
            TransformComponent(transform),
            WorldMatrix(transform.local_matrix()),
            MeshComponent { geometry, material },
            Visible::default(),
            MeshUniforms::new(&self.context.device, &self.layouts.mesh),
        ))
    }

    pub fn render(
        &mut self,
        world: &mut World,
        camera: &Camera,
        elapsed_seconds: f32,
    ) -> Result<(), RenderError> {
        world.update();
        self.stats = RendererStats::default();

        let aspect = self.context.aspect();
        let camera_uniform = CameraUniform::from_camera(camera, aspect);
        self.context
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&camera_uniform));

        let scene_uniform = SceneUniform {
            ambient_color: world.ambient_color.extend(1.0).to_array(),
            time_seconds: elapsed_seconds,
            _padding: [0.0; 3],
        };
        self.context
            .queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&scene_uniform));

        self.prepare_mesh_state(world);
        let (opaque, transparent) = self.build_draw_lists(world, camera, aspect);
        self.lights
            .update(&self.context.queue, world, camera, aspect);

        let frame = self.context.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("FrameEncoder"),
                });

        self.stats.shadow_draw_calls +=
            self.shadow_pass
                .render_directional(&mut encoder, &self.lights, &self.assets, &opaque);
        self.stats.shadow_draw_calls +=
            self.shadow_pass
                .render_spots(&mut encoder, &self.lights, &self.assets, &opaque);

        self.stats.geometry_draw_calls = GeometryPass::render(
            &mut encoder,
            &self.gbuffer,
            &self.camera_scene_bind_group,
            &self.pipelines,
            &self.materials,
            &self.assets,
            &opaque,
        );

        self.lighting_pass.render(
            &mut encoder,
            &self.gbuffer.bind_group,
            self.lights.lighting_bind_group(),
            &self.camera_scene_bind_group,
        );

        self.stats.forward_draw_calls = ForwardPass::render(
            &mut encoder,
            &self.lighting_pass.view,
            &self.gbuffer,
            &self.camera_scene_bind_group,
            self.lights.directional_bind_group(),
            &self.pipelines,
            &self.materials,
            &self.assets,
            &transparent,
        );

        match self.settings.debug_shadow_layer {
            Some(layer) => self.output_pass.render_shadow_debug(
                &self.context.device,
                &mut encoder,
                &surface_view,
                self.lights.directional_layer_view(layer as usize),
            ),
            None => self.output_pass.render(
                &self.context.device,
                &mut encoder,
                &surface_view,
                &self.lighting_pass.view,
            ),
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }

    /// Attach missing per-mesh GPU state and refresh world-space bounds from
    /// the geometry AABBs and this frame's world matrices.
    fn prepare_mesh_state(&mut self, world: &mut World) {
        for scene in world.scenes_mut() {
            let missing_uniforms: Vec<hecs::Entity> = scene
                .world
                .query::<&MeshComponent>()
                .without::<&MeshUniforms>()
                .iter()
                .map(|(entity, _)| entity)
                .collect();
            for entity in missing_uniforms {
                let _ = scene.world.insert_one(
                    entity,
                    MeshUniforms::new(&self.context.device, &self.layouts.mesh),
                );
            }

            for (_, (mesh, matrix, bounds)) in scene
                .world
                .query::<(&MeshComponent, &WorldMatrix, &mut WorldBounds)>()
                .iter()
            {
                if let Some(geometry) = self.assets.geometries.get(mesh.geometry) {
                    bounds.0 = geometry.aabb().transformed(&matrix.0);
                }
            }

            let missing_bounds: Vec<(hecs::Entity, WorldBounds)> = scene
                .world
                .query::<(&MeshComponent, &WorldMatrix)>()
                .without::<&WorldBounds>()
                .iter()
                .filter_map(|(entity, (mesh, matrix))| {
                    self.assets
                        .geometries
                        .get(mesh.geometry)
                        .map(|geometry| (entity, WorldBounds(geometry.aabb().transformed(&matrix.0))))
                })
                .collect();
            for (entity, bounds) in missing_bounds {
                let _ = scene.world.insert_one(entity, bounds);
            }
        }
    }

    /// Cull against the camera frustum and split the survivors into the
    /// opaque and transparent lists, in visit order. The passes coalesce
    /// pipeline switches on consecutive draws with the same material; draw
    /// order itself is up to the scenes.
    fn build_draw_lists(
        &mut self,
        world: &World,
        camera: &Camera,
        aspect: f32,
    ) -> (Vec<DrawMesh>, Vec<DrawMesh>) {
        let planes = frustum_planes(&camera.view_proj(aspect));

        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        let mut used_materials: HashSet<MaterialId> = HashSet::new();

        for scene in world.scenes() {
            for (_, (mesh, matrix, bounds, uniforms, visible)) in scene
                .world
                .query::<(
                    &MeshComponent,
                    &WorldMatrix,
                    &WorldBounds,
                    &MeshUniforms,
                    Option<&Visible>,
                )>()
                .iter()
            {
                if !visible.map(|v| v.0).unwrap_or(true) {
                    continue;
                }
                if self.frustum_culling && !aabb_in_frustum(&bounds.0, &planes) {
                    self.stats.culled_meshes += 1;
                    continue;
                }
                let Some(material) = self.materials.get(mesh.material) else {
                    log::warn!("Mesh references missing material, skipping");
                    continue;
                };

                uniforms.write(&self.context.queue, matrix.0);
                used_materials.insert(mesh.material);

                let draw = DrawMesh {
                    geometry: mesh.geometry,
                    material: mesh.material,
                    mesh_bind_group: uniforms.bind_group.clone(),
                };

                if material.is_transparent() || !material.supports_pass(PassKind::Geometry) {
                    transparent.push(draw);
                } else {
                    opaque.push(draw);
                }
            }
        }

        for id in used_materials {
            let Some(material) = self.materials.get(id) else {
                continue;
            };
            for pass in [PassKind::Geometry, PassKind::Forward] {
                if material.supports_pass(pass) {
                    self.pipelines
                        .pipeline(&self.context.device, id, material, pass);
                }
            }
            self.pipelines.bind_group(
                &self.context.device,
                &self.context.queue,
                &self.assets,
                id,
                material,
            );
            self.pipelines
                .update_uniforms(&self.context.queue, id, material);
        }

        (opaque, transparent)
    }
}

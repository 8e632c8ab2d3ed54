use crate::renderer::assets::{AssetCache, Assets};
use crate::renderer::gbuffer::GeometryBuffer;
use crate::renderer::material::{Material, PassKind};
use crate::renderer::material_pipelines::MaterialPipelines;

use super::DrawMesh;

/// Opaque MRT pass: albedo, normal, metal/roughness plus depth. Draws in
/// visit order, switching pipelines only when the material identity changes.
pub(crate) struct GeometryPass;

impl GeometryPass {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        encoder: &mut wgpu::CommandEncoder,
        gbuffer: &GeometryBuffer,
        camera_scene_bind_group: &wgpu::BindGroup,
        pipelines: &MaterialPipelines,
        materials: &AssetCache<Material>,
        assets: &Assets,
        draws: &[DrawMesh],
    ) -> u32 {
        let clear = wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GeometryPass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: &gbuffer.albedo_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: clear,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &gbuffer.normal_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: clear,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: &gbuffer.metal_roughness_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: clear,
                }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, camera_scene_bind_group, &[]);

        let mut current_material = None;
        let mut draw_calls = 0;

        for draw in draws {
            if materials.get(draw.material).is_none() {
                log::warn!("Draw references missing material, skipping");
                continue;
            }

            let Some(pipeline) = pipelines.cached_pipeline(draw.material, PassKind::Geometry)
            else {
                continue;
            };
            let Some(material_bind_group) = pipelines.cached_bind_group(draw.material) else {
                continue;
            };
            let Some(geometry) = assets.geometries.get(draw.geometry) else {
                log::warn!("Draw references missing geometry, skipping");
                continue;
            };

            if current_material != Some(draw.material) {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(2, material_bind_group, &[]);
                current_material = Some(draw.material);
            }

            pass.set_bind_group(1, &draw.mesh_bind_group, &[]);
            pass.set_vertex_buffer(0, geometry.vertex_buffer().slice(..));
            pass.set_index_buffer(geometry.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..geometry.index_count(), 0, 0..1);
            draw_calls += 1;
        }

        draw_calls
    }
}

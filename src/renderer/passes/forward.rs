use crate::renderer::assets::{AssetCache, Assets};
use crate::renderer::gbuffer::GeometryBuffer;
use crate::renderer::material::{Material, PassKind};
use crate::renderer::material_pipelines::MaterialPipelines;

use super::DrawMesh;

/// Transparent pass over the lit image: depth-tested against the G-buffer
/// depth but never writing it, premultiplied-over blending, caller order.
pub(crate) struct ForwardPass;

impl ForwardPass {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn render(
        encoder: &mut wgpu::CommandEncoder,
        target_view: &wgpu::TextureView,
        gbuffer: &GeometryBuffer,
        camera_scene_bind_group: &wgpu::BindGroup,
        directional_bind_group: &wgpu::BindGroup,
        pipelines: &MaterialPipelines,
        materials: &AssetCache<Material>,
        assets: &Assets,
        draws: &[DrawMesh],
    ) -> u32 {
        if draws.is_empty() {
            return 0;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ForwardPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target_view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, camera_scene_bind_group, &[]);
        pass.set_bind_group(3, directional_bind_group, &[]);

        let mut current_material = None;
        let mut draw_calls = 0;

        for draw in draws {
            if materials.get(draw.material).is_none() {
                log::warn!("Draw references missing material, skipping");
                continue;
            }

            let Some(pipeline) = pipelines.cached_pipeline(draw.material, PassKind::Forward)
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

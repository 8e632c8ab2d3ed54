use crate::renderer::assets::Assets;
use crate::renderer::csm::SHADOW_CASCADE_COUNT;
use crate::renderer::layouts::BindGroupLayouts;
use crate::renderer::lights::LightManager;
use crate::renderer::pipeline_builder::PipelineBuilder;
use crate::renderer::vertex::Vertex;

use super::DrawMesh;

const DIRECTIONAL_SHADER: &str = include_str!("../shader/shadow.wgsl");
const SPOT_SHADER: &str = include_str!("../shader/shadow_spot.wgsl");

/// Bias keeps acne off the front-face-culled casters.
const DEPTH_BIAS_CONSTANT: i32 = 4;
const DEPTH_BIAS_SLOPE: f32 = 2.0;

/// Depth-only renders into the shadow atlases: one per directional cascade,
/// one per spot light.
pub(crate) struct ShadowPass {
    directional_pipeline: wgpu::RenderPipeline,
    spot_pipeline: wgpu::RenderPipeline,
}

impl ShadowPass {
    pub(crate) fn new(device: &wgpu::Device, layouts: &BindGroupLayouts) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShadowPipelineLayout"),
            bind_group_layouts: &[&layouts.light, &layouts.mesh],
            push_constant_ranges: &[],
        });

        let directional_pipeline = Self::depth_pipeline(
            device,
            &layout,
            DIRECTIONAL_SHADER,
            "DirectionalShadowPipeline",
        );
        let spot_pipeline = Self::depth_pipeline(device, &layout, SPOT_SHADER, "SpotShadowPipeline");

        Self {
            directional_pipeline,
            spot_pipeline,
        }
    }

    fn depth_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        source: &str,
        label: &str,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        PipelineBuilder::new(device, layout, &shader)
            .with_label(label)
            .depth_only()
            .with_vertex_buffer(Vertex::layout())
            .with_front_face_culling()
            .with_depth_stencil_biased(
                wgpu::TextureFormat::Depth32Float,
                true,
                wgpu::CompareFunction::Less,
                DEPTH_BIAS_CONSTANT,
                DEPTH_BIAS_SLOPE,
            )
            .build()
    }

    /// One depth pass per cascade. The active cascade index is patched into
    /// the light block on the encoder timeline right before each pass.
    pub(crate) fn render_directional(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        lights: &LightManager,
        assets: &Assets,
        draws: &[DrawMesh],
    ) -> u32 {
        if !lights.directional_active() {
            return 0;
        }

        let mut draw_calls = 0;
        for cascade in 0..SHADOW_CASCADE_COUNT {
            lights.set_active_cascade(encoder, cascade);

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("DirectionalShadowPass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: lights.directional_layer_view(cascade),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.directional_pipeline);
            pass.set_bind_group(0, lights.directional_bind_group(), &[]);
            draw_calls += record_draws(&mut pass, assets, draws);
        }
        draw_calls
    }

    pub(crate) fn render_spots(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        lights: &LightManager,
        assets: &Assets,
        draws: &[DrawMesh],
    ) -> u32 {
        let mut draw_calls = 0;
        for spot in 0..lights.spot_count() {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("SpotShadowPass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: lights.spot_layer_view(spot),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.spot_pipeline);
            pass.set_bind_group(0, lights.spot_bind_group(spot), &[]);
            draw_calls += record_draws(&mut pass, assets, draws);
        }
        draw_calls
    }
}

fn record_draws(pass: &mut wgpu::RenderPass<'_>, assets: &Assets, draws: &[DrawMesh]) -> u32 {
    let mut draw_calls = 0;
    for draw in draws {
        let Some(geometry) = assets.geometries.get(draw.geometry) else {
            log::warn!("Shadow caster references missing geometry, skipping");
            continue;
        };
        pass.set_bind_group(1, &draw.mesh_bind_group, &[]);
        pass.set_vertex_buffer(0, geometry.vertex_buffer().slice(..));
        pass.set_index_buffer(geometry.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..geometry.index_count(), 0, 0..1);
        draw_calls += 1;
    }
    draw_calls
}

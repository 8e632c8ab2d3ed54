use crate::renderer::layouts::BindGroupLayouts;
use crate::renderer::pipeline_builder::PipelineBuilder;

const BLIT_SHADER: &str = include_str!("../shader/output.wgsl");
const DEBUG_SHADER: &str = include_str!("../shader/shadow_debug.wgsl");

/// Presents the lit image to the surface, or a raw shadow map layer when a
/// debug layer is configured.
pub(crate) struct OutputPass {
    blit_pipeline: wgpu::RenderPipeline,
    debug_pipeline: wgpu::RenderPipeline,
    blit_layout: wgpu::BindGroupLayout,
    debug_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl OutputPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("OutputShader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_SHADER.into()),
        });
        let debug_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ShadowDebugShader"),
            source: wgpu::ShaderSource::Wgsl(DEBUG_SHADER.into()),
        });

        let blit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("OutputPipelineLayout"),
                bind_group_layouts: &[&layouts.output],
                push_constant_ranges: &[],
            });
        let debug_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ShadowDebugPipelineLayout"),
                bind_group_layouts: &[&layouts.shadow_debug],
                push_constant_ranges: &[],
            });

        let blit_pipeline = PipelineBuilder::new(device, &blit_pipeline_layout, &blit_shader)
            .with_label("OutputPipeline")
            .with_color_target(surface_format, None)
            .with_no_culling()
            .build();
        let debug_pipeline = PipelineBuilder::new(device, &debug_pipeline_layout, &debug_shader)
            .with_label("ShadowDebugPipeline")
            .with_color_target(surface_format, None)
            .with_no_culling()
            .build();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("OutputSampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            blit_pipeline,
            debug_pipeline,
            blit_layout: layouts.output.clone(),
            debug_layout: layouts.shadow_debug.clone(),
            sampler,
        }
    }

    pub(crate) fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        lit_view: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("OutputBindGroup"),
            layout: &self.blit_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(lit_view),
                },
            ],
        });

        let mut pass = Self::begin(encoder, surface_view);
        pass.set_pipeline(&self.blit_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    pub(crate) fn render_shadow_debug(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        shadow_layer_view: &wgpu::TextureView,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ShadowDebugBindGroup"),
            layout: &self.debug_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(shadow_layer_view),
            }],
        });

        let mut pass = Self::begin(encoder, surface_view);
        pass.set_pipeline(&self.debug_pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn begin<'encoder>(
        encoder: &'encoder mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'encoder> {
        encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("OutputPass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime()
    }
}

use winit::dpi::PhysicalSize;

use crate::renderer::layouts::BindGroupLayouts;
use crate::renderer::pipeline_builder::PipelineBuilder;

use super::LIGHTING_FORMAT;

const SHADER: &str = include_str!("../shader/lighting.wgsl");

/// Full-screen resolve: reads the G-buffer, shadow atlases and light blocks,
/// writes the lit scene into an HDR color target. The target is recreated on
/// resize; the pipeline is not.
pub(crate) struct LightingPass {
    pipeline: wgpu::RenderPipeline,
    _target: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl LightingPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        layouts: &BindGroupLayouts,
        size: PhysicalSize<u32>,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("LightingShader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("LightingPipelineLayout"),
            bind_group_layouts: &[
                &layouts.gbuffer,
                &layouts.lighting_lights,
                &layouts.camera_scene,
            ],
            push_constant_ranges: &[],
        });

        let pipeline = PipelineBuilder::new(device, &layout, &shader)
            .with_label("LightingPipeline")
            .with_color_target(LIGHTING_FORMAT, None)
            .with_no_culling()
            .build();

        let (target, view) = Self::create_target(device, size);

        Self {
            pipeline,
            _target: target,
            view,
        }
    }

    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        let (target, view) = Self::create_target(device, size);
        self._target = target;
        self.view = view;
    }

    fn create_target(
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("LightingTarget"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LIGHTING_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        (target, view)
    }

    pub(crate) fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        gbuffer_bind_group: &wgpu::BindGroup,
        lights_bind_group: &wgpu::BindGroup,
        camera_scene_bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("LightingPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
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
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, gbuffer_bind_group, &[]);
        pass.set_bind_group(1, lights_bind_group, &[]);
        pass.set_bind_group(2, camera_scene_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

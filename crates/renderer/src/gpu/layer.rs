use anyhow::{anyhow, Result};
use wgpu::util::DeviceExt;

use crate::animator::AnimationSurface;
use crate::runtime::TimeSample;

use super::pipeline::{linear_sampler, CompositePipeline, LiquidPipeline, LAYER_FORMAT};
use super::uniforms::LiquidUniforms;

struct LayerTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    composite_bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// Off-screen texture holding the liquid-gold layer, plus the pipelines that
/// fill it and blend it onto the presented frame.
pub(crate) struct GpuLayer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    liquid: LiquidPipeline,
    composite: CompositePipeline,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: LiquidUniforms,
    target: Option<LayerTarget>,
    max_dimension: u32,
}

impl GpuLayer {
    /// Builds the layer pipelines, failing if the device rejects them.
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertex_module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        max_dimension: u32,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let liquid = LiquidPipeline::new(device, vertex_module);
        let composite = CompositePipeline::new(device, vertex_module, surface_format);
        let sampler = linear_sampler(device, "animator layer sampler");
        let uniforms = LiquidUniforms::new(1, 1);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("liquid uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("liquid uniform bind group"),
            layout: &liquid.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow!("failed to build animator pipelines: {error}"));
        }

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            liquid,
            composite,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            target: None,
            max_dimension,
        })
    }

    pub(crate) fn size(&self) -> Option<(u32, u32)> {
        self.target.as_ref().map(|target| target.size)
    }

    /// Blends the most recent layer contents onto `view`.
    pub(crate) fn composite(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("animator composite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.composite.pipeline);
        render_pass.set_bind_group(0, &target.composite_bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

impl AnimationSurface for GpuLayer {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let width = width.max(1);
        let height = height.max(1);
        if width > self.max_dimension || height > self.max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested layer is {width}x{height}",
                max_dimension = self.max_dimension,
            );
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("animator layer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let composite_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("animator composite bind group"),
            layout: &self.composite.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        self.target = Some(LayerTarget {
            _texture: texture,
            view,
            composite_bind_group,
            size: (width, height),
        });
        self.uniforms.set_resolution(width, height);
        Ok(())
    }

    fn draw(&mut self, sample: TimeSample) -> Result<()> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| anyhow!("animator layer drawn before it was sized"))?;

        self.uniforms.set_time(sample);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("animator layer encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("animator layer pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.liquid.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    // Pipelines and the uniform buffer go when the layer is dropped.
    fn release(&mut self) {
        if let Some(target) = self.target.take() {
            tracing::debug!(
                width = target.size.0,
                height = target.size.1,
                "released animator layer"
            );
        }
    }
}

use std::borrow::Cow;
use std::time::Instant;

use anyhow::{anyhow, Result};
use backdrop::ImageSet;
use image::imageops::FilterType;
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};

use super::pipeline::{linear_sampler, BackdropPipeline};
use super::timeline::FadeEnvelope;
use super::uniforms::{cover_uv_scale, BackdropUniforms};

/// Failed frames upload as a single transparent texel.
const BLANK_TEXEL: [u8; 4] = [0, 0, 0, 0];

struct FrameTexture {
    _texture: wgpu::Texture,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

/// GPU copy of the background image set and the cross-fade between the
/// outgoing and incoming frame.
pub(crate) struct BackdropStack {
    pipeline: BackdropPipeline,
    frames: Vec<FrameTexture>,
    current: usize,
    previous: Option<usize>,
    fade: Option<FadeEnvelope>,
}

impl BackdropStack {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertex_module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        max_dimension: u32,
        images: &ImageSet,
    ) -> Result<Self> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = BackdropPipeline::new(device, vertex_module, surface_format);
        let sampler = linear_sampler(device, "backdrop sampler");

        let frames = images
            .iter()
            .enumerate()
            .map(|(index, frame)| {
                let (data, size) = match frame.image() {
                    Some(image) => {
                        let fitted = fit_to_limit(image, max_dimension);
                        let size = fitted.dimensions();
                        (Cow::Owned(fitted.into_raw()), size)
                    }
                    None => (Cow::Borrowed(&BLANK_TEXEL[..]), (1, 1)),
                };
                upload_frame(device, queue, &pipeline, &sampler, index, &data, size)
            })
            .collect::<Vec<_>>();

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow!("failed to upload background frames: {error}"));
        }

        tracing::debug!(
            frames = frames.len(),
            blank = images.len() - images.loaded_count(),
            "uploaded background frames"
        );

        Ok(Self {
            pipeline,
            frames,
            current: 0,
            previous: None,
            fade: None,
        })
    }

    pub(crate) fn current(&self) -> usize {
        self.current
    }

    pub(crate) fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Starts a cross-fade from the visible frame to `index`.
    pub(crate) fn show(&mut self, index: usize, now: Instant) {
        if index == self.current || index >= self.frames.len() {
            return;
        }
        self.previous = Some(self.current);
        self.current = index;
        self.fade = Some(FadeEnvelope::start(now));
    }

    /// Clears `view` and draws the visible frame(s) at their fade opacity.
    pub(crate) fn encode(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        surface_size: (u32, u32),
        now: Instant,
    ) {
        let mut draws: Vec<(usize, f32)> = Vec::with_capacity(2);
        match (self.previous, self.fade) {
            (Some(previous), Some(fade)) => {
                let mix = fade.at(now);
                if mix.finished {
                    self.previous = None;
                    self.fade = None;
                    draws.push((self.current, 1.0));
                } else {
                    if mix.outgoing > f32::EPSILON {
                        draws.push((previous, mix.outgoing));
                    }
                    if mix.incoming > f32::EPSILON {
                        draws.push((self.current, mix.incoming));
                    }
                }
            }
            _ => {
                self.previous = None;
                self.fade = None;
                draws.push((self.current, 1.0));
            }
        }

        for &(index, opacity) in &draws {
            if let Some(frame) = self.frames.get(index) {
                let uniforms =
                    BackdropUniforms::new(cover_uv_scale(frame.size, surface_size), opacity);
                queue.write_buffer(&frame.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("backdrop pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline.pipeline);
        for (index, _) in draws {
            if let Some(frame) = self.frames.get(index) {
                render_pass.set_bind_group(0, &frame.bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }
    }
}

/// Downscales images the device cannot hold in a single texture.
fn fit_to_limit(image: &RgbaImage, max_dimension: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return image.clone();
    }
    let scale = max_dimension as f32 / width.max(height) as f32;
    let target = (
        ((width as f32 * scale) as u32).clamp(1, max_dimension),
        ((height as f32 * scale) as u32).clamp(1, max_dimension),
    );
    tracing::warn!(
        width,
        height,
        max_dimension,
        "background frame exceeds GPU texture limit; downscaling"
    );
    image::imageops::resize(image, target.0, target.1, FilterType::Triangle)
}

fn upload_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &BackdropPipeline,
    sampler: &wgpu::Sampler,
    index: usize,
    data: &[u8],
    size: (u32, u32),
) -> FrameTexture {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&format!("background frame #{index}")),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        data,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let uniforms = BackdropUniforms::new([1.0, 1.0], 1.0);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("background frame #{index} uniforms")),
        contents: bytemuck::bytes_of(&uniforms),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("background frame #{index} bind group")),
        layout: &pipeline.frame_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    FrameTexture {
        _texture: texture,
        uniform_buffer,
        bind_group,
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn images_within_limit_are_untouched() {
        let image = RgbaImage::from_pixel(64, 32, Rgba([1, 2, 3, 255]));
        let fitted = fit_to_limit(&image, 128);
        assert_eq!(fitted.dimensions(), (64, 32));
        assert_eq!(fitted.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn oversized_images_keep_aspect_ratio() {
        let image = RgbaImage::new(400, 100);
        let fitted = fit_to_limit(&image, 200);
        assert_eq!(fitted.dimensions(), (200, 50));
    }
}

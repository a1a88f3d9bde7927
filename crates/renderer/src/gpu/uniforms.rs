use bytemuck::{Pod, Zeroable};

use crate::runtime::TimeSample;

/// Uniform block of the liquid-gold program (`LiquidParams`, std140).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct LiquidUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

impl LiquidUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time: 0.0,
            _padding: 0.0,
        }
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }

    pub fn set_time(&mut self, sample: TimeSample) {
        self.time = sample.seconds;
    }
}

/// Uniform block of the background program (`BackdropParams`, std140).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub(crate) struct BackdropUniforms {
    pub uv_scale: [f32; 2],
    pub opacity: f32,
    pub _padding: f32,
}

impl BackdropUniforms {
    pub fn new(uv_scale: [f32; 2], opacity: f32) -> Self {
        Self {
            uv_scale,
            opacity: opacity.clamp(0.0, 1.0),
            _padding: 0.0,
        }
    }
}

/// Texture-space scale that makes an image "cover" the surface: the image
/// fills both axes and the overflowing axis is cropped around the centre.
pub(crate) fn cover_uv_scale(image: (u32, u32), surface: (u32, u32)) -> [f32; 2] {
    let image_aspect = image.0.max(1) as f32 / image.1.max(1) as f32;
    let surface_aspect = surface.0.max(1) as f32 / surface.1.max(1) as f32;
    if image_aspect > surface_aspect {
        [surface_aspect / image_aspect, 1.0]
    } else {
        [1.0, image_aspect / surface_aspect]
    }
}

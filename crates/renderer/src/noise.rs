//! CPU mirror of the liquid-gold fragment program.
//!
//! The constants here are the ones baked into `compile::LIQUID_FRAGMENT_GLSL`;
//! the GPU path is the one users see, this one backs still exports and tests.

use image::{Rgba, RgbaImage};

pub const HASH_DOT: [f32; 2] = [12.9898, 78.233];
pub const HASH_SCALE: f32 = 43758.5453;
pub const OCTAVES: usize = 5;
pub const SPATIAL_SCALE: f32 = 3.0;
pub const TIME_SCALE: f32 = 0.2;

pub const GOLD: [f32; 3] = [0.831, 0.686, 0.216];
pub const DEEP_GOLD: [f32; 3] = [0.722, 0.525, 0.043];
pub const LIGHT_GOLD: [f32; 3] = [1.0, 0.922, 0.6];

/// Largest value `fbm` can reach: the sum of octave amplitudes.
pub const FBM_MAX: f32 = 0.96875;

fn fract(value: f32) -> f32 {
    let f = value - value.floor();
    // Tiny negative inputs round up to exactly 1.0.
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn mix3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [mix(a[0], b[0], t), mix(a[1], b[1], t), mix(a[2], b[2], t)]
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `fract(sin(dot(p, k)) * c)`.
pub fn hash(p: [f32; 2]) -> f32 {
    fract((p[0] * HASH_DOT[0] + p[1] * HASH_DOT[1]).sin() * HASH_SCALE)
}

/// Value noise: lattice hashes blended with a smoothstep weight.
pub fn value_noise(p: [f32; 2]) -> f32 {
    let i = [p[0].floor(), p[1].floor()];
    let f = [p[0] - i[0], p[1] - i[1]];

    let a = hash(i);
    let b = hash([i[0] + 1.0, i[1]]);
    let c = hash([i[0], i[1] + 1.0]);
    let d = hash([i[0] + 1.0, i[1] + 1.0]);

    let u = [f[0] * f[0] * (3.0 - 2.0 * f[0]), f[1] * f[1] * (3.0 - 2.0 * f[1])];
    mix(a, b, u[0]) + (c - a) * u[1] * (1.0 - u[0]) + (d - b) * u[0] * u[1]
}

/// Fractal Brownian motion over [`OCTAVES`] octaves.
pub fn fbm(mut p: [f32; 2]) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    for _ in 0..OCTAVES {
        value += amplitude * value_noise(p);
        p = [p[0] * 2.0, p[1] * 2.0];
        amplitude *= 0.5;
    }
    value
}

/// Shaded output for one point of the layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiquidSample {
    pub intensity: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

/// Evaluates the layer at `uv` (0..1, bottom-left origin).
pub fn shade(uv: [f32; 2], aspect: f32, time: f32) -> LiquidSample {
    let p = [uv[0] * SPATIAL_SCALE * aspect, uv[1] * SPATIAL_SCALE];
    let t = time * TIME_SCALE;

    let n1 = fbm([p[0] + t, p[1] + t * 0.5]);
    let n2 = fbm([p[0] + 5.2 - t * 0.7, p[1] + 1.3 - t * 0.3]);

    let flow1 = 0.5 + 0.5 * (p[0] * 2.0 + t * 2.0 + n1 * 4.0).sin();
    let flow2 = 0.5 + 0.5 * (p[1] * 2.0 - t * 1.5 + n2 * 4.0).sin();
    let intensity = (flow1 * flow2).clamp(0.0, 1.0);

    let base = mix3(GOLD, DEEP_GOLD, intensity);
    let color = mix3(base, LIGHT_GOLD, smoothstep(0.4, 0.8, n1) * intensity);
    let brightness = 0.5 + 0.5 * intensity;

    LiquidSample {
        intensity,
        color: [
            color[0] * brightness,
            color[1] * brightness,
            color[2] * brightness,
        ],
        alpha: 0.7 + 0.3 * intensity,
    }
}

/// Renders the layer at `time` seconds into an RGBA image.
pub fn render_still(width: u32, height: u32, time: f32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    let aspect = width as f32 / height as f32;
    let to_byte = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;

    RgbaImage::from_fn(width, height, |x, y| {
        // Pixel centres, flipped so row 0 is the top of the image.
        let uv = [
            (x as f32 + 0.5) / width as f32,
            1.0 - (y as f32 + 0.5) / height as f32,
        ];
        let sample = shade(uv, aspect, time);
        Rgba([
            to_byte(sample.color[0]),
            to_byte(sample.color[1]),
            to_byte(sample.color[2]),
            to_byte(sample.alpha),
        ])
    })
}

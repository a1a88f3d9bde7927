use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles one of the built-in GLSL programs through naga's GLSL frontend.
pub(crate) fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(
        device,
        "fullscreen triangle vertex",
        VERTEX_SHADER_GLSL,
        ShaderStage::Vertex,
    )
}

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// Liquid-gold noise field. The uniform block must match `LiquidUniforms`
/// and the constants must match [`crate::noise`].
pub(crate) const LIQUID_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform LiquidParams {
    vec2 resolution;
    float time;
    float _padding;
} params;

const vec3 GOLD = vec3(0.831, 0.686, 0.216);
const vec3 DEEP_GOLD = vec3(0.722, 0.525, 0.043);
const vec3 LIGHT_GOLD = vec3(1.0, 0.922, 0.6);

float hash(vec2 p) {
    return fract(sin(dot(p, vec2(12.9898, 78.233))) * 43758.5453);
}

float value_noise(vec2 p) {
    vec2 i = floor(p);
    vec2 f = fract(p);
    float a = hash(i);
    float b = hash(i + vec2(1.0, 0.0));
    float c = hash(i + vec2(0.0, 1.0));
    float d = hash(i + vec2(1.0, 1.0));
    vec2 u = f * f * (3.0 - 2.0 * f);
    return mix(a, b, u.x) + (c - a) * u.y * (1.0 - u.x) + (d - b) * u.x * u.y;
}

float fbm(vec2 p) {
    float value = 0.0;
    float amplitude = 0.5;
    for (int octave = 0; octave < 5; octave++) {
        value += amplitude * value_noise(p);
        p *= 2.0;
        amplitude *= 0.5;
    }
    return value;
}

void main() {
    float aspect = params.resolution.x / max(params.resolution.y, 1.0);
    vec2 p = vec2(v_uv.x * 3.0 * aspect, v_uv.y * 3.0);
    float t = params.time * 0.2;

    float n1 = fbm(p + vec2(t, t * 0.5));
    float n2 = fbm(p + vec2(5.2, 1.3) - vec2(t * 0.7, t * 0.3));

    float flow1 = 0.5 + 0.5 * sin(p.x * 2.0 + t * 2.0 + n1 * 4.0);
    float flow2 = 0.5 + 0.5 * sin(p.y * 2.0 - t * 1.5 + n2 * 4.0);
    float intensity = clamp(flow1 * flow2, 0.0, 1.0);

    vec3 color = mix(GOLD, DEEP_GOLD, intensity);
    color = mix(color, LIGHT_GOLD, smoothstep(0.4, 0.8, n1) * intensity);
    color *= 0.5 + 0.5 * intensity;

    outColor = vec4(color, 0.7 + 0.3 * intensity);
}
";

/// Samples the off-screen liquid layer; blending happens in the pipeline.
pub(crate) const COMPOSITE_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D layer_texture;
layout(set = 0, binding = 1) uniform sampler layer_sampler;

void main() {
    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    outColor = texture(sampler2D(layer_texture, layer_sampler), uv);
}
";

/// Draws one background frame with cover fit and a fade opacity.
/// The uniform block must match `BackdropUniforms`.
pub(crate) const BACKDROP_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform BackdropParams {
    vec2 uv_scale;
    float opacity;
    float _padding;
} params;
layout(set = 0, binding = 1) uniform texture2D frame_texture;
layout(set = 0, binding = 2) uniform sampler frame_sampler;

void main() {
    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    uv = (uv - 0.5) * params.uv_scale + 0.5;
    vec4 color = texture(sampler2D(frame_texture, frame_sampler), uv);
    outColor = vec4(color.rgb, color.a * params.opacity);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise;

    fn glsl_float(value: f32) -> String {
        let text = format!("{value}");
        if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        }
    }

    #[test]
    fn liquid_shader_uses_noise_constants() {
        assert!(LIQUID_FRAGMENT_GLSL.contains(&format!(
            "vec2({}, {})",
            glsl_float(noise::HASH_DOT[0]),
            glsl_float(noise::HASH_DOT[1])
        )));
        // The scale has more digits than f32 keeps, so compare parsed values.
        let scale_literal = "43758.5453";
        assert!(LIQUID_FRAGMENT_GLSL.contains(scale_literal));
        assert_eq!(scale_literal.parse::<f32>().unwrap(), noise::HASH_SCALE);
        assert!(LIQUID_FRAGMENT_GLSL.contains(&format!("octave < {}", noise::OCTAVES)));
        for color in [noise::GOLD, noise::DEEP_GOLD, noise::LIGHT_GOLD] {
            let literal = format!(
                "vec3({}, {}, {})",
                glsl_float(color[0]),
                glsl_float(color[1]),
                glsl_float(color[2])
            );
            assert!(LIQUID_FRAGMENT_GLSL.contains(&literal), "missing {literal}");
        }
    }

    #[test]
    fn fragment_programs_declare_output() {
        for source in [
            LIQUID_FRAGMENT_GLSL,
            COMPOSITE_FRAGMENT_GLSL,
            BACKDROP_FRAGMENT_GLSL,
        ] {
            assert!(source.starts_with("#version 450"));
            assert!(source.contains("layout(location = 0) out vec4 outColor;"));
        }
    }
}

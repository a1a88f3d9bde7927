use wgpu::naga::ShaderStage;

use crate::compile::{
    compile_glsl, BACKDROP_FRAGMENT_GLSL, COMPOSITE_FRAGMENT_GLSL, LIQUID_FRAGMENT_GLSL,
};

/// Format of the off-screen animator layer.
pub(crate) const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Adds the layer's colour, weighted by its alpha, onto the frame and leaves
/// the frame's alpha untouched.
pub(crate) const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Pipeline that renders the noise field into the animator layer.
pub(crate) struct LiquidPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
}

impl LiquidPipeline {
    pub fn new(device: &wgpu::Device, vertex_module: &wgpu::ShaderModule) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("liquid uniform layout"),
            entries: &[uniform_entry(0)],
        });
        let fragment_module = compile_glsl(
            device,
            "liquid gold fragment",
            LIQUID_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        );
        let pipeline = fullscreen_pipeline(
            device,
            "liquid pipeline",
            &uniform_layout,
            vertex_module,
            &fragment_module,
            LAYER_FORMAT,
            None,
        );
        Self {
            pipeline,
            uniform_layout,
        }
    }
}

/// Pipeline that blends the animator layer onto the presented frame.
pub(crate) struct CompositePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl CompositePipeline {
    pub fn new(
        device: &wgpu::Device,
        vertex_module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite texture layout"),
            entries: &[texture_entry(0), sampler_entry(1)],
        });
        let fragment_module = compile_glsl(
            device,
            "composite fragment",
            COMPOSITE_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        );
        let pipeline = fullscreen_pipeline(
            device,
            "composite pipeline",
            &texture_layout,
            vertex_module,
            &fragment_module,
            surface_format,
            Some(ADDITIVE_BLEND),
        );
        Self {
            pipeline,
            texture_layout,
        }
    }
}

/// Pipeline that draws one background frame with cover fit and opacity.
pub(crate) struct BackdropPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub frame_layout: wgpu::BindGroupLayout,
}

impl BackdropPipeline {
    pub fn new(
        device: &wgpu::Device,
        vertex_module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop frame layout"),
            entries: &[uniform_entry(0), texture_entry(1), sampler_entry(2)],
        });
        let fragment_module = compile_glsl(
            device,
            "backdrop fragment",
            BACKDROP_FRAGMENT_GLSL,
            ShaderStage::Fragment,
        );
        let pipeline = fullscreen_pipeline(
            device,
            "backdrop pipeline",
            &frame_layout,
            vertex_module,
            &fragment_module,
            surface_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        Self {
            pipeline,
            frame_layout,
        }
    }
}

pub(crate) fn linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    vertex_module: &wgpu::ShaderModule,
    fragment_module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: vertex_module,
            entry_point: Some("main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: fragment_module,
            entry_point: Some("main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview: None,
        cache: None,
    })
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

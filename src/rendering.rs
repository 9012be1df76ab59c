//! Rendering system with wgpu pipelines; implements both geometry sinks.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::sync::Arc;

use crate::error::{Result, VisualizerError};
use crate::params::RenderConfig;
use crate::ribbon::{LineStrip, RibbonMesh, Vertex};
use crate::sink::{GeometrySink, LineStyle, Material, Transform, TransformSink};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Outline is nudged toward the viewer so it wins against the front face
const LINE_LIFT: f32 = 0.01;

/// Uniform buffer shared by all pipelines (one instance per draw kind)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub light_dir: [f32; 4],
}

/// Per-pillar instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PillarInstance {
    pub offset: [f32; 3],
    pub scale: [f32; 3],
}

impl From<&Transform> for PillarInstance {
    fn from(t: &Transform) -> Self {
        Self {
            offset: t.position.to_array(),
            scale: t.scale.to_array(),
        }
    }
}

/// Unit cube centred on the origin, 36 vertices with face normals
pub fn unit_cube() -> Vec<Vertex> {
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, u axis, v axis) with u x v = normal
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let n = Vec3::from_array(normal);
        let u = Vec3::from_array(u) * 0.5;
        let v = Vec3::from_array(v) * 0.5;
        let c = n * 0.5;
        let corners = [c - u - v, c + u - v, c + u + v, c - u + v];

        for i in [0, 1, 2, 0, 2, 3] {
            vertices.push(Vertex {
                position: corners[i].to_array(),
                normal,
            });
        }
    }
    vertices
}

/// GPU buffer that is recreated larger when data outgrows it
struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
}

impl DynamicBuffer {
    const MIN_CAPACITY: u64 = 256;

    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        Self {
            buffer: Self::allocate(device, label, usage, Self::MIN_CAPACITY),
            capacity: Self::MIN_CAPACITY,
            usage,
            label,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &'static str,
        usage: wgpu::BufferUsages,
        size: u64,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let len = bytes.len() as u64;
        if len > self.capacity {
            self.capacity = len.next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.usage, self.capacity);
            tracing::debug!("Grew {} to {} bytes", self.label, self.capacity);
        }
        if len > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

/// One uniform buffer + bind group
struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformSlot {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    background: wgpu::Color,

    ribbon_pipelines: MaterialPipelines,
    line_pipeline: wgpu::RenderPipeline,
    pillar_pipelines: MaterialPipelines,

    ribbon_vertices: DynamicBuffer,
    ribbon_indices: DynamicBuffer,
    ribbon_index_count: u32,
    ribbon_uniforms: UniformSlot,
    ribbon_material: Material,

    line_vertices: DynamicBuffer,
    line_vertex_count: u32,
    line_uniforms: UniformSlot,
    line_color: [f32; 4],

    cube_vertices: wgpu::Buffer,
    cube_vertex_count: u32,
    pillar_instances: DynamicBuffer,
    pillar_count: u32,
    pillar_uniforms: UniformSlot,
    pillar_material: Material,
}

impl RenderSystem {
    /// Create new rendering system
    pub async fn new(
        window: Arc<winit::window::Window>,
        render_config: &RenderConfig,
    ) -> Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(|e| VisualizerError::Render(format!("Failed to create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| VisualizerError::Render("Failed to find suitable GPU adapter".into()))?;

        tracing::info!("GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| VisualizerError::Render(format!("Failed to request device: {}", e)))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| VisualizerError::Render("Surface has no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let mesh_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        };
        let line_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
        };
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PillarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x3],
        };

        let ribbon_pipelines = MaterialPipelines::new(
            &device,
            &pipeline_layout,
            &shader,
            PipelineSpec {
                label: "Ribbon Pipeline",
                vs_entry: "vs_mesh",
                fs_entry: "fs_lit",
                buffers: &[mesh_layout.clone()],
                format: config.format,
                translucent: false,
            },
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            PipelineSpec {
                label: "Line Pipeline",
                vs_entry: "vs_line",
                fs_entry: "fs_flat",
                buffers: &[line_layout],
                format: config.format,
                translucent: false,
            },
        );
        let pillar_pipelines = MaterialPipelines::new(
            &device,
            &pipeline_layout,
            &shader,
            PipelineSpec {
                label: "Pillar Pipeline",
                vs_entry: "vs_pillar",
                fs_entry: "fs_lit",
                buffers: &[mesh_layout, instance_layout],
                format: config.format,
                translucent: false,
            },
        );

        let cube = unit_cube();
        let cube_vertices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cube Vertex Buffer"),
            size: std::mem::size_of_val(cube.as_slice()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&cube_vertices, 0, bytemuck::cast_slice(&cube));

        let [r, g, b, a] = render_config.background.map(f64::from);

        Ok(Self {
            ribbon_vertices: DynamicBuffer::new(
                &device,
                "Ribbon Vertex Buffer",
                wgpu::BufferUsages::VERTEX,
            ),
            ribbon_indices: DynamicBuffer::new(
                &device,
                "Ribbon Index Buffer",
                wgpu::BufferUsages::INDEX,
            ),
            ribbon_index_count: 0,
            ribbon_uniforms: UniformSlot::new(&device, &uniform_layout, "Ribbon Uniforms"),
            ribbon_material: Material::opaque([0.0; 4]),

            line_vertices: DynamicBuffer::new(
                &device,
                "Line Vertex Buffer",
                wgpu::BufferUsages::VERTEX,
            ),
            line_vertex_count: 0,
            line_uniforms: UniformSlot::new(&device, &uniform_layout, "Line Uniforms"),
            line_color: [0.0; 4],

            cube_vertices,
            cube_vertex_count: cube.len() as u32,
            pillar_instances: DynamicBuffer::new(
                &device,
                "Pillar Instance Buffer",
                wgpu::BufferUsages::VERTEX,
            ),
            pillar_count: 0,
            pillar_uniforms: UniformSlot::new(&device, &uniform_layout, "Pillar Uniforms"),
            pillar_material: Material::opaque([0.0; 4]),

            ribbon_pipelines,
            line_pipeline,
            pillar_pipelines,
            background: wgpu::Color { r, g, b, a },
            depth_view,
            surface,
            device,
            queue,
            config,
        })
    }

    /// Reconfigure surface and depth buffer for a new window size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    /// Current surface size in pixels
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn write_uniforms(&self, slot: &UniformSlot, view_proj: Mat4, color: [f32; 4]) {
        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            color,
            light_dir: [0.3, 0.8, -0.5, 0.0],
        };
        self.queue
            .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    /// Draw whatever geometry was last submitted
    pub fn render(&self, view_proj: Mat4) -> std::result::Result<(), wgpu::SurfaceError> {
        self.write_uniforms(&self.ribbon_uniforms, view_proj, self.ribbon_material.color);
        self.write_uniforms(&self.line_uniforms, view_proj, self.line_color);
        self.write_uniforms(&self.pillar_uniforms, view_proj, self.pillar_material.color);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if self.ribbon_index_count > 0 {
                render_pass.set_pipeline(self.ribbon_pipelines.select(&self.ribbon_material));
                render_pass.set_bind_group(0, &self.ribbon_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.ribbon_vertices.buffer.slice(..));
                render_pass.set_index_buffer(
                    self.ribbon_indices.buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..self.ribbon_index_count, 0, 0..1);
            }

            if self.line_vertex_count > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_bind_group(0, &self.line_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.line_vertices.buffer.slice(..));
                render_pass.draw(0..self.line_vertex_count, 0..1);
            }

            if self.pillar_count > 0 {
                render_pass.set_pipeline(self.pillar_pipelines.select(&self.pillar_material));
                render_pass.set_bind_group(0, &self.pillar_uniforms.bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
                render_pass.set_vertex_buffer(1, self.pillar_instances.buffer.slice(..));
                render_pass.draw(0..self.cube_vertex_count, 0..self.pillar_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

impl GeometrySink for RenderSystem {
    fn submit_line(&mut self, positions: &[Vec3], style: &LineStyle) {
        let lifted: Vec<Vec3> = positions.iter().map(|p| *p - Vec3::Z * LINE_LIFT).collect();
        let quads: Vec<[f32; 3]> = LineStrip::from_positions(lifted)
            .outline_quads(style.width)
            .iter()
            .map(|v| v.to_array())
            .collect();

        self.line_vertices
            .write(&self.device, &self.queue, bytemuck::cast_slice(&quads));
        self.line_vertex_count = quads.len() as u32;
        self.line_color = style.color;
    }

    fn submit_ribbon(&mut self, mesh: &RibbonMesh, material: &Material) {
        self.ribbon_vertices
            .write(&self.device, &self.queue, bytemuck::cast_slice(&mesh.vertices));
        self.ribbon_indices
            .write(&self.device, &self.queue, bytemuck::cast_slice(&mesh.indices));
        self.ribbon_index_count = mesh.indices.len() as u32;
        self.ribbon_material = *material;
    }
}

impl TransformSink for RenderSystem {
    fn submit_transforms(&mut self, transforms: &[Transform], material: &Material) {
        let instances: Vec<PillarInstance> = transforms.iter().map(PillarInstance::from).collect();

        self.pillar_instances
            .write(&self.device, &self.queue, bytemuck::cast_slice(&instances));
        self.pillar_count = instances.len() as u32;
        self.pillar_material = *material;
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[derive(Clone)]
struct PipelineSpec<'a> {
    label: &'static str,
    vs_entry: &'static str,
    fs_entry: &'static str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    format: wgpu::TextureFormat,
    translucent: bool,
}

/// Blend and depth-write settings for a material.
///
/// Translucent surfaces blend over what is behind them and leave depth
/// untouched so overlapping translucent instances stay visible.
pub fn blend_for(material: &Material) -> (Option<wgpu::BlendState>, bool) {
    if material.translucent {
        (Some(wgpu::BlendState::ALPHA_BLENDING), false)
    } else {
        (Some(wgpu::BlendState::REPLACE), true)
    }
}

/// Opaque and translucent variants of one pipeline
struct MaterialPipelines {
    opaque: wgpu::RenderPipeline,
    translucent: wgpu::RenderPipeline,
}

impl MaterialPipelines {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        spec: PipelineSpec<'_>,
    ) -> Self {
        let translucent = PipelineSpec {
            translucent: true,
            ..spec.clone()
        };
        Self {
            opaque: create_pipeline(device, layout, shader, spec),
            translucent: create_pipeline(device, layout, shader, translucent),
        }
    }

    fn select(&self, material: &Material) -> &wgpu::RenderPipeline {
        if material.translucent {
            &self.translucent
        } else {
            &self.opaque
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    spec: PipelineSpec<'_>,
) -> wgpu::RenderPipeline {
    let (blend, depth_write) = blend_for(&Material {
        color: [0.0; 4],
        translucent: spec.translucent,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(spec.label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(spec.vs_entry),
            buffers: spec.buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(spec.fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: spec.format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Ribbon and outline are seen from both sides
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

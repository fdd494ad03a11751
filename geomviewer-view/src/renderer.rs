//! wgpu scene renderer
//!
//! The single seam to the GPU backend: surface and device setup, one
//! radial-gradient background pass, a lit fill pass per scene node and a
//! line pass for nodes with edge display enabled. Vertex and index buffers
//! are rebuilt per frame; scenes here are small enough that upload cost is
//! not a concern.

use crate::camera::Camera;
use crate::controller::Background;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use geomviewer_core::{Error, Result, SceneGraph, SceneNode, Vector3f};
use nalgebra::Matrix4;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Vertex data shared by the fill and line pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl SceneVertex {
    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct BackgroundUniform {
    center_color: [f32; 4],
    edge_color: [f32; 4],
}

impl From<Background> for BackgroundUniform {
    fn from(background: Background) -> Self {
        let (center, edge) = match background {
            Background::Solid(color) => (color, color),
            Background::RadialGradient { center, edge } => (center, edge),
        };
        Self {
            center_color: [center[0] as f32, center[1] as f32, center[2] as f32, 1.0],
            edge_color: [edge[0] as f32, edge[1] as f32, edge[2] as f32, 1.0],
        }
    }
}

/// Default surface color for meshes without vertex colors
const SURFACE_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

pub struct SceneRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    background_pipeline: wgpu::RenderPipeline,
    mesh_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    background_buffer: wgpu::Buffer,
    background_bind_group: wgpu::BindGroup,
}

impl SceneRenderer {
    /// Create the renderer for a window surface
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {:?}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| Error::Gpu("No suitable GPU adapter found".to_string()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Scene Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::Gpu(format!("Failed to create device: {:?}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&CameraUniform {
                view_proj: Matrix4::identity().into(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let background_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Background Buffer"),
            contents: bytemuck::bytes_of(&BackgroundUniform::from(Background::Solid([
                0.0, 0.0, 0.0,
            ]))),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout_entry = wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_layout_entry],
                label: Some("camera_bind_group_layout"),
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let background_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_layout_entry],
                label: Some("background_bind_group_layout"),
            });
        let background_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &background_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: background_buffer.as_entire_binding(),
            }],
            label: Some("background_bind_group"),
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });
        let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BACKGROUND_SHADER.into()),
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });
        let background_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&background_bind_group_layout],
            push_constant_ranges: &[],
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &mesh_layout,
            &mesh_shader,
            "fs_lit",
            &[SceneVertex::desc()],
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
            wgpu::CompareFunction::Less,
            true,
            "Mesh Pipeline",
        );
        let line_pipeline = create_pipeline(
            &device,
            &mesh_layout,
            &mesh_shader,
            "fs_flat",
            &[SceneVertex::desc()],
            wgpu::PrimitiveTopology::LineList,
            surface_format,
            wgpu::CompareFunction::LessEqual,
            false,
            "Line Pipeline",
        );
        let background_pipeline = create_pipeline(
            &device,
            &background_layout,
            &background_shader,
            "fs_main",
            &[],
            wgpu::PrimitiveTopology::TriangleList,
            surface_format,
            wgpu::CompareFunction::Always,
            false,
            "Background Pipeline",
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            background_pipeline,
            mesh_pipeline,
            line_pipeline,
            camera_buffer,
            camera_bind_group,
            background_buffer,
            background_bind_group,
        })
    }

    /// Resize the renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    /// Draw one frame of the scene
    pub fn render(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        background: Background,
    ) -> Result<()> {
        let view_proj = camera.projection_matrix() * camera.view_matrix();
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform {
                view_proj: view_proj.into(),
            }),
        );
        self.queue.write_buffer(
            &self.background_buffer,
            0,
            bytemuck::bytes_of(&BackgroundUniform::from(background)),
        );

        let node_buffers: Vec<NodeBuffers> = scene
            .iter()
            .filter(|node| !node.mesh.is_empty())
            .map(|node| self.build_node_buffers(node))
            .collect();

        let output = self
            .surface
            .get_current_texture()
            .map_err(|e| Error::Gpu(format!("Failed to get surface texture: {:?}", e)))?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = self.create_depth_texture();
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.background_pipeline);
            render_pass.set_bind_group(0, &self.background_bind_group, &[]);
            render_pass.draw(0..3, 0..1);

            render_pass.set_pipeline(&self.mesh_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for buffers in &node_buffers {
                render_pass.set_vertex_buffer(0, buffers.vertices.slice(..));
                render_pass
                    .set_index_buffer(buffers.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..buffers.index_count, 0, 0..1);
            }

            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for buffers in &node_buffers {
                let Some(edges) = &buffers.edges else { continue };
                render_pass.set_vertex_buffer(0, edges.vertices.slice(..));
                render_pass.set_index_buffer(edges.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..edges.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn create_depth_texture(&self) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: self.surface_config.width,
                height: self.surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    fn build_node_buffers(&self, node: &SceneNode) -> NodeBuffers {
        let mesh = &node.mesh;
        let fallback_normal = Vector3f::new(0.0, 0.0, 1.0);

        let vertices: Vec<SceneVertex> = mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| {
                let normal = mesh
                    .normals
                    .as_ref()
                    .map(|n| n[i])
                    .unwrap_or(fallback_normal);
                let color = mesh
                    .colors
                    .as_ref()
                    .map(|c| {
                        [
                            c[i][0] as f32 / 255.0,
                            c[i][1] as f32 / 255.0,
                            c[i][2] as f32 / 255.0,
                        ]
                    })
                    .unwrap_or(SURFACE_COLOR);
                SceneVertex {
                    position: [vertex.x, vertex.y, vertex.z],
                    normal: [normal.x, normal.y, normal.z],
                    color,
                }
            })
            .collect();

        let indices: Vec<u32> = mesh
            .faces
            .iter()
            .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
            .collect();

        let edges = node.props.edge_visibility.then(|| {
            let edge_vertices: Vec<SceneVertex> = vertices
                .iter()
                .map(|v| SceneVertex {
                    color: node.props.edge_color,
                    ..*v
                })
                .collect();
            let edge_indices: Vec<u32> = mesh
                .edges()
                .iter()
                .flat_map(|e| [e[0] as u32, e[1] as u32])
                .collect();
            DrawBuffers {
                index_count: edge_indices.len() as u32,
                vertices: self.vertex_buffer(&edge_vertices),
                indices: self.index_buffer(&edge_indices),
            }
        });

        NodeBuffers {
            index_count: indices.len() as u32,
            vertices: self.vertex_buffer(&vertices),
            indices: self.index_buffer(&indices),
            edges,
        }
    }

    fn vertex_buffer(&self, vertices: &[SceneVertex]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Scene Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn index_buffer(&self, indices: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Scene Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
    }
}

struct DrawBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct NodeBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    edges: Option<DrawBuffers>,
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    buffers: &[wgpu::VertexBufferLayout],
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
    depth_compare: wgpu::CompareFunction,
    depth_write: bool,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fragment_entry,
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: depth_write,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

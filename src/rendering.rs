//! Rendering system: device, surface, pipelines and per-frame command recording.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DemoError, Result};
use crate::frame::{FrameBindGroupLayouts, FrameResource, GpuCompletionCounter};
use crate::geometry::Vertex;
use crate::gpu::{capture_errors, log_uncaptured_errors};
use crate::params::RenderConfig;
use crate::scene::Scene;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// What happened to a frame handed to `draw`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Presented,
    /// The back buffer was unavailable (surface lost, outdated or timed out)
    Skipped,
}

/// Rendering system managing the wgpu device, the surface and one pipeline
/// per primitive topology used by the scene.
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    layouts: FrameBindGroupLayouts,
    pipelines: HashMap<wgpu::PrimitiveTopology, wgpu::RenderPipeline>,
    clear_color: wgpu::Color,
}

impl RenderSystem {
    /// Create the rendering system and upload the scene's static meshes.
    pub async fn new(
        window: Arc<winit::window::Window>,
        scene: &mut Scene,
        render_config: &RenderConfig,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Window has 'static lifetime via Arc
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(DemoError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?}, {:?})", info.name, info.backend, info.device_type);

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
            .await?;
        log_uncaptured_errors(&device);
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        // Colours are authored for a UNORM back buffer
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| DemoError::Gpu {
                what: "surface",
                message: "adapter reports no supported formats".to_string(),
            })?;
        log::info!("Surface format: {surface_format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config)?;

        let shader = create_shader(&device)?;

        let (layouts, pipeline_layout) = capture_errors(&device, "pipeline layout", || {
            let layouts = FrameBindGroupLayouts::new(&device);
            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&layouts.object, &layouts.pass],
                push_constant_ranges: &[],
            });
            (layouts, pipeline_layout)
        })?;

        let pipelines = scene
            .items
            .topologies()
            .into_iter()
            .map(|topology| -> Result<_> {
                let pipeline = capture_errors(&device, "render pipeline", || {
                    create_pipeline(&device, &pipeline_layout, &shader, config.format, topology)
                })?;
                Ok((topology, pipeline))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        scene.upload(&device)?;

        let [r, g, b, a] = render_config.clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            layouts,
            pipelines,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Completion counter on this system's queue
    pub fn completion_counter(&self) -> GpuCompletionCounter {
        GpuCompletionCounter::new(Arc::clone(&self.device), Arc::clone(&self.queue))
    }

    /// Buffers for one ring slot: a single pass record, one object record
    /// per render item and the dynamic wave vertices.
    pub fn create_frame_resource(
        &self,
        object_count: usize,
        wave_vertex_count: usize,
    ) -> Result<FrameResource> {
        FrameResource::new(&self.device, &self.layouts, 1, object_count, wave_vertex_count)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface and depth buffer; zero sizes (minimised) are ignored
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config)?;
        }
        Ok(())
    }

    /// Record, submit and present one frame from `frame`'s buffers.
    pub fn draw(&mut self, scene: &Scene, frame: &mut FrameResource) -> Result<DrawOutcome> {
        frame.upload(&self.queue);
        let frame = &*frame;

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(error @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface {error}, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(DrawOutcome::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring the back buffer, skipping frame");
                return Ok(DrawOutcome::Skipped);
            }
            Err(error) => return Err(error.into()),
        };
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
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(1, &frame.pass_bind_group, &[]);

            let mut bound_topology = None;
            for item in scene.items.iter() {
                if bound_topology != Some(item.primitive_topology) {
                    let Some(pipeline) = self.pipelines.get(&item.primitive_topology) else {
                        log::warn!("No pipeline for {:?}", item.primitive_topology);
                        continue;
                    };
                    render_pass.set_pipeline(pipeline);
                    bound_topology = Some(item.primitive_topology);
                }

                let geometry = scene.geometry(item.geometry);
                let Some(index_buffer) = geometry.index_buffer_gpu.as_ref() else {
                    continue;
                };
                let vertex_buffer = match geometry.vertex_buffer_gpu.as_ref() {
                    Some(buffer) => buffer,
                    None => frame.waves_vb.buffer(),
                };

                render_pass.set_bind_group(
                    0,
                    &frame.object_bind_group,
                    &[frame.object_offset(item.obj_cb_index)],
                );
                render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
                render_pass.set_index_buffer(index_buffer.slice(..), geometry.index_format);
                render_pass.draw_indexed(item.index_range(), item.base_vertex_location, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(DrawOutcome::Presented)
    }
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> Result<wgpu::TextureView> {
    let texture = capture_errors(device, "depth stencil texture", || {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Stencil Texture"),
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
        })
    })?;
    Ok(texture.create_view(&wgpu::TextureViewDescriptor::default()))
}

fn create_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    capture_errors(device, "shader module", || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Color Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        })
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{topology:?} Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        // Meshes wind their front faces clockwise
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: topology.is_strip().then_some(wgpu::IndexFormat::Uint16),
            front_face: wgpu::FrontFace::Cw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

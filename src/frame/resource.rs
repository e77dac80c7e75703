//! Buffers owned by one frame in flight.

use std::num::NonZeroU64;

use super::constants::{ObjectConstants, PassConstants};
use super::upload::UploadBuffer;
use crate::error::Result;
use crate::geometry::Vertex;

/// Per-frame data the CPU refreshes before recording a frame.
pub trait FrameConstants {
    /// Store the constants of the object at `index`
    fn write_object_constants(&mut self, index: usize, data: &ObjectConstants);

    /// Store the constants shared by the whole pass
    fn write_pass_constants(&mut self, data: &PassConstants);

    /// Replace the whole wave vertex buffer
    fn write_wave_vertices(&mut self, vertices: &[Vertex]);
}

/// Everything one ring slot owns: object and pass constant buffers, the
/// dynamic wave vertex buffer, and the bind groups pointing at them.
pub struct FrameResource {
    pub object_cb: UploadBuffer<ObjectConstants>,
    pub pass_cb: UploadBuffer<PassConstants>,
    pub waves_vb: UploadBuffer<Vertex>,
    pub object_bind_group: wgpu::BindGroup,
    pub pass_bind_group: wgpu::BindGroup,
}

impl FrameResource {
    /// Allocate the buffers of one frame.
    ///
    /// # Arguments
    /// * `pass_count` - Pass constant records (one per render pass)
    /// * `object_count` - Object constant records (one per render item)
    /// * `wave_vertex_count` - Vertices of the dynamic wave mesh
    pub fn new(
        device: &wgpu::Device,
        layouts: &FrameBindGroupLayouts,
        pass_count: usize,
        object_count: usize,
        wave_vertex_count: usize,
    ) -> Result<Self> {
        let object_cb = UploadBuffer::new(
            device,
            "Object Constants",
            object_count,
            true,
            wgpu::BufferUsages::UNIFORM,
        )?;
        let pass_cb = UploadBuffer::new(
            device,
            "Pass Constants",
            pass_count,
            true,
            wgpu::BufferUsages::UNIFORM,
        )?;
        let waves_vb = UploadBuffer::new(
            device,
            "Waves Vertex Buffer",
            wave_vertex_count,
            false,
            wgpu::BufferUsages::VERTEX,
        )?;

        // One object record is visible at a time; draws pick it by dynamic offset
        let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &layouts.object,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: object_cb.buffer(),
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<ObjectConstants>() as u64),
                }),
            }],
        });

        let pass_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Pass Bind Group"),
            layout: &layouts.pass,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: pass_cb.buffer(),
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<PassConstants>() as u64),
                }),
            }],
        });

        Ok(Self {
            object_cb,
            pass_cb,
            waves_vb,
            object_bind_group,
            pass_bind_group,
        })
    }

    /// Dynamic offset selecting object record `index`
    pub fn object_offset(&self, index: usize) -> wgpu::DynamicOffset {
        (index * self.object_cb.element_byte_size()) as wgpu::DynamicOffset
    }

    /// Push everything written this frame to the GPU
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        self.object_cb.upload(queue);
        self.pass_cb.upload(queue);
        self.waves_vb.upload(queue);
    }
}

impl FrameConstants for FrameResource {
    fn write_object_constants(&mut self, index: usize, data: &ObjectConstants) {
        self.object_cb.copy_data(index, data);
    }

    fn write_pass_constants(&mut self, data: &PassConstants) {
        self.pass_cb.copy_data(0, data);
    }

    fn write_wave_vertices(&mut self, vertices: &[Vertex]) {
        self.waves_vb.copy_slice(0, vertices);
    }
}

/// Bind group layouts every frame resource is created against
pub struct FrameBindGroupLayouts {
    /// `@group(0)`: object constants, dynamic offset
    pub object: wgpu::BindGroupLayout,
    /// `@group(1)`: pass constants
    pub pass: wgpu::BindGroupLayout,
}

impl FrameBindGroupLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ObjectConstants>() as u64),
                },
                count: None,
            }],
        });

        let pass = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pass Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<PassConstants>() as u64),
                },
                count: None,
            }],
        });

        Self { object, pass }
    }
}

//! Immutable mesh records shared by render items.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::geometry::{MeshData, Vertex};
use crate::gpu::capture_errors;

/// Named index range inside a mesh's buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmeshGeometry {
    pub index_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
}

/// Vertex and index data of one mesh, on the CPU and (after `upload`) on the GPU.
///
/// A mesh without a CPU vertex blob is dynamic: its vertices are supplied
/// by the frame being drawn instead of a static GPU buffer.
#[derive(Debug)]
pub struct MeshGeometry {
    pub name: String,

    pub vertex_buffer_cpu: Option<Vec<u8>>,
    pub index_buffer_cpu: Vec<u8>,

    pub vertex_buffer_gpu: Option<wgpu::Buffer>,
    pub index_buffer_gpu: Option<wgpu::Buffer>,

    pub vertex_byte_stride: u32,
    pub vertex_buffer_byte_size: u32,
    pub index_format: wgpu::IndexFormat,
    pub index_buffer_byte_size: u32,

    /// Submeshes by name, so several items can draw from one buffer pair
    pub draw_args: HashMap<String, SubmeshGeometry>,
}

impl MeshGeometry {
    /// Static mesh whose whole index range is the submesh `submesh`
    pub fn from_mesh_data(name: &str, submesh: &str, data: &MeshData) -> Self {
        let vertices: &[u8] = bytemuck::cast_slice(&data.vertices);
        let mut mesh = Self::with_indices(name, submesh, &data.indices, data.vertices.len());
        mesh.vertex_buffer_cpu = Some(vertices.to_vec());
        mesh
    }

    /// Dynamic mesh: indices only, `vertex_count` vertices supplied per frame
    pub fn dynamic(name: &str, submesh: &str, indices: &[u16], vertex_count: usize) -> Self {
        Self::with_indices(name, submesh, indices, vertex_count)
    }

    fn with_indices(name: &str, submesh: &str, indices: &[u16], vertex_count: usize) -> Self {
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);
        let stride = std::mem::size_of::<Vertex>();

        let mut draw_args = HashMap::new();
        draw_args.insert(
            submesh.to_string(),
            SubmeshGeometry {
                index_count: indices.len() as u32,
                start_index_location: 0,
                base_vertex_location: 0,
            },
        );

        Self {
            name: name.to_string(),
            vertex_buffer_cpu: None,
            index_buffer_cpu: index_bytes.to_vec(),
            vertex_buffer_gpu: None,
            index_buffer_gpu: None,
            vertex_byte_stride: stride as u32,
            vertex_buffer_byte_size: (vertex_count * stride) as u32,
            index_format: wgpu::IndexFormat::Uint16,
            index_buffer_byte_size: index_bytes.len() as u32,
            draw_args,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.vertex_buffer_cpu.is_none()
    }

    pub fn submesh(&self, name: &str) -> Option<SubmeshGeometry> {
        self.draw_args.get(name).copied()
    }

    /// Create the GPU buffers from the CPU blobs
    pub fn upload(&mut self, device: &wgpu::Device) -> Result<()> {
        if let Some(vertices) = &self.vertex_buffer_cpu {
            let label = format!("{} Vertex Buffer", self.name);
            self.vertex_buffer_gpu = Some(capture_errors(device, "mesh vertex buffer", || {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&label),
                    contents: vertices,
                    usage: wgpu::BufferUsages::VERTEX,
                })
            })?);
        }

        let label = format!("{} Index Buffer", self.name);
        self.index_buffer_gpu = Some(capture_errors(device, "mesh index buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: &self.index_buffer_cpu,
                usage: wgpu::BufferUsages::INDEX,
            })
        })?);

        Ok(())
    }
}

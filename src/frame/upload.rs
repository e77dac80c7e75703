//! Host-writable arrays mirrored into GPU buffers.

use std::marker::PhantomData;
use std::ops::Range;

use bytemuck::Pod;

use crate::error::Result;
use crate::gpu::capture_errors;

/// Constant buffer elements are padded to this many bytes. It is also the
/// largest `min_uniform_buffer_offset_alignment` wgpu allows, so every
/// element start is a valid dynamic offset.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// Round `byte_size` up to a multiple of 256
pub const fn constant_buffer_byte_size(byte_size: usize) -> usize {
    (byte_size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// Fixed-length array of `T` in host memory, with the byte range written
/// since the last upload.
#[derive(Debug, Clone)]
pub struct StagingArray<T> {
    bytes: Vec<u8>,
    element_byte_size: usize,
    len: usize,
    dirty: Option<Range<usize>>,
    _marker: PhantomData<T>,
}

impl<T: Pod> StagingArray<T> {
    /// # Arguments
    /// * `len` - Number of elements
    /// * `is_constant_buffer` - Pad each element to 256 bytes
    pub fn new(len: usize, is_constant_buffer: bool) -> Self {
        let element_byte_size = if is_constant_buffer {
            constant_buffer_byte_size(std::mem::size_of::<T>())
        } else {
            std::mem::size_of::<T>()
        };

        Self {
            bytes: vec![0; element_byte_size * len],
            element_byte_size,
            len,
            dirty: None,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between two elements (bytes)
    pub fn element_byte_size(&self) -> usize {
        self.element_byte_size
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    /// Copy `value` into element `index`
    pub fn copy_data(&mut self, index: usize, value: &T) {
        assert!(index < self.len, "element {index} out of {}", self.len);

        let start = index * self.element_byte_size;
        let data = bytemuck::bytes_of(value);
        self.bytes[start..start + data.len()].copy_from_slice(data);
        self.mark_dirty(start..start + self.element_byte_size);
    }

    /// Copy `values` into consecutive elements starting at `first`
    pub fn copy_slice(&mut self, first: usize, values: &[T]) {
        assert!(first + values.len() <= self.len, "slice past end of array");

        if self.element_byte_size == std::mem::size_of::<T>() {
            let start = first * self.element_byte_size;
            let data: &[u8] = bytemuck::cast_slice(values);
            self.bytes[start..start + data.len()].copy_from_slice(data);
            self.mark_dirty(start..start + data.len());
        } else {
            for (offset, value) in values.iter().enumerate() {
                self.copy_data(first + offset, value);
            }
        }
    }

    /// Element `index` as last written
    pub fn get(&self, index: usize) -> T {
        let start = index * self.element_byte_size;
        bytemuck::pod_read_unaligned(&self.bytes[start..start + std::mem::size_of::<T>()])
    }

    /// Byte range written since the last call, and the bytes it covers
    pub fn take_dirty(&mut self) -> Option<(usize, &[u8])> {
        let range = self.dirty.take()?;
        Some((range.start, &self.bytes[range]))
    }

    fn mark_dirty(&mut self, range: Range<usize>) {
        self.dirty = Some(match self.dirty.take() {
            Some(dirty) => dirty.start.min(range.start)..dirty.end.max(range.end),
            None => range,
        });
    }
}

/// A `StagingArray` plus the GPU buffer it is uploaded into.
///
/// Writes land in host memory; `upload` pushes the dirty range through the
/// queue, so the GPU sees them with the next submission.
pub struct UploadBuffer<T> {
    staging: StagingArray<T>,
    buffer: wgpu::Buffer,
}

impl<T: Pod> UploadBuffer<T> {
    /// Create an upload buffer of `len` elements.
    ///
    /// Fails when the device reports an error (e.g. out of memory) while the
    /// buffer is created.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        len: usize,
        is_constant_buffer: bool,
        usage: wgpu::BufferUsages,
    ) -> Result<Self> {
        let staging = StagingArray::new(len, is_constant_buffer);

        let buffer = capture_errors(device, label, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: staging.byte_size() as wgpu::BufferAddress,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        Ok(Self { staging, buffer })
    }

    pub fn copy_data(&mut self, index: usize, value: &T) {
        self.staging.copy_data(index, value);
    }

    pub fn copy_slice(&mut self, first: usize, values: &[T]) {
        self.staging.copy_slice(first, values);
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Size of one element in the GPU buffer (bytes)
    pub fn element_byte_size(&self) -> usize {
        self.staging.element_byte_size()
    }

    /// Queue the bytes written since the last upload
    pub fn upload(&mut self, queue: &wgpu::Queue) {
        if let Some((offset, data)) = self.staging.take_dirty() {
            queue.write_buffer(&self.buffer, offset as wgpu::BufferAddress, data);
        }
    }
}

//! Frames in flight: the completion counter shared with the GPU, the ring of
//! per-frame upload buffers it guards, and the constant records those
//! buffers carry.

mod constants;
mod counter;
mod resource;
mod ring;
mod upload;

// Re-export public types
pub use constants::{gpu_matrix, ObjectConstants, PassConstants};
pub use counter::{CompletionCounter, GpuCompletionCounter};
pub use resource::{FrameBindGroupLayouts, FrameConstants, FrameResource};
pub use ring::{FrameResourceRing, FrameSlot};
pub use upload::{constant_buffer_byte_size, StagingArray, UploadBuffer};

#[cfg(test)]
pub(crate) use counter::ManualCounter;

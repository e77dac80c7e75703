//! Drawable instances and the ordered list the frame loop walks.

use glam::Mat4;

use super::mesh::SubmeshGeometry;
use crate::frame::{FrameConstants, ObjectConstants};
use crate::params::FRAME_RESOURCE_COUNT;

/// Index of a mesh owned by the `Scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// One drawable: a transform, a submesh range and the object constant
/// record it is drawn with.
#[derive(Debug, Clone)]
pub struct RenderItem {
    world: Mat4,

    /// Ring slots whose object constants still hold an older `world`.
    /// Every slot has its own buffer, so a change must be written once per slot.
    pub num_frames_dirty: usize,

    /// Object constant record of this item
    pub obj_cb_index: usize,

    pub geometry: MeshId,
    pub primitive_topology: wgpu::PrimitiveTopology,

    pub index_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
}

impl RenderItem {
    pub fn new(
        obj_cb_index: usize,
        geometry: MeshId,
        primitive_topology: wgpu::PrimitiveTopology,
        submesh: SubmeshGeometry,
    ) -> Self {
        Self {
            world: Mat4::IDENTITY,
            num_frames_dirty: FRAME_RESOURCE_COUNT,
            obj_cb_index,
            geometry,
            primitive_topology,
            index_count: submesh.index_count,
            start_index_location: submesh.start_index_location,
            base_vertex_location: submesh.base_vertex_location,
        }
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    /// Replace the transform; every slot needs the new value again
    pub fn set_world(&mut self, world: Mat4) {
        self.world = world;
        self.num_frames_dirty = FRAME_RESOURCE_COUNT;
    }

    /// Index range passed to `draw_indexed`
    pub fn index_range(&self) -> std::ops::Range<u32> {
        self.start_index_location..self.start_index_location + self.index_count
    }
}

/// Render items in draw order
#[derive(Debug, Clone, Default)]
pub struct RenderItemRegistry {
    items: Vec<RenderItem>,
}

impl RenderItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: RenderItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RenderItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut RenderItem> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderItem> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RenderItem> {
        self.items.iter_mut()
    }

    /// Distinct primitive topologies, in first-use order
    pub fn topologies(&self) -> Vec<wgpu::PrimitiveTopology> {
        let mut topologies = Vec::new();
        for item in &self.items {
            if !topologies.contains(&item.primitive_topology) {
                topologies.push(item.primitive_topology);
            }
        }
        topologies
    }

    /// Write the world matrix of every dirty item into `sink` and count the
    /// slot as refreshed. Returns the number of records written.
    pub fn update_object_constants<S>(&mut self, sink: &mut S) -> usize
    where
        S: FrameConstants + ?Sized,
    {
        let mut written = 0;
        for item in self.items.iter_mut().filter(|item| item.num_frames_dirty > 0) {
            sink.write_object_constants(item.obj_cb_index, &ObjectConstants::new(item.world));
            item.num_frames_dirty -= 1;
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PassConstants;
    use crate::geometry::Vertex;

    #[derive(Default)]
    struct RecordingSink {
        objects: Vec<(usize, ObjectConstants)>,
    }

    impl FrameConstants for RecordingSink {
        fn write_object_constants(&mut self, index: usize, data: &ObjectConstants) {
            self.objects.push((index, *data));
        }

        fn write_pass_constants(&mut self, _data: &PassConstants) {}

        fn write_wave_vertices(&mut self, _vertices: &[Vertex]) {}
    }

    fn item(index: usize) -> RenderItem {
        RenderItem::new(
            index,
            MeshId(0),
            wgpu::PrimitiveTopology::TriangleList,
            SubmeshGeometry {
                index_count: 6,
                start_index_location: 3,
                base_vertex_location: 0,
            },
        )
    }

    #[test]
    fn test_dirty_item_refreshed_once_per_slot() {
        let mut registry = RenderItemRegistry::new();
        registry.push(item(0));

        let mut sink = RecordingSink::default();
        for _ in 0..5 {
            registry.update_object_constants(&mut sink);
        }

        assert_eq!(sink.objects.len(), FRAME_RESOURCE_COUNT);
        assert_eq!(registry.get(0).unwrap().num_frames_dirty, 0);
    }

    #[test]
    fn test_set_world_marks_all_slots_dirty() {
        let mut registry = RenderItemRegistry::new();
        registry.push(item(0));
        registry.push(item(1));

        let mut sink = RecordingSink::default();
        for _ in 0..FRAME_RESOURCE_COUNT {
            registry.update_object_constants(&mut sink);
        }

        let moved = Mat4::from_translation(glam::Vec3::new(0.0, 5.0, 0.0));
        registry.get_mut(1).unwrap().set_world(moved);

        let mut sink = RecordingSink::default();
        assert_eq!(registry.update_object_constants(&mut sink), 1);
        assert_eq!(sink.objects, vec![(1, ObjectConstants::new(moved))]);
    }

    #[test]
    fn test_index_range_and_topologies() {
        let mut registry = RenderItemRegistry::new();
        registry.push(item(0));
        let mut lines = item(1);
        lines.primitive_topology = wgpu::PrimitiveTopology::LineList;
        registry.push(lines);
        registry.push(item(2));

        assert_eq!(registry.get(0).unwrap().index_range(), 3..9);
        assert_eq!(
            registry.topologies(),
            vec![
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::PrimitiveTopology::LineList
            ]
        );
    }
}

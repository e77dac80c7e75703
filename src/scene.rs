//! Meshes and render items of the demo scene.
//!
//! The scene is built once on the CPU (`Scene::build`), then `upload` creates
//! the static GPU buffers. Render items refer to meshes by `MeshId`.

mod mesh;
mod render_item;

pub use mesh::{MeshGeometry, SubmeshGeometry};
pub use render_item::{MeshId, RenderItem, RenderItemRegistry};

use crate::error::{DemoError, Result};
use crate::geometry::{create_box, create_land, grid_indices};
use crate::params::LandParams;
use crate::waves::Waves;

/// All meshes plus the render items that draw them
#[derive(Debug)]
pub struct Scene {
    geometries: Vec<MeshGeometry>,
    pub items: RenderItemRegistry,
}

impl Scene {
    /// Build the box, the hills and the water mesh sized for `waves`.
    pub fn build(land: &LandParams, waves: &Waves) -> Result<Self> {
        let mut scene = Self {
            geometries: Vec::new(),
            items: RenderItemRegistry::new(),
        };

        let box_geo = scene.add_geometry(MeshGeometry::from_mesh_data("boxGeo", "box", &create_box()));

        let land_mesh = create_land(land.width_m, land.depth_m, land.rows, land.cols);
        let land_geo = scene.add_geometry(MeshGeometry::from_mesh_data("landGeo", "grid", &land_mesh));

        let water_indices = grid_indices(waves.row_count(), waves.column_count());
        let water_geo = scene.add_geometry(MeshGeometry::dynamic(
            "waterGeo",
            "grid",
            &water_indices,
            waves.vertex_count(),
        ));

        for (geometry, submesh) in [(box_geo, "box"), (land_geo, "grid"), (water_geo, "grid")] {
            let draw_args = scene.submesh(geometry, submesh)?;
            let obj_cb_index = scene.items.len();
            scene.items.push(RenderItem::new(
                obj_cb_index,
                geometry,
                wgpu::PrimitiveTopology::TriangleList,
                draw_args,
            ));
        }

        log::info!(
            "Scene: {} meshes, {} render items, land {}x{}, water {}x{}",
            scene.geometries.len(),
            scene.items.len(),
            land.rows,
            land.cols,
            waves.row_count(),
            waves.column_count()
        );

        Ok(scene)
    }

    fn add_geometry(&mut self, geometry: MeshGeometry) -> MeshId {
        self.geometries.push(geometry);
        MeshId(self.geometries.len() - 1)
    }

    /// Draw arguments of `submesh` in mesh `id`
    pub fn submesh(&self, id: MeshId, submesh: &str) -> Result<SubmeshGeometry> {
        let geometry = self.geometry(id);
        geometry
            .submesh(submesh)
            .ok_or_else(|| DemoError::MissingSubmesh {
                mesh: geometry.name.clone(),
                submesh: submesh.to_string(),
            })
    }

    pub fn geometry(&self, id: MeshId) -> &MeshGeometry {
        &self.geometries[id.0]
    }

    pub fn geometries(&self) -> &[MeshGeometry] {
        &self.geometries
    }

    /// Create the GPU vertex and index buffers of every mesh
    pub fn upload(&mut self, device: &wgpu::Device) -> Result<()> {
        for geometry in &mut self.geometries {
            geometry.upload(device)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::grid_triangle_count;
    use crate::params::{WaveParams, FRAME_RESOURCE_COUNT};

    fn scene() -> Scene {
        let waves = Waves::from_params(&WaveParams::default());
        Scene::build(&LandParams::default(), &waves).unwrap()
    }

    #[test]
    fn test_items_in_draw_order() {
        let scene = scene();
        let names: Vec<_> = scene
            .items
            .iter()
            .map(|item| scene.geometry(item.geometry).name.as_str())
            .collect();

        assert_eq!(names, vec!["boxGeo", "landGeo", "waterGeo"]);
        for (index, item) in scene.items.iter().enumerate() {
            assert_eq!(item.obj_cb_index, index);
            assert_eq!(item.num_frames_dirty, FRAME_RESOURCE_COUNT);
            assert_eq!(item.world(), glam::Mat4::IDENTITY);
        }
    }

    #[test]
    fn test_item_ranges_match_meshes() {
        let scene = scene();

        assert_eq!(scene.items.get(0).unwrap().index_count, 36);
        assert_eq!(
            scene.items.get(1).unwrap().index_count as usize,
            grid_triangle_count(50, 50) * 3
        );
        assert_eq!(
            scene.items.get(2).unwrap().index_count as usize,
            grid_triangle_count(128, 128) * 3
        );
    }

    #[test]
    fn test_only_water_is_dynamic() {
        let scene = scene();
        let dynamic: Vec<_> = scene
            .geometries()
            .iter()
            .filter(|g| g.is_dynamic())
            .map(|g| g.name.as_str())
            .collect();
        assert_eq!(dynamic, vec!["waterGeo"]);
    }

    #[test]
    fn test_upload_creates_static_buffers() {
        let Some((device, _queue)) = crate::gpu::headless_device() else {
            return;
        };
        let mut scene = scene();
        scene.upload(&device).unwrap();

        for geometry in scene.geometries() {
            let index_buffer = geometry.index_buffer_gpu.as_ref().unwrap();
            assert_eq!(index_buffer.size(), geometry.index_buffer_byte_size as u64);
            assert_eq!(geometry.vertex_buffer_gpu.is_some(), !geometry.is_dynamic());
        }
    }

    #[test]
    fn test_missing_submesh_is_an_error() {
        let scene = scene();
        assert!(matches!(
            scene.submesh(MeshId(0), "grid"),
            Err(DemoError::MissingSubmesh { .. })
        ));
    }
}

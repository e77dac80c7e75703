//! CPU-side mesh generation: the box, flat grids and the procedural hills.

use bytemuck::{Pod, Zeroable};

/// Vertex data shared by every mesh (position + RGBA colour)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }

    /// Vertex buffer layout matching `shader.wgsl`
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Named colours used by the scene
pub mod colors {
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 0.502, 0.0, 1.0];
    pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    pub const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

    pub const SAND: [f32; 4] = [1.0, 0.96, 0.62, 1.0];
    pub const LIGHT_GRASS: [f32; 4] = [0.48, 0.77, 0.46, 1.0];
    pub const DARK_GRASS: [f32; 4] = [0.1, 0.48, 0.19, 1.0];
    pub const ROCK: [f32; 4] = [0.45, 0.39, 0.34, 1.0];
    pub const SNOW: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

/// Vertices and 16-bit indices of one generated mesh
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// 2x2x2 cube centred on the origin, one colour per corner
pub fn create_box() -> MeshData {
    let vertices = vec![
        Vertex::new([-1.0, -1.0, -1.0], colors::WHITE),
        Vertex::new([-1.0, 1.0, -1.0], colors::BLACK),
        Vertex::new([1.0, 1.0, -1.0], colors::RED),
        Vertex::new([1.0, -1.0, -1.0], colors::GREEN),
        Vertex::new([-1.0, -1.0, 1.0], colors::BLUE),
        Vertex::new([-1.0, 1.0, 1.0], colors::YELLOW),
        Vertex::new([1.0, 1.0, 1.0], colors::CYAN),
        Vertex::new([1.0, -1.0, 1.0], colors::MAGENTA),
    ];

    // Clockwise front faces
    #[rustfmt::skip]
    let indices = vec![
        // front
        0, 1, 2,
        0, 2, 3,
        // back
        4, 6, 5,
        4, 7, 6,
        // left
        4, 5, 1,
        4, 1, 0,
        // right
        3, 2, 6,
        3, 6, 7,
        // top
        1, 5, 6,
        1, 6, 2,
        // bottom
        4, 0, 3,
        4, 3, 7,
    ];

    MeshData { vertices, indices }
}

/// Flat `rows x cols` vertex grid on the XZ plane, centred on the origin.
///
/// Row 0 is the far (+Z) edge, column 0 the left (-X) edge. Vertices are
/// white; callers recolour them.
pub fn create_grid(width: f32, depth: f32, rows: usize, cols: usize) -> MeshData {
    let half_width = 0.5 * width;
    let half_depth = 0.5 * depth;
    let dx = width / (cols - 1) as f32;
    let dz = depth / (rows - 1) as f32;

    let mut vertices = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        let z = half_depth - i as f32 * dz;
        for j in 0..cols {
            let x = -half_width + j as f32 * dx;
            vertices.push(Vertex::new([x, 0.0, z], colors::WHITE));
        }
    }

    MeshData {
        vertices,
        indices: grid_indices(rows, cols),
    }
}

/// Triangle-list indices for a `rows x cols` vertex grid (two triangles per quad)
pub fn grid_indices(rows: usize, cols: usize) -> Vec<u16> {
    debug_assert!(rows * cols <= u16::MAX as usize, "grid too large for u16 indices");

    let mut indices = Vec::with_capacity(grid_triangle_count(rows, cols) * 3);
    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let top_left = (i * cols + j) as u16;
            let top_right = top_left + 1;
            let bottom_left = ((i + 1) * cols + j) as u16;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                top_right,
                bottom_left,
                bottom_left,
                top_right,
                bottom_right,
            ]);
        }
    }
    indices
}

pub fn grid_triangle_count(rows: usize, cols: usize) -> usize {
    (rows - 1) * (cols - 1) * 2
}

/// Height of the procedural hills at world position (x, z)
pub fn hills_height(x: f32, z: f32) -> f32 {
    0.3 * (z * (0.1 * x).sin() + x * (0.1 * z).cos())
}

/// Colour band for a terrain height: beach, grass, forest, rock, snow
pub fn hills_color(height: f32) -> [f32; 4] {
    if height < -10.0 {
        colors::SAND
    } else if height < 5.0 {
        colors::LIGHT_GRASS
    } else if height < 12.0 {
        colors::DARK_GRASS
    } else if height < 20.0 {
        colors::ROCK
    } else {
        colors::SNOW
    }
}

/// Grid displaced and coloured by the hills function
pub fn create_land(width: f32, depth: f32, rows: usize, cols: usize) -> MeshData {
    let mut mesh = create_grid(width, depth, rows, cols);
    for vertex in &mut mesh.vertices {
        let [x, _, z] = vertex.position;
        let y = hills_height(x, z);
        vertex.position[1] = y;
        vertex.color = hills_color(y);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_indices_in_range() {
        let mesh = create_box();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_grid_counts_and_extent() {
        let mesh = create_grid(160.0, 160.0, 50, 50);

        assert_eq!(mesh.vertices.len(), 50 * 50);
        assert_eq!(mesh.indices.len(), grid_triangle_count(50, 50) * 3);

        // First vertex is the far-left corner, last is the near-right corner
        assert_eq!(mesh.vertices[0].position, [-80.0, 0.0, 80.0]);
        let last = mesh.vertices.last().unwrap().position;
        assert_relative_eq!(last[0], 80.0, epsilon = 1e-4);
        assert_relative_eq!(last[2], -80.0, epsilon = 1e-4);
    }

    #[test]
    fn test_grid_indices_first_quad() {
        let indices = grid_indices(3, 4);
        assert_eq!(&indices[..6], &[0, 1, 4, 4, 1, 5]);
        assert_eq!(indices.len(), 2 * 3 * 2 * 3);
        assert_eq!(*indices.iter().max().unwrap(), 11);
    }

    #[test]
    fn test_hills_height_origin_is_flat() {
        assert_eq!(hills_height(0.0, 0.0), 0.0);
        assert_relative_eq!(hills_height(10.0, 0.0), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_hills_color_bands() {
        assert_eq!(hills_color(-20.0), colors::SAND);
        assert_eq!(hills_color(0.0), colors::LIGHT_GRASS);
        assert_eq!(hills_color(8.0), colors::DARK_GRASS);
        assert_eq!(hills_color(15.0), colors::ROCK);
        assert_eq!(hills_color(30.0), colors::SNOW);
    }

    #[test]
    fn test_land_uses_hills() {
        let mesh = create_land(160.0, 160.0, 50, 50);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert_eq!(y, hills_height(x, z));
            assert_eq!(v.color, hills_color(y));
        }
    }
}

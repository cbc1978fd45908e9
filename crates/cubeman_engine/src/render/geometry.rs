//! CPU-side geometry builders
//!
//! Cubes and terrain are textured from a single 16x16 tile atlas. Every face
//! picks its tile by `(column, row)` in that atlas.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Width of one atlas tile in texture space
pub const ATLAS_TILE: f32 = 0.0625;

/// Vertex layout shared with the renderer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub uv: [f32; 2],
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// Vertex buffer
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Vertex buffer as raw bytes for upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Texture coordinates of the four corners of atlas tile `(x, y)`
///
/// Corners are ordered top-left, top-right, bottom-right, bottom-left with
/// the v axis flipped so row 0 is the top of the image.
pub fn calculate_uv(x: f32, y: f32) -> [[f32; 2]; 4] {
    let s = ATLAS_TILE;
    [
        [x * s, 1.0 - y * s],
        [x * s + s, 1.0 - y * s],
        [x * s + s, 1.0 - (y * s + s)],
        [x * s, 1.0 - (y * s + s)],
    ]
}

/// Atlas tile per cube face
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceAtlas {
    /// -X face
    pub nx: [f32; 2],
    /// +X face
    pub px: [f32; 2],
    /// -Y face
    pub ny: [f32; 2],
    /// +Y face
    pub py: [f32; 2],
    /// -Z face
    pub nz: [f32; 2],
    /// +Z face
    pub pz: [f32; 2],
}

impl FaceAtlas {
    /// Same tile on every face
    pub fn uniform(tile: [f32; 2]) -> Self {
        Self { nx: tile, px: tile, ny: tile, py: tile, nz: tile, pz: tile }
    }
}

/// Unit cube builder
pub struct CubeGeometry;

impl CubeGeometry {
    /// Corner positions of each face, counter-clockwise seen from outside
    const FACES: [([[f32; 3]; 4], [f32; 3]); 6] = [
        ([[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]], [0.0, 0.0, 1.0]),
        ([[0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5]], [1.0, 0.0, 0.0]),
        ([[0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5]], [0.0, 0.0, -1.0]),
        ([[-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5]], [-1.0, 0.0, 0.0]),
        ([[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]], [0.0, 1.0, 0.0]),
        ([[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5]], [0.0, -1.0, 0.0]),
    ];

    /// Build a unit cube centered on `offset`
    ///
    /// With `inward` set, normals point into the cube and the winding is
    /// reversed so the faces are visible from inside (sky boxes).
    pub fn build(offset: Vec3, atlas: &FaceAtlas, inward: bool) -> Geometry {
        let tiles = [atlas.pz, atlas.px, atlas.nz, atlas.nx, atlas.py, atlas.ny];
        let mut geometry = Geometry::default();

        for ((corners, normal), tile) in Self::FACES.iter().zip(tiles) {
            let base = u32::try_from(geometry.vertices.len()).unwrap_or(u32::MAX);
            let uvs = calculate_uv(tile[0], tile[1]);
            let normal = if inward { [-normal[0], -normal[1], -normal[2]] } else { *normal };

            for (corner, uv) in corners.iter().zip(uvs) {
                geometry.vertices.push(Vertex {
                    position: [corner[0] + offset.x, corner[1] + offset.y, corner[2] + offset.z],
                    normal,
                    uv,
                });
            }

            let quad = if inward {
                [base, base + 1, base + 3, base + 3, base + 1, base + 2]
            } else {
                [base, base + 3, base + 1, base + 3, base + 2, base + 1]
            };
            geometry.indices.extend_from_slice(&quad);
        }
        geometry
    }
}

/// Flat terrain grid builder
pub struct TerrainGeometry;

impl TerrainGeometry {
    /// Build a `2 * rows` by `2 * columns` grid of `cell_size` quads centered on the origin
    ///
    /// Every cell uses atlas tile `(0, 0)` and an up-facing normal.
    pub fn build(cell_size: f32, rows: u32, columns: u32) -> Geometry {
        let mut geometry = Geometry::default();
        let rows = i64::from(rows);
        let columns = i64::from(columns);

        for row in -rows..rows {
            for col in -columns..columns {
                #[allow(clippy::cast_precision_loss)]
                let (x, z) = (cell_size * row as f32, cell_size * col as f32);
                let base = u32::try_from(geometry.vertices.len()).unwrap_or(u32::MAX);
                let corners = [
                    [x, 0.0, z + cell_size],
                    [x + cell_size, 0.0, z + cell_size],
                    [x + cell_size, 0.0, z],
                    [x, 0.0, z],
                ];
                for (corner, uv) in corners.iter().zip(calculate_uv(0.0, 0.0)) {
                    geometry.vertices.push(Vertex { position: *corner, normal: [0.0, 1.0, 0.0], uv });
                }
                geometry.indices.extend_from_slice(&[base, base + 1, base + 3, base + 1, base + 2, base + 3]);
            }
        }
        geometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_calculate_uv_flips_rows() {
        let uv = calculate_uv(1.0, 2.0);
        assert_relative_eq!(uv[0][0], 0.0625);
        assert_relative_eq!(uv[0][1], 0.875);
        assert_relative_eq!(uv[2][0], 0.125);
        assert_relative_eq!(uv[2][1], 0.8125);
    }

    #[test]
    fn test_cube_has_six_quads() {
        let cube = CubeGeometry::build(Vec3::zeros(), &FaceAtlas::default(), false);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.vertex_bytes().len(), 24 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn test_cube_offset_moves_vertices() {
        let cube = CubeGeometry::build(Vec3::new(0.0, 0.5, 0.0), &FaceAtlas::default(), false);
        let min_y = cube.vertices.iter().map(|v| v.position[1]).fold(f32::INFINITY, f32::min);
        assert_relative_eq!(min_y, 0.0);
    }

    #[test]
    fn test_inward_cube_flips_normals() {
        let outward = CubeGeometry::build(Vec3::zeros(), &FaceAtlas::default(), false);
        let inward = CubeGeometry::build(Vec3::zeros(), &FaceAtlas::default(), true);
        assert_relative_eq!(outward.vertices[0].normal[2], 1.0);
        assert_relative_eq!(inward.vertices[0].normal[2], -1.0);
        assert_ne!(outward.indices[..6], inward.indices[..6]);
    }

    #[test]
    fn test_terrain_cell_count() {
        let terrain = TerrainGeometry::build(10.0, 2, 3);
        assert_eq!(terrain.vertices.len(), 4 * 4 * 6);
        assert_eq!(terrain.triangle_count(), 2 * 4 * 6);
        let max_x = terrain.vertices.iter().map(|v| v.position[0]).fold(f32::NEG_INFINITY, f32::max);
        assert_relative_eq!(max_x, 20.0);
    }
}

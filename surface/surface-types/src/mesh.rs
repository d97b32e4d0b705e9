//! Triangulated cortical surface with derived node adjacency.

use nalgebra::Point3;
use smallvec::SmallVec;

use crate::error::{MeshError, MeshResult};

/// Neighbor list of a single node. Cortical meshes average six neighbors.
pub type NeighborList = SmallVec<[u32; 8]>;

/// A triangulated surface whose nodes carry 3-D coordinates.
///
/// The mesh is immutable once built. Construction validates that every
/// triangle references three distinct in-range nodes and that all
/// coordinates are finite, then derives the per-node neighbor lists.
///
/// # Neighbor Adjacency
///
/// For every node, [`SurfaceMesh::neighbors`] returns the ascending list of
/// nodes sharing at least one triangle with it. A node is never its own
/// neighbor and the relation is symmetric.
///
/// # Example
///
/// ```
/// use surface_types::{Point3, SurfaceMesh};
///
/// let mesh = SurfaceMesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
///
/// assert_eq!(mesh.node_count(), 3);
/// assert_eq!(mesh.neighbors(0), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    coords: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    neighbors: Vec<NeighborList>,
}

impl SurfaceMesh {
    /// Build a mesh from node coordinates and triangles.
    ///
    /// # Errors
    ///
    /// - [`MeshError::TooManyNodes`] if node indices do not fit in `u32`
    /// - [`MeshError::NonFiniteCoordinate`] for NaN or infinite coordinates
    /// - [`MeshError::InvalidIndex`] for a triangle index outside `[0, N)`
    /// - [`MeshError::RepeatedVertex`] for a triangle that repeats a node
    pub fn new(coords: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> MeshResult<Self> {
        let node_count = coords.len();
        if u32::try_from(node_count).is_err() {
            return Err(MeshError::TooManyNodes { count: node_count });
        }

        if let Some(index) = coords
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(MeshError::NonFiniteCoordinate { index });
        }

        for (triangle, tri) in triangles.iter().enumerate() {
            for (k, &index) in tri.iter().enumerate() {
                if index as usize >= node_count {
                    return Err(MeshError::InvalidIndex {
                        triangle,
                        index,
                        node_count,
                    });
                }
                if tri[..k].contains(&index) {
                    return Err(MeshError::RepeatedVertex { triangle, index });
                }
            }
        }

        let neighbors = build_neighbors(node_count, &triangles);
        Ok(Self {
            coords,
            triangles,
            neighbors,
        })
    }

    /// Build a mesh from flat `[x0, y0, z0, x1, ...]` and `[a0, b0, c0, ...]` buffers.
    ///
    /// # Errors
    ///
    /// [`MeshError::MalformedBuffer`] if either buffer length is not a multiple
    /// of three, otherwise the same errors as [`SurfaceMesh::new`].
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> MeshResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::MalformedBuffer {
                len: positions.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::MalformedBuffer { len: indices.len() });
        }

        let coords = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let triangles = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Self::new(coords, triangles)
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.coords.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate of a node.
    ///
    /// Returns `None` for an out-of-range index.
    #[inline]
    #[must_use]
    pub fn coordinate(&self, node: usize) -> Option<&Point3<f64>> {
        self.coords.get(node)
    }

    /// All node coordinates.
    #[inline]
    #[must_use]
    pub fn coordinates(&self) -> &[Point3<f64>] {
        &self.coords
    }

    /// All triangles.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Ascending neighbor list of a node, empty for an out-of-range index.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &[u32] {
        self.neighbors.get(node).map_or(&[], |n| n.as_slice())
    }

    /// Number of neighbors of a node.
    #[inline]
    #[must_use]
    pub fn neighbor_count(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    /// Euclidean distance between two nodes.
    ///
    /// Both indices must be in range.
    #[inline]
    #[must_use]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        (self.coords[a] - self.coords[b]).norm()
    }

    /// Area of a single triangle.
    #[must_use]
    pub fn triangle_area(&self, triangle: usize) -> f64 {
        let [a, b, c] = self.triangles[triangle];
        let p0 = &self.coords[a as usize];
        let p1 = &self.coords[b as usize];
        let p2 = &self.coords[c as usize];
        (p1 - p0).cross(&(p2 - p0)).norm() * 0.5
    }

    /// Per-node surface area.
    ///
    /// Each node receives one third of the area of every incident triangle,
    /// so the node areas sum to the total surface area.
    #[must_use]
    pub fn node_areas(&self) -> Vec<f64> {
        let mut areas = vec![0.0; self.node_count()];
        for (t, tri) in self.triangles.iter().enumerate() {
            let third = self.triangle_area(t) / 3.0;
            for &v in tri {
                areas[v as usize] += third;
            }
        }
        areas
    }

    /// Total surface area.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        (0..self.triangle_count()).map(|t| self.triangle_area(t)).sum()
    }
}

/// Derive sorted, symmetric neighbor lists from a triangle list.
///
/// Triangle indices must already be validated against `node_count`.
#[must_use]
pub fn build_neighbors(node_count: usize, triangles: &[[u32; 3]]) -> Vec<NeighborList> {
    let mut neighbors = vec![NeighborList::new(); node_count];
    for &[a, b, c] in triangles {
        for (from, to) in [(a, b), (b, c), (c, a)] {
            neighbors[from as usize].push(to);
            neighbors[to as usize].push(from);
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

/// Tetrahedron spanned by the origin and the three unit axis points.
///
/// Useful as a smallest closed surface in tests and documentation.
#[must_use]
pub fn corner_tetrahedron() -> SurfaceMesh {
    SurfaceMesh {
        coords: vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ],
        triangles: vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
        neighbors: build_neighbors(4, &[[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]),
    }
}

/// Flat `cols × rows` grid in the XY plane with unit spacing.
///
/// Each grid cell is split into two triangles along the same diagonal.
/// Returns an empty mesh when either dimension is below two.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
// Truncation: grid sizes used for test surfaces stay far below u32::MAX
pub fn planar_grid(cols: usize, rows: usize) -> SurfaceMesh {
    if cols < 2 || rows < 2 {
        return SurfaceMesh {
            coords: Vec::new(),
            triangles: Vec::new(),
            neighbors: Vec::new(),
        };
    }

    let mut coords = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            coords.push(Point3::new(c as f64, r as f64, 0.0));
        }
    }

    let mut triangles = Vec::with_capacity(2 * (cols - 1) * (rows - 1));
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            let v00 = (r * cols + c) as u32;
            let v10 = v00 + 1;
            let v01 = v00 + cols as u32;
            let v11 = v01 + 1;
            triangles.push([v00, v10, v11]);
            triangles.push([v00, v11, v01]);
        }
    }

    let neighbors = build_neighbors(coords.len(), &triangles);
    SurfaceMesh {
        coords,
        triangles,
        neighbors,
    }
}

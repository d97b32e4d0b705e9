//! Weighted edge graph for geodesic search.
//!
//! The plain graph links every pair of nodes sharing a triangle, weighted by
//! Euclidean edge length. The smoothed graph adds two-hop links across
//! shared edges.
//!
//! # Two-hop links
//!
//! For triangles `abc` and `abd` sharing edge `ab`, the pair is unfolded
//! flat about `ab` and `c` is linked to `d` by the straight unfolded path:
//!
//! ```text
//!         c
//!        / \
//!       a---b        unfolded: c and d on opposite sides of ab
//!        \ /
//!         d
//! ```
//!
//! The link is kept only when that path crosses the segment `ab`, so it
//! stays on the surface. Its length is never below `|c - d|`.

use hashbrown::HashMap;
use smallvec::SmallVec;
use surface_types::{Point3, SurfaceMesh};

/// Neighbors of one node with edge lengths.
pub type WeightedNeighbors = SmallVec<[(u32, f64); 12]>;

/// Adjacency list with edge lengths.
#[derive(Debug, Clone)]
pub struct EdgeGraph {
    neighbors: Vec<WeightedNeighbors>,
}

impl EdgeGraph {
    /// One-hop graph of the mesh.
    #[must_use]
    pub fn from_mesh(mesh: &SurfaceMesh) -> Self {
        let neighbors = (0..mesh.node_count())
            .map(|node| {
                mesh.neighbors(node)
                    .iter()
                    .map(|&n| (n, mesh.distance(node, n as usize)))
                    .collect()
            })
            .collect();
        Self { neighbors }
    }

    /// One-hop graph plus two-hop links across shared edges.
    #[must_use]
    pub fn smoothed(mesh: &SurfaceMesh) -> Self {
        let mut graph = Self::from_mesh(mesh);
        let coords = mesh.coordinates();

        // Edge (lo, hi) -> nodes opposite it.
        let mut opposite: HashMap<(u32, u32), SmallVec<[u32; 2]>> =
            HashMap::with_capacity(mesh.triangle_count() * 3 / 2);
        for &[a, b, c] in mesh.triangles() {
            for (p, q, r) in [(a, b, c), (b, c, a), (c, a, b)] {
                opposite.entry((p.min(q), p.max(q))).or_default().push(r);
            }
        }

        let mut links: HashMap<(u32, u32), f64> = HashMap::new();
        for (&(a, b), across) in &opposite {
            for (i, &c) in across.iter().enumerate() {
                for &d in &across[i + 1..] {
                    if c == d || mesh.neighbors(c as usize).binary_search(&d).is_ok() {
                        continue;
                    }
                    let pa = &coords[a as usize];
                    let pb = &coords[b as usize];
                    let (pc, pd) = (&coords[c as usize], &coords[d as usize]);
                    if let Some(length) = unfolded_length(pa, pb, pc, pd) {
                        let key = (c.min(d), c.max(d));
                        links
                            .entry(key)
                            .and_modify(|l| *l = l.min(length))
                            .or_insert(length);
                    }
                }
            }
        }

        for ((c, d), length) in links {
            graph.neighbors[c as usize].push((d, length));
            graph.neighbors[d as usize].push((c, length));
        }
        for list in &mut graph.neighbors {
            list.sort_unstable_by_key(|&(n, _)| n);
        }
        graph
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbors of a node with edge lengths, sorted by neighbor index.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &[(u32, f64)] {
        self.neighbors.get(node).map_or(&[], |v| v.as_slice())
    }

    /// Total number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(SmallVec::len).sum::<usize>() / 2
    }
}

/// Length of the straight path from `c` to `d` after unfolding triangles
/// `abc` and `abd` into one plane about `ab`.
///
/// `None` when the path misses the segment `ab` or a triangle is degenerate.
fn unfolded_length(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, d: &Point3<f64>) -> Option<f64> {
    let ab = b - a;
    let len_ab = ab.norm();
    if len_ab <= f64::EPSILON {
        return None;
    }
    let u = ab / len_ab;

    // 2D frame: a at origin, b on +x, c above the axis, d below it.
    let ac = c - a;
    let xc = ac.dot(&u);
    let yc = (ac - u * xc).norm();
    let ad = d - a;
    let xd = ad.dot(&u);
    let yd = -(ad - u * xd).norm();
    if yc <= f64::EPSILON || yd >= -f64::EPSILON {
        return None;
    }

    let t = yc / (yc - yd);
    let crossing = xc + t * (xd - xc);
    if crossing < 0.0 || crossing > len_ab {
        return None;
    }

    let unfolded = (xc - xd).hypot(yc - yd);
    Some(unfolded.max((d - c).norm()))
}

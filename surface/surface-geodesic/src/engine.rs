//! Dijkstra-based geodesic distance engine.
//!
//! Every node sits in exactly one location while a source is processed:
//!
//! ```text
//! Outside    excluded by the ROI or without neighbors
//! Unvisited  distance +inf
//! Active     finite tentative distance, queued in the frontier
//! Finalized  shortest distance known
//! ```
//!
//! The frontier is a binary heap with lazy deletion. Ties in distance are
//! broken by ascending node index, so extraction order is reproducible.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::ops::ControlFlow;

use surface_metric::{Column, MetricError, MetricTable, Modified};
use surface_types::{Progress, Roi, SurfaceMesh};
use tracing::{debug, info};

use crate::adjacency::EdgeGraph;
use crate::error::{GeodesicError, GeodesicResult};
use crate::params::GeodesicParams;

/// Distance written for unreachable or excluded nodes.
pub const UNREACHABLE: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Outside,
    Unvisited,
    Active,
    Finalized,
}

/// Frontier entry.
#[derive(Debug, Clone, Copy)]
struct State {
    node: u32,
    distance: f64,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the smallest distance, then smallest node
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Shortest-path tree from one source.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodesicTree {
    source: usize,
    distances: Vec<f64>,
    parents: Vec<Option<u32>>,
}

impl GeodesicTree {
    /// Root of the tree.
    #[must_use]
    pub const fn source(&self) -> usize {
        self.source
    }

    /// Per-node distances; [`UNREACHABLE`] for nodes not reached.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distance to `node`, or `None` if it was not reached.
    #[must_use]
    pub fn distance(&self, node: usize) -> Option<f64> {
        self.distances.get(node).copied().filter(|&d| d >= 0.0)
    }

    /// Predecessor of `node`. The source is its own predecessor.
    #[must_use]
    pub fn parent(&self, node: usize) -> Option<u32> {
        self.parents.get(node).copied().flatten()
    }

    /// All predecessors, indexed by node.
    #[must_use]
    pub fn parents(&self) -> &[Option<u32>] {
        &self.parents
    }

    /// Nodes on the shortest path from the source to `node`, both included.
    #[must_use]
    pub fn path_to(&self, node: usize) -> Option<Vec<u32>> {
        let mut current = self.parent(node)?;
        let mut path = vec![u32::try_from(node).ok()?];
        while current as usize != path[path.len() - 1] as usize {
            path.push(current);
            current = self.parent(current as usize)?;
        }
        path.reverse();
        Some(path)
    }

    /// Number of reached nodes, source included.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.distances.iter().filter(|&&d| d >= 0.0).count()
    }

    /// Distances narrowed to table precision.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(&self) -> Vec<f32> {
        // Truncation: table storage is f32
        self.distances.iter().map(|&d| d as f32).collect()
    }
}

/// Geodesic distance engine over one mesh.
///
/// Owns the edge graph and scratch buffers, which are reused by every
/// query.
///
/// # Example
///
/// ```
/// use surface_geodesic::{GeodesicEngine, GeodesicParams};
/// use surface_types::corner_tetrahedron;
///
/// let mesh = corner_tetrahedron();
/// let mut engine = GeodesicEngine::new(&mesh, GeodesicParams::new()).unwrap();
/// let tree = engine.single_source(1).unwrap();
/// assert_eq!(tree.distance(0), Some(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct GeodesicEngine {
    graph: EdgeGraph,
    roi: Option<Roi>,
    distances: Vec<f64>,
    parents: Vec<Option<u32>>,
    locations: Vec<Location>,
    heap: BinaryHeap<State>,
    order: Vec<u32>,
}

impl GeodesicEngine {
    /// Build the edge graph for `mesh`.
    ///
    /// # Errors
    ///
    /// [`GeodesicError::Mesh`] if the ROI length does not match the mesh.
    pub fn new(mesh: &SurfaceMesh, params: GeodesicParams) -> GeodesicResult<Self> {
        let n = mesh.node_count();
        if let Some(roi) = &params.roi {
            roi.check_len(n)?;
        }
        let graph = if params.smoothed {
            EdgeGraph::smoothed(mesh)
        } else {
            EdgeGraph::from_mesh(mesh)
        };
        debug!(
            nodes = n,
            edges = graph.edge_count(),
            smoothed = params.smoothed,
            "Built geodesic edge graph"
        );
        Ok(Self {
            graph,
            roi: params.roi,
            distances: vec![f64::INFINITY; n],
            parents: vec![None; n],
            locations: vec![Location::Outside; n],
            heap: BinaryHeap::new(),
            order: Vec::with_capacity(n),
        })
    }

    /// Number of mesh nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The graph searched by this engine.
    #[must_use]
    pub const fn graph(&self) -> &EdgeGraph {
        &self.graph
    }

    /// Nodes finalized by the most recent query, in extraction order.
    ///
    /// Distances along this sequence never decrease.
    #[must_use]
    pub fn finalization_order(&self) -> &[u32] {
        &self.order
    }

    fn in_roi(&self, node: usize) -> bool {
        Roi::includes(self.roi.as_ref(), node)
    }

    fn validate_source(&self, source: usize) -> GeodesicResult<()> {
        let node_count = self.node_count();
        if source >= node_count {
            return Err(GeodesicError::InvalidInput {
                index: source,
                node_count,
            });
        }
        if !self.in_roi(source) {
            return Err(GeodesicError::InvalidSource {
                node: source,
                reason: "not inside the ROI",
            });
        }
        if !self
            .graph
            .neighbors(source)
            .iter()
            .any(|&(n, _)| self.in_roi(n as usize))
        {
            return Err(GeodesicError::InvalidSource {
                node: source,
                reason: "no neighbor inside the ROI",
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.heap.clear();
        self.order.clear();
        self.distances.fill(f64::INFINITY);
        self.parents.fill(None);
        for node in 0..self.locations.len() {
            self.locations[node] =
                if self.in_roi(node) && !self.graph.neighbors(node).is_empty() {
                    Location::Unvisited
                } else {
                    Location::Outside
                };
        }
    }

    /// Run Dijkstra from `source`, calling `visit` after each node is
    /// finalized. The search stops early when `visit` breaks.
    #[allow(clippy::cast_possible_truncation)]
    fn run<F>(&mut self, source: usize, mut visit: F) -> GeodesicResult<()>
    where
        F: FnMut(usize, f64) -> ControlFlow<()>,
    {
        self.validate_source(source)?;
        self.reset();

        // Truncation: mesh construction caps node counts at u32
        let root = source as u32;
        self.distances[source] = 0.0;
        self.parents[source] = Some(root);
        self.locations[source] = Location::Finalized;
        self.order.push(root);
        if visit(source, 0.0).is_break() {
            return Ok(());
        }
        for &(n, length) in self.graph.neighbors(source) {
            let w = n as usize;
            if self.locations[w] == Location::Outside {
                continue;
            }
            if length < self.distances[w] {
                self.distances[w] = length;
                self.parents[w] = Some(root);
                self.locations[w] = Location::Active;
                self.heap.push(State {
                    node: n,
                    distance: length,
                });
            }
        }

        while let Some(State { node, distance }) = self.heap.pop() {
            let u = node as usize;
            match self.locations[u] {
                Location::Finalized => continue,
                Location::Active => {}
                Location::Outside | Location::Unvisited => {
                    return Err(GeodesicError::ProgramError {
                        node: u,
                        message: "frontier entry for a node not in the frontier",
                    });
                }
            }
            // Stale entry superseded by a shorter one
            if distance > self.distances[u] {
                continue;
            }

            self.locations[u] = Location::Finalized;
            self.order.push(node);
            if visit(u, distance).is_break() {
                return Ok(());
            }

            for &(n, length) in self.graph.neighbors(u) {
                let w = n as usize;
                match self.locations[w] {
                    Location::Outside | Location::Finalized => continue,
                    Location::Unvisited | Location::Active => {}
                }
                let candidate = distance + length;
                if candidate < self.distances[w] {
                    self.distances[w] = candidate;
                    self.parents[w] = Some(node);
                    self.locations[w] = Location::Active;
                    self.heap.push(State {
                        node: n,
                        distance: candidate,
                    });
                }
            }
        }
        Ok(())
    }

    /// Distances of finalized nodes with the sentinel everywhere else.
    fn finalized_distances(&self) -> Vec<f64> {
        self.distances
            .iter()
            .zip(&self.locations)
            .map(|(&d, &loc)| {
                if loc == Location::Finalized {
                    d
                } else {
                    UNREACHABLE
                }
            })
            .collect()
    }

    /// Shortest-path tree from `source` to every reachable node.
    ///
    /// # Errors
    ///
    /// - [`GeodesicError::InvalidInput`] if `source` is not a mesh node
    /// - [`GeodesicError::InvalidSource`] if `source` is outside the ROI or
    ///   has no neighbor inside it
    pub fn single_source(&mut self, source: usize) -> GeodesicResult<GeodesicTree> {
        self.run(source, |_, _| ControlFlow::Continue(()))?;
        let distances = self.finalized_distances();
        let parents = self
            .parents
            .iter()
            .zip(&self.locations)
            .map(|(&p, &loc)| if loc == Location::Finalized { p } else { None })
            .collect();
        debug!(source, reached = self.order.len(), "Geodesic single source done");
        Ok(GeodesicTree {
            source,
            distances,
            parents,
        })
    }

    /// Nodes within `max_distance` of `source` as `(node, distance, parent)`,
    /// in order of increasing distance.
    ///
    /// # Errors
    ///
    /// Same as [`single_source`](Self::single_source).
    pub fn within_cutoff(
        &mut self,
        source: usize,
        max_distance: f64,
    ) -> GeodesicResult<Vec<(usize, f64, Option<u32>)>> {
        let mut found = Vec::new();
        self.run(source, |node, distance| {
            if distance > max_distance {
                ControlFlow::Break(())
            } else {
                found.push((node, distance));
                ControlFlow::Continue(())
            }
        })?;
        Ok(found
            .into_iter()
            .map(|(node, distance)| (node, distance, self.parents[node]))
            .collect())
    }

    /// Distances from `source` to each of `targets`.
    ///
    /// The search stops as soon as every target is finalized. Unreachable
    /// targets get [`UNREACHABLE`].
    ///
    /// # Errors
    ///
    /// - [`GeodesicError::InvalidInput`] if `source` or a target is not a
    ///   mesh node
    /// - [`GeodesicError::InvalidSource`] as for
    ///   [`single_source`](Self::single_source)
    pub fn to_targets(&mut self, source: usize, targets: &[usize]) -> GeodesicResult<Vec<f64>> {
        let node_count = self.node_count();
        let mut wanted = vec![false; node_count];
        for &t in targets {
            if t >= node_count {
                return Err(GeodesicError::InvalidInput {
                    index: t,
                    node_count,
                });
            }
            wanted[t] = true;
        }
        let mut remaining = wanted.iter().filter(|&&w| w).count();

        self.run(source, |node, _| {
            if wanted[node] {
                remaining -= 1;
            }
            if remaining == 0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;

        Ok(targets
            .iter()
            .map(|&t| {
                if self.locations[t] == Location::Finalized {
                    self.distances[t]
                } else {
                    UNREACHABLE
                }
            })
            .collect())
    }

    /// Row-major `N × N` matrix of distances between every pair of nodes.
    ///
    /// Rows for nodes that cannot be a source are filled with
    /// [`UNREACHABLE`]. `progress` is checked before each source.
    ///
    /// # Errors
    ///
    /// - [`GeodesicError::ResourceExhausted`] if the matrix cannot be
    ///   allocated
    /// - [`GeodesicError::Cancelled`] when the progress hook or token asks
    ///   to stop; no partial matrix is returned
    #[allow(clippy::cast_possible_truncation)]
    pub fn all_pairs(&mut self, progress: &Progress<'_>) -> GeodesicResult<Vec<f32>> {
        let n = self.node_count();
        let cells = n
            .checked_mul(n)
            .ok_or(GeodesicError::ResourceExhausted { node_count: n })?;
        let mut matrix: Vec<f32> = Vec::new();
        matrix
            .try_reserve_exact(cells)
            .map_err(|_| GeodesicError::ResourceExhausted { node_count: n })?;
        info!(nodes = n, edges = self.graph.edge_count(), "Starting all-pairs geodesic");

        let progress = progress.with_total(n);
        for source in 0..n {
            progress.check(source)?;
            if self.validate_source(source).is_err() {
                matrix.extend(std::iter::repeat_n(UNREACHABLE as f32, n));
                continue;
            }
            self.run(source, |_, _| ControlFlow::Continue(()))?;
            // Truncation: table storage is f32
            matrix.extend(self.finalized_distances().into_iter().map(|d| d as f32));
        }
        progress.check(n)?;

        info!(nodes = n, "All-pairs geodesic done");
        Ok(matrix)
    }

    /// Append a column of distances from `source` to `table`.
    ///
    /// The column is named `Geo Dist Node: <source>`.
    ///
    /// # Errors
    ///
    /// - [`GeodesicError::Metric`] if the table does not have one row per
    ///   node
    /// - Any error of [`single_source`](Self::single_source)
    pub fn write_to_table(
        &mut self,
        table: &mut MetricTable,
        source: usize,
    ) -> GeodesicResult<Modified> {
        if table.node_count() != self.node_count() {
            return Err(MetricError::NodeCountMismatch {
                expected: self.node_count(),
                actual: table.node_count(),
            }
            .into());
        }
        let tree = self.single_source(source)?;
        let column = Column::from_values(format!("Geo Dist Node: {source}"), tree.to_f32())
            .with_comment(format!("Geodesic for node: {source}"));
        let index = table.add_column(column)?;
        Ok(Modified {
            first_column: index,
            column_count: 1,
        })
    }
}

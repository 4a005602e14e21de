//! Taxiway network graph.
//!
//! Vertices live in an arena sorted by index; edges are a flat list of typed
//! records; adjacency and the ident index refer to both by integer position.
//! Parallel edges between the same pair of vertices are kept.

use crate::models::{Segment, Vertex, VertexId};
use crate::spatial::haversine_distance;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// An undirected taxiway edge owned by one ident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub distance_m: f64,
    pub ident: String,
}

impl Edge {
    /// The endpoint opposite `vertex`, if `vertex` is one of the endpoints.
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        if self.from == vertex {
            Some(self.to)
        } else if self.to == vertex {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Entry of the ident index: `(from, to, distance)` in segment order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdentEdge {
    pub from: VertexId,
    pub to: VertexId,
    pub distance_m: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    pub segments: usize,
    pub edges: usize,
    pub skipped_pairs: usize,
}

/// The taxiway network, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TaxiwayGraph {
    vertices: Vec<Vertex>,
    slots: HashMap<VertexId, usize>,
    edges: Vec<Edge>,
    adjacency: HashMap<VertexId, Vec<usize>>,
    ident_edges: BTreeMap<String, Vec<IdentEdge>>,
    stats: BuildStats,
}

impl TaxiwayGraph {
    /// Build the graph from vertex and segment records in a single pass over
    /// the segments.
    ///
    /// A consecutive pair with an endpoint missing from the vertex table is
    /// skipped; the rest of the segment is still used.
    pub fn build(vertices: Vec<Vertex>, segments: &[Segment]) -> Self {
        let mut by_index: BTreeMap<VertexId, Vertex> = BTreeMap::new();
        for vertex in vertices {
            by_index.insert(vertex.index, vertex);
        }
        let vertices: Vec<Vertex> = by_index.into_values().collect();
        let slots: HashMap<VertexId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(slot, vertex)| (vertex.index, slot))
            .collect();

        let mut graph = Self {
            vertices,
            slots,
            ..Self::default()
        };

        for segment in segments {
            graph.stats.segments += 1;
            for pair in segment.vertices.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                let endpoints = (graph.vertex(from).copied(), graph.vertex(to).copied());
                let (Some(a), Some(b)) = endpoints else {
                    tracing::debug!(
                        "Skipping {}-{} on {}: endpoint missing from vertex table",
                        from,
                        to,
                        segment.ident
                    );
                    graph.stats.skipped_pairs += 1;
                    continue;
                };
                let distance_m = haversine_distance(a.lat, a.lon, b.lat, b.lon);
                graph.push_edge(Edge {
                    from,
                    to,
                    distance_m,
                    ident: segment.ident.clone(),
                });
            }
        }

        graph.stats.edges = graph.edges.len();
        tracing::info!(
            "Built taxiway graph: {} vertices, {} nodes, {} edges, {} idents ({} pairs skipped)",
            graph.vertices.len(),
            graph.adjacency.len(),
            graph.edges.len(),
            graph.ident_edges.len(),
            graph.stats.skipped_pairs
        );
        graph
    }

    fn push_edge(&mut self, edge: Edge) {
        let edge_idx = self.edges.len();
        self.adjacency.entry(edge.from).or_default().push(edge_idx);
        if edge.to != edge.from {
            self.adjacency.entry(edge.to).or_default().push(edge_idx);
        }
        self.ident_edges
            .entry(edge.ident.clone())
            .or_default()
            .push(IdentEdge {
                from: edge.from,
                to: edge.to,
                distance_m: edge.distance_m,
            });
        self.edges.push(edge);
    }

    /// Every vertex of the vertex table, in ascending index order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex(&self, index: VertexId) -> Option<&Vertex> {
        self.slots.get(&index).map(|slot| &self.vertices[*slot])
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Vertices that appear in at least one edge.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn contains_node(&self, index: VertexId) -> bool {
        self.adjacency.contains_key(&index)
    }

    pub fn build_stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Edges of an ident in the order the segment table lists them.
    pub fn ident_edges(&self, ident: &str) -> Option<&[IdentEdge]> {
        self.ident_edges.get(ident).map(Vec::as_slice)
    }

    pub fn has_ident(&self, ident: &str) -> bool {
        self.ident_edges.contains_key(ident)
    }

    pub fn idents(&self) -> impl Iterator<Item = &str> {
        self.ident_edges.keys().map(String::as_str)
    }

    /// Neighbours of a vertex in edge-insertion order. Parallel edges repeat
    /// the neighbour.
    pub fn neighbors(&self, index: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.adjacency
            .get(&index)
            .into_iter()
            .flatten()
            .filter_map(move |edge_idx| self.edges[*edge_idx].other(index))
    }

    /// Fewest-edges path from `start` to `goal`, both included.
    ///
    /// Breadth-first; neighbours are expanded in edge-insertion order and the
    /// first discovery of a vertex fixes its predecessor, so the result is
    /// deterministic. Returns `None` when either vertex is not a graph node or
    /// the two are disconnected.
    pub fn shortest_path(&self, start: VertexId, goal: VertexId) -> Option<Vec<VertexId>> {
        if !self.contains_node(start) || !self.contains_node(goal) {
            return None;
        }
        if start == goal {
            return Some(vec![start]);
        }

        let mut came_from: HashMap<VertexId, VertexId> = HashMap::new();
        let mut visited: HashSet<VertexId> = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if !visited.insert(next) {
                    continue;
                }
                came_from.insert(next, current);
                if next == goal {
                    let mut path = vec![goal];
                    let mut cursor = goal;
                    while let Some(prev) = came_from.get(&cursor) {
                        path.push(*prev);
                        cursor = *prev;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }

        None
    }

    /// Total edge length per ident.
    pub fn ident_lengths(&self) -> BTreeMap<String, f64> {
        self.ident_edges
            .iter()
            .map(|(ident, edges)| (ident.clone(), edges.iter().map(|e| e.distance_m).sum()))
            .collect()
    }

    pub fn catalog(&self) -> IdentCatalog {
        IdentCatalog::from_graph(self)
    }
}

/// An ident with the number of edges it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub ident: String,
    pub edges: usize,
}

/// Idents grouped for display: runways, single-letter taxiways, the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentCatalog {
    pub runways: Vec<CatalogEntry>,
    pub main_taxiways: Vec<CatalogEntry>,
    pub others: Vec<CatalogEntry>,
}

impl IdentCatalog {
    pub fn from_graph(graph: &TaxiwayGraph) -> Self {
        let mut catalog = Self::default();
        for (ident, edges) in &graph.ident_edges {
            let entry = CatalogEntry {
                ident: ident.clone(),
                edges: edges.len(),
            };
            let mut chars = ident.chars();
            let single_letter = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_alphabetic()
            );
            if ident.starts_with("RW") {
                catalog.runways.push(entry);
            } else if single_letter {
                catalog.main_taxiways.push(entry);
            } else {
                catalog.others.push(entry);
            }
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.runways.len() + self.main_taxiways.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Undirected graph over network elements.
//!
//! Each element becomes a node and each connection becomes an edge. Parallel connections stay
//! distinct edges unless [`Config::dedup_connections`] is set. Adjacency lists keep the order in
//! which edges were added, which makes every traversal in this crate deterministic.
use crate::config::{Config, RootFallback};
use crate::model::{ElementKind, NetworkModel};
use crate::types::*;
use crate::{Result, TopologyError};

use bitvec::prelude::*;
use itertools::Itertools;
use serde::Serialize;
use std::collections::VecDeque;

#[cfg(not(feature = "hashbrown"))]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "hashbrown")]
use hashbrown::{HashMap, HashSet};

#[cfg(test)]
mod tests;

/// An undirected edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub a: NodeIndex,
    pub b: NodeIndex,
    /// Element that realizes the link, if the model names one.
    pub via: Option<String>,
}

impl Edge {
    /// The endpoint that is not `node`.
    pub fn other(&self, node: NodeIndex) -> NodeIndex {
        if node == self.a {
            self.b
        } else {
            self.a
        }
    }
}

/// An entry in an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjacent {
    pub node: NodeIndex,
    pub edge: EdgeIndex,
}

/// Undirected multigraph. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    ids: Vec<String>,
    /// `None` for graphs that were not built from a model, e.g. loaded from an export.
    kinds: Vec<Option<ElementKind>>,
    index: HashMap<String, NodeIndex>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Adjacent>>,
}

/// Summary of the graph structure.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphStatistics {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Nodes without any edge.
    pub isolated_nodes: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub components: usize,
    /// Number of nodes in the largest connected component.
    pub largest_component: usize,
}

impl Graph {
    fn add_node(&mut self, id: &str, kind: Option<ElementKind>) -> Result<NodeIndex> {
        let i = self.ids.len();
        if self.index.insert(id.to_string(), i).is_some() {
            return Err(TopologyError::MalformedModel(format!(
                "Duplicate node id '{id}'"
            )));
        }
        self.ids.push(id.to_string());
        self.kinds.push(kind);
        self.adjacency.push(Vec::new());
        Ok(i)
    }

    fn push_edge(&mut self, a: NodeIndex, b: NodeIndex, via: Option<String>) -> Result<EdgeIndex> {
        if a == b {
            return Err(TopologyError::MalformedModel(format!(
                "Self-loop on '{}'",
                self.ids[a]
            )));
        }
        self.edges.push(Edge { a, b, via });
        Ok(self.edges.len() - 1)
    }

    fn add_edge(&mut self, a: NodeIndex, b: NodeIndex, via: Option<String>) -> Result<EdgeIndex> {
        let edge = self.push_edge(a, b, via)?;
        self.adjacency[a].push(Adjacent { node: b, edge });
        self.adjacency[b].push(Adjacent { node: a, edge });
        Ok(edge)
    }

    /// Build a graph from an adjacency mapping, e.g. one that was exported earlier.
    ///
    /// Neighbor lists must be symmetric, including the multiplicity of parallel edges.
    /// The given neighbor order is preserved.
    pub fn from_adjacency(entries: &[(String, Vec<String>)]) -> Result<Graph> {
        let mut graph = Graph::default();
        for (id, _) in entries.iter() {
            graph.add_node(id, None)?;
        }
        let lists: Vec<Vec<NodeIndex>> = entries
            .iter()
            .map(|(id, neighbors)| {
                neighbors
                    .iter()
                    .map(|n| {
                        graph.find(n).ok_or_else(|| {
                            TopologyError::MalformedModel(format!(
                                "Neighbor '{n}' of '{id}' is not a node"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        // Edges are created from the side with the smaller index.
        let mut pair_edges: HashMap<(NodeIndex, NodeIndex), Vec<EdgeIndex>> = HashMap::new();
        for (u, neighbors) in lists.iter().enumerate() {
            for &v in neighbors.iter() {
                if u == v {
                    return Err(TopologyError::MalformedModel(format!(
                        "Self-loop on '{}'",
                        graph.ids[u]
                    )));
                }
                if u < v {
                    let edge = graph.push_edge(u, v, None)?;
                    pair_edges.entry((u, v)).or_default().push(edge);
                }
            }
        }

        let asymmetric = |graph: &Graph, u: NodeIndex, v: NodeIndex| {
            TopologyError::MalformedModel(format!(
                "Adjacency is not symmetric between '{}' and '{}'",
                graph.ids[u], graph.ids[v]
            ))
        };
        let mut used: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::new();
        for (u, neighbors) in lists.iter().enumerate() {
            for &v in neighbors.iter() {
                let counter = used.entry((u, v)).or_insert(0);
                let edge = pair_edges
                    .get(&(u.min(v), u.max(v)))
                    .and_then(|edges| edges.get(*counter))
                    .copied()
                    .ok_or_else(|| asymmetric(&graph, u, v))?;
                *counter += 1;
                graph.adjacency[u].push(Adjacent { node: v, edge });
            }
        }
        for (&(u, v), edges) in pair_edges.iter().sorted_by_key(|(pair, _)| **pair) {
            if used.get(&(v, u)).copied().unwrap_or(0) != edges.len() {
                return Err(asymmetric(&graph, u, v));
            }
        }
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Identifier of the node at the given index.
    pub fn id(&self, node: NodeIndex) -> &str {
        &self.ids[node]
    }

    /// All node identifiers in index order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn kind(&self, node: NodeIndex) -> Option<ElementKind> {
        self.kinds[node]
    }

    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Like [`Graph::find`], but a missing node is an error.
    pub fn resolve(&self, id: &str) -> Result<NodeIndex> {
        self.find(id)
            .ok_or_else(|| TopologyError::NodeNotFound(id.to_string()))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, edge: EdgeIndex) -> &Edge {
        &self.edges[edge]
    }

    /// Adjacency list of a node in insertion order. Parallel edges appear once each.
    pub fn adjacent(&self, node: NodeIndex) -> &[Adjacent] {
        &self.adjacency[node]
    }

    /// Neighbors of a node in insertion order, repeated for parallel edges.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.adjacency[node].iter().map(|adj| adj.node)
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.adjacency[node].len()
    }

    /// Translate a path of node indices into node identifiers.
    pub fn path_ids(&self, path: &[NodeIndex]) -> Vec<String> {
        path.iter().map(|&i| self.ids[i].clone()).collect()
    }

    /// Returns true if every adjacency entry is mirrored by the opposite endpoint.
    pub fn is_symmetric(&self) -> bool {
        self.adjacency.iter().enumerate().all(|(u, adjacent)| {
            adjacent.iter().all(|adj| {
                let edge = &self.edges[adj.edge];
                edge.other(u) == adj.node
                    && (edge.a == u || edge.b == u)
                    && self.adjacency[adj.node]
                        .iter()
                        .any(|back| back.edge == adj.edge && back.node == u)
            })
        })
    }

    /// Connected components, each in breadth-first discovery order.
    /// Components are ordered by their smallest node index.
    pub fn connected_components(&self) -> Vec<Vec<NodeIndex>> {
        let mut visited = bitvec![0; self.node_count()];
        let mut components = Vec::new();
        for start in 0..self.node_count() {
            if visited[start] {
                continue;
            }
            visited.set(start, true);
            let mut component = vec![start];
            let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
            while let Some(node) = queue.pop_front() {
                for next in self.neighbors(node) {
                    if !visited[next] {
                        visited.set(next, true);
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    pub fn statistics(&self) -> GraphStatistics {
        let degrees = (0..self.node_count()).map(|i| self.degree(i)).collect_vec();
        let components = self.connected_components();
        GraphStatistics {
            total_nodes: self.node_count(),
            total_edges: self.edge_count(),
            isolated_nodes: degrees.iter().filter(|&&d| d == 0).count(),
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            avg_degree: if degrees.is_empty() {
                0.0
            } else {
                degrees.iter().sum::<usize>() as f64 / degrees.len() as f64
            },
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            components: components.len(),
            largest_component: components.iter().map(|c| c.len()).max().unwrap_or(0),
        }
    }

    /// Apply the root fallback policy to a graph that has no tagged roots.
    pub fn fallback_roots(&self, policy: RootFallback) -> Vec<NodeIndex> {
        match policy {
            RootFallback::EveryNode => (0..self.node_count()).collect(),
            RootFallback::ComponentMinimum => self
                .connected_components()
                .into_iter()
                .filter_map(|component| component.into_iter().min_by_key(|&i| &self.ids[i]))
                .collect(),
            RootFallback::None => Vec::new(),
        }
    }
}

/// Build the undirected graph of a model and determine its roots.
///
/// Roots are the roots declared by the model followed by the elements whose kind is a root kind
/// in the configuration, without repetitions. If there are none, [`Config::root_fallback`]
/// decides.
pub fn build_graph(model: &NetworkModel, config: &Config) -> Result<(Graph, Vec<NodeIndex>)> {
    let mut graph = Graph::default();
    for element in model.elements() {
        graph.add_node(&element.id, Some(element.kind))?;
    }

    let mut seen_pairs: HashSet<(NodeIndex, NodeIndex)> = HashSet::new();
    let mut collapsed = 0usize;
    for connection in model.connections() {
        let a = graph.find(&connection.a).ok_or_else(|| {
            TopologyError::MalformedModel(format!("Unknown element '{}'", connection.a))
        })?;
        let b = graph.find(&connection.b).ok_or_else(|| {
            TopologyError::MalformedModel(format!("Unknown element '{}'", connection.b))
        })?;
        if config.dedup_connections && !seen_pairs.insert((a.min(b), a.max(b))) {
            collapsed += 1;
            continue;
        }
        graph.add_edge(a, b, connection.via.clone())?;
    }
    if collapsed > 0 {
        log::debug!("Collapsed {collapsed} parallel connections");
    }

    let declared = model
        .declared_roots()
        .iter()
        .map(|id| {
            graph.find(id).ok_or_else(|| {
                TopologyError::MalformedModel(format!("Unknown root element '{id}'"))
            })
        })
        .collect::<Result<Vec<NodeIndex>>>()?;
    let tagged = (0..graph.node_count()).filter(|&i| {
        graph
            .kind(i)
            .map(|kind| config.is_root_kind(kind))
            .unwrap_or(false)
    });
    let mut roots: Vec<NodeIndex> = declared.into_iter().chain(tagged).unique().collect();
    if roots.is_empty() {
        log::debug!(
            "No roots tagged, applying fallback policy {:?}",
            config.root_fallback
        );
        roots = graph.fallback_roots(config.root_fallback);
    }

    log::info!(
        "Built graph with {} nodes, {} edges and {} roots",
        graph.node_count(),
        graph.edge_count(),
        roots.len()
    );
    Ok((graph, roots))
}

#[cfg(test)]
impl Graph {
    /// Build a graph from a literal adjacency mapping.
    pub(crate) fn from_literal(entries: &[(&str, &[&str])]) -> Graph {
        let entries: Vec<(String, Vec<String>)> = entries
            .iter()
            .map(|(id, neighbors)| {
                (
                    id.to_string(),
                    neighbors.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect();
        Graph::from_adjacency(&entries).unwrap()
    }

    /// Resolve a list of identifiers, panicking on unknown ones.
    pub(crate) fn indices(&self, ids: &[&str]) -> Vec<NodeIndex> {
        ids.iter().map(|id| self.find(id).unwrap()).collect()
    }
}

//! Which roots are connected to each other, and which nodes no root can reach.
//!
//! The reachable set of a root is everything a traversal from that root alone can visit. Two
//! roots whose reachable sets intersect are in the same connectivity class. In an undirected
//! graph a traversal reaches the whole component of its start, so roots share a class exactly
//! when a path exists between them, and a root already visited by an earlier root's traversal
//! would only repeat it. The non-root nodes of a class with several roots are its bridging
//! nodes.
//!
//! Next to that, every root has a service area: its traversal including the other roots it
//! runs into, but not continuing past them. Links are recorded between roots whose service
//! areas meet, which is enough to chain all roots of a class together without listing every
//! pair of them.
use crate::graph::Graph;
use crate::paths::bfs_path;
use crate::types::*;
use crate::utils::sorted_intersection;

use bitvec::prelude::*;
use itertools::Itertools;
use std::collections::{BTreeSet, VecDeque};

#[cfg(test)]
mod tests;

/// Two roots whose service areas meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLink {
    pub from: NodeIndex,
    pub to: NodeIndex,
    /// Nodes inside both service areas, sorted.
    pub meeting: Vec<NodeIndex>,
    /// A shortest path between the two roots.
    pub path: Option<NodePath>,
}

/// Roots that are mutually connected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootClass {
    /// Member roots in the order they were given.
    pub roots: Vec<NodeIndex>,
    /// Union of the reachable sets of the members, sorted.
    pub reachable: Vec<NodeIndex>,
    /// Non-root nodes reachable from more than one member, sorted.
    pub bridges: Vec<NodeIndex>,
    pub links: Vec<RootLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// The analyzed roots without repetitions.
    pub roots: Vec<NodeIndex>,
    /// Position in [`ConnectivityReport::classes`] for each root.
    pub root_class: Vec<usize>,
    /// Service area of each root, sorted.
    pub service_areas: Vec<Vec<NodeIndex>>,
    /// Classes ordered by their first root.
    pub classes: Vec<RootClass>,
    /// Nodes that are not reachable from any root, sorted.
    pub orphans: Vec<NodeIndex>,
}

/// Breadth-first traversal from `start`. Nodes for which `stop` returns true are visited but
/// not expanded, except for `start` itself.
fn traverse<F>(graph: &Graph, start: NodeIndex, visited: &mut BitVec, stop: F) -> Vec<NodeIndex>
where
    F: Fn(NodeIndex) -> bool,
{
    let mut found = vec![start];
    visited.set(start, true);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        if node != start && stop(node) {
            continue;
        }
        for next in graph.neighbors(node) {
            if !visited[next] {
                visited.set(next, true);
                found.push(next);
                queue.push_back(next);
            }
        }
    }
    found.sort_unstable();
    found
}

/// Nodes reachable from `root` without passing through other roots. Sorted.
fn service_area(graph: &Graph, root: NodeIndex, is_root: &BitSlice) -> Vec<NodeIndex> {
    let mut visited = bitvec![0; graph.node_count()];
    traverse(graph, root, &mut visited, |node| is_root[node])
}

/// Analyze the connectivity of the given roots. The graph is not modified.
pub fn analyze(graph: &Graph, roots: &[NodeIndex]) -> ConnectivityReport {
    let n = graph.node_count();
    let roots: Vec<NodeIndex> = roots.iter().copied().unique().collect();
    let mut is_root = bitvec![0; n];
    for &root in roots.iter() {
        is_root.set(root, true);
    }

    let mut class_of_node: Vec<Option<usize>> = vec![None; n];
    let mut visited = bitvec![0; n];
    let mut classes: Vec<RootClass> = Vec::new();
    let mut root_class: Vec<usize> = Vec::with_capacity(roots.len());
    for &root in roots.iter() {
        let c = match class_of_node[root] {
            Some(c) => c,
            None => {
                let reachable = traverse(graph, root, &mut visited, |_| false);
                let c = classes.len();
                for &node in reachable.iter() {
                    class_of_node[node] = Some(c);
                }
                classes.push(RootClass {
                    roots: Vec::new(),
                    reachable,
                    bridges: Vec::new(),
                    links: Vec::new(),
                });
                c
            }
        };
        classes[c].roots.push(root);
        root_class.push(c);
    }

    for class in classes.iter_mut().filter(|class| class.roots.len() > 1) {
        class.bridges = class
            .reachable
            .iter()
            .copied()
            .filter(|&node| !is_root[node])
            .collect();
    }

    let service_areas: Vec<Vec<NodeIndex>> = roots
        .iter()
        .map(|&root| service_area(graph, root, &is_root))
        .collect();

    // Which service areas contain each node, as positions in `roots`.
    let mut served_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (r, nodes) in service_areas.iter().enumerate() {
        for &node in nodes.iter() {
            served_by[node].push(r);
        }
    }
    let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
    for rs in served_by.iter() {
        for (&r1, &r2) in rs.iter().tuple_combinations() {
            pairs.insert((r1, r2));
        }
    }
    for (r1, r2) in pairs {
        let meeting = sorted_intersection(&service_areas[r1], &service_areas[r2]);
        classes[root_class[r1]].links.push(RootLink {
            from: roots[r1],
            to: roots[r2],
            meeting,
            path: bfs_path(graph, roots[r1], roots[r2]),
        });
    }

    let orphans: Vec<NodeIndex> = class_of_node
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_none())
        .map(|(node, _)| node)
        .collect();

    log::info!(
        "{} roots form {} connectivity classes, {} orphan nodes",
        roots.len(),
        classes.len(),
        orphans.len()
    );
    ConnectivityReport {
        roots,
        root_class,
        service_areas,
        classes,
        orphans,
    }
}

impl ConnectivityReport {
    /// Reachable set of the root at position `i` in [`ConnectivityReport::roots`], sorted.
    pub fn reach(&self, i: usize) -> &[NodeIndex] {
        &self.classes[self.root_class[i]].reachable
    }

    /// Position in [`ConnectivityReport::classes`] of the class that contains the root.
    pub fn class_of(&self, root: NodeIndex) -> Option<usize> {
        self.roots
            .iter()
            .position(|&r| r == root)
            .map(|i| self.root_class[i])
    }

    /// Returns true if both roots are in the same class.
    pub fn connected(&self, a: NodeIndex, b: NodeIndex) -> bool {
        match (self.class_of(a), self.class_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Classes with more than one root.
    pub fn linked_classes(&self) -> impl Iterator<Item = &RootClass> {
        self.classes.iter().filter(|class| class.roots.len() > 1)
    }
}

//! Path queries over a [`Graph`].
use crate::config::Config;
use crate::graph::Graph;
use crate::types::*;
use crate::{Result, TopologyError};

use bitvec::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;


/// Lazy depth-first enumeration of the simple paths between two nodes.
///
/// Paths are produced in depth-first order, following adjacency lists in insertion order.
/// The visited set belongs to the current path only, so a node can appear on many paths but at
/// most once on each. Parallel edges produce the same node sequence once per edge.
///
/// Only the prefix that was actually pulled is explored. Call [`SimplePaths::stop`] or simply
/// drop the iterator to cancel. A flag given to [`SimplePaths::with_cancel_flag`] cancels the
/// enumeration from another thread, even while a search between two paths is running.
pub struct SimplePaths<'a> {
    graph: &'a Graph,
    target: NodeIndex,
    /// Nodes of the current partial path, starting with the source.
    path: NodePath,
    /// For each node of `path`, the position of the next adjacency entry to examine.
    cursors: Vec<usize>,
    on_path: BitVec,
    /// Trivial path when source and target coincide.
    pending: Option<NodePath>,
    /// Number of adjacency entries examined so far.
    steps: usize,
    limit: Option<usize>,
    exhausted: bool,
    cancel: Option<Arc<AtomicBool>>,
    cancelled: bool,
}

impl<'a> SimplePaths<'a> {
    /// Enumerate paths between two node indices.
    pub fn new(graph: &'a Graph, from: NodeIndex, to: NodeIndex) -> Self {
        let mut on_path = bitvec![0; graph.node_count()];
        let (path, cursors, pending) = if from == to {
            (Vec::new(), Vec::new(), Some(vec![from]))
        } else {
            on_path.set(from, true);
            (vec![from], vec![0], None)
        };
        SimplePaths {
            graph,
            target: to,
            path,
            cursors,
            on_path,
            pending,
            steps: 0,
            limit: None,
            exhausted: false,
            cancel: None,
            cancelled: false,
        }
    }

    /// Give up after examining this many adjacency entries.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Stop before the next search step once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Stop the enumeration. Subsequent calls to `next` return `None`.
    pub fn stop(&mut self) {
        self.pending = None;
        self.path.clear();
        self.cursors.clear();
        self.on_path.fill(false);
    }

    /// Number of search steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Returns true if the enumeration ended because the cancel flag was set.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn cancel_requested(&mut self) -> bool {
        let requested = self
            .cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed));
        if requested && !self.cancelled {
            log::debug!("Path enumeration cancelled after {} steps", self.steps);
            self.cancelled = true;
            self.stop();
        }
        requested
    }

    /// Returns true if the enumeration ended because the step limit was reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// The error describing why the enumeration ended early, if it did.
    pub fn exhaustion(&self) -> Option<TopologyError> {
        match (self.exhausted, self.limit) {
            (true, Some(limit)) => Some(TopologyError::ResourceExhaustion {
                explored: self.steps,
                limit,
            }),
            _ => None,
        }
    }
}

impl<'a> Iterator for SimplePaths<'a> {
    type Item = NodePath;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel_requested() {
            return None;
        }
        if let Some(path) = self.pending.take() {
            return Some(path);
        }
        let graph = self.graph;
        while let Some(&node) = self.path.last() {
            if self.cancel_requested() {
                return None;
            }
            let adjacent = graph.adjacent(node);
            let cursor = self.cursors.last_mut()?;
            if *cursor >= adjacent.len() {
                // Backtrack
                self.on_path.set(node, false);
                self.path.pop();
                self.cursors.pop();
                continue;
            }
            let next = adjacent[*cursor].node;
            *cursor += 1;

            self.steps += 1;
            if let Some(limit) = self.limit {
                if self.steps > limit {
                    log::debug!("Path enumeration stopped after {limit} steps");
                    self.exhausted = true;
                    self.stop();
                    return None;
                }
            }

            if next == self.target {
                let mut path = self.path.clone();
                path.push(next);
                return Some(path);
            }
            if !self.on_path[next] {
                self.on_path.set(next, true);
                self.path.push(next);
                self.cursors.push(0);
            }
        }
        None
    }
}

/// All simple paths between two nodes given by id.
///
/// Fails with [`TopologyError::NodeNotFound`] if either node is missing.
/// If both ids are equal, the only path is the trivial one.
pub fn all_simple_paths<'a>(graph: &'a Graph, from: &str, to: &str) -> Result<SimplePaths<'a>> {
    let from = graph.resolve(from)?;
    let to = graph.resolve(to)?;
    Ok(SimplePaths::new(graph, from, to))
}

/// Breadth-first search for a path with the fewest hops between two node indices.
///
/// Among several shortest paths, the one discovered first in adjacency order is returned.
pub fn bfs_path(graph: &Graph, from: NodeIndex, to: NodeIndex) -> Option<NodePath> {
    if from == to {
        return Some(vec![from]);
    }
    let mut parent: Vec<Option<NodeIndex>> = vec![None; graph.node_count()];
    let mut visited = bitvec![0; graph.node_count()];
    visited.set(from, true);
    let mut queue: VecDeque<NodeIndex> = VecDeque::from([from]);
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if visited[next] {
                continue;
            }
            visited.set(next, true);
            parent[next] = Some(node);
            if next == to {
                let mut path = vec![to];
                let mut current = to;
                while let Some(p) = parent[current] {
                    path.push(p);
                    current = p;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Shortest path by hop count between two nodes given by id.
///
/// Returns `Ok(None)` if the target cannot be reached.
pub fn shortest_path(graph: &Graph, from: &str, to: &str) -> Result<Option<NodePath>> {
    let from = graph.resolve(from)?;
    let to = graph.resolve(to)?;
    Ok(bfs_path(graph, from, to))
}

/// Longest simple path between two nodes given by id.
///
/// All simple paths are enumerated, so this is exponential in the worst case. The search honours
/// [`Config::max_path_steps`] and fails with [`TopologyError::ResourceExhaustion`] when the limit
/// is reached. Among paths of equal length the first one found wins.
/// Returns `Ok(None)` if the target cannot be reached.
pub fn longest_path(
    graph: &Graph,
    from: &str,
    to: &str,
    config: &Config,
) -> Result<Option<NodePath>> {
    let mut paths = all_simple_paths(graph, from, to)?.with_limit(config.max_path_steps);
    let mut longest: Option<NodePath> = None;
    for path in paths.by_ref() {
        if longest.as_ref().map_or(true, |l| path.len() > l.len()) {
            longest = Some(path);
        }
    }
    match paths.exhaustion() {
        Some(error) => Err(error),
        None => Ok(longest),
    }
}

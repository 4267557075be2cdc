//! Rooted view of a [`Graph`]: one breadth-first spanning tree per root.
use crate::graph::Graph;
use crate::types::*;

use bitvec::prelude::*;
use itertools::Itertools;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;


/// A node of a rooted tree. Owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub node: NodeIndex,
    pub id: String,
    /// Parent node in the graph, `None` for the tree root.
    pub parent: Option<NodeIndex>,
    /// Children in discovery order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(graph: &Graph, node: NodeIndex, parent: Option<NodeIndex>) -> Self {
        TreeNode {
            node,
            id: graph.id(node).to_string(),
            parent,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&TreeNode> = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Node indices of this subtree in pre-order.
    pub fn preorder(&self) -> Vec<NodeIndex> {
        let mut output = Vec::new();
        let mut stack: Vec<&TreeNode> = vec![self];
        while let Some(node) = stack.pop() {
            output.push(node.node);
            stack.extend(node.children.iter().rev());
        }
        output
    }
}

/// Draws the subtree with box-drawing characters, one node per line.
impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        // (node, prefix of its children, is last child)
        let mut stack: Vec<(&TreeNode, String, bool)> = self
            .children
            .iter()
            .enumerate()
            .rev()
            .map(|(i, child)| (child, String::new(), i + 1 == self.children.len()))
            .collect();
        while let Some((node, prefix, last)) = stack.pop() {
            let connector = if last { "└── " } else { "├── " };
            writeln!(f, "{prefix}{connector}{}", node.id)?;
            let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
            let n = node.children.len();
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i + 1 == n));
            }
        }
        Ok(())
    }
}

/// A graph edge that is not part of any tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtraEdge {
    pub edge: EdgeIndex,
    pub a: NodeIndex,
    pub b: NodeIndex,
}

/// Per-tree figures.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TreeStatistics {
    pub root: String,
    #[serde(rename = "nodesCount")]
    pub nodes_count: usize,
    /// Number of nodes on the longest root-to-leaf path.
    pub depth: usize,
}

/// Spanning trees of the parts of a graph reachable from a set of roots.
#[derive(Debug, Clone)]
pub struct Forest {
    /// One tree per root that was not reached from an earlier root, in root order.
    pub trees: Vec<TreeNode>,
    /// Edges between visited nodes that were not used as tree edges, in edge order.
    pub extra_edges: Vec<ExtraEdge>,
    /// Nodes not reachable from any root, in index order.
    pub unreachable: Vec<NodeIndex>,
    /// Roots that were reached from an earlier root, with the root of the tree containing them.
    pub absorbed_roots: Vec<(NodeIndex, NodeIndex)>,
    parent: Vec<Option<NodeIndex>>,
    parent_edge: Vec<Option<EdgeIndex>>,
    tree_of: Vec<Option<usize>>,
    depth: Vec<usize>,
    /// Node count and node depth of each tree.
    figures: Vec<(usize, usize)>,
}

/// Build a forest by breadth-first traversal from each root that is not visited yet.
///
/// Every node reachable from a root ends up in exactly one tree, attached to the neighbor that
/// discovered it first. Roots repeated in `roots` are considered once.
pub fn build_forest(graph: &Graph, roots: &[NodeIndex]) -> Forest {
    let n = graph.node_count();
    let mut visited = bitvec![0; n];
    let mut parent: Vec<Option<NodeIndex>> = vec![None; n];
    let mut parent_edge: Vec<Option<EdgeIndex>> = vec![None; n];
    let mut tree_of: Vec<Option<usize>> = vec![None; n];
    let mut depth: Vec<usize> = vec![0; n];
    // Position of each node in the breadth-first order of its tree.
    let mut position: Vec<usize> = vec![0; n];
    let mut trees: Vec<TreeNode> = Vec::new();
    let mut figures: Vec<(usize, usize)> = Vec::new();
    let mut absorbed_roots: Vec<(NodeIndex, NodeIndex)> = Vec::new();

    for &root in roots.iter().unique() {
        if visited[root] {
            if let Some(tree) = tree_of[root] {
                log::debug!(
                    "Root {} is part of the tree of {}",
                    graph.id(root),
                    trees[tree].id
                );
                absorbed_roots.push((root, trees[tree].node));
            }
            continue;
        }
        let tree = trees.len();
        visited.set(root, true);
        tree_of[root] = Some(tree);
        let mut order: Vec<NodeIndex> = vec![root];
        let mut queue: VecDeque<NodeIndex> = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for adj in graph.adjacent(node) {
                if visited[adj.node] {
                    continue;
                }
                visited.set(adj.node, true);
                parent[adj.node] = Some(node);
                parent_edge[adj.node] = Some(adj.edge);
                tree_of[adj.node] = Some(tree);
                depth[adj.node] = depth[node] + 1;
                order.push(adj.node);
                queue.push_back(adj.node);
            }
        }
        // The last node of a breadth-first order is one of the deepest.
        let deepest = order.last().map_or(0, |&node| depth[node]);
        figures.push((order.len(), deepest + 1));
        for (i, &node) in order.iter().enumerate() {
            position[node] = i;
        }
        trees.push(assemble_tree(graph, &order, &parent, &position));
    }

    let extra_edges = graph
        .edges()
        .iter()
        .enumerate()
        .filter(|&(e, edge)| {
            visited[edge.a]
                && visited[edge.b]
                && parent_edge[edge.a] != Some(e)
                && parent_edge[edge.b] != Some(e)
        })
        .map(|(e, edge)| ExtraEdge {
            edge: e,
            a: edge.a,
            b: edge.b,
        })
        .collect_vec();
    let unreachable = visited.iter_zeros().collect_vec();

    log::debug!(
        "Built {} trees with {} extra edges, {} nodes unreachable",
        trees.len(),
        extra_edges.len(),
        unreachable.len()
    );
    Forest {
        trees,
        extra_edges,
        unreachable,
        absorbed_roots,
        parent,
        parent_edge,
        tree_of,
        depth,
        figures,
    }
}

/// Turn a breadth-first order into nested nodes without recursion.
/// `position` maps the nodes of `order` to their place in it.
fn assemble_tree(
    graph: &Graph,
    order: &[NodeIndex],
    parent: &[Option<NodeIndex>],
    position: &[usize],
) -> TreeNode {
    let mut slots: Vec<Option<TreeNode>> = order
        .iter()
        .map(|&node| Some(TreeNode::new(graph, node, parent[node])))
        .collect();
    // Children come after their parent in BFS order, so they are complete when taken.
    for (i, &node) in order.iter().enumerate().skip(1).rev() {
        if let (Some(mut child), Some(p)) = (slots[i].take(), parent[node]) {
            child.children.reverse();
            if let Some(parent) = slots[position[p]].as_mut() {
                parent.children.push(child);
            }
        }
    }
    let mut root = slots[0]
        .take()
        .unwrap_or_else(|| TreeNode::new(graph, order[0], None));
    root.children.reverse();
    root
}

impl Forest {
    /// Parent of a node in its tree.
    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.parent[node]
    }

    /// The edge that attaches a node to its parent.
    pub fn parent_edge(&self, node: NodeIndex) -> Option<EdgeIndex> {
        self.parent_edge[node]
    }

    /// Position in [`Forest::trees`] of the tree containing the node.
    pub fn tree_of(&self, node: NodeIndex) -> Option<usize> {
        self.tree_of[node]
    }

    /// Distance from the tree root in edges.
    pub fn depth(&self, node: NodeIndex) -> usize {
        self.depth[node]
    }

    /// The path between two nodes of the same tree through parent links.
    /// `None` if the nodes are in different trees or not in any tree.
    pub fn tree_path(&self, a: NodeIndex, b: NodeIndex) -> Option<NodePath> {
        let tree = self.tree_of[a]?;
        if self.tree_of[b]? != tree {
            return None;
        }
        let mut up: NodePath = vec![a];
        let mut down: NodePath = vec![b];
        let (mut x, mut y) = (a, b);
        while self.depth[x] > self.depth[y] {
            x = self.parent[x]?;
            up.push(x);
        }
        while self.depth[y] > self.depth[x] {
            y = self.parent[y]?;
            down.push(y);
        }
        while x != y {
            x = self.parent[x]?;
            y = self.parent[y]?;
            up.push(x);
            down.push(y);
        }
        // The common ancestor is at the end of both halves.
        down.pop();
        up.extend(down.into_iter().rev());
        Some(up)
    }

    pub fn statistics(&self) -> Vec<TreeStatistics> {
        self.trees
            .iter()
            .zip(self.figures.iter())
            .map(|(tree, &(nodes_count, depth))| TreeStatistics {
                root: tree.id.clone(),
                nodes_count,
                depth,
            })
            .collect()
    }

    /// Total number of nodes in all trees.
    pub fn node_count(&self) -> usize {
        self.tree_of.iter().filter(|t| t.is_some()).count()
    }
}

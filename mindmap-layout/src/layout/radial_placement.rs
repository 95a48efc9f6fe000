// Radial seeding ("orbital" start configuration)
//
// 1. Picks a hub as root (bridge nodes touching many groups win at top level)
// 2. Builds a BFS spanning tree from the hub
// 3. Fans each node's children across the angular sector inherited from its
//    parent, one radial step away from the parent
//
// The force simulation starts from this configuration; a non-degenerate start
// matters a lot for the quality it converges to.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use crate::graph::{Graph, NodeId, Point};
use super::adjacency::Adjacency;

/// Score bonus per neighboring group when choosing a top-level hub.
const GROUP_NEIGHBOR_BONUS: i64 = 10;

/// Tree node for seeding.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub children: Vec<NodeId>,
    pub depth: usize,
    /// Angle offset for this node's sector (radians)
    pub angle_start: f64,
    /// Angular width of this node's sector
    pub angle_span: f64,
}

impl TreeNode {
    fn at_depth(depth: usize) -> Self {
        Self { children: Vec::new(), depth, angle_start: 0.0, angle_span: 0.0 }
    }
}

#[derive(Debug)]
pub struct LayoutTree {
    pub root: NodeId,
    /// Indexed by NodeId; `None` for nodes outside the tree.
    pub nodes: Vec<Option<TreeNode>>,
    /// Members BFS could not reach from the root.
    pub unreached: Vec<NodeId>,
}

impl LayoutTree {
    pub fn node(&self, nid: NodeId) -> Option<&TreeNode> {
        self.nodes.get(nid.0).and_then(Option::as_ref)
    }

    pub fn contains(&self, nid: NodeId) -> bool {
        self.node(nid).is_some()
    }
}

/// Top-level hub: (neighboring groups x bonus) + degree. Groups never win while a
/// plain node exists. First maximal candidate wins.
pub fn select_hub(graph: &Graph, adjacency: &Adjacency, members: &[NodeId]) -> NodeId {
    let score = |nid: NodeId| -> i64 {
        if graph.is_group(nid) {
            return i64::MIN / 2;
        }
        let neighbors = adjacency.neighbors(nid);
        let group_neighbors = neighbors.iter().filter(|&&n| graph.is_group(n)).count() as i64;
        group_neighbors * GROUP_NEIGHBOR_BONUS + neighbors.len() as i64
    };
    first_max_by_key(members, score)
}

/// Hub inside a group: highest degree, ties go to members without a tree parent
/// inside the group.
pub fn select_member_hub(graph: &Graph, adjacency: &Adjacency, members: &[NodeId]) -> NodeId {
    let mut in_group = vec![false; graph.len()];
    for m in members {
        in_group[m.0] = true;
    }
    let score = |nid: NodeId| -> (usize, bool) {
        let rootless = graph.node(nid).tree_parent.is_none_or(|p| !in_group[p.0]);
        (adjacency.degree(nid), rootless)
    };
    first_max_by_key(members, score)
}

/// Like `max_by_key`, but the first maximal element wins.
fn first_max_by_key<K: Ord>(items: &[NodeId], key: impl Fn(NodeId) -> K) -> NodeId {
    let mut best = items[0];
    let mut best_key = key(best);
    for &nid in &items[1..] {
        let k = key(nid);
        if k > best_key {
            best = nid;
            best_key = k;
        }
    }
    best
}

/// BFS spanning tree over `members`, children in discovery order.
pub fn build_spanning_tree(adjacency: &Adjacency, members: &[NodeId], root: NodeId) -> LayoutTree {
    let count = adjacency.node_count();
    let mut in_scope = vec![false; count];
    for m in members {
        in_scope[m.0] = true;
    }
    let mut nodes: Vec<Option<TreeNode>> = vec![None; count];
    nodes[root.0] = Some(TreeNode { angle_span: TAU, ..TreeNode::at_depth(0) });

    let mut queue = VecDeque::from([root]);
    while let Some(nid) = queue.pop_front() {
        let depth = nodes[nid.0].as_ref().map_or(0, |n| n.depth);
        for &n in adjacency.neighbors(nid) {
            if !in_scope[n.0] || nodes[n.0].is_some() {
                continue;
            }
            nodes[n.0] = Some(TreeNode::at_depth(depth + 1));
            if let Some(parent) = nodes[nid.0].as_mut() {
                parent.children.push(n);
            }
            queue.push_back(n);
        }
    }

    let unreached = members
        .iter()
        .copied()
        .filter(|nid| nodes[nid.0].is_none())
        .collect();

    LayoutTree { root, nodes, unreached }
}

/// Split each node's sector equally among its children.
fn assign_angles(tree: &mut LayoutTree, nid: NodeId, start: f64, span: f64) {
    let children = match tree.nodes.get_mut(nid.0).and_then(Option::as_mut) {
        Some(node) => {
            node.angle_start = start;
            node.angle_span = span;
            node.children.clone()
        }
        None => return,
    };
    if children.is_empty() {
        return;
    }
    let child_span = span / children.len() as f64;
    for (i, child) in children.into_iter().enumerate() {
        assign_angles(tree, child, start + i as f64 * child_span, child_span);
    }
}

/// Place the tree radially around the origin, writing centers into `centers`.
pub fn seed_radial(tree: &mut LayoutTree, step: f64, centers: &mut [Point]) {
    let root = tree.root;
    assign_angles(tree, root, 0.0, TAU);
    centers[root.0] = Point::ZERO;
    place_children(tree, root, step, centers);

    if tree.unreached.is_empty() {
        return;
    }
    let max_depth = tree.nodes.iter().flatten().map(|n| n.depth).max().unwrap_or(0);
    let radius = (max_depth + 1) as f64 * step;
    let slice = TAU / tree.unreached.len() as f64;
    for (i, &nid) in tree.unreached.iter().enumerate() {
        let angle = i as f64 * slice;
        centers[nid.0] = Point::new(radius * angle.cos(), radius * angle.sin());
    }
}

fn place_children(tree: &LayoutTree, nid: NodeId, step: f64, centers: &mut [Point]) {
    let Some(node) = tree.node(nid) else {
        return;
    };
    let origin = centers[nid.0];
    for &child in &node.children {
        let Some(c) = tree.node(child) else {
            continue;
        };
        let angle = c.angle_start + c.angle_span / 2.0;
        centers[child.0] = origin + Point::new(step * angle.cos(), step * angle.sin());
        place_children(tree, child, step, centers);
    }
}

// Adjacency for the layout passes.
//
// - Adjacency: dedup'd undirected neighbor lists over NodeIds
// - VirtualGraph: the top-level graph where every group and its members are
//   contracted into the group's NodeId
// - find_components: connected components + orphans of the virtual graph
//
// Neighbor order is first-seen order of the relations, which follows input order,
// so everything downstream is deterministic.

use std::collections::{HashSet, VecDeque};

use crate::graph::{Graph, NodeId};

/// Drop self-loops and repeated pairs (A-B and B-A are the same pair).
pub fn dedup_pairs(pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Vec<(NodeId, NodeId)> {
    let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut out = Vec::new();
    for (a, b) in pairs {
        if a == b {
            continue;
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        if seen.insert(key) {
            out.push(key);
        }
    }
    out
}

/// Undirected adjacency indexed by NodeId.
#[derive(Debug, Clone)]
pub struct Adjacency {
    neighbors: Vec<Vec<NodeId>>,
    /// Dedup'd pairs, each stored once as (low, high).
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Adjacency {
    pub fn from_pairs(node_count: usize, pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Self {
        let edges = dedup_pairs(pairs);
        let mut neighbors = vec![Vec::new(); node_count];
        for &(a, b) in &edges {
            neighbors[a.0].push(b);
            neighbors[b.0].push(a);
        }
        Self { neighbors, edges }
    }

    /// Relations among `members` only.
    pub fn among(graph: &Graph, members: &[NodeId]) -> Self {
        let set: HashSet<NodeId> = members.iter().copied().collect();
        Self::from_pairs(
            graph.len(),
            graph
                .relations()
                .filter(|(a, b)| set.contains(a) && set.contains(b)),
        )
    }

    pub fn neighbors(&self, nid: NodeId) -> &[NodeId] {
        &self.neighbors[nid.0]
    }

    pub fn degree(&self, nid: NodeId) -> usize {
        self.neighbors[nid.0].len()
    }

    /// Size of the NodeId space the lists are indexed by.
    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Edges with both endpoints in `members`.
    pub fn edges_within(&self, members: &[NodeId]) -> Vec<(NodeId, NodeId)> {
        let set: HashSet<NodeId> = members.iter().copied().collect();
        self.edges
            .iter()
            .copied()
            .filter(|(a, b)| set.contains(a) && set.contains(b))
            .collect()
    }
}

/// Top-level graph with groups contracted.
#[derive(Debug, Clone)]
pub struct VirtualGraph {
    /// Virtual nodes in input order.
    pub nodes: Vec<NodeId>,
    pub adjacency: Adjacency,
}

impl VirtualGraph {
    pub fn build(graph: &Graph) -> Self {
        // Virtual node standing in for each graph node: itself, or its group.
        let owner: Vec<NodeId> = graph
            .nodes
            .iter()
            .map(|n| n.group.unwrap_or(n.nid))
            .collect();
        let nodes = graph.top_level();
        // Relations inside one group collapse into self-loops and are dropped.
        let adjacency = Adjacency::from_pairs(
            graph.len(),
            graph.relations().map(|(a, b)| (owner[a.0], owner[b.0])),
        );
        Self { nodes, adjacency }
    }

    pub fn neighbors(&self, v: NodeId) -> &[NodeId] {
        self.adjacency.neighbors(v)
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.adjacency.degree(v)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Components {
    pub components: Vec<Vec<NodeId>>,
    /// Virtual nodes without any neighbor.
    pub orphans: Vec<NodeId>,
}

/// Partition the virtual graph. Each component lists its nodes in BFS order.
pub fn find_components(vg: &VirtualGraph) -> Components {
    let mut visited = vec![false; vg.adjacency.node_count()];
    let mut out = Components::default();

    for &start in &vg.nodes {
        if visited[start.0] {
            continue;
        }
        visited[start.0] = true;
        if vg.degree(start) == 0 {
            out.orphans.push(start);
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            component.push(v);
            for &n in vg.neighbors(v) {
                if !visited[n.0] {
                    visited[n.0] = true;
                    queue.push_back(n);
                }
            }
        }
        out.components.push(component);
    }
    out
}

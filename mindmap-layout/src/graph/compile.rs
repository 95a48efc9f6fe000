//
// Compile step: canvas snapshot (NodeInput/EdgeInput) -> Graph (layout-friendly IR)
//
// What this does:
// - Applies the layout scope (selection expansion through group membership)
// - Assigns every in-scope node a dense NodeId, in input order
// - Resolves tree parents, group membership and edge endpoints to NodeIds
// - Resolves each plain node's footprint through the caller's SizeLookup
//
// Policy for bad references (never an error):
// - edges/parents pointing outside the scope or to unknown ids are dropped
// - self-edges are dropped
// - groups are flat: a group's own groupId is ignored

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::types::{EdgeInput, EdgeKind, NodeInput, NodeKind, Point, Scope, Size, SizeLookup};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub index: HashMap<String, NodeId>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub nid: NodeId,
    pub id: String,
    pub kind: NodeKind,
    /// Measured footprint for plain nodes; persisted (or default) box for groups.
    pub size: Size,
    /// Current top-left, local to the group for members.
    pub position: Point,
    pub tree_parent: Option<NodeId>,
    pub group: Option<NodeId>,
    /// Members in input order (groups only).
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, nid: NodeId) -> &Node {
        &self.nodes[nid.0]
    }

    pub fn is_group(&self, nid: NodeId) -> bool {
        self.nodes[nid.0].kind == NodeKind::Group
    }

    pub fn groups(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Group)
    }

    /// Groups and ungrouped nodes, in input order.
    pub fn top_level(&self) -> Vec<NodeId> {
        self.nodes.iter().filter(|n| n.group.is_none()).map(|n| n.nid).collect()
    }

    /// Every logical connection: tree-parent links first, then edges.
    /// May contain duplicates; callers dedupe by unordered pair.
    pub fn relations(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let parents = self
            .nodes
            .iter()
            .filter_map(|n| n.tree_parent.map(|p| (n.nid, p)));
        let edges = self.edges.iter().map(|e| (e.from, e.to));
        parents.chain(edges)
    }
}

/// Expand a selection so that groups travel with their members and members with
/// their group and siblings.
pub fn resolve_scope<'a>(nodes: &'a [NodeInput], scope: &Scope) -> HashSet<&'a str> {
    let ids = match scope {
        Scope::All => return nodes.iter().map(|n| n.id.as_str()).collect(),
        Scope::Selection(ids) => ids,
    };

    let by_id: HashMap<&str, &NodeInput> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut groups: HashSet<&str> = HashSet::new();
    let mut out: HashSet<&str> = HashSet::new();

    for id in ids {
        let Some(node) = by_id.get(id.as_str()) else {
            continue;
        };
        out.insert(node.id.as_str());
        match node.kind {
            NodeKind::Group => {
                groups.insert(node.id.as_str());
            }
            NodeKind::Plain => {
                if let Some(gid) = node.group_id.as_deref() {
                    if let Some(g) = by_id.get(gid).filter(|g| g.kind == NodeKind::Group) {
                        groups.insert(g.id.as_str());
                        out.insert(g.id.as_str());
                    }
                }
            }
        }
    }

    for node in nodes {
        if node.kind == NodeKind::Plain
            && node.group_id.as_deref().is_some_and(|g| groups.contains(g))
        {
            out.insert(node.id.as_str());
        }
    }
    out
}

/// Compile the snapshot into an indexed graph restricted to `scope`.
pub fn compile(
    nodes: &[NodeInput],
    edges: &[EdgeInput],
    scope: &Scope,
    sizes: &dyn SizeLookup,
    default_size: Size,
    default_group_size: Size,
) -> Graph {
    let in_scope = resolve_scope(nodes, scope);

    let mut index: HashMap<String, NodeId> = HashMap::new();
    let mut out_nodes: Vec<Node> = Vec::new();

    for n in nodes {
        if !in_scope.contains(n.id.as_str()) || index.contains_key(&n.id) {
            continue;
        }
        let nid = NodeId(out_nodes.len());
        let size = match n.kind {
            NodeKind::Plain => sizes
                .size_of(&n.id)
                .filter(|s| s.width > 0.0 && s.height > 0.0)
                .or_else(|| n.own_size())
                .unwrap_or(default_size),
            NodeKind::Group => n.own_size().unwrap_or(default_group_size),
        };
        index.insert(n.id.clone(), nid);
        out_nodes.push(Node {
            nid,
            id: n.id.clone(),
            kind: n.kind,
            size,
            position: n.position,
            tree_parent: None,
            group: None,
            members: Vec::new(),
        });
    }

    // Second pass: references, now that every in-scope id has a NodeId.
    for n in nodes {
        let Some(&nid) = index.get(&n.id) else {
            continue;
        };
        if out_nodes[nid.0].kind == NodeKind::Group {
            if let Some(gid) = &n.group_id {
                warn!(group = %n.id, parent = %gid, "nested groups are not supported; laying out at top level");
            }
            continue;
        }

        let parent = n
            .tree_parent_id
            .as_ref()
            .and_then(|p| index.get(p))
            .copied()
            .filter(|&p| p != nid);
        out_nodes[nid.0].tree_parent = parent;

        let group = n
            .group_id
            .as_ref()
            .and_then(|g| index.get(g))
            .copied()
            .filter(|&g| out_nodes[g.0].kind == NodeKind::Group);
        if let Some(g) = group {
            // Duplicate ids are skipped above, so each member is pushed once.
            if out_nodes[nid.0].group.is_none() {
                out_nodes[nid.0].group = Some(g);
                out_nodes[g.0].members.push(nid);
            }
        }
    }

    let out_edges: Vec<Edge> = edges
        .iter()
        .filter_map(|e| {
            let from = *index.get(&e.source)?;
            let to = *index.get(&e.target)?;
            (from != to).then(|| Edge { id: e.id.clone(), from, to, kind: e.kind })
        })
        .collect();

    Graph { nodes: out_nodes, edges: out_edges, index }
}

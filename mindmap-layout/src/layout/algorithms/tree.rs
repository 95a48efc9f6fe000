//! Tree layout for the horizontal and vertical modes.
//!
//! A classic tidy drawing of the tree-parent forest: every subtree reserves a
//! span perpendicular to the growth axis, leaves sit centered in their span and
//! parents sit centered over their first and last child. Depth is a fixed step
//! along the growth axis. Groups are wrapped around their placed members
//! afterwards.

use tracing::debug;

use crate::graph::{Graph, NodeId, Point, Size};
use crate::layout::{bounding_box, Flow, LayoutConfig, LayoutStrategy, Placement, Rect};

/// Direction the trees grow in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TreeAxis {
    /// Roots on the left, children to the right.
    Horizontal,
    /// Roots on top, children below.
    Vertical,
}

impl TreeAxis {
    /// Depth runs along the flow's main axis, siblings along its cross axis.
    fn flow(self) -> Flow {
        match self {
            TreeAxis::Horizontal => Flow::Row,
            TreeAxis::Vertical => Flow::Column,
        }
    }
}

pub struct TreeLayout {
    pub axis: TreeAxis,
}

impl LayoutStrategy for TreeLayout {
    fn layout(&self, graph: &Graph, _viewport: Size, cfg: &LayoutConfig) -> Placement {
        layout_tree(graph, self.axis, cfg)
    }
}

/// Forest over plain nodes with cycles broken.
struct Forest {
    roots: Vec<NodeId>,
    children: Vec<Vec<NodeId>>,
    depth: Vec<usize>,
    /// Parents before children.
    preorder: Vec<NodeId>,
}

fn build_forest(graph: &Graph) -> Forest {
    let n = graph.len();
    let plain: Vec<NodeId> = graph.nodes.iter().filter(|v| !graph.is_group(v.nid)).map(|v| v.nid).collect();

    let mut declared: Vec<Vec<NodeId>> = vec![Vec::new(); n];
    let mut candidates = Vec::new();
    for &v in &plain {
        match graph.node(v).tree_parent {
            Some(p) if !graph.is_group(p) => declared[p.0].push(v),
            _ => candidates.push(v),
        }
    }

    let mut forest = Forest {
        roots: Vec::new(),
        children: vec![Vec::new(); n],
        depth: vec![0; n],
        preorder: Vec::new(),
    };
    let mut visited = vec![false; n];
    // Nodes on a parent cycle are never reached from a real root; the first of
    // them in input order becomes a root.
    let fallback = plain.iter().copied();
    for start in candidates.into_iter().chain(fallback) {
        if visited[start.0] {
            continue;
        }
        visited[start.0] = true;
        forest.roots.push(start);
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            forest.preorder.push(v);
            for &c in &declared[v.0] {
                if !visited[c.0] {
                    visited[c.0] = true;
                    forest.children[v.0].push(c);
                    forest.depth[c.0] = forest.depth[v.0] + 1;
                }
            }
            stack.extend(forest.children[v.0].iter().rev().copied());
        }
    }
    forest
}

pub fn layout_tree(graph: &Graph, axis: TreeAxis, cfg: &LayoutConfig) -> Placement {
    let mut placement = Placement::new(graph);
    let flow = axis.flow();
    let sizes = &placement.size;
    let forest = build_forest(graph);

    // Subtree spans, children first.
    let mut span = vec![0.0; graph.len()];
    for &v in forest.preorder.iter().rev() {
        let kids = &forest.children[v.0];
        let own = flow.cross_len(sizes[v.0]);
        let block = kids.iter().map(|c| span[c.0]).sum::<f64>()
            + cfg.sibling_spacing * kids.len().saturating_sub(1) as f64;
        span[v.0] = if kids.is_empty() { own } else { own.max(block) };
    }

    // Where each subtree's span starts on the cross axis, parents first.
    let mut start = vec![0.0; graph.len()];
    let mut cursor = 0.0;
    for &r in &forest.roots {
        start[r.0] = cursor;
        cursor += span[r.0] + cfg.root_gap;
    }
    for &v in &forest.preorder {
        let kids = &forest.children[v.0];
        let block = kids.iter().map(|c| span[c.0]).sum::<f64>()
            + cfg.sibling_spacing * kids.len().saturating_sub(1) as f64;
        let mut at = start[v.0] + (span[v.0] - block).max(0.0) / 2.0;
        for c in kids {
            start[c.0] = at;
            at += span[c.0] + cfg.sibling_spacing;
        }
    }

    // Cross-axis centers, children first.
    let mut center = vec![0.0; graph.len()];
    for &v in forest.preorder.iter().rev() {
        let kids = &forest.children[v.0];
        center[v.0] = match (kids.first(), kids.last()) {
            (Some(first), Some(last)) => (center[first.0] + center[last.0]) / 2.0,
            _ => start[v.0] + span[v.0] / 2.0,
        };
    }

    let level = forest
        .preorder
        .iter()
        .map(|v| flow.main_len(sizes[v.0]))
        .fold(0.0, f64::max)
        + cfg.level_gap;
    let mut absolute = vec![Point::ZERO; graph.len()];
    for &v in &forest.preorder {
        let cross = center[v.0] - flow.cross_len(sizes[v.0]) / 2.0;
        absolute[v.0] = flow.point(forest.depth[v.0] as f64 * level, cross);
    }

    // Wrap groups around their members; empty groups go after the forest.
    let group_ids: Vec<NodeId> = graph.groups().map(|g| g.nid).collect();
    let mut group_sizes = Vec::with_capacity(group_ids.len());
    for &gid in &group_ids {
        let members = &graph.node(gid).members;
        let bb = bounding_box(members.iter().map(|m| {
            let s = sizes[m.0];
            Rect::new(absolute[m.0].x, absolute[m.0].y, s.width, s.height)
        }));
        let (pos, size) = match bb {
            Some(bb) => (
                Point::new(bb.x - cfg.group_padding, bb.y - cfg.group_header - cfg.group_padding),
                Size::new(
                    (bb.w + 2.0 * cfg.group_padding).max(cfg.min_group_size.width),
                    (bb.h + cfg.group_header + 2.0 * cfg.group_padding).max(cfg.min_group_size.height),
                ),
            ),
            None => {
                let size = graph.node(gid).size;
                let pos = flow.point(0.0, cursor);
                cursor += flow.cross_len(size) + cfg.root_gap;
                (pos, size)
            }
        };
        absolute[gid.0] = pos;
        group_sizes.push((gid, size));
    }
    for (gid, size) in group_sizes {
        placement.size[gid.0] = size;
    }

    for node in &graph.nodes {
        placement.pos[node.nid.0] = match node.group {
            Some(g) => absolute[node.nid.0] - absolute[g.0],
            None => absolute[node.nid.0],
        };
    }
    debug!(roots = forest.roots.len(), ?axis, "tree layout done");
    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{compile, NodeInput, Scope, Unmeasured};

    fn run(nodes: &[NodeInput], axis: TreeAxis) -> (Graph, Placement) {
        let cfg = LayoutConfig::default();
        let graph = compile(nodes, &[], &Scope::All, &Unmeasured, cfg.default_node_size, cfg.default_group_size);
        let placement = layout_tree(&graph, axis, &cfg);
        (graph, placement)
    }

    #[test]
    fn test_horizontal_children_evenly_spaced_root_centered() {
        let nodes = vec![
            NodeInput::plain("root"),
            NodeInput::plain("c1").with_parent("root"),
            NodeInput::plain("c2").with_parent("root"),
            NodeInput::plain("c3").with_parent("root"),
        ];
        let (graph, placement) = run(&nodes, TreeAxis::Horizontal);
        let at = |id: &str| placement.pos[graph.index[id].0];

        assert_eq!(at("c1").y, 0.0);
        assert_eq!(at("c2").y, 80.0);
        assert_eq!(at("c3").y, 160.0);
        assert_eq!(at("root"), Point::new(0.0, 80.0));
        assert_eq!(at("c1").x, 280.0);
    }

    #[test]
    fn test_vertical_grows_down() {
        let nodes = vec![NodeInput::plain("root"), NodeInput::plain("kid").with_parent("root")];
        let (graph, placement) = run(&nodes, TreeAxis::Vertical);
        let root = placement.pos[graph.index["root"].0];
        let kid = placement.pos[graph.index["kid"].0];
        assert_eq!(kid.y, root.y + 150.0);
        assert_eq!(kid.x, root.x);
    }

    #[test]
    fn test_parent_cycle_still_places_everything() {
        let nodes = vec![
            NodeInput::plain("a").with_parent("b"),
            NodeInput::plain("b").with_parent("a"),
            NodeInput::plain("c"),
        ];
        let (graph, placement) = run(&nodes, TreeAxis::Horizontal);
        let rects = placement.absolute_rects(&graph);
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                assert!(!rects[i].overlaps(&rects[j]));
            }
        }
    }

    #[test]
    fn test_group_wraps_members_in_local_frame() {
        let cfg = LayoutConfig::default();
        let nodes = vec![
            NodeInput::plain("root"),
            NodeInput::group("g"),
            NodeInput::plain("m1").in_group("g").with_parent("root"),
            NodeInput::plain("m2").in_group("g").with_parent("root"),
        ];
        let (graph, placement) = run(&nodes, TreeAxis::Horizontal);
        let g = graph.index["g"];
        let size = placement.size[g.0];
        for id in ["m1", "m2"] {
            let p = placement.pos[graph.index[id].0];
            assert!(p.x >= cfg.group_padding - 1e-9);
            assert!(p.y >= cfg.group_header + cfg.group_padding - 1e-9);
            assert!(p.x + 180.0 <= size.width + 1e-9);
            assert!(p.y + 50.0 <= size.height + 1e-9);
        }
    }
}

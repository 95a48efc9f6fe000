// Mini-layout inside one group.
//
// Same pipeline as a top-level component, with the tighter group SimConfig:
// member adjacency -> hub -> BFS radial seed -> simulate -> crossings -> overlaps.
// The result is normalized into the group's local frame: members start at
// (padding, header + padding) and the group box wraps them.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::{Graph, NodeId, Point, Size};
use super::adjacency::Adjacency;
use super::crossing::reduce_crossings;
use super::force_placement::simulate;
use super::overlap::{legalize_overlaps, resolve_overlaps};
use super::radial_placement::{build_spanning_tree, seed_radial, select_member_hub};
use super::{bounding_box, LayoutConfig, Rect};

/// Lay out the members of `gid`, writing their local top-left positions into
/// `pos`. Returns the group's box size.
pub fn layout_group(graph: &Graph, gid: NodeId, cfg: &LayoutConfig, sizes: &[Size], pos: &mut [Point]) -> Size {
    let members = &graph.node(gid).members;
    if members.is_empty() {
        return graph.node(gid).size;
    }

    let mut centers = vec![Point::ZERO; graph.len()];
    let adjacency = Adjacency::among(graph, members);
    let hub = select_member_hub(graph, &adjacency, members);
    let mut tree = build_spanning_tree(&adjacency, members, hub);
    seed_radial(&mut tree, cfg.group.ideal_len, &mut centers);

    let steps = simulate(members, &mut centers, &adjacency.edges, sizes, &cfg.group);
    let swaps = reduce_crossings(members, &adjacency.edges, &mut centers);
    if !resolve_overlaps(members, &mut centers, sizes, cfg.group.collision_padding, &HashSet::new()) {
        legalize_overlaps(members, &mut centers, sizes, cfg.group.collision_padding);
    }
    debug!(group = %graph.node(gid).id, members = members.len(), steps, swaps, "group laid out");

    let rects: Vec<Rect> = members
        .iter()
        .map(|m| Rect::from_center(centers[m.0], sizes[m.0]))
        .collect();
    let Some(bb) = bounding_box(rects.iter().copied()) else {
        return graph.node(gid).size;
    };

    let origin = Point::new(cfg.group_padding, cfg.group_header + cfg.group_padding);
    for (m, r) in members.iter().zip(&rects) {
        pos[m.0] = Point::new(r.x - bb.x, r.y - bb.y) + origin;
    }

    Size::new(
        (bb.w + 2.0 * cfg.group_padding).max(cfg.min_group_size.width),
        (bb.h + cfg.group_header + 2.0 * cfg.group_padding).max(cfg.min_group_size.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{compile, EdgeInput, EdgeKind, NodeInput, Scope, Unmeasured};

    fn group_graph(extra: Vec<NodeInput>, edges: Vec<EdgeInput>) -> Graph {
        let mut nodes = vec![
            NodeInput::group("g"),
            NodeInput::plain("m1").in_group("g"),
            NodeInput::plain("m2").in_group("g").with_parent("m1"),
            NodeInput::plain("m3").in_group("g").with_parent("m1"),
        ];
        nodes.extend(extra);
        let cfg = LayoutConfig::default();
        compile(&nodes, &edges, &Scope::All, &Unmeasured, cfg.default_node_size, cfg.default_group_size)
    }

    #[test]
    fn test_members_fit_inside_local_frame() {
        let graph = group_graph(
            vec![NodeInput::plain("m4").in_group("g")],
            vec![EdgeInput::new("x", "m2", "m3", EdgeKind::Crosslink)],
        );
        let cfg = LayoutConfig::default();
        let sizes: Vec<Size> = graph.nodes.iter().map(|n| n.size).collect();
        let mut pos = vec![Point::ZERO; graph.len()];
        let gid = graph.index["g"];
        let size = layout_group(&graph, gid, &cfg, &sizes, &mut pos);

        for &m in &graph.node(gid).members {
            let p = pos[m.0];
            let s = sizes[m.0];
            assert!(p.x >= 0.0 && p.x + s.width <= size.width + 1e-9);
            assert!(p.y >= cfg.group_header && p.y + s.height <= size.height + 1e-9);
        }
        // Members do not overlap each other.
        let members = &graph.node(gid).members;
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let a = Rect::new(pos[members[i].0].x, pos[members[i].0].y, 180.0, 50.0);
                let b = Rect::new(pos[members[j].0].x, pos[members[j].0].y, 180.0, 50.0);
                assert!(!a.overlaps(&b));
            }
        }
    }

    #[test]
    fn test_single_member_sits_at_padding_origin() {
        let nodes = vec![NodeInput::group("g"), NodeInput::plain("only").in_group("g")];
        let cfg = LayoutConfig::default();
        let graph = compile(&nodes, &[], &Scope::All, &Unmeasured, cfg.default_node_size, cfg.default_group_size);
        let sizes: Vec<Size> = graph.nodes.iter().map(|n| n.size).collect();
        let mut pos = vec![Point::ZERO; graph.len()];
        let size = layout_group(&graph, graph.index["g"], &cfg, &sizes, &mut pos);

        assert_eq!(pos[graph.index["only"].0], Point::new(24.0, 64.0));
        assert_eq!(size, Size::new(228.0, 138.0));
    }

    #[test]
    fn test_empty_group_keeps_default_box() {
        let nodes = vec![NodeInput::group("g")];
        let cfg = LayoutConfig::default();
        let graph = compile(&nodes, &[], &Scope::All, &Unmeasured, cfg.default_node_size, cfg.default_group_size);
        let sizes: Vec<Size> = graph.nodes.iter().map(|n| n.size).collect();
        let mut pos = vec![Point::ZERO; graph.len()];
        assert_eq!(layout_group(&graph, NodeId(0), &cfg, &sizes, &mut pos), cfg.default_group_size);
    }
}

//! Radial (force-directed) layout, the default mode.
//!
//! Groups are laid out internally first so their boxes are known, then the
//! contracted top-level graph is relaxed component by component and cleaned up
//! for the viewport.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::{Graph, NodeId, Point, Size};
use crate::layout::adjacency::{find_components, VirtualGraph};
use crate::layout::arrange::{arrange_component, place_orphans, tile_components};
use crate::layout::crossing::reduce_crossings;
use crate::layout::force_placement::simulate;
use crate::layout::group_layout::layout_group;
use crate::layout::overlap::{resolve_overlaps, sweep_overlaps};
use crate::layout::radial_placement::{build_spanning_tree, seed_radial, select_hub};
use crate::layout::viewport::{clamp_non_negative, correct_aspect};
use crate::layout::{Flow, LayoutConfig, LayoutStrategy, Placement};

pub struct RadialLayout;

impl LayoutStrategy for RadialLayout {
    fn layout(&self, graph: &Graph, viewport: Size, cfg: &LayoutConfig) -> Placement {
        layout_radial(graph, viewport, cfg)
    }
}

pub fn layout_radial(graph: &Graph, viewport: Size, cfg: &LayoutConfig) -> Placement {
    let mut placement = Placement::new(graph);

    // Inside out: group boxes feed the top-level pass.
    let group_ids: Vec<NodeId> = graph.groups().map(|g| g.nid).collect();
    for gid in group_ids {
        let size = layout_group(graph, gid, cfg, &placement.size, &mut placement.pos);
        placement.size[gid.0] = size;
    }

    let vg = VirtualGraph::build(graph);
    let found = find_components(&vg);
    let flow = Flow::for_viewport(viewport);
    let sizes = &placement.size;
    let mut centers = vec![Point::ZERO; graph.len()];

    for component in &found.components {
        let hub = select_hub(graph, &vg.adjacency, component);
        let mut tree = build_spanning_tree(&vg.adjacency, component, hub);
        seed_radial(&mut tree, cfg.top_level.ideal_len, &mut centers);

        let edges = vg.adjacency.edges_within(component);
        let steps = simulate(component, &mut centers, &edges, sizes, &cfg.top_level);
        let swaps = reduce_crossings(component, &edges, &mut centers);
        resolve_overlaps(component, &mut centers, sizes, cfg.top_level.collision_padding, &HashSet::new());
        arrange_component(graph, &vg.adjacency, component, &mut centers, sizes, flow, cfg);
        debug!(hub = %graph.node(hub).id, size = component.len(), steps, swaps, "component laid out");
    }

    tile_components(&found.components, &mut centers, sizes, flow, cfg);
    let placed = found.components.concat();
    place_orphans(graph, &found.orphans, &placed, &mut centers, sizes, flow, cfg);

    let top = &vg.nodes;
    let settled = sweep_overlaps(graph, top, &mut centers, sizes, cfg.element_gap);
    let corrected = correct_aspect(graph, top, &mut centers, sizes, viewport, cfg.element_gap);
    clamp_non_negative(top, &mut centers, sizes);
    debug!(
        components = found.components.len(),
        orphans = found.orphans.len(),
        settled,
        corrected,
        ?flow,
        "radial layout done"
    );

    for &v in top {
        let s = placement.size[v.0];
        placement.pos[v.0] = centers[v.0] - Point::new(s.width / 2.0, s.height / 2.0);
    }
    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{compile, EdgeInput, EdgeKind, NodeInput, Scope, Unmeasured};

    fn run(nodes: &[NodeInput], edges: &[EdgeInput]) -> (Graph, Placement) {
        let cfg = LayoutConfig::default();
        let graph = compile(nodes, edges, &Scope::All, &Unmeasured, cfg.default_node_size, cfg.default_group_size);
        let placement = layout_radial(&graph, cfg.default_viewport, &cfg);
        (graph, placement)
    }

    #[test]
    fn test_isolated_node_at_origin() {
        let (graph, placement) = run(&[NodeInput::plain("solo").at(500.0, -300.0)], &[]);
        let p = placement.pos[graph.index["solo"].0];
        assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
    }

    #[test]
    fn test_star_has_no_overlap() {
        let mut nodes = vec![NodeInput::plain("hub")];
        for i in 0..7 {
            nodes.push(NodeInput::plain(&format!("leaf{i}")).with_parent("hub"));
        }
        let (graph, placement) = run(&nodes, &[]);
        let rects = placement.absolute_rects(&graph);
        for i in 0..rects.len() {
            assert!(rects[i].x >= -1e-9 && rects[i].y >= -1e-9);
            for j in (i + 1)..rects.len() {
                assert!(!rects[i].overlaps(&rects[j]), "{i} overlaps {j}");
            }
        }
    }

    #[test]
    fn test_same_input_same_output() {
        let nodes = vec![
            NodeInput::group("g"),
            NodeInput::plain("m1").in_group("g"),
            NodeInput::plain("m2").in_group("g").with_parent("m1"),
            NodeInput::plain("a"),
            NodeInput::plain("b").with_parent("a"),
        ];
        let edges = vec![EdgeInput::new("x", "a", "m2", EdgeKind::Crosslink)];
        let (_, first) = run(&nodes, &edges);
        let (_, second) = run(&nodes, &edges);
        assert_eq!(first.pos, second.pos);
        assert_eq!(first.size, second.size);
    }
}

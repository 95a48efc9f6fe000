// Component arrangement.
//
// - arrange_component: groups of a component go into one row (largest first),
//   centered on the axis; bridge nodes sit on a line beyond the row, each over
//   the mean position of the groups it touches
// - tile_components: components side by side along the viewport's long axis
// - place_orphans: unconnected groups next to the existing groups; unconnected
//   nodes into free space below the rightmost element, else past the bounds
//
// Everything works on centers, indexed by NodeId.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::graph::{Graph, NodeId, Point, Size};
use super::adjacency::Adjacency;
use super::crossing::reduce_crossings;
use super::overlap::resolve_overlaps;
use super::spatial_grid::SpatialGrid;
use super::{bounding_box, Flow, LayoutConfig, Rect};

fn rect_of(v: NodeId, centers: &[Point], sizes: &[Size]) -> Rect {
    Rect::from_center(centers[v.0], sizes[v.0])
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Rearrange one component: group row plus bridge line.
/// Components without groups keep their relaxed shape.
pub fn arrange_component(
    graph: &Graph,
    adjacency: &Adjacency,
    component: &[NodeId],
    centers: &mut [Point],
    sizes: &[Size],
    flow: Flow,
    cfg: &LayoutConfig,
) {
    let mut groups: Vec<NodeId> = component.iter().copied().filter(|&v| graph.is_group(v)).collect();
    if groups.is_empty() {
        return;
    }
    groups.sort_by(|a, b| sizes[b.0].area().total_cmp(&sizes[a.0].area()));

    let total: f64 = groups.iter().map(|g| flow.main_len(sizes[g.0])).sum::<f64>()
        + cfg.group_gap * (groups.len() - 1) as f64;
    let mut cursor = -total / 2.0;
    for &g in &groups {
        let len = flow.main_len(sizes[g.0]);
        centers[g.0] = flow.point(cursor + len / 2.0, 0.0);
        cursor += len + cfg.group_gap;
    }
    let row_near = groups
        .iter()
        .map(|g| -flow.cross_len(sizes[g.0]) / 2.0)
        .fold(0.0, f64::min);

    let bridges: Vec<NodeId> = component.iter().copied().filter(|&v| !graph.is_group(v)).collect();
    if bridges.is_empty() {
        return;
    }
    let line = |b: NodeId| row_near - cfg.bridge_offset - flow.cross_len(sizes[b.0]) / 2.0;

    // Target position along the row: mean of the groups a bridge touches.
    let mut target: Vec<Option<f64>> = vec![None; centers.len()];
    for &b in &bridges {
        let mains: Vec<f64> = adjacency
            .neighbors(b)
            .iter()
            .filter(|n| graph.is_group(**n))
            .map(|g| flow.main(centers[g.0]))
            .collect();
        if let Some(m) = mean(&mains) {
            target[b.0] = Some(m);
        }
    }
    // Bridges that reach groups only through other bridges follow those.
    let mut pending: Vec<NodeId> = bridges.iter().copied().filter(|b| target[b.0].is_none()).collect();
    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|b| {
            let known: Vec<f64> = adjacency
                .neighbors(*b)
                .iter()
                .filter_map(|n| target[n.0])
                .collect();
            match mean(&known) {
                Some(m) => {
                    target[b.0] = Some(m);
                    false
                }
                None => true,
            }
        });
        if pending.len() == before {
            break;
        }
    }
    let target_of = |b: NodeId| target[b.0].unwrap_or(0.0);

    let mut ordered = bridges.clone();
    ordered.sort_by(|a, b| target_of(*a).total_cmp(&target_of(*b)));

    let mut placed: Vec<NodeId> = Vec::new();
    for &b in &ordered {
        let len = flow.main_len(sizes[b.0]);
        let mut main = target_of(b);
        for _ in 0..=placed.len() {
            let pushed = placed
                .iter()
                .filter_map(|p| {
                    let other = flow.main(centers[p.0]);
                    let reach = (len + flow.main_len(sizes[p.0])) / 2.0 + cfg.element_gap;
                    ((main - other).abs() < reach).then_some(other + reach)
                })
                .fold(f64::NEG_INFINITY, f64::max);
            if pushed == f64::NEG_INFINITY {
                break;
            }
            main = pushed;
        }
        centers[b.0] = flow.point(main, line(b));
        placed.push(b);
    }

    let edges = adjacency.edges_within(component);
    reduce_crossings(&bridges, &edges, centers);
    for &b in &bridges {
        centers[b.0] = flow.point(flow.main(centers[b.0]), line(b));
    }
    // Groups are pinned; only bridges give way.
    let pinned: HashSet<NodeId> = groups.iter().copied().collect();
    resolve_overlaps(component, centers, sizes, cfg.element_gap, &pinned);
    // Bridges stay on their side of the row.
    for &b in &bridges {
        let cross = flow.cross(centers[b.0]).min(line(b));
        centers[b.0] = flow.point(flow.main(centers[b.0]), cross);
    }
}

/// Tile components along the flow, largest first.
pub fn tile_components(components: &[Vec<NodeId>], centers: &mut [Point], sizes: &[Size], flow: Flow, cfg: &LayoutConfig) {
    let mut order: Vec<usize> = (0..components.len()).collect();
    order.sort_by_key(|&i| Reverse(components[i].len()));

    let mut cursor = 0.0;
    for i in order {
        let component = &components[i];
        let Some(bb) = bounding_box(component.iter().map(|&v| rect_of(v, centers, sizes))) else {
            continue;
        };
        let delta = match flow {
            Flow::Row => Point::new(cursor - bb.x, -bb.y),
            Flow::Column => Point::new(-bb.x, cursor - bb.y),
        };
        for v in component {
            centers[v.0] += delta;
        }
        cursor += flow.main_len(Size::new(bb.w, bb.h)) + cfg.component_gap;
    }
}

/// Place virtual nodes without any connection around what is already placed.
pub fn place_orphans(
    graph: &Graph,
    orphans: &[NodeId],
    already_placed: &[NodeId],
    centers: &mut [Point],
    sizes: &[Size],
    flow: Flow,
    cfg: &LayoutConfig,
) {
    let mut placed: Vec<NodeId> = already_placed.to_vec();

    for &g in orphans.iter().filter(|&&v| graph.is_group(v)) {
        let anchor = placed
            .iter()
            .filter(|&&v| graph.is_group(v))
            .map(|&v| rect_of(v, centers, sizes))
            .reduce(|best, r| match flow {
                Flow::Row if r.right() > best.right() => r,
                Flow::Column if r.bottom() > best.bottom() => r,
                _ => best,
            });
        let top_left = match (anchor, bounding_box(placed.iter().map(|&v| rect_of(v, centers, sizes)))) {
            (Some(a), _) => match flow {
                Flow::Row => Point::new(a.right() + cfg.group_gap, a.y),
                Flow::Column => Point::new(a.x, a.bottom() + cfg.group_gap),
            },
            (None, Some(bb)) => match flow {
                Flow::Row => Point::new(bb.right() + cfg.component_gap, bb.y),
                Flow::Column => Point::new(bb.x, bb.bottom() + cfg.component_gap),
            },
            (None, None) => Point::ZERO,
        };
        let s = sizes[g.0];
        centers[g.0] = top_left + Point::new(s.width / 2.0, s.height / 2.0);
        placed.push(g);
    }

    let plain: Vec<NodeId> = orphans.iter().copied().filter(|&v| !graph.is_group(v)).collect();
    if plain.is_empty() {
        return;
    }

    let rects: Vec<Rect> = placed.iter().map(|&v| rect_of(v, centers, sizes)).collect();
    let Some(bounds) = bounding_box(rects.iter().copied()) else {
        // Nothing else on the canvas: a simple line from the origin.
        let mut cursor = 0.0;
        for v in plain {
            let s = sizes[v.0];
            centers[v.0] = flow.point(cursor + flow.main_len(s) / 2.0, flow.cross_len(s) / 2.0);
            cursor += flow.main_len(s) + cfg.element_gap;
        }
        return;
    };

    let anchor = rects
        .iter()
        .copied()
        .reduce(|best, r| if r.right() > best.right() { r } else { best })
        .unwrap_or(bounds);
    let cell = sizes.iter().map(|s| s.max_side()).fold(cfg.default_node_size.max_side(), f64::max);
    let mut grid = SpatialGrid::new(cell);
    for r in &rects {
        grid.insert(*r);
    }

    let mut overflow = match flow {
        Flow::Row => bounds.x,
        Flow::Column => bounds.y,
    };
    for v in plain {
        let s = sizes[v.0];
        let mut spot = None;
        let mut top = anchor.bottom() + cfg.element_gap;
        while top + s.height <= bounds.bottom() {
            let candidate = Rect::new(anchor.x, top, s.width, s.height);
            if !grid.overlaps_any(&candidate.inflate(cfg.element_gap)) {
                spot = Some(candidate);
                break;
            }
            top += (s.height + cfg.element_gap) / 2.0;
        }
        let rect = spot.unwrap_or_else(|| {
            let r = match flow {
                Flow::Row => Rect::new(overflow, bounds.bottom() + cfg.element_gap, s.width, s.height),
                Flow::Column => Rect::new(bounds.right() + cfg.element_gap, overflow, s.width, s.height),
            };
            overflow += flow.main_len(s) + cfg.element_gap;
            r
        });
        centers[v.0] = rect.center();
        grid.insert(rect);
    }
}

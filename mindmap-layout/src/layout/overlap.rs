// Overlap removal on padded axis-aligned boxes.
//
// resolve_overlaps: symmetric push along the line between centers by half the
// smaller overlap plus a margin; pinned nodes never move.
//
// sweep_overlaps: the final pass over all top-level elements. Pairs are visited
// by category (group/group, node/group, node/node) and each push is sized so the
// pair clears along the separation vector in one move, split by area so the
// smaller element travels further. When the passes stop settling, the set is
// legalized: elements are fixed largest first and each later one slides along
// the cheapest axis direction until it clears everything already fixed.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::{Graph, NodeId, Point, Size};
use super::separation;

const MAX_RESOLVE_ITERATIONS: usize = 50;
const MAX_SWEEP_PASSES: usize = 100;
const OVERLAP_MARGIN: f64 = 2.0;

/// Overlap of two padded boxes on each axis; positive on both means they collide.
fn overlap(a: Point, sa: Size, b: Point, sb: Size, padding: f64) -> (f64, f64) {
    let d = b - a;
    (
        (sa.width + sb.width) / 2.0 + padding - d.x.abs(),
        (sa.height + sb.height) / 2.0 + padding - d.y.abs(),
    )
}

/// Push overlapping boxes apart until none remain or the iteration cap is hit.
/// Returns true when the set ended overlap-free.
pub fn resolve_overlaps(
    ids: &[NodeId],
    centers: &mut [Point],
    sizes: &[Size],
    padding: f64,
    pinned: &HashSet<NodeId>,
) -> bool {
    for _ in 0..MAX_RESOLVE_ITERATIONS {
        let mut any = false;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = (ids[i], ids[j]);
                let (a_fixed, b_fixed) = (pinned.contains(&a), pinned.contains(&b));
                if a_fixed && b_fixed {
                    continue;
                }
                let (ox, oy) = overlap(centers[a.0], sizes[a.0], centers[b.0], sizes[b.0], padding);
                if ox <= 0.0 || oy <= 0.0 {
                    continue;
                }
                any = true;
                let (dir, _) = separation(centers[b.0], centers[a.0], b.0, a.0);
                let push = ox.min(oy) / 2.0 + OVERLAP_MARGIN;
                match (a_fixed, b_fixed) {
                    (true, _) => centers[b.0] += dir.scale(2.0 * push),
                    (_, true) => centers[a.0] -= dir.scale(2.0 * push),
                    _ => {
                        centers[a.0] -= dir.scale(push);
                        centers[b.0] += dir.scale(push);
                    }
                }
            }
        }
        if !any {
            return true;
        }
    }
    false
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PairKind {
    GroupGroup,
    NodeGroup,
    NodeNode,
}

/// Final sweep across all top-level elements. Always leaves the set clean;
/// returns false when the passes did not settle and legalization had to run.
pub fn sweep_overlaps(
    graph: &Graph,
    ids: &[NodeId],
    centers: &mut [Point],
    sizes: &[Size],
    padding: f64,
) -> bool {
    let kind = |a: NodeId, b: NodeId| match (graph.is_group(a), graph.is_group(b)) {
        (true, true) => PairKind::GroupGroup,
        (false, false) => PairKind::NodeNode,
        _ => PairKind::NodeGroup,
    };

    for _ in 0..MAX_SWEEP_PASSES {
        let mut moved = false;
        for category in [PairKind::GroupGroup, PairKind::NodeGroup, PairKind::NodeNode] {
            for i in 0..ids.len() {
                for j in (i + 1)..ids.len() {
                    let (a, b) = (ids[i], ids[j]);
                    if kind(a, b) != category {
                        continue;
                    }
                    moved |= separate_pair(a, b, centers, sizes, padding);
                }
            }
        }
        if !moved {
            return true;
        }
    }
    debug!(elements = ids.len(), "sweep did not settle, legalizing");
    legalize_overlaps(ids, centers, sizes, padding);
    false
}

/// Fix elements one at a time, largest first, sliding each along whichever of
/// the four axis directions moves it least until it clears every element fixed
/// before it. Terminates with no padded overlap left.
pub fn legalize_overlaps(ids: &[NodeId], centers: &mut [Point], sizes: &[Size], padding: f64) {
    let mut order: Vec<NodeId> = ids.to_vec();
    order.sort_by(|a, b| sizes[b.0].area().total_cmp(&sizes[a.0].area()));

    let directions = [
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(-1.0, 0.0),
        Point::new(0.0, -1.0),
    ];
    let mut fixed: Vec<NodeId> = Vec::with_capacity(order.len());
    for v in order {
        let start = centers[v.0];
        let mut best = start;
        let mut best_cost = f64::INFINITY;
        for dir in directions {
            let candidate = slide(start, sizes[v.0], dir, &fixed, centers, sizes, padding);
            let cost = (candidate - start).length();
            if cost < best_cost {
                best = candidate;
                best_cost = cost;
            }
            if cost == 0.0 {
                break;
            }
        }
        centers[v.0] = best;
        fixed.push(v);
    }
}

/// Slide a box from `from` along the unit axis `dir` until it clears `fixed`.
/// Each jump lands past the furthest box it still hits, and positions only
/// advance, so a cleared box is never hit again.
fn slide(
    from: Point,
    size: Size,
    dir: Point,
    fixed: &[NodeId],
    centers: &[Point],
    sizes: &[Size],
    padding: f64,
) -> Point {
    let mut at = from;
    for _ in 0..=fixed.len() {
        let mut reach: Option<Point> = None;
        for &f in fixed {
            let (c, s) = (centers[f.0], sizes[f.0]);
            let (ox, oy) = overlap(at, size, c, s, padding);
            if ox <= 0.0 || oy <= 0.0 {
                continue;
            }
            let target = Point::new(
                if dir.x == 0.0 { at.x } else { c.x + dir.x * ((size.width + s.width) / 2.0 + padding + OVERLAP_MARGIN) },
                if dir.y == 0.0 { at.y } else { c.y + dir.y * ((size.height + s.height) / 2.0 + padding + OVERLAP_MARGIN) },
            );
            let further = match reach {
                Some(r) => (target.x - r.x) * dir.x + (target.y - r.y) * dir.y > 0.0,
                None => true,
            };
            if further {
                reach = Some(target);
            }
        }
        match reach {
            Some(r) => at = r,
            None => break,
        }
    }
    at
}

/// Move `a` and `b` apart along their separation vector just far enough that the
/// padded boxes clear on one axis.
fn separate_pair(a: NodeId, b: NodeId, centers: &mut [Point], sizes: &[Size], padding: f64) -> bool {
    let (sa, sb) = (sizes[a.0], sizes[b.0]);
    let (ox, oy) = overlap(centers[a.0], sa, centers[b.0], sb, padding);
    if ox <= 0.0 || oy <= 0.0 {
        return false;
    }
    let (dir, _) = separation(centers[b.0], centers[a.0], b.0, a.0);
    let along_x = if dir.x.abs() > 1e-9 { ox / dir.x.abs() } else { f64::INFINITY };
    let along_y = if dir.y.abs() > 1e-9 { oy / dir.y.abs() } else { f64::INFINITY };
    let distance = along_x.min(along_y) + OVERLAP_MARGIN;

    // Smaller element travels further.
    let (area_a, area_b) = (sa.area().max(1.0), sb.area().max(1.0));
    let share_a = area_b / (area_a + area_b);
    centers[a.0] -= dir.scale(distance * share_a);
    centers[b.0] += dir.scale(distance * (1.0 - share_a));
    true
}

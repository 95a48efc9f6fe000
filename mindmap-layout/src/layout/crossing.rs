// Greedy crossing reduction.
//
// Each pass evaluates swapping the positions of pairs of swappable nodes and
// applies the single best swap that strictly lowers the crossing count. Only
// edges incident to the swapped pair can change, so the delta is computed from
// those edges alone. A swap can only help if one of the pair sits on an edge
// that crosses something, so pairs are drawn from those nodes first (most
// crossed first) and capped per pass. This is a local search: it never
// increases the count but gives no minimality guarantee.

use crate::graph::{NodeId, Point};

const MAX_PASSES: usize = 20;
/// Swap evaluations allowed in one pass.
const MAX_PAIRS_PER_PASS: usize = 2000;
/// Intersections this close to a segment end count as touching, not crossing.
const ENDPOINT_EPSILON: f64 = 0.01;

/// Proper intersection of segments p1-p2 and q1-q2.
pub fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-12 {
        return false;
    }
    let qp = q1 - p1;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    let inside = |v: f64| v > ENDPOINT_EPSILON && v < 1.0 - ENDPOINT_EPSILON;
    inside(t) && inside(u)
}

fn edges_cross(e: (NodeId, NodeId), f: (NodeId, NodeId), centers: &[Point]) -> bool {
    if e.0 == f.0 || e.0 == f.1 || e.1 == f.0 || e.1 == f.1 {
        return false;
    }
    segments_cross(centers[e.0.0], centers[e.1.0], centers[f.0.0], centers[f.1.0])
}

pub fn count_crossings(edges: &[(NodeId, NodeId)], centers: &[Point]) -> usize {
    let mut count = 0;
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            if edges_cross(edges[i], edges[j], centers) {
                count += 1;
            }
        }
    }
    count
}

/// Number of crossings each edge takes part in.
fn crossings_per_edge(edges: &[(NodeId, NodeId)], centers: &[Point]) -> Vec<usize> {
    let mut per_edge = vec![0; edges.len()];
    for i in 0..edges.len() {
        for j in (i + 1)..edges.len() {
            if edges_cross(edges[i], edges[j], centers) {
                per_edge[i] += 1;
                per_edge[j] += 1;
            }
        }
    }
    per_edge
}

/// Crossings in which at least one of the `touched` edges takes part.
/// `marked[j]` is set exactly for the touched edges.
fn crossings_touching(touched: &[usize], marked: &[bool], edges: &[(NodeId, NodeId)], centers: &[Point]) -> usize {
    let mut count = 0;
    for &i in touched {
        for (j, &f) in edges.iter().enumerate() {
            // Pairs of touched edges are visited twice; count them once.
            if j == i || (marked[j] && j < i) {
                continue;
            }
            if edges_cross(edges[i], f, centers) {
                count += 1;
            }
        }
    }
    count
}

/// Swap node positions to reduce edge crossings. Candidates not incident to any
/// edge are ignored. Returns the number of swaps applied.
pub fn reduce_crossings(candidates: &[NodeId], edges: &[(NodeId, NodeId)], centers: &mut [Point]) -> usize {
    search(candidates, edges, centers).swaps
}

#[derive(Debug, Default, Clone, Copy)]
struct SearchStats {
    swaps: usize,
    evaluated: usize,
}

fn search(candidates: &[NodeId], edges: &[(NodeId, NodeId)], centers: &mut [Point]) -> SearchStats {
    let mut stats = SearchStats::default();
    if edges.len() < 2 {
        return stats;
    }

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); centers.len()];
    for (i, &(a, b)) in edges.iter().enumerate() {
        incident[a.0].push(i);
        incident[b.0].push(i);
    }
    let swappable: Vec<NodeId> = candidates
        .iter()
        .copied()
        .filter(|nid| !incident[nid.0].is_empty())
        .collect();

    let mut marked = vec![false; edges.len()];
    let mut touched: Vec<usize> = Vec::new();
    let mut hot_rank = vec![usize::MAX; centers.len()];

    for _pass in 0..MAX_PASSES {
        let per_edge = crossings_per_edge(edges, centers);
        let heat = |nid: NodeId| incident[nid.0].iter().map(|&e| per_edge[e]).sum::<usize>();
        let mut hot: Vec<NodeId> = swappable.iter().copied().filter(|&nid| heat(nid) > 0).collect();
        if hot.is_empty() {
            break;
        }
        hot.sort_by(|a, b| heat(*b).cmp(&heat(*a)));
        hot_rank.fill(usize::MAX);
        for (rank, nid) in hot.iter().enumerate() {
            hot_rank[nid.0] = rank;
        }

        let mut best: Option<(i64, NodeId, NodeId)> = None;
        let mut evaluated = 0;
        'pairs: for &u in &hot {
            for &v in &swappable {
                // Hot pairs are evaluated once, from the hotter side.
                if v == u || hot_rank[v.0] < hot_rank[u.0] {
                    continue;
                }
                if evaluated == MAX_PAIRS_PER_PASS {
                    break 'pairs;
                }
                evaluated += 1;

                touched.clear();
                for &e in incident[u.0].iter().chain(&incident[v.0]) {
                    if !marked[e] {
                        marked[e] = true;
                        touched.push(e);
                    }
                }
                let before = crossings_touching(&touched, &marked, edges, centers) as i64;
                centers.swap(u.0, v.0);
                let after = crossings_touching(&touched, &marked, edges, centers) as i64;
                centers.swap(u.0, v.0);
                for &e in &touched {
                    marked[e] = false;
                }

                let gain = before - after;
                if gain > 0 && best.is_none_or(|(g, _, _)| gain > g) {
                    best = Some((gain, u, v));
                }
            }
        }
        stats.evaluated += evaluated;

        match best {
            Some((_, u, v)) => {
                centers.swap(u.0, v.0);
                stats.swaps += 1;
            }
            None => break,
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_cross() {
        let p = |x, y| Point::new(x, y);
        assert!(segments_cross(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0)));
        assert!(!segments_cross(p(0.0, 0.0), p(10.0, 0.0), p(0.0, 5.0), p(10.0, 5.0)));
        // Touching at an endpoint is not a crossing.
        assert!(!segments_cross(p(0.0, 0.0), p(10.0, 0.0), p(10.0, 0.0), p(10.0, 10.0)));
    }

    #[test]
    fn test_shared_endpoint_never_counts() {
        let centers = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(10.0, -10.0)];
        let edges = [(NodeId(0), NodeId(1)), (NodeId(0), NodeId(2))];
        assert_eq!(count_crossings(&edges, &centers), 0);
    }

    #[test]
    fn test_swap_untangles_bowtie() {
        // 0-1 and 2-3 cross as drawn; swapping 1 and 3 removes the crossing.
        let mut centers = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 0.0),
        ];
        let edges = [(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))];
        let ids = [NodeId(0), NodeId(1), NodeId(2), NodeId(3)];
        assert_eq!(count_crossings(&edges, &centers), 1);

        let swaps = reduce_crossings(&ids, &edges, &mut centers);
        assert!(swaps >= 1);
        assert_eq!(count_crossings(&edges, &centers), 0);
    }

    #[test]
    fn test_never_increases_crossings() {
        let mut centers: Vec<Point> = (0..8)
            .map(|i| {
                let a = i as f64 * 2.3;
                Point::new(a.cos() * 200.0, a.sin() * 150.0)
            })
            .collect();
        let edges: Vec<(NodeId, NodeId)> = vec![
            (NodeId(0), NodeId(4)),
            (NodeId(1), NodeId(5)),
            (NodeId(2), NodeId(6)),
            (NodeId(3), NodeId(7)),
            (NodeId(0), NodeId(2)),
            (NodeId(5), NodeId(7)),
        ];
        let ids: Vec<NodeId> = (0..8).map(NodeId).collect();
        let before = count_crossings(&edges, &centers);
        reduce_crossings(&ids, &edges, &mut centers);
        assert!(count_crossings(&edges, &centers) <= before);
    }

    #[test]
    fn test_isolated_candidates_stay_put() {
        let mut centers = vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 0.0),
            Point::new(500.0, 500.0),
        ];
        let edges = [(NodeId(0), NodeId(1)), (NodeId(2), NodeId(3))];
        let ids: Vec<NodeId> = (0..5).map(NodeId).collect();
        reduce_crossings(&ids, &edges, &mut centers);
        assert_eq!(centers[4], Point::new(500.0, 500.0));
    }

    /// Deterministic scatter with a spanning tree plus chords.
    fn tangled(n: usize) -> (Vec<Point>, Vec<(NodeId, NodeId)>) {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) as usize
        };
        let centers: Vec<Point> = (0..n)
            .map(|_| Point::new((next() % 4000) as f64, (next() % 3000) as f64))
            .collect();
        let mut edges: Vec<(NodeId, NodeId)> = (1..n).map(|i| (NodeId(next() % i), NodeId(i))).collect();
        for _ in 0..n / 10 {
            let (a, b) = (next() % n, next() % n);
            if a != b {
                edges.push((NodeId(a), NodeId(b)));
            }
        }
        (centers, edges)
    }

    #[test]
    fn test_large_tangle_is_bounded_and_never_worse() {
        let (mut centers, edges) = tangled(300);
        let ids: Vec<NodeId> = (0..300).map(NodeId).collect();
        let before = count_crossings(&edges, &centers);
        assert!(before > 0);

        let stats = search(&ids, &edges, &mut centers);
        assert!(stats.evaluated <= MAX_PASSES * MAX_PAIRS_PER_PASS);
        assert!(stats.swaps <= MAX_PASSES);
        assert!(count_crossings(&edges, &centers) <= before);
    }

    #[test]
    fn test_crossing_free_input_evaluates_nothing() {
        // A path along a line never crosses itself.
        let mut centers: Vec<Point> = (0..50).map(|i| Point::new(i as f64 * 100.0, 0.0)).collect();
        let edges: Vec<(NodeId, NodeId)> = (1..50).map(|i| (NodeId(i - 1), NodeId(i))).collect();
        let ids: Vec<NodeId> = (0..50).map(NodeId).collect();

        let stats = search(&ids, &edges, &mut centers);
        assert_eq!(stats.evaluated, 0);
        assert_eq!(stats.swaps, 0);
    }
}

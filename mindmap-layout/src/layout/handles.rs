// Edge handle assignment: each edge attaches at the pair of side midpoints that
// are closest together.

use std::collections::BTreeMap;

use crate::graph::{Graph, Handle, Point};
use super::{EdgeHandles, Rect};

pub fn attachment_point(rect: &Rect, handle: Handle) -> Point {
    let c = rect.center();
    match handle {
        Handle::Top => Point::new(c.x, rect.y),
        Handle::Bottom => Point::new(c.x, rect.bottom()),
        Handle::Left => Point::new(rect.x, c.y),
        Handle::Right => Point::new(rect.right(), c.y),
    }
}

/// Closest of the 16 side combinations. Ties keep the earliest pair in
/// `Handle::ALL` order.
pub fn shortest_handles(source: &Rect, target: &Rect) -> (Handle, Handle) {
    let mut best = (Handle::Top, Handle::Top);
    let mut best_dist = f64::INFINITY;
    for s in Handle::ALL {
        for t in Handle::ALL {
            let d = (attachment_point(target, t) - attachment_point(source, s)).length();
            if d < best_dist {
                best_dist = d;
                best = (s, t);
            }
        }
    }
    best
}

/// Handles for every edge of the graph, given absolute rectangles per NodeId.
pub fn assign_handles(graph: &Graph, rects: &[Rect]) -> BTreeMap<String, EdgeHandles> {
    graph
        .edges
        .iter()
        .map(|e| {
            let (source_handle, target_handle) = shortest_handles(&rects[e.from.0], &rects[e.to.0]);
            (e.id.clone(), EdgeHandles { source_handle, target_handle })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(a: &Rect, ha: Handle, b: &Rect, hb: Handle) -> f64 {
        (attachment_point(b, hb) - attachment_point(a, ha)).length()
    }

    #[test]
    fn test_side_by_side_uses_facing_sides() {
        let a = Rect::new(0.0, 0.0, 180.0, 50.0);
        let b = Rect::new(300.0, 0.0, 180.0, 50.0);
        assert_eq!(shortest_handles(&a, &b), (Handle::Right, Handle::Left));
        assert_eq!(shortest_handles(&b, &a), (Handle::Left, Handle::Right));
    }

    #[test]
    fn test_stacked_uses_top_and_bottom() {
        let a = Rect::new(0.0, 0.0, 180.0, 50.0);
        let b = Rect::new(0.0, 200.0, 180.0, 50.0);
        assert_eq!(shortest_handles(&a, &b), (Handle::Bottom, Handle::Top));
    }

    #[test]
    fn test_choice_is_minimal_over_all_pairs() {
        let cases = [
            (Rect::new(0.0, 0.0, 180.0, 50.0), Rect::new(120.0, 90.0, 180.0, 50.0)),
            (Rect::new(-400.0, 30.0, 320.0, 200.0), Rect::new(10.0, -300.0, 60.0, 40.0)),
            (Rect::new(5.0, 5.0, 10.0, 10.0), Rect::new(5.0, 5.0, 10.0, 10.0)),
        ];
        for (a, b) in cases {
            let (s, t) = shortest_handles(&a, &b);
            let chosen = distance(&a, s, &b, t);
            for hs in Handle::ALL {
                for ht in Handle::ALL {
                    assert!(chosen <= distance(&a, hs, &b, ht) + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_tie_keeps_first_pair() {
        // Identical rects: every same-side pair has distance 0, top/top comes first.
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(shortest_handles(&a, &a), (Handle::Top, Handle::Top));
    }
}

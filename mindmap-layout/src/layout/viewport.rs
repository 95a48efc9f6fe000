// Viewport fitting for the top-level arrangement.

use tracing::debug;

use crate::graph::{Graph, NodeId, Point, Size};
use super::overlap::sweep_overlaps;
use super::{bounding_box, Rect};

/// Mismatch ratios inside this band are left alone.
const ASPECT_TOLERANCE: (f64, f64) = (0.83, 1.2);
/// Fraction of the full correction actually applied.
const CORRECTION_BLEND: f64 = 0.7;

/// Scale factors (x, y) that move the arrangement's aspect toward the viewport's.
pub fn aspect_scale(bounds: Size, viewport: Size) -> (f64, f64) {
    if bounds.width <= 0.0 || bounds.height <= 0.0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return (1.0, 1.0);
    }
    let mismatch = (bounds.width / bounds.height) / (viewport.width / viewport.height);
    if mismatch > ASPECT_TOLERANCE.1 {
        (1.0 + CORRECTION_BLEND * (1.0 / mismatch - 1.0), 1.0)
    } else if mismatch < ASPECT_TOLERANCE.0 {
        (1.0, 1.0 + CORRECTION_BLEND * (mismatch - 1.0))
    } else {
        (1.0, 1.0)
    }
}

/// Squash the arrangement along its overlong axis about the area-weighted
/// centroid, then sweep the overlaps that creates. The sweep legalizes when it
/// cannot settle, so the result is overlap-free either way. Returns true if it
/// scaled.
pub fn correct_aspect(
    graph: &Graph,
    ids: &[NodeId],
    centers: &mut [Point],
    sizes: &[Size],
    viewport: Size,
    padding: f64,
) -> bool {
    let Some(bb) = bounding_box(ids.iter().map(|v| Rect::from_center(centers[v.0], sizes[v.0]))) else {
        return false;
    };
    let (sx, sy) = aspect_scale(Size::new(bb.w, bb.h), viewport);
    if sx == 1.0 && sy == 1.0 {
        return false;
    }

    let total: f64 = ids.iter().map(|v| sizes[v.0].area()).sum();
    let centroid = if total > 0.0 {
        ids.iter()
            .fold(Point::ZERO, |acc, v| acc + centers[v.0].scale(sizes[v.0].area()))
            .scale(1.0 / total)
    } else {
        bb.center()
    };
    for v in ids {
        let d = centers[v.0] - centroid;
        centers[v.0] = centroid + Point::new(d.x * sx, d.y * sy);
    }
    let settled = sweep_overlaps(graph, ids, centers, sizes, padding);
    debug!(sx, sy, settled, "aspect corrected");
    true
}

/// Uniform shift so no element has a negative top-left coordinate.
pub fn clamp_non_negative(ids: &[NodeId], centers: &mut [Point], sizes: &[Size]) {
    let Some(bb) = bounding_box(ids.iter().map(|v| Rect::from_center(centers[v.0], sizes[v.0]))) else {
        return;
    };
    let delta = Point::new((-bb.x).max(0.0), (-bb.y).max(0.0));
    for v in ids {
        centers[v.0] += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{compile, NodeInput, Scope, Unmeasured};

    #[test]
    fn test_aspect_scale_band() {
        let vp = Size::new(1600.0, 900.0);
        assert_eq!(aspect_scale(Size::new(1600.0, 900.0), vp), (1.0, 1.0));
        // Four times too wide: x shrinks, y untouched.
        let (sx, sy) = aspect_scale(Size::new(6400.0, 900.0), vp);
        assert!((sx - (1.0 + 0.7 * (0.25 - 1.0))).abs() < 1e-12);
        assert_eq!(sy, 1.0);
        // Too tall: y shrinks.
        let (sx, sy) = aspect_scale(Size::new(800.0, 1800.0), vp);
        assert_eq!(sx, 1.0);
        assert!(sy < 1.0);
    }

    #[test]
    fn test_wide_row_is_narrowed_without_overlap() {
        let nodes: Vec<NodeInput> = (0..6).map(|i| NodeInput::plain(&format!("n{i}"))).collect();
        let graph = compile(&nodes, &[], &Scope::All, &Unmeasured, Size::new(180.0, 50.0), Size::new(320.0, 200.0));
        let ids: Vec<NodeId> = graph.nodes.iter().map(|n| n.nid).collect();
        let sizes = vec![Size::new(180.0, 50.0); 6];
        let mut centers: Vec<Point> = (0..6).map(|i| Point::new(i as f64 * 600.0, 0.0)).collect();
        let before = bounding_box(ids.iter().map(|v| Rect::from_center(centers[v.0], sizes[v.0]))).unwrap();

        assert!(correct_aspect(&graph, &ids, &mut centers, &sizes, Size::new(1600.0, 900.0), 40.0));
        let after = bounding_box(ids.iter().map(|v| Rect::from_center(centers[v.0], sizes[v.0]))).unwrap();
        assert!(after.w / after.h < before.w / before.h);
        for i in 0..6 {
            for j in (i + 1)..6 {
                let a = Rect::from_center(centers[i], sizes[i]).inflate(20.0);
                let b = Rect::from_center(centers[j], sizes[j]).inflate(20.0);
                assert!(!a.overlaps(&b));
            }
        }
    }

    #[test]
    fn test_tall_stack_with_groups_is_narrowed_without_overlap() {
        // Tall columns of mixed groups and nodes squashed into a landscape box.
        let nodes: Vec<NodeInput> = (0..30)
            .map(|i| if i % 3 == 0 { NodeInput::group(&format!("g{i}")) } else { NodeInput::plain(&format!("n{i}")) })
            .collect();
        let graph = compile(&nodes, &[], &Scope::All, &Unmeasured, Size::new(180.0, 50.0), Size::new(320.0, 200.0));
        let ids: Vec<NodeId> = graph.nodes.iter().map(|n| n.nid).collect();
        let sizes: Vec<Size> = graph.nodes.iter().map(|n| n.size).collect();
        let mut centers: Vec<Point> = (0..30)
            .map(|i| Point::new((i % 2) as f64 * 420.0, (i / 2) as f64 * 260.0))
            .collect();

        assert!(correct_aspect(&graph, &ids, &mut centers, &sizes, Size::new(1600.0, 900.0), 40.0));
        for i in 0..30 {
            for j in (i + 1)..30 {
                let a = Rect::from_center(centers[i], sizes[i]).inflate(19.9);
                let b = Rect::from_center(centers[j], sizes[j]).inflate(19.9);
                assert!(!a.overlaps(&b), "{i} overlaps {j}");
            }
        }
    }

    #[test]
    fn test_clamp_moves_into_positive_quadrant() {
        let ids = [NodeId(0), NodeId(1)];
        let sizes = vec![Size::new(100.0, 40.0); 2];
        let mut centers = vec![Point::new(-30.0, 10.0), Point::new(200.0, -50.0)];
        clamp_non_negative(&ids, &mut centers, &sizes);
        let bb = bounding_box(ids.iter().map(|v| Rect::from_center(centers[v.0], sizes[v.0]))).unwrap();
        assert_eq!(bb.x, 0.0);
        assert_eq!(bb.y, 0.0);
    }
}

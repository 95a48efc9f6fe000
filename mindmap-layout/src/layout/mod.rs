// Mind-map auto-layout.
//
// Two paths:
// - radial (default): group-internal layouts, then a force-directed top-level pass
//   over contracted groups, cleaned up by crossing reduction, overlap resolution,
//   component arrangement and viewport aspect correction
// - tree (horizontal/vertical): subtree-span tree drawing
//
// Both paths produce a Placement (top-left per node: absolute for top-level
// elements, group-local for members). Handles and colors are derived from it.
//
// Submodules:
// - adjacency: dedup'd undirected adjacency, virtual graph, components
// - radial_placement: hub selection + BFS radial seeding
// - force_placement: shared force simulation core
// - crossing: greedy swap-based crossing reduction
// - overlap: AABB overlap resolution and the final multi-pass sweep
// - spatial_grid: overlap queries for orphan placement
// - arrange: per-component arrangement, tiling, orphans
// - group_layout: mini-layout inside a group
// - viewport: aspect correction
// - handles, colors: result annotations
//
// Deterministic: no randomness, no time budgets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{
    EdgeInput, Graph, Handle, LayoutMode, LayoutOptions, NodeId, NodeInput, Point, Scope, Size,
    SizeLookup, compile,
};

mod adjacency;
mod arrange;
mod colors;
mod crossing;
mod force_placement;
mod group_layout;
mod handles;
mod overlap;
mod radial_placement;
mod spatial_grid;
mod viewport;
pub mod algorithms;

pub use colors::{assign_colors, color_for, hub_scores, DEFAULT_GROUP_COLOR, DEFAULT_NODE_COLOR};
pub use crossing::{count_crossings, reduce_crossings};
pub use force_placement::{SimConfig, SimOverrides};
pub use handles::{assign_handles, shortest_handles};

use algorithms::{RadialLayout, TreeAxis, TreeLayout};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(c: Point, size: Size) -> Self {
        Self {
            x: c.x - size.width / 2.0,
            y: c.y - size.height / 2.0,
            w: size.width,
            h: size.height,
        }
    }

    pub fn right(&self) -> f64 { self.x + self.w }
    pub fn bottom(&self) -> f64 { self.y + self.h }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect { x: x0, y: y0, w: x1 - x0, h: y1 - y0 }
    }

    /// Grow by `pad` on every side.
    pub fn inflate(&self, pad: f64) -> Rect {
        Rect { x: self.x - pad, y: self.y - pad, w: self.w + 2.0 * pad, h: self.h + 2.0 * pad }
    }
}

/// Bounding box of a set of rectangles, `None` when empty.
pub fn bounding_box(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

/// Unit vector from `b` towards `a` and the distance between them. Coincident
/// points get a direction derived from the index pair so results stay reproducible.
pub(crate) fn separation(a: Point, b: Point, ia: usize, ib: usize) -> (Point, f64) {
    let d = a - b;
    let dist = d.length();
    if dist < 1e-6 {
        (fallback_direction(ia, ib), 0.0)
    } else {
        (d.scale(1.0 / dist), dist)
    }
}

/// Fixed unit vector keyed by index ordering; antisymmetric in its arguments.
pub(crate) fn fallback_direction(a: usize, b: usize) -> Point {
    let (lo, hi, sign) = if a <= b { (a, b, 1.0) } else { (b, a, -1.0) };
    let deg = ((lo * 37 + hi * 61 + 13) % 360) as f64;
    let rad = deg.to_radians();
    Point::new(rad.cos() * sign, rad.sin() * sign)
}

/// Direction in which rows of groups and tiles of components run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Landscape viewport: left-to-right, bridges above.
    Row,
    /// Portrait viewport: top-to-bottom, bridges to the left.
    Column,
}

impl Flow {
    pub fn for_viewport(viewport: Size) -> Self {
        if viewport.width >= viewport.height { Flow::Row } else { Flow::Column }
    }

    pub fn main(&self, p: Point) -> f64 {
        match self { Flow::Row => p.x, Flow::Column => p.y }
    }

    pub fn cross(&self, p: Point) -> f64 {
        match self { Flow::Row => p.y, Flow::Column => p.x }
    }

    pub fn point(&self, main: f64, cross: f64) -> Point {
        match self {
            Flow::Row => Point::new(main, cross),
            Flow::Column => Point::new(cross, main),
        }
    }

    pub fn main_len(&self, s: Size) -> f64 {
        match self { Flow::Row => s.width, Flow::Column => s.height }
    }

    pub fn cross_len(&self, s: Size) -> f64 {
        match self { Flow::Row => s.height, Flow::Column => s.width }
    }
}

/// Every geometric constant of the engine. Requests may override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Footprint for nodes the caller could not measure.
    pub default_node_size: Size,
    /// Box for empty groups without a persisted size.
    pub default_group_size: Size,
    /// Smallest box a laid-out group may shrink to.
    pub min_group_size: Size,
    /// Padding inside groups.
    pub group_padding: f64,
    /// Label band at the top of a group.
    pub group_header: f64,
    /// Minimum clearance between top-level elements.
    pub element_gap: f64,
    /// Gap between groups in a component row.
    pub group_gap: f64,
    /// Distance between the group row and its bridge nodes.
    pub bridge_offset: f64,
    /// Gap between tiled components.
    pub component_gap: f64,
    /// Tree mode: gap between sibling subtrees.
    pub sibling_spacing: f64,
    /// Tree mode: gap between depth levels.
    pub level_gap: f64,
    /// Tree mode: gap between separate trees.
    pub root_gap: f64,
    pub default_viewport: Size,
    /// Partial overrides keep the remaining top-level preset values.
    #[serde(deserialize_with = "force_placement::top_level_overrides")]
    pub top_level: SimConfig,
    /// Partial overrides keep the remaining group preset values.
    #[serde(deserialize_with = "force_placement::group_overrides")]
    pub group: SimConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_node_size: Size::new(180.0, 50.0),
            default_group_size: Size::new(320.0, 200.0),
            min_group_size: Size::new(220.0, 120.0),
            group_padding: 24.0,
            group_header: 40.0,
            element_gap: 40.0,
            group_gap: 80.0,
            bridge_offset: 100.0,
            component_gap: 160.0,
            sibling_spacing: 30.0,
            level_gap: 100.0,
            root_gap: 60.0,
            default_viewport: Size::new(1600.0, 900.0),
            top_level: SimConfig::top_level(),
            group: SimConfig::group(),
        }
    }
}

/// Working result of a layout strategy, indexed by NodeId.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Top-left; absolute for top-level elements, group-local for members.
    pub pos: Vec<Point>,
    /// Final footprint; groups get their computed box.
    pub size: Vec<Size>,
}

impl Placement {
    /// Start from the graph's sizes with every node at the origin.
    pub fn new(graph: &Graph) -> Self {
        Self {
            pos: vec![Point::ZERO; graph.len()],
            size: graph.nodes.iter().map(|n| n.size).collect(),
        }
    }

    /// The placement the canvas currently shows.
    pub fn current(graph: &Graph) -> Self {
        Self {
            pos: graph.nodes.iter().map(|n| n.position).collect(),
            size: graph.nodes.iter().map(|n| n.size).collect(),
        }
    }

    /// Rectangle in canvas coordinates (members are lifted out of their group frame).
    pub fn absolute_rect(&self, graph: &Graph, nid: NodeId) -> Rect {
        let mut p = self.pos[nid.0];
        if let Some(g) = graph.node(nid).group {
            p += self.pos[g.0];
        }
        let s = self.size[nid.0];
        Rect::new(p.x, p.y, s.width, s.height)
    }

    pub fn absolute_rects(&self, graph: &Graph) -> Vec<Rect> {
        graph.nodes.iter().map(|n| self.absolute_rect(graph, n.nid)).collect()
    }

    fn translate_top_level(&mut self, graph: &Graph, delta: Point) {
        for nid in graph.top_level() {
            self.pos[nid.0] += delta;
        }
    }
}

/// A layout algorithm over a compiled graph.
pub trait LayoutStrategy {
    fn layout(&self, graph: &Graph, viewport: Size, cfg: &LayoutConfig) -> Placement;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeHandles {
    pub source_handle: Handle,
    pub target_handle: Handle,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// Top-left per node; group-local for members.
    pub positions: BTreeMap<String, Point>,
    pub group_sizes: BTreeMap<String, Size>,
    pub handles: BTreeMap<String, EdgeHandles>,
    pub colors: BTreeMap<String, String>,
}

/// Lay out a mind-map snapshot.
pub fn layout_mind_map(
    nodes: &[NodeInput],
    edges: &[EdgeInput],
    options: &LayoutOptions,
    sizes: &dyn SizeLookup,
    cfg: &LayoutConfig,
) -> LayoutResult {
    let graph = compile(
        nodes,
        edges,
        &options.scope,
        sizes,
        cfg.default_node_size,
        cfg.default_group_size,
    );
    if graph.is_empty() {
        return LayoutResult::default();
    }

    let viewport = options.viewport.unwrap_or(cfg.default_viewport);
    let strategy: &dyn LayoutStrategy = match options.mode {
        LayoutMode::Radial => &RadialLayout,
        LayoutMode::Horizontal => &TreeLayout { axis: TreeAxis::Horizontal },
        LayoutMode::Vertical => &TreeLayout { axis: TreeAxis::Vertical },
    };
    let mut placement = strategy.layout(&graph, viewport, cfg);

    if matches!(options.scope, Scope::Selection(_)) {
        anchor_to_selection(&graph, &mut placement);
    }

    debug!(nodes = graph.len(), edges = graph.edges.len(), mode = ?options.mode, "layout complete");

    let colors = match options.mode {
        LayoutMode::Radial => assign_colors(&graph),
        LayoutMode::Horizontal | LayoutMode::Vertical => BTreeMap::new(),
    };
    build_result(&graph, &placement, colors)
}

/// Recompute handles for the positions the canvas currently shows.
pub fn reassign_handles(
    nodes: &[NodeInput],
    edges: &[EdgeInput],
    sizes: &dyn SizeLookup,
    cfg: &LayoutConfig,
) -> BTreeMap<String, EdgeHandles> {
    let graph = compile(
        nodes,
        edges,
        &Scope::All,
        sizes,
        cfg.default_node_size,
        cfg.default_group_size,
    );
    let rects = Placement::current(&graph).absolute_rects(&graph);
    assign_handles(&graph, &rects)
}

/// Keep an arranged selection where it was: its top-level bounding box keeps its
/// top-left corner.
fn anchor_to_selection(graph: &Graph, placement: &mut Placement) {
    let top = graph.top_level();
    let before = bounding_box(top.iter().map(|&nid| {
        let n = graph.node(nid);
        Rect::new(n.position.x, n.position.y, n.size.width, n.size.height)
    }));
    let after = bounding_box(top.iter().map(|&nid| placement.absolute_rect(graph, nid)));
    if let (Some(before), Some(after)) = (before, after) {
        placement.translate_top_level(graph, Point::new(before.x - after.x, before.y - after.y));
    }
}

fn build_result(graph: &Graph, placement: &Placement, colors: BTreeMap<String, String>) -> LayoutResult {
    let positions = graph
        .nodes
        .iter()
        .map(|n| (n.id.clone(), placement.pos[n.nid.0]))
        .collect();
    let group_sizes = graph
        .groups()
        .map(|g| (g.id.clone(), placement.size[g.nid.0]))
        .collect();
    let rects = placement.absolute_rects(graph);
    LayoutResult {
        positions,
        group_sizes,
        handles: assign_handles(graph, &rects),
        colors,
    }
}

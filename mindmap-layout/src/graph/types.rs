use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, k: f64) -> Point {
        Point { x: self.x * k, y: self.y * k }
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// What a node is on the canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Plain,
    Group,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Tree,
    Crosslink,
}

/// Side of a node an edge attaches to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Top,
    Bottom,
    Left,
    Right,
}

impl Handle {
    /// Enumeration order, also the tie-break order for handle assignment.
    pub const ALL: [Handle; 4] = [Handle::Top, Handle::Bottom, Handle::Left, Handle::Right];
}

/// A node as the canvas knows it.
///
/// Plain nodes may hang off a tree parent and sit inside a group. Groups carry
/// their persisted box size. `position` is the current top-left corner, local to
/// the containing group for members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub tree_parent_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl NodeInput {
    pub fn plain(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: NodeKind::Plain,
            position: Point::ZERO,
            tree_parent_id: None,
            group_id: None,
            width: None,
            height: None,
        }
    }

    pub fn group(id: &str) -> Self {
        Self { kind: NodeKind::Group, ..Self::plain(id) }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.tree_parent_id = Some(parent.to_string());
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group_id = Some(group.to_string());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Persisted size, only present for groups or explicitly sized nodes.
    pub fn own_size(&self) -> Option<Size> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Size::new(w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeInput {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub source_handle: Option<Handle>,
    #[serde(default)]
    pub target_handle: Option<Handle>,
}

impl EdgeInput {
    pub fn new(id: &str, source: &str, target: &str, kind: EdgeKind) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            source_handle: None,
            target_handle: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Horizontal,
    Vertical,
    #[default]
    Radial,
}

/// Which part of the graph gets arranged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "ids", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Selection(Vec<String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    #[serde(default)]
    pub mode: LayoutMode,
    #[serde(default)]
    pub scope: Scope,
    /// Target viewport; the configured default is used when absent.
    #[serde(default)]
    pub viewport: Option<Size>,
}

/// Rendered footprint of a node, measured by the caller.
pub trait SizeLookup {
    fn size_of(&self, id: &str) -> Option<Size>;
}

impl SizeLookup for HashMap<String, Size> {
    fn size_of(&self, id: &str) -> Option<Size> {
        self.get(id).copied()
    }
}

impl SizeLookup for BTreeMap<String, Size> {
    fn size_of(&self, id: &str) -> Option<Size> {
        self.get(id).copied()
    }
}

/// Lookup that never measures anything; every node falls back to its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmeasured;

impl SizeLookup for Unmeasured {
    fn size_of(&self, _id: &str) -> Option<Size> {
        None
    }
}

//! Auto-layout engine for mind maps.
//!
//! Takes a snapshot of a mind-map canvas (nodes, groups, tree links and
//! crosslinks) and computes node positions, group boxes, edge handles and
//! hub-rank colors. Runs natively or in the browser through wasm-bindgen.

pub mod error;
pub mod graph;
pub mod layout;
pub mod output;
pub mod wasm;

pub use error::{Error, Result};
pub use graph::{
    EdgeInput, EdgeKind, Handle, LayoutMode, LayoutOptions, NodeInput, NodeKind, Point, Scope, Size,
    SizeLookup, Unmeasured,
};
pub use layout::{
    layout_mind_map, reassign_handles, EdgeHandles, LayoutConfig, LayoutResult, SimConfig, SimOverrides,
};
pub use output::{ErrorInfo, LayoutOutput, LayoutRequest};
pub use wasm::{run_assign_edge_handles, run_auto_layout};

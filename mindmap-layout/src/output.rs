//! Wire types exchanged with the canvas front-end.
//!
//! Requests are decoded from JSON, results are encoded back to JSON with
//! camelCase keys.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::graph::{EdgeInput, LayoutOptions, NodeInput, Point, Size};
use crate::layout::{EdgeHandles, LayoutConfig, LayoutResult};

/// Everything one layout call needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub nodes: Vec<NodeInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
    #[serde(default)]
    pub options: LayoutOptions,
    /// Rendered sizes measured by the canvas, by node id.
    #[serde(default)]
    pub sizes: HashMap<String, Size>,
    /// Partial overrides of the engine constants.
    #[serde(default)]
    pub config: Option<LayoutConfig>,
}

/// Error details for the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub line: usize,   // 1-based, 0 when not tied to the request text
    pub column: usize, // 1-based, 0 when not tied to the request text
}

impl From<&Error> for ErrorInfo {
    fn from(e: &Error) -> Self {
        match e {
            Error::InvalidRequest(inner) => ErrorInfo {
                message: e.to_string(),
                line: inner.line(),
                column: inner.column(),
            },
            Error::Encode(_) => ErrorInfo { message: e.to_string(), line: 0, column: 0 },
        }
    }
}

/// Result of `auto_layout` as sent to the canvas
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutput {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub positions: BTreeMap<String, Point>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub group_sizes: BTreeMap<String, Size>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub handles: BTreeMap<String, EdgeHandles>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl From<LayoutResult> for LayoutOutput {
    fn from(result: LayoutResult) -> Self {
        LayoutOutput {
            positions: result.positions,
            group_sizes: result.group_sizes,
            handles: result.handles,
            colors: result.colors,
            error: None,
        }
    }
}

/// Result of `assign_edge_handles`
#[derive(Debug, Clone, Default, Serialize)]
pub struct HandlesOutput {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub handles: BTreeMap<String, EdgeHandles>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

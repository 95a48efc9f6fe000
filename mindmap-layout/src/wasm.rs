//! WASM bindings for the mind-map layout engine.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here. Each
//! takes a JSON `LayoutRequest` and returns JSON; failures come back as an
//! `{"error": {...}}` payload and are logged to the browser console.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::{Error, Result};
use crate::layout::{layout_mind_map, reassign_handles};
use crate::output::{ErrorInfo, HandlesOutput, LayoutOutput, LayoutRequest};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Last resort when even the error payload cannot be encoded.
const ENCODE_FAILURE: &str = r#"{"error":{"message":"failed to encode layout output","line":0,"column":0}}"#;

fn decode(request_json: &str) -> Result<LayoutRequest> {
    serde_json::from_str(request_json).map_err(Error::InvalidRequest)
}

fn encode<T: Serialize>(output: &T) -> Result<String> {
    serde_json::to_string(output).map_err(Error::Encode)
}

/// Run a full layout. Native entry point behind `auto_layout`.
pub fn run_auto_layout(request_json: &str) -> Result<String> {
    let request = decode(request_json)?;
    let cfg = request.config.unwrap_or_default();
    let result = layout_mind_map(&request.nodes, &request.edges, &request.options, &request.sizes, &cfg);
    encode(&LayoutOutput::from(result))
}

/// Recompute handles from current positions. Native entry point behind
/// `assign_edge_handles`.
pub fn run_assign_edge_handles(request_json: &str) -> Result<String> {
    let request = decode(request_json)?;
    let cfg = request.config.unwrap_or_default();
    let handles = reassign_handles(&request.nodes, &request.edges, &request.sizes, &cfg);
    encode(&HandlesOutput { handles, error: None })
}

fn report<T: Serialize + Default>(context: &str, e: &Error, attach: impl FnOnce(&mut T, ErrorInfo)) -> String {
    console_error(&format!("{context}: {e}"));
    let mut output = T::default();
    attach(&mut output, ErrorInfo::from(e));
    encode(&output).unwrap_or_else(|_| ENCODE_FAILURE.to_string())
}

#[wasm_bindgen]
pub fn auto_layout(request_json: &str) -> String {
    match run_auto_layout(request_json) {
        Ok(json) => json,
        Err(e) => report("auto_layout", &e, |o: &mut LayoutOutput, info| o.error = Some(info)),
    }
}

#[wasm_bindgen]
pub fn assign_edge_handles(request_json: &str) -> String {
    match run_assign_edge_handles(request_json) {
        Ok(json) => json,
        Err(e) => report("assign_edge_handles", &e, |o: &mut HandlesOutput, info| o.error = Some(info)),
    }
}

mod types;
pub mod compile;

pub use types::*;
pub use compile::{compile, resolve_scope, Edge, Graph, Node, NodeId};

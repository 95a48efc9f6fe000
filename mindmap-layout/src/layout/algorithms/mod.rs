//! Layout algorithms for mind maps.
//!
//! - `radial`: default force-directed layout with group contraction
//! - `tree`: horizontal / vertical tidy tree over tree-parent links

mod radial;
mod tree;

pub use radial::{RadialLayout, layout_radial};
pub use tree::{TreeAxis, TreeLayout, layout_tree};

mod mapper;
mod node;

pub use mapper::{ChangedPath, OutlineMapper, expand_paths, matching_nodes};
pub use node::{NodeKind, OutlineNode};

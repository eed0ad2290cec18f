//! Qgroup hierarchy rebuilt from flat parent references, and its ordered walk.

mod hierarchy;
mod tree_walker;

pub use hierarchy::{Hierarchy, Siblings};
pub use tree_walker::{TreeItem, TreeWalker};

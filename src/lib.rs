//! An ordered string key/value store implemented with an AVL tree.
//!
//! Entries are kept sorted by key. Every insert and remove rebalances the
//! path back to the root, so the height of the tree stays logarithmic in the
//! number of entries.
//!
//! ```
//! use avltree::AvlTree;
//! let mut tree = AvlTree::new();
//! tree.populate(7);
//! assert_eq!(tree.height(), 2);
//! assert_eq!(tree.search("3"), Some("genericdata"));
//! for summary in tree.debug_structure() {
//!     println!("{}", summary);
//! }
//! ```

mod check;
mod iter;
mod node;
mod tree;

pub use check::Violation;
pub use iter::Iter;
pub use tree::{AvlTree, Duplicates, NodeSummary, GENERATED_DATA};

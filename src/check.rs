//! Structural validation of an [`AvlTree`].

use log::error;
use thiserror::Error;

use crate::node::Node;
use crate::tree::AvlTree;

/// The first structural defect found by [`AvlTree::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("no nodes in tree")]
    Empty,

    #[error("error at node with key {key}: key smaller than lowest allowable ({bound})")]
    BelowLowerBound { key: String, bound: String },

    #[error("error at node with key {key}: key bigger than biggest allowable ({bound})")]
    AboveUpperBound { key: String, bound: String },

    #[error(
        "error at node with key {key}: subtree starting with {taller} is more than one \
         level taller than subtree starting with {shorter}"
    )]
    Unbalanced {
        key: String,
        taller: String,
        shorter: String,
    },

    #[error(
        "error at node with key {key}: only child {child} has height {height} \
         where a leaf is required"
    )]
    StaleLeafHeight {
        key: String,
        child: String,
        height: i32,
    },
}

impl Violation {
    /// Key of the node at which the defect was found.
    pub fn key(&self) -> Option<&str> {
        match self {
            Violation::Empty => None,
            Violation::BelowLowerBound { key, .. }
            | Violation::AboveUpperBound { key, .. }
            | Violation::Unbalanced { key, .. }
            | Violation::StaleLeafHeight { key, .. } => Some(key.as_str()),
        }
    }
}

impl AvlTree {
    /// Checks key order and height balance of every node.
    ///
    /// Each node's key must lie within the bounds set by its ancestors,
    /// the heights of two children may differ by at most one, and an only
    /// child must be a leaf. An empty tree is reported as a violation.
    pub fn validate(&self) -> Result<(), Violation> {
        match self.root {
            None => Err(Violation::Empty),
            Some(root_ptr) => check_subtree(unsafe { &*root_ptr.as_ptr() }, None, None),
        }
    }

    /// Like [`validate`](Self::validate), but logs the violation and
    /// returns false instead.
    pub fn check_valid(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(violation) => {
                error!("{}", violation);
                false
            }
        }
    }
}

fn check_subtree<'a>(
    node: &'a Node,
    low: Option<&'a str>,
    high: Option<&'a str>,
) -> Result<(), Violation> {
    // Bounds are inclusive so that tying keys stored to the right pass
    if let Some(low) = low.filter(|low| node.key.as_str() < *low) {
        return Err(Violation::BelowLowerBound {
            key: node.key.clone(),
            bound: low.to_owned(),
        });
    }
    if let Some(high) = high.filter(|high| node.key.as_str() > *high) {
        return Err(Violation::AboveUpperBound {
            key: node.key.clone(),
            bound: high.to_owned(),
        });
    }

    let left = node.left.map(|left_ptr| unsafe { &*left_ptr.as_ptr() });
    let right = node.right.map(|right_ptr| unsafe { &*right_ptr.as_ptr() });
    match (left, right) {
        (Some(left), Some(right)) => {
            if (left.height - right.height).abs() > 1 {
                let (taller, shorter) = if left.height > right.height {
                    (left, right)
                } else {
                    (right, left)
                };
                return Err(Violation::Unbalanced {
                    key: node.key.clone(),
                    taller: taller.key.clone(),
                    shorter: shorter.key.clone(),
                });
            }
            check_subtree(left, low, Some(node.key.as_str()))?;
            check_subtree(right, Some(node.key.as_str()), high)
        }
        (Some(child), None) | (None, Some(child)) => {
            if child.height > 0 {
                return Err(Violation::StaleLeafHeight {
                    key: node.key.clone(),
                    child: child.key.clone(),
                    height: child.height,
                });
            }
            if left.is_some() {
                check_subtree(child, low, Some(node.key.as_str()))
            } else {
                check_subtree(child, Some(node.key.as_str()), high)
            }
        }
        (None, None) => Ok(()),
    }
}

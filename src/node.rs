use std::alloc::{self, Layout};
use std::cmp;
use std::ptr::NonNull;

use log::trace;

pub(crate) type NodePtr = NonNull<Node>;
pub(crate) type Link = Option<NodePtr>;
pub(crate) type LinkPtr = NonNull<Link>;

/// Height of an absent subtree.
pub(crate) const EMPTY_HEIGHT: i32 = -1;

pub(crate) struct Node {
    pub(crate) key: String,
    pub(crate) data: String,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) height: i32,
    pub(crate) balance: i32,
}

impl Node {
    /// Allocates a new leaf node.
    /// Returns `None` if the allocator could not provide the memory.
    pub(crate) fn create(key: String, data: String) -> Option<NodePtr> {
        let raw = unsafe { alloc::alloc(Layout::new::<Node>()) } as *mut Node;
        let node_ptr = NonNull::new(raw)?;
        unsafe {
            node_ptr.as_ptr().write(Node {
                key,
                data,
                left: None,
                right: None,
                height: 0,
                balance: 0,
            });
        }
        Some(node_ptr)
    }

    /// Releases a single node. Its children are not touched.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr) {
        drop(Box::from_raw(node_ptr.as_ptr()));
    }

    /// Deep-copies the subtree behind `link`, cached fields included.
    pub(crate) fn clone_subtree(link: Link) -> Link {
        link.map(|node_ptr| {
            let node = unsafe { node_ptr.as_ref() };
            let boxed = Box::new(Node {
                key: node.key.clone(),
                data: node.data.clone(),
                left: Self::clone_subtree(node.left),
                right: Self::clone_subtree(node.right),
                height: node.height,
                balance: node.balance,
            });
            unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
        })
    }
}

pub(crate) fn height(link: Link) -> i32 {
    match link {
        None => EMPTY_HEIGHT,
        Some(node_ptr) => unsafe { node_ptr.as_ref().height },
    }
}

fn balance(link: Link) -> i32 {
    match link {
        None => 0,
        Some(node_ptr) => unsafe { node_ptr.as_ref().balance },
    }
}

/// Recomputes height and balance of the given node from the cached heights
/// of its children. Children must already be up to date.
pub(crate) fn adjust_height(link: Link) {
    if let Some(mut node_ptr) = link {
        unsafe {
            let left_height = height(node_ptr.as_ref().left);
            let right_height = height(node_ptr.as_ref().right);
            let node = node_ptr.as_mut();
            node.height = 1 + cmp::max(left_height, right_height);
            node.balance = right_height - left_height;
        }
    }
}

/// Promotes the right child of the node held by `slot`.
///
/// ```text
///      N                 Y
///     / \               / \
///    X   Y     ->      N   D
///       / \           / \
///      C   D         X   C
/// ```
pub(crate) unsafe fn rotate_left(mut slot: LinkPtr) {
    if let Some(mut node_ptr) = *slot.as_ref() {
        if let Some(mut right_ptr) = node_ptr.as_ref().right {
            trace!("rotate left at {:?}", node_ptr.as_ref().key);
            node_ptr.as_mut().right = right_ptr.as_ref().left;
            right_ptr.as_mut().left = Some(node_ptr);
            *slot.as_mut() = Some(right_ptr);

            adjust_height(Some(node_ptr));
            adjust_height(Some(right_ptr));
        }
    }
}

/// Promotes the left child of the node held by `slot`.
///
/// ```text
///      N                 X
///     / \               / \
///    X   Y     ->      A   N
///   / \                   / \
///  A   B                 B   Y
/// ```
pub(crate) unsafe fn rotate_right(mut slot: LinkPtr) {
    if let Some(mut node_ptr) = *slot.as_ref() {
        if let Some(mut left_ptr) = node_ptr.as_ref().left {
            trace!("rotate right at {:?}", node_ptr.as_ref().key);
            node_ptr.as_mut().left = left_ptr.as_ref().right;
            left_ptr.as_mut().right = Some(node_ptr);
            *slot.as_mut() = Some(left_ptr);

            adjust_height(Some(node_ptr));
            adjust_height(Some(left_ptr));
        }
    }
}

/// Restores the AVL condition at the node held by `slot` and adjusts its height.
/// Resulting balance will be +1, 0 or -1.
/// Initial balance must not exceed +2 or -2, which always holds after a single update.
/// Returns whether a rotation had been necessary.
pub(crate) unsafe fn rebalance(slot: LinkPtr) -> bool {
    let mut node_ptr = match *slot.as_ref() {
        None => return false,
        Some(node_ptr) => node_ptr,
    };
    adjust_height(Some(node_ptr));

    let node_balance = node_ptr.as_ref().balance;
    debug_assert!((-2..=2).contains(&node_balance));
    if node_balance > 1 {
        // Right heavy
        if balance(node_ptr.as_ref().right) < 0 {
            rotate_right(LinkPtr::new_unchecked(&mut node_ptr.as_mut().right));
        }
        rotate_left(slot);
        true
    } else if node_balance < -1 {
        // Left heavy
        if balance(node_ptr.as_ref().left) > 0 {
            rotate_left(LinkPtr::new_unchecked(&mut node_ptr.as_mut().left));
        }
        rotate_right(slot);
        true
    } else {
        false
    }
}

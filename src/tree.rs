use std::cmp::Ordering;
use std::fmt;

use log::{debug, error, trace};

use crate::iter::Iter;
use crate::node::{self, Link, LinkPtr, Node, NodePtr};

/// Data stored with every entry created by [`AvlTree::populate`].
pub const GENERATED_DATA: &str = "genericdata";

/// How [`AvlTree::insert`] treats a key that is already present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Duplicates {
    /// Store another entry with the same key. Ties descend to the right,
    /// so lookups and removals see the topmost entry first.
    #[default]
    Allow,
    /// Leave the tree unchanged and report failure.
    Reject,
    /// Overwrite the data of the existing entry.
    Replace,
}

/// An ordered map from string keys to string data, balanced as an AVL tree.
///
/// ```
/// use avltree::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert("b", "two");
/// tree.insert("a", "one");
/// assert_eq!(tree.search("a"), Some("one"));
/// assert!(tree.remove("a"));
/// assert!(tree.search("a").is_none());
/// assert!(tree.check_valid());
/// ```
pub struct AvlTree {
    pub(crate) root: Link,
    num_nodes: usize,
    duplicates: Duplicates,
}

/// One node of the tree as reported by [`AvlTree::debug_structure`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSummary<'a> {
    pub key: &'a str,
    pub data: &'a str,
    pub left: Option<&'a str>,
    pub right: Option<&'a str>,
    pub height: i32,
    pub balance: i32,
}

impl fmt::Display for NodeSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({}<-left,right->{})(height:{}, balance: {})",
            self.key,
            self.data,
            self.left.unwrap_or("NULL"),
            self.right.unwrap_or("NULL"),
            self.height,
            self.balance
        )
    }
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

impl AvlTree {
    /// Creates an empty tree that keeps duplicate keys.
    /// No memory is allocated until the first entry is inserted.
    pub fn new() -> Self {
        Self::with_duplicates(Duplicates::default())
    }

    /// Creates an empty tree with the given duplicate-key policy.
    pub fn with_duplicates(duplicates: Duplicates) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            duplicates,
        }
    }

    /// Returns the duplicate-key policy of the tree.
    pub fn duplicates(&self) -> Duplicates {
        self.duplicates
    }

    /// Returns true if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree: 0 for a single node, -1 when empty.
    pub fn height(&self) -> i32 {
        node::height(self.root)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        self.traverse(|_| {}, |node_ptr| unsafe { Node::destroy(node_ptr) });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Returns the data stored under `key`.
    pub fn search(&self, key: &str) -> Option<&str> {
        self.find(key)
            .map(|node_ptr| unsafe { &*node_ptr.as_ptr() }.data.as_str())
    }

    /// Returns true if an entry with `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Inserts an entry and rebalances the path back up to the root.
    ///
    /// Returns false if the node could not be allocated, or if the key is
    /// present and the tree rejects duplicates. The tree is unchanged then.
    pub fn insert(&mut self, key: impl Into<String>, data: impl Into<String>) -> bool {
        let key = key.into();
        let data = data.into();
        let duplicates = self.duplicates;

        // Slots of all ancestors of the new node, root first
        let mut path: Vec<LinkPtr> = Vec::new();
        let mut link_ptr: LinkPtr = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                if key == node_ptr.as_ref().key {
                    match duplicates {
                        Duplicates::Allow => {}
                        Duplicates::Reject => {
                            debug!("rejected duplicate key {:?}", key);
                            return false;
                        }
                        Duplicates::Replace => {
                            trace!("replaced data of key {:?}", key);
                            node_ptr.as_mut().data = data;
                            return true;
                        }
                    }
                }
                path.push(link_ptr);
                if key < node_ptr.as_ref().key {
                    link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                } else {
                    link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                }
            }
        }

        trace!("insert {:?} at depth {}", key, path.len());
        let new_ptr = match Node::create(key, data) {
            Some(node_ptr) => node_ptr,
            None => {
                error!("could not allocate tree node");
                return false;
            }
        };
        unsafe {
            *link_ptr.as_mut() = Some(new_ptr);
        }
        self.num_nodes += 1;
        Self::retrace(path);
        true
    }

    /// Removes the entry with `key`.
    /// Returns whether the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let mut path: Vec<LinkPtr> = Vec::new();
        let mut link_ptr: LinkPtr = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            // Find node to-be-removed
            let mut node_ptr = loop {
                let mut node_ptr = match *link_ptr.as_ref() {
                    None => return false,
                    Some(node_ptr) => node_ptr,
                };
                match key.cmp(node_ptr.as_ref().key.as_str()) {
                    Ordering::Equal => break node_ptr,
                    Ordering::Less => {
                        path.push(link_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().left);
                    }
                    Ordering::Greater => {
                        path.push(link_ptr);
                        link_ptr = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                    }
                }
            };

            match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
                (Some(_), Some(mut min_child_ptr)) => {
                    // Find smallest node in right sub tree, the node keeps its
                    // position and takes over the successor's entry
                    path.push(link_ptr);
                    let mut min_child_link = LinkPtr::new_unchecked(&mut node_ptr.as_mut().right);
                    while let Some(left_ptr) = min_child_ptr.as_ref().left {
                        path.push(min_child_link);
                        min_child_link = LinkPtr::new_unchecked(&mut min_child_ptr.as_mut().left);
                        min_child_ptr = left_ptr;
                    }

                    // Smallest node is stem or leaf, unlink from tree
                    debug_assert!(min_child_ptr.as_ref().left.is_none());
                    *min_child_link.as_mut() = min_child_ptr.as_ref().right;
                    let Node {
                        key: successor_key,
                        data: successor_data,
                        ..
                    } = *Box::from_raw(min_child_ptr.as_ptr());
                    trace!("remove {:?}, successor {:?} moves up", key, successor_key);
                    let node = node_ptr.as_mut();
                    node.key = successor_key;
                    node.data = successor_data;
                }
                (child, None) | (None, child) => {
                    // Node is stem or leaf, splice its only child in
                    trace!("remove {:?}", key);
                    *link_ptr.as_mut() = child;
                    Node::destroy(node_ptr);
                }
            }
        }
        debug_assert!(self.num_nodes >= 1);
        self.num_nodes -= 1;
        Self::retrace(path);
        true
    }

    /// Replaces the contents of the tree by `count` generated entries with
    /// keys `"0"` to `count - 1` in increasing numeric order.
    /// Returns the number of entries inserted.
    pub fn populate(&mut self, count: usize) -> usize {
        self.clear();
        let inserted = (0..count)
            .filter(|i| self.insert(i.to_string(), GENERATED_DATA))
            .count();
        debug!("populated tree with {} of {} entries", inserted, count);
        inserted
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.root, self.num_nodes)
    }

    /// Describes every node in preorder, with links and cached balance data.
    pub fn debug_structure(&self) -> Vec<NodeSummary<'_>> {
        let mut summaries = Vec::with_capacity(self.num_nodes);
        self.traverse(
            |node_ptr| {
                let node = unsafe { &*node_ptr.as_ptr() };
                summaries.push(NodeSummary {
                    key: &node.key,
                    data: &node.data,
                    left: node.left.map(|left_ptr| unsafe { &*left_ptr.as_ptr() }.key.as_str()),
                    right: node
                        .right
                        .map(|right_ptr| unsafe { &*right_ptr.as_ptr() }.key.as_str()),
                    height: node.height,
                    balance: node.balance,
                });
            },
            |_| {},
        );
        summaries
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        self.traverse(
            |node_ptr| unsafe {
                let current = node_ptr.as_ref();
                let left_height = node::height(current.left);
                let right_height = node::height(current.right);

                // Check cached height and balance
                assert_eq!(current.height, 1 + std::cmp::max(left_height, right_height));
                assert_eq!(current.balance, right_height - left_height);

                // Check AVL condition (nearly balance)
                assert!((-1..=1).contains(&current.balance));

                num_nodes += 1;
            },
            |_| {},
        );

        // Check key order
        let keys: Vec<&str> = self.iter().map(|(key, _)| key).collect();
        assert!(keys.windows(2).all(|pair| pair[0] <= pair[1]));

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
        assert_eq!(keys.len(), self.num_nodes);
    }

    fn find(&self, key: &str) -> Link {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(node_ptr.as_ref().key.as_str()) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    /// Rebalances the collected slots from the deepest one up to the root.
    /// Every slot is visited, since a rotation below may still change
    /// heights further up.
    fn retrace(path: Vec<LinkPtr>) {
        for link_ptr in path.into_iter().rev() {
            unsafe { node::rebalance(link_ptr) };
        }
    }

    fn traverse<Pre, Post>(&self, mut preorder: Pre, mut postorder: Post)
    where
        Pre: FnMut(NodePtr),
        Post: FnMut(NodePtr),
    {
        let mut stack: Vec<(NodePtr, Direction)> = Vec::new();
        if let Some(root_ptr) = self.root {
            stack.push((root_ptr, Direction::FromParent));
        }
        while let Some((node_ptr, dir)) = stack.pop() {
            match dir {
                Direction::FromParent => {
                    preorder(node_ptr);
                    stack.push((node_ptr, Direction::FromLeft));
                    if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                        stack.push((left_ptr, Direction::FromParent));
                    }
                }
                Direction::FromLeft => {
                    stack.push((node_ptr, Direction::FromRight));
                    if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                        stack.push((right_ptr, Direction::FromParent));
                    }
                }
                Direction::FromRight => {
                    // Post order traversal is used for node deletion,
                    // so make sure not to use node pointer after postorder call.
                    postorder(node_ptr);
                }
            }
        }
    }
}

impl Drop for AvlTree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Default for AvlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AvlTree {
    fn clone(&self) -> Self {
        Self {
            root: Node::clone_subtree(self.root),
            num_nodes: self.num_nodes,
            duplicates: self.duplicates,
        }
    }
}

impl fmt::Debug for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a AvlTree {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, D: Into<String>> Extend<(K, D)> for AvlTree {
    fn extend<I: IntoIterator<Item = (K, D)>>(&mut self, iter: I) {
        for (key, data) in iter {
            self.insert(key, data);
        }
    }
}

impl<K: Into<String>, D: Into<String>> FromIterator<(K, D)> for AvlTree {
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

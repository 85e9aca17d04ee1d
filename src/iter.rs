use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node, NodePtr};
use crate::tree::AvlTree;

/// An iterator over the entries of an [`AvlTree`], sorted by key.
///
/// Created by [`AvlTree::iter`]. Each call starts a fresh walk.
pub struct Iter<'a> {
    // Nodes whose left subtree has been visited, deepest last
    stack: Vec<NodePtr>,
    remaining: usize,
    marker: PhantomData<&'a AvlTree>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: Link, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
            marker: PhantomData,
        };
        iter.push_left_edge(root);
        iter
    }

    fn push_left_edge(&mut self, mut link: Link) {
        while let Some(node_ptr) = link {
            self.stack.push(node_ptr);
            link = unsafe { node_ptr.as_ref().left };
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.stack.pop()?;
        let node: &'a Node = unsafe { &*node_ptr.as_ptr() };
        self.push_left_edge(node.right);
        self.remaining -= 1;
        Some((node.key.as_str(), node.data.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl Clone for Iter<'_> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

//! Utilities to traverse the KDTree structure.

use crate::kdtree::node::Node;
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;

/// An iterator over the `(id, coordinates)` of every item of a [`KDTree`].
///
/// Items are visited in order (left subtree, node, right subtree).
#[derive(Debug, Clone)]
pub struct Iter<'a, N: Coordinate> {
    stack: Vec<&'a Node<N>>,
    remaining: usize,
}

impl<'a, N: Coordinate> Iter<'a, N> {
    fn new(tree: &'a KDTree<N>) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(tree.max_depth() as usize),
            remaining: tree.len(),
        };
        iter.push_left_edge(tree.root());
        iter
    }

    fn push_left_edge(&mut self, mut node: Option<&'a Node<N>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left();
        }
    }
}

impl<'a, N: Coordinate> Iterator for Iter<'a, N> {
    type Item = (u32, &'a [N]);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_edge(node.right());
        self.remaining -= 1;
        Some((node.id, node.coords()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<N: Coordinate> ExactSizeIterator for Iter<'_, N> {}

impl<N: Coordinate> KDTree<N> {
    /// Iterate over the `(id, coordinates)` of every item in the tree.
    pub fn iter(&self) -> Iter<'_, N> {
        Iter::new(self)
    }
}

impl<'a, N: Coordinate> IntoIterator for &'a KDTree<N> {
    type Item = (u32, &'a [N]);
    type IntoIter = Iter<'a, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

use crate::r#type::Coordinate;

/// A child slot: either empty or an exclusively owned subtree.
pub(crate) type Link<N> = Option<Box<Node<N>>>;

/// A single vertex of a [`KDTree`][crate::kdtree::KDTree].
///
/// Nodes are only reachable by reference through [`KDTree::root`][crate::kdtree::KDTree::root],
/// so the tree structure can be inspected but not modified from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N: Coordinate> {
    pub(crate) coords: Box<[N]>,
    pub(crate) id: u32,
    pub(crate) split_dim: u8,
    pub(crate) depth: u32,
    /// Number of levels in the subtree rooted here, 1 for a leaf.
    pub(crate) height: u32,
    pub(crate) left: Link<N>,
    pub(crate) right: Link<N>,
}

impl<N: Coordinate> Node<N> {
    pub(crate) fn new_leaf(coords: Box<[N]>, id: u32, split_dim: u8, depth: u32) -> Self {
        Self {
            coords,
            id,
            split_dim,
            depth,
            height: 1,
            left: None,
            right: None,
        }
    }

    /// The coordinates of this node.
    #[inline]
    pub fn coords(&self) -> &[N] {
        &self.coords
    }

    /// The caller-provided id of this node.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The axis that the children of this node are split over.
    #[inline]
    pub fn split_dim(&self) -> usize {
        self.split_dim as usize
    }

    /// Distance from the root, which has depth 0.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of levels in the subtree rooted at this node.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The child holding keys lower than or equal to this node's key.
    pub fn left(&self) -> Option<&Node<N>> {
        self.left.as_deref()
    }

    /// The child holding keys greater than or equal to this node's key.
    pub fn right(&self) -> Option<&Node<N>> {
        self.right.as_deref()
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// The split coordinate of this node.
    #[inline]
    pub(crate) fn split_value(&self) -> N {
        self.coords[self.split_dim as usize]
    }

    #[inline]
    pub(crate) fn matches(&self, coords: &[N], id: u32) -> bool {
        self.id == id && *self.coords == *coords
    }

    /// Difference between the heights of the two subtrees.
    #[inline]
    pub(crate) fn skew(&self) -> u32 {
        link_height(&self.left).abs_diff(link_height(&self.right))
    }

    #[inline]
    pub(crate) fn update_height(&mut self) {
        self.height = 1 + link_height(&self.left).max(link_height(&self.right));
    }
}

#[inline]
pub(crate) fn link_height<N: Coordinate>(link: &Link<N>) -> u32 {
    link.as_ref().map_or(0, |node| node.height)
}

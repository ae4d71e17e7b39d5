//! Rooted cluster tree produced by hierarchical scene partitioning.

use crate::graph::ImageId;

/// A node of the rooted cluster tree.
///
/// Holds the images assigned to this node (no duplicates within one node) and
/// the child clusters created by the split that refined it. An empty child
/// list marks a leaf. Children are exclusively owned by their parent; the
/// accessors on [`crate::SceneClustering`] only lend references into the tree.
///
/// # Examples
/// ```
/// use covis_core::{Cluster, ImageId};
///
/// let leaf = Cluster::new(vec![ImageId::new(1), ImageId::new(2)]);
/// assert!(leaf.is_leaf());
/// assert_eq!(leaf.image_ids().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    image_ids: Vec<ImageId>,
    child_clusters: Vec<Cluster>,
}

impl Cluster {
    /// Creates a leaf cluster holding the given images.
    #[must_use]
    pub const fn new(image_ids: Vec<ImageId>) -> Self {
        Self {
            image_ids,
            child_clusters: Vec::new(),
        }
    }

    pub(crate) const fn with_children(image_ids: Vec<ImageId>, child_clusters: Vec<Self>) -> Self {
        Self {
            image_ids,
            child_clusters,
        }
    }

    /// Images assigned to this node, in deterministic assignment order.
    #[must_use]
    pub fn image_ids(&self) -> &[ImageId] {
        &self.image_ids
    }

    /// Child clusters in split order; empty for a leaf.
    #[must_use]
    pub fn child_clusters(&self) -> &[Self] {
        &self.child_clusters
    }

    /// Returns whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_clusters.is_empty()
    }

    /// Appends overlap images duplicated from sibling groups.
    ///
    /// Applied once, by the split that created this node, after its own
    /// subtree is complete; the duplicates never propagate downwards.
    pub(crate) fn extend_overlap(&mut self, overlap: impl IntoIterator<Item = ImageId>) {
        self.image_ids.extend(overlap);
    }

    /// Collects leaf references in left-to-right preorder.
    pub(crate) fn collect_leaves<'tree>(&'tree self, leaves: &mut Vec<&'tree Self>) {
        if self.is_leaf() {
            leaves.push(self);
            return;
        }
        for child in &self.child_clusters {
            child.collect_leaves(leaves);
        }
    }
}

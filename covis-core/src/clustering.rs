//! Hierarchical scene clustering over the co-visibility graph.
//!
//! [`SceneClustering`] is the entry point: it builds the [`ViewGraph`] from
//! raw match observations and recursively partitions it into a rooted
//! [`Cluster`] tree until every leaf is small enough for independent
//! downstream processing. Sibling clusters share up to `image_overlap`
//! duplicated images so a later merge stage can align neighbouring
//! reconstructions.
//!
//! The recursive builder returns owned subtrees which the caller assembles
//! into the parent's child list; sibling subtrees own disjoint subgraphs and
//! are built in parallel. All tie-breaking keys on [`ImageId`], so the output
//! is identical regardless of scheduling.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::{
    Result,
    builder::ClusteringOptions,
    cluster::Cluster,
    error::SceneClusteringError,
    graph::{ImageId, ViewGraph},
    partition::{GraphPartitioner, NormalizedCut},
};

/// Entry point for partitioning a scene into a hierarchy of overlapping
/// clusters.
///
/// The tree is built exactly once per object and is read-only afterwards;
/// accessors lend references scoped to the object's lifetime.
///
/// # Examples
/// ```
/// use covis_core::{ImageId, SceneClusteringBuilder};
///
/// let pairs: Vec<_> = (0..8)
///     .map(|i| (ImageId::new(i), ImageId::new(i + 1)))
///     .collect();
/// let weights = vec![10; pairs.len()];
///
/// let mut clustering = SceneClusteringBuilder::new()
///     .with_leaf_max_num_images(3)
///     .with_image_overlap(1)
///     .build()
///     .expect("options are valid");
/// clustering.partition(&pairs, &weights).expect("valid input");
///
/// let root = clustering.root_cluster().expect("tree was built");
/// assert_eq!(root.image_ids().len(), 9);
/// assert!(!clustering.leaf_clusters().is_empty());
/// ```
#[derive(Debug)]
pub struct SceneClustering<P = NormalizedCut> {
    options: ClusteringOptions,
    partitioner: P,
    root: Option<Cluster>,
}

impl SceneClustering<NormalizedCut> {
    /// Creates a clustering object with the default normalized-cut
    /// partitioner.
    ///
    /// # Errors
    /// Returns a configuration error when `options` fail
    /// [`ClusteringOptions::check`].
    pub fn new(options: ClusteringOptions) -> Result<Self> {
        Self::with_partitioner(options, NormalizedCut::new())
    }
}

impl<P> SceneClustering<P>
where
    P: GraphPartitioner + Sync,
{
    /// Creates a clustering object with a caller-supplied partitioner.
    ///
    /// The partitioner is a swappable capability; tests substitute scripted
    /// implementations without touching the tree builder.
    ///
    /// # Errors
    /// Returns [`SceneClusteringError::InvalidBranching`] or
    /// [`SceneClusteringError::InvalidLeafMaxNumImages`] when the options
    /// are inconsistent.
    pub fn with_partitioner(options: ClusteringOptions, partitioner: P) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            partitioner,
            root: None,
        })
    }

    /// Returns the validated options this object was built with.
    #[must_use]
    pub const fn options(&self) -> &ClusteringOptions {
        &self.options
    }

    /// Builds the cluster tree from raw co-visibility observations.
    ///
    /// `pairs` and `weights` are index-aligned: `weights[i]` is the
    /// verified-match strength of `pairs[i]`. The root cluster holds every
    /// image appearing in any pair, in first-seen order.
    ///
    /// # Errors
    /// Returns [`SceneClusteringError::AlreadyPartitioned`] when this object
    /// already holds a tree, and [`SceneClusteringError::InvalidInput`] when
    /// the observations are rejected by graph construction. No partial tree
    /// is ever produced.
    #[instrument(
        name = "clustering.partition",
        err,
        skip(self, pairs, weights),
        fields(
            pairs = pairs.len(),
            branching = self.options.branching,
            image_overlap = self.options.image_overlap,
            leaf_max_num_images = self.options.leaf_max_num_images,
        ),
    )]
    pub fn partition(&mut self, pairs: &[(ImageId, ImageId)], weights: &[i64]) -> Result<()> {
        if self.root.is_some() {
            warn!("partition called twice, refusing to overwrite the tree");
            return Err(SceneClusteringError::AlreadyPartitioned);
        }
        let graph = ViewGraph::from_observations(pairs, weights)?;
        debug!(images = graph.len(), "co-visibility graph built");
        self.root = Some(self.build_cluster(&graph));
        Ok(())
    }

    /// Returns the root cluster, or `None` before [`Self::partition`] ran.
    #[must_use]
    pub const fn root_cluster(&self) -> Option<&Cluster> {
        self.root.as_ref()
    }

    /// Returns every leaf in deterministic left-to-right order.
    ///
    /// No leaf is duplicated in this list even though an image id may recur
    /// across several leaves. Repeated calls return identical sequences.
    #[must_use]
    pub fn leaf_clusters(&self) -> Vec<&Cluster> {
        let mut leaves = Vec::new();
        if let Some(root) = &self.root {
            root.collect_leaves(&mut leaves);
        }
        leaves
    }

    /// Builds the subtree for one cluster's induced subgraph.
    fn build_cluster(&self, graph: &ViewGraph) -> Cluster {
        let image_ids = graph.images().to_vec();
        if image_ids.len() <= self.options.leaf_max_num_images {
            return Cluster::new(image_ids);
        }
        let Some(groups) = self.partitioner.partition(graph, self.options.branching) else {
            // Escape valve: an oversized cluster with fewer vertices than
            // the branching factor stays a leaf.
            debug!(
                images = image_ids.len(),
                branching = self.options.branching,
                "cluster is not splittable, closing it as an oversized leaf"
            );
            return Cluster::new(image_ids);
        };
        let overlaps = self.select_overlap(graph, &groups);
        let mut children: Vec<Cluster> = groups
            .par_iter()
            .map(|group| self.build_cluster(&graph.induced(group)))
            .collect();
        // Overlap images are appended once per child, after its subtree is
        // complete, so they never compound across recursion levels. A leaf
        // therefore holds at most `leaf_max_num_images + image_overlap`
        // images.
        for (child, overlap) in children.iter_mut().zip(overlaps) {
            child.extend_overlap(overlap);
        }
        Cluster::with_children(image_ids, children)
    }

    /// Chooses up to `image_overlap` duplicated images per group, drawn from
    /// the other groups of the same split by descending total connection
    /// weight, ties by ascending image id. Unconnected images are never
    /// duplicated: they cannot anchor a merge.
    fn select_overlap(&self, graph: &ViewGraph, groups: &[Vec<ImageId>]) -> Vec<Vec<ImageId>> {
        if self.options.image_overlap == 0 {
            return vec![Vec::new(); groups.len()];
        }
        let mut label: HashMap<ImageId, usize> = HashMap::new();
        for (group_index, group) in groups.iter().enumerate() {
            for &image in group {
                label.insert(image, group_index);
            }
        }
        groups
            .iter()
            .enumerate()
            .map(|(group_index, group)| {
                let mut connection: BTreeMap<ImageId, i64> = BTreeMap::new();
                for &image in group {
                    let vertex = graph.index_of(image);
                    for (neighbour, weight) in graph.neighbours(vertex) {
                        let other = graph.images()[neighbour];
                        if label[&other] != group_index {
                            *connection.entry(other).or_insert(0) += weight;
                        }
                    }
                }
                let mut candidates: Vec<(ImageId, i64)> = connection
                    .into_iter()
                    .filter(|&(_, weight)| weight > 0)
                    .collect();
                candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                candidates.truncate(self.options.image_overlap);
                candidates.into_iter().map(|(image, _)| image).collect()
            })
            .collect()
    }
}


#[cfg(test)]
mod property;

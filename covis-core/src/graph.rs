//! Indexed co-visibility graph built from raw feature-matching observations.
//!
//! The upstream matching stage emits an ordered list of image pairs together
//! with an index-aligned list of verified-match counts. This module turns that
//! list into a [`ViewGraph`]: vertices in first-seen order, edges keyed by
//! unordered endpoint pair, adjacency lists sorted by neighbour index so every
//! traversal is deterministic.
//!
//! A pair that occurs more than once sums its weights; silently overwriting
//! the earlier observation would drop verified matches.

use std::collections::{BTreeMap, HashMap};

use crate::error::GraphError;

/// Opaque identifier for an image.
///
/// Ordering is total and used only for deterministic tie-breaking, never for
/// semantics.
///
/// # Examples
/// ```
/// use covis_core::ImageId;
///
/// let id = ImageId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    /// Creates a new image identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

/// Weighted undirected graph over the images seen in the observation list.
///
/// The vertex set is exactly the union of pair endpoints; no isolated vertex
/// is introduced at build time. Induced subgraphs created during recursive
/// clustering may keep members without internal edges, since those members
/// still belong to the cluster.
///
/// # Examples
/// ```
/// use covis_core::{ImageId, ViewGraph};
///
/// let pairs = vec![(ImageId::new(1), ImageId::new(2)), (ImageId::new(2), ImageId::new(3))];
/// let graph = ViewGraph::from_observations(&pairs, &[5, 7])?;
/// assert_eq!(graph.len(), 3);
/// assert_eq!(graph.images()[0], ImageId::new(1));
/// # Ok::<(), covis_core::GraphError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ViewGraph {
    images: Vec<ImageId>,
    index: HashMap<ImageId, usize>,
    adjacency: Vec<Vec<(usize, i64)>>,
}

impl ViewGraph {
    /// Builds the graph from index-aligned pair and weight sequences.
    ///
    /// Vertices are registered in first-seen order. Duplicate pairs sum their
    /// weights rather than overwriting.
    ///
    /// # Errors
    /// Returns [`GraphError::LengthMismatch`] when the sequences differ in
    /// length, [`GraphError::NegativeWeight`] for a negative weight,
    /// [`GraphError::SelfPair`] when a pair references one image twice, and
    /// [`GraphError::EmptyInput`] when no pairs were supplied.
    pub fn from_observations(
        pairs: &[(ImageId, ImageId)],
        weights: &[i64],
    ) -> core::result::Result<Self, GraphError> {
        if pairs.len() != weights.len() {
            return Err(GraphError::LengthMismatch {
                pairs: pairs.len(),
                weights: weights.len(),
            });
        }
        if pairs.is_empty() {
            return Err(GraphError::EmptyInput);
        }

        let mut images = Vec::new();
        let mut index = HashMap::new();
        let mut intern = |image: ImageId, images: &mut Vec<ImageId>| {
            *index.entry(image).or_insert_with(|| {
                images.push(image);
                images.len() - 1
            })
        };

        // BTreeMap keeps edge iteration in index order, which in turn keeps
        // the adjacency lists deterministic.
        let mut edges: BTreeMap<(usize, usize), i64> = BTreeMap::new();
        for (&(first, second), &weight) in pairs.iter().zip(weights) {
            if weight < 0 {
                return Err(GraphError::NegativeWeight {
                    first: first.get(),
                    second: second.get(),
                    weight,
                });
            }
            if first == second {
                return Err(GraphError::SelfPair { image: first.get() });
            }
            let a = intern(first, &mut images);
            let b = intern(second, &mut images);
            let key = if a < b { (a, b) } else { (b, a) };
            *edges.entry(key).or_insert(0) += weight;
        }

        let mut adjacency = vec![Vec::new(); images.len()];
        for (&(a, b), &weight) in &edges {
            adjacency[a].push((b, weight));
            adjacency[b].push((a, weight));
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable_by_key(|&(neighbour, _)| neighbour);
        }

        Ok(Self {
            images,
            index,
            adjacency,
        })
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns the vertex set in first-seen order.
    #[must_use]
    pub fn images(&self) -> &[ImageId] {
        &self.images
    }

    /// Vertex index of an image known to be in the graph.
    pub(crate) fn index_of(&self, image: ImageId) -> usize {
        self.index[&image]
    }

    /// Iterates over `(neighbour_index, weight)` pairs of a vertex.
    pub(crate) fn neighbours(&self, vertex: usize) -> impl Iterator<Item = (usize, i64)> + '_ {
        self.adjacency[vertex].iter().copied()
    }

    /// Total edge weight incident to a vertex.
    pub(crate) fn incident_weight(&self, vertex: usize) -> i64 {
        self.adjacency[vertex]
            .iter()
            .map(|&(_, weight)| weight)
            .sum()
    }

    /// Builds the induced subgraph over `members`, preserving their order.
    ///
    /// Members without internal edges stay as vertices: they belong to the
    /// cluster even when none of their co-visibility partners do.
    pub(crate) fn induced(&self, members: &[ImageId]) -> Self {
        let index: HashMap<ImageId, usize> = members
            .iter()
            .enumerate()
            .map(|(local, &image)| (image, local))
            .collect();
        let mut adjacency = vec![Vec::new(); members.len()];
        for (local, &image) in members.iter().enumerate() {
            let parent = self.index[&image];
            for (neighbour, weight) in self.neighbours(parent) {
                if let Some(&other) = index.get(&self.images[neighbour]) {
                    adjacency[local].push((other, weight));
                }
            }
            adjacency[local].sort_unstable_by_key(|&(neighbour, _)| neighbour);
        }
        Self {
            images: members.to_vec(),
            index,
            adjacency,
        }
    }
}

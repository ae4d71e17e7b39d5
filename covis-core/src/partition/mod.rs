//! Graph partitioning with a normalized-cut objective.
//!
//! The cluster tree builder needs one capability: split a subgraph into `k`
//! disjoint, balanced, minimally-connected vertex groups. [`GraphPartitioner`]
//! captures that capability so the concrete algorithm can be substituted or
//! mocked without touching the tree builder.
//!
//! [`NormalizedCut`] is the default implementation. It reduces a `k`-way
//! split to repeated bisection of the currently largest group, and computes
//! each bisection with the classic multilevel scheme: coarsen by heavy-edge
//! matching, split the coarsest graph by greedy seeded growth, then project
//! the split back level by level while refining it with local weight-gain
//! moves. The objective for a bisection is `max(cut/vol(A), cut/vol(B))`,
//! where `vol` is a side's total incident weight, so a split is preferred
//! when its cross weight is small relative to both sides.
//!
//! There is no randomness anywhere in this module. Every visit order and
//! every tie is keyed by ascending [`ImageId`], which makes identical inputs
//! produce identical output regardless of scheduling.

mod coarsen;
mod refine;

use crate::graph::{ImageId, ViewGraph};

use self::coarsen::coarsen;
use self::refine::{initial_split, refine};

/// Capability to split a subgraph into `parts` disjoint vertex groups.
///
/// Returning `None` signals "not splittable": the subgraph has fewer distinct
/// vertices than the requested number of non-empty groups. The tree builder
/// consumes that signal as a leaf-termination condition; it is not an error.
pub trait GraphPartitioner {
    /// Splits `graph` into exactly `parts` non-empty, pairwise-disjoint
    /// groups whose union is the vertex set, each group listing its members
    /// in the subgraph's vertex order.
    fn partition(&self, graph: &ViewGraph, parts: usize) -> Option<Vec<Vec<ImageId>>>;
}

/// Deterministic multilevel normalized-cut partitioner.
///
/// # Examples
/// ```
/// use covis_core::{GraphPartitioner, ImageId, NormalizedCut, ViewGraph};
///
/// let pairs = vec![
///     (ImageId::new(1), ImageId::new(2)),
///     (ImageId::new(3), ImageId::new(4)),
///     (ImageId::new(2), ImageId::new(3)),
/// ];
/// let graph = ViewGraph::from_observations(&pairs, &[10, 10, 1])?;
/// let groups = NormalizedCut::default()
///     .partition(&graph, 2)
///     .expect("four vertices split into two groups");
/// assert_eq!(groups.len(), 2);
/// # Ok::<(), covis_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NormalizedCut {
    /// Stop coarsening once a level has at most this many vertices.
    coarsen_target: usize,
    /// Maximum refinement passes per level.
    refinement_passes: usize,
    /// Allowed relative deviation of a side's mass from the balanced half.
    balance_epsilon: f64,
}

impl Default for NormalizedCut {
    fn default() -> Self {
        Self {
            coarsen_target: 64,
            refinement_passes: 8,
            balance_epsilon: 0.25,
        }
    }
}

impl NormalizedCut {
    /// Creates a partitioner with the default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bisects `graph`, returning the two sides as local vertex indices in
    /// vertex order. Both sides are non-empty for graphs with at least two
    /// vertices.
    fn bisect(&self, graph: CutGraph) -> (Vec<usize>, Vec<usize>) {
        let mut levels = vec![graph];
        let mut mappings = Vec::new();
        while levels
            .last()
            .is_some_and(|level| level.len() > self.coarsen_target)
        {
            let Some(last) = levels.last() else { break };
            match coarsen(last) {
                Some((coarse, fine_to_coarse)) => {
                    levels.push(coarse);
                    mappings.push(fine_to_coarse);
                }
                None => break,
            }
        }

        let mut side = {
            let coarsest = &levels[levels.len() - 1];
            let mut side = initial_split(coarsest);
            refine(
                coarsest,
                &mut side,
                self.refinement_passes,
                self.balance_epsilon,
            );
            side
        };

        for level in (0..mappings.len()).rev() {
            side = project(&side, &mappings[level]);
            refine(
                &levels[level],
                &mut side,
                self.refinement_passes,
                self.balance_epsilon,
            );
        }

        let mut first = Vec::new();
        let mut second = Vec::new();
        for (vertex, &in_second) in side.iter().enumerate() {
            if in_second {
                second.push(vertex);
            } else {
                first.push(vertex);
            }
        }
        (first, second)
    }
}

impl GraphPartitioner for NormalizedCut {
    fn partition(&self, graph: &ViewGraph, parts: usize) -> Option<Vec<Vec<ImageId>>> {
        let n = graph.len();
        if parts == 0 || n < parts {
            return None;
        }
        let base = CutGraph::from_view(graph);
        // Groups hold base vertex indices in vertex order. Splitting the
        // currently largest group generalises bisection to any `parts`.
        let mut groups: Vec<Vec<usize>> = vec![(0..n).collect()];
        while groups.len() < parts {
            let target = split_target(&groups, &base);
            let members = std::mem::take(&mut groups[target]);
            let (first, second) = self.bisect(base.induced(&members));
            groups[target] = first.iter().map(|&local| members[local]).collect();
            groups.insert(
                target + 1,
                second.iter().map(|&local| members[local]).collect(),
            );
        }
        Some(
            groups
                .iter()
                .map(|group| group.iter().map(|&vertex| base.ids[vertex]).collect())
                .collect(),
        )
    }
}

/// Picks the next group to bisect: the largest, ties broken by the smallest
/// leading [`ImageId`] so the choice never depends on container order.
fn split_target(groups: &[Vec<usize>], base: &CutGraph) -> usize {
    let mut target = 0;
    for (candidate, group) in groups.iter().enumerate().skip(1) {
        let best = &groups[target];
        let better = group.len() > best.len()
            || (group.len() == best.len() && lead_id(group, base) < lead_id(best, base));
        if better {
            target = candidate;
        }
    }
    target
}

fn lead_id(group: &[usize], base: &CutGraph) -> ImageId {
    group
        .iter()
        .map(|&vertex| base.ids[vertex])
        .min()
        .unwrap_or(ImageId::new(u64::MAX))
}

/// Projects a coarse-level side assignment back onto the finer level.
fn project(side: &[bool], fine_to_coarse: &[usize]) -> Vec<bool> {
    fine_to_coarse
        .iter()
        .map(|&coarse| side[coarse])
        .collect()
}

/// Working graph for the cut algorithm: local adjacency plus the vertex mass
/// (how many original vertices a super-vertex stands for) and the minimum
/// original [`ImageId`] of each vertex, used for all tie-breaking.
#[derive(Debug, Clone)]
pub(crate) struct CutGraph {
    pub(crate) ids: Vec<ImageId>,
    pub(crate) mass: Vec<usize>,
    pub(crate) adj: Vec<Vec<(usize, i64)>>,
}

impl CutGraph {
    fn from_view(graph: &ViewGraph) -> Self {
        let n = graph.len();
        let adj = (0..n).map(|vertex| graph.neighbours(vertex).collect()).collect();
        Self {
            ids: graph.images().to_vec(),
            mass: vec![1; n],
            adj,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn degree(&self, vertex: usize) -> i64 {
        self.adj[vertex].iter().map(|&(_, weight)| weight).sum()
    }

    pub(crate) fn total_mass(&self) -> usize {
        self.mass.iter().sum()
    }

    fn induced(&self, members: &[usize]) -> Self {
        let mut local = vec![usize::MAX; self.len()];
        for (index, &vertex) in members.iter().enumerate() {
            local[vertex] = index;
        }
        let adj = members
            .iter()
            .map(|&vertex| {
                self.adj[vertex]
                    .iter()
                    .filter(|&&(neighbour, _)| local[neighbour] != usize::MAX)
                    .map(|&(neighbour, weight)| (local[neighbour], weight))
                    .collect()
            })
            .collect();
        Self {
            ids: members.iter().map(|&vertex| self.ids[vertex]).collect(),
            mass: members.iter().map(|&vertex| self.mass[vertex]).collect(),
            adj,
        }
    }
}

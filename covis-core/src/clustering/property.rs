//! Property-based tests for hierarchical scene clustering.
//!
//! Strategies generate varied co-visibility topologies from seeded
//! [`SmallRng`] instances so every failing case is reproducible. Image ids
//! are deliberately non-contiguous to exercise the id-keyed tie-breaking.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Cluster, ClusteringOptions, ImageId, SceneClustering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topology {
    Path,
    BridgedCommunities,
    Sparse,
    Disconnected,
}

#[derive(Debug, Clone)]
struct Fixture {
    pairs: Vec<(ImageId, ImageId)>,
    weights: Vec<i64>,
    options: ClusteringOptions,
}

/// Spreads vertex indices over a non-contiguous id space.
fn image(index: usize) -> ImageId {
    ImageId::new((index as u64) * 3 + 1)
}

fn push(pairs: &mut Vec<(ImageId, ImageId)>, weights: &mut Vec<i64>, a: usize, b: usize, w: i64) {
    pairs.push((image(a), image(b)));
    weights.push(w);
}

fn generate(topology: Topology, seed: u64, options: ClusteringOptions) -> Fixture {
    let mut rng = SmallRng::seed_from_u64(seed);
    let nodes = rng.gen_range(4..40usize);
    let mut pairs = Vec::new();
    let mut weights = Vec::new();
    match topology {
        Topology::Path => {
            for i in 0..nodes - 1 {
                push(&mut pairs, &mut weights, i, i + 1, rng.gen_range(1..100));
            }
        }
        Topology::BridgedCommunities => {
            let half = nodes / 2;
            for (start, end) in [(0, half), (half, nodes)] {
                for i in start..end {
                    for j in (i + 1)..end {
                        if rng.gen_bool(0.6) {
                            push(&mut pairs, &mut weights, i, j, rng.gen_range(10..100));
                        }
                    }
                    if i + 1 < end {
                        push(&mut pairs, &mut weights, i, i + 1, rng.gen_range(10..100));
                    }
                }
            }
            push(&mut pairs, &mut weights, half - 1, half, 1);
        }
        Topology::Sparse => {
            for i in 0..nodes - 1 {
                push(&mut pairs, &mut weights, i, i + 1, rng.gen_range(0..10));
            }
            for i in 0..nodes {
                for j in (i + 2)..nodes {
                    if rng.gen_bool(0.1) {
                        push(&mut pairs, &mut weights, i, j, rng.gen_range(0..10));
                    }
                }
            }
        }
        Topology::Disconnected => {
            let half = nodes / 2;
            for i in 0..half - 1 {
                push(&mut pairs, &mut weights, i, i + 1, rng.gen_range(1..50));
            }
            for i in half..nodes - 1 {
                push(&mut pairs, &mut weights, i, i + 1, rng.gen_range(1..50));
            }
        }
    }
    Fixture {
        pairs,
        weights,
        options,
    }
}

fn topology_strategy() -> impl Strategy<Value = Topology> {
    prop_oneof![
        Just(Topology::Path),
        Just(Topology::BridgedCommunities),
        Just(Topology::Sparse),
        Just(Topology::Disconnected),
    ]
}

fn options_strategy() -> impl Strategy<Value = ClusteringOptions> {
    (2..=4usize, 0..=3usize, 1..=6usize).prop_map(|(branching, image_overlap, leaf_max)| {
        ClusteringOptions {
            branching,
            image_overlap,
            leaf_max_num_images: leaf_max,
        }
    })
}

fn fixture_strategy() -> impl Strategy<Value = Fixture> {
    (topology_strategy(), any::<u64>(), options_strategy())
        .prop_map(|(topology, seed, options)| generate(topology, seed, options))
}

fn build(fixture: &Fixture) -> SceneClustering {
    let mut clustering = SceneClustering::new(fixture.options).expect("generated options are valid");
    clustering
        .partition(&fixture.pairs, &fixture.weights)
        .expect("generated input is valid");
    clustering
}

fn leaf_ids(clustering: &SceneClustering) -> Vec<HashSet<ImageId>> {
    clustering
        .leaf_clusters()
        .iter()
        .map(|leaf| leaf.image_ids().iter().copied().collect())
        .collect()
}

proptest! {
    /// No image is ever lost: the deduplicated union of leaf image sets
    /// equals the root's image set.
    #[test]
    fn leaves_cover_the_root(fixture in fixture_strategy()) {
        let clustering = build(&fixture);
        let root: HashSet<ImageId> = clustering
            .root_cluster()
            .expect("tree was built")
            .image_ids()
            .iter()
            .copied()
            .collect();
        let mut covered = HashSet::new();
        for leaf in leaf_ids(&clustering) {
            covered.extend(leaf);
        }
        prop_assert_eq!(covered, root);
    }

    /// Every leaf respects the size bound. The unsplittable escape valve can
    /// only close clusters smaller than the branching factor, hence the
    /// `branching - 1` floor; either kind of leaf then gains at most
    /// `image_overlap` duplicated images from its creating split.
    #[test]
    fn leaves_respect_the_size_bound(fixture in fixture_strategy()) {
        let clustering = build(&fixture);
        let bound = fixture
            .options
            .leaf_max_num_images
            .max(fixture.options.branching - 1)
            + fixture.options.image_overlap;
        for leaf in clustering.leaf_clusters() {
            prop_assert!(leaf.image_ids().len() <= bound);
        }
    }

    /// With no overlap the leaves partition the image set exactly.
    #[test]
    fn zero_overlap_leaves_are_pairwise_disjoint(fixture in fixture_strategy()) {
        let mut no_overlap = fixture;
        no_overlap.options.image_overlap = 0;
        let clustering = build(&no_overlap);

        let root_len = clustering
            .root_cluster()
            .expect("tree was built")
            .image_ids()
            .len();
        let leaves = leaf_ids(&clustering);
        let total: usize = leaves.iter().map(HashSet::len).sum();
        prop_assert_eq!(total, root_len);
    }

    /// Two runs on identical inputs produce structurally identical trees.
    #[test]
    fn fresh_runs_are_deterministic(fixture in fixture_strategy()) {
        let first = build(&fixture);
        let second = build(&fixture);
        prop_assert_eq!(first.root_cluster(), second.root_cluster());
    }
}

/// Duplicate references would alias tree nodes; the traversal must visit
/// every leaf exactly once even when image ids recur across leaves.
#[test]
fn traversal_never_duplicates_leaf_nodes() {
    let fixture = generate(
        Topology::BridgedCommunities,
        7,
        ClusteringOptions {
            branching: 2,
            image_overlap: 2,
            leaf_max_num_images: 3,
        },
    );
    let clustering = build(&fixture);
    let leaves = clustering.leaf_clusters();
    let unique: HashSet<*const Cluster> = leaves
        .iter()
        .map(|leaf| std::ptr::from_ref(*leaf))
        .collect();
    assert_eq!(unique.len(), leaves.len());
}

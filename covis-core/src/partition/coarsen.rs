//! Graph coarsening by heavy-edge matching.
//!
//! Strongly co-visible vertices are merged first: each vertex pairs with its
//! heaviest unmatched neighbour, so the coarse graph preserves the weak cuts
//! the bisection is looking for. Vertices are visited in ascending image-id
//! order and ties pick the smallest neighbour id, keeping the matching fully
//! deterministic.

use std::collections::BTreeMap;

use crate::graph::ImageId;

use super::CutGraph;

/// Coarsens `graph` one level, returning the coarse graph and the
/// fine-to-coarse vertex mapping.
///
/// Returns `None` when matching cannot shrink the graph (no vertex found a
/// mate), which ends the coarsening phase.
pub(super) fn coarsen(graph: &CutGraph) -> Option<(CutGraph, Vec<usize>)> {
    let n = graph.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by_key(|&vertex| graph.ids[vertex]);

    let mut fine_to_coarse = vec![usize::MAX; n];
    let mut coarse_ids: Vec<ImageId> = Vec::new();
    let mut coarse_mass: Vec<usize> = Vec::new();

    for &vertex in &order {
        if fine_to_coarse[vertex] != usize::MAX {
            continue;
        }
        let mut mate: Option<usize> = None;
        let mut mate_weight = 0i64;
        for &(neighbour, weight) in &graph.adj[vertex] {
            if fine_to_coarse[neighbour] != usize::MAX {
                continue;
            }
            let heavier = weight > mate_weight
                || (weight == mate_weight
                    && mate.is_some_and(|best| graph.ids[neighbour] < graph.ids[best]));
            if mate.is_none() || heavier {
                mate = Some(neighbour);
                mate_weight = weight;
            }
        }

        let coarse = coarse_ids.len();
        fine_to_coarse[vertex] = coarse;
        match mate {
            Some(other) => {
                fine_to_coarse[other] = coarse;
                coarse_ids.push(graph.ids[vertex].min(graph.ids[other]));
                coarse_mass.push(graph.mass[vertex] + graph.mass[other]);
            }
            None => {
                coarse_ids.push(graph.ids[vertex]);
                coarse_mass.push(graph.mass[vertex]);
            }
        }
    }

    if coarse_ids.len() == n {
        return None;
    }

    // Fine edges falling inside one super-vertex disappear; parallel fine
    // edges between two super-vertices sum their weights.
    let mut edges: BTreeMap<(usize, usize), i64> = BTreeMap::new();
    for vertex in 0..n {
        for &(neighbour, weight) in &graph.adj[vertex] {
            let a = fine_to_coarse[vertex];
            let b = fine_to_coarse[neighbour];
            if a < b {
                *edges.entry((a, b)).or_insert(0) += weight;
            }
        }
    }

    let mut adj = vec![Vec::new(); coarse_ids.len()];
    for (&(a, b), &weight) in &edges {
        adj[a].push((b, weight));
        adj[b].push((a, weight));
    }
    for neighbours in &mut adj {
        neighbours.sort_unstable_by_key(|&(neighbour, _)| neighbour);
    }

    let coarse = CutGraph {
        ids: coarse_ids,
        mass: coarse_mass,
        adj,
    };
    Some((coarse, fine_to_coarse))
}

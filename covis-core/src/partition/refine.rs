//! Initial bisection and boundary refinement.
//!
//! The coarsest level is split by greedy seeded growth: starting from the
//! vertex with the highest incident weight, the first side absorbs the
//! unassigned vertex most strongly connected to it until the side holds half
//! the total mass. Refinement then sweeps the vertices in ascending image-id
//! order and applies every move that strictly lowers the bisection score
//! `max(cut/vol(A), cut/vol(B))` while keeping both sides non-empty and the
//! mass within the balance cap.

use super::CutGraph;

/// Side assignment for the vertices of one level; `false` is the seed side.
pub(super) fn initial_split(graph: &CutGraph) -> Vec<bool> {
    let n = graph.len();
    if n < 2 {
        return vec![false; n];
    }

    let seed = (0..n)
        .max_by(|&a, &b| {
            graph
                .degree(a)
                .cmp(&graph.degree(b))
                .then_with(|| graph.ids[b].cmp(&graph.ids[a]))
        })
        .unwrap_or(0);

    let total = graph.total_mass();
    let mut assigned = vec![false; n];
    let mut connection = vec![0i64; n];
    let mut mass = 0usize;
    let mut count = 0usize;

    let mut grow = |vertex: usize,
                    assigned: &mut Vec<bool>,
                    connection: &mut Vec<i64>,
                    mass: &mut usize,
                    count: &mut usize| {
        assigned[vertex] = true;
        *mass += graph.mass[vertex];
        *count += 1;
        for &(neighbour, weight) in &graph.adj[vertex] {
            connection[neighbour] += weight;
        }
    };

    grow(seed, &mut assigned, &mut connection, &mut mass, &mut count);
    while 2 * mass < total && count + 1 < n {
        let next = (0..n)
            .filter(|&vertex| !assigned[vertex])
            .max_by(|&a, &b| {
                connection[a]
                    .cmp(&connection[b])
                    .then_with(|| graph.ids[b].cmp(&graph.ids[a]))
            });
        let Some(next) = next else { break };
        grow(next, &mut assigned, &mut connection, &mut mass, &mut count);
    }

    assigned.iter().map(|&in_seed_side| !in_seed_side).collect()
}

/// Improves `side` in place with local weight-gain moves.
pub(super) fn refine(graph: &CutGraph, side: &mut [bool], passes: usize, balance_epsilon: f64) {
    let n = graph.len();
    if n < 2 {
        return;
    }

    // connection[v][s]: total weight from v to vertices currently on side s
    let mut connection = vec![[0i64; 2]; n];
    for vertex in 0..n {
        for &(neighbour, weight) in &graph.adj[vertex] {
            connection[vertex][usize::from(side[neighbour])] += weight;
        }
    }
    let mut cut: i64 = (0..n)
        .map(|vertex| connection[vertex][usize::from(!side[vertex])])
        .sum::<i64>()
        / 2;
    let mut vol = [0i64; 2];
    let mut mass = [0usize; 2];
    for vertex in 0..n {
        let s = usize::from(side[vertex]);
        vol[s] += graph.degree(vertex);
        mass[s] += graph.mass[vertex];
    }
    let cap = (1.0 + balance_epsilon) * ((mass[0] + mass[1]) as f64) / 2.0;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by_key(|&vertex| graph.ids[vertex]);

    for _ in 0..passes {
        let mut moved = false;
        for &vertex in &order {
            let from = usize::from(side[vertex]);
            let to = 1 - from;
            if mass[from] <= graph.mass[vertex] {
                continue; // the move would empty a side
            }
            if (mass[to] + graph.mass[vertex]) as f64 > cap {
                continue;
            }
            let degree = graph.degree(vertex);
            let new_cut = cut - connection[vertex][to] + connection[vertex][from];
            let mut new_vol = vol;
            new_vol[from] -= degree;
            new_vol[to] += degree;
            if score(new_cut, new_vol[0], new_vol[1]) < score(cut, vol[0], vol[1]) {
                side[vertex] = to == 1;
                cut = new_cut;
                vol = new_vol;
                mass[from] -= graph.mass[vertex];
                mass[to] += graph.mass[vertex];
                for &(neighbour, weight) in &graph.adj[vertex] {
                    connection[neighbour][from] -= weight;
                    connection[neighbour][to] += weight;
                }
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

/// Normalized-cut bisection score: the worse of the two side ratios.
fn score(cut: i64, vol_a: i64, vol_b: i64) -> f64 {
    ratio(cut, vol_a).max(ratio(cut, vol_b))
}

fn ratio(cut: i64, vol: i64) -> f64 {
    if vol == 0 {
        if cut == 0 { 0.0 } else { f64::INFINITY }
    } else {
        cut as f64 / vol as f64
    }
}

//! Flat layered placement.
//!
//! [`SugiyamaLayout`] is the default [`LayeredLayout`]:
//!   1. Cycle breaking (reverse DFS back edges)
//!   2. Rank assignment (longest path from sources)
//!   3. Ordering within ranks (barycenter sweeps, best crossing count kept)
//!   4. Coordinate assignment (variable node sizes, ranks centered)
//!
//! Ties are always broken by input order, so output is deterministic and
//! outline order survives when nothing else decides.

use crate::layout::types::{Direction, Point, Size, Spacing};
use std::collections::{HashMap, HashSet};

/// One node of a flat graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatNode<'a> {
    pub id: &'a str,
    pub size: Size,
}

/// One directed edge of a flat graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatEdge<'a> {
    pub source: &'a str,
    pub target: &'a str,
}

/// Places the nodes of a flat (non-nested) directed graph.
pub trait LayeredLayout {
    /// Returns the center point of every node, keyed by node id.
    ///
    /// Implementations must keep node boxes (center ± half size) disjoint
    /// and must be deterministic. Edges naming unknown ids are ignored.
    fn layout(
        &self,
        nodes: &[FlatNode<'_>],
        edges: &[FlatEdge<'_>],
        direction: Direction,
        spacing: &Spacing,
    ) -> HashMap<String, Point>;
}

/// Sugiyama-style layered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SugiyamaLayout {
    max_sweeps: usize,
}

impl Default for SugiyamaLayout {
    fn default() -> Self {
        Self::new(8)
    }
}

impl SugiyamaLayout {
    pub fn new(max_sweeps: usize) -> Self {
        Self { max_sweeps }
    }
}

impl LayeredLayout for SugiyamaLayout {
    fn layout(
        &self,
        nodes: &[FlatNode<'_>],
        edges: &[FlatEdge<'_>],
        direction: Direction,
        spacing: &Spacing,
    ) -> HashMap<String, Point> {
        if nodes.is_empty() {
            return HashMap::new();
        }

        let graph = FlatGraph::new(nodes, edges);
        let ranks = assign_ranks(&graph);
        let mut layers = build_layers(&ranks);
        minimize_crossings(&mut layers, &graph, self.max_sweeps);
        let centers = assign_coordinates(&layers, nodes, direction, spacing);

        nodes
            .iter()
            .zip(centers)
            .map(|(node, center)| (node.id.to_string(), center))
            .collect()
    }
}

/// Acyclic adjacency over node indices.
struct FlatGraph {
    n: usize,
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl FlatGraph {
    fn new(nodes: &[FlatNode<'_>], edges: &[FlatEdge<'_>]) -> Self {
        let n = nodes.len();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (idx, node) in nodes.iter().enumerate() {
            index.entry(node.id).or_insert(idx);
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(edges.len());
        for edge in edges {
            let (Some(&u), Some(&v)) = (index.get(edge.source), index.get(edge.target)) else {
                continue;
            };
            if u != v && seen.insert((u, v)) {
                resolved.push((u, v));
            }
        }

        let acyclic = break_cycles(n, &resolved);
        let mut succ = vec![Vec::new(); n];
        let mut pred = vec![Vec::new(); n];
        for (u, v) in acyclic {
            succ[u].push(v);
            pred[v].push(u);
        }
        Self { n, succ, pred }
    }
}

/// Reverses DFS back edges so the edge set becomes a DAG.
///
/// DFS roots and edge order follow input order. Reversed edges that
/// duplicate an existing edge are merged.
fn break_cycles(n: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    const UNVISITED: u8 = 0;
    const ON_STACK: u8 = 1;
    const DONE: u8 = 2;

    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (edge_idx, &(u, _)) in edges.iter().enumerate() {
        out_edges[u].push(edge_idx);
    }

    let mut state = vec![UNVISITED; n];
    let mut reversed = vec![false; edges.len()];
    for start in 0..n {
        if state[start] != UNVISITED {
            continue;
        }
        state[start] = ON_STACK;
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(top) = stack.last_mut() {
            let (node, cursor) = *top;
            if let Some(&edge_idx) = out_edges[node].get(cursor) {
                top.1 += 1;
                let target = edges[edge_idx].1;
                match state[target] {
                    UNVISITED => {
                        state[target] = ON_STACK;
                        stack.push((target, 0));
                    }
                    ON_STACK => reversed[edge_idx] = true,
                    _ => {}
                }
            } else {
                state[node] = DONE;
                stack.pop();
            }
        }
    }

    let mut seen = HashSet::new();
    edges
        .iter()
        .zip(reversed)
        .map(|(&(u, v), flip)| if flip { (v, u) } else { (u, v) })
        .filter(|pair| seen.insert(*pair))
        .collect()
}

/// Longest-path layering: sources get rank 0, every other node one more
/// than its deepest predecessor.
fn assign_ranks(graph: &FlatGraph) -> Vec<usize> {
    let mut in_degree: Vec<usize> = graph.pred.iter().map(Vec::len).collect();
    let mut queue: Vec<usize> = (0..graph.n).filter(|&v| in_degree[v] == 0).collect();
    let mut ranks = vec![0usize; graph.n];

    let mut head = 0;
    while head < queue.len() {
        let u = queue[head];
        head += 1;
        for &v in &graph.succ[u] {
            ranks[v] = ranks[v].max(ranks[u] + 1);
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                queue.push(v);
            }
        }
    }
    ranks
}

fn build_layers(ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers = vec![Vec::new(); depth];
    for (v, &rank) in ranks.iter().enumerate() {
        layers[rank].push(v);
    }
    layers
}

fn positions(layers: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut pos = vec![0usize; n];
    for layer in layers {
        for (order, &v) in layer.iter().enumerate() {
            pos[v] = order;
        }
    }
    pos
}

/// Reorders one layer by the mean position of each node's neighbours.
///
/// Nodes without neighbours keep their current slot as key; the sort is
/// stable, so ties keep the current order.
fn reorder_layer(layer: &mut [usize], neighbours: &[Vec<usize>], pos: &[usize]) {
    let mut keyed: Vec<(f64, usize)> = layer
        .iter()
        .enumerate()
        .map(|(slot, &v)| {
            let adjacent = &neighbours[v];
            let key = if adjacent.is_empty() {
                slot as f64
            } else {
                adjacent.iter().map(|&u| pos[u] as f64).sum::<f64>() / adjacent.len() as f64
            };
            (key, v)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (slot, (_, v)) in keyed.into_iter().enumerate() {
        layer[slot] = v;
    }
}

fn count_crossings(layers: &[Vec<usize>], graph: &FlatGraph) -> usize {
    let pos = positions(layers, graph.n);
    let mut total = 0;
    for pair in layers.windows(2) {
        let next: HashSet<usize> = pair[1].iter().copied().collect();
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for &u in &pair[0] {
            for &v in &graph.succ[u] {
                if next.contains(&v) {
                    segments.push((pos[u], pos[v]));
                }
            }
        }
        for (i, &(a1, b1)) in segments.iter().enumerate() {
            for &(a2, b2) in &segments[i + 1..] {
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    total += 1;
                }
            }
        }
    }
    total
}

/// Alternating down/up barycenter sweeps; keeps the best ordering seen and
/// stops at the first sweep that does not improve it.
fn minimize_crossings(layers: &mut Vec<Vec<usize>>, graph: &FlatGraph, max_sweeps: usize) {
    if layers.len() <= 1 {
        return;
    }

    let mut best = layers.clone();
    let mut best_crossings = count_crossings(layers, graph);
    for _ in 0..max_sweeps {
        if best_crossings == 0 {
            break;
        }
        for r in 1..layers.len() {
            let pos = positions(layers, graph.n);
            reorder_layer(&mut layers[r], &graph.pred, &pos);
        }
        for r in (0..layers.len() - 1).rev() {
            let pos = positions(layers, graph.n);
            reorder_layer(&mut layers[r], &graph.succ, &pos);
        }

        let crossings = count_crossings(layers, graph);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        } else {
            break;
        }
    }
    *layers = best;
}

/// Converts layers into node centers.
///
/// Rank thickness is the largest node extent along the flow axis. Nodes in
/// one rank are packed with `node_sep` gaps and the rank is centered on the
/// widest one.
fn assign_coordinates(
    layers: &[Vec<usize>],
    nodes: &[FlatNode<'_>],
    direction: Direction,
    spacing: &Spacing,
) -> Vec<Point> {
    let (flow_extent, cross_extent): (fn(Size) -> f64, fn(Size) -> f64) = match direction {
        Direction::TopToBottom => (|size| size.height, |size| size.width),
        Direction::LeftToRight => (|size| size.width, |size| size.height),
    };

    let spans: Vec<f64> = layers
        .iter()
        .map(|layer| {
            let total: f64 = layer.iter().map(|&v| cross_extent(nodes[v].size)).sum();
            total + spacing.node_sep * layer.len().saturating_sub(1) as f64
        })
        .collect();
    let widest = spans.iter().copied().fold(0.0_f64, f64::max);

    let mut centers = vec![Point::default(); nodes.len()];
    let mut rank_start = spacing.margin;
    for (layer, span) in layers.iter().zip(&spans) {
        let thickness = layer
            .iter()
            .map(|&v| flow_extent(nodes[v].size))
            .fold(0.0_f64, f64::max);
        let flow_center = rank_start + thickness / 2.0;

        let mut cursor = spacing.margin + (widest - span) / 2.0;
        for &v in layer {
            let extent = cross_extent(nodes[v].size);
            let cross_center = cursor + extent / 2.0;
            centers[v] = match direction {
                Direction::TopToBottom => Point::new(cross_center, flow_center),
                Direction::LeftToRight => Point::new(flow_center, cross_center),
            };
            cursor += extent + spacing.node_sep;
        }
        rank_start += thickness + spacing.rank_sep;
    }
    centers
}

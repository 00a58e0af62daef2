//! Recursive containment layout.
//!
//! Two passes over the containment tree:
//! - sizing, post-order: leaves get the default size, single-child groups
//!   wrap their child with margins, larger groups run one flat layered pass
//!   over their children and wrap the resulting bounding box;
//! - placement, pre-order: one flat pass over the roots, then every child is
//!   offset from its parent's absolute corner by the layout recorded while
//!   sizing.
//!
//! Each group's flat graph is built exactly once.

use crate::layout::layered::{FlatEdge, FlatNode, LayeredLayout, SugiyamaLayout};
use crate::layout::types::{
    Direction, Layout, LayoutConfig, LayoutEdge, NodeSpec, Point, PositionedNode, Size, Spacing,
};
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Instant;

/// Edges grouped by the container their endpoints share (`None` = roots).
type ContainerEdges = HashMap<Option<usize>, Vec<(usize, usize)>>;

/// Computes sizes and positions for a containment tree with cross edges.
pub struct LayoutEngine {
    config: LayoutConfig,
    layered: Box<dyn LayeredLayout>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    /// Creates an engine backed by [`SugiyamaLayout`].
    pub fn new(config: LayoutConfig) -> Self {
        let layered = SugiyamaLayout::new(config.max_ordering_sweeps);
        Self::with_layered(config, Box::new(layered))
    }

    /// Creates an engine with a custom flat layered primitive.
    pub fn with_layered(config: LayoutConfig, layered: Box<dyn LayeredLayout>) -> Self {
        Self { config, layered }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs a full layout.
    ///
    /// # Contract
    /// - Output nodes keep input order; nodes on a parent cycle are omitted.
    /// - A node whose parent id is unknown is laid out as a root.
    /// - Edges between different containers, self-loops and edges with
    ///   unknown endpoints are returned in `dropped_edges` and ignored.
    pub fn layout(&self, nodes: &[NodeSpec], edges: &[LayoutEdge], direction: Direction) -> Layout {
        let started_at = Instant::now();
        let tree = Containment::build(nodes);
        let (container_edges, dropped_edges) = tree.partition_edges(edges);

        let post_order = tree.post_order();
        let mut sizes = vec![Size::default(); tree.len()];
        let mut offsets = vec![Point::default(); tree.len()];
        for &idx in &post_order {
            self.size_group(idx, &tree, &container_edges, direction, &mut sizes, &mut offsets);
        }

        let mut absolute = vec![Point::default(); tree.len()];
        let root_centers = self.flat_layout(
            &tree,
            &tree.roots,
            container_edges.get(&None),
            &sizes,
            direction,
            &self.config.root_spacing,
        );
        for (&root, center) in tree.roots.iter().zip(root_centers) {
            absolute[root] = Point::new(
                center.x - sizes[root].width / 2.0,
                center.y - sizes[root].height / 2.0,
            );
        }
        // Reversed post-order visits every parent before its children.
        for &idx in post_order.iter().rev() {
            if let Some(parent) = tree.parent[idx] {
                absolute[idx] = absolute[parent].offset(offsets[idx]);
            }
        }

        let positioned: Vec<PositionedNode> = (0..tree.len())
            .filter(|&idx| tree.reachable[idx])
            .map(|idx| PositionedNode {
                id: tree.ids[idx].to_string(),
                parent_id: tree.parent[idx].map(|parent| tree.ids[parent].to_string()),
                size: sizes[idx],
                position: if tree.parent[idx].is_some() {
                    offsets[idx]
                } else {
                    absolute[idx]
                },
                absolute: absolute[idx],
            })
            .collect();

        debug!(
            "event=layout_run module=layout status=ok direction={} nodes={} edges={} dropped_edges={} duration_us={}",
            direction,
            positioned.len(),
            edges.len(),
            dropped_edges.len(),
            started_at.elapsed().as_micros()
        );

        Layout {
            nodes: positioned,
            dropped_edges,
        }
    }

    /// Sizes `idx` from its already-sized children and records each child's
    /// offset from `idx`'s top-left corner.
    fn size_group(
        &self,
        idx: usize,
        tree: &Containment<'_>,
        container_edges: &ContainerEdges,
        direction: Direction,
        sizes: &mut [Size],
        offsets: &mut [Point],
    ) {
        let config = &self.config;
        let margin = config.side_margin;
        let children = &tree.children[idx];

        match children.as_slice() {
            [] => sizes[idx] = config.leaf_size(),
            [only] => {
                let child = sizes[*only];
                sizes[idx] = Size::new(
                    child.width + 2.0 * margin,
                    child.height + margin + config.top_margin,
                );
                offsets[*only] = Point::new(margin, config.top_margin);
            }
            _ => {
                let centers = self.flat_layout(
                    tree,
                    children,
                    container_edges.get(&Some(idx)),
                    sizes,
                    direction,
                    &config.group_spacing,
                );

                let corners: Vec<Point> = children
                    .iter()
                    .zip(&centers)
                    .map(|(&child, center)| {
                        Point::new(
                            center.x - sizes[child].width / 2.0,
                            center.y - sizes[child].height / 2.0,
                        )
                    })
                    .collect();

                let mut min_x = f64::INFINITY;
                let mut min_y = f64::INFINITY;
                let mut max_x = f64::NEG_INFINITY;
                let mut max_y = f64::NEG_INFINITY;
                for (&child, corner) in children.iter().zip(&corners) {
                    min_x = min_x.min(corner.x);
                    min_y = min_y.min(corner.y);
                    max_x = max_x.max(corner.x + sizes[child].width);
                    max_y = max_y.max(corner.y + sizes[child].height);
                }

                sizes[idx] = Size::new(
                    config
                        .min_group_width
                        .max(max_x - min_x + 2.0 * margin),
                    config
                        .min_group_height
                        .max(max_y - min_y + margin + config.top_margin),
                );
                for (&child, corner) in children.iter().zip(&corners) {
                    offsets[child] = Point::new(
                        corner.x - min_x + margin,
                        corner.y - min_y + config.top_margin,
                    );
                }
            }
        }
    }

    /// Runs the flat primitive over `members` and returns their centers in
    /// member order.
    fn flat_layout(
        &self,
        tree: &Containment<'_>,
        members: &[usize],
        edges: Option<&Vec<(usize, usize)>>,
        sizes: &[Size],
        direction: Direction,
        spacing: &Spacing,
    ) -> Vec<Point> {
        if members.is_empty() {
            return Vec::new();
        }

        let flat_nodes: Vec<FlatNode<'_>> = members
            .iter()
            .map(|&idx| FlatNode {
                id: tree.ids[idx],
                size: sizes[idx],
            })
            .collect();
        let flat_edges: Vec<FlatEdge<'_>> = edges
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|&(u, v)| FlatEdge {
                        source: tree.ids[u],
                        target: tree.ids[v],
                    })
                    .collect()
            })
            .unwrap_or_default();

        let centers = self
            .layered
            .layout(&flat_nodes, &flat_edges, direction, spacing);
        flat_nodes
            .iter()
            .map(|node| {
                centers.get(node.id).copied().unwrap_or_else(|| {
                    warn!(
                        "event=layout_missing_center module=layout status=skip members={}",
                        members.len()
                    );
                    Point::new(node.size.width / 2.0, node.size.height / 2.0)
                })
            })
            .collect()
    }
}

/// Index-based view of the containment tree.
struct Containment<'a> {
    ids: Vec<&'a str>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    /// `false` for nodes that no root reaches (parent cycles).
    reachable: Vec<bool>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Containment<'a> {
    fn build(nodes: &'a [NodeSpec]) -> Self {
        let mut ids: Vec<&'a str> = Vec::with_capacity(nodes.len());
        let mut parent_ids: Vec<Option<&'a str>> = Vec::with_capacity(nodes.len());
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if index.contains_key(node.id.as_str()) {
                debug!("event=layout_skip module=layout status=skip reason=duplicate_node");
                continue;
            }
            index.insert(node.id.as_str(), ids.len());
            ids.push(node.id.as_str());
            parent_ids.push(node.parent_id.as_deref());
        }

        let n = ids.len();
        let mut parent = vec![None; n];
        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (idx, parent_id) in parent_ids.into_iter().enumerate() {
            match parent_id.and_then(|id| index.get(id).copied()) {
                Some(parent_idx) if parent_idx != idx => {
                    parent[idx] = Some(parent_idx);
                    children[parent_idx].push(idx);
                }
                resolved => {
                    if parent_id.is_some() {
                        debug!(
                            "event=layout_skip module=layout status=skip reason=unknown_parent promoted_to_root=true self_parent={}",
                            resolved.is_some()
                        );
                    }
                    roots.push(idx);
                }
            }
        }

        let mut reachable = vec![false; n];
        let mut stack: Vec<usize> = roots.clone();
        while let Some(idx) = stack.pop() {
            reachable[idx] = true;
            stack.extend(children[idx].iter().copied());
        }
        let unreachable = reachable.iter().filter(|flag| !**flag).count();
        if unreachable > 0 {
            warn!(
                "event=layout_skip module=layout status=skip reason=parent_cycle nodes={unreachable}"
            );
        }

        Self {
            ids,
            parent,
            children,
            roots,
            reachable,
            index,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    /// Children before parents, siblings in input order.
    fn post_order(&self) -> Vec<usize> {
        let mut ordered = Vec::with_capacity(self.len());
        let mut stack: Vec<(usize, bool)> =
            self.roots.iter().rev().map(|&idx| (idx, false)).collect();
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                ordered.push(idx);
                continue;
            }
            stack.push((idx, true));
            stack.extend(self.children[idx].iter().rev().map(|&child| (child, false)));
        }
        ordered
    }

    /// Splits edges into per-container pairs and dropped edges.
    fn partition_edges(&self, edges: &[LayoutEdge]) -> (ContainerEdges, Vec<LayoutEdge>) {
        let mut grouped: ContainerEdges = HashMap::new();
        let mut dropped = Vec::new();
        for edge in edges {
            let source = self.index.get(edge.source.as_str()).copied();
            let target = self.index.get(edge.target.as_str()).copied();
            match (source, target) {
                (Some(u), Some(v))
                    if u != v
                        && self.reachable[u]
                        && self.reachable[v]
                        && self.parent[u] == self.parent[v] =>
                {
                    grouped.entry(self.parent[u]).or_default().push((u, v));
                }
                _ => {
                    debug!(
                        "event=layout_skip module=layout status=skip reason=non_local_edge edge_id={}",
                        edge.id
                    );
                    dropped.push(edge.clone());
                }
            }
        }
        (grouped, dropped)
    }
}

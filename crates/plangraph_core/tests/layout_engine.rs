use plangraph_core::layout::{
    Direction, Layout, LayoutConfig, LayoutEdge, LayoutEngine, NodeSpec, PositionedNode, Rect,
};

fn content_box(group: &PositionedNode, config: &LayoutConfig) -> Rect {
    let outer = group.rect();
    Rect {
        x: outer.x + config.side_margin,
        y: outer.y + config.top_margin,
        width: outer.width - 2.0 * config.side_margin,
        height: outer.height - config.side_margin - config.top_margin,
    }
}

fn assert_containment_and_no_overlap(layout: &Layout, config: &LayoutConfig) {
    for node in &layout.nodes {
        if let Some(parent_id) = &node.parent_id {
            let parent = layout.node(parent_id).unwrap();
            assert!(
                content_box(parent, config).contains(&node.rect()),
                "{} escapes {}",
                node.id,
                parent_id
            );
            assert_eq!(node.absolute.x, parent.absolute.x + node.position.x);
            assert_eq!(node.absolute.y, parent.absolute.y + node.position.y);
        }
    }
    for (i, a) in layout.nodes.iter().enumerate() {
        for b in &layout.nodes[i + 1..] {
            if a.parent_id == b.parent_id {
                assert!(!a.rect().intersects(&b.rect()), "{} overlaps {}", a.id, b.id);
            }
        }
    }
}

fn nested_fixture() -> (Vec<NodeSpec>, Vec<LayoutEdge>) {
    let nodes = vec![
        NodeSpec::root("plan"),
        NodeSpec::child("design", "plan"),
        NodeSpec::child("build", "plan"),
        NodeSpec::child("ship", "plan"),
        NodeSpec::child("api", "build"),
        NodeSpec::child("ui", "build"),
        NodeSpec::child("docs", "ship"),
        NodeSpec::root("retro"),
        NodeSpec::root("party"),
    ];
    let edges = vec![
        LayoutEdge::new("e1", "design", "build"),
        LayoutEdge::new("e2", "build", "ship"),
        LayoutEdge::new("e3", "api", "ui"),
        LayoutEdge::new("e4", "plan", "retro"),
        LayoutEdge::new("e5", "retro", "plan"),
    ];
    (nodes, edges)
}

#[test]
fn group_with_three_children_wraps_their_bounding_box() {
    let config = LayoutConfig::default();
    let nodes = vec![
        NodeSpec::root("g"),
        NodeSpec::child("a", "g"),
        NodeSpec::child("b", "g"),
        NodeSpec::child("c", "g"),
    ];
    let edges = vec![
        LayoutEdge::new("ab", "a", "b"),
        LayoutEdge::new("ac", "a", "c"),
    ];
    let layout = LayoutEngine::new(config.clone()).layout(&nodes, &edges, Direction::TopToBottom);

    let group = layout.node("g").unwrap();
    let children: Vec<&PositionedNode> = ["a", "b", "c"]
        .iter()
        .map(|id| layout.node(id).unwrap())
        .collect();
    let min_x = children.iter().map(|n| n.absolute.x).fold(f64::INFINITY, f64::min);
    let min_y = children.iter().map(|n| n.absolute.y).fold(f64::INFINITY, f64::min);
    let max_x = children.iter().map(|n| n.rect().right()).fold(f64::NEG_INFINITY, f64::max);
    let max_y = children.iter().map(|n| n.rect().bottom()).fold(f64::NEG_INFINITY, f64::max);

    assert!(group.size.width >= max_x - min_x + 2.0 * config.side_margin);
    assert!(group.size.height >= max_y - min_y + config.side_margin + config.top_margin);
    assert!(layout.dropped_edges.is_empty());
    assert_containment_and_no_overlap(&layout, &config);

    // `a` feeds both others, so it sits on its own rank above them.
    let a = layout.node("a").unwrap();
    assert!(layout.node("b").unwrap().absolute.y > a.absolute.y);
    assert_eq!(layout.node("b").unwrap().absolute.y, layout.node("c").unwrap().absolute.y);
}

#[test]
fn nested_tree_keeps_containment_in_both_directions() {
    let config = LayoutConfig::default();
    let engine = LayoutEngine::new(config.clone());
    let (nodes, edges) = nested_fixture();

    for direction in [Direction::TopToBottom, Direction::LeftToRight] {
        let layout = engine.layout(&nodes, &edges, direction);
        assert_eq!(layout.nodes.len(), nodes.len());
        assert!(layout.dropped_edges.is_empty());
        assert_containment_and_no_overlap(&layout, &config);
    }
}

#[test]
fn output_follows_input_order() {
    let (nodes, edges) = nested_fixture();
    let layout = LayoutEngine::default().layout(&nodes, &edges, Direction::TopToBottom);
    let ids: Vec<&str> = layout.nodes.iter().map(|node| node.id.as_str()).collect();
    let expected: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, expected);
}

#[test]
fn layout_is_idempotent() {
    let (nodes, edges) = nested_fixture();
    let engine = LayoutEngine::default();
    let first = engine.layout(&nodes, &edges, Direction::LeftToRight);
    let second = engine.layout(&nodes, &edges, Direction::LeftToRight);
    assert_eq!(first, second);
}

#[test]
fn cross_level_edges_are_reported_and_ignored() {
    let (nodes, mut edges) = nested_fixture();
    let engine = LayoutEngine::default();
    let baseline = engine.layout(&nodes, &edges, Direction::TopToBottom);

    edges.push(LayoutEdge::new("bad1", "api", "docs"));
    edges.push(LayoutEdge::new("bad2", "design", "retro"));
    let layout = engine.layout(&nodes, &edges, Direction::TopToBottom);

    let dropped: Vec<&str> = layout.dropped_edges.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(dropped, vec!["bad1", "bad2"]);
    assert_eq!(layout.nodes, baseline.nodes);
}

#[test]
fn custom_spacing_changes_leaf_sizes() {
    let config = LayoutConfig {
        leaf_width: 120.0,
        leaf_height: 30.0,
        ..LayoutConfig::default()
    };
    let (nodes, edges) = nested_fixture();
    let layout = LayoutEngine::new(config.clone()).layout(&nodes, &edges, Direction::TopToBottom);
    let docs = layout.node("docs").unwrap();
    assert_eq!(docs.size.width, 120.0);
    assert_eq!(docs.size.height, 30.0);
    assert_containment_and_no_overlap(&layout, &config);
}

use super::*;
use crate::model::{Connection, Element};

fn build(
    elements: &[(&str, ElementKind)],
    connections: &[(&str, &str)],
    config: &Config,
) -> (Graph, Vec<NodeIndex>) {
    let model = NetworkModel::new(
        elements
            .iter()
            .map(|&(id, kind)| Element::new(id, kind))
            .collect(),
        connections
            .iter()
            .map(|&(a, b)| Connection::new(a, b))
            .collect(),
        vec![],
    )
    .unwrap();
    build_graph(&model, config).unwrap()
}

#[test]
fn builds_symmetric_adjacency() {
    let (graph, roots) = build(
        &[
            ("S", ElementKind::System),
            ("B1", ElementKind::Bus),
            ("L1", ElementKind::OverheadLine),
            ("B2", ElementKind::Bus),
        ],
        &[("S", "B1"), ("B1", "L1"), ("L1", "B2")],
        &Config::default(),
    );
    assert!(graph.is_symmetric());
    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(roots, vec![0]);
    let b1 = graph.resolve("B1").unwrap();
    assert_eq!(
        graph.neighbors(b1).collect::<Vec<_>>(),
        graph.indices(&["S", "L1"])
    );
    assert_eq!(graph.kind(b1), Some(ElementKind::Bus));
}

#[test]
fn keeps_parallel_connections() {
    let elements = [("A", ElementKind::Bus), ("B", ElementKind::Bus)];
    let connections = [("A", "B"), ("B", "A")];

    let (graph, _) = build(&elements, &connections, &Config::default());
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.degree(0), 2);
    assert!(graph.is_symmetric());

    let config = Config {
        dedup_connections: true,
        ..Default::default()
    };
    let (graph, _) = build(&elements, &connections, &config);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.degree(1), 1);
}

#[test]
fn resolve_unknown_node() {
    let graph = Graph::from_literal(&[("A", &[])]);
    assert_eq!(
        graph.resolve("Z"),
        Err(TopologyError::NodeNotFound("Z".to_string()))
    );
}

#[test]
fn declared_roots_come_first() {
    let model = NetworkModel::new(
        vec![
            Element::new("S", ElementKind::System),
            Element::new("G", ElementKind::Generator),
            Element::new("B", ElementKind::Bus),
        ],
        vec![Connection::new("S", "B"), Connection::new("G", "B")],
        vec!["G".to_string(), "S".to_string()],
    )
    .unwrap();
    let (graph, roots) = build_graph(&model, &Config::default()).unwrap();
    assert_eq!(graph.path_ids(&roots), vec!["G", "S"]);
}

#[test]
fn root_fallback_policies() {
    let elements = [
        ("C", ElementKind::Bus),
        ("A", ElementKind::Bus),
        ("B", ElementKind::Load),
        ("D", ElementKind::Bus),
    ];
    let connections = [("C", "A"), ("A", "B")];

    let (graph, roots) = build(&elements, &connections, &Config::default());
    assert_eq!(roots, vec![0, 1, 2, 3]);

    let config = Config {
        root_fallback: RootFallback::ComponentMinimum,
        ..Default::default()
    };
    let (_, roots) = build(&elements, &connections, &config);
    assert_eq!(graph.path_ids(&roots), vec!["A", "D"]);

    let config = Config {
        root_fallback: RootFallback::None,
        ..Default::default()
    };
    let (_, roots) = build(&elements, &connections, &config);
    assert!(roots.is_empty());
}

#[test]
fn components_and_statistics() {
    let graph = Graph::from_literal(&[
        ("A", &["B"]),
        ("B", &["A", "C"]),
        ("C", &["B"]),
        ("D", &[]),
        ("E", &["F"]),
        ("F", &["E"]),
    ]);
    assert_eq!(
        graph.connected_components(),
        vec![vec![0, 1, 2], vec![3], vec![4, 5]]
    );
    let stats = graph.statistics();
    assert_eq!(
        stats,
        GraphStatistics {
            total_nodes: 6,
            total_edges: 3,
            isolated_nodes: 1,
            min_degree: 0,
            avg_degree: 1.0,
            max_degree: 2,
            components: 3,
            largest_component: 3,
        }
    );
}

#[test]
fn empty_graph_statistics() {
    let stats = Graph::default().statistics();
    assert_eq!(stats.total_nodes, 0);
    assert_eq!(stats.components, 0);
    assert_eq!(stats.avg_degree, 0.0);
}

#[test]
fn adjacency_preserves_order_and_multiplicity() {
    let graph = Graph::from_literal(&[
        ("A", &["C", "B", "B"]),
        ("B", &["A", "A"]),
        ("C", &["A"]),
    ]);
    assert!(graph.is_symmetric());
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![2, 1, 1]);
    let edges: Vec<EdgeIndex> = graph.adjacent(1).iter().map(|adj| adj.edge).collect();
    assert_eq!(edges.len(), 2);
    assert_ne!(edges[0], edges[1]);
}

#[test]
fn rejects_asymmetric_adjacency() {
    let entries = vec![
        ("A".to_string(), vec!["B".to_string()]),
        ("B".to_string(), vec![]),
    ];
    assert!(matches!(
        Graph::from_adjacency(&entries),
        Err(TopologyError::MalformedModel(_))
    ));

    let entries = vec![
        ("A".to_string(), vec!["B".to_string(), "B".to_string()]),
        ("B".to_string(), vec!["A".to_string()]),
    ];
    assert!(matches!(
        Graph::from_adjacency(&entries),
        Err(TopologyError::MalformedModel(_))
    ));

    let entries = vec![("A".to_string(), vec!["X".to_string()])];
    assert!(matches!(
        Graph::from_adjacency(&entries),
        Err(TopologyError::MalformedModel(_))
    ));
}

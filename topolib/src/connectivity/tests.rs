use super::*;
use crate::utils::sorted_intersection;

fn ids(graph: &Graph, nodes: &[NodeIndex]) -> Vec<String> {
    graph.path_ids(nodes)
}

#[test]
fn disjoint_roots() {
    let graph = Graph::from_literal(&[("A", &["B"]), ("B", &["A", "C"]), ("C", &["B"]), ("D", &[])]);
    let report = analyze(&graph, &graph.indices(&["A", "D"]));

    assert_eq!(report.classes.len(), 2);
    assert_eq!(ids(&graph, &report.classes[0].roots), vec!["A"]);
    assert_eq!(ids(&graph, &report.classes[0].reachable), vec!["A", "B", "C"]);
    assert_eq!(ids(&graph, &report.classes[1].roots), vec!["D"]);
    assert_eq!(ids(&graph, &report.classes[1].reachable), vec!["D"]);
    assert!(report.classes.iter().all(|c| c.bridges.is_empty() && c.links.is_empty()));
    assert!(report.orphans.is_empty());
    assert!(!report.connected(0, 3));
}

#[test]
fn orphans() {
    let graph = Graph::from_literal(&[("A", &["B"]), ("B", &["A"]), ("X", &[])]);
    let report = analyze(&graph, &graph.indices(&["A"]));
    assert_eq!(ids(&graph, &report.orphans), vec!["X"]);
    assert_eq!(report.classes.len(), 1);
}

#[test]
fn bridged_roots_form_one_class() {
    // S1 - B1 - L - B2 - S2, and S3 hanging off its own bus
    let graph = Graph::from_literal(&[
        ("S1", &["B1"]),
        ("B1", &["S1", "L"]),
        ("L", &["B1", "B2"]),
        ("B2", &["L", "S2"]),
        ("S2", &["B2"]),
        ("S3", &["B3"]),
        ("B3", &["S3"]),
    ]);
    let report = analyze(&graph, &graph.indices(&["S1", "S2", "S3"]));

    assert_eq!(report.classes.len(), 2);
    let class = &report.classes[0];
    assert_eq!(ids(&graph, &class.roots), vec!["S1", "S2"]);
    assert_eq!(ids(&graph, &class.bridges), vec!["B1", "L", "B2"]);
    assert_eq!(class.links.len(), 1);
    let link = &class.links[0];
    assert_eq!(ids(&graph, &[link.from, link.to]), vec!["S1", "S2"]);
    assert_eq!(
        ids(&graph, link.path.as_ref().unwrap()),
        vec!["S1", "B1", "L", "B2", "S2"]
    );
    assert_eq!(link.meeting.len(), 5);
    assert!(report.connected(graph.find("S1").unwrap(), graph.find("S2").unwrap()));
    assert_eq!(report.linked_classes().count(), 1);
    assert_eq!(ids(&graph, &report.classes[1].roots), vec!["S3"]);
}

#[test]
fn service_areas_stop_at_other_roots() {
    // S1 - X - S2 - Y - S3
    let graph = Graph::from_literal(&[
        ("S1", &["X"]),
        ("X", &["S1", "S2"]),
        ("S2", &["X", "Y"]),
        ("Y", &["S2", "S3"]),
        ("S3", &["Y"]),
    ]);
    let report = analyze(&graph, &graph.indices(&["S1", "S2", "S3"]));
    assert_eq!(ids(&graph, &report.service_areas[0]), vec!["S1", "X", "S2"]);
    assert_eq!(ids(&graph, &report.service_areas[2]), vec!["S2", "Y", "S3"]);
    for i in 0..3 {
        assert_eq!(report.reach(i).len(), 5);
    }

    assert_eq!(report.classes.len(), 1);
    let class = &report.classes[0];
    assert_eq!(class.roots.len(), 3);
    assert_eq!(ids(&graph, &class.bridges), vec!["X", "Y"]);
    let pairs: Vec<(String, String)> = class
        .links
        .iter()
        .map(|l| (graph.id(l.from).to_string(), graph.id(l.to).to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("S1".to_string(), "S2".to_string()),
            ("S1".to_string(), "S3".to_string()),
            ("S2".to_string(), "S3".to_string()),
        ]
    );
    assert_eq!(ids(&graph, &class.links[1].meeting), vec!["S2"]);
}

#[test]
fn reach_continues_past_other_roots() {
    // A - X - B - Y
    let graph = Graph::from_literal(&[
        ("A", &["X"]),
        ("X", &["A", "B"]),
        ("B", &["X", "Y"]),
        ("Y", &["B"]),
    ]);
    let report = analyze(&graph, &graph.indices(&["A", "B"]));
    assert_eq!(ids(&graph, report.reach(0)), vec!["A", "X", "B", "Y"]);
    assert_eq!(ids(&graph, report.reach(1)), vec!["A", "X", "B", "Y"]);
    assert_eq!(ids(&graph, &report.service_areas[0]), vec!["A", "X", "B"]);

    let class = &report.classes[0];
    assert_eq!(ids(&graph, &class.bridges), vec!["X", "Y"]);
    assert_eq!(class.links.len(), 1);
    assert_eq!(ids(&graph, &class.links[0].meeting), vec!["A", "X", "B"]);
    assert_eq!(
        ids(&graph, class.links[0].path.as_ref().unwrap()),
        vec!["A", "X", "B"]
    );
}

#[test]
fn classes_partition_roots() {
    let graph = Graph::from_literal(&[
        ("A", &["B"]),
        ("B", &["A", "C"]),
        ("C", &["B", "D"]),
        ("D", &["C"]),
        ("E", &["F"]),
        ("F", &["E"]),
        ("G", &[]),
    ]);
    let roots = graph.indices(&["D", "A", "F", "A", "G"]);
    let report = analyze(&graph, &roots);

    assert_eq!(report.roots.len(), 4);
    let mut members: Vec<NodeIndex> = report
        .classes
        .iter()
        .flat_map(|c| c.roots.iter().copied())
        .collect();
    members.sort_unstable();
    assert_eq!(members, vec![0, 3, 5, 6]);
    for (i, a) in report.classes.iter().enumerate() {
        for b in report.classes.iter().skip(i + 1) {
            assert!(sorted_intersection(&a.reachable, &b.reachable).is_empty());
        }
    }
    for (i, &root) in report.roots.iter().enumerate() {
        assert!(report.reach(i).binary_search(&root).is_ok());
        assert_eq!(report.class_of(root), Some(report.root_class[i]));
    }
    assert_eq!(ids(&graph, &report.classes[0].roots), vec!["D", "A"]);
    assert!(report.orphans.is_empty());
}

#[test]
fn no_roots_means_all_orphans() {
    let graph = Graph::from_literal(&[("A", &["B"]), ("B", &["A"])]);
    let report = analyze(&graph, &[]);
    assert!(report.classes.is_empty());
    assert_eq!(report.orphans, vec![0, 1]);
}

#[test]
fn every_node_as_root_gives_components() {
    let graph = Graph::from_literal(&[
        ("A", &["B"]),
        ("B", &["A", "C"]),
        ("C", &["B"]),
        ("D", &[]),
    ]);
    let roots: Vec<NodeIndex> = (0..graph.node_count()).collect();
    let report = analyze(&graph, &roots);
    let classes: Vec<Vec<NodeIndex>> = report.classes.iter().map(|c| c.roots.clone()).collect();
    assert_eq!(classes, graph.connected_components());
    assert!(report.classes.iter().all(|c| c.bridges.is_empty()));
}

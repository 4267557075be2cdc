//! Input output module.
//!
//! Contains the serialized shapes of network models and of analysis results.
use crate::connectivity::ConnectivityReport;
use crate::graph::Graph;
use crate::model::{deserialize_ids, Connection, Element, ElementId, ElementKind, NetworkModel};
use crate::tree::{Forest, TreeNode, TreeStatistics};
use crate::types::*;
use crate::{Result, TopologyError};

use itertools::Itertools;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

pub mod fs;


/// Electrical node numbers an element is attached to, either a single one or a list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NodeRefs {
    One(i64),
    Many(Vec<i64>),
}

impl NodeRefs {
    pub fn to_vec(&self) -> Vec<i64> {
        match self {
            NodeRefs::One(n) => vec![*n],
            NodeRefs::Many(ns) => ns.clone(),
        }
    }
}

/// A single element as it appears in a model file.
/// Field names of both the plain and the converted format are accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElementRecord {
    /// Only needed when elements are given as a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ElementId>,
    #[serde(rename = "type", alias = "Type", default)]
    pub kind: Option<String>,
    #[serde(alias = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(alias = "Nodes", default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeRefs>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub attributes: serde_json::Value,
}

/// Map keyed by element id that keeps the order of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct IdMap<V>(pub Vec<(String, V)>);

impl<V: Serialize> Serialize for IdMap<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, value) in self.0.iter() {
            map.serialize_entry(id, value)?;
        }
        map.end()
    }
}

fn read_id_map<'de, A, V>(mut access: A) -> std::result::Result<IdMap<V>, A::Error>
where
    A: MapAccess<'de>,
    V: Deserialize<'de>,
{
    let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
    while let Some((id, value)) = access.next_entry::<ElementId, V>()? {
        entries.push((id.0, value));
    }
    Ok(IdMap(entries))
}

struct IdMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for IdMapVisitor<V> {
    type Value = IdMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map keyed by element id")
    }

    fn visit_map<A>(self, access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        read_id_map(access)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for IdMap<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(IdMapVisitor(PhantomData))
    }
}

/// Elements keyed by id, or a list of elements that carry their own id.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementTable {
    Map(IdMap<serde_json::Value>),
    List(Vec<serde_json::Value>),
}

impl Serialize for ElementTable {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ElementTable::Map(map) => map.serialize(serializer),
            ElementTable::List(list) => list.serialize(serializer),
        }
    }
}

struct ElementTableVisitor;

impl<'de> Visitor<'de> for ElementTableVisitor {
    type Value = ElementTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of elements keyed by id, or a list of elements")
    }

    fn visit_map<A>(self, access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        Ok(ElementTable::Map(read_id_map(access)?))
    }

    fn visit_seq<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut list = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(value) = access.next_element::<serde_json::Value>()? {
            list.push(value);
        }
        Ok(ElementTable::List(list))
    }
}

impl<'de> Deserialize<'de> for ElementTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ElementTableVisitor)
    }
}

/// Serialized representation of a network model.
///
/// Connections are either listed explicitly, or given as electrical nodes (`nodes`) that
/// group the ids of the elements attached to them. If neither is present, the electrical nodes
/// are collected from the `Nodes` field of the elements.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ModelFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub elements: ElementTable,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<IdMap<Vec<ElementId>>>,
    #[serde(
        default,
        deserialize_with = "deserialize_ids",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roots: Vec<String>,
}

fn malformed(message: String) -> TopologyError {
    TopologyError::MalformedModel(message)
}

impl ModelFile {
    /// Element records with their ids, in file order.
    fn records(&self) -> Result<Vec<(String, ElementRecord)>> {
        let parse = |value: &serde_json::Value, what: &str| -> Result<ElementRecord> {
            serde_json::from_value(value.clone())
                .map_err(|e| malformed(format!("Cannot parse element {what}: {e}")))
        };
        match &self.elements {
            ElementTable::Map(map) => map
                .0
                .iter()
                .map(|(id, value)| Ok((id.clone(), parse(value, &format!("'{id}'"))?)))
                .collect(),
            ElementTable::List(list) => list
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let record = parse(value, &format!("#{i}"))?;
                    match &record.id {
                        Some(id) => Ok((id.0.clone(), record)),
                        None => Err(malformed(format!("Element #{i} has no id"))),
                    }
                })
                .collect(),
        }
    }

    /// Electrical nodes in file order, each with the ids of the elements attached to it.
    fn electrical_nodes(
        &self,
        records: &[(String, ElementRecord)],
    ) -> Vec<(String, Vec<String>)> {
        if let Some(nodes) = &self.nodes {
            return nodes
                .0
                .iter()
                .map(|(key, members)| {
                    let members: Vec<String> = members.iter().map(|id| id.0.clone()).collect();
                    (key.clone(), members)
                })
                .collect();
        }
        let mut index: HashMap<i64, usize> = HashMap::new();
        let mut nodes: Vec<(String, Vec<String>)> = Vec::new();
        for (id, record) in records.iter() {
            let refs = match &record.nodes {
                Some(refs) => refs.to_vec(),
                None => continue,
            };
            for n in refs {
                let i = *index.entry(n).or_insert_with(|| {
                    nodes.push((n.to_string(), Vec::new()));
                    nodes.len() - 1
                });
                nodes[i].1.push(id.clone());
            }
        }
        nodes
    }

    /// Validate the file contents and turn them into a [`NetworkModel`].
    pub fn into_model(self) -> Result<NetworkModel> {
        let records = self.records()?;
        let mut elements: Vec<Element> = Vec::with_capacity(records.len());
        for (id, record) in records.iter() {
            let kind: ElementKind = match &record.kind {
                Some(kind) => kind.parse()?,
                None => return Err(malformed(format!("Element '{id}' has no type"))),
            };
            elements.push(Element {
                id: id.clone(),
                kind,
                name: record.name.clone(),
                attributes: record.attributes.clone(),
            });
        }

        let mut connections = self.connections.clone();
        if connections.is_empty() {
            let nodes = self.electrical_nodes(&records);
            connections = connect_electrical_nodes(&elements, &nodes)?;
        }
        log::info!(
            "Loaded model with {} elements and {} connections",
            elements.len(),
            connections.len()
        );
        Ok(NetworkModel::new(elements, connections, self.roots)?.with_name(self.name))
    }
}

/// Derive connections from electrical nodes.
///
/// At each electrical node every bus is connected to every other element attached to that node.
/// Two buses at the same node are connected once. Elements attached to a node without a bus stay
/// unconnected there.
pub fn connect_electrical_nodes(
    elements: &[Element],
    nodes: &[(String, Vec<String>)],
) -> Result<Vec<Connection>> {
    let kinds: HashMap<&str, ElementKind> = elements
        .iter()
        .map(|element| (element.id.as_str(), element.kind))
        .collect();
    let mut connections = Vec::new();
    for (key, members) in nodes.iter() {
        let members: Vec<&String> = members.iter().unique().collect();
        let mut is_bus = Vec::with_capacity(members.len());
        for id in members.iter() {
            match kinds.get(id.as_str()) {
                Some(kind) => is_bus.push(*kind == ElementKind::Bus),
                None => {
                    return Err(malformed(format!(
                        "Node '{key}' references unknown element '{id}'"
                    )))
                }
            }
        }
        if members.len() > 1 && !is_bus.iter().any(|&b| b) {
            log::warn!(
                "Node {key} connects {} elements but has no bus, ignoring it",
                members.len()
            );
            continue;
        }
        for ((i, a), (j, b)) in members.iter().enumerate().tuple_combinations() {
            if is_bus[i] || is_bus[j] {
                connections.push(Connection::new(a.as_str(), b.as_str()));
            }
        }
    }
    Ok(connections)
}

/// Ordered adjacency mapping, serialized as a map from node id to neighbor ids.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Adjacency(pub Vec<(String, Vec<String>)>);

impl Serialize for Adjacency {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, neighbors) in self.0.iter() {
            map.serialize_entry(id, neighbors)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Adjacency {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = IdMap::<Vec<ElementId>>::deserialize(deserializer)?;
        Ok(Adjacency(
            map.0
                .into_iter()
                .map(|(id, neighbors)| (id, neighbors.into_iter().map(String::from).collect()))
                .collect(),
        ))
    }
}

/// Serializable form of a built graph and its roots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GraphExport {
    #[serde(deserialize_with = "deserialize_ids")]
    pub nodes: Vec<String>,
    #[serde(deserialize_with = "deserialize_ids")]
    pub roots: Vec<String>,
    pub tree: Adjacency,
}

impl Graph {
    /// Serializable form of this graph with the given roots.
    pub fn to_export(&self, roots: &[NodeIndex]) -> GraphExport {
        GraphExport {
            nodes: self.ids().to_vec(),
            roots: self.path_ids(roots),
            tree: Adjacency(
                (0..self.node_count())
                    .map(|i| {
                        let neighbors = self.neighbors(i).collect_vec();
                        (self.id(i).to_string(), self.path_ids(&neighbors))
                    })
                    .collect(),
            ),
        }
    }

    /// Rebuild a graph and its roots from an export.
    ///
    /// The node list must match the keys of the adjacency mapping, and the adjacency must be
    /// symmetric.
    pub fn from_export(export: &GraphExport) -> Result<(Graph, Vec<NodeIndex>)> {
        if export.nodes.len() != export.tree.0.len()
            || export
                .nodes
                .iter()
                .zip(export.tree.0.iter())
                .any(|(node, (key, _))| node != key)
        {
            return Err(malformed(
                "Node list does not match the adjacency mapping".to_string(),
            ));
        }
        let graph = Graph::from_adjacency(&export.tree.0)?;
        let roots = export
            .roots
            .iter()
            .map(|id| {
                graph
                    .find(id)
                    .ok_or_else(|| malformed(format!("Unknown root '{id}'")))
            })
            .collect::<Result<Vec<NodeIndex>>>()?;
        Ok((graph, roots))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LinkExport {
    pub from: String,
    pub to: String,
    pub meeting: Vec<String>,
    pub path: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassExport {
    pub roots: Vec<String>,
    pub reachable: Vec<String>,
    pub bridges: Vec<String>,
    pub links: Vec<LinkExport>,
}

/// Id-based form of a [`ConnectivityReport`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConnectivityExport {
    pub classes: Vec<ClassExport>,
    pub orphans: Vec<String>,
}

impl ConnectivityExport {
    pub fn new(graph: &Graph, report: &ConnectivityReport) -> Self {
        let classes = report
            .classes
            .iter()
            .map(|class| ClassExport {
                roots: graph.path_ids(&class.roots),
                reachable: graph.path_ids(&class.reachable),
                bridges: graph.path_ids(&class.bridges),
                links: class
                    .links
                    .iter()
                    .map(|link| LinkExport {
                        from: graph.id(link.from).to_string(),
                        to: graph.id(link.to).to_string(),
                        meeting: graph.path_ids(&link.meeting),
                        path: link.path.as_ref().map(|p| graph.path_ids(p)),
                    })
                    .collect(),
            })
            .collect();
        ConnectivityExport {
            classes,
            orphans: graph.path_ids(&report.orphans),
        }
    }
}

/// Nested tree of ids.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TreeExport {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeExport>,
}

impl From<&TreeNode> for TreeExport {
    fn from(node: &TreeNode) -> Self {
        TreeExport {
            id: node.id.clone(),
            children: node.children.iter().map(TreeExport::from).collect(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ExtraEdgeExport {
    pub a: String,
    pub b: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AbsorbedRootExport {
    pub root: String,
    /// Root of the tree that contains it.
    pub tree: String,
}

/// Id-based form of a [`Forest`].
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForestExport {
    pub trees: Vec<TreeExport>,
    #[serde(rename = "extraEdges")]
    pub extra_edges: Vec<ExtraEdgeExport>,
    #[serde(rename = "absorbedRoots")]
    pub absorbed_roots: Vec<AbsorbedRootExport>,
    pub unreachable: Vec<String>,
    pub statistics: Vec<TreeStatistics>,
}

impl ForestExport {
    pub fn new(graph: &Graph, forest: &Forest) -> Self {
        ForestExport {
            trees: forest.trees.iter().map(TreeExport::from).collect(),
            extra_edges: forest
                .extra_edges
                .iter()
                .map(|extra| ExtraEdgeExport {
                    a: graph.id(extra.a).to_string(),
                    b: graph.id(extra.b).to_string(),
                    via: graph.edge(extra.edge).via.clone(),
                })
                .collect(),
            absorbed_roots: forest
                .absorbed_roots
                .iter()
                .map(|&(root, tree)| AbsorbedRootExport {
                    root: graph.id(root).to_string(),
                    tree: graph.id(tree).to_string(),
                })
                .collect(),
            unreachable: graph.path_ids(&forest.unreachable),
            statistics: forest.statistics(),
        }
    }
}

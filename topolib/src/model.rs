//! Element and connection records of an electrical network model.
use crate::{Result, TopologyError};

use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[cfg(not(feature = "hashbrown"))]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "hashbrown")]
use hashbrown::{HashMap, HashSet};

/// Kinds of network elements. Unknown kinds are rejected while loading the model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// Power system equivalent, i.e. an infinite source.
    #[serde(rename = "system")]
    System,
    #[serde(rename = "bus")]
    Bus,
    #[serde(rename = "overhead_line")]
    OverheadLine,
    #[serde(rename = "transformer2")]
    Transformer2,
    /// Two-winding transformer with a tap changer.
    #[serde(rename = "transformer2sw")]
    Transformer2Sw,
    #[serde(rename = "transformer3")]
    Transformer3,
    #[serde(rename = "autotransformer")]
    Autotransformer,
    /// Circuit breaker or disconnector.
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "generator")]
    Generator,
    #[serde(rename = "load")]
    Load,
}

impl ElementKind {
    /// All kinds in declaration order.
    pub const ALL: [ElementKind; 10] = [
        ElementKind::System,
        ElementKind::Bus,
        ElementKind::OverheadLine,
        ElementKind::Transformer2,
        ElementKind::Transformer2Sw,
        ElementKind::Transformer3,
        ElementKind::Autotransformer,
        ElementKind::Switch,
        ElementKind::Generator,
        ElementKind::Load,
    ];

    /// The type tag used in model files.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::System => "system",
            ElementKind::Bus => "bus",
            ElementKind::OverheadLine => "overhead_line",
            ElementKind::Transformer2 => "transformer2",
            ElementKind::Transformer2Sw => "transformer2sw",
            ElementKind::Transformer3 => "transformer3",
            ElementKind::Autotransformer => "autotransformer",
            ElementKind::Switch => "switch",
            ElementKind::Generator => "generator",
            ElementKind::Load => "load",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ElementKind {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        ElementKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TopologyError::MalformedModel(format!("Unknown element type '{s}'")))
    }
}

/// A network component. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    /// Display name, not necessarily unique.
    pub name: Option<String>,
    /// Opaque attributes carried over from the model file.
    pub attributes: serde_json::Value,
}

impl Element {
    /// An element without name and attributes.
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            attributes: serde_json::Value::Null,
        }
    }
}

/// Element id as written in a file.
///
/// Integer ids are accepted as well and kept as their decimal text, so `1` and `"1"` refer to
/// the same element.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl From<ElementId> for String {
    fn from(id: ElementId) -> String {
        id.0
    }
}

struct ElementIdVisitor;

impl<'de> Visitor<'de> for ElementIdVisitor {
    type Value = ElementId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an element id (string or integer)")
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<ElementId, E> {
        Ok(ElementId(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<ElementId, E> {
        Ok(ElementId(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<ElementId, E> {
        Ok(ElementId(v.to_string()))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<ElementId, E> {
        Ok(ElementId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ElementIdVisitor)
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    ElementId::deserialize(deserializer).map(String::from)
}

pub(crate) fn deserialize_optional_id<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ElementId>::deserialize(deserializer)?.map(String::from))
}

pub(crate) fn deserialize_ids<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Vec::<ElementId>::deserialize(deserializer)?;
    Ok(ids.into_iter().map(String::from).collect())
}

/// An unordered physical link between two elements.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Connection {
    #[serde(deserialize_with = "deserialize_id")]
    pub a: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub b: String,
    /// Element that realizes the link, e.g. a switch.
    #[serde(
        default,
        deserialize_with = "deserialize_optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub via: Option<String>,
}

impl Connection {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            via: None,
        }
    }

    pub fn via(mut self, via: impl Into<String>) -> Self {
        self.via = Some(via.into());
        self
    }
}

/// A structurally validated network model.
///
/// Every connection references two distinct known elements, every `via` and every declared root
/// references a known element, and element ids are unique.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    pub name: Option<String>,
    elements: Vec<Element>,
    connections: Vec<Connection>,
    roots: Vec<String>,
    index: HashMap<String, usize>,
}

impl NetworkModel {
    /// Validate the given records and build a model from them.
    pub fn new(
        elements: Vec<Element>,
        connections: Vec<Connection>,
        roots: Vec<String>,
    ) -> Result<Self> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            if element.id.is_empty() {
                return Err(TopologyError::MalformedModel(format!(
                    "Element #{i} has an empty id"
                )));
            }
            if index.insert(element.id.clone(), i).is_some() {
                return Err(TopologyError::MalformedModel(format!(
                    "Duplicate element id '{}'",
                    element.id
                )));
            }
        }

        let check = |id: &str, what: &str| -> Result<()> {
            if index.contains_key(id) {
                Ok(())
            } else {
                Err(TopologyError::MalformedModel(format!(
                    "{what} references unknown element '{id}'"
                )))
            }
        };
        for (i, connection) in connections.iter().enumerate() {
            check(&connection.a, &format!("Connection #{i}"))?;
            check(&connection.b, &format!("Connection #{i}"))?;
            if let Some(via) = &connection.via {
                check(via, &format!("Connection #{i}"))?;
            }
            if connection.a == connection.b {
                return Err(TopologyError::MalformedModel(format!(
                    "Connection #{i} is a self-loop on '{}'",
                    connection.a
                )));
            }
        }
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for root in roots.iter() {
                check(root, "Root list")?;
                if !seen.insert(root.as_str()) {
                    log::debug!("Root '{root}' is declared more than once");
                }
            }
        }

        Ok(Self {
            name: None,
            elements,
            connections,
            roots,
            index,
        })
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Elements in load order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Connections in load order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Roots declared explicitly by the model, independent of element kinds.
    pub fn declared_roots(&self) -> &[String] {
        &self.roots
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&i| &self.elements[i])
    }

    /// Position of an element in [`NetworkModel::elements`].
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, kind: ElementKind) -> Element {
        Element::new(id, kind)
    }

    #[test]
    fn kind_tags() {
        for kind in ElementKind::ALL {
            assert_eq!(kind.as_str().parse::<ElementKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(
            "breaker".parse::<ElementKind>(),
            Err(TopologyError::MalformedModel(
                "Unknown element type 'breaker'".to_string()
            ))
        );
    }

    #[test]
    fn rejects_unknown_endpoint() {
        let result = NetworkModel::new(
            vec![element("A", ElementKind::Bus)],
            vec![Connection::new("A", "B")],
            vec![],
        );
        assert!(matches!(result, Err(TopologyError::MalformedModel(_))));
    }

    #[test]
    fn rejects_unknown_via_and_root() {
        let elements = vec![element("A", ElementKind::Bus), element("B", ElementKind::Bus)];
        let result = NetworkModel::new(
            elements.clone(),
            vec![Connection::new("A", "B").via("S")],
            vec![],
        );
        assert!(matches!(result, Err(TopologyError::MalformedModel(_))));
        let result = NetworkModel::new(elements, vec![], vec!["X".to_string()]);
        assert!(matches!(result, Err(TopologyError::MalformedModel(_))));
    }

    #[test]
    fn rejects_duplicates_and_self_loops() {
        let result = NetworkModel::new(
            vec![element("A", ElementKind::Bus), element("A", ElementKind::Load)],
            vec![],
            vec![],
        );
        assert!(matches!(result, Err(TopologyError::MalformedModel(_))));
        let result = NetworkModel::new(
            vec![element("A", ElementKind::Bus)],
            vec![Connection::new("A", "A")],
            vec![],
        );
        assert!(matches!(result, Err(TopologyError::MalformedModel(_))));
    }

    #[test]
    fn repeated_roots_are_kept() {
        let model = NetworkModel::new(
            vec![element("A", ElementKind::System), element("B", ElementKind::Bus)],
            vec![Connection::new("A", "B")],
            vec!["A".to_string(), "B".to_string(), "A".to_string()],
        )
        .unwrap();
        assert_eq!(model.declared_roots(), ["A", "B", "A"]);
    }

    #[test]
    fn lookup() {
        let model = NetworkModel::new(
            vec![element("A", ElementKind::System), element("B", ElementKind::Bus)],
            vec![Connection::new("A", "B")],
            vec![],
        )
        .unwrap();
        assert_eq!(model.element("B").unwrap().kind, ElementKind::Bus);
        assert_eq!(model.position("A"), Some(0));
        assert!(model.element("C").is_none());
    }
}

//! Analysis configuration.
//!
//! The configuration is built once (usually from a YAML file) and passed explicitly to the graph
//! builder and the path analyzer.
use crate::model::ElementKind;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-kind behavior.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct KindRule {
    /// Elements of this kind are entry points (roots) of the network.
    #[serde(default)]
    pub root: bool,
}

/// Policy for choosing roots when the model tags none.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RootFallback {
    /// Every node becomes its own root candidate. Connectivity classes then coincide with the
    /// connected components of the graph.
    #[default]
    EveryNode,
    /// The node with the smallest id in each connected component.
    ComponentMinimum,
    /// Keep the root set empty. Every node is then reported as an orphan.
    None,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Behavior of each element kind. Kinds missing from this table get the default rule.
    #[serde(default = "default_kinds")]
    pub kinds: BTreeMap<ElementKind, KindRule>,
    #[serde(default, rename = "rootFallback")]
    pub root_fallback: RootFallback,
    /// Maximum number of search steps for exhaustive path enumeration.
    /// Use `None` for no limit.
    #[serde(default, rename = "maxPathSteps")]
    pub max_path_steps: Option<usize>,
    /// Collapse parallel connections between the same pair of elements into one edge.
    #[serde(default, rename = "dedupConnections")]
    pub dedup_connections: bool,
}

fn default_kinds() -> BTreeMap<ElementKind, KindRule> {
    BTreeMap::from([(ElementKind::System, KindRule { root: true })])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kinds: default_kinds(),
            root_fallback: RootFallback::default(),
            max_path_steps: None,
            dedup_connections: false,
        }
    }
}

impl Config {
    /// Rule for the given kind.
    pub fn rule(&self, kind: ElementKind) -> KindRule {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn is_root_kind(&self, kind: ElementKind) -> bool {
        self.rule(kind).root
    }

    /// Read the configuration from a YAML file.
    pub fn read_yaml_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        use std::io::{Error, ErrorKind};

        let content = std::fs::read_to_string(&path)?;
        match serde_yaml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(error) => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Failed to parse config YAML: {error}"),
            )),
        }
    }
}

use super::*;

use topolib::graph::build_graph;
use topolib::io::fs::read_model_file;
use topolib::types::NodeIndex;
use topolib::NetworkModel;

mod connectivity;
pub use connectivity::*;

mod graph;
pub use graph::*;

mod paths;
pub use paths::*;

mod tree;
pub use tree::*;

/// All CLI commands available in this binary.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Build the graph of a model and print its statistics.
    #[command(alias = "g")]
    Graph(Graph),

    /// Enumerate the simple paths between two elements.
    #[command(alias = "p")]
    Paths(Paths),

    /// Print the spanning trees grown from the roots.
    #[command(alias = "t")]
    Tree(Tree),

    /// Report which roots are connected and which elements are orphaned.
    #[command(alias = "c")]
    Connectivity(Connectivity),
}

impl Command {
    pub fn run(self, config: &Config) {
        match self {
            Command::Graph(args) => args.run(config),
            Command::Paths(args) => args.run(config),
            Command::Tree(args) => args.run(config),
            Command::Connectivity(args) => args.run(config),
        }
    }
}

/// Load a model file and build its graph. Exits on failure.
fn load_graph(path: &Path, config: &Config) -> (NetworkModel, topolib::Graph, Vec<NodeIndex>) {
    let file = match read_model_file(path) {
        Ok(x) => x,
        Err(err) => fatal_error!(1, "Cannot read model file: {}", err),
    };
    let model = match file.into_model() {
        Ok(x) => x,
        Err(err) => fatal_error!(1, "Cannot load {}: {}", path.display(), err),
    };
    let (graph, roots) = match build_graph(&model, config) {
        Ok(x) => x,
        Err(err) => fatal_error!(1, "Cannot build graph: {}", err),
    };
    (model, graph, roots)
}

/// Name of the model, falling back to the file name.
fn model_name(model: &NetworkModel, path: &Path) -> String {
    model.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "-".to_string())
    })
}

fn print_json<T: serde::Serialize>(content: &T) {
    match serde_json::to_string_pretty(content) {
        Ok(s) => println!("{s}"),
        Err(err) => fatal_error!(1, "Cannot serialize the result: {}", err),
    }
}

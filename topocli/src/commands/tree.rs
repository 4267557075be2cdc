//! Rooted view of the network.
use super::*;

use topolib::io::ForestExport;
use topolib::tree::build_forest;

#[derive(clap::Args, Debug)]
pub struct Tree {
    /// Path to the model file (JSON or YAML).
    model: PathBuf,
    /// Print the forest as JSON (Hint: redirect stdout)
    #[arg(short, long, default_value_t = false)]
    json: bool,
}

impl Tree {
    pub fn run(self, config: &Config) {
        let (_, graph, roots) = load_graph(&self.model, config);
        let forest = build_forest(&graph, &roots);

        if self.json {
            print_json(&ForestExport::new(&graph, &forest));
            return;
        }

        for (tree, stats) in forest.trees.iter().zip(forest.statistics()) {
            println!(
                "{} {} nodes, depth {}",
                "Tree:".bold(),
                stats.nodes_count,
                stats.depth
            );
            print!("{tree}");
            println!();
        }

        if !forest.extra_edges.is_empty() {
            println!("{}", "Extra edges:".bold());
            for extra in forest.extra_edges.iter() {
                let via = match &graph.edge(extra.edge).via {
                    Some(via) => format!(" (via {via})"),
                    None => String::new(),
                };
                println!("  {} - {}{}", graph.id(extra.a), graph.id(extra.b), via);
            }
        }
        if !forest.absorbed_roots.is_empty() {
            println!("{}", "Roots inside other trees:".bold());
            for &(root, tree) in forest.absorbed_roots.iter() {
                println!("  {} (in tree of {})", graph.id(root), graph.id(tree));
            }
        }
        if !forest.unreachable.is_empty() {
            println!(
                "{} {}",
                "Unreachable:".bold(),
                graph.path_ids(&forest.unreachable).join(", ").yellow()
            );
        }
    }
}

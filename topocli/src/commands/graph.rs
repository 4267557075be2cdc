//! Graph statistics and export.
use super::*;

use topolib::io::fs::save_export;

#[derive(clap::Args, Debug)]
pub struct Graph {
    /// Path to the model file (JSON or YAML).
    model: PathBuf,
    /// Save the graph as JSON into this directory.
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Print the statistics as JSON (Hint: redirect stdout)
    #[arg(short, long, default_value_t = false)]
    json: bool,
}

impl Graph {
    pub fn run(self, config: &Config) {
        let (model, graph, roots) = load_graph(&self.model, config);
        let name = model_name(&model, &self.model);
        let stats = graph.statistics();

        if self.json {
            print_json(&stats);
        } else {
            println!("{:20}{}", "Model:".bold(), name);
            println!("{:20}{}", "Nodes:".bold(), stats.total_nodes);
            println!("{:20}{}", "Edges:".bold(), stats.total_edges);
            println!("{:20}{}", "Isolated nodes:".bold(), stats.isolated_nodes);
            println!(
                "{:20}{} / {:.2} / {}",
                "Degree min/avg/max:".bold(),
                stats.min_degree,
                stats.avg_degree,
                stats.max_degree
            );
            println!("{:20}{}", "Roots:".bold(), graph.path_ids(&roots).join(", "));
            println!(
                "{:20}{} (largest: {})",
                "Components:".bold(),
                stats.components,
                stats.largest_component
            );
            for (i, component) in graph.connected_components().iter().enumerate() {
                println!("{:>18}  {}", i + 1, graph.path_ids(component).join(", "));
            }
        }

        if let Some(dir) = self.out {
            match save_export(&dir, &name, &graph.to_export(&roots)) {
                Ok(path) => println!("{:20}{}", "Saved:".bold(), path.display()),
                Err(err) => fatal_error!(1, "Cannot save the graph: {}", err),
            }
        }
    }
}

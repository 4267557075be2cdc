//! Root connectivity and orphan report.
use super::*;

use topolib::connectivity::analyze;
use topolib::io::ConnectivityExport;

#[derive(clap::Args, Debug)]
pub struct Connectivity {
    /// Path to the model file (JSON or YAML).
    model: PathBuf,
    /// Analyze these roots instead of the ones found in the model.
    #[arg(short, long = "root")]
    roots: Vec<String>,
    /// Print the report as JSON (Hint: redirect stdout)
    #[arg(short, long, default_value_t = false)]
    json: bool,
}

impl Connectivity {
    pub fn run(self, config: &Config) {
        let (_, graph, mut roots) = load_graph(&self.model, config);
        if !self.roots.is_empty() {
            roots = match self
                .roots
                .iter()
                .map(|id| graph.resolve(id))
                .collect::<topolib::Result<Vec<NodeIndex>>>()
            {
                Ok(x) => x,
                Err(err) => fatal_error!(1, "{}", err),
            };
        }
        let report = analyze(&graph, &roots);
        let export = ConnectivityExport::new(&graph, &report);

        if self.json {
            print_json(&export);
            return;
        }

        for (i, class) in export.classes.iter().enumerate() {
            println!(
                "{} {}: {}",
                "Class".bold(),
                i + 1,
                class.roots.join(", ").green()
            );
            println!("  {:12}{} nodes", "Reachable:", class.reachable.len());
            if !class.bridges.is_empty() {
                println!("  {:12}{}", "Bridges:", class.bridges.join(", "));
            }
            for link in class.links.iter() {
                let path = match &link.path {
                    Some(path) => path.join(" -> "),
                    None => "-".to_string(),
                };
                println!("  {} - {}: {}", link.from, link.to, path);
            }
        }
        if export.orphans.is_empty() {
            println!("{}", "No orphans.".bold());
        } else {
            println!(
                "{} {}",
                "Orphans:".bold(),
                export.orphans.join(", ").yellow()
            );
        }
    }
}

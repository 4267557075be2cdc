//! Streaming path enumeration.
use super::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use topolib::paths::{all_simple_paths, shortest_path};
use topolib::TopologyError;

#[derive(clap::Args, Debug)]
pub struct Paths {
    /// Path to the model file (JSON or YAML).
    model: PathBuf,
    /// Id of the first element.
    from: String,
    /// Id of the second element.
    to: String,
    /// Maximum number of search steps, overrides `maxPathSteps` of the config.
    #[arg(short, long)]
    limit: Option<usize>,
}

/// Print a path result, treating an unreachable target as a regular outcome.
fn print_path(label: &str, graph: &topolib::Graph, result: topolib::Result<Vec<NodeIndex>>) {
    match result {
        Ok(path) => println!(
            "{:18}{} ({} hops)",
            label.bold(),
            graph.path_ids(&path).join(" -> "),
            path.len() - 1
        ),
        Err(err @ TopologyError::NoPath { .. }) => println!("{:18}{}", label.bold(), err),
        Err(err @ TopologyError::ResourceExhaustion { .. }) => {
            println!("{:18}{}", label.bold(), err.to_string().yellow())
        }
        Err(err) => fatal_error!(1, "{}", err),
    }
}

impl Paths {
    pub fn run(self, config: &Config) {
        let (_, graph, _) = load_graph(&self.model, config);
        let limit = self.limit.or(config.max_path_steps);
        let no_path = || TopologyError::NoPath {
            from: self.from.clone(),
            to: self.to.clone(),
        };

        // The first Ctrl-C stops the enumeration, the second one exits.
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();
        if let Err(err) = ctrlc::set_handler(move || {
            if flag.swap(true, Ordering::SeqCst) {
                std::process::exit(130);
            }
        }) {
            log::warn!("Cannot install the Ctrl-C handler: {err}");
        }

        let mut paths = match all_simple_paths(&graph, &self.from, &self.to) {
            Ok(paths) => paths.with_limit(limit).with_cancel_flag(interrupted),
            Err(err) => fatal_error!(1, "{}", err),
        };

        let mut count = 0usize;
        // Among paths of equal length the first one found wins.
        let mut longest: Option<Vec<NodeIndex>> = None;
        for path in paths.by_ref() {
            count += 1;
            println!("{:>8}  {}", count, graph.path_ids(&path).join(" -> "));
            if longest.as_ref().map_or(true, |l| path.len() > l.len()) {
                longest = Some(path);
            }
        }
        if paths.is_cancelled() {
            log::warn!("Interrupted after {count} paths");
        }
        println!("{:18}{}", "Paths found:".bold(), count);

        print_path(
            "Shortest path:",
            &graph,
            shortest_path(&graph, &self.from, &self.to).and_then(|p| p.ok_or_else(no_path)),
        );
        if let Some(err) = paths.exhaustion() {
            print_path("Longest path:", &graph, Err(err));
        } else if !paths.is_cancelled() {
            print_path("Longest path:", &graph, longest.ok_or_else(no_path));
        } else if let Some(path) = longest {
            print_path("Longest so far:", &graph, Ok(path));
        }
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Walker CLI entrypoint.
//!
//! Reads an entity-relationship diagram (ERDPlus-style JSON or sectioned
//! text), walks it with the selected strategy, and prints the resulting mode
//! declarations to stdout or a file.
//!
//! # Usage
//! ```text
//! walker [OPTIONS] <DIAGRAM_FILE>
//! ```
//!
//! The strategy flags (`--no-walk`, `--walk`, `--shortest`, `--exhaustive`,
//! `--random`, `--random-walk`) are mutually exclusive; `--walk` is the
//! default. The CLI exits with code `0` on success and non-zero on error.

// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

use walker_core::{
    bind, bind_unwalked, entity_variable, find_all_paths, random_walk, shortest_paths, ModeSet,
    NodeKind, PathsByFeature, Prng,
};
use walker_diagram::Diagram;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Walk entity-relationship diagrams into background modes", long_about = None)]
struct Args {
    /// Diagram file: ERDPlus-style JSON or sectioned text
    diagram_file: PathBuf,

    /// Print intermediate tables and debug events to stderr
    #[clap(short, long)]
    verbose: bool,

    /// Instantiate variables without walking (base case)
    #[clap(long, group = "strategy")]
    no_walk: bool,

    /// Walk the graph from the target to each important feature
    #[clap(short, long, group = "strategy")]
    walk: bool,

    /// Like --walk, but keep only the shortest paths per feature
    #[clap(short, long, group = "strategy")]
    shortest: bool,

    /// Walk between every pair of target and important features (slow)
    #[clap(short, long, group = "strategy")]
    exhaustive: bool,

    /// Walk to a randomly sampled subset of the important features
    #[clap(short, long, group = "strategy")]
    random: bool,

    /// One depth-bounded random walk per important feature
    #[clap(long, group = "strategy")]
    random_walk: bool,

    /// Use only the first N important features (with --random, sample N)
    #[clap(short, long, value_name = "N")]
    number: Option<usize>,

    /// Maximum steps per random walk
    #[clap(long, default_value_t = 10, value_name = "STEPS")]
    depth: usize,

    /// Seed for the deterministic random generator
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Write the mode lines to FILE instead of stdout
    #[clap(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    NoWalk,
    Walk,
    Shortest,
    Exhaustive,
    Random,
    RandomWalk,
}

impl Args {
    fn strategy(&self) -> Strategy {
        if self.no_walk {
            Strategy::NoWalk
        } else if self.shortest {
            Strategy::Shortest
        } else if self.exhaustive {
            Strategy::Exhaustive
        } else if self.random {
            Strategy::Random
        } else if self.random_walk {
            Strategy::RandomWalk
        } else {
            Strategy::Walk
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let input = fs::read_to_string(&args.diagram_file)
        .with_context(|| format!("failed to read {}", args.diagram_file.display()))?;
    let diagram = Diagram::parse(&input)
        .with_context(|| format!("failed to parse {}", args.diagram_file.display()))?;

    let features = select_features(&diagram, &args);
    if args.verbose {
        print_diagram_tables(&diagram, &features);
    }

    let modes = construct_modes(&diagram, &features, &args)?;
    debug!(modes = modes.len(), "constructed mode set");

    let document = modes.render();
    match &args.output {
        Some(path) => {
            let mut contents = document.join("\n");
            contents.push('\n');
            fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            for line in &document {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing subscriber failed")
}

/// Applies `--number` (and, for `--random`, the seeded sample) to the
/// diagram's important features.
fn select_features(diagram: &Diagram, args: &Args) -> Vec<String> {
    let mut features = diagram.importants.clone();
    if args.strategy() == Strategy::Random {
        let mut prng = Prng::from_seed(args.seed);
        let count = args.number.unwrap_or(features.len());
        return prng
            .sample_indices(features.len(), count)
            .into_iter()
            .map(|i| features[i].clone())
            .collect();
    }
    if let Some(count) = args.number {
        features.truncate(count);
    }
    features
}

fn construct_modes(diagram: &Diagram, features: &[String], args: &Args) -> Result<ModeSet> {
    let modes = match args.strategy() {
        Strategy::NoWalk => {
            let feature_set: BTreeSet<String> = features.iter().cloned().collect();
            bind_unwalked(&diagram.target, &feature_set, &diagram.bindings)?
        }
        Strategy::Walk | Strategy::Random => {
            let paths = walk_paths(diagram, features, false);
            bind(&paths, &diagram.target, &diagram.bindings)?
        }
        Strategy::Shortest => {
            let paths = walk_paths(diagram, features, true);
            bind(&paths, &diagram.target, &diagram.bindings)?
        }
        Strategy::Exhaustive => {
            let paths = exhaustive_paths(diagram, features);
            bind(&paths, &diagram.target, &diagram.bindings)?
        }
        Strategy::RandomWalk => {
            let mut prng = Prng::from_seed(args.seed);
            let mut paths = PathsByFeature::new();
            for feature in features {
                let walk = random_walk(&diagram.graph, &diagram.target, args.depth, &mut prng);
                paths.entry(feature.clone()).or_default().push(walk);
            }
            bind(&paths, &diagram.target, &diagram.bindings)?
        }
    };
    Ok(modes)
}

/// All simple paths from the target to each feature, optionally filtered to
/// the shortest per feature.
fn walk_paths(diagram: &Diagram, features: &[String], shortest: bool) -> PathsByFeature {
    features
        .iter()
        .map(|feature| {
            let mut paths = find_all_paths(&diagram.graph, &diagram.target, feature);
            if shortest {
                paths = shortest_paths(paths);
            }
            (feature.clone(), paths)
        })
        .collect()
}

/// Simple paths between every pair drawn from {target} ∪ features, keyed
/// under the pair's later endpoint.
fn exhaustive_paths(diagram: &Diagram, features: &[String]) -> PathsByFeature {
    let mut endpoints = vec![diagram.target.clone()];
    endpoints.extend(features.iter().cloned());
    let mut paths = PathsByFeature::new();
    for (i, from) in endpoints.iter().enumerate() {
        for to in endpoints.iter().skip(i + 1) {
            paths
                .entry(to.clone())
                .or_default()
                .extend(find_all_paths(&diagram.graph, from, to));
        }
    }
    paths
}

fn print_diagram_tables(diagram: &Diagram, features: &[String]) {
    let mut table = Table::new();
    table.set_header(["Name", "Kind", "Variables", "Notes"]);
    for (name, kind) in &diagram.kinds {
        let (variables, notes) = match kind {
            NodeKind::Entity => (entity_variable(name), String::new()),
            NodeKind::Relation => {
                let variables = diagram
                    .bindings
                    .relation(name)
                    .map(|vars| format!("{}, {}", vars.first(), vars.second()))
                    .unwrap_or_default();
                let notes = diagram
                    .cardinalities
                    .get(name)
                    .map(|(first, second)| format!("{}-{}", first.label(), second.label()))
                    .unwrap_or_default();
                (variables, notes)
            }
            NodeKind::Attribute => diagram
                .bindings
                .attribute(name)
                .map(|attr| {
                    let notes = if attr.multivalued {
                        "multivalued".to_owned()
                    } else {
                        String::new()
                    };
                    (attr.variable.clone(), notes)
                })
                .unwrap_or_default(),
        };
        table.add_row([name.clone(), kind.label().to_owned(), variables, notes]);
    }
    eprintln!("{table}");
    eprintln!("target: {}", diagram.target);
    eprintln!("features: {}", features.join(" "));
}

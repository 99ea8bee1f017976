// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! paperfold CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use paperfold::cli::{FoldRunner, Reporter};
use paperfold::config::FoldConfig;
use paperfold::geometry::Sheet;
use paperfold::io::{load_paper, save_paper};
use paperfold::paper::{EdgeType, PaperModel};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "paperfold")]
#[command(about = "Paper folding simulator - crease, cut and fold triangle-mesh sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to paperfold.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a flat grid sheet
    Grid {
        #[arg(long, default_value = "10")]
        columns: usize,

        #[arg(long, default_value = "10")]
        rows: usize,

        #[arg(long, default_value = "1.0")]
        cell_size: f64,

        /// Output model file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Set the type of every edge along a vertex path
    Mark {
        input: PathBuf,

        /// Comma separated vertex ids, e.g. 0,5,10
        #[arg(short, long)]
        path: String,

        /// Flat, Ridge (or Mountain), Valley or Cut
        #[arg(short, long)]
        kind: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fold hinges and relax for a number of steps
    Fold {
        input: PathBuf,

        #[arg(long)]
        steps: Option<usize>,

        /// Share of the remaining hinge angle folded per step
        #[arg(long)]
        fraction: Option<f64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Relax constraints without folding
    Relax {
        input: PathBuf,

        #[arg(long, default_value = "1")]
        steps: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Subdivide long Flat edges
    Subdivide {
        input: PathBuf,

        /// Share of the longest Flat edge above which edges are split
        #[arg(long)]
        ratio: Option<f64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flip Flat edges towards a Delaunay triangulation
    Flip {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Laplacian smoothing of the flat pattern
    Smooth {
        input: PathBuf,

        #[arg(long)]
        passes: Option<usize>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Project every panel onto its best-fit plane
    Flatten {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show model statistics
    Info {
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => {
            let mut config = FoldConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => FoldConfig::load()?,
    };

    if let Err(e) = run(cli.command, config, cli.verbose) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn run(command: Commands, mut config: FoldConfig, verbose: bool) -> Result<()> {
    match command {
        Commands::Grid {
            columns,
            rows,
            cell_size,
            output,
        } => {
            let model = Sheet::grid(columns, rows, cell_size)
                .to_model()
                .context("Failed to build grid")?;
            save_paper(&model, &output)?;
            Reporter::success(&format!(
                "Wrote {}x{} grid to {}",
                columns,
                rows,
                output.display()
            ));
        }
        Commands::Mark {
            input,
            path,
            kind,
            output,
        } => {
            let kind: EdgeType = kind.parse()?;
            let vertices = parse_path(&path)?;
            let mut model = load_paper(&input)?;
            for pair in vertices.windows(2) {
                model
                    .set_edge_type_between(pair[0], pair[1], kind)
                    .with_context(|| format!("Failed to mark edge {}-{}", pair[0], pair[1]))?;
            }
            finish(&model, &input, output, &format!("Marked {} edges {}", vertices.len() - 1, kind))?;
        }
        Commands::Fold {
            input,
            steps,
            fraction,
            output,
        } => {
            if let Some(steps) = steps {
                config.steps = steps;
            }
            if let Some(fraction) = fraction {
                config.fold_fraction = fraction;
            }
            let mut model = load_paper(&input)?;
            let summary = FoldRunner::new(config).with_progress(verbose).run(&mut model)?;
            if !summary.last_report.skipped.is_empty() {
                Reporter::report_warning(&format!(
                    "{} hinges are not foldable",
                    summary.last_report.skipped.len()
                ));
            }
            Reporter::report_fold(&input.display().to_string(), &summary);
            finish(&model, &input, output, "Folded")?;
        }
        Commands::Relax { input, steps, output } => {
            let mut model = load_paper(&input)?;
            for _ in 0..steps {
                model.relax_one_step(config.relax)?;
            }
            let discrepancy = model.discrepancy()?;
            Reporter::report_info(&format!(
                "linear {:.3e}, angular {:.3e}",
                discrepancy.linear, discrepancy.angular
            ));
            finish(&model, &input, output, &format!("Relaxed {} steps", steps))?;
        }
        Commands::Subdivide { input, ratio, output } => {
            let mut model = load_paper(&input)?;
            let count = model.subdivide_long_edges(ratio.unwrap_or(config.subdivide_ratio))?;
            finish(&model, &input, output, &format!("Subdivided {} edges", count))?;
        }
        Commands::Flip { input, output } => {
            let mut model = load_paper(&input)?;
            let count = model.flip_edges()?;
            finish(&model, &input, output, &format!("Flipped {} edges", count))?;
        }
        Commands::Smooth { input, passes, output } => {
            let mut model = load_paper(&input)?;
            let moved = model.laplacian_smooth_passes(passes.unwrap_or(config.smooth_passes))?;
            finish(&model, &input, output, &format!("Moved {} vertices", moved))?;
        }
        Commands::Flatten { input, output } => {
            let mut model = load_paper(&input)?;
            model.component_svd()?;
            finish(&model, &input, output, "Flattened panels")?;
        }
        Commands::Info { input, json } => {
            let model = load_paper(&input)?;
            let stats = model.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                Reporter::report_model(&input.display().to_string(), &model, &stats);
            }
        }
    }
    Ok(())
}

/// Save to `output`, or back to `input` when no output is given
fn finish(model: &PaperModel, input: &Path, output: Option<PathBuf>, message: &str) -> Result<()> {
    let target = output.unwrap_or_else(|| input.to_path_buf());
    save_paper(model, &target)?;
    Reporter::success(&format!("{} -> {}", message, target.display()));
    Ok(())
}

fn parse_path(path: &str) -> Result<Vec<usize>> {
    let vertices = path
        .split(',')
        .map(|s| {
            s.trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid vertex id: {}", s))
        })
        .collect::<Result<Vec<_>>>()?;
    if vertices.len() < 2 {
        bail!("A path needs at least two vertices");
    }
    Ok(vertices)
}

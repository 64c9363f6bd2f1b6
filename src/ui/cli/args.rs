use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};

use crate::classifiers::lazy::search::SearchStrategy;
use crate::classifiers::lazy::{AggregationMode, KnnParams, RegressionFallback};
use crate::evaluation::CurveFormat;
use crate::streams::Stream;
use crate::streams::arff::ArffFileStream;
use crate::streams::generators::ClusterGenerator;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prequential runner for the windowed k-NN learner"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the learner on a stream, test-then-train
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// ARFF file to stream; omit to use the cluster generator
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub arff: Option<PathBuf>,

    /// Class attribute index in the ARFF header (default: last attribute)
    #[arg(long, value_name = "INDEX", requires = "arff")]
    pub class_index: Option<usize>,

    /// Generator: number of cluster classes
    #[arg(long, default_value_t = 2, value_name = "N", conflicts_with = "arff")]
    pub classes: usize,

    /// Generator: number of numeric attributes
    #[arg(long, default_value_t = 2, value_name = "N", conflicts_with = "arff")]
    pub attributes: usize,

    /// Generator: cluster standard deviation
    #[arg(long, default_value_t = 1.0, value_name = "SPREAD", conflicts_with = "arff")]
    pub spread: f64,

    /// Generator: random seed
    #[arg(long, default_value_t = 1, value_name = "SEED", conflicts_with = "arff")]
    pub seed: u64,

    /// Number of neighbours consulted per prediction
    #[arg(short, long, default_value_t = 10, value_name = "K")]
    pub k: usize,

    /// Sliding window capacity
    #[arg(long = "window", default_value_t = 1000, value_name = "N")]
    pub window_size: usize,

    /// Neighbour search backend (linear | kd-tree)
    #[arg(long, default_value_t = SearchStrategy::Linear, value_name = "STRATEGY")]
    pub search: SearchStrategy,

    /// Aggregate regression targets with the median instead of the mean
    #[arg(long)]
    pub median: bool,

    /// Vote with the nearest class centroid instead of raw neighbours
    #[arg(long)]
    pub centroid: bool,

    /// Regression estimate when no neighbour is available (omit to abstain)
    #[arg(long, value_name = "VALUE")]
    pub regression_default: Option<f64>,

    /// Stop after this many instances (omit for unlimited)
    #[arg(long, value_name = "N")]
    pub max_instances: Option<u64>,

    /// Stop after this many CPU seconds (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    pub max_seconds: Option<u64>,

    /// Emit metrics every N instances
    #[arg(
        long,
        default_value_t = 1000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub sample_frequency: u64,

    /// Check model memory every N instances
    #[arg(
        long,
        default_value_t = 10_000,
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub mem_check_frequency: u64,

    /// File to dump evaluation snapshots after completion
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub dump_file: Option<PathBuf>,

    /// Format for the dump file (csv | tsv | json)
    #[arg(long, default_value_t = CurveFormat::Csv, value_name = "FORMAT")]
    pub dump_format: CurveFormat,
}

impl RunArgs {
    pub fn knn_params(&self) -> KnnParams {
        KnnParams {
            k: self.k,
            max_size: self.window_size,
            search: self.search,
            aggregation: if self.median {
                AggregationMode::Median
            } else {
                AggregationMode::Mean
            },
            centroid_mode: self.centroid,
            fallback: match self.regression_default {
                Some(value) => RegressionFallback::Constant(value),
                None => RegressionFallback::Abstain,
            },
        }
    }

    pub fn build_stream(&self) -> Result<Box<dyn Stream>> {
        match &self.arff {
            Some(path) => {
                let stream = ArffFileStream::new(path.clone(), self.class_index)
                    .with_context(|| format!("failed to open ARFF stream {}", path.display()))?;
                Ok(Box::new(stream))
            }
            None => {
                let generator =
                    ClusterGenerator::new(self.classes, self.attributes, self.spread, self.seed)
                        .context("failed to build cluster generator")?;
                Ok(Box::new(generator))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("args should parse")
    }

    #[test]
    fn defaults_match_the_documented_knobs() {
        let cli = parse(&["eddy", "run"]);
        let Command::Run(run) = cli.command;

        let params = run.knn_params();
        assert_eq!(params.k, 10);
        assert_eq!(params.max_size, 1000);
        assert_eq!(params.search, SearchStrategy::Linear);
        assert_eq!(params.aggregation, AggregationMode::Mean);
        assert!(!params.centroid_mode);
        assert_eq!(params.fallback, RegressionFallback::Abstain);
    }

    #[test]
    fn learner_flags_map_onto_params() {
        let cli = parse(&[
            "eddy",
            "run",
            "-k",
            "3",
            "--window",
            "250",
            "--search",
            "kd-tree",
            "--median",
            "--centroid",
            "--regression-default",
            "0.5",
        ]);
        let Command::Run(run) = cli.command;

        let params = run.knn_params();
        assert_eq!(params.k, 3);
        assert_eq!(params.max_size, 250);
        assert_eq!(params.search, SearchStrategy::KdTree);
        assert_eq!(params.aggregation, AggregationMode::Median);
        assert!(params.centroid_mode);
        assert_eq!(params.fallback, RegressionFallback::Constant(0.5));
    }

    #[test]
    fn generator_knobs_conflict_with_arff() {
        let result = Cli::try_parse_from(["eddy", "run", "--arff", "data.arff", "--classes", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_sample_frequency_is_rejected() {
        let result = Cli::try_parse_from(["eddy", "run", "--sample-frequency", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn generator_stream_builds_with_defaults() {
        let cli = parse(&["eddy", "run", "--classes", "3", "--attributes", "4"]);
        let Command::Run(run) = cli.command;

        let stream = run.build_stream().expect("generator stream");
        assert_eq!(stream.header().number_of_classes(), 3);
        assert_eq!(stream.header().number_of_attributes(), 5);
    }
}

mod classifier;
mod error;
mod observability;
mod parameters;
mod processing;
mod roi;
mod save_to_file;
mod sources;

use classifier::ClassifierBank;
use clap::Parser;
use metrics::counter;
use miette::IntoDiagnostic;
use parameters::RoiFinderSettings;
use processing::{RoiFinder, RoiSummary};
use roi::{Region, SparseWaveform};
use roi_common::{
    init_tracer,
    metrics::{
        failures::{self, FailureKind},
        names::FAILURES,
    },
};
use save_to_file::{SaveToFileFilter, get_save_file_name};
use sources::{ChannelWaveform, Geometry, InputSource};
use std::{fs::create_dir_all, net::SocketAddr, path::Path, path::PathBuf};
use tracing::{debug, error, info, level_filters::LevelFilter};

// cargo run --bin waveform-roi-finder -- --config roi_finder.json --geometry geometry.json --raw-digits raw_digits.json

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// JSON file listing the classifier of each view
    #[clap(long)]
    config: PathBuf,

    /// JSON file describing the planes and the view of each channel
    #[clap(long)]
    geometry: PathBuf,

    /// JSON file of raw digits (mutually exclusive with --wires)
    #[clap(long)]
    raw_digits: Option<PathBuf>,

    /// JSON file of decoded wires (mutually exclusive with --raw-digits)
    #[clap(long)]
    wires: Option<PathBuf>,

    /// If set, each channel's raw and region-of-interest waveforms are written to this directory
    #[clap(long)]
    save_path: Option<PathBuf>,

    /// Number of worker threads, defaults to one per core
    #[clap(long)]
    threads: Option<usize>,

    /// If set, Prometheus metrics are served on this address
    #[clap(long, env)]
    observability_address: Option<SocketAddr>,
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(LevelFilter::INFO);
    debug!("Args: {:?}", args);

    if let Some(observability_address) = args.observability_address {
        observability::install(observability_address).into_diagnostic()?;
    }

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .into_diagnostic()?;
    }

    // Configuration errors are reported before any channel is read.
    let input_source = InputSource::new(args.raw_digits, args.wires).into_diagnostic()?;
    let settings = RoiFinderSettings::load(&args.config).into_diagnostic()?;
    let geometry = Geometry::load(&args.geometry).into_diagnostic()?;
    let classifiers =
        ClassifierBank::new(&settings.waveform_recogs, geometry.num_planes()).into_diagnostic()?;
    info!(
        "{}: {} views, waveform size {}, storing {}",
        tracer.service_name(),
        classifiers.len(),
        classifiers.waveform_size(),
        if settings.save_score { "scores" } else { "samples" }
    );
    let roi_finder = RoiFinder::new(classifiers, settings.save_score);

    let waveforms = input_source.load(&geometry).into_diagnostic()?;
    let sparse_waveforms = roi_finder.process(&waveforms).into_diagnostic()?;
    for sparse in &sparse_waveforms {
        debug!(
            "Channel {} (view {}): regions at ticks {:?}",
            sparse.channel(),
            sparse.view(),
            sparse.regions().iter().map(Region::start).collect::<Vec<_>>()
        );
    }

    if let Some(save_path) = args.save_path.as_deref() {
        if let Err(e) = save_channels(save_path, &waveforms, &sparse_waveforms) {
            error!("Failed to save traces to {}: {e}", save_path.display());
            counter!(FAILURES, &[failures::get_label(FailureKind::FileWriteFailed)]).increment(1);
            return Err(e).into_diagnostic();
        }
    }

    let summary = RoiSummary::new(&sparse_waveforms);
    info!(
        "Processed {} channels into {} regions, retaining {:.2}% of {} ticks",
        summary.num_channels,
        summary.num_regions,
        100.0 * summary.fraction_retained(),
        summary.total_ticks
    );
    Ok(())
}

#[tracing::instrument(skip_all, fields(save_path = %save_path.display()))]
fn save_channels(
    save_path: &Path,
    inputs: &[ChannelWaveform],
    outputs: &[SparseWaveform],
) -> std::io::Result<()> {
    create_dir_all(save_path)?;
    for (input, output) in inputs.iter().zip(outputs) {
        input
            .samples
            .iter()
            .copied()
            .enumerate()
            .save_to_file(&get_save_file_name(save_path, input.channel, "raw"))?;
        output
            .materialize(0.0)
            .into_iter()
            .enumerate()
            .save_to_file(&get_save_file_name(save_path, output.channel(), "roi"))?;
    }
    Ok(())
}

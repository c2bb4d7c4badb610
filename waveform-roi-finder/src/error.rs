use roi_common::{Channel, Tick, ViewId};
use std::path::PathBuf;
use thiserror::Error;

pub(crate) type ProcessingResult<T> = Result<T, ProcessingError>;

#[derive(Debug, Clone, strum::Display)]
pub(crate) enum SourceKind {
    #[strum(to_string = "classifier configuration")]
    Settings,
    #[strum(to_string = "geometry")]
    Geometry,
    #[strum(to_string = "raw digits")]
    RawDigits,
    #[strum(to_string = "wires")]
    Wires,
}

/// Errors detected at startup, before any channel is processed.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("Neither a raw digit source nor a wire source is configured")]
    NoSource,
    #[error("Only one of the raw digit source and the wire source should be configured")]
    BothSources,
    #[error("No classifiers are configured")]
    NoClassifiers,
    #[error("{classifiers} classifiers configured for {planes} planes")]
    ClassifierCountMismatch { classifiers: usize, planes: usize },
    #[error("Classifier for view {view} declares waveform size {found}, expected {expected}")]
    InconsistentWaveformSize {
        view: ViewId,
        expected: usize,
        found: usize,
    },
    #[error("Invalid {kind} classifier for waveform size {waveform_size}: {reason}")]
    InvalidClassifier {
        kind: &'static str,
        waveform_size: usize,
        reason: String,
    },
}

/// Errors raised by the collaborators which supply channel waveforms.
#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("Cannot open {kind} file {path}: {source}")]
    Io {
        kind: SourceKind,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot parse {kind} file {path}: {source}")]
    Json {
        kind: SourceKind,
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Channel {0} is not covered by the geometry")]
    UnknownChannel(Channel),
    #[error("Malformed zero-suppressed data for channel {channel}: {reason}")]
    Decompression { channel: Channel, reason: String },
}

#[derive(Debug, Error)]
pub(crate) enum ClassifierError {
    #[error("Classifier configured for {expected} samples received {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Violations of the ordering contract of `SparseWaveform::append`.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum RegionError {
    #[error("Region at tick {start} is empty")]
    Empty { start: Tick },
    #[error("Region at tick {start} overlaps the previous region ending at tick {previous_end}")]
    Overlap { start: Tick, previous_end: Tick },
    #[error("Region ending at tick {end} exceeds waveform size {size}")]
    OutOfBounds { end: Tick, size: usize },
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum SegmentationError {
    #[error("Mask has {mask} ticks but values have {values}")]
    LengthMismatch { mask: usize, values: usize },
}

#[derive(Debug, Error)]
pub(crate) enum ProcessingError {
    #[error("Channel {channel} has view {view} but only {num_views} classifiers are configured")]
    ViewOutOfRange {
        channel: Channel,
        view: ViewId,
        num_views: usize,
    },
    #[error("Classifier failed on channel {channel}: {source}")]
    Classifier {
        channel: Channel,
        source: ClassifierError,
    },
    #[error("Segmentation failed on channel {channel}: {source}")]
    Segmentation {
        channel: Channel,
        source: SegmentationError,
    },
    #[error("Invalid region on channel {channel}: {source}")]
    Region { channel: Channel, source: RegionError },
}

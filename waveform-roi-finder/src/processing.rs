use crate::{
    classifier::ClassifierBank,
    error::{ProcessingError, ProcessingResult},
    roi::{SparseWaveform, find_regions},
    sources::ChannelWaveform,
};
use metrics::counter;
use rayon::prelude::*;
use roi_common::{
    Sample,
    metrics::{
        failures::{self, FailureKind},
        names::{CHANNELS_PROCESSED, FAILURES, REGIONS_EMITTED, TICKS_RETAINED},
    },
};
use tracing::{Span, error};

/// Turns channel waveforms into sparse waveforms using the classifier bound
/// to each channel's view.
#[derive(Debug)]
pub(crate) struct RoiFinder {
    classifiers: ClassifierBank,
    save_score: bool,
}

impl RoiFinder {
    /// If `save_score` is set, regions store the classifier's confidence
    /// score instead of the waveform samples.
    pub(crate) fn new(classifiers: ClassifierBank, save_score: bool) -> Self {
        Self {
            classifiers,
            save_score,
        }
    }

    #[tracing::instrument(skip_all, fields(channel = waveform.channel, view = waveform.view, num_regions))]
    pub(crate) fn find_channel_regions(
        &self,
        waveform: &ChannelWaveform,
    ) -> ProcessingResult<SparseWaveform> {
        let channel = waveform.channel;
        let classifier = self
            .classifiers
            .get(waveform.view)
            .ok_or(ProcessingError::ViewOutOfRange {
                channel,
                view: waveform.view,
                num_views: self.classifiers.len(),
            })?;

        let mask = classifier
            .classify(&waveform.samples)
            .map_err(|source| ProcessingError::Classifier { channel, source })?;

        let score: Vec<Sample>;
        let values = if self.save_score {
            score = classifier
                .score(&waveform.samples)
                .map_err(|source| ProcessingError::Classifier { channel, source })?;
            &score
        } else {
            &waveform.samples
        };

        let regions = find_regions(&mask, values)
            .map_err(|source| ProcessingError::Segmentation { channel, source })?;
        let sparse = SparseWaveform::from_regions(
            channel,
            waveform.view,
            self.classifiers.waveform_size(),
            regions,
        )
        .map_err(|source| ProcessingError::Region { channel, source })?;

        Span::current().record("num_regions", sparse.num_regions());
        counter!(CHANNELS_PROCESSED).increment(1);
        counter!(REGIONS_EMITTED).increment(sparse.num_regions() as u64);
        counter!(TICKS_RETAINED).increment(sparse.covered_len() as u64);
        Ok(sparse)
    }

    /// Processes every channel, in parallel, returning the sparse waveforms
    /// in input order. The first error aborts the whole batch.
    #[tracing::instrument(skip_all, fields(num_channels = waveforms.len()))]
    pub(crate) fn process(
        &self,
        waveforms: &[ChannelWaveform],
    ) -> ProcessingResult<Vec<SparseWaveform>> {
        waveforms
            .par_iter()
            .map(|waveform| {
                self.find_channel_regions(waveform).inspect_err(|e| {
                    error!("{e}");
                    counter!(FAILURES, &[failures::get_label(failure_kind(e))]).increment(1);
                })
            })
            .collect()
    }
}

fn failure_kind(error: &ProcessingError) -> FailureKind {
    match error {
        ProcessingError::ViewOutOfRange { .. } => FailureKind::ViewOutOfRange,
        ProcessingError::Classifier { .. } | ProcessingError::Segmentation { .. } => {
            FailureKind::ClassifierFailed
        }
        ProcessingError::Region { .. } => FailureKind::InvalidRegion,
    }
}

/// Totals over a processed batch.
#[derive(Default, Debug, Clone, PartialEq)]
pub(crate) struct RoiSummary {
    pub(crate) num_channels: usize,
    pub(crate) num_regions: usize,
    pub(crate) retained_ticks: usize,
    pub(crate) total_ticks: usize,
}

impl RoiSummary {
    pub(crate) fn new(waveforms: &[SparseWaveform]) -> Self {
        waveforms
            .iter()
            .fold(Self::default(), |summary, waveform| Self {
                num_channels: summary.num_channels + 1,
                num_regions: summary.num_regions + waveform.num_regions(),
                retained_ticks: summary.retained_ticks + waveform.covered_len(),
                total_ticks: summary.total_ticks + waveform.size(),
            })
    }

    pub(crate) fn fraction_retained(&self) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            self.retained_ticks as f64 / self.total_ticks as f64
        }
    }
}

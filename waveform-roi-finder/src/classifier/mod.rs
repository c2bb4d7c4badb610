//! Pluggable per-view waveform classifiers.
//!
//! A [Classifier] maps a waveform of a fixed, configured length to a per-tick
//! keep/discard mask and a parallel confidence score. One classifier is bound
//! to each detector view; the [ClassifierBank] owns them, indexed by view id.

pub(crate) mod config;
pub(crate) mod threshold;
pub(crate) mod windowed;

use crate::error::{ClassifierError, ConfigError};
use roi_common::{Sample, ViewId};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::info;

pub(crate) use config::ClassifierConfig;

/// Implementations must be deterministic and hold no interior mutability:
/// one instance is shared by every worker processing channels of its view.
pub(crate) trait Classifier: Debug + Send + Sync {
    /// The number of samples this classifier accepts.
    fn waveform_size(&self) -> usize;

    /// Returns `true` for every tick judged to contain signal.
    fn classify(&self, samples: &[Sample]) -> Result<Vec<bool>, ClassifierError>;

    /// Returns the confidence, nominally in `[0, 1]`, that each tick contains signal.
    fn score(&self, samples: &[Sample]) -> Result<Vec<Sample>, ClassifierError>;

    fn check_length(&self, samples: &[Sample]) -> Result<(), ClassifierError> {
        if samples.len() == self.waveform_size() {
            Ok(())
        } else {
            Err(ClassifierError::LengthMismatch {
                expected: self.waveform_size(),
                found: samples.len(),
            })
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Polarity {
    #[default]
    Positive,
    Negative,
    Bipolar,
}

impl Polarity {
    pub(crate) fn apply(self, value: Sample) -> Sample {
        match self {
            Polarity::Positive => value,
            Polarity::Negative => -value,
            Polarity::Bipolar => value.abs(),
        }
    }
}

pub(crate) fn logistic(x: Sample) -> Sample {
    1.0 / (1.0 + (-x).exp())
}

/// The classifiers of every view, built once at startup and read-only thereafter.
#[derive(Debug)]
pub(crate) struct ClassifierBank {
    classifiers: Vec<Box<dyn Classifier>>,
    waveform_size: usize,
}

impl ClassifierBank {
    /// Builds one classifier per plane, in view order.
    ///
    /// Fails if the number of configurations differs from `num_planes`, or if
    /// any configuration declares a waveform size different from the first.
    pub(crate) fn new(
        configs: &[ClassifierConfig],
        num_planes: usize,
    ) -> Result<Self, ConfigError> {
        if configs.len() != num_planes {
            return Err(ConfigError::ClassifierCountMismatch {
                classifiers: configs.len(),
                planes: num_planes,
            });
        }
        let first = configs.first().ok_or(ConfigError::NoClassifiers)?;
        let waveform_size = first.waveform_size();
        let classifiers = configs
            .iter()
            .zip(0..)
            .map(|(config, view): (_, ViewId)| {
                if config.waveform_size() != waveform_size {
                    return Err(ConfigError::InconsistentWaveformSize {
                        view,
                        expected: waveform_size,
                        found: config.waveform_size(),
                    });
                }
                let classifier = config.build()?;
                info!("View {view}: {classifier:?}");
                Ok(classifier)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classifiers,
            waveform_size,
        })
    }

    /// The classifier bound to `view`, if one is configured.
    pub(crate) fn get(&self, view: ViewId) -> Option<&dyn Classifier> {
        let index = usize::try_from(view).ok()?;
        self.classifiers.get(index).map(|classifier| classifier.as_ref())
    }

    pub(crate) fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// The waveform length shared by every view.
    pub(crate) fn waveform_size(&self) -> usize {
        self.waveform_size
    }
}

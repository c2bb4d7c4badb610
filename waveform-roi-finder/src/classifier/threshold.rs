use super::{Classifier, Polarity, logistic};
use crate::error::{ClassifierError, ConfigError};
use roi_common::{Sample, Tick};
use serde::Deserialize;
use std::iter::once;

fn default_duration() -> usize {
    1
}

fn default_score_width() -> Sample {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ThresholdParameters {
    pub(crate) waveform_size: usize,
    #[serde(default)]
    pub(crate) polarity: Polarity,
    #[serde(default)]
    pub(crate) baseline: Sample,
    pub(crate) threshold: Sample,
    /// Minimum number of consecutive ticks over threshold for a run to be kept.
    #[serde(default = "default_duration")]
    pub(crate) duration: usize,
    /// Ticks kept either side of each accepted run.
    #[serde(default)]
    pub(crate) padding: usize,
    #[serde(default = "default_score_width")]
    pub(crate) score_width: Sample,
}

impl Default for ThresholdParameters {
    fn default() -> Self {
        Self {
            waveform_size: 0,
            polarity: Polarity::default(),
            baseline: 0.0,
            threshold: 0.0,
            duration: default_duration(),
            padding: 0,
            score_width: default_score_width(),
        }
    }
}

/// Keeps runs of at least `duration` ticks whose baseline-subtracted,
/// polarity-corrected value exceeds `threshold`, widened by `padding`.
#[derive(Debug, Clone)]
pub(crate) struct ThresholdClassifier {
    parameters: ThresholdParameters,
}

impl ThresholdClassifier {
    pub(crate) fn new(parameters: ThresholdParameters) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidClassifier {
            kind: "threshold",
            waveform_size: parameters.waveform_size,
            reason: reason.to_owned(),
        };
        if parameters.waveform_size == 0 {
            return Err(invalid("waveform size must be positive"));
        }
        if parameters.duration == 0 || parameters.duration > parameters.waveform_size {
            return Err(invalid("duration must be between 1 and the waveform size"));
        }
        if !parameters.threshold.is_finite() || !parameters.baseline.is_finite() {
            return Err(invalid("threshold and baseline must be finite"));
        }
        if !(parameters.score_width.is_finite() && parameters.score_width > 0.0) {
            return Err(invalid("score width must be positive"));
        }
        Ok(Self { parameters })
    }

    fn signal(&self, value: Sample) -> Sample {
        self.parameters
            .polarity
            .apply(value - self.parameters.baseline)
    }

    fn mark(&self, mask: &mut [bool], start: Tick, end: Tick) {
        let lower = start.saturating_sub(self.parameters.padding);
        let upper = end
            .saturating_add(self.parameters.padding)
            .min(mask.len());
        if let Some(ticks) = mask.get_mut(lower..upper) {
            ticks.fill(true);
        }
    }
}

impl Classifier for ThresholdClassifier {
    fn waveform_size(&self) -> usize {
        self.parameters.waveform_size
    }

    fn classify(&self, samples: &[Sample]) -> Result<Vec<bool>, ClassifierError> {
        self.check_length(samples)?;

        let mut mask = vec![false; samples.len()];
        let mut run_start: Option<Tick> = None;
        let over_threshold = samples
            .iter()
            .map(|&value| self.signal(value) > self.parameters.threshold)
            .chain(once(false));
        for (tick, over) in over_threshold.enumerate() {
            match (over, run_start) {
                (true, None) => run_start = Some(tick),
                (false, Some(start)) => {
                    if tick - start >= self.parameters.duration {
                        self.mark(&mut mask, start, tick);
                    }
                    run_start = None;
                }
                _ => {}
            }
        }
        Ok(mask)
    }

    fn score(&self, samples: &[Sample]) -> Result<Vec<Sample>, ClassifierError> {
        self.check_length(samples)?;

        Ok(samples
            .iter()
            .map(|&value| {
                logistic(
                    (self.signal(value) - self.parameters.threshold) / self.parameters.score_width,
                )
            })
            .collect())
    }
}

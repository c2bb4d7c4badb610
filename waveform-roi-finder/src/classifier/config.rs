use super::{
    Classifier,
    threshold::{ThresholdClassifier, ThresholdParameters},
    windowed::{WindowedClassifier, WindowedParameters},
};
use crate::error::ConfigError;
use serde::Deserialize;

/// Configuration of the classifier bound to one view.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub(crate) enum ClassifierConfig {
    Threshold(ThresholdParameters),
    Windowed(WindowedParameters),
}

impl ClassifierConfig {
    pub(crate) fn waveform_size(&self) -> usize {
        match self {
            ClassifierConfig::Threshold(parameters) => parameters.waveform_size,
            ClassifierConfig::Windowed(parameters) => parameters.waveform_size,
        }
    }

    pub(crate) fn build(&self) -> Result<Box<dyn Classifier>, ConfigError> {
        Ok(match self {
            ClassifierConfig::Threshold(parameters) => {
                Box::new(ThresholdClassifier::new(parameters.clone())?)
            }
            ClassifierConfig::Windowed(parameters) => {
                Box::new(WindowedClassifier::new(parameters.clone())?)
            }
        })
    }
}

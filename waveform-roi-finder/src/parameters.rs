use crate::{
    classifier::ClassifierConfig,
    error::{SourceError, SourceKind},
    sources::{load_json, report_read_failure},
};
use serde::Deserialize;
use std::path::Path;

/// The contents of the classifier configuration file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct RoiFinderSettings {
    /// One classifier per detector plane, in view order.
    pub(crate) waveform_recogs: Vec<ClassifierConfig>,
    /// Store the classifier's confidence score in regions instead of the samples.
    #[serde(default)]
    pub(crate) save_score: bool,
}

impl RoiFinderSettings {
    pub(crate) fn load(path: &Path) -> Result<Self, SourceError> {
        load_json(SourceKind::Settings, path).inspect_err(report_read_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierBank;

    const SETTINGS: &str = r#"{
        "waveform-recogs": [
            { "type": "threshold", "waveform-size": 6000, "polarity": "bipolar", "threshold": 8.0 },
            { "type": "threshold", "waveform-size": 6000, "polarity": "bipolar", "threshold": 8.0 },
            { "type": "windowed", "waveform-size": 6000, "window-size": 200, "snr-threshold": 5.0 }
        ],
        "save-score": true
    }"#;

    #[test]
    fn parse_settings() {
        let settings: RoiFinderSettings = serde_json::from_str(SETTINGS).unwrap();
        assert_eq!(settings.waveform_recogs.len(), 3);
        assert!(settings.save_score);

        let bank = ClassifierBank::new(&settings.waveform_recogs, 3).unwrap();
        assert_eq!(bank.waveform_size(), 6000);
    }

    #[test]
    fn save_score_defaults_off() {
        let settings: RoiFinderSettings = serde_json::from_str(
            r#"{ "waveform-recogs": [ { "type": "threshold", "waveform-size": 10, "threshold": 1.0 } ] }"#,
        )
        .unwrap();
        assert!(!settings.save_score);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            RoiFinderSettings::load(Path::new("/nonexistent/settings.json")),
            Err(SourceError::Io {
                kind: SourceKind::Settings,
                ..
            })
        ));
    }
}

use super::{Classifier, logistic};
use crate::error::{ClassifierError, ConfigError};
use roi_common::{Sample, Tick};
use serde::Deserialize;

/// Samples further than this many standard deviations from the mean are
/// excluded from the second noise estimate.
const NOISE_CLIP: Sample = 3.0;

fn default_score_width() -> Sample {
    1.0
}

fn default_prediction_cut() -> Sample {
    0.5
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct WindowedParameters {
    pub(crate) waveform_size: usize,
    pub(crate) window_size: usize,
    /// Distance between window starts, defaults to `window_size`.
    #[serde(default)]
    pub(crate) stride: Option<usize>,
    pub(crate) snr_threshold: Sample,
    #[serde(default = "default_score_width")]
    pub(crate) score_width: Sample,
    #[serde(default = "default_prediction_cut")]
    pub(crate) prediction_cut: Sample,
}

/// Mean and standard deviation of the noise in a waveform.
#[derive(Default, Clone, Debug, PartialEq)]
pub(crate) struct NoiseStats {
    pub(crate) mean: Sample,
    pub(crate) sigma: Sample,
}

impl NoiseStats {
    fn from_samples<I: Iterator<Item = Sample>>(samples: I) -> Option<Self> {
        let (count, sum, sum_of_squares) = samples.fold((0usize, 0.0f64, 0.0f64), |acc, v| {
            (acc.0 + 1, acc.1 + v as f64, acc.2 + (v as f64).powi(2))
        });
        if count == 0 {
            return None;
        }
        let size = count as f64;
        let mean = sum / size;
        let variance = (sum_of_squares / size - mean.powi(2)).max(0.0);
        Some(Self {
            mean: mean as Sample,
            sigma: variance.sqrt() as Sample,
        })
    }

    /// Estimates the noise, then re-estimates it excluding outlying samples
    /// so that large pulses do not inflate `sigma`.
    pub(crate) fn estimate(samples: &[Sample]) -> Self {
        let Some(first) = NoiseStats::from_samples(samples.iter().copied()) else {
            return Self::default();
        };
        let limit = NOISE_CLIP * first.sigma;
        let clipped = NoiseStats::from_samples(
            samples
                .iter()
                .copied()
                .filter(|v| (v - first.mean).abs() <= limit),
        )
        .unwrap_or(first);
        Self {
            sigma: clipped.sigma.max(Sample::EPSILON),
            ..clipped
        }
    }
}

/// Scores fixed-size windows of the waveform by their peak signal-to-noise
/// ratio and gives every tick the best score of the windows covering it.
#[derive(Debug, Clone)]
pub(crate) struct WindowedClassifier {
    parameters: WindowedParameters,
    window_starts: Vec<Tick>,
}

impl WindowedClassifier {
    pub(crate) fn new(parameters: WindowedParameters) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidClassifier {
            kind: "windowed",
            waveform_size: parameters.waveform_size,
            reason: reason.to_owned(),
        };
        if parameters.waveform_size == 0 {
            return Err(invalid("waveform size must be positive"));
        }
        if parameters.window_size == 0 || parameters.window_size > parameters.waveform_size {
            return Err(invalid("window size must be between 1 and the waveform size"));
        }
        if parameters.stride == Some(0) {
            return Err(invalid("stride must be positive"));
        }
        if !parameters.snr_threshold.is_finite() {
            return Err(invalid("signal-to-noise threshold must be finite"));
        }
        if !(parameters.score_width.is_finite() && parameters.score_width > 0.0) {
            return Err(invalid("score width must be positive"));
        }
        if !(0.0..=1.0).contains(&parameters.prediction_cut) {
            return Err(invalid("prediction cut must lie in [0, 1]"));
        }
        // A window with no signal at all scores logistic(-snr_threshold / score_width).
        let silent_score = logistic(-parameters.snr_threshold / parameters.score_width);
        if silent_score >= parameters.prediction_cut {
            return Err(invalid(
                "signal-to-noise threshold and prediction cut would keep windows without signal",
            ));
        }

        let last = parameters.waveform_size - parameters.window_size;
        let stride = parameters.stride.unwrap_or(parameters.window_size);
        let mut window_starts: Vec<Tick> = (0..=last).step_by(stride).collect();
        if window_starts.last() != Some(&last) {
            window_starts.push(last);
        }
        Ok(Self {
            parameters,
            window_starts,
        })
    }

    fn window_score(&self, window: &[Sample], noise: &NoiseStats) -> Sample {
        let peak = window
            .iter()
            .map(|v| (v - noise.mean).abs())
            .fold(0.0, Sample::max);
        logistic((peak / noise.sigma - self.parameters.snr_threshold) / self.parameters.score_width)
    }
}

impl Classifier for WindowedClassifier {
    fn waveform_size(&self) -> usize {
        self.parameters.waveform_size
    }

    fn classify(&self, samples: &[Sample]) -> Result<Vec<bool>, ClassifierError> {
        Ok(self
            .score(samples)?
            .into_iter()
            .map(|score| score >= self.parameters.prediction_cut)
            .collect())
    }

    fn score(&self, samples: &[Sample]) -> Result<Vec<Sample>, ClassifierError> {
        self.check_length(samples)?;

        let noise = NoiseStats::estimate(samples);
        let mut score: Vec<Sample> = vec![0.0; samples.len()];
        for &start in &self.window_starts {
            let range = start..start + self.parameters.window_size;
            let Some(window) = samples.get(range.clone()) else {
                continue;
            };
            let window_score = self.window_score(window, &noise);
            if let Some(ticks) = score.get_mut(range) {
                for tick_score in ticks {
                    *tick_score = tick_score.max(window_score);
                }
            }
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Alternating +-1 noise with an optional pulse.
    fn noisy(len: usize, pulse: Option<(Tick, Sample)>) -> Vec<Sample> {
        (0..len)
            .map(|i| {
                let noise = if i % 2 == 0 { 1.0 } else { -1.0 };
                match pulse {
                    Some((tick, height)) if tick == i => noise + height,
                    _ => noise,
                }
            })
            .collect()
    }

    fn parameters(waveform_size: usize, window_size: usize) -> WindowedParameters {
        WindowedParameters {
            waveform_size,
            window_size,
            stride: None,
            snr_threshold: 5.0,
            score_width: 1.0,
            prediction_cut: 0.5,
        }
    }

    fn classifier(parameters: WindowedParameters) -> WindowedClassifier {
        WindowedClassifier::new(parameters).unwrap()
    }

    #[test]
    fn noise_estimate() {
        let noise = NoiseStats::estimate(&noisy(100, None));
        assert_approx_eq!(noise.mean, 0.0, 1e-6);
        assert_approx_eq!(noise.sigma, 1.0, 1e-6);
    }

    #[test]
    fn noise_estimate_ignores_pulse() {
        let noise = NoiseStats::estimate(&noisy(100, Some((40, 50.0))));
        assert!(noise.sigma < 1.1, "sigma = {}", noise.sigma);
    }

    #[test]
    fn noise_estimate_flat() {
        let noise = NoiseStats::estimate(&[3.0; 10]);
        assert_approx_eq!(noise.mean, 3.0, 1e-6);
        assert_eq!(noise.sigma, Sample::EPSILON);
        assert_eq!(NoiseStats::estimate(&[]), NoiseStats::default());
    }

    #[test]
    fn window_starts_cover_tail() {
        let classifier = classifier(parameters(10, 4));
        assert_eq!(classifier.window_starts, vec![0, 4, 6]);

        let classifier = self::classifier(WindowedParameters {
            stride: Some(2),
            ..parameters(10, 4)
        });
        assert_eq!(classifier.window_starts, vec![0, 2, 4, 6]);

        let classifier = self::classifier(parameters(4, 4));
        assert_eq!(classifier.window_starts, vec![0]);
    }

    #[test]
    fn pulse_selects_its_window() {
        let classifier = classifier(parameters(40, 8));
        let samples = noisy(40, Some((19, 20.0)));
        let mask = classifier.classify(&samples).unwrap();
        for (tick, keep) in mask.into_iter().enumerate() {
            assert_eq!(keep, (16..24).contains(&tick), "tick {tick}");
        }
    }

    #[test]
    fn overlapping_windows_take_best_score() {
        let classifier = classifier(WindowedParameters {
            stride: Some(4),
            snr_threshold: 5.0,
            ..parameters(40, 8)
        });
        let samples = noisy(40, Some((19, 20.0)));
        let score = classifier.score(&samples).unwrap();
        let mask = classifier.classify(&samples).unwrap();
        for (tick, keep) in mask.into_iter().enumerate() {
            assert_eq!(keep, (12..24).contains(&tick), "tick {tick}");
        }
        assert_approx_eq!(score[12], score[19], 1e-6);
        assert!(score[0] < 0.5);
    }

    #[test]
    fn quiet_waveform_is_rejected() {
        let classifier = classifier(WindowedParameters {
            snr_threshold: 4.0,
            ..parameters(64, 16)
        });
        let mask = classifier.classify(&noisy(64, None)).unwrap();
        assert!(mask.iter().all(|keep| !keep));
    }

    #[test]
    fn length_mismatch() {
        let classifier = classifier(parameters(16, 4));
        assert!(matches!(
            classifier.classify(&[0.0; 15]),
            Err(ClassifierError::LengthMismatch {
                expected: 16,
                found: 15
            })
        ));
    }

    #[test]
    fn invalid_parameters() {
        for invalid in [
            parameters(16, 0),
            parameters(16, 17),
            WindowedParameters {
                stride: Some(0),
                ..parameters(16, 4)
            },
            WindowedParameters {
                prediction_cut: 1.5,
                ..parameters(16, 4)
            },
            WindowedParameters {
                snr_threshold: 0.0,
                ..parameters(16, 4)
            },
            WindowedParameters {
                snr_threshold: 1.0,
                prediction_cut: 0.2,
                ..parameters(16, 4)
            },
        ] {
            assert!(WindowedClassifier::new(invalid).is_err());
        }
    }

    #[test]
    fn snr_threshold_is_required() {
        let result = serde_json::from_str::<WindowedParameters>(
            r#"{ "waveform-size": 64, "window-size": 16 }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn configured_defaults_drop_small_noise() {
        let parameters: WindowedParameters = serde_json::from_str(
            r#"{ "waveform-size": 64, "window-size": 16, "snr-threshold": 4.0 }"#,
        )
        .unwrap();
        let classifier = classifier(parameters);
        let samples: Vec<Sample> = noisy(64, None).into_iter().map(|v| v * 0.1).collect();
        let mask = classifier.classify(&samples).unwrap();
        assert_eq!(mask.iter().filter(|&&keep| keep).count(), 0);
    }
}

//! Collaborators which supply channel waveforms to the pipeline.
//!
//! Exactly one of two sources is configured: raw digits, which are
//! decompressed, pedestal-subtracted and assigned a view through the
//! [Geometry], or wires, which arrive decoded with their view attached.
//! Either way the pipeline only sees [ChannelWaveform]s.

pub(crate) mod decoded;
pub(crate) mod geometry;
pub(crate) mod raw;

use crate::error::{ConfigError, SourceError, SourceKind};
use metrics::counter;
use roi_common::{
    Channel, Sample, ViewId,
    metrics::{
        failures::{self, FailureKind},
        names::FAILURES,
    },
};
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{error, info};

pub(crate) use decoded::Wire;
pub(crate) use geometry::Geometry;
pub(crate) use raw::RawDigit;

/// One channel's samples, normalised from either source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChannelWaveform {
    pub(crate) channel: Channel,
    pub(crate) view: ViewId,
    pub(crate) samples: Vec<Sample>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InputSource {
    RawDigits(PathBuf),
    Wires(PathBuf),
}

impl InputSource {
    /// Exactly one of `raw_digits` and `wires` must be given.
    pub(crate) fn new(
        raw_digits: Option<PathBuf>,
        wires: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        match (raw_digits, wires) {
            (Some(path), None) => Ok(InputSource::RawDigits(path)),
            (None, Some(path)) => Ok(InputSource::Wires(path)),
            (None, None) => Err(ConfigError::NoSource),
            (Some(_), Some(_)) => Err(ConfigError::BothSources),
        }
    }

    /// Reads every channel of the source, in file order.
    #[tracing::instrument(skip_all, fields(source = ?self))]
    pub(crate) fn load(&self, geometry: &Geometry) -> Result<Vec<ChannelWaveform>, SourceError> {
        let waveforms = match self {
            InputSource::RawDigits(path) => {
                load_json::<Vec<RawDigit>>(SourceKind::RawDigits, path).and_then(|digits| {
                    digits
                        .iter()
                        .map(|digit| digit.to_waveform(geometry))
                        .collect::<Result<Vec<_>, _>>()
                })
            }
            InputSource::Wires(path) => load_json::<Vec<Wire>>(SourceKind::Wires, path)
                .map(|wires| wires.into_iter().map(Wire::into_waveform).collect()),
        }
        .inspect_err(report_read_failure)?;
        info!("Loaded {} channels", waveforms.len());
        Ok(waveforms)
    }
}

/// Logs `error` and counts it as a failure to read an input.
pub(crate) fn report_read_failure(error: &SourceError) {
    error!("{error}");
    counter!(FAILURES, &[failures::get_label(FailureKind::SourceReadFailed)]).increment(1);
}

pub(crate) fn load_json<T: DeserializeOwned>(
    kind: SourceKind,
    path: &Path,
) -> Result<T, SourceError> {
    let file = File::open(path).map_err(|source| SourceError::Io {
        kind: kind.clone(),
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SourceError::Json {
        kind,
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::RoiFinderSettings;
    use metrics::{
        Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use std::{
        env::temp_dir,
        fs,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
    };

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = temp_dir().join(format!("{}_{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    fn geometry() -> Geometry {
        serde_json::from_str(
            r#"{
                "num-planes": 2,
                "channel-views": [
                    { "first-channel": 0, "last-channel": 9, "view": 0 },
                    { "first-channel": 10, "last-channel": 19, "view": 1 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn exactly_one_source() {
        let path = PathBuf::from("input.json");
        assert_eq!(
            InputSource::new(Some(path.clone()), None).unwrap(),
            InputSource::RawDigits(path.clone())
        );
        assert_eq!(
            InputSource::new(None, Some(path.clone())).unwrap(),
            InputSource::Wires(path.clone())
        );
        assert!(matches!(
            InputSource::new(None, None),
            Err(ConfigError::NoSource)
        ));
        assert!(matches!(
            InputSource::new(Some(path.clone()), Some(path)),
            Err(ConfigError::BothSources)
        ));
    }

    #[test]
    fn load_raw_digits() {
        let path = write_temp(
            "raw_digits.json",
            r#"[
                { "channel": 12, "pedestal": 100.0, "adcs": [100, 104, 98] },
                { "channel": 3, "pedestal": 50.0, "compression": "none", "adcs": [50, 50, 60] }
            ]"#,
        );
        let waveforms = InputSource::RawDigits(path.clone())
            .load(&geometry())
            .unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(
            waveforms,
            vec![
                ChannelWaveform {
                    channel: 12,
                    view: 1,
                    samples: vec![0.0, 4.0, -2.0]
                },
                ChannelWaveform {
                    channel: 3,
                    view: 0,
                    samples: vec![0.0, 0.0, 10.0]
                },
            ]
        );
    }

    #[test]
    fn load_wires() {
        let path = write_temp(
            "wires.json",
            r#"[
                { "channel": 7, "view": 2, "signal": [1.5, 2.5] },
                { "channel": 1, "view": 0, "signal": [0.0, -1.0] }
            ]"#,
        );
        let waveforms = InputSource::Wires(path.clone()).load(&geometry()).unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(waveforms.len(), 2);
        assert_eq!(waveforms[0].channel, 7);
        assert_eq!(waveforms[0].view, 2);
        assert_eq!(waveforms[1].samples, vec![0.0, -1.0]);
    }

    #[test]
    fn unknown_raw_channel() {
        let path = write_temp(
            "unknown_channel.json",
            r#"[ { "channel": 99, "pedestal": 0.0, "adcs": [1, 2] } ]"#,
        );
        let result = InputSource::RawDigits(path.clone()).load(&geometry());
        fs::remove_file(path).unwrap();
        assert!(matches!(result, Err(SourceError::UnknownChannel(99))));
    }

    #[test]
    fn missing_file() {
        let result = InputSource::Wires(PathBuf::from("/nonexistent/wires.json")).load(&geometry());
        assert!(matches!(
            result,
            Err(SourceError::Io {
                kind: SourceKind::Wires,
                ..
            })
        ));
    }

    /// Counts the source read failures recorded while it is installed.
    #[derive(Default)]
    struct SourceFailureRecorder {
        failures: Arc<AtomicU64>,
    }

    impl Recorder for SourceFailureRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            let (_, label) = failures::get_label(FailureKind::SourceReadFailed);
            if key.name() == FAILURES && key.labels().any(|l| l.value() == label) {
                Counter::from_arc(self.failures.clone())
            } else {
                Counter::noop()
            }
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn read_failures_are_counted() {
        let recorder = SourceFailureRecorder::default();
        let missing = Path::new("/nonexistent/input.json");
        metrics::with_local_recorder(&recorder, || {
            assert!(RoiFinderSettings::load(missing).is_err());
            assert!(Geometry::load(missing).is_err());
            assert!(
                InputSource::RawDigits(missing.to_owned())
                    .load(&geometry())
                    .is_err()
            );
        });
        assert_eq!(recorder.failures.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn successful_load_is_not_counted() {
        let path = write_temp(
            "counted_wires.json",
            r#"[ { "channel": 1, "view": 0, "signal": [0.0] } ]"#,
        );
        let recorder = SourceFailureRecorder::default();
        let result = metrics::with_local_recorder(&recorder, || {
            InputSource::Wires(path.clone()).load(&geometry())
        });
        fs::remove_file(path).unwrap();
        assert!(result.is_ok());
        assert_eq!(recorder.failures.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn malformed_file() {
        let path = write_temp("malformed.json", r#"{ "channel": "#);
        let result = load_json::<Vec<Wire>>(SourceKind::Wires, &path);
        fs::remove_file(path).unwrap();
        assert!(matches!(result, Err(SourceError::Json { .. })));
    }
}

use super::{ChannelWaveform, Geometry};
use crate::error::SourceError;
use roi_common::{Adc, Channel, Sample};
use serde::Deserialize;

#[derive(Default, Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Compression {
    /// The ADC list is the waveform.
    #[default]
    None,
    /// The ADC list is `[n_ticks, n_blocks, starts.., lengths.., values..]`;
    /// ticks outside every block were suppressed and read as the pedestal.
    ZeroSuppression,
}

/// A digitised channel as read from the data store.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawDigit {
    pub(crate) channel: Channel,
    pub(crate) pedestal: Sample,
    #[serde(default)]
    pub(crate) compression: Compression,
    pub(crate) adcs: Vec<Adc>,
}

impl RawDigit {
    /// Decompresses the ADC list, filling suppressed ticks with the pedestal.
    pub(crate) fn uncompress(&self) -> Result<Vec<Sample>, SourceError> {
        match self.compression {
            Compression::None => Ok(self.adcs.iter().map(|&adc| Sample::from(adc)).collect()),
            Compression::ZeroSuppression => self.zero_unsuppress(),
        }
    }

    fn zero_unsuppress(&self) -> Result<Vec<Sample>, SourceError> {
        let malformed = |reason: String| SourceError::Decompression {
            channel: self.channel,
            reason,
        };
        let header_value = |index: usize, name: &str| {
            self.adcs
                .get(index)
                .ok_or_else(|| malformed(format!("missing {name}")))
                .and_then(|&value| {
                    usize::try_from(value)
                        .map_err(|_| malformed(format!("negative {name} {value}")))
                })
        };

        let num_ticks = header_value(0, "tick count")?;
        let num_blocks = header_value(1, "block count")?;
        let mut samples = vec![self.pedestal; num_ticks];
        let mut offset = 2 + 2 * num_blocks;
        for block in 0..num_blocks {
            let start = header_value(2 + block, "block start")?;
            let length = header_value(2 + num_blocks + block, "block length")?;
            let values = self
                .adcs
                .get(offset..offset + length)
                .ok_or_else(|| malformed(format!("block {block} runs past the data")))?;
            let ticks = samples
                .get_mut(start..start + length)
                .ok_or_else(|| malformed(format!("block {block} runs past tick {num_ticks}")))?;
            for (tick, &adc) in ticks.iter_mut().zip(values) {
                *tick = Sample::from(adc);
            }
            offset += length;
        }
        Ok(samples)
    }

    /// Decompresses, subtracts the pedestal and looks up the channel's view.
    pub(crate) fn to_waveform(&self, geometry: &Geometry) -> Result<ChannelWaveform, SourceError> {
        let view = geometry.view(self.channel)?;
        let samples = self
            .uncompress()?
            .into_iter()
            .map(|adc| adc - self.pedestal)
            .collect();
        Ok(ChannelWaveform {
            channel: self.channel,
            view,
            samples,
        })
    }
}

use super::ChannelWaveform;
use roi_common::{Channel, Sample, ViewId};
use serde::Deserialize;

/// An already decoded channel waveform with its view attached.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Wire {
    pub(crate) channel: Channel,
    pub(crate) view: ViewId,
    pub(crate) signal: Vec<Sample>,
}

impl Wire {
    pub(crate) fn into_waveform(self) -> ChannelWaveform {
        ChannelWaveform {
            channel: self.channel,
            view: self.view,
            samples: self.signal,
        }
    }
}

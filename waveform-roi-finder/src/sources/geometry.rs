use crate::error::{SourceError, SourceKind};
use roi_common::{Channel, ViewId};
use serde::Deserialize;
use std::path::Path;

/// An inclusive range of channels read out in one view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct ChannelViews {
    pub(crate) first_channel: Channel,
    pub(crate) last_channel: Channel,
    pub(crate) view: ViewId,
}

impl ChannelViews {
    fn contains(&self, channel: Channel) -> bool {
        (self.first_channel..=self.last_channel).contains(&channel)
    }
}

/// The detector layout: how many planes there are and which view each channel reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct Geometry {
    num_planes: usize,
    channel_views: Vec<ChannelViews>,
}

impl Geometry {
    pub(crate) fn load(path: &Path) -> Result<Self, SourceError> {
        super::load_json(SourceKind::Geometry, path).inspect_err(super::report_read_failure)
    }

    pub(crate) fn num_planes(&self) -> usize {
        self.num_planes
    }

    pub(crate) fn view(&self, channel: Channel) -> Result<ViewId, SourceError> {
        self.channel_views
            .iter()
            .find(|range| range.contains(channel))
            .map(|range| range.view)
            .ok_or(SourceError::UnknownChannel(channel))
    }
}

use super::Region;
use crate::error::RegionError;
use roi_common::{Channel, Sample, ViewId};

/// The compacted waveform of one channel: an ordered list of [Region]s
/// over a waveform of `size` ticks.
///
/// Regions are strictly increasing, never overlap and never touch: a region
/// appended directly after the previous one is merged into it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SparseWaveform {
    channel: Channel,
    view: ViewId,
    size: usize,
    regions: Vec<Region>,
}

impl SparseWaveform {
    pub(crate) fn new(channel: Channel, view: ViewId, size: usize) -> Self {
        Self {
            channel,
            view,
            size,
            regions: Vec::new(),
        }
    }

    pub(crate) fn from_regions<R>(
        channel: Channel,
        view: ViewId,
        size: usize,
        regions: R,
    ) -> Result<Self, RegionError>
    where
        R: IntoIterator<Item = Region>,
    {
        let mut waveform = Self::new(channel, view, size);
        for region in regions {
            waveform.append(region)?;
        }
        Ok(waveform)
    }

    /// Appends `region` after the existing regions.
    ///
    /// The region must be non-empty, lie within the waveform, and start no
    /// earlier than the end of the previous region.
    pub(crate) fn append(&mut self, region: Region) -> Result<(), RegionError> {
        if region.is_empty() {
            return Err(RegionError::Empty {
                start: region.start(),
            });
        }
        if region.end() > self.size {
            return Err(RegionError::OutOfBounds {
                end: region.end(),
                size: self.size,
            });
        }
        match self.regions.last_mut() {
            Some(last) if region.start() < last.end() => Err(RegionError::Overlap {
                start: region.start(),
                previous_end: last.end(),
            }),
            Some(last) if region.start() == last.end() => {
                last.extend(region.into_values());
                Ok(())
            }
            _ => {
                self.regions.push(region);
                Ok(())
            }
        }
    }

    /// Expands into a dense waveform, filling uncovered ticks with `baseline`.
    pub(crate) fn materialize(&self, baseline: Sample) -> Vec<Sample> {
        let mut dense = vec![baseline; self.size];
        for region in &self.regions {
            if let Some(slice) = dense.get_mut(region.range()) {
                slice.copy_from_slice(region.values());
            }
        }
        dense
    }

    pub(crate) fn channel(&self) -> Channel {
        self.channel
    }

    pub(crate) fn view(&self) -> ViewId {
        self.view
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub(crate) fn num_regions(&self) -> usize {
        self.regions.len()
    }

    /// Total number of ticks covered by all regions.
    pub(crate) fn covered_len(&self) -> usize {
        self.regions.iter().map(Region::len).sum()
    }
}

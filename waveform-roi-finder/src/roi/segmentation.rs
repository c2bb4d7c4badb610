use super::Region;
use crate::error::SegmentationError;
use roi_common::{Sample, Tick};

/// Groups consecutive retained ticks into [Region]s.
///
/// The source must yield `(tick, (keep, value))` with ticks increasing by one,
/// as produced by `enumerate` over a zipped mask and value array. A discarded
/// tick always closes the open region, so emitted regions are ordered,
/// non-overlapping and separated by at least one tick.
#[derive(Clone)]
pub(crate) struct RegionIter<I> {
    source: I,
    start: Tick,
    values: Vec<Sample>,
}

impl<I> RegionIter<I> {
    pub(crate) fn new(source: I) -> Self {
        Self {
            source,
            start: Tick::default(),
            values: Vec::new(),
        }
    }

    fn close(&mut self) -> Region {
        Region::new(self.start, std::mem::take(&mut self.values))
    }
}

impl<I> Iterator for RegionIter<I>
where
    I: Iterator<Item = (Tick, (bool, Sample))>,
{
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        for (tick, (keep, value)) in self.source.by_ref() {
            if keep {
                if self.values.is_empty() {
                    self.start = tick;
                }
                self.values.push(value);
            } else if !self.values.is_empty() {
                return Some(self.close());
            }
        }
        (!self.values.is_empty()).then(|| self.close())
    }
}

pub(crate) trait RegionFilter<I> {
    fn regions(self) -> RegionIter<I>;
}

impl<I> RegionFilter<I> for I
where
    I: Iterator<Item = (Tick, (bool, Sample))>,
{
    fn regions(self) -> RegionIter<I> {
        RegionIter::new(self)
    }
}

/// Scans `mask` once and returns the maximal runs of `true` ticks,
/// each carrying the corresponding entries of `values`.
pub(crate) fn find_regions(
    mask: &[bool],
    values: &[Sample],
) -> Result<Vec<Region>, SegmentationError> {
    if mask.len() != values.len() {
        return Err(SegmentationError::LengthMismatch {
            mask: mask.len(),
            values: values.len(),
        });
    }
    Ok(mask
        .iter()
        .copied()
        .zip(values.iter().copied())
        .enumerate()
        .regions()
        .collect())
}

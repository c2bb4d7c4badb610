use roi_common::{Sample, Tick};
use std::ops::Range;

/// A contiguous run of retained ticks, starting at `start`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Region {
    start: Tick,
    values: Vec<Sample>,
}

impl Region {
    pub(crate) fn new(start: Tick, values: Vec<Sample>) -> Self {
        Self { start, values }
    }

    pub(crate) fn start(&self) -> Tick {
        self.start
    }

    /// One past the last tick of the region.
    pub(crate) fn end(&self) -> Tick {
        self.start + self.values.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn range(&self) -> Range<Tick> {
        self.start..self.end()
    }

    pub(crate) fn values(&self) -> &[Sample] {
        &self.values
    }

    pub(crate) fn extend(&mut self, values: Vec<Sample>) {
        self.values.extend(values);
    }

    pub(crate) fn into_values(self) -> Vec<Sample> {
        self.values
    }
}

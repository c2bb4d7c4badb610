//! Sparse, run-length representation of a channel waveform.
//!
//! A boolean mask over the ticks of a waveform is scanned once, left to
//! right, and every maximal run of `true` ticks becomes a [Region] carrying
//! the values of those ticks. The regions of one channel form a
//! [SparseWaveform]:
//! ```rust
//! let regions = find_regions(&mask, &samples)?;
//! let waveform = SparseWaveform::from_regions(channel, view, samples.len(), regions)?;
//! let dense = waveform.materialize(0.0);
//! ```

pub(crate) mod region;
pub(crate) mod segmentation;
pub(crate) mod sparse;

pub(crate) use region::Region;
pub(crate) use segmentation::find_regions;
pub(crate) use sparse::SparseWaveform;

pub mod metrics;
pub mod tracer;

/// Identifies a readout channel.
pub type Channel = u32;
/// Identifies a detector view (plane); indexes the per-view classifier bank.
pub type ViewId = u32;
/// Index of a sample within a waveform.
pub type Tick = usize;
/// A decoded, pedestal-subtracted waveform sample.
pub type Sample = f32;
/// A raw digitised ADC count.
pub type Adc = i16;

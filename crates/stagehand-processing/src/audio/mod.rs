//! Audio processing module

pub mod normalize;
pub mod probe;
pub mod processor;

pub use normalize::{infer_bit_depth, normalize_format};
pub use probe::{FfprobeProbe, Probe};
pub use processor::{parse_probe_output, AudioMetadataExtractor};

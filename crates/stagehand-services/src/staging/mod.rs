mod service;

pub use service::{AnalyzeError, AudioStagingService};

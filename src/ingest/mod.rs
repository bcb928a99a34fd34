pub mod source;
pub mod normalizer;

pub use source::{EventSource, JsonFileSource, SourceBatch};
pub use normalizer::{normalize_event, normalize_all};

#[cfg(test)]
pub use source::MockEventSource;

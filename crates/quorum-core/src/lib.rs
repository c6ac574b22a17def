//! Quorum Core Library
//!
//! Cost-aware analysis of long meeting transcripts: an adaptive transcript
//! sampler, a two-pass analyzer that gates an expensive model behind a cheap
//! triage pass, and a content-addressed response cache with time-based
//! expiry.

pub mod analyzer;
pub mod cache;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod provider;
pub mod sampler;
pub mod types;

// Re-export commonly used items at crate root
pub use analyzer::{AnalyzerConfig, TwoPassAnalyzer, strip_code_fences};
pub use cache::{CacheEntry, CacheStats, DEFAULT_RETENTION_DAYS, ResponseCache};
pub use error::{QuorumError, Result};
pub use format::{
    format_analysis_readable, format_analysis_summary, format_sample_readable, format_timestamp,
    format_transcript_with_timestamps,
};
pub use pipeline::{analyze_transcript, load_analysis, load_transcript, save_analysis};
pub use provider::{ChatModel, LanguageModel, ModelTier, Provider, ProviderConfig};
pub use sampler::{SamplerConfig, TranscriptSampler};
pub use types::{
    AnalysisResult, DeepResult, SampleReason, SampleResult, SampledSection, ScanResult, Segment,
    Transcript,
};

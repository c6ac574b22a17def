use std::path::Path;

use serde_json::json;
use tokio::fs;
use tracing::debug;

use crate::{
    analyzer::TwoPassAnalyzer,
    cache::ResponseCache,
    error::Result,
    format::{format_sample_readable, format_transcript_with_timestamps},
    sampler::TranscriptSampler,
    types::{AnalysisResult, Transcript},
};

pub const ANALYSIS_KIND_TWO_PASS: &str = "two_pass";

/// Load a transcript from a JSON file
pub async fn load_transcript(path: &Path) -> Result<Transcript> {
    let json_content = fs::read_to_string(path).await?;
    let transcript: Transcript = serde_json::from_str(&json_content)?;
    Ok(transcript)
}

/// Load an analysis result from a saved file
pub async fn load_analysis(path: &Path) -> Result<AnalysisResult> {
    let json_content = fs::read_to_string(path).await?;
    let result: AnalysisResult = serde_json::from_str(&json_content)?;
    Ok(result)
}

/// Save an analysis result to a file
pub async fn save_analysis(result: &AnalysisResult, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(result)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

/// Run the full cost-optimization pipeline for one transcript: sample when
/// the transcript is long enough, analyze in two passes, memoize through the
/// cache keyed by subject and sampling parameters.
pub async fn analyze_transcript(
    transcript: &Transcript,
    sampler: &TranscriptSampler,
    analyzer: &TwoPassAnalyzer,
    cache: &ResponseCache,
    subject_id: &str,
    force_refresh: bool,
) -> Result<AnalysisResult> {
    let full_text = format_transcript_with_timestamps(transcript);

    let sampled = sampler.should_sample(transcript);
    let scan_text = if sampled {
        let sample = sampler.sample(transcript);
        debug!(
            coverage = sample.coverage_rate,
            sections = sample.section_count,
            "sampling long transcript before triage"
        );
        format_sample_readable(&sample)
    } else {
        full_text.clone()
    };

    let extra = json!({ "sampled": sampled });
    cache
        .get_or_compute(
            subject_id,
            ANALYSIS_KIND_TWO_PASS,
            Some(&extra),
            force_refresh,
            || async { Ok(analyzer.analyze(&scan_text, &full_text).await) },
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::{
        provider::LanguageModel,
        types::Segment,
    };

    struct CountingModel {
        response: &'static str,
        calls: AtomicUsize,
    }

    impl CountingModel {
        fn new(response: &'static str) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for CountingModel {
        async fn complete(&self, _system: &str, _user: &str) -> crate::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.to_string())
        }
    }

    fn short_transcript() -> Transcript {
        Transcript {
            text: "call to order adjourned".to_string(),
            segments: vec![
                Segment {
                    start: 0.0,
                    end: 30.0,
                    text: "call to order".to_string(),
                },
                Segment {
                    start: 30.0,
                    end: 60.0,
                    text: "adjourned".to_string(),
                },
            ],
            language: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn second_invocation_is_served_from_cache() {
        let quiet_scan = r#"{"important_sections": [], "main_topics": ["minutes"],
            "key_participants": [], "tone": "routine", "needs_deep_analysis": false}"#;
        let fast = CountingModel::new(quiet_scan);
        let deep = CountingModel::new("{}");
        let analyzer = TwoPassAnalyzer::new(fast.clone(), deep.clone());
        let sampler = TranscriptSampler::default();
        let cache = ResponseCache::new(
            std::env::temp_dir().join(format!("quorum-pipeline-test-{}", Uuid::new_v4())),
            30,
        );
        let transcript = short_transcript();

        let first = analyze_transcript(&transcript, &sampler, &analyzer, &cache, "m1", false)
            .await
            .unwrap();
        let second = analyze_transcript(&transcript, &sampler, &analyzer, &cache, "m1", false)
            .await
            .unwrap();

        assert!(first.deep.is_none());
        assert_eq!(second.cost_note, first.cost_note);
        assert_eq!(fast.calls.load(Ordering::SeqCst), 1);
        assert_eq!(deep.calls.load(Ordering::SeqCst), 0);
    }
}

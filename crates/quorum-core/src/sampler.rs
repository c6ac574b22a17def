use std::collections::HashSet;

use regex::Regex;

use crate::types::{SampleReason, SampleResult, SampledSection, Segment, Transcript};

/// Decision-relevant vocabulary scanned for in every segment. A hit promotes
/// the surrounding context window into the sample.
const KEYWORDS: &[&str] = &[
    "vote",
    "votes",
    "voting",
    "motion",
    "motions",
    "budget",
    "approve",
    "approved",
    "approval",
    "resolution",
    "ordinance",
    "public comment",
    "emergency",
    "decision",
    "decisions",
    "deadline",
    "action item",
    "unanimous",
    "adopted",
    "appropriation",
    "amendment",
    "funding",
];

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Nominal target fraction of the transcript to sample. Actual coverage
    /// can exceed this when keyword density is high.
    pub sample_rate: f64,
    /// Seconds of context pulled in around each keyword hit.
    pub keyword_context_secs: f64,
    /// Spacing between periodic samples across the middle of the transcript.
    pub periodic_interval_secs: f64,
    /// Length of each periodic sample window.
    pub periodic_duration_secs: f64,
    /// Below this total duration, callers should use the full transcript.
    pub sampling_threshold_secs: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 0.2,
            keyword_context_secs: 30.0,
            periodic_interval_secs: 600.0,
            periodic_duration_secs: 60.0,
            sampling_threshold_secs: 30.0 * 60.0,
        }
    }
}

/// Selects a bounded, information-dense subset of a long transcript.
///
/// Selection runs in four fixed stages: intro window, conclusion window,
/// keyword context windows, periodic samples across the remaining middle.
/// The stages are deterministic and the output preserves discovery order.
pub struct TranscriptSampler {
    config: SamplerConfig,
    keyword_re: Regex,
}

impl TranscriptSampler {
    pub fn new(config: SamplerConfig) -> Self {
        let pattern = format!(r"(?i)\b(?:{})\b", KEYWORDS.join("|"));
        // The pattern is built from a fixed vocabulary, so compilation
        // cannot fail at runtime.
        let keyword_re = Regex::new(&pattern).expect("keyword vocabulary is a valid pattern");
        Self { config, keyword_re }
    }

    /// Whether sampling is worth it for this transcript. Short transcripts
    /// should be analyzed in full.
    pub fn should_sample(&self, transcript: &Transcript) -> bool {
        transcript.duration_seconds() > self.config.sampling_threshold_secs
    }

    pub fn sample(&self, transcript: &Transcript) -> SampleResult {
        let segments = &transcript.segments;
        let total_duration = transcript.duration_seconds();
        if segments.is_empty() || total_duration <= 0.0 {
            return SampleResult::default();
        }

        let mut sections: Vec<SampledSection> = Vec::new();

        // Intro and conclusion windows each take up to 10% of the meeting,
        // capped at five minutes. The conclusion never starts before the
        // intro ends.
        let margin = (total_duration * 0.1).min(300.0);
        let intro_end = margin;
        let conclusion_start = (total_duration - margin).max(intro_end);

        if let Some(section) = extract_section(segments, 0.0, intro_end, SampleReason::Intro) {
            sections.push(section);
        }
        if let Some(section) = extract_section(
            segments,
            conclusion_start,
            total_duration,
            SampleReason::Conclusion,
        ) {
            sections.push(section);
        }

        // Keyword hits expand to a context window around the matching
        // segment. Windows are deduplicated by their integer-second range;
        // adjacent-but-distinct windows are intentionally not merged.
        let mut keyword_spans: Vec<(f64, f64)> = Vec::new();
        let mut seen_ranges: HashSet<(i64, i64)> = HashSet::new();
        for segment in segments {
            if !self.keyword_re.is_match(&segment.text) {
                continue;
            }
            let start = (segment.start - self.config.keyword_context_secs).max(0.0);
            let end = segment.end + self.config.keyword_context_secs;
            if !seen_ranges.insert((start as i64, end as i64)) {
                continue;
            }
            keyword_spans.push((start, end));
            if let Some(section) =
                extract_section(segments, start, end, SampleReason::KeywordMatch)
            {
                sections.push(section);
            }
        }

        // Periodic samples keep coverage over stretches with no keyword
        // activity. A candidate is dropped when either edge lands inside a
        // keyword span.
        let mut cursor = intro_end;
        while cursor < conclusion_start {
            let window_end = cursor + self.config.periodic_duration_secs;
            let overlaps_keyword = keyword_spans.iter().any(|&(ks, ke)| {
                (cursor >= ks && cursor <= ke) || (window_end >= ks && window_end <= ke)
            });
            if !overlaps_keyword
                && let Some(section) =
                    extract_section(segments, cursor, window_end, SampleReason::PeriodicSample)
            {
                sections.push(section);
            }
            cursor += self.config.periodic_interval_secs;
        }

        let sampled_duration: f64 = sections.iter().map(|s| s.end - s.start).sum();
        let combined_text = combine_sections(&sections);
        let section_count = sections.len();

        SampleResult {
            sections,
            combined_text,
            total_duration,
            sampled_duration,
            coverage_rate: sampled_duration / total_duration,
            section_count,
        }
    }
}

impl Default for TranscriptSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

/// Collect every segment fully contained in `[start, end]` into one section.
/// Partially overlapping segments are excluded by contract. Returns `None`
/// when the window holds no text.
fn extract_section(
    segments: &[Segment],
    start: f64,
    end: f64,
    reason: SampleReason,
) -> Option<SampledSection> {
    let text: String = segments
        .iter()
        .filter(|s| s.start >= start && s.end <= end)
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return None;
    }
    Some(SampledSection {
        text,
        start,
        end,
        reason,
    })
}

/// Render sections as labeled blocks in discovery order, each tagged with
/// its reason and time range.
fn combine_sections(sections: &[SampledSection]) -> String {
    sections
        .iter()
        .map(|s| {
            format!(
                "[{} - {:.0}s to {:.0}s]\n{}",
                s.reason.label(),
                s.start,
                s.end,
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_with(segments: Vec<Segment>) -> Transcript {
        Transcript {
            text: segments
                .iter()
                .map(|s| s.text.clone())
                .collect::<Vec<_>>()
                .join(" "),
            segments,
            language: "en".to_string(),
        }
    }

    /// Uniform filler segments with no keyword hits, `step` seconds each.
    fn uniform_segments(duration: f64, step: f64) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut t = 0.0;
        while t < duration {
            segments.push(Segment {
                start: t,
                end: (t + step).min(duration),
                text: "the committee continued its review of routine items".to_string(),
            });
            t += step;
        }
        segments
    }

    fn starts_for(result: &SampleResult, reason: SampleReason) -> Vec<f64> {
        result
            .sections
            .iter()
            .filter(|s| s.reason == reason)
            .map(|s| s.start)
            .collect()
    }

    #[test]
    fn empty_transcript_yields_empty_aggregate() {
        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(vec![]));
        assert!(result.sections.is_empty());
        assert_eq!(result.total_duration, 0.0);
        assert_eq!(result.coverage_rate, 0.0);
        assert_eq!(result.section_count, 0);
        assert!(result.combined_text.is_empty());
    }

    #[test]
    fn forty_five_minute_meeting_without_keywords() {
        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(uniform_segments(2700.0, 10.0)));

        let intro = &result.sections[0];
        assert_eq!(intro.reason, SampleReason::Intro);
        assert_eq!(intro.start, 0.0);
        assert_eq!(intro.end, 270.0);

        let conclusion = &result.sections[1];
        assert_eq!(conclusion.reason, SampleReason::Conclusion);
        assert_eq!(conclusion.start, 2430.0);
        assert_eq!(conclusion.end, 2700.0);

        assert!(starts_for(&result, SampleReason::KeywordMatch).is_empty());
        assert_eq!(
            starts_for(&result, SampleReason::PeriodicSample),
            vec![270.0, 870.0, 1470.0, 2070.0]
        );

        assert_eq!(result.section_count, 6);
        let expected = (270.0 + 270.0 + 4.0 * 60.0) / 2700.0;
        assert!((result.coverage_rate - expected).abs() < 1e-9);
        assert!(
            (result.coverage_rate - result.sampled_duration / result.total_duration).abs() < 1e-9
        );
    }

    #[test]
    fn conclusion_never_starts_before_intro_ends() {
        let sampler = TranscriptSampler::default();
        for duration in [90.0, 400.0, 1000.0, 7200.0] {
            let result = sampler.sample(&transcript_with(uniform_segments(duration, 5.0)));
            let intro_end = result
                .sections
                .iter()
                .find(|s| s.reason == SampleReason::Intro)
                .map(|s| s.end)
                .unwrap_or(0.0);
            let conclusion_start = result
                .sections
                .iter()
                .find(|s| s.reason == SampleReason::Conclusion)
                .map(|s| s.start)
                .unwrap_or(f64::MAX);
            assert!(conclusion_start >= intro_end, "duration {duration}");
        }
    }

    #[test]
    fn keyword_windows_deduplicate_by_integer_second_range() {
        let mut segments = uniform_segments(2700.0, 10.0);
        // Two distinct hits whose context windows truncate to the same
        // integer-second range must produce a single section.
        segments.push(Segment {
            start: 1000.2,
            end: 1004.8,
            text: "motion to approve the budget".to_string(),
        });
        segments.push(Segment {
            start: 1000.9,
            end: 1004.9,
            text: "the motion carried".to_string(),
        });
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(segments));
        assert_eq!(starts_for(&result, SampleReason::KeywordMatch).len(), 1);
    }

    #[test]
    fn keyword_detection_is_word_boundary_matched() {
        let mut segments = uniform_segments(2700.0, 10.0);
        // "devoted" contains "vote" but must not match.
        segments[50].text = "the board remained devoted to its agenda".to_string();

        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(segments));
        assert!(starts_for(&result, SampleReason::KeywordMatch).is_empty());
    }

    #[test]
    fn periodic_samples_skip_keyword_spans() {
        let mut segments = uniform_segments(2700.0, 10.0);
        // Keyword span [830, 900] swallows the periodic candidate at 870.
        segments[86].text = "roll call vote on the ordinance".to_string();

        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(segments));

        assert_eq!(starts_for(&result, SampleReason::KeywordMatch), vec![830.0]);
        let periodic = starts_for(&result, SampleReason::PeriodicSample);
        assert!(!periodic.contains(&870.0));
        assert_eq!(periodic, vec![270.0, 1470.0, 2070.0]);
    }

    #[test]
    fn section_text_uses_strict_containment() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 100.0,
                text: "opening remarks".to_string(),
            },
            // Straddles the intro boundary at 270 and must be excluded.
            Segment {
                start: 260.0,
                end: 280.0,
                text: "straddling item".to_string(),
            },
            Segment {
                start: 280.0,
                end: 2700.0,
                text: "rest of the meeting".to_string(),
            },
        ];
        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(segments));

        let intro = result
            .sections
            .iter()
            .find(|s| s.reason == SampleReason::Intro)
            .unwrap();
        assert_eq!(intro.text, "opening remarks");
    }

    #[test]
    fn combined_text_tags_reason_and_range() {
        let sampler = TranscriptSampler::default();
        let result = sampler.sample(&transcript_with(uniform_segments(2700.0, 10.0)));
        assert!(result.combined_text.starts_with("[intro - 0s to 270s]\n"));
        assert!(result.combined_text.contains("[conclusion - 2430s to 2700s]"));
        assert!(result.combined_text.contains("[periodic_sample - 870s to 930s]"));
    }

    #[test]
    fn sampling_gated_by_duration_threshold() {
        let sampler = TranscriptSampler::default();
        assert!(!sampler.should_sample(&transcript_with(uniform_segments(1799.0, 10.0))));
        assert!(sampler.should_sample(&transcript_with(uniform_segments(1801.0, 10.0))));
    }
}

use crate::types::{AnalysisResult, SampleResult, Transcript};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format transcript segments with timestamps
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start), seg.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a sample for downstream prompt consumption: a coverage header
/// followed by the reason-tagged section blocks.
pub fn format_sample_readable(sample: &SampleResult) -> String {
    format!(
        "Sampled transcript: {:.1}% coverage of a {:.0} minute meeting, {} sections\n\n{}",
        sample.coverage_rate * 100.0,
        sample.total_duration / 60.0,
        sample.section_count,
        sample.combined_text
    )
}

fn or_tbd(value: &str) -> &str {
    if value.trim().is_empty() { "TBD" } else { value }
}

/// Bounded human-readable summary of an analysis: topics, up to five
/// decisions, up to five action items, tone. Downstream consumers rely on
/// the five-item truncation and the TBD placeholders.
pub fn format_analysis_summary(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Topics: {}\n",
        result.scan.main_topics.join(", ")
    ));

    if let Some(deep) = &result.deep {
        if !deep.decisions.is_empty() {
            output.push_str("Decisions:\n");
            for decision in deep.decisions.iter().take(5) {
                output.push_str(&format!("  • {}", decision.decision));
                if !decision.vote.trim().is_empty() {
                    output.push_str(&format!(" ({})", decision.vote));
                }
                output.push('\n');
            }
        }
        if !deep.action_items.is_empty() {
            output.push_str("Action items:\n");
            for item in deep.action_items.iter().take(5) {
                output.push_str(&format!(
                    "  • {} (owner: {}, due: {})\n",
                    item.task,
                    or_tbd(&item.owner),
                    or_tbd(&item.deadline)
                ));
            }
        }
    }

    output.push_str(&format!("Tone: {}\n", result.scan.tone));
    output
}

/// Format a full analysis as human-readable markdown
pub fn format_analysis_readable(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str("# Meeting Analysis\n\n");

    output.push_str("## Topics\n\n");
    for topic in &result.scan.main_topics {
        output.push_str(&format!("• {}\n", topic));
    }
    output.push('\n');

    if !result.scan.key_participants.is_empty() {
        output.push_str("## Participants\n\n");
        output.push_str(&result.scan.key_participants.join(", "));
        output.push_str("\n\n");
    }

    if !result.scan.important_sections.is_empty() {
        output.push_str("## Important Sections\n\n");
        for (i, section) in result.scan.important_sections.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, section));
        }
        output.push('\n');
    }

    if let Some(deep) = &result.deep {
        if !deep.decisions.is_empty() {
            output.push_str("## Decisions\n\n");
            for decision in &deep.decisions {
                output.push_str(&format!("• **{}**", decision.decision));
                if !decision.vote.trim().is_empty() {
                    output.push_str(&format!(" — vote: {}", decision.vote));
                }
                if !decision.context.trim().is_empty() {
                    output.push_str(&format!("\n  {}", decision.context));
                }
                output.push('\n');
            }
            output.push('\n');
        }

        if !deep.action_items.is_empty() {
            output.push_str("## Action Items\n\n");
            for item in &deep.action_items {
                output.push_str(&format!(
                    "• {} (owner: {}, due: {}, priority: {})\n",
                    item.task,
                    or_tbd(&item.owner),
                    or_tbd(&item.deadline),
                    or_tbd(&item.priority)
                ));
            }
            output.push('\n');
        }

        if !deep.key_quotes.is_empty() {
            output.push_str("## Key Quotes\n\n");
            for quote in &deep.key_quotes {
                output.push_str(&format!("> \"{}\" — {}\n", quote.quote, quote.speaker));
            }
            output.push('\n');
        }

        if !deep.sentiment_analysis.summary.trim().is_empty() {
            output.push_str("## Sentiment\n\n");
            output.push_str(&deep.sentiment_analysis.summary);
            output.push_str("\n\n");
        }

        if !deep.implications.is_empty() {
            output.push_str("## Implications\n\n");
            for implication in &deep.implications {
                output.push_str(&format!("• {}\n", implication));
            }
            output.push('\n');
        }
    }

    output.push_str(&format!("**Tone:** {}\n", result.scan.tone));
    output.push_str(&format!("**Cost:** {}\n", result.cost_note));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionItem, Decision, DeepResult, ScanResult};

    #[test]
    fn timestamps_render_as_minutes_and_seconds() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(75.5), "01:15");
        assert_eq!(format_timestamp(3599.0), "59:59");
    }

    #[test]
    fn summary_truncates_to_five_and_defaults_to_tbd() {
        let deep = DeepResult {
            decisions: (0..7)
                .map(|i| Decision {
                    decision: format!("decision {i}"),
                    ..Default::default()
                })
                .collect(),
            action_items: (0..7)
                .map(|i| ActionItem {
                    task: format!("task {i}"),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let result = AnalysisResult {
            scan: ScanResult {
                main_topics: vec!["zoning".to_string()],
                tone: "contentious".to_string(),
                ..Default::default()
            },
            deep: Some(deep),
            cost_note: "ran both passes".to_string(),
        };

        let summary = format_analysis_summary(&result);
        assert_eq!(summary.matches("decision ").count(), 5);
        assert_eq!(summary.matches("task ").count(), 5);
        assert!(!summary.contains("decision 5"));
        assert!(summary.contains("owner: TBD, due: TBD"));
        assert!(summary.contains("Tone: contentious"));
    }

    #[test]
    fn summary_omits_deep_sections_when_absent() {
        let result = AnalysisResult {
            scan: ScanResult {
                main_topics: vec!["parks".to_string()],
                tone: "calm".to_string(),
                ..Default::default()
            },
            deep: None,
            cost_note: "skipped expensive pass".to_string(),
        };
        let summary = format_analysis_summary(&result);
        assert!(!summary.contains("Decisions"));
        assert!(!summary.contains("Action items"));
    }
}

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    provider::LanguageModel,
    types::{AnalysisResult, DeepResult, ScanResult},
};

static TRIAGE_PROMPT: &str = r#"
  You are a meeting transcript triage scanner. You get a condensed sample of a
  long meeting transcript and decide, cheaply, what it contains.

  OUTPUT: Return ONLY valid JSON (no markdown, no explanation):
  {
    "important_sections": ["short description of a section worth deeper analysis"],
    "main_topics": ["topic1", "topic2"],
    "key_participants": ["name or role"],
    "tone": "one short phrase describing the overall tone",
    "needs_deep_analysis": true
  }

  RULES:
  - main_topics: at most 5 items
  - important_sections: only sections with decisions, votes, budget moves,
    conflicts, or commitments; empty array if nothing stands out
  - needs_deep_analysis: true only if the transcript contains material a
    detailed pass would surface (decisions, action items, disputes)
  - Output ONLY the JSON, nothing else
"#;

static DEEP_PROMPT: &str = r#"
  You are a meeting analyst producing a detailed structured record of a
  meeting transcript.

  OUTPUT: Return ONLY valid JSON (no markdown, no explanation):
  {
    "decisions": [
      {"decision": "what was decided", "context": "why", "vote": "e.g. 5-2", "timestamp": "MM:SS if known"}
    ],
    "action_items": [
      {"task": "what must happen", "owner": "who", "deadline": "when", "priority": "high|medium|low"}
    ],
    "key_quotes": [
      {"speaker": "who", "quote": "verbatim quote", "context": "what it was about"}
    ],
    "sentiment_analysis": {"positive": "...", "negative": "...", "neutral": "...", "summary": "..."},
    "implications": ["consequence or follow-on effect"]
  }

  RULES:
  - Use empty arrays/strings for anything the transcript does not support
  - Quotes must be verbatim from the transcript
  - Output ONLY the JSON, nothing else
"#;

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Character budget submitted to the triage tier.
    pub scan_char_budget: usize,
    /// Character budget submitted to the deep tier.
    pub deep_char_budget: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            scan_char_budget: 8000,
            deep_char_budget: 8000,
        }
    }
}

/// Gates an expensive deep analysis behind a cheap triage pass.
///
/// `analyze` is infallible by contract: every transport or parse failure
/// degrades to a documented fail-safe value. A failed triage forces the deep
/// pass to run; a failed deep pass degrades to triage-only output.
pub struct TwoPassAnalyzer {
    fast: Arc<dyn LanguageModel>,
    deep: Arc<dyn LanguageModel>,
    config: AnalyzerConfig,
}

impl TwoPassAnalyzer {
    pub fn new(fast: Arc<dyn LanguageModel>, deep: Arc<dyn LanguageModel>) -> Self {
        Self::with_config(fast, deep, AnalyzerConfig::default())
    }

    pub fn with_config(
        fast: Arc<dyn LanguageModel>,
        deep: Arc<dyn LanguageModel>,
        config: AnalyzerConfig,
    ) -> Self {
        Self { fast, deep, config }
    }

    /// Run triage on `scan_text` (ideally pre-sampled) and, when the gate
    /// fires, deep analysis on `full_text`.
    pub async fn analyze(&self, scan_text: &str, full_text: &str) -> AnalysisResult {
        let scan = self.triage(scan_text).await;

        if !scan.needs_deep_analysis && scan.important_sections.is_empty() {
            debug!("triage found nothing actionable, skipping deep pass");
            return AnalysisResult {
                scan,
                deep: None,
                cost_note: "skipped expensive pass (triage found nothing actionable)".to_string(),
            };
        }

        let deep = self.deep_pass(full_text, &scan.important_sections).await;
        AnalysisResult {
            scan,
            deep: Some(deep),
            cost_note: "ran triage and deep analysis".to_string(),
        }
    }

    async fn triage(&self, scan_text: &str) -> ScanResult {
        let user_prompt = format!(
            "Analyze this meeting transcript sample:\n\n{}",
            truncate_chars(scan_text, self.config.scan_char_budget)
        );
        match self.request(&*self.fast, TRIAGE_PROMPT, &user_prompt).await {
            Ok(scan) => scan,
            Err(e) => {
                warn!(error = %e, "triage pass failed, substituting fail-safe scan");
                ScanResult::failsafe()
            }
        }
    }

    async fn deep_pass(&self, full_text: &str, important_sections: &[String]) -> DeepResult {
        let focus = if important_sections.is_empty() {
            "No specific sections were flagged; analyze the transcript broadly.".to_string()
        } else {
            format!(
                "Focus on these sections flagged by triage:\n- {}",
                important_sections.join("\n- ")
            )
        };
        let user_prompt = format!(
            "{}\n\nMeeting transcript:\n\n{}",
            focus,
            truncate_chars(full_text, self.config.deep_char_budget)
        );
        match self.request(&*self.deep, DEEP_PROMPT, &user_prompt).await {
            Ok(deep) => deep,
            Err(e) => {
                warn!(error = %e, "deep pass failed, degrading to triage-only result");
                DeepResult::default()
            }
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        model: &dyn LanguageModel,
        system_prompt: &str,
        user_prompt: &str,
    ) -> crate::Result<T> {
        let raw = model.complete(system_prompt, user_prompt).await?;
        Ok(serde_json::from_str(strip_code_fences(&raw))?)
    }
}

/// Truncate to at most `max` characters without splitting a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Models sometimes wrap JSON in markdown code fences despite instructions.
/// Strip a leading ``` or ```json line and a trailing ``` line.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
    pub language: String,
}

impl Transcript {
    /// Total duration in seconds, taken from the last segment's end time.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}

/// A timestamped atomic unit of transcript text. Segments arrive ordered by
/// `start`; non-overlap is assumed in practice but not enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Why the sampler selected a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleReason {
    Intro,
    Conclusion,
    KeywordMatch,
    PeriodicSample,
}

impl SampleReason {
    pub fn label(&self) -> &'static str {
        match self {
            SampleReason::Intro => "intro",
            SampleReason::Conclusion => "conclusion",
            SampleReason::KeywordMatch => "keyword_match",
            SampleReason::PeriodicSample => "periodic_sample",
        }
    }
}

/// A reason-tagged span of the transcript selected by the sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledSection {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub reason: SampleReason,
}

/// Aggregate output of one sampling call. `sections` and `combined_text` are
/// in discovery order (intro, conclusion, keyword matches, periodic samples),
/// not chronological order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleResult {
    pub sections: Vec<SampledSection>,
    pub combined_text: String,
    pub total_duration: f64,
    pub sampled_duration: f64,
    pub coverage_rate: f64,
    pub section_count: usize,
}

/// Triage output from the cheap model tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub important_sections: Vec<String>,
    #[serde(default)]
    pub main_topics: Vec<String>,
    #[serde(default)]
    pub key_participants: Vec<String>,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub needs_deep_analysis: bool,
}

impl ScanResult {
    /// Substitute when the triage pass fails for any reason. Forces the deep
    /// pass to run: on error we analyze more, not less.
    pub fn failsafe() -> Self {
        Self {
            important_sections: Vec::new(),
            main_topics: Vec::new(),
            key_participants: Vec::new(),
            tone: "unknown".to_string(),
            needs_deep_analysis: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub vote: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub priority: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyQuote {
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    #[serde(default)]
    pub positive: String,
    #[serde(default)]
    pub negative: String,
    #[serde(default)]
    pub neutral: String,
    #[serde(default)]
    pub summary: String,
}

/// Output of the expensive model tier. `Default` is the fail-safe: all empty
/// containers, so a failed deep pass degrades to "triage only".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepResult {
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub key_quotes: Vec<KeyQuote>,
    #[serde(default)]
    pub sentiment_analysis: SentimentAnalysis,
    #[serde(default)]
    pub implications: Vec<String>,
}

/// Unified analysis record. `deep` is absent exactly when the gate decided
/// the expensive pass was unnecessary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scan: ScanResult,
    #[serde(default)]
    pub deep: Option<DeepResult>,
    pub cost_note: String,
}

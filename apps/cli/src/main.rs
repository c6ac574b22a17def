use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use quorum_core::{
    ChatModel, ModelTier, Provider, ResponseCache, SamplerConfig, TranscriptSampler,
    TwoPassAnalyzer, analyze_transcript, format_analysis_readable, load_transcript, save_analysis,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "quorum")]
#[command(about = "Analyze long meeting transcripts with cost-gated AI passes")]
struct Cli {
    /// Path to a transcript JSON file ({text, segments, language})
    transcript: PathBuf,

    /// AI provider backing both model tiers
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// Force re-analysis even if a cached result exists
    #[arg(short, long)]
    force: bool,

    /// Analyze the full transcript even when it is long enough to sample
    #[arg(long)]
    no_sample: bool,

    /// Write the full analysis JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print cache statistics and exit
    #[arg(long)]
    cache_stats: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = ResponseCache::new(
        ResponseCache::default_dir(),
        quorum_core::DEFAULT_RETENTION_DAYS,
    );

    if cli.cache_stats {
        let stats = cache.stats().await?;
        println!(
            "{} entries, {} bytes",
            style(stats.entries).bold(),
            stats.total_bytes
        );
        for (kind, count) in &stats.by_kind {
            println!("  {kind}: {count}");
        }
        return Ok(());
    }

    let provider: Provider = cli.provider.into();

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let spinner = create_spinner("Loading transcript...");
    let transcript = load_transcript(&cli.transcript).await?;
    spinner.finish_with_message(format!(
        "Loaded transcript: {:.0} minutes, {} segments",
        transcript.duration_seconds() / 60.0,
        transcript.segments.len()
    ));

    // A threshold no meeting reaches disables sampling entirely.
    let sampler = if cli.no_sample {
        TranscriptSampler::new(SamplerConfig {
            sampling_threshold_secs: f64::MAX,
            ..Default::default()
        })
    } else {
        TranscriptSampler::default()
    };

    let fast = ChatModel::for_tier(&provider, ModelTier::Fast)?;
    let deep = ChatModel::for_tier(&provider, ModelTier::Deep)?;
    let analyzer = TwoPassAnalyzer::new(Arc::new(fast), Arc::new(deep));

    let subject_id = cli
        .transcript
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "transcript".to_string());

    let spinner = create_spinner(&format!("Analyzing with {}...", provider.name()));
    let result = analyze_transcript(
        &transcript,
        &sampler,
        &analyzer,
        &cache,
        &subject_id,
        cli.force,
    )
    .await?;
    spinner.finish_with_message(format!("Analysis complete ({})", result.cost_note));

    if let Some(output) = &cli.output {
        save_analysis(&result, output).await?;
        println!("{} {}", style("Saved:").green().bold(), output.display());
    }

    println!("\n{}", format_analysis_readable(&result));
    Ok(())
}

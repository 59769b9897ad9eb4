//! Analyze a rice-farming survey export
//!
//! Usage: analyze_survey <input.csv> [--config cfg.json] [--out dir]
//!
//! Writes `cleaned_data.csv`, `report.json` and `resume_executif.md` into the
//! output directory (default `resultats`). Log level via `RUST_LOG`.

use anyhow::{bail, Context, Result};
use rice_survey_analysis::{
    export_cleaned, AnalysisConfig, JsonFormatter, MarkdownFormatter, SurveyAnalyzer, SurveyData,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    out_dir: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut config = None;
    let mut out_dir = PathBuf::from("resultats");

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config = Some(PathBuf::from(args.next().context("--config requires a path")?));
            }
            "--out" => {
                out_dir = PathBuf::from(args.next().context("--out requires a directory")?);
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            path => {
                if input.is_some() {
                    bail!("Unexpected extra argument: {}", path);
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    let input = input.context("Usage: analyze_survey <input.csv> [--config cfg.json] [--out dir]")?;
    Ok(Args { input, config, out_dir })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    let display_threshold = config.thresholds.harmful_practice_display;
    let analyzer = SurveyAnalyzer::new(config)?;

    let data = SurveyData::load(&args.input)?;
    let analysis = analyzer.analyze(&data);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", args.out_dir))?;

    let cleaned_path = args.out_dir.join("cleaned_data.csv");
    export_cleaned(&analysis.cleaned, &data.resolution, &cleaned_path)?;

    let json_path = args.out_dir.join("report.json");
    let json = JsonFormatter::format(&analysis.report).context("Failed to serialize report")?;
    fs::write(&json_path, json).with_context(|| format!("Failed to write {:?}", json_path))?;

    let summary_path = args.out_dir.join("resume_executif.md");
    let summary = MarkdownFormatter::format(&analysis.report, display_threshold);
    fs::write(&summary_path, summary).with_context(|| format!("Failed to write {:?}", summary_path))?;

    info!(
        records = analysis.report.dataset.total_records,
        out_dir = %args.out_dir.display(),
        "Results written"
    );

    Ok(())
}

//! tag-genie: categorize free text with a zero-shot NLI model.
//!
//! Usage:
//!   tag-genie classify "We provide legal visa consulting services" --tags "Legal,Travel,Real Estate"
//!   tag-genie process listings.csv tagged.csv --column Description --tags "Legal,Travel"
//!   tag-genie audit tagged.csv
//!   tag-genie clean tagged.csv final.csv

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use tag_genie::models::ModernBertSize;
use tag_genie::pipelines::utils::DeviceRequest;
use tag_genie::pipelines::zero_shot::{ZeroShotClassificationPipelineBuilder, ZeroShotModernBert};
use tag_genie::pipelines::ZeroShotClassificationPipeline;
use tag_genie::tagging::{self, BatchJob, BatchOptions, LabelSet, RowOutcome};
use tag_genie::TagGenieConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tag-genie")]
#[command(about = "Tag free text with a best-fit label from your own tag set")]
#[command(version)]
struct Cli {
    /// JSON config file (see TagGenieConfig for keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run the model on CPU even if CUDA is available
    #[arg(long, global = true)]
    cpu: bool,

    /// Model size (base or large)
    #[arg(long, global = true)]
    model_size: Option<ModernBertSize>,

    /// Load the model from a local directory instead of the Hugging Face Hub
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a single piece of text
    Classify {
        /// Text to classify
        text: String,

        /// Comma-separated list of candidate tags
        #[arg(short, long)]
        tags: String,
    },

    /// Classify the text column of every row of a CSV file
    Process {
        /// Source CSV file
        input: PathBuf,

        /// Where to write the tagged CSV file
        output: PathBuf,

        /// Name of the column holding the text to classify
        #[arg(short, long)]
        column: String,

        /// Comma-separated list of candidate tags
        #[arg(short, long)]
        tags: String,
    },

    /// Agreement rates and high-risk mismatches of a processed CSV
    Audit {
        /// Processed CSV file (output of `process`)
        input: PathBuf,
    },

    /// Apply the compliance policy to a processed CSV
    Clean {
        /// Processed CSV file
        input: PathBuf,

        /// Where to write the cleaned CSV file
        output: PathBuf,
    },
}

type Pipeline = ZeroShotClassificationPipeline<ZeroShotModernBert>;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = TagGenieConfig::load(cli.config.as_deref())?;
    if cli.cpu {
        config.model.device = tag_genie::core::config::DeviceChoice::Cpu;
    }
    if let Some(size) = cli.model_size {
        config.model.size = size;
    }
    if let Some(dir) = cli.model_dir {
        config.model.dir = Some(dir);
    }

    match cli.command {
        Command::Classify { text, tags } => classify(&config, &text, &tags),
        Command::Process {
            input,
            output,
            column,
            tags,
        } => process(&config, input, output, column, &tags),
        Command::Audit { input } => audit(&config, input),
        Command::Clean { input, output } => clean(&config, input, output),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_pipeline(config: &TagGenieConfig) -> Result<Pipeline> {
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Loading classification model (this may take a moment)...");

    let pipeline = ZeroShotClassificationPipelineBuilder::from_config(&config.model).build();
    spinner.finish_and_clear();

    let pipeline = pipeline.context("could not load the classification model")?;
    if config.model.device_request() == DeviceRequest::Default && pipeline.device().is_cpu() {
        tracing::info!("no CUDA device found, running on CPU");
    }
    Ok(pipeline)
}

fn classify(config: &TagGenieConfig, text: &str, tags: &str) -> Result<()> {
    let labels = LabelSet::from_tag_list(tags)?;
    let pipeline = load_pipeline(config)?;

    let report = tagging::tag_text(&pipeline, text, &labels, config.report.top_k)?;

    println!("Text: {text}");
    if report.abstained {
        println!("Result: no confident match ({:.2}%)", report.confidence * 100.0);
    } else {
        println!("Result: {} ({:.2}%)", report.label, report.confidence * 100.0);
    }
    println!("\n{:-<50}", "");
    println!("{:<38} {:>11}", "Tag", "Confidence");
    println!("{:-<50}", "");
    for (label, score) in &report.top {
        println!("{:<38} {:>10.2}%", label, score * 100.0);
    }
    println!("{:-<50}", "");
    Ok(())
}

fn process(
    config: &TagGenieConfig,
    input: PathBuf,
    output: PathBuf,
    column: String,
    tags: &str,
) -> Result<()> {
    // Every caller mistake surfaces before the model is loaded.
    let labels = LabelSet::from_tag_list(tags)?;
    let options = BatchOptions::from_config(column, &config.output);
    let job = BatchJob::open(&input, options)?;
    tracing::info!(input = %input.display(), rows = job.len(), "starting batch processing");

    let pipeline = load_pipeline(config)?;
    let out = File::create(&output)
        .with_context(|| format!("cannot create output file {}", output.display()))?;

    let bar = ProgressBar::new(job.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} Processing rows [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )?
        .progress_chars("#>-"),
    );

    let summary = job.run_with_progress(&pipeline, &labels, out, |progress| {
        if let RowOutcome::Failed(err) = progress.outcome {
            bar.println(format!("Error processing row {}: {err}", progress.row));
        }
        bar.inc(1);
    })?;
    bar.finish_and_clear();

    println!(
        "Processed {} rows ({} tagged, {} no match, {} failed). Saved to {}",
        summary.total,
        summary.tagged - summary.abstained,
        summary.abstained,
        summary.failed.len(),
        output.display()
    );
    if !summary.failed.is_empty() {
        let rows: Vec<String> = summary.failed.iter().map(|f| f.row.to_string()).collect();
        println!("Failed rows: {}", rows.join(", "));
    }
    Ok(())
}

fn audit(config: &TagGenieConfig, input: PathBuf) -> Result<()> {
    let report = tagging::audit_file(&input, config)?;
    let thresholds = &config.audit;

    println!("\nCompliance Audit Report: {}\n", input.display());
    println!("{:-<70}", "");
    println!("{:<40} {:>12} {:>15}", "Metric", "Count", "Percentage");
    println!("{:-<70}", "");
    let rows = [
        ("Total Rows", report.total),
        ("Total Agreement", report.agreements),
        ("High Confidence Agreement", report.high_confidence_agreements),
        ("Low Confidence", report.low_confidence),
        ("Danger Zone (High Conf Mismatch)", report.high_confidence_disagreements()),
    ];
    for (metric, count) in rows {
        println!("{:<40} {:>12} {:>14.1}%", metric, count, report.percent(count));
    }
    println!("{:-<70}", "");

    if !report.danger.is_empty() {
        println!("\nDANGER ZONE EXAMPLES (confidence > {:.2}, prediction disagrees)", thresholds.high_confidence);
        println!("{:-<100}", "");
        println!("{:<30} {:<22} {:<40} {:>6}", "Name", "Original", "AI Prediction", "Conf");
        println!("{:-<100}", "");
        for row in report.danger.iter().take(thresholds.danger_examples) {
            let name: String = row.name.chars().take(30).collect();
            println!(
                "{:<30} {:<22} {:<40} {:>6.2}",
                name, row.original, row.predicted, row.confidence
            );
        }
        if report.danger.len() > thresholds.danger_examples {
            println!("...and {} more rows.", report.danger.len() - thresholds.danger_examples);
        }
    }
    Ok(())
}

fn clean(config: &TagGenieConfig, input: PathBuf, output: PathBuf) -> Result<()> {
    let summary = tagging::clean_file(&input, &output, config)?;

    println!("\nAudit complete. Fixes applied to: {}\n", output.display());
    println!("{:-<70}", "");
    println!("{:<40} {:>12} {:>15}", "Metric", "Count", "Percentage");
    println!("{:-<70}", "");
    let rows = [
        ("Total Rows", summary.total),
        ("Verified (Kept Original)", summary.verified),
        ("Low Confidence (Needs Review)", summary.needs_review),
        ("Auto-Fixed (High Risk Errors)", summary.auto_fixed),
    ];
    for (metric, count) in rows {
        println!("{:<40} {:>12} {:>14.1}%", metric, count, summary.percent(count));
    }
    println!("{:-<70}", "");
    Ok(())
}

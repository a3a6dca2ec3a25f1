//! Extract command - run the quote pipeline over documents.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use quotex_core::{ExtractionReport, InputDocument, QuotePipeline, QuotexConfig};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob patterns (xlsx, xls, ods, csv, pdf, txt)
    #[arg(required_unless_present = "email_body")]
    inputs: Vec<String>,

    /// Plain-text email body to scan for inline tables (repeatable)
    #[arg(short, long)]
    email_body: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Disable the OCR fallback for unreadable PDFs
    #[arg(long)]
    no_ocr: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Print rejected products to stderr
    #[arg(long)]
    show_errors: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// CSV, one line per product
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if args.no_ocr {
        config.pdf.ocr_fallback = false;
    }
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }
    if config.pdf.ocr_fallback && !config.model_path(&config.ocr.detection_model).exists() {
        debug!(
            "No OCR models in {}, scanned PDFs will fail",
            config.ocr.model_dir.display()
        );
    }

    let documents = collect_documents(&args)?;
    info!("Processing {} documents", documents.len());

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos}/{len} {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = extract_blocking(config, documents, pb.clone()).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            return Err(e);
        }
    };

    if args.show_errors && !report.errors.is_empty() {
        eprintln!("{}", style("Rejected products:").yellow());
        for error in &report.errors {
            eprintln!("  - {} [{}]: {}", error.product, error.source, error.reasons.join("; "));
        }
    }
    for document in &report.documents {
        if let Some(error) = &document.error {
            eprintln!("{} {}: {}", style("!").yellow(), document.name, error);
        }
    }

    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} {} products written to {}",
            style("✓").green(),
            report.products.len(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Build the pipeline and run it off the async runtime. The OCR engine is
/// not `Send`, so it is created on the blocking thread.
async fn extract_blocking(
    config: QuotexConfig,
    documents: Vec<InputDocument>,
    pb: ProgressBar,
) -> anyhow::Result<ExtractionReport> {
    let report = tokio::task::spawn_blocking(move || {
        let pipeline = QuotePipeline::from_config(config);
        if !pipeline.has_ocr() && pipeline.config().pdf.ocr_fallback {
            debug!("OCR fallback enabled but no recognizer loaded");
        }
        pipeline.process_with(&documents, |summary| {
            pb.inc(1);
            pb.set_message(format!("{} ({} rows)", summary.name, summary.rows));
        })
    })
    .await??;
    Ok(report)
}

/// Expand globs and wrap every input as a document, inputs first.
fn collect_documents(args: &ExtractArgs) -> anyhow::Result<Vec<InputDocument>> {
    let mut documents = Vec::new();

    for input in &args.inputs {
        for path in expand_input(input)? {
            documents.push(InputDocument::from_path(path)?);
        }
    }

    for path in &args.email_body {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read email body {}: {}", path.display(), e))?;
        documents.push(InputDocument::email_body(path.display().to_string(), text));
    }

    Ok(documents)
}

fn expand_input(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let is_pattern = input.contains(['*', '?', '[']);
    if !is_pattern {
        let path = PathBuf::from(input);
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
        return Ok(vec![path]);
    }

    let mut paths: Vec<PathBuf> = glob::glob(input)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        anyhow::bail!("No files match pattern: {}", input);
    }
    Ok(paths)
}

fn format_report(report: &ExtractionReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ExtractionReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "sku",
        "description",
        "quantity",
        "unit_price",
        "total_price",
        "source",
        "sources",
        "category",
        "source_file",
    ])?;

    for product in &report.products {
        let sources: Vec<&str> = product.metadata.sources.iter().map(|s| s.tag()).collect();
        wtr.write_record([
            product.sku.clone(),
            product.description.clone(),
            product.quantity.to_string(),
            product.unit_price.to_string(),
            product.total_price.map(|t| t.to_string()).unwrap_or_default(),
            product.source.tag().to_string(),
            sources.join("+"),
            product.metadata.category.clone().unwrap_or_default(),
            product.source_file.clone().unwrap_or_default(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(report: &ExtractionReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Products: {}\n", report.products.len()));
    for product in &report.products {
        let price = if product.is_priced() {
            product.unit_price.to_string()
        } else {
            "unpriced".to_string()
        };
        output.push_str(&format!(
            "  {:<16} {:>5} x {:<12} {}\n",
            product.sku, product.quantity, price, product.description
        ));
    }
    output.push_str(&format!("Priced total: {}\n", report.priced_total()));

    if !report.errors.is_empty() {
        output.push_str(&format!("Rejected: {}\n", report.errors.len()));
    }

    output.push_str("\nDocuments:\n");
    for document in &report.documents {
        let status = match &document.error {
            Some(error) => format!("failed: {}", error),
            None if document.ocr_used => format!("{} rows (OCR)", document.rows),
            None => format!("{} rows", document.rows),
        };
        output.push_str(&format!("  {} [{}] {}\n", document.name, document.kind, status));
    }

    if !report.findings.is_empty() {
        output.push_str(&format!("\nFree-text findings: {}\n", report.findings.len()));
        for finding in &report.findings {
            output.push_str(&format!("  {:.1}  {}\n", finding.confidence, finding.text));
        }
    }

    output
}

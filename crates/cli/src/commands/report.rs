//! report command - Inventory every bucket
//!
//! Walks every bucket's object listing and prints object count, total size
//! and the most recent modification per bucket.

use binv_core::{InventoryEntry, InventoryReport, ReportSummary, run_inventory};
use binv_s3::S3Client;
use clap::Args;
use comfy_table::{CellAlignment, Table, presets};
use jiff::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};

use super::Settings;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, InventoryProgress};

/// Inventory every bucket
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Keys requested per listing page (1-1000)
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=1000))]
    pub page_size: Option<i32>,

    /// Stop at the first bucket that cannot be listed
    #[arg(long, default_value = "false")]
    pub fail_fast: bool,

    /// Show sizes in bytes instead of binary units
    #[arg(long, default_value = "false")]
    pub bytes: bool,
}

/// Output structure for the report command (JSON format)
#[derive(Debug, Serialize)]
struct ReportOutput {
    buckets: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailureOutput>,
    summary: SummaryOutput,
}

#[derive(Debug, Serialize)]
struct FailureOutput {
    bucket: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct SummaryOutput {
    total_buckets: usize,
    failed_buckets: usize,
    total_files: u64,
    total_size_bytes: u64,
    total_size_human: String,
    last_modified: Option<Timestamp>,
}

impl From<ReportSummary> for SummaryOutput {
    fn from(summary: ReportSummary) -> Self {
        Self {
            total_buckets: summary.buckets,
            failed_buckets: summary.failed,
            total_files: summary.files,
            total_size_bytes: summary.size_bytes,
            total_size_human: humansize::format_size(summary.size_bytes, humansize::BINARY),
            last_modified: summary.last_modified,
        }
    }
}

impl ReportOutput {
    fn new(report: &InventoryReport) -> Self {
        Self {
            buckets: report.to_records(),
            failures: report
                .failures()
                .map(|f| FailureOutput {
                    bucket: f.bucket.name.clone(),
                    error: f.message.clone(),
                })
                .collect(),
            summary: report.summary().into(),
        }
    }
}

/// Execute the report command
pub async fn execute(args: ReportArgs, settings: Settings) -> ExitCode {
    let formatter = Formatter::new(settings.output.clone());

    let mut inventory = settings.inventory;
    if args.page_size.is_some() {
        inventory.page_size = args.page_size;
    }
    inventory.fail_fast |= args.fail_fast;

    let options = match inventory.to_options() {
        Ok(options) => options,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::UsageError;
        }
    };

    let client = match S3Client::new(&settings.connection).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let progress = InventoryProgress::new(settings.output, "Listing buckets");
    let result = run_inventory(&client, &options, &progress).await;
    progress.finish();

    let report = match result {
        Ok(report) => {
            tracing::debug!(
                buckets = report.len(),
                failed = report.failures().count(),
                "inventory complete"
            );
            report
        }
        Err(e) => {
            formatter.error(&format!("Inventory failed: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&ReportOutput::new(&report));
    } else if report.is_empty() {
        formatter.println("No buckets found");
    } else {
        formatter.println(&render_table(&report, args.bytes).to_string());

        let summary = report.summary();
        formatter.println(&format!(
            "\nTotal: {} buckets, {} objects, {}",
            summary.buckets,
            summary.files,
            format_size(summary.size_bytes, args.bytes)
        ));
        if summary.failed > 0 {
            formatter.warning(&format!(
                "{} of {} buckets could not be inventoried",
                summary.failed, summary.buckets
            ));
        }
    }

    if report.has_failures() {
        ExitCode::PartialFailure
    } else {
        ExitCode::Success
    }
}

fn format_size(bytes: u64, raw: bool) -> String {
    if raw {
        bytes.to_string()
    } else {
        humansize::format_size(bytes, humansize::BINARY)
    }
}

fn format_date(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Build the human-readable table, one row per bucket in listing order
fn render_table(report: &InventoryReport, raw_bytes: bool) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_header(vec!["Bucket", "Created", "Files", "Size", "Last Modified"]);

    for entry in report.entries() {
        let bucket = entry.bucket();
        match entry {
            InventoryEntry::Complete(inventory) => table.add_row(vec![
                bucket.name.clone(),
                format_date(bucket.creation_date),
                inventory.totals.files.to_string(),
                format_size(inventory.totals.size_bytes, raw_bytes),
                format_date(inventory.totals.last_modified),
            ]),
            InventoryEntry::Failed(failure) => table.add_row(vec![
                bucket.name.clone(),
                format_date(bucket.creation_date),
                "-".to_string(),
                "-".to_string(),
                format!("error: {}", failure.message),
            ]),
        };
    }

    for index in [2, 3] {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}

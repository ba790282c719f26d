//! buckets command - List buckets
//!
//! Runs only the bucket listing: names and creation dates, no object walk.

use binv_core::{BucketIdentity, enumerate_buckets};
use binv_s3::S3Client;
use serde::Serialize;

use super::Settings;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Output structure for the buckets command (JSON format)
#[derive(Debug, Serialize)]
struct BucketsOutput {
    buckets: Vec<BucketIdentity>,
    total: usize,
}

/// Execute the buckets command
pub async fn execute(settings: Settings) -> ExitCode {
    let formatter = Formatter::new(settings.output);

    let client = match S3Client::new(&settings.connection).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let buckets = match enumerate_buckets(&client).await {
        Ok(buckets) => buckets,
        Err(e) => {
            formatter.error(&format!("Failed to list buckets: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    if formatter.is_json() {
        formatter.json(&BucketsOutput {
            total: buckets.len(),
            buckets,
        });
    } else if buckets.is_empty() {
        formatter.println("No buckets found");
    } else {
        for bucket in &buckets {
            formatter.println(&format_bucket_line(bucket));
        }
        formatter.println(&format!("\nTotal: {} buckets", buckets.len()));
    }

    ExitCode::Success
}

fn format_bucket_line(bucket: &BucketIdentity) -> String {
    let date = bucket
        .creation_date
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "                   ".to_string());
    format!("[{date}] {}", bucket.name)
}

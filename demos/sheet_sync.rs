//! Sheet Sync Example
//!
//! Copies rows from a source worksheet into a report worksheet, retrying the
//! transient failures of the spreadsheet service, then exports the report as
//! CSV. The in-memory client stands in for a real service.
//!
//! Run with: cargo run --example sheet_sync

use std::path::Path;

use reprise::prelude::*;
use reprise::sheets::{ExportFormat, SheetError, SheetErrorKind, SheetSelector};
use reprise::testing::{MemoryClient, MemoryWorkbook};

fn open_policy<T: PartialEq>() -> RetryPolicy<T, SheetErrorKind> {
    RetryPolicy::new()
        .with_retryable_kinds([SheetErrorKind::RateLimited, SheetErrorKind::Transport])
        .with_max_attempts(5)
}

fn sync(client: &MemoryClient, out_dir: &Path) -> Result<usize, RetryError<SheetError>> {
    let source_selector =
        SheetSelector::from_parts(Some("raw"), None).map_err(RetryError::NonRetryable)?;
    let report_selector = SheetSelector::Index(1);

    let source = open_policy().execute(|| client.open_worksheet("sales", &source_selector))?;
    let mut report = open_policy().execute(|| client.open_worksheet("sales", &report_selector))?;

    let rows = source.all_values().map_err(RetryError::NonRetryable)?;
    report.clear().map_err(RetryError::NonRetryable)?;

    let mut copied = 0;
    for (offset, row) in (0u32..).zip(rows.iter()) {
        report
            .write_row(offset, row)
            .map_err(RetryError::NonRetryable)?;
        copied += 1;
    }

    let path = out_dir.join(format!("{}.{}", report.title(), ExportFormat::Csv.extension()));
    report
        .export(&path, ExportFormat::Csv)
        .map_err(RetryError::NonRetryable)?;
    println!("Exported {} rows to {}", copied, path.display());

    Ok(copied)
}

fn main() {
    let client = MemoryClient::new().with_workbook(
        MemoryWorkbook::new("sales")
            .with_sheet(
                "raw",
                vec![
                    vec!["region", "units"],
                    vec!["north", "120"],
                    vec!["south", "95"],
                ],
            )
            .with_sheet("report", vec![vec!["stale"]]),
    );
    client.fail_next_opens(3);

    let out_dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Could not create output directory: {}", e);
            return;
        }
    };

    match sync(&client, out_dir.path()) {
        Ok(rows) => println!(
            "Synced {} rows using {} workbook opens",
            rows,
            client.open_calls()
        ),
        Err(e) => eprintln!("Sync failed: {}", e),
    }

    let missing =
        open_policy().execute(|| client.open_worksheet("payroll", &SheetSelector::Index(0)));
    if let Err(e) = missing {
        println!("Not retried ({}): {}", e.is_non_retryable(), e);
    }
}

//! Pipeline orchestration - One end-to-end ingestion run.
//!
//! Stages run strictly in order over the input directory. A missing input directory or an
//! unreachable store aborts the run; a bad file is logged, counted and left in place.

use crate::{
    config::{headers::load_header_map, settings::Settings},
    core::{
        archive::archive_file,
        decrypt::{DecryptOutcome, decrypt_workbook},
        extract::extract_workbook,
        header_map::HeaderMap,
        loader::{LoadStats, Loader},
        locator::DataLayout,
        processed::{read_records, write_records},
        report_view::refresh_sales_view,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::Path;
use tracing::{error, info, warn};

/// Counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Working copies produced (decrypted or copied)
    pub decrypted: usize,
    /// Workbooks normalized into processed files
    pub extracted: usize,
    /// Processed files loaded
    pub loaded_files: usize,
    /// Processed files moved to the archive
    pub archived: usize,
    /// Files that failed at any stage
    pub failed_files: usize,
    /// Blank or incomplete rows dropped during extraction
    pub dropped_rows: usize,
    /// Store counters summed over all files
    pub load: LoadStats,
}

/// Runs every stage once.
///
/// # Errors
/// Returns an error if the input directory is missing, the header alias file is invalid,
/// the branch cannot be resolved, or the reporting view cannot be refreshed.
pub async fn run(db: &DatabaseConnection, settings: &Settings) -> Result<RunSummary> {
    let layout = DataLayout::new(&settings.data_dir);
    layout.ensure_exists()?;
    let header_map = load_header_map(&settings.header_map_path)?;

    let mut summary = RunSummary::default();
    decrypt_stage(&layout, &settings.excel_password, &mut summary)?;
    extract_stage(&layout, &settings.sales_sheet_name, &header_map, &mut summary)?;

    let mut loader = Loader::new(db, &settings.branch_name, &settings.branch_area_type).await?;
    load_stage(&layout, &mut loader, &mut summary).await?;

    refresh_sales_view(db).await?;

    info!(
        "Run finished: {} decrypted, {} extracted, {} loaded, {} archived, {} failed files, \
         {} dropped rows",
        summary.decrypted,
        summary.extracted,
        summary.loaded_files,
        summary.archived,
        summary.failed_files,
        summary.dropped_rows
    );
    info!(
        "Store: {} new orders, {} skipped (duplicate), {} new items, {} group errors",
        summary.load.new_orders,
        summary.load.skipped_orders,
        summary.load.new_items,
        summary.load.errors
    );
    Ok(summary)
}

fn decrypt_stage(layout: &DataLayout, password: &str, summary: &mut RunSummary) -> Result<()> {
    let inputs = layout.find_encrypted_inputs()?;
    info!("Decrypting {} new export(s)", inputs.len());
    for input in inputs {
        let output = layout.decrypted_path_for(&input);
        match decrypt_workbook(&input, &output, password) {
            Ok(DecryptOutcome::AlreadyPresent(_)) => {}
            Ok(_) => summary.decrypted += 1,
            Err(e) => {
                summary.failed_files += 1;
                error!("Failed to prepare {}: {}", input.display(), e);
            }
        }
    }
    Ok(())
}

fn extract_stage(
    layout: &DataLayout,
    sheet_name: &str,
    header_map: &HeaderMap,
    summary: &mut RunSummary,
) -> Result<()> {
    for workbook in layout.find_decrypted_pending()? {
        let processed = layout.processed_path_for(&workbook);
        match extract_to(&workbook, &processed, sheet_name, header_map) {
            Ok(dropped) => {
                summary.extracted += 1;
                summary.dropped_rows += dropped;
            }
            Err(e) => {
                summary.failed_files += 1;
                error!("Failed to extract {}: {}", workbook.display(), e);
            }
        }
    }
    Ok(())
}

fn extract_to(
    workbook: &Path,
    processed: &Path,
    sheet_name: &str,
    header_map: &HeaderMap,
) -> Result<usize> {
    let report = extract_workbook(workbook, sheet_name, header_map)?;
    if report.records.is_empty() {
        warn!("{} contains no valid rows", workbook.display());
    }
    write_records(processed, &report.records)?;
    Ok(report.blank_rows + report.invalid_rows)
}

async fn load_stage(
    layout: &DataLayout,
    loader: &mut Loader<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    for processed in layout.find_processed_pending()? {
        let records = match read_records(&processed) {
            Ok(records) => records,
            Err(e) => {
                summary.failed_files += 1;
                error!("Failed to read {}: {}", processed.display(), e);
                continue;
            }
        };

        let source = processed.display().to_string();
        summary.load += loader.load_records(&source, records).await;
        summary.loaded_files += 1;

        match archive_file(&processed, &layout.archived_path_for(&processed)) {
            Ok(_) => summary.archived += 1,
            Err(e) => {
                summary.failed_files += 1;
                warn!("Loaded but could not archive {}: {}", processed.display(), e);
            }
        }
    }
    Ok(())
}

//! Spreadsheet-backed session log.
//!
//! [`SheetStore`] is the narrow tabular interface the logger needs; the
//! header row is the schema and every read/write aligns by header name.
//! [`google::GoogleSheetsStore`] implements it over the Sheets v4 REST API.

use async_trait::async_trait;
use tracing::info;

use crate::publisher::DeliveryError;
use crate::training_log::{SessionRecord, SHEET_HEADERS};

pub mod google;

/// A single tab of a remote spreadsheet. Append-only from our side.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Values of row 1, or empty when the tab is blank.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the store cannot be read.
    async fn header_row(&self) -> Result<Vec<String>, DeliveryError>;

    /// Append one row of literal values after the last non-empty row.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the store rejects the append.
    async fn append_row(&self, values: &[String]) -> Result<(), DeliveryError>;

    /// Every row below the header.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the store cannot be read.
    async fn data_rows(&self) -> Result<Vec<Vec<String>>, DeliveryError>;
}

/// A header row with no non-blank cell does not exist yet.
fn is_blank_header(headers: &[String]) -> bool {
    headers.iter().all(|h| h.trim().is_empty())
}

/// Append `record`, writing the default header row first on a blank tab.
///
/// # Errors
///
/// Returns [`DeliveryError`] if any read or append fails.
pub async fn append_session(
    store: &dyn SheetStore,
    record: &SessionRecord,
) -> Result<(), DeliveryError> {
    let mut headers = store.header_row().await?;
    if is_blank_header(&headers) {
        headers = SHEET_HEADERS.iter().map(|h| (*h).to_owned()).collect();
        store.append_row(&headers).await?;
        info!("spreadsheet header row created");
    }

    store.append_row(&record.to_row(&headers)).await?;
    info!(date = %record.date, kind = %record.kind, "session appended to spreadsheet");
    Ok(())
}

/// Read every logged session, mapping columns through the header row.
///
/// Rows with an empty first cell are skipped.
///
/// # Errors
///
/// Returns [`DeliveryError`] if the store cannot be read.
pub async fn read_sessions(store: &dyn SheetStore) -> Result<Vec<SessionRecord>, DeliveryError> {
    let headers = store.header_row().await?;
    if is_blank_header(&headers) {
        return Ok(Vec::new());
    }
    let rows = store.data_rows().await?;
    Ok(rows
        .iter()
        .filter(|row| row.first().is_some_and(|cell| !cell.trim().is_empty()))
        .map(|row| SessionRecord::from_row(&headers, row))
        .collect())
}

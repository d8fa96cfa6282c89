//! Spreadsheet service boundary.
//!
//! A spreadsheet service is reached through three traits: [`SheetsClient`]
//! opens workbooks, [`Workbook`] resolves worksheets, and [`Worksheet`] reads,
//! writes, clears and exports cells. No concrete network client lives in this
//! crate; implementations supply authentication and transport. The in-memory
//! implementation in [`crate::testing`] is used by the tests.
//!
//! [`SheetError`] implements [`Kinded`], so a [`RetryPolicy`](crate::RetryPolicy)
//! can retry the transient failures and let the rest through:
//!
//! ```rust
//! use reprise::prelude::*;
//! use reprise::sheets::{SheetErrorKind, SheetSelector};
//! use reprise::testing::{MemoryClient, MemoryWorkbook};
//!
//! let client = MemoryClient::new()
//!     .with_workbook(MemoryWorkbook::new("budget").with_sheet("2024", vec![vec!["rent", "900"]]));
//! client.fail_next_opens(2);
//!
//! let policy = RetryPolicy::new()
//!     .with_retryable_kind(SheetErrorKind::RateLimited)
//!     .with_max_attempts(3);
//!
//! let sheet = policy
//!     .execute(|| client.open_worksheet("budget", &SheetSelector::Index(0)))
//!     .unwrap();
//! assert_eq!(sheet.cell(1, 2).unwrap(), "900");
//! assert_eq!(client.open_calls(), 3);
//! ```

use std::fmt;
use std::path::Path;

use crate::retry::Kinded;

/// Which worksheet of a workbook to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SheetSelector {
    /// Position of the worksheet in the workbook, starting at 0.
    Index(usize),
    /// Title of the worksheet.
    Name(String),
}

impl SheetSelector {
    /// Build a selector from an optional name and an optional index.
    ///
    /// The index wins when both are given. An empty name counts as absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::{SheetError, SheetSelector};
    ///
    /// assert_eq!(
    ///     SheetSelector::from_parts(Some("Q3"), Some(2)).unwrap(),
    ///     SheetSelector::Index(2)
    /// );
    /// assert_eq!(
    ///     SheetSelector::from_parts(Some("Q3"), None).unwrap(),
    ///     SheetSelector::Name("Q3".into())
    /// );
    /// assert!(matches!(
    ///     SheetSelector::from_parts(Some(""), None),
    ///     Err(SheetError::MissingSelector)
    /// ));
    /// ```
    pub fn from_parts(name: Option<&str>, index: Option<usize>) -> Result<Self, SheetError> {
        match (index, name) {
            (Some(index), _) => Ok(Self::Index(index)),
            (None, Some(name)) if !name.is_empty() => Ok(Self::Name(name.to_string())),
            _ => Err(SheetError::MissingSelector),
        }
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Name(name) => write!(f, "{:?}", name),
        }
    }
}

/// File format for [`Worksheet::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// Portable Document Format.
    Pdf,
    /// Office Open XML spreadsheet.
    Xlsx,
    /// OpenDocument spreadsheet.
    Ods,
}

impl ExportFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
            Self::Ods => "ods",
        }
    }

    /// MIME type of the exported file.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
            Self::Pdf => "application/pdf",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Ods => "application/x-vnd.oasis.opendocument.spreadsheet",
        }
    }

    /// Field delimiter for the text formats; `None` for binary formats.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            Self::Csv => Some(b','),
            Self::Tsv => Some(b'\t'),
            Self::Pdf | Self::Xlsx | Self::Ods => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors reported by a spreadsheet service.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// Neither a worksheet name nor an index was supplied.
    #[error("either a sheet name or a sheet index must be given")]
    MissingSelector,
    /// No workbook with this name is shared with the client.
    #[error("workbook not found: {0}")]
    WorkbookNotFound(String),
    /// The workbook has no worksheet matching the selector.
    #[error("worksheet not found: {0}")]
    WorksheetNotFound(String),
    /// Row or column outside the addressable range (both start at 1).
    #[error("cell out of range: row {row}, col {col}")]
    CellOutOfRange {
        /// Requested row.
        row: u32,
        /// Requested column.
        col: u32,
    },
    /// The service cannot export to this format.
    #[error("export to {0} is not supported")]
    UnsupportedExport(ExportFormat),
    /// The service asked the client to slow down.
    #[error("rate limited by the spreadsheet service")]
    RateLimited,
    /// The request did not reach the service or the response was lost.
    #[error("transport error: {0}")]
    Transport(String),
    /// Encoding cells as delimited text failed.
    #[error("failed to encode cells: {0}")]
    Encode(#[from] csv::Error),
    /// Reading or writing a local file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tag for each [`SheetError`] variant, used in retry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SheetErrorKind {
    /// See [`SheetError::MissingSelector`].
    MissingSelector,
    /// See [`SheetError::WorkbookNotFound`].
    WorkbookNotFound,
    /// See [`SheetError::WorksheetNotFound`].
    WorksheetNotFound,
    /// See [`SheetError::CellOutOfRange`].
    CellOutOfRange,
    /// See [`SheetError::UnsupportedExport`].
    UnsupportedExport,
    /// See [`SheetError::RateLimited`].
    RateLimited,
    /// See [`SheetError::Transport`].
    Transport,
    /// See [`SheetError::Encode`].
    Encode,
    /// See [`SheetError::Io`].
    Io,
}

impl Kinded for SheetError {
    type Kind = SheetErrorKind;

    fn kind(&self) -> SheetErrorKind {
        match self {
            Self::MissingSelector => SheetErrorKind::MissingSelector,
            Self::WorkbookNotFound(_) => SheetErrorKind::WorkbookNotFound,
            Self::WorksheetNotFound(_) => SheetErrorKind::WorksheetNotFound,
            Self::CellOutOfRange { .. } => SheetErrorKind::CellOutOfRange,
            Self::UnsupportedExport(_) => SheetErrorKind::UnsupportedExport,
            Self::RateLimited => SheetErrorKind::RateLimited,
            Self::Transport(_) => SheetErrorKind::Transport,
            Self::Encode(_) => SheetErrorKind::Encode,
            Self::Io(_) => SheetErrorKind::Io,
        }
    }
}

/// A handle to a spreadsheet service.
pub trait SheetsClient {
    /// Workbook handle returned by [`open_workbook`](Self::open_workbook).
    type Workbook: Workbook;

    /// Open a workbook by name.
    fn open_workbook(&self, name: &str) -> Result<Self::Workbook, SheetError>;

    /// Open a workbook and resolve one of its worksheets.
    fn open_worksheet(
        &self,
        workbook: &str,
        selector: &SheetSelector,
    ) -> Result<<Self::Workbook as Workbook>::Worksheet, SheetError> {
        self.open_workbook(workbook)?.worksheet(selector)
    }
}

/// An open workbook.
pub trait Workbook {
    /// Worksheet handle returned by [`worksheet`](Self::worksheet).
    type Worksheet: Worksheet;

    /// Name the workbook was opened with.
    fn name(&self) -> &str;

    /// Resolve a worksheet.
    fn worksheet(&self, selector: &SheetSelector) -> Result<Self::Worksheet, SheetError>;
}

/// An open worksheet. Rows and columns start at 1.
pub trait Worksheet {
    /// Title of the worksheet.
    fn title(&self) -> &str;

    /// Every cell value, row by row, as strings.
    fn all_values(&self) -> Result<Vec<Vec<String>>, SheetError>;

    /// Value of one cell; blank cells read as an empty string.
    fn cell(&self, row: u32, col: u32) -> Result<String, SheetError>;

    /// Overwrite one cell.
    fn update_cell(&mut self, row: u32, col: u32, value: &str) -> Result<(), SheetError>;

    /// Write `values` left to right into row `row_offset + 1`, starting at
    /// column 1.
    ///
    /// An offset with no row after it is [`SheetError::CellOutOfRange`].
    fn write_row(&mut self, row_offset: u32, values: &[String]) -> Result<(), SheetError> {
        let row = row_offset.checked_add(1).ok_or(SheetError::CellOutOfRange {
            row: row_offset,
            col: 1,
        })?;
        for (col, value) in (1u32..).zip(values) {
            self.update_cell(row, col, value)?;
        }
        Ok(())
    }

    /// Export the worksheet to a local file.
    fn export(&self, path: &Path, format: ExportFormat) -> Result<(), SheetError>;

    /// Remove every value from the worksheet.
    fn clear(&mut self) -> Result<(), SheetError>;
}

/// Encode rows as delimited text for the CSV and TSV formats.
///
/// Returns [`SheetError::UnsupportedExport`] for binary formats.
///
/// # Examples
///
/// ```rust
/// use reprise::sheets::{encode_delimited, ExportFormat};
///
/// let rows = vec![vec!["name".to_string(), "note".to_string()],
///                 vec!["ada".to_string(), "likes, commas".to_string()]];
///
/// let bytes = encode_delimited(&rows, ExportFormat::Csv).unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "name,note\nada,\"likes, commas\"\n");
/// ```
pub fn encode_delimited(rows: &[Vec<String>], format: ExportFormat) -> Result<Vec<u8>, SheetError> {
    let delimiter = format
        .delimiter()
        .ok_or(SheetError::UnsupportedExport(format))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SheetError::Io(e.into_error()))
}

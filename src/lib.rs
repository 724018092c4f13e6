//! Twinsheet - one API for reading and writing `.xls` and `.xlsx` workbooks
//!
//! The file name's suffix selects the format: `.xls` files are legacy BIFF8
//! workbooks inside an OLE2 compound file, `.xlsx` files are Office Open XML
//! packages. Both are loaded into the same in-memory model, accessed through
//! [`ExcelFile`], and written back on [`ExcelFile::close`] when opened in
//! [`HandlingMode::Write`].
//!
//! # Features
//!
//! - **Typed reads**: text, numbers, booleans, error codes and dates, with
//!   missing cells as `None`
//! - **Typed writes**: `None` values are skipped, dates carry a number format
//! - **Drop-down lists**: list validation on single cells
//! - **Sheets**: switching and appending sheets, with the legacy format's
//!   65 536-row limit enforced
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use twinsheet::{HandlingMode, open_excel_file};
//!
//! # fn main() -> Result<(), twinsheet::Error> {
//! let mut file = open_excel_file("report.xls", HandlingMode::Write)?;
//! file.set_cell_value_string(0, 0, Some("Status"))?;
//! file.set_cell_drop_down_list(1, 0, [Some("open"), Some("closed")])?;
//! file.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading a workbook
//!
//! ```no_run
//! use twinsheet::{HandlingMode, with_excel_file};
//!
//! # fn main() -> Result<(), twinsheet::Error> {
//! with_excel_file("report.xlsx", HandlingMode::Read, |file| {
//!     println!("{} sheets", file.sheet_count()?);
//!     if let Some(date) = file.cell_value_date(1, 2)? {
//!         println!("{}", date);
//!     }
//!     Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```

/// Error types, value conversion and the Excel date epoch.
pub mod common;

/// Options and named defaults.
pub mod config;

/// In-memory workbook model and the `.xls`/`.xlsx` codecs.
pub mod engine;

/// The workbook facade.
pub mod sheet;

pub use common::{Error, NumberLocale, Result, to_display_string};
pub use config::{DEFAULT_DATE_FORMAT, DEFAULT_SHEET_NAME, ExcelOptions};
pub use engine::SpreadsheetFormat;
pub use engine::xls::MAX_ROW_INDEX_ON_SHEET;
pub use sheet::{ExcelFile, HandlingMode, OpenOptions, Value, open_excel_file, with_excel_file};

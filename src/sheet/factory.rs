//! Opening workbooks by file name.

use log::error;

use crate::common::{Error, Result};
use crate::config::ExcelOptions;
use crate::engine::SpreadsheetFormat;

use super::file::ExcelFile;
use super::types::HandlingMode;

const MISSING_ARGUMENTS: &str = "File name and handling types have to be not empty";

/// Options and flags used to configure how a workbook is opened.
///
/// The format is chosen from the file name suffix: `.xls` opens a legacy
/// binary workbook, `.xlsx` an Office Open XML one.
///
/// # Examples
///
/// ```rust,no_run
/// use twinsheet::{ExcelOptions, HandlingMode, OpenOptions};
///
/// let mut file = OpenOptions::new()
///     .mode(HandlingMode::Write)
///     .options(ExcelOptions::new().with_default_sheet_name("Report"))
///     .open("report.xls")?;
/// file.set_cell_value_string(0, 0, Some("id"))?;
/// file.close()?;
/// # Ok::<(), twinsheet::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    mode: Option<HandlingMode>,
    options: ExcelOptions,
}

impl OpenOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&mut self, mode: HandlingMode) -> &mut Self {
        self.mode = Some(mode);
        self
    }

    pub fn options(&mut self, options: ExcelOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Open `file_name` with the configured mode.
    ///
    /// An empty name or an unset mode is a configuration error, and so is a
    /// suffix other than `.xls` or `.xlsx`.
    pub fn open(&self, file_name: &str) -> Result<ExcelFile> {
        let mode = match self.mode {
            Some(mode) if !file_name.is_empty() => mode,
            _ => return Err(Error::Configuration(MISSING_ARGUMENTS.to_string())),
        };
        let format = SpreadsheetFormat::from_file_name(file_name)
            .ok_or_else(|| Error::UnsupportedFormat(file_name.to_string()))?;
        ExcelFile::open(file_name, mode, format, self.options.clone())
    }
}

/// Open `file_name` for reading or writing with default options.
pub fn open_excel_file(file_name: &str, mode: HandlingMode) -> Result<ExcelFile> {
    OpenOptions::new().mode(mode).open(file_name)
}

/// Open `file_name`, run `f` on it and close it on every exit path.
///
/// A close failure is returned when `f` succeeded; when `f` failed its error
/// wins and the close failure is only logged. Either way the workbook is
/// released.
///
/// # Examples
///
/// ```rust,no_run
/// use twinsheet::{HandlingMode, with_excel_file};
///
/// let total = with_excel_file("report.xlsx", HandlingMode::Read, |file| {
///     let mut total = 0.0;
///     for row in 1..file.number_of_rows()? as i32 {
///         total += file.cell_value_double(row, 2)?.unwrap_or_default();
///     }
///     Ok(total)
/// })?;
/// # Ok::<(), twinsheet::Error>(())
/// ```
pub fn with_excel_file<T, F>(file_name: &str, mode: HandlingMode, f: F) -> Result<T>
where
    F: FnOnce(&mut ExcelFile) -> Result<T>,
{
    let mut file = open_excel_file(file_name, mode)?;
    let result = f(&mut file);
    let closed = file.close();
    if closed.is_err() {
        file.discard();
    }
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            error!("{}", close_err);
            Err(err)
        },
    }
}

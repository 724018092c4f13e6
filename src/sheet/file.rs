//! Open workbook handle.
//!
//! An [`ExcelFile`] owns the in-memory workbook from open to close. In
//! `READ` mode the workbook is loaded from disk and never written back; in
//! `WRITE` mode it starts empty and is saved exactly once, by [`ExcelFile::close`].

use chrono::NaiveDateTime;
use log::{debug, error, warn};

use crate::common::convert::{ValueConverter, without_nulls};
use crate::common::date::{datetime_to_serial, serial_to_datetime};
use crate::common::error::conversions::EngineResultExt;
use crate::common::{Error, Result};
use crate::config::ExcelOptions;
use crate::engine::{
    CellContent, CellStyle, DropDown, Row, Sheet, SpreadsheetFormat, Workbook, check_cell_text,
    check_list_source,
};

use super::accessor;
use super::navigator::SheetNavigator;
use super::types::{HandlingMode, Value};

/// A workbook opened for reading or writing.
///
/// Handles are created through [`open_excel_file`](crate::open_excel_file)
/// or [`OpenOptions`](crate::OpenOptions). Dropping a handle that is still
/// open closes it; call [`close`](Self::close) to observe close failures.
///
/// # Examples
///
/// ```rust,no_run
/// use twinsheet::{HandlingMode, open_excel_file};
///
/// let mut file = open_excel_file("report.xlsx", HandlingMode::Write)?;
/// file.set_cell_value_string(0, 0, Some("Total"))?;
/// file.set_cell_value_double(0, 1, Some(42.5))?;
/// file.close()?;
/// # Ok::<(), twinsheet::Error>(())
/// ```
#[derive(Debug)]
pub struct ExcelFile {
    file_name: String,
    mode: HandlingMode,
    format: SpreadsheetFormat,
    options: ExcelOptions,
    converter: ValueConverter,
    /// `None` once the handle is closed
    workbook: Option<Workbook>,
    navigator: SheetNavigator,
}

impl ExcelFile {
    pub(crate) fn open(
        file_name: &str,
        mode: HandlingMode,
        format: SpreadsheetFormat,
        options: ExcelOptions,
    ) -> Result<Self> {
        let workbook = match mode {
            HandlingMode::Read => {
                let workbook = format
                    .load(file_name)
                    .handling_context(|| format!("Could not open file {}", file_name))?;
                if workbook.sheet_count() == 0 {
                    return Err(Error::handling(format!("File {} has no sheets", file_name)));
                }
                workbook
            },
            HandlingMode::Write => {
                let mut workbook = Workbook::new();
                workbook
                    .create_sheet(&options.default_sheet_name)
                    .handling_context(|| format!("Could not create new file {}", file_name))?;
                workbook
            },
        };
        debug!("opened {} as {} in {} mode", file_name, format, mode);

        Ok(Self {
            file_name: file_name.to_string(),
            mode,
            format,
            converter: ValueConverter::new(options.resolved_locale()),
            options,
            workbook: Some(workbook),
            navigator: SheetNavigator::new(),
        })
    }

    /// Save the workbook when in `WRITE` mode, then release it.
    ///
    /// Closing twice is an error, as is any failure to save. A handle whose
    /// save failed stays open with its content, so `close` can be retried.
    pub fn close(&mut self) -> Result<()> {
        let Some(workbook) = self.workbook.as_ref() else {
            return Err(Error::closing(format!(
                "Workbook for file {} is already closed",
                self.file_name
            )));
        };
        if self.mode == HandlingMode::Write {
            self.format
                .save(workbook, &self.file_name)
                .closing_context(|| format!("Cannot close workbook for file {}", self.file_name))?;
            debug!("saved {}", self.file_name);
        }
        self.workbook = None;
        debug!("closed {}", self.file_name);
        Ok(())
    }

    /// Release the workbook without saving it.
    pub(crate) fn discard(&mut self) {
        if self.workbook.take().is_some() {
            warn!("discarded unsaved workbook for {}", self.file_name);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.workbook.is_none()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn handling_mode(&self) -> HandlingMode {
        self.mode
    }

    pub fn format(&self) -> SpreadsheetFormat {
        self.format
    }

    pub fn options(&self) -> &ExcelOptions {
        &self.options
    }

    /// Highest row index one sheet of this file can hold.
    ///
    /// Callers writing more rows than this continue on a new sheet with
    /// [`add_and_load_sheet`](Self::add_and_load_sheet).
    pub fn max_row_index(&self) -> u32 {
        self.format.max_row_index()
    }

    pub fn workbook(&self) -> Result<&Workbook> {
        self.workbook.as_ref().ok_or_else(|| closed(&self.file_name))
    }

    pub(crate) fn workbook_mut(&mut self) -> Result<&mut Workbook> {
        self.workbook.as_mut().ok_or_else(|| closed(&self.file_name))
    }

    pub fn current_sheet(&self) -> Result<&Sheet> {
        self.navigator.sheet(self.workbook()?)
    }

    fn current_sheet_mut(&mut self) -> Result<&mut Sheet> {
        let navigator = self.navigator;
        navigator.sheet_mut(self.workbook_mut()?)
    }

    // Sheets

    pub fn current_sheet_index(&self) -> usize {
        self.navigator.current_index()
    }

    pub fn sheet_count(&self) -> Result<usize> {
        Ok(self.workbook()?.sheet_count())
    }

    pub fn sheet_name(&self) -> Result<&str> {
        Ok(self.current_sheet()?.name())
    }

    /// Number of rows present on the current sheet.
    ///
    /// Sparse sheets have fewer rows than their highest row index.
    pub fn number_of_rows(&self) -> Result<usize> {
        Ok(self.current_sheet()?.rows.len())
    }

    pub fn load_sheet(&mut self, index: usize) -> Result<()> {
        let workbook = self.workbook.as_ref().ok_or_else(|| closed(&self.file_name))?;
        self.navigator.load(workbook, index)
    }

    /// Append a sheet named `Sheet<n>`, `n` being the new sheet count, and
    /// make it current.
    pub fn add_and_load_sheet(&mut self) -> Result<()> {
        let workbook = self.workbook.as_mut().ok_or_else(|| closed(&self.file_name))?;
        self.navigator.add_and_load(workbook)?;
        Ok(())
    }

    // Reads

    pub fn excel_row(&self, row: i32) -> Result<Option<&Row>> {
        accessor::excel_row(self.current_sheet()?, row)
    }

    /// One past the highest populated column of `row`, or 0 if the row is
    /// missing or empty.
    pub fn last_column_number(&self, row: i32) -> Result<u16> {
        Ok(self.excel_row(row)?.map(Row::last_cell_num).unwrap_or(0))
    }

    /// Value of a cell on the current sheet, absent when the cell is missing.
    pub fn cell_value(&self, row: i32, column: i32) -> Result<Option<Value>> {
        let cell = accessor::cell(self.current_sheet()?, row, column)?;
        Ok(cell.and_then(accessor::read_value))
    }

    /// Cell value as text with numbers in canonical dot-decimal form.
    /// Missing cells read as the empty string.
    pub fn cell_value_string(&self, row: i32, column: i32) -> Result<String> {
        self.cell_value_string_formatted(row, column, false)
    }

    /// Cell value as text, rendering fractional numbers with the configured
    /// locale's separators when `use_locale` is set.
    pub fn cell_value_string_formatted(
        &self,
        row: i32,
        column: i32,
        use_locale: bool,
    ) -> Result<String> {
        let value = self.cell_value(row, column)?;
        Ok(self.converter.display(value.as_ref(), use_locale))
    }

    pub fn cell_value_double(&self, row: i32, column: i32) -> Result<Option<f64>> {
        Ok(self.cell_value(row, column)?.and_then(|v| v.as_number()))
    }

    pub fn cell_value_boolean(&self, row: i32, column: i32) -> Result<Option<bool>> {
        Ok(self.cell_value(row, column)?.and_then(|v| v.as_boolean()))
    }

    /// Numeric cell value read as an Excel date serial.
    pub fn cell_value_date(&self, row: i32, column: i32) -> Result<Option<NaiveDateTime>> {
        Ok(self
            .cell_value(row, column)?
            .and_then(|v| v.as_number())
            .and_then(serial_to_datetime))
    }

    // Writes
    //
    // A `None` value writes nothing and creates no cell.

    /// Write text. Text longer than 32 767 characters is rejected.
    pub fn set_cell_value_string(&mut self, row: i32, column: i32, value: Option<&str>) -> Result<()> {
        accessor::checked_coordinate(row, column)?;
        if let Some(value) = value {
            check_cell_text(value)
                .handling_context(|| format!("Can not write cell[{}, {}]", row, column))?;
        }
        self.set_content(row, column, value.map(|v| CellContent::Text(v.to_string())))
    }

    pub fn set_cell_value_double(&mut self, row: i32, column: i32, value: Option<f64>) -> Result<()> {
        self.set_content(row, column, value.map(CellContent::Number))
    }

    pub fn set_cell_value_boolean(
        &mut self,
        row: i32,
        column: i32,
        value: Option<bool>,
    ) -> Result<()> {
        self.set_content(row, column, value.map(CellContent::Boolean))
    }

    /// Write a date as its serial number with a date number format.
    ///
    /// `pattern` defaults to the configured date format (`yyyy-mm-dd`).
    /// Dates before 1900 cannot be stored.
    pub fn set_cell_value_date(
        &mut self,
        row: i32,
        column: i32,
        value: Option<NaiveDateTime>,
        pattern: Option<&str>,
    ) -> Result<()> {
        accessor::checked_coordinate(row, column)?;
        let Some(value) = value else {
            return Ok(());
        };
        let serial = datetime_to_serial(value).ok_or_else(|| {
            Error::handling(format!(
                "Can not write date {} to cell[{}, {}]",
                value, row, column
            ))
        })?;
        let style =
            CellStyle::with_number_format(pattern.unwrap_or(&self.options.default_date_format));

        let format = self.format;
        let cell = accessor::cell_or_create(self.current_sheet_mut()?, format, row, column)?;
        cell.content = CellContent::Number(serial);
        cell.style = Some(style);
        Ok(())
    }

    /// Restrict a cell to a list of values. `None` entries are skipped.
    ///
    /// The remaining values, joined by one separator each, may not exceed
    /// 255 characters.
    pub fn set_cell_drop_down_list<I, S>(&mut self, row: i32, column: i32, options: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let format = self.format;
        let (row_index, column_index) = accessor::target_coordinate(format, row, column)?;
        let values: Vec<String> = without_nulls(options)
            .into_vec()
            .into_iter()
            .map(Into::into)
            .collect();
        check_list_source(&values).handling_context(|| {
            format!("Can not add drop-down list to cell[{}, {}]", row, column)
        })?;
        self.current_sheet_mut()?.add_drop_down(DropDown {
            row: row_index,
            column: column_index,
            values,
        });
        Ok(())
    }

    fn set_content(&mut self, row: i32, column: i32, content: Option<CellContent>) -> Result<()> {
        accessor::checked_coordinate(row, column)?;
        let Some(content) = content else {
            return Ok(());
        };
        let format = self.format;
        accessor::cell_or_create(self.current_sheet_mut()?, format, row, column)?.content = content;
        Ok(())
    }
}

fn closed(file_name: &str) -> Error {
    Error::handling(format!("Workbook for file {} is closed", file_name))
}

impl Drop for ExcelFile {
    fn drop(&mut self) {
        if self.workbook.is_none() {
            return;
        }
        warn!("{} dropped without close(), closing it now", self.file_name);
        if let Err(err) = self.close() {
            error!("{}", err);
        }
    }
}

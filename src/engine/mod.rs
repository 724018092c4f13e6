//! Spreadsheet engine: the in-memory workbook model and the two codecs that
//! move it to and from disk.
//!
//! # Supported Formats
//!
//! - `.xls` - Microsoft Excel 97-2003 (BIFF8 inside an OLE2 compound file)
//! - `.xlsx` - Microsoft Excel 2007+ (Office Open XML)
//!
//! Both formats are read through `calamine`. Writing goes through the BIFF8
//! record writer in [`xls`] for the legacy format and through
//! `rust_xlsxwriter` for the XML-zip format.

use std::path::Path;

use thiserror::Error;

mod import;
pub mod model;
pub mod xls;
mod xlsx;

pub use model::{
    Cell, CellContent, CellStyle, CellType, DropDown, ErrorCode, FormulaResult, Row, Sheet, Workbook,
};

/// Maximum row index on an Office Open XML worksheet.
pub const XLSX_MAX_ROW_INDEX: u32 = 1_048_575;

/// Maximum column index on an Office Open XML worksheet.
pub const XLSX_MAX_COLUMN_INDEX: u16 = 16_383;

/// Maximum number of characters in one cell, in both formats.
pub const MAX_CELL_TEXT_LEN: usize = 32_767;

/// Maximum length of a list validation source, separators included.
pub const MAX_LIST_SOURCE_LEN: usize = 255;

/// Errors raised by the codecs and the workbook model.
#[derive(Error, Debug)]
pub enum EngineError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading a workbook through calamine failed
    #[error("Read error: {0}")]
    Read(#[from] calamine::Error),

    /// Writing an Office Open XML workbook failed
    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    /// A BIFF8 record could not be produced from the model
    #[error("Invalid BIFF data: {0}")]
    InvalidData(String),

    /// Sheet name rejected by the model
    #[error("Invalid sheet name '{0}'")]
    InvalidSheetName(String),

    /// Sheet name already used in the workbook
    #[error("Sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// Sheet index outside the workbook
    #[error("Sheet index {index} is out of range (0..{count})")]
    SheetIndexOutOfRange { index: usize, count: usize },

    /// Row index beyond the format's structural limit
    #[error("Row index {row} exceeds the maximum row index {max} of this format")]
    RowLimitExceeded { row: u32, max: u32 },

    /// Column index beyond the format's structural limit
    #[error("Column index {column} exceeds the maximum column index {max} of this format")]
    ColumnLimitExceeded { column: u32, max: u16 },

    /// Text longer than a cell can hold
    #[error("Text of {len} characters exceeds the cell limit of {max}")]
    TextTooLong { len: usize, max: usize },

    /// Drop-down values too long to store as one list source
    #[error("List of {len} characters exceeds the validation limit of {max}")]
    ListTooLong { len: usize, max: usize },

    /// Cell content does not hold the requested kind of value
    #[error("Cannot get a {requested} value from a {actual} cell")]
    CellTypeMismatch {
        requested: &'static str,
        actual: &'static str,
    },
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// The two workbook container formats handled by the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadsheetFormat {
    /// Legacy Excel binary workbook (.xls)
    Xls,
    /// Office Open XML workbook (.xlsx)
    Xlsx,
}

impl SpreadsheetFormat {
    /// Resolve the format from the literal suffix of a file name.
    ///
    /// The match is case sensitive: `report.XLS` is not recognized.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(xls::EXTENSION) {
            Some(SpreadsheetFormat::Xls)
        } else if file_name.ends_with(xlsx::EXTENSION) {
            Some(SpreadsheetFormat::Xlsx)
        } else {
            None
        }
    }

    /// Highest usable row index on one sheet.
    pub fn max_row_index(self) -> u32 {
        match self {
            SpreadsheetFormat::Xls => xls::MAX_ROW_INDEX_ON_SHEET,
            SpreadsheetFormat::Xlsx => XLSX_MAX_ROW_INDEX,
        }
    }

    /// Highest usable column index on one sheet.
    pub fn max_column_index(self) -> u16 {
        match self {
            SpreadsheetFormat::Xls => xls::MAX_COLUMN_INDEX,
            SpreadsheetFormat::Xlsx => XLSX_MAX_COLUMN_INDEX,
        }
    }

    /// Check that `(row, column)` fits on a sheet of this format.
    pub fn check_bounds(self, row: u32, column: u32) -> EngineResult<()> {
        let max_row = self.max_row_index();
        if row > max_row {
            return Err(EngineError::RowLimitExceeded { row, max: max_row });
        }
        let max_column = self.max_column_index();
        if column > u32::from(max_column) {
            return Err(EngineError::ColumnLimitExceeded {
                column,
                max: max_column,
            });
        }
        Ok(())
    }

    /// Load a workbook from storage.
    pub fn load<P: AsRef<Path>>(self, path: P) -> EngineResult<Workbook> {
        match self {
            SpreadsheetFormat::Xls => import::load_xls(path.as_ref()),
            SpreadsheetFormat::Xlsx => import::load_xlsx(path.as_ref()),
        }
    }

    /// Serialize a workbook to storage, truncating any existing file.
    pub fn save<P: AsRef<Path>>(self, workbook: &Workbook, path: P) -> EngineResult<()> {
        match self {
            SpreadsheetFormat::Xls => xls::save(workbook, path.as_ref()),
            SpreadsheetFormat::Xlsx => xlsx::save(workbook, path.as_ref()),
        }
    }
}

/// Check that `text` fits in a single cell.
///
/// Excel counts UTF-16 code units, so characters outside the BMP count twice.
pub fn check_cell_text(text: &str) -> EngineResult<()> {
    let len = text.encode_utf16().count();
    if len > MAX_CELL_TEXT_LEN {
        return Err(EngineError::TextTooLong {
            len,
            max: MAX_CELL_TEXT_LEN,
        });
    }
    Ok(())
}

/// Check that `values` fit in one list validation source.
///
/// Both formats join the values with a one-character separator. Quotes
/// count twice since the XML form escapes them by doubling.
pub fn check_list_source(values: &[String]) -> EngineResult<()> {
    let quoted_len = |value: &String| value.encode_utf16().count() + value.matches('"').count();
    let len = values.iter().map(quoted_len).sum::<usize>() + values.len().saturating_sub(1);
    if len > MAX_LIST_SOURCE_LEN {
        return Err(EngineError::ListTooLong {
            len,
            max: MAX_LIST_SOURCE_LEN,
        });
    }
    Ok(())
}

impl std::fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadsheetFormat::Xls => write!(f, "Excel 97-2004 Workbook (.xls)"),
            SpreadsheetFormat::Xlsx => write!(f, "Excel Workbook (.xlsx)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(
            SpreadsheetFormat::from_file_name("report.xls"),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(
            SpreadsheetFormat::from_file_name("dir/report.xlsx"),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(SpreadsheetFormat::from_file_name("report.xlsm"), None);
        assert_eq!(SpreadsheetFormat::from_file_name("report.XLS"), None);
        assert_eq!(SpreadsheetFormat::from_file_name("report"), None);
    }

    #[test]
    fn test_bounds() {
        assert!(SpreadsheetFormat::Xls.check_bounds(65_535, 255).is_ok());
        assert!(matches!(
            SpreadsheetFormat::Xls.check_bounds(65_536, 0),
            Err(EngineError::RowLimitExceeded { row: 65_536, max: 65_535 })
        ));
        assert!(matches!(
            SpreadsheetFormat::Xls.check_bounds(0, 256),
            Err(EngineError::ColumnLimitExceeded { .. })
        ));
        assert!(SpreadsheetFormat::Xlsx.check_bounds(65_536, 256).is_ok());
        assert!(SpreadsheetFormat::Xlsx.check_bounds(1_048_576, 0).is_err());
    }

    #[test]
    fn test_cell_text_limit() {
        assert!(check_cell_text(&"a".repeat(MAX_CELL_TEXT_LEN)).is_ok());
        assert!(matches!(
            check_cell_text(&"a".repeat(MAX_CELL_TEXT_LEN + 1)),
            Err(EngineError::TextTooLong { len: 32_768, max: 32_767 })
        ));
        // two code units per character outside the BMP
        assert!(check_cell_text(&"\u{1F600}".repeat(16_384)).is_err());
    }

    #[test]
    fn test_list_source_limit() {
        let values = vec!["x".repeat(127), "y".repeat(127)];
        assert!(check_list_source(&values).is_ok());
        let values = vec!["x".repeat(128), "y".repeat(127)];
        assert!(matches!(
            check_list_source(&values),
            Err(EngineError::ListTooLong { len: 256, max: 255 })
        ));
        assert!(check_list_source(&[]).is_ok());
        assert!(check_list_source(&["z".repeat(300)]).is_err());
        let values = vec!["\"".repeat(128)];
        assert!(matches!(
            check_list_source(&values),
            Err(EngineError::ListTooLong { len: 256, .. })
        ));
    }
}

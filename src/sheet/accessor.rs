//! Cell lookup by signed coordinates and normalization of cell content.
//!
//! Coordinates arrive as `i32` so that negative input stays representable;
//! it is rejected with a handling error on every path, read or write.

use crate::common::error::conversions::EngineResultExt;
use crate::common::{Error, Result};
use crate::engine::{Cell, CellContent, Row, Sheet, SpreadsheetFormat};

use super::types::Value;

/// Reject negative coordinates.
pub(crate) fn checked_coordinate(row: i32, column: i32) -> Result<(u32, u32)> {
    match (u32::try_from(row), u32::try_from(column)) {
        (Ok(row), Ok(column)) => Ok((row, column)),
        _ => Err(Error::handling(format!("Can not read cell[{}, {}]", row, column))),
    }
}

pub(crate) fn checked_row(row: i32) -> Result<u32> {
    u32::try_from(row).map_err(|_| Error::handling(format!("Could not read row {}", row)))
}

/// Row at `row`, absent when the sheet has none there.
pub(crate) fn excel_row(sheet: &Sheet, row: i32) -> Result<Option<&Row>> {
    Ok(sheet.row(checked_row(row)?))
}

/// Cell at `(row, column)`, absent when either the row or the cell is missing.
///
/// Columns beyond what a sheet can address are simply absent.
pub(crate) fn cell(sheet: &Sheet, row: i32, column: i32) -> Result<Option<&Cell>> {
    let (row, column) = checked_coordinate(row, column)?;
    let Ok(column) = u16::try_from(column) else {
        return Ok(None);
    };
    Ok(sheet.cell(row, column))
}

/// Cell at `(row, column)`, creating the row and the cell as needed.
///
/// Fails when the coordinate lies outside what `format` can store.
pub(crate) fn cell_or_create(
    sheet: &mut Sheet,
    format: SpreadsheetFormat,
    row: i32,
    column: i32,
) -> Result<&mut Cell> {
    let (row_index, column_index) = target_coordinate(format, row, column)?;
    Ok(sheet.row_or_create(row_index).cell_or_create(column_index))
}

/// Validate a coordinate that is about to be written.
pub(crate) fn target_coordinate(
    format: SpreadsheetFormat,
    row: i32,
    column: i32,
) -> Result<(u32, u16)> {
    let (row_index, column_index) = checked_coordinate(row, column)?;
    format
        .check_bounds(row_index, column_index)
        .handling_context(|| format!("Can not write cell[{}, {}]", row, column))?;
    // check_bounds caps the column at a u16 maximum
    let column_index = u16::try_from(column_index)
        .map_err(|_| Error::handling(format!("Can not write cell[{}, {}]", row, column)))?;
    Ok((row_index, column_index))
}

/// Semantic value of a cell.
///
/// Blank and text cells read as trimmed text. A formula reads as its cached
/// numeric result, or `0.0` when there is none.
pub(crate) fn read_value(cell: &Cell) -> Option<Value> {
    let value = match &cell.content {
        CellContent::Blank => Value::Text(String::new()),
        CellContent::Text(text) => Value::Text(trim_control(text).to_string()),
        CellContent::Number(number) => Value::Number(*number),
        CellContent::Boolean(b) => Value::Boolean(*b),
        CellContent::Error(code) => Value::ErrorCode(*code),
        CellContent::Formula { .. } => Value::Number(cell.numeric_value().unwrap_or(0.0)),
    };
    Some(value)
}

/// Strip leading and trailing characters up to and including the space.
///
/// Non-breaking and other Unicode spaces are content and stay.
fn trim_control(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FormulaResult;

    fn sheet_with(content: CellContent) -> Sheet {
        let mut sheet = Sheet::new("S");
        sheet.row_or_create(2).cell_or_create(1).content = content;
        sheet
    }

    #[test]
    fn test_negative_coordinates() {
        let sheet = Sheet::new("S");
        let err = cell(&sheet, -1, 0).unwrap_err();
        assert!(err.is_handling());
        assert_eq!(err.to_string(), "Can not read cell[-1, 0]");
        assert!(cell(&sheet, 0, -5).is_err());
        assert!(excel_row(&sheet, -1).is_err());
    }

    #[test]
    fn test_missing_cells_are_absent() {
        let sheet = sheet_with(CellContent::Number(1.0));
        assert!(cell(&sheet, 0, 0).unwrap().is_none());
        assert!(cell(&sheet, 2, 0).unwrap().is_none());
        assert!(cell(&sheet, 2, 70_000).unwrap().is_none());
        assert!(cell(&sheet, 2, 1).unwrap().is_some());
    }

    #[test]
    fn test_cell_or_create_respects_format_caps() {
        let mut sheet = Sheet::new("S");
        assert!(cell_or_create(&mut sheet, SpreadsheetFormat::Xls, 65_535, 255).is_ok());
        let err = cell_or_create(&mut sheet, SpreadsheetFormat::Xls, 65_536, 0).unwrap_err();
        assert!(err.is_handling());
        assert_eq!(err.to_string(), "Can not write cell[65536, 0]");
        assert!(cell_or_create(&mut sheet, SpreadsheetFormat::Xls, 0, 256).is_err());
        assert!(cell_or_create(&mut sheet, SpreadsheetFormat::Xlsx, 65_536, 256).is_ok());
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_read_value_mapping() {
        let read = |content: CellContent| read_value(&Cell::new(content));
        assert_eq!(read(CellContent::Blank), Some(Value::Text(String::new())));
        assert_eq!(read(CellContent::Text("  abc \t".into())), Some(Value::Text("abc".into())));
        assert_eq!(read(CellContent::Number(4.5)), Some(Value::Number(4.5)));
        assert_eq!(read(CellContent::Boolean(true)), Some(Value::Boolean(true)));
        assert_eq!(read(CellContent::Error(0x07)), Some(Value::ErrorCode(0x07)));
    }

    #[test]
    fn test_trim_keeps_unicode_spaces() {
        let read = |text: &str| read_value(&Cell::new(CellContent::Text(text.into())));
        assert_eq!(read("\u{0}\u{1f}x\r\n"), Some(Value::Text("x".into())));
        assert_eq!(read("\u{a0}x\u{2003}"), Some(Value::Text("\u{a0}x\u{2003}".into())));
        assert_eq!(read(" \u{7f} "), Some(Value::Text("\u{7f}".into())));
    }

    #[test]
    fn test_formula_falls_back_to_zero() {
        let read = |cached: Option<FormulaResult>| {
            read_value(&Cell::new(CellContent::Formula {
                expression: "A1/B1".to_string(),
                cached,
            }))
        };
        assert_eq!(read(Some(FormulaResult::Number(2.5))), Some(Value::Number(2.5)));
        assert_eq!(read(Some(FormulaResult::Error(0x07))), Some(Value::Number(0.0)));
        assert_eq!(read(Some(FormulaResult::Text("x".into()))), Some(Value::Number(0.0)));
        assert_eq!(read(None), Some(Value::Number(0.0)));
    }
}

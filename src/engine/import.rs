//! Loading workbooks from disk through `calamine`.
//!
//! calamine reports cell values and formula text as two separate ranges.
//! Both are folded into one [`Sheet`]: a cell with formula text becomes a
//! formula whose cached result is the value calamine read for it.

use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook, CellErrorType, Data, Reader, Xls, Xlsx};
use log::{debug, warn};

use super::model::{Cell, CellContent, CellStyle, ErrorCode, FormulaResult, Sheet, Workbook};
use super::EngineResult;

/// Number format given to cells calamine recognized as dates.
const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

pub fn load_xls(path: &Path) -> EngineResult<Workbook> {
    let reader: Xls<_> = open_workbook(path).map_err(calamine::Error::from)?;
    read_workbook(reader, path)
}

pub fn load_xlsx(path: &Path) -> EngineResult<Workbook> {
    let reader: Xlsx<_> = open_workbook(path).map_err(calamine::Error::from)?;
    read_workbook(reader, path)
}

fn read_workbook<RS, R>(mut reader: R, path: &Path) -> EngineResult<Workbook>
where
    RS: Read + Seek,
    R: Reader<RS>,
    calamine::Error: From<R::Error>,
{
    let mut workbook = Workbook::new();
    for name in reader.sheet_names() {
        let mut sheet = Sheet::new(name.as_str());

        let range = reader.worksheet_range(&name).map_err(calamine::Error::from)?;
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, value) in range.used_cells() {
            let Some((row, col)) = absolute(start_row, start_col, row, col) else {
                continue;
            };
            if let Some(cell) = convert_value(value) {
                *sheet.row_or_create(row).cell_or_create(col) = cell;
            }
        }

        match reader.worksheet_formula(&name) {
            Ok(formulas) => {
                let (start_row, start_col) = formulas.start().unwrap_or((0, 0));
                for (row, col, text) in formulas.used_cells() {
                    let Some((row, col)) = absolute(start_row, start_col, row, col) else {
                        continue;
                    };
                    apply_formula(&mut sheet, row, col, text);
                }
            },
            Err(err) => warn!(
                "failed to read formulas for sheet `{}`: {}",
                name,
                calamine::Error::from(err)
            ),
        }

        workbook.push_sheet(sheet);
    }

    debug!("loaded {} sheets from {}", workbook.sheet_count(), path.display());
    Ok(workbook)
}

/// calamine ranges report coordinates relative to `range.start()`.
fn absolute(start_row: u32, start_col: u32, row: usize, col: usize) -> Option<(u32, u16)> {
    let row = start_row.checked_add(u32::try_from(row).ok()?)?;
    let col = start_col.checked_add(u32::try_from(col).ok()?)?;
    Some((row, u16::try_from(col).ok()?))
}

fn convert_value(value: &Data) -> Option<Cell> {
    let cell = match value {
        Data::Empty => return None,
        Data::Bool(b) => Cell::new(CellContent::Boolean(*b)),
        Data::Int(i) => Cell::new(CellContent::Number(*i as f64)),
        Data::Float(f) => Cell::new(CellContent::Number(*f)),
        Data::String(s) => Cell::new(CellContent::Text(s.clone())),
        Data::Error(e) => Cell::new(CellContent::Error(error_code(e).code())),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            let pattern = if serial.fract() == 0.0 {
                DATE_FORMAT
            } else {
                DATE_TIME_FORMAT
            };
            Cell {
                content: CellContent::Number(serial),
                style: Some(CellStyle::with_number_format(pattern)),
            }
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::new(CellContent::Text(s.clone())),
    };
    Some(cell)
}

/// Turn the value already stored at `(row, col)` into the cached result of
/// `text`.
fn apply_formula(sheet: &mut Sheet, row: u32, col: u16, text: &str) {
    let expression = text.trim().trim_start_matches('=');
    if expression.is_empty() {
        return;
    }

    let cell = sheet.row_or_create(row).cell_or_create(col);
    let cached = match std::mem::take(&mut cell.content) {
        CellContent::Number(n) => Some(FormulaResult::Number(n)),
        CellContent::Text(s) => Some(FormulaResult::Text(s)),
        CellContent::Boolean(b) => Some(FormulaResult::Boolean(b)),
        CellContent::Error(code) => Some(FormulaResult::Error(code)),
        _ => None,
    };
    cell.content = CellContent::Formula {
        expression: expression.to_string(),
        cached,
    };
}

fn error_code(error: &CellErrorType) -> ErrorCode {
    match error {
        CellErrorType::Div0 => ErrorCode::Div0,
        CellErrorType::NA => ErrorCode::NA,
        CellErrorType::Name => ErrorCode::Name,
        CellErrorType::Null => ErrorCode::Null,
        CellErrorType::Num => ErrorCode::Num,
        CellErrorType::Ref => ErrorCode::Ref,
        CellErrorType::Value => ErrorCode::Value,
        CellErrorType::GettingData => ErrorCode::GettingData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_offsets() {
        assert_eq!(absolute(3, 2, 1, 4), Some((4, 6)));
        assert_eq!(absolute(0, 70_000, 0, 0), None);
    }

    #[test]
    fn test_apply_formula_keeps_cached_value() {
        let mut sheet = Sheet::new("S");
        sheet.row_or_create(0).cell_or_create(0).content = CellContent::Number(3.0);
        apply_formula(&mut sheet, 0, 0, "=1+2");
        assert_eq!(
            sheet.cell(0, 0).unwrap().content,
            CellContent::Formula {
                expression: "1+2".to_string(),
                cached: Some(FormulaResult::Number(3.0)),
            }
        );
    }

    #[test]
    fn test_apply_formula_error_literal_stays_formula() {
        let mut sheet = Sheet::new("S");
        sheet.row_or_create(0).cell_or_create(0).content = CellContent::Error(0x2A);
        apply_formula(&mut sheet, 0, 0, "#N/A");
        assert_eq!(
            sheet.cell(0, 0).unwrap().content,
            CellContent::Formula {
                expression: "#N/A".to_string(),
                cached: Some(FormulaResult::Error(0x2A)),
            }
        );

        sheet.row_or_create(1).cell_or_create(2).content = CellContent::Text("#DIV/0!".to_string());
        apply_formula(&mut sheet, 1, 2, "=#DIV/0!");
        assert_eq!(
            sheet.cell(1, 2).unwrap().content,
            CellContent::Formula {
                expression: "#DIV/0!".to_string(),
                cached: Some(FormulaResult::Text("#DIV/0!".to_string())),
            }
        );
    }

    #[test]
    fn test_convert_value() {
        assert!(convert_value(&Data::Empty).is_none());
        let cell = convert_value(&Data::Int(7)).unwrap();
        assert_eq!(cell.content, CellContent::Number(7.0));
        let cell = convert_value(&Data::Error(CellErrorType::Div0)).unwrap();
        assert_eq!(cell.content, CellContent::Error(0x07));
    }
}

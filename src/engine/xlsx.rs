//! Office Open XML (.xlsx) writer built on `rust_xlsxwriter`.

use std::collections::HashMap;
use std::path::Path;

use log::debug;
use rust_xlsxwriter::{DataValidation, Format, Formula, Worksheet};

use super::model::{Cell, CellContent, ErrorCode, FormulaResult, Sheet, Workbook};
use super::{EngineError, EngineResult};

/// File name suffix of Office Open XML workbooks.
pub const EXTENSION: &str = ".xlsx";

/// Write `workbook` to `path` as an .xlsx file.
pub fn save(workbook: &Workbook, path: &Path) -> EngineResult<()> {
    let mut out = rust_xlsxwriter::Workbook::new();
    let mut formats: HashMap<String, Format> = HashMap::new();

    for sheet in workbook.sheets() {
        let worksheet = out.add_worksheet();
        worksheet.set_name(sheet.name())?;
        write_sheet(worksheet, sheet, &mut formats)?;
    }
    if workbook.sheet_count() == 0 {
        // an .xlsx package needs at least one worksheet
        out.add_worksheet();
    }

    out.save(path)?;
    debug!("wrote {} sheet xlsx workbook to {}", workbook.sheet_count(), path.display());
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet, formats: &mut HashMap<String, Format>) -> EngineResult<()> {
    for (&row, cells) in &sheet.rows {
        for (&col, cell) in &cells.cells {
            let format = cell.style.as_ref().map(|style| {
                formats
                    .entry(style.number_format.clone())
                    .or_insert_with(|| Format::new().set_num_format(&style.number_format))
                    .clone()
            });
            write_cell(worksheet, row, col, cell, format.as_ref())?;
        }
    }

    for drop_down in &sheet.drop_downs {
        let values: Vec<&str> = drop_down.values.iter().map(String::as_str).collect();
        let validation = DataValidation::new().allow_list_strings(&values)?;
        worksheet.add_data_validation(
            drop_down.row,
            drop_down.column,
            drop_down.row,
            drop_down.column,
            &validation,
        )?;
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell, format: Option<&Format>) -> EngineResult<()> {
    match (&cell.content, format) {
        (CellContent::Blank, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        },
        (CellContent::Blank, None) => {},
        (CellContent::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        },
        (CellContent::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        },
        (CellContent::Number(value), Some(format)) => {
            worksheet.write_number_with_format(row, col, *value, format)?;
        },
        (CellContent::Number(value), None) => {
            worksheet.write_number(row, col, *value)?;
        },
        (CellContent::Boolean(value), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *value, format)?;
        },
        (CellContent::Boolean(value), None) => {
            worksheet.write_boolean(row, col, *value)?;
        },
        (CellContent::Error(code), _) => {
            // only loaded workbooks carry error cells, and those are never saved
            return Err(EngineError::InvalidData(format!(
                "cannot store error {} in cell[{}, {}] of an .xlsx file",
                error_text(*code),
                row,
                col
            )));
        },
        (CellContent::Formula { expression, cached }, format) => {
            let mut formula = Formula::new(format!("={expression}"));
            if let Some(result) = cached {
                formula = formula.set_result(formula_result_text(result));
            }
            match format {
                Some(format) => worksheet.write_formula_with_format(row, col, formula, format)?,
                None => worksheet.write_formula(row, col, formula)?,
            };
        },
    }
    Ok(())
}

fn error_text(code: u8) -> &'static str {
    ErrorCode::from_code(code).unwrap_or(ErrorCode::NA).text()
}

fn formula_result_text(result: &FormulaResult) -> String {
    match result {
        FormulaResult::Number(value) => value.to_string(),
        FormulaResult::Text(text) => text.clone(),
        FormulaResult::Boolean(true) => "TRUE".to_string(),
        FormulaResult::Boolean(false) => "FALSE".to_string(),
        FormulaResult::Error(code) => error_text(*code).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_result_text() {
        assert_eq!(formula_result_text(&FormulaResult::Number(2.5)), "2.5");
        assert_eq!(formula_result_text(&FormulaResult::Boolean(true)), "TRUE");
        assert_eq!(formula_result_text(&FormulaResult::Error(0x07)), "#DIV/0!");
        assert_eq!(error_text(0x99), "#N/A");
    }

    #[test]
    fn test_error_cells_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.xlsx");
        let mut workbook = Workbook::new();
        workbook.create_sheet("S").unwrap();
        workbook.sheet_mut(0).unwrap().row_or_create(0).cell_or_create(0).content =
            CellContent::Error(0x2A);
        assert!(matches!(save(&workbook, &path), Err(EngineError::InvalidData(_))));
    }

    #[test]
    fn test_save_empty_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        save(&Workbook::new(), &path).unwrap();
        assert!(path.exists());
    }
}

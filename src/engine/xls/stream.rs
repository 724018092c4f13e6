//! Layout of the BIFF8 `Workbook` stream.

use std::collections::HashMap;

use log::trace;

use super::biff::{self, BoolErr};
use super::formats::FormatTable;
use crate::engine::model::{Cell, CellContent, FormulaResult, Sheet, Workbook};
use crate::engine::EngineResult;

/// Shared strings collected from every sheet, in first-use order.
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, u32>,
    total_refs: u32,
}

impl SharedStrings {
    fn intern(&mut self, value: &str) -> u32 {
        self.total_refs += 1;
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.strings.len() as u32;
        self.strings.push(value.to_string());
        self.index.insert(value.to_string(), i);
        i
    }
}

/// What a cell turns into on disk.
///
/// Formulas are stored as their cached result: the record writer does not
/// tokenize formula text.
enum CellRecord {
    Number(f64),
    Label(u32),
    BoolErr(BoolErr),
}

struct PreparedSheet<'a> {
    sheet: &'a Sheet,
    cells: Vec<(u32, u16, u16, CellRecord)>,
}

fn prepare_cell(cell: &Cell, strings: &mut SharedStrings) -> Option<CellRecord> {
    let record = match &cell.content {
        CellContent::Blank => return None,
        CellContent::Text(text) => CellRecord::Label(strings.intern(text)),
        CellContent::Number(value) => CellRecord::Number(*value),
        CellContent::Boolean(value) => CellRecord::BoolErr(BoolErr::Boolean(*value)),
        CellContent::Error(code) => CellRecord::BoolErr(BoolErr::Error(*code)),
        CellContent::Formula { cached, .. } => match cached {
            Some(FormulaResult::Number(value)) => CellRecord::Number(*value),
            Some(FormulaResult::Text(text)) => CellRecord::Label(strings.intern(text)),
            Some(FormulaResult::Boolean(value)) => CellRecord::BoolErr(BoolErr::Boolean(*value)),
            Some(FormulaResult::Error(code)) => CellRecord::BoolErr(BoolErr::Error(*code)),
            None => CellRecord::Number(0.0),
        },
    };
    Some(record)
}

/// Serialize a workbook into the bytes of a BIFF8 `Workbook` stream.
pub fn generate_workbook_stream(workbook: &Workbook) -> EngineResult<Vec<u8>> {
    let mut formats = FormatTable::new();
    let mut strings = SharedStrings::default();

    // Intern strings and styles up front: SST and XF records precede the sheets.
    let mut prepared = Vec::with_capacity(workbook.sheet_count());
    for sheet in workbook.sheets() {
        let mut cells = Vec::new();
        for (&row_index, row) in &sheet.rows {
            for (&col, cell) in &row.cells {
                let Some(record) = prepare_cell(cell, &mut strings) else {
                    continue;
                };
                let xf = match &cell.style {
                    Some(style) => formats.xf_for_pattern(&style.number_format),
                    None => formats.default_xf(),
                };
                cells.push((row_index, col, xf, record));
            }
        }
        prepared.push(PreparedSheet { sheet, cells });
    }

    let mut stream = Vec::new();
    biff::write_bof(&mut stream, biff::SUBSTREAM_WORKBOOK)?;
    biff::write_codepage(&mut stream, biff::CODEPAGE_UTF16)?;
    biff::write_date1904(&mut stream, false)?;
    biff::write_window1(&mut stream)?;
    formats.write(&mut stream)?;
    biff::write_builtin_styles(&mut stream)?;
    biff::write_usesel_fs(&mut stream)?;

    let mut boundsheet_offsets = Vec::with_capacity(prepared.len());
    for p in &prepared {
        boundsheet_offsets.push(stream.len());
        biff::write_boundsheet(&mut stream, 0, p.sheet.name())?;
    }

    if !strings.strings.is_empty() {
        biff::write_sst(&mut stream, &strings.strings, strings.total_refs)?;
    }
    biff::write_eof(&mut stream)?;

    for (sheet_index, p) in prepared.iter().enumerate() {
        let position = stream.len() as u32;
        // the position field follows the 4-byte record header
        let at = boundsheet_offsets[sheet_index] + 4;
        stream[at..at + 4].copy_from_slice(&position.to_le_bytes());

        write_worksheet(&mut stream, p, sheet_index == 0)?;
    }

    trace!(
        "generated BIFF8 stream: {} sheets, {} shared strings, {} bytes",
        prepared.len(),
        strings.strings.len(),
        stream.len()
    );
    Ok(stream)
}

fn write_worksheet(stream: &mut Vec<u8>, p: &PreparedSheet<'_>, active: bool) -> EngineResult<()> {
    biff::write_bof(stream, biff::SUBSTREAM_WORKSHEET)?;

    let (rows, cols) = used_extent(&p.cells);
    biff::write_dimensions(stream, rows.0, rows.1, cols.0, cols.1)?;
    biff::write_wsbool(stream)?;
    biff::write_window2(stream, active)?;

    for (row, col, xf, record) in &p.cells {
        match record {
            CellRecord::Number(value) => biff::write_number(stream, *row, *col, *xf, *value)?,
            CellRecord::Label(sst_index) => biff::write_labelsst(stream, *row, *col, *xf, *sst_index)?,
            CellRecord::BoolErr(value) => biff::write_boolerr(stream, *row, *col, *xf, *value)?,
        }
    }

    let drop_downs = &p.sheet.drop_downs;
    if !drop_downs.is_empty() {
        biff::write_dval(stream, drop_downs.len() as u32)?;
        for drop_down in drop_downs {
            biff::write_list_dv(stream, drop_down.row, drop_down.column, &drop_down.values)?;
        }
    }

    biff::write_eof(stream)
}

/// First used row/column and one past the last, or all zeros for an empty sheet.
fn used_extent(cells: &[(u32, u16, u16, CellRecord)]) -> ((u32, u32), (u16, u16)) {
    if cells.is_empty() {
        return ((0, 0), (0, 0));
    }
    let mut rows = (u32::MAX, 0);
    let mut cols = (u16::MAX, 0);
    for (row, col, _, _) in cells {
        rows.0 = rows.0.min(*row);
        rows.1 = rows.1.max(row + 1);
        cols.0 = cols.0.min(*col);
        cols.1 = cols.1.max(col + 1);
    }
    (rows, cols)
}

//! In-memory workbook model shared by both codecs.
//!
//! Rows and cells are stored sparsely, keyed by their zero-based index, so a
//! sheet with a single value at row 60 000 costs one map entry.

use std::collections::BTreeMap;

use super::{EngineError, EngineResult};

/// Characters Excel refuses in a sheet name.
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Maximum length of a sheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Kind of content stored in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Blank,
    String,
    Numeric,
    Boolean,
    Error,
    Formula,
}

impl CellType {
    /// Lowercase label used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            CellType::Blank => "blank",
            CellType::String => "text",
            CellType::Numeric => "numeric",
            CellType::Boolean => "boolean",
            CellType::Error => "error",
            CellType::Formula => "formula",
        }
    }
}

/// Excel cell error values with their BIFF8 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Null = 0x00,
    Div0 = 0x07,
    Value = 0x0F,
    Ref = 0x17,
    Name = 0x1D,
    Num = 0x24,
    NA = 0x2A,
    GettingData = 0x2B,
}

impl ErrorCode {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(ErrorCode::Null),
            0x07 => Some(ErrorCode::Div0),
            0x0F => Some(ErrorCode::Value),
            0x17 => Some(ErrorCode::Ref),
            0x1D => Some(ErrorCode::Name),
            0x24 => Some(ErrorCode::Num),
            0x2A => Some(ErrorCode::NA),
            0x2B => Some(ErrorCode::GettingData),
            _ => None,
        }
    }

    /// Text Excel shows in the cell, e.g. `#DIV/0!`.
    pub fn text(self) -> &'static str {
        match self {
            ErrorCode::Null => "#NULL!",
            ErrorCode::Div0 => "#DIV/0!",
            ErrorCode::Value => "#VALUE!",
            ErrorCode::Ref => "#REF!",
            ErrorCode::Name => "#NAME?",
            ErrorCode::Num => "#NUM!",
            ErrorCode::NA => "#N/A",
            ErrorCode::GettingData => "#GETTING_DATA",
        }
    }
}

/// Last computed value of a formula, as stored in the file.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaResult {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(u8),
}

/// Content of a single cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    #[default]
    Blank,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Excel error code, see [`ErrorCode`]
    Error(u8),
    /// Formula text without the leading `=`, with its cached result if any
    Formula {
        expression: String,
        cached: Option<FormulaResult>,
    },
}

/// Presentation attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// Excel number format code, e.g. `dd.mm.yyyy`
    pub number_format: String,
}

impl CellStyle {
    pub fn with_number_format(number_format: impl Into<String>) -> Self {
        Self {
            number_format: number_format.into(),
        }
    }
}

/// A cell: content plus optional style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub content: CellContent,
    pub style: Option<CellStyle>,
}

impl Cell {
    pub fn new(content: CellContent) -> Self {
        Self {
            content,
            style: None,
        }
    }

    pub fn cell_type(&self) -> CellType {
        match self.content {
            CellContent::Blank => CellType::Blank,
            CellContent::Text(_) => CellType::String,
            CellContent::Number(_) => CellType::Numeric,
            CellContent::Boolean(_) => CellType::Boolean,
            CellContent::Error(_) => CellType::Error,
            CellContent::Formula { .. } => CellType::Formula,
        }
    }

    /// Numeric view of the cell.
    ///
    /// Blank cells read as `0.0`. A formula yields its cached result only
    /// when that result is a number.
    pub fn numeric_value(&self) -> EngineResult<f64> {
        match &self.content {
            CellContent::Blank => Ok(0.0),
            CellContent::Number(value) => Ok(*value),
            CellContent::Formula {
                cached: Some(FormulaResult::Number(value)),
                ..
            } => Ok(*value),
            CellContent::Formula { cached, .. } => Err(EngineError::CellTypeMismatch {
                requested: "numeric",
                actual: match cached {
                    Some(FormulaResult::Text(_)) => "text formula",
                    Some(FormulaResult::Boolean(_)) => "boolean formula",
                    Some(FormulaResult::Error(_)) => "error formula",
                    _ => "uncached formula",
                },
            }),
            _ => Err(EngineError::CellTypeMismatch {
                requested: "numeric",
                actual: self.cell_type().name(),
            }),
        }
    }
}

/// A sparse row of cells keyed by column index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: BTreeMap<u16, Cell>,
}

impl Row {
    pub fn cell(&self, column: u16) -> Option<&Cell> {
        self.cells.get(&column)
    }

    /// Get the cell at `column`, creating a blank one if absent.
    pub fn cell_or_create(&mut self, column: u16) -> &mut Cell {
        self.cells.entry(column).or_default()
    }

    /// One past the highest populated column index, or 0 for an empty row.
    pub fn last_cell_num(&self) -> u16 {
        self.cells
            .keys()
            .next_back()
            .map(|&column| column.saturating_add(1))
            .unwrap_or(0)
    }
}

/// A list constraint restricting one cell to a fixed set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropDown {
    pub row: u32,
    pub column: u16,
    pub values: Vec<String>,
}

/// A worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    pub rows: BTreeMap<u32, Row>,
    pub drop_downs: Vec<DropDown>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
            drop_downs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Get the row at `index`, creating an empty one if absent.
    pub fn row_or_create(&mut self, index: u32) -> &mut Row {
        self.rows.entry(index).or_default()
    }

    pub fn cell(&self, row: u32, column: u16) -> Option<&Cell> {
        self.row(row).and_then(|r| r.cell(column))
    }

    /// Record a list constraint for one cell, replacing any earlier one.
    pub fn add_drop_down(&mut self, drop_down: DropDown) {
        self.drop_downs
            .retain(|d| !(d.row == drop_down.row && d.column == drop_down.column));
        self.drop_downs.push(drop_down);
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, index: usize) -> EngineResult<&Sheet> {
        let count = self.sheets.len();
        self.sheets
            .get(index)
            .ok_or(EngineError::SheetIndexOutOfRange { index, count })
    }

    pub fn sheet_mut(&mut self, index: usize) -> EngineResult<&mut Sheet> {
        let count = self.sheets.len();
        self.sheets
            .get_mut(index)
            .ok_or(EngineError::SheetIndexOutOfRange { index, count })
    }

    /// Append a new empty sheet and return its index.
    ///
    /// Names are compared case-insensitively, as Excel does.
    pub fn create_sheet(&mut self, name: &str) -> EngineResult<usize> {
        validate_sheet_name(name)?;
        if self
            .sheets
            .iter()
            .any(|s| s.name.to_lowercase() == name.to_lowercase())
        {
            return Err(EngineError::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Sheet::new(name));
        Ok(self.sheets.len() - 1)
    }

    /// Append an already populated sheet. Used by the importers.
    pub(crate) fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }
}

fn validate_sheet_name(name: &str) -> EngineResult<()> {
    let len = name.chars().count();
    if len == 0
        || len > MAX_SHEET_NAME_LEN
        || name.contains(INVALID_SHEET_NAME_CHARS)
        || name.starts_with('\'')
        || name.ends_with('\'')
    {
        return Err(EngineError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

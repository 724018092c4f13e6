//! Tracking of the current sheet.

use log::trace;

use crate::common::error::conversions::EngineResultExt;
use crate::common::Result;
use crate::config::SHEET_NAME_PREFIX;
use crate::engine::{Sheet, Workbook};

/// Index of the sheet that reads and writes go to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetNavigator {
    current: usize,
}

impl SheetNavigator {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Make the sheet at `index` current.
    pub fn load(&mut self, workbook: &Workbook, index: usize) -> Result<()> {
        workbook
            .sheet(index)
            .handling_context(|| format!("Could not load sheet {}", index))?;
        trace!("switching from sheet {} to sheet {}", self.current, index);
        self.current = index;
        Ok(())
    }

    /// Append a sheet named after the new sheet count and make it current.
    ///
    /// Returns the index of the new sheet, which equals the previous count.
    pub fn add_and_load(&mut self, workbook: &mut Workbook) -> Result<usize> {
        let count = workbook.sheet_count();
        let name = format!("{}{}", SHEET_NAME_PREFIX, count + 1);
        let index = workbook
            .create_sheet(&name)
            .handling_context(|| format!("Could not add sheet {}", name))?;
        trace!("added sheet `{}` at index {}", name, index);
        self.current = index;
        Ok(index)
    }

    pub fn sheet<'a>(&self, workbook: &'a Workbook) -> Result<&'a Sheet> {
        Ok(workbook.sheet(self.current)?)
    }

    pub fn sheet_mut<'a>(&self, workbook: &'a mut Workbook) -> Result<&'a mut Sheet> {
        Ok(workbook.sheet_mut(self.current)?)
    }
}

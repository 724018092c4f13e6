//! Configuration for opened workbooks.
//!
//! Defaults follow Excel's own conventions for a new workbook: a first sheet
//! named `Sheet1` and ISO-like dates.

use serde::{Deserialize, Serialize};

use crate::common::convert::NumberLocale;

/// Name of the sheet created in a new workbook.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Number format applied by date writes without an explicit pattern.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

/// Prefix of sheet names generated by `add_and_load_sheet`.
pub const SHEET_NAME_PREFIX: &str = "Sheet";

/// Options applied to a workbook handle.
///
/// # Examples
///
/// ```rust
/// use twinsheet::{ExcelOptions, NumberLocale};
///
/// let options = ExcelOptions::new()
///     .with_default_sheet_name("Report")
///     .with_default_date_format("dd.mm.yyyy")
///     .with_number_locale(NumberLocale::german());
/// assert_eq!(options.default_sheet_name, "Report");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcelOptions {
    /// Name of the first sheet of a workbook opened for writing
    pub default_sheet_name: String,
    /// Pattern used by date writes that pass no pattern
    pub default_date_format: String,
    /// Separators for locale-aware number text; `None` uses the process locale
    pub number_locale: Option<NumberLocale>,
}

impl Default for ExcelOptions {
    fn default() -> Self {
        Self {
            default_sheet_name: DEFAULT_SHEET_NAME.to_string(),
            default_date_format: DEFAULT_DATE_FORMAT.to_string(),
            number_locale: None,
        }
    }
}

impl ExcelOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.default_sheet_name = name.into();
        self
    }

    pub fn with_default_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.default_date_format = pattern.into();
        self
    }

    /// Fix the separators used by locale-aware number text.
    pub fn with_number_locale(mut self, locale: NumberLocale) -> Self {
        self.number_locale = Some(locale);
        self
    }

    /// Locale in effect for this handle.
    pub fn resolved_locale(&self) -> NumberLocale {
        self.number_locale.unwrap_or_else(NumberLocale::process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExcelOptions::default();
        assert_eq!(options.default_sheet_name, "Sheet1");
        assert_eq!(options.default_date_format, "yyyy-mm-dd");
        assert_eq!(options.number_locale, None);
    }

    #[test]
    fn test_builder() {
        let options = ExcelOptions::new()
            .with_default_sheet_name("Data")
            .with_number_locale(NumberLocale::french());
        assert_eq!(options.default_sheet_name, "Data");
        assert_eq!(options.resolved_locale(), NumberLocale::french());
        assert_eq!(options.default_date_format, DEFAULT_DATE_FORMAT);
    }
}

//! Workbook formatting tables: FONT, FORMAT and XF records.
//!
//! Cells only ever carry a number format, so every cell XF shares the
//! default font and differs in its format index alone.
//!
//! The XF table is laid out the way Excel expects from a fresh workbook:
//!
//! - 0..14: style XFs
//! - 15: default cell XF
//! - 16..20: style XFs referenced by the built-in STYLE records
//! - 21..: one cell XF per registered number format

use std::collections::HashMap;
use std::io::Write;

use super::biff::{self, FONT, FORMAT, XF};
use crate::engine::EngineResult;

/// Built-in number formats with fixed BIFF indices.
const BUILTIN_NUMBER_FORMATS: [(u16, &str); 30] = [
    (0x00, "General"),
    (0x01, "0"),
    (0x02, "0.00"),
    (0x03, "#,##0"),
    (0x04, "#,##0.00"),
    (0x05, "\"$\"#,##0_);(\"$\"#,##0)"),
    (0x06, "\"$\"#,##0_);[Red](\"$\"#,##0)"),
    (0x07, "\"$\"#,##0.00_);(\"$\"#,##0.00)"),
    (0x08, "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)"),
    (0x09, "0%"),
    (0x0A, "0.00%"),
    (0x0B, "0.00E+00"),
    (0x0C, "# ?/?"),
    (0x0D, "# ??/??"),
    (0x0E, "m/d/yy"),
    (0x0F, "d-mmm-yy"),
    (0x10, "d-mmm"),
    (0x11, "mmm-yy"),
    (0x12, "h:mm AM/PM"),
    (0x13, "h:mm:ss AM/PM"),
    (0x14, "h:mm"),
    (0x15, "h:mm:ss"),
    (0x16, "m/d/yy h:mm"),
    (0x25, "#,##0_);(#,##0)"),
    (0x26, "#,##0_);[Red](#,##0)"),
    (0x27, "#,##0.00_);(#,##0.00)"),
    (0x28, "#,##0.00_);[Red](#,##0.00)"),
    (0x2D, "mm:ss"),
    (0x2E, "[h]:mm:ss"),
    (0x31, "@"),
];

/// First index available to user-defined number formats.
const FIRST_CUSTOM_FORMAT_INDEX: u16 = 164;

const STYLE_XF_COUNT: u16 = 15;
const DEFAULT_CELL_XF: u16 = STYLE_XF_COUNT;
const BUILTIN_STYLE_FORMATS: [u16; 5] = [0x2B, 0x29, 0x2C, 0x2A, 0x09];
const FIRST_USER_CELL_XF: u16 = DEFAULT_CELL_XF + 1 + BUILTIN_STYLE_FORMATS.len() as u16;

/// Font definition, in twips and BIFF weight units.
#[derive(Debug, Clone)]
struct Font {
    height: u16,
    bold: bool,
    italic: bool,
}

impl Font {
    const fn new(bold: bool, italic: bool) -> Self {
        Self {
            height: 200,
            bold,
            italic,
        }
    }
}

/// Default fonts: normal, bold, italic, bold italic.
const DEFAULT_FONTS: [Font; 4] = [
    Font::new(false, false),
    Font::new(true, false),
    Font::new(false, true),
    Font::new(true, true),
];

const FONT_NAME: &str = "Arial";

fn write_font<W: Write>(writer: &mut W, font: &Font) -> EngineResult<()> {
    biff::write_record_header(writer, FONT, 16 + FONT_NAME.len() as u16)?;
    writer.write_all(&font.height.to_le_bytes())?;
    let flags: u16 = if font.italic { 0x0002 } else { 0 };
    writer.write_all(&flags.to_le_bytes())?;
    // automatic color
    writer.write_all(&0x7FFFu16.to_le_bytes())?;
    let weight: u16 = if font.bold { 700 } else { 400 };
    writer.write_all(&weight.to_le_bytes())?;
    // escapement, underline, family, charset, reserved
    writer.write_all(&[0, 0, 0, 0, 0, 0])?;
    writer.write_all(&[FONT_NAME.len() as u8, 0x00])?;
    writer.write_all(FONT_NAME.as_bytes())?;
    Ok(())
}

fn write_format<W: Write>(writer: &mut W, index: u16, pattern: &str) -> EngineResult<()> {
    biff::write_record_header(writer, FORMAT, 2 + biff::unicode_string_size(pattern))?;
    writer.write_all(&index.to_le_bytes())?;
    biff::write_unicode_string(writer, pattern)
}

/// Write one XF record. Alignment is general/bottom and there are no
/// borders or fills.
fn write_xf<W: Write>(writer: &mut W, font_index: u16, format_index: u16, is_style: bool) -> EngineResult<()> {
    biff::write_record_header(writer, XF, 20)?;
    writer.write_all(&font_index.to_le_bytes())?;
    writer.write_all(&format_index.to_le_bytes())?;
    // type and protection; cell XFs point at parent style 0
    let xf_type: u16 = if is_style { 0xFFF5 } else { 0x0001 };
    writer.write_all(&xf_type.to_le_bytes())?;
    // vertical alignment bottom
    writer.write_all(&[0x20, 0, 0, 0])?;
    // border styles and palette indices
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    // automatic pattern colors
    writer.write_all(&0x20C0u16.to_le_bytes())?;
    Ok(())
}

/// Number formats and cell XFs used by a workbook.
#[derive(Debug, Default)]
pub struct FormatTable {
    custom_formats: Vec<(u16, String)>,
    /// Number format index of each user cell XF, in XF order
    cell_xfs: Vec<u16>,
    xf_by_pattern: HashMap<String, u16>,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the XF index for cells showing `pattern`, registering a FORMAT
    /// record and cell XF the first time the pattern is seen.
    pub fn xf_for_pattern(&mut self, pattern: &str) -> u16 {
        if let Some(&xf) = self.xf_by_pattern.get(pattern) {
            return xf;
        }

        let format_index = match builtin_format_index(pattern) {
            Some(0) => {
                self.xf_by_pattern.insert(pattern.to_string(), DEFAULT_CELL_XF);
                return DEFAULT_CELL_XF;
            },
            Some(index) => index,
            None => {
                let index = FIRST_CUSTOM_FORMAT_INDEX + self.custom_formats.len() as u16;
                self.custom_formats.push((index, pattern.to_string()));
                index
            },
        };

        let xf = FIRST_USER_CELL_XF + self.cell_xfs.len() as u16;
        self.cell_xfs.push(format_index);
        self.xf_by_pattern.insert(pattern.to_string(), xf);
        xf
    }

    pub fn default_xf(&self) -> u16 {
        DEFAULT_CELL_XF
    }

    /// Write FONT, FORMAT and XF records in workbook globals order.
    pub fn write<W: Write>(&self, writer: &mut W) -> EngineResult<()> {
        for font in &DEFAULT_FONTS {
            write_font(writer, font)?;
        }

        for (index, pattern) in BUILTIN_NUMBER_FORMATS.iter().take(8) {
            write_format(writer, *index, pattern)?;
        }
        for (index, pattern) in &self.custom_formats {
            write_format(writer, *index, pattern)?;
        }

        for i in 0..STYLE_XF_COUNT {
            let font_index = match i {
                1 | 2 => 1,
                3 | 4 => 2,
                _ => 0,
            };
            write_xf(writer, font_index, 0, true)?;
        }
        write_xf(writer, 0, 0, false)?;
        for format_index in BUILTIN_STYLE_FORMATS {
            write_xf(writer, 0, format_index, true)?;
        }
        for &format_index in &self.cell_xfs {
            write_xf(writer, 0, format_index, false)?;
        }
        Ok(())
    }
}

fn builtin_format_index(pattern: &str) -> Option<u16> {
    BUILTIN_NUMBER_FORMATS
        .iter()
        .find(|(_, p)| *p == pattern)
        .map(|(index, _)| *index)
}

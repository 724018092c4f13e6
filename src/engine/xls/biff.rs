//! BIFF8 record writers.
//!
//! Each BIFF record is a 2-byte record type, a 2-byte payload length and the
//! payload itself. Only the records needed to describe plain values, number
//! formats and list validations are produced here.
//!
//! # References
//!
//! "[MS-XLS]: Excel Binary File Format (.xls) Structure"

use std::io::Write;

use crate::engine::{EngineError, EngineResult, check_cell_text, check_list_source};

/// Largest payload a single record may carry.
pub const MAX_RECORD_DATA: usize = 8224;

pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CODEPAGE: u16 = 0x0042;
pub const DATE1904: u16 = 0x0022;
pub const WINDOW1: u16 = 0x003D;
pub const FONT: u16 = 0x0031;
pub const FORMAT: u16 = 0x041E;
pub const XF: u16 = 0x00E0;
pub const STYLE: u16 = 0x0293;
pub const USESELFS: u16 = 0x0160;
pub const BOUNDSHEET: u16 = 0x0085;
pub const SST: u16 = 0x00FC;
pub const CONTINUE: u16 = 0x003C;
pub const DIMENSIONS: u16 = 0x0200;
pub const WSBOOL: u16 = 0x0081;
pub const WINDOW2: u16 = 0x023E;
pub const NUMBER: u16 = 0x0203;
pub const LABELSST: u16 = 0x00FD;
pub const BOOLERR: u16 = 0x0205;
pub const DVAL: u16 = 0x01B2;
pub const DV: u16 = 0x01BE;

/// Substream kinds announced by a BOF record.
pub const SUBSTREAM_WORKBOOK: u16 = 0x0005;
pub const SUBSTREAM_WORKSHEET: u16 = 0x0010;

/// Code page identifier for UTF-16 text.
pub const CODEPAGE_UTF16: u16 = 0x04B0;

#[inline]
pub fn write_record_header<W: Write>(writer: &mut W, record_type: u16, data_len: u16) -> EngineResult<()> {
    writer.write_all(&record_type.to_le_bytes())?;
    writer.write_all(&data_len.to_le_bytes())?;
    Ok(())
}

/// Narrow a row index to the 16-bit field used by cell records.
fn biff_row(row: u32, record: &str) -> EngineResult<u16> {
    u16::try_from(row).map_err(|_| {
        EngineError::InvalidData(format!(
            "Row index {} exceeds BIFF8 limit 65535 for {} record",
            row, record
        ))
    })
}

fn needs_utf16(value: &str) -> bool {
    value.chars().any(|c| c as u32 > 0x7F)
}

/// Encoded size of an XLUnicodeString (2-byte count, flags, characters).
pub fn unicode_string_size(value: &str) -> u16 {
    let units = value.encode_utf16().count() as u16;
    if needs_utf16(value) {
        3 + units.saturating_mul(2)
    } else {
        3 + units
    }
}

/// Write an XLUnicodeString: 8-bit when the text is ASCII, UTF-16LE otherwise.
pub fn write_unicode_string<W: Write>(writer: &mut W, value: &str) -> EngineResult<()> {
    let units: Vec<u16> = value.encode_utf16().collect();
    writer.write_all(&(units.len() as u16).to_le_bytes())?;
    if needs_utf16(value) {
        writer.write_all(&[0x01])?;
        for unit in units {
            writer.write_all(&unit.to_le_bytes())?;
        }
    } else {
        writer.write_all(&[0x00])?;
        writer.write_all(value.as_bytes())?;
    }
    Ok(())
}

pub fn write_bof<W: Write>(writer: &mut W, substream_type: u16) -> EngineResult<()> {
    write_record_header(writer, BOF, 16)?;
    // BIFF8
    writer.write_all(&0x0600u16.to_le_bytes())?;
    writer.write_all(&substream_type.to_le_bytes())?;
    // build identifier and year
    writer.write_all(&0x0DBBu16.to_le_bytes())?;
    writer.write_all(&0x07CCu16.to_le_bytes())?;
    // file history flags
    writer.write_all(&0u32.to_le_bytes())?;
    // lowest BIFF version able to read the file
    writer.write_all(&6u32.to_le_bytes())?;
    Ok(())
}

pub fn write_eof<W: Write>(writer: &mut W) -> EngineResult<()> {
    write_record_header(writer, EOF, 0)
}

pub fn write_codepage<W: Write>(writer: &mut W, codepage: u16) -> EngineResult<()> {
    write_record_header(writer, CODEPAGE, 2)?;
    writer.write_all(&codepage.to_le_bytes())?;
    Ok(())
}

pub fn write_date1904<W: Write>(writer: &mut W, is_1904: bool) -> EngineResult<()> {
    write_record_header(writer, DATE1904, 2)?;
    writer.write_all(&u16::from(is_1904).to_le_bytes())?;
    Ok(())
}

/// WINDOW1 with the default window geometry Excel writes for a new file.
pub fn write_window1<W: Write>(writer: &mut W) -> EngineResult<()> {
    write_record_header(writer, WINDOW1, 18)?;
    for field in [0u16, 0, 0x3000, 0x1E00, 0x0038, 0, 0, 1, 0x0258] {
        writer.write_all(&field.to_le_bytes())?;
    }
    Ok(())
}

/// Write the built-in STYLE records pointing at style XFs 0 and 16..20.
pub fn write_builtin_styles<W: Write>(writer: &mut W) -> EngineResult<()> {
    // (xf index, builtin style id): Comma, Comma [0], Currency, Currency [0], Normal, Percent
    const BUILTIN_STYLES: [(u16, u8); 6] = [
        (0x0010, 3),
        (0x0011, 6),
        (0x0012, 4),
        (0x0013, 7),
        (0x0000, 0),
        (0x0014, 5),
    ];

    for (xf_index, style_id) in BUILTIN_STYLES {
        write_record_header(writer, STYLE, 4)?;
        // bit 15 marks a built-in style
        writer.write_all(&((xf_index & 0x0FFF) | 0x8000).to_le_bytes())?;
        writer.write_all(&[style_id, 0xFF])?;
    }
    Ok(())
}

pub fn write_usesel_fs<W: Write>(writer: &mut W) -> EngineResult<()> {
    write_record_header(writer, USESELFS, 2)?;
    writer.write_all(&0u16.to_le_bytes())?;
    Ok(())
}

/// Write a BOUNDSHEET record. The stream position is patched once the
/// worksheet substream has been laid out.
pub fn write_boundsheet<W: Write>(writer: &mut W, position: u32, name: &str) -> EngineResult<()> {
    let units: Vec<u16> = name.encode_utf16().take(31).collect();
    let wide = needs_utf16(name);
    let name_len = if wide { units.len() * 2 } else { units.len() };

    write_record_header(writer, BOUNDSHEET, 8 + name_len as u16)?;
    writer.write_all(&position.to_le_bytes())?;
    // visible worksheet
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&[units.len() as u8, u8::from(wide)])?;
    for unit in units {
        if wide {
            writer.write_all(&unit.to_le_bytes())?;
        } else {
            writer.write_all(&[unit as u8])?;
        }
    }
    Ok(())
}

/// Write the shared string table, spilling into CONTINUE records.
///
/// A string header never straddles a record boundary. When character data
/// does, the continuation starts with a fresh option byte.
pub fn write_sst<W: Write>(writer: &mut W, strings: &[String], total_refs: u32) -> EngineResult<()> {
    let mut chunks = SstChunks::new(writer);
    chunks.buffer.extend_from_slice(&total_refs.to_le_bytes());
    chunks.buffer.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    for value in strings {
        let wide = needs_utf16(value);
        check_cell_text(value)?;
        let units: Vec<u16> = value.encode_utf16().collect();
        let unit_size = if wide { 2 } else { 1 };

        if chunks.available() < 3 {
            chunks.flush()?;
        }
        chunks.buffer.extend_from_slice(&(units.len() as u16).to_le_bytes());
        chunks.buffer.push(u8::from(wide));

        let mut written = 0;
        while written < units.len() {
            let fit = chunks.available() / unit_size;
            if fit == 0 {
                chunks.flush()?;
                chunks.buffer.push(u8::from(wide));
                continue;
            }
            let end = (written + fit).min(units.len());
            for &unit in &units[written..end] {
                if wide {
                    chunks.buffer.extend_from_slice(&unit.to_le_bytes());
                } else {
                    chunks.buffer.push(unit as u8);
                }
            }
            written = end;
        }
    }
    chunks.flush()
}

struct SstChunks<'a, W: Write> {
    writer: &'a mut W,
    buffer: Vec<u8>,
    first: bool,
}

impl<'a, W: Write> SstChunks<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(MAX_RECORD_DATA),
            first: true,
        }
    }

    fn available(&self) -> usize {
        MAX_RECORD_DATA - self.buffer.len()
    }

    fn flush(&mut self) -> EngineResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let record_type = if self.first { SST } else { CONTINUE };
        write_record_header(self.writer, record_type, self.buffer.len() as u16)?;
        self.writer.write_all(&self.buffer)?;
        self.buffer.clear();
        self.first = false;
        Ok(())
    }
}

/// DIMENSIONS takes the first used row/column and one past the last.
pub fn write_dimensions<W: Write>(
    writer: &mut W,
    first_row: u32,
    last_row_plus1: u32,
    first_col: u16,
    last_col_plus1: u16,
) -> EngineResult<()> {
    write_record_header(writer, DIMENSIONS, 14)?;
    writer.write_all(&first_row.to_le_bytes())?;
    writer.write_all(&last_row_plus1.to_le_bytes())?;
    writer.write_all(&first_col.to_le_bytes())?;
    writer.write_all(&last_col_plus1.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    Ok(())
}

pub fn write_wsbool<W: Write>(writer: &mut W) -> EngineResult<()> {
    write_record_header(writer, WSBOOL, 2)?;
    writer.write_all(&0x04C1u16.to_le_bytes())?;
    Ok(())
}

/// WINDOW2 with gridlines, headings, zeros and outline symbols shown.
pub fn write_window2<W: Write>(writer: &mut W, active: bool) -> EngineResult<()> {
    let mut options: u16 = 0x06B6;
    if !active {
        // clear "selected" and "active"
        options &= !0x0600;
    }
    write_record_header(writer, WINDOW2, 18)?;
    writer.write_all(&options.to_le_bytes())?;
    // top row, left column, header color
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0x0040u32.to_le_bytes())?;
    // zoom levels and reserved
    writer.write_all(&[0u8; 8])?;
    Ok(())
}

pub fn write_number<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16, value: f64) -> EngineResult<()> {
    let row = biff_row(row, "NUMBER")?;
    write_record_header(writer, NUMBER, 14)?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_labelsst<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16, sst_index: u32) -> EngineResult<()> {
    let row = biff_row(row, "LABELSST")?;
    write_record_header(writer, LABELSST, 10)?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&sst_index.to_le_bytes())?;
    Ok(())
}

/// Value stored by a BOOLERR record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolErr {
    Boolean(bool),
    Error(u8),
}

pub fn write_boolerr<W: Write>(writer: &mut W, row: u32, col: u16, xf_index: u16, value: BoolErr) -> EngineResult<()> {
    let row = biff_row(row, "BOOLERR")?;
    let (byte, is_error) = match value {
        BoolErr::Boolean(b) => (u8::from(b), 0u8),
        BoolErr::Error(code) => (code, 1u8),
    };
    write_record_header(writer, BOOLERR, 8)?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&xf_index.to_le_bytes())?;
    writer.write_all(&[byte, is_error])?;
    Ok(())
}

/// DVAL header announcing `dv_count` DV records with no drop-down object.
pub fn write_dval<W: Write>(writer: &mut W, dv_count: u32) -> EngineResult<()> {
    write_record_header(writer, DVAL, 18)?;
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&0u32.to_le_bytes())?;
    writer.write_all(&u32::MAX.to_le_bytes())?;
    writer.write_all(&dv_count.to_le_bytes())?;
    Ok(())
}

/// Write a DV record holding an explicit list for a single cell.
///
/// The list is stored as one `PtgStr` token with the values separated by
/// NUL characters. Invalid input is rejected with a stop-style error box.
pub fn write_list_dv<W: Write>(writer: &mut W, row: u32, col: u16, values: &[String]) -> EngineResult<()> {
    const DATA_TYPE_LIST: u32 = 0x03;
    const EXPLICIT_LIST: u32 = 0x0000_0080;
    const EMPTY_CELL_ALLOWED: u32 = 0x0000_0100;
    const SHOW_ERROR_BOX: u32 = 0x0008_0000;
    // Excel encodes an absent title or message as a single NUL character.
    const ABSENT: &str = "\u{0000}";

    let row = biff_row(row, "DV")?;
    check_list_source(values)?;
    let joined = values.join("\u{0000}");
    let units: Vec<u16> = joined.encode_utf16().collect();
    let wide = needs_utf16(&joined);

    let mut formula = Vec::with_capacity(3 + units.len() * 2);
    // PtgStr: token, character count, option byte, characters
    formula.push(0x17);
    formula.push(units.len() as u8);
    formula.push(u8::from(wide));
    for unit in &units {
        if wide {
            formula.extend_from_slice(&unit.to_le_bytes());
        } else {
            formula.push(*unit as u8);
        }
    }

    let strings_len = 4 * unicode_string_size(ABSENT);
    let data_len = 4 + strings_len + 4 + formula.len() as u16 + 4 + 2 + 8;
    if usize::from(data_len) > MAX_RECORD_DATA {
        return Err(EngineError::InvalidData(
            "DV record exceeds maximum BIFF8 record size".to_string(),
        ));
    }

    write_record_header(writer, DV, data_len)?;
    let options = DATA_TYPE_LIST | EXPLICIT_LIST | EMPTY_CELL_ALLOWED | SHOW_ERROR_BOX;
    writer.write_all(&options.to_le_bytes())?;
    // prompt title, error title, prompt text, error text
    for _ in 0..4 {
        write_unicode_string(writer, ABSENT)?;
    }
    writer.write_all(&(formula.len() as u16).to_le_bytes())?;
    writer.write_all(&0x3FE0u16.to_le_bytes())?;
    writer.write_all(&formula)?;
    // no second formula
    writer.write_all(&0u16.to_le_bytes())?;
    writer.write_all(&0u16.to_le_bytes())?;
    // one target range covering the cell
    writer.write_all(&1u16.to_le_bytes())?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&row.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    writer.write_all(&col.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_type(buf: &[u8]) -> u16 {
        u16::from_le_bytes([buf[0], buf[1]])
    }

    fn record_len(buf: &[u8]) -> u16 {
        u16::from_le_bytes([buf[2], buf[3]])
    }

    #[test]
    fn test_write_bof() {
        let mut buf = Vec::new();
        write_bof(&mut buf, SUBSTREAM_WORKBOOK).unwrap();
        assert_eq!(record_type(&buf), 0x0809);
        assert_eq!(record_len(&buf), 16);
        assert_eq!(buf.len(), 20);
    }

    #[test]
    fn test_write_number_rejects_wide_rows() {
        let mut buf = Vec::new();
        write_number(&mut buf, 0, 0, 15, 42.5).unwrap();
        assert_eq!(record_type(&buf), 0x0203);
        assert_eq!(record_len(&buf), 14);
        assert_eq!(f64::from_le_bytes(buf[10..18].try_into().unwrap()), 42.5);

        let mut buf = Vec::new();
        assert!(write_number(&mut buf, 70_000, 0, 15, 1.0).is_err());
    }

    #[test]
    fn test_write_boolerr_error_flag() {
        let mut buf = Vec::new();
        write_boolerr(&mut buf, 1, 2, 15, BoolErr::Error(0x07)).unwrap();
        assert_eq!(&buf[10..12], &[0x07, 0x01]);

        let mut buf = Vec::new();
        write_boolerr(&mut buf, 1, 2, 15, BoolErr::Boolean(true)).unwrap();
        assert_eq!(&buf[10..12], &[0x01, 0x00]);
    }

    #[test]
    fn test_write_sst_single_record() {
        let mut buf = Vec::new();
        let strings = vec!["a".to_string(), "über".to_string()];
        write_sst(&mut buf, &strings, 3).unwrap();
        assert_eq!(record_type(&buf), SST);
        // 8 byte header + "a" (3 + 1) + "über" (3 + 8)
        assert_eq!(record_len(&buf), 8 + 4 + 11);
        assert_eq!(buf.len(), 4 + 23);
    }

    #[test]
    fn test_write_sst_continue() {
        let mut buf = Vec::new();
        let strings = vec!["x".repeat(10_000)];
        write_sst(&mut buf, &strings, 1).unwrap();
        assert_eq!(record_type(&buf), SST);
        assert_eq!(usize::from(record_len(&buf)), MAX_RECORD_DATA);
        let next = 4 + MAX_RECORD_DATA;
        assert_eq!(record_type(&buf[next..]), CONTINUE);
        // 8 + 3 header bytes in the first record, one option byte in the second
        let rest = 10_000 - (MAX_RECORD_DATA - 11);
        assert_eq!(usize::from(record_len(&buf[next..])), rest + 1);
    }

    #[test]
    fn test_write_list_dv() {
        let mut buf = Vec::new();
        let values = vec!["yes".to_string(), "no".to_string()];
        write_list_dv(&mut buf, 3, 1, &values).unwrap();
        assert_eq!(record_type(&buf), DV);
        assert_eq!(usize::from(record_len(&buf)), buf.len() - 4);
        let options = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        assert_eq!(options & 0x0F, 3);
        assert_ne!(options & 0x80, 0);
        assert_ne!(options & 0x0008_0000, 0);
    }

    #[test]
    fn test_list_dv_too_long() {
        let mut buf = Vec::new();
        let values = vec!["v".repeat(300)];
        assert!(matches!(
            write_list_dv(&mut buf, 0, 0, &values),
            Err(EngineError::ListTooLong { len: 300, .. })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_write_sst_rejects_oversized_text() {
        let mut buf = Vec::new();
        let strings = vec!["t".repeat(70_000)];
        assert!(matches!(
            write_sst(&mut buf, &strings, 1),
            Err(EngineError::TextTooLong { len: 70_000, .. })
        ));
    }
}

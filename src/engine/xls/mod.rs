//! Legacy Excel (.xls) writer.
//!
//! The workbook is rendered as a BIFF8 record stream and stored as the
//! `Workbook` stream of an OLE2 compound file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::debug;

use super::{EngineResult, Workbook};

mod biff;
mod formats;
mod stream;

use stream::generate_workbook_stream;

/// File name suffix of legacy workbooks.
pub const EXTENSION: &str = ".xls";

/// Maximum row index on a BIFF8 worksheet.
pub const MAX_ROW_INDEX_ON_SHEET: u32 = 65_535;

/// Maximum column index on a BIFF8 worksheet.
pub const MAX_COLUMN_INDEX: u16 = 255;

/// Streams shorter than this end up in the compound file's mini stream,
/// which some readers reject for the `Workbook` stream.
const MIN_WORKBOOK_STREAM_LEN: usize = 4096;

/// Write `workbook` to `path` as an .xls file.
pub fn save(workbook: &Workbook, path: &Path) -> EngineResult<()> {
    let mut data = generate_workbook_stream(workbook)?;
    if data.len() < MIN_WORKBOOK_STREAM_LEN {
        data.resize(MIN_WORKBOOK_STREAM_LEN, 0);
    }

    // calamine only reads version 3 containers with 512-byte sectors
    let mut compound =
        cfb::CompoundFile::create_with_version(cfb::Version::V3, File::create(path)?)?;
    {
        let mut stream = compound.create_stream("/Workbook")?;
        stream.write_all(&data)?;
    }
    compound.flush()?;
    debug!("wrote {} byte BIFF8 workbook to {}", data.len(), path.display());
    Ok(())
}

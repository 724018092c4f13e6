//! Uniform read/write API over `.xls` and `.xlsx` workbooks.
//!
//! A file is opened by name; its suffix picks the format and the handling
//! mode decides whether it is loaded from disk or created empty. All cell
//! access then goes through one [`ExcelFile`] type, whatever the format.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use twinsheet::{HandlingMode, open_excel_file};
//!
//! let mut file = open_excel_file("data.xls", HandlingMode::Read)?;
//! for row in 0..file.number_of_rows()? as i32 {
//!     println!("{}", file.cell_value_string(row, 0)?);
//! }
//! file.close()?;
//! # Ok::<(), twinsheet::Error>(())
//! ```
//!
//! # Reading values
//!
//! [`ExcelFile::cell_value`] returns `None` for a missing cell and a
//! [`Value`] otherwise. Narrowed readers such as
//! [`ExcelFile::cell_value_double`] return `None` as well when the cell holds
//! another kind of value. Negative coordinates are always an error.

mod accessor;
mod factory;
mod file;
mod navigator;
pub mod types;


pub use factory::{OpenOptions, open_excel_file, with_excel_file};
pub use file::ExcelFile;
pub use navigator::SheetNavigator;
pub use types::{HandlingMode, Value};

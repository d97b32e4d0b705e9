//! Exchange formats for [`MetricTable`](crate::MetricTable).
//!
//! - Tagged text header with ASCII or big-endian binary data
//! - Sectioned CSV
//!
//! Both work over `std::io` readers and writers; choosing files is left to
//! the caller.

mod csv;
mod format;

pub use self::csv::{read_csv, write_csv};
pub use self::format::{Encoding, read, write, write_ascii, write_binary};

//! Tagged header format with ASCII or binary data.
//!
//! # Layout
//!
//! ```text
//! BeginHeader                              optional preamble
//! encoding ASCII|BINARY
//! comment TEXT
//! EndHeader
//! tag-version 2
//! tag-number-of-nodes N
//! tag-number-of-columns K
//! tag-title TITLE
//! tag-column-name j NAME                   one line per column, per tag
//! tag-column-comment j TEXT
//! tag-column-study-metadata j CODED
//! tag-column-color-mapping j MIN MAX
//! tag-column-threshold j NEG POS
//! tag-column-average-threshold j NEG POS
//! tag-BEGIN-DATA
//! ```
//!
//! ASCII data follows as one line per node: the node index and then `K`
//! whitespace-separated values. Binary data is `N × K` big-endian
//! IEEE-754 `f32` in row-major order.
//!
//! Free text never spans lines: newlines in comments are written as tabs
//! and restored on read. Without a preamble the data is ASCII.

use std::io::{BufRead, ErrorKind, Write};

use tracing::{debug, warn};

use crate::column::Column;
use crate::error::{MetricError, MetricResult};
use crate::table::MetricTable;

/// Current file version.
const VERSION: u32 = 2;

const BEGIN_HEADER: &str = "BeginHeader";
const END_HEADER: &str = "EndHeader";
const BEGIN_DATA: &str = "tag-BEGIN-DATA";

/// Rows reserved up front; columns grow past this as data is read.
const RESERVED_ROWS: usize = 1 << 16;

/// Data encoding of the tagged format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// One text line per node.
    #[default]
    Ascii,
    /// Big-endian `f32`, row-major.
    Binary,
}

impl Encoding {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Ascii => "ASCII",
            Self::Binary => "BINARY",
        }
    }

    fn from_keyword(word: &str) -> MetricResult<Self> {
        match word.trim() {
            w if w.eq_ignore_ascii_case("ascii") => Ok(Self::Ascii),
            w if w.eq_ignore_ascii_case("binary") => Ok(Self::Binary),
            other => Err(MetricError::invalid_content(format!(
                "unknown encoding \"{other}\""
            ))),
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('\n', "\t")
}

fn unescape(text: &str) -> String {
    text.replace('\t', "\n")
}

/// Write a table with ASCII data.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_ascii<W: Write>(table: &MetricTable, writer: &mut W) -> MetricResult<()> {
    write(table, writer, Encoding::Ascii)
}

/// Write a table with binary data.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_binary<W: Write>(table: &MetricTable, writer: &mut W) -> MetricResult<()> {
    write(table, writer, Encoding::Binary)
}

/// Write a table in the tagged format.
///
/// Values are written in their shortest exact form, so reading the output
/// back restores every value bit for bit.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write<W: Write>(table: &MetricTable, writer: &mut W, encoding: Encoding) -> MetricResult<()> {
    writeln!(writer, "{BEGIN_HEADER}")?;
    writeln!(writer, "encoding {}", encoding.keyword())?;
    if !table.file_comment().is_empty() {
        writeln!(writer, "comment {}", escape(table.file_comment()))?;
    }
    writeln!(writer, "{END_HEADER}")?;

    writeln!(writer, "tag-version {VERSION}")?;
    writeln!(writer, "tag-number-of-nodes {}", table.node_count())?;
    writeln!(writer, "tag-number-of-columns {}", table.column_count())?;
    writeln!(writer, "tag-title {}", escape(table.title()))?;

    let columns = table.columns();
    for (j, c) in columns.iter().enumerate() {
        writeln!(writer, "tag-column-name {j} {}", escape(&c.name))?;
    }
    for (j, c) in columns.iter().enumerate() {
        writeln!(writer, "tag-column-comment {j} {}", escape(&c.comment))?;
    }
    for (j, c) in columns.iter().enumerate() {
        writeln!(
            writer,
            "tag-column-study-metadata {j} {}",
            escape(&c.study_metadata)
        )?;
    }
    for (j, c) in columns.iter().enumerate() {
        let (lo, hi) = c.color_mapping;
        writeln!(writer, "tag-column-color-mapping {j} {lo} {hi}")?;
    }
    for (j, c) in columns.iter().enumerate() {
        let (neg, pos) = c.threshold;
        writeln!(writer, "tag-column-threshold {j} {neg} {pos}")?;
    }
    for (j, c) in columns.iter().enumerate() {
        let (neg, pos) = c.average_threshold;
        writeln!(writer, "tag-column-average-threshold {j} {neg} {pos}")?;
    }
    writeln!(writer, "{BEGIN_DATA}")?;

    match encoding {
        Encoding::Ascii => {
            for node in 0..table.node_count() {
                write!(writer, "{node}")?;
                for c in columns {
                    write!(writer, " {}", c.values()[node])?;
                }
                writeln!(writer)?;
            }
        }
        Encoding::Binary => {
            for node in 0..table.node_count() {
                for c in columns {
                    writer.write_all(&c.values()[node].to_be_bytes())?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Header state collected before the data section.
#[derive(Default)]
struct Header {
    encoding: Encoding,
    node_count: Option<usize>,
    columns: Option<Vec<Column>>,
    title: String,
    comment: String,
}

impl Header {
    fn column(&mut self, rest: &str, tag: &str) -> MetricResult<(&mut Column, String)> {
        let (index, value) = rest.split_once(' ').unwrap_or((rest, ""));
        let index: usize = index.parse()?;
        let columns = self.columns.as_mut().ok_or_else(|| {
            MetricError::invalid_content(format!("{tag} before tag-number-of-columns"))
        })?;
        let count = columns.len();
        let column = columns.get_mut(index).ok_or_else(|| {
            MetricError::invalid_content(format!(
                "{tag} names column {index} of {count}"
            ))
        })?;
        Ok((column, value.to_string()))
    }

    fn pair(value: &str, tag: &str) -> MetricResult<(f32, f32)> {
        let mut parts = value.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(a), Some(b)) => Ok((a.parse()?, b.parse()?)),
            _ => Err(MetricError::invalid_content(format!(
                "{tag} needs two values, got \"{value}\""
            ))),
        }
    }

    fn apply(&mut self, line: &str) -> MetricResult<()> {
        let (tag, rest) = line.split_once(' ').unwrap_or((line, ""));
        match tag {
            "tag-version" => {
                let version: u32 = rest.trim().parse()?;
                if version > VERSION {
                    warn!(version, "Newer table file version");
                }
            }
            "tag-number-of-nodes" => self.node_count = Some(rest.trim().parse()?),
            "tag-number-of-columns" => {
                let k: usize = rest.trim().parse()?;
                let n = self.node_count.ok_or_else(|| {
                    MetricError::invalid_content("tag-number-of-columns before tag-number-of-nodes")
                })?;
                if n.checked_mul(k).is_none() {
                    return Err(MetricError::invalid_content(format!(
                        "{n} nodes by {k} columns is too large"
                    )));
                }
                // Values arrive with the data rows; only metadata lives here.
                let mut columns = Vec::new();
                columns.try_reserve_exact(k).map_err(|_| {
                    MetricError::invalid_content(format!("cannot hold {k} columns"))
                })?;
                columns.extend((0..k).map(|_| Column::from_values(String::new(), Vec::new())));
                self.columns = Some(columns);
            }
            "tag-title" => self.title = unescape(rest),
            "tag-column-name" => {
                let (column, value) = self.column(rest, tag)?;
                column.name = unescape(&value);
            }
            "tag-column-comment" => {
                let (column, value) = self.column(rest, tag)?;
                column.comment = unescape(&value);
            }
            "tag-column-study-metadata" => {
                let (column, value) = self.column(rest, tag)?;
                column.study_metadata = unescape(&value);
            }
            "tag-column-color-mapping" => {
                let (column, value) = self.column(rest, tag)?;
                column.color_mapping = Self::pair(&value, tag)?;
            }
            "tag-column-threshold" => {
                let (column, value) = self.column(rest, tag)?;
                column.threshold = Self::pair(&value, tag)?;
            }
            "tag-column-average-threshold" => {
                let (column, value) = self.column(rest, tag)?;
                column.average_threshold = Self::pair(&value, tag)?;
            }
            "" => {}
            unknown => warn!(tag = unknown, "Unknown table header tag"),
        }
        Ok(())
    }
}

/// Read one line without its terminator. `None` at end of input.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut String) -> MetricResult<Option<()>> {
    buf.clear();
    if reader.read_line(buf)? == 0 {
        return Ok(None);
    }
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(Some(()))
}

/// Read a table in the tagged format, ASCII or binary.
///
/// # Errors
///
/// - [`MetricError::InvalidContent`] for malformed headers or data lines
/// - [`MetricError::UnexpectedEof`] if data ends before all rows are read
/// - [`MetricError::Io`] and parse errors from the underlying reader
pub fn read<R: BufRead>(reader: &mut R) -> MetricResult<MetricTable> {
    let mut header = Header::default();
    let mut line = String::new();
    let mut first = true;
    loop {
        if next_line(reader, &mut line)?.is_none() {
            return Err(MetricError::invalid_content(format!(
                "missing {BEGIN_DATA}"
            )));
        }
        if first && line.trim() == BEGIN_HEADER {
            read_preamble(reader, &mut header, &mut line)?;
            first = false;
            continue;
        }
        first = false;
        if line.trim_end() == BEGIN_DATA {
            break;
        }
        header.apply(&line)?;
    }

    let node_count = header
        .node_count
        .ok_or_else(|| MetricError::invalid_content("missing tag-number-of-nodes"))?;
    let mut columns = header
        .columns
        .ok_or_else(|| MetricError::invalid_content("missing tag-number-of-columns"))?;
    debug!(
        nodes = node_count,
        columns = columns.len(),
        encoding = ?header.encoding,
        "Reading table data"
    );

    match header.encoding {
        Encoding::Ascii => read_ascii_rows(reader, &mut columns, node_count)?,
        Encoding::Binary => read_binary_rows(reader, &mut columns, node_count)?,
    }

    let mut table = MetricTable::from_columns(node_count, columns)?;
    table.set_title(header.title);
    table.set_file_comment(header.comment);
    table.clear_modified();
    Ok(table)
}

fn read_preamble<R: BufRead>(
    reader: &mut R,
    header: &mut Header,
    line: &mut String,
) -> MetricResult<()> {
    loop {
        if next_line(reader, line)?.is_none() {
            return Err(MetricError::invalid_content(format!(
                "missing {END_HEADER}"
            )));
        }
        if line.trim() == END_HEADER {
            return Ok(());
        }
        let (key, value) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        match key {
            "encoding" => header.encoding = Encoding::from_keyword(value)?,
            "comment" => header.comment = unescape(value),
            _ => debug!(key, "Ignoring header preamble entry"),
        }
    }
}

/// Empty value buffers for `count` columns of up to `node_count` rows.
fn row_buffers(count: usize, node_count: usize) -> Vec<Vec<f32>> {
    let reserve = node_count.min(RESERVED_ROWS);
    (0..count).map(|_| Vec::with_capacity(reserve)).collect()
}

fn read_ascii_rows<R: BufRead>(
    reader: &mut R,
    columns: &mut [Column],
    node_count: usize,
) -> MetricResult<()> {
    let mut values = row_buffers(columns.len(), node_count);
    let mut line = String::new();
    let mut row = 0;
    while row < node_count {
        if next_line(reader, &mut line)?.is_none() {
            return Err(MetricError::UnexpectedEof {
                rows: row,
                expected: node_count,
            });
        }
        let mut tokens = line.split_whitespace();
        if tokens.next().is_none() {
            continue;
        }
        for column in &mut values {
            let token = tokens.next().ok_or_else(|| {
                MetricError::invalid_content(format!("invalid metric line: {line}"))
            })?;
            column.push(token.parse()?);
        }
        row += 1;
    }
    for (column, values) in columns.iter_mut().zip(values) {
        column.replace_values(values);
    }
    Ok(())
}

fn read_binary_rows<R: BufRead>(
    reader: &mut R,
    columns: &mut [Column],
    node_count: usize,
) -> MetricResult<()> {
    if columns.is_empty() {
        return Ok(());
    }
    let mut values = row_buffers(columns.len(), node_count);
    let mut word = [0u8; 4];
    for row in 0..node_count {
        for column in &mut values {
            reader.read_exact(&mut word).map_err(|e| {
                if e.kind() == ErrorKind::UnexpectedEof {
                    MetricError::UnexpectedEof {
                        rows: row,
                        expected: node_count,
                    }
                } else {
                    MetricError::Io(e)
                }
            })?;
            column.push(f32::from_be_bytes(word));
        }
    }
    for (column, values) in columns.iter_mut().zip(values) {
        column.replace_values(values);
    }
    Ok(())
}

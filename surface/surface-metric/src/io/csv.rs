//! Sectioned CSV exchange.
//!
//! ```text
//! CSVF-FILE,0,...
//! csvf-section-start,header,2
//! tag,value
//! version,2
//! number-of-nodes,N
//! title,TITLE
//! comment,TEXT
//! csvf-section-end,header
//! csvf-section-start,column-comment,2
//! Column,Comment
//! 0,TEXT
//! csvf-section-end,column-comment
//! ...                                     study metadata, color mapping,
//!                                         threshold, average threshold
//! csvf-section-start,Data,K
//! NAME_0,...,NAME_K-1
//! v,...,v                                 one record per node
//! csvf-section-end,Data
//! ```
//!
//! Fields holding a comma, a quote or a line break are quoted, with inner
//! quotes doubled. Metadata sections are optional on read; `Data` is not.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::column::Column;
use crate::error::{MetricError, MetricResult};
use crate::table::MetricTable;

const FILE_TAG: &str = "CSVF-FILE";
const SECTION_START: &str = "csvf-section-start";
const SECTION_END: &str = "csvf-section-end";

const HEADER: &str = "header";
const COMMENT: &str = "column-comment";
const STUDY_METADATA: &str = "column-study-metadata";
const COLOR_MAPPING: &str = "column-color-mapping";
const THRESHOLD: &str = "column-threshold";
const AVERAGE_THRESHOLD: &str = "column-average-threshold";
const DATA: &str = "Data";

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_record<W: Write>(writer: &mut W, fields: &[String]) -> MetricResult<()> {
    let line: Vec<String> = fields.iter().map(|f| quote(f)).collect();
    writeln!(writer, "{}", line.join(","))?;
    Ok(())
}

fn write_section<W: Write>(
    writer: &mut W,
    name: &str,
    titles: &[&str],
    rows: impl IntoIterator<Item = Vec<String>>,
) -> MetricResult<()> {
    writeln!(writer, "{SECTION_START},{name},{}", titles.len())?;
    let titles: Vec<String> = titles.iter().map(ToString::to_string).collect();
    write_record(writer, &titles)?;
    for row in rows {
        write_record(writer, &row)?;
    }
    writeln!(writer, "{SECTION_END},{name}")?;
    Ok(())
}

/// Write a table as sectioned CSV.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_csv<W: Write>(table: &MetricTable, writer: &mut W) -> MetricResult<()> {
    let columns = table.columns();
    let width = columns.len().max(3);
    writeln!(writer, "{FILE_TAG},0{}", ",".repeat(width - 2))?;

    write_section(
        writer,
        HEADER,
        &["tag", "value"],
        [
            vec!["version".to_string(), "2".to_string()],
            vec!["number-of-nodes".to_string(), table.node_count().to_string()],
            vec!["title".to_string(), table.title().to_string()],
            vec!["comment".to_string(), table.file_comment().to_string()],
        ],
    )?;

    let text_section = |name: &str, title: &str, get: fn(&Column) -> &str| {
        (
            name.to_string(),
            vec!["Column".to_string(), title.to_string()],
            columns
                .iter()
                .enumerate()
                .map(|(j, c)| vec![j.to_string(), get(c).to_string()])
                .collect::<Vec<_>>(),
        )
    };
    let pair_section = |name: &str, a: &str, b: &str, get: fn(&Column) -> (f32, f32)| {
        (
            name.to_string(),
            vec!["Column".to_string(), a.to_string(), b.to_string()],
            columns
                .iter()
                .enumerate()
                .map(|(j, c)| {
                    let (x, y) = get(c);
                    vec![j.to_string(), x.to_string(), y.to_string()]
                })
                .collect::<Vec<_>>(),
        )
    };

    let sections = [
        text_section(COMMENT, "Comment", |c| &c.comment),
        text_section(STUDY_METADATA, "Study Metadata", |c| &c.study_metadata),
        pair_section(COLOR_MAPPING, "Minimum", "Maximum", |c| c.color_mapping),
        pair_section(THRESHOLD, "Negative", "Positive", |c| c.threshold),
        pair_section(AVERAGE_THRESHOLD, "Negative", "Positive", |c| {
            c.average_threshold
        }),
    ];
    for (name, titles, rows) in sections {
        let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
        write_section(writer, &name, &titles, rows)?;
    }

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let rows = (0..table.node_count())
        .map(|node| {
            columns
                .iter()
                .map(|c| c.values()[node].to_string())
                .collect::<Vec<String>>()
        });
    write_section(writer, DATA, &names, rows)?;
    writer.flush()?;
    Ok(())
}

/// Split CSV text into records, honoring quoted fields.
fn parse_records(text: &str) -> MetricResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(MetricError::invalid_content("unterminated quoted field"));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// One named section: title record plus data records.
struct Section {
    name: String,
    rows: Vec<Vec<String>>,
}

fn split_sections(records: Vec<Vec<String>>) -> MetricResult<Vec<Section>> {
    let mut records = records.into_iter();
    match records.next() {
        Some(first) if first.first().map(String::as_str) == Some(FILE_TAG) => {}
        _ => {
            return Err(MetricError::invalid_content(format!(
                "missing {FILE_TAG} marker"
            )));
        }
    }

    let mut sections = Vec::new();
    let mut current: Option<Section> = None;
    for record in records {
        let tag = record.first().cloned().unwrap_or_default();
        match tag.as_str() {
            SECTION_START if current.is_none() => {
                current = Some(Section {
                    name: record.get(1).cloned().unwrap_or_default(),
                    rows: Vec::new(),
                });
            }
            SECTION_END if current.is_some() => sections.extend(current.take()),
            SECTION_START | SECTION_END => {
                return Err(MetricError::invalid_content(format!(
                    "unbalanced section marker \"{}\"",
                    record.join(",")
                )));
            }
            _ => match current.as_mut() {
                Some(section) => section.rows.push(record),
                None if record.iter().all(String::is_empty) => {}
                None => {
                    return Err(MetricError::invalid_content(format!(
                        "record outside any section: \"{}\"",
                        record.join(",")
                    )));
                }
            },
        }
    }
    if let Some(open) = current {
        return Err(MetricError::invalid_content(format!(
            "section \"{}\" is not closed",
            open.name
        )));
    }
    Ok(sections)
}

fn field<'a>(row: &'a [String], index: usize, section: &str) -> MetricResult<&'a str> {
    row.get(index).map(String::as_str).ok_or_else(|| {
        MetricError::invalid_content(format!(
            "short record in section {section}: \"{}\"",
            row.join(",")
        ))
    })
}

/// Read a table from sectioned CSV.
///
/// # Errors
///
/// - [`MetricError::InvalidContent`] for a missing marker or `Data`
///   section, unbalanced sections or short records
/// - Parse errors for malformed numbers
pub fn read_csv<R: Read>(reader: &mut R) -> MetricResult<MetricTable> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let sections = split_sections(parse_records(&text)?)?;

    let data = sections
        .iter()
        .find(|s| s.name == DATA)
        .ok_or_else(|| MetricError::invalid_content("missing Data section"))?;
    let (titles, rows) = data
        .rows
        .split_first()
        .ok_or_else(|| MetricError::invalid_content("Data section has no title record"))?;
    // A table without columns still writes one empty title and one empty
    // record per node.
    let k = if titles.iter().all(String::is_empty)
        && rows.iter().all(|r| r.iter().all(String::is_empty))
    {
        0
    } else {
        titles.len()
    };

    let declared_nodes = sections
        .iter()
        .filter(|s| s.name == HEADER)
        .flat_map(|s| s.rows.iter().skip(1))
        .find(|r| r.first().map(String::as_str) == Some("number-of-nodes"))
        .map(|r| -> MetricResult<usize> { Ok(field(r, 1, HEADER)?.trim().parse()?) })
        .transpose()?;
    let node_count = declared_nodes.unwrap_or(rows.len());
    if rows.len() < node_count {
        return Err(MetricError::UnexpectedEof {
            rows: rows.len(),
            expected: node_count,
        });
    }

    let mut columns: Vec<Column> = (0..k)
        .map(|j| Column::new(titles.get(j).cloned().unwrap_or_default(), node_count))
        .collect();
    if k > 0 {
        for (node, row) in rows.iter().take(node_count).enumerate() {
            for (j, column) in columns.iter_mut().enumerate() {
                column.values_mut()[node] = field(row, j, DATA)?.trim().parse()?;
            }
        }
    }

    let mut table = MetricTable::new(node_count);
    for section in &sections {
        let body = section.rows.iter().skip(1);
        match section.name.as_str() {
            DATA => {}
            HEADER => {
                for row in body {
                    let value = field(row, 1, HEADER)?;
                    match field(row, 0, HEADER)? {
                        "title" => {
                            table.set_title(value);
                        }
                        "comment" => {
                            table.set_file_comment(value);
                        }
                        _ => {}
                    }
                }
            }
            COMMENT | STUDY_METADATA => {
                for row in body {
                    let column = column_for(&mut columns, row, &section.name)?;
                    let value = field(row, 1, &section.name)?.to_string();
                    if section.name == COMMENT {
                        column.comment = value;
                    } else {
                        column.study_metadata = value;
                    }
                }
            }
            COLOR_MAPPING | THRESHOLD | AVERAGE_THRESHOLD => {
                for row in body {
                    let a: f32 = field(row, 1, &section.name)?.trim().parse()?;
                    let b: f32 = field(row, 2, &section.name)?.trim().parse()?;
                    let column = column_for(&mut columns, row, &section.name)?;
                    match section.name.as_str() {
                        COLOR_MAPPING => column.color_mapping = (a, b),
                        THRESHOLD => column.threshold = (a, b),
                        _ => column.average_threshold = (a, b),
                    }
                }
            }
            other => warn!(section = other, "Unknown CSV section"),
        }
    }

    debug!(nodes = node_count, columns = k, "Read CSV table");
    for column in columns {
        table.add_column(column)?;
    }
    table.clear_modified();
    Ok(table)
}

fn column_for<'a>(
    columns: &'a mut [Column],
    row: &[String],
    section: &str,
) -> MetricResult<&'a mut Column> {
    let index: usize = field(row, 0, section)?.trim().parse()?;
    let count = columns.len();
    columns.get_mut(index).ok_or_else(|| {
        MetricError::invalid_content(format!(
            "section {section} names column {index} of {count}"
        ))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> MetricTable {
        let mut a = Column::from_values("left, lateral", vec![1.25, -3.0])
            .with_comment("first \"quoted\" line\nsecond line")
            .with_color_mapping(-1.5, 2.5);
        a.threshold = (-0.25, 0.75);
        let mut b = Column::from_values("right", vec![0.0, 1.0e-7]);
        b.study_metadata = "PMID:1".into();
        b.average_threshold = (-2.0, 2.0);
        let mut t = MetricTable::from_columns(2, vec![a, b]).unwrap();
        t.set_title("csv demo");
        t.set_file_comment("exported, with commas");
        t
    }

    #[test]
    fn csv_round_trip() {
        let table = sample();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let back = read_csv(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, table);
        assert!(!back.is_modified());
    }

    #[test]
    fn layout_starts_with_marker_and_sections() {
        let mut buf = Vec::new();
        write_csv(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("CSVF-FILE,0,"));
        assert_eq!(lines.next(), Some("csvf-section-start,header,2"));
        assert!(text.contains("csvf-section-start,Data,2\n\"left, lateral\",right\n"));
        assert!(text.trim_end().ends_with("csvf-section-end,Data"));
    }

    #[test]
    fn empty_table_keeps_node_count() {
        let table = MetricTable::new(4);
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();
        let back = read_csv(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back.node_count(), 4);
        assert_eq!(back.column_count(), 0);
    }

    #[test]
    fn data_section_is_required() {
        let text = "CSVF-FILE,0\ncsvf-section-start,header,2\ntag,value\ncsvf-section-end,header\n";
        assert!(matches!(
            read_csv(&mut Cursor::new(text)),
            Err(MetricError::InvalidContent { .. })
        ));
    }

    #[test]
    fn minimal_data_only_file() {
        let text = "CSVF-FILE,0\ncsvf-section-start,Data,2\na,b\n1,2\n3,4\ncsvf-section-end,Data\n";
        let t = read_csv(&mut Cursor::new(text)).unwrap();
        assert_eq!(t.node_count(), 2);
        assert_eq!(t.column(1).unwrap().name, "b");
        assert_eq!(t.row(1).unwrap(), vec![3.0, 4.0]);
    }

    #[test]
    fn malformed_files_are_rejected() {
        for text in [
            "not,a,csvf\n",
            "CSVF-FILE,0\ncsvf-section-start,Data,1\na\n1\n",
            "CSVF-FILE,0\ncsvf-section-start,Data,1\na\n\"open\n",
            "CSVF-FILE,0\ncsvf-section-start,Data,2\na,b\n1\ncsvf-section-end,Data\n",
        ] {
            assert!(read_csv(&mut Cursor::new(text)).is_err(), "{text}");
        }
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("a,b"), "\"a,b\"");
        assert_eq!(quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        let records = parse_records("\"a,b\",\"x\"\"y\"\nc,\"multi\nline\"\n").unwrap();
        assert_eq!(records, vec![vec!["a,b", "x\"y"], vec!["c", "multi\nline"]]);
    }
}

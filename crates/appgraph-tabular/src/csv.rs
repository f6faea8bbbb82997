//! CSV encoding and decoding (RFC 4180).
//!
//! Writing: a cell containing `,`, `"`, CR or LF is wrapped in double quotes
//! with internal `"` doubled. Records end with CRLF.
//!
//! Reading accepts CRLF or bare LF terminators, quoted fields spanning lines,
//! and a leading UTF-8 BOM.

use crate::{Row, Table, TabularError, HEADER};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const RECORD_TERMINATOR: &[u8] = b"\r\n";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Write `rows` to `path`, replacing any existing file.
pub fn write_rows(path: &Path, rows: &[Row]) -> Result<(), TabularError> {
    let storage = |source| TabularError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(storage)?;
    let mut out = BufWriter::new(file);
    write_rows_to(&mut out, rows).map_err(storage)?;
    out.flush().map_err(storage)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Write the header and `rows` to an arbitrary sink.
pub fn write_rows_to<W: Write>(out: &mut W, rows: &[Row]) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity((rows.len() + 1) * 80);

    write_record(&mut buf, HEADER);
    for row in rows {
        write_record(&mut buf, row.fields());
    }

    out.write_all(&buf)
}

fn write_record(out: &mut Vec<u8>, fields: [&str; 6]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        flush_cell(out, field.as_bytes());
    }
    out.extend_from_slice(RECORD_TERMINATOR);
}

fn flush_cell(out: &mut Vec<u8>, cell: &[u8]) {
    let needs_quoting = cell
        .iter()
        .any(|&b| b == b',' || b == b'"' || b == b'\n' || b == b'\r');

    if !needs_quoting {
        out.extend_from_slice(cell);
        return;
    }

    out.push(b'"');
    for &b in cell {
        if b == b'"' {
            out.push(b'"');
        }
        out.push(b);
    }
    out.push(b'"');
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Read a table previously written by [`write_rows`].
pub fn read_table(path: &Path) -> Result<Table, TabularError> {
    let text = std::fs::read_to_string(path).map_err(|source| TabularError::Storage {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table_str(&text)?;

    tracing::info!(path = %path.display(), rows = table.len(), "read table");
    Ok(table)
}

/// Parse CSV text into a [`Table`], checking the header against [`HEADER`].
pub fn read_table_str(text: &str) -> Result<Table, TabularError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = parse_records(text)?.into_iter();

    let header = records.next().unwrap_or_default();
    if header.len() != HEADER.len() || header.iter().zip(HEADER).any(|(h, e)| h != e) {
        return Err(TabularError::SchemaMismatch {
            expected: HEADER.iter().map(|s| s.to_string()).collect(),
            found: header,
        });
    }

    let mut rows = Vec::new();
    for (i, fields) in records.enumerate() {
        let found = fields.len();
        let row = Row::from_fields(fields).ok_or_else(|| TabularError::Malformed {
            record: i + 1,
            reason: format!("expected {} fields, found {found}", HEADER.len()),
        })?;
        rows.push(row);
    }

    Ok(Table::new(header, rows))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a field.
    FieldStart,
    /// Inside an unquoted field.
    Unquoted,
    /// Inside a quoted field.
    Quoted,
    /// Just saw a `"` inside a quoted field (either an escape or the close).
    QuoteInQuoted,
}

/// Split CSV text into records of fields. A trailing terminator (CRLF, LF,
/// or a lone CR at end of input) does not produce an empty record.
fn parse_records(text: &str) -> Result<Vec<Vec<String>>, TabularError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut state = State::FieldStart;
    let mut chars = text.chars().peekable();

    let end_record = |records: &mut Vec<Vec<String>>, record: &mut Vec<String>| {
        records.push(std::mem::take(record));
    };

    while let Some(c) = chars.next() {
        match state {
            State::FieldStart | State::Unquoted => match c {
                '"' if state == State::FieldStart => state = State::Quoted,
                ',' => {
                    record.push(std::mem::take(&mut field));
                    state = State::FieldStart;
                }
                '\r' if matches!(chars.peek(), Some('\n') | None) => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    end_record(&mut records, &mut record);
                    state = State::FieldStart;
                }
                _ => {
                    field.push(c);
                    state = State::Unquoted;
                }
            },
            State::Quoted => match c {
                '"' => state = State::QuoteInQuoted,
                _ => field.push(c),
            },
            State::QuoteInQuoted => match c {
                '"' => {
                    field.push('"');
                    state = State::Quoted;
                }
                ',' => {
                    record.push(std::mem::take(&mut field));
                    state = State::FieldStart;
                }
                '\r' if matches!(chars.peek(), Some('\n') | None) => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    end_record(&mut records, &mut record);
                    state = State::FieldStart;
                }
                other => {
                    return Err(TabularError::Malformed {
                        record: records.len(),
                        reason: format!("unexpected {other:?} after closing quote"),
                    });
                }
            },
        }
    }

    match state {
        State::Quoted => {
            return Err(TabularError::Malformed {
                record: records.len(),
                reason: "unterminated quoted field".to_string(),
            });
        }
        State::FieldStart if record.is_empty() => {}
        _ => {
            record.push(field);
            end_record(&mut records, &mut record);
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Row {
        Row::new("AppA", "DevX", "Linux", "C++", "MIT", "Copyrighted")
    }

    fn encode(rows: &[Row]) -> String {
        let mut out = Vec::new();
        write_rows_to(&mut out, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_header_and_one_record() {
        let text = encode(&[sample()]);
        assert_eq!(
            text,
            "App,Developer,OperatingSystem,Language,License,CopyrightStatus\r\n\
             AppA,DevX,Linux,C++,MIT,Copyrighted\r\n"
        );
    }

    #[test]
    fn quotes_commas_quotes_and_newlines() {
        let row = Row::new(
            "Foo, Inc. App",
            "The \"Dev\"",
            "Linux\nBSD",
            "C",
            "MIT",
            "Copyrighted",
        );
        let text = encode(&[row]);
        assert!(text.contains("\"Foo, Inc. App\""));
        assert!(text.contains("\"The \"\"Dev\"\"\""));
        assert!(text.contains("\"Linux\nBSD\""));
    }

    #[test]
    fn reads_back_what_was_written() {
        let rows = vec![
            sample(),
            Row::new("Q, R", "\"x\"", "a\r\nb", "", "GPL-3.0", "copyrighted"),
        ];
        let table = read_table_str(&encode(&rows)).unwrap();
        assert_eq!(table.columns(), HEADER.map(String::from).as_slice());
        assert_eq!(table.rows(), rows.as_slice());
    }

    #[test]
    fn accepts_lf_terminators_and_bom() {
        let text = "\u{feff}App,Developer,OperatingSystem,Language,License,CopyrightStatus\n\
                    AppA,DevX,Linux,C++,MIT,Copyrighted";
        let table = read_table_str(text).unwrap();
        assert_eq!(table.rows(), &[sample()]);
    }

    #[test]
    fn lone_cr_at_end_of_input_terminates_the_record() {
        let header = HEADER.join(",");
        let text = format!("{header}\r\nAppA,DevX,Linux,C++,MIT,Copyrighted\r");
        assert_eq!(read_table_str(&text).unwrap().rows(), &[sample()]);

        let text = format!("{header}\r\nAppA,DevX,Linux,C++,MIT,\"Copyrighted\"\r");
        assert_eq!(read_table_str(&text).unwrap().rows(), &[sample()]);

        // Inside quotes a CR is data.
        let text = format!("{header}\r\nAppA,DevX,Linux,C++,MIT,\"Copy\rrighted\"\r\n");
        assert_eq!(read_table_str(&text).unwrap().rows()[0].copyright_status, "Copy\rrighted");
    }

    #[test]
    fn header_only_file_is_an_empty_table() {
        let table = read_table_str(&encode(&[])).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn wrong_header_is_a_schema_mismatch() {
        let text = "App,Developer,OS,Language,License,CopyrightStatus\r\n";
        let err = read_table_str(text).unwrap_err();
        assert!(matches!(err, TabularError::SchemaMismatch { .. }));

        let err = read_table_str("").unwrap_err();
        assert!(matches!(err, TabularError::SchemaMismatch { found, .. } if found.is_empty()));
    }

    #[test]
    fn short_record_is_malformed() {
        let text = format!("{}\r\nAppA,DevX\r\n", HEADER.join(","));
        let err = read_table_str(&text).unwrap_err();
        assert!(matches!(err, TabularError::Malformed { record: 1, .. }));
    }

    #[test]
    fn unterminated_quote_is_malformed() {
        let text = format!("{}\r\n\"AppA,DevX\r\n", HEADER.join(","));
        let err = read_table_str(&text).unwrap_err();
        assert!(matches!(err, TabularError::Malformed { .. }));
    }

    #[test]
    fn file_round_trip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Apps.csv");
        write_rows(&path, &[sample()]).unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.into_rows(), vec![sample()]);

        let err = read_table(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, TabularError::Storage { .. }));
    }

    fn field_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ,\"\r\n+#.-]{0,12}"
    }

    fn row_strategy() -> impl Strategy<Value = Row> {
        (
            field_strategy(),
            field_strategy(),
            field_strategy(),
            field_strategy(),
            field_strategy(),
            field_strategy(),
        )
            .prop_map(|(a, d, o, l, li, c)| Row::new(a, d, o, l, li, c))
    }

    proptest! {
        #[test]
        fn round_trip_preserves_rows(rows in prop::collection::vec(row_strategy(), 0..8)) {
            let table = read_table_str(&encode(&rows)).unwrap();
            prop_assert_eq!(table.into_rows(), rows);
        }
    }
}

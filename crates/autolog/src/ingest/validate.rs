//! Validate — format pre-check on the head of a file.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, error};

use super::IngestError;
use crate::parser::LineRecordParser;

/// Parse the first `sample_lines` non-empty lines; the first failure
/// rejects the source. An empty source is accepted.
///
/// Reads are capped one byte past the parser's line limit, so an
/// oversized or newline-free head is rejected without buffering it.
pub fn validate_reader<R: BufRead>(
    mut reader: R,
    sample_lines: usize,
    parser: &LineRecordParser,
) -> Result<(), IngestError> {
    let cap = parser.max_line_bytes() as u64 + 1;
    let mut buf = Vec::new();
    let mut line_no = 0;
    let mut checked = 0;

    while checked < sample_lines {
        buf.clear();
        if reader.by_ref().take(cap).read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        checked += 1;

        if let Err(e) = parser.parse(&line) {
            error!("File validation failed at line {}: {}", line_no, e);
            return Err(IngestError::InvalidFormat {
                line: line_no,
                reason: e.to_string(),
            });
        }
    }

    debug!(checked, "file format validated");
    Ok(())
}

pub fn validate_file(
    path: &Path,
    sample_lines: usize,
    parser: &LineRecordParser,
) -> Result<(), IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    validate_reader(BufReader::new(file), sample_lines, parser).map_err(|e| e.with_path(path))
}

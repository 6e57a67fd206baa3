use crate::error::{ParseError, ProcessingError, Result};
use crate::models::ObservationRecord;
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, FIELD_CLOUD_COVER, FIELD_COUNT, FIELD_HUMIDITY, FIELD_LIGHTNING,
    FIELD_REGION_CODE, FIELD_SEPARATOR, FIELD_SNOW, FIELD_TEMPERATURE, FIELD_TIMESTAMP,
};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse one tab-delimited observation line.
///
/// Expected layout:
/// `region, timestamp_ms, geohash, humidity, snow, cloud_cover, lightning, pressure_pa, temperature_k`
///
/// Geohash and pressure are skipped without conversion. A trailing `\n` or
/// `\r\n` is ignored; numeric fields may carry surrounding whitespace but the
/// region code is taken verbatim.
pub fn parse_observation_line(line: &str) -> std::result::Result<ObservationRecord, ParseError> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = [""; FIELD_COUNT];
    let mut found = 0;
    for field in line.split(FIELD_SEPARATOR) {
        if found < FIELD_COUNT {
            fields[found] = field;
        }
        found += 1;
    }

    if found != FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: FIELD_COUNT,
            found,
        });
    }

    let region_code = fields[FIELD_REGION_CODE];
    if region_code.is_empty() {
        return Err(ParseError::EmptyRegionCode);
    }

    Ok(ObservationRecord {
        region_code: region_code.to_string(),
        timestamp: parse_timestamp(fields[FIELD_TIMESTAMP])?,
        humidity: parse_number("humidity", fields[FIELD_HUMIDITY])?,
        snow: parse_flag("snow flag", fields[FIELD_SNOW])?,
        cloud_cover: parse_number("cloud cover", fields[FIELD_CLOUD_COVER])?,
        lightning: parse_flag("lightning flag", fields[FIELD_LIGHTNING])?,
        temperature: parse_number("temperature", fields[FIELD_TEMPERATURE])?,
    })
}

fn parse_timestamp(raw: &str) -> std::result::Result<i64, ParseError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidNumber {
            field: "timestamp",
            value: raw.to_string(),
        })
}

fn parse_number(field: &'static str, raw: &str) -> std::result::Result<f64, ParseError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

/// Flags arrive as `0`/`1` or `0.0`/`1.0`. Only a value of exactly one counts
/// as set; any other number is accepted but not counted.
fn parse_flag(field: &'static str, raw: &str) -> std::result::Result<bool, ParseError> {
    Ok(parse_number(field, raw)? == 1.0)
}

/// Opens observation files and streams their lines through the parser.
pub struct ObservationReader {
    use_mmap: bool,
    buffer_size: usize,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            use_mmap: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            use_mmap,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Stream observation records from a file without buffering the file's records.
    ///
    /// Opening failures map to [`ProcessingError::FileUnavailable`]. The iterator
    /// yields [`ProcessingError::MalformedLine`] for lines the parser rejects;
    /// callers are expected to skip those and keep going.
    pub fn stream_observations(&self, path: &Path) -> Result<ObservationIterator> {
        let unavailable = |source| ProcessingError::FileUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();

        let source = if self.use_mmap && len > 0 {
            // The mapping is read-only and dropped with the iterator
            let mmap = unsafe { Mmap::map(&file) }.map_err(unavailable)?;
            LineSource::Mapped { mmap, offset: 0 }
        } else {
            LineSource::Buffered(BufReader::with_capacity(self.buffer_size, file))
        };

        Ok(ObservationIterator {
            source,
            line: Vec::new(),
            line_count: 0,
            blank_lines: 0,
        })
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

enum LineSource {
    Buffered(BufReader<File>),
    Mapped { mmap: Mmap, offset: usize },
}

impl LineSource {
    /// Copy the next whole line (newline included) into `line`; `Ok(false)` at EOF.
    fn next_line(&mut self, line: &mut Vec<u8>) -> std::io::Result<bool> {
        line.clear();
        match self {
            LineSource::Buffered(reader) => Ok(reader.read_until(b'\n', line)? > 0),
            LineSource::Mapped { mmap, offset } => {
                let rest = &mmap[*offset..];
                if rest.is_empty() {
                    return Ok(false);
                }
                let end = rest
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(rest.len(), |pos| pos + 1);
                line.extend_from_slice(&rest[..end]);
                *offset += end;
                Ok(true)
            }
        }
    }
}

/// Iterator over the records of one observation file.
///
/// Blank lines are skipped and counted. Invalid UTF-8 is decoded lossily, so a
/// stray byte becomes U+FFFD in its own line and the line is parsed as usual.
pub struct ObservationIterator {
    source: LineSource,
    line: Vec<u8>,
    line_count: usize,
    blank_lines: usize,
}

impl ObservationIterator {
    /// Lines consumed so far, blank lines included
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }
}

impl Iterator for ObservationIterator {
    type Item = Result<ObservationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.source.next_line(&mut self.line) {
                Ok(false) => return None, // EOF
                Ok(true) => {
                    self.line_count += 1;

                    let text = String::from_utf8_lossy(&self.line);
                    if text.trim().is_empty() {
                        self.blank_lines += 1;
                        continue;
                    }

                    return Some(parse_observation_line(&text).map_err(|source| {
                        ProcessingError::MalformedLine {
                            line_number: self.line_count,
                            source,
                        }
                    }));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

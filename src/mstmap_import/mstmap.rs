use std::io::BufRead;

use flexstr::ToSharedStr;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::{LinkageGroupName, MarkerName};

// MSTmap output is line oriented: a "group <name>" header opens a linkage
// group, then one "<marker> <position>" line per marker until the next
// header or end of input. Lines starting with ';' are comments, which
// covers the ;BEGINOFGROUP/;ENDOFGROUP markers MSTmap emits.
static GROUP_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^group\s+(\S+)$").unwrap());

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkerPosition {
    pub marker: MarkerName,
    pub position: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinkageGroup {
    pub name: LinkageGroupName,
    pub positions: Vec<MarkerPosition>,
}

#[derive(Error, Debug)]
pub enum MstParseError {
    #[error("line {line_number}: expected \"<marker> <position>\", got {line:?}")]
    UnexpectedLine { line_number: u64, line: String },
    #[error("line {line_number}: marker line {line:?} appears before any group header")]
    MarkerOutsideGroup { line_number: u64, line: String },
    #[error("line {line_number}: {token:?} is not a valid map position")]
    InvalidPosition { line_number: u64, token: String },
    #[error("line {line_number}: negative map position {position}")]
    NegativePosition { line_number: u64, position: f64 },
    #[error("line {line_number}: position {position} of marker {marker:?} is below the previous position {previous}")]
    PositionOrder { line_number: u64, marker: String, position: f64, previous: f64 },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

// Lazy reader over MSTmap text. Yields each linkage group as soon as its
// last marker line has been read. After an error it yields nothing more.
pub struct MstMapReader<R: BufRead> {
    reader: R,
    line_number: u64,
    pending_group: Option<LinkageGroupName>,
    finished: bool,
}

impl<R: BufRead> MstMapReader<R> {
    pub fn new(reader: R) -> MstMapReader<R> {
        MstMapReader {
            reader,
            line_number: 0,
            pending_group: None,
            finished: false,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(line))
    }

    fn fail(&mut self, err: MstParseError) -> Option<Result<LinkageGroup, MstParseError>> {
        self.finished = true;
        Some(Err(err))
    }
}

impl<R: BufRead> Iterator for MstMapReader<R> {
    type Item = Result<LinkageGroup, MstParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut current = self.pending_group.take()
            .map(|name| LinkageGroup { name, positions: vec![] });

        loop {
            let line = match self.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.finished = true;
                    return current.map(Ok);
                }
                Err(err) => return self.fail(MstParseError::Io(err)),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if let Some(captures) = GROUP_HEADER_RE.captures(trimmed) {
                let name = captures[1].to_shared_str();
                match current {
                    Some(group) => {
                        self.pending_group = Some(name);
                        return Some(Ok(group));
                    }
                    None => {
                        current = Some(LinkageGroup { name, positions: vec![] });
                        continue;
                    }
                }
            }

            let line_number = self.line_number;

            let group = match current.as_mut() {
                Some(group) => group,
                None => {
                    return self.fail(MstParseError::MarkerOutsideGroup {
                        line_number,
                        line: trimmed.to_owned(),
                    });
                }
            };

            let mut tokens = trimmed.split_whitespace();
            let (marker, position_token) =
                match (tokens.next(), tokens.next(), tokens.next()) {
                    (Some(marker), Some(position), None) => (marker, position),
                    _ => {
                        return self.fail(MstParseError::UnexpectedLine {
                            line_number,
                            line: trimmed.to_owned(),
                        });
                    }
                };

            let position: f64 = match position_token.parse() {
                Ok(position) => position,
                Err(_) => {
                    return self.fail(MstParseError::InvalidPosition {
                        line_number,
                        token: position_token.to_owned(),
                    });
                }
            };
            if !position.is_finite() {
                return self.fail(MstParseError::InvalidPosition {
                    line_number,
                    token: position_token.to_owned(),
                });
            }
            if position < 0.0 {
                return self.fail(MstParseError::NegativePosition {
                    line_number,
                    position,
                });
            }
            if let Some(last) = group.positions.last() {
                if position < last.position {
                    return self.fail(MstParseError::PositionOrder {
                        line_number,
                        marker: marker.to_owned(),
                        position,
                        previous: last.position,
                    });
                }
            }

            group.positions.push(MarkerPosition {
                marker: marker.to_shared_str(),
                position,
            });
        }
    }
}

pub fn parse_linkage_groups(reader: impl BufRead) -> Result<Vec<LinkageGroup>, MstParseError> {
    MstMapReader::new(reader).collect()
}

#[cfg(test)]
fn parse_str(text: &str) -> Result<Vec<LinkageGroup>, MstParseError> {
    parse_linkage_groups(std::io::Cursor::new(text))
}

#[test]
fn test_parse_single_group() {
    let groups = parse_str("group lg0\nm1 0.0\nm2 3.5\n").unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "lg0");
    assert_eq!(groups[0].positions.len(), 2);
    assert_eq!(groups[0].positions[0].marker, "m1");
    assert_eq!(groups[0].positions[1].position, 3.5);
}

#[test]
fn test_parse_comments_and_blanks() {
    let text = "; MSTmap output\n\ngroup lg0\n;BEGINOFGROUP\nm1\t0.0\n\nm2\t1.5\n;ENDOFGROUP\n";
    let groups = parse_str(text).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].positions.len(), 2);
}

#[test]
fn test_parse_two_groups() {
    let text = "group lg0\nm1 0.0\ngroup lg1\nm2 0.0\nm3 2.25\n";
    let groups = parse_str(text).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "lg0");
    assert_eq!(groups[1].name, "lg1");
    assert_eq!(groups[1].positions.len(), 2);
}

#[test]
fn test_parse_empty_input_gives_no_groups() {
    assert_eq!(parse_str("").unwrap().len(), 0);
    assert_eq!(parse_str("; just a comment\n\n").unwrap().len(), 0);
}

#[test]
fn test_parse_group_with_no_markers() {
    let groups = parse_str("group lg0\n;ENDOFGROUP\n").unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].positions.is_empty());
}

#[test]
fn test_marker_before_group_header() {
    let err = parse_str("m1 0.0\n").unwrap_err();
    assert!(matches!(err,
                     MstParseError::MarkerOutsideGroup { line_number: 1, .. }),
            "unexpected error: {}", err);
}

#[test]
fn test_non_numeric_position() {
    let err = parse_str("group lg0\nm1 zero\n").unwrap_err();
    assert!(matches!(err,
                     MstParseError::InvalidPosition { line_number: 2, .. }),
            "unexpected error: {}", err);
}

#[test]
fn test_negative_position() {
    let err = parse_str("group lg0\nm1 -1.0\n").unwrap_err();
    assert!(matches!(err,
                     MstParseError::NegativePosition { line_number: 2, .. }),
            "unexpected error: {}", err);
}

#[test]
fn test_position_going_backwards() {
    let err = parse_str("group lg0\nm1 5.0\nm2 2.0\n").unwrap_err();
    assert!(matches!(err,
                     MstParseError::PositionOrder { line_number: 3, .. }),
            "unexpected error: {}", err);
}

#[test]
fn test_extra_tokens_on_marker_line() {
    let err = parse_str("group lg0\nm1 0.0 extra\n").unwrap_err();
    assert!(matches!(err, MstParseError::UnexpectedLine { line_number: 2, .. }),
            "unexpected error: {}", err);
}

#[test]
fn test_reader_stops_after_error() {
    let mut reader = MstMapReader::new(std::io::Cursor::new("group lg0\nm1 bad\ngroup lg1\nm2 0.0\n"));
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

#[test]
fn test_reader_is_lazy() {
    let mut reader = MstMapReader::new(std::io::Cursor::new("group lg0\nm1 0.0\ngroup lg1\nm2 bad\n"));
    let first = reader.next().unwrap().unwrap();
    assert_eq!(first.name, "lg0");
    assert!(reader.next().unwrap().is_err());
}

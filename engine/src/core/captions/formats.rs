//! Caption Format Parser and Exporter
//!
//! Converts between cue lists and the SRT (SubRip) interchange format.
//!
//! Parsing is tolerant of structurally incomplete blocks (they are skipped)
//! but strict about timestamps: a single unreadable timecode rejects the
//! whole document, since it casts doubt on every offset that follows.
//!
//! # Example
//!
//! ```rust,ignore
//! use cueline_lib::core::captions::{parse_srt, export_srt};
//!
//! let cues = parse_srt(&content)?;
//! let srt = export_srt(&cues);
//! ```

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::Cue;
use crate::core::TimeSec;

/// Inline override tags such as `{\an8}`, `{\i1}` or `{\pos(10,20)}`
const FORMATTING_TAG_PATTERN: &str = r"\{\\[a-zA-Z]+\d*(?:\([^}]+\))?\}";

/// Separator between start and end timecodes
const TIMECODE_SEPARATOR: &str = " --> ";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during caption parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A timecode component could not be read as an integer
    InvalidTimestamp(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp(s) => write!(f, "Invalid timestamp: {}", s),
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// Formatting Tags
// =============================================================================

fn formatting_tag_regex() -> Option<&'static Regex> {
    static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    TAG_REGEX
        .get_or_init(|| match Regex::new(FORMATTING_TAG_PATTERN) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Formatting tag pattern failed to compile: {}", e);
                None
            }
        })
        .as_ref()
}

/// Removes inline formatting tags (`{\an8}`, `{\b1}`, `{\pos(1,2)}`).
///
/// Tags are discarded, not interpreted.
pub fn strip_formatting_tags(text: &str) -> String {
    match formatting_tag_regex() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

// =============================================================================
// SRT Parsing
// =============================================================================

/// Parses SRT (SubRip) content into cues, in document order.
///
/// # SRT Format
///
/// ```text
/// 1
/// 0:00:01,000 --> 0:00:02,500
/// First caption text
///
/// 2
/// 0:00:03,000 --> 0:00:04,000
/// Second caption text
/// with multiple lines
/// ```
///
/// Blocks missing the id line, the timecode line or any text line are
/// skipped. Any unreadable timecode component fails the whole document.
pub fn parse_srt(content: &str) -> Result<Vec<Cue>, ParseError> {
    let normalized = strip_formatting_tags(&content.replace('\r', ""));
    let mut cues = Vec::new();

    for (block_index, block) in normalized.split("\n\n").enumerate() {
        // Runs of three or more newlines leave a leading newline behind.
        let block = block.trim_start_matches('\n');

        let mut lines = block.split('\n');
        let id = lines.next().unwrap_or_default();
        let timecodes = lines.next().unwrap_or_default();
        let text_lines: Vec<&str> = lines.collect();

        if id.is_empty() || timecodes.is_empty() || text_lines.is_empty() {
            if !block.trim().is_empty() {
                debug!("Skipping incomplete SRT block {}", block_index);
            }
            continue;
        }

        let Some((start_code, end_code)) = timecodes.split_once(TIMECODE_SEPARATOR) else {
            debug!("Skipping SRT block {} without timecode line", block_index);
            continue;
        };
        if start_code.is_empty() || end_code.is_empty() {
            debug!("Skipping SRT block {} with empty timecode", block_index);
            continue;
        }

        let start_time = parse_srt_time(start_code)?;
        let end_time = parse_srt_time(end_code)?;
        let text = text_lines.join("\n").trim().to_string();

        cues.push(Cue::new(id, start_time, end_time, &text));
    }

    Ok(cues)
}

/// Parses an SRT timecode (`H:MM:SS,mmm`) into seconds.
///
/// A period is accepted in place of the comma so exported files read back.
/// Each component is read as a leading integer; trailing characters (such as
/// position hints after the end timecode) are ignored.
pub fn parse_srt_time(timecode: &str) -> Result<TimeSec, ParseError> {
    let invalid = || ParseError::InvalidTimestamp(timecode.to_string());

    let mut parts = timecode.split(':');
    let hours = parts.next().ok_or_else(invalid)?;
    let minutes = parts.next().ok_or_else(invalid)?;
    let second_part = parts.next().ok_or_else(invalid)?;
    let (seconds, millis) = second_part
        .split_once([',', '.'])
        .ok_or_else(invalid)?;

    let hh = parse_leading_int(hours).ok_or_else(invalid)?;
    let mm = parse_leading_int(minutes).ok_or_else(invalid)?;
    let ss = parse_leading_int(seconds).ok_or_else(invalid)?;
    let ms = parse_leading_int(millis).ok_or_else(invalid)?;

    Ok(hh as f64 * 3600.0 + mm as f64 * 60.0 + ss as f64 + ms as f64 / 1000.0)
}

/// Reads the integer at the start of `s`, after optional whitespace and sign.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

// =============================================================================
// SRT Export
// =============================================================================

/// Exports cues to SRT text, in the order given.
///
/// Blocks are numbered from 1 regardless of cue ids. Timecodes are written
/// with a period before the milliseconds.
pub fn export_srt(cues: &[Cue]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(cues.len() * 4);

    for (index, cue) in cues.iter().enumerate() {
        lines.push((index + 1).to_string());
        lines.push(format!(
            "{}{}{}",
            format_srt_time(cue.start_time),
            TIMECODE_SEPARATOR,
            format_srt_time(cue.end_time)
        ));
        lines.push(cue.text.clone());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Formats seconds as `H:MM:SS.mmm`, truncating below the millisecond.
///
/// Negative or non-finite times are written as zero.
pub fn format_srt_time(time: TimeSec) -> String {
    let time = if time.is_finite() { time.max(0.0) } else { 0.0 };

    let hours = (time / 3600.0).floor() as u64;
    let minutes = ((time % 3600.0) / 60.0).floor() as u64;
    let seconds = (time % 60.0).floor() as u64;
    let millis = ((time % 1.0) * 1000.0).floor() as u64;

    format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CUES: &str =
        "1\n0:00:01,000 --> 0:00:02,500\nHello\n\n2\n0:00:03,000 --> 0:00:04,000\nWorld\n\n";

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_srt_basic() {
        let cues = parse_srt(TWO_CUES).unwrap();
        assert_eq!(cues.len(), 2);

        assert_eq!(cues[0].id, "1");
        assert_eq!(cues[0].start_time, 1.0);
        assert_eq!(cues[0].end_time, 2.5);
        assert_eq!(cues[0].text, "Hello");
        assert!(!cues[0].active);
        assert!(!cues[0].saved);

        assert_eq!(cues[1].id, "2");
        assert_eq!(cues[1].start_time, 3.0);
        assert_eq!(cues[1].end_time, 4.0);
        assert_eq!(cues[1].text, "World");
    }

    #[test]
    fn test_parse_srt_multiline_and_crlf() {
        let srt = "1\r\n00:00:00,000 --> 00:00:05,000\r\nLine one\r\nLine two\r\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Line one\nLine two");
        assert_eq!(cues[0].start_time, 0.0);
    }

    #[test]
    fn test_parse_srt_preserves_source_ids() {
        let srt = "intro\n0:00:01,000 --> 0:00:02,000\nHi\n\n42\n0:00:03,000 --> 0:00:04,000\nBye";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues[0].id, "intro");
        assert_eq!(cues[1].id, "42");
    }

    #[test]
    fn test_parse_srt_strips_formatting_tags() {
        let srt = "1\n0:00:01,000 --> 0:00:02,000\n{\\an8}Top {\\pos(10,20)}line{\\i1}\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues[0].text, "Top line");
    }

    #[test]
    fn test_parse_srt_skips_incomplete_blocks() {
        let srt = "1\n0:00:01,000 --> 0:00:02,000\nKept\n\n\
                   2\n\n\
                   3\n0:00:05,000\nNo separator\n\n\
                   4\n0:00:06,000 --> 0:00:07,000\nAlso kept";
        let cues = parse_srt(srt).unwrap();
        let ids: Vec<&str> = cues.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_parse_srt_tolerates_extra_blank_lines() {
        let srt = "1\n0:00:01,000 --> 0:00:02,000\nA\n\n\n\n2\n0:00:03,000 --> 0:00:04,000\nB\n";
        let cues = parse_srt(srt).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].text, "B");
    }

    #[test]
    fn test_parse_srt_bad_timestamp_fails_whole_document() {
        let srt = "1\n0:00:01,000 --> 0:00:02,000\nGood\n\n\
                   2\nbad:format --> 0:00:01,000\nBad\n";
        let result = parse_srt(srt);
        assert!(matches!(result, Err(ParseError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_parse_srt_missing_millis_fails() {
        let srt = "1\n0:00:01 --> 0:00:02,000\nText\n";
        assert!(parse_srt(srt).is_err());
    }

    #[test]
    fn test_parse_srt_empty_input() {
        assert!(parse_srt("").unwrap().is_empty());
        assert!(parse_srt("\n\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_srt_time() {
        assert_eq!(parse_srt_time("0:00:01,500").unwrap(), 1.5);
        assert_eq!(parse_srt_time("00:01:30,000").unwrap(), 90.0);
        assert_eq!(parse_srt_time("1:30:00,000").unwrap(), 5400.0);
        assert_eq!(parse_srt_time("0:00:00,100").unwrap(), 0.1);
        assert_eq!(parse_srt_time("0:00:02.250").unwrap(), 2.25);
    }

    #[test]
    fn test_parse_srt_time_ignores_trailing_text() {
        assert_eq!(parse_srt_time("0:00:04,000 X1:100 X2:200").unwrap(), 4.0);
    }

    #[test]
    fn test_parse_srt_time_rejects_non_numeric() {
        assert!(parse_srt_time("bad:format").is_err());
        assert!(parse_srt_time("0:xx:01,000").is_err());
        assert!(parse_srt_time("0:00:01,").is_err());
        assert!(parse_srt_time("").is_err());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("01"), Some(1));
        assert_eq!(parse_leading_int(" 7abc"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    // -------------------------------------------------------------------------
    // Export Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "0:00:00.000");
        assert_eq!(format_srt_time(1.5), "0:00:01.500");
        assert_eq!(format_srt_time(90.0), "0:01:30.000");
        assert_eq!(format_srt_time(5400.25), "1:30:00.250");
        assert_eq!(format_srt_time(36000.0), "10:00:00.000");
    }

    #[test]
    fn test_format_srt_time_clamps_negative() {
        assert_eq!(format_srt_time(-2.0), "0:00:00.000");
    }

    #[test]
    fn test_export_srt_numbers_blocks_independently_of_ids() {
        let cues = vec![
            Cue::new("abc", 1.0, 2.5, "Hello"),
            Cue::new("xyz", 3.0, 4.0, "World"),
        ];

        let srt = export_srt(&cues);
        assert_eq!(
            srt,
            "1\n0:00:01.000 --> 0:00:02.500\nHello\n\n2\n0:00:03.000 --> 0:00:04.000\nWorld\n"
        );
    }

    #[test]
    fn test_export_srt_empty() {
        assert_eq!(export_srt(&[]), "");
    }

    // -------------------------------------------------------------------------
    // Roundtrip Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_srt_roundtrip_within_millisecond() {
        let original = vec![
            Cue::new("1", 1.001, 2.5, "First caption"),
            Cue::new("2", 3.0, 4.1234, "Second\nMultiline"),
            Cue::new("3", 3725.75, 3730.0, "Late"),
        ];

        let parsed = parse_srt(&export_srt(&original)).unwrap();

        assert_eq!(parsed.len(), original.len());
        for (p, o) in parsed.iter().zip(&original) {
            assert_eq!(p.id, o.id);
            assert_eq!(p.text, o.text);
            assert!((p.start_time - o.start_time).abs() <= 0.001);
            assert!((p.end_time - o.end_time).abs() <= 0.001);
        }
    }
}

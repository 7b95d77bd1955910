//! SubRip (`.srt`) reader and writer.
//!
//! A block is an index line, a `start --> end` line and one or more text
//! lines, terminated by a blank line or end of input. Multi-line text is
//! joined with `\n`.

use std::io::{self, BufRead, Write};

use cueline_core::{RationalTime, Result};
use tracing::{debug, warn};

use crate::timestamp::{format_srt, parse_timestamp};
use crate::SubtitleEvent;

/// Where the reader is inside the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockState {
    /// Expecting the sequence number.
    Index,
    /// Sequence number seen, expecting the time range.
    Timing,
    /// Collecting text lines.
    Text,
}

#[derive(Debug, Default)]
struct PendingBlock {
    times: Option<(RationalTime, RationalTime)>,
    lines: Vec<String>,
}

impl PendingBlock {
    fn flush(&mut self, events: &mut Vec<SubtitleEvent>) {
        let block = std::mem::take(self);
        match block.times {
            Some((start, end)) => events.push(SubtitleEvent::new(start, end, block.lines.join("\n"))),
            None if !block.lines.is_empty() => {
                warn!(lines = block.lines.len(), "Dropping SRT block without a valid time line");
            }
            None => {}
        }
    }
}

/// Parse a time line such as `00:00:01,000 --> 00:00:02,500`.
///
/// Trailing position hints after the end time are ignored.
fn parse_time_line(line: &str) -> Option<(RationalTime, RationalTime)> {
    let mut parts = line.split_whitespace();
    let start = parts.next()?;
    if parts.next()? != "-->" {
        return None;
    }
    let end = parts.next()?;
    match (parse_timestamp(start), parse_timestamp(end)) {
        (Ok(start), Ok(end)) => Some((start, end)),
        (Err(e), _) | (_, Err(e)) => {
            warn!(line, error = %e, "Skipping malformed SRT time line");
            None
        }
    }
}

/// Read every cue from SRT text. Malformed blocks are skipped.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<SubtitleEvent>> {
    let mut events = Vec::new();
    let mut pending = PendingBlock::default();
    let mut state = BlockState::Index;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_start_matches('\u{feff}').trim();

        if line.is_empty() {
            pending.flush(&mut events);
            state = BlockState::Index;
            continue;
        }

        match state {
            BlockState::Index if !line.contains("-->") => {
                if line.parse::<u64>().is_err() {
                    debug!(line_number = number + 1, line, "Non-numeric SRT index line");
                }
                state = BlockState::Timing;
            }
            BlockState::Index | BlockState::Timing if line.contains("-->") => {
                pending.times = parse_time_line(line);
                state = BlockState::Text;
            }
            BlockState::Timing => {
                warn!(line_number = number + 1, line, "Expected SRT time line");
                state = BlockState::Text;
            }
            _ => pending.lines.push(line.to_string()),
        }
    }
    pending.flush(&mut events);

    debug!(cues = events.len(), "Parsed SRT document");
    Ok(events)
}

/// Write numbered SRT blocks. Returns the number of cues written.
pub fn write<W: Write>(out: &mut W, events: &[SubtitleEvent]) -> io::Result<usize> {
    for (index, event) in events.iter().enumerate() {
        writeln!(out, "{}", index + 1)?;
        writeln!(out, "{} --> {}", format_srt(event.start), format_srt(event.end))?;
        writeln!(out, "{}", event.text)?;
        writeln!(out)?;
    }
    Ok(events.len())
}

//! Advanced SubStation Alpha (`.ass` / `.ssa`) reader and writer.
//!
//! Only the pieces the subtitle track needs are understood: the script info
//! and style sections are kept verbatim for write-back, the first style name
//! is remembered, and `Dialogue:` lines are decoded through the column layout
//! announced by the events `Format:` line.

use std::io::{self, BufRead, Write};

use cueline_core::{Result, SubtitleSettings};
use tracing::{debug, warn};

use crate::timestamp::{format_ass, parse_timestamp};
use crate::SubtitleEvent;

/// Column layout used when a file has no events `Format:` line.
pub const DEFAULT_EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Header sections written ahead of the dialogue lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssHeader {
    /// `[Script Info]` section, one line per entry, newline-terminated.
    pub script_info: String,
    /// `[V4 Styles]` / `[V4+ Styles]` section.
    pub styles: String,
    /// `[Events]` heading and its `Format:` line.
    pub events: String,
    /// Style referenced by written dialogue lines.
    pub style_name: String,
}

impl AssHeader {
    /// Build the stock header for a frame size and style.
    pub fn from_settings(settings: &SubtitleSettings) -> Self {
        let size = settings.frame_size;
        let script_info = format!(
            "[Script Info]\n; This is a Sub Station Alpha v4 script.\n;\nScriptType: v4.00\nCollisions: Normal\nPlayResX: {}\nPlayResY: {}\nTimer: 100.0000\n",
            size.width, size.height
        );
        let styles = format!(
            "[V4 Styles]\nFormat: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, TertiaryColour, BackColour, Bold, Italic, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, AlphaLevel, Encoding\nStyle: {},{},{},16777215,65535,255,0,-1,0,1,2,2,6,40,40,{},0,1\n",
            settings.style_name,
            settings.font_name,
            settings.font_size(),
            settings.vertical_margin()
        );
        Self {
            script_info,
            styles,
            events: format!("[Events]\n{}\n", DEFAULT_EVENT_FORMAT),
            style_name: settings.style_name.clone(),
        }
    }
}

impl Default for AssHeader {
    fn default() -> Self {
        Self::from_settings(&SubtitleSettings::default())
    }
}

/// A parsed ASS script.
#[derive(Debug, Clone)]
pub struct AssDocument {
    pub header: AssHeader,
    pub events: Vec<SubtitleEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    ScriptInfo,
    Styles,
    Events,
    Other,
}

fn classify_heading(line: &str) -> Section {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains("ScriptInfo") {
        Section::ScriptInfo
    } else if compact.contains("Styles") {
        Section::Styles
    } else if compact.contains("Events") {
        Section::Events
    } else {
        Section::Other
    }
}

/// Column positions of the fields read from dialogue lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventColumns {
    start: usize,
    end: usize,
    text: usize,
    count: usize,
}

impl EventColumns {
    fn from_format(line: &str) -> Option<Self> {
        let (_, spec) = line.split_once(':')?;
        let names: Vec<String> = spec
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();
        let find = |wanted: &str| names.iter().position(|name| name == wanted);
        let columns = Self {
            start: find("start")?,
            end: find("end")?,
            text: find("text")?,
            count: names.len(),
        };
        // Text swallows the rest of the line, so it must be the last column.
        (columns.text + 1 == columns.count).then_some(columns)
    }
}

impl Default for EventColumns {
    fn default() -> Self {
        Self {
            start: 1,
            end: 2,
            text: 9,
            count: 10,
        }
    }
}

fn parse_dialogue(line: &str, columns: EventColumns) -> Option<SubtitleEvent> {
    let (_, payload) = line.split_once(':')?;
    let fields: Vec<&str> = payload.trim_start().splitn(columns.count, ',').collect();
    if fields.len() < columns.count {
        warn!(line, expected = columns.count, found = fields.len(), "Skipping short dialogue line");
        return None;
    }
    let (start, end) = match (
        parse_timestamp(fields[columns.start]),
        parse_timestamp(fields[columns.end]),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(e), _) | (_, Err(e)) => {
            warn!(line, error = %e, "Skipping dialogue line with malformed time");
            return None;
        }
    };
    let text = fields[columns.text].replace("\\N", "\n");
    Some(SubtitleEvent::new(start, end, text))
}

/// Read header sections and dialogue from ASS text.
pub fn parse<R: BufRead>(reader: R) -> Result<AssDocument> {
    let mut header = AssHeader {
        script_info: String::new(),
        styles: String::new(),
        events: String::new(),
        style_name: String::new(),
    };
    let mut events = Vec::new();
    let mut section = Section::None;
    let mut columns = EventColumns::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            section = classify_heading(line);
            match section {
                Section::ScriptInfo => push_line(&mut header.script_info, line),
                Section::Styles => push_line(&mut header.styles, line),
                Section::Events => push_line(&mut header.events, line),
                _ => debug!(line, "Ignoring unknown ASS section"),
            }
            continue;
        }

        match section {
            Section::ScriptInfo => push_line(&mut header.script_info, line),
            Section::Styles => {
                push_line(&mut header.styles, line);
                if header.style_name.is_empty() {
                    if let Some(style) = line.strip_prefix("Style:") {
                        let name = style.split(',').next().unwrap_or_default();
                        header.style_name = name.trim().to_string();
                    }
                }
            }
            Section::Events => {
                if line.starts_with("Format:") {
                    push_line(&mut header.events, line);
                    match EventColumns::from_format(line) {
                        Some(parsed) => columns = parsed,
                        None => warn!(line, "Unusable event format line, keeping default columns"),
                    }
                } else if line.starts_with("Dialogue:") {
                    if let Some(event) = parse_dialogue(line, columns) {
                        events.push(event);
                    }
                } else {
                    debug!(line, "Ignoring non-dialogue event line");
                }
            }
            Section::None | Section::Other => {}
        }
    }

    let defaults = AssHeader::default();
    if header.style_name.is_empty() {
        header.style_name = defaults.style_name;
    }
    if header.events.is_empty() {
        header.events = defaults.events;
    } else if !header.events.contains("Format:") {
        push_line(&mut header.events, DEFAULT_EVENT_FORMAT);
    }

    debug!(cues = events.len(), style = %header.style_name, "Parsed ASS document");
    Ok(AssDocument { header, events })
}

fn push_line(section: &mut String, line: &str) {
    section.push_str(line);
    section.push('\n');
}

/// Write header sections and one dialogue line per event.
/// Returns the number of cues written.
pub fn write<W: Write>(out: &mut W, header: &AssHeader, events: &[SubtitleEvent]) -> io::Result<usize> {
    writeln!(out, "{}", header.script_info)?;
    writeln!(out, "{}", header.styles)?;
    write!(out, "{}", header.events)?;
    for event in events {
        writeln!(
            out,
            "Dialogue: 0,{},{},{},,0000,0000,0000,,{}",
            format_ass(event.start),
            format_ass(event.end),
            header.style_name,
            event.text.replace('\n', "\\N")
        )?;
    }
    Ok(events.len())
}

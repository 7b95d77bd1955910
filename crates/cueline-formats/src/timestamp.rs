//! Timestamp parsing and formatting shared by the text formats.

use cueline_core::{CuelineError, RationalTime, Result};

/// Parse `H:MM:SS,mmm` (SRT) or `H:MM:SS.cc` (ASS) into exact seconds.
///
/// The fractional field is read as a decimal fraction, so `1,5`, `1,50` and
/// `1,500` all mean one and a half seconds. The value is not quantized to
/// frames.
pub fn parse_timestamp(text: &str) -> Result<RationalTime> {
    let text = text.trim();
    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() != 3 {
        return Err(CuelineError::Parse(format!(
            "expected H:MM:SS fields in timestamp {:?}",
            text
        )));
    }

    let hours = parse_field(fields[0], text)?;
    let minutes = parse_field(fields[1], text)?;

    let (secs, fraction) = match fields[2].split_once(['.', ',']) {
        Some((secs, fraction)) => (secs, fraction),
        None => (fields[2], ""),
    };
    let seconds = parse_field(secs, text)?;

    if fraction.len() > 9 {
        return Err(CuelineError::Parse(format!(
            "fraction too long in timestamp {:?}",
            text
        )));
    }
    let (numerator, denominator) = if fraction.is_empty() {
        (0, 1)
    } else {
        (parse_field(fraction, text)?, 10i64.pow(fraction.len() as u32))
    };

    let total = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60)?.checked_add(h))
        .and_then(|hm| hm.checked_add(seconds))
        .and_then(|whole| whole.checked_mul(denominator))
        .and_then(|scaled| scaled.checked_add(numerator))
        .ok_or_else(|| CuelineError::Parse(format!("timestamp {:?} out of range", text)))?;
    Ok(RationalTime::new(total, denominator))
}

fn parse_field(field: &str, whole: &str) -> Result<i64> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CuelineError::Parse(format!(
            "non-numeric field {:?} in timestamp {:?}",
            field, whole
        )));
    }
    field
        .parse()
        .map_err(|e| CuelineError::Parse(format!("field {:?} in {:?}: {}", field, whole, e)))
}

/// Split non-negative milliseconds into (hours, minutes, seconds, millis).
fn split_millis(time: RationalTime) -> (i64, i64, i64, i64) {
    let ms = time.to_millis().max(0);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    (hours, minutes, seconds, ms % 1_000)
}

/// Format as an SRT timestamp (`HH:MM:SS,mmm`).
pub fn format_srt(time: RationalTime) -> String {
    let (h, m, s, ms) = split_millis(time);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Format as an ASS timestamp (`H:MM:SS.cc`); sub-centisecond digits are dropped.
pub fn format_ass(time: RationalTime) -> String {
    let (h, m, s, ms) = split_millis(time);
    format!("{}:{:02}:{:02}.{:02}", h, m, s, ms / 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_srt_timestamp() {
        let t = parse_timestamp("00:00:02,500").unwrap();
        assert_eq!(t, RationalTime::new(5, 2));
    }

    #[test]
    fn test_parse_ass_timestamp_centiseconds() {
        let t = parse_timestamp("1:02:03.45").unwrap();
        assert_eq!(t, RationalTime::new(372_345, 100));
    }

    #[test]
    fn test_fraction_is_decimal() {
        let a = parse_timestamp("0:00:01,5").unwrap();
        let b = parse_timestamp("0:00:01,500").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_fraction_allowed() {
        assert_eq!(
            parse_timestamp("00:01:00").unwrap(),
            RationalTime::new(60, 1)
        );
    }

    #[test]
    fn test_malformed_timestamps_rejected() {
        assert!(parse_timestamp("00:01").is_err());
        assert!(parse_timestamp("aa:00:01,000").is_err());
        assert!(parse_timestamp("00:00:01,x0").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_oversized_fields_rejected() {
        assert!(matches!(
            parse_timestamp("9999999999999999:00:00,000"),
            Err(CuelineError::Parse(_))
        ));
        assert!(parse_timestamp("0:00:9223372036854775807,5").is_err());
    }

    #[test]
    fn test_format_srt() {
        let t = RationalTime::from_millis(3_723_004);
        assert_eq!(format_srt(t), "01:02:03,004");
    }

    #[test]
    fn test_format_ass_truncates_to_centiseconds() {
        let t = RationalTime::from_millis(3_723_459);
        assert_eq!(format_ass(t), "1:02:03.45");
    }
}

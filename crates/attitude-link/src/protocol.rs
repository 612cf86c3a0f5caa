use crate::types::OrientationSample;
use regex::Regex;
use std::sync::LazyLock;

/// `Pitch: <n> | Roll: <n>` with an optional `| Heading: <n>` right after.
/// Numbers are runs of digits, `-` and `.`; conversion happens afterwards.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Pitch:\s*([-\d\.]+)\s*\|\s*Roll:\s*([-\d\.]+)(?:\s*\|\s*Heading:\s*([-\d\.]+))?")
        .expect("line pattern is valid")
});

/// Parse one text line of the form
/// `Pitch: 12.34 | Roll: -56.78 | Heading: 123.45 deg | Dir: NORTE`.
///
/// Pitch and Roll are required, Heading is optional and defaults to 0.0.
/// Anything after the last consumed field is ignored. Lines that don't have
/// the expected shape, or whose numbers don't convert, yield `None`: partial
/// and garbled lines are routine on a live serial link.
pub fn parse_line(line: &str) -> Option<OrientationSample> {
    let caps = LINE_PATTERN.captures(line)?;

    let pitch = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let roll = caps.get(2)?.as_str().parse::<f64>().ok()?;
    let heading = match caps.get(3) {
        Some(token) => token.as_str().parse::<f64>().ok()?,
        None => 0.0,
    };

    Some(OrientationSample::new(pitch, roll, heading))
}

/// Decode raw bytes of one line read from the port.
///
/// Invalid UTF-8 and blank lines are dropped like any other unparseable line.
pub fn decode_line(raw: &[u8]) -> Option<OrientationSample> {
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line.trim(),
        Err(e) => {
            tracing::trace!(?e, "Dropping line with invalid UTF-8");
            return None;
        }
    };

    if line.is_empty() {
        return None;
    }

    let sample = parse_line(line);
    if sample.is_none() {
        tracing::trace!(line, "Dropping unrecognised line");
    }
    sample
}

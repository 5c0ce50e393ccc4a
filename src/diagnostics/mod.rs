//! Pretty diagnostics for device names: spans, line/col, caret-highlights.

use std::ops::Range;

use crate::device::DeviceNameError;

/// Byte-span in the original source (inclusive start, exclusive end).
pub type Span = Range<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize, // 1-based
    pub col: usize,  // 1-based (Unicode-agnostic; counts bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub start: Location,
    pub end: Location,
}

/// Compute (line, col) from byte offset.
fn offset_to_loc(src: &str, offset: usize) -> Location {
    let mut line = 1usize;
    let mut col = 1usize;
    for (idx, byte) in src.bytes().enumerate() {
        if idx >= offset {
            break;
        }
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    Location { line, col }
}

/// Extract the single source line containing `span.start`.
fn line_at(src: &str, span: &Span) -> (String, usize /* line_start_offset */) {
    let bytes = src.as_bytes();
    let start = span.start.min(bytes.len());
    let b = bytes[..start]
        .iter()
        .rposition(|&c| c == b'\n')
        .map_or(0, |pos| pos + 1);
    let e = bytes[start..]
        .iter()
        .position(|&c| c == b'\n')
        .map_or(bytes.len(), |pos| start + pos);
    (String::from_utf8_lossy(&bytes[b..e]).into_owned(), b)
}

/// Render caret-highlight under the selected span (single-line best effort).
pub fn render(src: &str, diag: &Diagnostic) -> String {
    let (line_str, line_off) = line_at(src, &diag.span);
    let caret_start = diag.span.start.saturating_sub(line_off);
    let caret_len = diag.span.end.saturating_sub(diag.span.start).max(1);

    let carets = format!("{}{}", " ".repeat(caret_start), "^".repeat(caret_len));

    format!(
        "error: {}\n--> line {}, col {}\n{}\n{}",
        diag.message, diag.start.line, diag.start.col, line_str, carets
    )
}

impl Diagnostic {
    /// Construct from a device-name parse error against the text it came from.
    pub fn from_device_name_error(src: &str, e: &DeviceNameError) -> Self {
        let span = e.span.clone();
        Diagnostic {
            message: e.kind.to_string(),
            start: offset_to_loc(src, span.start),
            end: offset_to_loc(src, span.end),
            span,
        }
    }
}

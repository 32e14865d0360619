//! Format projection: applying protocol text edits to source text.
//!
//! Edits arrive as 2D half-open ranges computed against one version of the
//! source (the pairing finders emit pairwise swaps as simultaneous edits).
//! All ranges are therefore converted to byte offsets against the original
//! source and spliced back-to-front, so every edit applies on the same
//! original-offset basis and is never re-offset by a preceding splice.

use tower_lsp_server::ls_types::{Position, TextEdit};

/// Converts a protocol position (line, UTF-16 character) to a byte offset
/// into `source`. Out-of-range positions clamp to the nearest valid offset
/// (end of line or end of source).
pub fn position_to_offset(source: &str, position: Position) -> usize {
    let mut offset = 0usize;
    let mut line = 0u32;

    for (i, c) in source.char_indices() {
        if line == position.line {
            offset = i;
            break;
        }
        if c == '\n' {
            line += 1;
            offset = i + 1;
        }
    }
    if line < position.line {
        return source.len();
    }

    // Walk UTF-16 units within the line.
    let mut units = 0u32;
    for (i, c) in source[offset..].char_indices() {
        if units >= position.character || c == '\n' {
            return offset + i;
        }
        units += c.len_utf16() as u32;
    }
    source.len()
}

/// Applies edits against the original source, returning the new text.
///
/// Every range is resolved against the unedited input; edits are then
/// spliced in descending start order. Edits must not overlap.
pub fn apply_text_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut spans: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            (
                position_to_offset(source, edit.range.start),
                position_to_offset(source, edit.range.end),
                edit.new_text.as_str(),
            )
        })
        .collect();
    spans.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

    let mut result = source.to_string();
    for (start, end, new_text) in spans {
        result.replace_range(start..end, new_text);
    }
    result
}

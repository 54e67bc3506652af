use unicode_segmentation::UnicodeSegmentation;

use super::normalize::Span;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";
pub const ELLIPSIS: &str = "…";

const ESCAPED_OPEN: &str = "&lt;mark&gt;";
const ESCAPED_CLOSE: &str = "&lt;/mark&gt;";

/// Widest unit the window may have to hold on its own.
pub const MAX_UNIT_WIDTH: usize = 13;

/// One indivisible piece of snippet output: a single source char, or a whole
/// literal delimiter in its escaped form.
struct Unit<'a> {
    shown: &'a str,
    width: usize,
    /// Char range covered in the source text.
    start: usize,
    end: usize,
    /// Byte offset in the source text.
    byte: usize,
}

/// Split a field into units, escaping literal delimiters as it goes, so the
/// window is sized on what will actually be shown.
fn units(text: &str) -> Vec<Unit<'_>> {
    let mut units = Vec::with_capacity(text.len());
    let mut byte = 0;
    let mut char_idx = 0;

    while byte < text.len() {
        let rest = &text[byte..];
        let (raw_len, escaped) = if rest.starts_with(MARK_OPEN) {
            (MARK_OPEN.len(), Some(ESCAPED_OPEN))
        } else if rest.starts_with(MARK_CLOSE) {
            (MARK_CLOSE.len(), Some(ESCAPED_CLOSE))
        } else {
            (rest.chars().next().map_or(1, char::len_utf8), None)
        };
        let raw = &rest[..raw_len];
        let chars = raw.chars().count();
        let shown = escaped.unwrap_or(raw);

        units.push(Unit {
            shown,
            width: shown.chars().count(),
            start: char_idx,
            end: char_idx + chars,
            byte,
        });
        byte += raw_len;
        char_idx += chars;
    }
    units
}

/// Build a snippet of at most `window` visible chars around `span`, with the
/// matched text wrapped once in `<mark>`/`</mark>`. Literal delimiters in the
/// source text are entity-escaped and never cut; a match touching one covers
/// the whole escaped delimiter.
pub fn snippet(text: &str, span: Span, window: usize) -> String {
    let units = units(text);
    let count = units.len();

    let first = units.iter().position(|u| u.end > span.start).unwrap_or(count);
    let last = units
        .iter()
        .rposition(|u| u.start < span.end)
        .map_or(first, |i| i + 1)
        .max(first);

    let total: usize = units.iter().map(|u| u.width).sum();
    if total <= window {
        return assemble(&units, 0, first, last, count);
    }

    // Both markers are reserved up front so the visible text never exceeds the window.
    let budget = window.saturating_sub(2 * ELLIPSIS.chars().count()).max(1);

    let mut end = first;
    let mut used = 0;
    while end < last && (end == first || used + units[end].width <= budget) {
        used += units[end].width;
        end += 1;
    }

    let mut room = budget.saturating_sub(used);
    let mut left_room = room / 2;
    let mut win_start = first;
    let mut win_end = end;

    while win_start > 0 && units[win_start - 1].width <= left_room {
        win_start -= 1;
        left_room -= units[win_start].width;
        room -= units[win_start].width;
    }
    while win_end < count && units[win_end].width <= room {
        room -= units[win_end].width;
        win_end += 1;
    }
    // Near the end of the field, give the unused right side back to the left.
    while win_start > 0 && units[win_start - 1].width <= room {
        win_start -= 1;
        room -= units[win_start].width;
    }

    let (win_start, win_end) = snap_to_graphemes(text, &units, win_start, first, end, win_end);
    assemble(&units, win_start, first, end, win_end)
}

/// Pull the window edges inward so no grapheme cluster is cut in half,
/// never past the match itself.
fn snap_to_graphemes(
    text: &str,
    units: &[Unit],
    mut win_start: usize,
    first: usize,
    end: usize,
    mut win_end: usize,
) -> (usize, usize) {
    let boundaries: Vec<usize> = text
        .grapheme_indices(true)
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let is_boundary = |unit_idx: usize| {
        let byte = units.get(unit_idx).map_or(text.len(), |u| u.byte);
        boundaries.binary_search(&byte).is_ok()
    };

    while win_start < first && !is_boundary(win_start) {
        win_start += 1;
    }
    while win_end > end && !is_boundary(win_end) {
        win_end -= 1;
    }
    (win_start, win_end)
}

fn assemble(units: &[Unit], win_start: usize, first: usize, end: usize, win_end: usize) -> String {
    let push_units = |out: &mut String, range: &[Unit]| {
        for unit in range {
            out.push_str(unit.shown);
        }
    };

    let mut out = String::new();
    if win_start > 0 {
        out.push_str(ELLIPSIS);
    }
    push_units(&mut out, &units[win_start..first]);
    out.push_str(MARK_OPEN);
    push_units(&mut out, &units[first..end]);
    out.push_str(MARK_CLOSE);
    push_units(&mut out, &units[end..win_end]);
    if win_end < units.len() {
        out.push_str(ELLIPSIS);
    }
    out
}

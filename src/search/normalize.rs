/// Normalize text for comparison: trim surrounding whitespace and lowercase.
/// Inner whitespace and punctuation are kept since matching is substring based.
/// Uses the same per-char folding as [`FoldedText`], so a query and a field
/// always fold alike.
pub fn normalize(text: &str) -> String {
    text.trim().chars().flat_map(fold_char).collect()
}

/// Lowercase one char. Final sigma folds to plain sigma, since a substring
/// can end mid-word in one text and at a word end in the other.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
    ch.to_lowercase().map(|c| if c == 'ς' { 'σ' } else { c })
}

/// A char range `[start, end)` in the original (unfolded) text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Lowercased copy of a field that remembers where each folded byte came from,
/// so a match found in the folded text maps back to the original characters.
pub struct FoldedText {
    folded: String,
    /// Original char index for every byte of `folded`.
    origin: Vec<usize>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());

        for (char_idx, ch) in text.chars().enumerate() {
            for lower in fold_char(ch) {
                folded.push(lower);
                origin.extend(std::iter::repeat(char_idx).take(lower.len_utf8()));
            }
        }

        Self { folded, origin }
    }

    /// First occurrence of an already-normalized needle, in original chars.
    /// A partial hit on a char that lowercases to several chars covers that
    /// whole original char.
    pub fn find_first(&self, needle: &str) -> Option<Span> {
        if needle.is_empty() {
            return None;
        }
        let byte_start = self.folded.find(needle)?;
        let byte_end = byte_start + needle.len();
        Some(Span {
            start: self.origin[byte_start],
            end: self.origin[byte_end - 1] + 1,
        })
    }
}

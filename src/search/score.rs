use super::matcher::FieldMatch;
use super::SearchMatchType;

pub const MAX_SCORE: f64 = 100.0;

const TITLE_BASE: f64 = 60.0;
const TAG_BASE: f64 = 50.0;
const MESSAGE_BASE: f64 = 40.0;

const EXACT_BONUS: f64 = 30.0;
/// Reduced from the +30 other fields get: at +30 an exact tag (90) outranks a
/// title hit at offset 0 (70), yet a conversation titled "Rust ownership" and
/// tagged "rust" must list the title first for "rust". +5 keeps that order
/// and still ranks an exact tag above a partial one.
const TAG_EXACT_BONUS: f64 = 5.0;

const POSITION_BONUS: f64 = 10.0;
/// Chars of offset per point of position bonus lost.
const POSITION_DECAY_CHARS: usize = 20;

const SECONDS_PER_DAY: i64 = 86_400;

fn base_score(match_type: SearchMatchType) -> f64 {
    match match_type {
        SearchMatchType::Title => TITLE_BASE,
        SearchMatchType::Tag => TAG_BASE,
        SearchMatchType::Message => MESSAGE_BASE,
    }
}

fn exact_bonus(field: &FieldMatch) -> f64 {
    match (field.exact, field.match_type) {
        (false, _) => 0.0,
        (true, SearchMatchType::Tag) => TAG_EXACT_BONUS,
        (true, _) => EXACT_BONUS,
    }
}

/// Full bonus at offset 0, then one point less per 20 chars.
pub fn position_bonus(offset: usize) -> f64 {
    if offset == 0 {
        return POSITION_BONUS;
    }
    let decay = (offset / POSITION_DECAY_CHARS) as f64;
    (POSITION_BONUS - decay).max(0.0)
}

/// One point per day left in the recency window. Future timestamps count as today.
pub fn recency_bonus(timestamp: i64, now: i64, window_days: i64) -> f64 {
    let age_days = now.saturating_sub(timestamp).max(0) / SECONDS_PER_DAY;
    (window_days - age_days).max(0) as f64
}

/// Relevance of a field match, clamped to `0..=100`.
pub fn score(field: &FieldMatch, timestamp: i64, now: i64, recency_window_days: i64) -> f64 {
    let total = base_score(field.match_type)
        + exact_bonus(field)
        + position_bonus(field.span.start)
        + recency_bonus(timestamp, now, recency_window_days);
    total.clamp(0.0, MAX_SCORE)
}

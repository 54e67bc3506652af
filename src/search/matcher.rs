use crate::model::{Conversation, Message};

use super::normalize::{normalize, FoldedText, Span};
use super::{SearchMatchType, SearchOptions};

/// A field of a conversation that contains the query.
#[derive(Debug, Clone)]
pub struct FieldMatch<'a> {
    pub match_type: SearchMatchType,
    /// The original, unfolded field text.
    pub text: &'a str,
    /// First occurrence only, in chars of `text`.
    pub span: Span,
    /// The whole field equals the query after normalization.
    pub exact: bool,
    /// The message that matched, for message matches.
    pub message: Option<&'a Message>,
}

/// Scan a conversation for a normalized query in every enabled field.
/// Results come in encounter order: title, then messages, then tags.
pub fn match_conversation<'a>(
    conversation: &'a Conversation,
    query: &str,
    options: &SearchOptions,
) -> Vec<FieldMatch<'a>> {
    let mut matches = Vec::new();
    if query.is_empty() {
        return matches;
    }

    if options.search_titles {
        if let Some(m) = match_field(SearchMatchType::Title, &conversation.title, query, None) {
            matches.push(m);
        }
    }

    if options.search_messages {
        let scanned = conversation
            .messages
            .iter()
            .filter(|msg| options.role_filter.map_or(true, |role| msg.role == role));
        for msg in scanned {
            if let Some(m) = match_field(SearchMatchType::Message, &msg.content, query, Some(msg)) {
                matches.push(m);
            }
        }
    }

    if options.search_tags {
        for tag in &conversation.tags {
            if let Some(m) = match_field(SearchMatchType::Tag, tag, query, None) {
                matches.push(m);
            }
        }
    }

    matches
}

fn match_field<'a>(
    match_type: SearchMatchType,
    text: &'a str,
    query: &str,
    message: Option<&'a Message>,
) -> Option<FieldMatch<'a>> {
    if text.is_empty() {
        return None;
    }
    let span = FoldedText::new(text).find_first(query)?;
    Some(FieldMatch {
        match_type,
        text,
        span,
        exact: normalize(text) == query,
        message,
    })
}

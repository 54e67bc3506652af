use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SearchError;

/// Author role of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
}

/// A conversation as handed over by the persistence layer. Missing or null
/// fields deserialize to their empty value and simply never match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: i64,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<Message>,
}

impl Message {
    pub fn new(id: &str, role: Role, content: &str, created_at: i64) -> Self {
        Self {
            id: id.to_string(),
            role,
            content: content.to_string(),
            created_at,
        }
    }
}

impl Conversation {
    pub fn new(id: &str, title: &str, updated_at: i64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            updated_at,
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// Parse a JSON array of conversations. Entries that cannot be read as a
/// conversation are skipped; only a non-array document is an error.
pub fn parse_conversations(json: &str) -> Result<Vec<Conversation>, SearchError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let total = entries.len();

    let conversations: Vec<Conversation> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(conv) => Some(conv),
            Err(e) => {
                log::warn!("Skipping malformed conversation at index {}: {}", i, e);
                None
            }
        })
        .collect();

    if conversations.len() < total {
        log::warn!(
            "Parsed {} of {} conversations",
            conversations.len(),
            total
        );
    }
    Ok(conversations)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Message>(v) {
            Ok(msg) => Some(msg),
            Err(e) => {
                log::warn!("Skipping malformed message: {}", e);
                None
            }
        })
        .collect())
}

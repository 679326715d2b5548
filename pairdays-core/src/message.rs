//! Daily messages: short text posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::MAX_MESSAGE_CHARS;
use crate::error::{PairDaysError, PairDaysResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Message text that is known to fit: non-blank and at most
/// `MAX_MESSAGE_CHARS` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(text: &str) -> PairDaysResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PairDaysError::Validation("message is empty".into()));
        }

        let len = text.chars().count();
        if len > MAX_MESSAGE_CHARS {
            return Err(PairDaysError::Validation(format!(
                "message is {len} characters, the limit is {MAX_MESSAGE_CHARS}"
            )));
        }

        Ok(MessageText(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewMessageRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_limit_exactly() {
        let text = "a".repeat(MAX_MESSAGE_CHARS);
        assert!(MessageText::new(&text).is_ok());
    }

    #[test]
    fn test_rejects_over_limit() {
        let text = "a".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(matches!(MessageText::new(&text), Err(PairDaysError::Validation(_))));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 300 three-byte characters
        let text = "愛".repeat(MAX_MESSAGE_CHARS);
        assert!(MessageText::new(&text).is_ok());
    }

    #[test]
    fn test_rejects_blank() {
        assert!(MessageText::new("   ").is_err());
    }
}

//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommentId, DefectId, UserId};

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 5000;

/// A comment left on a defect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub defect_id: DefectId,
    /// Author
    pub user_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment
    pub fn new(
        defect_id: DefectId,
        user_id: UserId,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new(),
            defect_id,
            user_id,
            content: content.into(),
            created_at: now,
        }
    }

    /// Validate the comment, returning a message on failure
    pub fn validate(&self) -> Result<(), String> {
        let length = self.content.trim().chars().count();
        if length == 0 {
            return Err("Comment cannot be empty".into());
        }
        if length > MAX_COMMENT_LENGTH {
            return Err(format!(
                "Comment too long ({} chars, max {})",
                length, MAX_COMMENT_LENGTH
            ));
        }
        Ok(())
    }
}

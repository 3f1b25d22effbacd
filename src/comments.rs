//! Global comment feed. Comments are attached to the site, not to an item.

use thiserror::Error;

use crate::content::generate_id;
use crate::store::models::{Comment, User};

/// Shown next to every comment; there is no real timestamp.
pub const JUST_NOW: &str = "Just now";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error("Comment cannot be empty")]
    Empty,
}

pub fn new_comment(user: &User, text: &str) -> Result<Comment, CommentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentError::Empty);
    }
    Ok(Comment {
        id: generate_id("comment"),
        user: user.clone(),
        text: text.to_string(),
        timestamp: JUST_NOW.to_string(),
    })
}

//! Store Models - records persisted as JSON under the fixed store keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three content sections of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Story,
    Documentary,
    Article,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [
        ContentType::Story,
        ContentType::Documentary,
        ContentType::Article,
    ];

    /// Lowercase singular name, used as the id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Story => "story",
            ContentType::Documentary => "documentary",
            ContentType::Article => "article",
        }
    }

    /// Name of the bucket holding this type, as it appears in backups.
    pub fn bucket(&self) -> &'static str {
        match self {
            ContentType::Story => "stories",
            ContentType::Documentary => "documentaries",
            ContentType::Article => "articles",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownContentType(pub String);

impl fmt::Display for UnknownContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown content type '{}'", self.0)
    }
}

impl std::error::Error for UnknownContentType {}

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "story" | "stories" => Ok(ContentType::Story),
            "documentary" | "documentaries" => Ok(ContentType::Documentary),
            "article" | "articles" => Ok(ContentType::Article),
            other => Err(UnknownContentType(other.to_string())),
        }
    }
}

/// A story, documentary or article shown on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Embedded image data URL
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file_name: Option<String>,
    /// Embedded file data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_file_url: Option<String>,
}

/// Admin profile or synthesized reader identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub notification_email: String,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user: User,
    pub text: String,
    /// Display string, not a real timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub youtube: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub reddit: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub x: String,
}

/// All three collections, in the backup file shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBundle {
    pub stories: Vec<ContentItem>,
    pub documentaries: Vec<ContentItem>,
    pub articles: Vec<ContentItem>,
}

/*!
 * Content Repository
 * Three independent, newest-first collections of content items plus the
 * backup/restore format for them.
 */
use chrono::{NaiveDate, Utc};
use rand::distr::{Alphanumeric, SampleString};
use serde_json::Value;
use thiserror::Error;

use crate::store::models::{ContentBundle, ContentItem, ContentType};

pub const DELETE_PROMPT: &str = "Are you sure? This action cannot be undone.";
pub const RESTORE_PROMPT: &str = "Are you sure? This will overwrite all current content.";

/// Random suffix length on generated ids
const ID_SUFFIX_LEN: usize = 6;

/// Answer to an interactive yes/no gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(yes: bool) -> Self {
        if yes {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    NotFound,
    Removed(ContentItem),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid backup file format.")]
    InvalidFormat,
    #[error("Invalid backup file format: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Generate `<prefix>-<unix millis>-<suffix>`. The suffix keeps two ids
/// minted in the same millisecond apart.
pub fn generate_id(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        Utc::now().timestamp_millis(),
        Alphanumeric
            .sample_string(&mut rand::rng(), ID_SUFFIX_LEN)
            .to_lowercase()
    )
}

/// Fields submitted by the admin dashboard, before files are embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub content_type: ContentType,
    pub title: String,
    pub tagline: Option<String>,
    pub description: String,
    pub tags: Vec<String>,
}

impl NewContent {
    /// Split a comma separated tag field, dropping blanks.
    pub fn parse_tags(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn into_item(
        self,
        cover_image: String,
        content_file: Option<(String, String)>,
    ) -> ContentItem {
        let (content_file_name, content_file_url) = match content_file {
            Some((name, url)) => (Some(name), Some(url)),
            None => (None, None),
        };
        ContentItem {
            id: generate_id(self.content_type.as_str()),
            content_type: self.content_type,
            title: self.title,
            tagline: self.tagline.filter(|t| !t.trim().is_empty()),
            description: self.description,
            cover_image,
            tags: self.tags,
            content_file_name,
            content_file_url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRepository {
    stories: Vec<ContentItem>,
    documentaries: Vec<ContentItem>,
    articles: Vec<ContentItem>,
}

impl ContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bundle(bundle: ContentBundle) -> Self {
        Self {
            stories: bundle.stories,
            documentaries: bundle.documentaries,
            articles: bundle.articles,
        }
    }

    pub fn items(&self, content_type: ContentType) -> &[ContentItem] {
        match content_type {
            ContentType::Story => &self.stories,
            ContentType::Documentary => &self.documentaries,
            ContentType::Article => &self.articles,
        }
    }

    fn items_mut(&mut self, content_type: ContentType) -> &mut Vec<ContentItem> {
        match content_type {
            ContentType::Story => &mut self.stories,
            ContentType::Documentary => &mut self.documentaries,
            ContentType::Article => &mut self.articles,
        }
    }

    /// Prepend to the bucket matching the item's type.
    pub fn add(&mut self, item: ContentItem) -> ContentType {
        let content_type = item.content_type;
        self.items_mut(content_type).insert(0, item);
        content_type
    }

    pub fn delete(
        &mut self,
        id: &str,
        content_type: ContentType,
        confirmation: Confirmation,
    ) -> DeleteOutcome {
        if confirmation == Confirmation::Declined {
            return DeleteOutcome::Declined;
        }
        let items = self.items_mut(content_type);
        match items.iter().position(|item| item.id == id) {
            Some(index) => DeleteOutcome::Removed(items.remove(index)),
            None => DeleteOutcome::NotFound,
        }
    }

    /// Replace all three buckets at once.
    pub fn restore_all(&mut self, bundle: ContentBundle) {
        *self = Self::from_bundle(bundle);
    }

    pub fn export_all(&self) -> ContentBundle {
        ContentBundle {
            stories: self.stories.clone(),
            documentaries: self.documentaries.clone(),
            articles: self.articles.clone(),
        }
    }

    /// Stories, then documentaries, then articles.
    pub fn all(&self) -> impl Iterator<Item = &ContentItem> {
        self.stories
            .iter()
            .chain(self.documentaries.iter())
            .chain(self.articles.iter())
    }

    pub fn find(&self, id: &str) -> Option<&ContentItem> {
        self.all().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.stories.len() + self.documentaries.len() + self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A downloadable snapshot of every collection.
#[derive(Debug, Clone)]
pub struct Backup {
    pub filename: String,
    pub body: String,
}

pub fn backup_filename(date: NaiveDate) -> String {
    format!("portfolio_backup_{}.json", date.format("%Y-%m-%d"))
}

pub fn export_backup(bundle: &ContentBundle) -> Result<Backup, serde_json::Error> {
    Ok(Backup {
        filename: backup_filename(Utc::now().date_naive()),
        body: serde_json::to_string_pretty(bundle)?,
    })
}

/// Accept only an object whose three collection fields are all arrays.
pub fn parse_backup(text: &str) -> Result<ContentBundle, BackupError> {
    let value: Value = serde_json::from_str(text)?;
    let is_array = |field: &str| value.get(field).map(Value::is_array).unwrap_or(false);
    if !(is_array("stories") && is_array("documentaries") && is_array("articles")) {
        return Err(BackupError::InvalidFormat);
    }
    Ok(serde_json::from_value(value)?)
}

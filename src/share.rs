//! Share links of the form `#content/<id>`.

use serde::Serialize;

use crate::store::models::ContentItem;

const FRAGMENT_PREFIX: &str = "content/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub id: String,
}

impl ShareLink {
    /// Accepts `#content/<id>`, `content/<id>`, or a full URL carrying the fragment.
    pub fn parse(input: &str) -> Option<Self> {
        let fragment = match input.split_once('#') {
            Some((_, fragment)) => fragment,
            None => input,
        };
        let id = fragment.strip_prefix(FRAGMENT_PREFIX)?.trim();
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(Self { id: id.to_string() })
    }

    pub fn fragment(&self) -> String {
        format!("#{}{}", FRAGMENT_PREFIX, self.id)
    }
}

/// URL copied to the clipboard by the share action.
pub fn share_url(site_url: &str, id: &str) -> String {
    format!(
        "{}/{}",
        site_url.trim_end_matches('/'),
        ShareLink { id: id.to_string() }.fragment()
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "item", rename_all = "camelCase")]
pub enum ShareResolution {
    /// Viewer may see it now
    Open(ContentItem),
    /// Show the reader gate, then open this id
    GateFirst(String),
    NotFound,
}

//! Fixed store keys, one per collection or setting.

use super::models::ContentType;

pub const STORIES: &str = "portfolio_stories";
pub const DOCUMENTARIES: &str = "portfolio_documentaries";
pub const ARTICLES: &str = "portfolio_articles";
pub const COMMENTS: &str = "portfolio_comments";
/// Plaintext admin secret
pub const ADMIN_PASSWORD: &str = "portfolio_admin_password";
pub const SOCIAL_LINKS: &str = "portfolio_social_links";
pub const IS_LOGGED_IN: &str = "portfolio_is_logged_in";
pub const USER_PROFILE: &str = "portfolio_user_profile";
pub const READER_EMAIL: &str = "portfolio_reader_email";

pub fn for_content(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Story => STORIES,
        ContentType::Documentary => DOCUMENTARIES,
        ContentType::Article => ARTICLES,
    }
}

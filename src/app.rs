/*!
 * Application State
 * The single state object every handler reads and mutates: content
 * collections, comments, settings and the session, mirrored write-through
 * into the Local Store. A failed write never fails the operation; it is
 * reported back as `Persisted::Unsaved` so the caller can warn the user.
 */
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

use crate::auth::{self, AuthError, Session, DEFAULT_ADMIN_PASSWORD};
use crate::comments::{self, CommentError};
use crate::content::{
    self, Backup, BackupError, Confirmation, ContentRepository, DeleteOutcome,
};
use crate::ingest::{self, IngestError};
use crate::share::{self, ShareLink, ShareResolution};
use crate::store::models::{Comment, ContentBundle, ContentItem, ContentType, SocialLinks, User};
use crate::store::{keys, LocalStore, StoreError};

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Backup(#[from] BackupError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error("failed to build backup: {0}")]
    Export(#[from] serde_json::Error),
    #[error("store task failed: {0}")]
    Task(String),
}

/// Whether a change reached the Local Store.
#[derive(Debug)]
#[must_use]
pub enum Persisted {
    Saved,
    Unsaved(StoreError),
}

impl Persisted {
    /// Keep the first failure.
    pub fn and(self, other: Persisted) -> Persisted {
        match self {
            Persisted::Saved => other,
            unsaved => unsaved,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Persisted::Saved)
    }

    /// User-facing message for an unsaved change.
    pub fn warning(&self) -> Option<String> {
        match self {
            Persisted::Saved => None,
            Persisted::Unsaved(e) if e.is_quota() => Some(
                "Storage is full. Your change is visible but was not saved; \
                 delete some content or use smaller files to free space."
                    .to_string(),
            ),
            Persisted::Unsaved(e) => Some(format!("Your change could not be saved: {}", e)),
        }
    }
}

/// Result value plus its persistence status.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub persisted: Persisted,
}

impl<T> Outcome<T> {
    fn new(value: T, persisted: Persisted) -> Self {
        Self { value, persisted }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site_url: String,
    pub admin_profile: User,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_profile: auth::default_admin_profile(),
        }
    }
}

impl SiteConfig {
    /// Use a local image file as the default admin avatar.
    pub async fn embed_avatar_file(&mut self, path: impl AsRef<Path>) -> Result<(), IngestError> {
        self.admin_profile.avatar = ingest::file_to_data_url(path).await?;
        Ok(())
    }
}

/// Signed-in user plus a share link that was waiting on the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIn {
    pub user: User,
    pub pending_item: Option<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Declined,
    Restored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub notification_email: String,
}

pub struct Portfolio {
    store: Box<dyn LocalStore>,
    content: ContentRepository,
    comments: Vec<Comment>,
    admin_password: String,
    admin_profile: User,
    social_links: SocialLinks,
    session: Session,
    pending_share: Option<String>,
    site_url: String,
}

fn read_json<T: serde::de::DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "ignoring malformed persisted value");
            None
        }
    }
}

impl Portfolio {
    /// Hydrate every collection and setting from the store.
    pub fn load(store: Box<dyn LocalStore>, config: SiteConfig) -> Self {
        let bucket = |content_type| {
            read_json::<Vec<ContentItem>>(store.as_ref(), keys::for_content(content_type))
                .unwrap_or_default()
        };
        let content = ContentRepository::from_bundle(ContentBundle {
            stories: bucket(ContentType::Story),
            documentaries: bucket(ContentType::Documentary),
            articles: bucket(ContentType::Article),
        });
        let comments: Vec<Comment> = read_json(store.as_ref(), keys::COMMENTS).unwrap_or_default();
        let social_links: SocialLinks =
            read_json(store.as_ref(), keys::SOCIAL_LINKS).unwrap_or_default();
        let admin_password = store
            .get(keys::ADMIN_PASSWORD)
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
        let admin_profile: User =
            read_json(store.as_ref(), keys::USER_PROFILE).unwrap_or(config.admin_profile);

        let session = if store.get(keys::IS_LOGGED_IN).as_deref() == Some("true") {
            Session::Admin(admin_profile.clone())
        } else {
            match store.get(keys::READER_EMAIL) {
                Some(email) if auth::is_valid_email(&email) => {
                    Session::Reader(auth::reader_user(&email))
                }
                _ => Session::Anonymous,
            }
        };

        tracing::info!(
            items = content.len(),
            comments = comments.len(),
            session = session.kind(),
            used_bytes = store.used_bytes(),
            "portfolio state loaded"
        );

        Self {
            store,
            content,
            comments,
            admin_password,
            admin_profile,
            social_links,
            session,
            pending_share: None,
            site_url: config.site_url,
        }
    }

    // ------------------------------------------------------------------
    // Write-through helpers
    // ------------------------------------------------------------------

    fn write(&mut self, key: &str, value: &str) -> Persisted {
        match self.store.set(key, value) {
            Ok(()) => Persisted::Saved,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "store write dropped");
                Persisted::Unsaved(e)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Persisted {
        match serde_json::to_string(value) {
            Ok(raw) => self.write(key, &raw),
            Err(source) => Persisted::Unsaved(StoreError::Encode {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn remove(&mut self, key: &str) -> Persisted {
        match self.store.remove(key) {
            Ok(()) => Persisted::Saved,
            Err(e) => Persisted::Unsaved(e),
        }
    }

    fn persist_bucket(&mut self, content_type: ContentType) -> Persisted {
        let items = self.content.items(content_type).to_vec();
        self.write_json(keys::for_content(content_type), &items)
    }

    fn persist_session(&mut self) -> Persisted {
        match self.session.clone() {
            Session::Anonymous => self
                .write(keys::IS_LOGGED_IN, "false")
                .and(self.remove(keys::READER_EMAIL)),
            Session::Admin(user) => self
                .write(keys::IS_LOGGED_IN, "true")
                .and(self.write_json(keys::USER_PROFILE, &user))
                .and(self.remove(keys::READER_EMAIL)),
            Session::Reader(user) => self
                .write(keys::IS_LOGGED_IN, "false")
                .and(self.write(keys::READER_EMAIL, &user.email)),
        }
    }

    fn require_admin(&self) -> Result<&User, AuthError> {
        match &self.session {
            Session::Admin(user) => Ok(user),
            _ => Err(AuthError::AdminRequired),
        }
    }

    fn take_pending(&mut self) -> Option<ContentItem> {
        let id = self.pending_share.take()?;
        self.content.find(&id).cloned()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn content(&self) -> &ContentRepository {
        &self.content
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn social_links(&self) -> &SocialLinks {
        &self.social_links
    }

    pub fn admin_profile(&self) -> &User {
        &self.admin_profile
    }

    pub fn store_usage(&self) -> (usize, usize) {
        (self.store.used_bytes(), self.store.quota_bytes())
    }

    // ------------------------------------------------------------------
    // Auth gate
    // ------------------------------------------------------------------

    pub fn login(
        &mut self,
        profile_id: &str,
        password: &str,
    ) -> Result<Outcome<SignedIn>, PortfolioError> {
        auth::check_login(&self.admin_profile, &self.admin_password, profile_id, password)
            .inspect_err(|_| tracing::warn!(profile_id = %profile_id, "admin login rejected"))?;

        self.session = Session::Admin(self.admin_profile.clone());
        let persisted = self.persist_session();
        tracing::info!(profile_id = %profile_id, "admin logged in");

        let signed_in = SignedIn {
            user: self.admin_profile.clone(),
            pending_item: self.take_pending(),
        };
        Ok(Outcome::new(signed_in, persisted))
    }

    pub fn logout(&mut self) -> Persisted {
        tracing::info!(session = self.session.kind(), "logged out");
        self.session = Session::Anonymous;
        self.pending_share = None;
        self.persist_session()
    }

    /// Reset the secret to the default when id and notification email match.
    pub fn forgot_password(
        &mut self,
        profile_id: &str,
        notification_email: &str,
    ) -> Result<Persisted, PortfolioError> {
        auth::check_reset(&self.admin_profile, profile_id, notification_email)?;
        self.admin_password = DEFAULT_ADMIN_PASSWORD.to_string();
        tracing::warn!(profile_id = %profile_id, "admin password reset to default");
        Ok(self.write(keys::ADMIN_PASSWORD, DEFAULT_ADMIN_PASSWORD))
    }

    pub fn change_password(
        &mut self,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<Persisted, PortfolioError> {
        self.require_admin()?;
        auth::check_password_change(&self.admin_password, current, new, confirm)?;
        self.admin_password = new.to_string();
        tracing::info!("admin password changed");
        Ok(self.write(keys::ADMIN_PASSWORD, new))
    }

    /// Update the admin profile. The login id is read-only.
    pub fn update_profile(
        &mut self,
        update: ProfileUpdate,
        avatar: Option<String>,
    ) -> Result<Outcome<User>, PortfolioError> {
        self.require_admin()?;
        let mut profile = self.admin_profile.clone();
        profile.username = update.username;
        profile.email = update.email;
        profile.notification_email = update.notification_email;
        if let Some(avatar) = avatar {
            profile.avatar = avatar;
        }
        self.admin_profile = profile.clone();
        self.session = Session::Admin(profile.clone());
        let persisted = self.write_json(keys::USER_PROFILE, &profile);
        Ok(Outcome::new(profile, persisted))
    }

    pub fn update_avatar(&mut self, avatar: String) -> Result<Outcome<User>, PortfolioError> {
        let profile = self.require_admin()?.clone();
        self.update_profile(
            ProfileUpdate {
                username: profile.username,
                email: profile.email,
                notification_email: profile.notification_email,
            },
            Some(avatar),
        )
    }

    /// Email-only gate for readers.
    pub fn enter_reader_gate(&mut self, email: &str) -> Result<Outcome<SignedIn>, PortfolioError> {
        let user = auth::check_reader_email(email)?;
        self.session = Session::Reader(user.clone());
        let persisted = self.persist_session();
        tracing::info!(email = %user.email, "reader passed gate");

        let signed_in = SignedIn {
            user,
            pending_item: self.take_pending(),
        };
        Ok(Outcome::new(signed_in, persisted))
    }

    // ------------------------------------------------------------------
    // Content lifecycle
    // ------------------------------------------------------------------

    pub fn add_content(&mut self, item: ContentItem) -> Result<Outcome<ContentItem>, PortfolioError> {
        self.require_admin()?;
        let content_type = self.content.add(item.clone());
        let persisted = self.persist_bucket(content_type);
        tracing::info!(id = %item.id, content_type = %content_type, "content added");
        Ok(Outcome::new(item, persisted))
    }

    pub fn delete_content(
        &mut self,
        id: &str,
        content_type: ContentType,
        confirmation: Confirmation,
    ) -> Result<Outcome<DeleteOutcome>, PortfolioError> {
        self.require_admin()?;
        let outcome = self.content.delete(id, content_type, confirmation);
        let persisted = match &outcome {
            DeleteOutcome::Removed(_) => {
                tracing::info!(id = %id, content_type = %content_type, "content deleted");
                self.persist_bucket(content_type)
            }
            _ => Persisted::Saved,
        };
        Ok(Outcome::new(outcome, persisted))
    }

    pub fn restore_all(
        &mut self,
        bundle: ContentBundle,
        confirmation: Confirmation,
    ) -> Result<Outcome<RestoreOutcome>, PortfolioError> {
        self.require_admin()?;
        if confirmation == Confirmation::Declined {
            return Ok(Outcome::new(RestoreOutcome::Declined, Persisted::Saved));
        }
        self.content.restore_all(bundle);
        let persisted = ContentType::ALL
            .into_iter()
            .fold(Persisted::Saved, |acc, ty| acc.and(self.persist_bucket(ty)));
        tracing::info!(items = self.content.len(), "content restored from backup");
        Ok(Outcome::new(RestoreOutcome::Restored, persisted))
    }

    /// Parse raw backup text, then restore. Malformed input leaves state untouched.
    pub fn restore_from_text(
        &mut self,
        text: &str,
        confirmation: Confirmation,
    ) -> Result<Outcome<RestoreOutcome>, PortfolioError> {
        self.require_admin()?;
        let bundle = content::parse_backup(text)?;
        self.restore_all(bundle, confirmation)
    }

    pub fn export_all(&self) -> Result<Backup, PortfolioError> {
        self.require_admin()?;
        Ok(content::export_backup(&self.content.export_all())?)
    }

    // ------------------------------------------------------------------
    // Comments & settings
    // ------------------------------------------------------------------

    pub fn add_comment(&mut self, text: &str) -> Result<Outcome<Comment>, PortfolioError> {
        let user = self.session.user().ok_or(AuthError::LoginRequired)?;
        let comment = comments::new_comment(user, text)?;
        self.comments.insert(0, comment.clone());
        let persisted = self.write_json(keys::COMMENTS, &self.comments.clone());
        Ok(Outcome::new(comment, persisted))
    }

    pub fn update_social_links(
        &mut self,
        links: SocialLinks,
    ) -> Result<Outcome<SocialLinks>, PortfolioError> {
        self.require_admin()?;
        self.social_links = links.clone();
        let persisted = self.write_json(keys::SOCIAL_LINKS, &links);
        Ok(Outcome::new(links, persisted))
    }

    // ------------------------------------------------------------------
    // Share links
    // ------------------------------------------------------------------

    pub fn share_url(&self, id: &str) -> Option<String> {
        self.content
            .find(id)
            .map(|item| share::share_url(&self.site_url, &item.id))
    }

    /// Open a `#content/<id>` fragment, or remember it until the gate is passed.
    pub fn resolve_share(&mut self, fragment: &str) -> ShareResolution {
        let Some(link) = ShareLink::parse(fragment) else {
            return ShareResolution::NotFound;
        };
        let Some(item) = self.content.find(&link.id).cloned() else {
            return ShareResolution::NotFound;
        };
        if self.session.is_authenticated() {
            ShareResolution::Open(item)
        } else {
            self.pending_share = Some(item.id.clone());
            ShareResolution::GateFirst(item.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn config() -> SiteConfig {
        SiteConfig {
            site_url: "https://author.site".to_string(),
            admin_profile: User {
                id: "author_admin".to_string(),
                email: "author@example.com".to_string(),
                notification_email: "alerts@example.com".to_string(),
                username: "The Author".to_string(),
                avatar: String::new(),
            },
        }
    }

    fn item(id: &str, content_type: ContentType) -> ContentItem {
        ContentItem {
            id: id.to_string(),
            content_type,
            title: "Signal".to_string(),
            tagline: Some("Listen".to_string()),
            description: "A story about radio".to_string(),
            cover_image: crate::ingest::encode_data_url(&[0x89, 0x50, 0x4E, 0x47, 1, 2, 3], "image/png"),
            tags: vec!["radio".to_string(), "night".to_string()],
            content_file_name: Some("signal.pdf".to_string()),
            content_file_url: Some(crate::ingest::encode_data_url(b"%PDF-1.4", "application/pdf")),
        }
    }

    fn admin(store: Box<dyn LocalStore>) -> Portfolio {
        let mut app = Portfolio::load(store, config());
        let outcome = app.login("author_admin", DEFAULT_ADMIN_PASSWORD).unwrap();
        assert!(outcome.persisted.is_saved());
        app
    }

    /// Move the store out of a portfolio so it can be reloaded.
    fn reload(app: Portfolio) -> Portfolio {
        Portfolio::load(app.store, config())
    }

    #[test]
    fn test_add_survives_reload_with_identical_embedded_data() {
        let mut app = admin(Box::new(MemoryStore::new()));
        let original = item("story-1", ContentType::Story);
        let outcome = app.add_content(original.clone()).unwrap();
        assert!(outcome.persisted.is_saved());

        let app = reload(app);
        let loaded = app.content().find("story-1").unwrap();
        assert_eq!(loaded, &original);
        assert_eq!(loaded.cover_image.as_bytes(), original.cover_image.as_bytes());
        assert!(app.session().is_admin());
    }

    #[test]
    fn test_non_admin_cannot_mutate_content() {
        let mut app = Portfolio::load(Box::new(MemoryStore::new()), config());
        let result = app.add_content(item("story-1", ContentType::Story));
        assert!(matches!(
            result,
            Err(PortfolioError::Auth(AuthError::AdminRequired))
        ));
        assert!(app.content().is_empty());
    }

    #[test]
    fn test_quota_failure_keeps_memory_and_warns() {
        let mut app = admin(Box::new(MemoryStore::with_quota(512)));
        let mut big = item("story-big", ContentType::Story);
        big.cover_image = crate::ingest::encode_data_url(&vec![7u8; 4096], "image/png");

        let outcome = app.add_content(big).unwrap();
        assert!(!outcome.persisted.is_saved());
        assert!(outcome.persisted.warning().unwrap().contains("Storage is full"));
        assert!(app.content().find("story-big").is_some());

        let app = reload(app);
        assert!(app.content().find("story-big").is_none());
    }

    #[test]
    fn test_delete_missing_and_declined_are_no_ops() {
        let mut app = admin(Box::new(MemoryStore::new()));
        app.add_content(item("a", ContentType::Article)).unwrap();
        let before = app.content().clone();

        let outcome = app
            .delete_content("nope", ContentType::Article, Confirmation::Confirmed)
            .unwrap();
        assert_eq!(outcome.value, DeleteOutcome::NotFound);
        let outcome = app
            .delete_content("a", ContentType::Article, Confirmation::Declined)
            .unwrap();
        assert_eq!(outcome.value, DeleteOutcome::Declined);
        assert_eq!(app.content(), &before);

        app.delete_content("a", ContentType::Article, Confirmation::Confirmed)
            .unwrap();
        let app = reload(app);
        assert!(app.content().is_empty());
    }

    #[test]
    fn test_restore_then_export_matches_and_persists() {
        let mut app = admin(Box::new(MemoryStore::new()));
        app.add_content(item("old", ContentType::Story)).unwrap();
        let bundle = ContentBundle {
            stories: vec![],
            documentaries: vec![item("documentary-1", ContentType::Documentary)],
            articles: vec![],
        };
        let outcome = app
            .restore_all(bundle.clone(), Confirmation::Confirmed)
            .unwrap();
        assert_eq!(outcome.value, RestoreOutcome::Restored);

        let backup = app.export_all().unwrap();
        assert_eq!(content::parse_backup(&backup.body).unwrap(), bundle);

        let app = reload(app);
        assert_eq!(app.content().export_all(), bundle);
    }

    #[test]
    fn test_malformed_restore_leaves_state_untouched() {
        let mut app = admin(Box::new(MemoryStore::new()));
        app.add_content(item("keep", ContentType::Story)).unwrap();
        let result = app.restore_from_text(r#"{"stories": []}"#, Confirmation::Confirmed);
        assert!(matches!(
            result,
            Err(PortfolioError::Backup(BackupError::InvalidFormat))
        ));
        assert!(app.content().find("keep").is_some());
    }

    #[test]
    fn test_login_fails_on_any_mismatch() {
        let mut app = Portfolio::load(Box::new(MemoryStore::new()), config());
        assert!(app.login("author_admin", "wrong").is_err());
        assert!(app.login("someone", DEFAULT_ADMIN_PASSWORD).is_err());
        assert!(!app.session().is_authenticated());
    }

    #[test]
    fn test_password_change_then_reset_to_default() {
        let mut app = admin(Box::new(MemoryStore::new()));
        let persisted = app
            .change_password(DEFAULT_ADMIN_PASSWORD, "new-secret-1", "new-secret-1")
            .unwrap();
        assert!(persisted.is_saved());
        let _ = app.logout();

        let mut app = reload(app);
        assert!(app.login("author_admin", DEFAULT_ADMIN_PASSWORD).is_err());
        assert!(app.login("author_admin", "new-secret-1").is_ok());
        let _ = app.logout();

        assert!(app.forgot_password("author_admin", "author@example.com").is_err());
        let persisted = app
            .forgot_password("author_admin", "alerts@example.com")
            .unwrap();
        assert!(persisted.is_saved());
        let mut app = reload(app);
        assert!(app.login("author_admin", DEFAULT_ADMIN_PASSWORD).is_ok());
    }

    #[test]
    fn test_profile_update_keeps_id_and_is_used_for_reset() {
        let mut app = admin(Box::new(MemoryStore::new()));
        app.update_profile(
            ProfileUpdate {
                username: "Pen Name".to_string(),
                email: "pen@example.com".to_string(),
                notification_email: "pen-alerts@example.com".to_string(),
            },
            Some("data:image/png;base64,AA==".to_string()),
        )
        .unwrap();
        let _ = app.logout();

        let mut app = reload(app);
        assert_eq!(app.admin_profile().id, "author_admin");
        assert_eq!(app.admin_profile().username, "Pen Name");
        assert!(app
            .forgot_password("author_admin", "pen-alerts@example.com")
            .is_ok());
    }

    #[test]
    fn test_reader_session_comments_and_reload() {
        let mut app = Portfolio::load(Box::new(MemoryStore::new()), config());
        assert!(matches!(
            app.add_comment("hi"),
            Err(PortfolioError::Auth(AuthError::LoginRequired))
        ));
        assert!(app.enter_reader_gate("not-an-email").is_err());

        app.enter_reader_gate("fan@read.er").unwrap();
        app.add_comment("first").unwrap();
        app.add_comment("second").unwrap();

        let app = reload(app);
        assert_eq!(app.session().kind(), "reader");
        let texts: Vec<_> = app.comments().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["second", "first"]);
        assert_eq!(app.comments()[0].user.email, "fan@read.er");
    }

    #[test]
    fn test_logout_clears_persisted_session() {
        let mut app = Portfolio::load(Box::new(MemoryStore::new()), config());
        app.enter_reader_gate("fan@read.er").unwrap();
        assert!(app.logout().is_saved());
        let app = reload(app);
        assert_eq!(app.session(), &Session::Anonymous);
    }

    #[test]
    fn test_share_gates_anonymous_then_opens_after_gate() {
        let mut app = admin(Box::new(MemoryStore::new()));
        app.add_content(item("story-7", ContentType::Story)).unwrap();
        assert_eq!(
            app.share_url("story-7").as_deref(),
            Some("https://author.site/#content/story-7")
        );
        let _ = app.logout();

        assert_eq!(
            app.resolve_share("#content/story-7"),
            ShareResolution::GateFirst("story-7".to_string())
        );
        assert_eq!(app.resolve_share("#content/missing"), ShareResolution::NotFound);

        let signed_in = app.enter_reader_gate("a@b.co").unwrap().value;
        assert_eq!(signed_in.pending_item.map(|i| i.id), Some("story-7".to_string()));
        assert!(matches!(
            app.resolve_share("#content/story-7"),
            ShareResolution::Open(_)
        ));
    }

    #[test]
    fn test_social_links_overwrite() {
        let mut app = admin(Box::new(MemoryStore::new()));
        let links = SocialLinks {
            youtube: "https://youtube.com/@author".to_string(),
            ..SocialLinks::default()
        };
        app.update_social_links(links.clone()).unwrap();
        let app = reload(app);
        assert_eq!(app.social_links(), &links);
    }

    #[test]
    fn test_corrupt_persisted_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::STORIES, "{not json").unwrap();
        store.set(keys::SOCIAL_LINKS, "42").unwrap();
        let app = Portfolio::load(Box::new(store), config());
        assert!(app.content().is_empty());
        assert_eq!(app.social_links(), &SocialLinks::default());
    }

    #[test]
    fn test_file_store_state_survives_restart() {
        use crate::store::{FileStore, DEFAULT_QUOTA_BYTES};

        let dir = tempfile::TempDir::new().unwrap();
        let original = item("documentary-1", ContentType::Documentary);
        {
            let store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
            let mut app = admin(Box::new(store));
            assert!(app.add_content(original.clone()).unwrap().persisted.is_saved());
            let persisted = app
                .change_password(DEFAULT_ADMIN_PASSWORD, "longer-secret", "longer-secret")
                .unwrap();
            assert!(persisted.is_saved());
        }

        let store = FileStore::open(dir.path(), DEFAULT_QUOTA_BYTES).unwrap();
        let mut app = Portfolio::load(Box::new(store), config());
        assert_eq!(app.content().find("documentary-1"), Some(&original));
        assert!(app.session().is_admin());

        assert!(app.logout().is_saved());
        assert!(app.login("author_admin", DEFAULT_ADMIN_PASSWORD).is_err());
        assert!(app.login("author_admin", "longer-secret").is_ok());
    }

    #[tokio::test]
    async fn test_avatar_file_is_embedded_into_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]).unwrap();

        let mut site = config();
        site.embed_avatar_file(&path).await.unwrap();
        assert!(site.admin_profile.avatar.starts_with("data:image/png;base64,"));

        let missing = site.embed_avatar_file(dir.path().join("gone.png")).await;
        assert!(matches!(missing, Err(IngestError::Read { .. })));
        assert!(site.admin_profile.avatar.starts_with("data:image/png;base64,"));
    }
}

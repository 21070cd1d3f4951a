//! Client library for the TechExactly blog API.
//!
//! Wraps the REST backend (auth, posts, nested comments, admin surface)
//! behind typed operations, with an explicit session object persisted
//! through a swappable [`SessionStore`] and centralized route guards.

pub mod error;
pub mod feed;
pub mod guard;
pub mod http;
pub mod models;
pub mod session;

pub use error::BlogApiError;
pub use feed::{CommentThread, PostFeed, DEFAULT_PAGE_LIMIT};
pub use guard::{AccessPolicy, GuardOutcome};
pub use session::{FileStore, MemoryStore, Session, SessionStore};

use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use models::{
    AuthData, Comment, CreateCommentRequest, CreatePostRequest, DashboardStats, LoginRequest,
    Post, RegisterRequest, UpdateCommentRequest, UpdatePostRequest, User,
};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Base URL used when neither the environment nor the caller supplies one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Environment variable consulted by [`base_url_from_env`].
pub const BASE_URL_ENV: &str = "TECHBLOG_API_URL";

pub fn base_url_from_env() -> String {
    dotenvy::dotenv().ok();
    std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

/// High-level blog client: one HTTP transport plus one session.
///
/// The session is read from the store once at construction and from then on
/// owned by this object; login/register/logout are the only writers. A 401
/// from any authenticated call drops both the in-memory and the persisted
/// session.
#[derive(Clone)]
pub struct BlogClient {
    http: http::HttpClient,
    store: Arc<dyn SessionStore>,
    session: Arc<Mutex<Option<Session>>>,
}

impl BlogClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        let http = http::HttpClient::new(base_url);

        // Restore the persisted session, if any.
        let restored = store.load();
        if let Some(session) = &restored {
            tracing::debug!(user = %session.user.name, "Session restored");
            http.set_token(session.token.clone());
        } else {
            tracing::debug!("No session found");
        }

        Self {
            http,
            store,
            session: Arc::new(Mutex::new(restored)),
        }
    }

    pub fn from_env(store: Arc<dyn SessionStore>) -> Self {
        Self::new(base_url_from_env(), store)
    }

    // ==================== Сессия ====================

    pub fn session(&self) -> Option<Session> {
        self.session.lock().ok()?.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.session().map(|s| s.is_admin()).unwrap_or(false)
    }

    /// Evaluate the centralized guard for a route path.
    pub fn check_route(&self, path: &str) -> GuardOutcome {
        self.authorize(guard::policy_for_route(path))
    }

    /// Evaluate an access policy against the current session.
    pub fn authorize(&self, policy: AccessPolicy) -> GuardOutcome {
        guard::evaluate(policy, self.session().as_ref())
    }

    /// Clear the session everywhere: store, token, memory.
    pub fn logout(&self) {
        tracing::debug!("Logging out");
        self.store.clear();
        self.http.clear_token();
        if let Ok(mut slot) = self.session.lock() {
            *slot = None;
        }
    }

    fn install_session(&self, auth: AuthData) -> Result<User, BlogApiError> {
        let token = auth
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(BlogApiError::MissingToken)?;

        let session = Session {
            user: auth.user.clone(),
            token: token.clone(),
        };
        self.store.save(&session)?;
        self.http.set_token(token);
        if let Ok(mut slot) = self.session.lock() {
            *slot = Some(session);
        }

        tracing::debug!(user = %auth.user.name, "Session established");
        Ok(auth.user)
    }

    /// The backend rejected our token; the session is gone, reflect that.
    fn forget_dead_session<T>(
        &self,
        result: Result<T, BlogApiError>,
    ) -> Result<T, BlogApiError> {
        if matches!(&result, Err(e) if e.is_unauthorized()) {
            tracing::debug!("Received 401, clearing session");
            self.store.clear();
            if let Ok(mut slot) = self.session.lock() {
                *slot = None;
            }
        }
        result
    }

    // ==================== Аутентификация ====================

    /// Log in and establish a session. Fails with [`BlogApiError::MissingToken`]
    /// if the response carries no access token; nothing is persisted then.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<User, BlogApiError> {
        let req = LoginRequest {
            email: normalize_email(email.into()),
            password: password.into(),
        };
        let auth = self.http.login(&req).await?;
        self.install_session(auth)
    }

    /// Register a new account. Form-level validation runs before any network
    /// traffic; a token-bearing response establishes a session like login.
    pub async fn register(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<User, BlogApiError> {
        let name = name.into().trim().to_string();
        let email = normalize_email(email.into());
        let password = password.into().trim().to_string();

        validate_registration(&name, &email, &password)?;

        let req = RegisterRequest {
            name,
            email,
            password,
        };
        let auth = self.http.register(&req).await?;
        self.install_session(auth)
    }

    // ==================== Посты ====================

    pub async fn list_posts(&self, page: i64, limit: i64) -> Result<PostFeed, BlogApiError> {
        let result = self.http.list_posts(page, limit).await;
        let page_data = self.forget_dead_session(result)?;
        Ok(PostFeed::new(page_data.posts, page_data.total, page, limit))
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, BlogApiError> {
        let result = self.http.get_post(id).await;
        self.forget_dead_session(result)
    }

    pub async fn create_post(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Post, BlogApiError> {
        let req = CreatePostRequest {
            title: title.into(),
            content: content.into(),
        };
        let result = self.http.create_post(&req).await;
        self.forget_dead_session(result)
    }

    pub async fn update_post(
        &self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<Post, BlogApiError> {
        let req = UpdatePostRequest { title, content };
        let result = self.http.update_post(id, &req).await;
        self.forget_dead_session(result)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), BlogApiError> {
        let result = self.http.delete_post(id).await;
        self.forget_dead_session(result)
    }

    // ==================== Комментарии ====================

    /// Comments for a post, newest first.
    pub async fn comments_for_post(&self, post_id: &str) -> Result<CommentThread, BlogApiError> {
        let result = self.http.comments_for_post(post_id).await;
        let comments = self.forget_dead_session(result)?;
        Ok(CommentThread::from_unsorted(comments))
    }

    pub async fn add_comment(
        &self,
        post_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Comment, BlogApiError> {
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(BlogApiError::InvalidRequest(
                "Comment content is required".into(),
            ));
        }

        let req = CreateCommentRequest {
            post_id: post_id.into(),
            content,
        };
        let result = self.http.create_comment(&req).await;
        self.forget_dead_session(result)
    }

    pub async fn update_comment(
        &self,
        id: &str,
        content: impl Into<String>,
    ) -> Result<Comment, BlogApiError> {
        let content = content.into().trim().to_string();
        if content.is_empty() {
            return Err(BlogApiError::InvalidRequest(
                "Comment content is required".into(),
            ));
        }

        let req = UpdateCommentRequest { content };
        let result = self.http.update_comment(id, &req).await;
        self.forget_dead_session(result)
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), BlogApiError> {
        let result = self.http.delete_comment(id).await;
        self.forget_dead_session(result)
    }

    // ==================== Админ-операции ====================

    pub async fn dashboard(&self) -> Result<DashboardStats, BlogApiError> {
        let result = self.http.admin_dashboard().await;
        self.forget_dead_session(result)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, BlogApiError> {
        let result = self.http.admin_users().await;
        self.forget_dead_session(result)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), BlogApiError> {
        let result = self.http.admin_delete_user(id).await;
        self.forget_dead_session(result)
    }

    pub async fn list_all_comments(&self) -> Result<Vec<Comment>, BlogApiError> {
        let result = self.http.admin_comments().await;
        self.forget_dead_session(result)
    }

    pub async fn admin_delete_comment(&self, id: &str) -> Result<(), BlogApiError> {
        let result = self.http.admin_delete_comment(id).await;
        self.forget_dead_session(result)
    }

    pub async fn admin_delete_post(&self, id: &str) -> Result<(), BlogApiError> {
        let result = self.http.admin_delete_post(id).await;
        self.forget_dead_session(result)
    }
}

// ==================== Отмена запросов ====================

/// Handle/registration pair for cancelling an in-flight fetch, typically
/// tied to the lifetime of whatever issued it.
pub fn abort_pair() -> (AbortHandle, AbortRegistration) {
    AbortHandle::new_pair()
}

/// Run a fetch that can be cancelled through its [`AbortHandle`]. A
/// cancelled fetch yields the named [`BlogApiError::Cancelled`] so callers
/// can swallow it and discard the result.
pub async fn cancellable<T, F>(
    fut: F,
    registration: AbortRegistration,
) -> Result<T, BlogApiError>
where
    F: Future<Output = Result<T, BlogApiError>>,
{
    match Abortable::new(fut, registration).await {
        Ok(result) => result,
        Err(Aborted) => Err(BlogApiError::Cancelled),
    }
}

// ==================== Валидация форм ====================

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), BlogApiError> {
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(BlogApiError::InvalidRequest("All fields are required".into()));
    }
    if name.chars().count() < 3 {
        return Err(BlogApiError::InvalidRequest(
            "Name must be at least 3 characters".into(),
        ));
    }
    if !email.contains('@') {
        return Err(BlogApiError::InvalidRequest(
            "Enter a valid email address".into(),
        ));
    }
    if password.chars().count() < 6 {
        return Err(BlogApiError::InvalidRequest(
            "Password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_validation_rules() {
        assert!(validate_registration("Alice", "alice@example.com", "secret1").is_ok());

        let cases = [
            ("", "alice@example.com", "secret1", "All fields are required"),
            ("Al", "alice@example.com", "secret1", "Name must be at least 3 characters"),
            ("Alice", "not-an-email", "secret1", "Enter a valid email address"),
            ("Alice", "alice@example.com", "short", "Password must be at least 6 characters"),
        ];

        for (name, email, password, expected) in cases {
            match validate_registration(name, email, password) {
                Err(BlogApiError::InvalidRequest(msg)) => assert_eq!(msg, expected),
                other => panic!("expected InvalidRequest, got {:?}", other.err()),
            }
        }
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ".into()),
            "alice@example.com"
        );
    }

    #[tokio::test]
    async fn cancelled_fetch_yields_named_error() {
        let (handle, registration) = abort_pair();
        handle.abort();

        let err = cancellable(
            async { Ok::<_, BlogApiError>("never observed") },
            registration,
        )
        .await
        .unwrap_err();
        assert!(err.is_cancelled());
    }
}

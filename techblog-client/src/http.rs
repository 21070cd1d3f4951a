use crate::error::BlogApiError;
use crate::models::{
    AuthData, Comment, CreateCommentRequest, CreatePostRequest, DashboardStats, Envelope,
    LoginRequest, Post, PostPage, RegisterRequest, UpdateCommentRequest, UpdatePostRequest, User,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HTTP transport for the blog API: prepends the base URL, attaches the
/// bearer token, and unwraps the `{success, data, message}` envelope.
///
/// The token lives in a shared cell so clones of the client observe
/// login/logout immediately, and a 401 clears it for every clone at once.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Arc<Mutex<Option<String>>>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            token: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_token(&self, token: String) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = Some(token);
        }
    }

    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = None;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().ok()?.clone()
    }

    fn add_auth_header(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BlogApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.error_from(status, response).await);
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(BlogApiError::Api(
                envelope.message.unwrap_or_else(|| "Request failed".into()),
            ));
        }

        envelope
            .data
            .ok_or_else(|| BlogApiError::Api("Response envelope missing data".into()))
    }

    /// Like [`execute`], but an absent `data` payload decodes to the default
    /// value. List endpoints sometimes omit it.
    async fn execute_or_default<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BlogApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.error_from(status, response).await);
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.success {
            return Err(BlogApiError::Api(
                envelope.message.unwrap_or_else(|| "Request failed".into()),
            ));
        }

        Ok(envelope.data.unwrap_or_default())
    }

    /// For deletes: the envelope carries no `data`, only `success`.
    async fn execute_no_data(&self, request: RequestBuilder) -> Result<(), BlogApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(self.error_from(status, response).await);
        }

        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if !envelope.success {
            return Err(BlogApiError::Api(
                envelope.message.unwrap_or_else(|| "Request failed".into()),
            ));
        }
        Ok(())
    }

    async fn error_from(&self, status: StatusCode, response: reqwest::Response) -> BlogApiError {
        let message = backend_message(response).await;
        tracing::debug!(%status, %message, "API call failed");

        match status {
            StatusCode::UNAUTHORIZED => {
                // The session token is dead; drop it so later calls do not
                // keep replaying it.
                self.clear_token();
                BlogApiError::Unauthorized(message)
            }
            StatusCode::FORBIDDEN => BlogApiError::Forbidden(message),
            StatusCode::NOT_FOUND => BlogApiError::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                BlogApiError::InvalidRequest(message)
            }
            _ => BlogApiError::Api(format!("HTTP {}: {}", status, message)),
        }
    }

    // ==================== Аутентификация ====================

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthData, BlogApiError> {
        tracing::debug!(email = %req.email, "Sending login request");
        let url = self.url("/auth/login");
        self.execute(self.client.post(&url).json(req)).await
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthData, BlogApiError> {
        tracing::debug!(email = %req.email, "Sending register request");
        let url = self.url("/auth/register");
        self.execute(self.client.post(&url).json(req)).await
    }

    // ==================== Посты ====================

    pub async fn list_posts(&self, page: i64, limit: i64) -> Result<PostPage, BlogApiError> {
        let url = self.url("/posts");
        let request = self
            .add_auth_header(self.client.get(&url))
            .query(&[("page", page), ("limit", limit)]);
        self.execute(request).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, BlogApiError> {
        let url = self.url(&format!("/posts/{}", id));
        self.execute(self.add_auth_header(self.client.get(&url))).await
    }

    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<Post, BlogApiError> {
        let url = self.url("/posts");
        self.execute(self.add_auth_header(self.client.post(&url)).json(req))
            .await
    }

    pub async fn update_post(
        &self,
        id: &str,
        req: &UpdatePostRequest,
    ) -> Result<Post, BlogApiError> {
        let url = self.url(&format!("/posts/{}", id));
        self.execute(self.add_auth_header(self.client.put(&url)).json(req))
            .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), BlogApiError> {
        let url = self.url(&format!("/posts/{}", id));
        self.execute_no_data(self.add_auth_header(self.client.delete(&url)))
            .await
    }

    // ==================== Комментарии ====================

    pub async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, BlogApiError> {
        let url = self.url(&format!("/comments/post/{}", post_id));
        self.execute_or_default(self.add_auth_header(self.client.get(&url)))
            .await
    }

    pub async fn create_comment(&self, req: &CreateCommentRequest) -> Result<Comment, BlogApiError> {
        let url = self.url("/comments");
        self.execute(self.add_auth_header(self.client.post(&url)).json(req))
            .await
    }

    pub async fn update_comment(
        &self,
        id: &str,
        req: &UpdateCommentRequest,
    ) -> Result<Comment, BlogApiError> {
        let url = self.url(&format!("/comments/{}", id));
        self.execute(self.add_auth_header(self.client.put(&url)).json(req))
            .await
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), BlogApiError> {
        let url = self.url(&format!("/comments/{}", id));
        self.execute_no_data(self.add_auth_header(self.client.delete(&url)))
            .await
    }

    // ==================== Админ-операции ====================

    pub async fn admin_dashboard(&self) -> Result<DashboardStats, BlogApiError> {
        let url = self.url("/admin/dashboard");
        self.execute(self.add_auth_header(self.client.get(&url))).await
    }

    pub async fn admin_users(&self) -> Result<Vec<User>, BlogApiError> {
        let url = self.url("/admin/users");
        self.execute_or_default(self.add_auth_header(self.client.get(&url)))
            .await
    }

    pub async fn admin_delete_user(&self, id: &str) -> Result<(), BlogApiError> {
        let url = self.url(&format!("/admin/users/{}", id));
        self.execute_no_data(self.add_auth_header(self.client.delete(&url)))
            .await
    }

    pub async fn admin_comments(&self) -> Result<Vec<Comment>, BlogApiError> {
        let url = self.url("/admin/comments");
        self.execute_or_default(self.add_auth_header(self.client.get(&url)))
            .await
    }

    pub async fn admin_delete_comment(&self, id: &str) -> Result<(), BlogApiError> {
        let url = self.url(&format!("/admin/comments/{}", id));
        self.execute_no_data(self.add_auth_header(self.client.delete(&url)))
            .await
    }

    pub async fn admin_delete_post(&self, id: &str) -> Result<(), BlogApiError> {
        let url = self.url(&format!("/admin/posts/{}", id));
        self.execute_no_data(self.add_auth_header(self.client.delete(&url)))
            .await
    }
}

async fn backend_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<Envelope<serde_json::Value>>(&text)
        .ok()
        .and_then(|env| env.message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                "Request failed".into()
            } else {
                text
            }
        })
}

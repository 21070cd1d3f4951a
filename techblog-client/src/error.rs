use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogApiError {
    // HTTP ошибки
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Бизнес-логика ошибки
    #[error("Resource not found")]
    NotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Access token missing from login response")]
    MissingToken,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Отменённые запросы
    #[error("Request cancelled")]
    Cancelled,

    // Ошибки конверта {success, data, message}
    #[error("API error: {0}")]
    Api(String),

    // Ошибки хранилища сессии
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    // Ошибки сериализации/десериализации
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BlogApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogApiError::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BlogApiError::Unauthorized(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BlogApiError::Cancelled)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Конверт ответа ====================

/// Uniform response shape returned by the backend: `{ success, data, message }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

// ==================== Модели пользователей ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Login/register response payload. The refresh token is delivered by the
/// backend but not used by this client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub user: User,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ==================== Модели постов ====================

/// Populated author/user subdocument on posts and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<Author>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Post {
    pub fn author_name(&self) -> &str {
        self.author.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// `data` payload of `GET /posts?page&limit`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: i64,
}

// ==================== Модели комментариев ====================

/// The `post` field of a comment is a bare id on regular listings and a
/// populated `{_id, title}` summary on the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostRef {
    Id(String),
    Summary {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        title: Option<String>,
    },
}

impl PostRef {
    pub fn id(&self) -> &str {
        match self {
            PostRef::Id(id) => id,
            PostRef::Summary { id, .. } => id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            PostRef::Id(_) => None,
            PostRef::Summary { title, .. } => title.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub user: Option<Author>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub post: Option<PostRef>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// The regular listings populate `user`, the admin listing `author`.
    pub fn author_name(&self) -> &str {
        self.user
            .as_ref()
            .or(self.author.as_ref())
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    }

    /// Edit/delete gating: the comment's owner or an admin. A comment with
    /// no author subdocument is only modifiable by admins.
    pub fn can_modify(&self, user: &User) -> bool {
        if user.role.is_admin() {
            return true;
        }
        self.user
            .as_ref()
            .or(self.author.as_ref())
            .map(|a| a.id == user.id)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

// ==================== Админ-модели ====================

/// `data` payload of `GET /admin/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub users: i64,
    #[serde(default)]
    pub posts: i64,
    #[serde(default)]
    pub comments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_accepts_mongo_style_id() {
        let json = r#"{"_id":"u1","name":"Alice","email":"alice@example.com","role":"ADMIN"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "u1");
        assert!(user.role.is_admin());
    }

    #[test]
    fn post_decodes_camel_case_fields() {
        let json = r#"{
            "_id": "p1",
            "title": "Hello",
            "content": "World",
            "author": {"_id": "u1", "name": "Alice"},
            "createdAt": "2024-03-01T10:00:00.000Z",
            "isDeleted": false
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, "p1");
        assert_eq!(post.author_name(), "Alice");
        assert!(!post.is_deleted);
    }

    #[test]
    fn comment_post_ref_accepts_id_and_summary() {
        let bare: Comment = serde_json::from_str(
            r#"{"_id":"c1","content":"hi","post":"p1","createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(bare.post.as_ref().unwrap().id(), "p1");
        assert_eq!(bare.post.as_ref().unwrap().title(), None);

        let populated: Comment = serde_json::from_str(
            r#"{"_id":"c2","content":"hi","post":{"_id":"p1","title":"Hello"},"createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(populated.post.as_ref().unwrap().title(), Some("Hello"));
    }

    #[test]
    fn envelope_tolerates_missing_fields() {
        let env: Envelope<Vec<User>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert!(env.message.is_none());
    }

    #[test]
    fn comment_modify_gating_is_owner_or_admin() {
        let comment: Comment = serde_json::from_str(
            r#"{"_id":"c1","content":"hi","user":{"_id":"u1","name":"Alice"},"createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();

        let owner = User {
            id: "u1".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            role: Role::User,
        };
        let stranger = User {
            id: "u2".into(),
            name: "Bob".into(),
            email: "bob@example.com".into(),
            role: Role::User,
        };
        let admin = User {
            id: "u3".into(),
            name: "Root".into(),
            email: "root@example.com".into(),
            role: Role::Admin,
        };

        assert!(comment.can_modify(&owner));
        assert!(!comment.can_modify(&stranger));
        assert!(comment.can_modify(&admin));

        // No author subdocument: admin only.
        let orphan: Comment = serde_json::from_str(
            r#"{"_id":"c2","content":"hi","createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(!orphan.can_modify(&owner));
        assert!(orphan.can_modify(&admin));
    }

    #[test]
    fn comment_author_falls_back_between_user_and_author() {
        let admin_style: Comment = serde_json::from_str(
            r#"{"_id":"c1","content":"hi","author":{"_id":"u1","name":"Bob"},"createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(admin_style.author_name(), "Bob");

        let orphan: Comment = serde_json::from_str(
            r#"{"_id":"c2","content":"hi","createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(orphan.author_name(), "Unknown");
    }
}

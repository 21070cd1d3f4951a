//! Page-scoped list snapshots.
//!
//! A feed reflects the last successful fetch and nothing more. After a
//! delete or update the snapshot is patched locally instead of refetched.

use crate::models::{Comment, Post};

/// Posts page size used by the post list.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Sort newest first. The sort is stable, so items with equal timestamps
/// keep their fetched order.
pub fn sort_by_created_at_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

// ==================== Лента постов ====================

/// One fetched page of posts plus the pagination facts needed to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFeed {
    pub posts: Vec<Post>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl PostFeed {
    pub fn new(posts: Vec<Post>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            posts,
            total,
            page,
            limit,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            return 0;
        }
        (self.total + self.limit - 1) / self.limit
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    /// Local removal after a successful delete, keeping newest-first order.
    pub fn apply_delete(&mut self, post_id: &str) {
        self.posts.retain(|p| p.id != post_id);
        sort_by_created_at_desc(&mut self.posts);
        self.total = (self.total - 1).max(0);
    }
}

// ==================== Ветка комментариев ====================

/// Comments for one post, held newest-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn from_unsorted(mut comments: Vec<Comment>) -> Self {
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { comments }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter()
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Add a freshly created comment, keeping newest on top.
    pub fn insert(&mut self, comment: Comment) {
        self.comments.push(comment);
        self.comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    /// Replace the matching comment with its updated version.
    pub fn apply_update(&mut self, updated: Comment) {
        for c in &mut self.comments {
            if c.id == updated.id {
                *c = updated;
                break;
            }
        }
        self.comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    pub fn apply_delete(&mut self, comment_id: &str) {
        self.comments.retain(|c| c.id != comment_id);
    }

    pub fn into_inner(self) -> Vec<Comment> {
        self.comments
    }
}

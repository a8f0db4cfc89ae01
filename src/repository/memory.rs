//! In-process store implementing every repository trait.
//!
//! Mirrors the PostgreSQL semantics (unique users, soft deletes, owner-matched
//! writes, vote upserts) so tests and database-less local runs see the same
//! behaviour as production.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{CommentRepository, PostRepository, UserRepository};
use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentUpdate, NewComment},
        post::{NewPost, Post, PostUpdate},
        user::{NewUser, User},
        vote::VoteDelta,
    },
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Row<Post>>,
    post_votes: HashMap<(i64, i64), VoteDelta>,
    comments: BTreeMap<i64, Row<Comment>>,
    comment_votes: HashMap<(i64, i64), VoteDelta>,
    last_id: i64,
}

/// A stored entity plus its soft-delete marker.
struct Row<T> {
    value: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T> Row<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            deleted_at: None,
        }
    }

    fn live(&self) -> Option<&T> {
        match self.deleted_at {
            None => Some(&self.value),
            Some(_) => None,
        }
    }
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn live_post(&self, post_id: i64) -> Option<&Post> {
        self.posts.get(&post_id).and_then(Row::live)
    }

    fn live_comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.get(&comment_id).and_then(Row::live)
    }
}

fn post_not_found() -> AppError {
    AppError::not_found("Post not found")
}

fn comment_not_found() -> AppError {
    AppError::not_found("Comment not found")
}

fn score_of(votes: &HashMap<(i64, i64), VoteDelta>, subject_id: i64) -> i64 {
    votes
        .iter()
        .filter(|((subject, _), _)| *subject == subject_id)
        .map(|(_, vote)| i64::from(vote.delta()))
        .sum()
}

/// Resolves the live row `id` owned by `owner`, or the error an owner-matched
/// SQL write would report.
fn owned_row<'a, T>(
    row: Option<&'a mut Row<T>>,
    owner: impl Fn(&T) -> i64,
    owner_id: i64,
    not_found: fn() -> AppError,
    unauthorized: &str,
) -> Result<&'a mut Row<T>, AppError> {
    let row = row
        .filter(|row| row.deleted_at.is_none())
        .ok_or_else(not_found)?;
    if owner(&row.value) != owner_id {
        return Err(AppError::unauthorized(unauthorized));
    }
    Ok(row)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: &NewUser, hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username);
        if taken {
            return Err(AppError::conflict("User already exists"));
        }

        let id = tables.next_id();
        let stored = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            hash: hash.to_string(),
            created_at: Some(Utc::now()),
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let tables = self.tables.read().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create(&self, post: &NewPost) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.author_id) {
            return Err(AppError::not_found("User not found"));
        }

        let id = tables.next_id();
        let stored = Post {
            id,
            author_id: post.author_id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tables.posts.insert(id, Row::new(stored));
        Ok(id)
    }

    async fn get(&self, post_id: i64) -> Result<Post, AppError> {
        let tables = self.tables.read().await;
        tables.live_post(post_id).cloned().ok_or_else(post_not_found)
    }

    async fn edit(&self, post: &PostUpdate) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let row = owned_row(
            tables.posts.get_mut(&post.id),
            |p: &Post| p.author_id,
            post.author_id,
            post_not_found,
            "Unauthorized to delete/edit the post",
        )?;
        row.value.title = post.title.clone();
        row.value.body = post.body.clone();
        row.value.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, post_id: i64, author_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let row = owned_row(
            tables.posts.get_mut(&post_id),
            |p: &Post| p.author_id,
            author_id,
            post_not_found,
            "Unauthorized to delete/edit the post",
        )?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn vote(&self, post_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.live_post(post_id).is_none() {
            return Err(post_not_found());
        }
        if !tables.users.contains_key(&voter_id) {
            return Err(AppError::not_found("User not found"));
        }
        tables.post_votes.insert((post_id, voter_id), vote);
        Ok(())
    }

    async fn unvote(&self, post_id: i64, voter_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.post_votes.remove(&(post_id, voter_id));
        Ok(())
    }

    async fn score(&self, post_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(score_of(&tables.post_votes, post_id))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        if tables.live_post(comment.post_id).is_none() {
            return Err(post_not_found());
        }
        if !tables.users.contains_key(&comment.commenter_id) {
            return Err(AppError::not_found("User not found"));
        }

        let depth = match comment.parent_id {
            Some(parent_id) => {
                let parent = tables
                    .live_comment(parent_id)
                    .filter(|parent| parent.post_id == comment.post_id)
                    .ok_or_else(|| AppError::not_found("Parent comment not found"))?;
                parent.depth + 1
            }
            None => 0,
        };

        let id = tables.next_id();
        let stored = Comment {
            id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            commenter_id: comment.commenter_id,
            body: comment.body.clone(),
            depth,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        tables.comments.insert(id, Row::new(stored));
        Ok(id)
    }

    async fn get(&self, comment_id: i64) -> Result<Comment, AppError> {
        let tables = self.tables.read().await;
        tables
            .live_comment(comment_id)
            .cloned()
            .ok_or_else(comment_not_found)
    }

    async fn list(&self, post_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        if tables.live_post(post_id).is_none() {
            return Err(post_not_found());
        }
        Ok(tables
            .comments
            .values()
            .filter_map(Row::live)
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn edit(&self, comment: &CommentUpdate) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let row = owned_row(
            tables.comments.get_mut(&comment.id),
            |c: &Comment| c.commenter_id,
            comment.commenter_id,
            comment_not_found,
            "Unauthorized to delete/edit the comment",
        )?;
        row.value.body = comment.body.clone();
        row.value.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, comment_id: i64, commenter_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let row = owned_row(
            tables.comments.get_mut(&comment_id),
            |c: &Comment| c.commenter_id,
            commenter_id,
            comment_not_found,
            "Unauthorized to delete/edit the comment",
        )?;
        row.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn vote(&self, comment_id: i64, voter_id: i64, vote: VoteDelta) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.live_comment(comment_id).is_none() {
            return Err(comment_not_found());
        }
        if !tables.users.contains_key(&voter_id) {
            return Err(AppError::not_found("User not found"));
        }
        tables.comment_votes.insert((comment_id, voter_id), vote);
        Ok(())
    }

    async fn unvote(&self, comment_id: i64, voter_id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.comment_votes.remove(&(comment_id, voter_id));
        Ok(())
    }

    async fn score(&self, comment_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        Ok(score_of(&tables.comment_votes, comment_id))
    }
}

//! 内存存储实现
//! 与 PostgreSQL 实现保持相同语义（唯一约束、条件撤销），用于测试和本地运行

use super::{PostStore, RefreshTokenStore, RepoError, UserStore};
use crate::models::{auth::RefreshToken, post::Post, user::User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    // email -> user id，充当唯一索引
    emails: DashMap<String, Uuid>,
    refresh_tokens: DashMap<String, RefreshToken>,
    posts: DashMap<Uuid, Post>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前保存的刷新令牌行数（撤销的也计入）
    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, RepoError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_subscribed: false,
            created_at: now,
            updated_at: now,
        };

        match self.emails.entry(email.to_string()) {
            Entry::Occupied(_) => return Err(RepoError::Conflict("users_email_key".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let id = match self.emails.get(email) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, RepoError> {
        let Some(mut user) = self.users.get_mut(&id) else {
            return Ok(None);
        };

        if user.email != email {
            match self.emails.entry(email.to_string()) {
                Entry::Occupied(_) => {
                    return Err(RepoError::Conflict("users_email_key".to_string()))
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.emails.remove(&user.email);
            user.email = email.to_string();
        }

        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn set_subscribed(&self, id: Uuid, subscribed: bool) -> Result<bool, RepoError> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_subscribed = subscribed;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, RepoError> {
        let now = Utc::now();
        let row = RefreshToken {
            token: token.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        };

        match self.refresh_tokens.entry(token.to_string()) {
            Entry::Occupied(_) => Err(RepoError::Conflict("refresh_tokens_pkey".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, RepoError> {
        Ok(self.refresh_tokens.get(token).map(|r| r.clone()))
    }

    async fn set_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, RepoError> {
        match self.refresh_tokens.get_mut(token) {
            Some(mut row) if row.revoked_at.is_none() => {
                row.revoked_at = Some(at);
                row.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, user_id: Uuid, body: &str) -> Result<Post, RepoError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| author_id.map_or(true, |a| p.user_id == a))
            .map(|p| p.clone())
            .collect();
        posts.sort_by_key(|p| p.created_at);
        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.posts.remove(&id).is_some())
    }
}

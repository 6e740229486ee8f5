//! Post repository

use super::{PostStore, RepoError};
use crate::models::post::Post;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostRepository {
    db: PgPool,
}

impl PostRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn insert_post(&self, user_id: Uuid, body: &str) -> Result<Post, RepoError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, body, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, RepoError> {
        let posts = match author_id {
            Some(author_id) => {
                sqlx::query_as::<_, Post>(
                    "SELECT * FROM posts WHERE user_id = $1 ORDER BY created_at ASC",
                )
                .bind(author_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at ASC")
                    .fetch_all(&self.db)
                    .await?
            }
        };

        Ok(posts)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

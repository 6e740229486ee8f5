//! 帖子服务

use crate::{
    auth::{guard::authorize_owner, jwt::Identity},
    config::PostConfig,
    error::AppError,
    models::post::*,
    repository::PostStore,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct PostService {
    posts: Arc<dyn PostStore>,
    max_body_chars: usize,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, config: &PostConfig) -> Self {
        Self {
            posts,
            max_body_chars: config.max_body_chars,
        }
    }

    /// 发帖，作者为当前身份
    pub async fn create(
        &self,
        identity: &Identity,
        req: CreatePostRequest,
    ) -> Result<PostResponse, AppError> {
        if req.body.chars().count() > self.max_body_chars {
            return Err(AppError::BadRequest("Post is too long".to_string()));
        }

        let post = self.posts.insert_post(identity.user_id(), &req.body).await?;

        tracing::debug!(post_id = %post.id, user_id = %post.user_id, "Post created");

        Ok(PostResponse::from(post))
    }

    /// 公开列表
    pub async fn list(&self, query: ListPostsQuery) -> Result<Vec<PostResponse>, AppError> {
        let posts = self.posts.list_posts(query.author_id).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<PostResponse, AppError> {
        self.posts
            .get_post(id)
            .await?
            .map(PostResponse::from)
            .ok_or_else(|| AppError::not_found("post"))
    }

    /// 删除帖子，仅作者本人可操作
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), AppError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::not_found("post"))?;

        authorize_owner(identity, post.user_id)?;

        if !self.posts.delete_post(id).await? {
            return Err(AppError::not_found("post"));
        }

        tracing::info!(post_id = %id, user_id = %identity.user_id(), "Post deleted");

        Ok(())
    }
}

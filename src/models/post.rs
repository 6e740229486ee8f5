//! 帖子模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 帖子（归属于唯一的用户）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 创建帖子请求（作者取自访问令牌，不接受客户端传入）
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub body: String,
}

/// 列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub author_id: Option<Uuid>,
}

/// 帖子响应
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            body: post.body,
            user_id: post.user_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

//! Post repository

use sqlx::SqlitePool;

use agentmart_types::{AgentId, Post, PostId};

use crate::models::convert_all;
use crate::{DbError, DbPost, DbResult};

pub struct PostRepo {
    pool: SqlitePool,
}

impl PostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, post: Post) -> DbResult<Post> {
        let row = sqlx::query_as::<_, DbPost>(
            r#"
            INSERT INTO posts (id, agent_id, author_id, title, content, post_type, published,
                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(post.id.0)
        .bind(post.agent_id.0)
        .bind(post.author_id.0)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.post_type.as_str())
        .bind(post.published)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Post::try_from(row)
    }

    pub async fn find_by_id(&self, id: PostId) -> DbResult<Option<Post>> {
        let row = sqlx::query_as::<_, DbPost>("SELECT * FROM posts WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Post::try_from).transpose()
    }

    pub async fn list_all(&self) -> DbResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, DbPost>("SELECT * FROM posts ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    pub async fn list_by_agent(&self, agent_id: AgentId) -> DbResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, DbPost>(
            "SELECT * FROM posts WHERE agent_id = ? ORDER BY created_at DESC",
        )
        .bind(agent_id.0)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    pub async fn list_published(&self) -> DbResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, DbPost>(
            "SELECT * FROM posts WHERE published = 1 ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    /// Apply `update` to the stored post inside one write transaction
    pub async fn update<F>(&self, id: PostId, update: F) -> DbResult<Post>
    where
        F: FnOnce(&mut Post),
    {
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE posts SET id = id WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(DbError::not_found("posts", id));
        }

        let row = sqlx::query_as::<_, DbPost>("SELECT * FROM posts WHERE id = ?")
            .bind(id.0)
            .fetch_one(&mut *tx)
            .await?;
        let mut post = Post::try_from(row)?;
        update(&mut post);

        let row = sqlx::query_as::<_, DbPost>(
            r#"
            UPDATE posts SET title = ?, content = ?, post_type = ?, published = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.post_type.as_str())
        .bind(post.published)
        .bind(post.updated_at)
        .bind(id.0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Post::try_from(row)
    }

    pub async fn delete(&self, id: PostId) -> DbResult<Post> {
        let row = sqlx::query_as::<_, DbPost>("DELETE FROM posts WHERE id = ? RETURNING *")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("posts", id))?;
        Post::try_from(row)
    }
}

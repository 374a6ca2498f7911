use super::DBClient;
use crate::error::StoreError;
use crate::models::{Comment, PostId, UserId};

/// Comment database operations trait
pub trait CommentExt {
    /// Every comment whose post_id matches, oldest first
    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError>;

    /// Fails with `ForeignKeyViolation`, naming the post or the author that is missing
    async fn create_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> Result<Comment, StoreError>;
}

impl CommentExt for DBClient {
    async fn get_comments(&self, post_id: PostId) -> Result<Vec<Comment>, StoreError> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.username AS author_username, c.text
            FROM comments c
            INNER JOIN users u ON c.author_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    async fn create_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        text: &str,
    ) -> Result<Comment, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            WITH new_comment AS (
                INSERT INTO comments (author_id, post_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT nc.id, nc.post_id, nc.author_id, u.username AS author_username, nc.text
            FROM new_comment nc
            JOIN users u ON nc.author_id = u.id
            "#,
        )
        .bind(author_id)
        .bind(post_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }
}

use super::DBClient;
use crate::error::StoreError;
use crate::models::{Post, PostFields, PostId, UserId};

pub trait PostExt {
    /// All posts, ordered by id.
    async fn get_posts(&self) -> Result<Vec<Post>, StoreError>;

    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError>;

    async fn create_post(
        &self,
        author_id: UserId,
        fields: &PostFields,
        date: &str,
    ) -> Result<Post, StoreError>;

    /// Overwrites every editable column and the author. `None` if the post does not exist.
    async fn edit_post(
        &self,
        post_id: PostId,
        author_id: UserId,
        fields: &PostFields,
    ) -> Result<Option<Post>, StoreError>;

    /// Deletes the post and its comments. `false` if there was nothing to delete.
    async fn delete_post(&self, post_id: PostId) -> Result<bool, StoreError>;
}

impl PostExt for DBClient {
    async fn get_posts(&self) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, u.username AS author_username, p.title, p.subtitle, p.date, p.body, p.img_url
            FROM posts p
            INNER JOIN users u ON p.author_id = u.id
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn get_post(&self, post_id: PostId) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT p.id, p.author_id, u.username AS author_username, p.title, p.subtitle, p.date, p.body, p.img_url
            FROM posts p
            INNER JOIN users u ON p.author_id = u.id
            WHERE p.id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn create_post(
        &self,
        author_id: UserId,
        fields: &PostFields,
        date: &str,
    ) -> Result<Post, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH new_post AS (
                INSERT INTO posts (author_id, title, subtitle, date, body, img_url)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
            )
            SELECT np.id, np.author_id, u.username AS author_username, np.title, np.subtitle, np.date, np.body, np.img_url
            FROM new_post np
            JOIN users u ON np.author_id = u.id
            "#,
        )
        .bind(author_id)
        .bind(&fields.title)
        .bind(&fields.subtitle)
        .bind(date)
        .bind(&fields.body)
        .bind(&fields.img_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn edit_post(
        &self,
        post_id: PostId,
        author_id: UserId,
        fields: &PostFields,
    ) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            WITH updated_post AS (
                UPDATE posts
                SET title = $1, subtitle = $2, img_url = $3, author_id = $4, body = $5
                WHERE id = $6
                RETURNING *
            )
            SELECT up.id, up.author_id, u.username AS author_username, up.title, up.subtitle, up.date, up.body, up.img_url
            FROM updated_post up
            JOIN users u ON up.author_id = u.id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.subtitle)
        .bind(&fields.img_url)
        .bind(author_id)
        .bind(&fields.body)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: PostId) -> Result<bool, StoreError> {
        // comments.post_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
